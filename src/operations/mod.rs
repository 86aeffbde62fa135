// src/operations/mod.rs

//! Defines the gate set and the operations circuits are built from.
//!
//! The gate set is deliberately small: exactly the single-qubit
//! transformations the teleportation relay and the search demos need,
//! each carrying its own 2x2 unitary matrix. Multi-qubit behavior comes
//! from conditioning a gate on control qubits, not from larger matrices.

use crate::core::QubitId;
use num_complex::Complex;
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// A single-qubit unitary from the fixed gate set.
///
/// Each variant yields its matrix via [`Gate::matrix`]. The set covers the
/// relay protocol (X and Z corrections, H for pair preparation) plus the
/// phase rotation used by derived circuits.
#[derive(Debug, Clone, Copy, PartialEq)] // f64 comparison is fine for the fixed angles used here
pub enum Gate {
    /// Identity; leaves the state untouched. Useful as an explicit no-op
    /// when a circuit wants to mention a wire without transforming it.
    I,
    /// Bit flip (NOT): swaps the |0> and |1> amplitudes.
    X,
    /// Phase negate: multiplies the |1> amplitude by -1.
    Z,
    /// Superposition (Hadamard): maps |0> to (|0>+|1>)/sqrt(2) and
    /// |1> to (|0>-|1>)/sqrt(2).
    H,
    /// Phase rotation: multiplies the |1> amplitude by `e^(i*theta)`.
    PhaseShift {
        /// The phase angle in radians.
        theta: f64,
    },
}

impl Gate {
    /// The 2x2 unitary matrix of this gate, row-major.
    pub fn matrix(&self) -> [[Complex<f64>; 2]; 2] {
        let zero = Complex::new(0.0, 0.0);
        let one = Complex::new(1.0, 0.0);
        match self {
            Gate::I => [[one, zero], [zero, one]],
            Gate::X => [[zero, one], [one, zero]],
            Gate::Z => [[one, zero], [zero, -one]],
            Gate::H => {
                let h = Complex::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            Gate::PhaseShift { theta } => {
                [[one, zero], [zero, Complex::from_polar(1.0, *theta)]]
            }
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::I => write!(f, "I"),
            Gate::X => write!(f, "X"),
            Gate::Z => write!(f, "Z"),
            Gate::H => write!(f, "H"),
            Gate::PhaseShift { theta } => write!(f, "P({:.2})", theta),
        }
    }
}

/// One unitary step of a circuit: a gate applied to a target qubit,
/// optionally conditioned on control qubits being |1>.
///
/// A single control gives the familiar CX/CZ forms; two controls give the
/// doubly-controlled Z that Grover's diffusion operator is built from.
/// The engine applies controlled gates directly on the state vector, so
/// no decomposition into elementary two-qubit gates is needed.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Apply `gate` unconditionally to `target`.
    Unitary {
        /// The qubit the gate acts on.
        target: QubitId,
        /// The gate to apply.
        gate: Gate,
    },

    /// Apply `gate` to `target` only in the basis states where every
    /// control qubit is |1>.
    Controlled {
        /// Qubits whose |1> components gate the application. Must be
        /// non-empty and distinct from `target`.
        controls: Vec<QubitId>,
        /// The qubit the gate acts on.
        target: QubitId,
        /// The gate to apply.
        gate: Gate,
    },
}

impl Operation {
    /// Returns all qubit ids mentioned by this operation, target last.
    /// The circuit uses this to register wires; the engine uses it to map
    /// ids onto state-vector bit positions.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Unitary { target, .. } => vec![*target],
            Operation::Controlled { controls, target, .. } => {
                let mut qubits = controls.clone();
                qubits.push(*target);
                qubits
            }
        }
    }

    /// The gate this operation applies.
    pub fn gate(&self) -> Gate {
        match self {
            Operation::Unitary { gate, .. } => *gate,
            Operation::Controlled { gate, .. } => *gate,
        }
    }

    /// The qubit the gate acts on.
    pub fn target(&self) -> QubitId {
        match self {
            Operation::Unitary { target, .. } => *target,
            Operation::Controlled { target, .. } => *target,
        }
    }
}
