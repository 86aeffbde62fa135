// src/core/state.rs

use num_complex::Complex;
use std::fmt;

/// Amplitude vector over the computational basis of the qubits an engine
/// was initialized with. Dimension is always `2^n` for `n` qubits.
///
/// Basis ordering: qubit ids are sorted ascending and the lowest id takes
/// the most significant bit of the basis index, so for ids {0, 1, 2} the
/// index `0b101` means q(0)=1, q(1)=0, q(2)=1.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct StateVector {
    /// The complex amplitudes, one per basis state.
    state_vector: Vec<Complex<f64>>,
}

impl StateVector {
    /// Creates a state from a given amplitude vector.
    /// Callers are responsible for handing in a vector of power-of-two
    /// length; normalization is checked by the engine, not here.
    pub(crate) fn new(initial_vector: Vec<Complex<f64>>) -> Self {
        Self { state_vector: initial_vector }
    }

    /// Creates the all-zero computational basis state `|0...0>` for `dim`
    /// basis states (amplitude 1 at index 0).
    pub(crate) fn ground(dim: usize) -> Self {
        let mut v = vec![Complex::new(0.0, 0.0); dim];
        if let Some(first) = v.first_mut() {
            *first = Complex::new(1.0, 0.0);
        }
        Self { state_vector: v }
    }

    /// Provides read-only access to the amplitudes.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.state_vector
    }

    /// Provides mutable access for the simulation engine to modify the state.
    pub(crate) fn vector_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.state_vector
    }

    /// Gets the dimension (number of basis states).
    pub fn dim(&self) -> usize {
        self.state_vector.len()
    }

    /// Number of qubits this state spans (`log2` of the dimension).
    pub fn num_qubits(&self) -> usize {
        self.state_vector.len().trailing_zeros() as usize
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.state_vector.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
