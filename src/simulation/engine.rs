// src/simulation/engine.rs
use crate::core::{QrelayError, QubitId, StateVector};
use crate::operations::Operation;
// NOTE: Does not directly use Circuit; operates on operations passed from Simulator
use num_complex::Complex;
use num_traits::Zero; // For Complex::zero()
use rand::Rng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

/// The core state-vector engine. Holds the joint state of every qubit a
/// circuit involves and evolves it one operation at a time.
/// (Internal visibility)
pub(crate) struct SimulationEngine {
    /// Maps qubit ids to their index (0..N-1) in the sorted order used for
    /// the global state vector.
    qubit_indices: HashMap<QubitId, usize>,
    /// The joint amplitude vector over all simulated qubits, dimension 2^N.
    global_state: StateVector,
    /// Number of qubits being simulated (N).
    num_qubits: usize,
}

impl SimulationEngine {
    /// Initializes the engine for a given set of qubits in the ground state
    /// `|0...0>`.
    pub(crate) fn init(qubit_ids: &HashSet<QubitId>) -> Result<Self, QrelayError> {
        if qubit_ids.is_empty() {
            return Err(QrelayError::InvalidCircuit {
                message: "cannot initialize simulation engine with zero qubits".to_string(),
            });
        }

        let num_qubits = qubit_ids.len();
        let dim = 1usize.checked_shl(num_qubits as u32).ok_or_else(|| QrelayError::ExecutionFailure {
            message: format!("{} qubits overflow the state vector dimension", num_qubits),
        })?;

        // Sort ids so index assignment is deterministic regardless of
        // HashSet iteration order.
        let mut qubit_indices = HashMap::with_capacity(num_qubits);
        let mut sorted_ids: Vec<QubitId> = qubit_ids.iter().cloned().collect();
        sorted_ids.sort(); // Relies on Ord derived for QubitId
        for (index, qubit_id) in sorted_ids.into_iter().enumerate() {
            qubit_indices.insert(qubit_id, index);
        }

        Ok(Self {
            qubit_indices,
            global_state: StateVector::ground(dim),
            num_qubits,
        })
    }

    // Crate-visible method to set the state directly for testing
    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<(), QrelayError> {
        if state.dim() != self.global_state.dim() {
            Err(QrelayError::ExecutionFailure {
                message: format!(
                    "cannot set state: provided dimension {} does not match engine dimension {}",
                    state.dim(),
                    self.global_state.dim()
                ),
            })
        } else {
            self.global_state = state;
            Ok(())
        }
    }

    /// Read access to the current joint state.
    pub(crate) fn state(&self) -> &StateVector {
        &self.global_state
    }

    /// Applies a unitary operation to the global state.
    pub(crate) fn apply_operation(&mut self, op: &Operation) -> Result<(), QrelayError> {
        match op {
            Operation::Unitary { target, gate } => {
                let target_idx = self.get_qubit_index(target)?;
                self.apply_single_qubit_gate(target_idx, &gate.matrix());
            }
            Operation::Controlled { controls, target, gate } => {
                let target_idx = self.get_qubit_index(target)?;
                let mut control_mask = 0usize;
                for control in controls {
                    let control_idx = self.get_qubit_index(control)?;
                    if control_idx == target_idx {
                        return Err(QrelayError::InvalidCircuit {
                            message: format!("qubit {} is both control and target", target),
                        });
                    }
                    control_mask |= self.bit_mask(control_idx);
                }
                self.apply_controlled_gate(control_mask, target_idx, &gate.matrix());
            }
        }
        Ok(())
    }

    /// Measures one qubit in the computational basis.
    ///
    /// Implements Born-rule sampling: the probability of reading 1 is the
    /// summed squared amplitude over all basis states with the qubit's bit
    /// set. The drawn outcome collapses the state (amplitudes of the other
    /// branch zeroed, the surviving branch renormalized), so later
    /// instructions see the post-measurement state.
    pub(crate) fn measure(&mut self, qubit: QubitId, rng: &mut StdRng) -> Result<u8, QrelayError> {
        let target_idx = self.get_qubit_index(&qubit)?;
        let mask = self.bit_mask(target_idx);

        let p_one: f64 = self
            .global_state
            .vector()
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, amp)| amp.norm_sqr())
            .sum();

        let draw: f64 = rng.random();
        let outcome = u8::from(draw < p_one);
        let p_outcome = if outcome == 1 { p_one } else { 1.0 - p_one };

        if p_outcome <= 1e-12 {
            // Only reachable through accumulated floating-point drift.
            return Err(QrelayError::ExecutionFailure {
                message: format!(
                    "measurement of {} selected a branch with vanishing probability {:e}",
                    qubit, p_outcome
                ),
            });
        }

        let scale = 1.0 / p_outcome.sqrt();
        let keep_set_bit = outcome == 1;
        for (i, amp) in self.global_state.vector_mut().iter_mut().enumerate() {
            if ((i & mask) != 0) == keep_set_bit {
                *amp *= scale;
            } else {
                *amp = Complex::zero();
            }
        }

        Ok(outcome)
    }

    /// Helper to get a qubit's index, returning a specific error if absent.
    fn get_qubit_index(&self, qubit: &QubitId) -> Result<usize, QrelayError> {
        self.qubit_indices.get(qubit).copied().ok_or_else(|| QrelayError::UnknownQubit {
            qubit: *qubit,
            message: "qubit not found in simulation context".to_string(),
        })
    }

    /// Basis-index bit mask for the qubit at sorted position `index`.
    /// The lowest qubit id occupies the most significant bit.
    fn bit_mask(&self, index: usize) -> usize {
        1 << (self.num_qubits - 1 - index)
    }

    /// Applies a 2x2 matrix to a single qubit, in place.
    ///
    /// Iterates over the basis states with the target bit clear; each forms
    /// a pair with its set-bit partner, and the matrix mixes the two
    /// amplitudes.
    fn apply_single_qubit_gate(&mut self, target_idx: usize, matrix: &[[Complex<f64>; 2]; 2]) {
        let mask = self.bit_mask(target_idx);
        let dim = self.global_state.dim();
        let vec = self.global_state.vector_mut();

        for i0 in 0..dim {
            if i0 & mask == 0 {
                let i1 = i0 | mask;
                let psi0 = vec[i0]; // Amplitude for |...target=0...>
                let psi1 = vec[i1]; // Amplitude for |...target=1...>
                vec[i0] = matrix[0][0] * psi0 + matrix[0][1] * psi1;
                vec[i1] = matrix[1][0] * psi0 + matrix[1][1] * psi1;
            }
        }
    }

    /// Applies a 2x2 matrix to the target qubit, restricted to basis states
    /// where every control bit is set. Handles any number of controls, so
    /// CX, CZ and the doubly-controlled forms all go through here without
    /// decomposition.
    fn apply_controlled_gate(
        &mut self,
        control_mask: usize,
        target_idx: usize,
        matrix: &[[Complex<f64>; 2]; 2],
    ) {
        let mask = self.bit_mask(target_idx);
        let dim = self.global_state.dim();
        let vec = self.global_state.vector_mut();

        for i0 in 0..dim {
            if i0 & mask == 0 && i0 & control_mask == control_mask {
                let i1 = i0 | mask;
                let psi0 = vec[i0];
                let psi1 = vec[i1];
                vec[i0] = matrix[0][0] * psi0 + matrix[0][1] * psi1;
                vec[i1] = matrix[1][0] * psi0 + matrix[1][1] * psi1;
            }
        }
    }
}
