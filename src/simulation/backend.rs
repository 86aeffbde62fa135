// src/simulation/backend.rs

use super::Simulator;
use super::results::ExecutionResult;
use crate::circuits::Circuit;
use crate::core::QrelayError;

/// The circuit-execution collaborator seam.
///
/// Everything above this trait treats execution purely as
/// `execute(circuit, shots) -> outcome counts`; the bundled [`Simulator`]
/// is one implementation, and tests substitute deterministic fakes. Calls
/// are synchronous and blocking, matching the sequential relay model.
pub trait Backend {
    /// Human-readable backend name for logs and reports.
    fn name(&self) -> &str;

    /// Largest number of qubits a single circuit may involve.
    fn max_qubits(&self) -> usize;

    /// Executes `shots` independent runs of the circuit and returns the
    /// aggregated outcome counts. Failures propagate unmodified to the
    /// caller; the relay never retries.
    fn execute(&mut self, circuit: &Circuit, shots: u64) -> Result<ExecutionResult, QrelayError>;
}

impl Backend for Simulator {
    fn name(&self) -> &str {
        "statevector-simulator"
    }

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn execute(&mut self, circuit: &Circuit, shots: u64) -> Result<ExecutionResult, QrelayError> {
        Simulator::execute(self, circuit, shots)
    }
}
