// src/lib.rs

//! `qrelay` - bit-by-bit quantum teleportation of text messages
//!
//! An educational crate demonstrating quantum-information concepts on a
//! small, ideal (noiseless) state-vector simulator: superposition,
//! entanglement, amplitude-amplification search, and, as its centerpiece,
//! relaying a UTF-8 message one bit at a time through the teleportation
//! protocol (prepare the correlated pair, encode, jointly measure,
//! classically communicate, correct, output).
//!
//! Circuit execution is a pluggable collaborator: the relay and search
//! layers consume the [`Backend`] trait purely as
//! `execute(circuit, shots) -> outcome counts`. The bundled [`Simulator`]
//! is one implementation; tests substitute deterministic fakes.
//!
//! Relaying a message end to end:
//!
//! ```
//! use qrelay::{MessageRelay, QrelayError, Simulator};
//!
//! fn main() -> Result<(), QrelayError> {
//!     // A seeded simulator makes every measurement outcome reproducible.
//!     let mut relay = MessageRelay::new(Simulator::seeded(7));
//!     let report = relay.send("hi")?;
//!
//!     assert_eq!(report.sent_bits(), "0110100001101001");
//!     // Ideal model: the received text always equals the sent text,
//!     // whatever classical outcomes the joint measurements produced.
//!     assert_eq!(report.received_text(), "hi");
//!     Ok(())
//! }
//! ```
//!
//! Building and inspecting a circuit directly:
//!
//! ```
//! use qrelay::{CircuitBuilder, QrelayError, QubitId, Simulator};
//!
//! fn main() -> Result<(), QrelayError> {
//!     let q0 = QubitId(0);
//!     let q1 = QubitId(1);
//!
//!     // Bell pair: H then CX entangles the two qubits.
//!     let circuit = CircuitBuilder::new()
//!         .h(q0)
//!         .cx(q0, q1)
//!         .measure(q0, "a")
//!         .measure(q1, "b")
//!         .build()?;
//!
//!     let mut sim = Simulator::seeded(42);
//!     let result = sim.execute(&circuit, 128)?;
//!
//!     // Perfect correlation: only "00" and "11" ever occur.
//!     assert_eq!(result.count_of("01") + result.count_of("10"), 0);
//!     assert_eq!(result.count_of("00") + result.count_of("11"), 128);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod encoding;
pub mod relay;
pub mod search;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use crate::core::{DecodeError, QrelayError, QubitId, StateVector};
pub use crate::operations::{Gate, Operation};
pub use crate::circuits::{Circuit, CircuitBuilder, Instruction};
pub use crate::simulation::{Backend, ExecutionResult, RunRecord, Simulator};
pub use crate::relay::{BitTrace, MessageRelay, RelayReport};
pub use crate::search::{Clause, CnfFormula, Literal, SearchOutcome};
pub use crate::validation::check_normalization;
