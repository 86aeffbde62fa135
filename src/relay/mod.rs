// src/relay/mod.rs

//! The bit-by-bit teleportation relay.
//!
//! One transmitted bit runs a fixed five-stage protocol on three qubits:
//! prepare the shared correlated pair, encode the payload onto the message
//! qubit, jointly measure the message qubit and the sender half (yielding
//! the 2-bit classical outcome), apply the tabulated correction to the
//! receiver, and measure the receiver for the output bit. In the ideal
//! noiseless model the output always equals the payload, whichever of the
//! four classical outcomes occurred, and the outcome itself is uniformly
//! distributed regardless of the payload.
//!
//! [`MessageRelay`] drives the protocol once per bit of an encoded text
//! message, strictly in order, one shot per bit, with no retries.

use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::{QrelayError, QubitId};
use crate::encoding;
use crate::simulation::Backend;
use std::fmt;
use tracing::debug;

/// Register holding the message qubit's half of the joint measurement.
pub const REG_PHASE: &str = "m_phase";
/// Register holding the sender half's part of the joint measurement.
pub const REG_FLIP: &str = "m_flip";
/// Register holding the receiver's final output bit.
pub const REG_OUT: &str = "out";

// Wire roles within one bit's circuit. Fresh qubits every transmission;
// nothing persists across bits.
const MSG: QubitId = QubitId(0);
const SENDER: QubitId = QubitId(1);
const RECEIVER: QubitId = QubitId(2);

/// The 2-bit classical outcome of the joint measurement, the only
/// information the sender side communicates to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairOutcome {
    /// Bit read from the message qubit after the basis change.
    pub phase: bool,
    /// Bit read from the sender half of the pair.
    pub flip: bool,
}

impl PairOutcome {
    /// Builds an outcome from raw register bits (nonzero reads as 1).
    pub fn from_bits(phase: u8, flip: u8) -> Self {
        Self { phase: phase != 0, flip: flip != 0 }
    }
}

impl fmt::Display for PairOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", u8::from(self.phase), u8::from(self.flip))
    }
}

/// The corrective operations the receiver applies for one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correction {
    /// Apply the bit flip X.
    pub bit_flip: bool,
    /// Apply the phase negate Z.
    pub phase_negate: bool,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.bit_flip, self.phase_negate) {
            (false, false) => write!(f, "I"),
            (true, false) => write!(f, "X"),
            (false, true) => write!(f, "Z"),
            (true, true) => write!(f, "XZ"),
        }
    }
}

/// The Correction Table: the fixed mapping from classical outcome to the
/// receiver's corrective operations. A static lookup, not runtime state.
pub fn correction_for(outcome: PairOutcome) -> Correction {
    match (outcome.phase, outcome.flip) {
        (false, false) => Correction { bit_flip: false, phase_negate: false },
        (false, true) => Correction { bit_flip: true, phase_negate: false },
        (true, false) => Correction { bit_flip: false, phase_negate: true },
        (true, true) => Correction { bit_flip: true, phase_negate: true },
    }
}

/// Builds the three-qubit circuit that teleports one payload bit.
///
/// The instruction sequence walks the protocol stages in order: pair
/// preparation (H on the sender half, CX onto the receiver), payload
/// encoding (X on the message qubit for a 1 bit), the joint measurement
/// basis change (CX then H) with both measurements, the classically
/// conditioned corrections, and the receiver's output measurement. The
/// conditioned X-on-flip / Z-on-phase instructions are the circuit form of
/// [`correction_for`].
///
/// # Errors
/// Rejects payloads other than 0 and 1 with
/// [`QrelayError::InvalidCircuit`].
pub fn teleport_circuit(bit: u8) -> Result<Circuit, QrelayError> {
    if bit > 1 {
        return Err(QrelayError::InvalidCircuit {
            message: format!("payload bit must be 0 or 1, got {}", bit),
        });
    }

    // PREPARE: shared correlated pair between sender and receiver
    let mut builder = CircuitBuilder::new()
        .h(SENDER)
        .cx(SENDER, RECEIVER);

    // ENCODE: write the payload onto the message qubit
    if bit == 1 {
        builder = builder.x(MSG);
    }

    builder
        // MEASURE: joint measurement of message qubit and sender half
        .cx(MSG, SENDER)
        .h(MSG)
        .measure(MSG, REG_PHASE)
        .measure(SENDER, REG_FLIP)
        // CORRECT: receiver applies the tabulated correction
        .x_if(REG_FLIP, RECEIVER)
        .z_if(REG_PHASE, RECEIVER)
        // OUTPUT: read the receiver
        .measure(RECEIVER, REG_OUT)
        .build()
}

/// Trace of one bit's transmission: what went in, which classical outcome
/// the joint measurement produced, which correction it selected, and what
/// came out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTrace {
    /// The payload bit handed to the sender.
    pub sent: u8,
    /// The 2-bit classical outcome.
    pub outcome: PairOutcome,
    /// The correction the Correction Table selected for the outcome.
    pub correction: Correction,
    /// The receiver's measured output bit.
    pub received: u8,
}

/// Everything one [`MessageRelay::send`] produced: the original text, both
/// bit strings, the decoded received text, and the per-bit traces in
/// message order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReport {
    sent_text: String,
    sent_bits: String,
    received_bits: String,
    received_text: String,
    traces: Vec<BitTrace>,
}

impl RelayReport {
    /// The text handed to the sender.
    pub fn sent_text(&self) -> &str {
        &self.sent_text
    }

    /// The encoded payload bit string.
    pub fn sent_bits(&self) -> &str {
        &self.sent_bits
    }

    /// The receiver-side bit string, in original message order.
    pub fn received_bits(&self) -> &str {
        &self.received_bits
    }

    /// The decoded received text.
    pub fn received_text(&self) -> &str {
        &self.received_text
    }

    /// Per-bit traces, one per transmitted bit, in message order.
    pub fn traces(&self) -> &[BitTrace] {
        &self.traces
    }
}

impl fmt::Display for RelayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Relay Report: {:?} -> {:?} ({} bits)",
            self.sent_text,
            self.received_text,
            self.traces.len()
        )?;
        writeln!(f, "  bits sent:     {}", self.sent_bits)?;
        writeln!(f, "  bits received: {}", self.received_bits)?;
        for (position, trace) in self.traces.iter().enumerate() {
            writeln!(
                f,
                "  bit {:>3}: sent {}, outcome {}, correction {:>2}, received {}",
                position, trace.sent, trace.outcome, trace.correction, trace.received
            )?;
        }
        Ok(())
    }
}

/// The message relay orchestrator.
///
/// Holds the injected execution backend and drives the per-bit protocol
/// sequentially: encode the text, relay each bit in order through its own
/// fresh circuit, reassemble and decode. Single-threaded, synchronous,
/// at-most-one attempt per bit; backend failures and decode failures
/// propagate unmodified.
pub struct MessageRelay<B: Backend> {
    backend: B,
}

impl<B: Backend> MessageRelay<B> {
    /// Creates a relay over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Relays a whole text message and returns the full report.
    ///
    /// Bits are transmitted and reassembled strictly in message order. An
    /// empty message encodes to zero bits, runs zero circuits, and decodes
    /// back to the empty string.
    pub fn send(&mut self, text: &str) -> Result<RelayReport, QrelayError> {
        let sent_bits = encoding::text_to_bits(text);
        debug!(
            "relaying {:?} as {} bits over backend '{}'",
            text,
            sent_bits.len(),
            self.backend.name()
        );

        let mut received_bits = String::with_capacity(sent_bits.len());
        let mut traces = Vec::with_capacity(sent_bits.len());
        for symbol in sent_bits.chars() {
            let trace = self.relay_bit(u8::from(symbol == '1'))?;
            received_bits.push(if trace.received == 1 { '1' } else { '0' });
            traces.push(trace);
        }

        let received_text = encoding::bits_to_text(&received_bits)?;
        Ok(RelayReport {
            sent_text: text.to_string(),
            sent_bits,
            received_bits,
            received_text,
            traces,
        })
    }

    /// Relays a single payload bit through one fresh teleport circuit,
    /// single shot.
    pub fn relay_bit(&mut self, bit: u8) -> Result<BitTrace, QrelayError> {
        let circuit = teleport_circuit(bit)?;
        let result = self.backend.execute(&circuit, 1)?;

        let key = result.sole_outcome().ok_or_else(|| QrelayError::ExecutionFailure {
            message: "backend returned no definite outcome for a single-shot run".to_string(),
        })?;
        let phase = register_bit(&result, key, REG_PHASE)?;
        let flip = register_bit(&result, key, REG_FLIP)?;
        let received = register_bit(&result, key, REG_OUT)?;

        let outcome = PairOutcome::from_bits(phase, flip);
        let correction = correction_for(outcome);
        debug!(
            "sent {}, outcome {}, correction {}, received {}",
            bit, outcome, correction, received
        );

        Ok(BitTrace { sent: bit, outcome, correction, received })
    }
}

fn register_bit(
    result: &crate::simulation::ExecutionResult,
    key: &str,
    register: &str,
) -> Result<u8, QrelayError> {
    result.register_bit(key, register).ok_or_else(|| QrelayError::MissingRegister {
        register: register.to_string(),
    })
}
