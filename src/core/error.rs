//! Error handling logic

use std::fmt;

/// Unique identifier for a qubit within a circuit.
/// Uniqueness is context-dependent: two circuits may both use `QubitId(0)`
/// without relation, but within one circuit each id names one wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub u64);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q({})", self.0)
    }
}

/// Error types covering circuit construction and execution failures.
/// Codec failures have their own [`DecodeError`] and convert into
/// [`QrelayError::Decode`] when they cross the relay boundary.
#[derive(Debug, Clone, PartialEq, Eq)] // Eq useful for testing error variants
pub enum QrelayError {
    /// A circuit is structurally invalid: duplicate register names, a
    /// conditional referring to a register no measurement has filled,
    /// an operation listing the same qubit twice.
    InvalidCircuit {
        /// InvalidCircuit failure message
        message: String
    },

    /// An instruction referenced a qubit the execution engine was not
    /// initialized with.
    UnknownQubit {
        /// The qubit that has no slot in the engine's state
        qubit: QubitId,
        /// UnknownQubit failure message
        message: String
    },

    /// The circuit needs more qubits than the backend will allocate.
    CapacityExceeded {
        /// Qubits the circuit involves
        requested: usize,
        /// Backend's qubit limit
        limit: usize
    },

    /// A result lookup named a classical register no measurement recorded.
    MissingRegister {
        /// The register name that was looked up
        register: String
    },

    /// General failure encountered while executing a circuit.
    ExecutionFailure {
        /// ExecutionFailure failure message
        message: String
    },

    /// A received bit string failed to decode back into text.
    Decode {
        /// The underlying codec failure
        source: DecodeError
    },
}

impl fmt::Display for QrelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QrelayError::InvalidCircuit { message } => write!(f, "Invalid Circuit: {}", message),
            QrelayError::UnknownQubit { qubit, message } => write!(f, "Unknown Qubit ({}): {}", qubit, message),
            QrelayError::CapacityExceeded { requested, limit } => write!(f, "Capacity Exceeded: circuit involves {} qubits, backend limit is {}", requested, limit),
            QrelayError::MissingRegister { register } => write!(f, "Missing Register: no measurement recorded into '{}'", register),
            QrelayError::ExecutionFailure { message } => write!(f, "Execution Failure: {}", message),
            QrelayError::Decode { source } => write!(f, "Decode Error: {}", source),
        }
    }
}

// Implement the standard Error trait to allow for easy integration with Rust error handling.
impl std::error::Error for QrelayError {}

impl From<DecodeError> for QrelayError {
    fn from(source: DecodeError) -> Self {
        QrelayError::Decode { source }
    }
}

/// Failures turning a bit string back into text.
/// Surfaced to the caller unmodified; the codec never recovers or pads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Bit-string length is not a multiple of 8, so it cannot split into
    /// whole bytes.
    RaggedLength {
        /// The offending length
        length: usize
    },

    /// A character other than '0' or '1' appeared in the bit string.
    InvalidSymbol {
        /// Byte offset of the foreign character
        position: usize,
        /// The character found there
        symbol: char
    },

    /// The decoded bytes are not valid UTF-8.
    InvalidUtf8 {
        /// InvalidUtf8 failure message
        message: String
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::RaggedLength { length } => write!(f, "bit string length {} is not a multiple of 8", length),
            DecodeError::InvalidSymbol { position, symbol } => write!(f, "unexpected symbol {:?} at position {} (expected '0' or '1')", symbol, position),
            DecodeError::InvalidUtf8 { message } => write!(f, "decoded bytes are not valid UTF-8: {}", message),
        }
    }
}

impl std::error::Error for DecodeError {}
