// src/simulation/results.rs
use crate::core::QrelayError;
use std::collections::HashMap;
use std::fmt;

/// Classical register values recorded by a single shot of a circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Maps register names to the 0/1 outcome bit a measurement wrote.
    register_values: HashMap<String, u8>,
}

impl RunRecord {
    /// Creates a new, empty record. (Internal visibility)
    pub(crate) fn new() -> Self {
        Self { register_values: HashMap::new() }
    }

    /// Records a measured bit. (Internal visibility)
    pub(crate) fn record(&mut self, register: String, value: u8) {
        self.register_values.insert(register, value);
    }

    /// Gets the bit recorded into a register, if that register was measured.
    pub fn get(&self, register: &str) -> Option<u8> {
        self.register_values.get(register).copied()
    }

    /// Gets the bit recorded into a register, erring if no measurement
    /// filled it.
    pub fn value(&self, register: &str) -> Result<u8, QrelayError> {
        self.get(register).ok_or_else(|| QrelayError::MissingRegister {
            register: register.to_string(),
        })
    }

    /// Returns the map of all recorded register values.
    pub fn all_values(&self) -> &HashMap<String, u8> {
        &self.register_values
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run Record:")?;
        if self.register_values.is_empty() {
            writeln!(f, "  No registers were measured.")?;
        } else {
            // Sort by register name for consistent and readable output
            let mut sorted_values: Vec<_> = self.register_values.iter().collect();
            sorted_values.sort_by_key(|(name, _)| name.as_str());
            for (name, value) in sorted_values {
                writeln!(f, "  {} = {}", name, value)?;
            }
        }
        Ok(())
    }
}

/// Aggregated outcome counts over many shots of one circuit.
///
/// An outcome key concatenates register values in the circuit's declaration
/// (first-measurement) order, so for registers `["m_phase", "m_flip",
/// "out"]` the key `"101"` means m_phase=1, m_flip=0, out=1.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Number of shots executed.
    shots: u64,
    /// Register names in the order outcome keys are assembled.
    register_order: Vec<String>,
    /// Outcome key -> number of shots that produced it.
    counts: HashMap<String, u64>,
}

impl ExecutionResult {
    /// Creates an empty result for the given register layout. (Internal visibility)
    pub(crate) fn new(shots: u64, register_order: Vec<String>) -> Self {
        Self {
            shots,
            register_order,
            counts: HashMap::new(),
        }
    }

    /// Adds one shot's outcome key to the tally. (Internal visibility)
    pub(crate) fn tally(&mut self, outcome: String) {
        *self.counts.entry(outcome).or_insert(0) += 1;
    }

    /// Assembles a result from pre-counted outcomes. Intended for backend
    /// implementations outside this crate (including test fakes); the
    /// bundled simulator tallies shot by shot instead.
    pub fn from_counts(
        shots: u64,
        register_order: Vec<String>,
        counts: HashMap<String, u64>,
    ) -> Self {
        Self { shots, register_order, counts }
    }

    /// Number of shots this result aggregates.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Register names in outcome-key order.
    pub fn register_order(&self) -> &[String] {
        &self.register_order
    }

    /// Returns the map of outcome keys to counts.
    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    /// Count for one specific outcome key (0 if it never occurred).
    pub fn count_of(&self, outcome: &str) -> u64 {
        self.counts.get(outcome).copied().unwrap_or(0)
    }

    /// The single outcome key, if every shot produced the same one.
    pub fn sole_outcome(&self) -> Option<&str> {
        if self.counts.len() == 1 {
            self.counts.keys().next().map(|k| k.as_str())
        } else {
            None
        }
    }

    /// Reads one register's bit out of an outcome key, using this result's
    /// register order. Returns `None` for unknown registers or malformed
    /// keys.
    pub fn register_bit(&self, outcome: &str, register: &str) -> Option<u8> {
        let position = self.register_order.iter().position(|name| name == register)?;
        match outcome.chars().nth(position) {
            Some('0') => Some(0),
            Some('1') => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Execution Results ({} shots, registers: {}):", self.shots, self.register_order.join(" "))?;
        if self.counts.is_empty() {
            writeln!(f, "  No outcomes recorded.")?;
        } else {
            // Sort by outcome key for consistent and readable output
            let mut sorted_counts: Vec<_> = self.counts.iter().collect();
            sorted_counts.sort_by_key(|(outcome, _)| outcome.as_str());
            for (outcome, count) in sorted_counts {
                let share = if self.shots > 0 {
                    100.0 * (*count as f64) / (self.shots as f64)
                } else {
                    0.0
                };
                writeln!(f, "  \"{}\": {} ({:.1}%)", outcome, count, share)?;
            }
        }
        Ok(())
    }
}
