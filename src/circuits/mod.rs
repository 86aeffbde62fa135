// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! circuit instructions.
//!
//! A [`Circuit`] is a precise, ordered pathway through unitary operations,
//! measurements into named classical registers, and classically-conditioned
//! corrections. The order is the program: instructions execute first to
//! last, once per shot.

use crate::core::{QrelayError, QubitId};
use crate::operations::{Gate, Operation};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One step of a circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Apply a unitary operation to the state.
    Apply(Operation),

    /// Measure a qubit in the computational basis and record the outcome
    /// bit into the named classical register. Measurement collapses the
    /// state; the qubit remains usable afterwards.
    Measure {
        /// The qubit to measure.
        qubit: QubitId,
        /// Classical register receiving the 0/1 outcome. Names must be
        /// unique within one circuit.
        register: String,
    },

    /// Apply the operation only if the named register holds 1. This is the
    /// classical feedback channel of the teleportation protocol: measured
    /// correction bits steer later gates.
    Conditional {
        /// Register previously filled by a `Measure` instruction.
        register: String,
        /// The operation to apply when the register reads 1.
        operation: Operation,
    },
}

impl Instruction {
    /// All qubit ids this instruction touches.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Instruction::Apply(op) => op.involved_qubits(),
            Instruction::Measure { qubit, .. } => vec![*qubit],
            Instruction::Conditional { operation, .. } => operation.involved_qubits(),
        }
    }
}

/// An ordered sequence of instructions applied to a set of qubits.
///
/// Tracks the unique qubits involved and the declaration order of classical
/// registers; that order defines how a run's outcome string is assembled.
#[derive(Clone, PartialEq)] // PartialEq useful for testing circuits
pub struct Circuit {
    /// The unique set of qubits involved across all instructions.
    qubits: HashSet<QubitId>,

    /// The ordered sequence of instructions defining the circuit's logic.
    instructions: Vec<Instruction>,

    /// Register names in first-measurement order.
    registers: Vec<String>,
}

impl Circuit {
    /// Creates a new, empty circuit.
    pub fn new() -> Self {
        Self {
            qubits: HashSet::new(),
            instructions: Vec::new(),
            registers: Vec::new(),
        }
    }

    /// Appends a single instruction.
    ///
    /// Automatically registers the qubits the instruction involves and,
    /// for measurements, the register name (first occurrence keeps its
    /// position; duplicates are caught later by [`Circuit::validate`]).
    pub fn add_instruction(&mut self, instruction: Instruction) {
        for qubit in instruction.involved_qubits() {
            self.qubits.insert(qubit);
        }
        if let Instruction::Measure { register, .. } = &instruction {
            if !self.registers.contains(register) {
                self.registers.push(register.clone());
            }
        }
        self.instructions.push(instruction);
    }

    /// Appends multiple instructions from an iterator.
    pub fn add_instructions<I>(&mut self, instructions: I)
    where
        I: IntoIterator<Item = Instruction>,
    {
        for instruction in instructions {
            self.add_instruction(instruction);
        }
    }

    /// Returns the set of unique qubit ids involved in this circuit.
    pub fn qubits(&self) -> &HashSet<QubitId> {
        &self.qubits
    }

    /// Number of distinct qubits the circuit involves.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Returns the ordered instruction sequence.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Register names in declaration (first-measurement) order. A run's
    /// outcome string concatenates register values in exactly this order.
    pub fn registers(&self) -> &[String] {
        &self.registers
    }

    /// Returns the total number of instructions in the circuit.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the circuit contains no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Checks structural consistency: register names unique across
    /// measurements, conditionals referring only to registers measured
    /// earlier in the sequence, controlled operations with non-empty,
    /// non-overlapping qubit lists.
    pub fn validate(&self) -> Result<(), QrelayError> {
        let mut declared: HashSet<&str> = HashSet::new();
        for instruction in &self.instructions {
            match instruction {
                Instruction::Apply(op) => validate_operation(op)?,
                Instruction::Measure { register, .. } => {
                    if !declared.insert(register.as_str()) {
                        return Err(QrelayError::InvalidCircuit {
                            message: format!("register '{}' measured more than once", register),
                        });
                    }
                }
                Instruction::Conditional { register, operation } => {
                    validate_operation(operation)?;
                    if !declared.contains(register.as_str()) {
                        return Err(QrelayError::InvalidCircuit {
                            message: format!(
                                "conditional on register '{}' before any measurement fills it",
                                register
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

fn validate_operation(op: &Operation) -> Result<(), QrelayError> {
    if let Operation::Controlled { controls, target, .. } = op {
        if controls.is_empty() {
            return Err(QrelayError::InvalidCircuit {
                message: format!("controlled operation on {} has no control qubits", target),
            });
        }
        let mut seen: HashSet<QubitId> = HashSet::new();
        for control in controls {
            if !seen.insert(*control) {
                return Err(QrelayError::InvalidCircuit {
                    message: format!("control qubit {} listed twice", control),
                });
            }
        }
        if seen.contains(target) {
            return Err(QrelayError::InvalidCircuit {
                message: format!("qubit {} is both control and target", target),
            });
        }
    }
    Ok(())
}

// Implement Default for convenient creation of empty circuits.
impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper for constructing [`Circuit`] instances using method chaining.
///
/// The typed helpers cover the gate set directly; [`CircuitBuilder::build`]
/// validates the finished circuit, so a successfully built circuit is safe
/// to hand to any backend.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self { circuit: Circuit::new() }
    }

    /// Appends a raw instruction. Returns `self` for chaining.
    pub fn add(mut self, instruction: Instruction) -> Self {
        self.circuit.add_instruction(instruction);
        self
    }

    /// Applies `gate` to `target`.
    pub fn gate(self, target: QubitId, gate: Gate) -> Self {
        self.add(Instruction::Apply(Operation::Unitary { target, gate }))
    }

    /// Puts `target` into superposition (Hadamard).
    pub fn h(self, target: QubitId) -> Self {
        self.gate(target, Gate::H)
    }

    /// Bit-flips `target`.
    pub fn x(self, target: QubitId) -> Self {
        self.gate(target, Gate::X)
    }

    /// Phase-negates `target`.
    pub fn z(self, target: QubitId) -> Self {
        self.gate(target, Gate::Z)
    }

    /// Rotates the |1> phase of `target` by `theta` radians.
    pub fn phase(self, target: QubitId, theta: f64) -> Self {
        self.gate(target, Gate::PhaseShift { theta })
    }

    /// Applies `gate` to `target` conditioned on the given control qubits.
    pub fn controlled(self, controls: Vec<QubitId>, target: QubitId, gate: Gate) -> Self {
        self.add(Instruction::Apply(Operation::Controlled { controls, target, gate }))
    }

    /// Controlled bit flip (CNOT).
    pub fn cx(self, control: QubitId, target: QubitId) -> Self {
        self.controlled(vec![control], target, Gate::X)
    }

    /// Controlled phase negate (CZ).
    pub fn cz(self, control: QubitId, target: QubitId) -> Self {
        self.controlled(vec![control], target, Gate::Z)
    }

    /// Doubly-controlled phase negate (CCZ).
    pub fn ccz(self, control_a: QubitId, control_b: QubitId, target: QubitId) -> Self {
        self.controlled(vec![control_a, control_b], target, Gate::Z)
    }

    /// Measures `qubit` into the named classical register.
    pub fn measure(self, qubit: QubitId, register: &str) -> Self {
        self.add(Instruction::Measure { qubit, register: register.to_string() })
    }

    /// Applies `operation` only when `register` holds 1.
    pub fn when(self, register: &str, operation: Operation) -> Self {
        self.add(Instruction::Conditional { register: register.to_string(), operation })
    }

    /// Bit-flips `target` when `register` holds 1.
    pub fn x_if(self, register: &str, target: QubitId) -> Self {
        self.when(register, Operation::Unitary { target, gate: Gate::X })
    }

    /// Phase-negates `target` when `register` holds 1.
    pub fn z_if(self, register: &str, target: QubitId) -> Self {
        self.when(register, Operation::Unitary { target, gate: Gate::Z })
    }

    /// Finalizes construction, validating the circuit's structure.
    pub fn build(self) -> Result<Circuit, QrelayError> {
        self.circuit.validate()?;
        Ok(self.circuit)
    }
}

// Implement Default for convenient creation of builders.
impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Circuit {
    /// Renders the circuit as a plain-text gate grid, one row per qubit,
    /// one column per instruction. `@` marks a control, `M` a measurement,
    /// and a trailing `?` marks a classically-conditioned gate.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instructions.is_empty() {
            return writeln!(f, "qrelay::Circuit[0 instructions on 0 qubits]");
        }

        // --- Setup ---
        let instructions = &self.instructions;
        let num_cols = instructions.len();

        // Get sorted list of unique qubits and create row map
        let mut sorted_qubits: Vec<QubitId> = self.qubits.iter().cloned().collect();
        sorted_qubits.sort(); // Sort numerically for consistent row order
        let num_rows = sorted_qubits.len();
        let qubit_to_row: HashMap<QubitId, usize> =
            sorted_qubits.iter().enumerate().map(|(i, q)| (*q, i)).collect();

        // Determine label width
        let max_label_width = sorted_qubits.iter().map(|q| format!("{}", q).len()).max().unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2); // Label + ": "

        // Grid dimensions and padding
        const GATE_WIDTH: usize = 7; // e.g., "───H───"
        const WIRE: &str = "───────"; // GATE_WIDTH dashes
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // Initialize grids
        // op_grid[row][col] stores the gate/wire segment string
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_cols]; num_rows];
        // v_connect[row][col] stores the vertical connector char below this row at this column
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_cols]; num_rows];

        // Helper to format a gate symbol centered in a wire segment
        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        // Places one operation's symbols into column `t`, with `suffix`
        // marking classical conditioning
        let place_operation = |op: &Operation,
                                   t: usize,
                                   suffix: &str,
                                   op_grid: &mut Vec<Vec<String>>,
                                   v_connect: &mut Vec<Vec<char>>| {
            match op {
                Operation::Unitary { target, gate } => {
                    if *gate == Gate::I && suffix.is_empty() {
                        return; // Leave the bare wire for explicit identities
                    }
                    if let Some(r) = qubit_to_row.get(target) {
                        op_grid[*r][t] = format_gate(&format!("{}{}", gate, suffix));
                    }
                }
                Operation::Controlled { controls, target, gate } => {
                    let mut rows: Vec<usize> = Vec::new();
                    for control in controls {
                        if let Some(r) = qubit_to_row.get(control) {
                            op_grid[*r][t] = format_gate("@");
                            rows.push(*r);
                        }
                    }
                    if let Some(r) = qubit_to_row.get(target) {
                        op_grid[*r][t] = format_gate(&format!("{}{}", gate, suffix));
                        rows.push(*r);
                    }
                    if let (Some(r_min), Some(r_max)) = (rows.iter().min(), rows.iter().max()) {
                        for row_vec in v_connect.iter_mut().take(*r_max).skip(*r_min) {
                            row_vec[t] = V_WIRE;
                        }
                    }
                }
            }
        };

        // --- Populate Grids ---
        for (t, instruction) in instructions.iter().enumerate() {
            match instruction {
                Instruction::Apply(op) => {
                    place_operation(op, t, "", &mut op_grid, &mut v_connect)
                }
                Instruction::Conditional { operation, .. } => {
                    place_operation(operation, t, "?", &mut op_grid, &mut v_connect)
                }
                Instruction::Measure { qubit, .. } => {
                    if let Some(r) = qubit_to_row.get(qubit) {
                        op_grid[*r][t] = format_gate("M");
                    }
                }
            }
        }

        // --- Format Output String ---
        writeln!(f, "qrelay::Circuit[{} instructions on {} qubits]", num_cols, num_rows)?;
        for r in 0..num_rows {
            // Print qubit label row
            let label = format!("{}: ", sorted_qubits[r]);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            // Print vertical connector row (if not the last qubit)
            if r < num_rows - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_cols {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
