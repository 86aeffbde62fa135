// src/search/mod.rs

//! Satisfiability search via amplitude amplification (Grover's algorithm).
//!
//! A [`CnfFormula`] is a conjunction of clauses over a handful of boolean
//! variables; [`grover_circuit`] compiles it into a search circuit that
//! amplifies the amplitudes of satisfying assignments, and [`solve`] runs
//! that circuit on a backend and reads off the modal outcome. These
//! formulas are deliberately tiny (one qubit per variable), so satisfying
//! assignments are also enumerable classically; the classical enumeration
//! is what the oracle construction and the tests are grounded in.

use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::{QrelayError, QubitId};
use crate::operations::Gate;
use crate::simulation::Backend;
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

/// One literal of a clause: a variable index plus its polarity.
/// `positive` means the literal is satisfied when the variable is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    /// Zero-based variable index.
    pub variable: usize,
    /// `true` for `x`, `false` for `¬x`.
    pub positive: bool,
}

impl Literal {
    /// The positive literal `x_variable`.
    pub fn pos(variable: usize) -> Self {
        Self { variable, positive: true }
    }

    /// The negated literal `¬x_variable`.
    pub fn neg(variable: usize) -> Self {
        Self { variable, positive: false }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", if self.positive { "" } else { "!" }, self.variable)
    }
}

/// A disjunction of literals. Satisfied when at least one literal holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    /// Builds a clause from its literals. An empty clause is permitted and
    /// is unsatisfiable, making the whole formula unsatisfiable.
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    /// The literals of this clause.
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Evaluates the clause under an assignment (index = variable).
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        self.literals
            .iter()
            .any(|lit| assignment.get(lit.variable).copied().unwrap_or(false) == lit.positive)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, lit) in self.literals.iter().enumerate() {
            write!(f, "{}{}", if i > 0 { " | " } else { "" }, lit)?;
        }
        write!(f, ")")
    }
}

/// A conjunctive-normal-form formula over `num_variables` booleans.
///
/// Assignment labels put variable `x0` leftmost, matching the outcome-key
/// convention of the search circuit (qubit `i` carries variable `x_i` and
/// is measured into register `x{i}`, registers declared in index order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnfFormula {
    num_variables: usize,
    clauses: Vec<Clause>,
}

impl CnfFormula {
    /// Builds a formula over the given number of variables.
    ///
    /// # Errors
    /// [`QrelayError::InvalidCircuit`] if there are zero variables or a
    /// clause mentions a variable index out of range.
    pub fn new(num_variables: usize, clauses: Vec<Clause>) -> Result<Self, QrelayError> {
        if num_variables == 0 {
            return Err(QrelayError::InvalidCircuit {
                message: "a formula needs at least one variable".to_string(),
            });
        }
        for clause in &clauses {
            for lit in clause.literals() {
                if lit.variable >= num_variables {
                    return Err(QrelayError::InvalidCircuit {
                        message: format!(
                            "literal {} out of range for {} variables",
                            lit, num_variables
                        ),
                    });
                }
            }
        }
        Ok(Self { num_variables, clauses })
    }

    /// Number of boolean variables.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// The clauses of this formula.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Evaluates the formula under an assignment (index = variable).
    /// An empty clause list is vacuously true.
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        self.clauses.iter().all(|clause| clause.evaluate(assignment))
    }

    /// Enumerates every satisfying assignment, in ascending order of the
    /// `x0`-leftmost bit pattern. Exhaustive over all `2^n` assignments;
    /// these formulas are small by construction.
    pub fn satisfying_assignments(&self) -> Vec<Vec<bool>> {
        let n = self.num_variables;
        let mut satisfying = Vec::new();
        for pattern in 0u64..(1u64 << n) {
            // Bit n-1-i of the pattern holds x_i, so x0 is leftmost.
            let assignment: Vec<bool> =
                (0..n).map(|i| (pattern >> (n - 1 - i)) & 1 == 1).collect();
            if self.evaluate(&assignment) {
                satisfying.push(assignment);
            }
        }
        satisfying
    }
}

impl fmt::Display for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "true [over {} vars]", self.num_variables);
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            write!(f, "{}{}", if i > 0 { " & " } else { "" }, clause)?;
        }
        Ok(())
    }
}

/// Renders an assignment as its bit pattern, `x0` leftmost.
pub fn assignment_label(assignment: &[bool]) -> String {
    assignment.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// The number of amplification iterations that brings the marked
/// amplitudes closest to their peak without overshooting:
/// `floor(pi/4 * sqrt(N / M))`, minimum 1.
///
/// Flooring matters at small sizes. For `N = 4, M = 1` the exact optimum
/// is one iteration (success probability 1.0); rounding up to two drives
/// the probability back down to 0.25.
pub fn optimal_iterations(num_states: usize, num_marked: usize) -> usize {
    if num_marked == 0 || num_states == 0 {
        return 0;
    }
    let ratio = num_states as f64 / num_marked as f64;
    let optimal = (PI / 4.0 * ratio.sqrt()).floor() as usize;
    optimal.max(1)
}

/// Compiles a formula into its Grover search circuit.
///
/// Layout: qubit `i` carries variable `x_i`, measured at the end into
/// register `x{i}`, registers in index order (so outcome keys read as
/// assignment labels, `x0` leftmost).
///
/// Structure: uniform superposition over all assignments, then per
/// iteration a phase oracle followed by the diffusion operator. The
/// oracle negates the amplitude of each satisfying assignment by
/// conjugating a multi-controlled Z with X gates on the variables the
/// assignment sets false; the diffusion operator is the standard
/// H/X-conjugated multi-controlled Z on all qubits.
///
/// # Errors
/// [`QrelayError::InvalidCircuit`] if the formula is unsatisfiable (the
/// oracle would mark nothing and the circuit would amplify nothing).
pub fn grover_circuit(formula: &CnfFormula, iterations: usize) -> Result<Circuit, QrelayError> {
    let marked = formula.satisfying_assignments();
    if marked.is_empty() {
        return Err(QrelayError::InvalidCircuit {
            message: format!("formula {} has no satisfying assignment to amplify", formula),
        });
    }

    let n = formula.num_variables();
    let qubits: Vec<QubitId> = (0..n as u64).map(QubitId).collect();

    let mut builder = CircuitBuilder::new();

    // Uniform superposition over all 2^n assignments.
    for &q in &qubits {
        builder = builder.h(q);
    }

    for _ in 0..iterations {
        // Phase oracle: one X-sandwiched multi-controlled Z per satisfying
        // assignment.
        for assignment in &marked {
            builder = x_sandwich(builder, &qubits, assignment);
            builder = multi_controlled_z(builder, &qubits);
            builder = x_sandwich(builder, &qubits, assignment);
        }

        // Diffusion operator: reflect about the uniform state.
        let all_false = vec![false; n];
        for &q in &qubits {
            builder = builder.h(q);
        }
        builder = x_sandwich(builder, &qubits, &all_false);
        builder = multi_controlled_z(builder, &qubits);
        builder = x_sandwich(builder, &qubits, &all_false);
        for &q in &qubits {
            builder = builder.h(q);
        }
    }

    for (i, &q) in qubits.iter().enumerate() {
        builder = builder.measure(q, &format!("x{}", i));
    }

    builder.build()
}

// X on every qubit the assignment sets false, mapping the target bit
// pattern onto |1...1> before a multi-controlled Z and back after it.
fn x_sandwich(
    mut builder: CircuitBuilder,
    qubits: &[QubitId],
    assignment: &[bool],
) -> CircuitBuilder {
    for (&q, &bit) in qubits.iter().zip(assignment) {
        if !bit {
            builder = builder.x(q);
        }
    }
    builder
}

// Z conditioned on every other qubit; plain Z for a single qubit.
fn multi_controlled_z(builder: CircuitBuilder, qubits: &[QubitId]) -> CircuitBuilder {
    match qubits.split_last() {
        Some((&target, [])) => builder.z(target),
        Some((&target, controls)) => builder.controlled(controls.to_vec(), target, Gate::Z),
        None => builder,
    }
}

/// The outcome of one [`solve`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    formula_text: String,
    satisfiable: bool,
    assignment: Option<String>,
    count: u64,
    shots: u64,
    iterations: usize,
}

impl SearchOutcome {
    /// Whether the formula has any satisfying assignment at all.
    pub fn satisfiable(&self) -> bool {
        self.satisfiable
    }

    /// The modal assignment label (`x0` leftmost), if satisfiable.
    pub fn assignment(&self) -> Option<&str> {
        self.assignment.as_deref()
    }

    /// How many shots produced the modal assignment.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Total shots executed (zero for unsatisfiable formulas, which never
    /// reach the backend).
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Amplification iterations the circuit ran.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.assignment {
            Some(label) => write!(
                f,
                "{} satisfied by {} ({}/{} shots, {} iterations)",
                self.formula_text, label, self.count, self.shots, self.iterations
            ),
            None => write!(f, "{} is unsatisfiable", self.formula_text),
        }
    }
}

/// Searches for a satisfying assignment of `formula` on the given backend.
///
/// Builds the Grover circuit with the optimal iteration count, executes it
/// for `shots` shots, and reports the most frequent assignment. An
/// unsatisfiable formula is detected up front and reported without running
/// any circuit.
pub fn solve<B: Backend>(
    formula: &CnfFormula,
    backend: &mut B,
    shots: u64,
) -> Result<SearchOutcome, QrelayError> {
    let marked = formula.satisfying_assignments();
    if marked.is_empty() {
        debug!("formula {} is unsatisfiable, skipping execution", formula);
        return Ok(SearchOutcome {
            formula_text: formula.to_string(),
            satisfiable: false,
            assignment: None,
            count: 0,
            shots: 0,
            iterations: 0,
        });
    }

    let num_states = 1usize << formula.num_variables();
    let iterations = optimal_iterations(num_states, marked.len());
    let circuit = grover_circuit(formula, iterations)?;
    debug!(
        "searching {} ({} marked of {} states, {} iterations) on backend '{}'",
        formula,
        marked.len(),
        num_states,
        iterations,
        backend.name()
    );

    let result = backend.execute(&circuit, shots)?;
    let (assignment, count) = result
        .counts()
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(outcome, count)| (outcome.clone(), *count))
        .ok_or_else(|| QrelayError::ExecutionFailure {
            message: "backend returned no outcomes for the search circuit".to_string(),
        })?;

    Ok(SearchOutcome {
        formula_text: formula.to_string(),
        satisfiable: true,
        assignment: Some(assignment),
        count,
        shots,
        iterations,
    })
}
