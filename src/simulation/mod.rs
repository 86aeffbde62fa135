// src/simulation/mod.rs

//! Executes circuits on the bundled state-vector simulator.
//! This module contains the `Simulator` entry point, the [`Backend`] trait
//! it implements, and the internal `SimulationEngine` responsible for
//! evolving and collapsing the joint state.

// Make engine module crate visible for tests
pub(crate) mod engine;
mod backend;
mod results;

// Re-export the main public interface types
pub use backend::Backend;
pub use results::{ExecutionResult, RunRecord};

use crate::circuits::{Circuit, Instruction};
use crate::core::{QrelayError, StateVector};
use crate::validation;
use engine::SimulationEngine;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;
use tracing::{debug, trace};

/// Largest number of qubits one circuit may involve on the bundled
/// simulator. 2^20 amplitudes (~16 MiB) keeps worst-case allocations sane.
pub const MAX_QUBITS: usize = 20;

/// The bundled circuit executor: an ideal, noiseless state-vector
/// simulator with an explicitly owned pseudo-random source driving
/// measurement collapse.
///
/// Construct with [`Simulator::seeded`] for reproducible runs (identical
/// seed, circuit and shot count give identical results) or
/// [`Simulator::new`] for OS entropy.
pub struct Simulator {
    /// Source of measurement randomness. Owned and explicit; never a
    /// thread-local.
    rng: StdRng,
    max_qubits: usize,
}

impl Simulator {
    /// Creates a simulator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            max_qubits: MAX_QUBITS,
        }
    }

    /// Creates a simulator with a fixed seed. Every measurement outcome
    /// becomes a deterministic function of the seed and the circuits run.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_qubits: MAX_QUBITS,
        }
    }

    /// Runs a single shot of the circuit.
    ///
    /// Executes the instruction sequence in order: unitaries evolve the
    /// state, measurements collapse it and fill classical registers,
    /// conditionals consult those registers. Returns the registers the
    /// shot recorded.
    ///
    /// # Errors
    /// Structural problems surface as [`QrelayError::InvalidCircuit`],
    /// oversized circuits as [`QrelayError::CapacityExceeded`].
    pub fn run(&mut self, circuit: &Circuit) -> Result<RunRecord, QrelayError> {
        circuit.validate()?;
        // Handle empty circuit case
        if circuit.is_empty() {
            return Ok(RunRecord::new());
        }
        let (_, record) = self.run_engine(circuit)?;
        Ok(record)
    }

    /// Executes `shots` independent runs and aggregates outcome counts.
    ///
    /// Each shot starts from `|0...0>`; the outcome key concatenates
    /// register values in the circuit's declaration order.
    pub fn execute(&mut self, circuit: &Circuit, shots: u64) -> Result<ExecutionResult, QrelayError> {
        circuit.validate()?;
        let started = Instant::now();
        let mut result = ExecutionResult::new(shots, circuit.registers().to_vec());

        if circuit.is_empty() {
            for _ in 0..shots {
                result.tally(String::new());
            }
            return Ok(result);
        }

        for _ in 0..shots {
            let (_, record) = self.run_engine(circuit)?;
            let mut key = String::with_capacity(circuit.registers().len());
            for name in circuit.registers() {
                let bit = record.value(name)?;
                key.push(char::from(b'0' + bit));
            }
            result.tally(key);
        }

        debug!(
            "executed {} shots on {} qubits in {:?} ({} distinct outcomes)",
            shots,
            circuit.num_qubits(),
            started.elapsed(),
            result.counts().len()
        );
        Ok(result)
    }

    /// Runs a single shot and returns the final joint state instead of the
    /// register record. Measurements still collapse the state, so on a
    /// measurement-free circuit this is the exact pre-measurement
    /// amplitude vector.
    pub fn statevector(&mut self, circuit: &Circuit) -> Result<StateVector, QrelayError> {
        circuit.validate()?;
        if circuit.is_empty() {
            return Err(QrelayError::InvalidCircuit {
                message: "cannot take the state of an empty circuit".to_string(),
            });
        }
        let (engine, _) = self.run_engine(circuit)?;
        Ok(engine.state().clone())
    }

    /// Shared single-shot executor. Assumes the circuit is validated and
    /// non-empty.
    fn run_engine(&mut self, circuit: &Circuit) -> Result<(SimulationEngine, RunRecord), QrelayError> {
        if circuit.num_qubits() > self.max_qubits {
            return Err(QrelayError::CapacityExceeded {
                requested: circuit.num_qubits(),
                limit: self.max_qubits,
            });
        }

        let mut engine = SimulationEngine::init(circuit.qubits())?;
        let mut record = RunRecord::new();

        for instruction in circuit.instructions() {
            match instruction {
                Instruction::Apply(op) => engine.apply_operation(op)?,
                Instruction::Measure { qubit, register } => {
                    let outcome = engine.measure(*qubit, &mut self.rng)?;
                    trace!("measured {} -> {} = {}", qubit, register, outcome);
                    record.record(register.clone(), outcome);
                }
                Instruction::Conditional { register, operation } => {
                    if record.value(register)? == 1 {
                        trace!("register {} = 1, applying conditioned operation", register);
                        engine.apply_operation(operation)?;
                    }
                }
            }
        }

        // The engine renormalizes after every collapse; a drifting norm
        // here means a gate matrix was not unitary.
        validation::check_normalization(engine.state(), None)?;

        Ok((engine, record))
    }
}

// Default simulator draws its seed from OS entropy.
impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    // Import items from the parent module (simulation) and the crate root
    use super::*;
    use super::engine::SimulationEngine;
    use crate::circuits::CircuitBuilder;
    use crate::core::{QubitId, StateVector};
    use num_complex::Complex;
    use num_traits::Zero;
    use std::collections::HashSet;
    use std::f64::consts::FRAC_1_SQRT_2;

    const TEST_TOLERANCE: f64 = 1e-9;

    // --- Helper Functions ---
    fn qid(id: u64) -> QubitId {
        QubitId(id)
    }

    fn qubit_set(ids: &[u64]) -> HashSet<QubitId> {
        ids.iter().map(|id| qid(*id)).collect()
    }

    /// Asserts that two complex state vectors are approximately equal component-wise.
    /// Panics if lengths differ or if the squared distance between any pair
    /// of complex components exceeds tolerance * tolerance.
    fn assert_complex_vec_approx_equal(
        actual: &[Complex<f64>],
        expected: &[Complex<f64>],
        tolerance: f64,
        context: &str,
    ) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for i in 0..actual.len() {
            let diff = actual[i] - expected[i];
            let dist_sq = diff.norm_sqr();
            assert!(
                dist_sq < tolerance * tolerance,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, DistSq: {:.3e}, Context: {}",
                i, actual[i], expected[i], dist_sq, context
            );
        }
    }

    #[test]
    fn test_hadamard_creates_equal_superposition() -> Result<(), QrelayError> {
        let mut engine = SimulationEngine::init(&qubit_set(&[0]))?;
        engine.apply_operation(&crate::operations::Operation::Unitary {
            target: qid(0),
            gate: crate::operations::Gate::H,
        })?;

        let expected = vec![
            Complex::new(FRAC_1_SQRT_2, 0.0),
            Complex::new(FRAC_1_SQRT_2, 0.0),
        ];
        assert_complex_vec_approx_equal(
            engine.state().vector(),
            &expected,
            TEST_TOLERANCE,
            "H|0> should be an equal superposition",
        );
        Ok(())
    }

    #[test]
    fn test_bell_state_amplitudes() -> Result<(), QrelayError> {
        // H on q0 then CX(q0 -> q1) from |00> yields (|00> + |11>)/sqrt(2)
        let mut engine = SimulationEngine::init(&qubit_set(&[0, 1]))?;
        engine.apply_operation(&crate::operations::Operation::Unitary {
            target: qid(0),
            gate: crate::operations::Gate::H,
        })?;
        engine.apply_operation(&crate::operations::Operation::Controlled {
            controls: vec![qid(0)],
            target: qid(1),
            gate: crate::operations::Gate::X,
        })?;

        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        let expected = vec![h, Complex::zero(), Complex::zero(), h];
        assert_complex_vec_approx_equal(
            engine.state().vector(),
            &expected,
            TEST_TOLERANCE,
            "Bell pair preparation",
        );
        Ok(())
    }

    #[test]
    fn test_measure_basis_state_is_deterministic() -> Result<(), QrelayError> {
        // In |01>, q0 must read 0 and q1 must read 1 whatever the rng does
        let mut engine = SimulationEngine::init(&qubit_set(&[0, 1]))?;
        let state_vec_01 = vec![
            Complex::zero(), Complex::new(1.0, 0.0), // Index 1 = |01>
            Complex::zero(), Complex::zero(),
        ];
        engine.set_state(StateVector::new(state_vec_01))?;

        let mut rng = StdRng::seed_from_u64(12345);
        assert_eq!(engine.measure(qid(0), &mut rng)?, 0);
        assert_eq!(engine.measure(qid(1), &mut rng)?, 1);
        Ok(())
    }

    #[test]
    fn test_measure_collapses_superposition() -> Result<(), QrelayError> {
        for seed in [1u64, 7, 42, 1999] {
            let mut engine = SimulationEngine::init(&qubit_set(&[0]))?;
            engine.set_state(StateVector::new(vec![
                Complex::new(FRAC_1_SQRT_2, 0.0),
                Complex::new(FRAC_1_SQRT_2, 0.0),
            ]))?;

            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = engine.measure(qid(0), &mut rng)?;
            assert!(outcome <= 1, "measurement must yield a bit");

            // Post-measurement state must be the matching basis vector
            let mut expected = vec![Complex::zero(), Complex::zero()];
            expected[outcome as usize] = Complex::new(1.0, 0.0);
            assert_complex_vec_approx_equal(
                engine.state().vector(),
                &expected,
                TEST_TOLERANCE,
                &format!("collapse after measuring {} (seed {})", outcome, seed),
            );
        }
        Ok(())
    }

    #[test]
    fn test_conditional_applies_only_on_one() -> Result<(), QrelayError> {
        // X(q0); measure q0 -> c; X on q1 if c; measure q1 -> out
        let circuit = CircuitBuilder::new()
            .x(qid(0))
            .measure(qid(0), "c")
            .x_if("c", qid(1))
            .measure(qid(1), "out")
            .build()?;
        let mut sim = Simulator::seeded(7);
        let record = sim.run(&circuit)?;
        assert_eq!(record.value("c")?, 1);
        assert_eq!(record.value("out")?, 1);

        // Without the initial X the condition never fires
        let circuit = CircuitBuilder::new()
            .measure(qid(0), "c")
            .x_if("c", qid(1))
            .measure(qid(1), "out")
            .build()?;
        let record = sim.run(&circuit)?;
        assert_eq!(record.value("c")?, 0);
        assert_eq!(record.value("out")?, 0);
        Ok(())
    }

    #[test]
    fn test_controlled_gate_respects_control_value() -> Result<(), QrelayError> {
        // CX fires when the control is |1>...
        let circuit = CircuitBuilder::new()
            .x(qid(0))
            .cx(qid(0), qid(1))
            .measure(qid(1), "t")
            .build()?;
        let mut sim = Simulator::seeded(3);
        assert_eq!(sim.run(&circuit)?.value("t")?, 1);

        // ...and stays inert when it is |0>
        let circuit = CircuitBuilder::new()
            .cx(qid(0), qid(1))
            .measure(qid(1), "t")
            .build()?;
        assert_eq!(sim.run(&circuit)?.value("t")?, 0);
        Ok(())
    }

    #[test]
    fn test_empty_circuit_yields_empty_record() -> Result<(), QrelayError> {
        let mut sim = Simulator::seeded(0);
        let record = sim.run(&Circuit::new())?;
        assert!(record.all_values().is_empty());
        Ok(())
    }

    #[test]
    fn test_capacity_limit_is_enforced() -> Result<(), QrelayError> {
        // One qubit past the cap; building the circuit is cheap since no
        // state is allocated until execution.
        let mut builder = CircuitBuilder::new();
        for id in 0..(MAX_QUBITS as u64 + 1) {
            builder = builder.x(qid(id));
        }
        let circuit = builder.build()?;
        let mut sim = Simulator::seeded(0);
        match sim.run(&circuit) {
            Err(QrelayError::CapacityExceeded { requested, limit }) => {
                assert_eq!(requested, MAX_QUBITS + 1);
                assert_eq!(limit, MAX_QUBITS);
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_execute_counts_sum_to_shots() -> Result<(), QrelayError> {
        let circuit = CircuitBuilder::new()
            .h(qid(0))
            .measure(qid(0), "m")
            .build()?;
        let mut sim = Simulator::seeded(11);
        let result = sim.execute(&circuit, 100)?;
        assert_eq!(result.shots(), 100);
        let total: u64 = result.counts().values().sum();
        assert_eq!(total, 100);
        // Both outcomes should appear over 100 fair-coin shots
        assert!(result.count_of("0") > 0, "no zeros in 100 shots of H|0>");
        assert!(result.count_of("1") > 0, "no ones in 100 shots of H|0>");
        Ok(())
    }

    #[test]
    fn test_execute_is_deterministic_for_a_seed() -> Result<(), QrelayError> {
        let circuit = CircuitBuilder::new()
            .h(qid(0))
            .cx(qid(0), qid(1))
            .measure(qid(0), "a")
            .measure(qid(1), "b")
            .build()?;

        let result_a = Simulator::seeded(42).execute(&circuit, 64)?;
        let result_b = Simulator::seeded(42).execute(&circuit, 64)?;
        assert_eq!(result_a, result_b, "identical seeds must reproduce identical counts");
        Ok(())
    }

    #[test]
    fn test_outcome_keys_follow_register_declaration_order() -> Result<(), QrelayError> {
        // q1 measured first, so its register leads the outcome key
        let circuit = CircuitBuilder::new()
            .x(qid(0))
            .measure(qid(1), "b")
            .measure(qid(0), "a")
            .build()?;
        let mut sim = Simulator::seeded(5);
        let result = sim.execute(&circuit, 8)?;
        assert_eq!(result.register_order(), ["b".to_string(), "a".to_string()]);
        assert_eq!(result.count_of("01"), 8);
        assert_eq!(result.register_bit("01", "a"), Some(1));
        assert_eq!(result.register_bit("01", "b"), Some(0));
        Ok(())
    }

    #[test]
    fn test_statevector_of_bell_circuit() -> Result<(), QrelayError> {
        let circuit = CircuitBuilder::new()
            .h(qid(0))
            .cx(qid(0), qid(1))
            .build()?;
        let mut sim = Simulator::seeded(0);
        let state = sim.statevector(&circuit)?;
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        assert_complex_vec_approx_equal(
            state.vector(),
            &[h, Complex::zero(), Complex::zero(), h],
            TEST_TOLERANCE,
            "statevector of the Bell circuit",
        );
        Ok(())
    }
}
