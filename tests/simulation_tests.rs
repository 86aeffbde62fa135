// tests/simulation_tests.rs

// Exercises the public simulation surface: circuit execution, state
// inspection, outcome bookkeeping, and capacity limits.

use num_complex::Complex;
use num_traits::Zero;
use qrelay::simulation::MAX_QUBITS;
use qrelay::{
    Backend, Circuit, CircuitBuilder, Gate, Operation, QrelayError, QubitId, Simulator,
    check_normalization,
};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

// Helper function to create QubitId for tests
fn qid(id: u64) -> QubitId {
    QubitId(id)
}

fn assert_amplitudes_close(actual: &[Complex<f64>], expected: &[Complex<f64>], context: &str) {
    assert_eq!(actual.len(), expected.len(), "dimension mismatch - {}", context);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).norm_sqr() < 1e-18,
            "amplitude mismatch at index {} - actual {}, expected {}, context: {}",
            i, a, e, context
        );
    }
}

#[test]
fn test_empty_circuit_runs_to_an_empty_record() -> Result<(), QrelayError> {
    let mut sim = Simulator::seeded(0);
    let record = sim.run(&Circuit::new())?;
    assert!(record.all_values().is_empty(), "empty circuit should record nothing");
    Ok(())
}

#[test]
fn test_identity_leaves_the_ground_state_alone() -> Result<(), QrelayError> {
    let circuit = CircuitBuilder::new().gate(qid(0), Gate::I).build()?;
    let mut sim = Simulator::seeded(0);
    let state = sim.statevector(&circuit)?;
    assert_amplitudes_close(
        state.vector(),
        &[Complex::new(1.0, 0.0), Complex::zero()],
        "I|0> = |0>",
    );
    Ok(())
}

#[test]
fn test_bell_circuit_statevector() -> Result<(), QrelayError> {
    let circuit = CircuitBuilder::new().h(qid(0)).cx(qid(0), qid(1)).build()?;
    let mut sim = Simulator::seeded(0);
    let state = sim.statevector(&circuit)?;
    let h = Complex::new(FRAC_1_SQRT_2, 0.0);
    assert_amplitudes_close(
        state.vector(),
        &[h, Complex::zero(), Complex::zero(), h],
        "(|00> + |11>)/sqrt(2)",
    );
    check_normalization(&state, None)?;
    Ok(())
}

#[test]
fn test_double_hadamard_interferes_back_to_zero() -> Result<(), QrelayError> {
    let circuit = CircuitBuilder::new()
        .h(qid(0))
        .h(qid(0))
        .measure(qid(0), "m")
        .build()?;
    let mut sim = Simulator::seeded(99);
    let result = sim.execute(&circuit, 256)?;
    assert_eq!(result.count_of("0"), 256, "H then H must cancel exactly");
    Ok(())
}

#[test]
fn test_phase_shift_redirects_interference() -> Result<(), QrelayError> {
    // H, P(pi), H maps |0> to |1>: the pi phase flips the cancellation.
    let circuit = CircuitBuilder::new()
        .h(qid(0))
        .phase(qid(0), PI)
        .h(qid(0))
        .measure(qid(0), "m")
        .build()?;
    let mut sim = Simulator::seeded(99);
    let result = sim.execute(&circuit, 256)?;
    assert_eq!(result.count_of("1"), 256, "H-P(pi)-H must land on |1>");
    Ok(())
}

#[test]
fn test_bell_pair_measurements_always_agree() -> Result<(), QrelayError> {
    let circuit = CircuitBuilder::new()
        .h(qid(0))
        .cx(qid(0), qid(1))
        .measure(qid(0), "a")
        .measure(qid(1), "b")
        .build()?;
    let mut sim = Simulator::seeded(13);
    let result = sim.execute(&circuit, 512)?;
    assert_eq!(result.count_of("01"), 0);
    assert_eq!(result.count_of("10"), 0);
    assert_eq!(result.count_of("00") + result.count_of("11"), 512);
    // Each side alone is a fair coin; both outcomes must show up.
    assert!(result.count_of("00") > 0);
    assert!(result.count_of("11") > 0);
    Ok(())
}

#[test]
fn test_ccz_marks_only_the_all_ones_state() -> Result<(), QrelayError> {
    // CCZ negates exactly the |111> amplitude; |110> is untouched.
    let circuit = CircuitBuilder::new()
        .x(qid(0))
        .x(qid(1))
        .x(qid(2))
        .ccz(qid(0), qid(1), qid(2))
        .build()?;
    let mut sim = Simulator::seeded(0);
    let state = sim.statevector(&circuit)?;
    let mut expected = vec![Complex::zero(); 8];
    expected[7] = Complex::new(-1.0, 0.0);
    assert_amplitudes_close(state.vector(), &expected, "CCZ|111> = -|111>");

    let circuit = CircuitBuilder::new()
        .x(qid(0))
        .x(qid(1))
        .ccz(qid(0), qid(1), qid(2))
        .build()?;
    let state = sim.statevector(&circuit)?;
    let mut expected = vec![Complex::zero(); 8];
    expected[6] = Complex::new(1.0, 0.0);
    assert_amplitudes_close(state.vector(), &expected, "CCZ|110> = |110>");
    Ok(())
}

#[test]
fn test_conditional_consults_the_register() -> Result<(), QrelayError> {
    let mut sim = Simulator::seeded(4);

    let circuit = CircuitBuilder::new()
        .x(qid(0))
        .measure(qid(0), "c")
        .x_if("c", qid(1))
        .measure(qid(1), "out")
        .build()?;
    let record = sim.run(&circuit)?;
    assert_eq!(record.value("out")?, 1);

    let circuit = CircuitBuilder::new()
        .measure(qid(0), "c")
        .x_if("c", qid(1))
        .measure(qid(1), "out")
        .build()?;
    let record = sim.run(&circuit)?;
    assert_eq!(record.value("out")?, 0);
    Ok(())
}

#[test]
fn test_conditional_before_measurement_is_rejected() {
    let circuit = CircuitBuilder::new()
        .x_if("c", qid(1))
        .measure(qid(0), "c")
        .build();
    assert!(matches!(circuit, Err(QrelayError::InvalidCircuit { .. })));
}

#[test]
fn test_duplicate_register_is_rejected() {
    let circuit = CircuitBuilder::new()
        .measure(qid(0), "m")
        .measure(qid(1), "m")
        .build();
    assert!(matches!(circuit, Err(QrelayError::InvalidCircuit { .. })));
}

#[test]
fn test_missing_register_lookup_errors() -> Result<(), QrelayError> {
    let circuit = CircuitBuilder::new().measure(qid(0), "m").build()?;
    let mut sim = Simulator::seeded(0);
    let record = sim.run(&circuit)?;
    assert!(matches!(
        record.value("absent"),
        Err(QrelayError::MissingRegister { .. })
    ));
    Ok(())
}

#[test]
fn test_capacity_cap_applies_through_the_backend_trait() -> Result<(), QrelayError> {
    let mut builder = CircuitBuilder::new();
    for id in 0..(MAX_QUBITS as u64 + 1) {
        builder = builder.x(qid(id));
    }
    let circuit = builder.build()?;

    let mut sim = Simulator::seeded(0);
    assert_eq!(Backend::max_qubits(&sim), MAX_QUBITS);
    match Backend::execute(&mut sim, &circuit, 1) {
        Err(QrelayError::CapacityExceeded { requested, limit }) => {
            assert_eq!(requested, MAX_QUBITS + 1);
            assert_eq!(limit, MAX_QUBITS);
        }
        other => panic!("expected CapacityExceeded, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_seeded_execution_is_reproducible() -> Result<(), QrelayError> {
    let circuit = CircuitBuilder::new()
        .h(qid(0))
        .h(qid(1))
        .measure(qid(0), "a")
        .measure(qid(1), "b")
        .build()?;
    let result_a = Simulator::seeded(314).execute(&circuit, 200)?;
    let result_b = Simulator::seeded(314).execute(&circuit, 200)?;
    assert_eq!(result_a, result_b);
    Ok(())
}

#[test]
fn test_outcome_keys_concatenate_registers_in_declaration_order() -> Result<(), QrelayError> {
    let circuit = CircuitBuilder::new()
        .x(qid(1))
        .measure(qid(1), "second")
        .measure(qid(0), "first")
        .build()?;
    let mut sim = Simulator::seeded(0);
    let result = sim.execute(&circuit, 16)?;
    assert_eq!(result.register_order(), ["second".to_string(), "first".to_string()]);
    assert_eq!(result.count_of("10"), 16);
    assert_eq!(result.register_bit("10", "second"), Some(1));
    assert_eq!(result.register_bit("10", "first"), Some(0));
    Ok(())
}

#[test]
fn test_controlled_gate_with_identity_control_is_inert() -> Result<(), QrelayError> {
    // Applying a controlled X from an untouched |0> control must leave the
    // target alone, whatever gate the operation carries.
    let op = Operation::Controlled {
        controls: vec![qid(0)],
        target: qid(1),
        gate: Gate::X,
    };
    let circuit = CircuitBuilder::new()
        .add(qrelay::Instruction::Apply(op))
        .measure(qid(1), "t")
        .build()?;
    let mut sim = Simulator::seeded(8);
    assert_eq!(sim.run(&circuit)?.value("t")?, 0);
    Ok(())
}
