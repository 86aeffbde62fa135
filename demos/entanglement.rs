//! Entanglement: preparing and measuring a Bell pair.
//!
//! H on one qubit followed by CX onto another yields the correlated pair
//! the teleportation relay is built on. Each qubit alone measures as a
//! fair coin, yet the two always agree.

use qrelay::{CircuitBuilder, QubitId, Simulator};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- qrelay: Bell pair correlations ---\n");

    let q0 = QubitId(0);
    let q1 = QubitId(1);
    let shots = 1024;

    let circuit = CircuitBuilder::new()
        .h(q0)
        .cx(q0, q1)
        .measure(q0, "a")
        .measure(q1, "b")
        .build()?;
    println!("Bell pair circuit:\n{}", circuit);

    // The pre-measurement state is (|00> + |11>)/sqrt(2).
    let mut sim = Simulator::new();
    let bell = CircuitBuilder::new().h(q0).cx(q0, q1).build()?;
    println!("Joint state before measuring:\n{}\n", sim.statevector(&bell)?);

    let result = sim.execute(&circuit, shots)?;
    println!("{}", result);

    let agree = result.count_of("00") + result.count_of("11");
    let disagree = result.count_of("01") + result.count_of("10");
    assert_eq!(agree, shots);
    assert_eq!(disagree, 0);
    println!("The two registers agreed on all {} shots;", shots);
    println!("each alone is a fair coin, but measuring one fixes the other.");
    Ok(())
}
