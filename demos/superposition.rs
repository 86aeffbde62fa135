//! Superposition and interference on a single qubit.
//!
//! First half: H puts a qubit into an equal superposition, so measuring it
//! over many shots gives a roughly 50/50 split. Second half: a second H
//! undoes the first unless a phase rotation sits between them, showing
//! that the amplitudes carry phase, not just probability.

use qrelay::{CircuitBuilder, QubitId, Simulator};
use std::f64::consts::PI;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- qrelay: superposition and interference ---\n");

    let q0 = QubitId(0);
    let mut sim = Simulator::new();
    let shots = 1024;

    // 1. A fair quantum coin: H then measure.
    let coin = CircuitBuilder::new()
        .h(q0)
        .measure(q0, "m")
        .build()?;
    println!("Fair coin circuit:\n{}", coin);
    let result = sim.execute(&coin, shots)?;
    println!("{}", result);
    println!("Roughly half the shots read 0 and half read 1.\n");

    // 2. Constructive interference: H then H returns to |0> exactly.
    let identity = CircuitBuilder::new()
        .h(q0)
        .h(q0)
        .measure(q0, "m")
        .build()?;
    let result = sim.execute(&identity, shots)?;
    println!("H then H:\n{}", result);
    assert_eq!(result.count_of("0"), shots);
    println!("Every shot reads 0: the two paths to |1> cancelled.\n");

    // 3. A pi phase between the two H gates flips the cancellation.
    let flipped = CircuitBuilder::new()
        .h(q0)
        .phase(q0, PI)
        .h(q0)
        .measure(q0, "m")
        .build()?;
    let result = sim.execute(&flipped, shots)?;
    println!("H, P(pi), H:\n{}", result);
    assert_eq!(result.count_of("1"), shots);
    println!("Every shot reads 1: the phase rotation redirected the interference.");
    Ok(())
}
