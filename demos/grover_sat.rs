//! Satisfiability search with amplitude amplification.
//!
//! Builds a small CNF formula, compiles it into a Grover circuit, and
//! finds its satisfying assignment as the modal measurement outcome.

use qrelay::search::{self, assignment_label, grover_circuit, optimal_iterations};
use qrelay::{Clause, CnfFormula, Literal, Simulator};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- qrelay: satisfiability search ---\n");

    // (x0 | x1) & (!x0 | x2) & (x1) & (!x2 | x1)
    // over three variables; three of the eight assignments satisfy it.
    let formula = CnfFormula::new(3, vec![
        Clause::new(vec![Literal::pos(0), Literal::pos(1)]),
        Clause::new(vec![Literal::neg(0), Literal::pos(2)]),
        Clause::new(vec![Literal::pos(1)]),
        Clause::new(vec![Literal::neg(2), Literal::pos(1)]),
    ])?;
    println!("Formula: {}", formula);

    let marked = formula.satisfying_assignments();
    println!("Satisfying assignments (classical enumeration, x0 leftmost):");
    for assignment in &marked {
        println!("  {}", assignment_label(assignment));
    }

    let num_states = 1usize << formula.num_variables();
    let iterations = optimal_iterations(num_states, marked.len());
    println!(
        "\n{} marked of {} states -> {} amplification iteration(s)",
        marked.len(),
        num_states,
        iterations
    );
    println!("Search circuit:\n{}", grover_circuit(&formula, iterations)?);

    let mut sim = Simulator::new();
    let outcome = search::solve(&formula, &mut sim, 512)?;
    println!("{}", outcome);

    let found = outcome.assignment().expect("formula is satisfiable");
    let as_bools: Vec<bool> = found.chars().map(|c| c == '1').collect();
    assert!(formula.evaluate(&as_bools), "modal outcome must satisfy the formula");
    println!("\nThe modal outcome satisfies the formula.");
    Ok(())
}
