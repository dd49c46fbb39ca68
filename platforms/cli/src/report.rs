//! Plain-text rendering of a search outcome.

use std::fmt::Write;
use wtur::{Machine, Outcome, SearchStats};

/// Renders `outcome` as a human-readable report: the final tape, one line per edge of
/// the path, the total cost, and the search counters.
pub fn render(machine: &Machine, outcome: &Outcome, stats: &SearchStats) -> String {
    let mut out = String::new();
    let tape: String = machine.initial_tape().iter().collect();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Program: {}", machine.name());
    let _ = writeln!(out, "Input:   {}", tape);

    match outcome {
        Outcome::Accepted {
            final_tape,
            path,
            total_cost,
        } => {
            let _ = writeln!(out, "Result:  accepted");
            let _ = writeln!(out, "Tape:    {}", final_tape);
            let _ = writeln!(out, "Path:");
            for edge in path {
                let _ = writeln!(out, "  {} -> {} ({})", edge.from, edge.to, edge.weight);
            }
            let _ = writeln!(out, "Cost:    {}", total_cost);
        }
        other => {
            let _ = writeln!(out, "Result:  {}", other);
        }
    }

    let _ = writeln!(
        out,
        "Search:  {} expanded, {} generated, {} duplicates, {} dead ends, frontier peak {}",
        stats.expanded, stats.generated, stats.duplicates, stats.dead_ends, stats.max_frontier
    );

    out
}
