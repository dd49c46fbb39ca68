//! Graphviz DOT rendering of a program's transition diagram.

use std::fmt::Write;
use wtur::Program;

/// Renders the transition diagram: one node per declared state, accept states drawn as
/// double circles, and one edge per transition labelled `read/write,dir : weight`.
pub fn render(program: &Program) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "digraph {} {{", quote(&program.name));
    let _ = writeln!(out, "  rankdir=LR;");
    let _ = writeln!(out, "  __start [shape=point];");

    for state in &program.states {
        let shape = if program.is_accepting(state) {
            "doublecircle"
        } else {
            "circle"
        };
        let _ = writeln!(out, "  {} [shape={}];", quote(state), shape);
    }

    let _ = writeln!(out, "  __start -> {};", quote(&program.initial_state));

    // Sorted so the output is stable across runs.
    let mut sources: Vec<&String> = program.rules.keys().collect();
    sources.sort();

    for source in sources {
        for t in &program.rules[source] {
            let label = format!("{}/{},{} : {}", t.read, t.write, t.direction, t.weight);
            let _ = writeln!(
                out,
                "  {} -> {} [label={}];",
                quote(source),
                quote(&t.next_state),
                quote(&label)
            );
        }
    }

    let _ = writeln!(out, "}}");
    out
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
