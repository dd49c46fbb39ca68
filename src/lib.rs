//! This crate finds the minimum-cost accepting run of a weighted, nondeterministic Turing
//! Machine. Transitions carry non-negative weights and the machine's configurations are
//! explored with a uniform-cost (Dijkstra) search, so the first accepting configuration
//! reached is the cheapest one.
//!
//! It includes modules for parsing machine programs, validating them, the two-way tape,
//! the search engine itself, and a small set of embedded programs.

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod search;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the validated machine and its transition table.
pub use machine::{Machine, TransitionTable};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the search entry points and their options.
pub use search::{search, CancelToken, Search, SearchOptions, SearchStats};
/// Re-exports the tape and configuration snapshots.
pub use tape::{Configuration, Tape};
/// Re-exports the program, transition and outcome types.
pub use types::{
    Direction, Edge, Exhaustion, Outcome, Program, Transition, TuringMachineError, Weight,
    BLANK_SYMBOL, MAX_PROGRAM_SIZE,
};
