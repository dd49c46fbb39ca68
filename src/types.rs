//! This module defines the core data structures and types used throughout the weighted
//! Turing Machine search, including program representation, transitions, search outcomes,
//! and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The reserved blank symbol. Newly exposed tape cells always hold it.
pub const BLANK_SYMBOL: char = '_';
/// The maximum allowed size for a program text in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The weight given to a rule line that omits one.
pub const DEFAULT_WEIGHT: Weight = 1;

/// Transition weight and accumulated path cost.
///
/// Signed so that a negative weight can be represented and rejected while the
/// machine is being constructed.
pub type Weight = i64;

/// A weighted nondeterministic Turing Machine program.
///
/// A program is plain data: it is validated and indexed by [`crate::Machine::new`]
/// before any search runs on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Program {
    /// The name of the program.
    pub name: String,
    /// The state the machine starts in.
    pub initial_state: String,
    /// Reaching any of these states constitutes acceptance.
    pub accept_states: Vec<String>,
    /// The declared state set.
    pub states: Vec<String>,
    /// The declared input alphabet. Empty means no alphabet check is performed.
    #[serde(default)]
    pub alphabet: Vec<char>,
    /// The initial tape contents, without the trailing blank sentinel.
    pub tape: Vec<char>,
    /// Transition rules keyed by source state. Several transitions may read the
    /// same symbol; each of them is a nondeterministic alternative.
    pub rules: HashMap<String, Vec<Transition>>,
}

impl Program {
    /// Returns the initial tape as a `String`.
    pub fn initial_tape(&self) -> String {
        self.tape.iter().collect()
    }

    /// Returns `true` if `state` is one of the accept states.
    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept_states.iter().any(|s| s == state)
    }

    /// Total number of transitions across all states.
    pub fn transition_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Fills in the declared state set when none was given. Rule sources are visited in
    /// sorted order and each is followed by its transition targets in registration order;
    /// a state already listed is skipped.
    /// Accept states are not added, so an accept state no rule mentions stays undeclared.
    pub fn derive_states(&mut self) {
        if !self.states.is_empty() {
            return;
        }

        let mut sources: Vec<&String> = self.rules.keys().collect();
        sources.sort();

        let mut states: Vec<String> = Vec::new();
        let mut push = |s: &String| {
            if !states.contains(s) {
                states.push(s.clone());
            }
        };

        for source in sources {
            push(source);
            for transition in &self.rules[source] {
                push(&transition.next_state);
            }
        }

        self.states = states;
    }
}

/// A single weighted transition registered for a source state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// The symbol that must be under the head.
    pub read: char,
    /// The symbol written at the head before moving.
    pub write: char,
    /// Where the head moves after writing.
    pub direction: Direction,
    /// The state the machine transitions to.
    pub next_state: String,
    /// Cost of taking this transition.
    pub weight: Weight,
}

/// Head movement. There is no stay move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// One edge of an accepting path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// The state the transition left.
    pub from: String,
    /// The state the transition entered.
    pub to: String,
    /// Weight of the transition taken.
    pub weight: Weight,
}

/// The result of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// An accept state was reached along a minimum-cost path.
    Accepted {
        /// Tape contents at the moment of acceptance, blanks included.
        final_tape: String,
        /// Edges taken from the start state to the accept state.
        path: Vec<Edge>,
        /// Sum of the weights along `path`.
        total_cost: Weight,
    },
    /// The frontier emptied without reaching an accept state.
    Rejected,
    /// The search was cancelled through its [`crate::search::CancelToken`].
    Cancelled,
    /// A search budget ran out before the search finished.
    Exhausted(Exhaustion),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    /// Returns the total cost of an accepted outcome.
    pub fn total_cost(&self) -> Option<Weight> {
        match self {
            Outcome::Accepted { total_cost, .. } => Some(*total_cost),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Accepted {
                path, total_cost, ..
            } => write!(f, "accepted in {} steps at cost {}", path.len(), total_cost),
            Outcome::Rejected => write!(f, "rejected"),
            Outcome::Cancelled => write!(f, "cancelled"),
            Outcome::Exhausted(budget) => write!(f, "search budget exhausted: {budget}"),
        }
    }
}

/// Which search budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exhaustion {
    /// The maximum number of expanded configurations was reached.
    Expansions,
    /// The frontier grew past its maximum size.
    Frontier,
    /// The time limit elapsed.
    Time,
}

impl fmt::Display for Exhaustion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exhaustion::Expansions => write!(f, "expansion limit reached"),
            Exhaustion::Frontier => write!(f, "frontier limit reached"),
            Exhaustion::Time => write!(f, "time limit reached"),
        }
    }
}

/// Represents various errors that can occur while building or loading a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates a reference to a state that is not declared.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// Indicates an error during the parsing of a program definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates that a program failed construction-time validation.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}
