//! This module defines `Machine`, the validated and indexed form of a `Program` that the
//! search runs on. A `Machine` is immutable once built and can be shared read-only by any
//! number of concurrent searches.

use std::collections::{HashMap, HashSet};

use crate::analyzer::analyze;
use crate::types::{Program, Transition, TuringMachineError};

/// Maps `(state, symbol under the head)` to every transition registered for that pair,
/// in registration order.
///
/// Keyed by state first so that a lookup borrows the state as `&str`.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    entries: HashMap<String, HashMap<char, Vec<Transition>>>,
}

impl TransitionTable {
    /// Builds the table from per-state rule lists.
    pub fn from_rules(rules: &HashMap<String, Vec<Transition>>) -> Self {
        let mut entries: HashMap<String, HashMap<char, Vec<Transition>>> = HashMap::new();

        for (state, transitions) in rules {
            for transition in transitions {
                entries
                    .entry(state.clone())
                    .or_default()
                    .entry(transition.read)
                    .or_default()
                    .push(transition.clone());
            }
        }

        Self { entries }
    }

    /// Returns every transition applicable in `state` reading `symbol`. An empty slice
    /// means the configuration is a dead end.
    pub fn lookup(&self, state: &str, symbol: char) -> &[Transition] {
        self.entries
            .get(state)
            .and_then(|by_symbol| by_symbol.get(&symbol))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct `(state, symbol)` keys.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A validated weighted nondeterministic Turing Machine.
#[derive(Debug, Clone)]
pub struct Machine {
    program: Program,
    accept_states: HashSet<String>,
    table: TransitionTable,
}

impl Machine {
    /// Validates `program` and builds its transition table.
    ///
    /// If the program has no declared state set, one is derived from its rules first.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if the program is well formed.
    /// * `Err(TuringMachineError)` for an undeclared start or accept state, a negative
    ///   weight, or any other problem reported by [`analyze`].
    pub fn new(mut program: Program) -> Result<Self, TuringMachineError> {
        program.derive_states();
        analyze(&program)?;

        let accept_states = program.accept_states.iter().cloned().collect();
        let table = TransitionTable::from_rules(&program.rules);

        Ok(Self {
            program,
            accept_states,
            table,
        })
    }

    /// Returns the program this machine was built from.
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn name(&self) -> &str {
        &self.program.name
    }

    /// Returns the start state.
    pub fn initial_state(&self) -> &str {
        &self.program.initial_state
    }

    /// Returns the initial tape symbols, without the blank sentinel.
    pub fn initial_tape(&self) -> &[char] {
        &self.program.tape
    }

    /// Returns `true` if `state` is an accept state.
    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    /// Returns the transition table.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns a copy of this machine starting from a different tape. The new tape is
    /// checked against the declared alphabet like any other program.
    pub fn with_tape(&self, tape: &[char]) -> Result<Self, TuringMachineError> {
        let mut program = self.program.clone();
        program.tape = tape.to_vec();
        Self::new(program)
    }
}
