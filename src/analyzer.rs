//! This module provides construction-time validation for weighted Turing Machine programs.
//! Every malformed-input condition is detected here, before a search begins: undeclared
//! start or accept states, undeclared transition endpoints, negative weights, duplicated
//! transitions and symbols outside a declared alphabet.

use crate::types::{Program, TuringMachineError, BLANK_SYMBOL};
use std::collections::HashSet;

/// Represents the errors that can be found while analyzing a program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The start state is not part of the declared state set.
    UnknownStartState(String),
    /// Accept states that are not part of the declared state set.
    UnknownAcceptStates(Vec<String>),
    /// Rule sources or transition targets that are not declared.
    UndefinedStates(Vec<String>),
    /// Transitions, labelled `state[index]`, carrying a negative weight.
    NegativeWeights(Vec<String>),
    /// Transitions, labelled `state[index]`, registered more than once for the same state.
    DuplicateTransitions(Vec<String>),
    /// Tape or rule symbols outside the declared alphabet.
    InvalidSymbols(Vec<char>),
}

impl From<AnalysisError> for TuringMachineError {
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::UnknownStartState(state) => TuringMachineError::InvalidState(state),
            AnalysisError::UnknownAcceptStates(states) => TuringMachineError::ValidationError(
                format!("Accept states are not declared: {:?}", states),
            ),
            AnalysisError::UndefinedStates(states) => TuringMachineError::ValidationError(
                format!("Transitions reference undeclared states: {:?}", states),
            ),
            AnalysisError::NegativeWeights(transitions) => TuringMachineError::ValidationError(
                format!("Transitions have negative weights: {:?}", transitions),
            ),
            AnalysisError::DuplicateTransitions(transitions) => {
                TuringMachineError::ValidationError(format!(
                    "Duplicate transitions: {:?}",
                    transitions
                ))
            }
            AnalysisError::InvalidSymbols(symbols) => TuringMachineError::ValidationError(
                format!("Symbols outside the declared alphabet: {:?}", symbols),
            ),
        }
    }
}

/// Analyzes a program, returning the first problem found.
///
/// # Arguments
///
/// * `program` - A reference to the `Program` to be analyzed.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TuringMachineError)` describing the first violated rule.
pub fn analyze(program: &Program) -> Result<(), TuringMachineError> {
    let checks: [fn(&Program) -> Result<(), AnalysisError>; 6] = [
        check_start_state,
        check_accept_states,
        check_undefined_states,
        check_weights,
        check_duplicate_transitions,
        check_alphabet,
    ];

    match checks.iter().find_map(|f| f(program).err()) {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn declared_states(program: &Program) -> HashSet<&str> {
    program.states.iter().map(String::as_str).collect()
}

/// Checks that the start state is declared.
fn check_start_state(program: &Program) -> Result<(), AnalysisError> {
    if !declared_states(program).contains(program.initial_state.as_str()) {
        return Err(AnalysisError::UnknownStartState(
            program.initial_state.clone(),
        ));
    }

    Ok(())
}

/// Checks that every accept state is declared.
fn check_accept_states(program: &Program) -> Result<(), AnalysisError> {
    let declared = declared_states(program);
    let mut unknown: Vec<String> = program
        .accept_states
        .iter()
        .filter(|state| !declared.contains(state.as_str()))
        .cloned()
        .collect();

    if !unknown.is_empty() {
        unknown.sort();
        unknown.dedup();
        return Err(AnalysisError::UnknownAcceptStates(unknown));
    }

    Ok(())
}

/// Checks that rule sources and transition targets are declared.
fn check_undefined_states(program: &Program) -> Result<(), AnalysisError> {
    let declared = declared_states(program);
    let mut undefined = Vec::new();

    for (state, transitions) in &program.rules {
        if !declared.contains(state.as_str()) {
            undefined.push(state.clone());
        }
        for transition in transitions {
            if !declared.contains(transition.next_state.as_str()) {
                undefined.push(transition.next_state.clone());
            }
        }
    }

    if !undefined.is_empty() {
        undefined.sort();
        undefined.dedup();
        return Err(AnalysisError::UndefinedStates(undefined));
    }

    Ok(())
}

/// Checks that no transition carries a negative weight. Uniform-cost search is only
/// optimal over non-negative weights.
fn check_weights(program: &Program) -> Result<(), AnalysisError> {
    let mut negative = Vec::new();

    for (state, transitions) in &program.rules {
        for (i, transition) in transitions.iter().enumerate() {
            if transition.weight < 0 {
                negative.push(format!("{}[{}]", state, i));
            }
        }
    }

    if !negative.is_empty() {
        negative.sort();
        return Err(AnalysisError::NegativeWeights(negative));
    }

    Ok(())
}

/// Checks that no state registers the exact same transition twice.
fn check_duplicate_transitions(program: &Program) -> Result<(), AnalysisError> {
    let mut duplicates = Vec::new();

    for (state, transitions) in &program.rules {
        let mut seen = HashSet::new();
        for (i, transition) in transitions.iter().enumerate() {
            if !seen.insert(transition) {
                duplicates.push(format!("{}[{}]", state, i));
            }
        }
    }

    if !duplicates.is_empty() {
        duplicates.sort();
        return Err(AnalysisError::DuplicateTransitions(duplicates));
    }

    Ok(())
}

/// When an alphabet is declared, checks that the tape and every read/write symbol belong
/// to it. The blank is always allowed.
fn check_alphabet(program: &Program) -> Result<(), AnalysisError> {
    if program.alphabet.is_empty() {
        return Ok(());
    }

    let mut allowed: HashSet<char> = program.alphabet.iter().copied().collect();
    allowed.insert(BLANK_SYMBOL);

    let rule_symbols = program
        .rules
        .values()
        .flatten()
        .flat_map(|t| [t.read, t.write]);

    let mut invalid: Vec<char> = program
        .tape
        .iter()
        .copied()
        .chain(rule_symbols)
        .filter(|c| !allowed.contains(c))
        .collect();

    if !invalid.is_empty() {
        invalid.sort();
        invalid.dedup();
        return Err(AnalysisError::InvalidSymbols(invalid));
    }

    Ok(())
}
