//! This module provides the parser for weighted Turing Machine programs, utilizing the `pest`
//! crate. It defines the grammar for `.wtm` files and functions to parse the input into a
//! `Program` struct.

use crate::{
    analyzer::analyze,
    types::{
        Direction, Program, Transition, TuringMachineError, BLANK_SYMBOL, DEFAULT_WEIGHT,
        MAX_PROGRAM_SIZE, Weight,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{HashMap, HashSet};

/// Derives a `PestParser` for the program grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct WeightedMachineParser;

/// Parses the given input string into a `Program` struct.
///
/// The parsed program gets its declared state set derived from the rules when it has no
/// `states:` section, and is then validated with [`analyze`].
///
/// # Arguments
///
/// * `input` - A string slice containing the program definition.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if the program fails validation.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::ValidationError(format!(
            "Program is {} bytes, larger than the {} byte limit",
            input.len(),
            MAX_PROGRAM_SIZE
        )));
    }

    let root = WeightedMachineParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".to_string()))?;

    let mut program = parse_program(root)?;
    program.derive_states();

    analyze(&program)?;

    Ok(program)
}

/// Parses the top-level sections of a program from a `Pair<Rule::program>`.
fn parse_program(pair: Pair<Rule>) -> Result<Program, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut tape: Option<Vec<char>> = None;
    let mut accept_states: Option<Vec<String>> = None;
    let mut states: Option<Vec<String>> = None;
    let mut alphabet: Option<Vec<char>> = None;
    let mut start: Option<String> = None;
    let mut rules: Option<HashMap<String, Vec<Transition>>> = None;
    let mut first_state: Option<String> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p)?.trim().to_string()),
            Rule::tape => tape = Some(parse_symbols(p)),
            Rule::accept => accept_states = Some(parse_states(p)),
            Rule::states => states = Some(parse_states(p)),
            Rule::alphabet => alphabet = Some(parse_symbols(p)),
            Rule::start => start = parse_states(p).into_iter().next(),
            Rule::rules => rules = Some(parse_transitions(p, &mut first_state)?),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let tape = check_required_rule(tape, "tape")?;
    let accept_states = check_required_rule(accept_states, "accept")?;
    let rules = check_required_rule(rules, "rules")?;
    let initial_state = check_required_rule(start.or(first_state), "start")?;

    Ok(Program {
        name,
        initial_state,
        accept_states: dedup_preserving_order(accept_states),
        states: dedup_preserving_order(states.unwrap_or_default()),
        alphabet: alphabet.unwrap_or_default(),
        tape,
        rules,
    })
}

/// Parses the transition rules section from a `Pair<Rule::rules>`.
///
/// The first state block is remembered as the default start state.
fn parse_transitions(
    pair: Pair<Rule>,
    first_state: &mut Option<String>,
) -> Result<HashMap<String, Vec<Transition>>, TuringMachineError> {
    let mut transitions = HashMap::new();

    for transition_pair in pair.into_inner() {
        let span = transition_pair.as_span();
        let (state, actions) = parse_state_block(transition_pair)?;

        if first_state.is_none() {
            *first_state = Some(state.clone());
        }

        if transitions.contains_key(&state) {
            return Err(parse_error(
                &format!("Duplicate transition rule: {state}"),
                span,
            ));
        }

        transitions.insert(state, actions);
    }

    Ok(transitions)
}

/// Parses one state block: the source state followed by its actions.
fn parse_state_block(pair: Pair<Rule>) -> Result<(String, Vec<Transition>), TuringMachineError> {
    let mut pairs = pair.into_inner();
    let state = parse_string(&mut pairs)?;

    let actions = pairs
        .filter(|p| p.as_rule() == Rule::action)
        .map(parse_action)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((state, actions))
}

/// Parses a single action from a `Pair<Rule::action>`.
///
/// When the write symbol is omitted, the read symbol is written back. When the weight is
/// omitted, [`DEFAULT_WEIGHT`] is used.
fn parse_action(pair: Pair<Rule>) -> Result<Transition, TuringMachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();
    let read = parse_symbol(&parse_string(&mut pairs)?);

    let write = match pairs.peek().map(|p| p.as_rule()) {
        Some(Rule::symbol) => parse_symbol(&parse_string(&mut pairs)?),
        _ => read,
    };

    let direction = match pairs.next() {
        Some(p) => parse_direction(p)?,
        None => return Err(parse_error("Missing direction", span)),
    };
    let next_state = parse_string(&mut pairs)?;

    let weight = match pairs.next() {
        Some(p) => parse_weight(p)?,
        None => DEFAULT_WEIGHT,
    };

    Ok(Transition {
        read,
        write,
        direction,
        next_state,
        weight,
    })
}

/// Parses a single direction from a `Pair<Rule::direction>`.
///
/// Supports '<' or 'L' for Left and '>' or 'R' for Right.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TuringMachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "<" | "L" => Ok(Direction::Left),
        ">" | "R" => Ok(Direction::Right),
        _ => Err(parse_error(
            &format!("Unsupported direction: {}", pair.as_str()),
            span,
        )),
    }
}

/// Parses a weight. Negative weights parse fine and are rejected by the analyzer.
fn parse_weight(pair: Pair<Rule>) -> Result<Weight, TuringMachineError> {
    let span = pair.as_span();
    pair.as_str()
        .parse::<Weight>()
        .map_err(|e| parse_error(&format!("Invalid weight {}: {}", pair.as_str(), e), span))
}

/// Collects every `symbol` below `pair`, for `tape:` and `alphabet:`.
fn parse_symbols(pair: Pair<Rule>) -> Vec<char> {
    pair.into_inner()
        .flat_map(|p| p.into_inner())
        .filter(|p| p.as_rule() == Rule::symbol)
        .map(|p| parse_symbol(p.as_str()))
        .collect()
}

/// Collects every `state` below `pair`, for `accept:`, `states:` and `start:`.
fn parse_states(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .flat_map(|p| match p.as_rule() {
            Rule::state => vec![p.as_str().to_string()],
            _ => p.into_inner().map(|s| s.as_str().to_string()).collect(),
        })
        .collect()
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Parses a single character symbol, handling quoted and unquoted symbols.
fn parse_symbol(input: &str) -> char {
    let inner = input
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(input);

    inner.chars().next().unwrap_or(BLANK_SYMBOL)
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> Result<String, TuringMachineError> {
    parse_string(&mut pair.into_inner())
}

/// Extracts the string content from the current `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> Result<String, TuringMachineError> {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| TuringMachineError::ValidationError("Unexpected end of input".to_string()))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if !matches!(
        rule,
        Rule::name
            | Rule::tape
            | Rule::accept
            | Rule::states
            | Rule::alphabet
            | Rule::start
            | Rule::rules
    ) {
        return Ok(());
    };

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
