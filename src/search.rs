//! Uniform-cost search over the configurations of a weighted nondeterministic machine.
//!
//! The frontier is a min-heap keyed by accumulated cost. A configuration is marked
//! visited when it is popped, so with non-negative weights the first accepting
//! configuration popped lies on a minimum-cost path.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::machine::Machine;
use crate::tape::Configuration;
use crate::types::{Edge, Exhaustion, Outcome, Weight};

/// A shared flag that stops a running search at its next frontier pop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every search holding a clone of this token stops.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Limits applied to a single search. The default imposes none.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum number of configurations to expand.
    pub max_expansions: Option<usize>,
    /// Maximum number of entries the frontier may hold.
    pub max_frontier: Option<usize>,
    /// Wall-clock limit for the whole search.
    pub timeout: Option<Duration>,
    /// Cooperative cancellation.
    pub cancel: Option<CancelToken>,
}

/// Counters collected during a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Configurations popped and expanded (dead ends included).
    pub expanded: usize,
    /// Successor entries pushed onto the frontier.
    pub generated: usize,
    /// Popped entries discarded because their configuration was already visited.
    pub duplicates: usize,
    /// Expanded configurations with no applicable transition.
    pub dead_ends: usize,
    /// Largest frontier size observed.
    pub max_frontier: usize,
}

/// A frontier entry. It owns its configuration and path outright.
#[derive(Debug)]
struct Entry {
    cost: Weight,
    seq: u64,
    config: Configuration,
    path: Vec<Edge>,
}

impl Entry {
    fn key(&self) -> Reverse<(Weight, u64)> {
        Reverse((self.cost, self.seq))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-priority queue of entries ordered by `(cost, insertion order)`.
///
/// `BinaryHeap` is a max-heap, so entries compare through `Reverse`. The insertion
/// counter makes equal-cost entries pop first-in first-out, which keeps runs reproducible.
#[derive(Debug, Default)]
struct Frontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
    high_water: usize,
}

impl Frontier {
    fn push(&mut self, cost: Weight, config: Configuration, path: Vec<Edge>) {
        self.heap.push(Entry {
            cost,
            seq: self.next_seq,
            config,
            path,
        });
        self.next_seq += 1;
        self.high_water = self.high_water.max(self.heap.len());
    }

    fn pop(&mut self) -> Option<Entry> {
        self.heap.pop()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Runs a uniform-cost search on `machine` without limits.
///
/// Returns [`Outcome::Accepted`] with a minimum-cost path, or [`Outcome::Rejected`]
/// once the frontier is exhausted. The search may not terminate for machines whose
/// reachable configuration space is infinite; use [`Search`] with [`SearchOptions`]
/// to bound it.
pub fn search(machine: &Machine) -> Outcome {
    Search::new(machine, SearchOptions::default()).run()
}

/// A single search invocation. The frontier and visited set live only as long as
/// the call to [`Search::run`].
pub struct Search<'m> {
    machine: &'m Machine,
    options: SearchOptions,
    stats: SearchStats,
}

impl<'m> Search<'m> {
    pub fn new(machine: &'m Machine, options: SearchOptions) -> Self {
        Self {
            machine,
            options,
            stats: SearchStats::default(),
        }
    }

    /// Statistics of the last run.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Runs the search from the machine's initial configuration.
    pub fn run(&mut self) -> Outcome {
        self.stats = SearchStats::default();
        let started = Instant::now();

        let mut frontier = Frontier::default();
        let mut visited: HashSet<Configuration> = HashSet::new();

        frontier.push(
            0,
            Configuration::initial(self.machine.initial_state(), self.machine.initial_tape()),
            Vec::new(),
        );

        log::debug!(
            "searching '{}' from state {} on tape {:?}",
            self.machine.name(),
            self.machine.initial_state(),
            self.machine.program().initial_tape()
        );

        let outcome = loop {
            if let Some(outcome) = self.interrupted(started, frontier.len()) {
                break outcome;
            }

            let Some(entry) = frontier.pop() else {
                break Outcome::Rejected;
            };

            if !visited.insert(entry.config.clone()) {
                self.stats.duplicates += 1;
                continue;
            }

            if self.machine.is_accepting(&entry.config.state) {
                break Outcome::Accepted {
                    final_tape: entry.config.tape.contents(),
                    path: entry.path,
                    total_cost: entry.cost,
                };
            }

            if self
                .options
                .max_expansions
                .is_some_and(|limit| self.stats.expanded >= limit)
            {
                break Outcome::Exhausted(Exhaustion::Expansions);
            }

            self.expand(entry, &mut frontier);
        };

        self.stats.max_frontier = frontier.high_water;
        log::debug!(
            "search of '{}' finished: {} ({} expanded, {} generated, {} duplicates)",
            self.machine.name(),
            outcome,
            self.stats.expanded,
            self.stats.generated,
            self.stats.duplicates
        );

        outcome
    }

    /// Pushes every successor of `entry` reachable by one transition.
    fn expand(&mut self, entry: Entry, frontier: &mut Frontier) {
        self.stats.expanded += 1;

        let Entry {
            cost, config, path, ..
        } = entry;
        let machine = self.machine;
        let symbol = config.tape.read();
        let transitions = machine.table().lookup(&config.state, symbol);

        log::trace!(
            "expand {} at {} reading {:?} (cost {}, {} transitions)",
            config.state,
            config.head(),
            symbol,
            cost,
            transitions.len()
        );

        if transitions.is_empty() {
            self.stats.dead_ends += 1;
            return;
        }

        for transition in transitions {
            let next =
                config.successor(&transition.next_state, transition.write, transition.direction);

            let mut next_path = path.clone();
            next_path.push(Edge {
                from: config.state.clone(),
                to: transition.next_state.clone(),
                weight: transition.weight,
            });

            frontier.push(cost.saturating_add(transition.weight), next, next_path);
            self.stats.generated += 1;
        }
    }

    /// Checks cancellation and the time and frontier budgets. Called once per frontier pop.
    fn interrupted(&self, started: Instant, frontier_len: usize) -> Option<Outcome> {
        if self.options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Some(Outcome::Cancelled);
        }

        if self.options.timeout.is_some_and(|limit| started.elapsed() >= limit) {
            return Some(Outcome::Exhausted(Exhaustion::Time));
        }

        if self
            .options
            .max_frontier
            .is_some_and(|limit| frontier_len > limit)
        {
            return Some(Outcome::Exhausted(Exhaustion::Frontier));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Program, Transition, BLANK_SYMBOL};
    use std::collections::HashMap;
    use std::thread;

    type RuleRow<'a> = (&'a str, char, &'a str, char, Direction, Weight);

    fn create_machine(tape: &str, accept: &[&str], rules: &[RuleRow]) -> Machine {
        let mut map: HashMap<String, Vec<Transition>> = HashMap::new();
        for &(from, read, to, write, direction, weight) in rules {
            map.entry(from.to_string()).or_default().push(Transition {
                read,
                write,
                direction,
                next_state: to.to_string(),
                weight,
            });
        }

        Machine::new(Program {
            name: "search test".to_string(),
            initial_state: rules[0].0.to_string(),
            accept_states: accept.iter().map(|s| s.to_string()).collect(),
            states: Vec::new(),
            alphabet: Vec::new(),
            tape: tape.chars().collect(),
            rules: map,
        })
        .unwrap()
    }

    fn reference_rules() -> Vec<RuleRow<'static>> {
        use Direction::Right as R;
        vec![
            ("q0", '1', "q1", '0', R, 4),
            ("q1", '0', "q2", '1', R, 3),
            ("q2", '1', "q3", '0', R, 6),
            ("q3", '1', "q4", '1', R, 1),
            ("q4", '0', "q_accept", '_', R, 3),
            ("q4", '_', "q_accept", '_', R, 2),
        ]
    }

    /// Checks that `path` is a contiguous chain from `start` whose weights sum to `cost`.
    fn assert_consistent(outcome: &Outcome, start: &str, machine: &Machine) {
        let Outcome::Accepted {
            path, total_cost, ..
        } = outcome
        else {
            panic!("Expected an accepted outcome, got {:?}", outcome);
        };

        assert_eq!(path.iter().map(|e| e.weight).sum::<Weight>(), *total_cost);

        let mut state = start;
        for edge in path {
            assert_eq!(edge.from, state);
            state = edge.to.as_str();
        }
        assert!(machine.is_accepting(state));
    }

    /// Cheapest accepting cost by enumerating every path up to `depth` transitions.
    fn brute_force(machine: &Machine, depth: usize) -> Option<Weight> {
        fn walk(
            machine: &Machine,
            config: Configuration,
            cost: Weight,
            depth: usize,
            best: &mut Option<Weight>,
        ) {
            if machine.is_accepting(&config.state) {
                *best = Some(best.map_or(cost, |b| b.min(cost)));
                return;
            }
            if depth == 0 {
                return;
            }
            let symbol = config.tape.read();
            for t in machine.table().lookup(&config.state, symbol) {
                let next = config.successor(&t.next_state, t.write, t.direction);
                walk(machine, next, cost + t.weight, depth - 1, best);
            }
        }

        let mut best = None;
        let start = Configuration::initial(machine.initial_state(), machine.initial_tape());
        walk(machine, start, 0, depth, &mut best);
        best
    }

    #[test]
    fn test_reference_machine() {
        let machine = create_machine("10110", &["q_accept"], &reference_rules());
        let outcome = search(&machine);

        assert_consistent(&outcome, "q0", &machine);
        match outcome {
            Outcome::Accepted {
                final_tape,
                path,
                total_cost,
            } => {
                assert_eq!(total_cost, 17);
                assert_eq!(final_tape, "0101__");
                let states: Vec<&str> = path.iter().map(|e| e.to.as_str()).collect();
                assert_eq!(states, vec!["q1", "q2", "q3", "q4", "q_accept"]);
            }
            other => panic!("Expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_cheaper_competing_outcome_wins() {
        use Direction::Right as R;
        let mut rules = reference_rules();
        rules.push(("q4", '0', "q5", '0', R, 1));
        rules.push(("q5", '_', "q_accept", '_', R, 0));

        let machine = create_machine("10110", &["q_accept"], &rules);
        let outcome = search(&machine);

        assert_consistent(&outcome, "q0", &machine);
        assert_eq!(outcome.total_cost(), Some(4 + 3 + 6 + 1 + 1));
        assert_eq!(outcome.total_cost(), brute_force(&machine, 10));
    }

    #[test]
    fn test_two_direct_alternatives_pick_lower_weight() {
        use Direction::Right as R;
        let rules = [("q4", '0', "acc", '0', R, 5), ("q4", '0', "acc", '1', R, 2)];
        let machine = create_machine("0", &["acc"], &rules);

        match search(&machine) {
            Outcome::Accepted {
                final_tape,
                total_cost,
                ..
            } => {
                assert_eq!(total_cost, 2);
                assert_eq!(final_tape, "1_");
            }
            other => panic!("Expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_cheap_long_path_beats_expensive_short_path() {
        use Direction::{Left as L, Right as R};
        let rules = [
            ("s", '1', "acc", '1', R, 10),
            ("s", '1', "a", 'x', L, 1),
            ("a", '_', "b", 'y', R, 1),
            ("b", 'x', "acc", 'x', R, 1),
        ];
        let machine = create_machine("1", &["acc"], &rules);
        let outcome = search(&machine);

        assert_consistent(&outcome, "s", &machine);
        match outcome {
            Outcome::Accepted {
                final_tape,
                path,
                total_cost,
            } => {
                assert_eq!(total_cost, 3);
                assert_eq!(path.len(), 3);
                assert_eq!(final_tape, "yx_");
            }
            other => panic!("Expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_start_in_accept_state() {
        use Direction::Right as R;
        let machine = create_machine("1", &["s"], &[("s", '1', "t", '1', R, 3)]);

        assert_eq!(
            search(&machine),
            Outcome::Accepted {
                final_tape: "1_".to_string(),
                path: Vec::new(),
                total_cost: 0,
            }
        );
    }

    #[test]
    fn test_no_path_is_rejected() {
        use Direction::Right as R;
        // `acc` is only reachable by reading a 0 that never appears.
        let rules = [("s", '1', "t", '1', R, 1), ("t", '0', "acc", '0', R, 1)];
        let machine = create_machine("1", &["acc"], &rules);

        let mut search = Search::new(&machine, SearchOptions::default());
        assert_eq!(search.run(), Outcome::Rejected);

        let stats = search.stats();
        assert_eq!(stats.expanded, 2);
        assert_eq!(stats.dead_ends, 1);
    }

    #[test]
    fn test_cycle_terminates_with_rejection() {
        use Direction::{Left as L, Right as R};
        let rules = [
            ("q0", '1', "q1", '1', R, 1),
            ("q1", BLANK_SYMBOL, "q0", BLANK_SYMBOL, L, 1),
            ("unused", '1', "acc", '1', R, 1),
        ];
        let machine = create_machine("1", &["acc"], &rules);

        let mut search = Search::new(&machine, SearchOptions::default());
        assert_eq!(search.run(), Outcome::Rejected);
        assert_eq!(search.stats().expanded, 2);
        assert_eq!(search.stats().duplicates, 1);
    }

    #[test]
    fn test_identical_configuration_expanded_once() {
        use Direction::Right as R;
        let rules = [
            ("q0", '1', "m", '1', R, 1),
            ("q0", '1', "m", '1', R, 2),
            ("m", '0', "acc", '0', R, 1),
        ];
        let machine = create_machine("1", &["acc"], &rules);

        let mut search = Search::new(&machine, SearchOptions::default());
        assert_eq!(search.run(), Outcome::Rejected);

        let stats = search.stats();
        assert_eq!(stats.generated, 2);
        assert_eq!(stats.expanded, 2);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.dead_ends, 1);
    }

    #[test]
    fn test_dead_end_branch_is_dropped() {
        use Direction::Right as R;
        let rules = [
            ("s", '1', "stuck", '1', R, 0),
            ("s", '1', "go", '1', R, 5),
            ("go", BLANK_SYMBOL, "acc", '1', R, 1),
        ];
        let machine = create_machine("1", &["acc"], &rules);

        let mut search = Search::new(&machine, SearchOptions::default());
        let outcome = search.run();

        assert_eq!(outcome.total_cost(), Some(6));
        assert_eq!(search.stats().dead_ends, 1);
    }

    #[test]
    fn test_left_extension_during_search() {
        use Direction::Left as L;
        let rules = [
            ("s", '1', "t", '1', L, 1),
            ("t", BLANK_SYMBOL, "acc", '0', L, 1),
        ];
        let machine = create_machine("1", &["acc"], &rules);

        match search(&machine) {
            Outcome::Accepted { final_tape, .. } => assert_eq!(final_tape, "_01_"),
            other => panic!("Expected acceptance, got {:?}", other),
        }
    }

    /// An ever-growing machine: writes 1s to the right forever.
    fn runaway_machine() -> Machine {
        use Direction::Right as R;
        create_machine(
            "",
            &["acc"],
            &[
                ("s", BLANK_SYMBOL, "s", '1', R, 1),
                ("s", BLANK_SYMBOL, "s", '0', R, 1),
                ("acc", '2', "acc", '2', R, 1),
            ],
        )
    }

    #[test]
    fn test_expansion_budget() {
        let machine = runaway_machine();
        let options = SearchOptions {
            max_expansions: Some(50),
            ..SearchOptions::default()
        };

        let mut search = Search::new(&machine, options);
        assert_eq!(search.run(), Outcome::Exhausted(Exhaustion::Expansions));
        assert_eq!(search.stats().expanded, 50);
    }

    #[test]
    fn test_expansion_budget_equal_to_need_accepts() {
        let machine = create_machine("10110", &["q_accept"], &reference_rules());

        let mut unlimited = Search::new(&machine, SearchOptions::default());
        let expected = unlimited.run();
        let needed = unlimited.stats().expanded;
        assert_eq!(expected.total_cost(), Some(17));
        assert_eq!(needed, 5);

        let exact = SearchOptions {
            max_expansions: Some(needed),
            ..SearchOptions::default()
        };
        let mut search = Search::new(&machine, exact);
        assert_eq!(search.run(), expected);
        assert_eq!(search.stats().expanded, needed);

        let short = SearchOptions {
            max_expansions: Some(needed - 1),
            ..SearchOptions::default()
        };
        assert_eq!(
            Search::new(&machine, short).run(),
            Outcome::Exhausted(Exhaustion::Expansions)
        );
    }

    #[test]
    fn test_zero_expansion_budget_accepts_start_state() {
        use Direction::Right as R;
        let machine = create_machine("1", &["s"], &[("s", '1', "t", '1', R, 3)]);
        let options = SearchOptions {
            max_expansions: Some(0),
            ..SearchOptions::default()
        };

        let mut search = Search::new(&machine, options);
        assert_eq!(search.run().total_cost(), Some(0));
        assert_eq!(search.stats().expanded, 0);
    }

    #[test]
    fn test_frontier_budget() {
        let machine = runaway_machine();
        let options = SearchOptions {
            max_frontier: Some(16),
            ..SearchOptions::default()
        };

        let mut search = Search::new(&machine, options);
        assert_eq!(search.run(), Outcome::Exhausted(Exhaustion::Frontier));
        assert_eq!(search.stats().max_frontier, 17);
    }

    #[test]
    fn test_time_budget() {
        let machine = runaway_machine();
        let options = SearchOptions {
            timeout: Some(Duration::ZERO),
            ..SearchOptions::default()
        };

        assert_eq!(
            Search::new(&machine, options).run(),
            Outcome::Exhausted(Exhaustion::Time)
        );
    }

    #[test]
    fn test_cancellation() {
        let machine = runaway_machine();
        let token = CancelToken::new();
        token.cancel();

        let options = SearchOptions {
            cancel: Some(token.clone()),
            ..SearchOptions::default()
        };

        let mut search = Search::new(&machine, options);
        assert_eq!(search.run(), Outcome::Cancelled);
        assert_eq!(search.stats().expanded, 0);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancellation_from_another_thread() {
        let machine = runaway_machine();
        let token = CancelToken::new();
        let options = SearchOptions {
            cancel: Some(token.clone()),
            max_expansions: Some(100_000),
            ..SearchOptions::default()
        };

        let outcome = thread::scope(|scope| {
            let handle = scope.spawn(|| Search::new(&machine, options).run());
            token.cancel();
            handle.join().unwrap()
        });

        // The worker may finish its budget before it observes the flag.
        assert!(matches!(
            outcome,
            Outcome::Cancelled | Outcome::Exhausted(Exhaustion::Expansions)
        ));
    }

    #[test]
    fn test_concurrent_searches_share_machine() {
        let machine = Arc::new(create_machine("10110", &["q_accept"], &reference_rules()));

        let handles: Vec<_> = ["10110", "10111", "0"]
            .iter()
            .map(|tape| {
                let machine = Arc::clone(&machine);
                let tape: Vec<char> = tape.chars().collect();
                thread::spawn(move || search(&machine.with_tape(&tape).unwrap()))
            })
            .collect();

        let outcomes: Vec<Outcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(outcomes[0].total_cost(), Some(17));
        assert_eq!(outcomes[1].total_cost(), None);
        assert_eq!(outcomes[2], Outcome::Rejected);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        use Direction::{Left as L, Right as R};
        let rules = [
            ("s", '1', "a", '0', R, 2),
            ("s", '1', "b", '1', R, 2),
            ("a", BLANK_SYMBOL, "acc", '1', L, 1),
            ("b", BLANK_SYMBOL, "acc", '0', L, 1),
        ];
        let machine = create_machine("1", &["acc"], &rules);

        let first = search(&machine);
        assert_eq!(first.total_cost(), Some(3));
        assert_eq!(search(&machine), first);
    }

    /// Deterministic pseudo-random machines compared against exhaustive enumeration.
    #[test]
    fn test_optimality_against_brute_force() {
        use Direction::{Left as L, Right as R};

        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = |bound: u64| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed % bound
        };

        let states = ["a", "b", "c", "acc"];
        let symbols = ['0', '1', BLANK_SYMBOL];

        for _ in 0..40 {
            let mut rules: Vec<RuleRow> = Vec::new();
            // States only move forward (a < b < c < acc), so every path is short
            // and the brute force bound covers all of them.
            for (i, from) in states[..3].iter().enumerate() {
                for &read in &symbols {
                    for _ in 0..next(3) {
                        let to = states[i + 1 + next((3 - i) as u64) as usize];
                        let write = symbols[next(3) as usize];
                        let direction = if next(2) == 0 { L } else { R };
                        let weight = next(10) as Weight;
                        let rule = (*from, read, to, write, direction, weight);
                        if !rules.contains(&rule) {
                            rules.push(rule);
                        }
                    }
                }
            }
            if rules.is_empty() || rules[0].0 != "a" {
                rules.insert(0, ("a", '9', "b", '9', R, 1));
            }
            // Declares `acc` even when no generated rule targets it.
            rules.push(("acc", '9', "acc", '9', R, 1));

            let machine = create_machine("10", &["acc"], &rules);
            let outcome = search(&machine);

            assert_eq!(outcome.total_cost(), brute_force(&machine, 4));
            if outcome.is_accepted() {
                assert_consistent(&outcome, "a", &machine);
            }
        }
    }
}
