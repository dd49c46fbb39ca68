//! Tape and configuration snapshots used by the search.
//!
//! The tape is conceptually infinite in both directions. Only the visited span is stored,
//! in a `VecDeque` so that extending it on the left does not shift every cell.

use std::collections::VecDeque;

use crate::types::{Direction, BLANK_SYMBOL};

/// A two-way growable tape with its read/write head.
///
/// The head is always a valid index into the stored cells: moving past either end
/// exposes exactly one new blank cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tape {
    cells: VecDeque<char>,
    head: usize,
}

impl Tape {
    /// Creates a tape holding `symbols` followed by one blank sentinel, with the head on
    /// the first cell.
    pub fn new(symbols: &[char]) -> Self {
        let mut cells: VecDeque<char> = symbols.iter().copied().collect();
        cells.push_back(BLANK_SYMBOL);

        Self { cells, head: 0 }
    }

    /// Returns the head index.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A tape always stores at least the cell under the head.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the symbol under the head, or the blank if the head is outside the
    /// stored cells.
    pub fn read(&self) -> char {
        self.cells.get(self.head).copied().unwrap_or(BLANK_SYMBOL)
    }

    /// Writes `symbol` at the head.
    pub fn write(&mut self, symbol: char) {
        match self.cells.get_mut(self.head) {
            Some(cell) => *cell = symbol,
            None => {
                self.cells.resize(self.head, BLANK_SYMBOL);
                self.cells.push_back(symbol);
            }
        }
    }

    /// Moves the head one cell, extending the tape with a blank when the head would
    /// leave the stored cells.
    ///
    /// Extending on the left makes the new cell index 0, so the head stays at 0 and
    /// every existing cell is now one index further right.
    pub fn shift(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.head == 0 {
                    self.cells.push_front(BLANK_SYMBOL);
                } else {
                    self.head -= 1;
                }
            }
            Direction::Right => {
                self.head += 1;
                if self.head >= self.cells.len() {
                    self.cells.push_back(BLANK_SYMBOL);
                }
            }
        }
    }

    /// Returns the stored cells as a flat symbol sequence, blanks included.
    pub fn contents(&self) -> String {
        self.cells.iter().collect()
    }

    /// Returns an iterator over the stored cells.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.cells.iter().copied()
    }
}

/// A complete snapshot of the machine: current state, head position and tape contents.
///
/// Equality and hashing cover all three, comparing the tape cell by cell, which makes
/// a configuration its own deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    pub state: String,
    pub tape: Tape,
}

impl Configuration {
    /// Creates the initial configuration: head on cell 0 of `symbols` plus a trailing blank.
    pub fn initial(state: &str, symbols: &[char]) -> Self {
        Self {
            state: state.to_string(),
            tape: Tape::new(symbols),
        }
    }

    /// Returns the head index.
    pub fn head(&self) -> usize {
        self.tape.head()
    }

    /// Returns the successor reached by writing `write`, moving in `direction` and
    /// entering `next_state`. `self` is left untouched.
    pub fn successor(&self, next_state: &str, write: char, direction: Direction) -> Self {
        let mut tape = self.tape.clone();
        tape.write(write);
        tape.shift(direction);

        Self {
            state: next_state.to_string(),
            tape,
        }
    }
}
