//! This module defines the core data structures and types used throughout the
//! execution engine, including the tape alphabet, transition table, program
//! representation, run outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single cell value drawn from the machine's alphabet.
///
/// The alphabet is open-ended: a symbol is either an integer or a textual
/// label. Equality and hashing are structural, so `Int(1)` and `Text("1")`
/// are distinct symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// An integer symbol.
    Int(i64),
    /// A textual symbol.
    Text(String),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Int(value) => write!(f, "{}", value),
            Symbol::Text(label) => write!(f, "{}", label),
        }
    }
}

impl From<i64> for Symbol {
    fn from(value: i64) -> Self {
        Symbol::Int(value)
    }
}

impl From<&str> for Symbol {
    fn from(label: &str) -> Self {
        Symbol::Text(label.to_string())
    }
}

impl From<String> for Symbol {
    fn from(label: String) -> Self {
        Symbol::Text(label)
    }
}

/// The direction the head moves after writing a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// The signed head offset for this direction.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// How the machine treats head movement past either end of the tape.
///
/// - `Fixed` (default): moving outside `[0, tape_len)` is a fatal
///   [`MachineError::OutOfBounds`].
/// - `Wrapping`: the head position is reduced modulo the tape length and is
///   always non-negative.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Out-of-range head positions are fatal.
    #[default]
    Fixed,
    /// Head positions wrap around the tape ends.
    Wrapping,
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Fixed => write!(f, "fixed"),
            BoundaryPolicy::Wrapping => write!(f, "wrapping"),
        }
    }
}

impl FromStr for BoundaryPolicy {
    type Err = MachineError;

    /// Parses a policy from its lowercase name.
    ///
    /// This is the only place an unknown policy can surface; past this
    /// boundary the enum makes the error statically impossible.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "fixed" => Ok(BoundaryPolicy::Fixed),
            "wrapping" => Ok(BoundaryPolicy::Wrapping),
            _ => Err(MachineError::UnknownBoundaryPolicy(name.to_string())),
        }
    }
}

/// The lookup key of the transition table: the pair of the control state the
/// machine is in and the symbol under the head.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionKey {
    /// The control state the machine is in.
    pub state: String,
    /// The symbol under the head.
    pub symbol: Symbol,
}

impl TransitionKey {
    pub fn new(state: impl Into<String>, symbol: impl Into<Symbol>) -> Self {
        Self {
            state: state.into(),
            symbol: symbol.into(),
        }
    }
}

/// The value side of a transition table entry: what to write, where to move,
/// and which state to enter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The symbol written over the cell under the head.
    pub write: Symbol,
    /// The direction the head moves after the write.
    pub direction: Direction,
    /// The control state entered after the move.
    pub next_state: String,
}

/// The transition table — the program being executed.
///
/// Keys are unique; inserting a duplicate key replaces the previous entry.
/// The table is supplied at construction and never mutated for the
/// machine's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable(HashMap<TransitionKey, Transition>);

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one entry and returns the table, so programs read as a chain of
    /// `define` calls.
    pub fn define(
        mut self,
        state: &str,
        read: impl Into<Symbol>,
        write: impl Into<Symbol>,
        direction: Direction,
        next_state: &str,
    ) -> Self {
        self.insert(
            TransitionKey::new(state, read),
            Transition {
                write: write.into(),
                direction,
                next_state: next_state.to_string(),
            },
        );
        self
    }

    /// Inserts an entry, returning the entry it replaced, if any.
    pub fn insert(&mut self, key: TransitionKey, transition: Transition) -> Option<Transition> {
        self.0.insert(key, transition)
    }

    /// Looks up the transition for a (state, symbol) pair.
    pub fn get(&self, key: &TransitionKey) -> Option<&Transition> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&TransitionKey, &Transition)> {
        self.0.iter()
    }
}

impl FromIterator<(TransitionKey, Transition)> for TransitionTable {
    fn from_iter<I: IntoIterator<Item = (TransitionKey, Transition)>>(entries: I) -> Self {
        Self(entries.into_iter().collect())
    }
}

/// The full initial configuration of a machine.
///
/// A program is consumed by [`Machine::new`](crate::Machine::new); the
/// machine is then driven only by `step`/`run` and discarded afterwards —
/// there is no reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// A human-readable name for the program.
    pub name: String,
    /// The initial tape contents. The tape length is fixed for the
    /// machine's lifetime.
    pub tape: Vec<Symbol>,
    /// The fill symbol for cells not covered by the initial tape. Stored
    /// for the machine's lifetime but never auto-applied: the tape does
    /// not grow.
    pub blank: Symbol,
    /// The control state the machine starts in.
    pub initial_state: String,
    /// The accepting states. May be empty, in which case only a step
    /// budget or an error stops the run.
    pub final_states: HashSet<String>,
    /// The transition table.
    pub rules: TransitionTable,
    /// The tape boundary policy.
    pub boundary: BoundaryPolicy,
}

/// How a completed run ended.
///
/// Budget exhaustion is a distinct outcome from acceptance; callers never
/// have to compare a returned count against the limit they passed in.
/// Failures travel separately as the `Err` arm of
/// [`Machine::run`](crate::Machine::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The machine reached an accepting state.
    Accepted {
        /// Steps counted after the mandatory first step.
        steps: u64,
    },
    /// The step budget ran out before an accepting state was reached.
    BudgetExhausted {
        /// Steps counted after the mandatory first step.
        steps: u64,
    },
}

impl RunOutcome {
    /// The step count carried by either outcome.
    pub fn steps(&self) -> u64 {
        match *self {
            RunOutcome::Accepted { steps } | RunOutcome::BudgetExhausted { steps } => steps,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, RunOutcome::Accepted { .. })
    }
}

/// Represents the errors that can occur while constructing or driving a
/// machine. Every error is terminal for the run that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// The table has no entry for the current (state, symbol) pair. The
    /// machine is left exactly as it was before the step.
    #[error("No transition defined for state {state} and symbol {symbol}")]
    NoTransition { state: String, symbol: Symbol },
    /// Under the `Fixed` boundary policy the head moved outside the tape.
    /// The machine is left at the invalid position and must not be reused.
    #[error("Head position out of bounds: {position}")]
    OutOfBounds { position: i64 },
    /// A boundary policy name outside {"fixed", "wrapping"} was supplied
    /// at a string-typed construction boundary.
    #[error("Unknown boundary policy: {0}")]
    UnknownBoundaryPolicy(String),
    /// A program failed pre-execution analysis.
    #[error("Program validation error: {0}")]
    Validation(String),
}
