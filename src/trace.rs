//! Step-by-step execution tracing.
//!
//! The engine never prints anything itself; it hands each step to a
//! [`TraceSink`] and moves on. Sinks in this module cover the common cases:
//! collecting events in memory, rendering the classic head/tape debug
//! printout, and emitting newline-delimited JSON for log pipelines.

use crate::types::{Direction, Symbol};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Everything observable about a single executed step.
///
/// `head_after` is the position the head moved to before boundary
/// adjustment, so under a wrapping policy it may lie outside the tape
/// (-1 or the tape length). The two snapshots bracket the cell write:
/// `tape_before` is the tape as the step found it, `tape_after` has the
/// new symbol written but the head not yet moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub head_before: i64,
    pub head_after: i64,
    pub state_before: String,
    pub state_after: String,
    pub symbol_before: Symbol,
    pub symbol_after: Symbol,
    pub direction: Direction,
    pub tape_before: Vec<Symbol>,
    pub tape_after: Vec<Symbol>,
}

/// An observer of machine execution.
///
/// The machine calls [`record`](TraceSink::record) exactly once per step,
/// after the transition has been resolved and before the tape is mutated.
/// Sinks must not fail; anything that can go wrong while recording (a full
/// pipe, a closed file) is the sink's own problem.
pub trait TraceSink {
    fn record(&mut self, event: &TraceEvent);
}

impl<F: FnMut(&TraceEvent)> TraceSink for F {
    fn record(&mut self, event: &TraceEvent) {
        self(event)
    }
}

/// A sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<TraceEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl TraceSink for EventLog {
    fn record(&mut self, event: &TraceEvent) {
        self.events.push(event.clone());
    }
}

/// Renders each step as a human-readable block:
///
/// ```text
/// 0 -> 1 | state: q0 -> q0, symbol: 1 -> 1 | dir: R
///     tape:  [1, 1, 1, 0, 0]
///     tape:  [1, 1, 1, 0, 0]
///     index: [0, 1, 2, 3, 4]
/// ```
///
/// Cells are left-padded to a common width so the tape and index rows line
/// up. Write errors are ignored.
pub struct TraceWriter<W: Write> {
    out: W,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the writer and hands back the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_row(label: &str, cells: &[String], width: usize) -> String {
        let padded: Vec<String> = cells
            .iter()
            .map(|cell| format!("{:<width$}", cell, width = width))
            .collect();
        format!("\t{} [{}]", label, padded.join(", "))
    }
}

impl<W: Write> TraceSink for TraceWriter<W> {
    fn record(&mut self, event: &TraceEvent) {
        let before: Vec<String> = event.tape_before.iter().map(Symbol::to_string).collect();
        let after: Vec<String> = event.tape_after.iter().map(Symbol::to_string).collect();
        let index: Vec<String> = (0..before.len()).map(|i| i.to_string()).collect();

        let width = before
            .iter()
            .chain(after.iter())
            .chain(index.iter())
            .map(String::len)
            .max()
            .unwrap_or(1);

        let _ = writeln!(
            self.out,
            "{} -> {} | state: {} -> {}, symbol: {} -> {} | dir: {}",
            event.head_before,
            event.head_after,
            event.state_before,
            event.state_after,
            event.symbol_before,
            event.symbol_after,
            event.direction,
        );
        let _ = writeln!(self.out, "{}", Self::render_row("tape: ", &before, width));
        let _ = writeln!(self.out, "{}", Self::render_row("tape: ", &after, width));
        let _ = writeln!(self.out, "{}", Self::render_row("index:", &index, width));
    }
}

/// Emits each event as one JSON object per line.
pub struct JsonLinesWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for JsonLinesWriter<W> {
    fn record(&mut self, event: &TraceEvent) {
        if serde_json::to_writer(&mut self.out, event).is_ok() {
            let _ = self.out.write_all(b"\n");
        }
    }
}
