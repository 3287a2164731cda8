//! This crate provides a deterministic single-tape Turing machine execution
//! engine. It includes modules for defining machine programs, driving their
//! execution step by step, analyzing program correctness, tracing execution,
//! and a small collection of built-in demo programs.

pub mod analyzer;
pub mod machine;
pub mod programs;
pub mod trace;
pub mod types;

/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports the built-in program registry from the programs module.
pub use programs::PROGRAMS;
/// Re-exports the tracing interface and sinks from the trace module.
pub use trace::{EventLog, JsonLinesWriter, TraceEvent, TraceSink, TraceWriter};
/// Re-exports the types related to machine definition and execution from the types module.
pub use types::{
    BoundaryPolicy, Direction, MachineError, Program, RunOutcome, Symbol, Transition,
    TransitionKey, TransitionTable,
};
