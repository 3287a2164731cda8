//! This module provides pre-execution analysis of programs to detect common
//! errors and inconsistencies before a machine is built. This includes
//! checks for a usable tape, a defined start state, reachable states, and
//! handled tape symbols.

use crate::types::{MachineError, Program};
use std::collections::HashSet;

/// Represents the errors that can be found during program analysis.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The initial tape is empty. The machine reads the cell under the
    /// head before anything else, so a zero-length tape can never start.
    EmptyTape,
    /// No transition fires from the initial state, whatever the symbol.
    InvalidStartState(String),
    /// States that appear in transition keys but cannot be reached from
    /// the initial state.
    UnreachableStates(Vec<String>),
    /// Initial-tape symbols that no transition reads.
    UnhandledSymbols(Vec<String>),
}

impl From<AnalysisError> for MachineError {
    /// Converts an `AnalysisError` into a `MachineError::Validation`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::EmptyTape => {
                MachineError::Validation("Initial tape is empty".to_string())
            }
            AnalysisError::InvalidStartState(state) => {
                MachineError::Validation(format!("Invalid start state: {}", state))
            }
            AnalysisError::UnreachableStates(states) => MachineError::Validation(format!(
                "Unreachable states detected: {:?}",
                states
            )),
            AnalysisError::UnhandledSymbols(symbols) => MachineError::Validation(format!(
                "Initial tape contains symbols not handled by any transition: {:?}",
                symbols
            )),
        }
    }
}

/// Analyzes a given `Program` for structural and logical errors.
///
/// This runs every check and reports the first failure. Analysis is a
/// separate, explicit stage: [`Machine::new`](crate::Machine::new) accepts
/// any program as-is.
///
/// # Arguments
///
/// * `program` - A reference to the `Program` to be analyzed.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(MachineError::Validation)` if any check fails.
pub fn analyze(program: &Program) -> Result<(), MachineError> {
    let errors = [
        check_tape,
        check_start_state,
        check_unreachable_states,
        check_tape_symbols,
    ]
    .iter()
    .filter_map(|check| check(program).err())
    .collect::<Vec<_>>();

    match errors.into_iter().next() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Checks that the initial tape has at least one cell.
fn check_tape(program: &Program) -> Result<(), AnalysisError> {
    if program.tape.is_empty() {
        return Err(AnalysisError::EmptyTape);
    }

    Ok(())
}

/// Checks whether the initial state is the source of at least one
/// transition. A machine whose start state never matches cannot perform
/// even the mandatory first step.
fn check_start_state(program: &Program) -> Result<(), AnalysisError> {
    let has_rule = program
        .rules
        .iter()
        .any(|(key, _)| key.state == program.initial_state);

    if !has_rule {
        return Err(AnalysisError::InvalidStartState(
            program.initial_state.clone(),
        ));
    }

    Ok(())
}

/// Checks for unreachable states by a breadth-first traversal from the
/// initial state over the `key.state -> next_state` edges of the table.
///
/// Any state appearing as a transition source that the traversal never
/// visits is reported. Final states only ever appearing as targets are
/// fine; they have no outgoing edges to strand.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisError> {
    let mut visited = HashSet::new();
    let mut queue = vec![program.initial_state.clone()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state.clone()) {
            continue;
        }

        for (key, transition) in program.rules.iter() {
            if key.state == state && !visited.contains(&transition.next_state) {
                queue.push(transition.next_state.clone());
            }
        }
    }

    let sources: HashSet<String> = program
        .rules
        .iter()
        .map(|(key, _)| key.state.clone())
        .collect();

    let mut unreachable: Vec<String> = sources.difference(&visited).cloned().collect();

    if !unreachable.is_empty() {
        unreachable.sort(); // Sort for deterministic output
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}

/// Checks that every symbol on the initial tape is read by at least one
/// transition. The blank symbol is exempt: rules may legitimately only
/// produce it.
fn check_tape_symbols(program: &Program) -> Result<(), AnalysisError> {
    let tape_symbols: HashSet<_> = program.tape.iter().collect();

    if tape_symbols.is_empty() {
        return Ok(());
    }

    let mut handled: HashSet<_> = program.rules.iter().map(|(key, _)| &key.symbol).collect();
    handled.insert(&program.blank);

    let mut unhandled: Vec<String> = tape_symbols
        .difference(&handled)
        .map(|symbol| symbol.to_string())
        .collect();

    if !unhandled.is_empty() {
        unhandled.sort();
        unhandled.dedup();
        return Err(AnalysisError::UnhandledSymbols(unhandled));
    }

    Ok(())
}
