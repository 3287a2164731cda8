//! This module defines the [`Machine`] struct, a deterministic single-tape
//! Turing machine. It owns the tape, head position, current state, and
//! transition table, and exposes the step/run execution cycle.

use crate::trace::{TraceEvent, TraceSink};
use crate::types::{
    BoundaryPolicy, MachineError, Program, RunOutcome, Symbol, TransitionKey, TransitionTable,
};
use std::collections::HashSet;

/// A deterministic single-tape Turing machine.
///
/// The machine is built once from a [`Program`] and driven forward only by
/// [`step`](Machine::step) and [`run`](Machine::run); when the run is over
/// the caller reads the final tape, head position, and state, and discards
/// the machine. The tape length never changes, and the transition table is
/// never mutated.
///
/// The head position is signed: under the [`BoundaryPolicy::Fixed`] policy
/// a move off either end leaves the head at the offending position (-1 or
/// the tape length) as the step fails, and that position stays observable
/// on the dead machine. Before every lookup the head is guaranteed to be
/// inside `[0, tape_len)`.
pub struct Machine {
    tape: Vec<Symbol>,
    blank: Symbol,
    head: i64,
    state: String,
    final_states: HashSet<String>,
    rules: TransitionTable,
    boundary: BoundaryPolicy,
}

impl Machine {
    /// Creates a new `Machine` from a program, consuming it.
    ///
    /// The head starts at position 0. No validation happens here; see
    /// [`analyze`](crate::analyze) for pre-execution checks. The tape must
    /// be non-empty for the machine to be steppable.
    pub fn new(program: Program) -> Self {
        Self {
            tape: program.tape,
            blank: program.blank,
            head: 0,
            state: program.initial_state,
            final_states: program.final_states,
            rules: program.rules,
            boundary: program.boundary,
        }
    }

    /// Executes exactly one transition.
    ///
    /// Reads the cell under the head, looks up the (state, symbol) pair,
    /// writes the new symbol, moves the head, applies the boundary policy,
    /// and enters the next state.
    ///
    /// # Errors
    ///
    /// * [`MachineError::NoTransition`] if the table has no entry for the
    ///   current pair. The tape, head, and state are left untouched.
    /// * [`MachineError::OutOfBounds`] if the move left the tape under the
    ///   `Fixed` policy. The write is not rolled back, the head keeps the
    ///   invalid position, and the state is not updated; the machine must
    ///   not be reused.
    pub fn step(&mut self) -> Result<(), MachineError> {
        self.step_inner(None)
    }

    /// Like [`step`](Machine::step), reporting the step to a trace sink.
    pub fn step_traced(&mut self, sink: &mut dyn TraceSink) -> Result<(), MachineError> {
        self.step_inner(Some(sink))
    }

    /// Runs the machine until it accepts, exhausts its step budget, or a
    /// step fails.
    ///
    /// The first step always executes, even when the initial state is
    /// already accepting; the returned count covers only the steps after
    /// it. So a machine that starts in a final state performs one
    /// transition and reports [`RunOutcome::Accepted`] with 0 steps, and a
    /// run stopped by `max_steps` reports
    /// [`RunOutcome::BudgetExhausted`] with exactly `max_steps` steps.
    ///
    /// # Errors
    ///
    /// The first [`step`](Machine::step) failure aborts the run and
    /// propagates as-is; no step count accompanies an error.
    pub fn run(&mut self, max_steps: Option<u64>) -> Result<RunOutcome, MachineError> {
        self.run_inner(None, max_steps)
    }

    /// Like [`run`](Machine::run), reporting every step (the mandatory
    /// first one included) to a trace sink.
    pub fn run_traced(
        &mut self,
        sink: &mut dyn TraceSink,
        max_steps: Option<u64>,
    ) -> Result<RunOutcome, MachineError> {
        self.run_inner(Some(sink), max_steps)
    }

    fn run_inner(
        &mut self,
        mut sink: Option<&mut dyn TraceSink>,
        max_steps: Option<u64>,
    ) -> Result<RunOutcome, MachineError> {
        let mut steps = 0u64;

        // do ... while: the first transition fires unconditionally and is
        // excluded from the count.
        self.step_inner(sink.as_deref_mut())?;

        while !self.is_accepting() {
            self.step_inner(sink.as_deref_mut())?;
            steps += 1;
            if max_steps.is_some_and(|limit| steps >= limit) {
                return Ok(RunOutcome::BudgetExhausted { steps });
            }
        }

        Ok(RunOutcome::Accepted { steps })
    }

    fn step_inner<'s>(&mut self, sink: Option<&mut (dyn TraceSink + 's)>) -> Result<(), MachineError> {
        let symbol = self.tape[self.head as usize].clone();

        let key = TransitionKey {
            state: self.state.clone(),
            symbol: symbol.clone(),
        };
        let transition = match self.rules.get(&key) {
            Some(transition) => transition.clone(),
            None => {
                return Err(MachineError::NoTransition {
                    state: self.state.clone(),
                    symbol,
                })
            }
        };

        // Where the head lands before any boundary adjustment.
        let target = self.head + transition.direction.offset();

        if let Some(sink) = sink {
            let tape_before = self.tape.clone();
            let mut tape_after = tape_before.clone();
            tape_after[self.head as usize] = transition.write.clone();
            sink.record(&TraceEvent {
                head_before: self.head,
                head_after: target,
                state_before: self.state.clone(),
                state_after: transition.next_state.clone(),
                symbol_before: symbol,
                symbol_after: transition.write.clone(),
                direction: transition.direction,
                tape_before,
                tape_after,
            });
        }

        self.tape[self.head as usize] = transition.write;
        self.head = target;

        let len = self.tape.len() as i64;
        match self.boundary {
            BoundaryPolicy::Fixed => {
                if self.head < 0 || self.head >= len {
                    return Err(MachineError::OutOfBounds {
                        position: self.head,
                    });
                }
            }
            BoundaryPolicy::Wrapping => {
                self.head = self.head.rem_euclid(len);
            }
        }

        self.state = transition.next_state;
        Ok(())
    }

    /// The tape contents.
    pub fn tape(&self) -> &[Symbol] {
        &self.tape
    }

    /// The head position. Negative or past the end only on a machine
    /// killed by a `Fixed`-policy boundary violation.
    pub fn head_position(&self) -> i64 {
        self.head
    }

    /// The current control state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// The blank symbol this machine was configured with.
    pub fn blank(&self) -> &Symbol {
        &self.blank
    }

    /// The boundary policy in effect.
    pub fn boundary_policy(&self) -> BoundaryPolicy {
        self.boundary
    }

    /// Whether the current state is one of the accepting states.
    pub fn is_accepting(&self) -> bool {
        self.final_states.contains(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::EventLog;
    use crate::types::{Direction, TransitionTable};

    fn tape_of(cells: &[i64]) -> Vec<Symbol> {
        cells.iter().map(|&cell| Symbol::Int(cell)).collect()
    }

    /// The unary increment machine: appends a 1 to a block of 1s, then
    /// accepts on the first blank (0) cell.
    fn unary_increment() -> Program {
        Program {
            name: "Unary increment".to_string(),
            tape: tape_of(&[1, 1, 1, 0, 0]),
            blank: Symbol::Int(0),
            initial_state: "q0".to_string(),
            final_states: ["qf".to_string()].into(),
            rules: TransitionTable::new()
                .define("q0", 1, 1, Direction::Right, "q0")
                .define("q0", 0, 1, Direction::Right, "qf"),
            boundary: BoundaryPolicy::Fixed,
        }
    }

    fn single_rule_program(direction: Direction, boundary: BoundaryPolicy) -> Program {
        Program {
            name: "Single rule".to_string(),
            tape: tape_of(&[0, 0, 0]),
            blank: Symbol::Int(0),
            initial_state: "q0".to_string(),
            final_states: ["qf".to_string()].into(),
            rules: TransitionTable::new().define("q0", 0, 1, direction, "qf"),
            boundary,
        }
    }

    #[test]
    fn test_unary_increment_scenario() {
        let mut machine = Machine::new(unary_increment());

        let outcome = machine.run(None).unwrap();

        assert_eq!(outcome, RunOutcome::Accepted { steps: 3 });
        assert_eq!(machine.tape(), tape_of(&[1, 1, 1, 1, 0]));
        assert_eq!(machine.head_position(), 4);
        assert_eq!(machine.state(), "qf");
        assert!(machine.is_accepting());
        assert_eq!(machine.blank(), &Symbol::Int(0));
        assert_eq!(machine.boundary_policy(), BoundaryPolicy::Fixed);
    }

    #[test]
    fn test_first_step_fires_even_when_initial_state_is_final() {
        // Initial state qf is itself the sole final state; run still
        // executes one transition and reports 0 counted steps.
        let program = Program {
            name: "Immediate acceptance".to_string(),
            tape: tape_of(&[0, 0]),
            blank: Symbol::Int(0),
            initial_state: "qf".to_string(),
            final_states: ["qf".to_string()].into(),
            rules: TransitionTable::new().define("qf", 0, 1, Direction::Right, "qf"),
            boundary: BoundaryPolicy::Fixed,
        };
        let mut machine = Machine::new(program);

        let outcome = machine.run(None).unwrap();

        assert_eq!(outcome, RunOutcome::Accepted { steps: 0 });
        // The mandatory first transition really happened.
        assert_eq!(machine.tape(), tape_of(&[1, 0]));
        assert_eq!(machine.head_position(), 1);
    }

    #[test]
    fn test_no_transition_leaves_machine_untouched() {
        let program = Program {
            name: "Missing rule".to_string(),
            tape: tape_of(&[7, 0]),
            blank: Symbol::Int(0),
            initial_state: "q0".to_string(),
            final_states: ["qf".to_string()].into(),
            rules: TransitionTable::new().define("q0", 0, 1, Direction::Right, "qf"),
            boundary: BoundaryPolicy::Fixed,
        };
        let mut machine = Machine::new(program);

        let error = machine.step().unwrap_err();

        assert_eq!(
            error,
            MachineError::NoTransition {
                state: "q0".to_string(),
                symbol: Symbol::Int(7),
            }
        );
        // Failure happens before any mutation.
        assert_eq!(machine.tape(), tape_of(&[7, 0]));
        assert_eq!(machine.head_position(), 0);
        assert_eq!(machine.state(), "q0");
    }

    #[test]
    fn test_fixed_policy_out_of_bounds_left() {
        let mut machine = Machine::new(single_rule_program(
            Direction::Left,
            BoundaryPolicy::Fixed,
        ));

        let error = machine.step().unwrap_err();

        assert_eq!(error, MachineError::OutOfBounds { position: -1 });
        // The write sticks, the head keeps the invalid position, and the
        // state label never advances.
        assert_eq!(machine.tape(), tape_of(&[1, 0, 0]));
        assert_eq!(machine.head_position(), -1);
        assert_eq!(machine.state(), "q0");
    }

    #[test]
    fn test_fixed_policy_out_of_bounds_right() {
        let program = Program {
            name: "Run off the right edge".to_string(),
            tape: tape_of(&[0, 0]),
            blank: Symbol::Int(0),
            initial_state: "q0".to_string(),
            final_states: HashSet::new(),
            rules: TransitionTable::new()
                .define("q0", 0, 1, Direction::Right, "q0")
                .define("q0", 1, 1, Direction::Right, "q0"),
            boundary: BoundaryPolicy::Fixed,
        };
        let mut machine = Machine::new(program);

        let error = machine.run(None).unwrap_err();

        assert_eq!(error, MachineError::OutOfBounds { position: 2 });
        assert_eq!(machine.head_position(), 2);
        assert_eq!(machine.tape(), tape_of(&[1, 1]));
    }

    #[test]
    fn test_wrapping_policy_wraps_left_edge() {
        let mut machine = Machine::new(single_rule_program(
            Direction::Left,
            BoundaryPolicy::Wrapping,
        ));

        machine.step().unwrap();

        // Position -1 maps to len - 1.
        assert_eq!(machine.head_position(), 2);
        assert_eq!(machine.state(), "qf");
    }

    #[test]
    fn test_wrapping_policy_wraps_right_edge() {
        let program = Program {
            name: "Wrap right".to_string(),
            tape: tape_of(&[0, 0, 0]),
            blank: Symbol::Int(0),
            initial_state: "q0".to_string(),
            final_states: ["qf".to_string()].into(),
            rules: TransitionTable::new()
                .define("q0", 0, 1, Direction::Right, "q1")
                .define("q1", 0, 1, Direction::Right, "q2")
                .define("q2", 0, 1, Direction::Right, "qf"),
            boundary: BoundaryPolicy::Wrapping,
        };
        let mut machine = Machine::new(program);

        let outcome = machine.run(None).unwrap();

        // The third move leaves position len, which wraps to 0.
        assert_eq!(outcome, RunOutcome::Accepted { steps: 2 });
        assert_eq!(machine.head_position(), 0);
        assert_eq!(machine.tape(), tape_of(&[1, 1, 1]));
    }

    #[test]
    fn test_wrapping_policy_head_always_in_range() {
        // Walk a 3-cell ring for a while; the head must stay in range
        // after every single step.
        let program = Program {
            name: "Ring walk".to_string(),
            tape: tape_of(&[0, 0, 0]),
            blank: Symbol::Int(0),
            initial_state: "q0".to_string(),
            final_states: HashSet::new(),
            rules: TransitionTable::new()
                .define("q0", 0, 1, Direction::Right, "q1")
                .define("q0", 1, 0, Direction::Right, "q1")
                .define("q1", 0, 1, Direction::Left, "q0")
                .define("q1", 1, 0, Direction::Left, "q0"),
            boundary: BoundaryPolicy::Wrapping,
        };
        let mut machine = Machine::new(program);

        for _ in 0..50 {
            machine.step().unwrap();
            let head = machine.head_position();
            assert!((0..3).contains(&head), "head {} escaped the tape", head);
        }
    }

    #[test]
    fn test_budget_exhaustion_is_distinct_from_acceptance() {
        // Two states bouncing forever on a wrapping tape.
        let program = Program {
            name: "Bouncer".to_string(),
            tape: tape_of(&[0, 0]),
            blank: Symbol::Int(0),
            initial_state: "ping".to_string(),
            final_states: ["done".to_string()].into(),
            rules: TransitionTable::new()
                .define("ping", 0, 0, Direction::Right, "pong")
                .define("pong", 0, 0, Direction::Left, "ping"),
            boundary: BoundaryPolicy::Wrapping,
        };
        let mut machine = Machine::new(program);

        let outcome = machine.run(Some(5)).unwrap();

        assert_eq!(outcome, RunOutcome::BudgetExhausted { steps: 5 });
        assert!(!outcome.is_accepted());
        assert!(!machine.is_accepting());
    }

    #[test]
    fn test_error_during_run_propagates_without_count() {
        // Walks right off a fixed tape before ever accepting.
        let program = Program {
            name: "Doomed walk".to_string(),
            tape: tape_of(&[0, 0, 0]),
            blank: Symbol::Int(0),
            initial_state: "q0".to_string(),
            final_states: ["qf".to_string()].into(),
            rules: TransitionTable::new()
                .define("q0", 0, 0, Direction::Right, "q0")
                .define("q0", 1, 1, Direction::Right, "q0"),
            boundary: BoundaryPolicy::Fixed,
        };
        let mut machine = Machine::new(program);

        assert_eq!(
            machine.run(None).unwrap_err(),
            MachineError::OutOfBounds { position: 3 }
        );
    }

    #[test]
    fn test_identical_machines_are_deterministic() {
        let mut first = Machine::new(unary_increment());
        let mut second = Machine::new(unary_increment());

        let first_outcome = first.run(None).unwrap();
        let second_outcome = second.run(None).unwrap();

        assert_eq!(first_outcome, second_outcome);
        assert_eq!(first.tape(), second.tape());
        assert_eq!(first.head_position(), second.head_position());
        assert_eq!(first.state(), second.state());
    }

    #[test]
    fn test_run_traced_reports_every_step() {
        let mut machine = Machine::new(unary_increment());
        let mut log = EventLog::new();

        let outcome = machine.run_traced(&mut log, None).unwrap();

        // 3 counted steps plus the mandatory first one.
        assert_eq!(outcome.steps(), 3);
        assert_eq!(log.len(), 4);

        let first = &log.events()[0];
        assert_eq!(first.head_before, 0);
        assert_eq!(first.head_after, 1);
        assert_eq!(first.state_before, "q0");
        assert_eq!(first.state_after, "q0");
        assert_eq!(first.symbol_before, Symbol::Int(1));
        assert_eq!(first.symbol_after, Symbol::Int(1));
        assert_eq!(first.direction, Direction::Right);
        assert_eq!(first.tape_before, tape_of(&[1, 1, 1, 0, 0]));
        assert_eq!(first.tape_after, tape_of(&[1, 1, 1, 0, 0]));

        let last = &log.events()[3];
        assert_eq!(last.symbol_before, Symbol::Int(0));
        assert_eq!(last.symbol_after, Symbol::Int(1));
        assert_eq!(last.state_after, "qf");
        assert_eq!(last.tape_before, tape_of(&[1, 1, 1, 0, 0]));
        assert_eq!(last.tape_after, tape_of(&[1, 1, 1, 1, 0]));
    }

    #[test]
    fn test_step_traced_snapshots_bracket_the_write() {
        let program = Program {
            name: "One write".to_string(),
            tape: tape_of(&[5, 5]),
            blank: Symbol::Int(0),
            initial_state: "q0".to_string(),
            final_states: ["qf".to_string()].into(),
            rules: TransitionTable::new().define("q0", 5, 9, Direction::Right, "qf"),
            boundary: BoundaryPolicy::Fixed,
        };
        let mut machine = Machine::new(program);
        let mut log = EventLog::new();

        machine.step_traced(&mut log).unwrap();

        let event = &log.events()[0];
        assert_eq!(event.tape_before, tape_of(&[5, 5]));
        // The "after" snapshot has the write applied but the head not yet
        // moved.
        assert_eq!(event.tape_after, tape_of(&[9, 5]));
        assert_eq!(machine.tape(), tape_of(&[9, 5]));
    }

    #[test]
    fn test_trace_reports_pre_boundary_head_position() {
        let mut machine = Machine::new(single_rule_program(
            Direction::Left,
            BoundaryPolicy::Wrapping,
        ));
        let mut log = EventLog::new();

        machine.step_traced(&mut log).unwrap();

        // The event carries the raw move target; the machine itself has
        // already wrapped.
        assert_eq!(log.events()[0].head_after, -1);
        assert_eq!(machine.head_position(), 2);
    }

    #[test]
    fn test_closure_sink_with_run() {
        let mut machine = Machine::new(unary_increment());
        let mut moves: Vec<(i64, i64)> = Vec::new();

        {
            let mut sink =
                |event: &TraceEvent| moves.push((event.head_before, event.head_after));
            machine.run_traced(&mut sink, None).unwrap();
        }

        assert_eq!(moves, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
    }
}
