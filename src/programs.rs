use crate::types::{
    BoundaryPolicy, Direction, MachineError, Program, Symbol, TransitionTable,
};

// Built-in demo programs. These are constructed in code rather than parsed
// from a text format; they double as ready-made fixtures for callers and
// for the test suite.

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = vec![
        unary_increment(),
        binary_complement(),
        token_ring(),
    ];
}

/// Appends a 1 to a block of 1s, accepting on the first blank (0) cell.
fn unary_increment() -> Program {
    Program {
        name: "Unary increment".to_string(),
        tape: vec![1, 1, 1, 0, 0].into_iter().map(Symbol::Int).collect(),
        blank: Symbol::Int(0),
        initial_state: "q0".to_string(),
        final_states: ["qf".to_string()].into(),
        rules: TransitionTable::new()
            .define("q0", 1, 1, Direction::Right, "q0")
            .define("q0", 0, 1, Direction::Right, "qf"),
        boundary: BoundaryPolicy::Fixed,
    }
}

/// Flips every bit up to the "_" end marker, then parks the head on the
/// last bit. Mixes integer cells with a textual marker.
fn binary_complement() -> Program {
    Program {
        name: "Binary complement".to_string(),
        tape: vec![
            Symbol::Int(1),
            Symbol::Int(0),
            Symbol::Int(1),
            Symbol::from("_"),
        ],
        blank: Symbol::from("_"),
        initial_state: "scan".to_string(),
        final_states: ["done".to_string()].into(),
        rules: TransitionTable::new()
            .define("scan", 1, 0, Direction::Right, "scan")
            .define("scan", 0, 1, Direction::Right, "scan")
            .define("scan", "_", "_", Direction::Left, "done"),
        boundary: BoundaryPolicy::Fixed,
    }
}

/// Marks every cell of an all-zero ring, wraps past the right edge, and
/// accepts on the first already-marked cell.
fn token_ring() -> Program {
    Program {
        name: "Token ring".to_string(),
        tape: vec![0, 0, 0].into_iter().map(Symbol::Int).collect(),
        blank: Symbol::Int(0),
        initial_state: "mark".to_string(),
        final_states: ["seen".to_string()].into(),
        rules: TransitionTable::new()
            .define("mark", 0, 1, Direction::Right, "mark")
            .define("mark", 1, 1, Direction::Right, "seen"),
        boundary: BoundaryPolicy::Wrapping,
    }
}

/// The number of built-in programs.
pub fn count() -> usize {
    PROGRAMS.len()
}

/// Returns a built-in program by its index.
pub fn by_index(index: usize) -> Result<Program, MachineError> {
    PROGRAMS.get(index).cloned().ok_or_else(|| {
        MachineError::Validation(format!("Program index {} out of range", index))
    })
}

/// Returns a built-in program by its name.
pub fn by_name(name: &str) -> Result<Program, MachineError> {
    PROGRAMS
        .iter()
        .find(|program| program.name == name)
        .cloned()
        .ok_or_else(|| MachineError::Validation(format!("Program '{}' not found", name)))
}

/// Lists the names of all built-in programs.
pub fn names() -> Vec<String> {
    PROGRAMS.iter().map(|program| program.name.clone()).collect()
}

/// Returns the indices of built-in programs whose name contains the query,
/// case-insensitively.
pub fn search(query: &str) -> Vec<usize> {
    let query = query.to_lowercase();
    PROGRAMS
        .iter()
        .enumerate()
        .filter(|(_, program)| program.name.to_lowercase().contains(&query))
        .map(|(index, _)| index)
        .collect()
}
