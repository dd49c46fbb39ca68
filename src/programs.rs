//! Embedded sample programs, parsed on first use and served by `ProgramManager`.

use crate::types::{Program, TuringMachineError};

use std::sync::RwLock;

// Default embedded programs
const PROGRAM_TEXTS: [&str; 4] = [
    include_str!("../programs/reference.wtm"),
    include_str!("../programs/competing-weights.wtm"),
    include_str!("../programs/guess-bit.wtm"),
    include_str!("../programs/dead-end.wtm"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<Program>> = RwLock::new(Vec::new());
}

/// Summary of an embedded program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub initial_tape: String,
    pub accept_states: Vec<String>,
    pub state_count: usize,
    pub transition_count: usize,
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the embedded programs into [`PROGRAMS`] if that has not happened yet.
    pub fn load() -> Result<(), TuringMachineError> {
        let loaded = PROGRAMS
            .read()
            .map(|programs| !programs.is_empty())
            .map_err(|_| TuringMachineError::FileError("Failed to acquire read lock".to_string()))?;
        if loaded {
            return Ok(());
        }

        let mut programs = Vec::new();
        for program_text in PROGRAM_TEXTS {
            match crate::parser::parse(program_text) {
                Ok(program) => programs.push(program),
                Err(e) => log::warn!("failed to parse embedded program: {e}"),
            }
        }

        let mut write_guard = PROGRAMS
            .write()
            .map_err(|_| TuringMachineError::FileError("Failed to acquire write lock".to_string()))?;
        if write_guard.is_empty() {
            *write_guard = programs;
        }

        Ok(())
    }

    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        let _ = Self::load();

        PROGRAMS.read().map(|programs| programs.len()).unwrap_or(0)
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        Self::load()?;

        PROGRAMS
            .read()
            .map_err(|_| TuringMachineError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program index {} out of range", index))
            })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        Self::load()?;

        PROGRAMS
            .read()
            .map_err(|_| TuringMachineError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|program| program.name == name)
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map(|programs| {
                programs
                    .iter()
                    .map(|program| program.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            initial_state: program.initial_state.clone(),
            initial_tape: program.initial_tape(),
            accept_states: program.accept_states.clone(),
            state_count: program.states.len(),
            transition_count: program.transition_count(),
        })
    }
}
