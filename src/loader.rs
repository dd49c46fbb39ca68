//! This module provides the `ProgramLoader` struct, responsible for loading weighted Turing
//! Machine programs from files, strings and directories.

use crate::parser::parse;
use crate::types::{Program, TuringMachineError};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of program files.
pub const PROGRAM_EXTENSION: &str = "wtm";

/// `ProgramLoader` is a utility struct for loading programs.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read, parsed and validated.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::ParseError)` if the file content is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        log::debug!("loaded {} ({} bytes)", path.display(), content.len());

        parse(&content)
    }

    /// Loads a single program from the provided string content.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        parse(content)
    }

    /// Loads every `.wtm` file in `directory`. Subdirectories and other files are skipped.
    ///
    /// # Returns
    ///
    /// One result per program file: its path and `Program`, or the error that prevented
    /// loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                Some(
                    Self::load_program(&path)
                        .map(|program| (path.clone(), program))
                        .map_err(|e| {
                            TuringMachineError::FileError(format!(
                                "Failed to load program from {}: {}",
                                path.display(),
                                e
                            ))
                        }),
                )
            })
            .collect();

        // Directory order is platform dependent.
        results.sort_by_key(|result| match result {
            Ok((path, _)) => Some(path.clone()),
            Err(_) => None,
        });

        results
    }
}
