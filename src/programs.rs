use crate::machine::TuringMachine;
use crate::table::TransitionTable;
use crate::types::TuringMachineError;

use std::sync::Arc;
use tracing::error;

// Default embedded programs: (name, source)
const PROGRAM_TEXTS: [(&str, &str); 5] = [
    (
        "turing-first-example",
        include_str!("../machines/turing-first-example.tm"),
    ),
    (
        "turing-first-example-compact",
        include_str!("../machines/turing-first-example-compact.tm"),
    ),
    ("zero-one", include_str!("../machines/zero-one.tm")),
    ("binary-mod-3", include_str!("../machines/binary-mod-3.tm")),
    (
        "unary-successor",
        include_str!("../machines/unary-successor.tm"),
    ),
];

/// An embedded program compiled once and shared by every machine built from it.
#[derive(Debug, Clone)]
pub struct Program {
    pub name: &'static str,
    pub source: &'static str,
    pub table: Arc<TransitionTable>,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, source)| match TransitionTable::compile(source) {
            Ok(table) => Some(Program {
                name,
                source,
                table: Arc::new(table),
            }),
            Err(e) => {
                error!(program = name, error = %e, "failed to compile embedded program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a fresh machine running the program at `index`
    pub fn get_program_by_index(index: usize) -> Result<TuringMachine, TuringMachineError> {
        PROGRAMS
            .get(index)
            .map(|program| TuringMachine::from_table(Arc::clone(&program.table)))
            .ok_or_else(|| {
                TuringMachineError::FileError(format!("Program index {} out of range", index))
            })
    }

    /// Get a fresh machine running the program called `name`
    pub fn get_program_by_name(name: &str) -> Result<TuringMachine, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .map(|program| TuringMachine::from_table(Arc::clone(&program.table)))
            .ok_or_else(|| TuringMachineError::FileError(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = PROGRAMS.get(index).ok_or_else(|| {
            TuringMachineError::FileError(format!("Program index {} out of range", index))
        })?;

        Ok(ProgramInfo {
            index,
            name: program.name.to_string(),
            initial_mconf: program.table.initial_mconf().map(str::to_string),
            mconf_count: program.table.mconfs().len(),
            rule_count: program.table.len(),
        })
    }

    /// Get the source text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        PROGRAMS.get(index).map(|program| program.source).ok_or_else(|| {
            TuringMachineError::FileError(format!("Program text index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_mconf: Option<String>,
    pub mconf_count: usize,
    pub rule_count: usize,
}
