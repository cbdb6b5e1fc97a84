//! This module defines the core data structures and types used throughout the a-machine
//! simulator, including tasks, actions, symbol queries, configuration, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::tape::Tape;
use crate::Rule;

/// The symbol of a blank (unwritten) tape cell.
pub const BLANK_SYMBOL: &str = "None";
/// Reserved symbol for "any non-blank symbol". Parsed as an ordinary identifier.
pub const ANY_SYMBOL: &str = "Any";
/// Keyword negating a symbol query.
pub const NOT_KEYWORD: &str = "Not";
/// The comment marker used when no other is configured.
pub const DEFAULT_COMMENT_SYMBOL: &str = "#";

/// Source-level settings for compiling a rule text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Everything after this marker on a line is discarded. Empty disables comments.
    pub comment_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            comment_symbol: DEFAULT_COMMENT_SYMBOL.to_string(),
        }
    }
}

/// One atomic effect performed during a step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    /// `L`: move the head one cell to the left.
    Left,
    /// `R`: move the head one cell to the right.
    Right,
    /// `N`: leave the head where it is.
    Noop,
    /// `E`: erase the scanned cell.
    Erase,
    /// `P<symbol>`: print a symbol on the scanned cell. `PNone` erases.
    Print(String),
}

impl Task {
    /// Parses a task token such as `R` or `P0`.
    pub fn parse(token: &str) -> Result<Self, TuringMachineError> {
        match token {
            "L" => Ok(Task::Left),
            "R" => Ok(Task::Right),
            "N" => Ok(Task::Noop),
            "E" => Ok(Task::Erase),
            "P" => Err(TuringMachineError::SyntaxError(
                "Missing symbol for the print task 'P'".to_string(),
            )),
            _ => match token.strip_prefix('P') {
                Some(symbol) => Ok(Task::Print(symbol.to_string())),
                None => Err(TuringMachineError::SyntaxError(format!(
                    "Unknown task '{token}'"
                ))),
            },
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Left => write!(f, "L"),
            Task::Right => write!(f, "R"),
            Task::Noop => write!(f, "N"),
            Task::Erase => write!(f, "E"),
            Task::Print(symbol) => write!(f, "P{symbol}"),
        }
    }
}

/// What a rule does once it fires: its tasks in order, then the next m-configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub tasks: Vec<Task>,
    pub next: String,
}

/// A canonical symbol query.
///
/// With `presence` set, the query matches exactly `symbols`. Otherwise it matches
/// every symbol *not* in `symbols`, so an empty negated query matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolQuery {
    pub symbols: Vec<String>,
    pub presence: bool,
}

impl SymbolQuery {
    /// The query with no symbol restriction at all.
    pub fn everything() -> Self {
        Self {
            symbols: Vec::new(),
            presence: false,
        }
    }

    /// Whether the query matches a scanned symbol.
    pub fn matches(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol) == self.presence
    }
}

/// The complete configuration of a machine: head index, m-configuration and tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub index: i64,
    pub mconf: Option<String>,
    pub tape: Tape,
}

/// Represents the outcome of running a machine for a bounded number of steps.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Every requested step was performed; the machine may still move.
    Continue,
    /// The machine locked, which is how a computation terminates.
    Locked(TuringMachineError),
}

/// Represents the errors that can occur while compiling or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// A grammar violation in the rule source.
    #[error("Syntax error: {0}")]
    SyntaxError(String),
    /// A line of the rule source could not be lexed.
    #[error("Source parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// No rule resolves the current m-configuration and scanned symbol.
    #[error("Machine locked: no rule for m-configuration {} scanning '{symbol}'", .mconf.as_deref().unwrap_or("<unset>"))]
    Locked {
        mconf: Option<String>,
        symbol: String,
    },
    /// Reading a rule file or directory failed.
    #[error("File error: {0}")]
    FileError(String),
}

impl TuringMachineError {
    /// Whether this is the halting signal rather than a real failure.
    pub fn is_locked(&self) -> bool {
        matches!(self, TuringMachineError::Locked { .. })
    }

    /// Whether the rule source itself was rejected.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            TuringMachineError::SyntaxError(_) | TuringMachineError::ParseError(_)
        )
    }
}
