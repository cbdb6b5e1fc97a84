//! This crate provides the core logic for a Turing a-machine simulator.
//! It compiles the textual rule notation into a transition table and steps a machine
//! over a sparse, unbounded tape, one transition at a time.

pub mod lexer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the lexer module, used by the `pest` grammar.
pub use crate::lexer::Rule;
/// Re-exports the line filter and tokenizer.
pub use lexer::{pre_tokenizer, tokenizer, Token};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the rule-level parsing functions from the parser module.
pub use parser::{action_parser, config_parser, evaluate_symbol_query, raw_rule_generator};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the compiled transition table and its lookup result.
pub use table::{Lookup, TransitionTable};
/// Re-exports the sparse tape.
pub use tape::Tape;
/// Re-exports the value types and the error type from the types module.
pub use types::{Action, Config, Configuration, Step, SymbolQuery, Task, TuringMachineError};
