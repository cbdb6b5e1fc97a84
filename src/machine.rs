//! This module defines the `TuringMachine` struct, which executes a compiled transition
//! table one step at a time over a sparse tape. It holds the complete configuration
//! (head index, m-configuration and tape) and signals halting through a locked error.

use crate::table::{Lookup, TransitionTable};
use crate::tape::Tape;
use crate::types::{Config, Configuration, Step, Task, TuringMachineError};
use std::sync::Arc;
use tracing::{debug, trace};

/// A Turing a-machine.
///
/// The transition table is shared between copies and never changes after
/// construction; the complete configuration belongs to each instance.
#[derive(Debug, Clone, Default)]
pub struct TuringMachine {
    table: Arc<TransitionTable>,
    tape: Tape,
    index: i64,
    mconf: Option<String>,
    step_count: usize,
}

impl TuringMachine {
    /// Builds a machine from rule text.
    ///
    /// The machine starts on a blank tape at index 0, in the m-configuration of the
    /// first rule. Without any rule the m-configuration stays unset and the first
    /// step locks.
    ///
    /// # Returns
    ///
    /// * `Ok(TuringMachine)` if every rule is well formed.
    /// * `Err(TuringMachineError::SyntaxError)` on the first malformed rule.
    pub fn new(source: &str) -> Result<Self, TuringMachineError> {
        Self::with_config(source, &Config::default())
    }

    /// Builds a machine from rule text using an explicit source configuration.
    pub fn with_config(source: &str, config: &Config) -> Result<Self, TuringMachineError> {
        Ok(Self::from_table(Arc::new(TransitionTable::compile_with(
            source, config,
        )?)))
    }

    /// Builds a machine in its starting configuration over an already compiled table.
    pub fn from_table(table: Arc<TransitionTable>) -> Self {
        Self {
            mconf: table.initial_mconf().map(str::to_string),
            table,
            tape: Tape::new(),
            index: 0,
            step_count: 0,
        }
    }

    /// The symbol under the head, or `"None"` on a blank cell.
    pub fn scan(&self) -> &str {
        self.tape.get(self.index)
    }

    /// Applies a single task to the complete configuration.
    pub fn perform(&mut self, task: &Task) {
        match task {
            Task::Right => self.index += 1,
            Task::Left => self.index -= 1,
            Task::Noop => {}
            Task::Erase => self.tape.erase(self.index),
            Task::Print(symbol) => self.tape.write(self.index, symbol.as_str()),
        }
    }

    /// Performs one move: resolves the rule for the current m-configuration and
    /// scanned symbol, applies its tasks in order and enters its next m-configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(())` after a complete move.
    /// * `Err(TuringMachineError::Locked)` when no rule applies. Nothing changes in
    ///   that case; this is how a computation ends.
    #[doc(alias = "move")]
    pub fn step(&mut self) -> Result<(), TuringMachineError> {
        let table = Arc::clone(&self.table);
        let action = match table.lookup(self.mconf.as_deref(), self.scan()) {
            Lookup::Found(action) => action,
            Lookup::Locked => {
                debug!(
                    mconf = self.mconf.as_deref().unwrap_or("<unset>"),
                    symbol = self.scan(),
                    index = self.index,
                    "machine locked"
                );
                return Err(TuringMachineError::Locked {
                    mconf: self.mconf.clone(),
                    symbol: self.scan().to_string(),
                });
            }
        };

        trace!(
            step = self.step_count,
            mconf = self.mconf.as_deref().unwrap_or("<unset>"),
            symbol = self.scan(),
            index = self.index,
            next = action.next.as_str(),
            "move"
        );

        for task in &action.tasks {
            self.perform(task);
        }
        self.mconf = Some(action.next.clone());
        self.step_count += 1;

        Ok(())
    }

    /// Moves at most `max_steps` times, stopping early if the machine locks.
    pub fn run(&mut self, max_steps: usize) -> Step {
        for _ in 0..max_steps {
            if let Err(e) = self.step() {
                return Step::Locked(e);
            }
        }
        Step::Continue
    }

    /// Returns an independent machine with its own copy of the complete configuration,
    /// sharing this machine's transition table.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Replaces the tape with contiguous symbols starting at index 0. Blanks are dropped.
    pub fn set_tape<I, S>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tape = Tape::from_symbols(symbols);
    }

    /// Replaces the tape with explicit `(index, symbol)` cells. Blanks are dropped.
    pub fn set_tape_cells<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        self.tape = Tape::from_cells(cells);
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn set_index(&mut self, index: i64) {
        self.index = index;
    }

    /// The current m-configuration, unset only for a machine without rules.
    pub fn mconf(&self) -> Option<&str> {
        self.mconf.as_deref()
    }

    pub fn set_mconf(&mut self, mconf: impl Into<String>) {
        self.mconf = Some(mconf.into());
    }

    /// Returns the total number of moves performed.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn table(&self) -> &Arc<TransitionTable> {
        &self.table
    }

    /// Snapshot of the complete configuration.
    pub fn configuration(&self) -> Configuration {
        Configuration {
            index: self.index,
            mconf: self.mconf.clone(),
            tape: self.tape.clone(),
        }
    }
}
