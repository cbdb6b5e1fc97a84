//! This module compiles parsed rules into a transition table and resolves
//! `(m-configuration, symbol)` pairs against it.
//!
//! Exact rules are kept in a hash map where the first rule written for a pair wins.
//! Negated ("Not" or symbol-less) rules go to a per-m-configuration list in source
//! order and are consulted only when no exact rule exists.

use crate::lexer::Token;
use crate::parser::{action_parser, config_parser, evaluate_symbol_query, syntax_error, RawRules};
use crate::types::{Action, Config, SymbolQuery, Task, TuringMachineError};
use std::collections::HashMap;
use tracing::debug;

/// Result of resolving a scanned symbol in an m-configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a Action),
    Locked,
}

/// A negated rule: fires for every symbol outside `query.symbols`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub query: SymbolQuery,
    pub action: Action,
}

/// The compiled rules of an a-machine. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    initial: Option<String>,
    exact: HashMap<String, HashMap<String, Action>>,
    fallback: HashMap<String, Vec<Fallback>>,
}

impl TransitionTable {
    /// Compiles rule text with the default configuration.
    pub fn compile(source: &str) -> Result<Self, TuringMachineError> {
        Self::compile_with(source, &Config::default())
    }

    /// Compiles rule text, failing on the first malformed rule.
    pub fn compile_with(source: &str, config: &Config) -> Result<Self, TuringMachineError> {
        let mut table = Self::default();
        let mut last_mconf: Option<String> = None;

        for rule in RawRules::new(source, &config.comment_symbol) {
            let (conf_tokens, action_tokens) = rule?;
            let (mconfs, symbols) = config_parser(&conf_tokens);
            let (tasks, next) = action_parser(&action_tokens)?;

            let mconf = match mconfs {
                [Token::Indent] => last_mconf.clone().ok_or_else(|| {
                    TuringMachineError::SyntaxError(
                        "Missing m-configuration in the first rule".to_string(),
                    )
                })?,
                [token] => {
                    let name = token.as_id().ok_or_else(|| {
                        syntax_error(
                            "Grouping of m-configurations is not supported",
                            &conf_tokens,
                        )
                    })?;
                    table.initial.get_or_insert_with(|| name.to_string());
                    last_mconf = Some(name.to_string());
                    name.to_string()
                }
                _ => return Err(syntax_error("Invalid m-configuration", &conf_tokens)),
            };

            let query = evaluate_symbol_query(symbols)?;
            let action = Action {
                tasks: tasks
                    .iter()
                    .map(|token| {
                        token
                            .as_id()
                            .ok_or_else(|| syntax_error("Invalid task", &action_tokens))
                            .and_then(Task::parse)
                    })
                    .collect::<Result<_, _>>()?,
                next: next
                    .as_id()
                    .ok_or_else(|| syntax_error("Invalid next m-configuration", &action_tokens))?
                    .to_string(),
            };

            table.insert(mconf, query, action);
        }

        debug!(
            initial = table.initial.as_deref().unwrap_or("<unset>"),
            exact = table.exact.values().map(HashMap::len).sum::<usize>(),
            fallback = table.fallback.values().map(Vec::len).sum::<usize>(),
            "compiled transition table"
        );

        Ok(table)
    }

    fn insert(&mut self, mconf: String, query: SymbolQuery, action: Action) {
        if query.presence {
            let row = self.exact.entry(mconf).or_default();
            for symbol in &query.symbols {
                row.entry(symbol.clone()).or_insert_with(|| action.clone());
            }
        } else {
            self.fallback
                .entry(mconf)
                .or_default()
                .push(Fallback { query, action });
        }
    }

    /// Resolves the action for `mconf` scanning `symbol`: the exact rule if any,
    /// else the first negated rule in source order not excluding `symbol`.
    pub fn lookup(&self, mconf: Option<&str>, symbol: &str) -> Lookup<'_> {
        let Some(mconf) = mconf else {
            return Lookup::Locked;
        };

        if let Some(action) = self.exact.get(mconf).and_then(|row| row.get(symbol)) {
            return Lookup::Found(action);
        }

        self.fallback
            .get(mconf)
            .and_then(|rules| rules.iter().find(|rule| rule.query.matches(symbol)))
            .map_or(Lookup::Locked, |rule| Lookup::Found(&rule.action))
    }

    /// The m-configuration of the first rule naming one explicitly.
    pub fn initial_mconf(&self) -> Option<&str> {
        self.initial.as_deref()
    }

    /// Every m-configuration with at least one rule, sorted.
    pub fn mconfs(&self) -> Vec<&str> {
        let mut mconfs = self
            .exact
            .keys()
            .chain(self.fallback.keys())
            .map(String::as_str)
            .collect::<Vec<_>>();
        mconfs.sort_unstable();
        mconfs.dedup();
        mconfs
    }

    /// The negated rules of an m-configuration, in source order.
    pub fn fallbacks(&self, mconf: &str) -> &[Fallback] {
        self.fallback.get(mconf).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of exact `(m-configuration, symbol)` entries plus negated rules.
    pub fn len(&self) -> usize {
        self.exact.values().map(HashMap::len).sum::<usize>()
            + self.fallback.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
