//! This module groups the token stream into rules and interprets their parts.
//!
//! The grammar handled here, one rule per group of tokens, is:
//!
//! ```text
//! rule         ::= config "->" action "\n"
//! config       ::= mconfs [symbol-query]
//! mconfs       ::= " " | <id>
//! symbol-query ::= ["Not"] (<id> | "[" <id> {<id>} "]")
//! action       ::= {task} <id>
//! task         ::= "L" | "R" | "N" | "E" | "P" <id>
//! ```
//!
//! The `" "` m-configuration is the indent marker and means "the m-configuration of
//! the previous rule".

use crate::lexer::{Token, Tokens};
use crate::types::{SymbolQuery, TuringMachineError, DEFAULT_COMMENT_SYMBOL, NOT_KEYWORD};

/// A rule split at its arrow: the config tokens and the action tokens.
pub type RawRule = (Vec<Token>, Vec<Token>);

/// Lazy iterator over the `(config, action)` pairs of a rule text.
///
/// Stops after the first malformed rule.
pub struct RawRules<'a> {
    tokens: Tokens<'a>,
    done: bool,
}

impl<'a> RawRules<'a> {
    pub fn new(data: &'a str, comment_symbol: &'a str) -> Self {
        Self {
            tokens: Tokens::new(data, comment_symbol),
            done: false,
        }
    }

    fn next_rule(&mut self) -> Result<Option<RawRule>, TuringMachineError> {
        let mut config = Vec::new();
        let mut action = Vec::new();
        let mut in_action = false;

        for token in self.tokens.by_ref() {
            match token? {
                Token::Arrow => in_action = true,
                Token::Newline => {
                    if !action.is_empty() {
                        if config.is_empty() {
                            return Err(syntax_error(
                                "Incomplete rule (missing config)",
                                &action,
                            ));
                        }
                        return Ok(Some((config, action)));
                    } else if !config.is_empty() {
                        return Err(syntax_error("Incomplete rule (missing action)", &config));
                    } else if in_action {
                        return Err(TuringMachineError::SyntaxError(
                            "Incomplete rule (lone '->')".to_string(),
                        ));
                    }
                }
                token if in_action => action.push(token),
                token => config.push(token),
            }
        }

        if !config.is_empty() || in_action {
            return Err(syntax_error(
                "Incomplete rule (unexpected end of tokens)",
                &config,
            ));
        }
        Ok(None)
    }
}

impl Iterator for RawRules<'_> {
    type Item = Result<RawRule, TuringMachineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let rule = self.next_rule().transpose();
        if !matches!(rule, Some(Ok(_))) {
            self.done = true;
        }
        rule
    }
}

/// Splits rule text (default `#` comments) into `(config, action)` pairs.
pub fn raw_rule_generator(data: &str) -> RawRules<'_> {
    RawRules::new(data, DEFAULT_COMMENT_SYMBOL)
}

/// Fails when any of `invalids` occurs in `tokens`.
pub fn sequence_cant_have(tokens: &[Token], invalids: &[&str]) -> Result<(), TuringMachineError> {
    match tokens.iter().find(|t| invalids.contains(&t.as_str())) {
        Some(token) => Err(TuringMachineError::SyntaxError(format!(
            "Invalid use of the '{}' symbol",
            token
        ))),
        None => Ok(()),
    }
}

/// Validates a symbol query and returns its canonical form.
///
/// A query without symbols matches everything and is stored as the negated empty
/// set. `Not` negates a single symbol or a bracketed group of symbols.
///
/// Turing's tables use "any other symbol" rules to define m-functions without
/// enumerating the alphabet; the negated form keeps that shorthand available.
pub fn evaluate_symbol_query(args: &[Token]) -> Result<SymbolQuery, TuringMachineError> {
    match args {
        [] => Ok(SymbolQuery::everything()),
        [Token::Id(first), rest @ ..] if first == NOT_KEYWORD => {
            if rest.is_empty() {
                return Err(TuringMachineError::SyntaxError(
                    "Missing symbols for the 'Not' keyword".to_string(),
                ));
            }
            Ok(SymbolQuery {
                symbols: symbol_group(rest)?,
                presence: false,
            })
        }
        _ => Ok(SymbolQuery {
            symbols: symbol_group(args)?,
            presence: true,
        }),
    }
}

/// A single symbol, or the inner identifiers of `[ id id ... ]`.
fn symbol_group(args: &[Token]) -> Result<Vec<String>, TuringMachineError> {
    let symbols = match args {
        [single] => std::slice::from_ref(single),
        [Token::LBracket, inner @ .., Token::RBracket] if !inner.is_empty() => inner,
        _ => return Err(syntax_error("Invalid grouping of symbols", args)),
    };

    sequence_cant_have(symbols, &[NOT_KEYWORD, "[", "]"])?;

    symbols
        .iter()
        .map(|token| {
            token
                .as_id()
                .map(str::to_string)
                .ok_or_else(|| syntax_error("Invalid symbol", std::slice::from_ref(token)))
        })
        .collect()
}

/// Splits a config into its m-configuration list and its symbol query tokens.
///
/// A lone token is the m-configuration list with an empty query. Only a single
/// m-configuration per rule is supported.
pub fn config_parser(config: &[Token]) -> (&[Token], &[Token]) {
    if config.len() == 1 {
        (config, &[][..])
    } else {
        config.split_at(1.min(config.len()))
    }
}

/// Splits an action into its task tokens and the next m-configuration token.
pub fn action_parser(action: &[Token]) -> Result<(&[Token], &Token), TuringMachineError> {
    action
        .split_last()
        .map(|(next, tasks)| (tasks, next))
        .ok_or_else(|| TuringMachineError::SyntaxError("Empty action".to_string()))
}

/// Builds a syntax error quoting the offending token run.
pub(crate) fn syntax_error(msg: &str, tokens: &[Token]) -> TuringMachineError {
    let quoted = tokens
        .iter()
        .map(Token::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    TuringMachineError::SyntaxError(format!("{msg}: `{quoted}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(tokens: &[&str]) -> Vec<Token> {
        tokens
            .iter()
            .map(|t| match *t {
                "[" => Token::LBracket,
                "]" => Token::RBracket,
                " " => Token::Indent,
                id => Token::Id(id.to_string()),
            })
            .collect()
    }

    fn rule(config: &[&str], action: &[&str]) -> RawRule {
        (ids(config), ids(action))
    }

    fn query(symbols: &[&str], presence: bool) -> SymbolQuery {
        SymbolQuery {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            presence,
        }
    }

    #[test]
    fn test_no_rules() {
        assert_eq!(raw_rule_generator("\n \n\n").count(), 0);
        assert_eq!(raw_rule_generator("").count(), 0);
    }

    #[test]
    fn test_one_rule() {
        let mut rules = raw_rule_generator("q1 1 -> P0 R q2");
        assert_eq!(
            rules.next().unwrap().unwrap(),
            rule(&["q1", "1"], &["P0", "R", "q2"])
        );
        assert!(rules.next().is_none());
    }

    #[test]
    fn test_half_rule() {
        let mut rules = raw_rule_generator("q1 1");
        let err = rules.next().unwrap().unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("missing action"));
        assert!(err.to_string().contains("q1 1"));
        assert!(rules.next().is_none());
    }

    #[test]
    fn test_one_and_a_half_rule_with_arrow() {
        for (tail, reason) in [("q1 1 ->", "missing action"), ("-> q0", "missing config")] {
            let source = format!("q0 -> q1\n{tail}");
            let mut rules = raw_rule_generator(&source);
            assert_eq!(rules.next().unwrap().unwrap(), rule(&["q0"], &["q1"]));
            let err = rules.next().unwrap().unwrap_err();
            assert!(err.to_string().contains(reason), "{tail:?}: {err}");
        }
    }

    #[test]
    fn test_one_and_an_arrow_only_rule() {
        for tail in ["  ->", "->", "\n->", "->\n\n", "->\n\nq0 -> q1"] {
            let source = format!("q1 1 -> E q0\n{tail}");
            let mut rules = raw_rule_generator(&source);
            assert_eq!(
                rules.next().unwrap().unwrap(),
                rule(&["q1", "1"], &["E", "q0"])
            );
            assert!(rules.next().unwrap().is_err(), "{tail:?}");
        }
    }

    #[test]
    fn test_five_rules() {
        let rules = raw_rule_generator(concat!(
            "q4 0 -> P1 R q3\n",
            "   1 -> Px q4\n\n",
            "   x -> P0 L\n\n\n",
            "        P1 q3\n",
            "q3 0 -> P1 q4\n",
            "   1 -> P0 L q3",
        ))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

        assert_eq!(
            rules,
            [
                rule(&["q4", "0"], &["P1", "R", "q3"]),
                rule(&[" ", "1"], &["Px", "q4"]),
                rule(&[" ", "x"], &["P0", "L", "P1", "q3"]),
                rule(&["q3", "0"], &["P1", "q4"]),
                rule(&[" ", "1"], &["P0", "L", "q3"]),
            ]
        );
    }

    #[test]
    fn test_group_rules() {
        let source = [
            "A",
            "  0 -> P1 R",
            "       P1 R B",
            "B",
            "  0 -> P0 R C",
            "  1 -> P0 L A",
            "C",
            "  -> P1 B",
        ]
        .join("\n");
        let rules = raw_rule_generator(&source)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(
            rules,
            [
                rule(&["A", "0"], &["P1", "R", "P1", "R", "B"]),
                rule(&["B", "0"], &["P0", "R", "C"]),
                rule(&[" ", "1"], &["P0", "L", "A"]),
                rule(&["C"], &["P1", "B"]),
            ]
        );
    }

    #[test]
    fn test_sequence_cant_have() {
        assert!(sequence_cant_have(&[], &["Not"]).is_ok());
        assert!(sequence_cant_have(&ids(&["a", "b"]), &[]).is_ok());

        let mut tokens = ids(&["a", ""]);
        assert!(sequence_cant_have(&tokens, &["Not", "Neither"]).is_ok());
        tokens.push(Token::Id("Neither".to_string()));
        let err = sequence_cant_have(&tokens, &["Not", "Neither"]).unwrap_err();
        assert!(err.to_string().contains("'Neither'"));
        tokens.pop();
        tokens[1] = Token::Id("Not".to_string());
        assert!(sequence_cant_have(&tokens, &["Not", "Neither"]).is_err());
    }

    #[test]
    fn test_valid_one_symbol_scenarios() {
        for symbol in ["a", "1", "noot", "_bad", "q1", "Ç", "That'sIt", "None", "Any"] {
            assert_eq!(
                evaluate_symbol_query(&ids(&[symbol])).unwrap(),
                query(&[symbol], true)
            );
            assert_eq!(
                evaluate_symbol_query(&ids(&["Not", symbol])).unwrap(),
                query(&[symbol], false)
            );
        }
    }

    #[test]
    fn test_simple_multisymbol_without_repeat() {
        let symbols = ["abc", "defgh", "ijk", "lmnop", "qrs"];
        let mut grouped = vec!["["];
        grouped.extend(symbols);
        grouped.push("]");

        assert_eq!(
            evaluate_symbol_query(&ids(&grouped)).unwrap(),
            query(&symbols, true)
        );
        let mut negated = vec!["Not"];
        negated.extend(&grouped);
        assert_eq!(
            evaluate_symbol_query(&ids(&negated)).unwrap(),
            query(&symbols, false)
        );

        assert!(evaluate_symbol_query(&ids(&symbols)).is_err());
        let mut bare_negated = vec!["Not"];
        bare_negated.extend(symbols);
        assert!(evaluate_symbol_query(&ids(&bare_negated)).is_err());
    }

    #[test]
    fn test_not_twice_or_invalidly_alone() {
        for symbols in [&["Not"][..], &["1", "Not"], &["ABC", "Not", "Neither"]] {
            assert!(evaluate_symbol_query(&ids(symbols)).is_err());
            let mut negated = vec!["Not"];
            negated.extend(symbols);
            assert!(evaluate_symbol_query(&ids(&negated)).is_err());
        }
    }

    #[test]
    fn test_missing_symbols_for_not() {
        let err = evaluate_symbol_query(&ids(&["Not"])).unwrap_err();
        assert!(err.to_string().contains("Missing symbols"));
    }

    #[test]
    fn test_invalid_grouping() {
        for symbols in [
            &["[", "]"][..],
            &["["],
            &["]"],
            &["[", "a"],
            &["a", "]"],
            &["[", "a", "[", "b", "]"],
            &["[", "Not", "a", "]"],
        ] {
            let err = evaluate_symbol_query(&ids(symbols)).unwrap_err();
            assert!(err.is_malformed(), "{symbols:?}");
        }
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(evaluate_symbol_query(&[]).unwrap(), query(&[], false));
    }

    #[test]
    fn test_config_parser() {
        let config = ids(&["q1"]);
        assert_eq!(config_parser(&config), (&config[..], &[][..]));

        let config = ids(&[" ", "1"]);
        let (mconfs, symbols) = config_parser(&config);
        assert_eq!(mconfs, [Token::Indent]);
        assert_eq!(symbols, ids(&["1"]));

        let config = ids(&["q1", "Not", "[", "0", "1", "]"]);
        let (mconfs, symbols) = config_parser(&config);
        assert_eq!(mconfs, ids(&["q1"]));
        assert_eq!(symbols.len(), 5);
    }

    #[test]
    fn test_action_parser() {
        let action = ids(&["P0", "R", "q2"]);
        let (tasks, next) = action_parser(&action).unwrap();
        assert_eq!(tasks, ids(&["P0", "R"]));
        assert_eq!(next.as_id(), Some("q2"));

        let action = ids(&["q2"]);
        let (tasks, next) = action_parser(&action).unwrap();
        assert!(tasks.is_empty());
        assert_eq!(next.as_id(), Some("q2"));

        assert!(action_parser(&[]).is_err());
    }
}
