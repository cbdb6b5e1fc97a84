//! This module turns raw rule text into tokens. The line filter drops comments and blank
//! lines; the tokenizer lexes each remaining line with the `pest` grammar in `grammar.pest`
//! and groups lines into rules using the indentation convention of the notation.

use crate::types::{TuringMachineError, DEFAULT_COMMENT_SYMBOL};
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;
use std::collections::VecDeque;
use std::fmt;
use std::str::Split;

/// Derives a `PestParser` for the line grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct LineParser;

/// A lexical token of the rule notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Any identifier, number, task or reserved word.
    Id(String),
    LBracket,
    RBracket,
    /// The `->` separating a config from its action.
    Arrow,
    /// Ends a rule.
    Newline,
    /// Stands for "the m-configuration of the previous rule".
    Indent,
}

impl Token {
    /// The source text of the token. `Newline` is `"\n"` and `Indent` a single space.
    pub fn as_str(&self) -> &str {
        match self {
            Token::Id(id) => id,
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Arrow => "->",
            Token::Newline => "\n",
            Token::Indent => " ",
        }
    }

    /// The identifier text, if this is an identifier.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            Token::Id(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line boundaries: `\n`, `\r`, vertical tab, form feed, the file/group/record
/// separators, NEL and the Unicode line and paragraph separators.
pub fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{1C}'..='\u{1E}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Blanks as the line grammar sees them.
pub fn is_blank(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{1C}'..='\u{1F}')
}

/// Line iterator that removes comments and empty lines from a multiline string.
///
/// Lines are truncated at the first comment marker but keep their leading
/// whitespace, which the tokenizer relies on. A `\r\n` pair yields an empty line
/// in between, which is dropped like any other blank line.
#[derive(Debug, Clone)]
pub struct PreTokenizer<'a> {
    lines: Split<'a, fn(char) -> bool>,
    comment_symbol: &'a str,
}

impl<'a> Iterator for PreTokenizer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        for raw in self.lines.by_ref() {
            let line = match raw.split_once(self.comment_symbol) {
                Some((code, _)) if !self.comment_symbol.is_empty() => code,
                _ => raw,
            };
            if !line.trim_end_matches(is_blank).is_empty() {
                return Some(line);
            }
        }
        None
    }
}

/// Filters comments (starting at `comment_symbol`) and blank lines out of `data`.
pub fn pre_tokenizer<'a>(data: &'a str, comment_symbol: &'a str) -> PreTokenizer<'a> {
    PreTokenizer {
        lines: data.split(is_line_break as fn(char) -> bool),
        comment_symbol,
    }
}

/// Lexes a single filtered line into its tokens.
pub fn lex_line(line: &str) -> Result<Vec<Token>, TuringMachineError> {
    let pairs = LineParser::parse(Rule::line, line).map_err(Box::new)?;

    Ok(pairs
        .flat_map(|pair| pair.into_inner())
        .filter_map(|pair| match pair.as_rule() {
            Rule::lbracket => Some(Token::LBracket),
            Rule::rbracket => Some(Token::RBracket),
            Rule::arrow => Some(Token::Arrow),
            Rule::identifier => Some(Token::Id(pair.as_str().to_string())),
            _ => None, // EOI
        })
        .collect())
}

/// Lazy token stream over rule text, always terminated by exactly one `Newline`.
///
/// A line that is not indented, or an indented line containing `->` anywhere (even
/// inside an identifier such as `a->b`), starts a new rule once the pending one
/// already has an arrow. An indented line starting a
/// rule is prefixed with `Token::Indent`. Indented lines without an arrow continue
/// the pending rule.
pub struct Tokens<'a> {
    lines: PreTokenizer<'a>,
    buffer: Vec<Token>,
    ready: VecDeque<Token>,
    finished: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(data: &'a str, comment_symbol: &'a str) -> Self {
        Self {
            lines: pre_tokenizer(data, comment_symbol),
            buffer: Vec::new(),
            ready: VecDeque::new(),
            finished: false,
        }
    }

    fn feed(&mut self, line: &str) -> Result<(), TuringMachineError> {
        let indented = line.starts_with(' ');
        let tokens = lex_line(line)?;

        if self.buffer.contains(&Token::Arrow) && (line.contains("->") || !indented) {
            self.flush();
            if indented {
                self.buffer.push(Token::Indent);
            }
        } else if indented && self.buffer.is_empty() {
            self.buffer.push(Token::Indent);
        }

        self.buffer.extend(tokens);
        Ok(())
    }

    fn flush(&mut self) {
        self.ready.extend(self.buffer.drain(..));
        self.ready.push_back(Token::Newline);
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, TuringMachineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.ready.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            match self.lines.next() {
                Some(line) => {
                    if let Err(e) = self.feed(line) {
                        self.finished = true;
                        return Some(Err(e));
                    }
                }
                None => {
                    self.flush();
                    self.finished = true;
                }
            }
        }
    }
}

/// Tokenizes rule text using the default `#` comment marker.
pub fn tokenizer(data: &str) -> Tokens<'_> {
    Tokens::new(data, DEFAULT_COMMENT_SYMBOL)
}
