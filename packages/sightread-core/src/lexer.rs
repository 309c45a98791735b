//! # Body Lexer
//!
//! Tokenizes the music lines of ABC notation. Only `Body` lines (see
//! [`crate::header::classify`]) are scanned; field lines such as `V:` or `w:`
//! lyrics, directives and comment lines produce no tokens.
//!
//! Within a line, quoted annotations (`"C|G"`), decorations (`!f!`, `+trill+`)
//! and inline fields (`[M:3/4]`) are read as single tokens, so the bar
//! characters they may contain are never mistaken for bar lines. A `%` ends the
//! line.

use crate::header::{classify, LineKind};
use std::iter::Peekable;
use std::str::Chars;

/// Bar line variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLine {
    Plain,       // |
    Double,      // ||
    Final,       // |]
    ThickThin,   // [|
    RepeatStart, // |:
    RepeatEnd,   // :|
    RepeatBoth,  // :: or :|:
}

/// Token types for ABC body lines
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Bar(BarLine),
    Ending(String), // 1, 2, 1,3 after a bar line or [

    Note(char),       // A-G, a-g
    Rest(char),       // z, Z, x, X
    Accidental(char), // ^ _ =
    Octave(char),     // , '
    Length(String),   // 2, /2, 3/2

    ChordStart,    // [
    ChordEnd,      // ]
    GraceStart,    // {
    GraceEnd,      // }
    SlurStart,     // (
    SlurEnd,       // )
    Tuplet(u8),    // (3
    Tie,           // -
    Broken(char),  // > <

    Annotation(String), // "..."
    Decoration(String), // !...!, +...+, or a one-character shorthand
    InlineField { tag: char, value: String },

    Other(char),
}

/// A token with its position in the source
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedToken {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// Lexer for ABC notation bodies
pub struct Lexer<'a> {
    input: &'a str,
    first_line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            first_line: 1,
        }
    }

    /// Report token lines relative to a larger document whose line
    /// `first_line` is the first line of `input`.
    pub fn starting_at_line(mut self, first_line: usize) -> Self {
        self.first_line = first_line;
        self
    }

    pub fn tokenize(&self) -> Vec<LocatedToken> {
        let mut tokens = Vec::new();
        for (offset, line) in self.input.lines().enumerate() {
            if classify(line) == LineKind::Body {
                LineScanner::new(line, self.first_line + offset).scan(&mut tokens);
            }
        }
        tokens
    }
}

struct LineScanner<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    position: usize,
}

impl<'a> LineScanner<'a> {
    fn new(input: &'a str, line: usize) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            line,
            column: 1,
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += c.len_utf8();
        self.column += 1;
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Consume through `close`, returning what came before it. An unclosed
    /// delimiter runs to the end of the line.
    fn take_delimited(&mut self, close: char) -> String {
        let mut content = String::new();
        while let Some(c) = self.advance() {
            if c == close {
                break;
            }
            content.push(c);
        }
        content
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut content = String::new();
        while let Some(c) = self.peek() {
            if !keep(c) {
                break;
            }
            content.push(c);
            self.advance();
        }
        content
    }

    fn take_ending(&mut self) -> Option<Token> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => Some(Token::Ending(
                self.take_while(|c| c.is_ascii_digit() || c == ',' || c == '-'),
            )),
            _ => None,
        }
    }

    fn scan(mut self, tokens: &mut Vec<LocatedToken>) {
        while let Some(c) = self.peek() {
            let column = self.column;

            let token = match c {
                '%' => break,
                ' ' | '\t' | '\\' => {
                    self.advance();
                    continue;
                }
                '"' => {
                    self.advance();
                    Token::Annotation(self.take_delimited('"'))
                }
                '!' | '+' => {
                    self.advance();
                    Token::Decoration(self.take_delimited(c))
                }
                '|' => self.bar_from_pipe(),
                ':' => self.bar_from_colon(),
                '[' => self.open_bracket(),
                ']' => {
                    self.advance();
                    Token::ChordEnd
                }
                '{' => {
                    self.advance();
                    Token::GraceStart
                }
                '}' => {
                    self.advance();
                    Token::GraceEnd
                }
                '(' => {
                    self.advance();
                    match self.peek().and_then(|d| d.to_digit(10)) {
                        Some(n) => {
                            self.advance();
                            Token::Tuplet(n as u8)
                        }
                        None => Token::SlurStart,
                    }
                }
                ')' => {
                    self.advance();
                    Token::SlurEnd
                }
                '-' => {
                    self.advance();
                    Token::Tie
                }
                '>' | '<' => {
                    self.advance();
                    Token::Broken(c)
                }
                '^' | '_' | '=' => {
                    self.advance();
                    Token::Accidental(c)
                }
                ',' | '\'' => {
                    self.advance();
                    Token::Octave(c)
                }
                'A'..='G' | 'a'..='g' => {
                    self.advance();
                    Token::Note(c)
                }
                'z' | 'Z' | 'x' | 'X' => {
                    self.advance();
                    Token::Rest(c)
                }
                '0'..='9' | '/' => Token::Length(self.take_while(|c| c.is_ascii_digit() || c == '/')),
                '.' | '~' | 'H' | 'L' | 'M' | 'O' | 'P' | 'S' | 'T' | 'u' | 'v' => {
                    self.advance();
                    Token::Decoration(c.to_string())
                }
                _ => {
                    self.advance();
                    Token::Other(c)
                }
            };

            let is_bar = matches!(token, Token::Bar(_));
            tokens.push(LocatedToken {
                token,
                line: self.line,
                column,
            });

            if is_bar {
                let column = self.column;
                if let Some(ending) = self.take_ending() {
                    tokens.push(LocatedToken {
                        token: ending,
                        line: self.line,
                        column,
                    });
                }
            }
        }
    }

    fn bar_from_pipe(&mut self) -> Token {
        self.advance(); // |
        let bar = match self.peek() {
            Some('|') => BarLine::Double,
            Some(']') => BarLine::Final,
            Some(':') => BarLine::RepeatStart,
            _ => return Token::Bar(BarLine::Plain),
        };
        self.advance();
        Token::Bar(bar)
    }

    fn bar_from_colon(&mut self) -> Token {
        self.advance(); // :
        match self.peek() {
            Some(':') => {
                self.advance();
                Token::Bar(BarLine::RepeatBoth)
            }
            Some('|') => {
                self.advance();
                if let Some('|') | Some(']') = self.peek() {
                    self.advance();
                }
                if let Some(':') = self.peek() {
                    self.advance();
                    return Token::Bar(BarLine::RepeatBoth);
                }
                Token::Bar(BarLine::RepeatEnd)
            }
            _ => Token::Other(':'),
        }
    }

    fn open_bracket(&mut self) -> Token {
        let mut ahead = self.remaining().chars().skip(1);
        match (ahead.next(), ahead.next()) {
            (Some('|'), _) => {
                self.advance(); // [
                self.advance(); // |
                Token::Bar(BarLine::ThickThin)
            }
            (Some(tag), Some(':')) if tag.is_ascii_alphabetic() => {
                self.advance(); // [
                self.advance(); // tag
                self.advance(); // :
                let value = self.take_delimited(']');
                Token::InlineField {
                    tag,
                    value: value.trim().to_string(),
                }
            }
            (Some(d), _) if d.is_ascii_digit() => {
                self.advance(); // [
                self.take_ending().unwrap_or(Token::ChordStart)
            }
            _ => {
                self.advance();
                Token::ChordStart
            }
        }
    }
}

/// Bar line tokens in a token stream.
pub fn bar_lines(tokens: &[LocatedToken]) -> impl Iterator<Item = BarLine> + '_ {
    tokens.iter().filter_map(|t| match t.token {
        Token::Bar(bar) => Some(bar),
        _ => None,
    })
}
