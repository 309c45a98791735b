//! # Line Records
//!
//! Splits ABC notation text into classified line records so header fields can
//! be read without pattern matching over the raw text.
//!
//! ## Line Kinds
//! - `Field` - `X:`, `M:`, `L:`, `K:`, `V:`, `w:` ... (tag letter, colon, value)
//! - `Directive` - `%%MIDI ...`, `%%score ...`
//! - `Comment` - any other line starting with `%`
//! - `Blank` - empty or whitespace only
//! - `Body` - music: notes, rests, bar lines
//!
//! Field values have trailing `%` comments removed and are trimmed.
//!
//! ## Example
//! ```rust
//! use sightread::header::{find_field, records, LineKind};
//!
//! let abc = "X:1\nM:3/4 % waltz\nK:G\n| G A B |";
//! assert_eq!(find_field(abc, 'M'), Some("3/4"));
//!
//! let kinds: Vec<_> = records(abc).map(|r| r.kind).collect();
//! assert_eq!(kinds[3], LineKind::Body);
//! ```

/// Classification of a single line of notation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Field { tag: char, value: &'a str },
    Directive(&'a str),
    Comment,
    Blank,
    Body,
}

/// A line of notation text with its 1-indexed line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    pub number: usize,
    pub text: &'a str,
    pub kind: LineKind<'a>,
}

/// The music section of a piece of notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body<'a> {
    pub text: &'a str,
    /// Line number (1-indexed) of the first line of `text` in the full notation.
    pub first_line: usize,
}

pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if let Some(directive) = trimmed.strip_prefix("%%") {
        return LineKind::Directive(directive.trim());
    }
    if trimmed.starts_with('%') {
        return LineKind::Comment;
    }
    match parse_field(trimmed) {
        Some((tag, value)) => LineKind::Field { tag, value },
        None => LineKind::Body,
    }
}

fn parse_field(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    let tag = chars.next()?;
    if !tag.is_ascii_alphabetic() || chars.next()? != ':' {
        return None;
    }
    // Tag and colon are both ASCII, so the value starts at byte 2.
    let value = &line[2..];
    let value = match value.find('%') {
        Some(idx) => &value[..idx],
        None => value,
    };
    Some((tag, value.trim()))
}

pub fn records(text: &str) -> impl Iterator<Item = LineRecord<'_>> {
    text.lines().enumerate().map(|(idx, line)| LineRecord {
        number: idx + 1,
        text: line,
        kind: classify(line),
    })
}

/// Value of the first field line with the given tag.
pub fn find_field(text: &str, tag: char) -> Option<&str> {
    records(text).find_map(|record| match record.kind {
        LineKind::Field { tag: t, value } if t == tag => Some(value),
        _ => None,
    })
}

/// Everything from the key signature (`K:`) line onward.
///
/// Header metadata such as titles can contain `|` characters, so bar lines are
/// only looked for after the key field. Without a `K:` line the whole text is
/// treated as body.
pub fn body(text: &str) -> Body<'_> {
    let mut offset = 0;
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if let LineKind::Field { tag: 'K', .. } = classify(line) {
            return Body {
                text: &text[offset..],
                first_line: idx + 1,
            };
        }
        offset += line.len();
    }
    Body {
        text,
        first_line: 1,
    }
}
