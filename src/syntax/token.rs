// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::{Display, Write};

use crate::location::Location;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    // literal character outside a character class
    Char(char),

    // code point written as `\xHH`, `\uHHHH` or `\u{H..H}` outside a character class
    CodePoint(char),

    // `.`
    AnyChar,

    // `^` and `$`
    StartAnchor,
    EndAnchor,

    // `?`, `??`, `{}`
    Optional,
    OptionalLazy,

    // `*`, `*?`
    ZeroOrMore,
    ZeroOrMoreLazy,

    // `+`, `+?`
    OneOrMore,
    OneOrMoreLazy,

    // `{m}`, `{m,}`, `{,n}`, `{m,n}`, the flag is `true` when followed by `?`
    Repetition(Repetition, bool),

    // `|`
    Alternation,

    // `[`, `[^` and `]`
    CharSetStart,
    CharSetStartNegative,
    CharSetEnd,

    // character class members
    CharSetChar(char),
    CharSetRange(char, char),

    // `(`
    GroupStart,

    // `(?:`
    NonCapturing,

    // `(?<name>`, `(?'name'` and `(?P<name>`
    NamedCapture(String),

    // `(?=`, `(?!`, `(?<=`, `(?<!`
    LookAhead,
    LookAheadNegative,
    LookBehind,
    LookBehindNegative,

    // `)`
    GroupEnd,

    // `\1` to `\9`
    BackReferenceNumber(usize),

    // `\k<name>`
    BackReferenceName(String),

    // one of `d D s S w W b B`
    SpecialSequence(char),

    // `\p{...}` and `\P{...}`
    UnicodeProperty(UnicodeProperty),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Repetition {
    Specified(usize),
    AtLeast(usize),
    Range(usize, usize),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UnicodeProperty {
    pub name: String,
    pub value: Option<String>,
    pub negated: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct TokenWithRange {
    pub token: Token,
    pub range: Location,
}

impl TokenWithRange {
    pub fn new(token: Token, range: Location) -> Self {
        Self { token, range }
    }

    pub fn from_position_and_length(token: Token, position: &Location, length: usize) -> Self {
        Self {
            token,
            range: Location::from_position_and_length(position, length),
        }
    }
}

// Characters that must be escaped to stand for themselves outside a class.
const META_CHARS: &str = "\\^$.|?*+()[]{}";

// Characters that must be escaped to stand for themselves inside a class.
const CHARSET_META_CHARS: &str = "\\]^-[";

fn write_control_char(f: &mut std::fmt::Formatter<'_>, c: char) -> Result<bool, std::fmt::Error> {
    match c {
        '\n' => f.write_str("\\n")?,
        '\t' => f.write_str("\\t")?,
        '\r' => f.write_str("\\r")?,
        '\u{0c}' => f.write_str("\\f")?,
        '\u{0b}' => f.write_str("\\v")?,
        _ => return Ok(false),
    }
    Ok(true)
}

fn write_char(f: &mut std::fmt::Formatter<'_>, c: char, meta_chars: &str) -> std::fmt::Result {
    if write_control_char(f, c)? {
        return Ok(());
    }
    if meta_chars.contains(c) {
        f.write_char('\\')?;
    }
    f.write_char(c)
}

impl Display for UnicodeProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.negated { "\\P{" } else { "\\p{" })?;
        f.write_str(&self.name)?;
        if let Some(value) = &self.value {
            write!(f, "={}", value)?;
        }
        f.write_char('}')
    }
}

impl Display for Repetition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Repetition::Specified(m) => write!(f, "{{{}}}", m),
            Repetition::AtLeast(m) => write!(f, "{{{},}}", m),
            Repetition::Range(m, n) => write!(f, "{{{},{}}}", m, n),
        }
    }
}

/// Renders the token back into pattern text. Lexing the concatenated
/// rendering of a token stream yields the same stream again.
impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Char(c) => write_char(f, *c, META_CHARS),
            Token::CodePoint(c) => write!(f, "\\u{{{:x}}}", *c as u32),
            Token::AnyChar => f.write_char('.'),
            Token::StartAnchor => f.write_char('^'),
            Token::EndAnchor => f.write_char('$'),
            Token::Optional => f.write_char('?'),
            Token::OptionalLazy => f.write_str("??"),
            Token::ZeroOrMore => f.write_char('*'),
            Token::ZeroOrMoreLazy => f.write_str("*?"),
            Token::OneOrMore => f.write_char('+'),
            Token::OneOrMoreLazy => f.write_str("+?"),
            Token::Repetition(repetition, lazy) => {
                write!(f, "{}", repetition)?;
                if *lazy {
                    f.write_char('?')?;
                }
                Ok(())
            }
            Token::Alternation => f.write_char('|'),
            Token::CharSetStart => f.write_char('['),
            Token::CharSetStartNegative => f.write_str("[^"),
            Token::CharSetEnd => f.write_char(']'),
            Token::CharSetChar(c) => write_char(f, *c, CHARSET_META_CHARS),
            Token::CharSetRange(lo, hi) => {
                write_char(f, *lo, CHARSET_META_CHARS)?;
                f.write_char('-')?;
                write_char(f, *hi, CHARSET_META_CHARS)
            }
            Token::GroupStart => f.write_char('('),
            Token::NonCapturing => f.write_str("(?:"),
            Token::NamedCapture(name) => write!(f, "(?<{}>", name),
            Token::LookAhead => f.write_str("(?="),
            Token::LookAheadNegative => f.write_str("(?!"),
            Token::LookBehind => f.write_str("(?<="),
            Token::LookBehindNegative => f.write_str("(?<!"),
            Token::GroupEnd => f.write_char(')'),
            Token::BackReferenceNumber(n) => write!(f, "\\{}", n),
            Token::BackReferenceName(name) => write!(f, "\\k<{}>", name),
            Token::SpecialSequence(c) => write!(f, "\\{}", c),
            Token::UnicodeProperty(property) => write!(f, "{}", property),
        }
    }
}
