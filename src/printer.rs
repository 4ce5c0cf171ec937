// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Renders the AST back into pattern text. The output is canonical:
// parsing it again yields an equal tree.

use std::fmt::{Display, Write};

use crate::ast::{
    Assertion, Atom, Backreference, Expression, Factor, Quantifier, QuantifierKind, Regex, Term,
    UnicodeProperty,
};

fn write_literal(f: &mut std::fmt::Formatter<'_>, c: char) -> std::fmt::Result {
    match c {
        '\n' => f.write_str("\\n"),
        '\t' => f.write_str("\\t"),
        '\r' => f.write_str("\\r"),
        '\u{0c}' => f.write_str("\\f"),
        '\u{0b}' => f.write_str("\\v"),
        _ if c.is_control() => write!(f, "\\u{{{:x}}}", c as u32),
        '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' => {
            write!(f, "\\{}", c)
        }
        _ => f.write_char(c),
    }
}

impl Display for Backreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backreference::Index(index) => write!(f, "\\{}", index),
            Backreference::Name(name) => write!(f, "\\k<{}>", name),
        }
    }
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

impl Display for Quantifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            QuantifierKind::Once => return Ok(()),
            QuantifierKind::ZeroOrOne => f.write_char('?')?,
            QuantifierKind::ZeroOrMore => f.write_char('*')?,
            QuantifierKind::OneOrMore => f.write_char('+')?,
            QuantifierKind::Designated(min, Some(max)) if min == max => write!(f, "{{{}}}", min)?,
            QuantifierKind::Designated(min, Some(max)) => write!(f, "{{{},{}}}", min, max)?,
            QuantifierKind::Designated(min, None) => write!(f, "{{{},}}", min)?,
        }

        if self.lazy {
            f.write_char('?')?;
        }
        Ok(())
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Atom::Literal(c) => write_literal(f, *c),
            Atom::AnyCharacter => f.write_char('.'),
            Atom::CharacterClass(charset) => write!(f, "{}", charset),
            Atom::UnicodeProperty(property) => write!(f, "{}", property),
            Atom::CapturingGroup { body, .. } => write!(f, "({})", body),
            Atom::NamedCapturingGroup { name, body, .. } => write!(f, "(?<{}>{})", name, body),
            Atom::NonCapturingGroup(body) => write!(f, "(?:{})", body),
            Atom::Backreference(backreference) => write!(f, "{}", backreference),
        }
    }
}

impl Display for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Assertion::Lookahead { body, positive } => {
                write!(f, "(?{}{})", if *positive { '=' } else { '!' }, body)
            }
            Assertion::Lookbehind { body, positive } => {
                write!(f, "(?<{}{})", if *positive { '=' } else { '!' }, body)
            }
            Assertion::WordBoundary { positive } => {
                f.write_str(if *positive { "\\b" } else { "\\B" })
            }
        }
    }
}

impl Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Factor::Assertion(assertion) => write!(f, "{}", assertion),
            Factor::Quantified(atom, quantifier) => write!(f, "{}{}", atom, quantifier),
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_start_anchor {
            f.write_char('^')?;
        }
        for factor in &self.factors {
            write!(f, "{}", factor)?;
        }
        if self.has_end_anchor {
            f.write_char('$')?;
        }
        Ok(())
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, term) in self.terms.iter().enumerate() {
            if index > 0 {
                f.write_char('|')?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

impl Display for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}
