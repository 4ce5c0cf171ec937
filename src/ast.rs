// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::matcher::CharSet;

/// The root of a parsed pattern.
#[derive(Debug, PartialEq, Clone)]
pub struct Regex {
    pub expression: Expression,

    // the number of capturing groups, group 0 (the whole match) excluded
    pub capture_group_count: usize,

    // indexed by group id, `capture_names[0]` is always `None`
    pub capture_names: Vec<Option<String>>,
}

/// Ordered alternatives, the leftmost successful one wins.
///
/// An expression with a single term is a plain sequence.
#[derive(Debug, PartialEq, Clone)]
pub struct Expression {
    pub terms: Vec<Term>,
}

/// One alternative: an optionally anchored sequence of factors.
/// The factor list may be empty, e.g. the right side of `a|`.
#[derive(Debug, PartialEq, Clone)]
pub struct Term {
    pub has_start_anchor: bool,
    pub has_end_anchor: bool,
    pub factors: Vec<Factor>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Factor {
    Assertion(Assertion),
    Quantified(Atom, Quantifier),
}

/// Zero-width tests, not quantifiable.
#[derive(Debug, PartialEq, Clone)]
pub enum Assertion {
    Lookahead { body: Expression, positive: bool },
    Lookbehind { body: Expression, positive: bool },

    // `\b` when positive, `\B` otherwise
    WordBoundary { positive: bool },
}

#[derive(Debug, PartialEq, Clone)]
pub enum Atom {
    Literal(char),
    AnyCharacter,

    /// Also the desugared form of `\d \D \s \S \w \W`.
    CharacterClass(CharSet),

    UnicodeProperty(UnicodeProperty),

    CapturingGroup {
        id: usize,
        body: Expression,
    },

    NamedCapturingGroup {
        id: usize,
        name: String,
        body: Expression,
    },

    NonCapturingGroup(Expression),
    Backreference(Backreference),
}

/// `\p{name}`, `\p{name=value}` and the negated `\P{..}`.
#[derive(Debug, PartialEq, Clone)]
pub struct UnicodeProperty {
    pub name: String,
    pub value: Option<String>,
    pub negated: bool,

    // the resolved code points, without the negation applied
    pub members: CharSet,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Backreference {
    Index(usize),
    Name(String),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Quantifier {
    pub kind: QuantifierKind,
    pub lazy: bool,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum QuantifierKind {
    Once,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,

    // `{m}`, `{m,n}` and `{m,}` (`None` means unbounded)
    Designated(usize, Option<usize>),
}

impl Quantifier {
    pub fn once() -> Self {
        Self {
            kind: QuantifierKind::Once,
            lazy: false,
        }
    }

    pub fn new(kind: QuantifierKind, lazy: bool) -> Self {
        Self { kind, lazy }
    }

    /// The repetition bounds, `max` is `None` when unbounded.
    pub fn bounds(&self) -> (usize, Option<usize>) {
        match self.kind {
            QuantifierKind::Once => (1, Some(1)),
            QuantifierKind::ZeroOrOne => (0, Some(1)),
            QuantifierKind::ZeroOrMore => (0, None),
            QuantifierKind::OneOrMore => (1, None),
            QuantifierKind::Designated(min, max) => (min, max),
        }
    }
}

impl Expression {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }
}

impl Term {
    /// An unanchored term.
    pub fn from_factors(factors: Vec<Factor>) -> Self {
        Self {
            has_start_anchor: false,
            has_end_anchor: false,
            factors,
        }
    }
}
