// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::ops::{Add, BitOr, Mul};

use crate::ast::{Atom, Expression, Factor, Term};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MatchLength {
    Variable,
    Fixed(usize), // length by char (unicode char codepoint)
}

impl Add for MatchLength {
    type Output = MatchLength;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (MatchLength::Fixed(v0), MatchLength::Fixed(v1)) => MatchLength::Fixed(v0 + v1),
            _ => MatchLength::Variable,
        }
    }
}

impl Mul<usize> for MatchLength {
    type Output = MatchLength;

    fn mul(self, rhs: usize) -> Self::Output {
        match self {
            MatchLength::Variable => MatchLength::Variable,
            MatchLength::Fixed(v) => MatchLength::Fixed(v * rhs),
        }
    }
}

impl BitOr for MatchLength {
    type Output = MatchLength;

    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (MatchLength::Fixed(v0), MatchLength::Fixed(v1)) if v0 == v1 => MatchLength::Fixed(v0),
            _ => MatchLength::Variable,
        }
    }
}

/// The number of code points every match of the expression consumes,
/// when it is the same for all of them.
pub fn get_match_length(exp: &Expression) -> MatchLength {
    exp.terms
        .iter()
        .map(get_term_match_length)
        .reduce(|acc, item| acc | item)
        .unwrap_or(MatchLength::Fixed(0))
}

fn get_term_match_length(term: &Term) -> MatchLength {
    term.factors
        .iter()
        .map(get_factor_match_length)
        .fold(MatchLength::Fixed(0), |acc, item| acc + item)
}

fn get_factor_match_length(factor: &Factor) -> MatchLength {
    match factor {
        Factor::Assertion(_) => MatchLength::Fixed(0),
        Factor::Quantified(atom, quantifier) => match quantifier.bounds() {
            // `x{0}` never consumes anything
            (_, Some(0)) => MatchLength::Fixed(0),
            (min, Some(max)) if min == max => get_atom_match_length(atom) * min,
            _ => MatchLength::Variable,
        },
    }
}

fn get_atom_match_length(atom: &Atom) -> MatchLength {
    match atom {
        Atom::Literal(_)
        | Atom::AnyCharacter
        | Atom::CharacterClass(_)
        | Atom::UnicodeProperty(_) => MatchLength::Fixed(1),
        Atom::CapturingGroup { body, .. }
        | Atom::NamedCapturingGroup { body, .. }
        | Atom::NonCapturingGroup(body) => get_match_length(body),
        Atom::Backreference(_) => MatchLength::Variable,
    }
}

/// Whether the expression has a way to succeed without consuming
/// any code point.
///
/// Backreferences are assumed to possibly match the empty string.
pub fn can_match_empty(exp: &Expression) -> bool {
    exp.terms.iter().any(|term| {
        term.factors.iter().all(|factor| match factor {
            Factor::Assertion(_) => true,
            Factor::Quantified(atom, quantifier) => {
                let (min, _) = quantifier.bounds();
                min == 0 || atom_can_match_empty(atom)
            }
        })
    })
}

/// See `can_match_empty`.
pub fn atom_can_match_empty(atom: &Atom) -> bool {
    match atom {
        Atom::Literal(_)
        | Atom::AnyCharacter
        | Atom::CharacterClass(_)
        | Atom::UnicodeProperty(_) => false,
        Atom::CapturingGroup { body, .. }
        | Atom::NamedCapturingGroup { body, .. }
        | Atom::NonCapturingGroup(body) => can_match_empty(body),
        Atom::Backreference(_) => true,
    }
}

/// Whether every alternative of the expression starts with `^`.
pub fn is_anchored_start(exp: &Expression) -> bool {
    !exp.terms.is_empty() && exp.terms.iter().all(|term| term.has_start_anchor)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::syntax::parser::parse_from_str;

    use super::{can_match_empty, get_match_length, is_anchored_start, MatchLength};

    fn length_of(s: &str) -> MatchLength {
        get_match_length(&parse_from_str(s).unwrap().expression)
    }

    fn empty_of(s: &str) -> bool {
        can_match_empty(&parse_from_str(s).unwrap().expression)
    }

    #[test]
    fn test_match_length() {
        assert_eq!(length_of("abc"), MatchLength::Fixed(3));
        assert_eq!(length_of("a\\d[xyz]."), MatchLength::Fixed(4));
        assert_eq!(length_of("a{3}"), MatchLength::Fixed(3));
        assert_eq!(length_of("(ab){2}c"), MatchLength::Fixed(5));
        assert_eq!(length_of("ab|cd"), MatchLength::Fixed(2));
        assert_eq!(length_of("a(?=xyz)b"), MatchLength::Fixed(2));
        assert_eq!(length_of("\\bab\\b"), MatchLength::Fixed(2));
        assert_eq!(length_of("ax{0}"), MatchLength::Fixed(1));

        assert_eq!(length_of("ab|c"), MatchLength::Variable);
        assert_eq!(length_of("a?"), MatchLength::Variable);
        assert_eq!(length_of("a+"), MatchLength::Variable);
        assert_eq!(length_of("a{2,3}"), MatchLength::Variable);
        assert_eq!(length_of("(a)\\1"), MatchLength::Variable);
    }

    #[test]
    fn test_can_match_empty() {
        assert!(!empty_of("a"));
        assert!(!empty_of("(a|b)+"));
        assert!(!empty_of("a{1,}"));

        assert!(empty_of("a*"));
        assert!(empty_of("a?b?"));
        assert!(empty_of("a|"));
        assert!(empty_of("(a*)"));
        assert!(empty_of("a{0,3}"));
        assert!(empty_of("\\b"));
        assert!(empty_of("(?=a)"));
        assert!(empty_of("(a?)\\1"));
        assert!(!empty_of("(a)\\1"));
    }

    #[test]
    fn test_anchored_start() {
        assert!(is_anchored_start(&parse_from_str("^a").unwrap().expression));
        assert!(is_anchored_start(&parse_from_str("^a|^b").unwrap().expression));
        assert!(!is_anchored_start(&parse_from_str("^a|b").unwrap().expression));
        assert!(!is_anchored_start(&parse_from_str("a$").unwrap().expression));
    }
}
