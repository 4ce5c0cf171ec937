// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

/// A predicate over a single code point.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Matcher {
    Literal(char),

    /// Anything except the line terminators `\r`, `\n`, U+2028 and U+2029.
    AnyCharacter,

    Set(CharSet),
}

impl Matcher {
    pub fn matches(&self, c: char) -> bool {
        match self {
            Matcher::Literal(literal) => *literal == c,
            Matcher::AnyCharacter => !is_line_terminator(c),
            Matcher::Set(charset) => charset.matches(c),
        }
    }
}

pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\u{2028}' | '\u{2029}')
}

/// The `\w` definition, shared by the word boundary assertion.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A set of code points made of single code points and inclusive ranges.
///
/// After every mutation the set is normalized: members that overlap or
/// touch are merged, a merged member covering one code point is kept as a
/// single, anything wider as a range. Singles and ranges are sorted, no
/// single is covered by a range and no two ranges overlap or touch. Two
/// sets holding the same code points therefore compare equal.
///
/// A negated set keeps its members and flips the result of `matches`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct CharSet {
    singles: Vec<char>,
    ranges: Vec<(char, char)>,
    negated: bool,
}

impl CharSet {
    pub fn new(negated: bool) -> Self {
        Self {
            singles: vec![],
            ranges: vec![],
            negated,
        }
    }

    pub fn from_ranges(ranges: &[(char, char)], negated: bool) -> Self {
        let mut charset = Self::new(negated);
        charset.ranges.extend_from_slice(ranges);
        charset.normalize();
        charset
    }

    pub fn singles(&self) -> &[char] {
        &self.singles
    }

    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn negate(&mut self) {
        self.negated = !self.negated;
    }

    /// `true` when the set has no member, regardless of the negated flag.
    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.ranges.is_empty()
    }

    /// Raw membership, the negated flag is ignored.
    pub fn contains(&self, c: char) -> bool {
        self.singles.binary_search(&c).is_ok()
            || self
                .ranges
                .binary_search_by(|(lo, hi)| {
                    if *hi < c {
                        std::cmp::Ordering::Less
                    } else if *lo > c {
                        std::cmp::Ordering::Greater
                    } else {
                        std::cmp::Ordering::Equal
                    }
                })
                .is_ok()
    }

    pub fn matches(&self, c: char) -> bool {
        self.contains(c) != self.negated
    }

    pub fn add_char(&mut self, c: char) {
        self.singles.push(c);
        self.normalize();
    }

    pub fn add_range(&mut self, lo: char, hi: char) {
        debug_assert!(lo <= hi);
        self.ranges.push((lo, hi));
        self.normalize();
    }

    /// Adds every code point matched by `other`. A negated `other` is
    /// materialized first, so the negated flag of `self` is kept as is.
    pub fn union(&mut self, other: &CharSet) {
        let other = other.materialize();
        self.singles.extend_from_slice(&other.singles);
        self.ranges.extend_from_slice(&other.ranges);
        self.normalize();
    }

    pub fn remove_char(&mut self, c: char) {
        self.remove_range(c, c);
    }

    /// Drops the covered singles and splits the overlapping ranges.
    pub fn remove_range(&mut self, lo: char, hi: char) {
        self.singles.retain(|c| *c < lo || *c > hi);

        let mut ranges = Vec::with_capacity(self.ranges.len() + 1);
        for (start, end) in self.ranges.drain(..) {
            if end < lo || start > hi {
                ranges.push((start, end));
                continue;
            }

            if start < lo {
                if let Some(before) = char_before(lo) {
                    ranges.push((start, before));
                }
            }
            if end > hi {
                if let Some(after) = char_after(hi) {
                    ranges.push((after, end));
                }
            }
        }

        self.ranges = ranges;
        self.normalize();
    }

    /// Removes every code point matched by `other`.
    pub fn difference(&mut self, other: &CharSet) {
        let other = other.materialize();
        for c in other.singles {
            self.remove_char(c);
        }
        for (lo, hi) in other.ranges {
            self.remove_range(lo, hi);
        }
    }

    /// The code points not in the set, as a positive set.
    /// The negated flag is ignored.
    pub fn complement(&self) -> CharSet {
        let mut complement = CharSet::new(false);
        let mut next_start = Some('\0');

        for (lo, hi) in self.members() {
            if let Some(start) = next_start {
                if start < lo {
                    if let Some(end) = char_before(lo) {
                        complement.ranges.push((start, end));
                    }
                }
            }
            next_start = char_after(hi);
        }

        if let Some(start) = next_start {
            complement.ranges.push((start, char::MAX));
        }

        complement.normalize();
        complement
    }

    /// A positive set with the same matching behaviour.
    pub fn materialize(&self) -> CharSet {
        if self.negated {
            self.complement()
        } else {
            self.clone()
        }
    }

    // singles and ranges merged into one sorted sequence of ranges
    fn members(&self) -> Vec<(char, char)> {
        let mut members = self
            .singles
            .iter()
            .map(|c| (*c, *c))
            .chain(self.ranges.iter().copied())
            .collect::<Vec<(char, char)>>();
        members.sort_unstable();
        members
    }

    fn normalize(&mut self) {
        let mut members = self.members();
        members.dedup();

        let mut merged: Vec<(char, char)> = Vec::with_capacity(members.len());
        for (lo, hi) in members {
            match merged.last_mut() {
                Some((_, last_hi)) if touches(*last_hi, lo) => {
                    if hi > *last_hi {
                        *last_hi = hi;
                    }
                }
                _ => merged.push((lo, hi)),
            }
        }

        let (singles, ranges): (Vec<(char, char)>, Vec<(char, char)>) =
            merged.into_iter().partition(|(lo, hi)| lo == hi);

        self.singles = singles.into_iter().map(|(c, _)| c).collect();
        self.ranges = ranges;
    }
}

// `true` when a range ending at `hi` overlaps or touches a range starting at `lo`
fn touches(hi: char, lo: char) -> bool {
    match char_after(hi) {
        Some(next) => lo <= next,
        None => true,
    }
}

// The code point space is treated as contiguous across the surrogate gap.
pub fn char_after(c: char) -> Option<char> {
    match c {
        '\u{d7ff}' => Some('\u{e000}'),
        char::MAX => None,
        _ => char::from_u32(c as u32 + 1),
    }
}

pub fn char_before(c: char) -> Option<char> {
    match c {
        '\u{e000}' => Some('\u{d7ff}'),
        '\0' => None,
        _ => char::from_u32(c as u32 - 1),
    }
}

/// `\d`, `[0-9]`
pub fn digit_charset() -> CharSet {
    CharSet::from_ranges(&[('0', '9')], false)
}

/// `\w`, `[0-9A-Za-z_]`
pub fn word_charset() -> CharSet {
    CharSet::from_ranges(&[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')], false)
}

/// `\s`
pub fn space_charset() -> CharSet {
    CharSet::from_ranges(
        &[
            ('\t', '\r'), // \t \n \v \f \r
            (' ', ' '),
            ('\u{a0}', '\u{a0}'),
            ('\u{1680}', '\u{1680}'),
            ('\u{2000}', '\u{200a}'),
            ('\u{2028}', '\u{2029}'),
            ('\u{202f}', '\u{202f}'),
            ('\u{205f}', '\u{205f}'),
            ('\u{3000}', '\u{3000}'),
            ('\u{feff}', '\u{feff}'),
        ],
        false,
    )
}

/// Translates one of `d D w W s S` to its set, the upper case
/// letters produce a negated set.
pub fn special_sequence_charset(name: char) -> Option<CharSet> {
    let mut charset = match name.to_ascii_lowercase() {
        'd' => digit_charset(),
        'w' => word_charset(),
        's' => space_charset(),
        _ => return None,
    };

    if name.is_ascii_uppercase() {
        charset.negate();
    }

    Some(charset)
}

fn write_escaped(f: &mut std::fmt::Formatter<'_>, c: char) -> std::fmt::Result {
    if c.is_control() || c.is_whitespace() {
        write!(f, "\\u{{{:x}}}", c as u32)
    } else if "\\]^-[".contains(c) {
        write!(f, "\\{}", c)
    } else {
        write!(f, "{}", c)
    }
}

impl Display for CharSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.negated { "[^" } else { "[" })?;
        for (lo, hi) in self.members() {
            write_escaped(f, lo)?;
            if lo != hi {
                f.write_str("-")?;
                write_escaped(f, hi)?;
            }
        }
        f.write_str("]")
    }
}

impl Display for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Matcher::Literal(c) => write!(f, "{:?}", c),
            Matcher::AnyCharacter => f.write_str("."),
            Matcher::Set(charset) => write!(f, "{}", charset),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quickcheck::{quickcheck, Arbitrary, Gen};

    use super::{
        char_after, char_before, special_sequence_charset, word_charset, CharSet, Matcher,
    };

    #[test]
    fn test_matcher() {
        assert!(Matcher::Literal('a').matches('a'));
        assert!(!Matcher::Literal('a').matches('A'));

        assert!(Matcher::AnyCharacter.matches('a'));
        assert!(Matcher::AnyCharacter.matches('文'));
        assert!(Matcher::AnyCharacter.matches('\t'));
        assert!(!Matcher::AnyCharacter.matches('\n'));
        assert!(!Matcher::AnyCharacter.matches('\r'));
        assert!(!Matcher::AnyCharacter.matches('\u{2028}'));
        assert!(!Matcher::AnyCharacter.matches('\u{2029}'));

        let mut charset = CharSet::from_ranges(&[('a', 'f')], false);
        charset.add_char('x');
        let matcher = Matcher::Set(charset.clone());
        assert!(matcher.matches('a'));
        assert!(matcher.matches('c'));
        assert!(matcher.matches('x'));
        assert!(!matcher.matches('g'));

        charset.negate();
        let matcher = Matcher::Set(charset);
        assert!(!matcher.matches('c'));
        assert!(matcher.matches('g'));
        assert!(matcher.matches('\n'));
    }

    #[test]
    fn test_charset_normalize() {
        let mut charset = CharSet::new(false);
        charset.add_range('d', 'f');
        charset.add_range('a', 'b');
        charset.add_char('e');
        charset.add_char('x');
        charset.add_char('x');
        charset.add_char('m');

        assert_eq!(charset.ranges(), &[('a', 'b'), ('d', 'f')]);
        assert_eq!(charset.singles(), &['m', 'x']);

        // touching ranges merge, and the single that bridges them is absorbed
        charset.add_char('c');
        assert_eq!(charset.ranges(), &[('a', 'f')]);
        assert_eq!(charset.singles(), &['m', 'x']);

        charset.add_range('g', 'l');
        assert_eq!(charset.ranges(), &[('a', 'm')]);
        assert_eq!(charset.singles(), &['x']);

        // overlapping ranges merge
        charset.add_range('k', 'z');
        assert_eq!(charset.ranges(), &[('a', 'z')]);
        assert!(charset.singles().is_empty());

        // across the surrogate gap
        let charset = CharSet::from_ranges(
            &[('\u{d000}', '\u{d7ff}'), ('\u{e000}', '\u{e0ff}')],
            false,
        );
        assert_eq!(charset.ranges(), &[('\u{d000}', '\u{e0ff}')]);
    }

    #[test]
    fn test_charset_remove() {
        let mut charset = CharSet::from_ranges(&[('a', 'z')], false);
        charset.add_char('0');

        charset.remove_char('m');
        assert_eq!(charset.ranges(), &[('a', 'l'), ('n', 'z')]);

        charset.remove_range('k', 'o');
        assert_eq!(charset.ranges(), &[('a', 'j'), ('p', 'z')]);

        charset.remove_char('0');
        assert!(charset.singles().is_empty());

        // boundaries
        charset.remove_range('a', 'a');
        charset.remove_range('z', 'z');
        assert_eq!(charset.ranges(), &[('b', 'j'), ('p', 'y')]);

        charset.remove_range('\0', char::MAX);
        assert!(charset.is_empty());
    }

    #[test]
    fn test_charset_union_and_difference() {
        let mut charset = CharSet::from_ranges(&[('0', '9')], false);
        charset.union(&CharSet::from_ranges(&[('a', 'f')], false));
        assert_eq!(charset.ranges(), &[('0', '9'), ('a', 'f')]);

        charset.difference(&CharSet::from_ranges(&[('5', 'b')], false));
        assert_eq!(charset.ranges(), &[('0', '4'), ('c', 'f')]);

        // `[\D_]`
        let mut charset = CharSet::new(false);
        charset.union(&special_sequence_charset('D').unwrap());
        charset.add_char('_');
        assert!(charset.matches('_'));
        assert!(charset.matches('a'));
        assert!(!charset.matches('5'));
    }

    #[test]
    fn test_charset_complement() {
        let charset = CharSet::from_ranges(&[('b', 'y')], false);
        let complement = charset.complement();
        assert_eq!(
            complement.ranges(),
            &[('\0', 'a'), ('z', char::MAX)]
        );

        let complement = CharSet::new(false).complement();
        assert_eq!(complement.ranges(), &[('\0', char::MAX)]);

        let complement = CharSet::from_ranges(&[('\0', char::MAX)], false).complement();
        assert!(complement.is_empty());

        assert_eq!(word_charset().complement().complement(), word_charset());
    }

    #[test]
    fn test_special_sequence_charset() {
        let digit = special_sequence_charset('d').unwrap();
        assert!(digit.matches('7'));
        assert!(!digit.matches('a'));

        let not_word = special_sequence_charset('W').unwrap();
        assert!(not_word.is_negated());
        assert!(not_word.matches('-'));
        assert!(!not_word.matches('_'));

        let space = special_sequence_charset('s').unwrap();
        for c in [
            '\t', '\n', '\u{0b}', '\u{0c}', '\r', ' ', '\u{a0}', '\u{2005}', '\u{3000}',
            '\u{feff}',
        ] {
            assert!(space.matches(c));
        }
        assert!(!space.matches('x'));

        assert!(special_sequence_charset('b').is_none());
    }

    #[test]
    fn test_char_step() {
        assert_eq!(char_after('a'), Some('b'));
        assert_eq!(char_after('\u{d7ff}'), Some('\u{e000}'));
        assert_eq!(char_after(char::MAX), None);
        assert_eq!(char_before('\u{e000}'), Some('\u{d7ff}'));
        assert_eq!(char_before('\0'), None);
    }

    #[test]
    fn test_charset_display() {
        let mut charset = CharSet::from_ranges(&[('a', 'z')], true);
        charset.add_char('-');
        charset.add_char(' ');
        assert_eq!(charset.to_string(), "[^\\u{20}\\-a-z]");
    }

    #[derive(Debug, Clone)]
    struct ArbitraryCharSet(CharSet);

    impl Arbitrary for ArbitraryCharSet {
        fn arbitrary(g: &mut Gen) -> Self {
            let mut charset = CharSet::new(bool::arbitrary(g));
            for _ in 0..(usize::arbitrary(g) % 6) {
                let a = char::arbitrary(g);
                let b = char::arbitrary(g);
                if bool::arbitrary(g) {
                    charset.add_char(a);
                } else {
                    charset.add_range(a.min(b), a.max(b));
                }
            }
            ArbitraryCharSet(charset)
        }
    }

    quickcheck! {
        fn prop_negation_duality(charset: ArbitraryCharSet, c: char) -> bool {
            let positive = charset.0;
            let mut negative = positive.clone();
            negative.negate();
            positive.matches(c) != negative.matches(c)
        }

        fn prop_complement(charset: ArbitraryCharSet, c: char) -> bool {
            charset.0.complement().contains(c) != charset.0.contains(c)
                && charset.0.materialize().matches(c) == charset.0.matches(c)
        }

        fn prop_normalized(charset: ArbitraryCharSet) -> bool {
            let ranges = charset.0.ranges();
            let singles = charset.0.singles();
            ranges.windows(2).all(|w| char_after(w[0].1).is_some_and(|n| n < w[1].0))
                && singles.windows(2).all(|w| w[0] < w[1])
                && singles.iter().all(|c| {
                    ranges.iter().all(|(lo, hi)| {
                        char_after(*c) != Some(*lo)
                            && char_after(*hi) != Some(*c)
                            && (c < lo || c > hi)
                    })
                })
        }

        fn prop_remove(charset: ArbitraryCharSet, a: char, b: char, c: char) -> bool {
            let (lo, hi) = (a.min(b), a.max(b));
            let mut removed = charset.0.clone();
            removed.remove_range(lo, hi);
            let expected = charset.0.contains(c) && !(lo <= c && c <= hi);
            removed.contains(c) == expected
        }
    }
}
