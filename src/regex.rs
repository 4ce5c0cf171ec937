// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::{
    fmt::Display,
    ops::{Index, Range},
    str::FromStr,
};

use crate::{
    compiler::compile_from_str,
    error::RegexError,
    program::Program,
    vm::{search_with_options, ExecOptions, MatchResult},
};

/// Configure and build a `Regex`.
#[derive(Debug, Clone, Default)]
pub struct RegexBuilder {
    options: ExecOptions,
}

impl RegexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of backtracking steps of one search,
    /// exceeding it aborts the search with
    /// `RuntimeError::BacktrackLimitExceeded`.
    pub fn backtrack_limit(&mut self, limit: usize) -> &mut Self {
        self.options.backtrack_limit = limit;
        self
    }

    /// Limit the number of pending choice points,
    /// exceeding it aborts the search with `RuntimeError::StackOverflow`.
    pub fn max_stack(&mut self, max_stack: usize) -> &mut Self {
        self.options.max_stack = max_stack;
        self
    }

    /// Print the executed instructions to stderr (debug builds only).
    pub fn trace(&mut self, trace: bool) -> &mut Self {
        self.options.trace = trace;
        self
    }

    pub fn build(&self, pattern: &str) -> Result<Regex, RegexError> {
        let program = compile_from_str(pattern)?;
        Ok(Regex {
            pattern: pattern.to_owned(),
            program,
            options: self.options,
        })
    }
}

/// A compiled regular expression.
///
/// Positions in the returned `Match` and `Captures` are byte offsets
/// into the text.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    program: Program,
    options: ExecOptions,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, RegexError> {
        RegexBuilder::new().build(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn is_match(&self, text: &str) -> Result<bool, RegexError> {
        let subject = Subject::new(text);
        Ok(self.search(&subject, 0)?.is_some())
    }

    pub fn find<'a, 'b>(&'a self, text: &'b str) -> Result<Option<Match<'a, 'b>>, RegexError> {
        self.find_from_pos(text, 0)
    }

    /// Search starting at the byte position `pos`. A position inside
    /// a multi-byte character starts at the next character.
    pub fn find_from_pos<'a, 'b>(
        &'a self,
        text: &'b str,
        pos: usize,
    ) -> Result<Option<Match<'a, 'b>>, RegexError> {
        let subject = Subject::new(text);
        let start = subject.char_index(pos);
        let result = self.search(&subject, start)?;
        Ok(result.map(|result| subject.new_match(&result, 0, None)))
    }

    pub fn find_iter<'a, 'b>(&'a self, text: &'b str) -> Matches<'a, 'b> {
        Matches {
            inner: SearchIter::new(self, text),
        }
    }

    pub fn captures<'a, 'b>(
        &'a self,
        text: &'b str,
    ) -> Result<Option<Captures<'a, 'b>>, RegexError> {
        let subject = Subject::new(text);
        let result = self.search(&subject, 0)?;
        Ok(result.map(|result| build_captures(self, &subject, &result)))
    }

    pub fn captures_iter<'a, 'b>(&'a self, text: &'b str) -> CaptureMatches<'a, 'b> {
        CaptureMatches {
            inner: SearchIter::new(self, text),
        }
    }

    /// The number of capture groups, group 0 (the whole match) included.
    pub fn captures_len(&self) -> usize {
        self.program.capture_group_count + 1
    }

    /// The names of the capture groups in group id order,
    /// `None` for the unnamed ones.
    pub fn capture_names(&self) -> impl Iterator<Item = Option<&str>> {
        self.program.capture_names.iter().map(|item| item.as_deref())
    }

    fn search(&self, subject: &Subject, start: usize) -> Result<Option<MatchResult>, RegexError> {
        search_with_options(&self.program, &subject.chars, start, &self.options)
    }
}

impl Display for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl FromStr for Regex {
    type Err = RegexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Regex::new(s)
    }
}

// The text decoded into code points, along with the byte offset
// of every code point.
struct Subject<'b> {
    text: &'b str,
    chars: Vec<char>,

    // one more entry than `chars`, the last one is the text length
    offsets: Vec<usize>,
}

impl<'b> Subject<'b> {
    fn new(text: &'b str) -> Self {
        let (offsets, chars): (Vec<usize>, Vec<char>) = text.char_indices().unzip();
        let mut offsets = offsets;
        offsets.push(text.len());

        Subject {
            text,
            chars,
            offsets,
        }
    }

    // the index of the first code point starting at or after `pos`
    fn char_index(&self, pos: usize) -> usize {
        self.offsets.partition_point(|offset| *offset < pos)
    }

    fn new_match<'a>(
        &self,
        result: &MatchResult,
        id: usize,
        name: Option<&'a str>,
    ) -> Match<'a, 'b> {
        let (start, end) = result.get(id).unwrap_or((0, 0));
        let (start, end) = (self.offsets[start], self.offsets[end]);
        Match::new(start, end, name, &self.text[start..end])
    }
}

struct SearchIter<'a, 'b> {
    regex: &'a Regex,
    subject: Subject<'b>,

    // the code point index to search from, `None` once exhausted
    next_position: Option<usize>,
}

impl<'a, 'b> SearchIter<'a, 'b> {
    fn new(regex: &'a Regex, text: &'b str) -> Self {
        SearchIter {
            regex,
            subject: Subject::new(text),
            next_position: Some(0),
        }
    }

    fn next_result(&mut self) -> Option<Result<MatchResult, RegexError>> {
        let position = self.next_position?;

        match self.regex.search(&self.subject, position) {
            Ok(Some(result)) => {
                let (start, end) = result.span();

                // skip one code point after an empty match
                let next = if start == end { end + 1 } else { end };
                self.next_position = if next <= self.subject.chars.len() {
                    Some(next)
                } else {
                    None
                };

                Some(Ok(result))
            }
            Ok(None) => {
                self.next_position = None;
                None
            }
            Err(e) => {
                self.next_position = None;
                Some(Err(e))
            }
        }
    }
}

pub struct Matches<'a, 'b> {
    inner: SearchIter<'a, 'b>,
}

impl<'a, 'b> Iterator for Matches<'a, 'b> {
    type Item = Result<Match<'a, 'b>, RegexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next_result()?;
        Some(item.map(|result| self.inner.subject.new_match(&result, 0, None)))
    }
}

pub struct CaptureMatches<'a, 'b> {
    inner: SearchIter<'a, 'b>,
}

impl<'a, 'b> Iterator for CaptureMatches<'a, 'b> {
    type Item = Result<Captures<'a, 'b>, RegexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next_result()?;
        let regex = self.inner.regex;
        Some(item.map(|result| build_captures(regex, &self.inner.subject, &result)))
    }
}

fn build_captures<'a, 'b>(
    regex: &'a Regex,
    subject: &Subject<'b>,
    result: &MatchResult,
) -> Captures<'a, 'b> {
    let matches = regex
        .program
        .capture_names
        .iter()
        .enumerate()
        .map(|(id, name)| {
            result
                .get(id)
                .map(|_| subject.new_match(result, id, name.as_deref()))
        })
        .collect();

    Captures { matches }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Captures<'a, 'b> {
    // indexed by group id, `None` for the groups that did not participate
    pub matches: Vec<Option<Match<'a, 'b>>>,
}

impl Captures<'_, '_> {
    // the following methods are intended to
    // be compatible with the 'Captures' API of crate 'regex':
    // https://docs.rs/regex/latest/regex/struct.Captures.html

    pub fn get(&self, index: usize) -> Option<&Match<'_, '_>> {
        self.matches.get(index).and_then(|item| item.as_ref())
    }

    pub fn name(&self, name: &str) -> Option<&Match<'_, '_>> {
        self.matches.iter().flatten().find(|item| match item.name {
            Some(s) => s == name,
            None => false,
        })
    }

    // e.g.
    //
    // ```
    //   let c = re.captures("...").unwrap().unwrap();
    //   let (whole, [one, two, three]) = c.extract();
    // ```
    //
    // groups that did not participate give the empty string.
    pub fn extract<const N: usize>(&self) -> (&str, [&str; N]) {
        let mut items: [&str; N] = [""; N];
        for (idx, item) in items.iter_mut().enumerate() {
            if let Some(m) = self.get(idx + 1) {
                *item = m.value;
            }
        }
        (self.get(0).map_or("", |m| m.value), items)
    }

    /// The number of groups, group 0 included.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Index<usize> for Captures<'_, '_> {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| {
                panic!(
                    "The capture group {} does not exist or did not participate in the match, \
                     the length of capture groups is {}.",
                    index,
                    self.len()
                )
            })
            .as_str()
    }
}

impl Index<&str> for Captures<'_, '_> {
    type Output = str;

    fn index(&self, name: &str) -> &Self::Output {
        self.name(name)
            .unwrap_or_else(|| panic!("Cannot find the capture group named \"{}\".", name))
            .as_str()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Match<'a, 'b> {
    pub start: usize, // the position of utf-8 byte stream (value included)
    pub end: usize,   // the position of utf-8 byte stream (value excluded)
    pub name: Option<&'a str>,
    pub value: &'b str,
}

impl<'a, 'b> Match<'a, 'b> {
    pub fn new(start: usize, end: usize, name: Option<&'a str>, value: &'b str) -> Self {
        Match {
            start,
            end,
            name,
            value,
        }
    }

    // the following methods are intended to
    // be compatible with the 'Match' API of crate 'regex':
    // https://docs.rs/regex/latest/regex/struct.Match.html

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn range(&self) -> Range<usize> {
        Range {
            start: self.start,
            end: self.end,
        }
    }

    pub fn as_str(&self) -> &'b str {
        self.value
    }
}
