// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::location::Location;

#[derive(Debug, PartialEq)]
pub struct CharWithPosition {
    pub character: char,
    pub position: Location,
}

impl CharWithPosition {
    pub fn new(character: char, position: Location) -> Self {
        Self {
            character,
            position,
        }
    }
}

/// Decorates a `char` iterator with the position of every character.
pub struct CharsWithPositionIter<'a> {
    upstream: &'a mut dyn Iterator<Item = char>,
    current_position: Location,
}

impl<'a> CharsWithPositionIter<'a> {
    pub fn new(upstream: &'a mut dyn Iterator<Item = char>) -> Self {
        Self {
            upstream,
            current_position: Location::new_position(0, 0, 0),
        }
    }
}

impl Iterator for CharsWithPositionIter<'_> {
    type Item = CharWithPosition;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.upstream.next()?;
        let position = self.current_position;

        self.current_position.index += 1;
        if c == '\n' {
            self.current_position.line += 1;
            self.current_position.column = 0;
        } else {
            self.current_position.column += 1;
        }

        Some(CharWithPosition::new(c, position))
    }
}

/// The position just past the last character of `s`, used to report
/// errors that are detected at the end of the input.
pub fn end_position_of(s: &str) -> Location {
    let mut chars = s.chars();
    let iter = CharsWithPositionIter::new(&mut chars);
    match iter.last() {
        Some(CharWithPosition {
            character: '\n',
            position,
        }) => Location::new_position(position.index + 1, position.line + 1, 0),
        Some(CharWithPosition { position, .. }) => position.move_position_forward(),
        None => Location::new_position(0, 0, 0),
    }
}
