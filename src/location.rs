// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

/// A position (or a range when `length > 0`) inside a pattern.
///
/// `index` counts code points, not bytes, so a diagnostic can be mapped
/// back onto the pattern text with `pattern.chars().skip(index)`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Location {
    pub index: usize,  // code point offset in the pattern
    pub line: usize,   // 0-based
    pub column: usize, // 0-based
    pub length: usize, // 0 for a single position
}

impl Location {
    pub fn new_position(index: usize, line: usize, column: usize) -> Self {
        Self {
            index,
            line,
            column,
            length: 0,
        }
    }

    pub fn new_range(index: usize, line: usize, column: usize, length: usize) -> Self {
        Self {
            index,
            line,
            column,
            length,
        }
    }

    /// Build a range starting at `position` that spans `length` code points.
    pub fn from_position_and_length(position: &Location, length: usize) -> Self {
        Self::new_range(position.index, position.line, position.column, length)
    }

    /// Build a range covering `position_start` up to and including `position_end_included`.
    pub fn from_position_pair_with_end_included(
        position_start: &Location,
        position_end_included: &Location,
    ) -> Self {
        Self::new_range(
            position_start.index,
            position_start.line,
            position_start.column,
            position_end_included.index - position_start.index + 1,
        )
    }

    /// Join two ranges, the result covers both and everything in between.
    pub fn from_range_pair(range_start: &Location, range_end: &Location) -> Self {
        Self::new_range(
            range_start.index,
            range_start.line,
            range_start.column,
            range_end.index + range_end.length - range_start.index,
        )
    }

    pub fn get_position_by_range_start(&self) -> Self {
        Self::new_position(self.index, self.line, self.column)
    }

    pub fn get_position_by_range_end(&self) -> Self {
        Self::new_position(
            self.index + self.length,
            self.line,
            self.column + self.length,
        )
    }

    pub fn move_position_forward(&self) -> Self {
        Self {
            index: self.index + 1,
            column: self.column + 1,
            ..*self
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.length > 0 {
            write!(
                f,
                "line {}, column {} (length {})",
                self.line + 1,
                self.column + 1,
                self.length
            )
        } else {
            write!(f, "line {}, column {}", self.line + 1, self.column + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Location;

    #[test]
    fn test_location_ranges() {
        let start = Location::new_position(2, 0, 2);
        let end = Location::new_position(5, 0, 5);

        assert_eq!(
            Location::from_position_pair_with_end_included(&start, &end),
            Location::new_range(2, 0, 2, 4)
        );

        let left = Location::new_range(2, 0, 2, 3);
        let right = Location::new_range(7, 0, 7, 2);
        assert_eq!(
            Location::from_range_pair(&left, &right),
            Location::new_range(2, 0, 2, 7)
        );

        assert_eq!(
            right.get_position_by_range_end(),
            Location::new_position(9, 0, 9)
        );
        assert_eq!(start.move_position_forward(), Location::new_position(3, 0, 3));
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new_position(0, 0, 0).to_string(), "line 1, column 1");
        assert_eq!(
            Location::new_range(4, 1, 2, 3).to_string(),
            "line 2, column 3 (length 3)"
        );
    }
}
