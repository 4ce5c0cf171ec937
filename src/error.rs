// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use thiserror::Error;

use crate::location::Location;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RegexError {
    /// Malformed pattern text: bad escape, unterminated class or group,
    /// invalid hex or Unicode sequence.
    #[error("{0} ({1})")]
    Lex(String, Location),

    /// Well-formed tokens in an invalid arrangement.
    #[error("{0} ({1})")]
    Parse(String, Location),

    /// The compiler met a tree it can not translate. Trees produced by
    /// the parser never trigger this.
    #[error("compile error: {0}")]
    CompileInvariant(String),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Reasons an execution is aborted before it can decide
/// whether the subject matches.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum RuntimeError {
    #[error("backtracking limit exceeded")]
    BacktrackLimitExceeded,

    #[error("backtracking stack overflow")]
    StackOverflow,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::location::Location;

    use super::{RegexError, RuntimeError};

    #[test]
    fn test_error_message() {
        assert_eq!(
            RegexError::Lex(
                "Unterminated character class.".to_owned(),
                Location::new_position(3, 0, 3)
            )
            .to_string(),
            "Unterminated character class. (line 1, column 4)"
        );

        let e: RegexError = RuntimeError::BacktrackLimitExceeded.into();
        assert_eq!(e.to_string(), "backtracking limit exceeded");
    }
}
