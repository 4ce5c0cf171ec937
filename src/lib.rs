// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

mod charwithposition;
mod peekableiter;
mod printer;
mod rulechecker;
mod unicode;

pub mod ast;
pub mod compiler;
pub mod error;
pub mod location;
pub mod matcher;
pub mod program;
pub mod regex;
pub mod syntax;
pub mod vm;

pub use compiler::{compile, compile_from_str};
pub use error::{RegexError, RuntimeError};
pub use regex::{CaptureMatches, Captures, Match, Matches, Regex, RegexBuilder};
pub use syntax::{lex_from_str, parse, parse_from_str, tokenize};
pub use vm::{execute, search, ExecOptions, MatchResult};
