// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The front end: pattern text to tokens, tokens to AST.

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{lex_from_str, tokenize};
pub use parser::{parse, parse_from_str};
