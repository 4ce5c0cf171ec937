// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Unicode property lookup.
//!
//! The property tables are borrowed from `regex-syntax`: a property such as
//! `\p{Greek}` or `\p{Script=Greek}` is handed to its parser and the
//! resulting class is copied into a `CharSet`. Names and values are
//! resolved loosely (case, spaces, `-` and `_` are ignored), as UTS#18
//! recommends.

use regex_syntax::{
    hir::{Class, HirKind},
    ParserBuilder,
};

use crate::matcher::CharSet;

/// Returns the code points that have the property `name` (or `name=value`).
///
/// The negation of `\P{..}` is not applied here, the caller flips the flag
/// of the returned set.
pub fn lookup_property(name: &str, value: Option<&str>) -> Result<CharSet, String> {
    if !is_valid_property_text(name) || !value.map_or(true, is_valid_property_text) {
        return Err(format!("Invalid unicode property name \"{}\".", name));
    }

    let pattern = match value {
        Some(value) => format!("\\p{{{}={}}}", name, value),
        None => format!("\\p{{{}}}", name),
    };

    let hir = ParserBuilder::new()
        .build()
        .parse(&pattern)
        .map_err(|_| match value {
            Some(value) => format!("Unknown unicode property \"{}={}\".", name, value),
            None => format!("Unknown unicode property \"{}\".", name),
        })?;

    let ranges = match hir.kind() {
        HirKind::Class(Class::Unicode(class)) => class
            .iter()
            .map(|range| (range.start(), range.end()))
            .collect::<Vec<(char, char)>>(),
        HirKind::Class(Class::Bytes(class)) => class
            .iter()
            .map(|range| (range.start() as char, range.end() as char))
            .collect(),
        HirKind::Literal(literal) => {
            // a property with a single member
            std::str::from_utf8(&literal.0)
                .map_err(|_| format!("Unsupported unicode property \"{}\".", name))?
                .chars()
                .map(|c| (c, c))
                .collect()
        }
        HirKind::Empty => vec![],
        _ => return Err(format!("Unsupported unicode property \"{}\".", name)),
    };

    Ok(CharSet::from_ranges(&ranges, false))
}

// the text is spliced into a pattern, only accept what a property name can hold
fn is_valid_property_text(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' ' | '.'))
}
