// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use regex_backtrack::{Regex, RegexBuilder};

pub fn main() {
    let re = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    println!("{}", re.is_match("2025-04-22").unwrap()); // should be true
    println!("{}", re.is_match("04-22").unwrap()); // should be false

    let re = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    println!("{}", re.is_match("john.doe@example.com").unwrap()); // should be true
    println!("{}", re.is_match("john.doe@example").unwrap()); // should be false

    // the compiled program
    let re = Regex::new(r"^a{2,3}b").unwrap();
    println!("{}", re.program());

    // invalid patterns are reported with their position
    match Regex::new(r"(?<year>\d{4}-(\d{2})") {
        Ok(_) => println!("Unexpected success"),
        Err(e) => println!("Error: {}", e),
    }

    // catastrophic patterns hit the backtracking limit instead of hanging
    let re = RegexBuilder::new()
        .backtrack_limit(10_000)
        .build(r"^(a|aa)+$")
        .unwrap();
    match re.is_match(&format!("{}b", "a".repeat(40))) {
        Ok(matched) => println!("{}", matched),
        Err(e) => println!("Error: {}", e),
    }
}
