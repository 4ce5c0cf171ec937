// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use regex_backtrack::Regex;

pub fn main() {
    let re = Regex::new(r"#[\da-fA-F]{6}").unwrap();
    let text = "The color is #ffbb33 and the background is #bbdd99.";

    // find one
    if let Some(m) = re.find(text).unwrap() {
        println!("Found match: {}", m.as_str());
    } else {
        println!("No match found");
    }

    // find all
    for m in re.find_iter(text) {
        let m = m.unwrap();
        println!("Found match: {} at {:?}", m.as_str(), m.range());
    }

    // lookaround, the prices only
    let re = Regex::new(r"(?<=\$)\d+(?:\.\d{2})?(?!\d)").unwrap();
    let text = "apple $3.50, pear $12, 7 kiwis";
    for m in re.find_iter(text) {
        println!("Price: {}", m.unwrap().as_str());
    }
}
