// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use regex_backtrack::Regex;

pub fn main() {
    let re =
        Regex::new(r"#(?<red>[\da-fA-F]{2})(?<green>[\da-fA-F]{2})(?<blue>[\da-fA-F]{2})").unwrap();
    let text = "The color is #ffbb33 and the background is #bbdd99.";

    // capture groups once
    if let Some(m) = re.captures(text).unwrap() {
        println!("Found match: {}", m.get(0).unwrap().as_str());
        println!("Red: {}", m.name("red").unwrap().as_str());
        println!("Green: {}", m.name("green").unwrap().as_str());
        println!("Blue: {}", m.name("blue").unwrap().as_str());
    } else {
        println!("No match found");
    }

    // capture groups all
    for m in re.captures_iter(text) {
        let m = m.unwrap();
        let (whole, [red, green, blue]) = m.extract();
        println!("Found match: {} ({}, {}, {})", whole, red, green, blue);
    }

    // back-reference to a named group
    let re = Regex::new(r"<(?<tag>\w+)>(?<content>.*?)</\k<tag>>").unwrap();
    let text = "<b>bold</b> and <i>italic</i>";
    for m in re.captures_iter(text) {
        let m = m.unwrap();
        println!("{}: {}", &m["tag"], &m["content"]);
    }
}
