// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Syntax Summary:
//
// Meta characters and their meanings:
//
// - [ ]      Character class
// - [^ ]     Negated character class
// - {m}      Exact repetition (m times)
// - {m,n}    Repetition range (m to n times)
// - {,n}     Up to n repetitions
// - {m,}     At least m repetitions
// - {}       Same as `?`
// - (xyz)    Capturing group
// - *        Zero or more repetitions
// - +        One or more repetitions
// - ?        Optional, or lazy when it follows another quantifier
// - |        Alternation
// - ^        Start of the subject
// - $        End of the subject
// - .        Any character except line terminators (\r, \n, U+2028, U+2029)
// - \        Escape character
//
// Escape sequences:
//
// - \n \t \r \f \v     Control characters
// - \cX                Control code `X mod 32`
// - \xHH               Code point, two hex digits
// - \uHHHH, \u{H..H}   Code point, four hex digits or 1 to 6 hex digits in braces
// - \p{Name}, \p{Name=Value}, \pL
//                      Unicode property, `\P` for the negation
// - \d \D \w \W \s \S  Special sequences (shorthand character classes)
// - \b \B              Word boundary and non word boundary
// - \1 .. \9           Back-reference by group number (single digit)
// - \k<name>           Back-reference by group name
// - \ + any other ASCII punctuation or non-ASCII character
//                      The character itself
//
// In a character class `[` is literal, `]` is literal when it directly
// follows `[^`, and `-` is literal when it is the first or the last member.
// `[]` is an empty class which matches nothing.
//
// Groups:
//
// - (?:...)                          Non-capturing group
// - (?<name>...) (?'name'...) (?P<name>...)
//                                    Named capturing group
// - (?=...) (?!...)                  Positive and negative lookahead
// - (?<=...) (?<!...)                Positive and negative lookbehind

use crate::{
    charwithposition::{end_position_of, CharWithPosition, CharsWithPositionIter},
    error::RegexError,
    location::Location,
    peekableiter::PeekableIter,
};

use super::token::{Repetition, Token, TokenWithRange, UnicodeProperty};

pub const LEXER_PEEK_CHAR_MAX_COUNT: usize = 3;

/// Turns pattern text into a token stream.
pub fn lex_from_str(s: &str) -> Result<Vec<TokenWithRange>, RegexError> {
    let mut chars = s.chars();
    let mut char_position_iter = CharsWithPositionIter::new(&mut chars);
    let mut peekable_char_position_iter =
        PeekableIter::new(&mut char_position_iter, LEXER_PEEK_CHAR_MAX_COUNT);
    let mut lexer = Lexer::new(&mut peekable_char_position_iter, end_position_of(s));
    lexer.lex()
}

/// Same as `lex_from_str` but without the source ranges.
pub fn tokenize(s: &str) -> Result<Vec<Token>, RegexError> {
    let tokens = lex_from_str(s)?
        .into_iter()
        .map(|token_with_range| token_with_range.token)
        .collect();
    Ok(tokens)
}

struct Lexer<'a> {
    upstream: &'a mut PeekableIter<'a, CharWithPosition>,
    last_position: Location, // last position consumed
    end_position: Location,  // position after the last char
    saved_positions: Vec<Location>,

    // the opening tokens of the groups that are not closed yet
    open_groups: Vec<Location>,
}

impl<'a> Lexer<'a> {
    fn new(upstream: &'a mut PeekableIter<'a, CharWithPosition>, end_position: Location) -> Self {
        Self {
            upstream,
            last_position: Location::new_position(0, 0, 0),
            end_position,
            saved_positions: vec![],
            open_groups: vec![],
        }
    }

    fn next_char(&mut self) -> Option<char> {
        match self.upstream.next() {
            Some(CharWithPosition {
                character,
                position,
            }) => {
                self.last_position = position;
                Some(character)
            }
            None => None,
        }
    }

    fn peek_char(&self, offset: usize) -> Option<&char> {
        match self.upstream.peek(offset) {
            Some(CharWithPosition { character, .. }) => Some(character),
            None => None,
        }
    }

    fn peek_char_and_equals(&self, offset: usize, expected_char: char) -> bool {
        matches!(
            self.upstream.peek(offset),
            Some(CharWithPosition { character, .. }) if character == &expected_char)
    }

    fn peek_position(&self, offset: usize) -> Location {
        match self.upstream.peek(offset) {
            Some(CharWithPosition { position, .. }) => *position,
            None => self.end_position,
        }
    }

    fn push_peek_position(&mut self) {
        self.saved_positions.push(self.peek_position(0));
    }

    fn pop_saved_position(&mut self) -> Location {
        self.saved_positions.pop().unwrap_or(self.last_position)
    }

    // the range from the last saved position to the last consumed char
    fn pop_saved_range(&mut self) -> Location {
        Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        )
    }

    fn expect_char(
        &mut self,
        expected_char: char,
        char_description: &str,
    ) -> Result<(), RegexError> {
        match self.next_char() {
            Some(ch) if ch == expected_char => Ok(()),
            Some(_) => Err(RegexError::Lex(
                format!("Expect char: {}.", char_description),
                self.last_position,
            )),
            None => Err(RegexError::Lex(
                format!("Expect char: {}, but reached the end of pattern.", char_description),
                self.end_position,
            )),
        }
    }
}

impl Lexer<'_> {
    fn lex(&mut self) -> Result<Vec<TokenWithRange>, RegexError> {
        let mut token_with_ranges = vec![];

        while let Some(current_char) = self.peek_char(0) {
            match current_char {
                '[' => {
                    let mut twrs = self.lex_charset()?;
                    token_with_ranges.append(&mut twrs);
                }
                '{' => {
                    let twr = self.lex_repetition()?;
                    token_with_ranges.push(twr);
                }
                '(' if self.peek_char_and_equals(1, '?') => {
                    let twr = self.lex_group_extension()?;
                    self.open_groups.push(twr.range);
                    token_with_ranges.push(twr);
                }
                '(' => {
                    self.next_char(); // consume '('
                    let twr = TokenWithRange::from_position_and_length(
                        Token::GroupStart,
                        &self.last_position,
                        1,
                    );
                    self.open_groups.push(twr.range);
                    token_with_ranges.push(twr);
                }
                ')' => {
                    self.next_char(); // consume ')'
                    if self.open_groups.pop().is_none() {
                        return Err(RegexError::Lex(
                            "Unmatched closing parenthesis.".to_owned(),
                            self.last_position,
                        ));
                    }
                    token_with_ranges.push(TokenWithRange::from_position_and_length(
                        Token::GroupEnd,
                        &self.last_position,
                        1,
                    ));
                }
                '?' | '*' | '+' => {
                    let c = *current_char;
                    self.push_peek_position();
                    self.next_char(); // consume the quantifier

                    let lazy = if self.peek_char_and_equals(0, '?') {
                        self.next_char(); // consume '?'
                        true
                    } else {
                        false
                    };

                    let token = match (c, lazy) {
                        ('?', false) => Token::Optional,
                        ('?', true) => Token::OptionalLazy,
                        ('*', false) => Token::ZeroOrMore,
                        ('*', true) => Token::ZeroOrMoreLazy,
                        ('+', false) => Token::OneOrMore,
                        _ => Token::OneOrMoreLazy,
                    };

                    let range = self.pop_saved_range();
                    token_with_ranges.push(TokenWithRange::new(token, range));
                }
                '^' | '$' | '.' | '|' => {
                    let token = match current_char {
                        '^' => Token::StartAnchor,
                        '$' => Token::EndAnchor,
                        '.' => Token::AnyChar,
                        _ => Token::Alternation,
                    };
                    self.next_char(); // consume current char

                    token_with_ranges.push(TokenWithRange::from_position_and_length(
                        token,
                        &self.last_position,
                        1,
                    ));
                }
                '\\' => {
                    let twr = self.lex_main_escaping()?;
                    token_with_ranges.push(twr);
                }
                _ => {
                    // includes the stray `]` and `}`
                    let c = *current_char;
                    self.next_char(); // consume current char

                    token_with_ranges.push(TokenWithRange::from_position_and_length(
                        Token::Char(c),
                        &self.last_position,
                        1,
                    ));
                }
            }
        }

        if let Some(range) = self.open_groups.last() {
            return Err(RegexError::Lex(
                "Unterminated group.".to_owned(),
                *range,
            ));
        }

        Ok(token_with_ranges)
    }

    fn lex_group_extension(&mut self) -> Result<TokenWithRange, RegexError> {
        // (?...?  //
        // ^    ^__// to here
        // |_______// current char, validated

        self.push_peek_position();

        self.next_char(); // consume '('
        self.next_char(); // consume '?'

        let token = match self.next_char() {
            Some(':') => Token::NonCapturing,
            Some('=') => Token::LookAhead,
            Some('!') => Token::LookAheadNegative,
            Some('<') if self.peek_char_and_equals(0, '=') => {
                self.next_char(); // consume '='
                Token::LookBehind
            }
            Some('<') if self.peek_char_and_equals(0, '!') => {
                self.next_char(); // consume '!'
                Token::LookBehindNegative
            }
            Some('<') => Token::NamedCapture(self.lex_identifier('>')?),
            Some('\'') => Token::NamedCapture(self.lex_identifier('\'')?),
            Some('P') if self.peek_char_and_equals(0, '<') => {
                self.next_char(); // consume '<'
                Token::NamedCapture(self.lex_identifier('>')?)
            }
            Some(_) => {
                return Err(RegexError::Lex(
                    "Unsupported group syntax.".to_owned(),
                    self.pop_saved_range(),
                ));
            }
            None => {
                return Err(RegexError::Lex(
                    "Incomplete group.".to_owned(),
                    self.end_position,
                ));
            }
        };

        let range = self.pop_saved_range();
        Ok(TokenWithRange::new(token, range))
    }

    fn lex_charset(&mut self) -> Result<Vec<TokenWithRange>, RegexError> {
        // [.....]?  //
        // ^      ^__// to here
        // |_________// current char, validated
        //
        // also `[^.....]`

        let mut token_with_ranges = vec![];

        self.push_peek_position();

        self.next_char(); // consume '['

        let negative = self.peek_char_and_equals(0, '^');
        let charset_start = if negative {
            self.next_char(); // consume '^'
            TokenWithRange::new(Token::CharSetStartNegative, self.pop_saved_range())
        } else {
            TokenWithRange::new(Token::CharSetStart, self.pop_saved_range())
        };

        let charset_start_range = charset_start.range;
        token_with_ranges.push(charset_start);

        // `]` directly after `[^` is a member, `[]` is an empty class
        if negative && self.peek_char_and_equals(0, ']') {
            self.next_char(); // consume ']'
            token_with_ranges.push(TokenWithRange::from_position_and_length(
                Token::CharSetChar(']'),
                &self.last_position,
                1,
            ));
        }

        loop {
            match self.peek_char(0) {
                Some(']') => {
                    break;
                }
                Some('-')
                    if matches!(
                        token_with_ranges.last(),
                        Some(TokenWithRange {
                            token: Token::CharSetChar(_),
                            ..
                        })
                    ) && !matches!(self.peek_char(1), Some(']') | None) =>
                {
                    // a range such as `a-z`
                    //
                    // [a-z]
                    //  ^ ^__ // to here
                    //  |____ // merge from here
                    self.next_char(); // consume '-'
                    let dash_position = self.last_position;

                    let upper = self.lex_charset_member()?;
                    match upper.token {
                        Token::CharSetChar(char_end) => {
                            // pop the lower bound that was emitted as a literal
                            let Some(TokenWithRange {
                                token: Token::CharSetChar(char_start),
                                range: lower_range,
                            }) = token_with_ranges.pop()
                            else {
                                unreachable!()
                            };

                            let range = Location::from_range_pair(&lower_range, &upper.range);
                            if char_start > char_end {
                                return Err(RegexError::Lex(
                                    "Character range is out of order.".to_owned(),
                                    range,
                                ));
                            }

                            token_with_ranges.push(TokenWithRange::new(
                                Token::CharSetRange(char_start, char_end),
                                range,
                            ));
                        }
                        _ => {
                            // e.g. `[a-\d]`, the dash is a literal
                            token_with_ranges.push(TokenWithRange::from_position_and_length(
                                Token::CharSetChar('-'),
                                &dash_position,
                                1,
                            ));
                            token_with_ranges.push(upper);
                        }
                    }
                }
                Some(_) => {
                    let twr = self.lex_charset_member()?;
                    token_with_ranges.push(twr);
                }
                None => {
                    return Err(RegexError::Lex(
                        "Unterminated character class.".to_owned(),
                        charset_start_range,
                    ));
                }
            }
        }

        self.next_char(); // consume ']'

        token_with_ranges.push(TokenWithRange::from_position_and_length(
            Token::CharSetEnd,
            &self.last_position,
            1,
        ));

        Ok(token_with_ranges)
    }

    fn lex_charset_member(&mut self) -> Result<TokenWithRange, RegexError> {
        // [...x...]  //
        //     ^^_____// to here
        //     |______// current char
        match self.peek_char(0) {
            Some('\\') => self.lex_charset_escaping(),
            Some(_) => {
                let c = self.next_char().unwrap_or_default(); // consume current char
                Ok(TokenWithRange::from_position_and_length(
                    Token::CharSetChar(c),
                    &self.last_position,
                    1,
                ))
            }
            None => Err(RegexError::Lex(
                "Unterminated character class.".to_owned(),
                self.end_position,
            )),
        }
    }

    fn lex_main_escaping(&mut self) -> Result<TokenWithRange, RegexError> {
        // \xxxx?  //
        // ^    ^__// to here
        // |_______// current char, validated

        self.push_peek_position();

        self.next_char(); // consume '\'

        let token = match self.next_char() {
            Some(current_char) => match current_char {
                'n' | 't' | 'r' | 'f' | 'v' => Token::Char(unescape_control_char(current_char)),
                'c' => Token::Char(self.unescape_control_code()?),
                'x' => Token::CodePoint(self.unescape_hex()?),
                'u' => Token::CodePoint(self.unescape_unicode()?),
                'p' | 'P' => {
                    Token::UnicodeProperty(self.lex_unicode_property(current_char == 'P')?)
                }
                'd' | 'D' | 's' | 'S' | 'w' | 'W' | 'b' | 'B' => {
                    Token::SpecialSequence(current_char)
                }
                '1'..='9' => Token::BackReferenceNumber(current_char as usize - '0' as usize),
                'k' => {
                    if self.peek_char_and_equals(0, '<') {
                        self.next_char(); // consume '<'
                        Token::BackReferenceName(self.lex_identifier('>')?)
                    } else {
                        return Err(RegexError::Lex(
                            "Missing the angle bracket \"<\" for group name.".to_owned(),
                            self.last_position.move_position_forward(),
                        ));
                    }
                }
                _ if current_char.is_ascii_alphanumeric() => {
                    // `\0`, `\q` etc.
                    return Err(RegexError::Lex(
                        format!("Unsupported escape sequence '\\{}'.", current_char),
                        self.pop_saved_range(),
                    ));
                }
                _ => {
                    // meta chars and all other punctuation, e.g. `\.`, `\/`, `\-`
                    Token::Char(current_char)
                }
            },
            None => {
                // `\` | EOF
                return Err(RegexError::Lex(
                    "Incomplete escape sequence.".to_owned(),
                    self.pop_saved_position(),
                ));
            }
        };

        let range = self.pop_saved_range();
        Ok(TokenWithRange::new(token, range))
    }

    fn lex_charset_escaping(&mut self) -> Result<TokenWithRange, RegexError> {
        // [\xxxx...]  //
        //  ^    ^_____// to here
        //  |__________// current char, validated

        self.push_peek_position();

        self.next_char(); // consume '\'

        let token = match self.next_char() {
            Some(current_char) => match current_char {
                'n' | 't' | 'r' | 'f' | 'v' => {
                    Token::CharSetChar(unescape_control_char(current_char))
                }
                'c' => Token::CharSetChar(self.unescape_control_code()?),
                'x' => Token::CharSetChar(self.unescape_hex()?),
                'u' => Token::CharSetChar(self.unescape_unicode()?),
                'p' | 'P' => {
                    Token::UnicodeProperty(self.lex_unicode_property(current_char == 'P')?)
                }
                'd' | 'D' | 's' | 'S' | 'w' | 'W' => Token::SpecialSequence(current_char),
                'b' | 'B' => {
                    return Err(RegexError::Lex(
                        "Boundary assertions are not supported in character class.".to_owned(),
                        self.pop_saved_range(),
                    ));
                }
                '0'..='9' | 'k' => {
                    return Err(RegexError::Lex(
                        "Back-references are not supported in character class.".to_owned(),
                        self.pop_saved_range(),
                    ));
                }
                _ if current_char.is_ascii_alphanumeric() => {
                    return Err(RegexError::Lex(
                        format!(
                            "Unsupported escape sequence '\\{}' in character class.",
                            current_char
                        ),
                        self.pop_saved_range(),
                    ));
                }
                _ => Token::CharSetChar(current_char),
            },
            None => {
                return Err(RegexError::Lex(
                    "Incomplete escape sequence.".to_owned(),
                    self.pop_saved_position(),
                ));
            }
        };

        let range = self.pop_saved_range();
        Ok(TokenWithRange::new(token, range))
    }

    fn unescape_control_code(&mut self) -> Result<char, RegexError> {
        // \cX?  //
        //   ^^__// to here
        //   |___// current char
        match self.next_char() {
            Some(c) => Ok(char::from_u32(c as u32 % 32).unwrap_or_default()),
            None => Err(RegexError::Lex(
                "Missing the control letter for \"\\c\".".to_owned(),
                self.end_position,
            )),
        }
    }

    fn unescape_hex(&mut self) -> Result<char, RegexError> {
        // \xHH?  //
        //   ^ ^__// to here
        //   |____// current char

        self.push_peek_position();

        let mut codepoint: u32 = 0;
        for _ in 0..2 {
            match self.next_char() {
                Some(c) if c.is_ascii_hexdigit() => {
                    codepoint = codepoint * 16 + c.to_digit(16).unwrap_or_default();
                }
                Some(c) => {
                    return Err(RegexError::Lex(
                        format!("Invalid character '{}' for hex escape sequence.", c),
                        self.last_position,
                    ));
                }
                None => {
                    return Err(RegexError::Lex(
                        "Incomplete hex escape sequence.".to_owned(),
                        self.end_position,
                    ));
                }
            }
        }

        self.pop_saved_position();

        // two hex digits are always a valid scalar value
        Ok(char::from_u32(codepoint).unwrap_or_default())
    }

    fn unescape_unicode(&mut self) -> Result<char, RegexError> {
        // \u{6587}?  or \u6587?  //
        //   ^     ^__           // to here
        //   |________           // current char

        self.push_peek_position();

        let braced = self.peek_char_and_equals(0, '{');
        if braced {
            self.next_char(); // consume '{'
        }

        let mut codepoint_string = String::new();

        loop {
            if !braced && codepoint_string.len() == 4 {
                break;
            }

            match self.next_char() {
                Some('}') if braced => break,
                Some(c) if c.is_ascii_hexdigit() => codepoint_string.push(c),
                Some(c) => {
                    return Err(RegexError::Lex(
                        format!("Invalid character '{}' for unicode escape sequence.", c),
                        self.last_position,
                    ));
                }
                None => {
                    return Err(RegexError::Lex(
                        "Incomplete unicode escape sequence.".to_owned(),
                        self.end_position,
                    ));
                }
            }
        }

        let codepoint_range = self.pop_saved_range();

        if codepoint_string.is_empty() {
            return Err(RegexError::Lex(
                "Empty unicode code point.".to_owned(),
                codepoint_range,
            ));
        }

        if codepoint_string.len() > 6 {
            return Err(RegexError::Lex(
                "Unicode code point exceeds six digits.".to_owned(),
                codepoint_range,
            ));
        }

        // valid code point: 0 to 0x10FFFF, surrogates excluded
        u32::from_str_radix(&codepoint_string, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                RegexError::Lex("Invalid unicode code point.".to_owned(), codepoint_range)
            })
    }

    fn lex_unicode_property(&mut self, negated: bool) -> Result<UnicodeProperty, RegexError> {
        // \p{Name=Value}?  or \pL?  //
        //   ^           ^__        // to here
        //   |______________        // current char

        self.push_peek_position();

        if !self.peek_char_and_equals(0, '{') {
            // single letter form
            return match self.next_char() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.pop_saved_position();
                    Ok(UnicodeProperty {
                        name: c.to_string(),
                        value: None,
                        negated,
                    })
                }
                Some(_) => Err(RegexError::Lex(
                    "Missing the brace \"{\" for unicode property.".to_owned(),
                    self.pop_saved_position(),
                )),
                None => Err(RegexError::Lex(
                    "Incomplete unicode property.".to_owned(),
                    self.end_position,
                )),
            };
        }

        self.next_char(); // consume '{'

        let mut name = String::new();
        let mut value: Option<String> = None;

        loop {
            match self.next_char() {
                Some('}') => break,
                Some('=') if value.is_none() => value = Some(String::new()),
                Some(c) if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' ' | '.') => {
                    match &mut value {
                        Some(v) => v.push(c),
                        None => name.push(c),
                    }
                }
                Some(c) => {
                    return Err(RegexError::Lex(
                        format!("Invalid character '{}' for unicode property.", c),
                        self.last_position,
                    ));
                }
                None => {
                    return Err(RegexError::Lex(
                        "Incomplete unicode property.".to_owned(),
                        self.end_position,
                    ));
                }
            }
        }

        let property_range = self.pop_saved_range();

        if name.is_empty() || matches!(&value, Some(v) if v.is_empty()) {
            return Err(RegexError::Lex(
                "Empty unicode property name or value.".to_owned(),
                property_range,
            ));
        }

        Ok(UnicodeProperty {
            name,
            value,
            negated,
        })
    }

    fn lex_number(&mut self) -> Result<Option<usize>, RegexError> {
        // 123456N  //
        // ^     ^__// to here
        // |________// current char
        //
        // N = not a digit || EOF

        let mut num_string = String::new();

        self.push_peek_position();

        while let Some(current_char) = self.peek_char(0) {
            if current_char.is_ascii_digit() {
                num_string.push(*current_char);
                self.next_char(); // consume digit
            } else {
                break;
            }
        }

        if num_string.is_empty() {
            self.pop_saved_position();
            return Ok(None);
        }

        let num_range = self.pop_saved_range();
        let num = num_string.parse::<usize>().map_err(|_| {
            RegexError::Lex(
                format!("Can not convert \"{}\" to integer number.", num_string),
                num_range,
            )
        })?;

        Ok(Some(num))
    }

    fn lex_identifier(&mut self, terminator: char) -> Result<String, RegexError> {
        // <name>?  //
        //  ^    ^__// to here
        //  |_______// current char

        let mut name_string = String::new();

        loop {
            match self.peek_char(0) {
                Some(c) if *c == terminator => break,
                Some(c) if c.is_alphanumeric() || *c == '_' => {
                    name_string.push(*c);
                    self.next_char(); // consume char
                }
                Some(c) => {
                    return Err(RegexError::Lex(
                        format!("Invalid char '{}' for group name.", c),
                        self.peek_position(0),
                    ));
                }
                None => {
                    return Err(RegexError::Lex(
                        "Incomplete group name.".to_owned(),
                        self.end_position,
                    ));
                }
            }
        }

        if name_string.is_empty() {
            return Err(RegexError::Lex(
                "Expect a group name.".to_owned(),
                self.peek_position(0),
            ));
        }

        if name_string.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(RegexError::Lex(
                "Group name can not start with a digit.".to_owned(),
                self.last_position,
            ));
        }

        self.expect_char(terminator, &format!("\"{}\"", terminator))?;

        Ok(name_string)
    }

    fn lex_repetition(&mut self) -> Result<TokenWithRange, RegexError> {
        // {...}?  //
        // ^    ^__// to here
        // |_______// from here, validated

        self.push_peek_position();

        self.next_char(); // consume '{'

        let from = self.lex_number()?;

        let repetition = if self.peek_char_and_equals(0, ',') {
            self.next_char(); // consume ','
            let to = self.lex_number()?;
            self.expect_char('}', "right brace \"}\"")?;

            match (from, to) {
                (Some(m), Some(n)) => Some(Repetition::Range(m, n)),
                (Some(m), None) => Some(Repetition::AtLeast(m)),
                (None, Some(n)) => Some(Repetition::Range(0, n)),
                (None, None) => Some(Repetition::AtLeast(0)),
            }
        } else {
            self.expect_char('}', "right brace \"}\"")?;
            // `{}` is an alias of `?`
            from.map(Repetition::Specified)
        };

        let lazy = if self.peek_char_and_equals(0, '?') {
            self.next_char(); // consume '?'
            true
        } else {
            false
        };

        let token = match repetition {
            Some(repetition) => Token::Repetition(repetition, lazy),
            None if lazy => Token::OptionalLazy,
            None => Token::Optional,
        };

        let range = self.pop_saved_range();
        Ok(TokenWithRange { token, range })
    }
}

fn unescape_control_char(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'f' => '\u{0c}',
        _ => '\u{0b}',
    }
}
