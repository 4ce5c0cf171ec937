// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Grammar:
//
// Regex      → Expression
// Expression → Term { "|" Term }
// Term       → [ "^" ] { Factor } [ "$" ]
// Factor     → Atom [ Quantifier ] | Assertion
// Atom       → Literal | CharacterClass | AnyCharacter | Group
//            | NamedGroup | NonCapturingGroup | Backreference
//            | SpecialSequence | UnicodeProperty
// Quantifier → ( "?" | "*" | "+" | "{" m [ "," [ n ] ] "}" ) [ "?" ]
// Assertion  → "(?=" Expression ")" | "(?!" Expression ")"
//            | "(?<=" Expression ")" | "(?<!" Expression ")"
//            | "\b" | "\B"

pub const PARSER_PEEK_TOKEN_MAX_COUNT: usize = 2;

use crate::{
    ast::{
        Assertion, Atom, Backreference, Expression, Factor, Quantifier, QuantifierKind, Regex,
        Term, UnicodeProperty,
    },
    error::RegexError,
    location::Location,
    matcher::{special_sequence_charset, CharSet},
    peekableiter::PeekableIter,
    unicode::lookup_property,
};

use super::{
    lexer::lex_from_str,
    token::{self, Repetition, Token, TokenWithRange},
};

pub fn parse_from_str(s: &str) -> Result<Regex, RegexError> {
    let tokens = lex_from_str(s)?;
    parse(tokens)
}

/// Builds the tree from a token stream. The capturing group ids start
/// from 1 on every call.
pub fn parse(token_with_ranges: Vec<TokenWithRange>) -> Result<Regex, RegexError> {
    let end_position = match token_with_ranges.last() {
        Some(last) => last.range.get_position_by_range_end(),
        None => Location::default(),
    };

    let mut token_iter = token_with_ranges.into_iter();
    let mut peekable_token_iter = PeekableIter::new(&mut token_iter, PARSER_PEEK_TOKEN_MAX_COUNT);
    let mut parser = Parser::new(&mut peekable_token_iter, end_position);
    parser.parse_regex()
}

/// The state of one parse session.
#[derive(Debug)]
struct ParseContext {
    // indexed by group id, the entry 0 stands for the whole match
    capture_names: Vec<Option<String>>,

    // checked once the whole pattern is parsed, since references
    // may point forward
    backreferences: Vec<(Backreference, Location)>,
}

impl ParseContext {
    fn new() -> Self {
        Self {
            capture_names: vec![None],
            backreferences: vec![],
        }
    }

    fn new_group(&mut self, name: Option<String>) -> usize {
        self.capture_names.push(name);
        self.capture_names.len() - 1
    }

    fn has_name(&self, name: &str) -> bool {
        self.capture_names
            .iter()
            .any(|item| matches!(item, Some(n) if n == name))
    }

    fn capture_group_count(&self) -> usize {
        self.capture_names.len() - 1
    }
}

pub struct Parser<'a> {
    upstream: &'a mut PeekableIter<'a, TokenWithRange>,
    last_range: Location,
    end_position: Location,
    context: ParseContext,
}

impl<'a> Parser<'a> {
    fn new(upstream: &'a mut PeekableIter<'a, TokenWithRange>, end_position: Location) -> Self {
        Self {
            upstream,
            last_range: Location::default(),
            end_position,
            context: ParseContext::new(),
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        match self.upstream.next() {
            Some(TokenWithRange { token, range }) => {
                self.last_range = range;
                Some(token)
            }
            None => None,
        }
    }

    fn peek_token(&self, offset: usize) -> Option<&Token> {
        match self.upstream.peek(offset) {
            Some(TokenWithRange { token, .. }) => Some(token),
            None => None,
        }
    }

    fn peek_range(&self, offset: usize) -> Location {
        match self.upstream.peek(offset) {
            Some(TokenWithRange { range, .. }) => *range,
            None => self.end_position,
        }
    }

    fn consume_token(
        &mut self,
        expected_token: &Token,
        token_description: &str,
    ) -> Result<(), RegexError> {
        match self.next_token() {
            Some(token) if &token == expected_token => Ok(()),
            Some(_) => Err(RegexError::Parse(
                format!("Expect token: {}.", token_description),
                self.last_range,
            )),
            None => Err(RegexError::Parse(
                format!("Expect token: {}, but reached the end of pattern.", token_description),
                self.end_position,
            )),
        }
    }
}

fn is_quantifier(token: &Token) -> bool {
    matches!(
        token,
        Token::Optional
            | Token::OptionalLazy
            | Token::ZeroOrMore
            | Token::ZeroOrMoreLazy
            | Token::OneOrMore
            | Token::OneOrMoreLazy
            | Token::Repetition(..)
    )
}

impl Parser<'_> {
    pub fn parse_regex(&mut self) -> Result<Regex, RegexError> {
        let expression = self.parse_expression()?;

        // only a stray `)` can stop the top level expression early
        if self.peek_token(0).is_some() {
            return Err(RegexError::Parse(
                "Unmatched closing parenthesis.".to_owned(),
                self.peek_range(0),
            ));
        }

        self.check_backreferences()?;

        let capture_group_count = self.context.capture_group_count();
        Ok(Regex {
            expression,
            capture_group_count,
            capture_names: std::mem::take(&mut self.context.capture_names),
        })
    }

    fn check_backreferences(&self) -> Result<(), RegexError> {
        for (backreference, range) in &self.context.backreferences {
            match backreference {
                Backreference::Index(index) => {
                    if *index > self.context.capture_group_count() {
                        return Err(RegexError::Parse(
                            format!("Back-reference to a non-existent group {}.", index),
                            *range,
                        ));
                    }
                }
                Backreference::Name(name) => {
                    if !self.context.has_name(name) {
                        return Err(RegexError::Parse(
                            format!("Back-reference to a non-existent group \"{}\".", name),
                            *range,
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn parse_expression(&mut self) -> Result<Expression, RegexError> {
        // Term ... [ "|" Term ... ]
        // ----
        // ^
        // | current, None or Some(...)

        let mut terms = vec![self.parse_term()?];

        // alternation has the lowest precedence, e.g.
        // "ab|cd" == "(?:ab)|(?:cd)"
        while let Some(Token::Alternation) = self.peek_token(0) {
            self.next_token(); // consume '|'
            terms.push(self.parse_term()?);
        }

        Ok(Expression::new(terms))
    }

    fn parse_term(&mut self) -> Result<Term, RegexError> {
        // [^] factor ... [$]
        // ---
        // ^
        // | current, None or Some(...)

        let has_start_anchor = if let Some(Token::StartAnchor) = self.peek_token(0) {
            self.next_token(); // consume '^'
            true
        } else {
            false
        };

        let mut has_end_anchor = false;
        let mut factors: Vec<Factor> = vec![];

        while let Some(token) = self.peek_token(0) {
            match token {
                // terminator
                Token::Alternation | Token::GroupEnd => break,
                Token::EndAnchor => {
                    self.next_token(); // consume '$'

                    if !matches!(
                        self.peek_token(0),
                        None | Some(Token::Alternation | Token::GroupEnd)
                    ) {
                        return Err(RegexError::Parse(
                            "The end anchor \"$\" must be at the end of an alternative.".to_owned(),
                            self.last_range,
                        ));
                    }

                    has_end_anchor = true;
                    break;
                }
                Token::StartAnchor => {
                    return Err(RegexError::Parse(
                        "The start anchor \"^\" must be at the start of an alternative.".to_owned(),
                        self.peek_range(0),
                    ));
                }
                _ if is_quantifier(token) => {
                    return Err(RegexError::Parse(
                        "Quantifier does not follow a repeatable item.".to_owned(),
                        self.peek_range(0),
                    ));
                }
                _ => {
                    let factor = self.parse_factor()?;
                    factors.push(factor);
                }
            }
        }

        Ok(Term {
            has_start_anchor,
            has_end_anchor,
            factors,
        })
    }

    fn parse_factor(&mut self) -> Result<Factor, RegexError> {
        // atom [quantifier]
        // ----
        // ^
        // | current, Some(...)

        let factor = match self.peek_token(0) {
            Some(
                Token::LookAhead
                | Token::LookAheadNegative
                | Token::LookBehind
                | Token::LookBehindNegative,
            ) => Factor::Assertion(self.parse_lookaround()?),
            Some(Token::SpecialSequence(c @ ('b' | 'B'))) => {
                let positive = *c == 'b';
                self.next_token(); // consume '\b' or '\B'
                Factor::Assertion(Assertion::WordBoundary { positive })
            }
            _ => {
                let atom = self.parse_atom()?;
                let quantifier = self.parse_quantifier()?;
                return Ok(Factor::Quantified(atom, quantifier));
            }
        };

        // assertions are zero-width, repeating them is meaningless
        if let Some(token) = self.peek_token(0) {
            if is_quantifier(token) {
                return Err(RegexError::Parse(
                    "Assertions can not be quantified.".to_owned(),
                    self.peek_range(0),
                ));
            }
        }

        Ok(factor)
    }

    fn parse_lookaround(&mut self) -> Result<Assertion, RegexError> {
        // (?=...)?  //
        // ^      ^__// to here
        // |_________// current, validated

        let opener = self.next_token();
        let body = self.parse_group_body()?;

        let assertion = match opener {
            Some(Token::LookAhead) => Assertion::Lookahead {
                body,
                positive: true,
            },
            Some(Token::LookAheadNegative) => Assertion::Lookahead {
                body,
                positive: false,
            },
            Some(Token::LookBehind) => Assertion::Lookbehind {
                body,
                positive: true,
            },
            _ => Assertion::Lookbehind {
                body,
                positive: false,
            },
        };

        Ok(assertion)
    }

    fn parse_group_body(&mut self) -> Result<Expression, RegexError> {
        // (...)?  //
        //  ^   ^__// to here
        //  |______// current, the opener is consumed

        let opener_range = self.last_range;

        if let Some(Token::GroupEnd) = self.peek_token(0) {
            self.next_token(); // consume ')'
            return Err(RegexError::Parse(
                "Empty group or assertion body.".to_owned(),
                Location::from_range_pair(&opener_range, &self.last_range),
            ));
        }

        let body = self.parse_expression()?;
        self.consume_token(&Token::GroupEnd, "closing parenthesis \")\"")?;
        Ok(body)
    }

    fn parse_atom(&mut self) -> Result<Atom, RegexError> {
        let token = match self.next_token() {
            Some(token) => token,
            None => {
                return Err(RegexError::Parse(
                    "Unexpected end of pattern.".to_owned(),
                    self.end_position,
                ));
            }
        };

        let atom = match token {
            Token::Char(c) | Token::CodePoint(c) => Atom::Literal(c),
            Token::AnyChar => Atom::AnyCharacter,
            Token::CharSetStart => Atom::CharacterClass(self.parse_charset(false)?),
            Token::CharSetStartNegative => Atom::CharacterClass(self.parse_charset(true)?),
            Token::GroupStart => {
                let id = self.context.new_group(None);
                let body = self.parse_group_body()?;
                Atom::CapturingGroup { id, body }
            }
            Token::NamedCapture(name) => {
                if self.context.has_name(&name) {
                    return Err(RegexError::Parse(
                        format!("Duplicate group name \"{}\".", name),
                        self.last_range,
                    ));
                }

                let id = self.context.new_group(Some(name.clone()));
                let body = self.parse_group_body()?;
                Atom::NamedCapturingGroup { id, name, body }
            }
            Token::NonCapturing => Atom::NonCapturingGroup(self.parse_group_body()?),
            Token::BackReferenceNumber(index) => {
                let backreference = Backreference::Index(index);
                self.context
                    .backreferences
                    .push((backreference.clone(), self.last_range));
                Atom::Backreference(backreference)
            }
            Token::BackReferenceName(name) => {
                let backreference = Backreference::Name(name);
                self.context
                    .backreferences
                    .push((backreference.clone(), self.last_range));
                Atom::Backreference(backreference)
            }
            Token::SpecialSequence(c) => match special_sequence_charset(c) {
                Some(charset) => Atom::CharacterClass(charset),
                None => {
                    return Err(RegexError::Parse(
                        format!("Unsupported special sequence \"\\{}\".", c),
                        self.last_range,
                    ));
                }
            },
            Token::UnicodeProperty(property) => {
                Atom::UnicodeProperty(self.resolve_unicode_property(property)?)
            }
            _ => {
                return Err(RegexError::Parse(
                    format!("Unexpected token \"{}\".", token),
                    self.last_range,
                ));
            }
        };

        Ok(atom)
    }

    fn resolve_unicode_property(
        &self,
        property: token::UnicodeProperty,
    ) -> Result<UnicodeProperty, RegexError> {
        let members = lookup_property(&property.name, property.value.as_deref())
            .map_err(|message| RegexError::Parse(message, self.last_range))?;

        Ok(UnicodeProperty {
            name: property.name,
            value: property.value,
            negated: property.negated,
            members,
        })
    }

    fn parse_charset(&mut self, negated: bool) -> Result<CharSet, RegexError> {
        // [...]?  //
        //  ^   ^__// to here
        //  |______// current, the opener is consumed

        let mut charset = CharSet::new(negated);

        loop {
            match self.next_token() {
                Some(Token::CharSetEnd) => break,
                Some(Token::CharSetChar(c)) => charset.add_char(c),
                Some(Token::CharSetRange(lo, hi)) => {
                    if lo > hi {
                        return Err(RegexError::Parse(
                            "Character range is out of order.".to_owned(),
                            self.last_range,
                        ));
                    }
                    charset.add_range(lo, hi);
                }
                Some(Token::SpecialSequence(c)) => match special_sequence_charset(c) {
                    // the negated sequences are materialized by `union`
                    Some(preset) => charset.union(&preset),
                    None => {
                        return Err(RegexError::Parse(
                            format!(
                                "Special sequence \"\\{}\" is not allowed in character class.",
                                c
                            ),
                            self.last_range,
                        ));
                    }
                },
                Some(Token::UnicodeProperty(property)) => {
                    let property = self.resolve_unicode_property(property)?;
                    if property.negated {
                        charset.union(&property.members.complement());
                    } else {
                        charset.union(&property.members);
                    }
                }
                Some(token) => {
                    return Err(RegexError::Parse(
                        format!("Unexpected token \"{}\" in character class.", token),
                        self.last_range,
                    ));
                }
                None => {
                    return Err(RegexError::Parse(
                        "Unterminated character class.".to_owned(),
                        self.end_position,
                    ));
                }
            }
        }

        Ok(charset)
    }

    fn parse_quantifier(&mut self) -> Result<Quantifier, RegexError> {
        let quantifier = match self.peek_token(0) {
            Some(Token::Optional) => Quantifier::new(QuantifierKind::ZeroOrOne, false),
            Some(Token::OptionalLazy) => Quantifier::new(QuantifierKind::ZeroOrOne, true),
            Some(Token::ZeroOrMore) => Quantifier::new(QuantifierKind::ZeroOrMore, false),
            Some(Token::ZeroOrMoreLazy) => Quantifier::new(QuantifierKind::ZeroOrMore, true),
            Some(Token::OneOrMore) => Quantifier::new(QuantifierKind::OneOrMore, false),
            Some(Token::OneOrMoreLazy) => Quantifier::new(QuantifierKind::OneOrMore, true),
            Some(Token::Repetition(repetition, lazy)) => {
                let kind = match *repetition {
                    Repetition::Specified(m) => QuantifierKind::Designated(m, Some(m)),
                    Repetition::AtLeast(m) => QuantifierKind::Designated(m, None),
                    Repetition::Range(m, n) => {
                        if m > n {
                            return Err(RegexError::Parse(
                                format!(
                                    "Repetition range {{{},{}}} has the minimum greater than the maximum.",
                                    m, n
                                ),
                                self.peek_range(0),
                            ));
                        }
                        QuantifierKind::Designated(m, Some(n))
                    }
                };
                Quantifier::new(kind, *lazy)
            }
            _ => return Ok(Quantifier::once()),
        };

        self.next_token(); // consume quantifier
        Ok(quantifier)
    }
}
