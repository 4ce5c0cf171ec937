// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::sync::Arc;

use crate::{
    ast::{
        Assertion, Atom, Backreference, Expression, Factor, Quantifier, QuantifierKind, Regex,
        Term,
    },
    error::RegexError,
    matcher::Matcher,
    program::{Anchor, AssertKind, Insn, Program},
    rulechecker::{atom_can_match_empty, get_match_length, is_anchored_start, MatchLength},
    syntax::parser::parse_from_str,
};

/// Compile from regular expression text.
pub fn compile_from_str(s: &str) -> Result<Program, RegexError> {
    let regex = parse_from_str(s)?;
    compile(&regex)
}

/// Compile from AST `Regex`.
pub fn compile(regex: &Regex) -> Result<Program, RegexError> {
    let mut compiler = Compiler::new(regex);
    compiler.emit_regex()?;

    let program = Program {
        body: compiler.body,
        n_slots: compiler.n_slots,
        capture_group_count: regex.capture_group_count,
        capture_names: Arc::from(regex.capture_names.clone()),
        anchored_start: is_anchored_start(&regex.expression),
    };

    program.validate()?;
    Ok(program)
}

struct Compiler<'a> {
    // The AST
    regex: &'a Regex,

    // The compilation target
    body: Vec<Insn>,

    // two capture slots per group, then the loop slots
    n_slots: usize,
}

impl<'a> Compiler<'a> {
    fn new(regex: &'a Regex) -> Self {
        Compiler {
            regex,
            body: vec![],
            n_slots: (regex.capture_group_count + 1) * 2,
        }
    }

    fn pc(&self) -> usize {
        self.body.len()
    }

    fn emit(&mut self, insn: Insn) -> usize {
        let pc = self.body.len();
        self.body.push(insn);
        pc
    }

    // Reserve a slot for an instruction whose jump target is not
    // known yet, it is overwritten once the target is known.
    fn reserve(&mut self) -> usize {
        self.emit(Insn::Halt)
    }

    fn alloc_slot(&mut self) -> usize {
        let slot = self.n_slots;
        self.n_slots += 1;
        slot
    }

    fn emit_regex(&mut self) -> Result<(), RegexError> {
        // The whole match is the capture group 0.
        //
        // 0: capture_start 0
        //    ...
        // n: capture_end 0
        //    accept
        //    halt
        let regex = self.regex;
        self.emit(Insn::CaptureStart(0));
        self.emit_expression(&regex.expression)?;
        self.emit(Insn::CaptureEnd(0));
        self.emit(Insn::Accept);
        self.emit(Insn::Halt);
        Ok(())
    }

    fn emit_expression(&mut self, expression: &Expression) -> Result<(), RegexError> {
        // Alternatives are tried from left to right:
        //
        //      split L1, L2
        // L1:  <term 1>
        //      jump END
        // L2:  split L3, L4
        // L3:  <term 2>
        //      jump END
        // L4:  <term 3>
        // END:
        let (last, rest) = match expression.terms.split_last() {
            Some(pair) => pair,
            None => return Ok(()),
        };

        let mut jumps = vec![];
        for term in rest {
            let split = self.reserve();
            self.emit_term(term)?;
            jumps.push(self.reserve());
            let next = self.pc();
            self.body[split] = Insn::Split(split + 1, next);
        }
        self.emit_term(last)?;

        let end = self.pc();
        for jump in jumps {
            self.body[jump] = Insn::Jump(end);
        }
        Ok(())
    }

    fn emit_term(&mut self, term: &Term) -> Result<(), RegexError> {
        if term.has_start_anchor {
            self.emit(Insn::Anchor(Anchor::Begin));
        }

        for factor in &term.factors {
            self.emit_factor(factor)?;
        }

        if term.has_end_anchor {
            self.emit(Insn::Anchor(Anchor::End));
        }
        Ok(())
    }

    fn emit_factor(&mut self, factor: &Factor) -> Result<(), RegexError> {
        match factor {
            Factor::Assertion(assertion) => self.emit_assertion(assertion),
            Factor::Quantified(atom, quantifier) => self.emit_quantified(atom, quantifier),
        }
    }

    fn emit_assertion(&mut self, assertion: &Assertion) -> Result<(), RegexError> {
        let (kind, body, positive) = match assertion {
            Assertion::WordBoundary { positive } => {
                let anchor = if *positive {
                    Anchor::WordBoundary
                } else {
                    Anchor::NotWordBoundary
                };
                self.emit(Insn::Anchor(anchor));
                return Ok(());
            }
            Assertion::Lookahead { body, positive } => (AssertKind::Lookahead, body, *positive),
            Assertion::Lookbehind { body, positive } => (AssertKind::Lookbehind, body, *positive),
        };

        //      assert NEXT
        //      <body>
        //      accept
        // NEXT:
        let assert = self.reserve();
        self.emit_expression(body)?;
        self.emit(Insn::Accept);

        let length = match (kind, get_match_length(body)) {
            (AssertKind::Lookbehind, MatchLength::Fixed(n)) => Some(n),
            _ => None,
        };

        let next = self.pc();
        self.body[assert] = Insn::Assert {
            kind,
            negative: !positive,
            next,
            length,
        };
        Ok(())
    }

    fn emit_quantified(&mut self, atom: &Atom, quantifier: &Quantifier) -> Result<(), RegexError> {
        let greedy = !quantifier.lazy;

        match quantifier.kind {
            QuantifierKind::Once => self.emit_atom(atom),
            QuantifierKind::ZeroOrOne => {
                //      split L1, NEXT   (lazy: split NEXT, L1)
                // L1:  <atom>
                // NEXT:
                let split = self.reserve();
                self.emit_atom(atom)?;
                let next = self.pc();
                self.body[split] = new_split(greedy, split + 1, next);
                Ok(())
            }
            QuantifierKind::ZeroOrMore if !atom_can_match_empty(atom) => {
                // L0:  split L1, NEXT   (lazy: split NEXT, L1)
                // L1:  <atom>
                //      jump L0
                // NEXT:
                let split = self.reserve();
                self.emit_atom(atom)?;
                self.emit(Insn::Jump(split));
                let next = self.pc();
                self.body[split] = new_split(greedy, split + 1, next);
                Ok(())
            }
            QuantifierKind::OneOrMore if !atom_can_match_empty(atom) => {
                // L0:  <atom>
                //      split L0, NEXT   (lazy: split NEXT, L0)
                // NEXT:
                let start = self.pc();
                self.emit_atom(atom)?;
                let split = self.reserve();
                self.body[split] = new_split(greedy, start, split + 1);
                Ok(())
            }
            _ => {
                let (min, max) = quantifier.bounds();
                self.emit_counted(atom, min, max, greedy)
            }
        }
    }

    // Bounded repetitions, and loops whose body can match the empty
    // string, use a counter slot:
    //
    //      reset_counter $c
    // L0:  repeat $c {min,max}, next NEXT
    //      <atom>
    //      jump L0
    // NEXT:
    fn emit_counted(
        &mut self,
        atom: &Atom,
        min: usize,
        max: Option<usize>,
        greedy: bool,
    ) -> Result<(), RegexError> {
        let counter = self.alloc_slot();
        let check = if atom_can_match_empty(atom) {
            Some(self.alloc_slot())
        } else {
            None
        };

        self.emit(Insn::ResetCounter(counter));
        let head = self.reserve();
        self.emit_atom(atom)?;
        self.emit(Insn::Jump(head));

        let next = self.pc();
        self.body[head] = Insn::Repeat {
            min,
            max,
            next,
            counter,
            check,
            greedy,
        };
        Ok(())
    }

    fn emit_atom(&mut self, atom: &Atom) -> Result<(), RegexError> {
        match atom {
            Atom::Literal(c) => {
                self.emit(Insn::Match(Matcher::Literal(*c)));
            }
            Atom::AnyCharacter => {
                self.emit(Insn::Match(Matcher::AnyCharacter));
            }
            Atom::CharacterClass(charset) => {
                self.emit(Insn::Match(Matcher::Set(charset.clone())));
            }
            Atom::UnicodeProperty(property) => {
                let mut charset = property.members.clone();
                if property.negated {
                    charset.negate();
                }
                self.emit(Insn::Match(Matcher::Set(charset)));
            }
            Atom::CapturingGroup { id, body } | Atom::NamedCapturingGroup { id, body, .. } => {
                self.emit_capture_group(*id, body)?;
            }
            Atom::NonCapturingGroup(body) => {
                self.emit_expression(body)?;
            }
            Atom::Backreference(backreference) => {
                self.emit_backreference(backreference)?;
            }
        }
        Ok(())
    }

    fn emit_capture_group(&mut self, id: usize, body: &Expression) -> Result<(), RegexError> {
        if id == 0 || id > self.regex.capture_group_count {
            return Err(RegexError::CompileInvariant(format!(
                "Capture group id {} is out of range.",
                id
            )));
        }

        self.emit(Insn::CaptureStart(id));
        self.emit_expression(body)?;
        self.emit(Insn::CaptureEnd(id));
        Ok(())
    }

    fn emit_backreference(&mut self, backreference: &Backreference) -> Result<(), RegexError> {
        let id = match backreference {
            Backreference::Index(index) => {
                if *index == 0 || *index > self.regex.capture_group_count {
                    return Err(RegexError::CompileInvariant(format!(
                        "Cannot find the capture group with index {}.",
                        index
                    )));
                }
                *index
            }
            Backreference::Name(name) => self
                .regex
                .capture_names
                .iter()
                .position(|item| matches!(item, Some(s) if s == name))
                .ok_or_else(|| {
                    RegexError::CompileInvariant(format!(
                        "Cannot find the capture group named \"{}\".",
                        name
                    ))
                })?,
        };

        self.emit(Insn::Ref(id));
        Ok(())
    }
}

// greedy tries the body first
fn new_split(greedy: bool, body: usize, next: usize) -> Insn {
    if greedy {
        Insn::Split(body, next)
    } else {
        Insn::Split(next, body)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quickcheck::quickcheck;

    use crate::{
        ast::{Atom, Backreference, Expression, Factor, Quantifier, Regex, Term},
        error::RegexError,
        matcher::{digit_charset, CharSet, Matcher},
        program::{Anchor, AssertKind, Insn},
        syntax::{lexer::tests::PatternText, parser::parse_from_str},
    };

    use super::{compile, compile_from_str};

    fn literal(c: char) -> Insn {
        Insn::Match(Matcher::Literal(c))
    }

    fn body_of(s: &str) -> Vec<Insn> {
        compile_from_str(s).unwrap().body
    }

    #[test]
    fn test_compile_literal() {
        assert_eq!(
            body_of("ab"),
            vec![
                Insn::CaptureStart(0),
                literal('a'),
                literal('b'),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        let program = compile_from_str("a").unwrap();
        assert_eq!(program.n_slots, 2);
        assert_eq!(program.capture_group_count, 0);
        assert!(!program.anchored_start);

        // empty pattern
        assert_eq!(
            body_of(""),
            vec![
                Insn::CaptureStart(0),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );
    }

    #[test]
    fn test_compile_sets() {
        assert_eq!(
            body_of(r#"\d."#),
            vec![
                Insn::CaptureStart(0),
                Insn::Match(Matcher::Set(digit_charset())),
                Insn::Match(Matcher::AnyCharacter),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        let mut negated = CharSet::new(true);
        negated.add_range('a', 'c');
        assert_eq!(
            body_of("[^a-c]"),
            vec![
                Insn::CaptureStart(0),
                Insn::Match(Matcher::Set(negated)),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        // \P{..} applies the negation to the resolved members
        let body = body_of(r#"\P{Greek}"#);
        match &body[1] {
            Insn::Match(Matcher::Set(charset)) => {
                assert!(charset.is_negated());
                assert!(!charset.matches('α'));
                assert!(charset.matches('a'));
            }
            _ => panic!("expect a set matcher"),
        }
    }

    #[test]
    fn test_compile_alternation() {
        assert_eq!(
            body_of("a|b"),
            vec![
                Insn::CaptureStart(0),
                Insn::Split(2, 4),
                literal('a'),
                Insn::Jump(5),
                literal('b'),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        assert_eq!(
            body_of("a|b|c"),
            vec![
                Insn::CaptureStart(0),
                Insn::Split(2, 4),
                literal('a'),
                Insn::Jump(8),
                Insn::Split(5, 7),
                literal('b'),
                Insn::Jump(8),
                literal('c'),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        // anchors
        assert_eq!(
            body_of("^a|b$"),
            vec![
                Insn::CaptureStart(0),
                Insn::Split(2, 5),
                Insn::Anchor(Anchor::Begin),
                literal('a'),
                Insn::Jump(7),
                literal('b'),
                Insn::Anchor(Anchor::End),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        assert!(compile_from_str("^a|^b").unwrap().anchored_start);
        assert!(!compile_from_str("^a|b").unwrap().anchored_start);
    }

    #[test]
    fn test_compile_quantifiers() {
        assert_eq!(
            body_of("a?"),
            vec![
                Insn::CaptureStart(0),
                Insn::Split(2, 3),
                literal('a'),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        assert_eq!(
            body_of("a??"),
            vec![
                Insn::CaptureStart(0),
                Insn::Split(3, 2),
                literal('a'),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        assert_eq!(
            body_of("a*"),
            vec![
                Insn::CaptureStart(0),
                Insn::Split(2, 4),
                literal('a'),
                Insn::Jump(1),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        assert_eq!(
            body_of("a+"),
            vec![
                Insn::CaptureStart(0),
                literal('a'),
                Insn::Split(1, 3),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        assert_eq!(
            body_of("a+?"),
            vec![
                Insn::CaptureStart(0),
                literal('a'),
                Insn::Split(3, 1),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );
    }

    #[test]
    fn test_compile_counted() {
        let program = compile_from_str("a{2,3}").unwrap();
        assert_eq!(program.n_slots, 3);
        assert_eq!(
            program.body,
            vec![
                Insn::CaptureStart(0),
                Insn::ResetCounter(2),
                Insn::Repeat {
                    min: 2,
                    max: Some(3),
                    next: 5,
                    counter: 2,
                    check: None,
                    greedy: true
                },
                literal('a'),
                Insn::Jump(2),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        // a loop whose body can match the empty string
        let program = compile_from_str("(a*)*").unwrap();
        assert_eq!(program.n_slots, 6);
        assert_eq!(
            program.body,
            vec![
                Insn::CaptureStart(0),
                Insn::ResetCounter(4),
                Insn::Repeat {
                    min: 0,
                    max: None,
                    next: 9,
                    counter: 4,
                    check: Some(5),
                    greedy: true
                },
                Insn::CaptureStart(1),
                Insn::Split(5, 7),
                literal('a'),
                Insn::Jump(4),
                Insn::CaptureEnd(1),
                Insn::Jump(2),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        // lazy
        let program = compile_from_str("a{2,}?").unwrap();
        assert!(matches!(
            program.body[2],
            Insn::Repeat {
                min: 2,
                max: None,
                greedy: false,
                ..
            }
        ));
    }

    #[test]
    fn test_compile_groups() {
        assert_eq!(
            body_of(r#"(a)(?<x>b)(?:c)\1\k<x>"#),
            vec![
                Insn::CaptureStart(0),
                Insn::CaptureStart(1),
                literal('a'),
                Insn::CaptureEnd(1),
                Insn::CaptureStart(2),
                literal('b'),
                Insn::CaptureEnd(2),
                literal('c'),
                Insn::Ref(1),
                Insn::Ref(2),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        let program = compile_from_str(r#"(a)(?<x>b)"#).unwrap();
        assert_eq!(program.n_slots, 6);
        assert_eq!(program.capture_group_count, 2);
        assert_eq!(program.group_index("x"), Some(2));
    }

    #[test]
    fn test_compile_assertions() {
        assert_eq!(
            body_of(r#"(?<=ab)c(?!d)\b"#),
            vec![
                Insn::CaptureStart(0),
                Insn::Assert {
                    kind: AssertKind::Lookbehind,
                    negative: false,
                    next: 5,
                    length: Some(2)
                },
                literal('a'),
                literal('b'),
                Insn::Accept,
                literal('c'),
                Insn::Assert {
                    kind: AssertKind::Lookahead,
                    negative: true,
                    next: 9,
                    length: None
                },
                literal('d'),
                Insn::Accept,
                Insn::Anchor(Anchor::WordBoundary),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ]
        );

        // variable length lookbehind
        let body = body_of(r#"(?<!a+)b"#);
        assert!(matches!(
            body[1],
            Insn::Assert {
                kind: AssertKind::Lookbehind,
                negative: true,
                length: None,
                ..
            }
        ));
    }

    #[test]
    fn test_compile_invalid_tree() {
        // a tree that refers to a group which does not exist
        let regex = Regex {
            expression: Expression::new(vec![Term::from_factors(vec![Factor::Quantified(
                Atom::Backreference(Backreference::Index(3)),
                Quantifier::once(),
            )])]),
            capture_group_count: 0,
            capture_names: vec![None],
        };

        assert!(matches!(
            compile(&regex),
            Err(RegexError::CompileInvariant(_))
        ));

        let regex = Regex {
            expression: Expression::new(vec![Term::from_factors(vec![Factor::Quantified(
                Atom::Backreference(Backreference::Name("x".to_owned())),
                Quantifier::once(),
            )])]),
            capture_group_count: 0,
            capture_names: vec![None],
        };

        assert!(matches!(
            compile(&regex),
            Err(RegexError::CompileInvariant(_))
        ));
    }

    quickcheck! {
        fn prop_parsed_patterns_compile_to_valid_programs(pattern: PatternText) -> bool {
            match parse_from_str(&pattern.0) {
                Ok(regex) => match compile(&regex) {
                    Ok(program) => {
                        program.validate().is_ok()
                            && program.capture_group_count == regex.capture_group_count
                    }
                    Err(_) => false,
                },
                // rejected patterns are not part of the property
                Err(_) => true,
            }
        }
    }
}
