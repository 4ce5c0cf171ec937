// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::{fmt::Display, sync::Arc};

use crate::{error::RegexError, matcher::Matcher};

/// Zero-width position tests.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Anchor {
    /// `^`, the start of the subject
    Begin,

    /// `$`, the end of the subject
    End,

    WordBoundary,
    NotWordBoundary,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AssertKind {
    Lookahead,
    Lookbehind,
}

/// One instruction of the backtracking machine.
///
/// Jump targets are absolute indices into `Program::body`.
#[derive(Debug, PartialEq, Clone)]
pub enum Insn {
    /// Consume one code point accepted by the matcher.
    Match(Matcher),

    /// Continue at the first target, retry at the second one on failure.
    Split(usize, usize),

    Jump(usize),

    /// Set the counter slot to zero.
    ResetCounter(usize),

    /// Head of a counted loop, the loop body follows this instruction
    /// and jumps back here when it is done.
    ///
    /// `check` names a slot holding the position at which the latest
    /// optional iteration started, it is present only when the body can
    /// match the empty string. An optional iteration that consumes nothing
    /// is rejected.
    Repeat {
        min: usize,
        max: Option<usize>,
        next: usize,
        counter: usize,
        check: Option<usize>,
        greedy: bool,
    },

    Anchor(Anchor),

    CaptureStart(usize),
    CaptureEnd(usize),

    /// Run the body (which starts at the following instruction and ends with
    /// `Accept`) in isolation, then continue at `next` depending on
    /// the outcome.
    ///
    /// `length` is the fixed length of a lookbehind body, when known.
    Assert {
        kind: AssertKind,
        negative: bool,
        next: usize,
        length: Option<usize>,
    },

    /// Match the same text as the capturing group with the given id.
    Ref(usize),

    Accept,

    /// Fail unconditionally.
    Halt,
}

/// A compiled pattern, immutable once built.
#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub body: Vec<Insn>,

    // capture slots (two per group, group 0 included) plus
    // the counter and check slots of loops
    pub n_slots: usize,

    // group 0 excluded
    pub capture_group_count: usize,

    // indexed by group id, index 0 is always `None`
    pub capture_names: Arc<[Option<String>]>,

    // every alternative starts with `^`, so only position 0 can match
    pub anchored_start: bool,
}

impl Program {
    /// Look up the id of a named capturing group.
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.capture_names
            .iter()
            .position(|item| matches!(item, Some(s) if s == name))
    }

    /// Check that every jump target lies within the program and
    /// every slot operand is within `n_slots`.
    pub fn validate(&self) -> Result<(), RegexError> {
        let len = self.body.len();
        let n_slots = self.n_slots;

        let check_target = |pc: usize, target: usize| {
            if target < len {
                Ok(())
            } else {
                Err(RegexError::CompileInvariant(format!(
                    "Instruction {} jumps to {}, out of the program.",
                    pc, target
                )))
            }
        };

        let check_slot = |pc: usize, slot: usize| {
            if slot < n_slots {
                Ok(())
            } else {
                Err(RegexError::CompileInvariant(format!(
                    "Instruction {} refers to slot {}, out of the {} slots.",
                    pc, slot, n_slots
                )))
            }
        };

        for (pc, insn) in self.body.iter().enumerate() {
            match insn {
                Insn::Split(x, y) => {
                    check_target(pc, *x)?;
                    check_target(pc, *y)?;
                }
                Insn::Jump(target) => check_target(pc, *target)?,
                Insn::ResetCounter(slot) => check_slot(pc, *slot)?,
                Insn::Repeat {
                    next,
                    counter,
                    check,
                    ..
                } => {
                    check_target(pc, *next)?;
                    check_slot(pc, *counter)?;
                    if let Some(slot) = check {
                        check_slot(pc, *slot)?;
                    }
                }
                Insn::CaptureStart(id) | Insn::CaptureEnd(id) | Insn::Ref(id) => {
                    check_slot(pc, id * 2 + 1)?;
                }
                Insn::Assert { next, .. } => check_target(pc, *next)?,
                Insn::Match(_) | Insn::Anchor(_) | Insn::Accept | Insn::Halt => {}
            }
        }

        Ok(())
    }
}

impl Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::Begin => f.write_str("begin"),
            Anchor::End => f.write_str("end"),
            Anchor::WordBoundary => f.write_str("word_boundary"),
            Anchor::NotWordBoundary => f.write_str("not_word_boundary"),
        }
    }
}

impl Display for Insn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insn::Match(matcher) => write!(f, "match {}", matcher),
            Insn::Split(x, y) => write!(f, "split {}, {}", x, y),
            Insn::Jump(target) => write!(f, "jump {}", target),
            Insn::ResetCounter(slot) => write!(f, "reset_counter ${}", slot),
            Insn::Repeat {
                min,
                max,
                next,
                counter,
                check,
                greedy,
            } => {
                write!(f, "repeat ${} {{{},", counter, min)?;
                if let Some(m) = max {
                    write!(f, "{}", m)?;
                }
                write!(f, "}}")?;
                if !greedy {
                    write!(f, "?")?;
                }
                if let Some(slot) = check {
                    write!(f, " check ${}", slot)?;
                }
                write!(f, ", next {}", next)
            }
            Insn::Anchor(anchor) => write!(f, "anchor {}", anchor),
            Insn::CaptureStart(id) => write!(f, "capture_start {}", id),
            Insn::CaptureEnd(id) => write!(f, "capture_end {}", id),
            Insn::Assert {
                kind,
                negative,
                next,
                length,
            } => {
                let name = match (kind, negative) {
                    (AssertKind::Lookahead, false) => "lookahead",
                    (AssertKind::Lookahead, true) => "lookahead_negative",
                    (AssertKind::Lookbehind, false) => "lookbehind",
                    (AssertKind::Lookbehind, true) => "lookbehind_negative",
                };
                write!(f, "{}", name)?;
                if let Some(n) = length {
                    write!(f, " length {}", n)?;
                }
                write!(f, ", next {}", next)
            }
            Insn::Ref(id) => write!(f, "ref {}", id),
            Insn::Accept => f.write_str("accept"),
            Insn::Halt => f.write_str("halt"),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self
            .body
            .iter()
            .enumerate()
            .map(|(pc, insn)| format!("{:>3}: {}", pc, insn))
            .collect();
        f.write_str(&lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use crate::matcher::Matcher;

    use super::{Anchor, Insn, Program};

    fn new_program(body: Vec<Insn>, n_slots: usize) -> Program {
        Program {
            body,
            n_slots,
            capture_group_count: 0,
            capture_names: Arc::from(vec![None]),
            anchored_start: false,
        }
    }

    #[test]
    fn test_validate() {
        let program = new_program(
            vec![
                Insn::CaptureStart(0),
                Insn::Split(2, 4),
                Insn::Match(Matcher::Literal('a')),
                Insn::Jump(1),
                Insn::CaptureEnd(0),
                Insn::Accept,
                Insn::Halt,
            ],
            2,
        );
        assert!(program.validate().is_ok());

        // jump out of the program
        let program = new_program(vec![Insn::Jump(3), Insn::Accept, Insn::Halt], 2);
        assert!(program.validate().is_err());

        // slot out of range
        let program = new_program(vec![Insn::CaptureStart(1), Insn::Accept, Insn::Halt], 2);
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_group_index() {
        let mut program = new_program(vec![Insn::Accept, Insn::Halt], 6);
        program.capture_group_count = 2;
        program.capture_names = Arc::from(vec![None, None, Some("year".to_owned())]);

        assert_eq!(program.group_index("year"), Some(2));
        assert_eq!(program.group_index("month"), None);
    }

    #[test]
    fn test_display() {
        let program = new_program(
            vec![
                Insn::Anchor(Anchor::Begin),
                Insn::ResetCounter(2),
                Insn::Repeat {
                    min: 2,
                    max: Some(3),
                    next: 5,
                    counter: 2,
                    check: None,
                    greedy: true,
                },
                Insn::Match(Matcher::Literal('a')),
                Insn::Jump(2),
                Insn::Accept,
                Insn::Halt,
            ],
            3,
        );

        assert_eq!(
            program.to_string(),
            "  0: anchor begin
  1: reset_counter $2
  2: repeat $2 {2,3}, next 5
  3: match 'a'
  4: jump 2
  5: accept
  6: halt"
        );
    }
}
