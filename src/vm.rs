// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The backtracking machine.
//!
//! Choice points are kept on an explicit stack, together with an undo log
//! of the slots written since the choice point was made, so backtracking
//! restores captures and loop counters without copying the whole slot
//! table. Lookaround bodies run in a nested execution with their own stack.
//!
//! All positions are code point indices into the subject.

use std::{fmt, sync::Arc};

use crate::{
    error::{RegexError, RuntimeError},
    matcher::is_word_char,
    program::{Anchor, AssertKind, Insn, Program},
};

pub const DEFAULT_MAX_STACK: usize = 1_000_000;
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

// the value of a slot that has not been written
const UNSET: usize = usize::MAX;

/// Limits and switches of one execution.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ExecOptions {
    /// The ceiling on the number of backtracking steps, lookaround
    /// sub-executions included.
    pub backtrack_limit: usize,

    /// The ceiling on the number of pending choice points.
    pub max_stack: usize,

    /// Print every executed instruction to stderr, debug builds only.
    pub trace: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
            max_stack: DEFAULT_MAX_STACK,
            trace: false,
        }
    }
}

/// The spans of a successful match.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MatchResult {
    // indexed by group id, `None` for groups that did not participate
    spans: Vec<Option<(usize, usize)>>,
    capture_names: Arc<[Option<String>]>,
}

impl MatchResult {
    fn from_slots(program: &Program, slots: &[usize]) -> Self {
        let spans = (0..=program.capture_group_count)
            .map(|id| match (slots[id * 2], slots[id * 2 + 1]) {
                (start, end) if start != UNSET && end != UNSET => Some((start, end)),
                _ => None,
            })
            .collect();

        MatchResult {
            spans,
            capture_names: Arc::clone(&program.capture_names),
        }
    }

    /// The span of the whole match.
    pub fn span(&self) -> (usize, usize) {
        // group 0 is always set on success
        self.spans[0].unwrap_or((0, 0))
    }

    pub fn get(&self, id: usize) -> Option<(usize, usize)> {
        self.spans.get(id).copied().flatten()
    }

    pub fn name(&self, name: &str) -> Option<(usize, usize)> {
        self.capture_names
            .iter()
            .position(|item| matches!(item, Some(s) if s == name))
            .and_then(|id| self.get(id))
    }

    pub fn group_name(&self, id: usize) -> Option<&str> {
        self.capture_names.get(id).and_then(|item| item.as_deref())
    }

    pub fn spans(&self) -> &[Option<(usize, usize)>] {
        &self.spans
    }

    /// The number of groups, group 0 included.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Try to match the program starting exactly at `start`.
pub fn execute(
    program: &Program,
    subject: &[char],
    start: usize,
) -> Result<Option<MatchResult>, RegexError> {
    execute_with_options(program, subject, start, &ExecOptions::default())
}

pub fn execute_with_options(
    program: &Program,
    subject: &[char],
    start: usize,
    options: &ExecOptions,
) -> Result<Option<MatchResult>, RegexError> {
    if start > subject.len() {
        return Ok(None);
    }

    let mut machine = Machine::new(program, subject, options);
    machine.trace(format_args!("execute at {}", start));
    Ok(machine.execute_at(start)?)
}

/// Find the leftmost match starting at `start` or after it.
pub fn search(
    program: &Program,
    subject: &[char],
    start: usize,
) -> Result<Option<MatchResult>, RegexError> {
    search_with_options(program, subject, start, &ExecOptions::default())
}

pub fn search_with_options(
    program: &Program,
    subject: &[char],
    start: usize,
    options: &ExecOptions,
) -> Result<Option<MatchResult>, RegexError> {
    if start > subject.len() {
        return Ok(None);
    }

    let mut machine = Machine::new(program, subject, options);

    // only offset 0 can satisfy a leading `^`
    let last = if program.anchored_start {
        0
    } else {
        subject.len()
    };

    for ix in start..=last {
        machine.trace(format_args!("search at {}", ix));
        if let Some(result) = machine.execute_at(ix)? {
            return Ok(Some(result));
        }
    }

    Ok(None)
}

#[derive(Debug, Clone, Copy)]
struct Branch {
    pc: usize,
    ix: usize,
    nsave: usize,
}

#[derive(Debug, Clone, Copy)]
struct Save {
    slot: usize,
    value: usize,
}

/// Slots plus the choice point stack of one (sub-)execution.
#[derive(Debug)]
struct State {
    // capture slots, loop counters and loop checks
    saves: Vec<usize>,

    // choice points
    stack: Vec<Branch>,

    // the previous values of the slots written since the choice points
    oldsave: Vec<Save>,

    // number of `oldsave` entries belonging to the latest choice point
    nsave: usize,

    max_stack: usize,
}

impl State {
    fn new(saves: Vec<usize>, max_stack: usize) -> Self {
        State {
            saves,
            stack: vec![],
            oldsave: vec![],
            nsave: 0,
            max_stack,
        }
    }

    fn push(&mut self, pc: usize, ix: usize) -> Result<(), RuntimeError> {
        if self.stack.len() < self.max_stack {
            let nsave = self.nsave;
            self.stack.push(Branch { pc, ix, nsave });
            self.nsave = 0;
            Ok(())
        } else {
            Err(RuntimeError::StackOverflow)
        }
    }

    fn pop(&mut self) -> Option<(usize, usize)> {
        let branch = self.stack.pop()?;

        for _ in 0..self.nsave {
            if let Some(Save { slot, value }) = self.oldsave.pop() {
                self.saves[slot] = value;
            }
        }

        self.nsave = branch.nsave;
        Some((branch.pc, branch.ix))
    }

    fn save(&mut self, slot: usize, value: usize) {
        let len = self.oldsave.len();
        for i in 0..self.nsave {
            if self.oldsave[len - i - 1].slot == slot {
                // already logged since the latest choice point
                self.saves[slot] = value;
                return;
            }
        }

        self.oldsave.push(Save {
            slot,
            value: self.saves[slot],
        });
        self.nsave += 1;
        self.saves[slot] = value;
    }

    fn get(&self, slot: usize) -> usize {
        self.saves[slot]
    }
}

struct Machine<'a> {
    program: &'a Program,
    subject: &'a [char],
    options: &'a ExecOptions,

    // shared by all executions of one call, lookarounds included
    backtrack_count: usize,
}

impl<'a> Machine<'a> {
    fn new(program: &'a Program, subject: &'a [char], options: &'a ExecOptions) -> Self {
        Machine {
            program,
            subject,
            options,
            backtrack_count: 0,
        }
    }

    fn trace(&self, args: fmt::Arguments) {
        #[cfg(debug_assertions)]
        if self.options.trace {
            eprintln!("{}", args);
        }
        let _ = args;
    }

    fn execute_at(&mut self, ix: usize) -> Result<Option<MatchResult>, RuntimeError> {
        let saves = vec![UNSET; self.program.n_slots];
        let result = self
            .run(saves, 0, ix, None)?
            .map(|saves| MatchResult::from_slots(self.program, &saves));
        Ok(result)
    }

    /// Run from `pc` at position `ix` until `Accept`, return the slots on
    /// success.
    ///
    /// With `accept_at`, `Accept` only succeeds at that position
    /// (lookbehind bodies must end at the assertion position).
    fn run(
        &mut self,
        saves: Vec<usize>,
        mut pc: usize,
        mut ix: usize,
        accept_at: Option<usize>,
    ) -> Result<Option<Vec<usize>>, RuntimeError> {
        let program = self.program;
        let subject = self.subject;
        let mut state = State::new(saves, self.options.max_stack);

        self.trace(format_args!("pos\tinstruction"));

        loop {
            // break from this loop to fail, causes stack to pop
            'fail: loop {
                let insn = match program.body.get(pc) {
                    Some(insn) => insn,
                    None => break 'fail,
                };

                self.trace(format_args!("{}\t{} {}", ix, pc, insn));

                match insn {
                    Insn::Match(matcher) => match subject.get(ix) {
                        Some(c) if matcher.matches(*c) => ix += 1,
                        _ => break 'fail,
                    },
                    Insn::Split(x, y) => {
                        state.push(*y, ix)?;
                        pc = *x;
                        continue;
                    }
                    Insn::Jump(target) => {
                        pc = *target;
                        continue;
                    }
                    Insn::ResetCounter(slot) => {
                        state.save(*slot, 0);
                    }
                    Insn::Repeat {
                        min,
                        max,
                        next,
                        counter,
                        check,
                        greedy,
                    } => {
                        let count = state.get(*counter);

                        if let Some(slot) = check {
                            // an optional iteration that consumed nothing
                            if count > *min && state.get(*slot) == ix {
                                break 'fail;
                            }
                            state.save(*slot, ix);
                        }

                        if *max == Some(count) {
                            pc = *next;
                            continue;
                        }

                        state.save(*counter, count + 1);

                        if count >= *min {
                            if *greedy {
                                state.push(*next, ix)?;
                            } else {
                                state.push(pc + 1, ix)?;
                                pc = *next;
                                continue;
                            }
                        }
                    }
                    Insn::Anchor(anchor) => {
                        if !self.check_anchor(*anchor, ix) {
                            break 'fail;
                        }
                    }
                    Insn::CaptureStart(id) => {
                        state.save(id * 2, ix);
                    }
                    Insn::CaptureEnd(id) => {
                        state.save(id * 2 + 1, ix);
                    }
                    Insn::Assert {
                        kind,
                        negative,
                        next,
                        length,
                    } => {
                        let saves = state.saves.clone();
                        let outcome = match kind {
                            AssertKind::Lookahead => self.run(saves, pc + 1, ix, None)?,
                            AssertKind::Lookbehind => {
                                self.run_lookbehind(saves, pc + 1, ix, *length)?
                            }
                        };

                        match (outcome, negative) {
                            (Some(inner_saves), false) => {
                                // keep the captures made inside a positive assertion
                                for (slot, value) in inner_saves.into_iter().enumerate() {
                                    if state.get(slot) != value {
                                        state.save(slot, value);
                                    }
                                }
                            }
                            (None, true) => {}
                            _ => break 'fail,
                        }

                        pc = *next;
                        continue;
                    }
                    Insn::Ref(id) => {
                        let (start, end) = (state.get(id * 2), state.get(id * 2 + 1));

                        // a reference to a group that has not participated fails
                        if start == UNSET || end == UNSET || start > end {
                            break 'fail;
                        }

                        let captured = &subject[start..end];
                        match subject.get(ix..ix + captured.len()) {
                            Some(text) if text == captured => ix += captured.len(),
                            _ => break 'fail,
                        }
                    }
                    Insn::Accept => {
                        if accept_at.map_or(true, |position| position == ix) {
                            self.trace(format_args!("accept: {:?}", state.saves));
                            return Ok(Some(state.saves));
                        }
                        break 'fail;
                    }
                    Insn::Halt => break 'fail,
                }
                pc += 1;
            }

            // "break 'fail" goes here
            self.trace(format_args!("fail"));

            if state.stack.is_empty() {
                return Ok(None);
            }

            self.backtrack_count += 1;
            if self.backtrack_count > self.options.backtrack_limit {
                return Err(RuntimeError::BacktrackLimitExceeded);
            }

            match state.pop() {
                Some((newpc, newix)) => {
                    pc = newpc;
                    ix = newix;
                }
                None => return Ok(None),
            }
        }
    }

    // The body has to end exactly at `ix`. Start positions are tried
    // nearest first.
    fn run_lookbehind(
        &mut self,
        saves: Vec<usize>,
        pc: usize,
        ix: usize,
        length: Option<usize>,
    ) -> Result<Option<Vec<usize>>, RuntimeError> {
        if let Some(length) = length {
            return match ix.checked_sub(length) {
                Some(start) => self.run(saves, pc, start, Some(ix)),
                None => Ok(None),
            };
        }

        for start in (0..=ix).rev() {
            if let Some(result) = self.run(saves.clone(), pc, start, Some(ix))? {
                return Ok(Some(result));
            }
        }

        Ok(None)
    }

    fn check_anchor(&self, anchor: Anchor, ix: usize) -> bool {
        match anchor {
            Anchor::Begin => ix == 0,
            Anchor::End => ix == self.subject.len(),
            Anchor::WordBoundary => self.is_word_boundary(ix),
            Anchor::NotWordBoundary => !self.is_word_boundary(ix),
        }
    }

    fn is_word_boundary(&self, ix: usize) -> bool {
        let before = ix > 0 && is_word_char(self.subject[ix - 1]);
        let after = self.subject.get(ix).is_some_and(|c| is_word_char(*c));
        before != after
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quickcheck::{quickcheck, Arbitrary, Gen};

    use crate::{
        compiler::compile_from_str,
        error::{RegexError, RuntimeError},
        program::Program,
    };

    use super::{
        execute, search, search_with_options, ExecOptions, MatchResult, State, UNSET,
    };

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn program(pattern: &str) -> Program {
        compile_from_str(pattern).unwrap()
    }

    fn search_str(pattern: &str, subject: &str) -> Option<MatchResult> {
        search(&program(pattern), &chars(subject), 0).unwrap()
    }

    fn span_of(pattern: &str, subject: &str) -> Option<(usize, usize)> {
        search_str(pattern, subject).map(|result| result.span())
    }

    #[test]
    fn state_push_pop() {
        let mut state = State::new(vec![UNSET; 1], 16);

        state.push(0, 0).unwrap();
        state.push(1, 1).unwrap();
        assert_eq!(state.pop(), Some((1, 1)));
        assert_eq!(state.pop(), Some((0, 0)));
        assert!(state.stack.is_empty());
        assert_eq!(state.pop(), None);

        state.push(2, 2).unwrap();
        assert_eq!(state.pop(), Some((2, 2)));
        assert!(state.stack.is_empty());
    }

    #[test]
    fn state_save_override() {
        let mut state = State::new(vec![UNSET; 1], 16);
        state.save(0, 10);
        state.push(0, 0).unwrap();
        state.save(0, 20);
        state.push(1, 1).unwrap();
        state.save(0, 30);

        assert_eq!(state.get(0), 30);
        assert_eq!(state.pop(), Some((1, 1)));
        assert_eq!(state.get(0), 20);
        assert_eq!(state.pop(), Some((0, 0)));
        assert_eq!(state.get(0), 10);
    }

    #[test]
    fn state_stack_overflow() {
        let mut state = State::new(vec![], 2);
        state.push(0, 0).unwrap();
        state.push(0, 0).unwrap();
        assert_eq!(state.push(0, 0), Err(RuntimeError::StackOverflow));
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Push,
        Pop,
        Save(usize, usize),
    }

    impl Arbitrary for Operation {
        fn arbitrary(g: &mut Gen) -> Self {
            match g.choose(&[0, 1, 2]) {
                Some(0) => Operation::Push,
                Some(1) => Operation::Pop,
                _ => Operation::Save(
                    *g.choose(&[0usize, 1, 2, 3, 4]).unwrap(),
                    usize::arbitrary(g),
                ),
            }
        }
    }

    fn check_saves_for_operations(operations: Vec<Operation>) -> bool {
        let slots = 5;

        // the complete slot table at every choice point
        let mut stack = vec![];
        let mut saves = vec![UNSET; slots];
        let mut state = State::new(vec![UNSET; slots], usize::MAX);

        for operation in operations {
            match operation {
                Operation::Push => {
                    stack.push(saves.clone());
                    state.push(0, 0).unwrap();
                }
                Operation::Pop => {
                    // there may be more pops than pushes
                    if let Some(previous_saves) = stack.pop() {
                        saves = previous_saves;
                        state.pop();
                    }
                }
                Operation::Save(slot, value) => {
                    saves[slot] = value;
                    state.save(slot, value);
                }
            }

            if state.saves != saves {
                return false;
            }
        }

        true
    }

    quickcheck! {
        fn state_save_quickcheck(operations: Vec<Operation>) -> bool {
            check_saves_for_operations(operations)
        }
    }

    #[test]
    fn test_execute_at_offset() {
        let p = program("ab");
        let subject = chars("xab");

        assert_eq!(execute(&p, &subject, 0).unwrap(), None);
        assert_eq!(execute(&p, &subject, 1).unwrap().map(|r| r.span()), Some((1, 3)));

        // out of range
        assert_eq!(execute(&p, &subject, 4).unwrap(), None);
        assert_eq!(search(&p, &subject, 4).unwrap(), None);
    }

    #[test]
    fn test_search_words() {
        assert_eq!(span_of(r#"^hello\w*"#, "helloworld!"), Some((0, 10)));
        assert_eq!(span_of(r#"^hello\w*"#, "say helloworld"), None);

        assert_eq!(
            span_of(
                r#"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"#,
                "mail to: john.doe@example.com."
            ),
            Some((9, 29))
        );

        // matches at the end of subject
        assert_eq!(span_of("a$", "bba"), Some((2, 3)));
        assert_eq!(span_of("a$", "bab"), None);
    }

    #[test]
    fn test_search_groups() {
        let result = search_str("(a|b)+", "ababab").unwrap();
        assert_eq!(result.span(), (0, 6));
        assert_eq!(result.get(1), Some((5, 6)));

        // group that did not participate
        let result = search_str("(a)|(b)", "b").unwrap();
        assert_eq!(result.get(1), None);
        assert_eq!(result.get(2), Some((0, 1)));
        assert_eq!(result.len(), 3);

        // named
        let result = search_str("(?<year>\\d{4})-(?<month>\\d{2})", "on 2024-05").unwrap();
        assert_eq!(result.name("year"), Some((3, 7)));
        assert_eq!(result.name("month"), Some((8, 10)));
        assert_eq!(result.name("day"), None);
        assert_eq!(result.group_name(1), Some("year"));
    }

    #[test]
    fn test_search_repetition() {
        assert_eq!(span_of("a{3,5}", "aaaa"), Some((0, 4)));
        assert_eq!(span_of("a{3,5}", "aa"), None);
        assert_eq!(span_of("a{3,5}", "aaaaaaa"), Some((0, 5)));
        assert_eq!(span_of("a{3}", "aaaa"), Some((0, 3)));
        assert_eq!(span_of("a{2,}", "caaab"), Some((1, 4)));
        assert_eq!(span_of("xa{0}y", "xy"), Some((0, 2)));
        assert_eq!(span_of("a{,}", "aaa"), Some((0, 3)));
        assert_eq!(span_of("ba{,}?", "baa"), Some((0, 1)));

        // greedy takes as many as possible then backtracks
        assert_eq!(span_of("a*a", "aaaa"), Some((0, 4)));
        assert_eq!(span_of("a+b", "aaab"), Some((0, 4)));

        // lazy takes as few as possible
        assert_eq!(span_of("a+?", "aaaa"), Some((0, 1)));
        assert_eq!(span_of("a*?b", "aaab"), Some((0, 4)));
        assert_eq!(span_of("a{2,4}?", "aaaa"), Some((0, 2)));
        assert_eq!(span_of("<.+?>", "<a><b>"), Some((0, 3)));
        assert_eq!(span_of("<.+>", "<a><b>"), Some((0, 6)));

        // the body of a counted repetition is a group
        let result = search_str("(ab){2}", "xababab").unwrap();
        assert_eq!(result.span(), (1, 5));
        assert_eq!(result.get(1), Some((3, 5)));
    }

    #[test]
    fn test_search_empty_loops() {
        // terminates although the body can match the empty string
        assert_eq!(span_of("(a*)*", "aaa"), Some((0, 3)));
        assert_eq!(span_of("(a*)*b", "aab"), Some((0, 3)));
        assert_eq!(span_of("(a?)+", "b"), Some((0, 0)));
        assert_eq!(span_of("(a|)*c", "aac"), Some((0, 3)));
        assert_eq!(span_of("(a*){2,}x", "ax"), Some((0, 2)));
        assert_eq!(span_of("(a*)*", ""), Some((0, 0)));
    }

    #[test]
    fn test_search_lookaround() {
        assert_eq!(span_of(r#"(?<=\s).+?(?=\s)"#, "x y z"), Some((2, 3)));

        assert_eq!(span_of("a(?=b)", "acab"), Some((2, 3)));
        assert_eq!(span_of("a(?!b)", "abac"), Some((2, 3)));
        assert_eq!(span_of("(?<=a)b", "cbab"), Some((3, 4)));
        assert_eq!(span_of("(?<!a)b", "abcb"), Some((3, 4)));

        // variable length lookbehind
        assert_eq!(span_of("(?<=a+)b", "xaab"), Some((3, 4)));
        assert_eq!(span_of("(?<=^a*)b", "aab"), Some((2, 3)));
        assert_eq!(span_of("(?<=^a*)b", "acb"), None);

        // lookbehind at the start of subject
        assert_eq!(span_of("(?<=a)b", "b"), None);
        assert_eq!(span_of("(?<!a)b", "b"), Some((0, 1)));

        // captures made inside a positive assertion are kept
        let result = search_str("(?=(\\w+))a", "abc").unwrap();
        assert_eq!(result.span(), (0, 1));
        assert_eq!(result.get(1), Some((0, 3)));

        // but not from a negative one
        let result = search_str("(?!(x))a", "abc").unwrap();
        assert_eq!(result.get(1), None);
    }

    #[test]
    fn test_search_word_boundary() {
        assert_eq!(span_of(r#"\bcat\b"#, "concat cat"), Some((7, 10)));
        assert_eq!(span_of(r#"\Bcat"#, "cat concat"), Some((7, 10)));
        assert_eq!(span_of(r#"\b"#, ""), None);
        assert_eq!(span_of(r#"\B"#, ""), Some((0, 0)));
    }

    #[test]
    fn test_search_backreference() {
        assert_eq!(span_of(r#"(\w)\1"#, "abccd"), Some((2, 4)));
        assert_eq!(span_of(r#"(?<q>['"]).*?\k<q>"#, r#"say "hi" 'x'"#), Some((4, 8)));

        // a reference to an unset group fails locally
        assert_eq!(span_of(r#"(a)?\1b"#, "b"), None);
        assert_eq!(span_of(r#"(?:(a)|b)\1"#, "bb"), None);
        assert_eq!(span_of(r#"(?:(a)|b)\1"#, "aa"), Some((0, 2)));

        // case sensitive
        assert_eq!(span_of(r#"(a)\1"#, "aA"), None);
    }

    #[test]
    fn test_search_anchored_start() {
        let p = program("^a");
        assert!(p.anchored_start);
        assert_eq!(search(&p, &chars("ba"), 0).unwrap(), None);
        assert_eq!(search(&p, &chars("ab"), 0).unwrap().map(|r| r.span()), Some((0, 1)));

        // alternatives without `^` are still searched everywhere
        assert_eq!(span_of("^a|b", "cb"), Some((1, 2)));
    }

    #[test]
    fn test_search_unicode() {
        assert_eq!(span_of(r#"\p{Greek}+"#, "abc αβγ"), Some((4, 7)));
        assert_eq!(span_of(r#"\u{1F600}"#, "hi 😀"), Some((3, 4)));
        assert_eq!(span_of(".", "\n文"), Some((1, 2)));
    }

    #[test]
    fn test_backtrack_limit() {
        let p = program("(a*)*b");
        let subject = chars(&"a".repeat(30));
        let options = ExecOptions {
            backtrack_limit: 1000,
            ..ExecOptions::default()
        };

        assert_eq!(
            search_with_options(&p, &subject, 0, &options),
            Err(RegexError::Runtime(RuntimeError::BacktrackLimitExceeded))
        );

        let p = program("(?:a|aa)+b");
        let subject = chars(&"a".repeat(40));
        assert_eq!(
            search(&p, &subject, 0),
            Err(RegexError::Runtime(RuntimeError::BacktrackLimitExceeded))
        );
    }

    #[test]
    fn test_stack_limit() {
        let p = program("a*");
        let subject = chars(&"a".repeat(100));
        let options = ExecOptions {
            max_stack: 10,
            ..ExecOptions::default()
        };

        assert_eq!(
            search_with_options(&p, &subject, 0, &options),
            Err(RegexError::Runtime(RuntimeError::StackOverflow))
        );
    }

    fn check_bounded_repetition(min: u8, extra: u8, count: u8) -> bool {
        let min = (min % 6) as usize;
        let max = min + (extra % 6) as usize;
        let count = (count % 14) as usize;
        let pattern = format!("^a{{{},{}}}", min, max);
        let subject = chars(&"a".repeat(count));
        let result = search(&program(&pattern), &subject, 0).unwrap();

        if count < min {
            result.is_none()
        } else {
            result.map(|r| r.span()) == Some((0, count.min(max)))
        }
    }

    quickcheck! {
        fn repetition_bounds_quickcheck(min: u8, extra: u8, count: u8) -> bool {
            check_bounded_repetition(min, extra, count)
        }
    }
}
