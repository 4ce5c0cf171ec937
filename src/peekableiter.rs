// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::collections::VecDeque;

/// An iterator adapter that can look ahead a fixed number of items.
///
/// Unlike `std::iter::Peekable`, `peek(offset)` can inspect any of the
/// next `max_peek_count` items without consuming them.
pub struct PeekableIter<'a, T> {
    upstream: &'a mut dyn Iterator<Item = T>,
    buffer: VecDeque<T>,
    max_peek_count: usize,
}

impl<'a, T> PeekableIter<'a, T> {
    pub fn new(upstream: &'a mut dyn Iterator<Item = T>, max_peek_count: usize) -> Self {
        let mut buffer = VecDeque::with_capacity(max_peek_count);
        for _ in 0..max_peek_count {
            match upstream.next() {
                Some(item) => buffer.push_back(item),
                None => break,
            }
        }

        Self {
            upstream,
            buffer,
            max_peek_count,
        }
    }

    /// Returns the item `offset` positions ahead, `peek(0)` is the item
    /// that `next()` would return.
    pub fn peek(&self, offset: usize) -> Option<&T> {
        debug_assert!(
            offset < self.max_peek_count,
            "peek offset {} exceeds the look-ahead capacity {}",
            offset,
            self.max_peek_count
        );
        self.buffer.get(offset)
    }
}

impl<T> Iterator for PeekableIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.pop_front()?;
        if let Some(upcoming) = self.upstream.next() {
            self.buffer.push_back(upcoming);
        }
        Some(item)
    }
}
