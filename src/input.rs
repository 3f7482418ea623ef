// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A byte cursor over the haystack, shared by both execution engines.
//!
//! There is exactly one kind of input here: raw bytes. Neither engine
//! decodes UTF-8 or advances by codepoint; a "character" is a byte.

use crate::expr::Assertion;
use crate::range::is_word_byte;

/// A position within a haystack, plus enough of its neighborhood to decide
/// zero-width assertions.
#[derive(Clone, Copy, Debug)]
pub struct InputAt {
    pos: usize,
    byte: Option<u8>,
}

impl InputAt {
    /// The byte at this position, or `None` at end of input.
    pub fn byte(&self) -> Option<u8> {
        self.byte
    }

    /// The byte offset of this position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The byte offset of the position following this one. Identical to
    /// `pos()` at end of input, since there is nowhere further to advance.
    pub fn next_pos(&self) -> usize {
        match self.byte {
            Some(_) => self.pos + 1,
            None => self.pos,
        }
    }

    pub fn is_end(&self) -> bool {
        self.byte.is_none()
    }
}

/// A haystack plus a cursor into it (spec.md §4.4).
#[derive(Clone, Copy, Debug)]
pub struct Input<'t> {
    haystack: &'t [u8],
}

impl<'t> Input<'t> {
    pub fn new(haystack: &'t [u8]) -> Input<'t> {
        Input { haystack }
    }

    pub fn len(&self) -> usize {
        self.haystack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.haystack.is_empty()
    }

    /// Encode the position at byte offset `i`.
    pub fn at(&self, i: usize) -> InputAt {
        InputAt { pos: i, byte: self.haystack.get(i).copied() }
    }

    fn byte_before(&self, pos: usize) -> Option<u8> {
        if pos == 0 {
            None
        } else {
            self.haystack.get(pos - 1).copied()
        }
    }

    /// Does `assertion` hold with the cursor at `at`? (spec.md §4.4.)
    ///
    /// `BeginLine`/`EndLine` are identical to `BeginText`/`EndText`: there is
    /// no multi-line mode here (spec.md §9, Open Question 1), so both pairs
    /// test the same thing — start/end of the whole haystack, not of a
    /// line. A future multi-line mode would split these; today they alias.
    pub fn is_empty_match(&self, assertion: Assertion, at: InputAt) -> bool {
        match assertion {
            Assertion::None => true,
            Assertion::BeginText | Assertion::BeginLine => at.pos() == 0,
            Assertion::EndText | Assertion::EndLine => at.pos() >= self.len(),
            Assertion::WordBoundaryAscii => self.is_word_boundary(at),
            Assertion::NotWordBoundaryAscii => !self.is_word_boundary(at),
        }
    }

    fn is_word_boundary(&self, at: InputAt) -> bool {
        let before = self.byte_before(at.pos()).is_some_and(is_word_byte);
        let after = at.byte().is_some_and(is_word_byte);
        before != after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_end_text() {
        let input = Input::new(b"ab");
        assert!(input.is_empty_match(Assertion::BeginText, input.at(0)));
        assert!(!input.is_empty_match(Assertion::BeginText, input.at(1)));
        assert!(input.is_empty_match(Assertion::EndText, input.at(2)));
        assert!(!input.is_empty_match(Assertion::EndText, input.at(1)));
    }

    #[test]
    fn begin_end_line_alias_begin_end_text() {
        // No multi-line mode (spec.md §9 OQ1): embedded newlines don't
        // create new line-boundary positions.
        let input = Input::new(b"a\nb");
        assert!(input.is_empty_match(Assertion::BeginLine, input.at(0)));
        assert!(!input.is_empty_match(Assertion::BeginLine, input.at(2)));
        assert!(!input.is_empty_match(Assertion::EndLine, input.at(1)));
        assert!(input.is_empty_match(Assertion::EndLine, input.at(3)));
    }

    #[test]
    fn word_boundary() {
        let input = Input::new(b"a b");
        assert!(input.is_empty_match(Assertion::WordBoundaryAscii, input.at(0)));
        assert!(input.is_empty_match(Assertion::WordBoundaryAscii, input.at(1)));
        assert!(!input.is_empty_match(Assertion::WordBoundaryAscii, input.at(3)));
        assert!(input.is_empty_match(Assertion::NotWordBoundaryAscii, input.at(3)));
    }
}
