// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The public surface: [`Regex`], [`RegexBuilder`], and the capture types
//! returned from a successful search.

use crate::compile;
use crate::error::Error;
use crate::parse;
use crate::program::Program;

/// A compiled regular expression.
///
/// Cheap to clone (`Program` owns its instruction vector outright, with no
/// shared/reference-counted state), and `&self` suffices for every search
/// method — each call builds its own engine-local scratch state rather than
/// reusing anything cached on `Regex` itself (spec.md §5: a compiled program
/// is immutable; nothing here is shared-mutable).
#[derive(Clone, Debug)]
pub struct Regex {
    prog: Program,
    original: String,
}

impl Regex {
    /// Compile `pattern` with the default repeat-count limit (1000, see
    /// [`RegexBuilder::max_repeat_length`]).
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        RegexBuilder::new(pattern).build()
    }

    /// The original pattern source this `Regex` was compiled from.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// The number of capture groups, including the implicit whole-match
    /// group 0.
    pub fn captures_len(&self) -> usize {
        self.prog.num_captures()
    }

    /// Unanchored search: `true` iff `text` contains a match anywhere.
    /// Corresponds to spec.md §4.8's `partial_match`.
    pub fn is_match(&self, text: &[u8]) -> bool {
        self.prog.exec(&mut [], text, 0, false)
    }

    /// Unanchored search starting no earlier than byte offset `start`.
    pub fn is_match_at(&self, text: &[u8], start: usize) -> bool {
        self.prog.exec(&mut [], text, start, false)
    }

    /// Anchored search: `true` iff `text` matches starting exactly at byte
    /// 0. Corresponds to spec.md §4.8's `match`.
    pub fn is_anchored_match(&self, text: &[u8]) -> bool {
        self.prog.exec(&mut [], text, 0, true)
    }

    /// Find the leftmost unanchored match in `text` and return its capture
    /// slots. Corresponds to spec.md §4.8's `captures`.
    pub fn captures<'t>(&self, text: &'t [u8]) -> Option<Captures<'t>> {
        let mut slots = vec![None; 2 * self.prog.num_captures()];
        if self.prog.exec(&mut slots, text, 0, false) {
            Some(Captures { text, slots })
        } else {
            None
        }
    }

    /// Find the leftmost unanchored match in `text` and return just its
    /// span, without paying for the rest of the capture-slot vector. A thin
    /// convenience wrapper over `captures().get(0)`.
    pub fn find<'t>(&self, text: &'t [u8]) -> Option<Match<'t>> {
        self.captures(text)?.get(0)
    }
}

/// Builder for a [`Regex`], exposing the one parser knob spec.md §6 names:
/// `max_repeat_length`.
#[derive(Clone, Debug)]
pub struct RegexBuilder {
    pattern: String,
    max_repeat_length: usize,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> RegexBuilder {
        RegexBuilder {
            pattern: pattern.to_string(),
            max_repeat_length: parse::DEFAULT_MAX_REPEAT_LENGTH,
        }
    }

    /// Cap on both `m` and `n` in any `{m,n}` repeat form. Default 1000.
    pub fn max_repeat_length(mut self, n: usize) -> RegexBuilder {
        self.max_repeat_length = n;
        self
    }

    pub fn build(self) -> Result<Regex, Error> {
        let expr = match parse::parse_with_limit(self.pattern.as_bytes(), self.max_repeat_length) {
            Ok(expr) => expr,
            Err(e) => {
                log::debug!("failed to parse pattern {:?}: {}", self.pattern, e);
                return Err(e.into());
            }
        };
        let prog = compile::compile(&expr);
        log::trace!(
            "compiled pattern {:?} to {} instructions ({} capture groups)",
            self.pattern,
            prog.insts.len(),
            prog.num_captures()
        );
        Ok(Regex { prog, original: self.pattern })
    }
}

/// A snapshot of capture-slot positions from one successful search, plus a
/// borrow of the haystack they index into.
#[derive(Clone, Debug)]
pub struct Captures<'t> {
    text: &'t [u8],
    slots: Vec<Option<usize>>,
}

impl<'t> Captures<'t> {
    /// The number of capture slot pairs, including group 0.
    pub fn len(&self) -> usize {
        self.slots.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `(start, end)` byte offsets of group `i`, or `None` if that group
    /// didn't participate in the match (spec.md §4.8).
    pub fn bounds_at(&self, i: usize) -> Option<(usize, usize)> {
        let lo = (*self.slots.get(2 * i)?)?;
        let hi = (*self.slots.get(2 * i + 1)?)?;
        Some((lo, hi))
    }

    /// The matched bytes for group `i`, or `None` if `i` is out of range or
    /// didn't participate.
    pub fn slice_at(&self, i: usize) -> Option<&'t [u8]> {
        let (lo, hi) = self.bounds_at(i)?;
        Some(&self.text[lo..hi])
    }

    /// `get(0)` is always the whole match when `Captures` exists at all.
    pub fn get(&self, i: usize) -> Option<Match<'t>> {
        let (start, end) = self.bounds_at(i)?;
        Some(Match { text: self.text, start, end })
    }
}

/// A single matched span, borrowed from the haystack passed to
/// [`Regex::captures`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t [u8],
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn as_bytes(&self) -> &'t [u8] {
        &self.text[self.start..self.end]
    }
}
