// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::backtrack;
use crate::input::Input;
use crate::inst::{Inst, InstIdx};
use crate::pikevm;

/// The eligibility threshold for the bounded backtracker (spec.md §4.7):
/// `(program_len + 1) * (input_len + 1)` must stay under this to bound the
/// visited-state bitset to a reasonable size.
const BACKTRACK_MAX_PRODUCT: u64 = 512 * 32;

/// A compiled regular expression: a flat instruction sequence plus its two
/// entry points.
///
/// Once compiled, a `Program` is immutable — both matching engines take it
/// by shared reference and keep their own scratch state.
#[derive(Clone, Debug)]
pub struct Program {
    /// The instruction sequence (spec.md §3).
    pub insts: Vec<Inst>,
    /// Entry point for an anchored match: just past the implicit
    /// whole-match `Save(0)`.
    pub start: InstIdx,
    /// Entry point for an unanchored search: the `Split`/`AnyCharNotNl`
    /// prologue that non-deterministically advances the start position.
    pub find_start: InstIdx,
}

impl Program {
    pub fn new(insts: Vec<Inst>, start: InstIdx, find_start: InstIdx) -> Program {
        Program { insts, start, find_start }
    }

    /// The number of capture groups, including the implicit group 0 (the
    /// whole match).
    pub fn num_captures(&self) -> usize {
        let mut n = 0;
        for inst in &self.insts {
            if let Inst::Save(ref s) = *inst {
                n = n.max(s.slot + 1);
            }
        }
        n / 2
    }

    /// `true` iff the bounded backtracker's `(program_len + 1) * (input_len
    /// + 1)` visited-state bitset stays under the budget spec.md §4.7 sets.
    pub fn backtrack_is_eligible(&self, input_len: usize) -> bool {
        let prog = self.insts.len() as u64 + 1;
        let input = input_len as u64 + 1;
        prog.saturating_mul(input) < BACKTRACK_MAX_PRODUCT
    }

    /// Run this program against `text`, starting the search at byte offset
    /// `start`. `anchored` forces the match to begin exactly at `start`
    /// (skipping the unanchored `find_start` prologue). Dispatches to
    /// whichever of the two engines spec.md §4.7 says is eligible.
    pub fn exec(
        &self,
        caps: &mut [Option<usize>],
        text: &[u8],
        start: usize,
        anchored: bool,
    ) -> bool {
        let input = Input::new(text);
        let entry = if anchored { self.start } else { self.find_start };
        if self.backtrack_is_eligible(text.len()) {
            log::trace!(
                "dispatch: backtrack (insts={}, input_len={})",
                self.insts.len(),
                text.len()
            );
            backtrack::exec(self, entry, &input, caps, start)
        } else {
            log::trace!(
                "dispatch: pikevm (insts={}, input_len={} exceeds backtrack budget)",
                self.insts.len(),
                text.len()
            );
            pikevm::exec(self, entry, &input, caps, start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::parse::parse;

    #[test]
    fn num_captures_counts_whole_match_and_groups() {
        let p = compile(&parse(b"(a)(b(c))").unwrap());
        assert_eq!(p.num_captures(), 3);
    }

    #[test]
    fn backtrack_eligibility_respects_budget() {
        let p = compile(&parse(b"a").unwrap());
        assert!(p.backtrack_is_eligible(10));
        assert!(!p.backtrack_is_eligible(100_000));
    }

    // spec.md §8's central cross-engine equivalence property: for any
    // (program, input), BacktrackVM and PikeVM agree on the boolean result
    // and, on success, the capture slots. Checked directly (bypassing
    // Program::exec's eligibility dispatch, which only picks an engine for
    // performance) against a handful of small regex programs exercising
    // alternation, repetition, and captures, paired with arbitrary input
    // bytes (per SPEC_FULL.md §8: generated text against fixed small
    // programs, rather than a regex-generating grammar).
    fn equivalence_patterns() -> Vec<&'static str> {
        vec!["a*b", "(a|ab)(c|bcd)(d*)", "[a-z]+\\d?", "a{2,4}b", "^a.*b$", r"\bfoo\b", "(x)?y"]
    }

    quickcheck::quickcheck! {
        fn prop_backtrack_and_pikevm_agree(text: Vec<u8>) -> bool {
            let text: Vec<u8> = text.into_iter().take(24).collect();
            let input = Input::new(&text);
            equivalence_patterns().iter().all(|pattern| {
                let prog = compile(&parse(pattern.as_bytes()).unwrap());
                let mut back = vec![None; 2 * prog.num_captures()];
                let mut pike = vec![None; 2 * prog.num_captures()];
                let back_ok = backtrack::exec(&prog, prog.find_start, &input, &mut back, 0);
                let pike_ok = pikevm::exec(&prog, prog.find_start, &input, &mut pike, 0);
                back_ok == pike_ok && (!back_ok || back == pike)
            })
        }
    }
}
