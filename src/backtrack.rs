// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// This is the bounded backtracking matching engine. It has the same exact
// capability as the full Pike VM simulation, except it is artificially
// restricted to small regexes on small inputs because of its memory
// requirements.
//
// It retains worst-case linear time by keeping track of the states it has
// visited (using a bitmap). Once a state is visited, it is never visited
// again. Since a state is keyed by `(instruction index, input index)`, its
// time complexity is `O(mn)`.

use crate::input::{Input, InputAt};
use crate::inst::{Inst, InstIdx};
use crate::program::Program;

type Bits = u32;
const BIT_SIZE: usize = 32;

/// Run the bounded backtracker starting the search at byte offset `start`,
/// entering the program at `entry`. Populates `caps` (slot-indexed, `len ==
/// 2 * num_captures`) and returns whether a match was found.
pub fn exec(
    prog: &Program,
    entry: InstIdx,
    input: &Input,
    caps: &mut [Option<usize>],
    start: usize,
) -> bool {
    let visited_len = (prog.insts.len() * (input.len() + 1) + BIT_SIZE - 1) / BIT_SIZE;
    let mut b = Backtrack {
        prog,
        input,
        caps,
        entry,
        jobs: Vec::new(),
        visited: vec![0; visited_len],
    };
    // `entry` already encodes whether the search is anchored: `start`
    // skips straight to the body, `find_start` carries its own
    // Split/AnyCharNotNl loop that advances the cursor on backtrack. No
    // outer per-position loop is needed here.
    b.search_from(input.at(start))
}

/// A job is an explicit unit of stack space: either a pending instruction
/// to try, or a capture slot to restore once the path that set it fails.
/// The explicit stack (rather than native recursion) is what lets this
/// engine backtrack without blowing the call stack on pathological inputs.
enum Job {
    Inst { pc: InstIdx, at: InputAt },
    SaveRestore { slot: usize, old: Option<usize> },
}

struct Backtrack<'r, 't, 'c> {
    prog: &'r Program,
    input: &'t Input<'t>,
    caps: &'c mut [Option<usize>],
    entry: InstIdx,
    jobs: Vec<Job>,
    visited: Vec<Bits>,
}

impl<'r, 't, 'c> Backtrack<'r, 't, 'c> {
    fn search_from(&mut self, at: InputAt) -> bool {
        self.jobs.clear();
        for v in &mut self.visited {
            *v = 0;
        }
        self.push(self.entry, at);
        while let Some(job) = self.jobs.pop() {
            match job {
                Job::Inst { pc, at } => {
                    if self.step(pc, at) {
                        return true;
                    }
                }
                Job::SaveRestore { slot, old } => {
                    self.caps[slot] = old;
                }
            }
        }
        log::debug!("backtrack: job stack exhausted with no match (entry={})", self.entry);
        false
    }

    fn step(&mut self, mut pc: InstIdx, mut at: InputAt) -> bool {
        loop {
            match &self.prog.insts[pc] {
                Inst::Match => return true,
                Inst::Save(inst) => {
                    if inst.slot < self.caps.len() {
                        let old = self.caps[inst.slot];
                        self.jobs.push(Job::SaveRestore { slot: inst.slot, old });
                        self.caps[inst.slot] = Some(at.pos());
                    }
                    pc = inst.goto;
                }
                Inst::Split(inst) => {
                    self.push(inst.goto2, at);
                    pc = inst.goto1;
                }
                Inst::Jump(goto) => {
                    pc = *goto;
                }
                Inst::EmptyMatch(inst) => {
                    if self.input.is_empty_match(inst.look, at) {
                        pc = inst.goto;
                    } else {
                        return false;
                    }
                }
                Inst::Char(inst) => {
                    if at.byte() == Some(inst.c) {
                        let next = self.input.at(at.next_pos());
                        pc = inst.goto;
                        at = next;
                        if self.has_visited(pc, at) {
                            return false;
                        }
                        continue;
                    }
                    return false;
                }
                Inst::ByteClass(inst) => {
                    if let Some(b) = at.byte() {
                        if inst.matches(b) {
                            let next = self.input.at(at.next_pos());
                            pc = inst.goto;
                            at = next;
                            if self.has_visited(pc, at) {
                                return false;
                            }
                            continue;
                        }
                    }
                    return false;
                }
                Inst::AnyCharNotNl(inst) => {
                    if let Some(b) = at.byte() {
                        if b != b'\n' {
                            let next = self.input.at(at.next_pos());
                            pc = inst.goto;
                            at = next;
                            if self.has_visited(pc, at) {
                                return false;
                            }
                            continue;
                        }
                    }
                    return false;
                }
            }
            if self.has_visited(pc, at) {
                return false;
            }
        }
    }

    fn push(&mut self, pc: InstIdx, at: InputAt) {
        self.jobs.push(Job::Inst { pc, at });
    }

    fn has_visited(&mut self, pc: InstIdx, at: InputAt) -> bool {
        let k = pc * (self.input.len() + 1) + at.pos();
        let k1 = k / BIT_SIZE;
        let k2 = (1 << (k & (BIT_SIZE - 1))) as Bits;
        if self.visited[k1] & k2 == 0 {
            self.visited[k1] |= k2;
            false
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::compile::compile;
    use crate::input::Input;
    use crate::parse::parse;

    fn run(pattern: &str, text: &[u8], anchored: bool) -> Option<Vec<Option<usize>>> {
        let prog = compile(&parse(pattern.as_bytes()).unwrap());
        assert!(prog.backtrack_is_eligible(text.len()));
        let mut caps = vec![None; 2 * prog.num_captures()];
        let input = Input::new(text);
        let entry = if anchored { prog.start } else { prog.find_start };
        if super::exec(&prog, entry, &input, &mut caps, 0) {
            Some(caps)
        } else {
            None
        }
    }

    #[test]
    fn unanchored_search_finds_mid_string_match() {
        let caps = run("cd", b"abcdef", false).unwrap();
        assert_eq!(caps[0], Some(2));
        assert_eq!(caps[1], Some(4));
    }

    #[test]
    fn anchored_entry_rejects_non_prefix_match() {
        assert!(run("cd", b"abcdef", true).is_none());
    }

    #[test]
    fn captures_nested_groups() {
        let caps = run("(a(b)c)", b"abc", true).unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(3)));
        assert_eq!((caps[2], caps[3]), (Some(0), Some(3)));
        assert_eq!((caps[4], caps[5]), (Some(1), Some(2)));
    }

    #[test]
    fn greedy_star_takes_longest_match() {
        let caps = run("a*", b"aaab", true).unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(3)));
    }

    #[test]
    fn non_greedy_star_takes_shortest_match() {
        let caps = run("a*?b", b"aaab", true).unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(4)));
    }

    #[test]
    fn alternation_prefers_leftmost_branch() {
        let caps = run("a|ab", b"ab", true).unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(1)));
    }

    #[test]
    fn bounded_repeat_of_capture_keeps_last_iteration() {
        // "(a){3}" against "aaa": group 1 records only the final unrolled
        // copy's span, not the first or a union of all three.
        let caps = run("(a){3}", b"aaa", true).unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(3)));
        assert_eq!((caps[2], caps[3]), (Some(2), Some(3)));
    }
}
