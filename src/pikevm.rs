// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// A Thompson-style NFA simulation ("Pike VM"): every reachable instruction
// is tracked as a thread, advanced one input byte at a time in lockstep, so
// the whole search runs in O(len(program) * len(input)) regardless of how
// the regex is shaped. Unlike the bounded backtracker, this engine has no
// input-size ceiling, at the cost of carrying a full capture-slot array
// per thread instead of one shared array.

use crate::input::{Input, InputAt};
use crate::inst::{Inst, InstIdx};
use crate::program::Program;

/// Run the Pike VM starting the search at byte offset `start`, entering
/// the program at `entry`. Populates `caps` and returns whether a match
/// was found.
pub fn exec(
    prog: &Program,
    entry: InstIdx,
    input: &Input,
    caps: &mut [Option<usize>],
    start: usize,
) -> bool {
    let ncaps = caps.len();
    let mut clist = Threads::new(prog.insts.len(), ncaps);
    let mut nlist = Threads::new(prog.insts.len(), ncaps);
    let mut matched = false;
    let mut at = input.at(start);

    // Seed the initial thread set once. When `entry` is `find_start`, the
    // compiled `Split`/`AnyCharNotNl` loop re-derives a fresh attempt at
    // every later position on its own as threads advance — no manual
    // reseeding needed here.
    {
        let mut scratch = vec![None; ncaps];
        add(prog, input, &mut clist, &mut scratch, entry, at);
    }

    loop {
        if clist.size == 0 {
            break;
        }
        let at_next = input.at(at.next_pos());
        let mut i = 0;
        while i < clist.size {
            let pc = clist.dense[i].pc;
            if step(prog, input, &mut nlist, &clist.dense[i].caps, pc, at, at_next, caps) {
                matched = true;
                if ncaps == 0 {
                    return true;
                }
                break;
            }
            i += 1;
        }
        if at.is_end() {
            break;
        }
        at = at_next;
        std::mem::swap(&mut clist, &mut nlist);
        nlist.clear();
    }
    matched
}

fn step(
    prog: &Program,
    input: &Input,
    nlist: &mut Threads,
    thread_caps: &[Option<usize>],
    pc: InstIdx,
    at: InputAt,
    at_next: InputAt,
    out_caps: &mut [Option<usize>],
) -> bool {
    match &prog.insts[pc] {
        Inst::Match => {
            for (slot, val) in out_caps.iter_mut().zip(thread_caps.iter()) {
                *slot = *val;
            }
            true
        }
        Inst::Char(inst) => {
            if at.byte() == Some(inst.c) {
                let mut caps = thread_caps.to_vec();
                add(prog, input, nlist, &mut caps, inst.goto, at_next);
            }
            false
        }
        Inst::ByteClass(inst) => {
            if let Some(b) = at.byte() {
                if inst.matches(b) {
                    let mut caps = thread_caps.to_vec();
                    add(prog, input, nlist, &mut caps, inst.goto, at_next);
                }
            }
            false
        }
        Inst::AnyCharNotNl(inst) => {
            if let Some(b) = at.byte() {
                if b != b'\n' {
                    let mut caps = thread_caps.to_vec();
                    add(prog, input, nlist, &mut caps, inst.goto, at_next);
                }
            }
            false
        }
        Inst::EmptyMatch(_) | Inst::Save(_) | Inst::Split(_) | Inst::Jump(_) => false,
    }
}

/// The epsilon-closure: follow every zero-width edge reachable from `pc`
/// (splits, saves, jumps, assertions) and add the resulting consuming (or
/// terminal) instructions to `nlist`, each carrying its own copy of
/// `thread_caps` as it was at the moment that path was taken.
fn add(
    prog: &Program,
    input: &Input,
    nlist: &mut Threads,
    thread_caps: &mut [Option<usize>],
    pc: InstIdx,
    at: InputAt,
) {
    if nlist.contains(pc) {
        return;
    }
    let ti = nlist.add(pc);
    match &prog.insts[pc] {
        Inst::EmptyMatch(inst) => {
            if input.is_empty_match(inst.look, at) {
                add(prog, input, nlist, thread_caps, inst.goto, at);
            }
        }
        Inst::Save(inst) => {
            if inst.slot >= thread_caps.len() {
                add(prog, input, nlist, thread_caps, inst.goto, at);
            } else {
                let old = thread_caps[inst.slot];
                thread_caps[inst.slot] = Some(at.pos());
                add(prog, input, nlist, thread_caps, inst.goto, at);
                thread_caps[inst.slot] = old;
            }
        }
        Inst::Split(inst) => {
            add(prog, input, nlist, thread_caps, inst.goto1, at);
            add(prog, input, nlist, thread_caps, inst.goto2, at);
        }
        Inst::Jump(goto) => {
            add(prog, input, nlist, thread_caps, *goto, at);
        }
        Inst::Match | Inst::Char(_) | Inst::ByteClass(_) | Inst::AnyCharNotNl(_) => {
            nlist.dense[ti].caps.copy_from_slice(thread_caps);
        }
    }
}

/// A sparse set of active threads: `sparse[pc]` gives the index into
/// `dense` for instruction `pc` if it's currently present, letting
/// `contains`/`add` run in O(1) without clearing the whole array between
/// steps (spec.md §4.6).
struct Threads {
    dense: Vec<Thread>,
    sparse: Vec<usize>,
    size: usize,
}

struct Thread {
    pc: InstIdx,
    caps: Vec<Option<usize>>,
}

impl Threads {
    fn new(num_insts: usize, ncaps: usize) -> Threads {
        Threads {
            dense: (0..num_insts).map(|_| Thread { pc: 0, caps: vec![None; ncaps] }).collect(),
            sparse: vec![0; num_insts],
            size: 0,
        }
    }

    fn add(&mut self, pc: InstIdx) -> usize {
        let i = self.size;
        self.dense[i].pc = pc;
        self.sparse[pc] = i;
        self.size += 1;
        i
    }

    fn contains(&self, pc: InstIdx) -> bool {
        let s = self.sparse[pc];
        s < self.size && self.dense[s].pc == pc
    }

    fn clear(&mut self) {
        self.size = 0;
    }
}

#[cfg(test)]
mod tests {
    use crate::compile::compile;
    use crate::input::Input;
    use crate::parse::parse;

    fn run(pattern: &str, text: &[u8], anchored: bool) -> Option<Vec<Option<usize>>> {
        let prog = compile(&parse(pattern.as_bytes()).unwrap());
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
    fn captures_nested_groups() {
        let caps = run("(a(b)c)", b"abc", true).unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(3)));
        assert_eq!((caps[2], caps[3]), (Some(0), Some(3)));
        assert_eq!((caps[4], caps[5]), (Some(1), Some(2)));
    }

    #[test]
    fn greedy_star_matches_longest() {
        let caps = run("a*", b"aaab", true).unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(3)));
    }

    #[test]
    fn large_input_beyond_backtrack_budget() {
        let haystack = vec![b'a'; 10_000];
        let prog = compile(&parse(b"a+b").unwrap());
        assert!(!prog.backtrack_is_eligible(haystack.len()));
        let mut caps = vec![None; 2];
        let input = Input::new(&haystack);
        assert!(!super::exec(&prog, prog.find_start, &input, &mut caps, 0));
    }

    #[test]
    fn cross_engine_agreement_on_captures() {
        let pattern = "(a|ab)(c|bcd)(d*)";
        let text = b"abcd";
        let prog = compile(&parse(pattern.as_bytes()).unwrap());
        let input = Input::new(text);
        let mut pike_caps = vec![None; 2 * prog.num_captures()];
        super::exec(&prog, prog.find_start, &input, &mut pike_caps, 0);
        let mut back_caps = vec![None; 2 * prog.num_captures()];
        crate::backtrack::exec(&prog, prog.find_start, &input, &mut back_caps, 0);
        assert_eq!(pike_caps, back_caps);
    }
}
