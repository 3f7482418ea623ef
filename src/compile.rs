// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compiles an [`Expr`] tree into a linear [`Program`] using a
//! hole-and-patch scheme: fragments are emitted with their forward edges
//! left as placeholders (a [`Hole`]), and [`Compiler::fill`] rewrites those
//! placeholders once the target instruction is known.

use crate::expr::{Assertion, Expr};
use crate::inst::{
    Inst, InstAnyCharNotNl, InstByteClass, InstChar, InstEmptyMatch, InstIdx, InstSave, InstSplit,
};
use crate::program::Program;

/// Sentinel goto value for an instruction not yet patched. Any `Hole` left
/// unfilled by the time compilation finishes is a bug in this module, and
/// leaving the placeholder as an obviously out-of-range index turns that
/// bug into an immediate panic on execution rather than a silent wrong
/// answer.
const PLACEHOLDER: InstIdx = InstIdx::MAX;

/// An unresolved outgoing edge (or set of edges) in the program under
/// construction.
enum Hole {
    /// No outgoing edge to patch.
    None,
    /// Patch instruction `idx`'s single forward edge (`goto`, or `goto1`
    /// for a `Split`).
    Primary(InstIdx),
    /// Patch `Split` instruction `idx`'s secondary edge (`goto2`).
    Secondary(InstIdx),
    /// Patch every hole in this list to the same target.
    Many(Vec<Hole>),
}

/// The entry point of a compiled fragment, plus its one remaining [`Hole`].
struct Patch {
    entry: InstIdx,
    hole: Hole,
}

struct Compiler {
    insts: Vec<Inst>,
    next_slot: usize,
    /// A bounded repeat such as `{3}` compiles its operand by calling `c`
    /// on the same `Expr::Capture` node several times (once per unrolled
    /// copy); all of those copies are the *same* syntactic capture group
    /// and must share one slot pair (the last iteration wins, same as any
    /// other regex engine), not get a fresh pair each time. Keyed by the
    /// `Group`'s address, stable across repeated visits since `c` always
    /// re-borrows the same underlying `Box<Expr>` rather than cloning it.
    group_slots: std::collections::HashMap<*const crate::expr::Group, usize>,
}

impl Compiler {
    fn new() -> Compiler {
        // Slots 0 and 1 are reserved for the implicit whole-match capture
        // that `compile` wraps around the entire expression.
        Compiler { insts: Vec::new(), next_slot: 2, group_slots: std::collections::HashMap::new() }
    }

    fn push(&mut self, inst: Inst) -> InstIdx {
        self.insts.push(inst);
        self.insts.len() - 1
    }

    fn fill(&mut self, hole: Hole, target: InstIdx) {
        match hole {
            Hole::None => {}
            Hole::Primary(idx) => self.patch_primary(idx, target),
            Hole::Secondary(idx) => self.patch_secondary(idx, target),
            Hole::Many(holes) => {
                for h in holes {
                    self.fill(h, target);
                }
            }
        }
    }

    fn fill_to_next(&mut self, hole: Hole) {
        let target = self.insts.len();
        self.fill(hole, target);
    }

    fn patch_primary(&mut self, idx: InstIdx, target: InstIdx) {
        match &mut self.insts[idx] {
            Inst::Char(i) => i.goto = target,
            Inst::EmptyMatch(i) => i.goto = target,
            Inst::ByteClass(i) => i.goto = target,
            Inst::AnyCharNotNl(i) => i.goto = target,
            Inst::Save(i) => i.goto = target,
            Inst::Split(i) => i.goto1 = target,
            Inst::Jump(_) | Inst::Match => {
                panic!("instruction has no patchable primary edge")
            }
        }
    }

    fn patch_secondary(&mut self, idx: InstIdx, target: InstIdx) {
        match &mut self.insts[idx] {
            Inst::Split(i) => i.goto2 = target,
            _ => panic!("only Split has a secondary edge"),
        }
    }

    fn emit_split(&mut self) -> InstIdx {
        self.push(Inst::Split(InstSplit { goto1: PLACEHOLDER, goto2: PLACEHOLDER }))
    }

    fn emit_save(&mut self, slot: usize) -> InstIdx {
        self.push(Inst::Save(InstSave { goto: PLACEHOLDER, slot }))
    }

    /// Chain a non-empty sequence of already-compiled fragments end to end:
    /// fragment `i`'s hole is filled to fragment `i+1`'s entry. Returns the
    /// first fragment's entry and the last fragment's hole.
    fn chain(&mut self, mut patches: Vec<Patch>) -> Patch {
        let entry = patches[0].entry;
        let mut prev = patches.remove(0);
        for next in patches {
            let next_entry = next.entry;
            self.fill(prev.hole, next_entry);
            prev = next;
        }
        Patch { entry, hole: prev.hole }
    }

    /// Compile `expr`, returning the entry point of the emitted fragment
    /// and its one remaining hole.
    fn c(&mut self, expr: &Expr) -> Patch {
        match expr {
            Expr::EmptyMatch(a) => {
                let idx = self.push(Inst::EmptyMatch(InstEmptyMatch { goto: PLACEHOLDER, look: *a }));
                Patch { entry: idx, hole: Hole::Primary(idx) }
            }
            Expr::Literal(b) => {
                let idx = self.push(Inst::Char(InstChar { goto: PLACEHOLDER, c: *b }));
                Patch { entry: idx, hole: Hole::Primary(idx) }
            }
            Expr::AnyCharNotNl => {
                let idx = self.push(Inst::AnyCharNotNl(InstAnyCharNotNl { goto: PLACEHOLDER }));
                Patch { entry: idx, hole: Hole::Primary(idx) }
            }
            Expr::ByteClass(set) => {
                let idx = self.push(Inst::ByteClass(InstByteClass {
                    goto: PLACEHOLDER,
                    ranges: set.clone(),
                }));
                Patch { entry: idx, hole: Hole::Primary(idx) }
            }
            Expr::Capture(group) => self.compile_capture(group),
            Expr::Concat(exprs) => {
                let patches = exprs.iter().map(|e| self.c(e)).collect();
                self.chain(patches)
            }
            Expr::Alternate(alts) => self.compile_alternate(alts),
            Expr::Repeat { subexpr, min, max, greedy } => {
                self.compile_repeat(subexpr, *min, *max, *greedy)
            }
            Expr::PseudoLeftParen(_) => {
                unreachable!("PseudoLeftParen never survives parsing")
            }
        }
    }

    fn compile_capture(&mut self, group: &crate::expr::Group) -> Patch {
        if !group.capturing {
            return self.c(&group.expr);
        }
        let key = group as *const crate::expr::Group;
        let slot = match self.group_slots.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.next_slot;
                self.next_slot += 2;
                self.group_slots.insert(key, slot);
                slot
            }
        };
        let open = self.emit_save(slot);
        let body = self.c(&group.expr);
        self.fill(Hole::Primary(open), body.entry);
        let close = self.emit_save(slot + 1);
        self.fill(body.hole, close);
        Patch { entry: open, hole: Hole::Primary(close) }
    }

    /// Serialize `alts` as a chain of `Split`s: trying alternative `i`
    /// before falling through to alternative `i+1`.
    fn compile_alternate(&mut self, alts: &[Expr]) -> Patch {
        debug_assert!(alts.len() >= 2);
        let mut exit_holes = Vec::with_capacity(alts.len());
        let mut entry = None;
        for e in &alts[..alts.len() - 1] {
            let split = self.emit_split();
            if entry.is_none() {
                entry = Some(split);
            }
            let next_entry = self.insts.len();
            self.patch_primary(split, next_entry);
            let patch = self.c(e);
            exit_holes.push(patch.hole);
            let after = self.insts.len();
            self.patch_secondary(split, after);
        }
        let last = self.c(&alts[alts.len() - 1]);
        exit_holes.push(last.hole);
        Patch { entry: entry.unwrap(), hole: Hole::Many(exit_holes) }
    }

    fn compile_repeat(&mut self, subexpr: &Expr, min: usize, max: Option<usize>, greedy: bool) -> Patch {
        match (min, max) {
            (0, None) => self.compile_star(subexpr, greedy),
            (1, None) => self.compile_plus(subexpr, greedy),
            (0, Some(1)) => self.compile_question(subexpr, greedy),
            (m, None) => {
                let mut patches: Vec<Patch> = (0..m).map(|_| self.c(subexpr)).collect();
                patches.push(self.compile_star(subexpr, greedy));
                self.chain(patches)
            }
            (m, Some(n)) => {
                let lead = if m >= 1 { m } else { 0 };
                let mut patches: Vec<Patch> = (0..lead).map(|_| self.c(subexpr)).collect();
                let optional = n - lead;
                for _ in 0..optional {
                    patches.push(self.compile_question(subexpr, greedy));
                }
                if patches.is_empty() {
                    // {0,0}: the subexpression never participates.
                    self.c(&Expr::EmptyMatch(Assertion::None))
                } else {
                    self.chain(patches)
                }
            }
        }
    }

    /// `*`: zero or more, looping back through a `Split`.
    fn compile_star(&mut self, subexpr: &Expr, greedy: bool) -> Patch {
        let split = self.emit_split();
        let body_entry = self.insts.len();
        let body = self.c(subexpr);
        let jump = self.push(Inst::Jump(split));
        self.fill(body.hole, jump);
        if greedy {
            self.patch_primary(split, body_entry);
            Patch { entry: split, hole: Hole::Secondary(split) }
        } else {
            self.patch_secondary(split, body_entry);
            Patch { entry: split, hole: Hole::Primary(split) }
        }
    }

    /// `+`: one or more — compile the body once unconditionally, then loop
    /// back through a trailing `Split`.
    fn compile_plus(&mut self, subexpr: &Expr, greedy: bool) -> Patch {
        let body = self.c(subexpr);
        let split = self.emit_split();
        self.fill(body.hole, split);
        if greedy {
            self.patch_primary(split, body.entry);
            Patch { entry: body.entry, hole: Hole::Secondary(split) }
        } else {
            self.patch_secondary(split, body.entry);
            Patch { entry: body.entry, hole: Hole::Primary(split) }
        }
    }

    /// `?`: zero or one.
    fn compile_question(&mut self, subexpr: &Expr, greedy: bool) -> Patch {
        let split = self.emit_split();
        let body_entry = self.insts.len();
        if greedy {
            self.patch_primary(split, body_entry);
        } else {
            self.patch_secondary(split, body_entry);
        }
        let body = self.c(subexpr);
        let skip_hole = if greedy { Hole::Secondary(split) } else { Hole::Primary(split) };
        Patch { entry: split, hole: Hole::Many(vec![skip_hole, body.hole]) }
    }
}

/// Compile `expr` into a [`Program`].
///
/// The whole expression is wrapped in an implicit capture group using
/// slots `(0, 1)` (the "whole match" group), followed by the two-
/// instruction unanchored-search prologue described in spec.md §4.3:
/// a `Split`/`AnyCharNotNl` loop that non-deterministically advances the
/// cursor before falling into the anchored program.
pub fn compile(expr: &Expr) -> Program {
    let mut c = Compiler::new();
    let save0 = c.emit_save(0);
    let body = c.c(expr);
    c.fill(Hole::Primary(save0), body.entry);
    let save1 = c.emit_save(1);
    c.fill(body.hole, save1);
    let match_idx = c.push(Inst::Match);
    c.fill(Hole::Primary(save1), match_idx);

    let find_start = c.emit_split();
    let any_idx = c.push(Inst::AnyCharNotNl(InstAnyCharNotNl { goto: find_start }));
    c.patch_primary(find_start, save0);
    c.patch_secondary(find_start, any_idx);

    Program::new(c.insts, save0, find_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn prog(pattern: &str) -> Program {
        compile(&parse(pattern.as_bytes()).unwrap())
    }

    fn all_gotos_in_bounds(p: &Program) -> bool {
        let n = p.insts.len();
        p.insts.iter().all(|inst| match inst {
            Inst::Char(i) => i.goto < n,
            Inst::EmptyMatch(i) => i.goto < n,
            Inst::ByteClass(i) => i.goto < n,
            Inst::AnyCharNotNl(i) => i.goto < n,
            Inst::Save(i) => i.goto < n,
            Inst::Jump(goto) => *goto < n,
            Inst::Split(i) => i.goto1 < n && i.goto2 < n,
            Inst::Match => true,
        })
    }

    #[test]
    fn every_edge_is_in_bounds() {
        for pat in ["a", "a*", "a+?", "a|b|c", "(ab)+", "a{2,5}", "a{3}", "[a-z]*\\d+"] {
            let p = prog(pat);
            assert!(all_gotos_in_bounds(&p), "pattern {:?} left an edge unpatched", pat);
        }
    }

    #[test]
    fn exactly_one_match_instruction() {
        let p = prog("a(b|c)*d");
        let matches = p.insts.iter().filter(|i| matches!(i, Inst::Match)).count();
        assert_eq!(matches, 1);
    }

    #[test]
    fn program_starts_with_save_zero() {
        let p = prog("abc");
        match &p.insts[p.start] {
            Inst::Save(s) => assert_eq!(s.slot, 0),
            other => panic!("expected Save(0), got {:?}", other),
        }
    }

    #[test]
    fn capture_slots_allocated_left_to_right() {
        let p = prog("(a)(b)");
        let slots: Vec<usize> = p
            .insts
            .iter()
            .filter_map(|i| match i {
                Inst::Save(s) => Some(s.slot),
                _ => None,
            })
            .collect();
        // 0,1 for the whole match, then 2,3 and 4,5 for the two groups, in
        // left-to-right program order (not necessarily array order, since
        // the open/close pairs are interleaved with the body).
        assert!(slots.contains(&2));
        assert!(slots.contains(&3));
        assert!(slots.contains(&4));
        assert!(slots.contains(&5));
    }

    #[test]
    fn non_capturing_group_emits_no_extra_saves() {
        let p = prog("(?:ab)");
        let save_count = p.insts.iter().filter(|i| matches!(i, Inst::Save(_))).count();
        assert_eq!(save_count, 2); // just the whole-match wrap
    }

    #[test]
    fn bounded_repeat_of_capture_shares_one_slot_pair() {
        // A repeated capturing group is still one syntactic group: `(a){3}`
        // unrolls to three copies of the body but they must all write the
        // same slot pair, not a fresh pair per unrolled copy.
        let p = prog("(a){3}");
        let slots: std::collections::HashSet<usize> = p
            .insts
            .iter()
            .filter_map(|i| match i {
                Inst::Save(s) => Some(s.slot),
                _ => None,
            })
            .collect();
        assert_eq!(slots, std::collections::HashSet::from([0, 1, 2, 3]));
    }
}
