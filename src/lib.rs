// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A byte-oriented regular expression engine.
//!
//! A pattern is parsed into an expression tree, compiled into a flat
//! bytecode program, and executed by one of two interchangeable engines: a
//! bounded backtracking VM (fast on small programs/inputs) or a
//! Thompson-style "Pike VM" (worst-case linear time regardless of input).
//! The program picks between them automatically; callers never see the
//! distinction.
//!
//! This crate works on raw bytes, not `str` or `char` — there is no Unicode
//! awareness anywhere in the pipeline. It also has no back-references, no
//! named captures, and no look-around beyond the anchors and word-boundary
//! assertions it does support (`^ $ \b \B`).
//!
//! ```
//! use bregex::Regex;
//!
//! let re = Regex::new(r"(\w+)@(\w+)\.com").unwrap();
//! assert!(re.is_match(b"contact: jane@example.com"));
//!
//! let caps = re.captures(b"contact: jane@example.com").unwrap();
//! assert_eq!(caps.get(1).unwrap().as_bytes(), b"jane");
//! assert_eq!(caps.get(2).unwrap().as_bytes(), b"example");
//! ```

mod backtrack;
mod compile;
mod error;
mod expr;
mod input;
mod inst;
mod parse;
mod pikevm;
mod program;
mod range;
mod re;

pub use crate::error::{Error, ParseError, ParseErrorKind};
pub use crate::re::{Captures, Match, Regex, RegexBuilder};
