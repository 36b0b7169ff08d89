//! Pattern compiler and matcher for a small regular-expression dialect.
//!
//! Supports:
//! - Literals: `abc`, escaped metacharacters `\.`, `\(`, `\\`
//! - Wildcard: `.` (any character, newline included)
//! - Shorthand classes: `\d \D \s \S \w \W` (ASCII)
//! - Bracket classes: `[a-z_\d]`
//! - Quantifiers: `+`, `*`, `?`, `{n}`, `{n,}`, `{n,m}`
//! - Alternation: `cat|dog`, at top level or inside a group
//! - Groups: `(ab)+`, one level deep, quantified as a unit
//! - Negation: `^x` matches any single character other than `x`
//!
//! Matching is whole-string; [`Automaton::find`] searches for the leftmost
//! match instead.
//!
//! # Example
//!
//! ```
//! use rexlite_engine::compile;
//!
//! let automaton = compile("(ab){2}|x+").unwrap();
//! assert!(automaton.is_match("abab"));
//! assert!(automaton.is_match("xxx"));
//! assert!(!automaton.is_match("aabb"));
//! assert_eq!(automaton.find("--xx"), Some(2));
//! ```

mod automaton;
mod builder;
mod compiler;
mod config;
mod describe;
mod error;
mod matcher;
mod parse;
mod search;
mod state;
mod symbol;

pub use automaton::{Automaton, BEGIN};
pub use compiler::{compile, find, is_match, Compiler};
pub use config::{
    Config, Limits, Strategy, DEFAULT_MAX_CLASS_LEN, DEFAULT_MAX_GROUP_LEN, DEFAULT_MAX_STATES,
};
pub use error::CompileError;
pub use search::Span;
pub use state::{Repeat, State};
pub use symbol::{Class, Symbol};
