pub mod cli;
pub mod discover;
pub mod error;
pub mod output;
pub mod runner;

pub use rexlite_corpus::{
    parse_content, parse_file, CorpusFile, Expectation, ParseError, TestCase,
};
