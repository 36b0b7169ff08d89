//! Corpus file parser for pattern test cases.
//!
//! Parses `.txt` corpus files into structured test cases using winnow.
//!
//! # File Format
//!
//! ```text
//! ===
//! alternation
//! ===
//! cat|dog
//! ---
//! match: cat
//! reject: cow
//! find 2: xxcatyy
//! find none: bird
//!
//! ===
//! dangling alternation
//! ===
//! a|
//! ---
//! error: alternation
//! ```
//!
//! The line after the second `===` is the pattern, taken verbatim. Each
//! expectation's input is the rest of its line after `": "`; `match:` on its
//! own stands for the empty input.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use winnow::ascii::{digit1, space0, space1};
use winnow::combinator::{alt, eof, opt, preceded, repeat};
use winnow::error::{ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{rest, take_till, take_while};

// ============ Data Types ============

/// What a test case asserts about its pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// The whole input matches.
    Match(String),
    /// The whole input does not match.
    Reject(String),
    /// Leftmost match starts at this byte offset, or nowhere.
    Find {
        input: String,
        offset: Option<usize>,
    },
    /// The pattern fails to compile, optionally with a message containing
    /// this text.
    CompileError(Option<String>),
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Match(input) => write!(f, "match: {}", input),
            Expectation::Reject(input) => write!(f, "reject: {}", input),
            Expectation::Find {
                input,
                offset: Some(offset),
            } => write!(f, "find {}: {}", offset, input),
            Expectation::Find {
                input,
                offset: None,
            } => write!(f, "find none: {}", input),
            Expectation::CompileError(None) => f.write_str("error"),
            Expectation::CompileError(Some(message)) => write!(f, "error: {}", message),
        }
    }
}

/// A single test case parsed from a corpus file.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub pattern: String,
    pub expectations: Vec<Expectation>,
    pub file_path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

impl TestCase {
    pub fn expects_compile_error(&self) -> bool {
        self.expectations
            .iter()
            .any(|e| matches!(e, Expectation::CompileError(_)))
    }
}

/// All test cases of one file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusFile {
    pub path: PathBuf,
    pub tests: Vec<TestCase>,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("invalid expectation at line {line}: '{text}'")]
    InvalidExpectation { line: usize, text: String },
}

// ============ Public API ============

pub fn parse_file(path: &Path) -> Result<CorpusFile, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_content(&content, path)
}

pub fn parse_content(content: &str, path: &Path) -> Result<CorpusFile, ParseError> {
    let mut input = content;
    let mut tests = Vec::new();

    loop {
        skip_blank_lines
            .parse_next(&mut input)
            .map_err(|e| parse_error(content, input, e))?;
        if input.is_empty() {
            break;
        }

        let start_line = line_of(content, input);
        let raw = test_case
            .parse_next(&mut input)
            .map_err(|e| parse_error(content, input, e))?;
        tests.push(raw.into_test_case(path, start_line)?);
    }

    Ok(CorpusFile {
        path: path.to_path_buf(),
        tests,
    })
}

/// 1-based line number of the start of `rest` within `content`.
fn line_of(content: &str, rest: &str) -> usize {
    content[..content.len() - rest.len()].matches('\n').count() + 1
}

fn parse_error(content: &str, rest: &str, err: ErrMode<winnow::error::ContextError>) -> ParseError {
    let message = match err {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.to_string(),
        ErrMode::Incomplete(_) => "unexpected end of input".to_string(),
    };
    ParseError::Parse {
        line: line_of(content, rest),
        message,
    }
}

// ============ Winnow Parsers ============

fn newline(input: &mut &str) -> ModalResult<()> {
    alt(("\r\n".value(()), "\n".value(()), "\r".value(()))).parse_next(input)
}

fn line_end(input: &mut &str) -> ModalResult<()> {
    alt((newline, eof.value(()))).parse_next(input)
}

fn line_content<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_till(0.., |c| c == '\n' || c == '\r').parse_next(input)
}

fn blank_line(input: &mut &str) -> ModalResult<()> {
    (take_while(0.., [' ', '\t']), newline)
        .map(|_| ())
        .parse_next(input)
}

fn skip_blank_lines(input: &mut &str) -> ModalResult<()> {
    repeat(0.., blank_line)
        .map(|_: Vec<()>| ())
        .parse_next(input)
}

fn header_sep(input: &mut &str) -> ModalResult<()> {
    (take_while(3.., '='), take_while(0.., ' '), line_end)
        .map(|_| ())
        .context(StrContext::Expected(StrContextValue::StringLiteral("===")))
        .parse_next(input)
}

fn dash_sep(input: &mut &str) -> ModalResult<()> {
    (take_while(3.., '-'), take_while(0.., ' '), line_end)
        .map(|_| ())
        .context(StrContext::Expected(StrContextValue::StringLiteral("---")))
        .parse_next(input)
}

fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '=')
}

/// Every line up to the next `===` header or the end of input, blank
/// lines included.
fn expectation_block<'a>(input: &mut &'a str) -> ModalResult<Vec<&'a str>> {
    let mut lines = Vec::new();
    while !input.is_empty() {
        let peek_line = input.lines().next().unwrap_or("");
        if is_header_line(peek_line) {
            break;
        }
        let line = line_content.parse_next(input)?;
        line_end.parse_next(input)?;
        lines.push(line);
    }
    Ok(lines)
}

struct RawCase<'a> {
    name: String,
    pattern: &'a str,
    block: Vec<&'a str>,
}

impl RawCase<'_> {
    fn into_test_case(self, path: &Path, start_line: usize) -> Result<TestCase, ParseError> {
        // header, name, header, pattern and separator come first
        let first_line = start_line + 5;
        let mut end_line = start_line + 4;
        let mut expectations = Vec::new();

        for (index, line) in self.block.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_number = first_line + index;
            let parsed = expectation
                .parse(*line)
                .map_err(|_| ParseError::InvalidExpectation {
                    line: line_number,
                    text: line.to_string(),
                })?;
            expectations.push(parsed);
            end_line = line_number;
        }

        Ok(TestCase {
            name: self.name,
            pattern: self.pattern.to_string(),
            expectations,
            file_path: path.to_path_buf(),
            start_line,
            end_line,
        })
    }
}

fn test_case<'a>(input: &mut &'a str) -> ModalResult<RawCase<'a>> {
    // Opening ===
    header_sep.parse_next(input)?;

    let name = line_content.parse_next(input)?;
    line_end.parse_next(input)?;

    // Closing ===
    header_sep.parse_next(input)?;

    let pattern = line_content.parse_next(input)?;
    line_end.parse_next(input)?;

    dash_sep.parse_next(input)?;

    let block = expectation_block.parse_next(input)?;

    Ok(RawCase {
        name: name.trim().to_string(),
        pattern,
        block,
    })
}

// ============ Expectation Lines ============

fn input_text(input: &mut &str) -> ModalResult<String> {
    preceded(opt(' '), rest)
        .map(|s: &str| s.to_string())
        .parse_next(input)
}

fn find_offset(input: &mut &str) -> ModalResult<Option<usize>> {
    alt((
        "none".value(None),
        digit1.try_map(str::parse::<usize>).map(Some),
    ))
    .parse_next(input)
}

fn find_expectation(input: &mut &str) -> ModalResult<Expectation> {
    ("find", space1).parse_next(input)?;
    let offset = find_offset.parse_next(input)?;
    ':'.parse_next(input)?;
    let text = input_text.parse_next(input)?;
    Ok(Expectation::Find {
        input: text,
        offset,
    })
}

fn error_expectation(input: &mut &str) -> ModalResult<Expectation> {
    "error".parse_next(input)?;
    let message: Option<&str> = opt(preceded((':', space0), rest)).parse_next(input)?;
    let message = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    Ok(Expectation::CompileError(message))
}

fn expectation(input: &mut &str) -> ModalResult<Expectation> {
    alt((
        preceded("match:", input_text).map(Expectation::Match),
        preceded("reject:", input_text).map(Expectation::Reject),
        find_expectation,
        error_expectation,
    ))
    .parse_next(input)
}
