use thiserror::Error;

/// Why a pattern failed to compile. Every variant records the byte offset in
/// the pattern where the problem was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("pattern needs more than {limit} states (at offset {offset})")]
    TooManyStates { offset: usize, limit: usize },
    #[error("character class has more than {limit} members (at offset {offset})")]
    ClassTooLarge { offset: usize, limit: usize },
    #[error("group holds more than {limit} states (at offset {offset})")]
    GroupTooLarge { offset: usize, limit: usize },
    #[error("quantifier has nothing to repeat (at offset {offset})")]
    NothingToRepeat { offset: usize },
    #[error("'^' must be followed by a single atom (at offset {offset})")]
    DanglingNegation { offset: usize },
    #[error("alternation is missing its right-hand branch (at offset {offset})")]
    TrailingAlternation { offset: usize },
    #[error("empty alternation branch (at offset {offset})")]
    EmptyBranch { offset: usize },
    #[error("nested groups are not supported (at offset {offset})")]
    NestedGroup { offset: usize },
    #[error("group opened at offset {offset} is never closed")]
    UnclosedGroup { offset: usize },
    #[error("unmatched ')' at offset {offset}")]
    UnmatchedParen { offset: usize },
    #[error("empty group at offset {offset}")]
    EmptyGroup { offset: usize },
    #[error("empty character class at offset {offset}")]
    EmptyClass { offset: usize },
    #[error("invalid range '{start}-{end}' (at offset {offset})")]
    InvalidRange {
        offset: usize,
        start: char,
        end: char,
    },
    #[error("malformed repetition (at offset {offset})")]
    MalformedRepetition { offset: usize },
    #[error("repetition {{{min},{max}}} has its maximum below its minimum (at offset {offset})")]
    InvalidRepetition { offset: usize, min: u32, max: u32 },
}

impl CompileError {
    pub fn offset(&self) -> usize {
        match *self {
            CompileError::TooManyStates { offset, .. }
            | CompileError::ClassTooLarge { offset, .. }
            | CompileError::GroupTooLarge { offset, .. }
            | CompileError::NothingToRepeat { offset }
            | CompileError::DanglingNegation { offset }
            | CompileError::TrailingAlternation { offset }
            | CompileError::EmptyBranch { offset }
            | CompileError::NestedGroup { offset }
            | CompileError::UnclosedGroup { offset }
            | CompileError::UnmatchedParen { offset }
            | CompileError::EmptyGroup { offset }
            | CompileError::EmptyClass { offset }
            | CompileError::InvalidRange { offset, .. }
            | CompileError::MalformedRepetition { offset }
            | CompileError::InvalidRepetition { offset, .. } => offset,
        }
    }
}
