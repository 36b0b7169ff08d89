//! Single-pass pattern parser.
//!
//! The parser walks the pattern once, left to right, pushing one [`State`]
//! per atom into a [`Builder`]. Open contexts live on a small stack of
//! frames: the top level, plus at most one open group. Each frame owns the
//! alternation branches it has already closed and the sequence it is still
//! extending.

use crate::builder::{Builder, Fragment, Mark};
use crate::config::Limits;
use crate::error::CompileError;
use crate::state::{Repeat, State};
use crate::symbol::{Class, Symbol};
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::prelude::*;
use winnow::token::{any, none_of};

/// Top level plus one group.
const MAX_DEPTH: usize = 2;

#[derive(Debug)]
struct Frame {
    open_offset: usize,
    mark: Mark,
    branches: Vec<Fragment>,
    sequence: Fragment,
    /// Atoms and groups appended to the current branch.
    items: usize,
    /// Position a following quantifier applies to.
    last_atom: Option<usize>,
}

impl Frame {
    fn new(open_offset: usize, mark: Mark) -> Self {
        Self {
            open_offset,
            mark,
            branches: Vec::new(),
            sequence: Fragment::empty(),
            items: 0,
            last_atom: None,
        }
    }

    fn finish(mut self) -> Fragment {
        self.branches.push(self.sequence);
        Builder::alternate(self.branches)
    }
}

// ============ Token Parsers ============

fn count(input: &mut &str) -> ModalResult<u32> {
    digit1.try_map(str::parse::<u32>).parse_next(input)
}

/// `{n}`, `{n,}` or `{n,m}`, whitespace allowed around every part.
fn braces(input: &mut &str) -> ModalResult<Repeat> {
    let (min, tail) = delimited(
        ('{', multispace0),
        (
            count,
            opt(preceded((multispace0, ',', multispace0), opt(count))),
        ),
        (multispace0, '}'),
    )
    .parse_next(input)?;

    Ok(match tail {
        None => Repeat::exactly(min),
        Some(None) => Repeat::at_least(min),
        Some(Some(max)) => Repeat::between(min, max),
    })
}

fn quantifier(input: &mut &str) -> ModalResult<Repeat> {
    alt((
        '+'.value(Repeat::at_least(1)),
        '*'.value(Repeat::at_least(0)),
        '?'.value(Repeat::between(0, 1)),
        braces,
    ))
    .parse_next(input)
}

/// A backslash and the character it escapes. A backslash at the very end
/// of the input escapes nothing and yields `None`.
fn escape(input: &mut &str) -> ModalResult<Option<Symbol>> {
    preceded('\\', opt(any.map(Symbol::escaped))).parse_next(input)
}

fn range(input: &mut &str) -> ModalResult<Symbol> {
    (none_of(['\\', ']']), '-', none_of(['\\', ']']))
        .map(|(lo, _, hi)| Symbol::Range(lo, hi))
        .parse_next(input)
}

/// One member of a bracket class. Everything but `\` is taken literally.
fn class_member(input: &mut &str) -> ModalResult<Option<Symbol>> {
    alt((
        range.map(Some),
        escape,
        any.map(|c| Some(Symbol::Literal(c))),
    ))
    .parse_next(input)
}

fn is_quantifier_start(c: char) -> bool {
    matches!(c, '+' | '*' | '?' | '{')
}

// ============ Pattern Parser ============

pub(crate) struct PatternParser<'p> {
    pattern: &'p str,
    input: &'p str,
    limits: Limits,
    builder: Builder,
    frames: Vec<Frame>,
}

impl<'p> PatternParser<'p> {
    pub fn new(pattern: &'p str, limits: Limits) -> Self {
        let builder = Builder::new(limits);
        let root = Frame::new(0, builder.mark());
        Self {
            pattern,
            input: pattern,
            limits,
            builder,
            frames: vec![root],
        }
    }

    /// Runs the parser to completion, returning the filled builder and the
    /// fragment describing the whole pattern.
    pub fn parse(mut self) -> Result<(Builder, Fragment), CompileError> {
        while let Some(c) = self.peek() {
            let offset = self.offset();
            match c {
                '(' => {
                    self.bump();
                    self.open_group(offset)?;
                }
                ')' => {
                    self.bump();
                    self.close_group(offset)?;
                }
                '|' => {
                    self.bump();
                    self.alternation(offset)?;
                }
                '^' => {
                    self.bump();
                    self.negation(offset)?;
                }
                c if is_quantifier_start(c) => self.quantify(offset)?,
                _ => {
                    if let Some(class) = self.atom(offset)? {
                        self.push_atom(class, false, offset)?;
                    }
                }
            }
        }

        if self.frames.len() > 1 {
            let open = self.frames[self.frames.len() - 1].open_offset;
            return Err(CompileError::UnclosedGroup { offset: open });
        }
        let root = self.frames.pop().map(Frame::finish).unwrap_or_default();
        Ok((self.builder, root))
    }

    fn offset(&self) -> usize {
        self.pattern.len() - self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.input = &self.input[c.len_utf8()..];
        Some(c)
    }

    /// Reads one atom: a literal, `.`, an escape or a bracket class.
    /// A dangling trailing backslash yields `None`.
    fn atom(&mut self, offset: usize) -> Result<Option<Class>, CompileError> {
        match self.peek() {
            None => Ok(None),
            Some('\\') => Ok(escape
                .parse_next(&mut self.input)
                .ok()
                .flatten()
                .map(Class::single)),
            Some('[') => {
                self.bump();
                self.bracket(offset).map(Some)
            }
            Some('.') => {
                self.bump();
                Ok(Some(Class::single(Symbol::Wildcard)))
            }
            Some(c) => {
                self.bump();
                Ok(Some(Class::single(Symbol::Literal(c))))
            }
        }
    }

    /// Accumulates members after `[` until `]` or the end of the pattern.
    fn bracket(&mut self, open: usize) -> Result<Class, CompileError> {
        let mut class = Class::new();
        while !self.input.is_empty() {
            if self.input.starts_with(']') {
                self.bump();
                break;
            }
            let offset = self.offset();
            let Ok(member) = class_member.parse_next(&mut self.input) else {
                break;
            };
            let Some(symbol) = member else {
                continue;
            };
            if let Symbol::Range(start, end) = symbol {
                if end < start {
                    return Err(CompileError::InvalidRange { offset, start, end });
                }
            }
            if class.len() >= self.limits.max_class_len {
                return Err(CompileError::ClassTooLarge {
                    offset,
                    limit: self.limits.max_class_len,
                });
            }
            class.push(symbol);
        }

        if class.is_empty() {
            return Err(CompileError::EmptyClass { offset: open });
        }
        Ok(class)
    }

    fn push_atom(&mut self, class: Class, negated: bool, offset: usize) -> Result<(), CompileError> {
        let position = self
            .builder
            .push_state(State::new(class).negated(negated), offset)?;

        let depth = self.frames.len();
        let frame = &mut self.frames[depth - 1];
        if depth > 1 && position + 1 - frame.mark.first_position > self.limits.max_group_len {
            return Err(CompileError::GroupTooLarge {
                offset,
                limit: self.limits.max_group_len,
            });
        }

        let sequence = std::mem::take(&mut frame.sequence);
        frame.sequence = self.builder.concat(sequence, Fragment::atom(position));
        frame.items += 1;
        frame.last_atom = Some(position);
        Ok(())
    }

    fn repetition(&mut self, offset: usize) -> Result<Repeat, CompileError> {
        let repeat = quantifier
            .parse_next(&mut self.input)
            .map_err(|_| CompileError::MalformedRepetition { offset })?;
        if let Some(max) = repeat.max {
            if max < repeat.min {
                return Err(CompileError::InvalidRepetition {
                    offset,
                    min: repeat.min,
                    max,
                });
            }
        }
        Ok(repeat)
    }

    fn quantify(&mut self, offset: usize) -> Result<(), CompileError> {
        let depth = self.frames.len();
        let Some(position) = self.frames[depth - 1].last_atom.take() else {
            return Err(CompileError::NothingToRepeat { offset });
        };
        let repeat = self.repetition(offset)?;
        self.builder.set_repeat(position, repeat);
        Ok(())
    }

    /// `^` has been consumed; the next atom is pushed negated.
    fn negation(&mut self, offset: usize) -> Result<(), CompileError> {
        match self.peek() {
            None | Some('|' | '(' | ')' | '^') => {
                return Err(CompileError::DanglingNegation { offset })
            }
            Some(c) if is_quantifier_start(c) => {
                return Err(CompileError::DanglingNegation { offset })
            }
            Some(_) => {}
        }

        let atom_offset = self.offset();
        match self.atom(atom_offset)? {
            Some(class) => self.push_atom(class, true, atom_offset),
            None => Err(CompileError::DanglingNegation { offset }),
        }
    }

    fn alternation(&mut self, offset: usize) -> Result<(), CompileError> {
        let depth = self.frames.len();
        let frame = &mut self.frames[depth - 1];
        if frame.items == 0 {
            return Err(CompileError::EmptyBranch { offset });
        }
        if matches!(self.input.chars().next(), None | Some(')')) {
            return Err(CompileError::TrailingAlternation { offset });
        }

        let sequence = std::mem::take(&mut frame.sequence);
        frame.branches.push(sequence);
        frame.items = 0;
        frame.last_atom = None;
        Ok(())
    }

    fn open_group(&mut self, offset: usize) -> Result<(), CompileError> {
        if self.frames.len() >= MAX_DEPTH {
            return Err(CompileError::NestedGroup { offset });
        }
        let mark = self.builder.mark();
        self.frames.push(Frame::new(offset, mark));
        Ok(())
    }

    /// `)` has been consumed. Folds the group into its parent, unrolling it
    /// when a quantifier follows.
    fn close_group(&mut self, offset: usize) -> Result<(), CompileError> {
        let group = match self.frames.len() {
            0 | 1 => None,
            _ => self.frames.pop(),
        }
        .ok_or(CompileError::UnmatchedParen { offset })?;

        if group.items == 0 {
            return Err(CompileError::EmptyGroup {
                offset: group.open_offset,
            });
        }

        let mark = group.mark;
        let body = group.finish();
        let repeat = match self.peek() {
            Some(c) if is_quantifier_start(c) => {
                let at = self.offset();
                self.repetition(at)?
            }
            _ => Repeat::ONCE,
        };
        let fragment = self.builder.repeat_group(body, mark, repeat, offset)?;

        let depth = self.frames.len();
        let parent = &mut self.frames[depth - 1];
        let sequence = std::mem::take(&mut parent.sequence);
        parent.sequence = self.builder.concat(sequence, fragment);
        parent.items += 1;
        parent.last_atom = None;
        Ok(())
    }
}
