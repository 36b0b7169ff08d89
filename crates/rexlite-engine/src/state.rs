//! Automaton positions and their repetition bounds.

use crate::symbol::Class;
use std::fmt;

/// How many consecutive characters a state consumes. `max == None` means
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Repeat {
    pub min: u32,
    pub max: Option<u32>,
}

impl Repeat {
    pub const ONCE: Repeat = Repeat {
        min: 1,
        max: Some(1),
    };

    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub const fn exactly(n: u32) -> Self {
        Self::new(n, Some(n))
    }

    pub const fn at_least(n: u32) -> Self {
        Self::new(n, None)
    }

    pub const fn between(min: u32, max: u32) -> Self {
        Self::new(min, Some(max))
    }

    /// `true` when a repetition count of `count` still leaves room for one
    /// more.
    pub fn can_repeat(&self, count: u32) -> bool {
        self.max.map_or(true, |max| count < max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Self::ONCE
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{{{}}}", self.min),
            Some(max) => write!(f, "{{{},{}}}", self.min, max),
            None => write!(f, "{{{},}}", self.min),
        }
    }
}

/// One live position of an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    class: Class,
    repeat: Repeat,
    negated: bool,
}

impl State {
    pub fn new(class: Class) -> Self {
        Self {
            class,
            repeat: Repeat::ONCE,
            negated: false,
        }
    }

    pub fn negated(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub(crate) fn set_repeat(&mut self, repeat: Repeat) {
        self.repeat = repeat;
    }

    /// Class membership with the polarity applied.
    pub fn matches(&self, c: char) -> bool {
        self.class.matches(c) != self.negated
    }

    /// Length of the run of characters this state would consume greedily
    /// from `chars[offset..]`, or `None` when fewer than `min` match.
    pub(crate) fn greedy_run(&self, chars: &[char], offset: usize) -> Option<usize> {
        let mut count: u32 = 0;
        let mut run = 0;
        while self.repeat.can_repeat(count) {
            match chars.get(offset + run) {
                Some(&c) if self.matches(c) => {
                    count += 1;
                    run += 1;
                }
                _ => break,
            }
        }
        (count >= self.repeat.min).then_some(run)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("^")?;
        }
        write!(f, "{}", self.class)?;
        if self.repeat != Repeat::ONCE {
            write!(f, "{}", self.repeat)?;
        }
        Ok(())
    }
}
