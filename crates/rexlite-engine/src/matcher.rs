//! Walking a compiled [`Automaton`] over input characters.

use crate::automaton::{Automaton, BEGIN};
use crate::config::Strategy;

/// One bit per `(position, offset)` configuration.
struct Visited {
    width: usize,
    words: Vec<u64>,
}

impl Visited {
    fn new(positions: usize, width: usize) -> Self {
        Self {
            width,
            words: vec![0; (positions * width).div_ceil(64)],
        }
    }

    /// Marks the configuration, returning `true` if it was not seen before.
    fn insert(&mut self, position: usize, offset: usize) -> bool {
        let bit = position * self.width + offset;
        let mask = 1u64 << (bit % 64);
        let word = &mut self.words[bit / 64];
        let fresh = *word & mask == 0;
        *word |= mask;
        fresh
    }

    fn clear(&mut self) {
        self.words.fill(0);
    }
}

/// Scratch space for repeated walks over the same input.
pub(crate) struct Walk<'a> {
    automaton: &'a Automaton,
    chars: &'a [char],
    visited: Visited,
    stack: Vec<(usize, usize)>,
}

impl<'a> Walk<'a> {
    pub fn new(automaton: &'a Automaton, chars: &'a [char]) -> Self {
        Self {
            automaton,
            chars,
            visited: Visited::new(automaton.end() + 1, chars.len() + 1),
            stack: Vec::new(),
        }
    }

    /// End offset of the longest prefix of `chars[start..]` that takes the
    /// automaton from Begin to End, under the configured strategy.
    pub fn longest_end(&mut self, start: usize) -> Option<usize> {
        match self.automaton.config().strategy {
            Strategy::Exhaustive => self.exhaustive(start),
            Strategy::Greedy => self.greedy(start),
        }
    }

    fn exhaustive(&mut self, start: usize) -> Option<usize> {
        let automaton = self.automaton;
        let chars = self.chars;
        let end = automaton.end();
        self.visited.clear();
        self.stack.clear();

        let mut longest = None;
        self.visited.insert(BEGIN, start);
        self.stack.push((BEGIN, start));
        while let Some((position, offset)) = self.stack.pop() {
            for next in automaton.successors(position) {
                if next == end {
                    longest = longest.max(Some(offset));
                    continue;
                }
                let Some(state) = automaton.state(next) else {
                    continue;
                };
                let Some(run) = state.greedy_run(chars, offset) else {
                    continue;
                };
                let min = state.repeat().min as usize;
                for stop in offset + min..=offset + run {
                    if self.visited.insert(next, stop) {
                        self.stack.push((next, stop));
                    }
                }
            }
        }
        longest
    }

    fn greedy(&mut self, start: usize) -> Option<usize> {
        let automaton = self.automaton;
        let chars = self.chars;
        let end = automaton.end();
        self.visited.clear();

        let (mut position, mut offset) = (BEGIN, start);
        loop {
            if !self.visited.insert(position, offset) {
                return None;
            }
            let can_end = automaton.has_edge(position, end);
            if can_end && offset == chars.len() {
                return Some(offset);
            }

            let step = automaton
                .successors(position)
                .filter(|&next| next != end)
                .find_map(|next| {
                    let run = automaton.state(next)?.greedy_run(chars, offset)?;
                    Some((next, run))
                });
            match step {
                Some((next, run)) => {
                    position = next;
                    offset += run;
                }
                None if can_end => return Some(offset),
                None => return None,
            }
        }
    }
}

impl Automaton {
    /// Whole-string match: every character of `haystack` is consumed and
    /// the walk finishes on End.
    ///
    /// ```
    /// let automaton = rexlite_engine::compile(r"\d+").unwrap();
    /// assert!(automaton.is_match("123"));
    /// assert!(!automaton.is_match("12a"));
    /// ```
    pub fn is_match(&self, haystack: &str) -> bool {
        let chars: Vec<char> = haystack.chars().collect();
        Walk::new(self, &chars).longest_end(0) == Some(chars.len())
    }
}
