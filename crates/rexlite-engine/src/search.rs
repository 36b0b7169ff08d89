//! Leftmost-longest substring search.

use crate::automaton::Automaton;
use crate::matcher::Walk;
use std::ops::Range;

/// Byte range of a match inside the haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl Automaton {
    /// Byte offset of the leftmost position from which some prefix of the
    /// remaining haystack is accepted.
    ///
    /// ```
    /// let automaton = rexlite_engine::compile("cat").unwrap();
    /// assert_eq!(automaton.find("xxcatyy"), Some(2));
    /// assert_eq!(automaton.find("dog"), None);
    /// ```
    pub fn find(&self, haystack: &str) -> Option<usize> {
        self.find_span(haystack).map(|span| span.start)
    }

    /// Like [`find`](Self::find), also reporting where the longest match
    /// starting there ends.
    pub fn find_span(&self, haystack: &str) -> Option<Span> {
        let chars: Vec<char> = haystack.chars().collect();
        let boundaries: Vec<usize> = haystack
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(haystack.len()))
            .collect();

        let mut walk = Walk::new(self, &chars);
        (0..=chars.len()).find_map(|start| {
            walk.longest_end(start).map(|end| Span {
                start: boundaries[start],
                end: boundaries[end],
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, Compiler, Config, Strategy};

    fn span(pattern: &str, haystack: &str) -> Option<Span> {
        compile(pattern).unwrap().find_span(haystack)
    }

    #[test]
    fn test_find_leftmost() {
        let automaton = compile("cat").unwrap();
        assert_eq!(automaton.find("xxcatyy"), Some(2));
        assert_eq!(automaton.find("catcat"), Some(0));
        assert_eq!(automaton.find("ca"), None);
        assert_eq!(automaton.find(""), None);
    }

    #[test]
    fn test_find_longest_at_start() {
        assert_eq!(span("a+", "xaaay"), Some(Span { start: 1, end: 4 }));
        assert_eq!(span("ab|abcd", "zabcd"), Some(Span { start: 1, end: 5 }));
        assert_eq!(span(r"\d{2,3}", "a12345"), Some(Span { start: 1, end: 4 }));
    }

    #[test]
    fn test_find_empty_match() {
        assert_eq!(span("x*", "abc"), Some(Span { start: 0, end: 0 }));
        assert_eq!(span("", ""), Some(Span { start: 0, end: 0 }));
        assert!(span("x*", "abc").unwrap().is_empty());
    }

    #[test]
    fn test_find_reports_byte_offsets() {
        let found = span("c+", "ééccz").unwrap();
        assert_eq!(found, Span { start: 4, end: 6 });
        assert_eq!(&"ééccz"[found.range()], "cc");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_find_with_greedy_strategy() {
        let automaton = Compiler::new(Config::new().strategy(Strategy::Greedy))
            .compile("cat|dog")
            .unwrap();
        assert_eq!(automaton.find("hotdogs"), Some(3));
        assert_eq!(automaton.find_span("hotdogs"), Some(Span { start: 3, end: 6 }));
        assert_eq!(automaton.find("cow"), None);
    }
}
