//! The compiled, immutable automaton.

use crate::config::Config;
use crate::state::State;

/// Position of the Begin sentinel. End sits at [`Automaton::end`].
pub const BEGIN: usize = 0;

/// Square boolean relation over automaton positions: `contains(i, j)` means
/// that once position `i` is satisfied control may move straight to `j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transitions {
    width: usize,
    bits: Vec<bool>,
}

impl Transitions {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            bits: vec![false; width * width],
        }
    }

    pub fn insert(&mut self, from: usize, to: usize) {
        self.bits[from * self.width + to] = true;
    }

    pub fn contains(&self, from: usize, to: usize) -> bool {
        from < self.width && to < self.width && self.bits[from * self.width + to]
    }

    /// Targets reachable from `from`, in increasing order.
    pub fn successors(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        let row: &[bool] = if from < self.width {
            &self.bits[from * self.width..(from + 1) * self.width]
        } else {
            &[]
        };
        row.iter()
            .enumerate()
            .filter_map(|(to, &edge)| edge.then_some(to))
    }
}

/// A compiled pattern.
///
/// Positions `1..=len()` hold the live [`State`]s; position [`BEGIN`] and
/// [`end()`](Self::end) are sentinels. An automaton never changes after
/// compilation, so one value can be shared by any number of threads.
#[derive(Debug, Clone)]
pub struct Automaton {
    pattern: String,
    states: Vec<State>,
    transitions: Transitions,
    config: Config,
}

impl Automaton {
    pub(crate) fn from_parts(
        pattern: String,
        states: Vec<State>,
        transitions: Transitions,
        config: Config,
    ) -> Self {
        Self {
            pattern,
            states,
            transitions,
            config,
        }
    }

    /// Compiles `pattern` with the default [`Config`].
    pub fn new(pattern: &str) -> Result<Self, crate::CompileError> {
        crate::compile(pattern)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of live states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Position of the End sentinel.
    pub fn end(&self) -> usize {
        self.states.len() + 1
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The live state at `position`, `None` for sentinels and out-of-range
    /// positions.
    pub fn state(&self, position: usize) -> Option<&State> {
        position
            .checked_sub(1)
            .and_then(|index| self.states.get(index))
    }

    pub fn successors(&self, position: usize) -> impl Iterator<Item = usize> + '_ {
        self.transitions.successors(position)
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.transitions.contains(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_successors_are_sorted() {
        let mut transitions = Transitions::new(4);
        transitions.insert(0, 3);
        transitions.insert(0, 1);
        transitions.insert(2, 2);
        assert_eq!(transitions.successors(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(transitions.successors(2).collect::<Vec<_>>(), vec![2]);
        assert_eq!(transitions.successors(1).count(), 0);
        assert_eq!(transitions.successors(9).count(), 0);
        assert!(transitions.contains(0, 3));
        assert!(!transitions.contains(3, 0));
        assert!(!transitions.contains(7, 0));
    }

    #[test]
    fn test_layout() {
        let automaton = Automaton::new("ab").unwrap();
        assert_eq!(automaton.len(), 2);
        assert_eq!(automaton.end(), 3);
        assert!(automaton.state(BEGIN).is_none());
        assert!(automaton.state(automaton.end()).is_none());
        assert_eq!(automaton.state(2).unwrap().to_string(), "b");
        assert_eq!(automaton.successors(BEGIN).collect::<Vec<_>>(), vec![1]);
        assert_eq!(automaton.successors(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(automaton.successors(2).collect::<Vec<_>>(), vec![3]);
        assert_eq!(automaton.successors(3).count(), 0);
    }

    #[test]
    fn test_empty_pattern_links_begin_to_end() {
        let automaton = Automaton::new("").unwrap();
        assert!(automaton.is_empty());
        assert!(automaton.has_edge(BEGIN, automaton.end()));
    }

    #[test]
    fn test_automaton_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Automaton>();
    }
}
