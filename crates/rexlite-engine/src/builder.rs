//! Transition wiring for parsed fragments.
//!
//! Positions are 1-based while building: `0` is reserved for the Begin
//! sentinel and `len + 1` becomes End in [`Builder::finish`].

use crate::automaton::{Automaton, Transitions, BEGIN};
use crate::config::{Config, Limits};
use crate::error::CompileError;
use crate::state::{Repeat, State};

/// Summary of a parsed sub-sequence: where control may enter it, where it
/// may leave it, and whether it can be bypassed entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub entries: Vec<usize>,
    pub exits: Vec<usize>,
    pub skippable: bool,
}

impl Default for Fragment {
    fn default() -> Self {
        Self::empty()
    }
}

impl Fragment {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            exits: Vec::new(),
            skippable: true,
        }
    }

    pub fn atom(position: usize) -> Self {
        Self {
            entries: vec![position],
            exits: vec![position],
            skippable: false,
        }
    }

    fn shifted(&self, delta: usize) -> Self {
        Self {
            entries: self.entries.iter().map(|p| p + delta).collect(),
            exits: self.exits.iter().map(|p| p + delta).collect(),
            skippable: self.skippable,
        }
    }
}

/// Where a group's body starts in the builder, recorded when `(` is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mark {
    pub first_position: usize,
    pub first_edge: usize,
}

#[derive(Debug)]
pub(crate) struct Builder {
    limits: Limits,
    states: Vec<State>,
    edges: Vec<(usize, usize)>,
}

impl Builder {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            states: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn mark(&self) -> Mark {
        Mark {
            first_position: self.states.len() + 1,
            first_edge: self.edges.len(),
        }
    }

    /// Appends a state and returns its position.
    pub fn push_state(&mut self, state: State, offset: usize) -> Result<usize, CompileError> {
        if self.states.len() >= self.limits.max_states {
            return Err(CompileError::TooManyStates {
                offset,
                limit: self.limits.max_states,
            });
        }
        self.states.push(state);
        Ok(self.states.len())
    }

    pub fn set_repeat(&mut self, position: usize, repeat: Repeat) {
        self.states[position - 1].set_repeat(repeat);
    }

    fn connect(&mut self, from: &[usize], to: &[usize]) {
        for &f in from {
            for &t in to {
                self.edges.push((f, t));
            }
        }
    }

    /// Sequencing: everything `a` can leave from links to everything `b`
    /// can be entered at.
    pub fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
        self.connect(&a.exits, &b.entries);

        let mut entries = a.entries;
        if a.skippable {
            entries.extend_from_slice(&b.entries);
        }
        let mut exits = b.exits;
        if b.skippable {
            exits.extend_from_slice(&a.exits);
        }
        Fragment {
            entries,
            exits,
            skippable: a.skippable && b.skippable,
        }
    }

    /// Split/join: the predecessor reaches every branch's entries and every
    /// branch's exits reach the successor.
    pub fn alternate(branches: Vec<Fragment>) -> Fragment {
        let mut branches = branches.into_iter();
        let Some(mut joined) = branches.next() else {
            return Fragment::empty();
        };
        for branch in branches {
            joined.entries.extend(branch.entries);
            joined.exits.extend(branch.exits);
            joined.skippable |= branch.skippable;
        }
        joined
    }

    /// Applies a group quantifier by unrolling the group body that was
    /// built since `mark`: `min` required copies, then optional copies up
    /// to `max`, or a looping last copy when `max` is unbounded.
    pub fn repeat_group(
        &mut self,
        body: Fragment,
        mark: Mark,
        repeat: Repeat,
        offset: usize,
    ) -> Result<Fragment, CompileError> {
        if repeat == Repeat::ONCE {
            return Ok(body);
        }
        if repeat.max == Some(0) {
            self.states.truncate(mark.first_position - 1);
            self.edges.truncate(mark.first_edge);
            return Ok(Fragment::empty());
        }

        let width = self.states.len() + 1 - mark.first_position;
        let copies = match repeat.max {
            Some(max) => max,
            None => repeat.min.max(1),
        } as usize;

        let needed = width.saturating_mul(copies);
        if mark.first_position - 1 + needed > self.limits.max_states {
            return Err(CompileError::TooManyStates {
                offset,
                limit: self.limits.max_states,
            });
        }

        let body_states = self.states[mark.first_position - 1..].to_vec();
        let body_edges = self.edges[mark.first_edge..].to_vec();
        for copy in 1..copies {
            let delta = copy * width;
            self.states.extend(body_states.iter().cloned());
            self.edges
                .extend(body_edges.iter().map(|&(f, t)| (f + delta, t + delta)));
        }

        let mut result = Fragment::empty();
        for copy in 0..copies {
            let mut fragment = body.shifted(copy * width);
            if copy as u32 >= repeat.min {
                fragment.skippable = true;
            }
            if repeat.is_unbounded() && copy + 1 == copies {
                self.connect(&fragment.exits, &fragment.entries);
            }
            result = self.concat(result, fragment);
        }
        Ok(result)
    }

    pub fn finish(mut self, root: Fragment, pattern: &str, config: Config) -> Automaton {
        let end = self.states.len() + 1;
        self.connect(&[BEGIN], &root.entries);
        self.connect(&root.exits, &[end]);
        if root.skippable {
            self.edges.push((BEGIN, end));
        }

        let mut transitions = Transitions::new(end + 1);
        for (from, to) in self.edges {
            transitions.insert(from, to);
        }
        Automaton::from_parts(pattern.to_string(), self.states, transitions, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{Class, Symbol};

    fn literal(c: char) -> State {
        State::new(Class::single(Symbol::Literal(c)))
    }

    fn atom(builder: &mut Builder, c: char) -> Fragment {
        Fragment::atom(builder.push_state(literal(c), 0).unwrap())
    }

    #[test]
    fn test_concat_links_exits_to_entries() {
        let mut builder = Builder::new(Limits::default());
        let a = atom(&mut builder, 'a');
        let b = atom(&mut builder, 'b');
        let ab = builder.concat(a, b);
        assert_eq!(ab.entries, vec![1]);
        assert_eq!(ab.exits, vec![2]);
        assert!(!ab.skippable);
        assert_eq!(builder.edges, vec![(1, 2)]);
    }

    #[test]
    fn test_concat_through_skippable() {
        let mut builder = Builder::new(Limits::default());
        let a = atom(&mut builder, 'a');
        let ab = builder.concat(Fragment::empty(), a);
        assert_eq!(ab.entries, vec![1]);
        assert!(builder.edges.is_empty());

        let mut optional = atom(&mut builder, 'b');
        optional.skippable = true;
        let abc = builder.concat(ab, optional);
        assert_eq!(abc.entries, vec![1]);
        assert_eq!(abc.exits, vec![2, 1]);
    }

    #[test]
    fn test_alternate_unions_branches() {
        let mut builder = Builder::new(Limits::default());
        let a = atom(&mut builder, 'a');
        let b = atom(&mut builder, 'b');
        let either = Builder::alternate(vec![a, b]);
        assert_eq!(either.entries, vec![1, 2]);
        assert_eq!(either.exits, vec![1, 2]);
        assert!(!either.skippable);
        assert_eq!(Builder::alternate(Vec::new()), Fragment::empty());
    }

    #[test]
    fn test_repeat_group_unrolls_copies() {
        let mut builder = Builder::new(Limits::default());
        let mark = builder.mark();
        let a = atom(&mut builder, 'a');
        let b = atom(&mut builder, 'b');
        let body = builder.concat(a, b);
        let group = builder
            .repeat_group(body, mark, Repeat::between(1, 2), 0)
            .unwrap();

        assert_eq!(builder.states.len(), 4);
        assert_eq!(group.entries, vec![1]);
        assert_eq!(group.exits, vec![4, 2]);
        assert!(builder.edges.contains(&(1, 2)));
        assert!(builder.edges.contains(&(3, 4)));
        assert!(builder.edges.contains(&(2, 3)));
    }

    #[test]
    fn test_repeat_group_unbounded_loops_back() {
        let mut builder = Builder::new(Limits::default());
        let mark = builder.mark();
        let body = atom(&mut builder, 'a');
        let group = builder
            .repeat_group(body, mark, Repeat::at_least(0), 0)
            .unwrap();
        assert_eq!(builder.states.len(), 1);
        assert!(group.skippable);
        assert!(builder.edges.contains(&(1, 1)));
    }

    #[test]
    fn test_repeat_group_zero_removes_body() {
        let mut builder = Builder::new(Limits::default());
        let _ = atom(&mut builder, 'x');
        let mark = builder.mark();
        let a = atom(&mut builder, 'a');
        let b = atom(&mut builder, 'b');
        let body = builder.concat(a, b);
        let group = builder
            .repeat_group(body, mark, Repeat::exactly(0), 0)
            .unwrap();
        assert_eq!(group, Fragment::empty());
        assert_eq!(builder.states.len(), 1);
        assert!(builder.edges.is_empty());
    }

    #[test]
    fn test_repeat_group_respects_state_limit() {
        let mut builder = Builder::new(Limits {
            max_states: 5,
            ..Limits::default()
        });
        let mark = builder.mark();
        let a = atom(&mut builder, 'a');
        let b = atom(&mut builder, 'b');
        let body = builder.concat(a, b);
        let err = builder
            .repeat_group(body, mark, Repeat::exactly(3), 7)
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::TooManyStates {
                offset: 7,
                limit: 5
            }
        );
    }
}
