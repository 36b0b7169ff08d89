//! Compile limits and matcher selection.

/// Default cap on live states, after group unrolling.
pub const DEFAULT_MAX_STATES: usize = 100;
/// Default cap on members of one bracket class.
pub const DEFAULT_MAX_CLASS_LEN: usize = 10;
/// Default cap on states written inside one group.
pub const DEFAULT_MAX_GROUP_LEN: usize = 10;

/// Bounds every compile loop so adversarial patterns cannot grow the
/// automaton without limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_states: usize,
    pub max_class_len: usize,
    pub max_group_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_states: DEFAULT_MAX_STATES,
            max_class_len: DEFAULT_MAX_CLASS_LEN,
            max_group_len: DEFAULT_MAX_GROUP_LEN,
        }
    }
}

/// How the matcher walks the automaton.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Explore every reachable `(position, offset)` configuration.
    #[default]
    Exhaustive,
    /// Commit to the first satisfiable edge at each step and never
    /// backtrack. Cheaper, but rejects inputs whose acceptance depends on
    /// giving characters back (`a*a` on `aaa`).
    Greedy,
}

/// Everything a [`Compiler`](crate::Compiler) needs besides the pattern.
///
/// ```
/// use rexlite_engine::{Compiler, Config, Strategy};
///
/// let config = Config::new().max_states(8).strategy(Strategy::Greedy);
/// let automaton = Compiler::new(config).compile("a+b").unwrap();
/// assert!(automaton.is_match("aab"));
/// assert!(Compiler::new(config).compile("abcdefghi").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub limits: Limits,
    pub strategy: Strategy,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn max_states(mut self, max_states: usize) -> Self {
        self.limits.max_states = max_states;
        self
    }

    pub fn max_class_len(mut self, max_class_len: usize) -> Self {
        self.limits.max_class_len = max_class_len;
        self
    }

    pub fn max_group_len(mut self, max_group_len: usize) -> Self {
        self.limits.max_group_len = max_group_len;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.limits.max_states, 100);
        assert_eq!(config.limits.max_class_len, 10);
        assert_eq!(config.limits.max_group_len, 10);
        assert_eq!(config.strategy, Strategy::Exhaustive);
    }

    #[test]
    fn test_builder_setters() {
        let config = Config::new()
            .max_states(3)
            .max_class_len(4)
            .max_group_len(5)
            .strategy(Strategy::Greedy);
        assert_eq!(
            config.limits,
            Limits {
                max_states: 3,
                max_class_len: 4,
                max_group_len: 5,
            }
        );
        assert_eq!(config.strategy, Strategy::Greedy);
    }
}
