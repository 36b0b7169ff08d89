//! Human-readable automaton dump.

use crate::automaton::{Automaton, BEGIN};
use crate::config::Strategy;
use std::fmt;

impl Automaton {
    /// Multi-line listing of every position, its state and its successors.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    fn label(&self, position: usize) -> String {
        if position == BEGIN {
            "BEGIN".to_string()
        } else if position == self.end() {
            "END".to_string()
        } else {
            self.state(position)
                .map(ToString::to_string)
                .unwrap_or_default()
        }
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pattern: {}", self.pattern())?;
        writeln!(f, "states: {}", self.len())?;
        if self.config().strategy == Strategy::Greedy {
            writeln!(f, "strategy: greedy")?;
        }

        let labels: Vec<String> = (BEGIN..=self.end()).map(|p| self.label(p)).collect();
        let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        for (position, label) in labels.iter().enumerate() {
            let mut line = format!("  {:>3} {:<width$}", position, label, width = width);
            let targets: Vec<String> = self.successors(position).map(|t| t.to_string()).collect();
            if !targets.is_empty() {
                line.push_str(" -> ");
                line.push_str(&targets.join(", "));
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{compile, Compiler, Config, Strategy};

    #[test]
    fn test_describe_alternation() {
        let automaton = compile("a+|b").unwrap();
        let expected = "\
pattern: a+|b
states: 2
    0 BEGIN -> 1, 2
    1 a{1,} -> 3
    2 b     -> 3
    3 END
";
        assert_eq!(automaton.describe(), expected);
    }

    #[test]
    fn test_describe_shows_negation_and_classes() {
        let automaton = compile(r"^[a-c\d]{2,3}x").unwrap();
        let dump = automaton.describe();
        assert!(dump.contains(r"^[a-c\d]{2,3} -> 2"), "{dump}");
        assert!(dump.contains(&format!("x{} -> 3", " ".repeat(12))), "{dump}");
    }

    #[test]
    fn test_describe_empty_pattern() {
        let automaton = compile("").unwrap();
        assert_eq!(
            automaton.to_string(),
            "pattern: \nstates: 0\n    0 BEGIN -> 1\n    1 END\n"
        );
    }

    #[test]
    fn test_describe_marks_greedy_strategy() {
        let automaton = Compiler::new(Config::new().strategy(Strategy::Greedy))
            .compile("ab")
            .unwrap();
        assert!(automaton.describe().contains("strategy: greedy"));
    }
}
