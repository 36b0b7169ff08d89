use clap::{ArgAction, Args, Parser, Subcommand};
use rexlite_engine::{
    Config, Limits, Strategy, DEFAULT_MAX_CLASS_LEN, DEFAULT_MAX_GROUP_LEN, DEFAULT_MAX_STATES,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rexlite", about = "Compile, inspect and test rexlite patterns", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print more detail; repeat for per-input verdicts and automaton dumps
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match whole inputs against a pattern
    Match {
        pattern: String,

        #[arg(required = true)]
        inputs: Vec<String>,

        /// Print one JSON object per input
        #[arg(long)]
        json: bool,
    },

    /// Find the leftmost-longest match of a pattern in each input
    Find {
        pattern: String,

        #[arg(required = true)]
        inputs: Vec<String>,

        /// Print one JSON object per input
        #[arg(long)]
        json: bool,
    },

    /// Print the compiled automaton
    Describe { pattern: String },

    /// Run corpus test files
    Check {
        /// Root directory or corpus file, or "-" to read a corpus from stdin
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Only run cases whose file or case name contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// List cases without running them
        #[arg(short, long)]
        list: bool,

        /// Run suites sequentially instead of in parallel
        #[arg(short, long)]
        sequential: bool,
    },
}

/// Compile limits and matcher selection shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Maximum number of automaton states
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_STATES)]
    pub max_states: usize,

    /// Maximum number of members in one bracket class
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CLASS_LEN)]
    pub max_class_len: usize,

    /// Maximum number of states inside one group
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_GROUP_LEN)]
    pub max_group_len: usize,

    /// Use the single-path greedy matcher instead of the exhaustive one
    #[arg(long, global = true)]
    pub greedy: bool,
}

impl EngineArgs {
    pub fn config(&self) -> Config {
        let strategy = if self.greedy {
            Strategy::Greedy
        } else {
            Strategy::Exhaustive
        };
        Config::new()
            .limits(Limits {
                max_states: self.max_states,
                max_class_len: self.max_class_len,
                max_group_len: self.max_group_len,
            })
            .strategy(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_map_to_default_config() {
        let cli = Cli::parse_from(["rexlite", "describe", "a+"]);
        assert_eq!(cli.engine.config(), Config::default());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_engine_flags() {
        let cli = Cli::parse_from([
            "rexlite",
            "match",
            "--greedy",
            "--max-states",
            "12",
            "a+",
            "aa",
            "-vv",
        ]);
        let config = cli.engine.config();
        assert_eq!(config.strategy, Strategy::Greedy);
        assert_eq!(config.limits.max_states, 12);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Match {
                pattern, inputs, ..
            } => {
                assert_eq!(pattern, "a+");
                assert_eq!(inputs, vec!["aa"]);
            }
            _ => panic!("expected match subcommand"),
        }
    }

    #[test]
    fn test_check_defaults_to_current_dir() {
        let cli = Cli::parse_from(["rexlite", "check"]);
        match cli.command {
            Command::Check { root, filter, .. } => {
                assert_eq!(root, PathBuf::from("."));
                assert!(filter.is_none());
            }
            _ => panic!("expected check subcommand"),
        }
    }
}
