use crate::automaton::Automaton;
use crate::config::Config;
use crate::error::CompileError;
use crate::parse::PatternParser;

/// Turns patterns into [`Automaton`]s under a fixed [`Config`].
///
/// Every call returns a freshly owned automaton; compiling one pattern never
/// affects automata compiled earlier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    config: Config,
}

impl Compiler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn compile(&self, pattern: &str) -> Result<Automaton, CompileError> {
        let (builder, root) = PatternParser::new(pattern, self.config.limits).parse()?;
        Ok(builder.finish(root, pattern, self.config))
    }
}

/// Compiles `pattern` with the default configuration.
pub fn compile(pattern: &str) -> Result<Automaton, CompileError> {
    Compiler::default().compile(pattern)
}

/// Compiles `pattern` and matches it against the whole of `haystack`.
/// A pattern that does not compile is reported as an error rather than as
/// a failed match.
pub fn is_match(pattern: &str, haystack: &str) -> Result<bool, CompileError> {
    Ok(compile(pattern)?.is_match(haystack))
}

/// Compiles `pattern` and returns the byte offset of its leftmost match in
/// `haystack`.
pub fn find(pattern: &str, haystack: &str) -> Result<Option<usize>, CompileError> {
    Ok(compile(pattern)?.find(haystack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;

    #[test]
    fn test_is_match_convenience() {
        assert_eq!(is_match("cat|dog", "dog"), Ok(true));
        assert_eq!(is_match("cat|dog", "cow"), Ok(false));
        assert_eq!(
            is_match("a|", "a"),
            Err(CompileError::TrailingAlternation { offset: 1 })
        );
    }

    #[test]
    fn test_find_convenience() {
        assert_eq!(find("cat", "xxcatyy"), Ok(Some(2)));
        assert_eq!(find("cat", "dog"), Ok(None));
        assert!(find("(", "x").is_err());
    }

    #[test]
    fn test_compiler_applies_limits() {
        let compiler = Compiler::new(Config::new().limits(Limits {
            max_states: 3,
            max_class_len: 2,
            max_group_len: 2,
        }));
        assert!(compiler.compile("abc").is_ok());
        assert_eq!(
            compiler.compile("abcd").unwrap_err(),
            CompileError::TooManyStates {
                offset: 3,
                limit: 3
            }
        );
        assert_eq!(
            compiler.compile("[abc]").unwrap_err(),
            CompileError::ClassTooLarge {
                offset: 3,
                limit: 2
            }
        );
        assert_eq!(
            compiler.compile("(abc)").unwrap_err(),
            CompileError::GroupTooLarge {
                offset: 3,
                limit: 2
            }
        );
    }

    #[test]
    fn test_automaton_keeps_pattern_and_config() {
        let config = Config::new().max_states(50);
        let automaton = Compiler::new(config).compile("a+").unwrap();
        assert_eq!(automaton.pattern(), "a+");
        assert_eq!(automaton.config(), &config);
    }
}
