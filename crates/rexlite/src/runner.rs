use crate::discover::Suite;
use crate::error::load_corpus;
use crate::{parse_content, Expectation, TestCase};
use rayon::prelude::*;
use rexlite_engine::{Automaton, Compiler, Config};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

/// Environment variable that makes `check` print every compiled automaton
/// to stderr.
pub const DEBUG_ENV: &str = "REXLITE_DEBUG";

#[derive(Debug, Clone)]
pub struct ExpectationResult {
    pub expectation: Expectation,
    pub passed: bool,
    /// What actually happened, phrased like an expectation line.
    pub actual: String,
}

#[derive(Debug, Clone)]
pub struct TestResult {
    pub test: TestCase,
    pub passed: bool,
    pub expectations: Vec<ExpectationResult>,
    /// Compile error text when the pattern did not compile.
    pub error: Option<String>,
    /// Automaton dump, kept for failing cases whose pattern compiled.
    pub automaton: Option<String>,
    pub elapsed: Duration,
    pub suite: String,
}

#[derive(Debug, Clone)]
pub struct FileResult {
    pub file_path: PathBuf,
    pub results: Vec<TestResult>,
    pub parse_error: Option<String>,
}

impl FileResult {
    pub fn passed(&self) -> bool {
        self.parse_error.is_none() && self.results.iter().all(|r| r.passed)
    }
}

#[derive(Debug)]
pub struct SuiteResult {
    pub suite: Suite,
    pub file_results: Vec<FileResult>,
    pub elapsed: Duration,
}

impl SuiteResult {
    pub fn passed(&self) -> bool {
        self.file_results.iter().all(|f| f.passed())
    }

    pub fn total_tests(&self) -> usize {
        self.file_results.iter().map(|f| f.results.len()).sum()
    }

    pub fn passed_tests(&self) -> usize {
        self.file_results
            .iter()
            .flat_map(|f| &f.results)
            .filter(|r| r.passed)
            .count()
    }
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    TestStart {
        suite: String,
        file: String,
        name: String,
    },
    TestComplete(Box<TestResult>),
}

fn describe_match(matched: bool) -> String {
    let verdict = if matched { "match" } else { "reject" };
    verdict.to_string()
}

fn describe_find(found: Option<usize>) -> String {
    match found {
        Some(offset) => format!("find {}", offset),
        None => "find none".to_string(),
    }
}

fn check_expectation(automaton: &Automaton, expectation: &Expectation) -> ExpectationResult {
    let (passed, actual) = match expectation {
        Expectation::Match(input) => {
            let matched = automaton.is_match(input);
            (matched, describe_match(matched))
        }
        Expectation::Reject(input) => {
            let matched = automaton.is_match(input);
            (!matched, describe_match(matched))
        }
        Expectation::Find { input, offset } => {
            let found = automaton.find(input);
            (found == *offset, describe_find(found))
        }
        Expectation::CompileError(_) => (false, "compiled".to_string()),
    };
    ExpectationResult {
        expectation: expectation.clone(),
        passed,
        actual,
    }
}

fn check_compile_failure(message: &str, expectation: &Expectation) -> ExpectationResult {
    let passed = match expectation {
        Expectation::CompileError(None) => true,
        Expectation::CompileError(Some(expected)) => message.contains(expected.as_str()),
        _ => false,
    };
    ExpectationResult {
        expectation: expectation.clone(),
        passed,
        actual: format!("error: {}", message),
    }
}

pub fn run_test(test: &TestCase, config: Config, suite_name: &str) -> TestResult {
    let start = Instant::now();
    let compiled = Compiler::new(config).compile(&test.pattern);

    if std::env::var_os(DEBUG_ENV).is_some() {
        match &compiled {
            Ok(automaton) => eprintln!("[{}] {}\n{}", DEBUG_ENV, test.name, automaton),
            Err(e) => eprintln!("[{}] {}: {}", DEBUG_ENV, test.name, e),
        }
    }

    let (expectations, error) = match &compiled {
        Ok(automaton) => (
            test.expectations
                .par_iter()
                .map(|e| check_expectation(automaton, e))
                .collect::<Vec<_>>(),
            None,
        ),
        Err(e) => {
            let message = e.to_string();
            let results = test
                .expectations
                .iter()
                .map(|exp| check_compile_failure(&message, exp))
                .collect();
            (results, Some(message))
        }
    };

    // A case without expectations only asserts that its pattern compiles.
    let passed = if expectations.is_empty() {
        compiled.is_ok()
    } else {
        expectations.iter().all(|r| r.passed)
    };
    let automaton = match &compiled {
        Ok(automaton) if !passed => Some(automaton.describe()),
        _ => None,
    };

    TestResult {
        test: test.clone(),
        passed,
        expectations,
        error,
        automaton,
        elapsed: start.elapsed(),
        suite: suite_name.to_string(),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

fn run_tests(
    tests: Vec<TestCase>,
    config: Config,
    suite_name: &str,
    file: &str,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> Vec<TestResult> {
    let mut results = Vec::new();
    for test in tests {
        if let Some(tx) = progress_tx {
            let _ = tx.send(ProgressEvent::TestStart {
                suite: suite_name.to_string(),
                file: file.to_string(),
                name: test.name.clone(),
            });
        }

        let result = run_test(&test, config, suite_name);
        if let Some(tx) = progress_tx {
            let _ = tx.send(ProgressEvent::TestComplete(Box::new(result.clone())));
        }
        results.push(result);
    }
    results
}

/// Keeps the cases selected by `filter`: all of them when the file name
/// contains it, otherwise those whose own name does.
pub fn filter_tests(file_path: &Path, tests: Vec<TestCase>, filter: Option<&str>) -> Vec<TestCase> {
    let Some(pat) = filter else {
        return tests;
    };
    if file_stem(file_path).contains(pat) {
        return tests;
    }
    tests.into_iter().filter(|t| t.name.contains(pat)).collect()
}

pub fn run_corpus_file(
    file_path: &Path,
    config: Config,
    suite_name: &str,
    filter: Option<&str>,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> FileResult {
    let corpus = match load_corpus(file_path) {
        Ok(corpus) => corpus,
        Err(e) => {
            return FileResult {
                file_path: file_path.to_path_buf(),
                results: vec![],
                parse_error: Some(e.to_string()),
            };
        }
    };

    let tests = filter_tests(file_path, corpus.tests, filter);
    let results = run_tests(
        tests,
        config,
        suite_name,
        &file_stem(file_path),
        progress_tx,
    );

    FileResult {
        file_path: file_path.to_path_buf(),
        results,
        parse_error: None,
    }
}

pub fn run_suite(
    suite: &Suite,
    config: Config,
    filter: Option<&str>,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> SuiteResult {
    let start = Instant::now();
    let file_results = suite
        .corpus_files()
        .iter()
        .map(|file| run_corpus_file(file, config, &suite.name, filter, progress_tx))
        .collect();

    SuiteResult {
        suite: suite.clone(),
        file_results,
        elapsed: start.elapsed(),
    }
}

pub fn run_from_stdin(
    content: &str,
    config: Config,
    filter: Option<&str>,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> SuiteResult {
    let start = Instant::now();
    let stdin_path = PathBuf::from("<stdin>");
    let suite = Suite {
        name: "stdin".to_string(),
        path: PathBuf::from("."),
        single_file: None,
    };

    let file_result = match parse_content(content, &stdin_path) {
        Ok(corpus) => {
            let tests = filter_tests(&stdin_path, corpus.tests, filter);
            FileResult {
                results: run_tests(tests, config, "stdin", "stdin", progress_tx),
                file_path: stdin_path,
                parse_error: None,
            }
        }
        Err(e) => FileResult {
            file_path: stdin_path,
            results: vec![],
            parse_error: Some(format!("Failed to parse: {}", e)),
        },
    };

    SuiteResult {
        suite,
        file_results: vec![file_result],
        elapsed: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rexlite_engine::Strategy;
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn create_suite(dir: &Path, name: &str, content: &str) -> Suite {
        let suite_dir = dir.join(name);
        fs::create_dir_all(&suite_dir).unwrap();
        fs::write(suite_dir.join("cases.txt"), content).unwrap();
        Suite::new(suite_dir, dir)
    }

    fn case(pattern: &str, expectations: Vec<Expectation>) -> TestCase {
        TestCase {
            name: "case".to_string(),
            pattern: pattern.to_string(),
            expectations,
            file_path: PathBuf::from("cases.txt"),
            start_line: 1,
            end_line: 1,
        }
    }

    #[test]
    fn test_run_passing_suite() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(
            tmp.path(),
            "passing",
            "===\nalternation\n===\ncat|dog\n---\nmatch: cat\nreject: cow\nfind 2: xxcatyy\n",
        );

        let result = run_suite(&suite, Config::default(), None, None);
        assert!(result.passed());
        assert_eq!(result.total_tests(), 1);
        assert_eq!(result.passed_tests(), 1);
    }

    #[test]
    fn test_run_failing_suite() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(
            tmp.path(),
            "failing",
            "===\nwrong\n===\nab\n---\nmatch: abc\n",
        );

        let result = run_suite(&suite, Config::default(), None, None);
        assert!(!result.passed());
        assert_eq!(result.passed_tests(), 0);

        let test = &result.file_results[0].results[0];
        assert_eq!(test.expectations[0].actual, "reject");
        assert!(test.automaton.as_deref().unwrap().contains("pattern: ab"));
    }

    #[test]
    fn test_parse_error_fails_file() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(tmp.path(), "broken", "===\nbroken\n===\nab\nmatch: ab\n");

        let result = run_suite(&suite, Config::default(), None, None);
        assert!(!result.passed());
        assert!(result.file_results[0].parse_error.is_some());
    }

    #[test]
    fn test_compile_error_expectations() {
        let result = run_test(
            &case("a|", vec![Expectation::CompileError(Some("alternation".into()))]),
            Config::default(),
            "suite",
        );
        assert!(result.passed);
        assert!(result.error.is_some());

        let result = run_test(
            &case("a|", vec![Expectation::Match("a".into())]),
            Config::default(),
            "suite",
        );
        assert!(!result.passed);
        assert!(result.expectations[0].actual.starts_with("error: "));

        let result = run_test(
            &case("ab", vec![Expectation::CompileError(None)]),
            Config::default(),
            "suite",
        );
        assert!(!result.passed);
        assert_eq!(result.expectations[0].actual, "compiled");
    }

    #[test]
    fn test_case_without_expectations_must_compile() {
        assert!(run_test(&case("a+", vec![]), Config::default(), "s").passed);
        assert!(!run_test(&case("(", vec![]), Config::default(), "s").passed);
    }

    #[test]
    fn test_config_reaches_compiler() {
        let test = case("aaaa", vec![Expectation::Match("aaaa".into())]);
        assert!(run_test(&test, Config::default(), "s").passed);
        assert!(!run_test(&test, Config::new().max_states(3), "s").passed);

        let ambiguous = case("a*a", vec![Expectation::Match("aaa".into())]);
        assert!(run_test(&ambiguous, Config::default(), "s").passed);
        let greedy = Config::new().strategy(Strategy::Greedy);
        assert!(!run_test(&ambiguous, greedy, "s").passed);
    }

    #[test]
    fn test_filter_by_case_or_file_name() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(
            tmp.path(),
            "filtered",
            "===\nkeep me\n===\na\n---\nmatch: a\n\n===\ndrop me\n===\nb\n---\nmatch: b\n",
        );

        let result = run_suite(&suite, Config::default(), Some("keep"), None);
        assert_eq!(result.total_tests(), 1);

        let result = run_suite(&suite, Config::default(), Some("cases"), None);
        assert_eq!(result.total_tests(), 2);
    }

    #[test]
    fn test_progress_events() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(
            tmp.path(),
            "progress",
            "===\none\n===\na\n---\nmatch: a\n\n===\ntwo\n===\nb\n---\nmatch: b\n",
        );

        let (tx, rx) = mpsc::channel();
        run_suite(&suite, Config::default(), None, Some(&tx));
        drop(tx);

        let events: Vec<ProgressEvent> = rx.iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], ProgressEvent::TestStart { name, .. } if name == "one"));
        assert!(matches!(&events[3], ProgressEvent::TestComplete(r) if r.test.name == "two"));
    }

    #[test]
    fn test_run_from_stdin() {
        let content = "===\nstdin case\n===\n\\d+\n---\nmatch: 42\nreject: 4a\n";
        let result = run_from_stdin(content, Config::default(), None, None);
        assert!(result.passed());
        assert_eq!(result.suite.name, "stdin");

        let result = run_from_stdin("not a corpus", Config::default(), None, None);
        assert!(!result.passed());
    }
}
