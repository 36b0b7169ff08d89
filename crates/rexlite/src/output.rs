use crate::discover::Suite;
use crate::runner::{ProgressEvent, SuiteResult, TestResult};
use crate::TestCase;
use rexlite_engine::{Automaton, CompileError, Span};
use std::io::Write;
use std::time::Duration;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub struct Output {
    stdout: StandardStream,
    stderr: StandardStream,
    dot_count: usize,
}

impl Output {
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: StandardStream::stdout(color_choice),
            stderr: StandardStream::stderr(color_choice),
            dot_count: 0,
        }
    }

    fn set_color(&mut self, color: Color) {
        let _ = self.stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    }

    fn set_bold(&mut self) {
        let _ = self.stdout.set_color(ColorSpec::new().set_bold(true));
    }

    fn set_dim(&mut self) {
        let _ = self.stdout.set_color(ColorSpec::new().set_dimmed(true));
    }

    fn reset(&mut self) {
        let _ = self.stdout.reset();
    }

    // ============ Single Pattern Commands ============

    pub fn print_verdict(&mut self, input: &str, matched: bool) {
        if matched {
            self.set_color(Color::Green);
            write!(self.stdout, "MATCH").unwrap();
        } else {
            self.set_color(Color::Red);
            write!(self.stdout, "NO MATCH").unwrap();
        }
        self.reset();
        writeln!(self.stdout, ": {}", input).unwrap();
    }

    pub fn print_span(&mut self, input: &str, span: Option<Span>) {
        match span {
            Some(span) => {
                self.set_color(Color::Green);
                write!(self.stdout, "{}..{}", span.start, span.end).unwrap();
                self.reset();
                write!(self.stdout, ": {}", input).unwrap();
                self.set_dim();
                writeln!(self.stdout, " [{}]", &input[span.range()]).unwrap();
                self.reset();
            }
            None => {
                self.set_color(Color::Red);
                write!(self.stdout, "not found").unwrap();
                self.reset();
                writeln!(self.stdout, ": {}", input).unwrap();
            }
        }
    }

    pub fn print_json(&mut self, value: &serde_json::Value) {
        writeln!(self.stdout, "{}", value).unwrap();
    }

    pub fn print_automaton(&mut self, automaton: &Automaton) {
        write!(self.stdout, "{}", automaton).unwrap();
        let _ = self.stdout.flush();
    }

    /// Writes the error with a caret under the offending pattern position.
    pub fn print_compile_error(&mut self, pattern: &str, error: &CompileError) {
        let column = pattern
            .get(..error.offset())
            .map_or_else(|| pattern.chars().count(), |head| head.chars().count());

        let _ = self
            .stderr
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        write!(self.stderr, "error").unwrap();
        let _ = self.stderr.reset();
        writeln!(self.stderr, ": {}", error).unwrap();
        writeln!(self.stderr, "  {}", pattern).unwrap();
        writeln!(self.stderr, "  {}^", " ".repeat(column)).unwrap();
    }

    // ============ Corpus Progress ============

    pub fn print_progress(&mut self, event: &ProgressEvent, verbose_level: u8) {
        match event {
            ProgressEvent::TestStart { suite, file, name } => {
                if verbose_level >= 2 {
                    self.set_dim();
                    writeln!(self.stdout, "starting {}/{}: {}", suite, file, name).unwrap();
                    self.reset();
                    let _ = self.stdout.flush();
                }
            }
            ProgressEvent::TestComplete(result) => {
                if verbose_level >= 1 {
                    self.print_verbose_result(result, verbose_level);
                } else {
                    self.print_dot(result);
                }
            }
        }
    }

    fn print_dot(&mut self, result: &TestResult) {
        if result.passed {
            self.set_color(Color::Green);
            write!(self.stdout, ".").unwrap();
        } else {
            self.set_color(Color::Red);
            write!(self.stdout, "F").unwrap();
        }
        self.reset();
        let _ = self.stdout.flush();

        self.dot_count += 1;
        if self.dot_count >= 80 {
            writeln!(self.stdout).unwrap();
            self.dot_count = 0;
        }
    }

    fn print_verbose_result(&mut self, result: &TestResult, verbose_level: u8) {
        if result.passed {
            self.set_color(Color::Green);
            write!(self.stdout, "✓").unwrap();
        } else {
            self.set_color(Color::Red);
            write!(self.stdout, "✗").unwrap();
        }
        self.reset();

        let file_stem = result
            .test
            .file_path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        write!(
            self.stdout,
            " {}/{}: {}",
            result.suite, file_stem, result.test.name
        )
        .unwrap();
        self.set_dim();
        writeln!(self.stdout, " {:.3}ms", result.elapsed.as_secs_f64() * 1000.0).unwrap();
        self.reset();

        if verbose_level >= 2 {
            for checked in &result.expectations {
                let (mark, color) = if checked.passed {
                    ("✓", Color::Green)
                } else {
                    ("✗", Color::Red)
                };
                self.set_color(color);
                write!(self.stdout, "    {}", mark).unwrap();
                self.reset();
                writeln!(self.stdout, " {} (got {})", checked.expectation, checked.actual).unwrap();
            }
        }
    }

    pub fn finish_progress(&mut self) {
        if self.dot_count > 0 {
            writeln!(self.stdout).unwrap();
        }
        writeln!(self.stdout).unwrap();
    }

    // ============ Corpus Summary ============

    pub fn print_results(&mut self, results: &[SuiteResult], elapsed: Duration, verbose_level: u8) {
        let mut total_passed = 0;
        let mut total_failed = 0;
        let mut failed_tests: Vec<&TestResult> = Vec::new();
        let mut parse_errors: Vec<(&std::path::Path, &str)> = Vec::new();

        let mut sorted_results: Vec<_> = results.iter().collect();
        sorted_results.sort_by(|a, b| a.suite.name.cmp(&b.suite.name));

        for suite_result in &sorted_results {
            for file_result in &suite_result.file_results {
                if let Some(err) = &file_result.parse_error {
                    parse_errors.push((file_result.file_path.as_path(), err.as_str()));
                }
            }

            let suite_passed = suite_result.passed_tests();
            let suite_total = suite_result.total_tests();
            let has_parse_errors = suite_result
                .file_results
                .iter()
                .any(|f| f.parse_error.is_some());
            let suite_time = format!(" in {:.2}s", suite_result.elapsed.as_secs_f64());

            total_passed += suite_passed;
            total_failed += suite_total - suite_passed;
            if has_parse_errors {
                total_failed += 1; // Count parse error as a failure
            }

            if suite_result.passed() {
                self.set_color(Color::Green);
                write!(self.stdout, "✓ {}", suite_result.suite.name).unwrap();
            } else {
                self.set_color(Color::Red);
                write!(self.stdout, "✗ {}", suite_result.suite.name).unwrap();
            }
            self.reset();
            writeln!(
                self.stdout,
                ": {}/{} tests passed{}",
                suite_passed, suite_total, suite_time
            )
            .unwrap();

            failed_tests.extend(
                suite_result
                    .file_results
                    .iter()
                    .flat_map(|f| &f.results)
                    .filter(|r| !r.passed),
            );
        }

        if !parse_errors.is_empty() {
            writeln!(self.stdout).unwrap();
            self.set_color(Color::Red);
            self.set_bold();
            writeln!(self.stdout, "Parse Errors:").unwrap();
            self.reset();

            for (path, error) in &parse_errors {
                writeln!(self.stdout).unwrap();
                self.set_color(Color::Red);
                write!(self.stdout, "✗").unwrap();
                self.reset();
                writeln!(self.stdout, " {}", path.display()).unwrap();
                writeln!(self.stdout, "  {}", error).unwrap();
            }
        }

        if !failed_tests.is_empty() {
            writeln!(self.stdout).unwrap();
            self.set_color(Color::Red);
            self.set_bold();
            writeln!(self.stdout, "Failures:").unwrap();
            self.reset();

            for result in failed_tests {
                self.print_failure(result, verbose_level);
            }
        }

        writeln!(self.stdout).unwrap();
        let elapsed_str = format!(" in {:.2}s", elapsed.as_secs_f64());

        if total_failed == 0 {
            self.set_color(Color::Green);
            self.set_bold();
            write!(self.stdout, "All {} tests passed", total_passed).unwrap();
            self.reset();
            writeln!(self.stdout, "{}", elapsed_str).unwrap();
        } else {
            self.set_bold();
            write!(self.stdout, "Summary:").unwrap();
            self.reset();
            writeln!(
                self.stdout,
                " {} passed, {} failed{}",
                total_passed, total_failed, elapsed_str
            )
            .unwrap();
        }
    }

    fn print_failure(&mut self, result: &TestResult, verbose_level: u8) {
        writeln!(self.stdout).unwrap();
        let file_stem = result
            .test
            .file_path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();

        self.set_color(Color::Red);
        write!(self.stdout, "✗").unwrap();
        self.reset();
        writeln!(
            self.stdout,
            " {}/{}: {}",
            result.suite, file_stem, result.test.name
        )
        .unwrap();

        let display_path = std::env::current_dir()
            .ok()
            .and_then(|cwd| result.test.file_path.strip_prefix(&cwd).ok())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| result.test.file_path.clone());
        writeln!(
            self.stdout,
            "  {}:{}",
            display_path.display(),
            result.test.start_line
        )
        .unwrap();
        writeln!(self.stdout, "  Pattern: {}", result.test.pattern).unwrap();

        if let Some(error) = &result.error {
            if !result.test.expects_compile_error() {
                writeln!(self.stdout, "  Error: {}", error).unwrap();
            }
        }

        for checked in result.expectations.iter().filter(|c| !c.passed) {
            write!(self.stdout, "  expected ").unwrap();
            self.set_color(Color::Green);
            write!(self.stdout, "{}", checked.expectation).unwrap();
            self.reset();
            write!(self.stdout, ", got ").unwrap();
            self.set_color(Color::Red);
            writeln!(self.stdout, "{}", checked.actual).unwrap();
            self.reset();
        }

        if verbose_level >= 2 {
            if let Some(dump) = &result.automaton {
                writeln!(self.stdout).unwrap();
                for line in dump.lines() {
                    writeln!(self.stdout, "  {}", line).unwrap();
                }
            }
        }
    }

    pub fn print_list(&mut self, results: &[(&Suite, Vec<TestCase>)]) {
        for (suite, tests) in results {
            writeln!(self.stdout).unwrap();
            self.set_bold();
            writeln!(self.stdout, "{}", suite.name).unwrap();
            self.reset();

            let mut files: Vec<(&std::path::Path, Vec<&TestCase>)> = Vec::new();
            for test in tests {
                match files.iter_mut().find(|(path, _)| *path == test.file_path) {
                    Some((_, group)) => group.push(test),
                    None => files.push((test.file_path.as_path(), vec![test])),
                }
            }

            for (path, tests) in files {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy())
                    .unwrap_or_default();
                writeln!(self.stdout, "  {}: {} test(s)", stem, tests.len()).unwrap();
                for test in tests {
                    self.set_dim();
                    write!(self.stdout, "    - ").unwrap();
                    self.reset();
                    writeln!(self.stdout, "{}  {}", test.name, test.pattern).unwrap();
                }
            }
        }
    }
}
