use anyhow::Context;
use clap::Parser;
use rayon::prelude::*;
use rexlite::cli::{Cli, Command};
use rexlite::discover::discover_suites;
use rexlite::error::load_corpus;
use rexlite::output::Output;
use rexlite::runner::{filter_tests, run_from_stdin, run_suite, ProgressEvent, SuiteResult};
use rexlite_engine::{Automaton, Compiler, Config};
use serde_json::json;
use std::io::Read;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

const EXIT_FAILED: i32 = 1;
const EXIT_COMPILE_ERROR: i32 = 2;

fn main() -> anyhow::Result<()> {
    // Reset SIGPIPE handler to default (terminate) so piping to head/tail works correctly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    let cli = Cli::parse();

    let use_color = !cli.no_color && atty::is(atty::Stream::Stdout);
    let mut output = Output::new(use_color);
    let config = cli.engine.config();
    let verbose = cli.verbose;

    let code = match cli.command {
        Command::Match {
            pattern,
            inputs,
            json,
        } => match compile(&pattern, config, &mut output) {
            Some(automaton) => match_inputs(&automaton, &inputs, json, verbose, &mut output),
            None => EXIT_COMPILE_ERROR,
        },
        Command::Find {
            pattern,
            inputs,
            json,
        } => match compile(&pattern, config, &mut output) {
            Some(automaton) => find_inputs(&automaton, &inputs, json, verbose, &mut output),
            None => EXIT_COMPILE_ERROR,
        },
        Command::Describe { pattern } => match compile(&pattern, config, &mut output) {
            Some(automaton) => {
                output.print_automaton(&automaton);
                0
            }
            None => EXIT_COMPILE_ERROR,
        },
        Command::Check {
            root,
            filter,
            list,
            sequential,
        } => {
            if list {
                list_tests(&root, filter.as_deref(), &mut output)?;
                0
            } else {
                let options = CheckOptions {
                    config,
                    filter: filter.as_deref(),
                    sequential,
                    verbose,
                    use_color,
                };
                check(&root, &options, &mut output)?
            }
        }
    };

    drop(output);
    std::process::exit(code);
}

fn compile(pattern: &str, config: Config, output: &mut Output) -> Option<Automaton> {
    match Compiler::new(config).compile(pattern) {
        Ok(automaton) => Some(automaton),
        Err(e) => {
            output.print_compile_error(pattern, &e);
            None
        }
    }
}

fn match_inputs(
    automaton: &Automaton,
    inputs: &[String],
    json: bool,
    verbose: u8,
    output: &mut Output,
) -> i32 {
    if verbose >= 2 && !json {
        output.print_automaton(automaton);
    }

    let mut all_matched = true;
    for input in inputs {
        let matched = automaton.is_match(input);
        all_matched &= matched;
        if json {
            output.print_json(&json!({
                "pattern": automaton.pattern(),
                "input": input,
                "matched": matched,
            }));
        } else {
            output.print_verdict(input, matched);
        }
    }

    if all_matched {
        0
    } else {
        EXIT_FAILED
    }
}

fn find_inputs(
    automaton: &Automaton,
    inputs: &[String],
    json: bool,
    verbose: u8,
    output: &mut Output,
) -> i32 {
    if verbose >= 2 && !json {
        output.print_automaton(automaton);
    }

    let mut all_found = true;
    for input in inputs {
        let span = automaton.find_span(input);
        all_found &= span.is_some();
        if json {
            output.print_json(&json!({
                "pattern": automaton.pattern(),
                "input": input,
                "start": span.map(|s| s.start),
                "end": span.map(|s| s.end),
            }));
        } else {
            output.print_span(input, span);
        }
    }

    if all_found {
        0
    } else {
        EXIT_FAILED
    }
}

struct CheckOptions<'a> {
    config: Config,
    filter: Option<&'a str>,
    sequential: bool,
    verbose: u8,
    use_color: bool,
}

fn check(root: &Path, options: &CheckOptions<'_>, output: &mut Output) -> anyhow::Result<i32> {
    let stdin_content = if root == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read corpus from stdin")?;
        Some(content)
    } else {
        None
    };

    let suites = match stdin_content {
        Some(_) => Vec::new(),
        None => {
            let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
            let suites = discover_suites(&root)?;
            if suites.is_empty() {
                eprintln!("No corpus files found");
                return Ok(EXIT_FAILED);
            }
            suites
        }
    };

    let start_time = Instant::now();

    let (progress_tx, progress_rx) = mpsc::channel::<ProgressEvent>();
    let verbose = options.verbose;
    let use_color = options.use_color;
    let progress_handle = thread::spawn(move || {
        let mut output = Output::new(use_color);
        for event in progress_rx {
            output.print_progress(&event, verbose);
        }
        output.finish_progress();
    });

    let (config, filter) = (options.config, options.filter);
    let results: Vec<SuiteResult> = if let Some(content) = &stdin_content {
        vec![run_from_stdin(content, config, filter, Some(&progress_tx))]
    } else if options.sequential || suites.len() == 1 {
        suites
            .iter()
            .map(|suite| run_suite(suite, config, filter, Some(&progress_tx)))
            .collect()
    } else {
        suites
            .par_iter()
            .map(|suite| {
                let tx = progress_tx.clone();
                run_suite(suite, config, filter, Some(&tx))
            })
            .collect()
    };

    drop(progress_tx);
    progress_handle
        .join()
        .map_err(|_| anyhow::anyhow!("progress printer thread panicked"))?;

    output.print_results(&results, start_time.elapsed(), verbose);

    let all_passed = results.iter().all(|r| r.passed());
    Ok(if all_passed { 0 } else { EXIT_FAILED })
}

fn list_tests(root: &Path, filter: Option<&str>, output: &mut Output) -> anyhow::Result<()> {
    let suites = discover_suites(root)?;

    let mut suite_tests = Vec::new();
    for suite in &suites {
        let mut all_tests = Vec::new();
        for file in suite.corpus_files() {
            let corpus = load_corpus(&file)?;
            all_tests.extend(filter_tests(&file, corpus.tests, filter));
        }

        if !all_tests.is_empty() || filter.is_none() {
            suite_tests.push((suite, all_tests));
        }
    }

    output.print_list(&suite_tests);
    Ok(())
}
