// ABOUTME: Command-line entry point: file runner or interactive REPL

use clap::Parser;
use lambdora::error::{self, LambError};
use lambdora::repl;
use lambdora::session::{is_silent, Session};
use lambdora::value::Value;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

/// Lambdora, a small lambda-calculus Lisp
#[derive(Parser, Debug)]
#[command(name = "lambdora")]
#[command(version = lambdora::config::VERSION)]
#[command(about = "A lambda-calculus Lisp with tail-call trampolining, macros, and a REPL")]
struct CliArgs {
    /// Source file to run (starts the REPL when omitted)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Skip loading the standard prelude
    #[arg(long = "no-prelude")]
    no_prelude: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let session = if args.no_prelude {
        Ok(Session::bare())
    } else {
        Session::new()
    };
    let session = match session {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{}", error::render(&err));
            return ExitCode::FAILURE;
        }
    };

    match args.script {
        Some(path) => run_file(&session, &path),
        None => match repl::run(&session) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_file(session: &Session, path: &Path) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: cannot read {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let file = path.to_string_lossy();
    let result: Result<(), LambError> = session.run_source(&source, &file, |value| {
        if should_print(value) {
            println!("{value}");
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error::render(&err));
            ExitCode::FAILURE
        }
    }
}

/// File mode prints every non-nil result except the definition markers.
fn should_print(value: &Value) -> bool {
    if is_silent(value) {
        return false;
    }
    !matches!(value, Value::Str(s) if s == "<macro defined>")
}
