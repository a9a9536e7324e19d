//! shellkit CLI entry point.
//!
//! Usage:
//!   shellkit                    # Interactive REPL
//!   shellkit -c <command>       # Execute one command and exit
//!   shellkit script.shell       # Run a script

use std::env;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shellkit_kernel::{Flow, Outcome, Shell, ShellConfig};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None => {
            let code = shellkit_repl::run(ShellConfig::default())?;
            Ok(exit_code(code))
        }

        Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!("shellkit {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }

        Some("-c") => {
            let cmd = args.get(2).context("-c requires a command argument")?;
            run_command(cmd)
        }

        Some(path) if !path.starts_with('-') => run_script(path),

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'shellkit --help' for usage.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_help() {
    println!(
        r#"shellkit v{}

Usage:
  shellkit                     Interactive REPL
  shellkit -c <command>        Execute one command and exit
  shellkit <script.shell>      Run a script file

Options:
  -c <command>                 Execute command string and exit
  -h, --help                   Show this help
  -V, --version                Show version

Examples:
  shellkit                     # Start interactive REPL
  shellkit -c 'echo 2+3*4'     # Evaluate an expression
  shellkit demo.shell          # Run a script
"#,
        env!("CARGO_PKG_VERSION")
    );
}

fn finish(outcome: Outcome) -> ExitCode {
    if !outcome.result.out.is_empty() {
        println!("{}", outcome.result.out);
    }
    if !outcome.result.err.is_empty() {
        eprintln!("{}", outcome.result.err);
    }
    match outcome.flow {
        Flow::Exit(code) => exit_code(code),
        Flow::Continue => exit_code(outcome.result.code),
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Execute a command string and exit.
fn run_command(cmd: &str) -> Result<ExitCode> {
    let mut shell =
        Shell::with_builtins(ShellConfig::default()).unwrap_or_else(|fatal| fatal.exit());
    match shell.run_line(cmd) {
        Ok(outcome) => Ok(finish(outcome)),
        Err(fatal) => fatal.exit(),
    }
}

/// Run a script file.
fn run_script(path: &str) -> Result<ExitCode> {
    let mut shell =
        Shell::with_builtins(ShellConfig::default()).unwrap_or_else(|fatal| fatal.exit());
    match shell.run_script(Path::new(path)) {
        Ok(outcome) => Ok(finish(outcome)),
        Err(fatal) => fatal.exit(),
    }
}
