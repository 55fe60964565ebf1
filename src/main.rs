// csubset: run a C subset program against the terminal

use std::fs;
use std::path::Path;
use std::process;

use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use csubset::{Interpreter, InterpreterConfig, Parser};

fn usage(program_name: &str) -> ! {
    eprintln!("Usage: {} <file.c> [--max-depth N]", program_name);
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} demos/fixture.c            # Run the feature tour", program_name);
    eprintln!("  {} myprogram.c --max-depth 500", program_name);
    eprintln!();
    eprintln!("Set RUST_LOG=debug to trace calls on stderr.");
    process::exit(2);
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "error:".red().bold(), message);
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("csubset");

    let mut source_path = None;
    let mut config = InterpreterConfig::default();
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--max-depth" => match rest.next().and_then(|n| n.parse::<usize>().ok()) {
                Some(depth) if depth > 0 => config = config.with_max_call_depth(depth),
                _ => usage(program_name),
            },
            "-h" | "--help" => usage(program_name),
            path if source_path.is_none() => source_path = Some(path.to_string()),
            _ => usage(program_name),
        }
    }
    let Some(source_path) = source_path else {
        usage(program_name);
    };

    if !Path::new(&source_path).exists() {
        fail(format!("file '{}' not found", source_path));
    }
    let source = match fs::read_to_string(&source_path) {
        Ok(source) => source,
        Err(e) => fail(format!("cannot read '{}': {}", source_path, e)),
    };

    let program = match Parser::new(&source).and_then(|mut parser| parser.parse_program()) {
        Ok(program) => program,
        Err(e) => fail(e),
    };

    let status = Interpreter::new(program, config).and_then(|mut interpreter| interpreter.run());
    match status {
        Ok(status) => process::exit(status),
        Err(e) => fail(e),
    }
}
