//! Helpers for running small programs in unit tests

use crate::interpreter::config::InterpreterConfig;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::io::CapturedConsole;
use crate::parser::parse::Parser;

/// Parse and load `source` against a console fed with `input`
pub(crate) fn load_with_input(source: &str, input: &str, config: InterpreterConfig) -> Interpreter {
    let program = Parser::new(source)
        .and_then(|mut parser| parser.parse_program())
        .unwrap_or_else(|e| panic!("parse failed: {}", e));
    Interpreter::with_console(program, config, CapturedConsole::with_input(input))
        .unwrap_or_else(|e| panic!("load failed: {}", e))
}

pub(crate) fn load(source: &str, config: InterpreterConfig) -> Interpreter {
    load_with_input(source, "", config)
}

fn output_of(interpreter: &Interpreter) -> String {
    interpreter
        .console()
        .captured_output()
        .unwrap_or_default()
        .to_string()
}

/// Run `source` to completion and return everything it printed
pub(crate) fn run_source(source: &str) -> String {
    run_source_with_input(source, "")
}

pub(crate) fn run_source_with_input(source: &str, input: &str) -> String {
    let mut interpreter = load_with_input(source, input, InterpreterConfig::default());
    if let Err(e) = interpreter.run() {
        panic!("run failed: {}\noutput so far: {:?}", e, output_of(&interpreter));
    }
    output_of(&interpreter)
}

/// Run `source` and return the error it must fail with
pub(crate) fn run_error(source: &str) -> RuntimeError {
    run_error_with_input(source, "")
}

pub(crate) fn run_error_with_input(source: &str, input: &str) -> RuntimeError {
    let mut interpreter = load_with_input(source, input, InterpreterConfig::default());
    match interpreter.run() {
        Ok(status) => panic!("expected an error, program exited with {}", status),
        Err(e) => e,
    }
}
