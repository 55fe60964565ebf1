// Shared helpers for integration tests

#![allow(dead_code)]

use csubset::{CapturedConsole, Interpreter, InterpreterConfig, Parser, RuntimeError};

pub fn load(source: &str, input: &str, config: InterpreterConfig) -> Interpreter {
    let mut parser = Parser::new(source).expect("Parser creation failed");
    let program = parser.parse_program().expect("Parsing failed");
    Interpreter::with_console(program, config, CapturedConsole::with_input(input))
        .expect("Loading failed")
}

pub fn output(interpreter: &Interpreter) -> String {
    interpreter
        .console()
        .captured_output()
        .unwrap_or_default()
        .to_string()
}

/// Run `source` with `input` and return its exit status and output
pub fn run(source: &str, input: &str) -> (i32, String) {
    let mut interpreter = load(source, input, InterpreterConfig::default());
    let status = interpreter.run().expect("Execution failed");
    (status, output(&interpreter))
}

pub fn run_err(source: &str) -> RuntimeError {
    let mut interpreter = load(source, "", InterpreterConfig::default());
    interpreter.run().expect_err("Execution should fail")
}

/// Parse `source` and return the error loading it raises
pub fn load_err(source: &str) -> RuntimeError {
    let mut parser = Parser::new(source).expect("Parser creation failed");
    let program = parser.parse_program().expect("Parsing failed");
    match Interpreter::with_console(program, InterpreterConfig::default(), CapturedConsole::new()) {
        Ok(_) => panic!("Loading should fail"),
        Err(err) => err,
    }
}
