//! # Introduction
//!
//! csubset parses and executes a bounded subset of C by walking its syntax
//! tree. Programs talk to a [`io::Console`]: the process's standard streams
//! when run from the command line, or a [`io::CapturedConsole`] with scripted
//! input when embedded or tested.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter ⇄ IoChannel → Console
//! ```
//!
//! 1. [`parser`] tokenises the source and builds an AST.
//! 2. [`interpreter`] registers definitions, declares globals, then runs
//!    `main`, reporting failures as [`RuntimeError`]s.
//! 3. [`memory`] holds tagged [`memory::value::Value`]s in a scope
//!    [`memory::stack::Stack`], plus aggregate layouts.
//! 4. [`io`] implements `printf`/`scanf` formatting and line-based input.
//!
//! ## Supported C subset
//!
//! Types: `int`, `float`, `double`, `char`, `void`, `string`, structs,
//! unions, fixed-size arrays, pointers to named locations.
//! Control flow: `if/else`, `while`, `for`, `do-while`, `switch/case`,
//! `break`, `continue`, `return`.
//! Built-ins: `printf`, `scanf`, `gets`, `puts`, `sizeof`.
//!
//! ```no_run
//! use csubset::{CapturedConsole, Interpreter, InterpreterConfig, Parser};
//!
//! let source = r#"int main() { printf("%d\n", 6 * 7); return 0; }"#;
//! let program = Parser::new(source)?.parse_program()?;
//! let mut interpreter =
//!     Interpreter::with_console(program, InterpreterConfig::default(), CapturedConsole::new())?;
//! assert_eq!(interpreter.run()?, 0);
//! assert_eq!(interpreter.console().captured_output(), Some("42\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod interpreter;
pub mod io;
pub mod memory;
pub mod parser;

pub use interpreter::config::InterpreterConfig;
pub use interpreter::engine::Interpreter;
pub use interpreter::errors::RuntimeError;
pub use io::{CapturedConsole, Console, StdConsole};
pub use parser::{ParseError, Parser};
