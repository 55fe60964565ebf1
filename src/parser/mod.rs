//! C source code parser
//!
//! This module transforms C source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens), `#include` skipping and
//!   object-like `#define` expansion
//! - [`parse`]: The [`Parser`](parse::Parser) and its helpers, extended by the
//!   `declarations`, `statements` and `expressions` submodules
//! - [`ast`]: AST node definitions
//!
//! # Supported C Subset
//!
//! - Types: `int`, `float`, `double`, `char`, `void`, `string`, structs,
//!   unions, fixed-size arrays, pointers to named locations
//! - Statements: declarations (local and global), assignments, control flow
//!   (`if`, `while`, `do-while`, `for`, `switch`), `break`, `continue`, `return`
//! - Expressions: arithmetic, logical, bitwise, ternary, casts, `sizeof`,
//!   function calls, brace initializers
//! - No typedefs, enums, `goto` or function-like macros
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{ParseError, Parser};
