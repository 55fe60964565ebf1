//! C interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: Interpreter state, program loading and the public entry points
//! - [`errors`]: Runtime error types
//! - [`config`]: Call depth and buffer limits
//!
//! # Execution Model
//!
//! The interpreter walks the AST directly. Statements report how they ended
//! through [`ControlFlow`](engine::ControlFlow); expressions yield a
//! [`Value`](crate::memory::value::Value) or, for assignable expressions, a
//! [`Place`](crate::memory::value::Place) that is read or written through the
//! scope stack.
//!
//! # Built-in Functions
//!
//! `printf`, `scanf`, `gets` and `puts` are resolved after user functions and
//! talk to the program's [`IoChannel`](crate::io::IoChannel).

pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;

mod builtins;
mod calls;
mod expressions;
mod jumps;
mod loops;
mod ops;
mod statements;
mod type_system;

#[cfg(test)]
pub(crate) mod test_support;
