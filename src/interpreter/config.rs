//! Interpreter settings

use crate::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_STRING_CAPACITY};

/// Limits applied to a running program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Maximum number of simultaneously active calls, `main` included
    pub max_call_depth: usize,
    /// Capacity of a `string` variable, terminator included
    pub string_capacity: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            string_capacity: DEFAULT_STRING_CAPACITY,
        }
    }
}

impl InterpreterConfig {
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_string_capacity(mut self, string_capacity: usize) -> Self {
        self.string_capacity = string_capacity;
        self
    }
}
