pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

use crate::interpreter::engine::Interpreter;
use crate::memory::value::Value;

/// Operand after C's usual arithmetic conversions
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Int(i32),
    Float(f64),
}

impl Interpreter {
    /// Helper to coerce numeric types (Char, Int) to i32
    #[inline]
    pub(crate) fn coerce_to_int(&self, value: &Value) -> Option<i32> {
        match value {
            Value::Int(n) => Some(*n),
            // Explicit cast to i32 handles sign extension for i8 (Char)
            Value::Char(c) => Some(*c as i32),
            _ => None,
        }
    }

    /// Promote a scalar for arithmetic: chars widen to int, floats stay floating
    #[inline]
    pub(crate) fn promote(&self, value: &Value) -> Option<Numeric> {
        match value {
            Value::Float(v) => Some(Numeric::Float(*v)),
            other => self.coerce_to_int(other).map(Numeric::Int),
        }
    }
}
