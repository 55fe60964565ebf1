//! Runtime error types for the C interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to parse errors or system errors).
//!
//! Every variant raised while evaluating a node carries that node's
//! [`SourceLocation`]. By the time an error reaches the caller of
//! [`Interpreter::run`](super::engine::Interpreter::run) every scope and
//! frame opened on the way down has already been popped.
//!
//! Only [`RuntimeError::StackExhausted`] is fatal (see [`RuntimeError::is_fatal`]);
//! the interpreter stays usable after any other error.

use crate::memory::stack::ScopeError;
use crate::memory::LayoutError;
use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Name resolves to neither a variable nor a function
    #[error("'{name}' is not declared at {location}")]
    UnboundName {
        name: String,
        location: SourceLocation,
    },

    /// Name already bound in the same scope, or function defined twice
    #[error("'{name}' is already declared in this scope at {location}")]
    DuplicateDeclaration {
        name: String,
        location: SourceLocation,
    },

    /// Function argument count mismatch
    #[error(
        "Function '{function}' expects {expected} argument{}, got {got} at {location}",
        plural(.expected)
    )]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
        location: SourceLocation,
    },

    /// Operand or stored value has the wrong kind
    #[error("Type mismatch at {location}: {message}")]
    TypeMismatch {
        message: String,
        location: SourceLocation,
    },

    /// Format string, its arguments, or formatted input disagree
    #[error("Format mismatch at {location}: {message}")]
    FormatMismatch {
        message: String,
        location: SourceLocation,
    },

    /// Array index outside `0..len`
    #[error("Index {index} out of range for array of length {len} at {location}")]
    IndexOutOfRange {
        index: i64,
        len: usize,
        location: SourceLocation,
    },

    /// Text does not fit a char buffer including its terminator
    #[error("{len} characters do not fit a buffer of {capacity} at {location}")]
    BufferOverflow {
        len: usize,
        capacity: usize,
        location: SourceLocation,
    },

    /// Call depth exceeded the configured maximum
    #[error("Call depth limit of {limit} exceeded calling '{function}' at {location}")]
    StackExhausted {
        function: String,
        limit: usize,
        location: SourceLocation,
    },

    /// Called name is neither a function nor a variable holding one
    #[error("Undefined function '{name}' at {location}")]
    UndefinedFunction {
        name: String,
        location: SourceLocation,
    },

    /// Attempted to read an uninitialized variable
    #[error("Read from uninitialized variable '{var}' at {location}")]
    UninitializedRead {
        var: String,
        location: SourceLocation,
    },

    /// Struct/union field not found
    #[error("{aggregate} has no member '{field}' at {location}")]
    MissingField {
        aggregate: String,
        field: String,
        location: SourceLocation,
    },

    /// Struct/union tag not defined
    #[error("Unknown aggregate type at {location}: {message}")]
    UnknownAggregate {
        message: String,
        location: SourceLocation,
    },

    /// Integer division or modulo by zero
    #[error("{operation} by zero at {location}")]
    DivisionByZero {
        operation: &'static str,
        location: SourceLocation,
    },

    /// Integer overflow in arithmetic operation
    #[error("Integer overflow in operation: {operation} at {location}")]
    IntegerOverflow {
        operation: String,
        location: SourceLocation,
    },

    /// Dereference of something that is not a live location
    #[error("Invalid reference at {location}: {message}")]
    InvalidReference {
        message: String,
        location: SourceLocation,
    },

    /// `break` / `continue` with no enclosing loop or switch
    #[error("'{statement}' outside of a loop or switch at {location}")]
    MisplacedJump {
        statement: &'static str,
        location: SourceLocation,
    },

    /// A read found no more input
    #[error("Input exhausted at {location}")]
    InputExhausted { location: SourceLocation },

    /// The console failed
    #[error("I/O error at {location}: {message}")]
    Io {
        message: String,
        location: SourceLocation,
    },

    /// Main function not found
    #[error("No main() function found")]
    NoMainFunction,
}

fn plural(n: &usize) -> &'static str {
    if *n == 1 {
        ""
    } else {
        "s"
    }
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::UnboundName { location, .. }
            | RuntimeError::DuplicateDeclaration { location, .. }
            | RuntimeError::ArityMismatch { location, .. }
            | RuntimeError::TypeMismatch { location, .. }
            | RuntimeError::FormatMismatch { location, .. }
            | RuntimeError::IndexOutOfRange { location, .. }
            | RuntimeError::BufferOverflow { location, .. }
            | RuntimeError::StackExhausted { location, .. }
            | RuntimeError::UndefinedFunction { location, .. }
            | RuntimeError::UninitializedRead { location, .. }
            | RuntimeError::MissingField { location, .. }
            | RuntimeError::UnknownAggregate { location, .. }
            | RuntimeError::DivisionByZero { location, .. }
            | RuntimeError::IntegerOverflow { location, .. }
            | RuntimeError::InvalidReference { location, .. }
            | RuntimeError::MisplacedJump { location, .. }
            | RuntimeError::InputExhausted { location }
            | RuntimeError::Io { location, .. } => Some(location),
            RuntimeError::NoMainFunction => None,
        }
    }

    /// Whether the interpreter must be abandoned after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, RuntimeError::StackExhausted { .. })
    }

    pub(crate) fn type_mismatch(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::TypeMismatch {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn format_mismatch(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::FormatMismatch {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn from_scope(err: ScopeError, location: SourceLocation) -> Self {
        match err {
            ScopeError::Duplicate(name) => RuntimeError::DuplicateDeclaration { name, location },
            ScopeError::Unbound(name) => RuntimeError::UnboundName { name, location },
        }
    }

    pub(crate) fn from_layout(err: LayoutError, location: SourceLocation) -> Self {
        match err {
            LayoutError::UnknownAggregate(..) => RuntimeError::UnknownAggregate {
                message: err.to_string(),
                location,
            },
            LayoutError::UnsizedArray(_) => RuntimeError::type_mismatch(err.to_string(), location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stack_exhaustion_is_fatal() {
        let loc = SourceLocation::new(3, 1);
        let exhausted = RuntimeError::StackExhausted {
            function: "factorial".to_string(),
            limit: 100,
            location: loc,
        };
        let division = RuntimeError::DivisionByZero {
            operation: "Division",
            location: loc,
        };

        assert!(exhausted.is_fatal());
        assert!(!division.is_fatal());
        assert_eq!(division.location(), Some(&loc));
    }

    #[test]
    fn test_messages() {
        let err = RuntimeError::ArityMismatch {
            function: "sum".to_string(),
            expected: 2,
            got: 1,
            location: SourceLocation::new(4, 9),
        };
        assert_eq!(
            err.to_string(),
            "Function 'sum' expects 2 arguments, got 1 at line 4, column 9"
        );
        assert_eq!(RuntimeError::NoMainFunction.location(), None);
    }
}
