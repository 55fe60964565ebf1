//! Built-in function implementations
//!
//! This module provides the C library functions that are handled by the
//! interpreter rather than being defined in user code. A user function with
//! the same name takes precedence.
//!
//! # Supported Built-ins
//!
//! - `printf(format, ...)`: formatted output, returns the number of bytes written
//! - `scanf(format, ...)`: formatted input into `&var` targets or char buffers,
//!   returns the number of values stored; a conversion that fails after
//!   earlier ones succeeded stops the read without an error
//! - `gets(buffer)`: reads one line into a char buffer
//! - `puts(text)`: writes text and a newline
//!
//! # Implementation Notes
//!
//! - Formatting and parsing live in [`crate::io::format`]; this module only
//!   resolves arguments and stores results
//! - Text read into a char buffer must fit with its terminator, otherwise the
//!   call fails with [`RuntimeError::BufferOverflow`]

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::io::format::{parse_scan_format, scan_conversion_count};
use crate::io::ChannelError;
use crate::memory::value::{Place, Value};
use crate::parser::ast::{AstNode, SourceLocation, Type, UnOp};
use tracing::debug;

/// Library functions known to the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Printf,
    Scanf,
    Gets,
    Puts,
}

impl Builtin {
    pub(crate) fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "printf" => Some(Builtin::Printf),
            "scanf" => Some(Builtin::Scanf),
            "gets" => Some(Builtin::Gets),
            "puts" => Some(Builtin::Puts),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Builtin::Printf => "printf",
            Builtin::Scanf => "scanf",
            Builtin::Gets => "gets",
            Builtin::Puts => "puts",
        }
    }
}

fn channel_error(err: ChannelError, location: SourceLocation) -> RuntimeError {
    match err {
        ChannelError::FormatMismatch(message) => RuntimeError::FormatMismatch { message, location },
        ChannelError::InputExhausted => RuntimeError::InputExhausted { location },
        ChannelError::Io(message) => RuntimeError::Io { message, location },
    }
}

fn overflow(text: &str, capacity: usize, location: SourceLocation) -> RuntimeError {
    RuntimeError::BufferOverflow {
        len: text.len(),
        capacity,
        location,
    }
}

impl Interpreter {
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match builtin {
            Builtin::Printf => self.builtin_printf(args, location),
            Builtin::Scanf => self.builtin_scanf(args, location),
            Builtin::Gets => {
                self.expect_args(builtin, args, 1, location)?;
                self.builtin_gets(&args[0], location)
            }
            Builtin::Puts => {
                self.expect_args(builtin, args, 1, location)?;
                self.builtin_puts(&args[0], location)
            }
        }
    }

    fn expect_args(
        &self,
        builtin: Builtin,
        args: &[AstNode],
        expected: usize,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if args.len() == expected {
            return Ok(());
        }
        Err(RuntimeError::ArityMismatch {
            function: builtin.name().to_string(),
            expected,
            got: args.len(),
            location,
        })
    }

    /// Evaluate an argument that must be text: a char array or a pointer to one
    fn string_argument(&mut self, arg: &AstNode, location: SourceLocation) -> Result<String, RuntimeError> {
        let value = match self.evaluate_expr(arg)? {
            Value::Pointer(target) => self.read_place(&target, location)?,
            other => other,
        };
        value.as_c_string().ok_or_else(|| {
            RuntimeError::type_mismatch(
                format!("expected a string, found {}", value.kind_name()),
                location,
            )
        })
    }

    pub(crate) fn builtin_printf(
        &mut self,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let Some((format_arg, rest)) = args.split_first() else {
            return Err(RuntimeError::ArityMismatch {
                function: "printf".to_string(),
                expected: 1,
                got: 0,
                location,
            });
        };
        let format = self.string_argument(format_arg, location)?;

        let mut arg_values = Vec::with_capacity(rest.len());
        for arg in rest {
            let value = match self.evaluate_expr(arg)? {
                // `%s` may be handed a pointer to a char buffer, e.g. from gets
                Value::Pointer(target) => match self.read_place(&target, location)? {
                    array @ Value::Array(_) => array,
                    _ => Value::Pointer(target),
                },
                other => other,
            };
            arg_values.push(value);
        }

        let written = self
            .io
            .write_formatted(&format, &arg_values)
            .map_err(|e| channel_error(e, location))?;
        Ok(Value::Int(i32::try_from(written).unwrap_or(i32::MAX)))
    }

    /// Where a `scanf` conversion stores its value
    fn scan_target(&mut self, arg: &AstNode, location: SourceLocation) -> Result<(Place, Type), RuntimeError> {
        match arg {
            AstNode::UnaryOp {
                op: UnOp::AddrOf,
                operand,
                ..
            } => self.resolve_place(operand),
            _ if self.is_lvalue(arg) => {
                let (place, t) = self.resolve_place(arg)?;
                if t.is_char_buffer() {
                    return Ok((place, t));
                }
                match self.read_place(&place, location)? {
                    Value::Pointer(target) => {
                        let target_type = self.place_type(&target, location)?;
                        Ok((target, target_type))
                    }
                    _ => Err(RuntimeError::type_mismatch(
                        format!("scanf needs the address of '{}'", place),
                        location,
                    )),
                }
            }
            _ => match self.evaluate_expr(arg)? {
                Value::Pointer(target) => {
                    let target_type = self.place_type(&target, location)?;
                    Ok((target, target_type))
                }
                other => Err(RuntimeError::type_mismatch(
                    format!("scanf target must be an address, found {}", other.kind_name()),
                    location,
                )),
            },
        }
    }

    pub(crate) fn builtin_scanf(
        &mut self,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let Some((format_arg, rest)) = args.split_first() else {
            return Err(RuntimeError::ArityMismatch {
                function: "scanf".to_string(),
                expected: 1,
                got: 0,
                location,
            });
        };
        let format = self.string_argument(format_arg, location)?;

        let directives = parse_scan_format(&format).map_err(|e| channel_error(e, location))?;
        let conversions = scan_conversion_count(&directives);
        if conversions != rest.len() {
            return Err(RuntimeError::format_mismatch(
                format!(
                    "format has {} conversion(s) but {} target(s) were given",
                    conversions,
                    rest.len()
                ),
                location,
            ));
        }

        let mut targets = Vec::with_capacity(rest.len());
        for arg in rest {
            targets.push(self.scan_target(arg, location)?);
        }

        // A conversion that fails after others succeeded ends the read early;
        // what was converted is still stored and counted
        let values = match self.io.read_formatted(&format) {
            Ok(values) => values,
            Err(failure) if failure.read.is_empty() => return Err(channel_error(failure.error, location)),
            Err(failure) => {
                debug!(read = failure.read.len(), error = %failure.error, "scanf stopped early");
                failure.read
            }
        };

        let mut stored = 0;
        for ((place, target_type), value) in targets.iter().zip(values) {
            let value = if target_type.is_char_buffer() {
                let text = value.as_c_string().ok_or_else(|| {
                    RuntimeError::format_mismatch(
                        format!("cannot read {} into '{}'", value.kind_name(), target_type),
                        location,
                    )
                })?;
                let capacity = self.place_len(place, location)?;
                Value::c_string(&text, capacity).ok_or_else(|| overflow(&text, capacity, location))?
            } else {
                value
            };
            self.assign_to_place(place, target_type, value, location)?;
            stored += 1;
        }
        Ok(Value::Int(stored))
    }

    /// Place of the char buffer `arg` designates
    fn buffer_target(&mut self, arg: &AstNode, location: SourceLocation) -> Result<(Place, Type), RuntimeError> {
        let (place, t) = if self.is_lvalue(arg) {
            let (place, t) = self.resolve_place(arg)?;
            if t.is_pointer() {
                let target = self.evaluate_pointer(arg, location)?;
                let target_type = self.place_type(&target, location)?;
                (target, target_type)
            } else {
                (place, t)
            }
        } else {
            let target = self.evaluate_pointer(arg, location)?;
            let target_type = self.place_type(&target, location)?;
            (target, target_type)
        };

        if !t.is_char_buffer() {
            return Err(RuntimeError::type_mismatch(
                format!("expected a char buffer, found '{}'", t),
                location,
            ));
        }
        Ok((place, t))
    }

    pub(crate) fn builtin_gets(&mut self, arg: &AstNode, location: SourceLocation) -> Result<Value, RuntimeError> {
        let (place, target_type) = self.buffer_target(arg, location)?;
        let capacity = self.place_len(&place, location)?;

        let line = self.io.read_line().map_err(|e| channel_error(e, location))?;
        let value = Value::c_string(&line, capacity).ok_or_else(|| overflow(&line, capacity, location))?;
        self.assign_to_place(&place, &target_type, value, location)?;
        Ok(Value::Pointer(place))
    }

    pub(crate) fn builtin_puts(&mut self, arg: &AstNode, location: SourceLocation) -> Result<Value, RuntimeError> {
        let text = self.string_argument(arg, location)?;
        self.io
            .write_line(&text)
            .map_err(|e| channel_error(e, location))?;
        Ok(Value::Int(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::test_support::{
        run_error, run_error_with_input, run_source, run_source_with_input,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup() {
        assert_eq!(Builtin::lookup("gets"), Some(Builtin::Gets));
        assert_eq!(Builtin::lookup("malloc"), None);
    }

    #[test]
    fn test_printf_returns_bytes_written() {
        let output = run_source(
            r#"int main() { int n = printf("%5.2f|%-3d|", 3.14159, 7); printf("%d", n); return 0; }"#,
        );
        assert_eq!(output, " 3.14|7  |10");
    }

    #[test]
    fn test_scanf_into_scalars_and_buffer() {
        let output = run_source_with_input(
            r#"
            int main() {
                int n;
                float f;
                char word[8];
                int count = scanf("%d %f %s", &n, &f, word);
                printf("%d %d %.1f %s", count, n, f, word);
                return 0;
            }
            "#,
            "12 2.5 apple\n",
        );
        assert_eq!(output, "3 12 2.5 apple");
    }

    #[test]
    fn test_scanf_then_gets_starts_fresh_line() {
        let output = run_source_with_input(
            r#"
            int main() {
                int age;
                string name;
                scanf("%d", &age);
                gets(name);
                puts(name);
                printf("%d", age);
                return 0;
            }
            "#,
            "42\nhello world\n",
        );
        assert_eq!(output, "hello world\n42");
    }

    #[test]
    fn test_scanf_keeps_values_read_before_a_mismatch() {
        let output = run_source_with_input(
            r#"
            int main() {
                int a;
                int b = 0;
                int n = scanf("%d %d", &a, &b);
                printf("%d %d %d", n, a, b);
                return 0;
            }
            "#,
            "1 x\n",
        );
        assert_eq!(output, "1 1 0");
    }

    #[test]
    fn test_gets_overflow() {
        let err = run_error_with_input("int main() { char s[4]; gets(s); return 0; }", "toolong\n");
        assert!(matches!(
            err,
            RuntimeError::BufferOverflow {
                len: 7,
                capacity: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_scanf_target_count_mismatch() {
        let err = run_error("int main() { int a; scanf(\"%d %d\", &a); return 0; }");
        assert!(matches!(err, RuntimeError::FormatMismatch { .. }));
    }

    #[test]
    fn test_input_exhausted() {
        let err = run_error("int main() { int a; scanf(\"%d\", &a); return 0; }");
        assert!(matches!(err, RuntimeError::InputExhausted { .. }));
    }

    #[test]
    fn test_printf_mismatched_argument() {
        let err = run_error(r#"int main() { printf("%d", "text"); return 0; }"#);
        assert!(matches!(err, RuntimeError::FormatMismatch { .. }));
    }
}
