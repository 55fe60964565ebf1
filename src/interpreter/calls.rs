//! Function calls
//!
//! A call name resolves in this order:
//!
//! 1. A variable in scope holding a function reference
//! 2. A user-defined function
//! 3. A built-in (`printf`, `scanf`, `gets`, `puts`)
//!
//! Arguments are evaluated left to right in the caller's scope, then bound as
//! the parameters of a fresh frame. Everything is passed by value; arrays and
//! structs are copied whole.

use crate::interpreter::builtins::Builtin;
use crate::interpreter::constants::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::stack::LocalVar;
use crate::memory::value::Value;
use crate::parser::ast::*;
use std::rc::Rc;
use tracing::debug;

/// Type a parameter is bound with once its argument is known
///
/// An unsized outer dimension (`int a[]`) and a `string` parameter take the
/// length of the array passed in.
fn binding_type(param_type: &Type, arg: &Value) -> Type {
    let Value::Array(elements) = arg else {
        return param_type.clone();
    };
    if param_type.base == BaseType::String && param_type.array_dims.is_empty() {
        let mut t = Type::new(BaseType::Char).with_array(Some(elements.len()));
        t.is_const = param_type.is_const;
        return t;
    }
    let mut t = param_type.clone();
    if t.array_dims.first() == Some(&None) {
        t.array_dims[0] = Some(elements.len());
    }
    t
}

impl Interpreter {
    pub(crate) fn evaluate_call(
        &mut self,
        name: &str,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let Ok(var) = self.stack.lookup(name) {
            let target = match &var.value {
                Value::Function(target) => target.clone(),
                Value::Uninitialized => {
                    return Err(RuntimeError::UninitializedRead {
                        var: name.to_string(),
                        location,
                    })
                }
                other => {
                    return Err(RuntimeError::type_mismatch(
                        format!("'{}' holds {} and cannot be called", name, other.kind_name()),
                        location,
                    ))
                }
            };
            return self.call_user(&target, args, location);
        }

        if self.functions.contains_key(name) {
            return self.call_user(name, args, location);
        }

        match Builtin::lookup(name) {
            Some(builtin) => self.call_builtin(builtin, args, location),
            None => Err(RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            }),
        }
    }

    fn call_user(
        &mut self,
        name: &str,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let function = self.functions.get(name).cloned().ok_or_else(|| {
            RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            }
        })?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.evaluate_expr(arg)?;
            if value == Value::Void {
                return Err(RuntimeError::type_mismatch(
                    format!("void value passed to '{}'", name),
                    arg.location(),
                ));
            }
            values.push(value);
        }
        self.invoke(function, values, location)
    }

    /// Run `function` with evaluated arguments in a new frame
    pub(crate) fn invoke(
        &mut self,
        function: Rc<FunctionDef>,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if args.len() != function.params.len() {
            return Err(RuntimeError::ArityMismatch {
                function: function.name.clone(),
                expected: function.params.len(),
                got: args.len(),
                location,
            });
        }

        let depth = self.stack.depth();
        if depth >= self.config.max_call_depth {
            return Err(RuntimeError::StackExhausted {
                function: function.name.clone(),
                limit: self.config.max_call_depth,
                location,
            });
        }
        debug!(function = %function.name, depth = depth + 1, "call");

        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.in_frame(&function.name, |interp| {
                for (param, arg) in function.params.iter().zip(args) {
                    if param.name.is_empty() {
                        continue;
                    }
                    let param_type = binding_type(&param.param_type, &arg);
                    let value = interp.coerce_value_to_type(arg, &param_type, location)?;
                    interp
                        .stack
                        .declare(&param.name, LocalVar::new(param_type, value))
                        .map_err(|e| RuntimeError::from_scope(e, function.location))?;
                }

                let flow = interp.execute_statements(&function.body)?;
                interp.finish_call(&function, flow)
            })
        })
    }

    /// Turn how the body ended into the call's value
    fn finish_call(&self, function: &FunctionDef, flow: ControlFlow) -> Result<Value, RuntimeError> {
        match flow {
            ControlFlow::Return(Some(value)) => {
                if function.return_type.is_void() {
                    return Err(RuntimeError::type_mismatch(
                        format!("void function '{}' returns a value", function.name),
                        function.location,
                    ));
                }
                self.coerce_value_to_type(value, &function.return_type, function.location)
            }
            ControlFlow::Return(None) | ControlFlow::Normal => Ok(Value::Void),
            ControlFlow::Break(at) => Err(RuntimeError::MisplacedJump {
                statement: "break",
                location: at,
            }),
            ControlFlow::Continue(at) => Err(RuntimeError::MisplacedJump {
                statement: "continue",
                location: at,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::config::InterpreterConfig;
    use crate::interpreter::test_support::{load, run_error, run_source};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_binding_type_completes_arrays() {
        let arg = Value::Array(vec![Value::Int(1); 4]);
        let param = Type::new(BaseType::Int).with_array(None);
        assert_eq!(binding_type(&param, &arg).array_dims, vec![Some(4)]);

        let string_param = Type::new(BaseType::String);
        assert_eq!(
            binding_type(&string_param, &arg),
            Type::new(BaseType::Char).with_array(Some(4))
        );
    }

    #[test]
    fn test_recursive_factorial() {
        let output = run_source(
            r#"
            int factorial(int n) {
                if (n <= 1) return 1;
                return n * factorial(n - 1);
            }
            int main() {
                printf("%d %d %d", factorial(0), factorial(1), factorial(5));
                return 0;
            }
            "#,
        );
        assert_eq!(output, "1 1 120");
    }

    #[test]
    fn test_call_depth_limit() {
        let source = "int down(int n) { return down(n + 1); } int main() { return down(0); }";
        let mut interpreter = load(source, InterpreterConfig::default().with_max_call_depth(64));
        let err = interpreter.run().unwrap_err();
        assert!(matches!(err, RuntimeError::StackExhausted { limit: 64, .. }));
        assert!(err.is_fatal());
        assert_eq!(interpreter.call_depth(), 0);
    }

    #[test]
    fn test_arity_mismatch() {
        let err = run_error("int add(int a, int b) { return a + b; } int main() { return add(1); }");
        assert!(matches!(
            err,
            RuntimeError::ArityMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_aggregates_pass_by_value() {
        let output = run_source(
            r#"
            struct Point { int x; int y; };
            void clobber(struct Point p, int a[]) { p.x = 99; a[0] = 99; }
            int main() {
                struct Point pt = {1, 2};
                int a[2] = {5, 6};
                clobber(pt, a);
                printf("%d %d", pt.x, a[0]);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "1 5");
    }

    #[test]
    fn test_callee_does_not_see_caller_locals() {
        let err = run_error("int peek() { return secret; } int main() { int secret = 1; return peek(); }");
        assert!(matches!(err, RuntimeError::UnboundName { ref name, .. } if name == "secret"));
    }

    #[test]
    fn test_function_reference_in_variable() {
        let output = run_source(
            r#"
            void greet() { printf("hi"); }
            int main() {
                void *f = greet;
                f();
                return 0;
            }
            "#,
        );
        assert_eq!(output, "hi");
    }

    #[test]
    fn test_void_function_returning_value() {
        let err = run_error("void f() { return 1; } int main() { f(); return 0; }");
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_undefined_function() {
        let err = run_error("int main() { return nothing(); }");
        assert!(matches!(err, RuntimeError::UndefinedFunction { .. }));
    }
}
