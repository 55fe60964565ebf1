//! Expression evaluation implementation
//!
//! This module dispatches every C expression type:
//!
//! - Literals (integers, floating, characters, strings)
//! - Variables and function names
//! - Assignment and compound assignment (see `ops::assign`)
//! - Binary and unary operators (see `ops::binary` and `ops::unary`)
//! - Array subscripting and member access (see `ops::access`)
//! - Function calls, user-defined or built-in
//! - Type casts and the `sizeof` operator
//!
//! # Recursion
//!
//! Nested expressions recurse on the native stack. [`Interpreter::evaluate_expr`]
//! runs under [`stacker::maybe_grow`] so deeply nested source cannot overflow
//! the host thread.

use crate::interpreter::constants::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system::convert_scalar;
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_expr_inner(expr))
    }

    fn evaluate_expr_inner(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        match expr {
            AstNode::IntLiteral(n, _) => Ok(Value::Int(*n)),

            AstNode::FloatLiteral(v, _) => Ok(Value::Float(*v)),

            AstNode::CharLiteral(c, _) => Ok(Value::Char(*c)),

            AstNode::StringLiteral(s, _) => Ok(Value::Array(
                s.bytes()
                    .map(|b| Value::Char(b as i8))
                    .chain(std::iter::once(Value::Char(0)))
                    .collect(),
            )),

            AstNode::Variable(name, loc) => self.evaluate_variable(name, *loc),

            AstNode::InitList { location, .. } => Err(RuntimeError::type_mismatch(
                "brace initializer outside of a declaration",
                *location,
            )),

            AstNode::Assignment { lhs, rhs, location } => {
                self.evaluate_assignment(lhs, rhs, *location)
            }

            AstNode::CompoundAssignment {
                lhs,
                op,
                rhs,
                location,
            } => self.evaluate_compound_assignment(lhs, *op, rhs, *location),

            AstNode::BinaryOp {
                op,
                left,
                right,
                location,
            } => self.evaluate_binary_op(*op, left, right, *location),

            AstNode::UnaryOp {
                op,
                operand,
                location,
            } => self.evaluate_unary_op(*op, operand, *location),

            AstNode::TernaryOp {
                condition,
                true_expr,
                false_expr,
                location,
            } => {
                if self.evaluate_condition(condition, *location)? {
                    self.evaluate_expr(true_expr)
                } else {
                    self.evaluate_expr(false_expr)
                }
            }

            AstNode::FunctionCall {
                name,
                args,
                location,
            } => self.evaluate_call(name, args, *location),

            AstNode::ArrayAccess { .. }
            | AstNode::MemberAccess { .. }
            | AstNode::PointerMemberAccess { .. } => self.evaluate_access(expr),

            AstNode::Cast {
                target_type,
                expr: inner,
                location,
            } => {
                let value = self.evaluate_expr(inner)?;
                self.cast_value(value, target_type, *location)
            }

            AstNode::SizeofType {
                target_type,
                location,
            } => self.sizeof_result(target_type, *location),

            AstNode::SizeofExpr {
                expr: inner,
                location,
            } => {
                let t = self.infer_expr_type(inner)?;
                self.sizeof_result(&t, *location)
            }

            other => Err(RuntimeError::type_mismatch(
                "statement used where an expression is expected",
                other.location(),
            )),
        }
    }

    /// A variable's current value, or a reference to the function it names
    fn evaluate_variable(&self, name: &str, location: SourceLocation) -> Result<Value, RuntimeError> {
        if let Ok(var) = self.stack.lookup(name) {
            if !var.value.is_initialized() {
                return Err(RuntimeError::UninitializedRead {
                    var: name.to_string(),
                    location,
                });
            }
            return Ok(var.value.clone());
        }
        if self.functions.contains_key(name) {
            return Ok(Value::Function(name.to_string()));
        }
        Err(RuntimeError::UnboundName {
            name: name.to_string(),
            location,
        })
    }

    /// Explicit conversion `(T)value`
    ///
    /// Unlike implicit conversion this never warns about truncation.
    fn cast_value(&self, value: Value, target: &Type, location: SourceLocation) -> Result<Value, RuntimeError> {
        if target.is_void() {
            return Ok(Value::Void);
        }
        if target.is_numeric() {
            return convert_scalar(&value, &target.base).ok_or_else(|| {
                RuntimeError::type_mismatch(
                    format!("cannot cast {} to '{}'", value.kind_name(), target),
                    location,
                )
            });
        }
        self.coerce_value_to_type(value, target, location)
    }

    fn sizeof_result(&self, t: &Type, location: SourceLocation) -> Result<Value, RuntimeError> {
        let size = self.size_of(t, location)?;
        i32::try_from(size).map(Value::Int).map_err(|_| RuntimeError::IntegerOverflow {
            operation: format!("sizeof({})", t),
            location,
        })
    }
}
