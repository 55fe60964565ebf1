use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::Numeric;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, BinOp, SourceLocation};

fn truth(b: bool) -> Value {
    Value::Int(i32::from(b))
}

impl Interpreter {
    fn invalid_operands(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> RuntimeError {
        RuntimeError::type_mismatch(
            format!(
                "invalid operands to '{}': {} and {}",
                op.symbol(),
                left.kind_name(),
                right.kind_name()
            ),
            location,
        )
    }

    /// `+ - * / %` after the usual arithmetic conversions
    ///
    /// Integer results are checked: overflow and division by zero are errors.
    /// Floating division by zero follows IEEE semantics.
    pub(crate) fn arithmetic(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let (Some(a), Some(b)) = (self.promote(left), self.promote(right)) else {
            return Err(self.invalid_operands(op, left, right, location));
        };

        match (a, b) {
            (Numeric::Int(a), Numeric::Int(b)) => {
                let result = match op {
                    BinOp::Add => a.checked_add(b),
                    BinOp::Sub => a.checked_sub(b),
                    BinOp::Mul => a.checked_mul(b),
                    BinOp::Div | BinOp::Mod => {
                        if b == 0 {
                            return Err(RuntimeError::DivisionByZero {
                                operation: if op == BinOp::Div { "Division" } else { "Modulo" },
                                location,
                            });
                        }
                        if op == BinOp::Div {
                            a.checked_div(b)
                        } else {
                            a.checked_rem(b)
                        }
                    }
                    _ => return Err(self.invalid_operands(op, left, right, location)),
                };
                result.map(Value::Int).ok_or_else(|| RuntimeError::IntegerOverflow {
                    operation: format!("{} {} {}", a, op.symbol(), b),
                    location,
                })
            }
            (a, b) => {
                let to_f64 = |n: Numeric| match n {
                    Numeric::Int(i) => f64::from(i),
                    Numeric::Float(v) => v,
                };
                let (a, b) = (to_f64(a), to_f64(b));
                match op {
                    BinOp::Add => Ok(Value::Float(a + b)),
                    BinOp::Sub => Ok(Value::Float(a - b)),
                    BinOp::Mul => Ok(Value::Float(a * b)),
                    BinOp::Div => Ok(Value::Float(a / b)),
                    BinOp::Mod => Err(RuntimeError::type_mismatch(
                        "'%' requires integer operands",
                        location,
                    )),
                    _ => Err(self.invalid_operands(op, left, right, location)),
                }
            }
        }
    }

    /// Relational and equality operators, yielding int 0/1
    #[inline]
    pub(crate) fn compare_values(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Pointer(a), Value::Pointer(b)) if matches!(op, BinOp::Eq | BinOp::Ne) => {
                return Ok(truth((a == b) == (op == BinOp::Eq)));
            }
            (Value::Function(a), Value::Function(b)) if matches!(op, BinOp::Eq | BinOp::Ne) => {
                return Ok(truth((a == b) == (op == BinOp::Eq)));
            }
            _ => {}
        }

        let ordering = match (self.promote(left), self.promote(right)) {
            (Some(Numeric::Int(a)), Some(Numeric::Int(b))) => a.partial_cmp(&b),
            (Some(a), Some(b)) => {
                let to_f64 = |n: Numeric| match n {
                    Numeric::Int(i) => f64::from(i),
                    Numeric::Float(v) => v,
                };
                to_f64(a).partial_cmp(&to_f64(b))
            }
            _ => return Err(self.invalid_operands(op, left, right, location)),
        };

        // NaN compares unequal to everything
        let Some(ordering) = ordering else {
            return Ok(truth(op == BinOp::Ne));
        };
        let result = match op {
            BinOp::Eq => ordering.is_eq(),
            BinOp::Ne => ordering.is_ne(),
            BinOp::Lt => ordering.is_lt(),
            BinOp::Le => ordering.is_le(),
            BinOp::Gt => ordering.is_gt(),
            BinOp::Ge => ordering.is_ge(),
            _ => return Err(self.invalid_operands(op, left, right, location)),
        };
        Ok(truth(result))
    }

    #[inline]
    pub(crate) fn bitwise_op(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let (Some(a), Some(b)) = (self.coerce_to_int(left), self.coerce_to_int(right)) else {
            return Err(self.invalid_operands(op, left, right, location));
        };

        let shift = |f: fn(i32, u32) -> Option<i32>| {
            u32::try_from(b)
                .ok()
                .and_then(|amount| f(a, amount))
                .ok_or_else(|| RuntimeError::IntegerOverflow {
                    operation: format!("{} {} {}", a, op.symbol(), b),
                    location,
                })
        };

        let result = match op {
            BinOp::BitAnd => a & b,
            BinOp::BitOr => a | b,
            BinOp::BitXor => a ^ b,
            BinOp::BitShl => shift(i32::checked_shl)?,
            BinOp::BitShr => shift(i32::checked_shr)?,
            _ => return Err(self.invalid_operands(op, left, right, location)),
        };
        Ok(Value::Int(result))
    }

    /// Apply a non-assigning binary operator to two evaluated operands
    pub(crate) fn apply_binary(
        &self,
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        use BinOp::*;

        match op {
            Add | Sub | Mul | Div | Mod => self.arithmetic(op, left, right, location),
            Eq | Ne | Lt | Le | Gt | Ge => self.compare_values(op, left, right, location),
            BitAnd | BitOr | BitXor | BitShl | BitShr => self.bitwise_op(op, left, right, location),
            And | Or => Ok(truth(
                if op == And {
                    Self::value_to_bool(left, location)? && Self::value_to_bool(right, location)?
                } else {
                    Self::value_to_bool(left, location)? || Self::value_to_bool(right, location)?
                },
            )),
            AddAssign | SubAssign | MulAssign | DivAssign | ModAssign => match op.arithmetic_part() {
                Some(part) => self.arithmetic(part, left, right, location),
                None => Err(self.invalid_operands(op, left, right, location)),
            },
        }
    }

    pub(crate) fn evaluate_binary_op(
        &mut self,
        op: BinOp,
        left: &AstNode,
        right: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            // The right operand only runs when the left one does not decide
            BinOp::And | BinOp::Or => {
                let left_true = self.evaluate_condition(left, location)?;
                if left_true == (op == BinOp::Or) {
                    return Ok(truth(left_true));
                }
                Ok(truth(self.evaluate_condition(right, location)?))
            }
            _ => {
                let left_val = self.evaluate_expr(left)?;
                let right_val = self.evaluate_expr(right)?;
                self.apply_binary(op, &left_val, &right_val, location)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::test_support::{run_error, run_source};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_arithmetic_truncates() {
        let output = run_source(
            r#"int main() { printf("%d %d %d %d", 7 / 2, -7 / 2, -7 % 3, 1 << 4 | 1); return 0; }"#,
        );
        assert_eq!(output, "3 -3 -1 17");
    }

    #[test]
    fn test_mixed_arithmetic_promotes() {
        let output = run_source(
            r#"int main() { char c = 'A'; printf("%d %f %d", c + 1, 1 / 2.0, 3 > 2.5); return 0; }"#,
        );
        assert_eq!(output, "66 0.500000 1");
    }

    #[test]
    fn test_short_circuit() {
        let output = run_source(
            r#"
            int calls = 0;
            int touch() { calls = calls + 1; return 1; }
            int main() {
                int a = 0 && touch();
                int b = 1 || touch();
                int c = 1 && touch();
                printf("%d %d %d %d", a, b, c, calls);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "0 1 1 1");
    }

    #[test]
    fn test_division_by_zero() {
        let err = run_error("int main() { int z = 0; return 5 / z; }");
        assert!(matches!(
            err,
            RuntimeError::DivisionByZero {
                operation: "Division",
                ..
            }
        ));
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = run_error("int main() { int big = 2147483647; return big + 1; }");
        assert!(matches!(err, RuntimeError::IntegerOverflow { .. }));
    }

    #[test]
    fn test_float_modulo_rejected() {
        let err = run_error("int main() { double x = 5.0; return x % 2; }");
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }
}
