//! Unary operator evaluation

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter {
    pub(crate) fn evaluate_unary_op(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        use UnOp::*;

        match op {
            Neg => self.evaluate_neg_op(operand, location),
            Not => {
                let b = self.evaluate_condition(operand, location)?;
                Ok(Value::Int(if b { 0 } else { 1 }))
            }
            BitNot => {
                let val = self.evaluate_expr(operand)?;
                self.coerce_to_int(&val)
                    .map(|n| Value::Int(!n))
                    .ok_or_else(|| {
                        RuntimeError::type_mismatch(
                            format!("'~' requires an integer operand, found {}", val.kind_name()),
                            location,
                        )
                    })
            }
            PreInc | PreDec | PostInc | PostDec => self.evaluate_inc_dec_op(op, operand, location),
            Deref => self.evaluate_deref_op(operand, location),
            AddrOf => self.evaluate_addr_of_op(operand, location),
        }
    }

    fn evaluate_neg_op(
        &mut self,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let val = self.evaluate_expr(operand)?;
        match val {
            Value::Float(v) => Ok(Value::Float(-v)),
            ref other => match self.coerce_to_int(other) {
                Some(n) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| RuntimeError::IntegerOverflow {
                        operation: format!("-({})", n),
                        location,
                    }),
                None => Err(RuntimeError::type_mismatch(
                    format!("'-' requires a numeric operand, found {}", other.kind_name()),
                    location,
                )),
            },
        }
    }

    /// `++x`, `--x`, `x++`, `x--` on any numeric place
    fn evaluate_inc_dec_op(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let (place, target_type) = self.resolve_place(operand)?;
        if !target_type.is_numeric() {
            return Err(RuntimeError::type_mismatch(
                format!("cannot increment or decrement '{}'", target_type),
                location,
            ));
        }
        let current = self.read_operand(&place, location)?;
        let step = match op {
            UnOp::PreInc | UnOp::PostInc => BinOp::Add,
            _ => BinOp::Sub,
        };
        let updated = self.arithmetic(step, &current, &Value::Int(1), location)?;
        let stored = self.assign_to_place(&place, &target_type, updated, location)?;

        match op {
            UnOp::PreInc | UnOp::PreDec => Ok(stored),
            _ => Ok(current),
        }
    }

    fn evaluate_deref_op(
        &mut self,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let target = self.evaluate_pointer(operand, location)?;
        self.read_operand(&target, location)
    }

    fn evaluate_addr_of_op(
        &mut self,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let AstNode::Variable(name, _) = operand {
            if self.stack.resolve(name).is_none() && self.functions.contains_key(name) {
                return Ok(Value::Function(name.clone()));
            }
        }
        if !self.is_lvalue(operand) && !matches!(operand, AstNode::Variable(..)) {
            return Err(RuntimeError::type_mismatch(
                "cannot take the address of a temporary value",
                location,
            ));
        }
        let (place, _) = self.resolve_place(operand)?;
        Ok(Value::Pointer(place))
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::test_support::{run_error, run_source};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_increment_forms() {
        let output = run_source(
            r#"
            int main() {
                int i = 5;
                int a = i++;
                int b = ++i;
                int c = i--;
                int d = --i;
                printf("%d %d %d %d %d", a, b, c, d, i);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "5 7 7 5 5");
    }

    #[test]
    fn test_negation_and_not() {
        let output = run_source(
            r#"int main() { double x = 2.5; printf("%d %.1f %d %d %d", -3, -x, !0, !7, ~0); return 0; }"#,
        );
        assert_eq!(output, "-3 -2.5 1 0 -1");
    }

    #[test]
    fn test_pointer_round_trip() {
        let output = run_source(
            r#"
            void bump(int *p) { *p = *p + 10; }
            int main() {
                int n = 1;
                int *p = &n;
                bump(p);
                bump(&n);
                printf("%d %d", n, *p);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "21 21");
    }

    #[test]
    fn test_address_of_element() {
        let output = run_source(
            r#"
            int main() {
                int a[3] = {1, 2, 3};
                int *p = &a[1];
                *p = 20;
                printf("%d %d", a[1], p[0]);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "20 20");
    }

    #[test]
    fn test_address_of_temporary() {
        let err = run_error("int main() { int *p = &(1 + 2); return 0; }");
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_negating_min_overflows() {
        let err = run_error("int main() { int m = -2147483647 - 1; return -m; }");
        assert!(matches!(err, RuntimeError::IntegerOverflow { .. }));
    }

    #[test]
    fn test_dangling_pointer_does_not_alias_next_call() {
        let err = run_error(
            r#"
            int *p;
            void set() { int x = 5; p = &x; }
            void peek() { int x = 99; printf("%d", *p); }
            int main() { set(); peek(); return 0; }
            "#,
        );
        assert!(matches!(err, RuntimeError::InvalidReference { .. }));
    }

    #[test]
    fn test_pointer_into_finished_block() {
        let err = run_error(
            r#"
            int main() {
                int *p;
                int i;
                for (i = 0; i < 2; i++) {
                    int slot = i;
                    if (i == 0) p = &slot;
                    else printf("%d", *p);
                }
                return 0;
            }
            "#,
        );
        assert!(matches!(err, RuntimeError::InvalidReference { .. }));
    }
}
