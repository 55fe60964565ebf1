use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{Place, Value};
use crate::parser::ast::{AstNode, BinOp, SourceLocation, Type};

impl Interpreter {
    /// Convert `value` to `target_type` and store it, returning what was stored
    pub(crate) fn assign_to_place(
        &mut self,
        place: &Place,
        target_type: &Type,
        value: Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if target_type.is_const {
            return Err(RuntimeError::type_mismatch(
                format!("cannot assign to '{}' of type '{}'", place, target_type),
                location,
            ));
        }
        let value = self.coerce_value_to_type(value, target_type, location)?;
        self.write_place(place, value.clone(), location)?;
        Ok(value)
    }

    /// Read a place for use as an operand, rejecting uninitialized values
    pub(crate) fn read_operand(&self, place: &Place, location: SourceLocation) -> Result<Value, RuntimeError> {
        let value = self.read_place(place, location)?;
        if !value.is_initialized() {
            return Err(RuntimeError::UninitializedRead {
                var: place.to_string(),
                location,
            });
        }
        Ok(value)
    }

    /// `lhs = rhs`; the expression's value is the stored value
    pub(crate) fn evaluate_assignment(
        &mut self,
        lhs: &AstNode,
        rhs: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let (place, target_type) = self.resolve_place(lhs)?;
        let value = self.evaluate_expr(rhs)?;
        if value == Value::Void {
            return Err(RuntimeError::type_mismatch(
                "void value used in assignment",
                location,
            ));
        }
        self.assign_to_place(&place, &target_type, value, location)
    }

    /// `lhs op= rhs`
    pub(crate) fn evaluate_compound_assignment(
        &mut self,
        lhs: &AstNode,
        op: BinOp,
        rhs: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let (place, target_type) = self.resolve_place(lhs)?;
        let current = self.read_operand(&place, location)?;
        let rhs_value = self.evaluate_expr(rhs)?;
        let result = self.apply_binary(op, &current, &rhs_value, location)?;
        self.assign_to_place(&place, &target_type, result, location)
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::test_support::{run_error, run_source};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assignment_is_an_expression() {
        let output = run_source(
            r#"
            int main() {
                int a;
                int b;
                a = b = 5;
                char c = 300;
                int t = 7.9;
                a += 2;
                b *= a;
                printf("%d %d %d %d", a, b, c, t);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "7 35 44 7");
    }

    #[test]
    fn test_compound_assignment_on_float() {
        let output = run_source(
            r#"int main() { float f = 1.5; f *= 2; f -= 0.25; printf("%.2f", f); return 0; }"#,
        );
        assert_eq!(output, "2.75");
    }

    #[test]
    fn test_const_is_read_only() {
        let err = run_error("int main() { const int k = 1; k = 2; return 0; }");
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_compound_on_uninitialized() {
        let err = run_error("int main() { int n; n += 1; return 0; }");
        assert!(matches!(err, RuntimeError::UninitializedRead { .. }));
    }
}
