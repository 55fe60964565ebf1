//! Statement execution implementation
//!
//! This module handles declarations and conditionals; loops live in
//! `loops`, while `return` and `switch` live in `jumps`.
//!
//! # Implementation
//!
//! All statement execution methods are implemented as `pub(crate)` methods
//! on the [`Interpreter`] struct, allowing them to access and modify the
//! interpreter's state (scopes, functions, console).
//!
//! # Declarations
//!
//! A declaration binds its name in the innermost open scope, or in the global
//! scope when no call is active. An array declared without a length
//! (`int a[] = {1, 2}`, `char s[] = "hi"`) takes the length of its
//! initializer.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::stack::LocalVar;
use crate::memory::value::Value;
use crate::parser::ast::*;

/// Fill an unsized outer dimension from the initializer's length
fn complete_type(var_type: &Type, init: Option<&AstNode>) -> Type {
    let mut complete = var_type.clone();
    if complete.array_dims.first() != Some(&None) {
        return complete;
    }
    let len = match init {
        Some(AstNode::InitList { elements, .. }) => Some(elements.len()),
        Some(AstNode::StringLiteral(text, _)) => Some(text.len() + 1),
        _ => None,
    };
    complete.array_dims[0] = len;
    complete
}

impl Interpreter {
    pub(crate) fn execute_var_decl(
        &mut self,
        name: &str,
        var_type: &Type,
        init: Option<&AstNode>,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if var_type.is_void() {
            return Err(RuntimeError::type_mismatch(
                format!("variable '{}' declared void", name),
                location,
            ));
        }

        let var_type = complete_type(var_type, init);
        if var_type.array_dims.contains(&None) {
            return Err(RuntimeError::type_mismatch(
                format!("array '{}' needs a length or an initializer", name),
                location,
            ));
        }

        let value = match init {
            Some(init) => self.evaluate_initializer(init, &var_type)?,
            None => self.declared_default(&var_type, location)?,
        };
        if value == Value::Void {
            return Err(RuntimeError::type_mismatch(
                format!("void value used to initialize '{}'", name),
                location,
            ));
        }

        self.stack
            .declare(name, LocalVar::new(var_type, value))
            .map_err(|e| RuntimeError::from_scope(e, location))?;
        Ok(())
    }

    pub(crate) fn execute_if(
        &mut self,
        condition: &AstNode,
        then_branch: &[AstNode],
        else_branch: Option<&[AstNode]>,
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        if self.evaluate_condition(condition, location)? {
            self.execute_block(then_branch)
        } else if let Some(else_stmts) = else_branch {
            self.execute_block(else_stmts)
        } else {
            Ok(ControlFlow::Normal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::test_support::{run_error, run_source};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_complete_type_from_initializer() {
        let t = Type::new(BaseType::Char).with_array(None);
        let init = AstNode::StringLiteral("hi".to_string(), SourceLocation::default());
        assert_eq!(complete_type(&t, Some(&init)).array_dims, vec![Some(3)]);

        let sized = Type::new(BaseType::Int).with_array(Some(4));
        assert_eq!(complete_type(&sized, None), sized);
    }

    #[test]
    fn test_block_shadowing() {
        let output = run_source(
            r#"
            int x = 1;
            int main() {
                printf("%d", x);
                int x = 2;
                {
                    int x = 3;
                    printf("%d", x);
                }
                printf("%d", x);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "132");
    }

    #[test]
    fn test_duplicate_declaration() {
        let err = run_error("int main() { int a = 1; int a = 2; return 0; }");
        assert!(matches!(
            err,
            RuntimeError::DuplicateDeclaration { ref name, .. } if name == "a"
        ));
    }

    #[test]
    fn test_if_else_chain() {
        let output = run_source(
            r#"
            void grade(int n) {
                if (n >= 90) printf("A");
                else if (n >= 80) printf("B");
                else printf("C");
            }
            int main() { grade(95); grade(85); grade(10); return 0; }
            "#,
        );
        assert_eq!(output, "ABC");
    }

    #[test]
    fn test_unsized_array_without_initializer() {
        let err = run_error("int main() { int a[]; return 0; }");
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }
}
