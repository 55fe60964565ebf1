use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, CaseNode, SourceLocation};

impl Interpreter {
    pub(crate) fn execute_return(
        &mut self,
        expr: Option<&AstNode>,
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        let value = match expr {
            Some(ret_expr) => {
                let value = self.evaluate_expr(ret_expr)?;
                if value == Value::Void {
                    return Err(RuntimeError::type_mismatch(
                        "cannot return the result of a void function",
                        location,
                    ));
                }
                Some(value)
            }
            None => None,
        };
        Ok(ControlFlow::Return(value))
    }

    /// `switch`: the controlling value is computed once, execution starts at
    /// the first matching case (or `default`) and falls through until `break`.
    pub(crate) fn execute_switch(
        &mut self,
        expr: &AstNode,
        cases: &[CaseNode],
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        let switch_val = self.evaluate_expr(expr)?;
        let switch_int = self.integral_value(&switch_val, "switch", location)?;

        let mut match_index: Option<usize> = None;
        let mut default_index: Option<usize> = None;

        for (i, case) in cases.iter().enumerate() {
            match case {
                CaseNode::Case {
                    value,
                    location: case_location,
                    ..
                } => {
                    let case_val = self.evaluate_expr(value)?;
                    if self.integral_value(&case_val, "case", *case_location)? == switch_int {
                        match_index = Some(i);
                        break;
                    }
                }
                CaseNode::Default { .. } => {
                    default_index = Some(i);
                }
            }
        }

        let Some(start) = match_index.or(default_index) else {
            return Ok(ControlFlow::Normal);
        };

        self.in_scope(|interp| {
            for case in &cases[start..] {
                match interp.execute_statements(case.statements())? {
                    ControlFlow::Normal => {}
                    ControlFlow::Break(_) => return Ok(ControlFlow::Normal),
                    flow => return Ok(flow),
                }
            }
            Ok(ControlFlow::Normal)
        })
    }

    /// Integer value of a `switch` or `case` operand
    fn integral_value(
        &self,
        value: &Value,
        context: &str,
        location: SourceLocation,
    ) -> Result<i32, RuntimeError> {
        match value {
            Value::Int(n) => Ok(*n),
            Value::Char(c) => Ok(i32::from(*c)),
            other => Err(RuntimeError::type_mismatch(
                format!("{} value must be an integer, found {}", context, other.kind_name()),
                location,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::test_support::{run_error, run_source};
    use pretty_assertions::assert_eq;

    const SWITCH: &str = r#"
        int pick(int x) {
            int res = 0;
            switch (x) {
                case 1:
                    res = res + 1;
                case 2:
                    res = res + 10;
                    break;
                case 'a':
                    res = 97;
                    break;
                default:
                    res = 30;
            }
            return res;
        }
        int main() {
            printf("%d %d %d %d", pick(1), pick(2), pick(97), pick(5));
            return 0;
        }
    "#;

    #[test]
    fn test_switch_fallthrough_and_default() {
        assert_eq!(run_source(SWITCH), "11 10 97 30");
    }

    #[test]
    fn test_break_outside_loop() {
        let err = run_error("int main() { break; return 0; }");
        assert!(matches!(
            err,
            RuntimeError::MisplacedJump {
                statement: "break",
                ..
            }
        ));
    }

    #[test]
    fn test_continue_inside_switch_reaches_loop() {
        let output = run_source(
            r#"
            int main() {
                int i;
                for (i = 0; i < 3; i++) {
                    switch (i) {
                        case 1: continue;
                        default: break;
                    }
                    printf("%d", i);
                }
                return 0;
            }
            "#,
        );
        assert_eq!(output, "02");
    }
}
