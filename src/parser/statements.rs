//! Statement parsing
//!
//! [`Parser::parse_statement`] dispatches on the leading token. A statement
//! that starts with a type is a local declaration; one that starts with no
//! statement keyword is an expression followed by `;`.
//!
//! The body of an `if`, `else`, loop or `for` is a braced block or a single
//! statement and is stored as a statement list either way. A lone declaration
//! is not a valid body.
//!
//! `break` and `continue` are accepted anywhere here; whether they sit inside
//! a loop or `switch` is checked when they execute.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// `{ statements }`; `what` names the block in error messages
    pub(crate) fn parse_braced(&mut self, what: &str) -> Result<Vec<AstNode>, ParseError> {
        self.expect_lbrace(&format!("before {}", what))?;
        let mut statements = Vec::new();
        while !self.match_token(&Token::RBrace(self.current_location())) {
            if self.is_at_end() {
                return self.error(format!("Unterminated {}", what));
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();

        match self.peek_token() {
            Token::If(_) => self.parse_if(location),
            Token::While(_) => self.parse_while(location),
            Token::Do(_) => self.parse_do_while(location),
            Token::For(_) => self.parse_for(location),
            Token::Switch(_) => self.parse_switch(location),
            Token::Return(_) => self.parse_return(location),
            Token::Break(_) | Token::Continue(_) => {
                let is_break = matches!(self.advance(), Token::Break(_));
                if is_break {
                    self.expect_semicolon("after 'break'")?;
                    Ok(AstNode::Break { location })
                } else {
                    self.expect_semicolon("after 'continue'")?;
                    Ok(AstNode::Continue { location })
                }
            }
            Token::LBrace(_) => Ok(AstNode::Block {
                statements: self.parse_braced("block")?,
                location,
            }),
            // Empty statement
            Token::Semicolon(_) => {
                self.advance();
                Ok(AstNode::Block {
                    statements: Vec::new(),
                    location,
                })
            }
            label @ (Token::Case(_) | Token::Default(_)) => {
                self.error(format!("{} label outside of a switch", label))
            }
            Token::Else(_) => self.error("'else' without a matching 'if'"),
            _ if self.at_type_start() => self.parse_local_declaration(),
            _ => self.parse_expression_statement(location),
        }
    }

    /// `type name [dims] [= initializer];` inside a function
    pub(crate) fn parse_local_declaration(&mut self) -> Result<AstNode, ParseError> {
        let start = self.current_location();
        let var_type = self.parse_type()?;
        let name = self.expect_identifier()?;
        if var_type.is_void() {
            return Err(ParseError {
                message: format!("Variable '{}' declared void", name),
                location: start,
            });
        }
        let location = self.previous_location();
        self.parse_variable_rest(var_type, name, location)
    }

    fn parse_expression_statement(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        let expr = Box::new(self.parse_expression()?);
        self.expect_semicolon("after expression")?;
        Ok(AstNode::ExpressionStatement { expr, location })
    }

    /// Body of a conditional or loop: a braced block or one statement
    fn parse_body(&mut self, what: &str) -> Result<Vec<AstNode>, ParseError> {
        if self.check(&Token::LBrace(self.current_location())) {
            return self.parse_braced(what);
        }
        if self.at_type_start() {
            return self.error(format!("A declaration as {} needs braces", what));
        }
        Ok(vec![self.parse_statement()?])
    }

    /// `( expression )` following `keyword`
    fn parse_condition(&mut self, keyword: &str) -> Result<Box<AstNode>, ParseError> {
        self.expect_lparen(&format!("after '{}'", keyword))?;
        let condition = self.parse_expression()?;
        self.expect_rparen(&format!("after {} condition", keyword))?;
        Ok(Box::new(condition))
    }

    fn parse_if(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        self.advance();
        let condition = self.parse_condition("if")?;
        let then_branch = self.parse_body("if branch")?;
        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            Some(self.parse_body("else branch")?)
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location,
        })
    }

    fn parse_while(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        self.advance();
        let condition = self.parse_condition("while")?;
        let body = self.parse_body("while body")?;
        Ok(AstNode::While {
            condition,
            body,
            location,
        })
    }

    fn parse_do_while(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        self.advance();
        let body = self.parse_body("do body")?;
        self.expect_token(
            &Token::While(self.current_location()),
            "Expected 'while' after do body",
        )?;
        let condition = self.parse_condition("while")?;
        self.expect_semicolon("after do-while")?;

        Ok(AstNode::DoWhile {
            body,
            condition,
            location,
        })
    }

    /// `for (init; condition; increment) body`, every clause optional
    fn parse_for(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        self.advance();
        self.expect_lparen("after 'for'")?;

        let init = self.parse_for_init()?;
        let condition = self.parse_optional_clause(&Token::Semicolon(self.current_location()))?;
        self.expect_semicolon("after for condition")?;
        let increment = self.parse_optional_clause(&Token::RParen(self.current_location()))?;
        self.expect_rparen("after for clauses")?;

        let body = self.parse_body("for body")?;
        Ok(AstNode::For {
            init,
            condition,
            increment,
            body,
            location,
        })
    }

    /// The init clause and its `;`: a declaration scoped to the loop, an
    /// expression, or nothing
    fn parse_for_init(&mut self) -> Result<Option<Box<AstNode>>, ParseError> {
        let location = self.current_location();
        if self.match_token(&Token::Semicolon(location)) {
            return Ok(None);
        }
        let init = if self.at_type_start() {
            self.parse_local_declaration()?
        } else {
            self.parse_expression_statement(location)?
        };
        Ok(Some(Box::new(init)))
    }

    /// An expression, or `None` when `end` comes first
    fn parse_optional_clause(&mut self, end: &Token) -> Result<Option<Box<AstNode>>, ParseError> {
        if self.check(end) {
            return Ok(None);
        }
        Ok(Some(Box::new(self.parse_expression()?)))
    }

    /// `switch (expr) { case v: ... default: ... }`
    ///
    /// Each label owns the statements up to the next label and execution
    /// falls through from one to the next. At most one `default` is allowed.
    fn parse_switch(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        self.advance();
        let expr = self.parse_condition("switch")?;
        self.expect_lbrace("before switch body")?;

        let mut cases = Vec::new();
        let mut has_default = false;
        while !self.match_token(&Token::RBrace(self.current_location())) {
            let label_location = self.current_location();
            let case = match self.peek_token() {
                Token::Case(_) => {
                    self.advance();
                    let value = Box::new(self.parse_expression()?);
                    self.expect_token(
                        &Token::Colon(self.current_location()),
                        "Expected ':' after case value",
                    )?;
                    CaseNode::Case {
                        value,
                        statements: self.parse_case_statements()?,
                        location: label_location,
                    }
                }
                Token::Default(_) => {
                    if has_default {
                        return self.error("Multiple 'default' labels in one switch");
                    }
                    has_default = true;
                    self.advance();
                    self.expect_token(
                        &Token::Colon(self.current_location()),
                        "Expected ':' after 'default'",
                    )?;
                    CaseNode::Default {
                        statements: self.parse_case_statements()?,
                        location: label_location,
                    }
                }
                other => {
                    return self.error(format!(
                        "Expected 'case' or 'default' in switch body, found {}",
                        other
                    ))
                }
            };
            cases.push(case);
        }

        Ok(AstNode::Switch {
            expr,
            cases,
            location,
        })
    }

    fn parse_case_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();
        while !matches!(
            self.peek(),
            Token::Case(_) | Token::Default(_) | Token::RBrace(_) | Token::Eof(_)
        ) {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_return(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        self.advance();
        let expr = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_semicolon("after return")?;
        Ok(AstNode::Return { expr, location })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(source: &str) -> Vec<AstNode> {
        let program = Parser::new(source)
            .expect("Parser creation failed")
            .parse_program()
            .expect("Parse failed");
        match program.nodes.into_iter().next() {
            Some(AstNode::FunctionDef { body, .. }) => body,
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    fn parse_err(source: &str) -> ParseError {
        Parser::new(source)
            .expect("Parser creation failed")
            .parse_program()
            .expect_err("Parse should fail")
    }

    #[test]
    fn test_for_clauses() {
        let body = body_of("void f() { for (int i = 0; i < 3; i++) ; for (;;) break; }");
        match &body[0] {
            AstNode::For {
                init: Some(init),
                condition: Some(_),
                increment: Some(_),
                ..
            } => assert!(matches!(**init, AstNode::VarDecl { ref name, .. } if name == "i")),
            other => panic!("Expected for loop, got {:?}", other),
        }
        assert!(matches!(
            &body[1],
            AstNode::For {
                init: None,
                condition: None,
                increment: None,
                ..
            }
        ));
    }

    #[test]
    fn test_for_expression_init() {
        let body = body_of("void f() { int i; for (i = 5; i > 0; i--) {} }");
        match &body[1] {
            AstNode::For { init: Some(init), .. } => {
                assert!(matches!(**init, AstNode::ExpressionStatement { .. }))
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_do_while_and_local_union() {
        let body = body_of("void f() { union Data d; do d.i = 1; while (0); }");
        assert!(matches!(
            &body[0],
            AstNode::VarDecl { var_type, .. } if var_type.base == BaseType::Union("Data".to_string())
        ));
        assert!(matches!(&body[1], AstNode::DoWhile { body, .. } if body.len() == 1));
    }

    #[test]
    fn test_switch_labels() {
        let body = body_of("void f(int n) { switch (n) { case 1: case 2: n = 0; break; default: n = 1; } }");
        match &body[0] {
            AstNode::Switch { cases, .. } => {
                assert_eq!(cases.len(), 3);
                assert!(cases[0].statements().is_empty());
                assert_eq!(cases[1].statements().len(), 2);
                assert!(matches!(cases[2], CaseNode::Default { .. }));
            }
            other => panic!("Expected switch, got {:?}", other),
        }
    }

    #[test]
    fn test_second_default_is_rejected() {
        let err = parse_err("void f(int n) { switch (n) { default: break; default: break; } }");
        assert!(err.message.contains("Multiple 'default'"));
    }

    #[test]
    fn test_declaration_body_needs_braces() {
        let err = parse_err("void f(int n) { if (n) int x = 1; }");
        assert!(err.message.contains("needs braces"));
    }

    #[test]
    fn test_stray_labels() {
        assert!(parse_err("void f() { case 1: return; }")
            .message
            .contains("outside of a switch"));
        assert!(parse_err("void f() { else return; }").message.contains("'else'"));
    }

    #[test]
    fn test_brace_list_only_in_declarations() {
        body_of("void f() { int a[2] = {1, 2}; string s = \"hi\"; }");
        let err = parse_err("void f() { int a[2]; a = {1, 2}; }");
        assert!(err.message.contains("brace list"));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_err("void f() { int x = 1;");
        assert!(err.message.contains("Unterminated function body"));
    }
}
