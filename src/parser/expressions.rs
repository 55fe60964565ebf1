//! Expression parsing
//!
//! Binary operators are parsed by precedence climbing over the table in
//! [`binary_operator`]. Everything that binds tighter than a binary operator
//! (prefix operators, casts, `sizeof`, postfix chains, primaries) is plain
//! recursive descent.
//!
//! ```text
//! expression  ::= conditional (assign_op expression)?
//! conditional ::= binary(1) ("?" expression ":" conditional)?
//! binary(p)   ::= unary (binop(q >= p) binary(q + 1))*
//! unary       ::= prefix_op unary | "+" unary | "(" type ")" unary
//!               | "sizeof" "(" (type | expression) ")" | postfix
//! postfix     ::= primary ("[" expression "]" | "." ident | "->" ident
//!               | "(" args ")" | "++" | "--")*
//! ```
//!
//! A brace list is not an expression. It is only accepted as the initializer
//! of a declaration, which `declarations` parses on its own.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{starts_type, ParseError, Parser};

/// Precedence of `||`, the loosest binary operator
const LOWEST_PRECEDENCE: u8 = 1;

/// Operator and precedence for a binary operator token; higher binds tighter
fn binary_operator(token: &Token) -> Option<(BinOp, u8)> {
    let entry = match token {
        Token::OrOr(_) => (BinOp::Or, 1),
        Token::AndAnd(_) => (BinOp::And, 2),
        Token::Pipe(_) => (BinOp::BitOr, 3),
        Token::Caret(_) => (BinOp::BitXor, 4),
        Token::Amp(_) => (BinOp::BitAnd, 5),
        Token::EqEq(_) => (BinOp::Eq, 6),
        Token::NotEq(_) => (BinOp::Ne, 6),
        Token::Lt(_) => (BinOp::Lt, 7),
        Token::Le(_) => (BinOp::Le, 7),
        Token::Gt(_) => (BinOp::Gt, 7),
        Token::Ge(_) => (BinOp::Ge, 7),
        Token::LtLt(_) => (BinOp::BitShl, 8),
        Token::GtGt(_) => (BinOp::BitShr, 8),
        Token::Plus(_) => (BinOp::Add, 9),
        Token::Minus(_) => (BinOp::Sub, 9),
        Token::Star(_) => (BinOp::Mul, 10),
        Token::Slash(_) => (BinOp::Div, 10),
        Token::Percent(_) => (BinOp::Mod, 10),
        _ => return None,
    };
    Some(entry)
}

enum Assign {
    Plain,
    Compound(BinOp),
}

fn assignment_operator(token: &Token) -> Option<Assign> {
    match token {
        Token::Eq(_) => Some(Assign::Plain),
        Token::PlusEq(_) => Some(Assign::Compound(BinOp::AddAssign)),
        Token::MinusEq(_) => Some(Assign::Compound(BinOp::SubAssign)),
        Token::StarEq(_) => Some(Assign::Compound(BinOp::MulAssign)),
        Token::SlashEq(_) => Some(Assign::Compound(BinOp::DivAssign)),
        Token::PercentEq(_) => Some(Assign::Compound(BinOp::ModAssign)),
        _ => None,
    }
}

fn prefix_operator(token: &Token) -> Option<UnOp> {
    match token {
        Token::Minus(_) => Some(UnOp::Neg),
        Token::Bang(_) => Some(UnOp::Not),
        Token::Tilde(_) => Some(UnOp::BitNot),
        Token::Amp(_) => Some(UnOp::AddrOf),
        Token::Star(_) => Some(UnOp::Deref),
        Token::PlusPlus(_) => Some(UnOp::PreInc),
        Token::MinusMinus(_) => Some(UnOp::PreDec),
        _ => None,
    }
}

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment()
    }

    /// Assignment and compound assignment, grouping to the right
    pub(crate) fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        let target = self.parse_conditional()?;
        let Some(assign) = assignment_operator(self.peek()) else {
            return Ok(target);
        };
        let location = self.advance().location();

        let lhs = Box::new(target);
        let rhs = Box::new(self.parse_assignment()?);
        Ok(match assign {
            Assign::Plain => AstNode::Assignment { lhs, rhs, location },
            Assign::Compound(op) => AstNode::CompoundAssignment {
                lhs,
                op,
                rhs,
                location,
            },
        })
    }

    /// `condition ? a : b`, where `b` may itself be a conditional
    fn parse_conditional(&mut self) -> Result<AstNode, ParseError> {
        let condition = self.parse_binary(LOWEST_PRECEDENCE)?;
        if !self.check(&Token::Question(self.current_location())) {
            return Ok(condition);
        }
        let location = self.advance().location();

        let true_expr = Box::new(self.parse_expression()?);
        self.expect_token(
            &Token::Colon(self.current_location()),
            "Expected ':' in conditional expression",
        )?;
        let false_expr = Box::new(self.parse_conditional()?);

        Ok(AstNode::TernaryOp {
            condition: Box::new(condition),
            true_expr,
            false_expr,
            location,
        })
    }

    /// Binary operators of at least `min_precedence`, grouping to the left
    fn parse_binary(&mut self, min_precedence: u8) -> Result<AstNode, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, precedence)) = binary_operator(self.peek()) {
            if precedence < min_precedence {
                break;
            }
            let location = self.advance().location();
            let right = self.parse_binary(precedence + 1)?;
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();

        if let Some(op) = prefix_operator(self.peek()) {
            self.advance();
            let operand = Box::new(self.parse_unary()?);
            return Ok(AstNode::UnaryOp {
                op,
                operand,
                location,
            });
        }

        match self.peek_token() {
            Token::Plus(_) => {
                self.advance();
                self.parse_unary()
            }
            Token::Sizeof(_) => {
                self.advance();
                self.parse_sizeof(location)
            }
            Token::LParen(_) if self.peek_ahead(1).is_some_and(starts_type) => self.parse_cast(),
            _ => self.parse_postfix(),
        }
    }

    /// `(type) operand`
    fn parse_cast(&mut self) -> Result<AstNode, ParseError> {
        self.expect_lparen("before cast type")?;
        let target_type = self.parse_type()?;
        self.expect_rparen("after cast type")?;
        let location = self.previous_location();

        let expr = Box::new(self.parse_unary()?);
        Ok(AstNode::Cast {
            target_type,
            expr,
            location,
        })
    }

    /// `sizeof(type)` or `sizeof(expression)`; the parentheses are required
    ///
    /// There are no typedefs, so a type keyword settles which form it is.
    fn parse_sizeof(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        self.expect_lparen("after 'sizeof'")?;
        let node = if self.at_type_start() {
            AstNode::SizeofType {
                target_type: self.parse_type()?,
                location,
            }
        } else {
            AstNode::SizeofExpr {
                expr: Box::new(self.parse_expression()?),
                location,
            }
        };
        self.expect_rparen("after sizeof operand")?;
        Ok(node)
    }

    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let location = self.current_location();
            expr = match self.peek_token() {
                Token::LBracket(_) => {
                    self.advance();
                    let index = Box::new(self.parse_expression()?);
                    self.expect_token(
                        &Token::RBracket(self.current_location()),
                        "Expected ']' after index",
                    )?;
                    AstNode::ArrayAccess {
                        array: Box::new(expr),
                        index,
                        location,
                    }
                }
                Token::Dot(_) | Token::Arrow(_) => {
                    let through_pointer = matches!(self.advance(), Token::Arrow(_));
                    let member = self.expect_identifier()?;
                    let object = Box::new(expr);
                    if through_pointer {
                        AstNode::PointerMemberAccess {
                            object,
                            member,
                            location,
                        }
                    } else {
                        AstNode::MemberAccess {
                            object,
                            member,
                            location,
                        }
                    }
                }
                Token::PlusPlus(_) | Token::MinusMinus(_) => {
                    let op = match self.advance() {
                        Token::PlusPlus(_) => UnOp::PostInc,
                        _ => UnOp::PostDec,
                    };
                    AstNode::UnaryOp {
                        op,
                        operand: Box::new(expr),
                        location,
                    }
                }
                Token::LParen(_) => self.parse_call(expr, location)?,
                _ => return Ok(expr),
            };
        }
    }

    /// Arguments of a call to `callee`, which must name a function or a
    /// variable holding one
    fn parse_call(&mut self, callee: AstNode, location: SourceLocation) -> Result<AstNode, ParseError> {
        let AstNode::Variable(name, _) = callee else {
            return Err(ParseError {
                message: "Only a named function can be called".to_string(),
                location,
            });
        };
        self.expect_lparen("before call arguments")?;

        let mut args = Vec::new();
        if !self.check(&Token::RParen(self.current_location())) {
            loop {
                args.push(self.parse_assignment()?);
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }
        self.expect_rparen("after call arguments")?;

        Ok(AstNode::FunctionCall {
            name,
            args,
            location,
        })
    }

    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let node = match self.peek_token() {
            Token::IntLiteral(n, loc) => AstNode::IntLiteral(n, loc),
            Token::FloatLiteral(v, loc) => AstNode::FloatLiteral(v, loc),
            Token::CharLiteral(c, loc) => AstNode::CharLiteral(c, loc),
            Token::Ident(name, loc) => AstNode::Variable(name, loc),
            Token::StringLiteral(mut text, loc) => {
                self.advance();
                // Adjacent literals concatenate
                while let Token::StringLiteral(next, _) = self.peek() {
                    text.push_str(next);
                    self.advance();
                }
                return Ok(AstNode::StringLiteral(text, loc));
            }
            Token::LParen(_) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_rparen("after parenthesized expression")?;
                return Ok(inner);
            }
            Token::LBrace(_) => {
                return self.error("A brace list may only initialize a declaration");
            }
            other => return self.error(format!("Expected an expression, found {}", other)),
        };
        self.advance();
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(source: &str) -> AstNode {
        let mut parser = Parser::new(source).expect("Parser creation failed");
        parser.parse_expression().expect("Parse failed")
    }

    fn parse_expr_err(source: &str) -> ParseError {
        let mut parser = Parser::new(source).expect("Parser creation failed");
        parser.parse_expression().expect_err("Parse should fail")
    }

    fn binary_op(node: &AstNode) -> BinOp {
        match node {
            AstNode::BinaryOp { op, .. } => *op,
            other => panic!("Expected binary operator, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence_levels() {
        match parse_expr("1 + 2 * 3") {
            AstNode::BinaryOp {
                op: BinOp::Add,
                right,
                ..
            } => assert_eq!(binary_op(&right), BinOp::Mul),
            other => panic!("Expected addition, got {:?}", other),
        }

        // && binds tighter than ||, shifts tighter than comparisons
        match parse_expr("a || b && c") {
            AstNode::BinaryOp {
                op: BinOp::Or,
                right,
                ..
            } => assert_eq!(binary_op(&right), BinOp::And),
            other => panic!("Expected ||, got {:?}", other),
        }
        match parse_expr("1 << 2 < 9") {
            AstNode::BinaryOp {
                op: BinOp::Lt,
                left,
                ..
            } => assert_eq!(binary_op(&left), BinOp::BitShl),
            other => panic!("Expected <, got {:?}", other),
        }
    }

    #[test]
    fn test_same_level_groups_left() {
        match parse_expr("10 - 4 - 3") {
            AstNode::BinaryOp {
                op: BinOp::Sub,
                left,
                right,
                ..
            } => {
                assert_eq!(binary_op(&left), BinOp::Sub);
                assert!(matches!(*right, AstNode::IntLiteral(3, _)));
            }
            other => panic!("Expected subtraction, got {:?}", other),
        }
    }

    #[test]
    fn test_assignments_group_right() {
        match parse_expr("a = b += 3") {
            AstNode::Assignment { rhs, .. } => assert!(matches!(
                *rhs,
                AstNode::CompoundAssignment {
                    op: BinOp::AddAssign,
                    ..
                }
            )),
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_conditional() {
        match parse_expr("a ? 1 : b ? 2 : 3") {
            AstNode::TernaryOp { false_expr, .. } => {
                assert!(matches!(*false_expr, AstNode::TernaryOp { .. }))
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_cast_and_parenthesized_variable() {
        assert!(matches!(parse_expr("(int)3.7"), AstNode::Cast { .. }));
        assert!(matches!(
            parse_expr("(string)name"),
            AstNode::Cast { ref target_type, .. } if target_type.base == BaseType::String
        ));
        assert!(matches!(parse_expr("(x) + 1"), AstNode::BinaryOp { .. }));
    }

    #[test]
    fn test_postfix_chain() {
        match parse_expr("people[1].age++") {
            AstNode::UnaryOp {
                op: UnOp::PostInc,
                operand,
                ..
            } => assert!(matches!(*operand, AstNode::MemberAccess { .. })),
            other => panic!("Expected post-increment, got {:?}", other),
        }
        assert!(matches!(parse_expr("p->next"), AstNode::PointerMemberAccess { .. }));
    }

    #[test]
    fn test_string_concatenation() {
        assert!(matches!(
            parse_expr(r#""ab" "cd""#),
            AstNode::StringLiteral(ref s, _) if s == "abcd"
        ));
    }

    #[test]
    fn test_sizeof_forms() {
        assert!(matches!(parse_expr("sizeof(union Data)"), AstNode::SizeofType { .. }));
        assert!(matches!(parse_expr("sizeof(string)"), AstNode::SizeofType { .. }));
        assert!(matches!(parse_expr("sizeof(arr)"), AstNode::SizeofExpr { .. }));
    }

    #[test]
    fn test_brace_list_is_not_an_expression() {
        let err = parse_expr_err("x = {1, 2}");
        assert!(err.message.contains("brace list"));
    }

    #[test]
    fn test_call_needs_a_name() {
        let err = parse_expr_err("table[0](1)");
        assert!(err.message.contains("named function"));
    }
}
