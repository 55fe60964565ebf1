//! Declaration parsing implementation
//!
//! This module handles parsing of top-level declarations in C programs:
//!
//! - Struct and union definitions: `struct Name { ... };`, `union Name { ... };`
//! - Function definitions: `type name(params) { ... }`
//! - Function prototypes: `type name(params);` (accepted and dropped)
//! - Global variables: `type name [= init];`
//! - Type parsing: base types, pointers, arrays
//!
//! # Grammar
//!
//! ```text
//! declaration   ::= aggregate_def | function_def | prototype | global_var
//! aggregate_def ::= ("struct" | "union") identifier "{" field_list "}" ";"
//! function_def  ::= type identifier "(" params ")" "{" statements "}"
//! prototype     ::= type identifier "(" params ")" ";"
//! global_var    ::= type identifier array_dims* ("=" initializer)? ";"
//! type          ::= "const"? base_type "*"* array_dims*
//! ```
//!
//! Array dimensions must be integer constant expressions; after macro
//! expansion `int a[N * 2]` arrives as `IntLiteral * IntLiteral` and is
//! folded here.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a top-level declaration. Returns `None` for function prototypes.
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<Option<AstNode>, ParseError> {
        // Distinguish:
        //   struct Name { ... };     <- aggregate definition
        //   struct Name func(...)    <- function with struct return type
        //   struct Name var;         <- global of struct type
        if let Some(kind) = self.peek_aggregate_keyword() {
            let is_definition = matches!(self.peek_ahead(1), Some(Token::Ident(_, _)))
                && matches!(self.peek_ahead(2), Some(Token::LBrace(_)));
            if is_definition {
                self.advance(); // consume 'struct' / 'union'
                return self.parse_aggregate_definition(kind).map(Some);
            }
        }

        let start = self.current_location();
        let decl_type = self.parse_type()?;
        let name = self.expect_identifier()?;
        let loc = self.previous_location();

        if self.check(&Token::LParen(self.current_location())) {
            return self.parse_function_rest(decl_type, name, loc);
        }

        if decl_type.is_void() {
            return Err(ParseError {
                message: format!("Variable '{}' declared void", name),
                location: start,
            });
        }
        self.parse_variable_rest(decl_type, name, loc).map(Some)
    }

    fn peek_aggregate_keyword(&self) -> Option<AggregateKind> {
        match self.peek() {
            Token::Struct(_) => Some(AggregateKind::Struct),
            Token::Union(_) => Some(AggregateKind::Union),
            _ => None,
        }
    }

    /// Parse struct or union definition after its keyword: Name { fields };
    pub(crate) fn parse_aggregate_definition(
        &mut self,
        kind: AggregateKind,
    ) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();
        let keyword = match kind {
            AggregateKind::Struct => "struct",
            AggregateKind::Union => "union",
        };

        let name = self.expect_identifier()?;

        self.expect_lbrace(&format!("after {} name", keyword))?;

        let mut fields: Vec<Field> = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            let field_loc = self.current_location();
            let mut field_type = self.parse_type()?;
            let field_name = self.expect_identifier()?;
            self.parse_array_dims(&mut field_type)?;
            self.expect_semicolon(&format!("after {} field", keyword))?;

            if fields.iter().any(|f| f.name == field_name) {
                return Err(ParseError {
                    message: format!("Duplicate member '{}' in {} {}", field_name, keyword, name),
                    location: field_loc,
                });
            }
            fields.push(Field {
                name: field_name,
                field_type,
            });
        }

        self.expect_rbrace(&format!("after {} fields", keyword))?;
        self.expect_semicolon(&format!("after {} definition", keyword))?;

        Ok(AstNode::AggregateDef {
            kind,
            name,
            fields,
            location: loc,
        })
    }

    /// Parse the remainder of a function after `type name`: (params) { body } or (params);
    fn parse_function_rest(
        &mut self,
        return_type: Type,
        name: String,
        loc: SourceLocation,
    ) -> Result<Option<AstNode>, ParseError> {
        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(None);
        }

        let body = self.parse_braced("function body")?;

        Ok(Some(AstNode::FunctionDef {
            name,
            params,
            return_type,
            body,
            location: loc,
        }))
    }

    /// Parse parameter list: (type name, type name, ...)
    ///
    /// Names may be omitted, which is only meaningful in prototypes.
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        // Special case: (void) means no parameters in C
        if self.check(&Token::Void(self.current_location()))
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance();
            return Ok(params);
        }

        loop {
            let mut param_type = self.parse_type()?;
            let param_name = match self.peek_token() {
                Token::Ident(name, _) => {
                    self.advance();
                    name
                }
                _ => String::new(),
            };
            self.parse_array_dims(&mut param_type)?;
            params.push(Param {
                name: param_name,
                param_type,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse type: [const] base_type [*]* [[size]]*
    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        let is_const = self.match_token(&Token::Const(self.current_location()));

        let base = match self.peek_token() {
            Token::Struct(_) | Token::Union(_) => {
                let is_union = matches!(self.advance(), Token::Union(_));
                let name = self.expect_identifier()?;
                if is_union {
                    BaseType::Union(name)
                } else {
                    BaseType::Struct(name)
                }
            }
            token => {
                let base = match token {
                    Token::Int(_) => BaseType::Int,
                    Token::Float(_) => BaseType::Float,
                    Token::Double(_) => BaseType::Double,
                    Token::Char(_) => BaseType::Char,
                    Token::Void(_) => BaseType::Void,
                    Token::String(_) => BaseType::String,
                    other => return self.error(format!("Expected type, found {}", other)),
                };
                self.advance();
                base
            }
        };

        let mut var_type = Type::new(base);
        var_type.is_const = is_const;
        while self.match_token(&Token::Star(self.current_location())) {
            var_type.pointer_depth += 1;
        }
        self.parse_array_dims(&mut var_type)?;
        Ok(var_type)
    }

    /// Parse any number of `[N]` / `[]` suffixes onto `var_type`
    pub(crate) fn parse_array_dims(&mut self, var_type: &mut Type) -> Result<(), ParseError> {
        while self.match_token(&Token::LBracket(self.current_location())) {
            if self.match_token(&Token::RBracket(self.current_location())) {
                var_type.array_dims.push(None);
                continue;
            }

            let size_loc = self.current_location();
            let size_expr = self.parse_expression()?;
            match constant_int(&size_expr) {
                Some(n) if n > 0 => var_type.array_dims.push(Some(n as usize)),
                Some(n) => {
                    return Err(ParseError {
                        message: format!("Array size must be positive, got {}", n),
                        location: size_loc,
                    })
                }
                None => {
                    return Err(ParseError {
                        message: "Array size must be a constant integer".to_string(),
                        location: size_loc,
                    })
                }
            }
            self.expect_token(
                &Token::RBracket(self.current_location()),
                "Expected ']' after array size",
            )?;
        }
        Ok(())
    }

    /// Parse `[dims] [= init];` after the name of a declared variable
    pub(crate) fn parse_variable_rest(
        &mut self,
        mut var_type: Type,
        name: String,
        loc: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        self.parse_array_dims(&mut var_type)?;

        let init = if self.match_token(&Token::Eq(self.current_location())) {
            Some(Box::new(self.parse_initializer()?))
        } else {
            None
        };

        self.expect_semicolon("after variable declaration")?;

        Ok(AstNode::VarDecl {
            name,
            var_type,
            init,
            location: loc,
        })
    }

    /// Parse an initializer: an expression or a (possibly nested) brace list
    pub(crate) fn parse_initializer(&mut self) -> Result<AstNode, ParseError> {
        if !self.match_token(&Token::LBrace(self.current_location())) {
            return self.parse_assignment();
        }

        let location = self.previous_location();
        let mut elements = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) {
            elements.push(self.parse_initializer()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_rbrace("after initializer list")?;

        Ok(AstNode::InitList { elements, location })
    }
}

/// Fold an integer constant expression (literals, unary minus, + - * / %)
fn constant_int(expr: &AstNode) -> Option<i64> {
    match expr {
        AstNode::IntLiteral(n, _) => Some(i64::from(*n)),
        AstNode::CharLiteral(c, _) => Some(i64::from(*c)),
        AstNode::UnaryOp {
            op: UnOp::Neg,
            operand,
            ..
        } => constant_int(operand).map(|v| -v),
        AstNode::BinaryOp {
            op, left, right, ..
        } => {
            let (l, r) = (constant_int(left)?, constant_int(right)?);
            match op {
                BinOp::Add => l.checked_add(r),
                BinOp::Sub => l.checked_sub(r),
                BinOp::Mul => l.checked_mul(r),
                BinOp::Div => l.checked_div(r),
                BinOp::Mod => l.checked_rem(r),
                _ => None,
            }
        }
        _ => None,
    }
}
