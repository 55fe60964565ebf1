//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//!
//! # Preprocessor handling
//!
//! The lexer is the only place preprocessor lines are seen:
//! - `#include` (and any other directive it does not know) is skipped
//! - `#define NAME tokens...` records an object-like macro; every later
//!   occurrence of `NAME` is replaced by the recorded tokens, re-stamped with
//!   the location of the use site
//!
//! Function-like macros (`#define F(x) ...`) are rejected with a [`LexError`].

use super::ast::SourceLocation;
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i32, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    CharLiteral(i8, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Keywords
    Int(SourceLocation),
    Float(SourceLocation),
    Double(SourceLocation),
    Char(SourceLocation),
    Void(SourceLocation),
    String(SourceLocation),
    Struct(SourceLocation),
    Union(SourceLocation),
    Const(SourceLocation),
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    Do(SourceLocation),
    For(SourceLocation),
    Switch(SourceLocation),
    Case(SourceLocation),
    Default(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    Return(SourceLocation),
    Sizeof(SourceLocation),

    // Operators (single and multi-character)
    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEq(SourceLocation),  // ==
    NotEq(SourceLocation), // !=
    Lt(SourceLocation),    // <
    Le(SourceLocation),    // <=
    Gt(SourceLocation),    // >
    Ge(SourceLocation),    // >=

    // Logical
    AndAnd(SourceLocation), // &&
    OrOr(SourceLocation),   // ||
    Bang(SourceLocation),   // !

    // Bitwise
    Amp(SourceLocation),   // &
    Pipe(SourceLocation),  // |
    Caret(SourceLocation), // ^
    Tilde(SourceLocation), // ~
    LtLt(SourceLocation),  // <<
    GtGt(SourceLocation),  // >>

    // Assignment
    Eq(SourceLocation),        // =
    PlusEq(SourceLocation),    // +=
    MinusEq(SourceLocation),   // -=
    StarEq(SourceLocation),    // *=
    SlashEq(SourceLocation),   // /=
    PercentEq(SourceLocation), // %=

    // Increment/Decrement
    PlusPlus(SourceLocation),   // ++
    MinusMinus(SourceLocation), // --

    // Member access
    Dot(SourceLocation),   // .
    Arrow(SourceLocation), // ->

    // Ternary
    Question(SourceLocation), // ?
    Colon(SourceLocation),    // :

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::FloatLiteral(_, loc)
            | Token::CharLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc) => *loc,
            Token::Int(loc)
            | Token::Float(loc)
            | Token::Double(loc)
            | Token::Char(loc)
            | Token::Void(loc)
            | Token::String(loc)
            | Token::Struct(loc)
            | Token::Union(loc)
            | Token::Const(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::Do(loc)
            | Token::For(loc)
            | Token::Switch(loc)
            | Token::Case(loc)
            | Token::Default(loc)
            | Token::Break(loc)
            | Token::Continue(loc)
            | Token::Return(loc)
            | Token::Sizeof(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::Bang(loc)
            | Token::Amp(loc)
            | Token::Pipe(loc)
            | Token::Caret(loc)
            | Token::Tilde(loc)
            | Token::LtLt(loc)
            | Token::GtGt(loc)
            | Token::Eq(loc)
            | Token::PlusEq(loc)
            | Token::MinusEq(loc)
            | Token::StarEq(loc)
            | Token::SlashEq(loc)
            | Token::PercentEq(loc)
            | Token::PlusPlus(loc)
            | Token::MinusMinus(loc)
            | Token::Dot(loc)
            | Token::Arrow(loc)
            | Token::Question(loc)
            | Token::Colon(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }

    /// Table entry this token was lexed from, for keywords and punctuation
    fn table_entry(&self) -> Option<&'static (&'static str, fn(SourceLocation) -> Token)> {
        let kind = std::mem::discriminant(self);
        KEYWORDS
            .iter()
            .chain(PUNCTUATORS)
            .find(|(_, make)| std::mem::discriminant(&make(self.location())) == kind)
    }

    fn spelling(&self) -> Option<&'static str> {
        self.table_entry().map(|(text, _)| *text)
    }

    /// Copy of this token stamped with a different location.
    ///
    /// Used when splicing a macro body in at its use site.
    fn relocated(&self, at: SourceLocation) -> Token {
        match self {
            Token::IntLiteral(n, _) => Token::IntLiteral(*n, at),
            Token::FloatLiteral(n, _) => Token::FloatLiteral(*n, at),
            Token::CharLiteral(c, _) => Token::CharLiteral(*c, at),
            Token::StringLiteral(s, _) => Token::StringLiteral(s.clone(), at),
            Token::Ident(s, _) => Token::Ident(s.clone(), at),
            Token::Eof(_) => Token::Eof(at),
            other => match other.table_entry() {
                Some((_, make)) => make(at),
                None => other.clone(),
            },
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "int literal {}", n),
            Token::FloatLiteral(n, _) => write!(f, "float literal {}", n),
            Token::CharLiteral(c, _) => {
                let byte = *c as u8;
                if byte.is_ascii_graphic() || byte == b' ' {
                    write!(f, "char literal '{}'", byte as char)
                } else {
                    write!(f, "char literal '\\x{:02x}'", byte)
                }
            }
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Eof(_) => write!(f, "end of file"),
            other => match other.spelling() {
                Some(text) => write!(f, "'{}'", text),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

/// Lexer error type
#[derive(Debug, Error)]
#[error("Lexer error at {location}: {message}")]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Operators and punctuation, longest spelling first so `<<` wins over `<`
const PUNCTUATORS: &[(&str, fn(SourceLocation) -> Token)] = &[
    ("++", Token::PlusPlus),
    ("--", Token::MinusMinus),
    ("+=", Token::PlusEq),
    ("-=", Token::MinusEq),
    ("*=", Token::StarEq),
    ("/=", Token::SlashEq),
    ("%=", Token::PercentEq),
    ("->", Token::Arrow),
    ("==", Token::EqEq),
    ("!=", Token::NotEq),
    ("<=", Token::Le),
    (">=", Token::Ge),
    ("<<", Token::LtLt),
    (">>", Token::GtGt),
    ("&&", Token::AndAnd),
    ("||", Token::OrOr),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Star),
    ("/", Token::Slash),
    ("%", Token::Percent),
    ("=", Token::Eq),
    ("!", Token::Bang),
    ("<", Token::Lt),
    (">", Token::Gt),
    ("&", Token::Amp),
    ("|", Token::Pipe),
    ("^", Token::Caret),
    ("~", Token::Tilde),
    (".", Token::Dot),
    ("?", Token::Question),
    (":", Token::Colon),
    ("(", Token::LParen),
    (")", Token::RParen),
    ("{", Token::LBrace),
    ("}", Token::RBrace),
    ("[", Token::LBracket),
    ("]", Token::RBracket),
    (";", Token::Semicolon),
    (",", Token::Comma),
];

/// Reserved words and the token each one lexes to
const KEYWORDS: &[(&str, fn(SourceLocation) -> Token)] = &[
    ("int", Token::Int),
    ("float", Token::Float),
    ("double", Token::Double),
    ("char", Token::Char),
    ("void", Token::Void),
    ("string", Token::String),
    ("struct", Token::Struct),
    ("union", Token::Union),
    ("const", Token::Const),
    ("if", Token::If),
    ("else", Token::Else),
    ("while", Token::While),
    ("do", Token::Do),
    ("for", Token::For),
    ("switch", Token::Switch),
    ("case", Token::Case),
    ("default", Token::Default),
    ("break", Token::Break),
    ("continue", Token::Continue),
    ("return", Token::Return),
    ("sizeof", Token::Sizeof),
];

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    macros: FxHashMap<String, Vec<Token>>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            macros: FxHashMap::default(),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            if self.peek() == Some('#') {
                self.preprocessor_directive()?;
                continue;
            }

            match self.next_token()? {
                Token::Ident(name, loc) if self.macros.contains_key(&name) => {
                    if let Some(body) = self.macros.get(&name) {
                        tokens.extend(body.iter().map(|t| t.relocated(loc)));
                    }
                }
                token => tokens.push(token),
            }
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let Some(ch) = self.peek() else {
            return Err(LexError {
                message: "Unexpected end of file".to_string(),
                location: loc,
            });
        };

        if let Some((text, make)) = PUNCTUATORS
            .iter()
            .find(|(text, _)| self.input_starts_with(text))
        {
            for _ in 0..text.len() {
                self.advance();
            }
            return Ok(make(loc));
        }

        self.advance();
        match ch {
            '"' => self.string_literal(),
            '\'' => self.char_literal(),
            '0'..='9' => self.number_literal(ch),
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch),
            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    fn input_starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_ahead(i) == Some(c))
    }

    /// Parse string literal
    fn string_literal(&mut self) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance(); // consume closing quote
                return Ok(Token::StringLiteral(string, loc));
            }
            if ch == '\n' {
                break;
            }

            if ch == '\\' {
                self.advance();
                let escaped = self.advance().ok_or_else(|| LexError {
                    message: "Unexpected end of file in string literal".to_string(),
                    location: self.current_location(),
                })?;
                string.push(self.escape_sequence(escaped)? as u8 as char);
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse character literal
    fn char_literal(&mut self) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);

        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in character literal".to_string(),
            location: self.current_location(),
        })?;

        let value = if ch == '\\' {
            let escaped = self.advance().ok_or_else(|| LexError {
                message: "Unexpected end of file in character literal".to_string(),
                location: self.current_location(),
            })?;
            self.escape_sequence(escaped)?
        } else {
            ch as u32 as u8 as i8
        };

        // Expect closing quote
        if self.advance() != Some('\'') {
            return Err(LexError {
                message: "Expected closing quote in character literal".to_string(),
                location: self.current_location(),
            });
        }

        Ok(Token::CharLiteral(value, loc))
    }

    /// Decode the character after a backslash (shared by char and string literals)
    fn escape_sequence(&mut self, escaped: char) -> Result<i8, LexError> {
        let value = match escaped {
            'n' => b'\n',
            't' => b'\t',
            'r' => b'\r',
            'a' => 0x07,
            'b' => 0x08,
            'f' => 0x0c,
            'v' => 0x0b,
            '\\' => b'\\',
            '\'' => b'\'',
            '"' => b'"',
            '?' => b'?',
            '0' => 0,
            'x' => {
                // Hex escape: \xHH
                let mut hex_str = String::new();
                while hex_str.len() < 2 {
                    match self.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            hex_str.push(c);
                            self.advance();
                        }
                        _ => break,
                    }
                }
                u8::from_str_radix(&hex_str, 16).map_err(|_| LexError {
                    message: format!("Invalid hex escape sequence: \\x{}", hex_str),
                    location: self.current_location(),
                })?
            }
            _ => {
                return Err(LexError {
                    message: format!("Unknown escape sequence: \\{}", escaped),
                    location: self.current_location(),
                });
            }
        };
        Ok(value as i8)
    }

    /// Parse numeric literal: decimal or hex integers, and decimal floats
    /// with optional fraction, exponent and `f` suffix
    fn number_literal(&mut self, first_digit: char) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);

        if first_digit == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            let mut hex = String::new();
            while let Some(ch) = self.peek().filter(|c| c.is_ascii_hexdigit()) {
                hex.push(ch);
                self.advance();
            }
            let value = u32::from_str_radix(&hex, 16).map_err(|_| LexError {
                message: format!("Invalid hex literal: 0x{}", hex),
                location: loc,
            })?;
            return Ok(Token::IntLiteral(value as i32, loc));
        }

        let mut num_str = String::new();
        num_str.push(first_digit);
        self.take_digits(&mut num_str);

        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            num_str.push('.');
            self.advance();
            self.take_digits(&mut num_str);
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            num_str.push('e');
            self.advance();
            if let Some(sign) = self.peek().filter(|c| *c == '+' || *c == '-') {
                num_str.push(sign);
                self.advance();
            }
            self.take_digits(&mut num_str);
        }

        if is_float {
            if matches!(self.peek(), Some('f') | Some('F')) {
                self.advance();
            }
            let value = num_str.parse::<f64>().map_err(|_| LexError {
                message: format!("Invalid floating literal: {}", num_str),
                location: loc,
            })?;
            return Ok(Token::FloatLiteral(value, loc));
        }

        let value = num_str.parse::<i32>().map_err(|_| LexError {
            message: format!("Invalid integer literal: {}", num_str),
            location: loc,
        })?;

        Ok(Token::IntLiteral(value, loc))
    }

    fn take_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.peek().filter(|c| c.is_ascii_digit()) {
            into.push(ch);
            self.advance();
        }
    }

    fn identifier_or_keyword(&mut self, first_char: char) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let word = self.take_identifier(first_char);
        Ok(match KEYWORDS.iter().find(|(text, _)| *text == word) {
            Some((_, make)) => make(loc),
            None => Token::Ident(word, loc),
        })
    }

    fn take_identifier(&mut self, first_char: char) -> String {
        let mut ident = String::new();
        ident.push(first_char);
        while let Some(ch) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            ident.push(ch);
            self.advance();
        }
        ident
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Handle a `#` line: record `#define`, drop everything else
    fn preprocessor_directive(&mut self) -> Result<(), LexError> {
        let loc = self.current_location();
        self.advance(); // skip '#'
        self.skip_inline_spaces();

        let directive = match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.advance();
                self.take_identifier(c)
            }
            _ => String::new(),
        };

        if directive != "define" {
            self.skip_line_comment();
            return Ok(());
        }

        self.skip_inline_spaces();
        let name = match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.advance();
                self.take_identifier(c)
            }
            _ => {
                return Err(LexError {
                    message: "Expected macro name after #define".to_string(),
                    location: loc,
                })
            }
        };
        if self.peek() == Some('(') {
            return Err(LexError {
                message: format!("Function-like macro '{}' is not supported", name),
                location: loc,
            });
        }

        let mut body = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            body.push(ch);
            self.advance();
        }

        let mut body_lexer = Lexer::new(&body);
        body_lexer.macros = self.macros.clone();
        let mut tokens = body_lexer.tokenize()?;
        tokens.pop(); // Eof
        self.macros.insert(name, tokens);
        Ok(())
    }

    fn skip_inline_spaces(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("int main() { return 0; }");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "main"));
        assert!(matches!(tokens[2], Token::LParen(_)));
        assert!(matches!(tokens[3], Token::RParen(_)));
        assert!(matches!(tokens[4], Token::LBrace(_)));
        assert!(matches!(tokens[5], Token::Return(_)));
        assert!(matches!(tokens[6], Token::IntLiteral(0, _)));
        assert!(matches!(tokens[7], Token::Semicolon(_)));
        assert!(matches!(tokens[8], Token::RBrace(_)));
        assert!(matches!(tokens[9], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("++ -- += -= == != && || -> %=");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::PlusPlus(_)));
        assert!(matches!(tokens[1], Token::MinusMinus(_)));
        assert!(matches!(tokens[2], Token::PlusEq(_)));
        assert!(matches!(tokens[3], Token::MinusEq(_)));
        assert!(matches!(tokens[4], Token::EqEq(_)));
        assert!(matches!(tokens[5], Token::NotEq(_)));
        assert!(matches!(tokens[6], Token::AndAnd(_)));
        assert!(matches!(tokens[7], Token::OrOr(_)));
        assert!(matches!(tokens[8], Token::Arrow(_)));
        assert!(matches!(tokens[9], Token::PercentEq(_)));
    }

    #[test]
    fn test_comments() {
        let mut lexer = Lexer::new("int x; // comment\nint y; /* block\ncomment */ int z;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Semicolon(_)));
        assert!(matches!(tokens[3], Token::Int(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
        assert!(matches!(tokens[5], Token::Semicolon(_)));
        assert!(matches!(tokens[6], Token::Int(_)));
        assert!(matches!(tokens[7], Token::Ident(ref s, _) if s == "z"));
    }

    #[test]
    fn test_string_literal() {
        let mut lexer = Lexer::new(r#""hello\nworld""#);
        let tokens = lexer.tokenize().unwrap();

        match &tokens[0] {
            Token::StringLiteral(s, _) => assert_eq!(s, "hello\nworld"),
            other => panic!("Expected string literal, got {}", other),
        }
    }

    #[test]
    fn test_float_literals() {
        let mut lexer = Lexer::new("3.14 2.5f 1e3 0x1F 7");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::FloatLiteral(v, _) if v == 3.14));
        assert!(matches!(tokens[1], Token::FloatLiteral(v, _) if v == 2.5));
        assert!(matches!(tokens[2], Token::FloatLiteral(v, _) if v == 1000.0));
        assert!(matches!(tokens[3], Token::IntLiteral(31, _)));
        assert!(matches!(tokens[4], Token::IntLiteral(7, _)));
    }

    #[test]
    fn test_longest_operator_wins() {
        let tokens = Lexer::new("p->x<=y>>1&&!q|r").tokenize().unwrap();
        let spelled: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            spelled,
            [
                "identifier 'p'",
                "'->'",
                "identifier 'x'",
                "'<='",
                "identifier 'y'",
                "'>>'",
                "int literal 1",
                "'&&'",
                "'!'",
                "identifier 'q'",
                "'|'",
                "identifier 'r'",
                "end of file",
            ]
        );
    }

    #[test]
    fn test_keywords_are_whole_words() {
        let tokens = Lexer::new("integer do_it union").tokenize().unwrap();
        assert!(matches!(tokens[0], Token::Ident(ref s, _) if s == "integer"));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "do_it"));
        assert!(matches!(tokens[2], Token::Union(_)));
    }

    #[test]
    fn test_type_keywords() {
        let mut lexer = Lexer::new("float double union string");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Float(_)));
        assert!(matches!(tokens[1], Token::Double(_)));
        assert!(matches!(tokens[2], Token::Union(_)));
        assert!(matches!(tokens[3], Token::String(_)));
    }

    #[test]
    fn test_preprocessor_skip() {
        let mut lexer = Lexer::new("#include <stdio.h>\nint x;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
    }

    #[test]
    fn test_define_expands_at_use_site() {
        let mut lexer = Lexer::new("#define SIZE 10\n#define TWICE SIZE * 2\nint a[TWICE];");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[2], Token::LBracket(_)));
        assert!(matches!(tokens[3], Token::IntLiteral(10, loc) if loc.line == 3));
        assert!(matches!(tokens[4], Token::Star(_)));
        assert!(matches!(tokens[5], Token::IntLiteral(2, _)));
        assert!(matches!(tokens[6], Token::RBracket(_)));
    }

    #[test]
    fn test_function_like_macro_rejected() {
        let mut lexer = Lexer::new("#define SQ(x) x*x\n");
        assert!(lexer.tokenize().is_err());
    }
}
