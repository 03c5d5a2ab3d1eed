//! Token definitions for the lexer

use mcc_common::{Name, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token types of the language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenType {
    // Literals
    IntLiteral(i64),
    CharLiteral(u8),
    StringLiteral(String),

    Identifier(Name),

    // Keywords
    Void, Char, Short, Int, Long, Signed, Unsigned,
    If, Else, While, Do, For, Break, Continue, Return,
    Print,

    // Operators
    Plus,               // +
    Minus,              // -
    Star,               // *
    Slash,              // /
    Ampersand,          // &
    AmpersandAmpersand, // &&
    PipePipe,           // ||
    Equal,              // =
    EqualEqual,         // ==
    BangEqual,          // !=
    Less,               // <
    LessEqual,          // <=
    Greater,            // >
    GreaterEqual,       // >=

    // Delimiters
    LeftParen,      // (
    RightParen,     // )
    LeftBrace,      // {
    RightBrace,     // }
    LeftBracket,    // [
    RightBracket,   // ]
    Semicolon,      // ;
    Comma,          // ,

    EndOfFile,
}

impl TokenType {
    /// Whether this token can begin a type specifier
    pub fn is_type_specifier(&self) -> bool {
        matches!(
            self,
            TokenType::Void
                | TokenType::Char
                | TokenType::Short
                | TokenType::Int
                | TokenType::Long
                | TokenType::Signed
                | TokenType::Unsigned
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenType::IntLiteral(n) => return write!(f, "{n}"),
            TokenType::CharLiteral(c) => return write!(f, "'{}'", c.escape_ascii()),
            TokenType::StringLiteral(s) => return write!(f, "\"{}\"", s.escape_debug()),
            TokenType::Identifier(_) => "identifier",

            TokenType::Void => "void",
            TokenType::Char => "char",
            TokenType::Short => "short",
            TokenType::Int => "int",
            TokenType::Long => "long",
            TokenType::Signed => "signed",
            TokenType::Unsigned => "unsigned",
            TokenType::If => "if",
            TokenType::Else => "else",
            TokenType::While => "while",
            TokenType::Do => "do",
            TokenType::For => "for",
            TokenType::Break => "break",
            TokenType::Continue => "continue",
            TokenType::Return => "return",
            TokenType::Print => "print",

            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Ampersand => "&",
            TokenType::AmpersandAmpersand => "&&",
            TokenType::PipePipe => "||",
            TokenType::Equal => "=",
            TokenType::EqualEqual => "==",
            TokenType::BangEqual => "!=",
            TokenType::Less => "<",
            TokenType::LessEqual => "<=",
            TokenType::Greater => ">",
            TokenType::GreaterEqual => ">=",

            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBrace => "{",
            TokenType::RightBrace => "}",
            TokenType::LeftBracket => "[",
            TokenType::RightBracket => "]",
            TokenType::Semicolon => ";",
            TokenType::Comma => ",",

            TokenType::EndOfFile => "end of input",
        };
        write!(f, "{text}")
    }
}

/// A token with its source span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub span: SourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, span: SourceSpan) -> Self {
        Self { token_type, span }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.token_type, self.span.start)
    }
}
