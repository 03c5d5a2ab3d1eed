//! Lexer
//!
//! Turns source text into a vector of tokens ending in `EndOfFile`.
//! Whitespace and comments are dropped here; identifiers are interned so the
//! parser can compare names by handle.

pub mod token;
pub mod literals;
pub mod operators;

pub use token::{Token, TokenType};

use log::debug;
use mcc_common::{CompilerError, Interner, SourceLocation, SourceSpan};
use std::collections::HashMap;
use std::rc::Rc;

pub struct Lexer<'a> {
    pub(crate) input: Vec<char>,
    pub(crate) position: usize,
    pub(crate) line: u32,
    pub(crate) column: u32,
    filename: Rc<str>,
    keywords: HashMap<&'static str, TokenType>,
    interner: &'a mut Interner,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &str, filename: &str, interner: &'a mut Interner) -> Self {
        let keywords = [
            ("void", TokenType::Void),
            ("char", TokenType::Char),
            ("short", TokenType::Short),
            ("int", TokenType::Int),
            ("long", TokenType::Long),
            ("signed", TokenType::Signed),
            ("unsigned", TokenType::Unsigned),
            ("if", TokenType::If),
            ("else", TokenType::Else),
            ("while", TokenType::While),
            ("do", TokenType::Do),
            ("for", TokenType::For),
            ("break", TokenType::Break),
            ("continue", TokenType::Continue),
            ("return", TokenType::Return),
            ("print", TokenType::Print),
        ]
        .into_iter()
        .collect();

        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            filename: Rc::from(filename),
            keywords,
            interner,
        }
    }

    pub(crate) fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub(crate) fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    pub(crate) fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        SourceLocation::with_file(self.filename.clone(), self.line, self.column)
    }

    fn tokenize_identifier(&mut self) -> TokenType {
        let mut identifier = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match self.keywords.get(identifier.as_str()) {
            Some(keyword) => keyword.clone(),
            None => TokenType::Identifier(self.interner.intern(&identifier)),
        }
    }

    /// Produce one token; yields `EndOfFile` forever once input is exhausted
    pub fn next_token(&mut self) -> Result<Token, CompilerError> {
        self.skip_trivia()?;

        let start_location = self.current_location();

        let token_type = match self.current_char() {
            None => TokenType::EndOfFile,

            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.tokenize_identifier(),
            Some(ch) if ch.is_ascii_digit() => self.tokenize_integer()?,
            Some('\'') => self.tokenize_char_literal()?,
            Some('"') => self.tokenize_string_literal()?,

            Some(ch) => self.tokenize_operator(ch)?,
        };

        let span = SourceSpan::new(start_location, self.current_location());
        Ok(Token::new(token_type, span))
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompilerError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = token.token_type == TokenType::EndOfFile;
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        debug!("lexed {} tokens from {}", tokens.len(), self.filename);
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenType> {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(input, "test.c", &mut interner);
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let mut interner = Interner::new();
        let tokens = Lexer::new("int main void print unsigned x main", "t.c", &mut interner)
            .tokenize()
            .unwrap();
        let main = interner.get("main").unwrap();
        let x = interner.get("x").unwrap();

        let types: Vec<_> = tokens.into_iter().map(|t| t.token_type).collect();
        assert_eq!(
            types,
            vec![
                TokenType::Int,
                TokenType::Identifier(main),
                TokenType::Void,
                TokenType::Print,
                TokenType::Unsigned,
                TokenType::Identifier(x),
                TokenType::Identifier(main),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ - * / & && || = == != < <= > >= ( ) { } [ ] ; ,"),
            vec![
                TokenType::Plus, TokenType::Minus, TokenType::Star, TokenType::Slash,
                TokenType::Ampersand, TokenType::AmpersandAmpersand, TokenType::PipePipe,
                TokenType::Equal, TokenType::EqualEqual, TokenType::BangEqual,
                TokenType::Less, TokenType::LessEqual, TokenType::Greater, TokenType::GreaterEqual,
                TokenType::LeftParen, TokenType::RightParen, TokenType::LeftBrace,
                TokenType::RightBrace, TokenType::LeftBracket, TokenType::RightBracket,
                TokenType::Semicolon, TokenType::Comma, TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("1 // line\n /* block\n comment */ 2"),
            vec![TokenType::IntLiteral(1), TokenType::IntLiteral(2), TokenType::EndOfFile]
        );
    }

    #[test]
    fn test_spans_track_lines() {
        let mut interner = Interner::new();
        let tokens = Lexer::new("int\n  x;", "span.c", &mut interner).tokenize().unwrap();
        assert_eq!(tokens[1].span.start.to_string(), "span.c:2:3");
        assert_eq!(tokens[2].span.start.column, 4);
    }

    #[test]
    fn test_unexpected_character() {
        let mut interner = Interner::new();
        let err = Lexer::new("int x = 3 % 2;", "bad.c", &mut interner)
            .tokenize()
            .unwrap_err();
        assert_eq!(err.to_string(), "bad.c:1:11: error: unexpected character '%'");
    }

    #[test]
    fn test_next_token_is_sticky_at_end() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("", "empty.c", &mut interner);
        assert_eq!(lexer.next_token().unwrap().token_type, TokenType::EndOfFile);
        assert_eq!(lexer.next_token().unwrap().token_type, TokenType::EndOfFile);
    }
}
