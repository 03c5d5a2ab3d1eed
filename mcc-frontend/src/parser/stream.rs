//! Token stream with cheap lookahead and backtracking

use crate::lexer::{Token, TokenType};
use mcc_common::{SourceLocation, SourceSpan};

/// Saved stream position, see [`TokenStream::snapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Read-only token sequence with a cursor. The last token is always
/// `EndOfFile`, and reading past it keeps yielding that token.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let needs_eof = tokens
            .last()
            .map_or(true, |t| t.token_type != TokenType::EndOfFile);
        if needs_eof {
            let span = tokens
                .last()
                .map(|t| SourceSpan::from_location(t.span.end.clone()))
                .unwrap_or_else(SourceSpan::dummy);
            tokens.push(Token::new(TokenType::EndOfFile, span));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    fn last_index(&self) -> usize {
        self.tokens.len() - 1
    }

    pub fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    /// Look `n` tokens past the current one without consuming anything
    pub fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.position + n).min(self.last_index());
        &self.tokens[index]
    }

    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.last_index() {
            self.position += 1;
        }
        token
    }

    /// Where the most recently consumed token ended
    pub fn previous_end(&self) -> SourceLocation {
        match self.position.checked_sub(1) {
            Some(index) => self.tokens[index].span.end.clone(),
            None => self.peek().span.start.clone(),
        }
    }

    pub fn snapshot(&self) -> Checkpoint {
        Checkpoint(self.position)
    }

    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.0;
    }

    pub fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::EndOfFile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use mcc_common::Interner;
    use pretty_assertions::assert_eq;

    fn stream(source: &str) -> TokenStream {
        let mut interner = Interner::new();
        let tokens = Lexer::new(source, "stream.c", &mut interner).tokenize().unwrap();
        TokenStream::new(tokens)
    }

    #[test]
    fn test_rewind_restores_position() {
        let mut tokens = stream("int f ( ) ;");
        tokens.advance();
        let checkpoint = tokens.snapshot();
        let before = tokens.peek().clone();

        tokens.advance();
        tokens.advance();
        assert_eq!(tokens.peek().token_type, TokenType::RightParen);

        tokens.rewind(checkpoint);
        assert_eq!(tokens.peek(), &before);
    }

    #[test]
    fn test_peek_nth_and_sticky_end() {
        let mut tokens = stream("1 2");
        assert_eq!(tokens.peek_nth(1).token_type, TokenType::IntLiteral(2));
        assert_eq!(tokens.peek_nth(10).token_type, TokenType::EndOfFile);

        tokens.advance();
        tokens.advance();
        assert!(tokens.is_at_end());
        assert_eq!(tokens.advance().token_type, TokenType::EndOfFile);
        assert_eq!(tokens.advance().token_type, TokenType::EndOfFile);
    }

    #[test]
    fn test_missing_end_token_is_added() {
        let tokens = TokenStream::new(Vec::new());
        assert!(tokens.is_at_end());
    }
}
