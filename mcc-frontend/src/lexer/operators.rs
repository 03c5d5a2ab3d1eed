//! Operators, punctuation, whitespace and comments

use crate::lexer::{Lexer, TokenType};
use mcc_common::CompilerError;

impl Lexer<'_> {
    /// Skip whitespace, `//` comments and `/* */` comments
    pub(crate) fn skip_trivia(&mut self) -> Result<(), CompilerError> {
        loop {
            match (self.current_char(), self.peek_char(1)) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.advance();
                }
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), CompilerError> {
        let start = self.current_location();
        self.advance(); // '/'
        self.advance(); // '*'

        while let Some(ch) = self.advance() {
            if ch == '*' && self.current_char() == Some('/') {
                self.advance();
                return Ok(());
            }
        }

        Err(CompilerError::lexer_error("unterminated comment", start))
    }

    /// Consume `second` if it follows, choosing between a two-character and a
    /// one-character token
    fn either(&mut self, second: char, double: TokenType, single: TokenType) -> TokenType {
        if self.current_char() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    pub(crate) fn tokenize_operator(&mut self, ch: char) -> Result<TokenType, CompilerError> {
        let location = self.current_location();
        self.advance();

        let token_type = match ch {
            '+' => TokenType::Plus,
            '-' => TokenType::Minus,
            '*' => TokenType::Star,
            '/' => TokenType::Slash,
            '&' => self.either('&', TokenType::AmpersandAmpersand, TokenType::Ampersand),
            '=' => self.either('=', TokenType::EqualEqual, TokenType::Equal),
            '<' => self.either('=', TokenType::LessEqual, TokenType::Less),
            '>' => self.either('=', TokenType::GreaterEqual, TokenType::Greater),
            '|' if self.current_char() == Some('|') => {
                self.advance();
                TokenType::PipePipe
            }
            '!' if self.current_char() == Some('=') => {
                self.advance();
                TokenType::BangEqual
            }
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '{' => TokenType::LeftBrace,
            '}' => TokenType::RightBrace,
            '[' => TokenType::LeftBracket,
            ']' => TokenType::RightBracket,
            ';' => TokenType::Semicolon,
            ',' => TokenType::Comma,
            other => {
                return Err(CompilerError::lexer_error(
                    format!("unexpected character '{other}'"),
                    location,
                ))
            }
        };

        Ok(token_type)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;
    use mcc_common::Interner;

    #[test]
    fn test_unterminated_block_comment() {
        let mut interner = Interner::new();
        let err = Lexer::new("int /* never closed", "c.c", &mut interner)
            .tokenize()
            .unwrap_err();
        assert_eq!(err.to_string(), "c.c:1:5: error: unterminated comment");
    }

    #[test]
    fn test_lone_pipe_is_rejected() {
        let mut interner = Interner::new();
        let err = Lexer::new("a | b", "p.c", &mut interner).tokenize().unwrap_err();
        assert_eq!(err.message(), "unexpected character '|'");
    }
}
