//! Integer, character and string literals

use crate::lexer::{Lexer, TokenType};
use mcc_common::CompilerError;

impl Lexer<'_> {
    pub fn tokenize_integer(&mut self) -> Result<TokenType, CompilerError> {
        let start = self.current_location();
        let is_hex = self.current_char() == Some('0')
            && matches!(self.peek_char(1), Some('x') | Some('X'));

        let (radix, prefix) = if is_hex {
            self.advance();
            self.advance();
            (16, "0x")
        } else {
            (10, "")
        };

        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_digit(radix) {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.current_char(), Some(ch) if ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(CompilerError::lexer_error(
                format!("invalid suffix on integer literal {prefix}{digits}"),
                self.current_location(),
            ));
        }

        if digits.is_empty() {
            return Err(CompilerError::lexer_error("invalid hex literal", start));
        }

        i64::from_str_radix(&digits, radix)
            .map(TokenType::IntLiteral)
            .map_err(|_| {
                CompilerError::lexer_error(
                    format!("integer literal {prefix}{digits} is too large"),
                    start,
                )
            })
    }

    /// Consume the character after a backslash
    fn escape_sequence(&mut self, quote: char) -> Result<char, CompilerError> {
        let location = self.current_location();
        let escaped = match self.advance() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some(c) => {
                return Err(CompilerError::lexer_error(
                    format!("invalid escape sequence \\{c}"),
                    location,
                ))
            }
            None => {
                return Err(CompilerError::lexer_error(
                    format!("missing terminating {quote} character"),
                    location,
                ))
            }
        };
        Ok(escaped)
    }

    pub fn tokenize_char_literal(&mut self) -> Result<TokenType, CompilerError> {
        let start = self.current_location();
        self.advance(); // opening quote

        let ch = match self.advance() {
            Some('\\') => self.escape_sequence('\'')?,
            Some('\'') => return Err(CompilerError::lexer_error("empty character constant", start)),
            Some(ch) if ch.is_ascii() && ch != '\n' => ch,
            Some(ch) if ch != '\n' => {
                return Err(CompilerError::lexer_error(
                    format!("character '{ch}' does not fit in a char"),
                    start,
                ))
            }
            _ => return Err(CompilerError::lexer_error("missing terminating ' character", start)),
        };

        if self.advance() != Some('\'') {
            return Err(CompilerError::lexer_error("missing terminating ' character", start));
        }

        Ok(TokenType::CharLiteral(ch as u8))
    }

    pub fn tokenize_string_literal(&mut self) -> Result<TokenType, CompilerError> {
        let start = self.current_location();
        self.advance(); // opening quote
        let mut string = String::new();

        loop {
            match self.advance() {
                Some('"') => return Ok(TokenType::StringLiteral(string)),
                Some('\\') => string.push(self.escape_sequence('"')?),
                Some('\n') | None => {
                    return Err(CompilerError::lexer_error("missing terminating \" character", start))
                }
                Some(ch) => string.push(ch),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{Lexer, TokenType};
    use mcc_common::Interner;
    use pretty_assertions::assert_eq;

    fn first(input: &str) -> Result<TokenType, String> {
        let mut interner = Interner::new();
        Lexer::new(input, "lit.c", &mut interner)
            .next_token()
            .map(|t| t.token_type)
            .map_err(|e| e.to_string())
    }

    #[test]
    fn test_integer_literals() {
        assert_eq!(first("42"), Ok(TokenType::IntLiteral(42)));
        assert_eq!(first("0x1F"), Ok(TokenType::IntLiteral(31)));
        assert_eq!(first("4294967296"), Ok(TokenType::IntLiteral(4_294_967_296)));
        assert_eq!(
            first("12abc"),
            Err("lit.c:1:3: error: invalid suffix on integer literal 12".to_string())
        );
        assert_eq!(
            first("99999999999999999999"),
            Err("lit.c:1:1: error: integer literal 99999999999999999999 is too large".to_string())
        );
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(first("'a'"), Ok(TokenType::CharLiteral(b'a')));
        assert_eq!(first("'\\n'"), Ok(TokenType::CharLiteral(b'\n')));
        assert_eq!(first("'\\0'"), Ok(TokenType::CharLiteral(0)));
        assert!(first("''").is_err());
        assert!(first("'ab'").is_err());
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            first("\"hi\\t\\\"there\\\"\""),
            Ok(TokenType::StringLiteral("hi\t\"there\"".to_string()))
        );
        assert_eq!(
            first("\"open"),
            Err("lit.c:1:1: error: missing terminating \" character".to_string())
        );
    }
}
