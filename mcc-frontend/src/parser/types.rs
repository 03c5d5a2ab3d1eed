//! Type specifiers and declarators

use crate::lexer::TokenType;
use crate::parser::errors::ParseError;
use crate::parser::Parser;
use crate::types::Type;
use mcc_common::{Name, SourceSpan};

/// A declared name with its full type
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: Name,
    pub ty: Type,
    pub span: SourceSpan,
}

impl<'a> Parser<'a> {
    /// Parse `void` or an optionally signed integer type
    pub fn parse_type_specifier(&mut self) -> Result<Type, ParseError> {
        let location = self.current_location();

        if self.match_token(&TokenType::Void) {
            return Ok(Type::Void);
        }

        let unsigned = match self.peek().token_type {
            TokenType::Signed => {
                self.advance();
                Some(false)
            }
            TokenType::Unsigned => {
                self.advance();
                Some(true)
            }
            _ => None,
        };

        let keyword = match self.peek().token_type {
            TokenType::Char => Some(Type::Char),
            TokenType::Short => Some(Type::Short),
            TokenType::Int => Some(Type::Int),
            TokenType::Long => Some(Type::Long),
            _ => None,
        };
        let base = match keyword {
            Some(base) => {
                self.advance();
                if matches!(base, Type::Short | Type::Long) {
                    self.match_token(&TokenType::Int);
                }
                base
            }
            // `signed` / `unsigned` on their own mean int
            None if unsigned.is_some() => Type::Int,
            None => return Err(ParseError::UnknownType { location }),
        };

        Ok(if unsigned == Some(true) { base.to_unsigned() } else { base })
    }

    /// Wrap `ty` in one pointer level per leading `*`
    pub fn parse_pointers(&mut self, mut ty: Type) -> Type {
        while self.match_token(&TokenType::Star) {
            ty = Type::pointer_to(ty);
        }
        ty
    }

    /// `*... identifier [N]?`
    pub fn parse_declarator(&mut self, base: &Type) -> Result<Declarator, ParseError> {
        let ty = self.parse_pointers(base.clone());
        let (name, span) = self.expect_identifier()?;

        let ty = if self.match_token(&TokenType::LeftBracket) {
            let size_token = self.advance();
            let size = match size_token.token_type {
                TokenType::IntLiteral(n) if n > 0 => n as u64,
                _ => {
                    return Err(ParseError::InvalidSyntax {
                        message: "array size must be a positive integer constant".to_string(),
                        location: size_token.span.start,
                    })
                }
            };
            self.expect(TokenType::RightBracket)?;
            Type::array_of(ty, size)
        } else {
            ty
        };

        Ok(Declarator {
            name,
            ty,
            span: self.span_from(span.start),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::types::Type;
    use mcc_common::Interner;
    use pretty_assertions::assert_eq;

    fn specifier(source: &str) -> Result<Type, String> {
        let mut interner = Interner::new();
        let tokens = Lexer::new(source, "t.c", &mut interner).tokenize().unwrap();
        let mut parser = Parser::new(tokens, &interner);
        parser.parse_type_specifier().map_err(|e| e.to_string())
    }

    fn declarator(source: &str) -> Type {
        let mut interner = Interner::new();
        let tokens = Lexer::new(source, "t.c", &mut interner).tokenize().unwrap();
        let mut parser = Parser::new(tokens, &interner);
        let base = parser.parse_type_specifier().unwrap();
        parser.parse_declarator(&base).unwrap().ty
    }

    #[test]
    fn test_type_specifiers() {
        assert_eq!(specifier("void"), Ok(Type::Void));
        assert_eq!(specifier("char"), Ok(Type::Char));
        assert_eq!(specifier("signed char"), Ok(Type::Char));
        assert_eq!(specifier("unsigned char"), Ok(Type::UnsignedChar));
        assert_eq!(specifier("short int"), Ok(Type::Short));
        assert_eq!(specifier("unsigned long int"), Ok(Type::UnsignedLong));
        assert_eq!(specifier("unsigned"), Ok(Type::UnsignedInt));
        assert_eq!(specifier("signed x"), Ok(Type::Int));
        assert_eq!(specifier("x"), Err("unknown type".to_string()));
    }

    #[test]
    fn test_declarators() {
        assert_eq!(declarator("int x"), Type::Int);
        assert_eq!(declarator("char **argv"), Type::pointer_to(Type::pointer_to(Type::Char)));
        assert_eq!(declarator("long buf[16]"), Type::array_of(Type::Long, 16));
        assert_eq!(
            declarator("int *table[3]"),
            Type::array_of(Type::pointer_to(Type::Int), 3)
        );
    }
}
