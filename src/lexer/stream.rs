use super::lexer::{LexError, Lexer};
use super::token::Token;

/// One-token lookahead over a [`Lexer`].
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
}

impl<'a> TokenStream<'a> {
    /// Primes the stream with the first token of the line.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self, LexError> {
        lexer.next_token()?;
        Ok(TokenStream { lexer })
    }

    pub fn current(&self) -> &Token {
        self.lexer.current_token()
    }

    pub fn advance(&mut self) -> Result<&Token, LexError> {
        self.lexer.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::lexer::TokenKind;

    #[test]
    fn test_lookahead_is_stable_until_advance() {
        let env = Environment::default();
        let mut stream = TokenStream::new(Lexer::new("a | b", &env)).unwrap();
        assert_eq!(stream.current().text, "a");
        assert_eq!(stream.current().text, "a");
        assert_eq!(stream.advance().unwrap().kind, TokenKind::Pipe);
        assert_eq!(stream.current().kind, TokenKind::Pipe);
        assert_eq!(stream.advance().unwrap().text, "b");
        assert_eq!(stream.advance().unwrap().kind, TokenKind::EndOfLine);
        assert_eq!(stream.advance().unwrap().kind, TokenKind::EndOfFile);
    }

    #[test]
    fn test_priming_reports_lex_errors() {
        let env = Environment::default();
        assert!(TokenStream::new(Lexer::new("=", &env)).is_err());
    }
}
