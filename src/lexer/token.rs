#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,                  // plain word, or the result of `$NAME` / `~` expansion
    Number,                // digits only
    EnvironmentAssignment, // NAME=value
    RedirectIn,            // <
    RedirectOut,           // >
    Pipe,                  // |
    EndOfLine,
    EndOfFile,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }

    /// Tokens the parser accepts as a program name, argument or file name.
    pub fn is_word_like(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Word | TokenKind::Number | TokenKind::EnvironmentAssignment
        )
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfLine | TokenKind::EndOfFile)
    }
}
