use log::{trace, warn};
use nix::unistd::{User, geteuid};
use thiserror::Error;

use super::token::{Token, TokenKind};
use crate::environment::Environment;

/// Longest command element, counted in characters read from the line.
/// Values substituted for `$NAME` and `~` do not count.
pub const ELEMENT_MAX: usize = 256;
/// Longest accepted input line in bytes.
pub const INPUT_MAX: usize = 4096 * 4;

// Punctuation allowed in a word besides letters and digits.
const WORD_PUNCT: &str = "!\"#%'()*+,-./:;?@[]&\\^_`{}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    #[error("command element at position {pos} is longer than {max} characters")]
    ElementTooLong { pos: usize, max: usize },
    #[error("input line is {len} bytes, the limit is {max}")]
    LineTooLong { len: usize, max: usize },
}

/// Scanner over one input line.
///
/// Only one token is live at a time: every call to [`Lexer::next_token`]
/// overwrites the current token in place. The line itself is never copied
/// or rewritten, the lexer just moves a byte offset forward.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    lookahead: Option<char>,
    token: Token,
    scanned: usize,
    line_ended: bool,
    env: &'a Environment,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, env: &'a Environment) -> Self {
        Lexer {
            input,
            pos: 0,
            lookahead: input.chars().next(),
            token: Token::new(TokenKind::Error, ""),
            scanned: 0,
            line_ended: false,
            env,
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    /// Scans the next token. After the end of the line has been reported
    /// every further call yields `EndOfFile`.
    pub fn next_token(&mut self) -> Result<&Token, LexError> {
        self.token = Token::new(TokenKind::Error, String::new());
        self.scanned = 0;
        if let Err(e) = self.scan() {
            self.token = Token::new(TokenKind::Error, e.to_string());
            return Err(e);
        }
        trace!("token {:?} {:?}", self.token.kind, self.token.text);
        Ok(&self.token)
    }

    /// Collects tokens up to and including the first line terminator.
    pub fn tokenize_all(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?.clone();
            let done = token.is_terminator();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.lookahead?;
        self.pos += c.len_utf8();
        self.lookahead = self.input[self.pos..].chars().next();
        Some(c)
    }

    fn scan(&mut self) -> Result<(), LexError> {
        if self.input.len() > INPUT_MAX {
            return Err(LexError::LineTooLong {
                len: self.input.len(),
                max: INPUT_MAX,
            });
        }

        while matches!(self.lookahead, Some(c) if c != '\n' && c.is_whitespace()) {
            self.bump();
        }

        let start = self.pos;
        match self.lookahead {
            None => {
                self.token.kind = if self.line_ended {
                    TokenKind::EndOfFile
                } else {
                    self.line_ended = true;
                    TokenKind::EndOfLine
                };
            }
            Some('\n') => {
                self.bump();
                self.line_ended = true;
                self.token.kind = TokenKind::EndOfLine;
            }
            Some('<') => self.operator(TokenKind::RedirectIn),
            Some('>') => self.operator(TokenKind::RedirectOut),
            Some('|') => self.operator(TokenKind::Pipe),
            Some('~') => {
                self.bump();
                self.token.kind = TokenKind::Word;
                self.expand_home();
                self.scan_word(start)?;
            }
            Some('$') => {
                self.token.kind = TokenKind::Word;
                self.scan_word(start)?;
            }
            Some(c) if c.is_ascii_digit() => {
                self.token.kind = TokenKind::Number;
                self.scan_word(start)?;
            }
            Some(c) if is_word_start(c) => {
                self.token.kind = TokenKind::Word;
                self.scan_word(start)?;
            }
            Some(c) => return Err(LexError::UnexpectedChar(c, start)),
        }
        Ok(())
    }

    fn operator(&mut self, kind: TokenKind) {
        if let Some(c) = self.bump() {
            self.token.kind = kind;
            self.token.text.push(c);
        }
    }

    fn scan_word(&mut self, start: usize) -> Result<(), LexError> {
        while let Some(c) = self.lookahead {
            match c {
                '$' => {
                    self.bump();
                    self.count_literal(start)?;
                    self.expand_variable(start)?;
                }
                '=' => {
                    if self.token.kind == TokenKind::Word && is_identifier(&self.token.text) {
                        self.token.kind = TokenKind::EnvironmentAssignment;
                    }
                    self.push(c, start)?;
                    self.bump();
                }
                c if is_word_char(c) => {
                    self.push(c, start)?;
                    self.bump();
                }
                _ => break,
            }
        }
        if self.token.kind == TokenKind::Number
            && !self.token.text.bytes().all(|b| b.is_ascii_digit())
        {
            self.token.kind = TokenKind::Word;
        }
        Ok(())
    }

    fn count_literal(&mut self, start: usize) -> Result<(), LexError> {
        if self.scanned >= ELEMENT_MAX {
            return Err(LexError::ElementTooLong {
                pos: start,
                max: ELEMENT_MAX,
            });
        }
        self.scanned += 1;
        Ok(())
    }

    fn push(&mut self, c: char, start: usize) -> Result<(), LexError> {
        self.count_literal(start)?;
        self.token.text.push(c);
        Ok(())
    }

    // Called with the `$` already consumed.
    fn expand_variable(&mut self, start: usize) -> Result<(), LexError> {
        let mut name = String::new();
        if self.lookahead == Some('?') {
            self.bump();
            self.count_literal(start)?;
            name.push('?');
        } else {
            while let Some(c) = self
                .lookahead
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            {
                self.bump();
                self.count_literal(start)?;
                name.push(c);
            }
        }

        if name.is_empty() {
            self.token.text.push('$');
            return Ok(());
        }
        match self.env.get(&name) {
            Some(value) => self.token.text.push_str(value),
            None => trace!("${} is not set, expanding to nothing", name),
        }
        Ok(())
    }

    fn expand_home(&mut self) {
        if let Some(home) = self.env.get("HOME") {
            self.token.text.push_str(home);
            return;
        }

        let uid = geteuid();
        match User::from_uid(uid) {
            Ok(Some(user)) if !user.dir.as_os_str().is_empty() => {
                self.token.text.push_str(&user.dir.to_string_lossy());
            }
            Ok(Some(user)) => {
                self.token.text.push_str("/home/");
                self.token.text.push_str(&user.name);
            }
            Ok(None) => warn!("cannot find username for UID {}", uid),
            Err(e) => warn!("user lookup for UID {} failed: {}", uid, e),
        }
    }
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || WORD_PUNCT.contains(c)
}

fn is_word_char(c: char) -> bool {
    is_word_start(c) || c == '~'
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
