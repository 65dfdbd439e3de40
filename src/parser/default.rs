use log::debug;

use super::{ParseError, Parser, SyntaxError};
use crate::ast::{Command, PIPE_MAX, Pipeline, RedirectKind, Redirection};
use crate::environment::Environment;
use crate::lexer::{Lexer, TokenKind, TokenStream};

pub struct DefaultParser<'a> {
    tokens: TokenStream<'a>,
}

impl<'a> DefaultParser<'a> {
    pub fn new(tokens: TokenStream<'a>) -> Self {
        Self { tokens }
    }

    pub fn from_line(line: &'a str, env: &'a Environment) -> Result<Self, ParseError> {
        Ok(Self::new(TokenStream::new(Lexer::new(line, env))?))
    }

    // Called on the operator token; leaves the stream after the file name.
    fn expect_file(&mut self, kind: RedirectKind) -> Result<Redirection, ParseError> {
        let token = self.tokens.advance()?;
        if !token.is_word_like() {
            return Err(SyntaxError::MissingRedirectTarget(kind).into());
        }
        let file = token.text.clone();
        self.tokens.advance()?;
        Ok(Redirection { kind, file })
    }
}

impl Parser for DefaultParser<'_> {
    fn parse(&mut self) -> Result<Pipeline, ParseError> {
        let mut stages = Vec::new();
        let mut current = Command::default();

        loop {
            let kind = self.tokens.current().kind;
            match kind {
                TokenKind::Word | TokenKind::Number => {
                    current.push_word(self.tokens.current().text.clone())?;
                    self.tokens.advance()?;
                }
                TokenKind::EnvironmentAssignment => {
                    let text = self.tokens.current().text.clone();
                    match text.split_once('=') {
                        Some((name, value)) if current.program.is_empty() => {
                            current.assignments.push((name.to_string(), value.to_string()));
                        }
                        _ => current.push_word(text)?,
                    }
                    self.tokens.advance()?;
                }
                TokenKind::Pipe => {
                    if current.is_blank() {
                        return Err(SyntaxError::EmptyCommand {
                            stage: stages.len(),
                        }
                        .into());
                    }
                    stages.push(std::mem::take(&mut current));
                    if stages.len() >= PIPE_MAX {
                        return Err(SyntaxError::TooManyStages { max: PIPE_MAX }.into());
                    }
                    self.tokens.advance()?;
                }
                TokenKind::RedirectIn | TokenKind::RedirectOut => {
                    let kind = if kind == TokenKind::RedirectIn {
                        RedirectKind::In
                    } else {
                        RedirectKind::Out
                    };
                    let redirection = self.expect_file(kind)?;
                    current.add_redirection(redirection)?;
                }
                TokenKind::EndOfLine | TokenKind::EndOfFile => break,
                TokenKind::Error => {
                    return Err(
                        SyntaxError::UnexpectedToken(self.tokens.current().text.clone()).into(),
                    );
                }
            }
        }

        if !current.is_blank() {
            stages.push(current);
        } else if !stages.is_empty() {
            // trailing pipe
            return Err(SyntaxError::EmptyCommand {
                stage: stages.len(),
            }
            .into());
        }

        let pipeline = Pipeline::new(stages)?;
        debug!("parsed {} stage(s): {}", pipeline.len(), pipeline);
        Ok(pipeline)
    }
}
