pub mod default;

use thiserror::Error;

use crate::ast::{Pipeline, RedirectKind};
use crate::lexer::LexError;

pub use default::DefaultParser;

pub trait Parser {
    fn parse(&mut self) -> Result<Pipeline, ParseError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("too many commands in pipeline (at most {max})")]
    TooManyStages { max: usize },
    #[error("too many arguments (at most {max})")]
    TooManyArguments { max: usize },
    #[error("missing file name after '{}'", .0.symbol())]
    MissingRedirectTarget(RedirectKind),
    #[error("more than one '{}' redirection for one command", .0.symbol())]
    DuplicateRedirection(RedirectKind),
    #[error("'{}' redirection is not allowed on command {}", .kind.symbol(), .stage + 1)]
    MisplacedRedirection { kind: RedirectKind, stage: usize },
    #[error("missing command at position {}", .stage + 1)]
    EmptyCommand { stage: usize },
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("lexical error: {0}")]
    Lex(#[from] LexError),
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}
