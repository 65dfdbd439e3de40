use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::executor::ExecError;
use crate::parser::ParseError;

/// Anything that can abandon an input line or stop the interpreter.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("execution error: {0}")]
    Exec(#[from] ExecError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RedirectKind;
    use crate::lexer::LexError;
    use crate::parser::SyntaxError;

    #[test]
    fn parse_error_display() {
        let e = ShellError::from(ParseError::from(SyntaxError::MissingRedirectTarget(
            RedirectKind::In,
        )));
        assert_eq!(format!("{e}"), "syntax error: missing file name after '<'");

        let e = ShellError::from(ParseError::from(LexError::ElementTooLong { pos: 4, max: 256 }));
        assert_eq!(
            format!("{e}"),
            "lexical error: command element at position 4 is longer than 256 characters"
        );
    }

    #[test]
    fn exec_error_display() {
        let e = ShellError::from(ExecError::Spawn(nix::errno::Errno::EAGAIN));
        assert!(format!("{e}").starts_with("execution error: cannot fork: EAGAIN"));
    }
}
