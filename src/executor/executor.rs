use nix::errno::Errno;
use thiserror::Error;

use crate::ast::Pipeline;
use crate::environment::Environment;

/// Exit status of the last stage of the pipeline.
pub type ExecStatus = Result<i32, ExecError>;

/// Failures of the interpreter itself. A child that cannot open a
/// redirection or exec its program is not an error here, it just exits
/// with a non-zero status.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] Errno),
    #[error("cannot fork: {0}")]
    Spawn(#[source] Errno),
    #[error("waiting for pid {pid} failed: {source}")]
    Wait { pid: i32, source: Errno },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub trait Executor {
    fn exec(&mut self, pipeline: &Pipeline, env: &mut Environment) -> ExecStatus;
}
