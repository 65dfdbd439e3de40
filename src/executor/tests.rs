use crate::ast::Pipeline;
use crate::environment::Environment;
use crate::executor::{ExecStatus, Executor};

/// Records every pipeline it is asked to run instead of running it.
pub struct MockExecutor {
    pub pipelines: Vec<Pipeline>,
    pub status: i32,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            pipelines: Vec::new(),
            status: 0,
        }
    }

    pub fn with_status(status: i32) -> Self {
        Self {
            pipelines: Vec::new(),
            status,
        }
    }
}

impl Executor for MockExecutor {
    fn exec(&mut self, pipeline: &Pipeline, _env: &mut Environment) -> ExecStatus {
        self.pipelines.push(pipeline.clone());
        Ok(self.status)
    }
}
