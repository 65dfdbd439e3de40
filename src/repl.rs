use std::io::{BufRead, Write};
use std::time::SystemTime;

use log::debug;

use crate::config::Config;
use crate::environment::Environment;
use crate::error::ShellError;
use crate::executor::Executor;
use crate::parser::{DefaultParser, Parser};
use crate::prompt::{ShellPrompt, greeting};

/// One interpreter session: the variables, the executor and the prompt.
/// Lines are handled strictly one at a time.
pub struct Shell<E: Executor> {
    env: Environment,
    executor: E,
    config: Config,
}

impl<E: Executor> Shell<E> {
    pub fn new(config: Config, mut env: Environment, executor: E) -> Self {
        config.apply(&mut env);
        Shell {
            env,
            executor,
            config,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Lexes, parses and runs one line. `None` means there was nothing to
    /// run; otherwise the status of the pipeline's last stage, which is
    /// also stored as `$?`.
    pub fn run_line(&mut self, line: &str) -> Result<Option<i32>, ShellError> {
        let pipeline = DefaultParser::from_line(line, &self.env)?.parse()?;
        if pipeline.is_empty() {
            return Ok(None);
        }

        let status = match self.executor.exec(&pipeline, &mut self.env) {
            Ok(status) => status,
            Err(e) => {
                self.env.set("?", "1");
                return Err(e.into());
            }
        };
        debug!("pipeline finished with status {}", status);
        self.env.set("?", &status.to_string());
        Ok(Some(status))
    }

    /// The read loop. Returns once `input` is exhausted; errors on a line
    /// are reported to stderr and the loop carries on.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
        now: SystemTime,
    ) -> Result<(), ShellError> {
        if self.config.greeting {
            output.write_all(greeting(now).as_bytes())?;
        }

        let prompt = ShellPrompt::new(&self.config.prompt);
        loop {
            prompt.show_prompt(&mut output)?;
            let Some(line) = prompt.read_line(&mut input)? else {
                // End with EOF (e.g. Ctrl+D)
                writeln!(output)?;
                return Ok(());
            };

            if let Err(e) = self.run_line(&line) {
                eprintln!("psh: {}", e);
            }
        }
    }
}
