use std::os::fd::{AsRawFd, OwnedFd};

use log::{debug, trace};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork, pipe2};

use super::executor::{ExecError, ExecStatus, Executor};
use super::path_resolver::PathResolver;
use super::stage::PreparedStage;
use crate::ast::Pipeline;
use crate::environment::Environment;

/// Runs every stage as its own forked process, connected by pipes.
///
/// All stages are started before the first wait, so they run concurrently.
/// The reported status is the one of the last stage.
pub struct ForkExecutor {
    resolver: PathResolver,
}

impl ForkExecutor {
    pub fn new() -> Self {
        ForkExecutor {
            resolver: PathResolver,
        }
    }

    fn spawn_all(
        &self,
        stages: &[PreparedStage],
        children: &mut Vec<Pid>,
    ) -> Result<(), ExecError> {
        let last = stages.len() - 1;
        // read end of the pipe feeding the next stage
        let mut upstream: Option<OwnedFd> = None;

        for (i, stage) in stages.iter().enumerate() {
            let downstream = if i < last {
                Some(pipe2(OFlag::O_CLOEXEC).map_err(ExecError::Pipe)?)
            } else {
                None
            };

            match unsafe { fork() }.map_err(ExecError::Spawn)? {
                ForkResult::Child => stage.exec_child(
                    upstream.as_ref().map(|fd| fd.as_raw_fd()),
                    downstream.as_ref().map(|(_, write)| write.as_raw_fd()),
                    downstream.as_ref().map(|(read, _)| read.as_raw_fd()),
                ),
                ForkResult::Parent { child } => {
                    debug!("stage {} ({}) started as pid {}", i, stage.program, child);
                    children.push(child);
                    // The child owns its copies now; keep only the read end
                    // for the next stage.
                    upstream = downstream.map(|(read, _write)| read);
                }
            }
        }
        Ok(())
    }
}

impl Default for ForkExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ForkExecutor {
    fn exec(&mut self, pipeline: &Pipeline, env: &mut Environment) -> ExecStatus {
        if pipeline.is_empty() {
            return Ok(0);
        }
        if pipeline.is_assignment_only() {
            for (name, value) in &pipeline.stages()[0].assignments {
                debug!("binding {}={}", name, value);
                env.set(name, value);
            }
            return Ok(0);
        }

        let stages = pipeline
            .stages()
            .iter()
            .map(|command| PreparedStage::prepare(command, env, &self.resolver))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("running {}", pipeline);
        let mut children = Vec::with_capacity(stages.len());
        if let Err(e) = self.spawn_all(&stages, &mut children) {
            // reap whatever already started; their pipes are closed by now
            for &pid in &children {
                let _ = wait_for(pid);
            }
            return Err(e);
        }

        let mut status = Ok(0);
        for &pid in &children {
            let result = wait_for(pid);
            if status.is_ok() {
                status = result;
            }
        }
        status
    }
}

fn wait_for(pid: Pid) -> ExecStatus {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                debug!("pid {} exited with {}", pid, code);
                return Ok(code);
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                debug!("pid {} killed by {:?}", pid, signal);
                return Ok(128 + signal as i32);
            }
            Ok(other) => trace!("pid {}: {:?}", pid, other),
            Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(ExecError::Wait {
                    pid: pid.as_raw(),
                    source,
                });
            }
        }
    }
}
