use std::ffi::{CStr, CString, c_char, c_int};
use std::io;
use std::iter;
use std::os::fd::RawFd;
use std::os::unix::ffi::OsStrExt;
use std::ptr;

use log::warn;

use super::executor::ExecError;
use super::path_resolver::PathResolver;
use crate::ast::Command;
use crate::environment::Environment;

pub(super) const EXIT_REDIRECT_FAILED: i32 = 2;
pub(super) const EXIT_NOT_EXECUTABLE: i32 = 126;
pub(super) const EXIT_NOT_FOUND: i32 = 127;

/// Everything a forked child needs, built before the fork so the child
/// side never allocates.
pub(super) struct PreparedStage {
    pub program: String,
    path: Option<CString>,
    _argv: Vec<CString>,
    argv_ptrs: Vec<*const c_char>,
    _envp: Vec<CString>,
    envp_ptrs: Vec<*const c_char>,
    redirect_in: Option<CString>,
    redirect_out: Option<CString>,
    not_found_msg: Vec<u8>,
    exec_failed_msg: Vec<u8>,
    redirect_in_msg: Vec<u8>,
    redirect_out_msg: Vec<u8>,
}

impl PreparedStage {
    pub fn prepare(
        command: &Command,
        env: &Environment,
        resolver: &PathResolver,
    ) -> Result<Self, ExecError> {
        let vars = env.exported_with(&command.assignments);
        let path_var = vars
            .iter()
            .find(|(name, _)| name == "PATH")
            .map(|(_, value)| value.as_str());

        let path = resolver
            .resolve(&command.program, path_var)
            .map(|p| c_string(p.as_os_str().as_bytes()))
            .transpose()?;

        let argv = iter::once(&command.program)
            .chain(&command.args)
            .map(|arg| c_string(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;

        let envp: Vec<CString> = vars
            .into_iter()
            .filter_map(|(name, value)| match CString::new(format!("{}={}", name, value)) {
                Ok(entry) => Some(entry),
                Err(_) => {
                    warn!("skipping environment variable {} containing a NUL byte", name);
                    None
                }
            })
            .collect();

        let redirect_in = command
            .redirect_in
            .as_deref()
            .map(|f| c_string(f.as_bytes()))
            .transpose()?;
        let redirect_out = command
            .redirect_out
            .as_deref()
            .map(|f| c_string(f.as_bytes()))
            .transpose()?;

        let name = &command.program;
        Ok(PreparedStage {
            program: name.clone(),
            path,
            argv_ptrs: null_terminated(&argv),
            _argv: argv,
            envp_ptrs: null_terminated(&envp),
            _envp: envp,
            not_found_msg: format!("psh: {}: command not found\n", name).into_bytes(),
            exec_failed_msg: format!("psh: {}: cannot execute\n", name).into_bytes(),
            redirect_in_msg: format!(
                "psh: could not redirect stdin from file {}\n",
                command.redirect_in.as_deref().unwrap_or_default()
            )
            .into_bytes(),
            redirect_out_msg: format!(
                "psh: could not redirect stdout to file {}\n",
                command.redirect_out.as_deref().unwrap_or_default()
            )
            .into_bytes(),
            redirect_in,
            redirect_out,
        })
    }

    /// Child side of the fork: wire up the standard streams, apply the
    /// redirections and replace the process image. Never returns, and only
    /// makes async-signal-safe calls.
    pub fn exec_child(
        &self,
        stdin: Option<RawFd>,
        stdout: Option<RawFd>,
        unused: Option<RawFd>,
    ) -> ! {
        if let Some(fd) = stdin {
            rebind(fd, libc::STDIN_FILENO);
        }
        if let Some(fd) = stdout {
            rebind(fd, libc::STDOUT_FILENO);
        }
        if let Some(fd) = unused {
            unsafe { libc::close(fd) };
        }

        // The interpreter ignores SIGPIPE; programs expect the default.
        unsafe { libc::signal(libc::SIGPIPE, libc::SIG_DFL) };

        if let Some(file) = &self.redirect_in {
            if !reopen(file, libc::O_RDONLY, libc::STDIN_FILENO) {
                child_exit(&self.redirect_in_msg, EXIT_REDIRECT_FAILED);
            }
        }
        if let Some(file) = &self.redirect_out {
            let flags = libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC;
            if !reopen(file, flags, libc::STDOUT_FILENO) {
                child_exit(&self.redirect_out_msg, EXIT_REDIRECT_FAILED);
            }
        }

        let Some(path) = &self.path else {
            child_exit(&self.not_found_msg, EXIT_NOT_FOUND);
        };
        unsafe {
            libc::execve(path.as_ptr(), self.argv_ptrs.as_ptr(), self.envp_ptrs.as_ptr());
        }
        let code = match io::Error::last_os_error().raw_os_error() {
            Some(libc::ENOENT) => EXIT_NOT_FOUND,
            _ => EXIT_NOT_EXECUTABLE,
        };
        child_exit(&self.exec_failed_msg, code)
    }
}

fn c_string(bytes: &[u8]) -> Result<CString, ExecError> {
    CString::new(bytes)
        .map_err(|_| ExecError::InvalidArgument(String::from_utf8_lossy(bytes).into_owned()))
}

fn null_terminated(strings: &[CString]) -> Vec<*const c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr())
        .chain(iter::once(ptr::null()))
        .collect()
}

fn rebind(fd: RawFd, target: c_int) {
    unsafe {
        if fd == target {
            // already in place, but pipe ends carry FD_CLOEXEC
            libc::fcntl(fd, libc::F_SETFD, 0);
        } else {
            libc::dup2(fd, target);
            libc::close(fd);
        }
    }
}

fn reopen(path: &CStr, flags: c_int, target: c_int) -> bool {
    let fd = unsafe { libc::open(path.as_ptr(), flags, 0o666 as libc::c_uint) };
    if fd < 0 {
        return false;
    }
    rebind(fd, target);
    true
}

fn child_exit(msg: &[u8], code: i32) -> ! {
    unsafe {
        libc::write(libc::STDERR_FILENO, msg.as_ptr().cast(), msg.len());
        libc::_exit(code)
    }
}
