use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct PathResolver;

impl PathResolver {
    /// Names containing a `/` are taken as paths; anything else is looked up
    /// in `path_var` (a `PATH`-style list).
    pub fn resolve(&self, command: &str, path_var: Option<&str>) -> Option<PathBuf> {
        if command.is_empty() {
            return None;
        }

        if command.contains('/') {
            let path = Path::new(command);
            if path.is_file() {
                return Some(path.to_path_buf());
            } else {
                return None;
            }
        }

        env::split_paths(path_var?)
            .map(|dir| dir.join(command))
            .find(|full_path| is_executable(full_path))
    }
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
