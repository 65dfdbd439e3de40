use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::environment::Environment;

pub const DEFAULT_PROMPT: &str = "psh-$ ";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub prompt: String,
    pub greeting: bool,
    pub env_vars: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

impl Config {
    /// Exports the `env.*` entries into the session.
    pub fn apply(&self, env: &mut Environment) {
        for (name, value) in &self.env_vars {
            env.set(name, value);
            env.export(name);
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            prompt: DEFAULT_PROMPT.to_string(),
            greeting: true,
            env_vars: HashMap::new(),
        }
    }

    /// `$PSH_CONFIG` if set, otherwise `~/.pshrc`.
    pub fn default_path(env: &Environment) -> Option<PathBuf> {
        if let Some(path) = env.get("PSH_CONFIG") {
            return Some(PathBuf::from(path));
        }
        env.get("HOME").map(|home| Path::new(home).join(".pshrc"))
    }

    /// Loads the config at `path`, falling back to the defaults when there
    /// is no such file.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) if path.exists() => {
                debug!("loading config from {}", path.display());
                Self::load_from_file(path)
            }
            _ => Ok(Self::default_config()),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let mut src = String::new();
        for line in BufReader::new(file).lines() {
            src.push_str(&line?);
            src.push('\n');
        }
        Self::load_from_str(&src)
    }

    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut prompt = None;
        let mut greeting = None;
        let mut env_vars = HashMap::new();

        for (lineno, line) in src.lines().enumerate() {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse(format!(
                    "Line {}: No '=' found: {}",
                    lineno + 1,
                    line
                )));
            };
            let key = key.trim();

            match key {
                // keep trailing spaces, they matter in a prompt
                "prompt" => prompt = Some(value.trim_start().to_string()),
                "greeting" => match value.trim() {
                    "true" => greeting = Some(true),
                    "false" => greeting = Some(false),
                    _ => {
                        return Err(ConfigError::Parse(format!(
                            "Line {}: Invalid bool: {}",
                            lineno + 1,
                            line
                        )));
                    }
                },
                k if k.starts_with("env.") => {
                    let var = k.trim_start_matches("env.").to_string();
                    if var.is_empty() {
                        return Err(ConfigError::Parse(format!(
                            "Line {}: Missing variable name: {}",
                            lineno + 1,
                            line
                        )));
                    }
                    env_vars.insert(var, value.trim().to_string());
                }
                _ => {
                    return Err(ConfigError::Parse(format!(
                        "Line {}: Unknown key: {}",
                        lineno + 1,
                        key
                    )));
                }
            }
        }

        let default = ConfigLoader::default_config();
        Ok(Config {
            prompt: prompt.unwrap_or(default.prompt),
            greeting: greeting.unwrap_or(default.greeting),
            env_vars,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_for_empty_source() {
        let config = ConfigLoader::load_from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.prompt, "psh-$ ");
        assert!(config.greeting);
    }

    #[test]
    fn test_load_from_str() {
        let src = "# comment\nprompt=> \ngreeting = false\nenv.EDITOR=vi\n\n";
        let config = ConfigLoader::load_from_str(src).unwrap();
        assert_eq!(config.prompt, "> ");
        assert!(!config.greeting);
        assert_eq!(config.env_vars.get("EDITOR").map(String::as_str), Some("vi"));
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = ConfigLoader::load_from_str("prompt=$ \nbogus").unwrap_err();
        assert_eq!(err.to_string(), "Parse error: Line 2: No '=' found: bogus");

        let err = ConfigLoader::load_from_str("colour=red").unwrap_err();
        assert_eq!(err.to_string(), "Parse error: Line 1: Unknown key: colour");

        assert!(ConfigLoader::load_from_str("greeting=maybe").is_err());
        assert!(ConfigLoader::load_from_str("env.=x").is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load(Some(dir.path().join("missing").as_path())).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(ConfigLoader::load(None).unwrap(), Config::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pshrc");
        fs::write(&path, "greeting=false\n").unwrap();
        let config = ConfigLoader::load(Some(path.as_path())).unwrap();
        assert!(!config.greeting);
    }

    #[test]
    fn test_default_path() {
        let mut env = Environment::default();
        assert_eq!(ConfigLoader::default_path(&env), None);
        env.set("HOME", "/home/test");
        assert_eq!(ConfigLoader::default_path(&env), Some(PathBuf::from("/home/test/.pshrc")));
        env.set("PSH_CONFIG", "/etc/psh.conf");
        assert_eq!(ConfigLoader::default_path(&env), Some(PathBuf::from("/etc/psh.conf")));
    }

    #[test]
    fn test_apply_exports_variables() {
        let config = ConfigLoader::load_from_str("env.PSH_TEST=1").unwrap();
        let mut env = Environment::default();
        config.apply(&mut env);
        assert_eq!(env.exported_vars(), vec![("PSH_TEST".to_string(), "1".to_string())]);
    }
}
