use std::collections::HashMap;
use std::ffi::OsString;

use log::warn;

#[derive(Debug, Clone, PartialEq)]
struct Variable {
    value: String,
    exported: bool,
}

/// Session variables: the process environment plus anything bound by
/// `NAME=value` lines or the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    vars: HashMap<String, Variable>,
}

impl Environment {
    pub fn new() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Imports `vars` as exported variables. Entries that are not valid
    /// UTF-8 are skipped.
    pub fn from_os_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut env = Environment::default();
        for (k, v) in vars {
            match (k.into_string(), v.into_string()) {
                (Ok(key), Ok(value)) => {
                    env.vars.insert(
                        key,
                        Variable {
                            value,
                            exported: true,
                        },
                    );
                }
                (Ok(key), Err(_)) => {
                    warn!("skipping environment variable {} with a non UTF-8 value", key)
                }
                (Err(key), _) => {
                    warn!("skipping environment variable {:?} with a non UTF-8 name", key)
                }
            }
        }
        env
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|v| v.value.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars
            .entry(key.to_string())
            .and_modify(|var| var.value = value.to_string())
            .or_insert(Variable {
                value: value.to_string(),
                exported: false,
            });
    }

    pub fn export(&mut self, key: &str) {
        if let Some(var) = self.vars.get_mut(key) {
            var.exported = true;
        }
    }

    pub fn exported_vars(&self) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = self
            .vars
            .iter()
            .filter(|(_, v)| v.exported)
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect();
        vars.sort();
        vars
    }

    /// Exported variables with per-command `NAME=value` pairs layered on top.
    /// Later assignments win.
    pub fn exported_with(&self, assignments: &[(String, String)]) -> Vec<(String, String)> {
        let mut vars = self.exported_vars();
        for (name, value) in assignments {
            match vars.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.clone(),
                None => vars.push((name.clone(), value.clone())),
            }
        }
        vars
    }
}
