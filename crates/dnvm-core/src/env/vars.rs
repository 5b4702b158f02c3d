//! Variable stores

use std::collections::HashMap;

use crate::error::Result;

/// A persistent key / value store of user environment variables
pub trait UserVarStore {
    fn get(&self, name: &str) -> Result<Option<String>>;

    fn set(&mut self, name: &str, value: &str) -> Result<()>;

    /// Machine-wide `PATH`, when the platform has one separate from the user's
    fn system_path(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Variables of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessVarStore;

impl UserVarStore for ProcessVarStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(std::env::var(name).ok())
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        std::env::set_var(name, value);
        Ok(())
    }
}

/// In-memory store, for tests and dry runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryVarStore {
    vars: HashMap<String, String>,
}

impl MemoryVarStore {
    pub fn with(vars: &[(&str, &str)]) -> Self {
        Self {
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }
}

impl UserVarStore for MemoryVarStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.vars.get(name).cloned())
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.vars.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
