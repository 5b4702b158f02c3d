//! Per-user environment variables in the Windows registry

use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_SET_VALUE};
use winreg::RegKey;

use super::vars::UserVarStore;
use crate::error::Result;

const USER_ENVIRONMENT: &str = "Environment";
const SYSTEM_ENVIRONMENT: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

/// `HKCU\Environment`
#[derive(Debug, Default)]
pub struct RegistryVarStore;

impl RegistryVarStore {
    pub fn new() -> Self {
        Self
    }
}

fn read_value(key: &RegKey, name: &str) -> Option<String> {
    key.get_value::<String, _>(name).ok()
}

impl UserVarStore for RegistryVarStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let key = RegKey::predef(HKEY_CURRENT_USER).open_subkey_with_flags(USER_ENVIRONMENT, KEY_READ)?;
        Ok(read_value(&key, name))
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let key = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey_with_flags(USER_ENVIRONMENT, KEY_READ | KEY_SET_VALUE)?;
        key.set_value(name, &value)?;
        tracing::debug!("Set user variable {} in the registry", name);
        Ok(())
    }

    fn system_path(&self) -> Result<Option<String>> {
        match RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey_with_flags(SYSTEM_ENVIRONMENT, KEY_READ) {
            Ok(key) => Ok(read_value(&key, "Path")),
            Err(e) => {
                tracing::debug!("Could not read the system PATH: {}", e);
                Ok(None)
            }
        }
    }
}
