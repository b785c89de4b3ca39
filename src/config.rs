use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lease::Lease;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub leases_file: PathBuf,
    pub pretty: bool,
    pub binding_states: Vec<String>,
    pub active_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leases_file: PathBuf::from("/var/lib/dhcp/dhcpd.leases"),
            pretty: true,
            binding_states: Vec::new(),
            active_only: false,
        }
    }
}

impl Config {
    /// Loads the config file if it exists, otherwise returns the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.leases_file.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "leases_file must not be empty".to_string(),
            ));
        }

        if let Some(index) = self
            .binding_states
            .iter()
            .position(|state| state.trim().is_empty())
        {
            return Err(Error::InvalidConfig(format!(
                "binding_states[{}] must not be empty",
                index
            )));
        }

        Ok(())
    }

    /// Returns true if the lease passes the configured filters at `now`.
    pub fn matches(&self, lease: &Lease, now: DateTime<Utc>) -> bool {
        if self.active_only && !lease.is_active_at(now) {
            return false;
        }

        if self.binding_states.is_empty() {
            return true;
        }
        lease
            .binding_state
            .as_deref()
            .is_some_and(|state| self.binding_states.iter().any(|wanted| wanted == state))
    }
}
