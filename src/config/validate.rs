//! Config validation logic.

use anyhow::{bail, Result};

use super::types::Config;
use super::MAX_ATTEMPTS_CEILING;

impl Config {
    /// Reject values that would make every growable query fail or never stop.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if self.max_attempts > MAX_ATTEMPTS_CEILING {
            bail!(
                "max_attempts {} exceeds the ceiling of {}",
                self.max_attempts,
                MAX_ATTEMPTS_CEILING
            );
        }
        if self.initial_buffer_size == Some(0) {
            bail!("initial_buffer_size must be greater than zero");
        }
        if let Some(p) = &self.log_file {
            if p.as_os_str().is_empty() {
                bail!("log_file is empty");
            }
        }
        Ok(())
    }
}
