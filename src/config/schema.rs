use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::ConfigError;

/// Connection settings for the node being probed
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    /// Hostname or IP of the node (also used as the `hostname` tag)
    pub hostname: String,
    /// MySQL username
    pub username: String,
    /// MySQL password
    pub password: String,
    /// Port number
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for connecting and reading status (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_port() -> u16 {
    3306
}

fn default_connect_timeout_ms() -> u64 {
    3000
}

impl ProbeConfig {
    /// Get the address string (host:port)
    pub fn addr(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// Reject values serde accepts but the probe cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hostname.trim().is_empty() {
            return Err(ConfigError::Invalid("hostname must not be empty".into()));
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::Invalid("username must not be empty".into()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "connect_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Expected replication group size, always at least 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSize(u32);

impl GroupSize {
    pub const MIN: u32 = 2;

    pub fn new(size: u32) -> Result<Self, ConfigError> {
        if size < Self::MIN {
            return Err(ConfigError::GroupSizeTooSmall(size.into()));
        }
        Ok(Self(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for GroupSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size: i64 = s
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("cluster size '{s}' is not an integer")))?;
        if size < i64::from(Self::MIN) {
            return Err(ConfigError::GroupSizeTooSmall(size));
        }
        let size = u32::try_from(size)
            .map_err(|_| ConfigError::Invalid(format!("cluster size {size} is too large")))?;
        Self::new(size)
    }
}

impl fmt::Display for GroupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
