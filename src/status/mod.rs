//! Status source for the probed node
//!
//! This module provides:
//! - `RawStatus`, the loosely typed name -> value snapshot of status variables
//! - The `StatusSource` seam the probe pipeline fetches from
//! - `MysqlStatusSource`, which reads `SHOW GLOBAL STATUS` over the wire

mod connection;
mod source;

use std::collections::HashMap;

pub use connection::ConnectionError;
pub use source::MysqlStatusSource;

/// Snapshot of status variables from one node at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStatus(HashMap<String, String>);

impl RawStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a status variable by its exact name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Insert a variable, later values win
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawStatus {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Error while fetching status from the node
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("status source unavailable")]
    Unavailable(#[from] ConnectionError),
    #[error("status source timed out after {0}ms")]
    Timeout(u64),
}

/// Anything able to produce a status snapshot
pub trait StatusSource {
    async fn fetch(&self) -> Result<RawStatus, SourceError>;
}
