use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ProbeConfig;

use super::connection::StatusConnection;
use super::{RawStatus, SourceError, StatusSource};

/// Queries covering the replication (`wsrep_%`) and workload (`com_%`) families
pub const STATUS_QUERIES: [&str; 2] = [
    "SHOW GLOBAL STATUS LIKE 'wsrep_%'",
    "SHOW GLOBAL STATUS LIKE 'com_%'",
];

/// Reads status variables from a live node over one connection
pub struct MysqlStatusSource {
    config: ProbeConfig,
}

impl MysqlStatusSource {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    async fn read_status(&self) -> Result<RawStatus, SourceError> {
        let mut conn = StatusConnection::connect(&self.config).await?;
        info!(
            addr = %self.config.addr(),
            server_version = %conn.server_version(),
            "Connected to node"
        );

        let mut status = RawStatus::new();
        for sql in STATUS_QUERIES {
            for row in conn.query(sql).await? {
                match (row.first(), row.get(1)) {
                    (Some(Some(name)), Some(Some(value))) => {
                        status.insert(name.as_str(), value.as_str())
                    }
                    (Some(Some(name)), _) => debug!(name = %name, "Skipping NULL status value"),
                    _ => debug!("Skipping status row without a name"),
                }
            }
        }

        conn.quit().await;
        info!(variables = status.len(), "Read status snapshot");
        Ok(status)
    }
}

impl StatusSource for MysqlStatusSource {
    async fn fetch(&self) -> Result<RawStatus, SourceError> {
        let timeout_ms = self.config.connect_timeout_ms;
        match tokio::time::timeout(Duration::from_millis(timeout_ms), self.read_status()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(addr = %self.config.addr(), timeout_ms, "Status fetch timed out");
                Err(SourceError::Timeout(timeout_ms))
            }
        }
    }
}
