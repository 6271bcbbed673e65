//! Statement logging executor.
//!
//! No SQL Server driver is linked into this crate. [`DryRunExecutor`] stands
//! in for one: it logs each statement against the configured target and
//! reports no rows and no affected rows.

use crate::config::DatabaseConfig;
use crate::repository::{ExecError, SqlExecutor};
use crate::row::Row;

#[derive(Debug, Clone)]
pub struct DryRunExecutor {
    target: String,
    connection_string: String,
}

impl DryRunExecutor {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            target: format!("{},{}/{}", config.host, config.port, config.name),
            connection_string: config.ado_connection_string(),
        }
    }

    /// `host,port/database`, safe to log.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The connection string a driver-backed executor would open.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

impl SqlExecutor for DryRunExecutor {
    async fn query(&self, sql: &str) -> Result<Vec<Row>, ExecError> {
        tracing::info!(target_db = %self.target, sql, "dry-run query");
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str) -> Result<u64, ExecError> {
        tracing::info!(target_db = %self.target, sql, "dry-run statement");
        Ok(0)
    }
}
