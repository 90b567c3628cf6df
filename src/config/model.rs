use std::env;
use std::path::PathBuf;

use serde::Serialize;

use crate::types::{CompressAlg, LogLevel};

pub const DEFAULT_REPLICA_TIMEOUT: u64 = 300;
pub const DEFAULT_COMPRESS_LEVEL: i32 = 6;
pub const DEFAULT_PORT: &str = "5432";

/// Settings of one backup instance. `None` means "not configured"; an
/// explicit zero or `off` is kept as `Some`. Sizes are bytes, durations
/// seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigRecord {
    pub pgdata: PathBuf,
    pub system_identifier: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pgdatabase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pghost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pgport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pguser: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_db: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_timeout: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level_console: Option<LogLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level_file: Option<LogLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_directory: Option<String>,
    pub log_rotation_size: u64,
    pub log_rotation_age: u64,

    pub retention_redundancy: u32,
    pub retention_window: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress_alg: Option<CompressAlg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress_level: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub dbname: String,
    pub host: Option<String>,
    pub port: String,
    pub user: String,
}

impl ConfigRecord {
    pub fn replica_timeout_secs(&self) -> u64 {
        self.replica_timeout.unwrap_or(DEFAULT_REPLICA_TIMEOUT)
    }

    pub fn compress_level(&self) -> i32 {
        self.compress_level.unwrap_or(DEFAULT_COMPRESS_LEVEL)
    }

    pub fn compress_alg(&self) -> CompressAlg {
        self.compress_alg.unwrap_or(CompressAlg::None)
    }

    pub fn log_level_console(&self) -> LogLevel {
        self.log_level_console.unwrap_or(LogLevel::Info)
    }

    pub fn log_level_file(&self) -> LogLevel {
        self.log_level_file.unwrap_or(LogLevel::Off)
    }

    pub fn connection_target(&self) -> ConnectionTarget {
        self.connection_target_with(|key| env::var(key).ok())
    }

    /// Unset connection fields fall back to `lookup` (the `PG*` environment),
    /// then to libpq defaults.
    pub fn connection_target_with<F>(&self, lookup: F) -> ConnectionTarget
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |value: &Option<String>, key: &str| {
            value
                .clone()
                .or_else(|| lookup(key).filter(|v| !v.is_empty()))
        };
        let user = pick(&self.pguser, "PGUSER")
            .or_else(|| lookup("USER"))
            .unwrap_or_else(|| "postgres".to_string());
        ConnectionTarget {
            dbname: pick(&self.pgdatabase, "PGDATABASE").unwrap_or_else(|| user.clone()),
            host: pick(&self.pghost, "PGHOST"),
            port: pick(&self.pgport, "PGPORT").unwrap_or_else(|| DEFAULT_PORT.to_string()),
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_use_compiled_defaults() {
        let cfg = ConfigRecord::default();
        assert_eq!(cfg.replica_timeout_secs(), 300);
        assert_eq!(cfg.compress_level(), 6);
        assert_eq!(cfg.log_level_file(), LogLevel::Off);

        let explicit = ConfigRecord {
            replica_timeout: Some(0),
            ..ConfigRecord::default()
        };
        assert_eq!(explicit.replica_timeout_secs(), 0);
    }

    #[test]
    fn connection_falls_back_to_environment() {
        let cfg = ConfigRecord {
            pghost: Some("db1".to_string()),
            ..ConfigRecord::default()
        };
        let target = cfg.connection_target_with(|key| match key {
            "PGHOST" => Some("ignored".to_string()),
            "PGPORT" => Some("5433".to_string()),
            "USER" => Some("alice".to_string()),
            _ => None,
        });
        assert_eq!(target.host.as_deref(), Some("db1"));
        assert_eq!(target.port, "5433");
        assert_eq!(target.user, "alice");
        assert_eq!(target.dbname, "alice");
    }
}
