use std::path::{Path, PathBuf};

use crate::error::{PgVaultError, Result};

pub const BACKUPS_DIR: &str = "backups";
pub const BACKUP_CATALOG_CONF_FILE: &str = "pg_probackup.conf";
pub const CONTROL_FILE: &str = "global/pg_control";
pub const PG_VERSION_FILE: &str = "PG_VERSION";

pub fn is_safe_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

pub fn instance_dir(backup_path: &Path, instance: &str) -> Result<PathBuf> {
    if !is_safe_name(instance) {
        return Err(PgVaultError::message(format!(
            "instance {} name must use only letters, digits, '.', '-', '_'",
            instance
        )));
    }
    Ok(backup_path.join(BACKUPS_DIR).join(instance))
}

pub fn instance_config_path(instance_dir: &Path) -> PathBuf {
    instance_dir.join(BACKUP_CATALOG_CONF_FILE)
}

pub fn control_file_path(pgdata: &Path) -> PathBuf {
    pgdata.join(CONTROL_FILE)
}

pub fn pg_version_path(pgdata: &Path) -> PathBuf {
    pgdata.join(PG_VERSION_FILE)
}
