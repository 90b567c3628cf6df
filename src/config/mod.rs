pub mod load;
pub mod model;
pub mod options;
pub mod save;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::load::{apply_file, parse_config_text, read_config_file, ResolveContext};
use crate::config::model::ConfigRecord;
use crate::config::options::{find_option, Slot};
use crate::config::save::{save_config, serialize};
use crate::control::identity::{ClusterIdentity, LocalControlFile};
use crate::error::{ConfigError, PgVaultError, Result};
use crate::types::Source;
use crate::util::paths::{instance_config_path, instance_dir};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Ini,
    Yaml,
}

pub fn render(record: &ConfigRecord, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Ini => Ok(serialize(record)?),
        ConfigFormat::Yaml => serde_yaml::to_string(record)
            .map_err(|e| PgVaultError::message(format!("encode config: {}", e))),
    }
}

/// Rewrites the instance file with `updates` applied. Updated values are
/// destined for the file, so strict-file keys are accepted; the system
/// identifier is always derived and never accepted. With `show_only` the
/// new text is returned and nothing is written.
pub fn set_config(
    instance_dir: &Path,
    updates: &[(String, String)],
    show_only: bool,
) -> Result<String> {
    let path = instance_config_path(instance_dir);
    let lines = parse_config_text(&read_config_file(&path)?)?;
    let mut ctx = ResolveContext::new();
    apply_file(&mut ctx, &lines)?;
    for (key, value) in updates {
        let desc = find_option(key).ok_or_else(|| ConfigError::UnknownOption(key.clone()))?;
        if desc.slot == Slot::SystemIdentifier {
            return Err(ConfigError::SourceViolation {
                key: desc.name.to_string(),
                origin: Source::Cmdline,
            }
            .into());
        }
        ctx.set_option(desc, value, Source::File)?;
    }
    let record = ctx.finish()?;
    let text = serialize(&record)?;
    if !show_only {
        save_config(&path, &record)?;
    }
    Ok(text)
}

/// Registers an instance: derives the cluster identity from the data
/// directory and writes the initial catalog file.
pub fn add_instance(backup_path: &Path, instance: &str, pgdata: &Path) -> Result<ConfigRecord> {
    let dir = instance_dir(backup_path, instance)?;
    let path = instance_config_path(&dir);
    if path.exists() {
        return Err(PgVaultError::message(format!(
            "instance {} already exists: {}",
            instance,
            path.display()
        )));
    }
    let desc = find_option("PGDATA").ok_or_else(|| ConfigError::UnknownOption("PGDATA".to_string()))?;
    let raw = pgdata.to_str().ok_or_else(|| ConfigError::InvalidValue {
        key: desc.name.to_string(),
        message: format!("{:?} is not valid UTF-8", pgdata),
    })?;
    let value = desc.parse(raw)?;

    let mut cluster = LocalControlFile::new(pgdata);
    let system_identifier = cluster.system_identifier()?;
    let mut record = ConfigRecord {
        system_identifier,
        ..ConfigRecord::default()
    };
    desc.assign(&mut record, value)?;
    fs::create_dir_all(&dir)
        .map_err(|e| PgVaultError::message(format!("create {}: {}", dir.display(), e)))?;
    save_config(&path, &record)?;
    info!(instance, system_identifier, "instance added");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load::resolve;
    use crate::control::fixture::{write_data_dir, FixtureCluster};
    use tempfile::TempDir;

    fn ov(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn add_instance_then_set_config() {
        let pgdata = TempDir::new().expect("tempdir");
        let catalog = TempDir::new().expect("tempdir");
        let cluster = FixtureCluster::default();
        write_data_dir(pgdata.path(), &cluster);

        let record = add_instance(catalog.path(), "main", pgdata.path()).expect("add");
        assert_eq!(record.system_identifier, cluster.system_identifier);
        assert!(add_instance(catalog.path(), "main", pgdata.path()).is_err());

        let dir = instance_dir(catalog.path(), "main").unwrap();
        let shown = set_config(&dir, &ov(&[("retention-window", "7")]), true).expect("show");
        assert!(shown.contains("retention-window = 7\n"));
        assert_eq!(resolve(&dir, &[]).unwrap().retention_window, 0);

        set_config(&dir, &ov(&[("retention-window", "7"), ("pghost", "db1")]), false)
            .expect("set");
        let cfg = resolve(&dir, &[]).expect("resolve");
        assert_eq!(cfg.retention_window, 7);
        assert_eq!(cfg.pghost.as_deref(), Some("db1"));
        assert_eq!(cfg.system_identifier, cluster.system_identifier);
    }

    #[test]
    fn set_config_refuses_system_identifier() {
        let catalog = TempDir::new().expect("tempdir");
        let dir = catalog.path().join("inst");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            instance_config_path(&dir),
            "PGDATA = /d\nsystem-identifier = 5\n",
        )
        .unwrap();
        let err = set_config(&dir, &ov(&[("system-identifier", "6")]), false).unwrap_err();
        assert!(matches!(
            err,
            PgVaultError::Config(ConfigError::SourceViolation { .. })
        ));
        assert!(fs::read_to_string(instance_config_path(&dir))
            .unwrap()
            .contains("system-identifier = 5"));
    }

    #[test]
    fn add_instance_refuses_multiline_pgdata() {
        let root = TempDir::new().expect("tempdir");
        let catalog = TempDir::new().expect("tempdir");
        let pgdata = root.path().join("d\nretention-window = 9");
        write_data_dir(&pgdata, &FixtureCluster::default());

        let err = add_instance(catalog.path(), "main", &pgdata).unwrap_err();
        assert!(matches!(
            err,
            PgVaultError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "PGDATA"
        ));
        let dir = instance_dir(catalog.path(), "main").unwrap();
        assert!(!instance_config_path(&dir).exists());
    }

    #[test]
    fn set_config_refuses_multiline_value() {
        let catalog = TempDir::new().expect("tempdir");
        let dir = catalog.path().join("inst");
        fs::create_dir_all(&dir).unwrap();
        let original = "PGDATA = /d\nsystem-identifier = 5\n";
        fs::write(instance_config_path(&dir), original).unwrap();

        let err = set_config(&dir, &ov(&[("pghost", "db1\nretention-window = 9")]), false)
            .unwrap_err();
        assert!(matches!(
            err,
            PgVaultError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "PGHOST"
        ));
        assert_eq!(fs::read_to_string(instance_config_path(&dir)).unwrap(), original);
    }

    #[test]
    fn yaml_rendering() {
        let record = ConfigRecord {
            pgdata: "/d".into(),
            system_identifier: 9,
            retention_window: 2,
            ..ConfigRecord::default()
        };
        let yaml = render(&record, ConfigFormat::Yaml).expect("yaml");
        assert!(yaml.contains("pgdata: /d"));
        assert!(yaml.contains("retention-window: 2"));
        assert!(!yaml.contains("pghost"));
    }
}
