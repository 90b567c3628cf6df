use std::path::Path;

use crate::config::load::resolve;
use crate::config::ConfigFormat;
use crate::control::identity::{check_system_identifier, ClusterIdentity, LocalControlFile};
use crate::control::ClusterFacts;
use crate::error::{PgVaultError, Result};

/// Prints the facts of a data directory. With an instance, the data
/// directory defaults to the configured one and its identifier must match.
pub fn run_control_info(
    pgdata: Option<&Path>,
    instance_dir: Option<&Path>,
    safe: bool,
    format: ConfigFormat,
) -> Result<()> {
    let config = match instance_dir {
        Some(dir) => Some(resolve(dir, &[])?),
        None => None,
    };
    let pgdata = match (pgdata, &config) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(cfg)) => cfg.pgdata.clone(),
        (None, None) => {
            return Err(PgVaultError::message(
                "required parameter not specified: PGDATA (-D, --pgdata)",
            ))
        }
    };

    let mut cluster = LocalControlFile::new(&pgdata).safe(safe);
    let facts = cluster.facts()?;
    let missing = safe && facts.system_identifier == 0;
    if let (Some(cfg), false) = (&config, missing) {
        check_system_identifier(&mut cluster, cfg)?;
    }
    print!("{}", render_facts(&facts, format)?);
    Ok(())
}

pub fn render_facts(facts: &ClusterFacts, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Ini => {
            let checksums = if facts.checksum_version == 0 {
                "disabled".to_string()
            } else {
                format!("enabled (version {})", facts.checksum_version)
            };
            Ok(format!(
                "system identifier: {}\ntimeline: {}\ndata checksums: {}\n",
                facts.system_identifier, facts.timeline, checksums
            ))
        }
        ConfigFormat::Yaml => serde_yaml::to_string(facts)
            .map_err(|e| PgVaultError::message(format!("encode facts: {}", e))),
    }
}
