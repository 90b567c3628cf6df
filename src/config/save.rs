use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::config::model::ConfigRecord;
use crate::config::options::{OptionKind, OPTIONS};
use crate::error::{ConfigError, PgVaultError, Result};

/// Canonical catalog text: every section header in fixed order, one line per
/// set field, identity fields first.
pub fn serialize(record: &ConfigRecord) -> std::result::Result<String, ConfigError> {
    let mut out = String::new();
    let mut section = None;
    for desc in OPTIONS {
        if section != Some(desc.section) {
            section = Some(desc.section);
            out.push_str(desc.section.header());
            out.push('\n');
        }
        let Some(value) = desc.render(record)? else {
            continue;
        };
        let value = if desc.kind == OptionKind::Str {
            quote_if_needed(&value)
        } else {
            value
        };
        out.push_str(desc.name);
        out.push_str(" = ");
        out.push_str(&value);
        out.push('\n');
    }
    Ok(out)
}

fn quote_if_needed(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.contains(['#', '\''])
        || value.trim() != value;
    if needs_quotes {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        value.to_string()
    }
}

pub fn save_config(path: &Path, record: &ConfigRecord) -> Result<()> {
    let data = serialize(record)?;
    let mut file = File::create(path)
        .map_err(|e| PgVaultError::message(format!("write config {}: {}", path.display(), e)))?;
    file.write_all(data.as_bytes())
        .map_err(|e| PgVaultError::message(format!("write config {}: {}", path.display(), e)))?;
    info!(path = %path.display(), "configuration written");
    Ok(())
}
