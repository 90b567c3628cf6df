use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::config::model::ConfigRecord;
use crate::config::options::{find_option, OptionDescriptor, Slot};
use crate::error::{ConfigError, PgVaultError, Result};
use crate::types::Source;
use crate::util::paths::instance_config_path;

/// One `key = value` line of a catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    pub line: usize,
    pub key: String,
    pub value: String,
}

/// Record under construction plus the source each field was last set from.
/// Setters write into this context only.
#[derive(Debug, Default)]
pub struct ResolveContext {
    record: ConfigRecord,
    sources: HashMap<Slot, Source>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_of(&self, slot: Slot) -> Source {
        self.sources.get(&slot).copied().unwrap_or(Source::Default)
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    pub fn set(&mut self, key: &str, raw: &str, source: Source) -> std::result::Result<(), ConfigError> {
        let desc = find_option(key).ok_or_else(|| ConfigError::UnknownOption(key.to_string()))?;
        self.set_option(desc, raw, source)
    }

    pub fn set_option(
        &mut self,
        desc: &OptionDescriptor,
        raw: &str,
        source: Source,
    ) -> std::result::Result<(), ConfigError> {
        if source > desc.allowed {
            return Err(ConfigError::SourceViolation {
                key: desc.name.to_string(),
                origin: source,
            });
        }
        let value = desc.parse(raw)?;
        let current = self.source_of(desc.slot);
        if current > source {
            debug!(key = desc.name, %current, %source, "keeping value from higher-precedence source");
            return Ok(());
        }
        desc.assign(&mut self.record, value)?;
        self.sources.insert(desc.slot, source);
        debug!(key = desc.name, %source, "option set");
        Ok(())
    }

    pub fn finish(self) -> std::result::Result<ConfigRecord, ConfigError> {
        for slot in [Slot::Pgdata, Slot::SystemIdentifier] {
            if self.source_of(slot) == Source::Default {
                let name = crate::config::options::OPTIONS
                    .iter()
                    .find(|d| d.slot == slot)
                    .map(|d| d.name)
                    .unwrap_or("?");
                return Err(ConfigError::MissingRequired(name.to_string()));
            }
        }
        Ok(self.record)
    }
}

pub fn parse_config_text(text: &str) -> std::result::Result<Vec<ConfigLine>, ConfigError> {
    let mut out = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw_line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (key, rest) = trimmed.split_once('=').ok_or_else(|| ConfigError::Parse {
            line,
            message: "expected key = value".to_string(),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::Parse {
                line,
                message: "missing key".to_string(),
            });
        }
        let value = parse_value(rest.trim_start()).map_err(|message| ConfigError::Parse { line, message })?;
        out.push(ConfigLine {
            line,
            key: key.to_string(),
            value,
        });
    }
    Ok(out)
}

fn parse_value(text: &str) -> std::result::Result<String, String> {
    let Some(quoted) = text.strip_prefix('\'') else {
        let end = text.find('#').unwrap_or(text.len());
        return Ok(text[..end].trim_end().to_string());
    };
    let mut value = String::new();
    let mut chars = quoted.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        if c != '\'' {
            value.push(c);
            continue;
        }
        if matches!(chars.peek(), Some((_, '\''))) {
            chars.next();
            value.push('\'');
            continue;
        }
        let tail = quoted[pos + 1..].trim();
        if !tail.is_empty() && !tail.starts_with('#') {
            return Err(format!("unexpected text after quoted value: {}", tail));
        }
        return Ok(value);
    }
    Err("unterminated quoted value".to_string())
}

/// Applies the file lines to `ctx` as file-sourced values.
pub fn apply_file(ctx: &mut ResolveContext, lines: &[ConfigLine]) -> std::result::Result<(), ConfigError> {
    for entry in lines {
        ctx.set(&entry.key, &entry.value, Source::File)?;
    }
    Ok(())
}

pub fn apply_overrides(
    ctx: &mut ResolveContext,
    overrides: &[(String, String)],
) -> std::result::Result<(), ConfigError> {
    for (key, value) in overrides {
        ctx.set(key, value, Source::Cmdline)?;
    }
    Ok(())
}

/// Defaults, then the catalog text, then command-line overrides.
pub fn resolve_text(text: &str, overrides: &[(String, String)]) -> std::result::Result<ConfigRecord, ConfigError> {
    let lines = parse_config_text(text)?;
    let mut ctx = ResolveContext::new();
    apply_file(&mut ctx, &lines)?;
    apply_overrides(&mut ctx, overrides)?;
    ctx.finish()
}

pub fn read_config_file(path: &Path) -> Result<String> {
    let mut contents = String::new();
    File::open(path)
        .map_err(|e| PgVaultError::message(format!("open {}: {}", path.display(), e)))?
        .read_to_string(&mut contents)
        .map_err(|e| PgVaultError::message(format!("read {}: {}", path.display(), e)))?;
    Ok(contents)
}

pub fn load_config(path: &Path, overrides: &[(String, String)]) -> Result<ConfigRecord> {
    let contents = read_config_file(path)?;
    let record = resolve_text(&contents, overrides)?;
    debug!(path = %path.display(), "configuration resolved");
    Ok(record)
}

pub fn resolve(instance_dir: &Path, overrides: &[(String, String)]) -> Result<ConfigRecord> {
    load_config(&instance_config_path(instance_dir), overrides)
}
