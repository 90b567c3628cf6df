use std::path::PathBuf;

use crate::config::model::ConfigRecord;
use crate::error::ConfigError;
use crate::types::{CompressAlg, LogLevel, Source};
use crate::util::units::{format_base, parse_magnitude, Unit, UnitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Str,
    Unsigned { max: u64 },
    Identifier,
    LogLevel,
    CompressAlg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Instance,
    Connection,
    Replica,
    Logging,
    Retention,
    Compression,
}

impl Section {
    pub fn header(&self) -> &'static str {
        match self {
            Section::Instance => "#Backup instance info",
            Section::Connection => "#Connection parameters:",
            Section::Replica => "#Replica parameters:",
            Section::Logging => "#Logging parameters:",
            Section::Retention => "#Retention parameters:",
            Section::Compression => "#Compression parameters:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Pgdata,
    SystemIdentifier,
    Pgdatabase,
    Pghost,
    Pgport,
    Pguser,
    MasterHost,
    MasterPort,
    MasterDb,
    MasterUser,
    ReplicaTimeout,
    LogLevelConsole,
    LogLevelFile,
    LogFilename,
    ErrorLogFilename,
    LogDirectory,
    LogRotationSize,
    LogRotationAge,
    RetentionRedundancy,
    RetentionWindow,
    CompressAlgorithm,
    CompressLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Unsigned(u64),
    Level(LogLevel),
    Compress(CompressAlg),
}

#[derive(Debug, Clone, Copy)]
pub struct OptionDescriptor {
    /// Canonical spelling, also used when writing the file.
    pub name: &'static str,
    pub kind: OptionKind,
    pub slot: Slot,
    /// Highest source allowed to set the key.
    pub allowed: Source,
    pub unit: Option<Unit>,
    pub section: Section,
}

const fn opt(
    name: &'static str,
    kind: OptionKind,
    slot: Slot,
    allowed: Source,
    unit: Option<Unit>,
    section: Section,
) -> OptionDescriptor {
    OptionDescriptor {
        name,
        kind,
        slot,
        allowed,
        unit,
        section,
    }
}

const U32_MAX: u64 = u32::MAX as u64;

/// Ordered as written by the serializer.
pub const OPTIONS: &[OptionDescriptor] = &[
    opt("PGDATA", OptionKind::Str, Slot::Pgdata, Source::File, None, Section::Instance),
    opt("system-identifier", OptionKind::Identifier, Slot::SystemIdentifier, Source::File, None, Section::Instance),
    opt("PGDATABASE", OptionKind::Str, Slot::Pgdatabase, Source::File, None, Section::Connection),
    opt("PGHOST", OptionKind::Str, Slot::Pghost, Source::File, None, Section::Connection),
    opt("PGPORT", OptionKind::Str, Slot::Pgport, Source::File, None, Section::Connection),
    opt("PGUSER", OptionKind::Str, Slot::Pguser, Source::File, None, Section::Connection),
    opt("master-host", OptionKind::Str, Slot::MasterHost, Source::File, None, Section::Replica),
    opt("master-port", OptionKind::Str, Slot::MasterPort, Source::File, None, Section::Replica),
    opt("master-db", OptionKind::Str, Slot::MasterDb, Source::File, None, Section::Replica),
    opt("master-user", OptionKind::Str, Slot::MasterUser, Source::File, None, Section::Replica),
    opt("replica-timeout", OptionKind::Unsigned { max: U32_MAX }, Slot::ReplicaTimeout, Source::Cmdline, Some(Unit::S), Section::Replica),
    opt("log-level-console", OptionKind::LogLevel, Slot::LogLevelConsole, Source::Cmdline, None, Section::Logging),
    opt("log-level-file", OptionKind::LogLevel, Slot::LogLevelFile, Source::Cmdline, None, Section::Logging),
    opt("log-filename", OptionKind::Str, Slot::LogFilename, Source::Cmdline, None, Section::Logging),
    opt("error-log-filename", OptionKind::Str, Slot::ErrorLogFilename, Source::Cmdline, None, Section::Logging),
    opt("log-directory", OptionKind::Str, Slot::LogDirectory, Source::Cmdline, None, Section::Logging),
    opt("log-rotation-size", OptionKind::Unsigned { max: u64::MAX }, Slot::LogRotationSize, Source::Cmdline, Some(Unit::KB), Section::Logging),
    opt("log-rotation-age", OptionKind::Unsigned { max: u64::MAX }, Slot::LogRotationAge, Source::Cmdline, Some(Unit::S), Section::Logging),
    opt("retention-redundancy", OptionKind::Unsigned { max: U32_MAX }, Slot::RetentionRedundancy, Source::File, None, Section::Retention),
    opt("retention-window", OptionKind::Unsigned { max: U32_MAX }, Slot::RetentionWindow, Source::File, None, Section::Retention),
    opt("compress-algorithm", OptionKind::CompressAlg, Slot::CompressAlgorithm, Source::Cmdline, None, Section::Compression),
    opt("compress-level", OptionKind::Unsigned { max: 9 }, Slot::CompressLevel, Source::Cmdline, None, Section::Compression),
];

/// Keys compare case-insensitively with `_` and `-` treated alike.
pub fn key_equals(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes().zip(b.bytes()).all(|(x, y)| {
            let norm = |c: u8| if c == b'_' { b'-' } else { c.to_ascii_lowercase() };
            norm(x) == norm(y)
        })
}

pub fn find_option(key: &str) -> Option<&'static OptionDescriptor> {
    OPTIONS.iter().find(|desc| key_equals(desc.name, key))
}

impl OptionDescriptor {
    pub fn parse(&self, raw: &str) -> Result<Value, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: self.name.to_string(),
            message,
        };
        match self.kind {
            OptionKind::Str => {
                if raw.contains(['\n', '\r']) {
                    return Err(invalid("value must not contain line breaks".to_string()));
                }
                Ok(Value::Text(raw.to_string()))
            }
            OptionKind::Unsigned { max } => {
                let value = match self.unit {
                    Some(unit) => parse_magnitude(raw, unit.class(), Some(unit)).map_err(|e| match e {
                        UnitError::InvalidUnit(unit) => ConfigError::InvalidUnit {
                            key: self.name.to_string(),
                            unit,
                        },
                        UnitError::InvalidValue(message) => invalid(message),
                    })?,
                    None => raw
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("{:?} is not an unsigned integer", raw)))?,
                };
                if value > max {
                    return Err(invalid(format!("{} is outside the range 0..{}", raw.trim(), max)));
                }
                Ok(Value::Unsigned(value))
            }
            OptionKind::Identifier => raw
                .trim()
                .parse::<u64>()
                .map(Value::Unsigned)
                .map_err(|_| invalid(format!("{:?} is not a 64-bit unsigned integer", raw))),
            OptionKind::LogLevel => LogLevel::parse(raw).map(Value::Level).map_err(invalid),
            OptionKind::CompressAlg => CompressAlg::parse(raw).map(Value::Compress).map_err(invalid),
        }
    }

    /// Stores a value produced by [`OptionDescriptor::parse`] of the same
    /// descriptor into `target`.
    pub fn assign(&self, target: &mut ConfigRecord, value: Value) -> Result<(), ConfigError> {
        match (self.slot, value) {
            (Slot::Pgdata, Value::Text(v)) => target.pgdata = PathBuf::from(v),
            (Slot::SystemIdentifier, Value::Unsigned(v)) => target.system_identifier = v,
            (Slot::Pgdatabase, Value::Text(v)) => target.pgdatabase = Some(v),
            (Slot::Pghost, Value::Text(v)) => target.pghost = Some(v),
            (Slot::Pgport, Value::Text(v)) => target.pgport = Some(v),
            (Slot::Pguser, Value::Text(v)) => target.pguser = Some(v),
            (Slot::MasterHost, Value::Text(v)) => target.master_host = Some(v),
            (Slot::MasterPort, Value::Text(v)) => target.master_port = Some(v),
            (Slot::MasterDb, Value::Text(v)) => target.master_db = Some(v),
            (Slot::MasterUser, Value::Text(v)) => target.master_user = Some(v),
            (Slot::ReplicaTimeout, Value::Unsigned(v)) => target.replica_timeout = Some(v),
            (Slot::LogLevelConsole, Value::Level(v)) => target.log_level_console = Some(v),
            (Slot::LogLevelFile, Value::Level(v)) => target.log_level_file = Some(v),
            (Slot::LogFilename, Value::Text(v)) => target.log_filename = Some(v),
            (Slot::ErrorLogFilename, Value::Text(v)) => target.error_log_filename = Some(v),
            (Slot::LogDirectory, Value::Text(v)) => target.log_directory = Some(v),
            (Slot::LogRotationSize, Value::Unsigned(v)) => target.log_rotation_size = v,
            (Slot::LogRotationAge, Value::Unsigned(v)) => target.log_rotation_age = v,
            (Slot::RetentionRedundancy, Value::Unsigned(v)) => {
                target.retention_redundancy = narrow(self.name, v)?
            }
            (Slot::RetentionWindow, Value::Unsigned(v)) => {
                target.retention_window = narrow(self.name, v)?
            }
            (Slot::CompressAlgorithm, Value::Compress(v)) => target.compress_alg = Some(v),
            (Slot::CompressLevel, Value::Unsigned(v)) => {
                target.compress_level = Some(narrow(self.name, v)?)
            }
            (slot, value) => {
                return Err(ConfigError::InvalidValue {
                    key: self.name.to_string(),
                    message: format!("{:?} cannot hold {:?}", slot, value),
                })
            }
        }
        Ok(())
    }

    /// Textual form of the field for the catalog file, or `None` when the
    /// field is unset and should be omitted. Strings are returned unquoted
    /// and must fit on one line.
    pub fn render(&self, record: &ConfigRecord) -> Result<Option<String>, ConfigError> {
        let text = self.render_raw(record)?;
        if let Some(value) = &text {
            if value.contains(['\n', '\r']) {
                return Err(ConfigError::InvalidValue {
                    key: self.name.to_string(),
                    message: "value must not contain line breaks".to_string(),
                });
            }
        }
        Ok(text)
    }

    fn render_raw(&self, record: &ConfigRecord) -> Result<Option<String>, ConfigError> {
        let sized = |v: u64| {
            if v == 0 {
                None
            } else {
                Some(self.format_unsigned(v))
            }
        };
        let text = match self.slot {
            Slot::Pgdata => {
                let path = record.pgdata.to_str().ok_or_else(|| ConfigError::InvalidValue {
                    key: self.name.to_string(),
                    message: format!("{:?} is not valid UTF-8", record.pgdata),
                })?;
                Some(path.to_string())
            }
            Slot::SystemIdentifier => Some(record.system_identifier.to_string()),
            Slot::Pgdatabase => record.pgdatabase.clone(),
            Slot::Pghost => record.pghost.clone(),
            Slot::Pgport => record.pgport.clone(),
            Slot::Pguser => record.pguser.clone(),
            Slot::MasterHost => record.master_host.clone(),
            Slot::MasterPort => record.master_port.clone(),
            Slot::MasterDb => record.master_db.clone(),
            Slot::MasterUser => record.master_user.clone(),
            Slot::ReplicaTimeout => record.replica_timeout.map(|v| self.format_unsigned(v)),
            Slot::LogLevelConsole => record.log_level_console.map(|v| v.as_str().to_string()),
            Slot::LogLevelFile => record.log_level_file.map(|v| v.as_str().to_string()),
            Slot::LogFilename => record.log_filename.clone(),
            Slot::ErrorLogFilename => record.error_log_filename.clone(),
            Slot::LogDirectory => record.log_directory.clone(),
            Slot::LogRotationSize => sized(record.log_rotation_size),
            Slot::LogRotationAge => sized(record.log_rotation_age),
            Slot::RetentionRedundancy => sized(u64::from(record.retention_redundancy)),
            Slot::RetentionWindow => sized(u64::from(record.retention_window)),
            Slot::CompressAlgorithm => record.compress_alg.map(|v| v.as_str().to_string()),
            Slot::CompressLevel => record.compress_level.map(|v| v.to_string()),
        };
        Ok(text)
    }

    fn format_unsigned(&self, value: u64) -> String {
        match self.unit {
            Some(unit) => format_base(value, unit.class()),
            None => value.to_string(),
        }
    }
}

fn narrow<T: TryFrom<u64>>(key: &str, value: u64) -> Result<T, ConfigError> {
    T::try_from(value).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{} is out of range", value),
    })
}
