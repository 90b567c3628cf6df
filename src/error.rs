use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Source;

#[derive(Debug, Error)]
pub enum PgVaultError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Config(ConfigError),
    #[error("{0}")]
    Control(ControlFileError),
    #[error("{0}")]
    Identity(IdentityError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("syntax error in line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("invalid option \"{0}\"")]
    UnknownOption(String),
    #[error("option {key} cannot be specified in {origin}")]
    SourceViolation { key: String, origin: Source },
    #[error("invalid unit \"{unit}\" for option {key}")]
    InvalidUnit { key: String, unit: String },
    #[error("option {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("required option {0} is not set")]
    MissingRequired(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlFileError {
    #[error("unexpected control file size {actual}, expected {expected}")]
    SizeMismatch { actual: usize, expected: usize },
    #[error(
        "calculated CRC checksum {computed:#010x} does not match value {stored:#010x} stored in file; \
         either the file is corrupt, or it has a different layout than expected"
    )]
    ChecksumMismatch { computed: u32, stored: u32 },
    #[error("possible byte ordering mismatch: control version {0:#x}")]
    ByteOrderMismatch(u32),
    #[error("control file version {actual} does not match {expected} expected for PostgreSQL {major}")]
    VersionMismatch {
        actual: u32,
        expected: u32,
        major: String,
    },
    #[error("unsupported PostgreSQL version {0}")]
    UnsupportedVersion(String),
    #[error("control file missing at {}", .0.display())]
    Missing(PathBuf),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{value:?} returned by \"{query}\" is not a valid number")]
    MalformedIdentifier { query: String, value: String },
    #[error("invalid backup id {0:?}")]
    InvalidIdentifier(String),
    #[error("system identifier mismatch: instance has {expected}, cluster has {actual}")]
    SystemIdMismatch { expected: u64, actual: u64 },
    #[error("query failed: {0}")]
    Query(String),
}

pub type Result<T> = std::result::Result<T, PgVaultError>;

impl PgVaultError {
    pub fn message(msg: impl Into<String>) -> Self {
        PgVaultError::Message(msg.into())
    }
}

impl From<ConfigError> for PgVaultError {
    fn from(err: ConfigError) -> Self {
        PgVaultError::Config(err)
    }
}

impl From<ControlFileError> for PgVaultError {
    fn from(err: ControlFileError) -> Self {
        PgVaultError::Control(err)
    }
}

impl From<IdentityError> for PgVaultError {
    fn from(err: IdentityError) -> Self {
        PgVaultError::Identity(err)
    }
}
