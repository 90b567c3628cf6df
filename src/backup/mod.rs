use std::fmt;

use crate::backup::id::BackupId;
use crate::util::time::time_to_iso;

pub mod id;

pub const BLCKSZ: u32 = 8192;
pub const XLOG_BLCKSZ: u32 = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStatus {
    Invalid,
    Ok,
    Running,
    Error,
    Deleting,
    Deleted,
    Done,
    Orphan,
    Corrupt,
}

impl BackupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupStatus::Invalid => "UNKNOWN",
            BackupStatus::Ok => "OK",
            BackupStatus::Running => "RUNNING",
            BackupStatus::Error => "ERROR",
            BackupStatus::Deleting => "DELETING",
            BackupStatus::Deleted => "DELETED",
            BackupStatus::Done => "DONE",
            BackupStatus::Orphan => "ORPHAN",
            BackupStatus::Corrupt => "CORRUPT",
        }
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupMode {
    Invalid,
    Page,
    Ptrack,
    Full,
}

/// Header of a catalog entry. Times are epoch seconds; the backup id is the
/// start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupMeta {
    pub backup_id: BackupId,
    pub backup_mode: BackupMode,
    pub status: BackupStatus,
    pub tli: u32,
    pub start_lsn: u64,
    pub stop_lsn: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub recovery_xid: u32,
    pub recovery_time: i64,
    pub data_bytes: Option<u64>,
    pub block_size: u32,
    pub wal_block_size: u32,
    pub stream: bool,
    pub parent_backup: Option<BackupId>,
    pub server_version: String,
}

impl Default for BackupMeta {
    fn default() -> Self {
        Self {
            backup_id: BackupId::INVALID,
            backup_mode: BackupMode::Invalid,
            status: BackupStatus::Invalid,
            tli: 0,
            start_lsn: 0,
            stop_lsn: 0,
            start_time: 0,
            end_time: 0,
            recovery_xid: 0,
            recovery_time: 0,
            data_bytes: None,
            block_size: BLCKSZ,
            wal_block_size: XLOG_BLCKSZ,
            stream: false,
            parent_backup: None,
            server_version: String::new(),
        }
    }
}

impl BackupMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// A running entry started at `start_time` on timeline `tli`.
    pub fn begin(start_time: i64, mode: BackupMode, tli: u32) -> Self {
        Self {
            backup_id: BackupId::new(u64::try_from(start_time).unwrap_or(0)),
            backup_mode: mode,
            status: BackupStatus::Running,
            tli,
            start_time,
            ..Self::default()
        }
    }

    pub fn start_time_iso(&self) -> String {
        time_to_iso(self.start_time)
    }
}
