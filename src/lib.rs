pub mod backup;
pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod types;
pub mod util;

pub use backup::id::{decode as decode_backup_id, encode as encode_backup_id, BackupId};
pub use config::load::resolve;
pub use config::model::ConfigRecord;
pub use config::save::serialize;
pub use control::identity::{ClusterIdentity, LocalControlFile, QueryRunner, RemoteCluster};
pub use control::{ClusterFacts, ControlFile};
pub use error::{PgVaultError, Result};
