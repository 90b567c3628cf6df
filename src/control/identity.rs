use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::model::ConfigRecord;
use crate::control::layout::{layout_for, ControlFileLayout, MajorVersion};
use crate::control::{ClusterFacts, ControlFile};
use crate::error::{ControlFileError, IdentityError, PgVaultError, Result};
use crate::util::paths::{control_file_path, pg_version_path};

pub const SYSTEM_IDENTIFIER_QUERY: &str = "SELECT system_identifier FROM pg_control_system()";
pub const TIMELINE_QUERY: &str = "SELECT timeline_id FROM pg_control_checkpoint()";
pub const CHECKSUM_VERSION_QUERY: &str = "SELECT data_page_checksum_version FROM pg_control_init()";

pub trait ClusterIdentity {
    fn system_identifier(&mut self) -> Result<u64>;
    fn timeline(&mut self) -> Result<u32>;
    fn checksum_version(&mut self) -> Result<u32>;

    fn facts(&mut self) -> Result<ClusterFacts> {
        Ok(ClusterFacts {
            system_identifier: self.system_identifier()?,
            timeline: self.timeline()?,
            checksum_version: self.checksum_version()?,
        })
    }
}

/// A database connection able to run a query returning one value.
pub trait QueryRunner {
    fn query_value(&mut self, sql: &str) -> Result<String>;
}

pub struct LocalControlFile {
    pgdata: PathBuf,
    safe: bool,
    layout: Option<&'static ControlFileLayout>,
}

impl LocalControlFile {
    pub fn new(pgdata: &Path) -> Self {
        Self {
            pgdata: pgdata.to_path_buf(),
            safe: false,
            layout: None,
        }
    }

    /// In safe mode a missing control file yields zero for every fact.
    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    /// Skips `PG_VERSION` detection.
    pub fn with_layout(mut self, layout: &'static ControlFileLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    fn detect_layout(&self) -> Result<&'static ControlFileLayout> {
        if let Some(layout) = self.layout {
            return Ok(layout);
        }
        let path = pg_version_path(&self.pgdata);
        let text = fs::read_to_string(&path)
            .map_err(|e| PgVaultError::message(format!("read {}: {}", path.display(), e)))?;
        let major = MajorVersion::parse(&text)?;
        debug!(%major, pgdata = %self.pgdata.display(), "detected server version");
        Ok(layout_for(major)?)
    }

    /// Reads and verifies the control file; `None` only in safe mode when
    /// the file is absent.
    pub fn load(&self) -> Result<Option<ControlFile>> {
        let path = control_file_path(&self.pgdata);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if self.safe {
                    warn!(path = %path.display(), "control file missing");
                    return Ok(None);
                }
                return Err(ControlFileError::Missing(path).into());
            }
            Err(err) => {
                return Err(PgVaultError::message(format!("read {}: {}", path.display(), err)))
            }
        };
        let layout = self.detect_layout()?;
        Ok(Some(ControlFile::read(bytes, layout)?))
    }

    fn with_file<T: Default>(&self, f: impl FnOnce(&ControlFile) -> T) -> Result<T> {
        Ok(self.load()?.map(|file| f(&file)).unwrap_or_default())
    }
}

impl ClusterIdentity for LocalControlFile {
    fn system_identifier(&mut self) -> Result<u64> {
        self.with_file(ControlFile::system_identifier)
    }

    fn timeline(&mut self) -> Result<u32> {
        self.with_file(ControlFile::timeline)
    }

    fn checksum_version(&mut self) -> Result<u32> {
        self.with_file(ControlFile::checksum_version)
    }

    fn facts(&mut self) -> Result<ClusterFacts> {
        Ok(self.load()?.map(|file| file.facts()).unwrap_or(ClusterFacts {
            system_identifier: 0,
            timeline: 0,
            checksum_version: 0,
        }))
    }
}

pub struct RemoteCluster<Q: QueryRunner> {
    conn: Q,
}

impl<Q: QueryRunner> RemoteCluster<Q> {
    pub fn new(conn: Q) -> Self {
        Self { conn }
    }

    pub fn into_inner(self) -> Q {
        self.conn
    }

    fn query_number<T: std::str::FromStr>(&mut self, sql: &str) -> Result<T> {
        let value = self.conn.query_value(sql)?;
        value.trim().parse::<T>().map_err(|_| {
            IdentityError::MalformedIdentifier {
                query: sql.to_string(),
                value,
            }
            .into()
        })
    }
}

impl<Q: QueryRunner> ClusterIdentity for RemoteCluster<Q> {
    fn system_identifier(&mut self) -> Result<u64> {
        self.query_number(SYSTEM_IDENTIFIER_QUERY)
    }

    fn timeline(&mut self) -> Result<u32> {
        self.query_number(TIMELINE_QUERY)
    }

    fn checksum_version(&mut self) -> Result<u32> {
        self.query_number(CHECKSUM_VERSION_QUERY)
    }
}

/// Refuses a cluster whose identifier differs from the one recorded for the
/// instance.
pub fn check_system_identifier<C: ClusterIdentity + ?Sized>(
    cluster: &mut C,
    config: &ConfigRecord,
) -> Result<u64> {
    let actual = cluster.system_identifier()?;
    if actual != config.system_identifier {
        return Err(IdentityError::SystemIdMismatch {
            expected: config.system_identifier,
            actual,
        }
        .into());
    }
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::fixture::{write_data_dir, FakeConnection, FixtureCluster};
    use tempfile::TempDir;

    #[test]
    fn local_and_remote_agree() {
        for major in ["9.6", "10", "11", "12", "16"] {
            let dir = TempDir::new().expect("tempdir");
            let cluster = FixtureCluster {
                major: MajorVersion::parse(major).unwrap(),
                timeline: 7,
                checksum_version: 0,
                ..FixtureCluster::default()
            };
            write_data_dir(dir.path(), &cluster);

            let mut local = LocalControlFile::new(dir.path());
            let mut remote = RemoteCluster::new(FakeConnection::new(cluster.clone()));
            let sources: [&mut dyn ClusterIdentity; 2] = [&mut local, &mut remote];
            let mut seen = Vec::new();
            for source in sources {
                seen.push((
                    source.system_identifier().unwrap(),
                    source.timeline().unwrap(),
                    source.checksum_version().unwrap(),
                ));
            }
            assert_eq!(seen[0], seen[1], "{}", major);
            assert_eq!(local.facts().unwrap(), cluster.facts());
        }
    }

    #[test]
    fn safe_mode_tolerates_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let mut safe = LocalControlFile::new(dir.path()).safe(true);
        assert_eq!(safe.timeline().unwrap(), 0);
        assert_eq!(safe.facts().unwrap().system_identifier, 0);

        let mut strict = LocalControlFile::new(dir.path());
        match strict.timeline().unwrap_err() {
            PgVaultError::Control(ControlFileError::Missing(path)) => {
                assert!(path.ends_with("global/pg_control"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn safe_mode_still_rejects_corruption() {
        let dir = TempDir::new().expect("tempdir");
        write_data_dir(dir.path(), &FixtureCluster::default());
        let path = control_file_path(dir.path());
        let mut bytes = fs::read(&path).unwrap();
        bytes[0] ^= 1;
        fs::write(&path, bytes).unwrap();
        let mut local = LocalControlFile::new(dir.path()).safe(true);
        assert!(matches!(
            local.system_identifier(),
            Err(PgVaultError::Control(ControlFileError::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn explicit_layout_skips_version_file() {
        let dir = TempDir::new().expect("tempdir");
        let cluster = FixtureCluster::default();
        write_data_dir(dir.path(), &cluster);
        fs::remove_file(pg_version_path(dir.path())).unwrap();
        assert!(LocalControlFile::new(dir.path()).timeline().is_err());
        let layout = layout_for(cluster.major).unwrap();
        let mut local = LocalControlFile::new(dir.path()).with_layout(layout);
        assert_eq!(local.timeline().unwrap(), cluster.timeline);
    }

    #[test]
    fn malformed_remote_answer() {
        let mut conn = FakeConnection::new(FixtureCluster::default());
        conn.reply = Some("not-a-number".to_string());
        let mut remote = RemoteCluster::new(conn);
        match remote.system_identifier().unwrap_err() {
            PgVaultError::Identity(IdentityError::MalformedIdentifier { query, value }) => {
                assert_eq!(query, SYSTEM_IDENTIFIER_QUERY);
                assert_eq!(value, "not-a-number");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(remote.into_inner().queries, vec![SYSTEM_IDENTIFIER_QUERY.to_string()]);
    }

    #[test]
    fn system_identifier_guard() {
        let cluster = FixtureCluster::default();
        let mut remote = RemoteCluster::new(FakeConnection::new(cluster.clone()));
        let mut config = ConfigRecord {
            system_identifier: cluster.system_identifier,
            ..ConfigRecord::default()
        };
        assert_eq!(
            check_system_identifier(&mut remote, &config).unwrap(),
            cluster.system_identifier
        );
        config.system_identifier += 1;
        assert!(matches!(
            check_system_identifier(&mut remote, &config),
            Err(PgVaultError::Identity(IdentityError::SystemIdMismatch { .. }))
        ));
    }
}
