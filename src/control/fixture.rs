use std::fs;
use std::path::Path;

use crate::control::identity::QueryRunner;
use crate::control::layout::{layout_for, MajorVersion};
use crate::control::ClusterFacts;
use crate::error::{IdentityError, Result};
use crate::util::paths::{control_file_path, pg_version_path};

#[derive(Debug, Clone)]
pub struct FixtureCluster {
    pub major: MajorVersion,
    pub system_identifier: u64,
    pub timeline: u32,
    pub checksum_version: u32,
    /// Overrides the version word the layout would write.
    pub control_version: Option<u32>,
}

impl Default for FixtureCluster {
    fn default() -> Self {
        Self {
            major: MajorVersion::from_num(160000),
            system_identifier: 7_301_234_567_890_123_456,
            timeline: 3,
            checksum_version: 1,
            control_version: None,
        }
    }
}

impl FixtureCluster {
    pub fn facts(&self) -> ClusterFacts {
        ClusterFacts {
            system_identifier: self.system_identifier,
            timeline: self.timeline,
            checksum_version: self.checksum_version,
        }
    }
}

pub fn build_control_file(cluster: &FixtureCluster) -> Vec<u8> {
    let layout = layout_for(cluster.major).expect("supported fixture version");
    let mut buf = vec![0u8; layout.file_size];
    let put = |buf: &mut Vec<u8>, offset: usize, bytes: &[u8]| {
        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    };
    put(&mut buf, layout.system_identifier_offset, &cluster.system_identifier.to_le_bytes());
    let version = cluster.control_version.unwrap_or(layout.control_version);
    put(&mut buf, layout.control_version_offset, &version.to_le_bytes());
    put(&mut buf, layout.timeline_offset, &cluster.timeline.to_le_bytes());
    put(&mut buf, layout.checksum_version_offset, &cluster.checksum_version.to_le_bytes());
    // Some opaque non-zero content between the known fields.
    put(&mut buf, layout.control_version_offset + 4, &202_307_071u32.to_le_bytes());
    let crc = crc32c::crc32c(&buf[..layout.crc_offset]);
    put(&mut buf, layout.crc_offset, &crc.to_le_bytes());
    buf
}

pub fn write_data_dir(pgdata: &Path, cluster: &FixtureCluster) {
    let control = control_file_path(pgdata);
    fs::create_dir_all(control.parent().expect("global dir")).expect("mkdir global");
    fs::write(&control, build_control_file(cluster)).expect("write pg_control");
    fs::write(pg_version_path(pgdata), format!("{}\n", cluster.major)).expect("write PG_VERSION");
}

/// Answers the identity queries from a fixture, optionally with a canned
/// reply for every query.
pub struct FakeConnection {
    pub cluster: FixtureCluster,
    pub reply: Option<String>,
    pub queries: Vec<String>,
}

impl FakeConnection {
    pub fn new(cluster: FixtureCluster) -> Self {
        Self {
            cluster,
            reply: None,
            queries: Vec::new(),
        }
    }
}

impl QueryRunner for FakeConnection {
    fn query_value(&mut self, sql: &str) -> Result<String> {
        self.queries.push(sql.to_string());
        if let Some(reply) = &self.reply {
            return Ok(reply.clone());
        }
        let value = if sql.contains("pg_control_system") {
            self.cluster.system_identifier.to_string()
        } else if sql.contains("pg_control_checkpoint") {
            self.cluster.timeline.to_string()
        } else if sql.contains("pg_control_init") {
            self.cluster.checksum_version.to_string()
        } else {
            return Err(IdentityError::Query(format!("unexpected query {}", sql)).into());
        };
        Ok(value)
    }
}
