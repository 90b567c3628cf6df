pub mod identity;
pub mod layout;

#[cfg(test)]
pub(crate) mod fixture;

use serde::Serialize;

use crate::control::layout::ControlFileLayout;
use crate::error::ControlFileError;

/// Facts derived from a control file or a live server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterFacts {
    pub system_identifier: u64,
    pub timeline: u32,
    pub checksum_version: u32,
}

/// A verified control-file image. Fields are decoded little-endian.
#[derive(Debug, Clone)]
pub struct ControlFile {
    bytes: Vec<u8>,
    layout: &'static ControlFileLayout,
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

impl ControlFile {
    /// Checks size, then checksum, then version word; the first failure is
    /// returned.
    pub fn read(
        bytes: Vec<u8>,
        layout: &'static ControlFileLayout,
    ) -> Result<ControlFile, ControlFileError> {
        if bytes.len() != layout.file_size {
            return Err(ControlFileError::SizeMismatch {
                actual: bytes.len(),
                expected: layout.file_size,
            });
        }

        let crc_end = layout.crc_offset + 4;
        let stored = read_u32(&bytes, layout.crc_offset);
        let computed = crc32c::crc32c(&bytes[..layout.crc_offset]);
        if computed != stored {
            return Err(ControlFileError::ChecksumMismatch { computed, stored });
        }
        // The engine zero-fills the file past the CRC. Dirty padding is
        // reported with the checksum extended over it.
        let padding = &bytes[crc_end..];
        if padding.iter().any(|b| *b != 0) {
            return Err(ControlFileError::ChecksumMismatch {
                computed: crc32c::crc32c_append(computed, padding),
                stored,
            });
        }

        let version = read_u32(&bytes, layout.control_version_offset);
        if version % 65536 == 0 && version / 65536 != 0 {
            return Err(ControlFileError::ByteOrderMismatch(version));
        }
        if version != layout.control_version {
            return Err(ControlFileError::VersionMismatch {
                actual: version,
                expected: layout.control_version,
                major: layout
                    .majors
                    .first()
                    .map(|m| crate::control::layout::MajorVersion::from_num(*m).to_string())
                    .unwrap_or_default(),
            });
        }

        Ok(ControlFile { bytes, layout })
    }

    pub fn layout(&self) -> &'static ControlFileLayout {
        self.layout
    }

    pub fn control_version(&self) -> u32 {
        read_u32(&self.bytes, self.layout.control_version_offset)
    }

    pub fn system_identifier(&self) -> u64 {
        read_u64(&self.bytes, self.layout.system_identifier_offset)
    }

    pub fn timeline(&self) -> u32 {
        read_u32(&self.bytes, self.layout.timeline_offset)
    }

    pub fn checksum_version(&self) -> u32 {
        read_u32(&self.bytes, self.layout.checksum_version_offset)
    }

    pub fn facts(&self) -> ClusterFacts {
        ClusterFacts {
            system_identifier: self.system_identifier(),
            timeline: self.timeline(),
            checksum_version: self.checksum_version(),
        }
    }
}
