use std::fmt;
use std::str::FromStr;

use crate::error::IdentityError;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// log(2^64) / log(36) = 12.38
pub const MAX_ID_LEN: usize = 13;

/// Base-36, most significant digit first: `encode(1_500_000_000) == "OT27EO"`.
pub fn encode(mut value: u64) -> String {
    let mut buf = [0u8; MAX_ID_LEN];
    let mut offset = buf.len();
    loop {
        offset -= 1;
        buf[offset] = BASE36[(value % 36) as usize];
        value /= 36;
        if value == 0 {
            break;
        }
    }
    // Only ASCII digits and letters were written.
    String::from_utf8_lossy(&buf[offset..]).into_owned()
}

pub fn decode(text: &str) -> Result<u64, IdentityError> {
    let invalid = || IdentityError::InvalidIdentifier(text.to_string());
    if text.is_empty() {
        return Err(invalid());
    }
    let mut value: u64 = 0;
    for c in text.chars() {
        let digit = c.to_digit(36).ok_or_else(invalid)?;
        value = value
            .checked_mul(36)
            .and_then(|v| v.checked_add(u64::from(digit)))
            .ok_or_else(invalid)?;
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackupId(u64);

impl BackupId {
    pub const INVALID: BackupId = BackupId(0);

    pub fn new(value: u64) -> Self {
        BackupId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl FromStr for BackupId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s).map(BackupId)
    }
}

impl fmt::Display for BackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self.0))
    }
}
