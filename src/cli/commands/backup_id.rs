use chrono::Local;

use crate::backup::id::{decode, encode};
use crate::backup::{BackupMeta, BackupMode};
use crate::error::Result;
use crate::util::time::time_to_iso;

pub fn run_encode(value: u64) {
    println!("{}", encode(value));
}

pub fn run_decode(id: &str) -> Result<()> {
    let value = decode(id)?;
    println!("{}", value);
    if let Ok(secs) = i64::try_from(value) {
        println!("start time: {}", time_to_iso(secs));
    }
    Ok(())
}

pub fn run_now() {
    let meta = BackupMeta::begin(Local::now().timestamp(), BackupMode::Full, 0);
    println!("{}", meta.backup_id);
    println!("start time: {}", meta.start_time_iso());
}
