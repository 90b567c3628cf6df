use std::path::Path;

use crate::cli::args::FormatArg;
use crate::config::load::resolve;
use crate::config::{add_instance, render, set_config, ConfigFormat};
use crate::error::Result;

pub fn run_show_config(
    instance_dir: &Path,
    format: FormatArg,
    overrides: &[(String, String)],
) -> Result<()> {
    let record = resolve(instance_dir, overrides)?;
    print!("{}", render(&record, ConfigFormat::from(format))?);
    Ok(())
}

pub fn run_set_config(instance_dir: &Path, updates: &[(String, String)]) -> Result<()> {
    set_config(instance_dir, updates, false)?;
    Ok(())
}

pub fn run_add_instance(backup_path: &Path, instance: &str, pgdata: &Path) -> Result<()> {
    let record = add_instance(backup_path, instance, pgdata)?;
    println!(
        "Instance '{}' successfully inited (system identifier {})",
        instance, record.system_identifier
    );
    Ok(())
}
