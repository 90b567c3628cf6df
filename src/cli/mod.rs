use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

use crate::cli::args::{BackupIdCommand, Cli, Command};
use crate::cli::commands::{backup_id, config, control, exit_for_error};
use crate::util::paths::instance_dir;

pub mod args;
pub mod commands;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("pgvault {}", VERSION);

    let result = match cli.command.clone() {
        Command::ShowConfig { format, options } => {
            let dir = require_instance(&cli)?;
            config::run_show_config(&dir, format, &options.to_overrides())
        }
        Command::SetConfig { options } => {
            let dir = require_instance(&cli)?;
            config::run_set_config(&dir, &options.to_overrides())
        }
        Command::AddInstance { pgdata } => {
            let backup_path = require_backup_path(&cli)?;
            let instance = cli
                .instance
                .as_deref()
                .ok_or_else(|| anyhow!("required parameter not specified: --instance"))?;
            config::run_add_instance(&backup_path, instance, &pgdata)
        }
        Command::ControlInfo { pgdata, safe, format } => {
            let instance = match (&cli.backup_path, &cli.instance) {
                (Some(path), Some(name)) => Some(instance_dir(path, name)?),
                _ => None,
            };
            control::run_control_info(pgdata.as_deref(), instance.as_deref(), safe, format.into())
        }
        Command::BackupId { command } => match command {
            BackupIdCommand::Encode { value } => {
                backup_id::run_encode(value);
                Ok(())
            }
            BackupIdCommand::Decode { id } => backup_id::run_decode(&id),
            BackupIdCommand::Now => {
                backup_id::run_now();
                Ok(())
            }
        },
    };

    if let Err(err) = result {
        exit_for_error(&err);
    }
    Ok(())
}

fn require_backup_path(cli: &Cli) -> Result<PathBuf> {
    cli.backup_path
        .clone()
        .ok_or_else(|| anyhow!("required parameter not specified: BACKUP_PATH (-B, --backup-path)"))
}

fn require_instance(cli: &Cli) -> Result<PathBuf> {
    let backup_path = require_backup_path(cli)?;
    let instance = cli
        .instance
        .as_deref()
        .ok_or_else(|| anyhow!("required parameter not specified: --instance"))?;
    Ok(instance_dir(&backup_path, instance)?)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
