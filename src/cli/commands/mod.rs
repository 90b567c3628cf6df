pub mod backup_id;
pub mod config;
pub mod control;

use crate::error::PgVaultError;

pub fn exit_code(err: &PgVaultError) -> i32 {
    match err {
        PgVaultError::Config(_) => 2,
        PgVaultError::Control(_) => 3,
        PgVaultError::Identity(_) => 4,
        PgVaultError::Message(_) | PgVaultError::Io(_) => 1,
    }
}

pub fn exit_for_error(err: &PgVaultError) -> ! {
    eprintln!("ERROR: {}", err);
    std::process::exit(exit_code(err));
}
