use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::ConfigFormat;

#[derive(Parser, Debug)]
#[command(name = "pgvault", version, about = "Backup catalog configuration and cluster identity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short = 'B', long, global = true)]
    pub backup_path: Option<PathBuf>,
    #[arg(long, global = true)]
    pub instance: Option<String>,
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the resolved instance configuration
    ShowConfig {
        #[arg(long, value_enum, default_value_t = FormatArg::Ini)]
        format: FormatArg,
        #[command(flatten)]
        options: ConfigArgs,
    },
    /// Update the instance configuration file
    SetConfig {
        #[command(flatten)]
        options: ConfigArgs,
    },
    /// Register a data directory as a new instance
    AddInstance {
        #[arg(short = 'D', long)]
        pgdata: PathBuf,
    },
    /// Verify a control file and print the cluster facts
    ControlInfo {
        #[arg(short = 'D', long)]
        pgdata: Option<PathBuf>,
        #[arg(long)]
        safe: bool,
        #[arg(long, value_enum, default_value_t = FormatArg::Ini)]
        format: FormatArg,
    },
    BackupId {
        #[command(subcommand)]
        command: BackupIdCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum BackupIdCommand {
    Encode { value: u64 },
    Decode { id: String },
    Now,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Ini,
    Yaml,
}

impl From<FormatArg> for ConfigFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Ini => ConfigFormat::Ini,
            FormatArg::Yaml => ConfigFormat::Yaml,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    #[arg(long)]
    pub pgdata: Option<String>,
    #[arg(long, alias = "dbname")]
    pub pgdatabase: Option<String>,
    #[arg(long, alias = "host")]
    pub pghost: Option<String>,
    #[arg(long, alias = "port")]
    pub pgport: Option<String>,
    #[arg(long, alias = "username")]
    pub pguser: Option<String>,
    #[arg(long)]
    pub master_host: Option<String>,
    #[arg(long)]
    pub master_port: Option<String>,
    #[arg(long)]
    pub master_db: Option<String>,
    #[arg(long)]
    pub master_user: Option<String>,
    #[arg(long)]
    pub replica_timeout: Option<String>,
    #[arg(long)]
    pub log_level_console: Option<String>,
    #[arg(long)]
    pub log_level_file: Option<String>,
    #[arg(long)]
    pub log_filename: Option<String>,
    #[arg(long)]
    pub error_log_filename: Option<String>,
    #[arg(long)]
    pub log_directory: Option<String>,
    #[arg(long)]
    pub log_rotation_size: Option<String>,
    #[arg(long)]
    pub log_rotation_age: Option<String>,
    #[arg(long)]
    pub retention_redundancy: Option<String>,
    #[arg(long)]
    pub retention_window: Option<String>,
    #[arg(long)]
    pub compress_algorithm: Option<String>,
    #[arg(long)]
    pub compress_level: Option<String>,
    #[arg(long)]
    pub system_identifier: Option<String>,
}

impl ConfigArgs {
    /// Supplied options as `(catalog key, value)` pairs.
    pub fn to_overrides(&self) -> Vec<(String, String)> {
        let fields = [
            ("pgdata", &self.pgdata),
            ("pgdatabase", &self.pgdatabase),
            ("pghost", &self.pghost),
            ("pgport", &self.pgport),
            ("pguser", &self.pguser),
            ("master-host", &self.master_host),
            ("master-port", &self.master_port),
            ("master-db", &self.master_db),
            ("master-user", &self.master_user),
            ("replica-timeout", &self.replica_timeout),
            ("log-level-console", &self.log_level_console),
            ("log-level-file", &self.log_level_file),
            ("log-filename", &self.log_filename),
            ("error-log-filename", &self.error_log_filename),
            ("log-directory", &self.log_directory),
            ("log-rotation-size", &self.log_rotation_size),
            ("log-rotation-age", &self.log_rotation_age),
            ("retention-redundancy", &self.retention_redundancy),
            ("retention-window", &self.retention_window),
            ("compress-algorithm", &self.compress_algorithm),
            ("compress-level", &self.compress_level),
            ("system-identifier", &self.system_identifier),
        ];
        fields
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_follow_catalog_keys() {
        let cli = Cli::try_parse_from([
            "pgvault",
            "show-config",
            "-B",
            "/srv/backup",
            "--instance",
            "main",
            "--compress-level",
            "4",
            "--host",
            "db1",
        ])
        .expect("parse");
        let Command::ShowConfig { options, format } = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(format, FormatArg::Ini);
        assert_eq!(
            options.to_overrides(),
            vec![
                ("pghost".to_string(), "db1".to_string()),
                ("compress-level".to_string(), "4".to_string()),
            ]
        );
        for (key, _) in ConfigArgs::default().to_overrides() {
            panic!("unexpected override {}", key);
        }
    }

    #[test]
    fn control_info_format() {
        let cli = Cli::try_parse_from(["pgvault", "control-info", "-D", "/data", "--format", "yaml"])
            .expect("parse");
        let Command::ControlInfo { pgdata, safe, format } = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(pgdata, Some(PathBuf::from("/data")));
        assert!(!safe);
        assert_eq!(ConfigFormat::from(format), ConfigFormat::Yaml);
    }

    #[test]
    fn every_override_key_is_known() {
        let all = ConfigArgs {
            pgdata: Some(String::new()),
            pgdatabase: Some(String::new()),
            pghost: Some(String::new()),
            pgport: Some(String::new()),
            pguser: Some(String::new()),
            master_host: Some(String::new()),
            master_port: Some(String::new()),
            master_db: Some(String::new()),
            master_user: Some(String::new()),
            replica_timeout: Some(String::new()),
            log_level_console: Some(String::new()),
            log_level_file: Some(String::new()),
            log_filename: Some(String::new()),
            error_log_filename: Some(String::new()),
            log_directory: Some(String::new()),
            log_rotation_size: Some(String::new()),
            log_rotation_age: Some(String::new()),
            retention_redundancy: Some(String::new()),
            retention_window: Some(String::new()),
            compress_algorithm: Some(String::new()),
            compress_level: Some(String::new()),
            system_identifier: Some(String::new()),
        };
        let overrides = all.to_overrides();
        assert_eq!(overrides.len(), crate::config::options::OPTIONS.len());
        for (key, _) in overrides {
            assert!(crate::config::options::find_option(&key).is_some(), "{}", key);
        }
    }
}
