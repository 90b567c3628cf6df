use std::fmt;

use serde::Serialize;

/// Origin of a configuration value, ordered by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    Default,
    File,
    Cmdline,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Default => "default",
            Source::File => "file",
            Source::Cmdline => "command line",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warning,
    Info,
    Log,
    Verbose,
}

impl LogLevel {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warning" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "log" => Ok(LogLevel::Log),
            "verbose" => Ok(LogLevel::Verbose),
            _ => Err(format!(
                "invalid log level {}; expected off, error, warning, info, log, or verbose",
                value
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Log => "log",
            LogLevel::Verbose => "verbose",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressAlg {
    None,
    Zlib,
    Pglz,
}

impl CompressAlg {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CompressAlg::None),
            "zlib" => Ok(CompressAlg::Zlib),
            "pglz" => Ok(CompressAlg::Pglz),
            _ => Err(format!(
                "invalid compress algorithm {}; expected zlib, pglz, or none",
                value
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressAlg::None => "none",
            CompressAlg::Zlib => "zlib",
            CompressAlg::Pglz => "pglz",
        }
    }
}

impl fmt::Display for CompressAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_precedence() {
        assert!(Source::Default < Source::File);
        assert!(Source::File < Source::Cmdline);
    }

    #[test]
    fn log_level_off_is_a_level() {
        assert_eq!(LogLevel::parse("OFF").unwrap(), LogLevel::Off);
        assert_eq!(LogLevel::parse(" verbose ").unwrap(), LogLevel::Verbose);
        assert!(LogLevel::parse("debug").is_err());
    }

    #[test]
    fn compress_alg_names() {
        for alg in [CompressAlg::None, CompressAlg::Zlib, CompressAlg::Pglz] {
            assert_eq!(CompressAlg::parse(alg.as_str()).unwrap(), alg);
        }
        assert!(CompressAlg::parse("lz4").is_err());
    }
}
