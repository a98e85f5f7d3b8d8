use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::WhaleScopeError;
use crate::ui::core::section::Section;

/// Terminal dashboard for whale, custodian and staking analytics.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Interpreter used to run the analytics scripts.
    #[arg(long, default_value = "venv/bin/python")]
    pub python: PathBuf,

    /// Directory holding the per-section analytics scripts.
    #[arg(long, default_value = ".")]
    pub scripts_dir: PathBuf,

    /// Where CSV and PDF exports are written.
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Section shown at startup (bitcoin, eth, blackrock, lido, binance_polar).
    #[arg(long, default_value = "bitcoin")]
    pub section: String,

    /// Seconds before a script run is abandoned. 0 disables the limit.
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Log level for this crate (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "debug")]
    pub log_level: LevelFilter,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub python: PathBuf,
    pub scripts_dir: PathBuf,
    pub export_dir: PathBuf,
    pub section: Section,
    pub timeout: Option<Duration>,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            python: PathBuf::from("venv/bin/python"),
            scripts_dir: PathBuf::from("."),
            export_dir: PathBuf::from("."),
            section: Section::Bitcoin,
            timeout: Some(Duration::from_secs(120)),
            log_level: LevelFilter::Debug,
            log_file: None,
        }
    }
}

impl TryFrom<Args> for AppConfig {
    type Error = WhaleScopeError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        Ok(Self {
            python: args.python,
            scripts_dir: args.scripts_dir,
            export_dir: args.export_dir,
            section: args.section.parse()?,
            timeout: (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs)),
            log_level: args.log_level,
            log_file: args.log_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let args = Args::parse_from(["whalescope"]);
        let config = AppConfig::try_from(args).unwrap();
        let default = AppConfig::default();
        assert_eq!(config.python, default.python);
        assert_eq!(config.section, default.section);
        assert_eq!(config.timeout, default.timeout);
        assert_eq!(config.log_level, default.log_level);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn zero_timeout_disables_limit() {
        let args = Args::parse_from(["whalescope", "--timeout-secs", "0", "--section", "lido"]);
        let config = AppConfig::try_from(args).unwrap();
        assert_eq!(config.timeout, None);
        assert_eq!(config.section, Section::Lido);
    }

    #[test]
    fn unknown_section_is_rejected() {
        let args = Args::parse_from(["whalescope", "--section", "dogecoin"]);
        assert!(matches!(
            AppConfig::try_from(args),
            Err(WhaleScopeError::ConfigError(_))
        ));
    }
}
