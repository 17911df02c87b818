use std::path::{Path, PathBuf};

use anyhow::Context;
use fraglog::analyzer::report::PlayerOrder;
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fragstat.toml";

/// Run configuration, loadable from a TOML file.
///
/// All fields default to their standard values. CLI flags override config file values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub logfile: PathBuf,
    pub player_order: PlayerOrder,
    /// Used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            logfile: PathBuf::from("L0226001.log"),
            player_order: PlayerOrder::FirstSeen,
            log_level: "info".to_owned(),
        }
    }
}

impl StatsConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Explicit `--config`, else `fragstat.toml` if present, else defaults.
    pub fn discover(explicit: Option<&str>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(Path::new(path)),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// Generate a commented default TOML config string.
    pub fn generate_default_toml() -> String {
        r#"# fragstat configuration
# Place this file as fragstat.toml in the working directory,
# or specify with --config <path>.

# Server log to read
logfile = "L0226001.log"

# Row and column order of players in the matrices:
# "first-seen" (order players first connected) or "alphabetical"
player_order = "first-seen"

# Diagnostic output level when RUST_LOG is not set
log_level = "info"
"#
        .to_string()
    }

    /// Apply CLI flag overrides.
    pub fn apply_cli_overrides(&mut self, matches: &clap::ArgMatches<'_>) -> anyhow::Result<()> {
        if let Some(logfile) = matches
            .value_of("LOGFILE")
            .or_else(|| matches.value_of("LOGFILE_FLAG"))
        {
            self.logfile = PathBuf::from(logfile);
        }
        if let Some(order) = matches.value_of("ORDER") {
            self.player_order = order
                .parse()
                .with_context(|| format!("invalid player order {order:?}"))?;
        }
        if matches.is_present("VERBOSE") {
            self.log_level = "debug".to_owned();
        }
        Ok(())
    }
}
