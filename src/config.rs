use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::ghostscript::DEFAULT_NAMES;

pub const PROJECT_FILE: &str = ".pdfshrink.toml";

/// Global + per-project configuration. CLI flags override both.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Quality level 0-4 used when `-c` is not given.
    pub compression: u8,
    /// Back up the original in temp-file mode even without `-b`.
    pub backup: bool,
    /// Open the result even without `--open`.
    pub open: bool,
    /// Seconds before the engine is killed; 0 disables the limit.
    pub timeout_secs: u64,
    /// Engine executable names, highest priority first.
    pub engines: Vec<String>,
    /// Inserted before the extension of the backup copy.
    pub backup_suffix: String,
    /// Print a timing footer after the report.
    pub show_footer: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compression: 2,
            backup: false,
            open: false,
            timeout_secs: 300,
            engines: DEFAULT_NAMES.iter().map(|s| s.to_string()).collect(),
            backup_suffix: "_BACKUP".into(),
            show_footer: false,
        }
    }
}

impl Config {
    /// Load config with priority: .pdfshrink.toml (project) > ~/.config/pdfshrink/config.toml (global) > defaults.
    pub fn load() -> Self {
        let mut config = Self::default();

        // 1. Global config
        if let Some(path) = global_config_path()
            && let Some(global) = load_file(&path)
        {
            log::debug!("loaded {}", path.display());
            config = merge(config, global);
        }

        // 2. Project config (overrides global)
        if let Some(project) = load_file(Path::new(PROJECT_FILE)) {
            log::debug!("loaded {PROJECT_FILE}");
            config = merge(config, project);
        }

        config
    }

    pub fn timeout(&self) -> Option<Duration> {
        timeout_from_secs(self.timeout_secs)
    }

    /// Generate a default config file content.
    pub fn default_toml() -> &'static str {
        r#"# pdfshrink configuration
# Place in ~/.config/pdfshrink/config.toml (global) or .pdfshrink.toml (per-project)

# Quality level used when -c is not given
#   0 default, 1 screen, 2 ebook, 3 printer, 4 prepress
compression = 2

# Always back up / open, as if -b / --open were passed
backup = false
open = false

# Kill the engine after this many seconds (0 = never)
timeout_secs = 300

# Ghostscript executable names, searched on PATH in this order
engines = ["gs", "gswin32", "gswin64"]

# report.pdf -> report_BACKUP.pdf
backup_suffix = "_BACKUP"

# Show timing footer after each run
show_footer = false
"#
    }
}

pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Partial config for TOML deserialization (all fields optional).
#[derive(Debug, Deserialize)]
struct PartialConfig {
    compression: Option<u8>,
    backup: Option<bool>,
    open: Option<bool>,
    timeout_secs: Option<u64>,
    engines: Option<Vec<String>>,
    backup_suffix: Option<String>,
    show_footer: Option<bool>,
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfshrink").join("config.toml"))
}

fn load_file(path: &Path) -> Option<PartialConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(partial) => Some(partial),
        Err(e) => {
            log::warn!("ignoring invalid config {}: {e}", path.display());
            None
        }
    }
}

fn merge(base: Config, partial: PartialConfig) -> Config {
    Config {
        compression: partial.compression.unwrap_or(base.compression),
        backup: partial.backup.unwrap_or(base.backup),
        open: partial.open.unwrap_or(base.open),
        timeout_secs: partial.timeout_secs.unwrap_or(base.timeout_secs),
        engines: partial
            .engines
            .filter(|e| !e.is_empty())
            .unwrap_or(base.engines),
        backup_suffix: partial.backup_suffix.unwrap_or(base.backup_suffix),
        show_footer: partial.show_footer.unwrap_or(base.show_footer),
    }
}
