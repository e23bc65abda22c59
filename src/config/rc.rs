use crate::document_model::WordBoundary;
use crate::sync::ReconcilePolicy;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct RcConfig {
    pub tab_size: usize,
    pub undo_history_size: usize,
    pub autosave_interval_ms: u64,
    pub sync_server: Option<String>,
    pub sync_port: u16,
    pub sync_timeout_ms: u64,
    pub word_boundary: WordBoundary,
    pub reconcile: ReconcilePolicy,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            undo_history_size: 50,
            autosave_interval_ms: 1000,
            sync_server: None,
            sync_port: 8080,
            sync_timeout_ms: 5000,
            word_boundary: WordBoundary::Whitespace,
            reconcile: ReconcilePolicy::Overwrite,
        }
    }
}

pub struct RcLoader;

impl RcLoader {
    pub const FILE_NAME: &'static str = ".speedyrc";

    /// Get the path to the RC file
    /// Looks for .speedyrc in:
    /// 1. Current directory
    /// 2. Home directory (~/.speedyrc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(Self::FILE_NAME);
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        if let Ok(home) = env::var("HOME") {
            let home_rc = Path::new(&home).join(Self::FILE_NAME);
            if home_rc.exists() {
                return Some(home_rc);
            }
        }

        None
    }

    /// Load and parse the RC file, falling back to defaults
    pub fn load_config() -> RcConfig {
        match Self::get_rc_path() {
            Some(rc_path) => Self::load_from_path(&rc_path),
            None => RcConfig::default(),
        }
    }

    pub fn load_from_path(rc_path: &Path) -> RcConfig {
        let mut config = RcConfig::default();
        match fs::read_to_string(rc_path) {
            Ok(content) => {
                log::debug!("loading settings from {}", rc_path.display());
                Self::parse_config_content(&content, &mut config);
            }
            Err(e) => {
                log::warn!("could not read {}: {e}", rc_path.display());
            }
        }
        config
    }

    /// Parse the content of an RC file
    pub fn parse_config_content(content: &str, config: &mut RcConfig) {
        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    /// Parse a single configuration line. Both `set key=value` and bare
    /// `key=value` are accepted; unknown keys and invalid values are ignored.
    fn parse_config_line(line: &str, config: &mut RcConfig) {
        // Remove inline comments
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        let setting = line.strip_prefix("set ").map_or(line, str::trim);
        let Some((key, value)) = setting.split_once('=') else {
            log::debug!("ignoring rc line without a value: {line}");
            return;
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "tabstop" | "tab_size" | "ts" => {
                if let Ok(tab_size) = value.parse::<usize>() {
                    if tab_size > 0 && tab_size <= 16 {
                        config.tab_size = tab_size;
                    }
                }
            }
            "undolevels" | "undo_history_size" | "ul" => {
                if let Ok(levels) = value.parse::<usize>() {
                    if levels > 0 {
                        config.undo_history_size = levels;
                    }
                }
            }
            "autosave" | "autosave_interval_ms" => {
                if let Ok(interval) = value.parse::<u64>() {
                    if interval >= 10 {
                        config.autosave_interval_ms = interval;
                    }
                }
            }
            "server" | "sync_server" => {
                config.sync_server = (!value.is_empty()).then(|| value.to_string());
            }
            "port" | "sync_port" => {
                if let Ok(port) = value.parse::<u16>() {
                    if port > 0 {
                        config.sync_port = port;
                    }
                }
            }
            "synctimeout" | "sync_timeout_ms" => {
                if let Ok(timeout) = value.parse::<u64>() {
                    if timeout > 0 {
                        config.sync_timeout_ms = timeout;
                    }
                }
            }
            "wordchars" | "word_boundary" => match value {
                "whitespace" => config.word_boundary = WordBoundary::Whitespace,
                "alnum" => config.word_boundary = WordBoundary::Alphanumeric,
                _ => {} // Invalid value, ignore
            },
            "reconcile" => match value {
                "overwrite" => config.reconcile = ReconcilePolicy::Overwrite,
                "reject" => config.reconcile = ReconcilePolicy::RejectStale,
                _ => {} // Invalid value, ignore
            },
            _ => {} // Unknown setting, ignore
        }
    }

    /// Generate a sample RC file content
    pub fn generate_sample_rc() -> String {
        r#"# speedy configuration file (.speedyrc)
# Lines starting with # or " are comments

# Editing
set tabstop=4          # Spaces inserted for a tab
set undolevels=50      # Undo history size
set wordchars=whitespace   # Word jumps: whitespace or alnum

# Remote sync
# set server=127.0.0.1
# set port=8080
set autosave=1000      # Autosave interval in milliseconds
set synctimeout=5000   # Read timeout for a pull in milliseconds
set reconcile=overwrite    # overwrite or reject
"#
        .to_string()
    }
}
