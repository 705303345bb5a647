/// Layout configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Largest tab stop accepted after sanitizing.
const MAX_TAB_SIZE: usize = 16;

/// Smallest wrap limit the wrap-split computer can make progress with.
const MIN_WRAP_LIMIT: usize = 2;

/// Options that shape how a document is laid out on screen.
///
/// Changing any of `tab_size`, `wrap_limit`, `use_wrap_mode` or
/// `wrap_as_code` on a live session forces a full wrap recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of a tab stop in screen columns.
    pub tab_size: usize,
    /// Whether long lines soft-wrap.
    pub use_wrap_mode: bool,
    /// Screen columns per wrapped row.
    pub wrap_limit: usize,
    /// Lower bound applied when the host negotiates the wrap limit from its viewport width.
    pub wrap_limit_min: Option<usize>,
    /// Upper bound applied when the host negotiates the wrap limit from its viewport width.
    pub wrap_limit_max: Option<usize>,
    /// Prefer wrapping at code boundaries (short look-back, punctuation-aware).
    pub wrap_as_code: bool,
    /// Fallback wrap limit when no range is configured.
    pub print_margin: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            use_wrap_mode: false,
            wrap_limit: 80,
            wrap_limit_min: None,
            wrap_limit_max: None,
            wrap_as_code: false,
            print_margin: 80,
        }
    }
}

impl LayoutConfig {
    /// Returns the default config file path: `<config dir>/wrapfold/layout.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("wrapfold").join("layout.json"))
            .unwrap_or_else(|| PathBuf::from("layout.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<LayoutConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse layout config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read layout config at {}: {e}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges.
    pub fn sanitize(&mut self) {
        self.tab_size = self.tab_size.clamp(1, MAX_TAB_SIZE);
        self.wrap_limit = self.wrap_limit.max(MIN_WRAP_LIMIT);
        self.print_margin = self.print_margin.max(MIN_WRAP_LIMIT);
        if let (Some(min), Some(max)) = (self.wrap_limit_min, self.wrap_limit_max) {
            if min > max {
                self.wrap_limit_min = Some(max);
                self.wrap_limit_max = Some(min);
            }
        }
    }
}
