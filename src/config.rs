//! Site configuration module.
//!
//! Handles loading, validating, and layering `config.toml`. Three layers are
//! merged, later ones winning key by key:
//!
//! ```text
//! stock defaults  →  <root>/config.toml  →  command-line overrides
//! ```
//!
//! The command-line layer is how `compile-for <BASE_URL>` replaces the base
//! URL without touching the file on disk.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_url = ""                           # Prefix for every generated link
//! posts_dir = "posts"                     # Directory holding one folder per category
//! homepage = "index.html"                 # Page that receives the recent posts list
//! recent_posts = 10                       # How many posts the homepage lists
//! stylesheets = ["tufte.css", "custom.css"]
//! link_stylesheets = false                # Also add <link> tags to every page
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Prefix for generated links. Empty produces `/`-rooted links.
    pub base_url: String,
    /// Posts directory, relative to the site root.
    pub posts_dir: String,
    /// Homepage file, relative to the site root.
    pub homepage: String,
    /// Number of posts listed under "Recent Posts" on the homepage.
    pub recent_posts: usize,
    /// Stylesheets referenced by category pages, relative to the site root.
    pub stylesheets: Vec<String>,
    /// Ensure every page links every stylesheet in its `<head>`.
    pub link_stylesheets: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            posts_dir: "posts".to_string(),
            homepage: "index.html".to_string(),
            recent_posts: 10,
            stylesheets: vec!["tufte.css".to_string(), "custom.css".to_string()],
            link_stylesheets: false,
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_posts == 0 {
            return Err(ConfigError::Validation(
                "recent_posts must be at least 1".into(),
            ));
        }
        if self.posts_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "posts_dir must not be empty".into(),
            ));
        }
        if self.homepage.trim().is_empty() {
            return Err(ConfigError::Validation("homepage must not be empty".into()));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from the site root as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge every layer in order onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(
    layers: impl IntoIterator<Item = toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = layers
        .into_iter()
        .fold(stock_defaults_value(), merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Command-line values that take precedence over `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
}

impl Overrides {
    fn into_value(self) -> Option<toml::Value> {
        let mut table = toml::Table::new();
        if let Some(base_url) = self.base_url {
            table.insert("base_url".into(), toml::Value::String(base_url));
        }
        (!table.is_empty()).then_some(toml::Value::Table(table))
    }
}

/// Load config for the site at `root`, applying command-line overrides last.
pub fn load_config(root: &Path, overrides: Overrides) -> Result<SiteConfig, ConfigError> {
    let file = load_raw_config(root)?;
    resolve_config(file.into_iter().chain(overrides.into_value()))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# tufte-press configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Prefix for every generated link (sidebar, category pages, recent posts).
# Leave empty to produce links rooted at "/". `compile-for <BASE_URL>`
# overrides this value for a single run.
base_url = ""

# Directory holding one sub-directory per category, relative to the site root.
posts_dir = "posts"

# Homepage file. It must contain a <div class="content"> element; the
# "Recent Posts" list is appended to it.
homepage = "index.html"

# How many posts the homepage lists, newest first.
recent_posts = 10

# Stylesheets linked from generated category pages (relative to the site root).
stylesheets = ["tufte.css", "custom.css"]

# When true, every post, category page and the homepage get a
# <link rel="stylesheet"> for each entry above if they lack one.
link_stylesheets = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.base_url, "");
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.homepage, "index.html");
        assert_eq!(config.recent_posts, 10);
        assert!(!config.link_stylesheets);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), Overrides::default()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "base_url = \"https://example.github.io/blog\"\nrecent_posts = 5\n",
        )
        .unwrap();

        let config = load_config(tmp.path(), Overrides::default()).unwrap();
        assert_eq!(config.base_url, "https://example.github.io/blog");
        assert_eq!(config.recent_posts, 5);
        assert_eq!(config.posts_dir, "posts");
    }

    #[test]
    fn override_beats_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "base_url = \"https://a\"\n").unwrap();

        let overrides = Overrides {
            base_url: Some("https://b".to_string()),
        };
        let config = load_config(tmp.path(), overrides).unwrap();
        assert_eq!(config.base_url, "https://b");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "base_url = ").unwrap();

        let result = load_config(tmp.path(), Overrides::default());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "base_ur = \"x\"\n").unwrap();

        let result = load_config(tmp.path(), Overrides::default());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn validate_recent_posts_zero() {
        let config = SiteConfig {
            recent_posts: 0,
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_paths() {
        let config = SiteConfig {
            posts_dir: " ".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SiteConfig {
            homepage: String::new(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(1));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_replaces_arrays() {
        let base: toml::Value = toml::from_str("s = [\"a\", \"b\"]").unwrap();
        let overlay: toml::Value = toml::from_str("s = [\"c\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("s").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config([value]).unwrap();
        assert_eq!(config, SiteConfig::default());
    }
}
