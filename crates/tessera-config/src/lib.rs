//! Configuration management for Tessera.
//!
//! Parses `tessera.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.content_dir`
//! - `site.layouts_dir`
//! - `site.output_dir`
//! - `site.default_layout`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content directory.
    pub content_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override fail-fast flag.
    pub fail_fast: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tessera.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site layout (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Build behaviour.
    pub build: BuildConfig,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw site configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    content_dir: Option<String>,
    layouts_dir: Option<String>,
    output_dir: Option<String>,
    default_layout: Option<String>,
    exclude: Vec<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Root of the page tree.
    pub content_dir: PathBuf,
    /// Directory holding layouts.
    pub layouts_dir: PathBuf,
    /// Directory rendered files are written to.
    pub output_dir: PathBuf,
    /// Layout for pages that don't name one.
    pub default_layout: Option<String>,
    /// Glob patterns (relative to `content_dir`) to skip.
    pub exclude: Vec<String>,
}

/// Build behaviour.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Stop at the first page that fails to render.
    pub fail_fast: bool,
    /// Filters for resources whose front matter names none.
    pub default_filters: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            default_filters: vec!["template".to_owned()],
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.output_dir`").
        field: String,
        /// Error message (e.g., "${`OUT_DIR`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `tessera.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.site_resolved.content_dir.clone_from(content_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.site_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(fail_fast) = settings.fail_fast {
            self.build.fail_fast = fail_fast;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let site = &self.site_resolved;
        if site.output_dir == site.content_dir {
            return Err(ConfigError::Validation(
                "site.output_dir cannot be the same as site.content_dir".to_owned(),
            ));
        }
        for pattern in &site.exclude {
            glob::Pattern::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("site.exclude: invalid pattern '{pattern}': {e}"))
            })?;
        }
        for filter in &self.build.default_filters {
            if filter.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "build.default_filters cannot contain empty names".to_owned(),
                ));
            }
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfigRaw::default(),
            build: BuildConfig::default(),
            site_resolved: SiteConfig {
                content_dir: base.join("content"),
                layouts_dir: base.join("layouts"),
                output_dir: base.join("output"),
                default_layout: None,
                exclude: Vec::new(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.site.content_dir, "site.content_dir")?;
        expand::expand_opt(&mut self.site.layouts_dir, "site.layouts_dir")?;
        expand::expand_opt(&mut self.site.output_dir, "site.output_dir")?;
        expand::expand_opt(&mut self.site.default_layout, "site.default_layout")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.site_resolved = SiteConfig {
            content_dir: resolve(self.site.content_dir.as_deref(), "content"),
            layouts_dir: resolve(self.site.layouts_dir.as_deref(), "layouts"),
            output_dir: resolve(self.site.output_dir.as_deref(), "output"),
            default_layout: self.site.default_layout.clone(),
            exclude: self.site.exclude.clone(),
        };
    }
}
