//! Configuration for twinmark.
//!
//! Parses `twinmark.toml` with serde and discovers it in the current
//! directory or its parents. [`CliSettings`] override file values after
//! loading, and the `*_options` / [`Config::render_flags`] accessors turn
//! the sections into the runtime types of the render crates.
//!
//! ```toml
//! [render]
//! use_native = true
//! fallback_on_mismatch = true
//! enforce_parity = true
//! strict = false
//! parity_error_code = "${PARITY_CODE:-PARITY_MISMATCH}"
//!
//! [parity]
//! context_window = 80
//! lookahead = 64
//! max_segments = 50
//!
//! [settle]
//! interval_ms = 16
//! timeout_ms = 500
//!
//! [theme]
//! accent_color = "#0f766e"
//! font_size = 15
//!
//! [uploads]
//! namespace = "${TWINMARK_ACCOUNT:-default}"
//! urls = { "img/logo.png" = "https://cdn.example.com/logo.png" }
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` (error when unset) and `${VAR:-default}` are expanded in
//! `render.parity_error_code` and `uploads.namespace`.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use twinmark_legacy::Theme;
use twinmark_parity::ParityOptions;
use twinmark_render::{PARITY_MISMATCH, RenderFlags, STRICT_PARITY_MISMATCH, SettleOptions};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "twinmark.toml";

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub use_native: Option<bool>,
    pub fallback_on_mismatch: Option<bool>,
    pub strict: Option<bool>,
    pub context_window: Option<usize>,
    pub lookahead: Option<usize>,
    pub max_segments: Option<usize>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    #[error("Environment variable error in {field}: {message}")]
    EnvVar { field: String, message: String },
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub parity: ParityConfig,
    pub settle: SettleConfig,
    pub theme: ThemeConfig,
    pub uploads: UploadsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[render]`: strategy selection and parity policy.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub use_native: bool,
    pub fallback_on_mismatch: bool,
    pub enforce_parity: bool,
    /// Enforce parity without fallback. Overrides `fallback_on_mismatch`.
    pub strict: bool,
    /// Defaults to the generic or strict gate code.
    pub parity_error_code: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            use_native: true,
            fallback_on_mismatch: true,
            enforce_parity: true,
            strict: false,
            parity_error_code: None,
        }
    }
}

/// `[parity]`: mismatch report tunables.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ParityConfig {
    pub context_window: usize,
    pub lookahead: usize,
    pub max_segments: usize,
}

impl Default for ParityConfig {
    fn default() -> Self {
        let options = ParityOptions::default();
        Self {
            context_window: options.context_window,
            lookahead: options.lookahead,
            max_segments: options.max_segments,
        }
    }
}

/// `[settle]`: host settle wait.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            interval_ms: 16,
            timeout_ms: 500,
        }
    }
}

/// `[theme]`: inline style parameters. Unset keys keep the built-in theme.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub accent_color: Option<String>,
    pub text_color: Option<String>,
    pub font_size: Option<u32>,
    pub line_height: Option<String>,
    pub figure_header: Option<String>,
}

/// `[uploads]`: already-uploaded images.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Cache namespace, e.g. the publishing account.
    pub namespace: String,
    /// Local image path (relative to the docs root) to uploaded URL.
    pub urls: BTreeMap<String, String>,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_owned(),
            urls: BTreeMap::new(),
        }
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_positive(value: usize, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

fn require_color(value: Option<&str>, field: &str) -> Result<(), ConfigError> {
    let Some(color) = value else {
        return Ok(());
    };
    let hex = color.strip_prefix('#').unwrap_or_default();
    if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::Validation(format!(
            "{field} must be a hex color like #336699"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// Loads `config_path` when given; otherwise searches for
    /// `twinmark.toml` in the current directory and its parents, falling
    /// back to defaults. CLI settings are applied last.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, or if
    /// parsing, expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(use_native) = settings.use_native {
            self.render.use_native = use_native;
        }
        if let Some(fallback) = settings.fallback_on_mismatch {
            self.render.fallback_on_mismatch = fallback;
        }
        if let Some(strict) = settings.strict {
            self.render.strict = strict;
        }
        if let Some(context_window) = settings.context_window {
            self.parity.context_window = context_window;
        }
        if let Some(lookahead) = settings.lookahead {
            self.parity.lookahead = lookahead;
        }
        if let Some(max_segments) = settings.max_segments {
            self.parity.max_segments = max_segments;
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(code) = &self.render.parity_error_code {
            self.render.parity_error_code =
                Some(expand::expand_env(code, "render.parity_error_code")?);
        }
        self.uploads.namespace = expand::expand_env(&self.uploads.namespace, "uploads.namespace")?;
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(code) = &self.render.parity_error_code {
            require_non_empty(code, "render.parity_error_code")?;
        }

        require_positive(self.parity.context_window, "parity.context_window")?;
        require_positive(self.parity.lookahead, "parity.lookahead")?;
        require_positive(self.parity.max_segments, "parity.max_segments")?;

        if self.settle.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "settle.interval_ms must be greater than 0".to_owned(),
            ));
        }
        if self.settle.interval_ms > self.settle.timeout_ms {
            return Err(ConfigError::Validation(
                "settle.interval_ms cannot exceed settle.timeout_ms".to_owned(),
            ));
        }

        self.validate_theme()?;
        require_non_empty(&self.uploads.namespace, "uploads.namespace")?;
        Ok(())
    }

    fn validate_theme(&self) -> Result<(), ConfigError> {
        const MAX_FONT_SIZE: u32 = 72;

        require_color(self.theme.accent_color.as_deref(), "theme.accent_color")?;
        require_color(self.theme.text_color.as_deref(), "theme.text_color")?;
        if let Some(size) = self.theme.font_size
            && !(1..=MAX_FONT_SIZE).contains(&size)
        {
            return Err(ConfigError::Validation(format!(
                "theme.font_size must be between 1 and {MAX_FONT_SIZE}"
            )));
        }
        if let Some(line_height) = &self.theme.line_height
            && !line_height
                .parse::<f32>()
                .is_ok_and(|value| value.is_finite() && value > 0.0)
        {
            return Err(ConfigError::Validation(
                "theme.line_height must be a positive number".to_owned(),
            ));
        }
        Ok(())
    }

    /// Pipeline flags. Hooks are left unset for the caller to add.
    #[must_use]
    pub fn render_flags(&self) -> RenderFlags {
        let render = &self.render;
        let base = if render.strict {
            RenderFlags::strict()
        } else {
            RenderFlags {
                fallback_on_mismatch: render.fallback_on_mismatch,
                ..RenderFlags::default()
            }
        };
        let default_code = if render.strict {
            STRICT_PARITY_MISMATCH
        } else {
            PARITY_MISMATCH
        };
        RenderFlags {
            use_native: render.use_native,
            enforce_parity: render.enforce_parity || render.strict,
            parity_error_code: render
                .parity_error_code
                .clone()
                .unwrap_or_else(|| default_code.to_owned()),
            parity: self.parity_options(),
            ..base
        }
    }

    #[must_use]
    pub fn parity_options(&self) -> ParityOptions {
        ParityOptions {
            context_window: self.parity.context_window,
            lookahead: self.parity.lookahead,
            max_segments: self.parity.max_segments,
        }
    }

    #[must_use]
    pub fn settle_options(&self) -> SettleOptions {
        SettleOptions {
            interval: Duration::from_millis(self.settle.interval_ms),
            timeout: Duration::from_millis(self.settle.timeout_ms),
        }
    }

    /// Built-in theme with the configured overrides.
    #[must_use]
    pub fn theme(&self) -> Theme {
        let mut theme = Theme::default();
        let overrides = &self.theme;
        if let Some(accent) = &overrides.accent_color {
            theme.accent_color.clone_from(accent);
        }
        if let Some(text) = &overrides.text_color {
            theme.text_color.clone_from(text);
        }
        if let Some(size) = overrides.font_size {
            theme.font_size = size;
        }
        if let Some(line_height) = &overrides.line_height {
            theme.line_height.clone_from(line_height);
        }
        theme.figure_header.clone_from(&overrides.figure_header);
        theme
    }
}

/// Search `start` and its parents for `twinmark.toml`.
fn discover_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}
