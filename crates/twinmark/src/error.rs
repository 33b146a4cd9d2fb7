//! CLI error types.

use twinmark_config::ConfigError;
use twinmark_render::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// `diff` found divergent files; the report was already printed.
    #[error("{0}")]
    Mismatch(String),
}
