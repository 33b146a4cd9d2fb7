//! Render error types.

use std::fmt;

use twinmark_legacy::LegacyError;
use twinmark_parity::MismatchReport;

/// Boxed error returned by caller-supplied hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Default code of the generic parity gate.
pub const PARITY_MISMATCH: &str = "PARITY_MISMATCH";

/// Default code of the strict parity gate.
pub const STRICT_PARITY_MISMATCH: &str = "STRICT_PARITY_MISMATCH";

/// Which render a comparison input came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Legacy,
    Candidate,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Legacy => "legacy",
            Self::Candidate => "candidate",
        })
    }
}

/// Error reported by a host engine.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HostError {
    #[error("host render failed: {0}")]
    Render(String),
}

/// Error produced by a render strategy.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StrategyError {
    /// The host engine implements neither entry point.
    #[error("host engine provides neither `render_markdown` nor `render`")]
    EngineUnsupported,
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Legacy(#[from] LegacyError),
    /// Failure of a custom strategy.
    #[error("{0}")]
    Other(String),
}

/// Parity failure with fallback disabled.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {parity}")]
pub struct ParityMismatchError {
    code: String,
    parity: MismatchReport,
}

impl ParityMismatchError {
    #[must_use]
    pub fn new(code: impl Into<String>, parity: MismatchReport) -> Self {
        Self {
            code: code.into(),
            parity,
        }
    }

    /// Configured error code, e.g. [`PARITY_MISMATCH`].
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Where and how the renders diverged.
    #[must_use]
    pub fn parity(&self) -> &MismatchReport {
        &self.parity
    }
}

/// Error returned by the render pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// No strategy can serve the request.
    #[error("renderer unavailable: {0}")]
    RendererUnavailable(&'static str),

    /// The native strategy failed and no fallback applies. The original
    /// error is kept as is.
    #[error(transparent)]
    Native(StrategyError),

    /// The legacy strategy failed where it was the only answer.
    #[error("legacy render failed: {0}")]
    Legacy(#[source] StrategyError),

    /// The parity transform failed and no fallback applies.
    #[error("parity transform failed on the {side} side: {source}")]
    Transform {
        side: Side,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    ParityMismatch(Box<ParityMismatchError>),
}

impl RenderError {
    /// The parity failure, if this is one.
    #[must_use]
    pub fn as_parity_mismatch(&self) -> Option<&ParityMismatchError> {
        match self {
            Self::ParityMismatch(err) => Some(err),
            _ => None,
        }
    }
}
