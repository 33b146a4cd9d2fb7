//! Per-call render inputs and pipeline flags.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use twinmark_parity::{MismatchReport, ParityOptions};

use crate::error::{BoxError, PARITY_MISMATCH, STRICT_PARITY_MISMATCH, Side};

/// Input of a single render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderContext {
    pub markdown: String,
    /// Path relative links and images are resolved against.
    pub source_path: String,
}

impl RenderContext {
    #[must_use]
    pub fn new(markdown: impl Into<String>, source_path: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            source_path: source_path.into(),
        }
    }
}

/// Caller-side context of a preview or export request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreviewContext {
    pub source_path: String,
}

impl PreviewContext {
    #[must_use]
    pub fn new(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
        }
    }
}

/// What a parity transform is looking at.
#[derive(Clone, Copy, Debug)]
pub struct TransformMeta<'a> {
    pub side: Side,
    pub source_path: &'a str,
}

/// Rewrites one side of a comparison before the parity gate.
///
/// The rewritten markup is only compared, never returned to the caller.
#[async_trait]
pub trait ParityTransform: Send + Sync {
    /// Return `None` to compare `html` unchanged.
    async fn transform(
        &self,
        html: &str,
        meta: &TransformMeta<'_>,
    ) -> Result<Option<String>, BoxError>;
}

/// Notification sent when the renders differ.
#[derive(Clone, Copy, Debug)]
pub struct MismatchPayload<'a> {
    pub code: &'a str,
    pub source_path: &'a str,
    pub report: &'a MismatchReport,
    /// Whether the legacy result is returned in place of an error.
    pub fallback: bool,
}

/// Observer of parity mismatches.
///
/// Calls are best effort: errors and panics are logged and never change
/// the outcome of the render.
#[async_trait]
pub trait MismatchObserver: Send + Sync {
    async fn on_mismatch(&self, payload: &MismatchPayload<'_>) -> Result<(), BoxError>;
}

/// Pipeline behavior switches.
#[derive(Clone)]
pub struct RenderFlags {
    /// Try the native strategy first.
    pub use_native: bool,
    /// Serve the legacy result when native fails or diverges.
    pub fallback_on_mismatch: bool,
    /// Compare native output against legacy.
    pub enforce_parity: bool,
    /// Code carried by parity errors.
    pub parity_error_code: String,
    pub parity_transform: Option<Arc<dyn ParityTransform>>,
    pub on_parity_mismatch: Option<Arc<dyn MismatchObserver>>,
    pub parity: ParityOptions,
}

impl RenderFlags {
    /// Native only, parity enforced, no fallback.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            fallback_on_mismatch: false,
            parity_error_code: STRICT_PARITY_MISMATCH.to_owned(),
            ..Self::default()
        }
    }

    /// Legacy only.
    #[must_use]
    pub fn legacy_only() -> Self {
        Self {
            use_native: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parity_transform(mut self, transform: impl ParityTransform + 'static) -> Self {
        self.parity_transform = Some(Arc::new(transform));
        self
    }

    #[must_use]
    pub fn with_mismatch_observer(mut self, observer: impl MismatchObserver + 'static) -> Self {
        self.on_parity_mismatch = Some(Arc::new(observer));
        self
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            use_native: true,
            fallback_on_mismatch: true,
            enforce_parity: true,
            parity_error_code: PARITY_MISMATCH.to_owned(),
            parity_transform: None,
            on_parity_mismatch: None,
            parity: ParityOptions::default(),
        }
    }
}

impl fmt::Debug for RenderFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderFlags")
            .field("use_native", &self.use_native)
            .field("fallback_on_mismatch", &self.fallback_on_mismatch)
            .field("enforce_parity", &self.enforce_parity)
            .field("parity_error_code", &self.parity_error_code)
            .field("parity_transform", &self.parity_transform.is_some())
            .field("on_parity_mismatch", &self.on_parity_mismatch.is_some())
            .field("parity", &self.parity)
            .finish()
    }
}
