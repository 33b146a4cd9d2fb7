//! Dual-path rendering with parity enforcement.
//!
//! A [`RenderPipeline`] holds two [`RenderStrategy`] implementations:
//!
//! - [`LegacyStrategy`] converts Markdown with the legacy generator;
//! - [`NativeStrategy`] preprocesses the Markdown, lets a [`HostEngine`]
//!   render it into a node tree, waits for asynchronous host work to
//!   settle, and transcodes the tree into legacy markup.
//!
//! With parity enforced, every native result is compared against legacy.
//! A divergent or failed native render is never returned: the pipeline
//! either serves the legacy result or fails with a typed error carrying a
//! [`MismatchReport`](twinmark_parity::MismatchReport).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use twinmark_legacy::{LegacyGenerator, StyledGenerator};
//! use twinmark_render::{
//!     CmarkEngine, LegacyStrategy, NativeStrategy, PreviewContext, RenderFlags, RenderPipeline,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), twinmark_render::RenderError> {
//! let generator: Arc<dyn LegacyGenerator> = Arc::new(StyledGenerator::default());
//! let pipeline = RenderPipeline::new(RenderFlags::strict())
//!     .with_legacy(Arc::new(LegacyStrategy::new(Arc::clone(&generator))))
//!     .with_native(Arc::new(NativeStrategy::new(Arc::new(CmarkEngine::new()), generator)));
//!
//! let html = pipeline
//!     .render_for_preview("Hello *world*", &PreviewContext::new("notes/hello.md"))
//!     .await?;
//! assert!(html.starts_with("<p style="));
//! # Ok(())
//! # }
//! ```

mod context;
mod engine;
mod error;
mod host;
mod native;
mod pipeline;
mod sequencer;
mod settle;
mod strategy;

pub use context::{
    MismatchObserver, MismatchPayload, ParityTransform, PreviewContext, RenderContext,
    RenderFlags, TransformMeta,
};
pub use engine::CmarkEngine;
pub use error::{
    BoxError, HostError, PARITY_MISMATCH, ParityMismatchError, RenderError,
    STRICT_PARITY_MISMATCH, Side, StrategyError,
};
pub use host::{Component, HostApp, HostEngine};
pub use native::NativeStrategy;
pub use pipeline::{ExportRender, FallbackReason, RenderDiagnostics, RenderPipeline, StrategyKind};
pub use sequencer::{RequestSequencer, Ticket};
pub use settle::{SettleOptions, SettleOutcome, wait_for_settle};
pub use strategy::{LegacyStrategy, RenderStrategy};
