//! Strategy selection, parity enforcement and fallback.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use twinmark_parity::{MismatchReport, build_mismatch_report_with, is_exact_match};

use crate::context::{
    MismatchPayload, ParityTransform, PreviewContext, RenderContext, RenderFlags, TransformMeta,
};
use crate::error::{ParityMismatchError, RenderError, Side};
use crate::strategy::RenderStrategy;

/// Strategy that produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Native,
    Legacy,
}

/// Why the legacy result was served in place of the native one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NativeUnavailable,
    NativeFailed,
    TransformFailed,
    ParityMismatch,
}

/// How an export render was produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDiagnostics {
    pub strategy: StrategyKind,
    pub fallback: Option<FallbackReason>,
    /// Whether both renders were compared.
    pub parity_checked: bool,
    /// Mismatch report of the comparison, when the renders differed.
    pub parity: Option<MismatchReport>,
}

impl RenderDiagnostics {
    fn legacy(fallback: Option<FallbackReason>) -> Self {
        Self {
            strategy: StrategyKind::Legacy,
            fallback,
            parity_checked: false,
            parity: None,
        }
    }

    fn native(parity_checked: bool) -> Self {
        Self {
            strategy: StrategyKind::Native,
            fallback: None,
            parity_checked,
            parity: None,
        }
    }
}

/// Markup plus the diagnostics of how it was produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportRender {
    pub html: String,
    pub diagnostics: RenderDiagnostics,
}

/// The render entry point.
///
/// Runs the native strategy, checks it against legacy when parity is
/// enforced, and serves legacy whenever the native result cannot be
/// trusted and fallback is allowed.
#[derive(Clone)]
pub struct RenderPipeline {
    legacy: Option<Arc<dyn RenderStrategy>>,
    native: Option<Arc<dyn RenderStrategy>>,
    flags: RenderFlags,
}

impl RenderPipeline {
    #[must_use]
    pub fn new(flags: RenderFlags) -> Self {
        Self {
            legacy: None,
            native: None,
            flags,
        }
    }

    #[must_use]
    pub fn with_legacy(mut self, strategy: Arc<dyn RenderStrategy>) -> Self {
        self.legacy = Some(strategy);
        self
    }

    #[must_use]
    pub fn with_native(mut self, strategy: Arc<dyn RenderStrategy>) -> Self {
        self.native = Some(strategy);
        self
    }

    #[must_use]
    pub fn flags(&self) -> &RenderFlags {
        &self.flags
    }

    /// Render for display.
    ///
    /// # Errors
    ///
    /// See [`render_for_export`](Self::render_for_export).
    pub async fn render_for_preview(
        &self,
        markdown: &str,
        ctx: &PreviewContext,
    ) -> Result<String, RenderError> {
        let export = self.render_for_export(markdown, ctx).await?;
        Ok(export.html)
    }

    /// Render and report how the markup was produced.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::RendererUnavailable`] when no configured
    /// strategy can serve the request, and the native, transform or parity
    /// failure when fallback is disabled. Legacy failures propagate as
    /// [`RenderError::Legacy`].
    pub async fn render_for_export(
        &self,
        markdown: &str,
        ctx: &PreviewContext,
    ) -> Result<ExportRender, RenderError> {
        let ctx = RenderContext::new(markdown, ctx.source_path.clone());
        self.run(&ctx).await
    }

    async fn run(&self, ctx: &RenderContext) -> Result<ExportRender, RenderError> {
        let flags = &self.flags;
        if !flags.use_native {
            return self.render_legacy(ctx, None).await;
        }

        let Some(native) = &self.native else {
            if flags.fallback_on_mismatch {
                tracing::debug!("Native strategy not configured, using legacy");
                return self
                    .render_legacy(ctx, Some(FallbackReason::NativeUnavailable))
                    .await;
            }
            return Err(RenderError::RendererUnavailable(
                "native strategy is not configured",
            ));
        };

        let candidate = match native.render(ctx).await {
            Ok(html) => html,
            Err(err) if flags.fallback_on_mismatch && self.legacy.is_some() => {
                tracing::warn!(
                    error = %err,
                    source_path = %ctx.source_path,
                    "Native render failed, falling back to legacy"
                );
                return self
                    .render_legacy(ctx, Some(FallbackReason::NativeFailed))
                    .await;
            }
            Err(err) => return Err(RenderError::Native(err)),
        };

        let legacy = match &self.legacy {
            Some(legacy) if flags.enforce_parity => legacy,
            _ => {
                return Ok(ExportRender {
                    html: candidate,
                    diagnostics: RenderDiagnostics::native(false),
                });
            }
        };

        let legacy_html = legacy.render(ctx).await.map_err(RenderError::Legacy)?;
        self.gate(ctx, candidate, legacy_html).await
    }

    async fn render_legacy(
        &self,
        ctx: &RenderContext,
        fallback: Option<FallbackReason>,
    ) -> Result<ExportRender, RenderError> {
        let Some(legacy) = &self.legacy else {
            return Err(RenderError::RendererUnavailable(
                "legacy strategy is not configured",
            ));
        };
        let html = legacy.render(ctx).await.map_err(RenderError::Legacy)?;
        Ok(ExportRender {
            html,
            diagnostics: RenderDiagnostics::legacy(fallback),
        })
    }

    /// Compare both renders and pick the result.
    async fn gate(
        &self,
        ctx: &RenderContext,
        candidate: String,
        legacy_html: String,
    ) -> Result<ExportRender, RenderError> {
        let flags = &self.flags;

        let compared = match self.transform_pair(ctx, &legacy_html, &candidate).await {
            Ok(compared) => compared,
            Err(err) if flags.fallback_on_mismatch => {
                tracing::warn!(
                    error = %err,
                    source_path = %ctx.source_path,
                    "Parity transform failed, falling back to legacy"
                );
                return Ok(ExportRender {
                    html: legacy_html,
                    diagnostics: RenderDiagnostics::legacy(Some(FallbackReason::TransformFailed)),
                });
            }
            Err(err) => return Err(err),
        };
        let (legacy_cmp, candidate_cmp) = compared;

        if is_exact_match(&legacy_cmp, &candidate_cmp) {
            return Ok(ExportRender {
                html: candidate,
                diagnostics: RenderDiagnostics::native(true),
            });
        }

        let report = build_mismatch_report_with(&legacy_cmp, &candidate_cmp, &flags.parity);
        self.notify_mismatch(ctx, &report).await;

        if flags.fallback_on_mismatch {
            tracing::warn!(
                code = %flags.parity_error_code,
                headline = %report,
                source_path = %ctx.source_path,
                "Parity mismatch, serving legacy render"
            );
            return Ok(ExportRender {
                html: legacy_html,
                diagnostics: RenderDiagnostics {
                    strategy: StrategyKind::Legacy,
                    fallback: Some(FallbackReason::ParityMismatch),
                    parity_checked: true,
                    parity: Some(report),
                },
            });
        }

        Err(RenderError::ParityMismatch(Box::new(ParityMismatchError::new(
            flags.parity_error_code.clone(),
            report,
        ))))
    }

    /// Apply the parity transform to each side. A side keeps its input when
    /// no transform is set or the transform declines.
    async fn transform_pair(
        &self,
        ctx: &RenderContext,
        legacy_html: &str,
        candidate: &str,
    ) -> Result<(String, String), RenderError> {
        let Some(transform) = &self.flags.parity_transform else {
            return Ok((legacy_html.to_owned(), candidate.to_owned()));
        };
        let legacy = transform_side(transform.as_ref(), Side::Legacy, legacy_html, ctx).await?;
        let candidate = transform_side(transform.as_ref(), Side::Candidate, candidate, ctx).await?;
        Ok((legacy, candidate))
    }

    async fn notify_mismatch(&self, ctx: &RenderContext, report: &MismatchReport) {
        let Some(observer) = &self.flags.on_parity_mismatch else {
            return;
        };
        let payload = MismatchPayload {
            code: &self.flags.parity_error_code,
            source_path: &ctx.source_path,
            report,
            fallback: self.flags.fallback_on_mismatch,
        };
        match AssertUnwindSafe(observer.on_mismatch(&payload))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "Parity mismatch observer failed"),
            Err(_) => tracing::warn!("Parity mismatch observer panicked"),
        }
    }
}

async fn transform_side(
    transform: &dyn ParityTransform,
    side: Side,
    html: &str,
    ctx: &RenderContext,
) -> Result<String, RenderError> {
    let meta = TransformMeta {
        side,
        source_path: &ctx.source_path,
    };
    let transformed = transform
        .transform(html, &meta)
        .await
        .map_err(|source| RenderError::Transform { side, source })?;
    Ok(transformed.unwrap_or_else(|| html.to_owned()))
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("legacy", &self.legacy.is_some())
            .field("native", &self.native.is_some())
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::context::MismatchObserver;
    use crate::error::{BoxError, STRICT_PARITY_MISMATCH, StrategyError};

    /// Strategy returning a fixed string and counting calls.
    struct Fixed {
        html: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn ok(html: &'static str) -> Arc<Self> {
            Arc::new(Self {
                html: Some(html),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                html: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RenderStrategy for Fixed {
        async fn render(&self, _ctx: &RenderContext) -> Result<String, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.html
                .map(str::to_owned)
                .ok_or_else(|| StrategyError::Other("native exploded".to_owned()))
        }
    }

    #[derive(Default)]
    struct Recorder {
        indices: Mutex<Vec<Option<usize>>>,
    }

    #[async_trait]
    impl MismatchObserver for Arc<Recorder> {
        async fn on_mismatch(&self, payload: &MismatchPayload<'_>) -> Result<(), BoxError> {
            self.indices
                .lock()
                .map_err(|_| "poisoned")?
                .push(payload.report.index);
            Ok(())
        }
    }

    /// Rejects every report and counts calls.
    #[derive(Default)]
    struct Rejecting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MismatchObserver for Arc<Rejecting> {
        async fn on_mismatch(&self, _payload: &MismatchPayload<'_>) -> Result<(), BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err("report sink offline".into())
        }
    }

    struct Panicking;

    #[async_trait]
    impl MismatchObserver for Panicking {
        async fn on_mismatch(&self, _payload: &MismatchPayload<'_>) -> Result<(), BoxError> {
            panic!("observer bug");
        }
    }

    /// Lowercases candidate markup only.
    struct LowercaseCandidate;

    #[async_trait]
    impl ParityTransform for LowercaseCandidate {
        async fn transform(
            &self,
            html: &str,
            meta: &TransformMeta<'_>,
        ) -> Result<Option<String>, BoxError> {
            Ok((meta.side == Side::Candidate).then(|| html.to_lowercase()))
        }
    }

    struct BrokenTransform;

    #[async_trait]
    impl ParityTransform for BrokenTransform {
        async fn transform(
            &self,
            _html: &str,
            _meta: &TransformMeta<'_>,
        ) -> Result<Option<String>, BoxError> {
            Err("cannot parse".into())
        }
    }

    fn pipeline(
        flags: RenderFlags,
        legacy: &Arc<Fixed>,
        native: &Arc<Fixed>,
    ) -> RenderPipeline {
        RenderPipeline::new(flags)
            .with_legacy(Arc::clone(legacy) as Arc<dyn RenderStrategy>)
            .with_native(Arc::clone(native) as Arc<dyn RenderStrategy>)
    }

    fn ctx() -> PreviewContext {
        PreviewContext::new("notes/a.md")
    }

    #[tokio::test]
    async fn test_matching_renders_return_native() {
        let recorder = Arc::new(Recorder::default());
        let legacy = Fixed::ok("<section>ok</section>");
        let native = Fixed::ok("<section>ok</section>");
        let flags = RenderFlags::default().with_mismatch_observer(Arc::clone(&recorder));

        let export = pipeline(flags, &legacy, &native)
            .render_for_export("# title", &ctx())
            .await
            .unwrap();

        assert_eq!(export.html, "<section>ok</section>");
        assert_eq!(export.diagnostics, RenderDiagnostics::native(true));
        assert!(recorder.indices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mismatch_falls_back_to_legacy() {
        let recorder = Arc::new(Recorder::default());
        let legacy = Fixed::ok("<section>legacy</section>");
        let native = Fixed::ok("<section>native</section>");
        let flags = RenderFlags::default().with_mismatch_observer(Arc::clone(&recorder));

        let export = pipeline(flags, &legacy, &native)
            .render_for_export("# title", &ctx())
            .await
            .unwrap();

        assert_eq!(export.html, "<section>legacy</section>");
        assert_eq!(export.diagnostics.fallback, Some(FallbackReason::ParityMismatch));
        let indices = recorder.indices.lock().unwrap().clone();
        assert_eq!(indices.len(), 1);
        assert!(indices[0].is_some_and(|index| index >= 9));
    }

    #[tokio::test]
    async fn test_mismatch_without_fallback_fails_with_code() {
        let legacy = Fixed::ok("<section>legacy</section>");
        let native = Fixed::ok("<section>native</section>");
        let flags = RenderFlags {
            fallback_on_mismatch: false,
            parity_error_code: "DOC_PARITY".to_owned(),
            ..RenderFlags::default()
        };

        let err = pipeline(flags, &legacy, &native)
            .render_for_preview("# title", &ctx())
            .await
            .unwrap_err();

        let mismatch = err.as_parity_mismatch().unwrap();
        assert_eq!(mismatch.code(), "DOC_PARITY");
        assert_eq!(mismatch.parity().index, Some(9));
    }

    #[tokio::test]
    async fn test_strict_index_is_insertion_offset() {
        let legacy = Fixed::ok("<p>alpha</p><p>omega</p>");
        let native = Fixed::ok("<p>alpha</p>\n<p>omega</p>");

        let err = pipeline(RenderFlags::strict(), &legacy, &native)
            .render_for_preview("x", &ctx())
            .await
            .unwrap_err();

        let mismatch = err.as_parity_mismatch().unwrap();
        assert_eq!(mismatch.code(), STRICT_PARITY_MISMATCH);
        assert_eq!(mismatch.parity().index, Some(12));
        assert_eq!(mismatch.parity().segment_count, 1);
    }

    #[tokio::test]
    async fn test_native_failure_falls_back() {
        let legacy = Fixed::ok("<p>safe</p>");
        let native = Fixed::failing();

        let export = pipeline(RenderFlags::default(), &legacy, &native)
            .render_for_export("x", &ctx())
            .await
            .unwrap();

        assert_eq!(export.html, "<p>safe</p>");
        assert_eq!(export.diagnostics.fallback, Some(FallbackReason::NativeFailed));
        assert!(!export.diagnostics.parity_checked);
    }

    #[tokio::test]
    async fn test_native_failure_propagates_unchanged() {
        let legacy = Fixed::ok("<p>safe</p>");
        let native = Fixed::failing();

        let err = pipeline(RenderFlags::strict(), &legacy, &native)
            .render_for_preview("x", &ctx())
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Native(StrategyError::Other(_))));
        assert_eq!(err.to_string(), "native exploded");
        assert_eq!(legacy.calls(), 0);
    }

    #[tokio::test]
    async fn test_enforcement_off_skips_legacy() {
        let legacy = Fixed::ok("<p>legacy</p>");
        let native = Fixed::ok("<p>native</p>");
        let flags = RenderFlags {
            enforce_parity: false,
            ..RenderFlags::default()
        };

        let html = pipeline(flags, &legacy, &native)
            .render_for_preview("x", &ctx())
            .await
            .unwrap();

        assert_eq!(html, "<p>native</p>");
        assert_eq!(legacy.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_native() {
        let legacy = Fixed::ok("<p>legacy</p>");
        let with_fallback = RenderPipeline::new(RenderFlags::default())
            .with_legacy(Arc::clone(&legacy) as Arc<dyn RenderStrategy>);
        let export = with_fallback.render_for_export("x", &ctx()).await.unwrap();
        assert_eq!(export.diagnostics.fallback, Some(FallbackReason::NativeUnavailable));

        let strict = RenderPipeline::new(RenderFlags::strict())
            .with_legacy(legacy as Arc<dyn RenderStrategy>);
        let err = strict.render_for_preview("x", &ctx()).await.unwrap_err();
        assert!(matches!(err, RenderError::RendererUnavailable(_)));
    }

    #[tokio::test]
    async fn test_legacy_only_needs_legacy() {
        let err = RenderPipeline::new(RenderFlags::legacy_only())
            .render_for_preview("x", &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::RendererUnavailable(_)));
    }

    #[tokio::test]
    async fn test_transform_compares_but_returns_untransformed() {
        let legacy = Fixed::ok("<p>same</p>");
        let native = Fixed::ok("<P>SAME</P>");
        let flags = RenderFlags::strict().with_parity_transform(LowercaseCandidate);

        let html = pipeline(flags, &legacy, &native)
            .render_for_preview("x", &ctx())
            .await
            .unwrap();
        assert_eq!(html, "<P>SAME</P>");
    }

    #[tokio::test]
    async fn test_transform_failure() {
        let legacy = Fixed::ok("<p>a</p>");
        let native = Fixed::ok("<p>a</p>");

        let flags = RenderFlags::default().with_parity_transform(BrokenTransform);
        let export = pipeline(flags, &legacy, &native)
            .render_for_export("x", &ctx())
            .await
            .unwrap();
        assert_eq!(export.diagnostics.fallback, Some(FallbackReason::TransformFailed));

        let flags = RenderFlags::strict().with_parity_transform(BrokenTransform);
        let err = pipeline(flags, &legacy, &native)
            .render_for_preview("x", &ctx())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Transform {
                side: Side::Legacy,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_observer_panic_does_not_change_outcome() {
        let legacy = Fixed::ok("<p>legacy</p>");
        let native = Fixed::ok("<p>native</p>");
        let flags = RenderFlags::default().with_mismatch_observer(Panicking);

        let html = pipeline(flags, &legacy, &native)
            .render_for_preview("x", &ctx())
            .await
            .unwrap();
        assert_eq!(html, "<p>legacy</p>");
    }

    #[tokio::test]
    async fn test_observer_error_does_not_change_fallback() {
        let legacy = Fixed::ok("<p>legacy</p>");
        let native = Fixed::ok("<p>native</p>");
        let observer = Arc::new(Rejecting::default());
        let flags = RenderFlags::default().with_mismatch_observer(Arc::clone(&observer));

        let html = pipeline(flags, &legacy, &native)
            .render_for_preview("x", &ctx())
            .await
            .unwrap();
        assert_eq!(html, "<p>legacy</p>");
        assert_eq!(observer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_observer_error_does_not_change_strict_error() {
        let legacy = Fixed::ok("<p>alpha</p><p>omega</p>");
        let native = Fixed::ok("<p>alpha</p>\n<p>omega</p>");
        let observer = Arc::new(Rejecting::default());
        let flags = RenderFlags::strict().with_mismatch_observer(Arc::clone(&observer));

        let err = pipeline(flags, &legacy, &native)
            .render_for_preview("x", &ctx())
            .await
            .unwrap_err();

        let mismatch = err.as_parity_mismatch().unwrap();
        assert_eq!(mismatch.code(), STRICT_PARITY_MISMATCH);
        assert_eq!(mismatch.parity().index, Some(12));
        assert_eq!(observer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_renders_are_identical() {
        let legacy = Fixed::ok("<p>legacy</p>");
        let native = Fixed::ok("<p>native</p>");
        let pipeline = pipeline(RenderFlags::default(), &legacy, &native);

        let first = pipeline.render_for_export("x", &ctx()).await.unwrap();
        let second = pipeline.render_for_export("x", &ctx()).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_diagnostics_serialize_camel_case() {
        let diagnostics = RenderDiagnostics::legacy(Some(FallbackReason::NativeFailed));
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "strategy": "legacy",
                "fallback": "native_failed",
                "parityChecked": false,
                "parity": null,
            })
        );
    }
}
