//! Host-native render strategy.

use std::sync::Arc;

use async_trait::async_trait;
use twinmark_dom::RenderTarget;
use twinmark_legacy::LegacyGenerator;
use twinmark_preprocess::Preprocessor;
use twinmark_transcode::Transcoder;

use crate::context::RenderContext;
use crate::error::StrategyError;
use crate::host::{Component, HostApp, HostEngine};
use crate::settle::{SettleOptions, SettleOutcome, wait_for_settle};
use crate::strategy::RenderStrategy;

/// Renders with a host engine and transcodes its tree into legacy markup.
///
/// The legacy generator is only used for its building blocks (styles,
/// callout and code markup, post-processing); it never converts the
/// document itself.
pub struct NativeStrategy {
    engine: Arc<dyn HostEngine>,
    generator: Arc<dyn LegacyGenerator>,
    preprocessor: Preprocessor,
    app: HostApp,
    settle: SettleOptions,
}

impl NativeStrategy {
    #[must_use]
    pub fn new(engine: Arc<dyn HostEngine>, generator: Arc<dyn LegacyGenerator>) -> Self {
        let hook = Arc::clone(&generator);
        let preprocessor =
            Preprocessor::new().with_frontmatter_stripper(move |md| hook.strip_frontmatter(md));
        Self {
            engine,
            generator,
            preprocessor,
            app: HostApp::default(),
            settle: SettleOptions::default(),
        }
    }

    #[must_use]
    pub fn with_app(mut self, app: HostApp) -> Self {
        self.app = app;
        self
    }

    #[must_use]
    pub fn with_settle(mut self, settle: SettleOptions) -> Self {
        self.settle = settle;
        self
    }

    async fn render_host(
        &self,
        markdown: &str,
        target: &RenderTarget,
        source_path: &str,
        component: &Component,
    ) -> Result<(), StrategyError> {
        if let Some(result) = self
            .engine
            .render_markdown(markdown, target, source_path, component)
            .await
        {
            return result.map_err(StrategyError::from);
        }
        if let Some(result) = self
            .engine
            .render(&self.app, markdown, target, source_path, component)
            .await
        {
            return result.map_err(StrategyError::from);
        }
        Err(StrategyError::EngineUnsupported)
    }
}

#[async_trait]
impl RenderStrategy for NativeStrategy {
    async fn render(&self, ctx: &RenderContext) -> Result<String, StrategyError> {
        let markdown = self.preprocessor.process(&ctx.markdown);
        let target = RenderTarget::new();
        let component = Component::new();

        self.render_host(&markdown, &target, &ctx.source_path, &component)
            .await?;

        let outcome = wait_for_settle(&target, self.settle).await;
        if outcome == SettleOutcome::TimedOut {
            tracing::debug!(source_path = %ctx.source_path, "Transcoding unsettled host tree");
        }

        self.generator.update_source_path(&ctx.source_path);
        let root = target.snapshot();
        let html = Transcoder::new(self.generator.as_ref()).transcode(&root);
        drop(component);

        tracing::debug!(
            source_path = %ctx.source_path,
            bytes = html.len(),
            "Rendered with host engine"
        );
        Ok(html)
    }
}
