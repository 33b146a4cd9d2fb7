//! Render strategies.

use std::sync::Arc;

use async_trait::async_trait;
use twinmark_legacy::LegacyGenerator;

use crate::context::RenderContext;
use crate::error::StrategyError;

/// One way of turning Markdown into legacy-dialect markup.
#[async_trait]
pub trait RenderStrategy: Send + Sync {
    async fn render(&self, ctx: &RenderContext) -> Result<String, StrategyError>;
}

/// Strategy backed by the legacy generator.
#[derive(Clone)]
pub struct LegacyStrategy {
    generator: Arc<dyn LegacyGenerator>,
}

impl LegacyStrategy {
    #[must_use]
    pub fn new(generator: Arc<dyn LegacyGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl RenderStrategy for LegacyStrategy {
    async fn render(&self, ctx: &RenderContext) -> Result<String, StrategyError> {
        self.generator.update_source_path(&ctx.source_path);
        let html = self.generator.convert(&ctx.markdown).await?;
        tracing::debug!(
            source_path = %ctx.source_path,
            bytes = html.len(),
            "Rendered with legacy generator"
        );
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use twinmark_legacy::StyledGenerator;

    use super::*;

    #[tokio::test]
    async fn test_source_path_applied_before_convert() {
        let strategy = LegacyStrategy::new(Arc::new(StyledGenerator::default()));
        let html = strategy
            .render(&RenderContext::new("![](img/a.png)", "docs/guide/page.md"))
            .await
            .unwrap();
        assert!(html.contains(r#"src="docs/guide/img/a.png""#), "{html}");
    }
}
