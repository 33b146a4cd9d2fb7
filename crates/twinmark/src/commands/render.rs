//! `twinmark render` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use twinmark_cache::{Cache, CacheBucketExt, MemoryCache, NamespacedCache};
use twinmark_config::{CliSettings, Config, UploadsConfig};
use twinmark_legacy::{LegacyGenerator, StyledGenerator, UPLOADS_BUCKET};
use twinmark_render::{
    CmarkEngine, LegacyStrategy, NativeStrategy, PreviewContext, RenderError, RenderPipeline,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the markdown file.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover twinmark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render with the legacy generator only.
    #[arg(long)]
    legacy_only: bool,

    /// Fail instead of serving the legacy render on divergence.
    #[arg(long)]
    no_fallback: bool,

    /// Enforce parity without fallback.
    #[arg(long)]
    strict: bool,

    /// Print JSON with the markup and render diagnostics.
    #[arg(long)]
    export: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the file can't be read, or
    /// the pipeline refuses to produce markup.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let markdown = std::fs::read_to_string(&self.file)?;
        let ctx = PreviewContext::new(source_path(&self.file, config.config_path.as_deref()));
        let pipeline = build_pipeline(&config);
        tracing::info!(
            source_path = %ctx.source_path,
            config = ?config.config_path,
            "Rendering"
        );

        if self.export {
            let export = pipeline
                .render_for_export(&markdown, &ctx)
                .await
                .map_err(|err| report_failure(&output, err))?;
            if let Some(reason) = export.diagnostics.fallback {
                output.warning(&format!("Served legacy render ({reason:?})"));
            }
            output.document(&serde_json::to_string_pretty(&export)?)?;
        } else {
            let html = pipeline
                .render_for_preview(&markdown, &ctx)
                .await
                .map_err(|err| report_failure(&output, err))?;
            output.document(&html)?;
        }

        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            use_native: self.legacy_only.then_some(false),
            fallback_on_mismatch: self.no_fallback.then_some(false),
            strict: self.strict.then_some(true),
            ..CliSettings::default()
        }
    }
}

/// Print the mismatch report carried by a parity failure.
fn report_failure(output: &Output, err: RenderError) -> CliError {
    if let Some(mismatch) = err.as_parity_mismatch() {
        output.report(mismatch.parity());
    }
    CliError::Render(err)
}

fn build_pipeline(config: &Config) -> RenderPipeline {
    let generator: Arc<dyn LegacyGenerator> = Arc::new(
        StyledGenerator::new(config.theme()).with_upload_cache(&upload_cache(&config.uploads)),
    );
    let native = NativeStrategy::new(Arc::new(CmarkEngine::new()), Arc::clone(&generator))
        .with_settle(config.settle_options());

    RenderPipeline::new(config.render_flags())
        .with_legacy(Arc::new(LegacyStrategy::new(generator)))
        .with_native(Arc::new(native))
}

/// Uploads bucket seeded from `[uploads]`.
fn upload_cache(uploads: &UploadsConfig) -> NamespacedCache<MemoryCache> {
    let cache = NamespacedCache::new(MemoryCache::new(), uploads.namespace.as_str());
    let bucket = cache.bucket(UPLOADS_BUCKET);
    for (path, url) in &uploads.urls {
        bucket.set_string(path, "", url);
    }
    cache
}

/// Path of `file` relative to the directory holding the config file.
fn source_path(file: &Path, config_path: Option<&Path>) -> String {
    let relative = config_path
        .and_then(Path::parent)
        .and_then(|root| file.strip_prefix(root).ok())
        .unwrap_or(file);
    relative.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_source_path_relative_to_config() {
        assert_eq!(
            source_path(
                Path::new("/docs/notes/a.md"),
                Some(Path::new("/docs/twinmark.toml"))
            ),
            "notes/a.md"
        );
        assert_eq!(source_path(Path::new("notes/a.md"), None), "notes/a.md");
    }

    #[test]
    fn test_upload_cache_is_namespaced() {
        let uploads = UploadsConfig {
            namespace: "alice".to_owned(),
            urls: [("img/a.png".to_owned(), "https://cdn.test/a.png".to_owned())].into(),
        };
        let cache = upload_cache(&uploads);
        assert_eq!(cache.namespace(), "alice");
        assert_eq!(
            cache.bucket(UPLOADS_BUCKET).get_string("img/a.png", "").as_deref(),
            Some("https://cdn.test/a.png")
        );
    }

    #[test]
    fn test_cli_settings_only_override_set_flags() {
        let args = RenderArgs {
            file: PathBuf::from("a.md"),
            config: None,
            legacy_only: false,
            no_fallback: true,
            strict: false,
            export: false,
            verbose: false,
        };
        let settings = args.cli_settings();
        assert_eq!(settings.use_native, None);
        assert_eq!(settings.fallback_on_mismatch, Some(false));
        assert_eq!(settings.strict, None);
    }

    #[tokio::test]
    async fn test_configured_pipeline_uses_uploaded_url() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("twinmark.toml");
        std::fs::write(
            &config_path,
            "[render]\nstrict = true\n\n[uploads]\nurls = { \"notes/img/a.png\" = \"https://cdn.test/a.png\" }\n",
        )
        .unwrap();
        let config = Config::load(Some(config_path.as_path()), None).unwrap();

        let html = build_pipeline(&config)
            .render_for_preview("![a](img/a.png)", &PreviewContext::new("notes/page.md"))
            .await
            .unwrap();
        assert!(html.contains(r#"src="https://cdn.test/a.png""#), "{html}");
    }
}
