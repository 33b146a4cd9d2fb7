//! `twinmark diff` command implementation.

use std::path::PathBuf;

use clap::Args;
use twinmark_parity::{ParityOptions, build_mismatch_report_with};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the diff command.
#[derive(Args)]
pub(crate) struct DiffArgs {
    /// Markup produced by the legacy generator.
    legacy: PathBuf,

    /// Markup to check against it.
    candidate: PathBuf,

    /// Characters of context around each segment.
    #[arg(long)]
    context: Option<usize>,

    /// Characters scanned ahead when resynchronizing.
    #[arg(long)]
    lookahead: Option<usize>,

    /// Maximum number of segments to report.
    #[arg(long)]
    max_segments: Option<usize>,
}

impl DiffArgs {
    /// Execute the diff command.
    ///
    /// # Errors
    ///
    /// Returns an error if a file can't be read or the files differ.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let legacy = std::fs::read_to_string(&self.legacy)?;
        let candidate = std::fs::read_to_string(&self.candidate)?;

        let report = build_mismatch_report_with(&legacy, &candidate, &self.options());
        if report.is_match() {
            output.success(&report.to_string());
            return Ok(());
        }

        output.report(&report);
        Err(CliError::Mismatch(format!(
            "{} and {} differ",
            self.legacy.display(),
            self.candidate.display()
        )))
    }

    fn options(&self) -> ParityOptions {
        let defaults = ParityOptions::default();
        ParityOptions {
            context_window: self.context.unwrap_or(defaults.context_window),
            lookahead: self.lookahead.unwrap_or(defaults.lookahead),
            max_segments: self.max_segments.unwrap_or(defaults.max_segments),
        }
    }
}
