//! Colored terminal output utilities.

use console::{Style, Term};
use twinmark_parity::MismatchReport;

/// Terminal output formatter.
///
/// Diagnostics go to stderr; rendered documents go to stdout.
pub(crate) struct Output {
    term: Term,
    stdout: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            stdout: Term::stdout(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a highlighted message (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Write a document to stdout.
    pub(crate) fn document(&self, content: &str) -> std::io::Result<()> {
        self.stdout.write_line(content)
    }

    /// Print a mismatch report: headline, then every segment.
    pub(crate) fn report(&self, report: &MismatchReport) {
        self.warning(&report.to_string());
        for (position, line) in report_lines(report).iter().enumerate() {
            if position % 3 == 0 {
                self.highlight(line);
            } else {
                let _ = self.term.write_line(&self.dim.apply_to(line).to_string());
            }
        }
    }
}

/// Three lines per segment: location, legacy snippet, candidate snippet.
fn report_lines(report: &MismatchReport) -> Vec<String> {
    report
        .segments
        .iter()
        .flat_map(|segment| {
            [
                segment.to_string(),
                format!("  legacy:    {:?}", segment.legacy_snippet),
                format!("  candidate: {:?}", segment.candidate_snippet),
            ]
        })
        .collect()
}
