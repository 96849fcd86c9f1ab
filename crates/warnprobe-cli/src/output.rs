//! Output formatting and progress reporting

use crate::error::CliResult;
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use warnprobe::{Scenario, ScenarioReport, SuiteReport};

/// Output format for scenario results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON suite report
    Json,
}

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    fn line(&self, message: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(message),
            None => {
                let _ = self.term.write_line(message);
            }
        }
    }

    fn prefixed(&self, symbol: &str, plain: &str, color: Style, message: &str) -> String {
        let prefix = if self.use_color {
            color.apply_to(symbol).bold().to_string()
        } else {
            plain.to_string()
        };
        format!("{prefix} {message}")
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefixed("✓", "PASS", Style::new().green(), message));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        self.line(&self.prefixed("✗", "FAIL", Style::new().red(), message));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefixed("ℹ", "INFO", Style::new().blue(), message));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print the outcome of one scenario
    pub fn scenario_result(&self, report: &ScenarioReport) {
        let name = format!(
            "{} ({}ms): {}",
            report.scenario,
            report.duration_ms,
            report.scenario.description()
        );
        match &report.error {
            None => self.success(&name),
            Some(error) => {
                self.failure(&name);
                let indent = if self.use_color {
                    style(format!("    {error}")).dim().to_string()
                } else {
                    format!("    {error}")
                };
                self.line(&indent);
            }
        }
    }

    /// Print suite summary
    pub fn summary(&self, passed: usize, failed: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed)"
            ));
        }
    }
}

/// Render the suite report as pretty JSON
pub fn render_suite_json(report: &SuiteReport) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(report).map_err(warnprobe::ProbeError::from)?)
}

/// Table of available scenarios for `warnprobe list`
#[must_use]
pub fn render_scenario_list() -> String {
    let mut out = String::new();
    for scenario in Scenario::ALL {
        let banner = scenario.banner();
        let _ = writeln!(out, "{scenario}");
        let _ = writeln!(out, "  {}", scenario.description());
        let _ = writeln!(out, "  banner:     #{}", banner.element_id());
        if let Some(close) = banner.close_id() {
            let _ = writeln!(out, "  dismiss:    #{close}");
        }
        let _ = writeln!(out, "  text:       {}", banner.expected_text());
        let _ = writeln!(out, "  user agent: {}", scenario.identity().user_agent());
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn report(passed: bool) -> ScenarioReport {
        ScenarioReport {
            scenario: Scenario::Orbot,
            passed,
            error: (!passed).then(|| "Element #browser-android is not displayed".to_string()),
            duration_ms: 12,
            user_agent: Scenario::Orbot.identity().user_agent().to_string(),
            steps: vec!["provision session".to_string()],
        }
    }

    mod output_format_tests {
        use super::*;

        #[test]
        fn test_default_format() {
            assert_eq!(OutputFormat::default(), OutputFormat::Text);
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_plain_prefix() {
            let reporter = ProgressReporter::new(false, false);
            let line = reporter.prefixed("✓", "PASS", Style::new().green(), "orbot");
            assert_eq!(line, "PASS orbot");
        }

        #[test]
        fn test_scenario_results_print() {
            let reporter = ProgressReporter::new(false, false);
            reporter.scenario_result(&report(true));
            reporter.scenario_result(&report(false));
            // No panic = success
        }

        #[test]
        fn test_progress_bar_lifecycle() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(3, "Running scenarios");
            reporter.set_message("orbot");
            reporter.increment(1);
            reporter.info("between ticks");
            reporter.finish();
            assert!(reporter.progress_bar.is_none());
        }

        #[test]
        fn test_quiet_mode_has_no_progress_bar() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(3, "Running scenarios");
            assert!(reporter.progress_bar.is_none());
            reporter.summary(3, 0, Duration::from_millis(10));
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_scenario_list_mentions_every_banner() {
            let list = render_scenario_list();
            assert!(list.contains("#browser-tb"));
            assert!(list.contains("#browser-android-close"));
            assert!(list.contains("#browser-security-level"));
            assert!(list.contains("Security Level is too low"));
            assert!(list.contains("rv:52.0"));
        }

        #[test]
        fn test_suite_json() {
            let suite = SuiteReport {
                reports: vec![report(false)],
                duration_ms: 12,
            };
            let json: serde_json::Value =
                serde_json::from_str(&render_suite_json(&suite).unwrap()).unwrap();
            assert_eq!(json["reports"][0]["scenario"], "orbot");
            assert_eq!(json["reports"][0]["passed"], false);
        }
    }
}
