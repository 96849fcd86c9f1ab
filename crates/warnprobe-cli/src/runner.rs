//! Scenario runner

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{render_suite_json, OutputFormat, ProgressReporter};
use std::time::Duration;
use warnprobe::{run_suite_with, stopped_early, Launcher, ProbeConfig, Scenario, SuiteReport};

/// Runs scenarios and reports progress
#[derive(Debug)]
pub struct ScenarioRunner {
    reporter: ProgressReporter,
    format: OutputFormat,
}

impl ScenarioRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: &CliConfig, format: OutputFormat) -> Self {
        // JSON goes to stdout; keep stderr free of decorations too.
        let quiet = config.verbosity.is_quiet() || format == OutputFormat::Json;
        let reporter = ProgressReporter::new(config.color.should_color(), quiet);
        Self { reporter, format }
    }

    /// Run `scenarios` with `launcher`, one fresh session each
    pub async fn run_with<L: Launcher>(
        &mut self,
        launcher: &L,
        probe: &ProbeConfig,
        scenarios: &[Scenario],
        fail_fast: bool,
    ) -> SuiteReport {
        self.reporter
            .header(&format!("Warning scenarios against {}", probe.source_url));
        self.reporter
            .start_progress(scenarios.len() as u64, "Running scenarios");

        let reporter = &self.reporter;
        let suite = run_suite_with(launcher, probe, scenarios, fail_fast, |report| {
            reporter.increment(1);
            reporter.scenario_result(report);
        })
        .await;

        if fail_fast && stopped_early(&suite, scenarios.len()) {
            self.reporter.info("Stopping after first failure (--fail-fast)");
        }
        self.reporter.finish();
        suite
    }

    /// Print the suite outcome and turn failures into an error
    pub fn conclude(&self, suite: &SuiteReport) -> CliResult<()> {
        if self.format == OutputFormat::Json {
            println!("{}", render_suite_json(suite)?);
        }
        self.reporter.summary(
            suite.passed(),
            suite.failed(),
            Duration::from_millis(suite.duration_ms),
        );

        if suite.all_passed() {
            Ok(())
        } else {
            Err(CliError::ScenarioFailed {
                failed: suite.failed(),
                total: suite.reports.len(),
            })
        }
    }
}

/// Run scenarios in real Chromium sessions
#[cfg(feature = "browser")]
pub fn run_in_browser(
    config: &CliConfig,
    format: OutputFormat,
    probe: &ProbeConfig,
    scenarios: &[Scenario],
    fail_fast: bool,
) -> CliResult<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create runtime: {e}")))?;

    let mut runner = ScenarioRunner::new(config, format);
    let launcher = warnprobe::ChromiumLauncher::new();
    let suite = rt.block_on(runner.run_with(&launcher, probe, scenarios, fail_fast));
    runner.conclude(&suite)
}

/// Without the `browser` feature there is nothing to drive
#[cfg(not(feature = "browser"))]
pub fn run_in_browser(
    _config: &CliConfig,
    _format: OutputFormat,
    _probe: &ProbeConfig,
    _scenarios: &[Scenario],
    _fail_fast: bool,
) -> CliResult<()> {
    Err(CliError::config(
        "browser support not compiled in. Rebuild with --features browser",
    ))
}
