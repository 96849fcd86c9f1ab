//! Warning scenarios: provision → navigate → assert → dismiss.

use crate::config::ProbeConfig;
use crate::driver::{Launcher, WebDriver};
use crate::identity::UserAgentProfile;
use crate::navigator::SourceNavigator;
use crate::result::{ProbeError, ProbeResult};
use crate::session::{Session, SessionConfig};
use crate::wait::Waiter;
use crate::warning::{assert_warning_shown, dismiss_warning, WarningBanner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// One end-to-end warning check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// A regular desktop browser sees the Tor Browser recommendation
    TorBrowser,
    /// An Orbot user agent sees the desktop Tor Browser recommendation
    Orbot,
    /// Tor Browser at the Standard level sees the security level warning
    SecurityLevel,
}

impl Scenario {
    /// All scenarios in execution order
    pub const ALL: [Self; 3] = [Self::TorBrowser, Self::Orbot, Self::SecurityLevel];

    /// Stable name used on the command line and in reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TorBrowser => "tor-browser",
            Self::Orbot => "orbot",
            Self::SecurityLevel => "security-level",
        }
    }

    /// Browser identity the scenario runs with
    #[must_use]
    pub fn identity(self) -> UserAgentProfile {
        match self {
            Self::TorBrowser => UserAgentProfile::Desktop,
            Self::Orbot => UserAgentProfile::Orbot,
            Self::SecurityLevel => UserAgentProfile::TorBrowser,
        }
    }

    /// Banner the scenario expects
    #[must_use]
    pub const fn banner(self) -> WarningBanner {
        match self {
            Self::TorBrowser => WarningBanner::TorBrowser,
            Self::Orbot => WarningBanner::Orbot,
            Self::SecurityLevel => WarningBanner::SecurityLevel,
        }
    }

    /// Whether the scenario also dismisses the banner
    #[must_use]
    pub const fn dismisses(self) -> bool {
        self.banner().close_id().is_some()
    }

    /// One-line description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::TorBrowser => "warning appears if Tor Browser is not in use",
            Self::Orbot => "warning appears if Orbot is used",
            Self::SecurityLevel => "warning appears if the security level is too low",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Scenario {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| ProbeError::config(format!("unknown scenario '{s}'")))
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario that ran
    pub scenario: Scenario,
    /// Whether every step passed
    pub passed: bool,
    /// Failure message
    pub error: Option<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// User agent the session was provisioned with
    pub user_agent: String,
    /// Completed steps, in order
    pub steps: Vec<String>,
}

/// Outcome of a set of scenarios
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Individual reports
    pub reports: Vec<ScenarioReport>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Number of passed scenarios
    #[must_use]
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.passed).count()
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| !r.passed).count()
    }

    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(|r| r.passed)
    }

    /// Failed reports
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.reports.iter().filter(|r| !r.passed).collect()
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

async fn run_steps<D: WebDriver>(
    session: &mut Session<D>,
    scenario: Scenario,
    config: &ProbeConfig,
    steps: &mut Vec<String>,
) -> ProbeResult<()> {
    let waiter = Waiter::with_options(config.wait);
    let banner = scenario.banner();

    let mut navigator = SourceNavigator::new(&config.source_url, session.driver_mut());
    navigator.visit_homepage().await?;
    steps.push("visit homepage".to_string());

    let driver = session.driver();
    let _ = assert_warning_shown(driver, banner).await?;
    steps.push(format!("{} shown", banner.element_id()));

    if scenario.dismisses() {
        let _ = dismiss_warning(driver, banner, &waiter).await?;
        steps.push(format!("{} dismissed", banner.element_id()));
    }
    Ok(())
}

/// Run one scenario in its own session and report the outcome.
///
/// Failures are captured in the report; the session is always torn down.
pub async fn run_scenario<L: Launcher>(
    launcher: &L,
    config: &ProbeConfig,
    scenario: Scenario,
) -> ScenarioReport {
    let start = Instant::now();
    let session_config = SessionConfig::for_target(scenario.identity(), config);
    let user_agent = session_config.user_agent().to_string();
    let mut steps = Vec::new();

    tracing::info!(%scenario, "running scenario");
    let outcome = match Session::launch(launcher, session_config).await {
        Ok(mut session) => {
            steps.push("provision session".to_string());
            let result = run_steps(&mut session, scenario, config, &mut steps).await;
            session.finish(result).await
        }
        Err(e) => Err(e),
    };

    let error = outcome.err().map(|e| e.to_string());
    if let Some(message) = &error {
        tracing::warn!(%scenario, error = %message, "scenario failed");
    }
    ScenarioReport {
        scenario,
        passed: error.is_none(),
        error,
        duration_ms: millis(start.elapsed()),
        user_agent,
        steps,
    }
}

/// Run `scenarios` in order, each in a fresh session.
///
/// With `fail_fast`, stops after the first failure.
pub async fn run_suite<L: Launcher>(
    launcher: &L,
    config: &ProbeConfig,
    scenarios: &[Scenario],
    fail_fast: bool,
) -> SuiteReport {
    run_suite_with(launcher, config, scenarios, fail_fast, |_| {}).await
}

/// Like [`run_suite`], calling `on_report` as each scenario finishes
pub async fn run_suite_with<L, F>(
    launcher: &L,
    config: &ProbeConfig,
    scenarios: &[Scenario],
    fail_fast: bool,
    mut on_report: F,
) -> SuiteReport
where
    L: Launcher,
    F: FnMut(&ScenarioReport),
{
    let start = Instant::now();
    let mut suite = SuiteReport::default();
    for &scenario in scenarios {
        let report = run_scenario(launcher, config, scenario).await;
        on_report(&report);
        let failed = !report.passed;
        suite.reports.push(report);
        if failed && fail_fast {
            tracing::info!(%scenario, "stopping after first failure");
            break;
        }
    }
    suite.duration_ms = millis(start.elapsed());
    suite
}

/// Whether `suite` ended early because of `fail_fast`
#[must_use]
pub fn stopped_early(suite: &SuiteReport, requested: usize) -> bool {
    suite.reports.len() < requested
}

#[cfg(test)]
mod tests {
    use super::*;

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_from_str_round_trip() {
            for scenario in Scenario::ALL {
                assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
            }
            assert!("desktop".parse::<Scenario>().is_err());
        }

        #[test]
        fn test_identities() {
            assert_eq!(Scenario::TorBrowser.identity(), UserAgentProfile::Desktop);
            assert_eq!(Scenario::Orbot.identity(), UserAgentProfile::Orbot);
            assert_eq!(
                Scenario::SecurityLevel.identity(),
                UserAgentProfile::TorBrowser
            );
        }

        #[test]
        fn test_dismisses() {
            assert!(Scenario::TorBrowser.dismisses());
            assert!(Scenario::Orbot.dismisses());
            assert!(!Scenario::SecurityLevel.dismisses());
        }
    }

    mod suite_report_tests {
        use super::*;

        fn report(scenario: Scenario, passed: bool) -> ScenarioReport {
            ScenarioReport {
                scenario,
                passed,
                error: (!passed).then(|| "boom".to_string()),
                duration_ms: 1,
                user_agent: String::new(),
                steps: vec![],
            }
        }

        #[test]
        fn test_counts() {
            let suite = SuiteReport {
                reports: vec![
                    report(Scenario::TorBrowser, true),
                    report(Scenario::Orbot, false),
                ],
                duration_ms: 2,
            };
            assert_eq!(suite.passed(), 1);
            assert_eq!(suite.failed(), 1);
            assert!(!suite.all_passed());
            assert_eq!(suite.failures()[0].scenario, Scenario::Orbot);
        }

        #[test]
        fn test_empty_suite_passes() {
            assert!(SuiteReport::default().all_passed());
        }

        #[test]
        fn test_json_shape() {
            let json = serde_json::to_value(report(Scenario::SecurityLevel, true)).unwrap();
            assert_eq!(json["scenario"], "security-level");
            assert_eq!(json["passed"], true);
            assert!(json["error"].is_null());
        }

        #[test]
        fn test_stopped_early() {
            let suite = SuiteReport {
                reports: vec![report(Scenario::TorBrowser, false)],
                duration_ms: 1,
            };
            assert!(stopped_early(&suite, 3));
            assert!(!stopped_early(&suite, 1));
        }
    }

    mod run_tests {
        use super::*;
        use crate::driver::{MockElement, MockLauncher};

        const URL: &str = "http://127.0.0.1:8080";

        fn config() -> ProbeConfig {
            ProbeConfig::new()
                .with_source_url(URL)
                .with_wait(crate::wait::WaitOptions::new().with_timeout(30).with_poll_interval(5))
        }

        #[tokio::test]
        async fn test_missing_banner_quits_and_removes_profile() {
            let launcher = MockLauncher::new(format!("{URL}/"), |_| Vec::new());
            let report = run_scenario(&launcher, &config(), Scenario::Orbot).await;
            assert!(!report.passed);
            assert_eq!(launcher.quits(), 1);
            assert!(!launcher.launches()[0].profile.exists());
        }

        #[tokio::test]
        async fn test_callback_sees_every_report() {
            let launcher = MockLauncher::new(format!("{URL}/"), |_| {
                vec![MockElement::new("browser-tb", "It is recommended to use Tor Browser").hidden()]
            });
            let mut seen = Vec::new();
            let suite = run_suite_with(&launcher, &config(), &Scenario::ALL, false, |r| {
                seen.push(r.scenario);
            })
            .await;
            assert_eq!(seen, Scenario::ALL.to_vec());
            assert_eq!(suite.reports.len(), 3);
            assert_eq!(launcher.quits(), 3);
        }

        #[tokio::test]
        async fn test_callback_stops_with_fail_fast() {
            let launcher = MockLauncher::new(format!("{URL}/"), |_| Vec::new());
            let mut calls = 0;
            let suite = run_suite_with(&launcher, &config(), &Scenario::ALL, true, |_| calls += 1).await;
            assert_eq!(calls, 1);
            assert!(stopped_early(&suite, Scenario::ALL.len()));
        }
    }
}
