//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use warnprobe::{ProbeConfig, Scenario};

/// Warnprobe: check that a source interface warns visitors about risky browsers
#[derive(Parser, Debug)]
#[command(name = "warnprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// YAML configuration file
    #[arg(short, long, env = "WARNPROBE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run warning scenarios against the source interface
    Run(RunArgs),

    /// List available scenarios
    List,

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Overrides applied on top of the configuration file
#[derive(Args, Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProbeArgs {
    /// Base URL of the source interface
    #[arg(long, env = "WARNPROBE_SOURCE_URL")]
    pub source_url: Option<String>,

    /// How long to wait for a dismissed banner to disappear, in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path to the chromium binary
    #[arg(long, env = "WARNPROBE_CHROMIUM_PATH")]
    pub chromium_path: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Disable the chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Fixed profile directory; must be empty or left by an earlier run
    #[arg(long)]
    pub profile_dir: Option<PathBuf>,

    /// Route every session through the Tor SOCKS proxy
    #[arg(long)]
    pub force_proxy: bool,
}

impl ProbeArgs {
    /// Apply the overrides that were given
    #[must_use]
    pub fn apply(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(url) = &self.source_url {
            config.source_url.clone_from(url);
        }
        if let Some(ms) = self.timeout {
            // A short timeout also shortens the poll interval.
            let poll = config.wait.poll_interval_ms.min(ms);
            config.wait = config.wait.with_timeout(ms).with_poll_interval(poll);
        }
        if let Some(path) = &self.chromium_path {
            config.browser.chromium_path = Some(path.clone());
        }
        if self.headful {
            config.browser.headless = false;
        }
        if self.no_sandbox {
            config.browser.sandbox = false;
        }
        if let Some(dir) = &self.profile_dir {
            config.profile_dir = Some(dir.clone());
        }
        if self.force_proxy {
            config.force_proxy = true;
        }
        config
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration overrides
    #[command(flatten)]
    pub probe: ProbeArgs,

    /// Scenario to run (repeatable; all when omitted)
    #[arg(short, long = "scenario", value_name = "SCENARIO")]
    pub scenarios: Vec<ScenarioArg>,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Result format
    #[arg(short, long, default_value = "text")]
    pub format: ResultFormatArg,
}

impl RunArgs {
    /// Scenarios selected on the command line, in the order given
    #[must_use]
    pub fn selected(&self) -> Vec<Scenario> {
        if self.scenarios.is_empty() {
            return Scenario::ALL.to_vec();
        }
        let mut selected: Vec<Scenario> = Vec::new();
        for arg in &self.scenarios {
            let scenario = Scenario::from(*arg);
            if !selected.contains(&scenario) {
                selected.push(scenario);
            }
        }
        selected
    }
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration overrides
    #[command(flatten)]
    pub probe: ProbeArgs,

    /// Only validate the configuration
    #[arg(long)]
    pub check: bool,

    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormatArg,
}

/// Scenario names accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioArg {
    /// Desktop browser sees the Tor Browser recommendation
    TorBrowser,
    /// Orbot sees the desktop Tor Browser recommendation
    Orbot,
    /// Tor Browser at the Standard level sees the security level warning
    SecurityLevel,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::TorBrowser => Self::TorBrowser,
            ScenarioArg::Orbot => Self::Orbot,
            ScenarioArg::SecurityLevel => Self::SecurityLevel,
        }
    }
}

/// Result format for `run`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultFormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON suite report on stdout
    Json,
}

impl From<ResultFormatArg> for crate::output::OutputFormat {
    fn from(arg: ResultFormatArg) -> Self {
        match arg {
            ResultFormatArg::Text => Self::Text,
            ResultFormatArg::Json => Self::Json,
        }
    }
}

/// Output format for `config`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigFormatArg {
    /// YAML
    #[default]
    Yaml,
    /// JSON
    Json,
}

/// Color output argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for crate::logging::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
