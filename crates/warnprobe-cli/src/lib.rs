//! Warnprobe CLI library
//!
//! Command-line interface for running browser-environment warning scenarios.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ConfigFormatArg, LogFormatArg, ProbeArgs,
    ResultFormatArg, RunArgs, ScenarioArg,
};
pub use config::{load_probe_config, render_probe_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{default_directive, init_logging, LogFormat};
pub use output::{render_scenario_list, render_suite_json, OutputFormat, ProgressReporter};
pub use runner::{run_in_browser, ScenarioRunner};
