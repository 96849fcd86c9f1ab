//! Warnprobe CLI: browser-environment warning checks
//!
//! ## Usage
//!
//! ```bash
//! warnprobe list                                   # Show scenarios
//! warnprobe run                                    # Run all scenarios
//! warnprobe run -s orbot --source-url http://x.onion
//! warnprobe config --check -c warnprobe.yaml       # Validate a config file
//! ```

use clap::Parser;
use std::process::ExitCode;
use warnprobe_cli::{
    init_logging, load_probe_config, render_probe_config, render_scenario_list, run_in_browser,
    Cli, CliConfig, CliResult, ColorChoice, Commands, ConfigArgs, LogFormat, RunArgs, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    init_logging(config.verbosity, config.log_format)?;

    match &cli.command {
        Commands::Run(args) => run_scenarios(&config, &cli, args),
        Commands::List => {
            print!("{}", render_scenario_list());
            Ok(())
        }
        Commands::Config(args) => run_config(&cli, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    let log_format: LogFormat = cli.log_format.into();

    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_format(log_format)
}

fn run_scenarios(config: &CliConfig, cli: &Cli, args: &RunArgs) -> CliResult<()> {
    let probe = load_probe_config(cli.config.as_deref(), &args.probe)?;
    probe.validate()?;

    let scenarios = args.selected();
    tracing::info!(
        source_url = %probe.source_url,
        scenarios = scenarios.len(),
        "starting run"
    );
    run_in_browser(config, args.format.into(), &probe, &scenarios, args.fail_fast)
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> CliResult<()> {
    let probe = load_probe_config(cli.config.as_deref(), &args.probe)?;

    if args.check {
        probe.validate()?;
        println!("Configuration OK");
        return Ok(());
    }

    println!("{}", render_probe_config(&probe, args.format)?.trim_end());
    Ok(())
}
