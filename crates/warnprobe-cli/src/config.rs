//! CLI configuration

use crate::commands::{ConfigFormatArg, ProbeArgs};
use crate::error::CliResult;
use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use warnprobe::ProbeConfig;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - library debug events
    Debug,
    /// Trace - everything
    Trace,
}

impl Verbosity {
    /// Map `-q` and the `-v` count to a level
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default `tracing` level for this verbosity
    #[must_use]
    pub const fn log_level(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Log line format
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set log format
    #[must_use]
    pub const fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }
}

/// Resolve the effective run configuration.
///
/// Flags (and their environment variables) win over the file, which wins
/// over built-in defaults.
pub fn load_probe_config(file: Option<&Path>, overrides: &ProbeArgs) -> CliResult<ProbeConfig> {
    let base = match file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration file");
            ProbeConfig::from_yaml_file(path)?
        }
        None => ProbeConfig::default(),
    };
    Ok(overrides.apply(base))
}

/// Render a configuration for display
pub fn render_probe_config(config: &ProbeConfig, format: ConfigFormatArg) -> CliResult<String> {
    let text = match format {
        ConfigFormatArg::Yaml => config.to_yaml()?,
        ConfigFormatArg::Json => {
            serde_json::to_string_pretty(config).map_err(warnprobe::ProbeError::from)?
        }
    };
    Ok(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_default_verbosity() {
            assert_eq!(Verbosity::default(), Verbosity::Normal);
        }

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
            assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Debug);
            assert_eq!(Verbosity::from_flags(false, 9), Verbosity::Trace);
        }

        #[test]
        fn test_log_levels() {
            assert_eq!(Verbosity::Normal.log_level(), "warn");
            assert_eq!(Verbosity::Verbose.log_level(), "info");
            assert_eq!(Verbosity::Trace.log_level(), "trace");
        }
    }

    mod color_choice_tests {
        use super::*;

        #[test]
        fn test_explicit_choices() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
        }
    }

    mod probe_config_tests {
        use super::*;
        use std::io::Write;

        #[test]
        fn test_defaults_without_file() {
            let config = load_probe_config(None, &ProbeArgs::default()).unwrap();
            assert_eq!(config, ProbeConfig::default());
        }

        #[test]
        fn test_flags_override_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(
                file,
                "source_url: http://10.0.0.5:8080\nwait:\n  timeout_ms: 4000"
            )
            .unwrap();

            let overrides = ProbeArgs {
                source_url: Some("http://127.0.0.1:9000".to_string()),
                ..ProbeArgs::default()
            };
            let config = load_probe_config(Some(file.path()), &overrides).unwrap();
            assert_eq!(config.source_url, "http://127.0.0.1:9000");
            assert_eq!(config.wait.timeout_ms, 4000);
        }

        #[test]
        fn test_missing_file_is_config_error() {
            let err = load_probe_config(
                Some(Path::new("/nonexistent/warnprobe.yaml")),
                &ProbeArgs::default(),
            )
            .unwrap_err();
            assert!(err.to_string().contains("Invalid configuration"));
        }

        #[test]
        fn test_render_formats() {
            let config = ProbeConfig::default();
            let yaml = render_probe_config(&config, ConfigFormatArg::Yaml).unwrap();
            assert!(yaml.contains("source_url: http://127.0.0.1:8080"));
            let json = render_probe_config(&config, ConfigFormatArg::Json).unwrap();
            assert!(json.contains("\"source_url\": \"http://127.0.0.1:8080\""));
        }
    }
}
