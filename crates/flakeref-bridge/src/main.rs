//! `flakeref-resolve`: print the canonical form of flake references
//!
//! ```text
//! $ flakeref-resolve github:NixOS/nixpkgs nixpkgs/nixos-24.05 '.#hello'
//! github:NixOS/nixpkgs
//! flake:nixpkgs/nixos-24.05
//! path:/home/me/project#hello
//! ```

use clap::Parser;
use flakeref_bridge::FlakeRefBridge;
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Parse flake references and print their canonical form
#[derive(Parser, Debug)]
#[command(name = "flakeref-resolve", version, about)]
struct Cli {
    /// Flake references to resolve, optionally with a `#fragment`
    #[arg(required = true, value_name = "URL")]
    references: Vec<String>,

    /// Resolve relative references against this directory instead of the working directory
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Log level when `RUST_LOG` is not set
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level options for the CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum LogLevel {
    /// Show all logs (trace level)
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above
    Info,
    /// Show warnings and above (default)
    Warn,
    /// Show errors only
    Error,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn init_tracing(level: LogLevel) -> Result<()> {
    let level = level.as_str();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("flakeref={level},flakeref_bridge={level}")))
        .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| miette::miette!("Failed to initialize tracing: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level)?;

    let mut builder = FlakeRefBridge::builder();
    if let Some(dir) = cli.base_dir {
        builder = builder.base_directory(dir);
    }
    let bridge = builder.build();

    let mut stdout = io::stdout().lock();
    for reference in &cli.references {
        let (handle, fragment) = bridge.parse_flake_reference_with_fragment(reference)?;
        let rendered = bridge.flake_reference_to_string(handle)?;
        writeln!(stdout, "{}", output_line(&rendered, fragment.as_deref())).into_diagnostic()?;
    }

    Ok(())
}

/// Join a rendered reference and its fragment, re-encoding the fragment
fn output_line(rendered: &str, fragment: Option<&str>) -> String {
    match fragment {
        Some(fragment) => format!("{rendered}#{}", flakeref::encode_fragment(fragment)),
        None => rendered.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_line_reencodes_fragment() {
        assert_eq!(
            output_line("path:/work", Some("my app")),
            "path:/work#my%20app"
        );
        assert_eq!(
            output_line("flake:nixpkgs", Some("packages.x86_64-linux.hello")),
            "flake:nixpkgs#packages.x86_64-linux.hello"
        );
        assert_eq!(output_line("flake:nixpkgs", None), "flake:nixpkgs");
    }
}
