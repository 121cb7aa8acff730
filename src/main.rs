//! xwrap - Wrap the mouse pointer around the screen
//!
//! Covers the screen with an invisible overlay that only reacts along its
//! outermost pixels, and warps the pointer to the opposite edge whenever it
//! touches one.

mod config;
mod display;
mod overlay;
mod screen;
mod session;
mod shutdown;
mod wrap;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nix::unistd::{fork, ForkResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use display::X11Backend;
use session::Session;
use shutdown::Signals;

/// xwrap - Wrap the mouse pointer around screen edges
#[derive(Parser, Debug)]
#[command(name = "xwrap")]
#[command(author = "xwrap Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Wrap the mouse pointer around screen edges", long_about = None)]
struct Cli {
    /// Fork and run in the background
    #[arg(short, long)]
    fork: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// X display to connect to (default: $DISPLAY)
    #[arg(short, long)]
    display: Option<String>,

    /// Draw the overlay frame so it can be seen
    #[arg(long)]
    visible: bool,

    /// Print a sample configuration and exit
    #[arg(long)]
    generate_config: bool,

    /// Write the generated configuration here instead of printing it
    #[arg(short, long, requires = "generate_config")]
    output: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    fn apply(&self, config: &mut Config) {
        if self.verbose {
            config.general.verbose = true;
        }
        if let Some(display) = &self.display {
            config.display.name = Some(display.clone());
        }
        if self.visible {
            config.overlay.visible = true;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        if let Some(path) = &cli.output {
            config::sample_config().save(path)?;
            println!("Configuration written to: {}", path.display());
        } else {
            println!("{}", config::generate_sample_config()?);
        }
        return Ok(());
    }

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default()?
    };
    cli.apply(&mut config);

    // Initialize logging
    let level = if config.general.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let backend = X11Backend::connect(config.display.name.as_deref())
        .context("Failed to connect to X server")?;

    // Signals that arrive before the handlers exist stay pending instead of
    // killing the process with the overlay still mapped.
    shutdown::block().context("Failed to block shutdown signals")?;

    let mut session = Session::start(
        backend,
        &config.overlay_config(),
        config.edge_detector_config(),
    )
    .context("Failed to set up overlay window")?;

    if cli.fork {
        detach()?;
    }

    // The runtime is created after forking; a single thread is all we need.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let signal = runtime.block_on(async {
        let mut signals = Signals::register().context("Failed to install signal handlers")?;
        session
            .run(signals.recv())
            .await
            .context("Lost connection to X server")
    })?;

    tracing::info!("Received {}, shutting down", signal);
    Ok(())
}

/// Continue in a child process; the parent exits immediately.
fn detach() -> anyhow::Result<()> {
    // SAFETY: no other threads have been started yet.
    match unsafe { fork() }.context("Failed to fork")? {
        ForkResult::Parent { child } => {
            tracing::info!("Running in background as pid {}", child);
            // Skip destructors: the child shares the overlay and the connection.
            std::process::exit(0);
        }
        ForkResult::Child => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["xwrap", "-f"]).unwrap();
        assert!(cli.fork);
        assert!(!cli.verbose);

        let cli = Cli::try_parse_from(["xwrap"]).unwrap();
        assert!(!cli.fork);
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["xwrap", "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["xwrap", "-x"]).is_err());
    }

    #[test]
    fn test_generate_config_output() {
        let cli =
            Cli::try_parse_from(["xwrap", "--generate-config", "-o", "/tmp/xwrap.toml"]).unwrap();
        assert!(cli.generate_config);
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/xwrap.toml")));

        // An output path only makes sense when generating
        assert!(Cli::try_parse_from(["xwrap", "-o", "/tmp/xwrap.toml"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from(["xwrap", "-v", "--visible", "-d", ":1"]).unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);

        assert!(config.general.verbose);
        assert!(config.overlay.visible);
        assert_eq!(config.display.name.as_deref(), Some(":1"));
    }
}
