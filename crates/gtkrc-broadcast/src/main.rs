//! gtkrc-broadcast entry point.
//!
//! Opens the X display, broadcasts the configured reload signals to every
//! top-level window, and exits.
//!
//! # Usage
//!
//! ```text
//! gtkrc-broadcast [OPTIONS]
//!
//! Options:
//!   --display <NAME>    X display to connect to [default: $DISPLAY]
//!   --signal <SIGNAL>   rc-files | icon-themes; repeatable [default: rc-files]
//!   --all-screens       Broadcast on every screen, not just the default one
//!   --sync              Make X requests synchronous
//!   --dry-run           Print recipients instead of sending
//!   --config <PATH>     Configuration file [env: GTKRC_BROADCAST_CONFIG]
//! ```
//!
//! Run without arguments it sends `_GTK_READ_RCFILES` on the default screen.
//! Other arguments, such as toolkit options passed through by a launcher, are
//! ignored.
//!
//! # Exit status
//!
//! `0` once the messages are flushed.  `1` if no display session can be
//! opened or the configuration is invalid; the cause is printed on stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gtkrc_broadcast::application::broadcast_reload::{BroadcastReloadUseCase, BroadcastReport};
use gtkrc_broadcast::infrastructure::display::open_display;
use gtkrc_broadcast::infrastructure::storage::config::{load_config, BroadcastConfig};
use gtkrc_core::ReloadSignal;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Tell running GTK 2 applications to reload their resource files.
#[derive(Debug, Parser)]
#[command(
    name = "gtkrc-broadcast",
    about = "Broadcast the GTK reload-rc-files client message to every top-level window",
    version
)]
struct Cli {
    /// X display to connect to, e.g. `:0`.  Defaults to `$DISPLAY`.
    #[arg(long, value_name = "NAME")]
    display: Option<String>,

    /// Signal to broadcast.  May be given more than once.
    #[arg(long = "signal", value_name = "SIGNAL")]
    signals: Vec<ReloadSignal>,

    /// Broadcast on every screen of the display.
    #[arg(long)]
    all_screens: bool,

    /// Make X requests synchronous (debugging aid).
    #[arg(long)]
    sync: bool,

    /// Print the windows that would receive the message without sending it.
    #[arg(long)]
    dry_run: bool,

    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH", env = "GTKRC_BROADCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Toolkit arguments this program does not use; accepted and ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    toolkit_args: Vec<String>,
}

impl Cli {
    /// Overlays flags given on the command line onto the loaded config.
    fn apply_to(&self, config: &mut BroadcastConfig) {
        if let Some(name) = &self.display {
            config.display.name = Some(name.clone());
        }
        if !self.signals.is_empty() {
            config.broadcast.signals = self.signals.clone();
        }
        config.display.all_screens |= self.all_screens;
        config.display.synchronous |= self.sync;
    }
}

fn print_dry_run(report: &BroadcastReport) {
    for window in &report.recipients {
        println!("{}\t{}\t{window}", report.signal, report.signal.atom_name());
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_to(&mut config);

    // RUST_LOG wins; otherwise the configured level.  Logs go to stderr so
    // stdout stays clean for --dry-run output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.level))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if !cli.toolkit_args.is_empty() {
        debug!(args = ?cli.toolkit_args, "ignoring unrecognised arguments");
    }

    let display_options = config.display_options();
    let display = open_display(&display_options).context("cannot open X display")?;
    info!(
        display = display_options.name.as_deref().unwrap_or("$DISPLAY"),
        "display opened"
    );

    let mut use_case = BroadcastReloadUseCase::new(display, config.broadcast_options(cli.dry_run));
    let reports = use_case
        .broadcast_all(&config.broadcast.signals)
        .context("broadcast failed")?;

    if cli.dry_run {
        reports.iter().for_each(print_dry_run);
    }

    Ok(())
}
