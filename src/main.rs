mod error;
mod watch;

use crate::error::{ErrorKind, Result};
use booklink_config::{Config, Overrides};
use booklink_library::Context;
use booklink_library::scan::scan_source;
use booklink_library::target_path;
use clap::{ArgAction, Parser, Subcommand};
use exn::ResultExt;
use futures::StreamExt;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Mirror an author/book e-book library into a flat, series-aware layout
/// using hardlinks.
#[derive(Parser)]
#[command(name = "booklink", version, about)]
struct Cli {
    /// Configuration file (defaults to booklink.toml in the user config directory)
    #[arg(long, global = true, env = "BOOKLINK_CONFIG")]
    config: Option<PathBuf>,
    /// Root of the author/book library
    #[arg(long, global = true)]
    source: Option<PathBuf>,
    /// Root of the mirror
    #[arg(long, global = true)]
    target: Option<PathBuf>,
    /// Quiet period, in milliseconds, before a burst of changes triggers a sync
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,
    /// More logging (repeat for trace output)
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Default)]
enum Command {
    /// Sync once, then keep the mirror up to date until interrupted
    #[default]
    Watch,
    /// Sync once and exit
    Sync,
    /// Validate the configuration and exit
    Check,
    /// Print where every book would be mirrored, without touching the mirror
    Plan,
}

impl Cli {
    fn default_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "booklink=warn",
            (false, 0) => "booklink=info",
            (false, 1) => "booklink=debug",
            (false, _) => "booklink=trace",
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            source: self.source.clone(),
            target: self.target.clone(),
            debounce_ms: self.debounce_ms,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.default_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, ctx) = match setup(&cli) {
        Ok(setup) => setup,
        Err(e) => {
            tracing::error!(error = ?e, "{}", *e);
            return ExitCode::FAILURE;
        },
    };

    match cli.command.unwrap_or_default() {
        Command::Check => {
            tracing::info!(
                source = %config.source.display(),
                target = %config.target.display(),
                "Configuration is valid"
            );
            ExitCode::SUCCESS
        },
        Command::Sync => {
            let report = booklink_library::sync(&ctx).await;
            println!(
                "{} books: {} linked, {} relinked, {} confirmed, {} skipped, {} pruned, {} failed",
                report.books,
                report.linked,
                report.relinked,
                report.confirmed,
                report.skipped,
                report.pruned,
                report.failed,
            );
            for collision in &report.collisions {
                println!("collision: {collision}");
            }
            if report.failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        },
        Command::Plan => plan(&ctx).await,
        Command::Watch => match watch::run(&ctx, config.debounce()).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = ?e, "{}", *e);
                ExitCode::FAILURE
            },
        },
    }
}

fn setup(cli: &Cli) -> Result<(Config, Context)> {
    let config = Config::load(cli.config.as_deref(), &cli.overrides())
        .and_then(Config::validate)
        .or_raise(|| ErrorKind::Config)?;
    let ctx = Context::new(&config.source, &config.target).or_raise(|| ErrorKind::Config)?;
    Ok((config, ctx))
}

async fn plan(ctx: &Context) -> ExitCode {
    let mut failed = false;
    let entries = scan_source(ctx);
    futures::pin_mut!(entries);
    while let Some(entry) = entries.next().await {
        match entry {
            Ok(entry) if entry.metadata.title.is_none() => {
                println!("{}\t(skipped: no title)", entry.path.display());
            },
            Ok(entry) => println!("{}\t{}", entry.path.display(), target_path(&entry.metadata)),
            Err(e) => {
                tracing::error!(error = ?e, "{}", *e);
                failed = true;
            },
        }
    }
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
