pub(crate) mod board;
pub(crate) mod command;
pub(crate) mod config;
pub(crate) mod desk;
pub(crate) mod error;

use std::{io, path::PathBuf};

use clap::Parser;
use config::DeskConfig;
use desk::Desk;
use error::ApplicationResult;
use tracing::{Subscriber, info, level_filters::LevelFilter};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use tracing_unwrap::ResultExt;

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    #[clap(long, short)]
    /// Resets the config file (but keeps the state file and log locations)
    pub clean_config: bool,
    #[clap(long)]
    /// Config file to use instead of the one in the user config directory
    pub config: Option<PathBuf>,
    #[clap(long, short)]
    /// Number of runways for a new airport
    pub runways: Option<u32>,
    #[clap(long)]
    /// Where the airport state is saved and restored from
    pub state_file: Option<PathBuf>,
    #[clap(long)]
    /// Restore the previously saved state
    pub restore: bool,
    #[clap(long)]
    /// Do not save the state on `quit`
    pub no_autosave: bool,
}

/// Operators only see warnings on the console. The log file follows `filter`.
fn logging_subscriber<C, F>(filter: EnvFilter, console: C, file: F) -> impl Subscriber + Send + Sync
where
    C: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    F: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(console)
                .with_filter(LevelFilter::WARN),
        )
        .with(fmt::layer().with_ansi(false).with_writer(file))
}

fn init_logging(config: &DeskConfig) -> WorkerGuard {
    let log_file = tracing_appender::rolling::daily(config.log_directory(), "airport_desk.log");
    let (file_writer, guard) = tracing_appender::non_blocking(log_file);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    logging_subscriber(filter, io::stderr, file_writer).init();
    guard
}

fn main() -> ApplicationResult<()> {
    let cli = Cli::parse();
    let config = DeskConfig::load(&cli)?;
    let _guard = init_logging(&config);
    info!(config_file = ?config.config_file_path(), "starting airport desk");

    let mut desk = Desk::open(&config).unwrap_or_log();
    desk.run(io::stdin().lock(), &mut io::stdout().lock())?;
    info!("airport desk closed");
    Ok(())
}
