use clap::Parser;
use taskdeck::cli::commands::Cli;
use taskdeck::cli::handlers;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// stderr logging; `RUST_LOG` wins over `-v` when set.
fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .without_time()
        .with_filter(filter);

    tracing_subscriber::registry().with(layer).init();
}
