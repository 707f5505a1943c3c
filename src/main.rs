use clap::Parser;

use queue_janitor::app::{self, RunArgs};
use queue_janitor::config::Config;
use queue_janitor::store::RedisStore;
use queue_janitor::AppError;

/// Purge stuck or orphaned jobs from a Redis-backed job queue
#[derive(Parser)]
#[command(name = "queue-janitor", version, about)]
struct Cli {
    /// Clean jobs in `*:failed` containers
    #[arg(long)]
    clean_failed: bool,

    /// Clean jobs in `*:active` containers
    #[arg(long)]
    clean_active: bool,

    /// Clean jobs in waiting/wait/paused/delayed containers
    #[arg(long)]
    clean_queued: bool,

    /// Report what would be purged without touching the store
    #[arg(long)]
    dry_run: bool,

    /// Keys requested per SCAN round (overrides JANITOR_SCAN_COUNT)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    scan_count: Option<u64>,

    /// Print the final sweep report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        let code = e.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let args = RunArgs {
        clean_failed: cli.clean_failed,
        clean_active: cli.clean_active,
        clean_queued: cli.clean_queued,
        dry_run: cli.dry_run,
        scan_count: cli.scan_count.map(usize::try_from).transpose()?,
        json: cli.json,
    };

    app::run(
        &args,
        Config::from_env,
        |config| async move { RedisStore::connect(&config.redis_url).await },
        &mut std::io::stdout(),
    )
    .await?;

    Ok(())
}
