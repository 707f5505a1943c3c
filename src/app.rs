use std::future::Future;
use std::io::Write;

use crate::config::{Config, ConfigError};
use crate::error::{AppError, AppResult};
use crate::store::KeyStore;
use crate::sweep::{StateSelection, SweepOptions, SweepReport, Sweeper};

/// What the command line asked for
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub clean_failed: bool,
    pub clean_active: bool,
    pub clean_queued: bool,
    pub dry_run: bool,
    /// Overrides the configured scan batch size
    pub scan_count: Option<usize>,
    /// Print the final report as JSON
    pub json: bool,
}

/// Closing line printed after a sweep
pub fn final_line(dry_run: bool) -> &'static str {
    if dry_run {
        "[✓] Done. (dry-run)"
    } else {
        "[✓] Completed."
    }
}

/// Select states, load config, connect, sweep, and write the report to `out`.
///
/// The state selection is validated before the config is loaded or the store
/// is touched.
pub async fn run<S, L, C, Fut, W>(
    args: &RunArgs,
    load_config: L,
    connect: C,
    out: &mut W,
) -> AppResult<SweepReport>
where
    S: KeyStore,
    L: FnOnce() -> Result<Config, ConfigError>,
    C: FnOnce(Config) -> Fut,
    Fut: Future<Output = AppResult<S>>,
    W: Write,
{
    let selection =
        StateSelection::from_flags(args.clean_failed, args.clean_active, args.clean_queued)?;

    let mut config = load_config()?;
    if let Some(scan_count) = args.scan_count {
        config.scan_count = scan_count;
    }
    let options = SweepOptions {
        dry_run: args.dry_run,
        scan_count: config.scan_count,
    };
    let redacted_url = config.redacted_url();

    let store = connect(config).await.map_err(|e| match e {
        AppError::Store(msg) => {
            AppError::Store(format!("Failed to connect to {}: {}", redacted_url, msg))
        }
        other => other,
    })?;
    writeln!(out, "[i] Connected to Redis: {}", redacted_url)?;
    tracing::info!(
        states = ?selection.states().collect::<Vec<_>>(),
        dry_run = args.dry_run,
        "Starting sweep"
    );

    let mut write_error = None;
    let report = Sweeper::new(&store, options)
        .run(&selection, |c| {
            if let Err(e) = writeln!(out, "[{}] {} jobs", c.key, c.jobs) {
                write_error.get_or_insert(e);
            }
        })
        .await?;
    if let Some(e) = write_error {
        return Err(e.into());
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report).map_err(std::io::Error::from)?;
        writeln!(out)?;
    }
    writeln!(out, "\n{}", final_line(report.dry_run))?;

    Ok(report)
}
