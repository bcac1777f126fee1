use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use libremap_maintenance::{CouchClient, CouchesFile, MaintenanceError, RunSummary, runner};

/// Run maintenance jobs for LibreMap.
#[derive(Parser, Debug)]
#[command(version, about = "Run maintenance jobs for LibreMap", long_about = None)]
struct Args {
    /// Couch config JSON file
    #[arg(long, value_name = "FILE", default_value = "couch.json")]
    couchesfile: PathBuf,

    /// Key for couch to use (e.g., production)
    #[arg(long, value_name = "ID")]
    couch: String,

    /// Maximum age of a router document's mtime in days
    #[arg(long, value_name = "DAYS", default_value_t = 7)]
    days: u32,
}

/// Console logging with environment-based filtering (`RUST_LOG`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

async fn run(args: &Args) -> Result<RunSummary, MaintenanceError> {
    let couches = CouchesFile::from_file(&args.couchesfile)?;
    let couch = couches.couch(&args.couch)?;
    let client = CouchClient::new(couch)?;

    Ok(runner::run(&client, i64::from(args.days)).await?)
}

// The run is strictly sequential; a current-thread runtime is all the two
// blocking network calls need.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let args = Args::parse();

    match run(&args).await {
        Ok(summary) => {
            // The summary line is the program's output contract, not a log.
            println!("{summary}");
        }
        Err(e) => {
            tracing::error!(error = %e, "Maintenance run failed");
            std::process::exit(1);
        }
    }
}
