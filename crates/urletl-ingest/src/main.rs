//! urletl - fetch, normalize and store tracked URL records

use anyhow::Result;
use std::process;
use tracing::{error, info};
use urletl_common::logging::{init_logging, LogConfig};
use urletl_ingest::{pipeline, PipelineConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Loaded once here; logging and pipeline settings both read the environment
    dotenvy::dotenv().ok();

    let guard = match LogConfig::from_env().and_then(|config| init_logging(&config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {e:#}");
            process::exit(1);
        },
    };

    let result = run().await;
    if let Err(ref e) = result {
        error!(error = %e, "Pipeline failed");
    }

    // Flush file logs before exiting
    drop(guard);

    if result.is_err() {
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = PipelineConfig::from_env();
    let summary = pipeline::run(&config).await?;

    info!(
        audit_file = %summary.audit_file.display(),
        extracted = summary.extracted,
        inserted = summary.inserted,
        "Pipeline complete"
    );
    Ok(())
}
