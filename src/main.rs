mod config;
mod crypto;
mod da;
mod error;
mod namespace;
mod submitter;
mod types;
mod utils;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::da::celestia::CelestiaClient;
use crate::da::{connect_until, explorer_url};
use crate::error::Error;
use crate::namespace::normalize;
use crate::submitter::{run_submissions, RunPlan};
use crate::types::{RunSummary, SubmitOptions};

/// Submit test blobs to a Celestia namespace and read each one back.
#[derive(Parser, Debug)]
#[command(name = "blobcell", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(long, short = 'c', env = "BLOBCELL_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Number of blobs to submit, overriding submission.blob_count.
    #[arg(long, short = 'n')]
    count: Option<u32>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(summary) => {
            if cli.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!("Failed to encode summary: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<RunSummary, Error> {
    let config = Config::load(&cli.config)?;
    config.validate()?;

    // bounds client setup as well as the submissions
    let deadline = Instant::now() + config.submission.timeout();

    let credential = crypto::resolve_credential(&config)?;

    let spec = config.submission.namespace_policy.spec();
    let namespace = normalize(
        config.namespace()?,
        spec,
        config.submission.namespace_decoding,
    );
    namespace.validate_v0()?;
    info!(%namespace, id_len = namespace.id().len(), policy = ?config.submission.namespace_policy, "📛 Namespace ready");

    let options = SubmitOptions {
        fee_granter: config.feegranter().map(String::from),
        gas_price: config.celestia.gas_price,
        gas_limit: config.celestia.gas_limit,
    };
    if let Some(granter) = &options.fee_granter {
        info!("Using feegranter: {granter}");
    }

    let client = connect_until(
        deadline,
        CelestiaClient::connect(&config, &credential, &options),
    )
    .await?;

    let blob_count = cli.count.unwrap_or(config.submission.blob_count);
    let plan = RunPlan::with_deadline(blob_count, config.submission.interval(), deadline);

    // per-blob progress and warnings are already logged by the submit loop
    let summary = run_submissions(&client, &namespace, &options, &plan, |_, _| {}).await?;

    let network = config.network()?;
    if let Some(url) = explorer_url(network) {
        info!("View your blobs on {url}");
    }
    Ok(summary)
}
