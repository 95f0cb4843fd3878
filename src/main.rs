use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use mintsmith::config::{self, RunConfig};
use mintsmith::pipeline::Pipeline;
use mintsmith::telemetry;

#[derive(Parser)]
#[command(
    name = "mintsmith",
    version,
    about = "Uploads paired asset files and registers them on a ledger program"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct CommonArgs {
    /// Ledger RPC endpoint.
    #[arg(long, default_value = config::DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Payer keypair file (64-byte JSON array).
    #[arg(long, default_value = "id.json")]
    keypair: PathBuf,

    /// Cache file path.
    #[arg(long, default_value = config::DEFAULT_CACHE_PATH)]
    cache: PathBuf,

    /// Deployment-environment tag forwarded to the storage gateway.
    #[arg(long, default_value = "devnet")]
    env: String,

    /// Storage gateway upload endpoint.
    #[arg(long, default_value = config::DEFAULT_STORAGE_GATEWAY)]
    storage_url: String,
}

#[derive(Subcommand)]
enum Command {
    /// Upload all items, then register them on the ledger in batches.
    Upload {
        /// Directory of `<index>.png` / `<index>.json` pairs.
        #[arg(long, default_value = "assets")]
        assets_dir: PathBuf,
    },

    /// Run only the one-time ledger account registration.
    CreateAccount {
        #[arg(long, default_value = "assets")]
        assets_dir: PathBuf,
    },

    /// Move the public start date of an existing registration.
    UpdateStartDate {
        /// Unix timestamp in seconds.
        #[arg(long)]
        start_ts: i64,
    },

    /// Claim a single registered item for the payer.
    MintOne,

    /// Reconcile the local cache against the ledger account bytes.
    Verify,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let assets_dir = match &self.command {
            Command::Upload { assets_dir } | Command::CreateAccount { assets_dir } => {
                assets_dir.clone()
            }
            _ => PathBuf::from("assets"),
        };
        RunConfig {
            rpc_url: self.common.rpc_url.clone(),
            keypair_path: self.common.keypair.clone(),
            cache_path: self.common.cache.clone(),
            assets_dir,
            env_tag: self.common.env.clone(),
            storage_gateway: self.common.storage_url.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    // Setup failures (missing keypair, unreadable cache) abort here with a
    // non-zero exit; per-item failures below are reported, not fatal.
    let pipeline = Pipeline::initialize(cli.run_config())?;

    match cli.command {
        Command::Upload { .. } => {
            let upload = pipeline.run_upload().await?;
            let register = pipeline.run_register().await?;
            info!(
                "done: {} uploaded / {} skipped / {} failed; {} batches written, {} batches failed",
                upload.uploaded,
                upload.skipped,
                upload.failed,
                register.batches_submitted,
                register.batches_failed
            );
        }
        Command::CreateAccount { .. } => {
            pipeline.run_create_account().await?;
        }
        Command::UpdateStartDate { start_ts } => {
            pipeline.update_start_date(start_ts).await?;
        }
        Command::MintOne => {
            pipeline.mint_one().await?;
        }
        Command::Verify => {
            let summary = pipeline.run_verify().await?;
            info!(
                "done: {} checked, {} cleared for re-registration",
                summary.checked, summary.mismatched
            );
        }
    }

    Ok(())
}
