use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ledger program that owns the record-holding accounts.
pub const DEFAULT_PROGRAM_ID: &str = "msmithregv1111111111111111111111111111111111";

/// Designated payment address for the per-item upload fee.
pub const DEFAULT_FEE_ADDRESS: &str = "msmithfees1111111111111111111111111111111111";

/// Fixed per-item upload fee.
pub const FEE_LAMPORTS: u64 = 500_000;

pub const DEFAULT_RPC_URL: &str = "https://rpc.devnet.mintsmith.dev";
pub const DEFAULT_STORAGE_GATEWAY: &str = "https://uploads.mintsmith.dev/upload";
pub const DEFAULT_STORAGE_HOST: &str = "arweave.net";
pub const DEFAULT_CACHE_PATH: &str = ".cache/mintsmith.json";

/// Resolved run configuration. The CLI layer is built on top of this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ledger RPC endpoint.
    pub rpc_url: String,

    /// Path to the payer keypair file (64-byte JSON array).
    pub keypair_path: PathBuf,

    /// Path of the JSON cache document.
    pub cache_path: PathBuf,

    /// Directory holding the `<index>.png` / `<index>.json` pairs.
    pub assets_dir: PathBuf,

    /// Deployment-environment tag forwarded to the storage gateway.
    pub env_tag: String,

    /// Upload endpoint of the storage gateway.
    pub storage_gateway: String,

    /// Host under which uploaded objects become addressable.
    pub storage_host: String,

    /// Address of the ledger program owning the record account.
    pub program_id: String,

    /// Recipient of the per-item upload fee.
    pub fee_address: String,

    /// Per-item upload fee in lamports.
    pub fee_lamports: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            keypair_path: PathBuf::from("id.json"),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            assets_dir: PathBuf::from("assets"),
            env_tag: "devnet".to_string(),
            storage_gateway: DEFAULT_STORAGE_GATEWAY.to_string(),
            storage_host: DEFAULT_STORAGE_HOST.to_string(),
            program_id: DEFAULT_PROGRAM_ID.to_string(),
            fee_address: DEFAULT_FEE_ADDRESS.to_string(),
            fee_lamports: FEE_LAMPORTS,
        }
    }
}
