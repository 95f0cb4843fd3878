//! Pipeline struct and initialization - no per-item business logic.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::asset_store::AssetStoreVariant;
use crate::cache::CacheStore;
use crate::config::RunConfig;
use crate::ledger::{ConfirmLevel, Instruction, LedgerVariant, TxId};
use crate::submitter;
use crate::wallet::Wallet;

/// Outcome of an upload pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome of a batch-registration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSummary {
    pub batches_submitted: usize,
    pub batches_skipped: usize,
    pub batches_deferred: usize,
    pub batches_failed: usize,
    pub items_marked: usize,
}

impl RegisterSummary {
    pub fn merge(&mut self, other: RegisterSummary) {
        self.batches_submitted += other.batches_submitted;
        self.batches_skipped += other.batches_skipped;
        self.batches_deferred += other.batches_deferred;
        self.batches_failed += other.batches_failed;
        self.items_marked += other.items_marked;
    }
}

/// Outcome of a verification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifySummary {
    pub checked: usize,
    pub mismatched: usize,
}

/// Main application orchestrator: owns the cache and the external
/// boundaries, and drives the upload / register / verify passes.
pub struct Pipeline {
    /// Global/base configuration.
    pub config: RunConfig,

    /// Fee payer and transaction signer.
    pub wallet: Arc<Wallet>,

    /// Ledger implementation.
    pub ledger: Arc<LedgerVariant>,

    /// Asset store implementation.
    pub assets: Arc<AssetStoreVariant>,

    /// Durable progress cache. Concurrent macro-group tasks serialize
    /// their load-modify-save cycles behind this mutex.
    pub cache: Arc<tokio::sync::Mutex<CacheStore>>,
}

impl Pipeline {
    pub fn new(
        config: RunConfig,
        wallet: Wallet,
        ledger: LedgerVariant,
        assets: AssetStoreVariant,
        cache: CacheStore,
    ) -> Self {
        Self {
            config,
            wallet: Arc::new(wallet),
            ledger: Arc::new(ledger),
            assets: Arc::new(assets),
            cache: Arc::new(tokio::sync::Mutex::new(cache)),
        }
    }

    /// Wire the real network boundaries from configuration. Fails before
    /// any network activity if the keypair file is missing.
    pub fn initialize(config: RunConfig) -> Result<Self> {
        let wallet = Wallet::load(&config.keypair_path)?;
        info!("payer wallet {}", wallet.address());

        let cache = CacheStore::load(&config.cache_path)?;
        info!("cache loaded from {}", cache.path().display());

        let ledger = LedgerVariant::new_http(&config.rpc_url);
        let assets = AssetStoreVariant::new_http(&config.storage_gateway, &config.storage_host);

        Ok(Self::new(config, wallet, ledger, assets, cache))
    }

    /// Address of the registered record account, if any.
    pub async fn registered_account(&self) -> Option<String> {
        self.cache.lock().await.doc.program.account_address.clone()
    }

    /// Move the registration's public start date.
    pub async fn update_start_date(&self, start_ts: i64) -> Result<TxId> {
        let account = self
            .registered_account()
            .await
            .ok_or_else(|| anyhow!("no program registration in cache; run upload first"))?;

        let txid = submitter::submit(
            self.ledger.as_ref(),
            &self.wallet,
            &[],
            vec![Instruction::UpdateStartDate { account, start_ts }],
            ConfirmLevel::Confirmed,
        )
        .await?;
        info!("start date updated to {} (tx {})", start_ts, txid);
        Ok(txid)
    }

    /// Claim a single registered item for the payer, as a smoke test that
    /// the registration is live.
    pub async fn mint_one(&self) -> Result<TxId> {
        let account = self
            .registered_account()
            .await
            .ok_or_else(|| anyhow!("no program registration in cache; run upload first"))?;

        let txid = submitter::submit(
            self.ledger.as_ref(),
            &self.wallet,
            &[],
            vec![Instruction::ClaimItem {
                account,
                recipient: self.wallet.address().to_string(),
            }],
            ConfirmLevel::Confirmed,
        )
        .await?;
        info!("claimed one item (tx {})", txid);
        Ok(txid)
    }
}
