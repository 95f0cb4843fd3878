//! Upload orchestration: walks the ordered item set, performs the one-time
//! program registration, and drives per-item uploads through the asset
//! store. Strictly sequential; a single item's failure never halts the run.

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info};

use crate::assets::{self, AssetPair};
use crate::layout;
use crate::ledger::{ConfirmLevel, Instruction};
use crate::submitter;
use crate::traits::asset_store::AssetStore;
use crate::traits::ledger::Ledger;
use crate::types::UploadRequest;
use crate::wallet::Wallet;

use super::core::{Pipeline, UploadSummary};

impl Pipeline {
    /// Upload every item that has no content address yet, registering the
    /// program on the way if this is the first run.
    pub async fn run_upload(&self) -> Result<UploadSummary> {
        let items = {
            let cache = self.cache.lock().await;
            assets::discover_items(&self.config.assets_dir, &cache.doc)?
        };
        info!(
            "found {} items in {}",
            items.len(),
            self.config.assets_dir.display()
        );

        let mut summary = UploadSummary::default();
        for (pos, pair) in items.iter().enumerate() {
            // The one-time registration runs before the first item's upload
            // regardless of whether that upload is later skipped. A failure
            // here is retried on the next run; batch registration cannot
            // proceed without it.
            if pos == 0 {
                if let Err(e) = self.ensure_registration(&items).await {
                    error!("program registration failed: {e:#}");
                }
            }

            let uploaded = {
                let cache = self.cache.lock().await;
                cache.record(&pair.index).map(|r| r.link.is_some())
            };
            if uploaded == Some(true) {
                debug!("item {} already uploaded, skipping", pair.index);
                summary.skipped += 1;
                continue;
            }

            match self.upload_one(pair).await {
                Ok(link) => {
                    info!("item {} uploaded: {}", pair.index, link);
                    summary.uploaded += 1;
                }
                Err(e) => {
                    error!("item {} failed: {e:#}", pair.index);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "upload pass done: {} uploaded, {} skipped, {} failed",
            summary.uploaded, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Run only the one-time registration step, creating and initializing
    /// the record account sized for the discovered item count.
    pub async fn run_create_account(&self) -> Result<()> {
        let items = {
            let cache = self.cache.lock().await;
            assets::discover_items(&self.config.assets_dir, &cache.doc)?
        };
        self.ensure_registration(&items).await
    }

    /// Create and initialize the record-holding account once. Later calls
    /// detect the cached identifiers and return immediately.
    pub async fn ensure_registration(&self, items: &[AssetPair]) -> Result<()> {
        {
            let cache = self.cache.lock().await;
            if cache.doc.program.is_registered() {
                return Ok(());
            }
        }

        let first = items
            .first()
            .ok_or_else(|| anyhow!("no items discovered; nothing to register"))?;
        let (meta, _) = assets::load_metadata(first)
            .context("registration reads the first item's descriptor")?;

        let account = Wallet::generate();
        let address = account.address().to_string();
        let registration_id: String = address.chars().take(layout::REGISTRATION_ID_LEN).collect();

        let size = layout::account_size(items.len()) as u64;
        let lamports = self.ledger.minimum_balance(size).await?;

        let instructions = vec![
            Instruction::CreateAccount {
                address: address.clone(),
                size,
                lamports,
                owner: self.config.program_id.clone(),
            },
            Instruction::InitializeRegistration {
                account: address.clone(),
                registration_id: registration_id.clone(),
                symbol: meta.symbol.clone(),
                seller_fee_basis_points: meta.seller_fee_basis_points,
                is_mutable: true,
                max_supply: 0,
                retain_authority: true,
                item_capacity: items.len() as u32,
                creators: meta.properties.creators.clone(),
            },
        ];

        let txid = submitter::submit(
            self.ledger.as_ref(),
            &self.wallet,
            &[&account],
            instructions,
            ConfirmLevel::Confirmed,
        )
        .await?;
        info!(
            "program registered: id {} account {} (tx {})",
            registration_id, address, txid
        );

        let mut cache = self.cache.lock().await;
        cache.doc.program.registration_id = Some(registration_id);
        cache.doc.program.account_address = Some(address);
        cache.save()?;
        Ok(())
    }

    /// Fee payment, upload, cache flush for a single item.
    async fn upload_one(&self, pair: &AssetPair) -> Result<String> {
        let image_bytes = std::fs::read(&pair.image)
            .with_context(|| format!("reading image {}", pair.image.display()))?;
        let (meta, metadata_bytes) = assets::load_metadata(pair)?;

        // The confirmed fee transfer doubles as the upload receipt.
        let receipt_tx = submitter::submit(
            self.ledger.as_ref(),
            &self.wallet,
            &[],
            vec![Instruction::Transfer {
                to: self.config.fee_address.clone(),
                lamports: self.config.fee_lamports,
            }],
            ConfirmLevel::Confirmed,
        )
        .await
        .context("upload fee payment")?;

        let request = UploadRequest {
            index: pair.index.clone(),
            image_name: format!("{}.png", pair.index),
            image_bytes,
            metadata_name: format!("{}.json", pair.index),
            metadata_bytes,
            receipt_tx,
            env_tag: self.config.env_tag.clone(),
        };
        let link = self.assets.upload_pair(&request).await?;

        let mut cache = self.cache.lock().await;
        cache.set_uploaded(&pair.index, link.clone(), meta.name);
        cache.save()?;
        Ok(link)
    }
}
