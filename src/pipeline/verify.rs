//! Reconciliation of ledger-encoded records against the local cache.
//!
//! A pure read of the ledger: mismatches only clear the local confirmed
//! flag so the batch registrar retries those indices on the next run.

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::layout;
use crate::traits::ledger::Ledger;

use super::core::{Pipeline, VerifySummary};

impl Pipeline {
    pub async fn run_verify(&self) -> Result<VerifySummary> {
        let account = self
            .registered_account()
            .await
            .ok_or_else(|| anyhow!("no program registration in cache; nothing to verify"))?;

        let data = self.ledger.account_data(&account).await?;
        info!(
            "verifying cached items against {} bytes of account {}",
            data.len(),
            account
        );

        let mut summary = VerifySummary::default();
        let mut cache = self.cache.lock().await;
        for idx in cache.ordered_indices() {
            let Ok(i) = idx.parse::<usize>() else {
                warn!("index {} is not numeric; cannot locate its record", idx);
                continue;
            };
            let Some(record) = cache.record(&idx).cloned() else {
                continue;
            };
            summary.checked += 1;

            let decoded = layout::decode_record(&data, i);
            // Trimmed exact match. Padding is already stripped by the
            // decoder, so containment would only mask corrupted records.
            let matches = match &decoded {
                Ok(fields) => {
                    fields.name == record.name
                        && record.link.as_deref() == Some(fields.uri.as_str())
                }
                Err(_) => false,
            };

            if !matches && record.on_ledger {
                warn!(
                    "record {} disagrees with ledger (cache name {:?}, link {:?}); will re-register",
                    idx, record.name, record.link
                );
                cache.clear_registered(&idx);
                summary.mismatched += 1;
            }
        }
        cache.save()?;

        info!(
            "verify pass done: {} checked, {} cleared for re-registration",
            summary.checked, summary.mismatched
        );
        Ok(summary)
    }
}
