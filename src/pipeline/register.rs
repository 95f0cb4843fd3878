//! Batch registration: splits the cached index set into macro-groups for
//! bounded concurrency and micro-batches matching the ledger program's
//! per-transaction record ceiling.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info, span, warn, Instrument, Level};

use crate::cache::CacheStore;
use crate::ledger::{BatchRecord, ConfirmLevel, Instruction, LedgerVariant};
use crate::submitter;
use crate::wallet::Wallet;

use super::core::{Pipeline, RegisterSummary};

/// Per-transaction record ceiling of the ledger program.
pub const MICRO_BATCH_SIZE: usize = 10;

/// Concurrency unit: one spawned task per macro-group.
pub const MACRO_GROUP_SIZE: usize = 1000;

/// Split the ordered index set into macro-groups.
pub fn macro_groups(indices: &[String]) -> Vec<Vec<String>> {
    indices.chunks(MACRO_GROUP_SIZE).map(<[String]>::to_vec).collect()
}

/// Split one macro-group into micro-batches.
pub fn micro_batches(group: &[String]) -> Vec<Vec<String>> {
    group.chunks(MICRO_BATCH_SIZE).map(<[String]>::to_vec).collect()
}

enum BatchOutcome {
    /// Every index already confirmed on the ledger.
    Skipped,
    /// Batch not submittable this run (missing upload, gap in indices).
    Deferred,
    /// Confirmed write of this many records.
    Submitted(usize),
}

impl Pipeline {
    /// Register every cached item that is not yet on the ledger.
    /// Macro-groups run concurrently; micro-batches within a group run
    /// sequentially. Failures are partial, never global.
    pub async fn run_register(&self) -> Result<RegisterSummary> {
        let (account, indices) = {
            let cache = self.cache.lock().await;
            (
                cache.doc.program.account_address.clone(),
                cache.ordered_indices(),
            )
        };
        let Some(account) = account else {
            error!("no program registration in cache; batch registration skipped");
            return Ok(RegisterSummary::default());
        };

        info!(
            "registering {} cached indices in macro-groups of {}",
            indices.len(),
            MACRO_GROUP_SIZE
        );

        let mut handles = Vec::new();
        for (group_no, group) in macro_groups(&indices).into_iter().enumerate() {
            let ledger = Arc::clone(&self.ledger);
            let cache = Arc::clone(&self.cache);
            let wallet = Arc::clone(&self.wallet);
            let account = account.clone();

            handles.push(tokio::spawn(
                async move {
                    let mut summary = RegisterSummary::default();
                    for micro in micro_batches(&group) {
                        match register_micro_batch(&ledger, &wallet, &cache, &account, &micro)
                            .await
                        {
                            Ok(BatchOutcome::Skipped) => summary.batches_skipped += 1,
                            Ok(BatchOutcome::Deferred) => summary.batches_deferred += 1,
                            Ok(BatchOutcome::Submitted(n)) => {
                                summary.batches_submitted += 1;
                                summary.items_marked += n;
                            }
                            Err(e) => {
                                error!("micro-batch starting at {} failed: {e:#}", micro[0]);
                                summary.batches_failed += 1;
                            }
                        }
                    }
                    summary
                }
                .instrument(span!(Level::INFO, "macro_group", group = group_no)),
            ));
        }

        let mut total = RegisterSummary::default();
        let mut join_error = None;
        for handle in handles {
            match handle.await {
                Ok(summary) => total.merge(summary),
                Err(e) => {
                    error!("macro-group task failed: {e}");
                    join_error = Some(e);
                }
            }
        }

        // Unconditional final flush so an interrupted run leaves a fully
        // consistent on-disk state.
        self.cache.lock().await.save()?;

        if let Some(e) = join_error {
            return Err(e.into());
        }
        info!(
            "register pass done: {} submitted, {} skipped, {} deferred, {} failed",
            total.batches_submitted,
            total.batches_skipped,
            total.batches_deferred,
            total.batches_failed
        );
        Ok(total)
    }
}

/// Build, submit and confirm one micro-batch, then mark its indices.
/// The cache lock is held only while snapshotting and while flushing,
/// never across a network call.
async fn register_micro_batch(
    ledger: &LedgerVariant,
    wallet: &Wallet,
    cache: &tokio::sync::Mutex<CacheStore>,
    account: &str,
    micro: &[String],
) -> Result<BatchOutcome> {
    let mut start_index: Option<u32> = None;
    let mut records = Vec::with_capacity(micro.len());
    {
        let cache = cache.lock().await;

        let all_registered = micro
            .iter()
            .all(|idx| cache.record(idx).map(|r| r.on_ledger).unwrap_or(false));
        if all_registered {
            debug!("micro-batch starting at {} already on ledger", micro[0]);
            return Ok(BatchOutcome::Skipped);
        }

        for (offset, idx) in micro.iter().enumerate() {
            let Ok(n) = idx.parse::<u32>() else {
                warn!("index {} is not numeric; deferring micro-batch", idx);
                return Ok(BatchOutcome::Deferred);
            };
            let start = *start_index.get_or_insert(n);
            // The ledger program expects a contiguous ascending run.
            if n != start + offset as u32 {
                warn!(
                    "gap in micro-batch at index {} (expected {}); deferring",
                    n,
                    start + offset as u32
                );
                return Ok(BatchOutcome::Deferred);
            }
            let Some(record) = cache.record(idx) else {
                return Ok(BatchOutcome::Deferred);
            };
            let Some(link) = record.link.clone() else {
                warn!("index {} has no upload yet; deferring micro-batch", idx);
                return Ok(BatchOutcome::Deferred);
            };
            records.push(BatchRecord {
                name: record.name.clone(),
                uri: link,
            });
        }
    }
    let Some(start_index) = start_index else {
        return Ok(BatchOutcome::Skipped);
    };

    let txid = submitter::submit(
        ledger,
        wallet,
        &[],
        vec![Instruction::AppendRecords {
            account: account.to_string(),
            start_index,
            records,
        }],
        ConfirmLevel::Confirmed,
    )
    .await?;
    debug!(
        "micro-batch at {} confirmed ({} records, tx {})",
        start_index,
        micro.len(),
        txid
    );

    let mut cache = cache.lock().await;
    for idx in micro {
        cache.mark_registered(idx);
    }
    cache.save()?;
    Ok(BatchOutcome::Submitted(micro.len()))
}
