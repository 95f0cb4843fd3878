//! Transaction submission with a bounded retry budget.
//!
//! The retry combinator is independent of the error classification, so the
//! same submitter serves registration, fee-payment and batch-write calls.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::ledger::{ConfirmLevel, Instruction, SubmitError, TransactionPayload, TxId};
use crate::traits::Ledger;
use crate::wallet::Wallet;

/// Retry ceiling for a single logical submission.
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay between attempts; grows linearly with the attempt number.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Run `op` up to `max_attempts` times. Errors accepted by `is_retryable`
/// are retried after `attempt * RETRY_DELAY`; any other error surfaces
/// immediately.
pub async fn with_retry<T, F, Fut, R>(
    mut op: F,
    max_attempts: u32,
    is_retryable: R,
) -> Result<T, SubmitError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SubmitError>>,
    R: Fn(&SubmitError) -> bool,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retryable(&err) => return Err(err),
            Err(err) if attempt >= max_attempts => {
                return Err(SubmitError::RetriesExhausted {
                    attempts: max_attempts,
                    last: Box::new(err),
                });
            }
            Err(err) => {
                warn!(
                    "attempt {}/{} failed ({}), retrying",
                    attempt, max_attempts, err
                );
                tokio::time::sleep(RETRY_DELAY * attempt).await;
            }
        }
    }
}

/// Sign and send `instructions`, refreshing the block reference on each
/// attempt, then await confirmation at `level`.
pub async fn submit<L: Ledger + ?Sized>(
    ledger: &L,
    payer: &Wallet,
    extra_signers: &[&Wallet],
    instructions: Vec<Instruction>,
    level: ConfirmLevel,
) -> Result<TxId, SubmitError> {
    let txid = with_retry(
        |attempt| {
            let instructions = instructions.clone();
            async move {
                let block_ref = ledger.latest_block_ref().await?;
                debug!("attempt {}: anchoring to block ref {}", attempt, block_ref);

                let payload = TransactionPayload {
                    block_ref,
                    payer: payer.address().to_string(),
                    instructions,
                };
                let mut signers = vec![payer];
                signers.extend_from_slice(extra_signers);
                let tx = payload
                    .sign(&signers)
                    .map_err(|e| SubmitError::Rejected(format!("signing failed: {e}")))?;

                ledger.send_transaction(&tx).await
            }
        },
        MAX_ATTEMPTS,
        SubmitError::is_retryable,
    )
    .await?;

    ledger.confirm_transaction(&txid, level).await?;
    Ok(txid)
}
