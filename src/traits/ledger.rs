use async_trait::async_trait;

use crate::ledger::error::SubmitError;
use crate::ledger::instruction::{BlockRef, ConfirmLevel, SignedTransaction, TxId};

/// The remote ledger boundary: a black-box key-value program invoked
/// through typed remote procedures and one raw account read.
///
/// Errors are typed so the transaction submitter can classify them as
/// retryable or fatal.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Implementation name for logging.
    fn name(&self) -> &'static str;

    /// Fetch a fresh recent block reference to anchor a transaction.
    async fn latest_block_ref(&self) -> Result<BlockRef, SubmitError>;

    /// Send a signed transaction; returns its transaction id.
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxId, SubmitError>;

    /// Wait until `txid` reaches the given confirmation level.
    async fn confirm_transaction(&self, txid: &str, level: ConfirmLevel)
        -> Result<(), SubmitError>;

    /// Raw bytes of a ledger account.
    async fn account_data(&self, address: &str) -> Result<Vec<u8>, SubmitError>;

    /// Smallest balance a new account of `size` bytes must carry.
    async fn minimum_balance(&self, size: u64) -> Result<u64, SubmitError>;
}
