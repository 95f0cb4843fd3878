use async_trait::async_trait;

use super::mock::MockLedger;
use super::rpc::HttpLedger;
use crate::ledger::error::SubmitError;
use crate::ledger::instruction::{BlockRef, ConfirmLevel, SignedTransaction, TxId};
use crate::traits::Ledger;

/// Enum representing all possible ledger implementations.
pub enum LedgerVariant {
    Http(HttpLedger),
    Mock(MockLedger),
}

impl LedgerVariant {
    pub fn new_http(url: impl Into<String>) -> Self {
        LedgerVariant::Http(HttpLedger::new(url))
    }
}

#[async_trait]
impl Ledger for LedgerVariant {
    fn name(&self) -> &'static str {
        match self {
            LedgerVariant::Http(inner) => inner.name(),
            LedgerVariant::Mock(inner) => inner.name(),
        }
    }

    async fn latest_block_ref(&self) -> Result<BlockRef, SubmitError> {
        match self {
            LedgerVariant::Http(inner) => inner.latest_block_ref().await,
            LedgerVariant::Mock(inner) => inner.latest_block_ref().await,
        }
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxId, SubmitError> {
        match self {
            LedgerVariant::Http(inner) => inner.send_transaction(tx).await,
            LedgerVariant::Mock(inner) => inner.send_transaction(tx).await,
        }
    }

    async fn confirm_transaction(
        &self,
        txid: &str,
        level: ConfirmLevel,
    ) -> Result<(), SubmitError> {
        match self {
            LedgerVariant::Http(inner) => inner.confirm_transaction(txid, level).await,
            LedgerVariant::Mock(inner) => inner.confirm_transaction(txid, level).await,
        }
    }

    async fn account_data(&self, address: &str) -> Result<Vec<u8>, SubmitError> {
        match self {
            LedgerVariant::Http(inner) => inner.account_data(address).await,
            LedgerVariant::Mock(inner) => inner.account_data(address).await,
        }
    }

    async fn minimum_balance(&self, size: u64) -> Result<u64, SubmitError> {
        match self {
            LedgerVariant::Http(inner) => inner.minimum_balance(size).await,
            LedgerVariant::Mock(inner) => inner.minimum_balance(size).await,
        }
    }
}
