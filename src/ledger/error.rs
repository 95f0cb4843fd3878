use thiserror::Error;

/// Failure modes of ledger calls and transaction submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The block reference anchoring the transaction expired before the
    /// network accepted it. Refreshing the reference and resending is safe.
    #[error("block reference expired")]
    BlockRefExpired,

    /// The ledger rejected the transaction for a non-transient reason
    /// (insufficient funds, program-level rejection).
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// Transport-level failure talking to the ledger endpoint.
    #[error("rpc failure: {0}")]
    Rpc(String),

    /// The transaction was sent but never reached the requested
    /// confirmation level.
    #[error("transaction {txid} unconfirmed: {reason}")]
    Unconfirmed { txid: String, reason: String },

    /// The bounded retry budget ran out.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<SubmitError> },
}

impl SubmitError {
    /// Whether resending the same logical transaction can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::BlockRefExpired | SubmitError::Rpc(_))
    }
}
