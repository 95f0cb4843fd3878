//! Typed remote procedures of the ledger program and the signed
//! transaction envelope that carries them.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::types::Creator;
use crate::wallet::Wallet;

pub type TxId = String;
pub type BlockRef = String;

/// Confirmation level awaited before a submission returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmLevel {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl ConfirmLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmLevel::Processed => "processed",
            ConfirmLevel::Confirmed => "confirmed",
            ConfirmLevel::Finalized => "finalized",
        }
    }
}

/// One `(uri, name)` pair written by a batch registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub name: String,
    pub uri: String,
}

/// The ledger program's typed procedures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Create a fresh account of `size` bytes owned by the program.
    CreateAccount {
        address: String,
        size: u64,
        lamports: u64,
        owner: String,
    },

    /// One-time initialization of the record-holding account.
    InitializeRegistration {
        account: String,
        registration_id: String,
        symbol: String,
        seller_fee_basis_points: u16,
        is_mutable: bool,
        max_supply: u64,
        retain_authority: bool,
        item_capacity: u32,
        creators: Vec<Creator>,
    },

    /// Append a contiguous run of records starting at `start_index`.
    AppendRecords {
        account: String,
        start_index: u32,
        records: Vec<BatchRecord>,
    },

    /// Move `lamports` to `to`. Used for the per-item upload fee.
    Transfer { to: String, lamports: u64 },

    /// Move the public start date of an existing registration.
    UpdateStartDate { account: String, start_ts: i64 },

    /// Claim one registered item for `recipient`.
    ClaimItem { account: String, recipient: String },
}

/// Unsigned transaction body: a recent block reference, the fee payer and
/// the instruction list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub block_ref: BlockRef,
    pub payer: String,
    pub instructions: Vec<Instruction>,
}

impl TransactionPayload {
    pub fn message_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Sign with the payer and any extra signers (e.g. the keypair of an
    /// account being created).
    pub fn sign(self, signers: &[&Wallet]) -> Result<SignedTransaction> {
        let message = self.message_bytes()?;
        let signatures = signers
            .iter()
            .map(|w| SignaturePair {
                address: w.address().to_string(),
                signature: w.sign(&message),
            })
            .collect();
        Ok(SignedTransaction {
            payload: self,
            signatures,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignaturePair {
    pub address: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub payload: TransactionPayload,
    pub signatures: Vec<SignaturePair>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_covers_payer_and_extra_signers() {
        let payer = Wallet::generate();
        let account = Wallet::generate();

        let payload = TransactionPayload {
            block_ref: "ref-1".into(),
            payer: payer.address().to_string(),
            instructions: vec![Instruction::Transfer {
                to: account.address().to_string(),
                lamports: 1,
            }],
        };

        let tx = payload.sign(&[&payer, &account]).unwrap();
        assert_eq!(tx.signatures.len(), 2);
        assert_eq!(tx.signatures[0].address, payer.address());
        assert_eq!(tx.signatures[1].address, account.address());
    }
}
