//! In-memory ledger used by the test suite. Applies instructions to real
//! account byte buffers through the fixed layout, so verification tests
//! read back exactly what a batch registration wrote.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::layout;
use crate::ledger::error::SubmitError;
use crate::ledger::instruction::{
    BlockRef, ConfirmLevel, Instruction, SignedTransaction, TxId,
};
use crate::traits::Ledger;

#[derive(Default)]
struct MockAccount {
    data: Vec<u8>,
    item_capacity: u32,
    initialized: bool,
}

#[derive(Default)]
struct MockState {
    accounts: HashMap<String, MockAccount>,
    /// Scripted failures returned by the next `send_transaction` calls.
    failures: VecDeque<SubmitError>,
    transfers: Vec<(String, u64)>,
    start_dates: Vec<i64>,
    claims: Vec<String>,
    /// `(start_index, record_count)` of every applied batch write.
    append_calls: Vec<(u32, usize)>,
    confirmed: Vec<TxId>,
    sequence: u64,
    block_sequence: u64,
}

impl MockState {
    fn apply(&mut self, instruction: &Instruction) -> Result<(), SubmitError> {
        match instruction {
            Instruction::CreateAccount { address, size, .. } => {
                self.accounts.insert(
                    address.clone(),
                    MockAccount {
                        data: vec![0u8; *size as usize],
                        item_capacity: 0,
                        initialized: false,
                    },
                );
                Ok(())
            }
            Instruction::InitializeRegistration {
                account,
                item_capacity,
                ..
            } => {
                let acct = self
                    .accounts
                    .get_mut(account)
                    .ok_or_else(|| SubmitError::Rejected(format!("unknown account {account}")))?;
                if acct.initialized {
                    return Err(SubmitError::Rejected(format!(
                        "account {account} already initialized"
                    )));
                }
                acct.item_capacity = *item_capacity;
                acct.initialized = true;
                Ok(())
            }
            Instruction::AppendRecords {
                account,
                start_index,
                records,
            } => {
                let acct = self
                    .accounts
                    .get_mut(account)
                    .ok_or_else(|| SubmitError::Rejected(format!("unknown account {account}")))?;
                if !acct.initialized {
                    return Err(SubmitError::Rejected(format!(
                        "account {account} not initialized"
                    )));
                }
                let capacity = acct.item_capacity as usize;
                for (i, record) in records.iter().enumerate() {
                    let index = *start_index as usize + i;
                    layout::encode_record(&mut acct.data, index, &record.name, &record.uri)
                        .map_err(|e| SubmitError::Rejected(e.to_string()))?;
                    layout::set_presence(&mut acct.data, capacity, index);
                }
                let high = *start_index + records.len() as u32;
                if layout::record_count(&acct.data) < high {
                    layout::set_record_count(&mut acct.data, high);
                }
                self.append_calls.push((*start_index, records.len()));
                Ok(())
            }
            Instruction::Transfer { to, lamports } => {
                self.transfers.push((to.clone(), *lamports));
                Ok(())
            }
            Instruction::UpdateStartDate { account, start_ts } => {
                if !self.accounts.contains_key(account) {
                    return Err(SubmitError::Rejected(format!("unknown account {account}")));
                }
                self.start_dates.push(*start_ts);
                Ok(())
            }
            Instruction::ClaimItem { account, recipient } => {
                if !self.accounts.contains_key(account) {
                    return Err(SubmitError::Rejected(format!("unknown account {account}")));
                }
                self.claims.push(recipient.clone());
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockState>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a failure for the next `send_transaction` call. Queued
    /// failures are consumed in order before any instruction is applied.
    pub fn fail_next(&self, err: SubmitError) {
        self.state.lock().unwrap().failures.push_back(err);
    }

    pub fn transfer_count(&self) -> usize {
        self.state.lock().unwrap().transfers.len()
    }

    pub fn append_calls(&self) -> Vec<(u32, usize)> {
        self.state.lock().unwrap().append_calls.clone()
    }

    pub fn start_dates(&self) -> Vec<i64> {
        self.state.lock().unwrap().start_dates.clone()
    }

    pub fn claims(&self) -> Vec<String> {
        self.state.lock().unwrap().claims.clone()
    }

    pub fn confirmed_count(&self) -> usize {
        self.state.lock().unwrap().confirmed.len()
    }

    pub fn account_bytes(&self, address: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(address)
            .map(|a| a.data.clone())
    }

    /// Install raw account bytes directly, for reconciliation tests.
    pub fn set_account_bytes(&self, address: &str, data: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        let acct = state.accounts.entry(address.to_string()).or_default();
        acct.initialized = true;
        acct.data = data;
    }

    pub fn is_initialized(&self, address: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(address)
            .map(|a| a.initialized)
            .unwrap_or(false)
    }
}

#[async_trait]
impl Ledger for MockLedger {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn latest_block_ref(&self) -> Result<BlockRef, SubmitError> {
        let mut state = self.state.lock().unwrap();
        state.block_sequence += 1;
        Ok(format!("ref-{}", state.block_sequence))
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxId, SubmitError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        for instruction in &tx.payload.instructions {
            state.apply(instruction)?;
        }
        state.sequence += 1;
        Ok(format!("tx-{}", state.sequence))
    }

    async fn confirm_transaction(
        &self,
        txid: &str,
        _level: ConfirmLevel,
    ) -> Result<(), SubmitError> {
        self.state.lock().unwrap().confirmed.push(txid.to_string());
        Ok(())
    }

    async fn account_data(&self, address: &str) -> Result<Vec<u8>, SubmitError> {
        self.account_bytes(address)
            .ok_or_else(|| SubmitError::Rejected(format!("unknown account {address}")))
    }

    async fn minimum_balance(&self, size: u64) -> Result<u64, SubmitError> {
        Ok(890_880 + size * 10)
    }
}
