//! JSON-RPC ledger client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ledger::error::SubmitError;
use crate::ledger::instruction::{BlockRef, ConfirmLevel, SignedTransaction, TxId};
use crate::traits::Ledger;

pub struct HttpLedger {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    #[allow(dead_code)]
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct ConfirmResult {
    confirmed: bool,
    #[serde(default)]
    status: String,
}

impl HttpLedger {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<T, SubmitError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubmitError::Rpc(e.to_string()))?;

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| SubmitError::Rpc(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(classify(err));
        }
        body.result
            .ok_or_else(|| SubmitError::Rpc(format!("{method}: empty result")))
    }
}

/// Split ledger rejections into the retryable expired-block-reference class
/// and everything else.
fn classify(err: RpcErrorBody) -> SubmitError {
    let msg = err.message.to_ascii_lowercase();
    if msg.contains("block reference expired")
        || msg.contains("blockhash not found")
        || msg.contains("blockhash expired")
    {
        SubmitError::BlockRefExpired
    } else {
        SubmitError::Rejected(err.message)
    }
}

#[async_trait]
impl Ledger for HttpLedger {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn latest_block_ref(&self) -> Result<BlockRef, SubmitError> {
        self.call("getLatestBlockRef", serde_json::json!([])).await
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxId, SubmitError> {
        self.call("sendTransaction", serde_json::json!([tx])).await
    }

    async fn confirm_transaction(
        &self,
        txid: &str,
        level: ConfirmLevel,
    ) -> Result<(), SubmitError> {
        let result: ConfirmResult = self
            .call(
                "confirmTransaction",
                serde_json::json!([txid, level.as_str()]),
            )
            .await?;
        if result.confirmed {
            Ok(())
        } else {
            Err(SubmitError::Unconfirmed {
                txid: txid.to_string(),
                reason: result.status,
            })
        }
    }

    async fn account_data(&self, address: &str) -> Result<Vec<u8>, SubmitError> {
        let encoded: String = self
            .call("getAccountData", serde_json::json!([address]))
            .await?;
        hex::decode(&encoded)
            .map_err(|e| SubmitError::Rpc(format!("account data for {address}: {e}")))
    }

    async fn minimum_balance(&self, size: u64) -> Result<u64, SubmitError> {
        self.call("getMinimumBalance", serde_json::json!([size]))
            .await
    }
}
