use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-item cache entry, keyed by the item index (filename stem).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Content address returned by the storage upload.
    /// Absent until the upload for this item has succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Display name taken from the item's metadata descriptor.
    #[serde(default)]
    pub name: String,

    /// True only after a batch containing this item was confirmed on the ledger.
    ///
    /// Invariant: `on_ledger == true` implies `link` is present and is the
    /// value that was written in that confirmed batch.
    #[serde(default)]
    pub on_ledger: bool,
}

/// One-time program registration identifiers.
///
/// Both fields are set together, exactly once, by the first successful
/// registration call. Later runs detect their presence and skip
/// re-registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramState {
    /// Short identifier minted once, derived from the account address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,

    /// Base-58 address of the ledger account holding the batch records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_address: Option<String>,
}

impl ProgramState {
    pub fn is_registered(&self) -> bool {
        self.registration_id.is_some() && self.account_address.is_some()
    }
}

/// The full cache document, persisted as a single JSON file and rewritten
/// wholesale after every state-changing step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheDocument {
    #[serde(default)]
    pub program: ProgramState,

    #[serde(default)]
    pub items: BTreeMap<String, CacheRecord>,
}

/// A creator entry carried in the metadata descriptor and in the one-time
/// registration instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub address: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub share: u8,
}

/// `properties` block of the metadata descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataProperties {
    #[serde(default)]
    pub creators: Vec<Creator>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// JSON descriptor sitting next to each image file.
///
/// Unknown fields are preserved through `extra` so a rewrite of the embedded
/// image filename round-trips the rest of the document untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,

    #[serde(default)]
    pub symbol: String,

    /// Embedded image filename. Rewritten to the canonical `<stem>.png`
    /// before upload when it differs.
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub seller_fee_basis_points: u16,

    #[serde(default)]
    pub properties: MetadataProperties,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One upload request handed to the asset store: the image bytes, the
/// (possibly rewritten) metadata bytes, the fee receipt and the environment
/// tag the gateway expects.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub index: String,
    pub image_name: String,
    pub image_bytes: Vec<u8>,
    pub metadata_name: String,
    pub metadata_bytes: Vec<u8>,
    pub receipt_tx: String,
    pub env_tag: String,
}

/// One entry of the storage gateway's upload response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedObject {
    pub filename: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
}

/// JSON body returned by the storage gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageUploadResponse {
    #[serde(default)]
    pub messages: Vec<UploadedObject>,
}
