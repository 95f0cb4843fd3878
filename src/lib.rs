// Library exports for testing and external use

pub mod asset_store;
pub mod assets;
pub mod cache;
pub mod config;
pub mod layout;
pub mod ledger;
pub mod pipeline;
pub mod submitter;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod wallet;

// Re-export commonly used types and traits
pub use cache::CacheStore;
pub use config::RunConfig;
pub use pipeline::{Pipeline, RegisterSummary, UploadSummary, VerifySummary};
pub use traits::{AssetStore, Ledger};
pub use types::{AssetMetadata, CacheDocument, CacheRecord, ProgramState, UploadRequest};
pub use wallet::Wallet;

// Re-export variant enums for convenience
pub use asset_store::{AssetStoreVariant, HttpAssetStore, MockAssetStore};
pub use ledger::{HttpLedger, LedgerVariant, MockLedger, SubmitError};
