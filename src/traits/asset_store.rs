use anyhow::Result;
use async_trait::async_trait;

use crate::types::UploadRequest;

/// Where asset pairs are uploaded (durable storage gateway, mock, ...).
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Implementation name for logging.
    fn name(&self) -> &'static str;

    /// Upload one (image, metadata) pair and return the content address of
    /// the metadata object.
    async fn upload_pair(&self, request: &UploadRequest) -> Result<String>;
}
