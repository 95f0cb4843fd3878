use anyhow::Result;
use async_trait::async_trait;

use super::http::HttpAssetStore;
use super::mock::MockAssetStore;
use crate::traits::AssetStore;
use crate::types::UploadRequest;

/// Enum representing all possible asset store implementations.
pub enum AssetStoreVariant {
    Http(HttpAssetStore),
    Mock(MockAssetStore),
}

impl AssetStoreVariant {
    pub fn new_http(gateway_url: impl Into<String>, storage_host: impl Into<String>) -> Self {
        AssetStoreVariant::Http(HttpAssetStore::new(gateway_url, storage_host))
    }
}

#[async_trait]
impl AssetStore for AssetStoreVariant {
    fn name(&self) -> &'static str {
        match self {
            AssetStoreVariant::Http(inner) => inner.name(),
            AssetStoreVariant::Mock(inner) => inner.name(),
        }
    }

    async fn upload_pair(&self, request: &UploadRequest) -> Result<String> {
        match self {
            AssetStoreVariant::Http(inner) => inner.upload_pair(request).await,
            AssetStoreVariant::Mock(inner) => inner.upload_pair(request).await,
        }
    }
}
