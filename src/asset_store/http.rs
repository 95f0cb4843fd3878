//! Multipart upload client for the durable storage gateway.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::traits::AssetStore;
use crate::types::{StorageUploadResponse, UploadRequest};

pub struct HttpAssetStore {
    client: reqwest::Client,
    gateway_url: String,
    storage_host: String,
}

impl HttpAssetStore {
    pub fn new(gateway_url: impl Into<String>, storage_host: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url: gateway_url.into(),
            storage_host: storage_host.into(),
        }
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn upload_pair(&self, request: &UploadRequest) -> Result<String> {
        let image = Part::bytes(request.image_bytes.clone())
            .file_name(request.image_name.clone())
            .mime_str("image/png")?;
        let metadata = Part::bytes(request.metadata_bytes.clone())
            .file_name(request.metadata_name.clone())
            .mime_str("application/json")?;

        let form = Form::new()
            .text("transaction", request.receipt_tx.clone())
            .text("env", request.env_tag.clone())
            .part("file[]", image)
            .part("file[]", metadata);

        let response = self
            .client
            .post(&self.gateway_url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("posting item {} to {}", request.index, self.gateway_url))?
            .error_for_status()
            .with_context(|| format!("storage gateway rejected item {}", request.index))?;

        let body: StorageUploadResponse = response
            .json()
            .await
            .with_context(|| format!("decoding upload response for item {}", request.index))?;

        // The content address of interest is the metadata object's, not the
        // image's.
        let object = body
            .messages
            .iter()
            .find(|m| m.filename == request.metadata_name)
            .ok_or_else(|| {
                anyhow!(
                    "upload response for item {} has no entry for {}",
                    request.index,
                    request.metadata_name
                )
            })?;

        Ok(format!(
            "https://{}/{}",
            self.storage_host, object.transaction_id
        ))
    }
}
