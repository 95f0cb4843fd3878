//! Recording asset store used by the test suite.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::traits::AssetStore;
use crate::types::UploadRequest;

/// Slimmed copy of an upload request kept for assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub index: String,
    pub image_name: String,
    pub metadata_name: String,
    pub metadata_bytes: Vec<u8>,
    pub receipt_tx: String,
    pub env_tag: String,
}

#[derive(Default)]
pub struct MockAssetStore {
    uploads: Mutex<Vec<RecordedUpload>>,
    failures: Mutex<VecDeque<String>>,
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a failure for the next `upload_pair` call.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures.lock().unwrap().push_back(message.into());
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn upload_pair(&self, request: &UploadRequest) -> Result<String> {
        if let Some(message) = self.failures.lock().unwrap().pop_front() {
            bail!("scripted upload failure: {message}");
        }
        self.uploads.lock().unwrap().push(RecordedUpload {
            index: request.index.clone(),
            image_name: request.image_name.clone(),
            metadata_name: request.metadata_name.clone(),
            metadata_bytes: request.metadata_bytes.clone(),
            receipt_tx: request.receipt_tx.clone(),
            env_tag: request.env_tag.clone(),
        });
        Ok(format!("https://mock.storage/{}", request.index))
    }
}
