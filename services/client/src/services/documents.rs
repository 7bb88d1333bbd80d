//! services/client/src/services/documents.rs
//!
//! Document uploads against `/v1/documents`. Document fields are forwarded
//! as given; validation is the backend's job.

use crate::api_client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::normalize::wire::{
    BatchUploadRequestWire, BatchUploadWire, DocumentUploadWire, UploadWire,
};
use academic_search_core::domain::{
    BatchUploadOutcome, DocumentUpload, FileUpload, UploadOutcome,
};
use academic_search_core::ports::{HttpBody, HttpMethod};
use std::sync::Arc;
use tracing::info;

const DOCUMENT_BASE: &str = "/v1/documents";

#[derive(Clone)]
pub struct DocumentService {
    api: Arc<ApiClient>,
}

impl DocumentService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// POST /v1/documents/upload
    pub async fn upload(&self, document: &DocumentUpload) -> ClientResult<UploadOutcome> {
        let body = serde_json::to_value(DocumentUploadWire::from_domain(document))
            .map_err(|e| ClientError::Internal(e.to_string()))?;
        let raw = self
            .api
            .post_json(&format!("{}/upload", DOCUMENT_BASE), body)
            .await?;

        let outcome = UploadWire::parse(&raw.body).to_domain();
        info!("Uploaded '{}': {:?}", document.title, outcome.document_id);
        Ok(outcome)
    }

    /// POST /v1/documents/batch
    pub async fn batch_upload(
        &self,
        documents: &[DocumentUpload],
    ) -> ClientResult<BatchUploadOutcome> {
        let body = serde_json::to_value(BatchUploadRequestWire::from_domain(documents))
            .map_err(|e| ClientError::Internal(e.to_string()))?;
        let raw = self
            .api
            .post_json(&format!("{}/batch", DOCUMENT_BASE), body)
            .await?;

        let outcome = BatchUploadWire::parse(&raw.body).to_domain();
        info!(
            "Batch upload: {} uploaded, {} failed",
            outcome.uploaded_count, outcome.failed_count
        );
        Ok(outcome)
    }

    /// POST /v1/documents/upload-file as multipart form data, field `file`.
    pub async fn upload_file(&self, file: &FileUpload) -> ClientResult<UploadOutcome> {
        let raw = self
            .api
            .send(
                HttpMethod::Post,
                &format!("{}/upload-file", DOCUMENT_BASE),
                HttpBody::Multipart {
                    field: "file".to_string(),
                    file_name: file.file_name.clone(),
                    bytes: file.bytes.clone(),
                },
            )
            .await?;
        Ok(UploadWire::parse(&raw.body).to_domain())
    }
}
