//! Error taxonomy shared by the ingestion pipeline and the HTTP client.
//!
//! `IngestError` covers everything the user can fix locally (an empty file, a
//! JSON document without objects, a mapping with no usable attribute).
//! `ApiError` covers transport failures and non-2xx answers from the upload
//! service. Server-reported job failures are not errors at this level: they
//! travel as `JobStatus::Failed` inside an `UploadJob`.

use thiserror::Error;

/// Input errors raised while loading a source or preparing an upload.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("File is empty")]
    EmptyInput,

    #[error("Invalid JSON: could not parse file ({0})")]
    InvalidJson(#[from] serde_json::Error),

    #[error("JSON must be an object or an array of objects")]
    NoObjects,

    #[error("JSON has no keys to preview")]
    NoKeys,

    #[error("Please map at least one attribute")]
    NoMappedAttributes,

    #[error("Please set table schema first")]
    NoSchema,

    #[error("Table attributes not loaded")]
    SchemaWithoutAttributes,

    #[error("No file selected")]
    NoSource,

    #[error("Only CSV and JSON files are supported: {0}")]
    UnsupportedFile(String),
}

/// Failures talking to the remote upload service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message shown to the user. HTTP errors surface the server detail only.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}
