//! HTTP client for the upload service.
//!
//! One `ApiClient` is bound to one base URL. Poll tasks keep the client they
//! were started with, so switching presets does not redirect jobs already
//! submitted elsewhere.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData};

use common::error::ApiError;
use common::jobs::{JobAccepted, JobStatusClient, RecentJobs, RunningJobs, UploadJob};
use common::model::schema::TableSchema;
use common::payload::UploadForm;
use common::requests::{
    Connection, CreateTableRequest, DatabaseUrlRequest, ErrorBody, ExecuteQueryRequest,
    SourceDbStatus, StatusMessage, TransferStartRequest,
};
use common::source::QueryResult;

#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Connection {
        match Request::get(&self.url("/health")).send().await {
            Ok(resp) if resp.ok() => Connection::Connected,
            _ => Connection::Disconnected,
        }
    }

    pub async fn save_db(&self, database_url: &str) -> Result<StatusMessage, ApiError> {
        let body = DatabaseUrlRequest {
            database_url: database_url.to_string(),
        };
        self.post_json("/save-db", &body).await
    }

    pub async fn create_table(&self, create_sql: &str) -> Result<StatusMessage, ApiError> {
        let body = CreateTableRequest {
            create_sql: create_sql.to_string(),
        };
        self.post_json("/create-table", &body).await
    }

    pub async fn table_schema(&self, table: &str) -> Result<TableSchema, ApiError> {
        let resp = Request::get(&self.url("/table-schema"))
            .query([("table", table)])
            .send()
            .await
            .map_err(network)?;
        read_json(resp).await
    }

    pub async fn connect_source_db(&self, database_url: &str) -> Result<SourceDbStatus, ApiError> {
        let body = DatabaseUrlRequest {
            database_url: database_url.to_string(),
        };
        self.post_json("/connect-source-db", &body).await
    }

    pub async fn disconnect_source_db(&self) -> Result<StatusMessage, ApiError> {
        let resp = Request::post(&self.url("/disconnect-source-db"))
            .send()
            .await
            .map_err(network)?;
        read_json(resp).await
    }

    pub async fn source_db_status(&self) -> Result<SourceDbStatus, ApiError> {
        self.get_json("/source-db-status").await
    }

    pub async fn execute_query(&self, query: &str, limit: usize) -> Result<QueryResult, ApiError> {
        let body = ExecuteQueryRequest {
            query: query.to_string(),
            limit,
        };
        self.post_json("/execute-query", &body).await
    }

    /// Submits a built payload as `multipart/form-data`.
    pub async fn upload(&self, form: &UploadForm) -> Result<JobAccepted, ApiError> {
        let data = multipart(form).map_err(|err| ApiError::Network(js_message(&err)))?;
        let resp = Request::post(&self.url("/upload-data"))
            .body(data)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        read_json(resp).await
    }

    pub async fn recent_jobs(&self, hours: u32) -> Result<RecentJobs, ApiError> {
        let resp = Request::get(&self.url("/jobs/recent"))
            .query([("hours", hours.to_string())])
            .send()
            .await
            .map_err(network)?;
        read_json(resp).await
    }

    pub async fn running_jobs(&self) -> Result<RunningJobs, ApiError> {
        self.get_json("/jobs/running").await
    }

    pub async fn start_transfer(&self, request: &TransferStartRequest) -> Result<JobAccepted, ApiError> {
        self.post_json("/transfer/start", request).await
    }

    pub async fn cancel_transfer(&self, job_id: &str) -> Result<StatusMessage, ApiError> {
        let resp = Request::post(&self.url(&format!("/transfer/cancel/{}", job_id)))
            .send()
            .await
            .map_err(network)?;
        read_json(resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = Request::get(&self.url(path)).send().await.map_err(network)?;
        read_json(resp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = Request::post(&self.url(path))
            .json(body)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        read_json(resp).await
    }
}

#[async_trait(?Send)]
impl JobStatusClient for ApiClient {
    async fn job_status(&self, job_id: &str) -> Result<UploadJob, ApiError> {
        self.get_json(&format!("/job-status/{}", job_id)).await
    }
}

/// Decodes a 2xx body as `T`, or turns an error body into `ApiError::Http`.
async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    if !resp.ok() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message())
            .unwrap_or_else(|_| {
                if text.is_empty() {
                    resp.status_text()
                } else {
                    text
                }
            });
        return Err(ApiError::Http { status, detail });
    }
    resp.json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn network(err: gloo_net::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

fn multipart(form: &UploadForm) -> Result<FormData, JsValue> {
    let bytes = js_sys::Uint8Array::from(form.file.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type(form.file.mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

    let data = FormData::new()?;
    data.append_with_blob_and_filename("file", &blob, &form.file.filename)?;
    data.append_with_str("table", &form.table)?;
    data.append_with_str("columns", &form.columns)?;
    data.append_with_str("primary_key", &form.primary_key)?;
    Ok(data)
}
