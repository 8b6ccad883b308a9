//! The request client the album talks to: logical *search* and *upload*
//! operations, independent of how they reach the network.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub use http::HttpPhotoApi;

/// Envelope returned by the search endpoint. `body` holds a JSON-encoded
/// array of index documents.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRequest {
    pub bucket: String,
    pub filename: String,
    /// Base64 text of the raw file bytes.
    pub content: String,
    pub content_type: String,
    pub custom_labels: String,
}

#[async_trait]
pub trait PhotoApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiError>;
    async fn upload(&self, request: UploadRequest) -> Result<(), ApiError>;
}
