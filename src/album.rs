//! One album page session: the search and upload handlers and the page
//! state they mutate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::api::PhotoApi;
use crate::config::AlbumConfig;
use crate::error::UploadError;
use crate::gallery::{self, Gallery};
use crate::sequencer::RequestSequencer;
use crate::upload::{self, SelectedFile};

pub const UPLOAD_SUCCESS: &str = "Photo Uploaded Successfully";
pub const UPLOAD_FAILURE_PREFIX: &str = "Photo Upload Failed: ";
pub const INVALID_FILE: &str = "Please select a valid image file (JPG, JPEG, or PNG).";

/// A user-facing alert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Failure(String),
    Rejected(String),
}

#[cfg(test)]
impl Notice {
    pub(crate) fn message(&self) -> &str {
        match self {
            Notice::Success(message) | Notice::Failure(message) | Notice::Rejected(message) => {
                message
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SearchStatus {
    #[default]
    Idle,
    Showing {
        query: String,
        count: usize,
    },
    Failed {
        query: String,
        message: String,
    },
}

/// The custom-labels text field.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LabelInput {
    pub value: String,
    pub visible: bool,
}

impl LabelInput {
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PageState {
    pub gallery: Gallery,
    pub labels: LabelInput,
    pub search: SearchStatus,
    /// Only set on per-response copies, never in the shared state.
    pub notice: Option<Notice>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Rendered { count: usize },
    Failed,
    /// A newer search was applied first; this response was dropped.
    Stale,
}

pub struct PhotoAlbum {
    api: Arc<dyn PhotoApi>,
    bucket: String,
    storage_base_url: String,
    searches: RequestSequencer,
    state: Mutex<PageState>,
}

impl PhotoAlbum {
    pub fn new(api: Arc<dyn PhotoApi>, config: &AlbumConfig) -> Self {
        Self {
            api,
            bucket: config.bucket.clone(),
            storage_base_url: config.storage_base_url.clone(),
            searches: RequestSequencer::new(),
            state: Mutex::new(PageState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> PageState {
        self.state().clone()
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let ticket = self.searches.begin();
        debug!(ticket = ticket.number(), query, "search dispatched");
        let response = self.api.search(query).await;

        // Ticket check and render share one critical section so a newer
        // response cannot be overwritten between them.
        let mut state = self.state();
        if !self.searches.try_apply(ticket) {
            debug!(ticket = ticket.number(), "discarding stale search response");
            return SearchOutcome::Stale;
        }
        state.updated_at = Some(Utc::now());

        match response {
            Ok(response) => {
                let items = gallery::parse_search_body(response.body.as_deref());
                let count = items.len();
                gallery::render_results(
                    &mut state.gallery,
                    &items,
                    &self.storage_base_url,
                    &mut rand::rng(),
                );
                state.search = SearchStatus::Showing {
                    query: query.to_string(),
                    count,
                };
                info!(query, count, "search results rendered");
                SearchOutcome::Rendered { count }
            }
            Err(err) => {
                error!(error = %err, query, "search failed");
                state.search = SearchStatus::Failed {
                    query: query.to_string(),
                    message: err.to_string(),
                };
                SearchOutcome::Failed
            }
        }
    }

    /// Returns the notice for the caller to show; it is not stored in the
    /// shared page state.
    pub async fn upload(&self, file: SelectedFile, custom_labels: &str) -> Notice {
        self.state().labels.value = custom_labels.to_string();

        match self.send_upload(&file, custom_labels).await {
            Ok(filename) => {
                info!(%filename, bucket = %self.bucket, "photo uploaded");
                self.state().labels.value.clear();
                Notice::Success(UPLOAD_SUCCESS.to_string())
            }
            Err(UploadError::UnsupportedExtension { extension }) => {
                warn!(file = %file.name, %extension, "rejected upload");
                Notice::Rejected(INVALID_FILE.to_string())
            }
            Err(err) => {
                error!(error = %err, file = %file.name, "upload error");
                Notice::Failure(format!("{UPLOAD_FAILURE_PREFIX}{err}"))
            }
        }
    }

    async fn send_upload(&self, file: &SelectedFile, custom_labels: &str) -> Result<String, UploadError> {
        let request = upload::prepare_upload(file, &self.bucket, custom_labels)?;
        let filename = request.filename.clone();
        self.api.upload(request).await?;
        Ok(filename)
    }

    /// Flips the custom-labels field; returns whether it is now shown.
    pub fn toggle_custom_labels(&self) -> bool {
        let mut state = self.state();
        state.labels.toggle();
        state.labels.visible
    }
}
