use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::api::{PhotoApi, SearchResponse, UploadRequest};
use crate::config::AlbumConfig;
use crate::error::ApiError;

const API_KEY_HEADER: &str = "x-api-key";
const CUSTOM_LABELS_HEADER: &str = "x-amz-meta-customLabels";

/// `PhotoApi` over HTTP against an API-gateway stage.
#[derive(Clone, Debug)]
pub struct HttpPhotoApi {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpPhotoApi {
    pub fn new(config: &AlbumConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_client(
            client,
            config.api_base_url.clone(),
            config.api_key.clone(),
        ))
    }

    pub fn with_client(client: Client, base_url: Url, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn assert_ok_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

#[async_trait]
impl PhotoApi for HttpPhotoApi {
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiError> {
        let url = self.endpoint(&["search"])?;
        debug!(%url, query, "dispatching search");
        let response = self
            .client
            .get(url)
            .query(&[("q", query)])
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let response = assert_ok_response(response).await?;
        Ok(response.json::<SearchResponse>().await?)
    }

    async fn upload(&self, request: UploadRequest) -> Result<(), ApiError> {
        let url = self.endpoint(&["upload", request.bucket.as_str(), request.filename.as_str()])?;
        debug!(
            %url,
            content_type = %request.content_type,
            encoded_len = request.content.len(),
            "dispatching upload"
        );
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, request.content_type)
            .header(CUSTOM_LABELS_HEADER, request.custom_labels)
            .header(API_KEY_HEADER, &self.api_key)
            .body(request.content)
            .send()
            .await?;

        assert_ok_response(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer, stage: &str) -> HttpPhotoApi {
        let base = Url::parse(&format!("{}{stage}", server.uri())).unwrap();
        HttpPhotoApi::with_client(Client::new(), base, "test-key".to_string())
    }

    #[test]
    fn endpoint_keeps_the_stage_path() {
        let api = HttpPhotoApi::with_client(
            Client::new(),
            Url::parse("https://abc.execute-api.us-east-1.amazonaws.com/prod/").unwrap(),
            "k".to_string(),
        );
        let url = api.endpoint(&["upload", "photos-bucket-1", "my photo.png"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.execute-api.us-east-1.amazonaws.com/prod/upload/photos-bucket-1/my%20photo.png"
        );
    }

    #[tokio::test]
    async fn search_sends_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/prod/search"))
            .and(query_param("q", "show me trees"))
            .and(header("content-type", "application/json"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "statusCode": 200,
                "body": "[{\"key\":\"Tree3.jpeg\"}]"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = api_for(&server, "/prod").search("show me trees").await.unwrap();
        assert_eq!(response.body.as_deref(), Some("[{\"key\":\"Tree3.jpeg\"}]"));
    }

    #[tokio::test]
    async fn search_reports_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let err = api_for(&server, "").search("dogs").await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status.as_u16(), 403);
                assert_eq!(body, "Forbidden");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_puts_encoded_body_with_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/prod/upload/photos-bucket-1/Tree3.jpeg"))
            .and(header("content-type", "image/jpeg"))
            .and(header("x-amz-meta-customLabels", "tree,park"))
            .and(header("x-api-key", "test-key"))
            .and(body_string("aGVsbG8="))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let request = UploadRequest {
            bucket: "photos-bucket-1".to_string(),
            filename: "Tree3.jpeg".to_string(),
            content: "aGVsbG8=".to_string(),
            content_type: "image/jpeg".to_string(),
            custom_labels: "tree,park".to_string(),
        };
        api_for(&server, "/prod").upload(request).await.unwrap();
    }
}
