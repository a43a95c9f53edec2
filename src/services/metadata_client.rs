use crate::models::{FetchOutcome, VideoMetadata};
use crate::services::credential_store::Credentials;
use crate::utils::{format_iso8601_duration, format_publish_date};
use log::error;
use serde::Deserialize;
use thiserror::Error;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("YouTube API request failed: {0}")]
    Transport(String),
    #[error("YouTube API error ({status}): {message}")]
    Api { status: u16, message: String },
}

// Documentation: https://developers.google.com/youtube/v3/docs/videos
#[derive(Debug, Default, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    content_details: ContentDetails,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    published_at: String,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

// The statistics counters come back as decimal strings, and any of them can
// be absent (e.g. hidden like counts, disabled comments).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

/// Seam between the fetch route and the YouTube Data API, so route tests can
/// stand in a double for the remote service.
#[rocket::async_trait]
pub trait MetadataApi: Send + Sync {
    async fn fetch_video(
        &self,
        credentials: &Credentials,
        video_id: &str,
    ) -> Result<FetchOutcome, FetchError>;
}

pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
}

impl YouTubeClient {
    pub fn new() -> Self {
        Self::with_base_url(YOUTUBE_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        YouTubeClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for YouTubeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[rocket::async_trait]
impl MetadataApi for YouTubeClient {
    /// One authenticated `videos.list` round trip. An unknown id is a normal
    /// outcome (`FetchOutcome::Message`); only transport and API failures
    /// come back as errors.
    async fn fetch_video(
        &self,
        credentials: &Credentials,
        video_id: &str,
    ) -> Result<FetchOutcome, FetchError> {
        let url = format!(
            "{}/videos?part=snippet,contentDetails,statistics&id={video_id}",
            self.base_url
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&credentials.access_token)
            .send()
            .await
            .map_err(|e| {
                error!("YouTube API request failed for video {video_id}: {e:?}");
                FetchError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("YouTube API returned {status} for video {video_id}");
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: VideoListResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let Some(item) = body.items.into_iter().next() else {
            return Ok(FetchOutcome::Message(format!(
                "No video found with ID: {video_id}"
            )));
        };

        Ok(FetchOutcome::Metadata(map_video(item)))
    }
}

fn map_video(item: VideoItem) -> VideoMetadata {
    let na = || "N/A".to_string();
    VideoMetadata {
        title: item.snippet.title,
        description: item
            .snippet
            .description
            .unwrap_or_else(|| "No description".to_string()),
        tags: item.snippet.tags,
        views: item.statistics.view_count.unwrap_or_else(na),
        likes: item.statistics.like_count.unwrap_or_else(na),
        comments: item.statistics.comment_count.unwrap_or_else(na),
        duration: format_iso8601_duration(&item.content_details.duration),
        published: format_publish_date(&item.snippet.published_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::credential_store::GOOGLE_TOKEN_URI;
    use mockito::Matcher;

    fn credentials() -> Credentials {
        Credentials {
            access_token: "ya29.test-token".to_string(),
            refresh_token: None,
            client_id: String::new(),
            client_secret: String::new(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            expiry: None,
        }
    }

    #[test]
    fn maps_all_fields() {
        let item: VideoItem = serde_json::from_value(serde_json::json!({
            "snippet": {
                "title": "Never Gonna Give You Up",
                "description": "Official video",
                "tags": ["music", "80s"],
                "publishedAt": "2009-10-25T06:57:33Z"
            },
            "contentDetails": { "duration": "PT3M33S" },
            "statistics": {
                "viewCount": "1000000",
                "likeCount": "50000",
                "commentCount": "1234"
            }
        }))
        .unwrap();

        let metadata = map_video(item);
        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.description, "Official video");
        assert_eq!(metadata.tags, vec!["music", "80s"]);
        assert_eq!(metadata.views, "1000000");
        assert_eq!(metadata.likes, "50000");
        assert_eq!(metadata.comments, "1234");
        assert_eq!(metadata.duration, "3:33");
        assert_eq!(metadata.published, "October 25, 2009");
    }

    #[test]
    fn missing_statistics_become_na() {
        let item: VideoItem = serde_json::from_value(serde_json::json!({
            "snippet": {
                "title": "A quiet video",
                "publishedAt": "2020-01-01T00:00:00Z"
            },
            "contentDetails": { "duration": "PT10M" },
            "statistics": { "viewCount": "42" }
        }))
        .unwrap();

        let metadata = map_video(item);
        assert_eq!(metadata.views, "42");
        assert_eq!(metadata.likes, "N/A");
        assert_eq!(metadata.comments, "N/A");
        assert_eq!(metadata.description, "No description");
        assert!(metadata.tags.is_empty());
    }

    #[rocket::async_test]
    async fn empty_items_is_a_not_found_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Regex("^/videos".to_string()))
            .match_query(Matcher::UrlEncoded("id".into(), "abc123".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url(server.url());
        let outcome = client.fetch_video(&credentials(), "abc123").await.unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Message("No video found with ID: abc123".to_string())
        );
    }

    #[rocket::async_test]
    async fn bearer_token_is_sent_and_item_is_mapped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/videos".to_string()))
            .match_header("authorization", "Bearer ya29.test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [{
                    "snippet": {"title": "Hit", "publishedAt": "2021-06-01T12:00:00Z"},
                    "contentDetails": {"duration": "PT1H0M5S"},
                    "statistics": {"viewCount": "7"}
                }]}"#,
            )
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url(server.url());
        let outcome = client.fetch_video(&credentials(), "xyz").await.unwrap();
        mock.assert_async().await;

        match outcome {
            FetchOutcome::Metadata(metadata) => {
                assert_eq!(metadata.title, "Hit");
                assert_eq!(metadata.duration, "1:00:05");
                assert_eq!(metadata.views, "7");
            }
            other => panic!("expected metadata, got {other:?}"),
        }
    }

    #[rocket::async_test]
    async fn authorization_failure_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Regex("^/videos".to_string()))
            .with_status(401)
            .with_body(r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#)
            .create_async()
            .await;

        let client = YouTubeClient::with_base_url(server.url());
        match client.fetch_video(&credentials(), "abc123").await {
            Err(FetchError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("Invalid Credentials"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[rocket::async_test]
    async fn unreachable_service_is_a_transport_error() {
        let client = YouTubeClient::with_base_url("http://127.0.0.1:1");
        assert!(matches!(
            client.fetch_video(&credentials(), "abc123").await,
            Err(FetchError::Transport(_))
        ));
    }
}
