use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::io::Cursor;

/// Body of `POST /fetch`. The field is optional so the handler can answer
/// with its own error payload instead of a framework-level parse failure.
#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub views: String,
    pub likes: String,
    pub comments: String,
    pub duration: String,
    pub published: String,
}

/// Exactly one of a metadata record or a plain message ("no video found").
/// Both are normal outcomes and serialize directly into the envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FetchOutcome {
    Metadata(VideoMetadata),
    Message(String),
}

#[derive(Debug, Serialize)]
pub struct FetchEnvelope {
    pub result: FetchOutcome,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: Status,
    pub error: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: Status::BadRequest,
            error: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: Status::InternalServerError,
            error: message.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).unwrap();
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_untagged() {
        let message = FetchOutcome::Message("No video found with ID: abc123".to_string());
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!("No video found with ID: abc123")
        );

        let metadata = FetchOutcome::Metadata(VideoMetadata {
            title: "A title".to_string(),
            ..Default::default()
        });
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["title"], "A title");
        assert!(value.get("Metadata").is_none());
    }

    #[test]
    fn envelope_wraps_result() {
        let envelope = FetchEnvelope {
            result: FetchOutcome::Message("hello".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            serde_json::json!({ "result": "hello" })
        );
    }
}
