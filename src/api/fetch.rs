use crate::models::{ApiError, FetchEnvelope, FetchRequest};
use crate::AppState;
use log::{error, info};
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{get, post, State};

#[get("/")]
pub fn home() -> RawHtml<&'static str> {
    RawHtml(include_str!("../../static/index.html"))
}

/// Look up one video: load credentials, make the single API round trip, and
/// wrap whatever comes back. "No video found" rides in the success envelope;
/// credential and transport failures become error payloads.
#[post("/fetch", data = "<request>")]
pub async fn fetch_metadata(
    state: &State<AppState>,
    request: Json<FetchRequest>,
) -> Result<Json<FetchEnvelope>, ApiError> {
    let video_id = match request.video_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ApiError::bad_request("No Video ID provided")),
    };

    let credentials = state.credentials.ensure_loaded().await.map_err(|e| {
        error!("Credentials unavailable: {e}");
        ApiError::internal(e.to_string())
    })?;

    match state.youtube.fetch_video(&credentials, video_id).await {
        Ok(outcome) => {
            info!("Fetched metadata for video {video_id}");
            Ok(Json(FetchEnvelope { result: outcome }))
        }
        Err(e) => {
            error!("Metadata fetch failed for video {video_id}: {e}");
            Err(ApiError::internal(e.to_string()))
        }
    }
}
