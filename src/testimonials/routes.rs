//! REST endpoints proxying the testimonial content endpoint.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Deserialize;

use super::client::TestimonialStore;
use super::gallery::Gallery;
use super::model::{TestimonialUpdate, VideoSource};
use crate::error::ContentError;

/// Shared state for testimonial routes. `store` is `None` when no content
/// endpoint is configured.
#[derive(Clone)]
pub struct TestimonialRouteState {
    pub store: Option<Arc<dyn TestimonialStore>>,
}

/// Edit body; the id comes from the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditRequest {
    #[serde(alias = "client_name")]
    client_name: String,
    description: String,
    #[serde(alias = "video_url")]
    video_url: String,
    #[serde(default, alias = "video_type")]
    video_type: VideoSource,
}

fn error_response(e: ContentError) -> Response {
    let status = match e {
        ContentError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        ContentError::NotFound { .. } => StatusCode::NOT_FOUND,
        ContentError::Transport(_) | ContentError::Status { .. } | ContentError::Decode(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(serde_json::json!({"error": e.to_string()}))).into_response()
}

fn store(state: &TestimonialRouteState) -> Result<&dyn TestimonialStore, ContentError> {
    state.store.as_deref().ok_or(ContentError::NotConfigured)
}

/// GET /api/testimonials
async fn list_testimonials(State(state): State<TestimonialRouteState>) -> Response {
    let store = match store(&state) {
        Ok(store) => store,
        Err(e) => return error_response(e),
    };
    match Gallery::load(store).await {
        Ok(gallery) => Json(gallery.cards()).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/testimonials/{id}
async fn update_testimonial(
    State(state): State<TestimonialRouteState>,
    Path(id): Path<i64>,
    Json(body): Json<EditRequest>,
) -> Response {
    let store = match store(&state) {
        Ok(store) => store,
        Err(e) => return error_response(e),
    };
    let update = TestimonialUpdate {
        id,
        client_name: body.client_name,
        description: body.description,
        video_url: body.video_url,
        video_type: body.video_type,
    };
    match store.update(&update).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}

/// Build the testimonial routes.
pub fn testimonial_routes(state: TestimonialRouteState) -> Router {
    Router::new()
        .route("/api/testimonials", get(list_testimonials))
        .route("/api/testimonials/{id}", put(update_testimonial))
        .with_state(state)
}
