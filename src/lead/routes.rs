//! REST endpoints for the lead-capture form.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::client::LeadSink;
use super::form::LeadForm;
use super::validator::{format_phone_number, validate_full_name};
use crate::error::SubmitError;

/// Shared state for lead routes.
#[derive(Clone)]
pub struct LeadRouteState {
    pub sink: Arc<dyn LeadSink>,
    pub follow_up_url: String,
}

#[derive(Debug, Deserialize)]
struct NameRequest {
    name: String,
}

#[derive(Debug, Serialize)]
struct NameResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhoneRequest {
    phone: String,
}

#[derive(Debug, Serialize)]
struct PhoneResponse {
    formatted: String,
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    name: String,
    email: String,
    phone: String,
    #[serde(default)]
    consent: bool,
}

/// POST /api/lead/name
async fn check_name(Json(body): Json<NameRequest>) -> impl IntoResponse {
    let response = match validate_full_name(&body.name) {
        Ok(()) => NameResponse {
            valid: true,
            message: None,
        },
        Err(e) => NameResponse {
            valid: false,
            message: Some(e.to_string()),
        },
    };
    Json(response)
}

/// POST /api/lead/phone
async fn format_phone(Json(body): Json<PhoneRequest>) -> impl IntoResponse {
    Json(PhoneResponse {
        formatted: format_phone_number(&body.phone),
    })
}

/// POST /api/lead
///
/// Runs the same checks as the form: 422 for name, consent or blank
/// contact fields, 502 when the lead endpoint fails.
async fn submit_lead(
    State(state): State<LeadRouteState>,
    Json(body): Json<SubmitRequest>,
) -> Response {
    let mut form = LeadForm::new();
    form.set_name(body.name);
    form.set_email(body.email);
    form.set_phone(&body.phone);
    form.set_consent(body.consent);

    match form.submit(state.sink.as_ref(), &state.follow_up_url).await {
        Ok(submitted) => Json(submitted).into_response(),
        Err(e) => {
            let status = match e {
                SubmitError::Validation(_)
                | SubmitError::ConsentRequired
                | SubmitError::Incomplete => StatusCode::UNPROCESSABLE_ENTITY,
                SubmitError::Submission(_) => StatusCode::BAD_GATEWAY,
            };
            (status, Json(serde_json::json!({"error": e.user_message()}))).into_response()
        }
    }
}

/// Build the lead routes.
pub fn lead_routes(state: LeadRouteState) -> Router {
    Router::new()
        .route("/api/lead", post(submit_lead))
        .route("/api/lead/name", post(check_name))
        .route("/api/lead/phone", post(format_phone))
        .with_state(state)
}
