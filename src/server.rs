//! HTTP/WebSocket surface — assembles every route the landing page talks to.

use std::sync::Arc;

use axum::{Json, Router, response::IntoResponse, routing::get};
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::dialogue::{ChatRouteState, ChatSessions, chat_routes};
use crate::lead::{HttpLeadSink, LeadRouteState, LeadSink, lead_routes};
use crate::testimonials::{
    ContentClient, TestimonialRouteState, TestimonialStore, testimonial_routes,
};

/// Everything the routes share.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<ChatSessions>,
    pub lead_sink: Arc<dyn LeadSink>,
    pub follow_up_url: String,
    pub testimonials: Option<Arc<dyn TestimonialStore>>,
}

impl AppState {
    /// Wire the HTTP-backed collaborators from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let testimonials = config
            .testimonials_endpoint
            .as_ref()
            .map(|url| Arc::new(ContentClient::new(url.clone())) as Arc<dyn TestimonialStore>);

        Self {
            sessions: ChatSessions::new(config.typing, config.chat_url.clone()),
            lead_sink: Arc::new(HttpLeadSink::new(config.lead_endpoint.clone())),
            follow_up_url: config.follow_up_url.clone(),
            testimonials,
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "razblok"
    }))
}

/// Build the full router.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(chat_routes(ChatRouteState {
            sessions: state.sessions,
        }))
        .merge(lead_routes(LeadRouteState {
            sink: state.lead_sink,
            follow_up_url: state.follow_up_url,
        }))
        .merge(testimonial_routes(TestimonialRouteState {
            store: state.testimonials,
        }))
        .layer(CorsLayer::permissive())
}
