//! REST + WebSocket endpoints for the chat simulator.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        ws::{Message as WsFrame, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::engine::DialogueEngine;
use super::model::{DialogueEvent, Selection, Snapshot};
use super::sessions::ChatSessions;

/// Shared state for chat routes.
#[derive(Clone)]
pub struct ChatRouteState {
    pub sessions: Arc<ChatSessions>,
}

/// Frame from a WebSocket client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame {
    Select { label: String },
}

/// Frame sent to a WebSocket client.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ServerFrame {
    Snapshot(SnapshotFrame),
    Event(DialogueEvent),
    Selection(SelectionFrame),
}

#[derive(Debug, Serialize)]
struct SnapshotFrame {
    r#type: &'static str,
    #[serde(flatten)]
    snapshot: Snapshot,
}

#[derive(Debug, Serialize)]
struct SelectionFrame {
    r#type: &'static str,
    #[serde(flatten)]
    selection: Selection,
}

#[derive(Debug, Serialize)]
struct SessionCreated {
    id: Uuid,
    #[serde(flatten)]
    snapshot: Snapshot,
}

#[derive(Debug, Deserialize)]
struct SelectRequest {
    label: String,
}

fn session_not_found(id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": format!("Chat session {id} not found")})),
    )
        .into_response()
}

/// POST /api/chat/sessions
async fn create_session(State(state): State<ChatRouteState>) -> impl IntoResponse {
    let (id, engine) = state.sessions.create().await;
    let snapshot = engine.snapshot().await;
    (StatusCode::CREATED, Json(SessionCreated { id, snapshot }))
}

/// GET /api/chat/sessions/{id}
async fn get_session(
    State(state): State<ChatRouteState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.sessions.get(id).await {
        Some(engine) => Json(engine.snapshot().await).into_response(),
        None => session_not_found(id),
    }
}

/// POST /api/chat/sessions/{id}/select
async fn select_option(
    State(state): State<ChatRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SelectRequest>,
) -> impl IntoResponse {
    match state.sessions.get(id).await {
        Some(engine) => Json(engine.select_option(&body.label).await).into_response(),
        None => session_not_found(id),
    }
}

/// GET /ws/chat/{id}
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<ChatRouteState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.sessions.get(id).await {
        Some(engine) => {
            info!(session_id = %id, "Chat WebSocket client connecting");
            let sessions = Arc::clone(&state.sessions);
            ws.on_upgrade(move |socket| handle_socket(socket, engine, sessions, id))
        }
        None => session_not_found(id),
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &ServerFrame) -> bool {
    match serde_json::to_string(frame) {
        Ok(json) => socket.send(WsFrame::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!("Failed to serialize chat frame: {}", e);
            true
        }
    }
}

async fn send_snapshot(socket: &mut WebSocket, engine: &DialogueEngine) -> bool {
    let frame = ServerFrame::Snapshot(SnapshotFrame {
        r#type: "snapshot",
        snapshot: engine.snapshot().await,
    });
    send_frame(socket, &frame).await
}

async fn handle_socket(
    mut socket: WebSocket,
    engine: Arc<DialogueEngine>,
    sessions: Arc<ChatSessions>,
    id: Uuid,
) {
    // Subscribe before the snapshot so no event falls in between.
    let mut rx = engine.subscribe();

    if !send_snapshot(&mut socket, &engine).await {
        warn!("Failed to send initial snapshot, client disconnected");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if !send_frame(&mut socket, &ServerFrame::Event(event)).await {
                            debug!("Client disconnected during send");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!(missed = n, "Chat WS client lagged behind broadcast");
                        if !send_snapshot(&mut socket, &engine).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("Dialogue broadcast closed");
                        break;
                    }
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(WsFrame::Text(text))) => {
                        match serde_json::from_str::<ClientFrame>(&text) {
                            Ok(ClientFrame::Select { label }) => {
                                // Counts as activity, same as a REST call.
                                sessions.touch(id).await;
                                let selection = engine.select_option(&label).await;
                                let frame = ServerFrame::Selection(SelectionFrame {
                                    r#type: "selection",
                                    selection,
                                });
                                if !send_frame(&mut socket, &frame).await {
                                    break;
                                }
                            }
                            Err(e) => debug!("Ignoring malformed chat frame: {}", e),
                        }
                    }
                    Some(Ok(WsFrame::Ping(data))) => {
                        if socket.send(WsFrame::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(WsFrame::Close(_))) | None => {
                        info!("Chat WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Chat WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

/// Build the chat routes.
pub fn chat_routes(state: ChatRouteState) -> Router {
    Router::new()
        .route("/api/chat/sessions", post(create_session))
        .route("/api/chat/sessions/{id}", get(get_session))
        .route("/api/chat/sessions/{id}/select", post(select_option))
        .route("/ws/chat/{id}", get(ws_handler))
        .with_state(state)
}
