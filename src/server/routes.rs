//! HTTP handlers
//!
//! POST /find_path           - start a search
//! GET  /get_results/:id     - non-blocking, consume-once result poll
//! POST /abort_search        - abort one search (`{search_id}`) or all
//! GET  /logs                - diagnostic log lines as server-sent events

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use uuid::Uuid;

use crate::events::LogEvent;
use crate::search::SearchReport;
use crate::server::AppState;
use crate::session::{PollResult, RawSearchRequest, SessionState};

/// Body of a finished result
#[derive(Serialize)]
struct ResultBody<'a> {
    #[serde(flatten)]
    report: SearchReport<'a>,
    state: SessionState,
}

#[derive(Debug, Default, Deserialize)]
pub struct AbortRequest {
    #[serde(default)]
    search_id: Option<Uuid>,
}

/// Starts a search session
///
/// A missing or unparsable body is treated like one without pages.
pub async fn find_path(
    State(state): State<AppState>,
    body: Option<Json<RawSearchRequest>>,
) -> (StatusCode, Json<Value>) {
    let raw = body.map(|Json(raw)| raw).unwrap_or_default();

    match state.registry.submit(&raw) {
        Ok(search_id) => (
            StatusCode::ACCEPTED,
            Json(json!({ "message": "Search started", "search_id": search_id })),
        ),
        Err(e) => {
            tracing::debug!("Rejected search request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": e.to_string() })),
            )
        }
    }
}

/// Returns a finished result once, 202 while running, 404 otherwise
pub async fn get_results(
    State(state): State<AppState>,
    Path(search_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let poll = match Uuid::parse_str(&search_id) {
        Ok(id) => state.registry.poll(&id),
        Err(_) => PollResult::NotFound,
    };

    match poll {
        PollResult::Ready { state, result } => {
            let body = ResultBody {
                report: result.report(),
                state,
            };
            match serde_json::to_value(&body) {
                Ok(value) => (StatusCode::OK, Json(value)),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": format!("Failed to encode result: {}", e) })),
                ),
            }
        }
        PollResult::Pending(session_state) => (
            StatusCode::ACCEPTED,
            Json(json!({ "message": "Search is still running", "state": session_state })),
        ),
        PollResult::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Search results not ready or not found." })),
        ),
    }
}

/// Aborts one session, or every running session when no id is given
pub async fn abort_search(
    State(state): State<AppState>,
    body: Option<Json<AbortRequest>>,
) -> (StatusCode, Json<Value>) {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    match request.search_id {
        Some(id) => match state.registry.abort(Some(&id)) {
            0 => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("No running search with id {}", id) })),
            ),
            aborted => (
                StatusCode::OK,
                Json(json!({ "message": "Search abort initiated", "aborted": aborted })),
            ),
        },
        None => {
            let aborted = state.registry.abort(None);
            (
                StatusCode::OK,
                Json(json!({ "message": "Search abort initiated", "aborted": aborted })),
            )
        }
    }
}

/// Streams the recent backlog followed by live log lines
pub async fn logs(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (backlog, rx) = state.registry.events().subscribe();

    let live = BroadcastStream::new(rx).filter_map(|item| async move {
        match item {
            Ok(event) => Some(Ok(to_sse(&event))),
            Err(BroadcastStreamRecvError::Lagged(missed)) => Some(Ok(Event::default()
                .event("lagged")
                .data(missed.to_string()))),
        }
    });

    let stream = stream::iter(backlog.into_iter().map(|event| Ok(to_sse(&event)))).chain(live);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse(event: &LogEvent) -> Event {
    Event::default()
        .id(event.seq.to_string())
        .data(event.message.replace('\n', " "))
}
