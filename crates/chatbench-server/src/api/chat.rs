//! Completion relay handlers: `/trigger` runs a completion, `/events` streams
//! its text, `/abort` stops it.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::sse::{Event, KeepAlive, Sse},
};
use chatbench_models::CompletionRequest;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use super::{error::ApiError, state::AppState};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub message: String,
    pub chunks: usize,
    pub aborted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AbortResponse {
    pub message: String,
    pub aborted: bool,
}

/// Run one completion; answers once it has finished or been aborted.
pub async fn trigger(
    State(state): State<AppState>,
    payload: Result<Json<CompletionRequest>, JsonRejection>,
) -> Result<Json<TriggerResponse>, ApiError> {
    let Json(request) = payload?;
    let outcome = state.relay.run(request).await?;

    let message = if outcome.aborted {
        "Chat aborted"
    } else {
        "Chat completed"
    };
    Ok(Json(TriggerResponse {
        message: message.to_string(),
        chunks: outcome.chunks,
        aborted: outcome.aborted,
    }))
}

/// Push channel: every payload is a JSON string.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.relay.subscribe();
    tracing::debug!("Push channel subscriber connected");

    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(text) => Event::default().json_data(&text).ok().map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Push channel subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("ping"),
    )
}

pub async fn abort(State(state): State<AppState>) -> Json<AbortResponse> {
    let aborted = state.relay.abort();
    let message = if aborted {
        "Chat aborted"
    } else {
        "No chat running"
    };
    Json(AbortResponse {
        message: message.to_string(),
        aborted,
    })
}
