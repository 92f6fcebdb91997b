//! Server-Sent Events (SSE) for live feed updates.
//!
//! One stream per feed scope. Clients merge the stream into the page
//! they already fetched; duplicated items are dropped client-side by ID.

#![allow(missing_docs)]

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use campus_common::AppResult;
use campus_core::{FeedItem, FeedScope};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::{extractors::AuthUser, middleware::AppState};

/// SSE event types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedStreamEvent {
    /// New post on the subscribed feed.
    Post(FeedItem),
    /// Connection established.
    Connected,
}

/// Feed stream parameters.
#[derive(Debug, Deserialize)]
pub struct FeedStreamParams {
    /// Club or major code; absent for the campus feed.
    pub scope: Option<String>,
}

/// Live feed stream for one scope.
async fn feed_stream(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FeedStreamParams>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let scope = FeedScope::parse(params.scope.as_deref());

    if let FeedScope::Scoped(ref code) = scope {
        state.post_service.ensure_scope_access(&user, code).await?;
    }

    let rx = state.feed_broadcaster.receiver(scope).await;

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        result.ok().map(|item| {
            Ok(Event::default()
                .json_data(&FeedStreamEvent::Post(item))
                .unwrap_or_else(|_| Event::default().data("error")))
        })
    });

    // Add initial connected event
    let initial = stream::once(async {
        Ok(Event::default()
            .json_data(&FeedStreamEvent::Connected)
            .unwrap_or_else(|_| Event::default().data("connected")))
    });

    Ok(Sse::new(initial.chain(stream)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    ))
}

/// Create SSE router.
pub fn router() -> Router<AppState> {
    Router::new().route("/feed", get(feed_stream))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_post_event_serialization() {
        let event = FeedStreamEvent::Post(FeedItem {
            id: "p1".to_string(),
            author_id: "u1".to_string(),
            body: "Hello".to_string(),
            scope: None,
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"post\""));
        assert!(json.contains("\"id\":\"p1\""));
    }

    #[test]
    fn test_connected_event_serialization() {
        let json = serde_json::to_string(&FeedStreamEvent::Connected).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
    }
}
