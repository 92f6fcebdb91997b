//! Realtime feed bridge.
//!
//! Routes newly created posts to live subscribers, partitioned by feed
//! scope. Delivery is fire-and-forget over in-process broadcast
//! channels: a subscriber that lags past the channel capacity misses
//! items rather than stalling the publisher, and catches up through the
//! regular paginated feed endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use campus_common::AppResult;
use campus_db::entities::post;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

/// Buffered items per scope channel before laggards start missing.
const FEED_CHANNEL_CAPACITY: usize = 256;

/// Maximum items retained by a client-side feed cache.
const FEED_CACHE_CAPACITY: usize = 200;

/// The feed partition a post belongs to or a client listens on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedScope {
    /// The campus-wide feed.
    Campus,
    /// A club or major feed, keyed by its code.
    Scoped(String),
}

impl FeedScope {
    /// Scope of a stored post. A null scope column means campus-wide.
    #[must_use]
    pub fn of_post(post: &post::Model) -> Self {
        post.scope.clone().map_or(Self::Campus, Self::Scoped)
    }

    /// Parse a client-supplied scope parameter.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Self::Campus,
            Some(code) => Self::Scoped(code.to_string()),
        }
    }
}

/// A feed item as delivered to live subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    /// Post ID.
    pub id: String,
    /// Author user ID.
    pub author_id: String,
    /// Post body.
    pub body: String,
    /// Scope code; `None` means campus-wide.
    pub scope: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl FeedItem {
    /// Build a feed item from a stored post.
    #[must_use]
    pub fn from_post(post: &post::Model) -> Self {
        Self {
            id: post.id.clone(),
            author_id: post.author_id.clone(),
            body: post.body.clone(),
            scope: post.scope.clone(),
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Trait for pushing new feed items to live subscribers.
///
/// Core services publish through this seam so they do not depend on
/// the transport carrying the items.
#[async_trait]
pub trait FeedPublisher: Send + Sync {
    /// Deliver a new item to subscribers of its scope.
    async fn publish(&self, item: FeedItem) -> AppResult<()>;
}

/// A no-op implementation for tests or when realtime delivery is disabled.
#[derive(Clone, Default)]
pub struct NoOpFeedPublisher;

#[async_trait]
impl FeedPublisher for NoOpFeedPublisher {
    async fn publish(&self, _item: FeedItem) -> AppResult<()> {
        Ok(())
    }
}

/// In-process feed fan-out, one broadcast channel per scope.
///
/// Items are routed to the channel matching their scope exactly; a
/// campus subscriber never receives club items and vice versa.
#[derive(Clone)]
pub struct FeedBroadcaster {
    channels: Arc<RwLock<HashMap<FeedScope, broadcast::Sender<FeedItem>>>>,
}

impl FeedBroadcaster {
    /// Create a new broadcaster with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to a scope, creating its channel if needed.
    pub async fn subscribe(&self, scope: FeedScope) -> FeedSubscription {
        let mut channels = self.channels.write().await;

        let sender = channels
            .entry(scope.clone())
            .or_insert_with(|| broadcast::channel(FEED_CHANNEL_CAPACITY).0);

        FeedSubscription {
            scope,
            receiver: Some(sender.subscribe()),
        }
    }

    /// Raw broadcast receiver for a scope, for stream adapters.
    pub async fn receiver(&self, scope: FeedScope) -> broadcast::Receiver<FeedItem> {
        let mut channels = self.channels.write().await;

        channels
            .entry(scope)
            .or_insert_with(|| broadcast::channel(FEED_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drop scope channels that no longer have subscribers.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Number of live subscribers on a scope.
    pub async fn subscriber_count(&self, scope: &FeedScope) -> usize {
        let channels = self.channels.read().await;
        channels.get(scope).map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for FeedBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedPublisher for FeedBroadcaster {
    async fn publish(&self, item: FeedItem) -> AppResult<()> {
        let scope = item.scope.clone().map_or(FeedScope::Campus, FeedScope::Scoped);

        let channels = self.channels.read().await;
        if let Some(sender) = channels.get(&scope) {
            // Send fails only when no receivers remain; that is fine
            let _ = sender.send(item);
        }

        Ok(())
    }
}

/// A live subscription to one feed scope.
pub struct FeedSubscription {
    scope: FeedScope,
    receiver: Option<broadcast::Receiver<FeedItem>>,
}

impl FeedSubscription {
    /// The scope this subscription listens on.
    #[must_use]
    pub const fn scope(&self) -> &FeedScope {
        &self.scope
    }

    /// Receive the next item, or `None` once unsubscribed or the
    /// channel is gone.
    pub async fn recv(&mut self) -> Option<FeedItem> {
        let receiver = self.receiver.as_mut()?;

        loop {
            match receiver.recv().await {
                Ok(item) => return Some(item),
                // Lagged: skip ahead, clients backfill via pagination
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the raw receiver for stream adapters.
    pub fn into_receiver(mut self) -> Option<broadcast::Receiver<FeedItem>> {
        self.receiver.take()
    }

    /// Stop receiving. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        self.receiver = None;
    }
}

/// An ordered, bounded, deduplicated view of one feed.
///
/// Mirrors what a connected client holds: an initial page from the
/// paginated endpoint merged with live inserts. Items arriving twice,
/// e.g. present in the initial page and replayed by the live stream,
/// collapse to one entry.
#[derive(Debug, Default)]
pub struct FeedCache {
    items: Vec<FeedItem>,
}

impl FeedCache {
    /// Create an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Merge an initial page into the cache, keeping the first copy of
    /// any item that is already present.
    pub fn merge_initial(&mut self, initial: Vec<FeedItem>) {
        for item in initial {
            if !self.contains(&item.id) {
                self.items.push(item);
            }
        }
        self.items.truncate(FEED_CACHE_CAPACITY);
    }

    /// Prepend a live item unless it is already present.
    pub fn insert(&mut self, item: FeedItem) {
        if self.contains(&item.id) {
            return;
        }

        self.items.insert(0, item);
        self.items.truncate(FEED_CACHE_CAPACITY);
    }

    /// Whether an item with this ID is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Current items, newest first.
    #[must_use]
    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    /// Number of items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, scope: Option<&str>) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            author_id: "u1".to_string(),
            body: "hello".to_string(),
            scope: scope.map(String::from),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn campus_subscriber_receives_campus_items() {
        let broadcaster = FeedBroadcaster::new();
        let mut sub = broadcaster.subscribe(FeedScope::Campus).await;

        broadcaster.publish(item("p1", None)).await.unwrap();

        let received = sub.recv().await.unwrap();
        assert_eq!(received.id, "p1");
    }

    #[tokio::test]
    async fn scoped_items_do_not_cross_scopes() {
        let broadcaster = FeedBroadcaster::new();
        let mut acm = broadcaster.subscribe(FeedScope::Scoped("ACM".to_string())).await;
        let _swe = broadcaster.subscribe(FeedScope::Scoped("SWE".to_string())).await;

        broadcaster.publish(item("p1", Some("SWE"))).await.unwrap();
        broadcaster.publish(item("p2", Some("ACM"))).await.unwrap();

        // The SWE item is never delivered to the ACM subscriber
        let received = acm.recv().await.unwrap();
        assert_eq!(received.id, "p2");
    }

    #[tokio::test]
    async fn campus_subscriber_does_not_receive_club_items() {
        let broadcaster = FeedBroadcaster::new();
        let mut campus = broadcaster.subscribe(FeedScope::Campus).await;
        let _acm = broadcaster.subscribe(FeedScope::Scoped("ACM".to_string())).await;

        broadcaster.publish(item("p1", Some("ACM"))).await.unwrap();
        broadcaster.publish(item("p2", None)).await.unwrap();

        let received = campus.recv().await.unwrap();
        assert_eq!(received.id, "p2");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let broadcaster = FeedBroadcaster::new();
        assert!(broadcaster.publish(item("p1", None)).await.is_ok());
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let broadcaster = FeedBroadcaster::new();
        let mut sub = broadcaster.subscribe(FeedScope::Campus).await;

        sub.unsubscribe();
        sub.unsubscribe();

        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn cleanup_drops_abandoned_channels() {
        let broadcaster = FeedBroadcaster::new();
        let mut sub = broadcaster.subscribe(FeedScope::Campus).await;
        sub.unsubscribe();
        drop(sub);

        broadcaster.cleanup().await;
        assert_eq!(broadcaster.subscriber_count(&FeedScope::Campus).await, 0);
    }

    #[test]
    fn scope_of_post_defaults_to_campus() {
        assert_eq!(FeedScope::parse(None), FeedScope::Campus);
        assert_eq!(FeedScope::parse(Some("")), FeedScope::Campus);
        assert_eq!(
            FeedScope::parse(Some("ACM")),
            FeedScope::Scoped("ACM".to_string())
        );
    }

    #[test]
    fn cache_insert_dedupes_by_id() {
        let mut cache = FeedCache::new();
        cache.merge_initial(vec![item("p2", None), item("p1", None)]);

        // Live replay of an item already in the initial page
        cache.insert(item("p2", None));
        assert_eq!(cache.len(), 2);

        cache.insert(item("p3", None));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.items()[0].id, "p3");
    }

    #[test]
    fn cache_merge_initial_dedupes() {
        let mut cache = FeedCache::new();
        cache.insert(item("p1", None));

        cache.merge_initial(vec![item("p1", None), item("p0", None)]);
        assert_eq!(cache.len(), 2);
    }
}
