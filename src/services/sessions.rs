use crate::core::gesture::SwipeConfig;
use crate::core::{DeckError, SavedListProjection, SwipeEngine};
use crate::models::Coordinates;
use crate::services::places::{CandidateFeed, FeedError};
use moka::notification::{ListenerFuture, RemovalCause};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// One user's swipe deck
#[derive(Debug)]
pub struct DeckSession {
    pub id: String,
    pub user_id: String,
    pub location: Option<Coordinates>,
    pub engine: SwipeEngine,
}

impl DeckSession {
    /// Fetch candidates for `location` and replace the deck
    ///
    /// Feed failures leave an empty deck and are returned for reporting.
    pub async fn refresh_with(
        &mut self,
        feed: &dyn CandidateFeed,
        location: Coordinates,
    ) -> Result<usize, RefreshError> {
        self.location = Some(location);

        let fetched = feed.fetch(location).await;
        let (candidates, feed_error) = match fetched {
            Ok(candidates) => (candidates, None),
            Err(e) => {
                tracing::warn!("Feed failed for session {}: {}", self.id, e);
                (Vec::new(), Some(e))
            }
        };

        let count = candidates.len();
        self.engine.load(candidates).map_err(RefreshError::Deck)?;

        match feed_error {
            Some(e) => Err(RefreshError::Feed(e)),
            None => Ok(count),
        }
    }
}

/// Why a deck refresh produced no candidates
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Candidate feed failed: {0}")]
    Feed(FeedError),

    #[error("Deck rejected candidates: {0}")]
    Deck(DeckError),
}

pub type SharedSession = Arc<Mutex<DeckSession>>;

/// Live deck sessions with idle expiry
///
/// Evicted or closed sessions have their engine torn down, so a completion
/// signal that arrives afterwards cannot mutate anything.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: moka::future::Cache<String, SharedSession>,
    config: SwipeConfig,
}

impl SessionRegistry {
    pub fn new(config: SwipeConfig, max_sessions: u64, idle_timeout_secs: u64) -> Self {
        let sessions = moka::future::Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(Duration::from_secs(idle_timeout_secs))
            .async_eviction_listener(
                |id: Arc<String>, session: SharedSession, cause: RemovalCause| -> ListenerFuture {
                    Box::pin(async move {
                        session.lock().await.engine.teardown();
                        tracing::debug!("Session {} removed ({:?})", id, cause);
                    })
                },
            )
            .build();

        Self { sessions, config }
    }

    /// Start a session with an empty deck
    pub async fn create(
        &self,
        user_id: &str,
        saved: Arc<dyn SavedListProjection>,
    ) -> Result<(String, SharedSession), DeckError> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(DeckSession {
            id: id.clone(),
            user_id: user_id.to_string(),
            location: None,
            engine: SwipeEngine::new(self.config, saved)?,
        }));

        self.sessions.insert(id.clone(), session.clone()).await;
        tracing::info!("Created session {} for {}", id, user_id);
        Ok((id, session))
    }

    pub async fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions.get(id).await
    }

    /// Close a session; returns whether it existed
    pub async fn close(&self, id: &str) -> bool {
        match self.sessions.remove(id).await {
            Some(session) => {
                session.lock().await.engine.teardown();
                tracing::info!("Closed session {}", id);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::InMemorySavedList;
    use crate::models::Candidate;
    use async_trait::async_trait;

    struct FixedFeed(Result<Vec<Candidate>, ()>);

    #[async_trait]
    impl CandidateFeed for FixedFeed {
        async fn fetch(&self, _location: Coordinates) -> Result<Vec<Candidate>, FeedError> {
            self.0.clone().map_err(|_| FeedError::EmptyResult)
        }
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::new(SwipeConfig::default(), 100, 60)
    }

    #[tokio::test]
    async fn test_create_and_refresh() {
        let registry = registry();
        let (id, session) = registry
            .create("user_1", Arc::new(InMemorySavedList::new()))
            .await
            .unwrap();

        let feed = FixedFeed(Ok(vec![
            Candidate::new("a", "A", Coordinates::new(0.0, 0.0)),
            Candidate::new("b", "B", Coordinates::new(0.0, 0.0)),
        ]));
        let count = session
            .lock()
            .await
            .refresh_with(&feed, Coordinates::new(0.0, 0.0))
            .await
            .unwrap();

        assert_eq!(count, 2);
        let found = registry.get(&id).await.unwrap();
        assert_eq!(found.lock().await.engine.stack_len(), 2);
    }

    #[tokio::test]
    async fn test_feed_failure_leaves_empty_deck() {
        let registry = registry();
        let (_, session) = registry
            .create("user_1", Arc::new(InMemorySavedList::new()))
            .await
            .unwrap();

        let mut guard = session.lock().await;
        guard
            .refresh_with(
                &FixedFeed(Ok(vec![Candidate::new("a", "A", Coordinates::new(0.0, 0.0))])),
                Coordinates::new(0.0, 0.0),
            )
            .await
            .unwrap();

        let result = guard
            .refresh_with(&FixedFeed(Err(())), Coordinates::new(1.0, 1.0))
            .await;
        assert!(matches!(result, Err(RefreshError::Feed(FeedError::EmptyResult))));
        assert_eq!(guard.engine.stack_len(), 0);
        assert!(guard.engine.request_discard().is_none());
    }

    #[tokio::test]
    async fn test_close_tears_down_engine() {
        let registry = registry();
        let (id, session) = registry
            .create("user_1", Arc::new(InMemorySavedList::new()))
            .await
            .unwrap();

        assert!(registry.close(&id).await);
        assert!(!registry.close(&id).await);
        assert!(registry.get(&id).await.is_none());
        assert!(!session.lock().await.engine.is_alive());
    }
}
