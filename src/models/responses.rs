use crate::core::engine::DeckSnapshot;
use crate::core::gesture::{AnimationRequest, CardTransform};
use crate::models::domain::{DecisionRecord, SavedPlace};
use crate::services::cache::CacheStats;
use serde::{Deserialize, Serialize};

/// Response for a newly opened deck
#[derive(Debug, Clone, Serialize)]
pub struct CreateDeckResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub deck: DeckSnapshot,
    /// Set when the feed failed and the deck was left empty
    #[serde(rename = "feedError", skip_serializing_if = "Option::is_none")]
    pub feed_error: Option<String>,
}

/// Response for any deck action
///
/// `accepted` is false when a guard turned the action into a no-op.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<CardTransform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committed: Option<DecisionRecord>,
    pub deck: DeckSnapshot,
}

impl ActionResponse {
    pub fn new(accepted: bool, deck: DeckSnapshot) -> Self {
        Self {
            accepted,
            animation: None,
            transform: None,
            committed: None,
            deck,
        }
    }
}

/// Saved places for a user
#[derive(Debug, Clone, Serialize)]
pub struct SavedListResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub places: Vec<SavedPlace>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: u64,
    #[serde(rename = "savedStore")]
    pub saved_store: bool,
    pub cache: CacheStats,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}
