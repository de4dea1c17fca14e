//! BiteSwipe - swipe-deck engine for nearby restaurant discovery
//!
//! The core is a single-writer engine that turns drag gestures into
//! left/right decisions over a stack of restaurant candidates, commits each
//! decision only when its animation reports completion, and keeps an undo
//! history in step with the user's saved list.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    distance::haversine_distance, order_by_distance, AnimationRequest, Completion, DeckError, InMemorySavedList,
    Offset, SavedListProjection, SwipeConfig, SwipeEngine, TransitionId,
};
pub use models::{Candidate, Coordinates, DecisionRecord, Direction, PriceTier};
