// Swipe-deck engine exports
pub mod distance;
pub mod engine;
pub mod error;
pub mod feed;
pub mod gesture;
pub mod history;
pub mod projection;
pub mod stack;

pub use distance::{distance_between, haversine_distance};
pub use engine::{Completion, DeckSnapshot, SwipeEngine};
pub use error::DeckError;
pub use feed::order_by_distance;
pub use gesture::{
    AnimationRequest, AnimationTiming, CardTransform, GesturePhase, Offset, SpringParams, SwipeConfig,
    TransitionId, TransitionKind,
};
pub use history::UndoHistory;
pub use projection::{InMemorySavedList, NoopProjection, SavedListProjection};
pub use stack::CardStack;
