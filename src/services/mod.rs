// Service exports
pub mod cache;
pub mod places;
pub mod saved;
pub mod sessions;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use places::{CachedFeed, CandidateFeed, FeedError, PlacesClient};
pub use saved::{MemorySavedListStore, PostgresSavedList, SavedListError, SavedListStore, StoreProjection};
pub use sessions::{DeckSession, RefreshError, SessionRegistry, SharedSession};
