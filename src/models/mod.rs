// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Candidate, Coordinates, DecisionRecord, Direction, PriceTier, SavedPlace};
pub use requests::{CreateDeckRequest, OffsetRequest, ReloadDeckRequest, SwipeRequest};
pub use responses::{ActionResponse, CreateDeckResponse, ErrorResponse, HealthResponse, SavedListResponse};
