use crate::core::gesture::Offset;
use crate::models::domain::{Coordinates, Direction};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to open a deck at the user's location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDeckRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl CreateDeckRequest {
    pub fn location(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Request to refill a deck from a new location fix
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReloadDeckRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl ReloadDeckRequest {
    pub fn location(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Drag sample or release position
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OffsetRequest {
    pub dx: f64,
    pub dy: f64,
}

impl OffsetRequest {
    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }
}

impl From<OffsetRequest> for Offset {
    fn from(value: OffsetRequest) -> Self {
        Offset::new(value.dx, value.dy)
    }
}

/// Button-driven swipe in an explicit direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwipeRequest {
    pub direction: Direction,
}
