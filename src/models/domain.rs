use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Price bracket as reported by the places provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceTier {
    Free,
    #[serde(rename = "$")]
    Inexpensive,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Expensive,
    #[serde(rename = "$$$$")]
    VeryExpensive,
    Unknown,
}

impl PriceTier {
    /// Map a provider price level (0-4) onto a tier
    pub fn from_level(level: Option<i64>) -> Self {
        match level {
            Some(0) => PriceTier::Free,
            Some(1) => PriceTier::Inexpensive,
            Some(2) => PriceTier::Moderate,
            Some(3) => PriceTier::Expensive,
            Some(4) => PriceTier::VeryExpensive,
            _ => PriceTier::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceTier::Free => "Free",
            PriceTier::Inexpensive => "$",
            PriceTier::Moderate => "$$",
            PriceTier::Expensive => "$$$",
            PriceTier::VeryExpensive => "$$$$",
            PriceTier::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One restaurant card
///
/// Candidates are immutable once built; containers move them around whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(rename = "reviewCount", default)]
    pub review_count: Option<u32>,
    #[serde(rename = "priceTier", default)]
    pub price_tier: Option<PriceTier>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(rename = "distanceFromUser", default)]
    pub distance_from_user: Option<f64>,
    #[serde(rename = "mapsLink")]
    pub maps_link: String,
    #[serde(rename = "imageLink")]
    pub image_link: String,
}

impl Candidate {
    /// Minimal candidate with only identity, name and location set
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            coordinates,
            rating: None,
            review_count: None,
            price_tier: None,
            cuisine: None,
            distance_from_user: None,
            maps_link: String::new(),
            image_link: String::new(),
        }
    }

    /// Copy of this candidate annotated with its distance from the user
    pub fn with_distance(self, distance_km: f64) -> Self {
        Self {
            distance_from_user: Some(distance_km),
            ..self
        }
    }
}

/// Swipe direction; `Right` saves, `Left` discards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Direction selected by the sign of a horizontal displacement
    pub fn from_dx(dx: f64) -> Self {
        if dx.is_sign_negative() {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    /// +1.0 for right, -1.0 for left
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => f.write_str("left"),
            Direction::Right => f.write_str("right"),
        }
    }
}

/// A committed swipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub candidate: Candidate,
    pub direction: Direction,
}

/// A saved-list entry as persisted by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPlace {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub candidate: Candidate,
    #[serde(rename = "savedAt")]
    pub saved_at: chrono::DateTime<chrono::Utc>,
}
