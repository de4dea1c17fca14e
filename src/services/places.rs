use crate::core::feed::order_by_distance;
use crate::models::{Candidate, Coordinates, PriceTier};
use crate::services::cache::{CacheKey, CacheManager};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when fetching candidates
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No places found near this location")]
    EmptyResult,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("API returned error: {0}")]
    Api(String),
}

impl FeedError {
    /// Short machine-readable classification for clients
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Network(_) => "network",
            FeedError::EmptyResult => "empty_result",
            FeedError::PermissionDenied(_) => "permission_denied",
            FeedError::InvalidResponse(_) | FeedError::Api(_) => "upstream",
        }
    }
}

/// Source of nearby candidates, ordered nearest-first
#[async_trait]
pub trait CandidateFeed: Send + Sync {
    async fn fetch(&self, location: Coordinates) -> Result<Vec<Candidate>, FeedError>;
}

/// Place types too generic to describe a cuisine
const GENERIC_PLACE_TYPES: &[&str] = &[
    "restaurant",
    "food",
    "point_of_interest",
    "establishment",
    "store",
    "meal_takeaway",
    "meal_delivery",
];

const MAPS_PLACE_URL: &str = "https://www.google.com/maps/place/?q=place_id:";

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: String,
    name: String,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    geometry: Geometry,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u32>,
    #[serde(default)]
    price_level: Option<i64>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}

/// Places nearby-search client
///
/// Fetches restaurants around a location and normalizes them into
/// distance-ordered candidates.
pub struct PlacesClient {
    endpoint: String,
    api_key: String,
    radius_m: u32,
    photo_max_width: u32,
    client: Client,
}

impl PlacesClient {
    pub fn new(
        endpoint: String,
        api_key: String,
        radius_m: u32,
        photo_max_width: u32,
        timeout_secs: u64,
    ) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            radius_m,
            photo_max_width,
            client,
        })
    }

    fn search_url(&self, location: &Coordinates) -> String {
        format!(
            "{}/nearbysearch/json?location={},{}&radius={}&type=restaurant&key={}",
            self.endpoint,
            location.latitude,
            location.longitude,
            self.radius_m,
            urlencoding::encode(&self.api_key)
        )
    }

    fn photo_url(&self, reference: &str) -> String {
        format!(
            "{}/photo?maxwidth={}&photo_reference={}&key={}",
            self.endpoint,
            self.photo_max_width,
            urlencoding::encode(reference),
            urlencoding::encode(&self.api_key)
        )
    }

    fn to_candidate(&self, place: PlaceResult) -> Candidate {
        let cuisine = place
            .types
            .iter()
            .find(|t| !GENERIC_PLACE_TYPES.contains(&t.as_str()))
            .cloned();
        let image_link = place
            .photos
            .first()
            .map(|p| self.photo_url(&p.photo_reference))
            .unwrap_or_default();

        Candidate {
            maps_link: format!("{}{}", MAPS_PLACE_URL, urlencoding::encode(&place.place_id)),
            id: place.place_id,
            name: place.name,
            address: place.vicinity.or(place.formatted_address).unwrap_or_default(),
            coordinates: Coordinates::new(place.geometry.location.lat, place.geometry.location.lng),
            rating: place.rating.map(|r| r.clamp(0.0, 5.0)),
            review_count: place.user_ratings_total,
            price_tier: Some(PriceTier::from_level(place.price_level)),
            cuisine,
            distance_from_user: None,
            image_link,
        }
    }
}

#[async_trait]
impl CandidateFeed for PlacesClient {
    async fn fetch(&self, location: Coordinates) -> Result<Vec<Candidate>, FeedError> {
        tracing::debug!(
            "Fetching places near {:.4},{:.4} (radius {}m)",
            location.latitude,
            location.longitude,
            self.radius_m
        );

        let response = self.client.get(self.search_url(&location)).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::Api(format!(
                "Nearby search failed: {}",
                response.status()
            )));
        }

        let body: NearbySearchResponse = response
            .json()
            .await
            .map_err(|e| FeedError::InvalidResponse(e.to_string()))?;

        let detail = || body.error_message.clone().unwrap_or_else(|| body.status.clone());
        match body.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Err(FeedError::EmptyResult),
            "REQUEST_DENIED" | "OVER_QUERY_LIMIT" => return Err(FeedError::PermissionDenied(detail())),
            _ => return Err(FeedError::Api(detail())),
        }

        let candidates: Vec<Candidate> = body
            .results
            .into_iter()
            .map(|place| self.to_candidate(place))
            .collect();
        if candidates.is_empty() {
            return Err(FeedError::EmptyResult);
        }

        let ordered = order_by_distance(&location, candidates);
        tracing::info!("Fetched {} candidates", ordered.len());
        Ok(ordered)
    }
}

/// Feed decorator that caches successful responses per location bucket
///
/// Cache failures are logged and fall through to the inner feed.
pub struct CachedFeed {
    inner: Arc<dyn CandidateFeed>,
    cache: Arc<CacheManager>,
    precision: u32,
}

impl CachedFeed {
    pub fn new(inner: Arc<dyn CandidateFeed>, cache: Arc<CacheManager>, precision: u32) -> Self {
        Self {
            inner,
            cache,
            precision,
        }
    }
}

#[async_trait]
impl CandidateFeed for CachedFeed {
    async fn fetch(&self, location: Coordinates) -> Result<Vec<Candidate>, FeedError> {
        let key = CacheKey::feed(&location, self.precision);

        match self.cache.get::<Vec<Candidate>>(&key).await {
            // distances are relative to the bucket's first fix; recompute for this one
            Ok(cached) => return Ok(order_by_distance(&location, cached)),
            Err(crate::services::cache::CacheError::CacheMiss(_)) => {}
            Err(e) => tracing::warn!("Feed cache read failed for {}: {}", key, e),
        }

        let candidates = self.inner.fetch(location).await?;
        if let Err(e) = self.cache.set(&key, &candidates).await {
            tracing::warn!("Feed cache write failed for {}: {}", key, e);
        }
        Ok(candidates)
    }
}
