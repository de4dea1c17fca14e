use crate::core::distance::distance_between;
use crate::models::{Candidate, Coordinates};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Prepare a raw feed response for the card stack
///
/// Stages:
/// 1. Drop repeated ids (first occurrence wins)
/// 2. Annotate each candidate with its haversine distance from `origin`
/// 3. Stable sort ascending by distance, non-finite distances last
pub fn order_by_distance(origin: &Coordinates, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::with_capacity(candidates.len());

    let mut ordered: Vec<Candidate> = candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.id.clone()))
        .map(|candidate| {
            let distance_km = distance_between(origin, &candidate.coordinates);
            candidate.with_distance(distance_km)
        })
        .collect();

    ordered.sort_by(|a, b| compare_distance(a.distance_from_user, b.distance_from_user));
    ordered
}

/// Ascending order with missing or NaN distances after every finite value
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    let key = |d: Option<f64>| d.filter(|v| !v.is_nan());
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
