//! Proximity and recency queries.

use safety_map_geo::{GeoPoint, bounds_for_radius, haversine_km};
use safety_map_report_models::SafetyReport;
use safety_map_store::ReportStore;

use crate::ReportError;

/// Search radius used when the caller doesn't specify one, in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Cap on candidates pulled from one prefix range scan.
pub const NEARBY_QUERY_LIMIT: usize = 100;

/// Number of reports a recency query returns by default.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Finds reports within `radius_km` of `center` (50 km when `None`).
///
/// Scans the store over the geohash prefix window for the radius, then
/// keeps only candidates whose exact haversine distance is within the
/// radius. Survivors stay in store order (geohash ascending, newest first
/// within a geohash). An empty result is valid and distinct from a failed
/// query, which surfaces whole with no partial candidate list.
///
/// # Errors
///
/// Returns [`ReportError::Store`] if the range scan fails.
pub async fn nearby_reports(
    store: &dyn ReportStore,
    center: GeoPoint,
    radius_km: Option<f64>,
) -> Result<Vec<SafetyReport>, ReportError> {
    let radius_km = radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    let range = bounds_for_radius(center, radius_km);
    log::debug!(
        "nearby search at ({}, {}) radius {radius_km} km: window [{}, {}] precision {}",
        center.latitude(),
        center.longitude(),
        range.lower,
        range.upper,
        range.precision
    );

    let candidates = store
        .range_query(&range.lower, &range.upper, NEARBY_QUERY_LIMIT)
        .await?;
    let candidate_count = candidates.len();

    let reports: Vec<SafetyReport> = candidates
        .into_iter()
        .filter(|report| haversine_km(center, report.location) <= radius_km)
        .collect();

    log::debug!(
        "nearby search kept {} of {candidate_count} candidates",
        reports.len()
    );
    Ok(reports)
}

/// Returns the most recently created reports, newest first.
///
/// # Errors
///
/// Returns [`ReportError::Store`] if the query fails.
pub async fn recent_reports(
    store: &dyn ReportStore,
    limit: Option<usize>,
) -> Result<Vec<SafetyReport>, ReportError> {
    let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Ok(store.recent(limit).await?)
}
