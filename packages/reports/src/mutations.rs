//! Submission, voting, and deletion.

use safety_map_geo::{STORAGE_PRECISION, encode};
use safety_map_report_models::{NewReport, SafetyReport, VoteKind};
use safety_map_store::ReportStore;

use crate::ReportError;

/// Submits a new report.
///
/// Coordinates were validated when the caller constructed the submission's
/// [`GeoPoint`](safety_map_geo::GeoPoint); this path derives the stored
/// `geohash` at [`STORAGE_PRECISION`], which is the invariant the proximity
/// index relies on. The store assigns the id and creation timestamp.
///
/// # Errors
///
/// Returns [`ReportError::Store`] if the write fails.
pub async fn submit_report(
    store: &dyn ReportStore,
    report: NewReport,
) -> Result<SafetyReport, ReportError> {
    let geohash = encode(report.location, STORAGE_PRECISION);
    log::debug!(
        "submitting report at ({}, {}) geohash {geohash}",
        report.location.latitude(),
        report.location.longitude()
    );

    let stored = store.insert(report, geohash).await?;
    log::info!("report {} submitted", stored.id);
    Ok(stored)
}

/// Records one vote on a report via the store's atomic increment.
///
/// The counter mutation happens store-side so concurrent voters can't lose
/// updates; the displayed copy of an already-visible report is deliberately
/// not refreshed (membership changes, not content changes, drive entity
/// churn).
///
/// # Errors
///
/// Returns [`ReportError::NotFound`] if the report does not exist, or
/// [`ReportError::Store`] if the mutation fails.
pub async fn vote_on_report(
    store: &dyn ReportStore,
    id: &str,
    kind: VoteKind,
) -> Result<(), ReportError> {
    log::debug!("recording {kind} on report {id}");
    Ok(store.increment_vote(id, kind).await?)
}

/// Deletes a report, allowed only for its author.
///
/// # Errors
///
/// Returns [`ReportError::NotFound`] if the report does not exist,
/// [`ReportError::Unauthorized`] if `requester_id` is not the author, or
/// [`ReportError::Store`] if the store fails.
pub async fn delete_report(
    store: &dyn ReportStore,
    id: &str,
    requester_id: &str,
) -> Result<(), ReportError> {
    let report = store
        .get(id)
        .await?
        .ok_or_else(|| ReportError::NotFound { id: id.to_string() })?;

    if report.author_id != requester_id {
        log::warn!("user {requester_id} attempted to delete report {id} they don't own");
        return Err(ReportError::Unauthorized);
    }

    store.delete(id).await?;
    log::info!("report {id} deleted by its author");
    Ok(())
}

#[cfg(test)]
mod tests {
    use safety_map_geo::GeoPoint;
    use safety_map_report_models::SafetyLevel;
    use safety_map_store::memory::MemoryReportStore;

    use super::*;

    fn submission(author_id: &str) -> NewReport {
        NewReport::new(
            GeoPoint::new(40.7128, -74.006).unwrap(),
            "Lower Manhattan",
            SafetyLevel::BeCautious,
            "poorly lit after dark",
            author_id,
        )
    }

    #[tokio::test]
    async fn submit_derives_geohash_and_zeroes_votes() {
        let store = MemoryReportStore::new();
        let stored = submit_report(&store, submission("u1")).await.unwrap();

        assert_eq!(stored.geohash, encode(stored.location, STORAGE_PRECISION));
        assert_eq!(stored.geohash.len(), STORAGE_PRECISION);
        assert_eq!((stored.upvotes, stored.downvotes), (0, 0));
        assert!(stored.created_at.is_some());
    }

    #[tokio::test]
    async fn vote_increments_store_side() {
        let store = MemoryReportStore::new();
        let stored = submit_report(&store, submission("u1")).await.unwrap();

        vote_on_report(&store, &stored.id, VoteKind::Upvote)
            .await
            .unwrap();
        vote_on_report(&store, &stored.id, VoteKind::Upvote)
            .await
            .unwrap();
        vote_on_report(&store, &stored.id, VoteKind::Downvote)
            .await
            .unwrap();

        let report = store.get(&stored.id).await.unwrap().unwrap();
        assert_eq!((report.upvotes, report.downvotes), (2, 1));
    }

    #[tokio::test]
    async fn vote_on_missing_report_is_not_found() {
        let store = MemoryReportStore::new();
        let result = vote_on_report(&store, "missing", VoteKind::Upvote).await;
        assert!(matches!(result, Err(ReportError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_requires_ownership() {
        let store = MemoryReportStore::new();
        let stored = submit_report(&store, submission("owner")).await.unwrap();

        let result = delete_report(&store, &stored.id, "someone_else").await;
        assert!(matches!(result, Err(ReportError::Unauthorized)));
        assert!(store.get(&stored.id).await.unwrap().is_some());

        delete_report(&store, &stored.id, "owner").await.unwrap();
        assert!(store.get(&stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_report_is_not_found() {
        let store = MemoryReportStore::new();
        let result = delete_report(&store, "missing", "u1").await;
        assert!(matches!(result, Err(ReportError::NotFound { .. })));
    }
}
