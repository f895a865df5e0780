//! In-memory reference store.
//!
//! Emulates the external document store's ordering contract over a
//! `BTreeMap` so the proximity index, repository, and session can be
//! exercised without a running backend. Also used by the demo CLI.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safety_map_report_models::{NewReport, SafetyReport, VoteKind};
use uuid::Uuid;

use crate::{ReportStore, StoreError};

/// An in-memory [`ReportStore`] keyed by report id.
///
/// Range scans sort by `(geohash asc, created_at desc, id asc)`; records
/// with a pending timestamp order after timestamped ones within the same
/// geohash.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    records: RwLock<BTreeMap<String, SafetyReport>>,
}

impl MemoryReportStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given reports, keyed by their
    /// ids as-is.
    #[must_use]
    pub fn with_reports(reports: impl IntoIterator<Item = SafetyReport>) -> Self {
        let records = reports
            .into_iter()
            .map(|report| (report.id.clone(), report))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Number of stored records.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().expect("report store lock poisoned").len()
    }

    /// Whether the store holds no records.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sort key for range scans: timestamped records first (newest first),
/// pending ones last, id as the stable tiebreaker.
fn recency_key(report: &SafetyReport) -> (DateTime<Utc>, &str) {
    (
        report.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC),
        report.id.as_str(),
    )
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn range_query(
        &self,
        lower: &str,
        upper: &str,
        limit: usize,
    ) -> Result<Vec<SafetyReport>, StoreError> {
        let records = self.records.read().expect("report store lock poisoned");

        let mut matches: Vec<SafetyReport> = records
            .values()
            .filter(|report| report.geohash.as_str() >= lower && report.geohash.as_str() <= upper)
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            a.geohash
                .cmp(&b.geohash)
                .then_with(|| recency_key(b).cmp(&recency_key(a)))
        });
        matches.truncate(limit);

        log::trace!(
            "range_query [{lower}, {upper}] limit {limit} -> {} records",
            matches.len()
        );
        Ok(matches)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SafetyReport>, StoreError> {
        let records = self.records.read().expect("report store lock poisoned");

        let mut matches: Vec<SafetyReport> = records.values().cloned().collect();
        matches.sort_by(|a, b| recency_key(b).cmp(&recency_key(a)));
        matches.truncate(limit);

        Ok(matches)
    }

    async fn get(&self, id: &str) -> Result<Option<SafetyReport>, StoreError> {
        let records = self.records.read().expect("report store lock poisoned");
        Ok(records.get(id).cloned())
    }

    async fn insert(
        &self,
        report: NewReport,
        geohash: String,
    ) -> Result<SafetyReport, StoreError> {
        let stored = SafetyReport {
            id: Uuid::new_v4().to_string(),
            location: report.location,
            area_name: report.area_name,
            level: report.level,
            comment: report.comment,
            author_id: report.author_id,
            author_name: report.author_name,
            created_at: Some(Utc::now()),
            upvotes: 0,
            downvotes: 0,
            radius_meters: report.radius_meters,
            geohash,
        };

        let mut records = self.records.write().expect("report store lock poisoned");
        records.insert(stored.id.clone(), stored.clone());
        log::debug!("inserted report {} at {}", stored.id, stored.geohash);
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().expect("report store lock poisoned");
        records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn increment_vote(&self, id: &str, kind: VoteKind) -> Result<(), StoreError> {
        let mut records = self.records.write().expect("report store lock poisoned");
        let report = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        match kind {
            VoteKind::Upvote => report.upvotes = report.upvotes.saturating_add(1),
            VoteKind::Downvote => report.downvotes = report.downvotes.saturating_add(1),
        }
        Ok(())
    }
}
