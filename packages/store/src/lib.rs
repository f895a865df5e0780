#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Abstract report store consumed by the proximity index and repository.
//!
//! The store is modeled as an external key-sorted document store: a single
//! collection of [`SafetyReport`] records supporting lexicographic range
//! scans over the `geohash` field, plus get/insert/delete by id and an
//! atomic vote increment. Implementations own id and timestamp assignment.
//!
//! [`memory::MemoryReportStore`] is the reference implementation used by
//! tests and the demo CLI.

pub mod memory;

use async_trait::async_trait;
use safety_map_report_models::{NewReport, SafetyReport, VoteKind};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the operation failed wholesale.
    /// Carries the underlying cause; callers should retry with backoff.
    #[error("Store unavailable: {source}")]
    Unavailable {
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The targeted record does not exist.
    #[error("Record not found: {id}")]
    NotFound {
        /// Id of the missing record.
        id: String,
    },
}

impl StoreError {
    /// Wraps an arbitrary failure as [`StoreError::Unavailable`].
    #[must_use]
    pub fn unavailable(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable {
            source: Box::new(source),
        }
    }
}

/// A sorted, range-queryable document store holding safety reports.
///
/// Each operation is all-or-nothing: a failed call returns an error and no
/// partial result. Dropping a call's future cancels the underlying request,
/// which is how callers supersede stale in-flight queries.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Returns every report whose `geohash` lies in `[lower, upper]`
    /// inclusive, ordered by geohash ascending then `created_at`
    /// descending, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the scan fails.
    async fn range_query(
        &self,
        lower: &str,
        upper: &str,
        limit: usize,
    ) -> Result<Vec<SafetyReport>, StoreError>;

    /// Returns the most recent reports, newest first, capped at `limit`.
    /// Records still awaiting a server timestamp sort last.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the query fails.
    async fn recent(&self, limit: usize) -> Result<Vec<SafetyReport>, StoreError>;

    /// Fetches a single report by id. A missing record is `Ok(None)`, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the lookup fails.
    async fn get(&self, id: &str) -> Result<Option<SafetyReport>, StoreError>;

    /// Persists a submission, assigning its id and creation timestamp.
    ///
    /// The caller supplies the derived `geohash`; the stored record starts
    /// with zeroed vote counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    async fn insert(&self, report: NewReport, geohash: String)
    -> Result<SafetyReport, StoreError>;

    /// Deletes a report by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record does not exist, or
    /// [`StoreError::Unavailable`] if the delete fails.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Atomically increments one of a report's vote counters.
    ///
    /// The increment is transactionally guarded: it must observe the record
    /// and fail with [`StoreError::NotFound`] when it is missing, never
    /// create one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record does not exist, or
    /// [`StoreError::Unavailable`] if the mutation fails.
    async fn increment_vote(&self, id: &str, kind: VoteKind) -> Result<(), StoreError>;
}
