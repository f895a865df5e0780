#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Report repository operations against the abstract store.
//!
//! The proximity search turns "reports within R km" into a geohash prefix
//! range scan followed by a mandatory exact-distance filter; the mutation
//! paths cover submission (which derives the stored geohash), voting, and
//! owner-only deletion.

pub mod mutations;
pub mod queries;

use safety_map_geo::GeoError;
use safety_map_store::StoreError;

/// Errors surfaced by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Coordinates were rejected before any encoding happened.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// The store could not complete the operation; carries the cause.
    /// No partial results accompany this error.
    #[error("Store unavailable: {0}")]
    Store(StoreError),

    /// The targeted report does not exist.
    #[error("Report not found: {id}")]
    NotFound {
        /// Id of the missing report.
        id: String,
    },

    /// A delete was attempted by someone other than the report's author.
    #[error("You can only delete your own reports")]
    Unauthorized,
}

impl From<StoreError> for ReportError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { id } => Self::NotFound { id },
            unavailable @ StoreError::Unavailable { .. } => Self::Store(unavailable),
        }
    }
}
