#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incremental reconciliation of displayed map entities.
//!
//! Given the authoritative report set from a fetch, [`reconcile`] computes
//! the minimal add/remove delta against what is already on screen, so
//! unchanged entities are never torn down and recreated. [`FocusController`]
//! manages the single "focused report" visibility mode, and
//! [`DisplayState`] tracks the presentation layer's opaque entity handles.
//! Everything here is pure and synchronous; the encompassing display state
//! must be driven from a single logical owner.

pub mod focus;
pub mod reconcile;
pub mod state;

pub use focus::{FOCUS_ZOOM, FocusController};
pub use reconcile::{ReportDelta, reconcile};
pub use state::{DisplayState, ViewUpdate};
