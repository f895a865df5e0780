#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Safety report domain types.
//!
//! A [`SafetyReport`] is a user-submitted, location-tagged observation with
//! a severity [`SafetyLevel`], community vote counters, and a derived
//! geohash that keys it in the document store. Reports are immutable except
//! for store-side vote increments and whole-record deletion.

use chrono::{DateTime, Utc};
use safety_map_geo::GeoPoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Coverage radius a report claims when the submitter doesn't specify one,
/// in meters.
pub const DEFAULT_REPORT_RADIUS_METERS: u32 = 500;

/// Display name recorded for submitters who stay anonymous.
pub const ANONYMOUS_AUTHOR_NAME: &str = "Anonymous User";

/// An RGBA color for rendering a report's marker or radius fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// Creates a color from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Alpha applied to radius-circle fills so overlapping reports stay legible.
const FILL_ALPHA: u8 = 80;

/// How safe the reporter judged the area to be.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyLevel {
    /// No observed concerns.
    Safe,
    /// Stay alert; minor concerns reported.
    BeCautious,
    /// Known problems in the area.
    Unsafe,
    /// Serious, active danger.
    Dangerous,
    /// Level missing or unrecognized.
    #[default]
    Unknown,
}

impl SafetyLevel {
    /// Parses a stored level name, mapping anything unrecognized to
    /// [`Self::Unknown`] rather than failing.
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        value.parse().unwrap_or(Self::Unknown)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::BeCautious => "Be Cautious",
            Self::Unsafe => "Unsafe",
            Self::Dangerous => "Dangerous",
            Self::Unknown => "Unknown",
        }
    }

    /// Marker color for this level.
    #[must_use]
    pub const fn marker_color(self) -> Rgba {
        match self {
            Self::Safe => Rgba::new(76, 175, 80, 255),
            Self::BeCautious => Rgba::new(255, 193, 7, 255),
            Self::Unsafe => Rgba::new(255, 152, 0, 255),
            Self::Dangerous => Rgba::new(244, 67, 54, 255),
            Self::Unknown => Rgba::new(128, 128, 128, 255),
        }
    }

    /// Translucent fill color for this level's radius circle.
    #[must_use]
    pub const fn fill_color(self) -> Rgba {
        let Rgba { r, g, b, .. } = self.marker_color();
        Rgba::new(r, g, b, FILL_ALPHA)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Safe,
            Self::BeCautious,
            Self::Unsafe,
            Self::Dangerous,
            Self::Unknown,
        ]
    }
}

/// Which vote counter a vote mutation targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteKind {
    /// Increment `upvotes`.
    Upvote,
    /// Increment `downvotes`.
    Downvote,
}

/// A stored safety report.
///
/// `geohash` is derived: it must equal
/// `encode(location, STORAGE_PRECISION)` at write time. The submission path
/// enforces that invariant; the index only relies on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    /// Store-assigned document id.
    pub id: String,
    /// Where the observation was made.
    pub location: GeoPoint,
    /// Human-readable area name (reverse-geocoded or user-entered).
    pub area_name: String,
    /// Reporter's severity judgment.
    pub level: SafetyLevel,
    /// Free-form reporter comment.
    pub comment: String,
    /// Submitting user's id.
    pub author_id: String,
    /// Submitting user's display name.
    pub author_name: String,
    /// Store-assigned creation timestamp; absent until the server assigns
    /// it.
    pub created_at: Option<DateTime<Utc>>,
    /// Community agreement counter.
    pub upvotes: u32,
    /// Community disagreement counter.
    pub downvotes: u32,
    /// Coverage radius the report claims, in meters.
    pub radius_meters: u32,
    /// Derived geohash of `location` at the storage precision.
    pub geohash: String,
}

impl SafetyReport {
    /// Relative-age label for display ("Today", "3 days ago", ...).
    ///
    /// Returns "Unknown" while the server timestamp is still pending.
    #[must_use]
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let Some(created_at) = self.created_at else {
            return "Unknown".to_string();
        };

        let days = (now - created_at).num_days().max(0);
        match days {
            0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            d if d < 7 => format!("{d} days ago"),
            d if d < 30 => format!("{} weeks ago", d / 7),
            d => format!("{} months ago", d / 30),
        }
    }
}

/// A submission payload. The store assigns `id` and `created_at`; the
/// submission path derives the geohash and zeroes the vote counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    /// Where the observation was made.
    pub location: GeoPoint,
    /// Human-readable area name.
    pub area_name: String,
    /// Reporter's severity judgment.
    pub level: SafetyLevel,
    /// Free-form reporter comment.
    pub comment: String,
    /// Submitting user's id.
    pub author_id: String,
    /// Submitting user's display name.
    pub author_name: String,
    /// Coverage radius in meters.
    pub radius_meters: u32,
}

impl NewReport {
    /// Creates a submission with the default coverage radius and anonymous
    /// display name.
    #[must_use]
    pub fn new(
        location: GeoPoint,
        area_name: impl Into<String>,
        level: SafetyLevel,
        comment: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            location,
            area_name: area_name.into(),
            level,
            comment: comment.into(),
            author_id: author_id.into(),
            author_name: ANONYMOUS_AUTHOR_NAME.to_string(),
            radius_meters: DEFAULT_REPORT_RADIUS_METERS,
        }
    }
}
