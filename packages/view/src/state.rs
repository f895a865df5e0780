//! Display state and the per-update instruction set for the view layer.

use std::collections::{BTreeMap, BTreeSet};

use safety_map_geo::GeoPoint;
use safety_map_report_models::SafetyReport;
use serde::{Deserialize, Serialize};

use crate::reconcile::ReportDelta;

/// One update cycle's instructions to the presentation layer.
///
/// This is everything the view needs per cycle: entities to create,
/// entities to tear down, the spatial-extent visibility for every displayed
/// entity, and an optional recenter target when a report just gained focus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewUpdate {
    /// Reports needing new marker + radius-circle entities, in order.
    pub added_entities: Vec<SafetyReport>,
    /// Ids whose entities must be destroyed.
    pub removed_entity_ids: BTreeSet<String>,
    /// Spatial-extent visibility per displayed id (point markers are
    /// always visible regardless).
    pub visibility: BTreeMap<String, bool>,
    /// Location to recenter on at [`FOCUS_ZOOM`](crate::FOCUS_ZOOM), when
    /// a report just gained focus.
    pub recenter_to: Option<GeoPoint>,
}

/// The presentation layer's record of which entities exist on screen.
///
/// `H` is the platform's opaque handle for a marker/circle pair; the core
/// never constructs or inspects handles, it only instructs their creation
/// and destruction through [`ViewUpdate`]s. The state must be mutated from
/// a single logical owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState<H> {
    entities: BTreeMap<String, H>,
}

impl<H> DisplayState<H> {
    /// Creates an empty display state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
        }
    }

    /// Applies a reconciliation delta, calling `create` for each added
    /// report and returning the handles of removed entities so the caller
    /// can destroy them.
    pub fn apply_delta(
        &mut self,
        delta: &ReportDelta,
        mut create: impl FnMut(&SafetyReport) -> H,
    ) -> Vec<H> {
        let mut destroyed = Vec::with_capacity(delta.removed.len());
        for id in &delta.removed {
            if let Some(handle) = self.entities.remove(id) {
                destroyed.push(handle);
            }
        }
        for report in &delta.added {
            self.entities.insert(report.id.clone(), create(report));
        }
        destroyed
    }

    /// Removes a single entity, returning its handle if it was displayed.
    pub fn remove(&mut self, id: &str) -> Option<H> {
        self.entities.remove(id)
    }

    /// Handle for a displayed entity.
    #[must_use]
    pub fn handle(&self, id: &str) -> Option<&H> {
        self.entities.get(id)
    }

    /// Ids of every displayed entity.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Number of displayed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether nothing is displayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
