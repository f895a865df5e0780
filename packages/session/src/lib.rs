#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Map session orchestration.
//!
//! [`MapSession`] is the single logical owner of the displayed-report set
//! and focus state. Each operation fetches from the injected store,
//! reconciles against what is on screen, and emits a [`ViewUpdate`] for the
//! presentation layer to apply. Fetches follow cancel-and-replace
//! semantics: starting a new load supersedes any in-flight one, and a
//! superseded result is discarded rather than overwriting the fresher
//! view. Errors surface whole and leave the session state untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use safety_map_geo::GeoPoint;
use safety_map_report_models::{NewReport, SafetyReport, VoteKind};
use safety_map_reports::{ReportError, mutations, queries};
use safety_map_store::ReportStore;
use safety_map_view::{FocusController, ViewUpdate, reconcile};

/// Proof that a fetch was started; consumed when its result is applied.
///
/// A ticket from a superseded load no longer matches the session's current
/// generation, and applying it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
}

/// Owner of the displayed-report set and focus state.
///
/// Dependencies are injected at construction; the session holds no global
/// state and can be driven entirely from tests. Mutating methods take
/// `&mut self`, which is what serializes reconciliation passes against
/// focus toggles. Callers wanting background fetches use the split-phase
/// [`Self::begin_load`] / [`Self::apply_fetched`] pair and keep the
/// session on a single queue.
pub struct MapSession {
    store: Arc<dyn ReportStore>,
    displayed: BTreeMap<String, SafetyReport>,
    focus: FocusController,
    generation: u64,
}

impl MapSession {
    /// Creates a session over the given store with nothing displayed.
    #[must_use]
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self {
            store,
            displayed: BTreeMap::new(),
            focus: FocusController::new(),
            generation: 0,
        }
    }

    /// Starts a load, superseding any in-flight one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation = self.generation.wrapping_add(1);
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Applies a fetched report set if its load is still current.
    ///
    /// Returns `None` (and changes nothing) when the ticket was superseded
    /// by a newer [`Self::begin_load`]; the caller drops the stale result.
    pub fn apply_fetched(
        &mut self,
        ticket: LoadTicket,
        reports: Vec<SafetyReport>,
    ) -> Option<ViewUpdate> {
        if ticket.generation != self.generation {
            log::debug!(
                "discarding superseded fetch (generation {} != {})",
                ticket.generation,
                self.generation
            );
            return None;
        }
        Some(self.apply_reports(reports))
    }

    /// Fetches reports near `center` and reconciles them onto the display.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the fetch fails; the displayed set and
    /// focus state are left unchanged.
    pub async fn load_nearby(
        &mut self,
        center: GeoPoint,
        radius_km: Option<f64>,
    ) -> Result<ViewUpdate, ReportError> {
        let _ticket = self.begin_load();
        let reports = queries::nearby_reports(self.store.as_ref(), center, radius_km).await?;
        Ok(self.apply_reports(reports))
    }

    /// Fetches the most recent reports and reconciles them onto the
    /// display.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the fetch fails; session state is left
    /// unchanged.
    pub async fn load_recent(&mut self, limit: Option<usize>) -> Result<ViewUpdate, ReportError> {
        let _ticket = self.begin_load();
        let reports = queries::recent_reports(self.store.as_ref(), limit).await?;
        Ok(self.apply_reports(reports))
    }

    /// Submits a report, then reloads the area around the submission point
    /// so the new report appears.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the submission or the follow-up fetch
    /// fails.
    pub async fn submit(&mut self, report: NewReport) -> Result<ViewUpdate, ReportError> {
        let location = report.location;
        mutations::submit_report(self.store.as_ref(), report).await?;
        self.load_nearby(location, None).await
    }

    /// Records a vote on a report.
    ///
    /// The displayed entity is intentionally not refreshed: vote counts on
    /// an already-visible report stay stale until the report leaves and
    /// re-enters the visible set.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::NotFound`] if the report is missing, or
    /// [`ReportError::Store`] if the mutation fails.
    pub async fn vote(&self, id: &str, kind: VoteKind) -> Result<(), ReportError> {
        mutations::vote_on_report(self.store.as_ref(), id, kind).await
    }

    /// Deletes one of the requester's reports and removes its entity.
    ///
    /// Clears focus if the deleted report held it.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::NotFound`], [`ReportError::Unauthorized`],
    /// or [`ReportError::Store`]; session state is unchanged on error.
    pub async fn delete(&mut self, id: &str, requester_id: &str) -> Result<ViewUpdate, ReportError> {
        mutations::delete_report(self.store.as_ref(), id, requester_id).await?;

        self.displayed.remove(id);
        if self.focus.focused_id() == Some(id) {
            self.focus.clear();
        }

        Ok(self.view_update(
            Vec::new(),
            BTreeSet::from([id.to_string()]),
            None,
        ))
    }

    /// Toggles focus on a report and emits the resulting visibility.
    ///
    /// When the report gains focus and is displayed, the update carries its
    /// location as the recenter target.
    pub fn toggle_focus(&mut self, id: &str) -> ViewUpdate {
        self.focus.toggle(id);

        let recenter_to = if self.focus.focused_id() == Some(id) {
            self.displayed.get(id).map(|report| report.location)
        } else {
            None
        };

        self.view_update(Vec::new(), BTreeSet::new(), recenter_to)
    }

    /// Clears focus and emits the restored full visibility.
    pub fn clear_focus(&mut self) -> ViewUpdate {
        self.focus.clear();
        self.view_update(Vec::new(), BTreeSet::new(), None)
    }

    /// Ids currently displayed.
    pub fn displayed_ids(&self) -> impl Iterator<Item = &str> {
        self.displayed.keys().map(String::as_str)
    }

    /// The displayed copy of a report, as of the fetch that added it.
    #[must_use]
    pub fn displayed_report(&self, id: &str) -> Option<&SafetyReport> {
        self.displayed.get(id)
    }

    /// The focus state.
    #[must_use]
    pub const fn focus(&self) -> &FocusController {
        &self.focus
    }

    /// Reconciles a fetched set onto the displayed set and builds the
    /// update instructions.
    fn apply_reports(&mut self, reports: Vec<SafetyReport>) -> ViewUpdate {
        let previous_ids: BTreeSet<String> = self.displayed.keys().cloned().collect();
        let delta = reconcile(&previous_ids, &reports);

        for id in &delta.removed {
            self.displayed.remove(id);
        }
        if self
            .focus
            .focused_id()
            .is_some_and(|focused| delta.removed.contains(focused))
        {
            // The focused report left the visible set; restore full
            // visibility rather than leaving focus on a dead entity.
            self.focus.clear();
        }
        for report in &delta.added {
            self.displayed.insert(report.id.clone(), report.clone());
        }

        self.view_update(delta.added, delta.removed, None)
    }

    fn view_update(
        &self,
        added_entities: Vec<SafetyReport>,
        removed_entity_ids: BTreeSet<String>,
        recenter_to: Option<GeoPoint>,
    ) -> ViewUpdate {
        ViewUpdate {
            added_entities,
            removed_entity_ids,
            visibility: self.focus.visibility_map(self.displayed_ids()),
            recenter_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeDelta, Utc};
    use safety_map_geo::{STORAGE_PRECISION, encode};
    use safety_map_report_models::SafetyLevel;
    use safety_map_store::StoreError;
    use safety_map_store::memory::MemoryReportStore;

    use super::*;

    fn stored_report(id: &str, lat: f64, lon: f64, age_minutes: i64) -> SafetyReport {
        let location = GeoPoint::new(lat, lon).unwrap();
        SafetyReport {
            id: id.to_string(),
            location,
            area_name: "Test Area".to_string(),
            level: SafetyLevel::Dangerous,
            comment: String::new(),
            author_id: "author".to_string(),
            author_name: "Anonymous User".to_string(),
            created_at: Some(Utc::now() - TimeDelta::minutes(age_minutes)),
            upvotes: 0,
            downvotes: 0,
            radius_meters: 500,
            geohash: encode(location, STORAGE_PRECISION),
        }
    }

    fn center() -> GeoPoint {
        GeoPoint::new(40.0, -74.0).unwrap()
    }

    /// Reports inside the center's precision-6 cell, so a 10 km search
    /// finds them through the prefix window.
    fn in_cell_report(id: &str, age_minutes: i64) -> SafetyReport {
        stored_report(id, 40.0002, -74.0002, age_minutes)
    }

    struct DownStore;

    #[async_trait]
    impl ReportStore for DownStore {
        async fn range_query(
            &self,
            _lower: &str,
            _upper: &str,
            _limit: usize,
        ) -> Result<Vec<SafetyReport>, StoreError> {
            Err(StoreError::unavailable(std::io::Error::other("down")))
        }

        async fn recent(&self, _limit: usize) -> Result<Vec<SafetyReport>, StoreError> {
            Err(StoreError::unavailable(std::io::Error::other("down")))
        }

        async fn get(&self, _id: &str) -> Result<Option<SafetyReport>, StoreError> {
            Err(StoreError::unavailable(std::io::Error::other("down")))
        }

        async fn insert(
            &self,
            _report: NewReport,
            _geohash: String,
        ) -> Result<SafetyReport, StoreError> {
            Err(StoreError::unavailable(std::io::Error::other("down")))
        }

        async fn delete(&self, _id: &str) -> Result<(), StoreError> {
            Err(StoreError::unavailable(std::io::Error::other("down")))
        }

        async fn increment_vote(&self, _id: &str, _kind: VoteKind) -> Result<(), StoreError> {
            Err(StoreError::unavailable(std::io::Error::other("down")))
        }
    }

    #[tokio::test]
    async fn load_reconciles_across_fetches() {
        let store = Arc::new(MemoryReportStore::with_reports([
            in_cell_report("a", 10),
            in_cell_report("b", 5),
        ]));
        let mut session = MapSession::new(Arc::<MemoryReportStore>::clone(&store));

        let first = session.load_nearby(center(), Some(10.0)).await.unwrap();
        assert_eq!(first.added_entities.len(), 2);
        assert!(first.removed_entity_ids.is_empty());

        // Next fetch: "a" disappeared, "c" appeared.
        let ticket = session.begin_load();
        let update = session
            .apply_fetched(ticket, vec![in_cell_report("b", 5), in_cell_report("c", 0)])
            .unwrap();

        let added: Vec<&str> = update
            .added_entities
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(added, vec!["c"]);
        assert_eq!(
            update.removed_entity_ids,
            BTreeSet::from(["a".to_string()])
        );
        let displayed: Vec<&str> = session.displayed_ids().collect();
        assert_eq!(displayed, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn superseded_fetch_is_discarded() {
        let store = Arc::new(MemoryReportStore::new());
        let mut session = MapSession::new(store);

        let stale = session.begin_load();
        let fresh = session.begin_load();

        assert!(
            session
                .apply_fetched(stale, vec![in_cell_report("old", 0)])
                .is_none()
        );
        assert!(session.displayed_ids().next().is_none());

        let update = session
            .apply_fetched(fresh, vec![in_cell_report("new", 0)])
            .unwrap();
        assert_eq!(update.added_entities.len(), 1);
        assert_eq!(session.displayed_ids().collect::<Vec<_>>(), vec!["new"]);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_unchanged() {
        let store = Arc::new(MemoryReportStore::with_reports([in_cell_report("a", 0)]));
        let mut session = MapSession::new(store);
        session.load_nearby(center(), Some(10.0)).await.unwrap();
        session.toggle_focus("a");

        let mut broken = MapSession {
            store: Arc::new(DownStore),
            displayed: session.displayed.clone(),
            focus: session.focus.clone(),
            generation: session.generation,
        };

        let result = broken.load_nearby(center(), Some(10.0)).await;
        assert!(matches!(result, Err(ReportError::Store(_))));
        assert_eq!(broken.displayed_ids().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(broken.focus().focused_id(), Some("a"));
    }

    #[tokio::test]
    async fn submit_reloads_around_the_submission_point() {
        let store = Arc::new(MemoryReportStore::new());
        let mut session = MapSession::new(store);

        let update = session
            .submit(NewReport::new(
                center(),
                "Downtown",
                SafetyLevel::Safe,
                "quiet and well lit",
                "u1",
            ))
            .await
            .unwrap();

        assert_eq!(update.added_entities.len(), 1);
        assert_eq!(update.added_entities[0].comment, "quiet and well lit");
        assert_eq!(session.displayed_ids().count(), 1);
    }

    #[tokio::test]
    async fn vote_leaves_displayed_copy_stale() {
        let store = Arc::new(MemoryReportStore::with_reports([in_cell_report("a", 0)]));
        let mut session = MapSession::new(Arc::<MemoryReportStore>::clone(&store));
        session.load_nearby(center(), Some(10.0)).await.unwrap();

        session.vote("a", VoteKind::Upvote).await.unwrap();

        // Store sees the vote, the displayed copy doesn't until "a" leaves
        // and re-enters the visible set.
        assert_eq!(store.get("a").await.unwrap().unwrap().upvotes, 1);
        assert_eq!(session.displayed_report("a").unwrap().upvotes, 0);
    }

    #[tokio::test]
    async fn toggle_focus_recenter_and_visibility() {
        let store = Arc::new(MemoryReportStore::with_reports([
            in_cell_report("a", 0),
            in_cell_report("b", 1),
        ]));
        let mut session = MapSession::new(store);
        session.load_nearby(center(), Some(10.0)).await.unwrap();

        let update = session.toggle_focus("a");
        assert_eq!(update.recenter_to, Some(session.displayed_report("a").unwrap().location));
        assert_eq!(update.visibility.get("a"), Some(&true));
        assert_eq!(update.visibility.get("b"), Some(&false));

        let update = session.toggle_focus("a");
        assert_eq!(update.recenter_to, None);
        assert!(update.visibility.values().all(|visible| *visible));
    }

    #[tokio::test]
    async fn delete_removes_entity_and_clears_its_focus() {
        let store = Arc::new(MemoryReportStore::with_reports([
            in_cell_report("a", 0),
            in_cell_report("b", 1),
        ]));
        let mut session = MapSession::new(store);
        session.load_nearby(center(), Some(10.0)).await.unwrap();
        session.toggle_focus("a");

        let update = session.delete("a", "author").await.unwrap();

        assert_eq!(
            update.removed_entity_ids,
            BTreeSet::from(["a".to_string()])
        );
        assert_eq!(session.focus().focused_id(), None);
        assert_eq!(session.displayed_ids().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(update.visibility.get("b"), Some(&true));
    }

    #[tokio::test]
    async fn unauthorized_delete_changes_nothing() {
        let store = Arc::new(MemoryReportStore::with_reports([in_cell_report("a", 0)]));
        let mut session = MapSession::new(store);
        session.load_nearby(center(), Some(10.0)).await.unwrap();

        let result = session.delete("a", "intruder").await;
        assert!(matches!(result, Err(ReportError::Unauthorized)));
        assert_eq!(session.displayed_ids().collect::<Vec<_>>(), vec!["a"]);
    }

    #[tokio::test]
    async fn reconciliation_clears_focus_of_a_departed_report() {
        let store = Arc::new(MemoryReportStore::new());
        let mut session = MapSession::new(store);

        let ticket = session.begin_load();
        session
            .apply_fetched(ticket, vec![in_cell_report("a", 0)])
            .unwrap();
        session.toggle_focus("a");

        let ticket = session.begin_load();
        let update = session
            .apply_fetched(ticket, vec![in_cell_report("b", 0)])
            .unwrap();

        assert_eq!(session.focus().focused_id(), None);
        assert_eq!(update.visibility.get("b"), Some(&true));
    }
}
