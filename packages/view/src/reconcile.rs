//! Set-diff reconciliation between displayed and fetched report sets.

use std::collections::BTreeSet;

use safety_map_report_models::SafetyReport;

/// The minimal entity churn needed to make the displayed set match a fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDelta {
    /// Reports to create entities for, in fetched order.
    pub added: Vec<SafetyReport>,
    /// Ids whose entities must be removed.
    pub removed: BTreeSet<String>,
}

impl ReportDelta {
    /// Whether the delta changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Computes the add/remove delta between the currently displayed ids and a
/// newly fetched report set.
///
/// Reports present in both sets are left untouched: a content change on an
/// already-displayed report (vote counts, say) does not refresh its entity
/// until the report leaves and re-enters the visible set. Only membership
/// changes drive entity churn. Reapplying the same fetch against the
/// post-delta set yields an empty delta.
///
/// Duplicate ids in `new_reports` are added once; the first occurrence
/// wins.
#[must_use]
pub fn reconcile(previous_ids: &BTreeSet<String>, new_reports: &[SafetyReport]) -> ReportDelta {
    let new_ids: BTreeSet<&str> = new_reports.iter().map(|r| r.id.as_str()).collect();

    let removed: BTreeSet<String> = previous_ids
        .iter()
        .filter(|id| !new_ids.contains(id.as_str()))
        .cloned()
        .collect();

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let added: Vec<SafetyReport> = new_reports
        .iter()
        .filter(|report| !previous_ids.contains(&report.id) && seen.insert(report.id.as_str()))
        .cloned()
        .collect();

    log::trace!(
        "reconciled {} displayed against {} fetched: +{} -{}",
        previous_ids.len(),
        new_reports.len(),
        added.len(),
        removed.len()
    );

    ReportDelta { added, removed }
}

#[cfg(test)]
mod tests {
    use safety_map_geo::GeoPoint;
    use safety_map_report_models::SafetyLevel;

    use super::*;

    fn report(id: &str) -> SafetyReport {
        let location = GeoPoint::new(40.0, -74.0).unwrap();
        SafetyReport {
            id: id.to_string(),
            location,
            area_name: String::new(),
            level: SafetyLevel::Safe,
            comment: String::new(),
            author_id: "author".to_string(),
            author_name: "Anonymous User".to_string(),
            created_at: None,
            upvotes: 0,
            downvotes: 0,
            radius_meters: 500,
            geohash: "dr57s1f".to_string(),
        }
    }

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn computes_membership_delta() {
        let previous = ids(&["A", "B", "C"]);
        let fetched = [report("B"), report("C"), report("D")];

        let delta = reconcile(&previous, &fetched);

        let added: Vec<&str> = delta.added.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(added, vec!["D"]);
        assert_eq!(delta.removed, ids(&["A"]));
    }

    #[test]
    fn reapplying_the_same_fetch_is_empty() {
        let previous = ids(&["A", "B", "C"]);
        let fetched = [report("B"), report("C"), report("D")];

        let delta = reconcile(&previous, &fetched);

        let mut applied = previous;
        for removed in &delta.removed {
            applied.remove(removed);
        }
        for added in &delta.added {
            applied.insert(added.id.clone());
        }

        assert!(reconcile(&applied, &fetched).is_empty());
    }

    #[test]
    fn unchanged_membership_produces_no_churn() {
        let previous = ids(&["A", "B"]);
        // Same membership, different content.
        let mut changed = report("A");
        changed.upvotes = 40;
        let fetched = [changed, report("B")];

        assert!(reconcile(&previous, &fetched).is_empty());
    }

    #[test]
    fn empty_sets() {
        assert!(reconcile(&BTreeSet::new(), &[]).is_empty());

        let delta = reconcile(&BTreeSet::new(), &[report("A")]);
        assert_eq!(delta.added.len(), 1);
        assert!(delta.removed.is_empty());

        let delta = reconcile(&ids(&["A"]), &[]);
        assert!(delta.added.is_empty());
        assert_eq!(delta.removed, ids(&["A"]));
    }

    #[test]
    fn duplicate_fetched_ids_are_added_once() {
        let delta = reconcile(&BTreeSet::new(), &[report("A"), report("A")]);
        assert_eq!(delta.added.len(), 1);
    }

    #[test]
    fn added_preserves_fetched_order() {
        let fetched = [report("Z"), report("M"), report("A")];
        let delta = reconcile(&BTreeSet::new(), &fetched);
        let added: Vec<&str> = delta.added.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(added, vec!["Z", "M", "A"]);
    }
}
