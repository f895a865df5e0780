//! Single-focus visibility mode for spatial-extent entities.

use std::collections::BTreeMap;

/// Zoom level the view layer should animate to when a report gains focus.
pub const FOCUS_ZOOM: f32 = 17.0;

/// Tracks which report, if any, currently has focus.
///
/// While focused, every other report's spatial extent (its radius circle)
/// is hidden; point markers stay visible throughout. The controller is
/// pure state; applying visibility to entities is the presentation layer's
/// job, driven by [`Self::is_visible`] or a [`Self::visibility_map`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusController {
    focused: Option<String>,
}

impl FocusController {
    /// Creates an unfocused controller.
    #[must_use]
    pub const fn new() -> Self {
        Self { focused: None }
    }

    /// Toggles focus on a report: focusing it if it isn't focused, and
    /// returning to the unfocused state if it already is. Toggling a
    /// different id moves focus there directly.
    pub fn toggle(&mut self, id: &str) {
        if self.focused.as_deref() == Some(id) {
            self.focused = None;
        } else {
            self.focused = Some(id.to_string());
        }
    }

    /// Forces the unfocused state.
    pub fn clear(&mut self) {
        self.focused = None;
    }

    /// The focused report id, if any.
    #[must_use]
    pub fn focused_id(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Whether any report has focus.
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused.is_some()
    }

    /// Whether the entity for `id` should show its spatial extent: all are
    /// visible when unfocused, only the focused one otherwise.
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        match self.focused.as_deref() {
            None => true,
            Some(focused) => focused == id,
        }
    }

    /// Visibility for every displayed id under the current focus state.
    #[must_use]
    pub fn visibility_map<'a>(
        &self,
        displayed_ids: impl IntoIterator<Item = &'a str>,
    ) -> BTreeMap<String, bool> {
        displayed_ids
            .into_iter()
            .map(|id| (id.to_string(), self.is_visible(id)))
            .collect()
    }
}
