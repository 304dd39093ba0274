use std::sync::Arc;

use crate::catalog::{Catalog, Entity, EntityType};
use crate::eligibility::{SelectableOption, available_guilds, selectable_options, subrace_options};
use crate::engine::{ChangeReport, FieldChange, apply_in_place};
use crate::selection::Selection;

/// One character being built: a selection bound to a shared catalog.
///
/// Changes go through `&mut self`, so a cascade always runs to completion
/// before the next change is observed.
#[derive(Debug, Clone)]
pub struct CharacterSession {
    catalog: Arc<Catalog>,
    selection: Selection,
}

impl CharacterSession {
    /// Start a session with an empty selection.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::from_selection(catalog, Selection::new())
    }

    /// Resume a session from an existing selection.
    #[must_use]
    pub const fn from_selection(catalog: Arc<Catalog>, selection: Selection) -> Self {
        Self { catalog, selection }
    }

    /// Apply one change and its cascade.
    pub fn apply(&mut self, change: FieldChange) -> ChangeReport {
        apply_in_place(&mut self.selection, &self.catalog, change)
    }

    /// Apply changes in order, returning one report per change.
    pub fn apply_all(
        &mut self,
        changes: impl IntoIterator<Item = FieldChange>,
    ) -> Vec<ChangeReport> {
        changes
            .into_iter()
            .map(|change| self.apply(change))
            .collect()
    }

    #[must_use]
    pub fn options(&self, kind: EntityType) -> Vec<SelectableOption<'_>> {
        selectable_options(kind, &self.selection, &self.catalog)
    }

    #[must_use]
    pub fn subrace_options(&self) -> Vec<SelectableOption<'_>> {
        subrace_options(&self.selection, &self.catalog)
    }

    #[must_use]
    pub fn available_guilds(&self) -> Vec<&Entity> {
        available_guilds(&self.selection, &self.catalog)
    }

    /// Borrow the current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Start over with an empty selection.
    pub fn reset(&mut self) {
        self.selection = Selection::new();
    }

    /// Consume the session, handing the selection to the caller.
    #[must_use]
    pub fn into_selection(self) -> Selection {
        self.selection
    }
}
