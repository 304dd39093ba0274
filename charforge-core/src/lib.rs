//! Charforge Selection Engine
//!
//! Platform-agnostic rules for the character builder: which catalog options
//! are selectable, which dependent fields are cleared when a selection
//! changes, and which defaults are derived when a field is set.
//! This crate holds no UI or storage code; a view layer reads the
//! [`Selection`] and [`Catalog`] and feeds user actions back as
//! [`FieldChange`]s.

pub mod catalog;
pub mod constants;
pub mod eligibility;
pub mod engine;
pub mod guilds;
pub mod invariants;
pub mod numbers;
pub mod ranks;
pub mod selection;
pub mod session;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, Entity, EntityType, GuildRank, GuildStatus};
pub use eligibility::{
    LockReason, SelectableOption, available_guilds, can_select_adventure_career,
    can_select_religion_career, is_class_locked, is_commerce_blocked_by_faction,
    is_institut_director, is_specialization_locked, lock_reason, selectable_options,
    subrace_options,
};
pub use engine::{
    CASCADE, ChangeReport, Field, FieldChange, Invalidation, InvalidationRule, apply,
    apply_in_place,
};
pub use invariants::{InvariantViolation, check_invariants};
pub use numbers::{parse_manual_bonus, parse_political_points};
pub use ranks::{ProfessionRank, RankLadder, SubProfessionEntry};
pub use selection::{BonusStat, GuildLadder, ManualBonuses, RetainedGuildRanks, Selection};
pub use session::CharacterSession;

/// Trait for abstracting where the catalog comes from.
/// The surrounding application provides the implementation.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the catalog of selectable entities
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// Entry point that opens character sessions against a loaded catalog.
pub struct CharacterBuilder<C>
where
    C: CatalogSource,
{
    source: C,
}

impl<C> CharacterBuilder<C>
where
    C: CatalogSource,
{
    pub const fn new(source: C) -> Self {
        Self { source }
    }

    /// Load the catalog and open an empty session on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn start_session(&self) -> Result<CharacterSession, C::Error> {
        let catalog = self.source.load_catalog()?;
        Ok(CharacterSession::new(std::sync::Arc::new(catalog)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureSource;

    impl CatalogSource for FixtureSource {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<Catalog, Self::Error> {
            Ok(catalog::fixture::catalog())
        }
    }

    struct BrokenSource;

    impl CatalogSource for BrokenSource {
        type Error = CatalogError;

        fn load_catalog(&self) -> Result<Catalog, Self::Error> {
            Catalog::from_json("{ not json")
        }
    }

    #[test]
    fn builder_opens_empty_sessions() {
        let builder = CharacterBuilder::new(FixtureSource);
        let mut session = builder.start_session().unwrap();
        assert_eq!(session.selection(), &Selection::new());
        assert!(session.apply(FieldChange::SetLevel(5)).applied);
        assert!(!session.catalog().is_empty());
    }

    #[test]
    fn builder_propagates_catalog_errors() {
        let builder = CharacterBuilder::new(BrokenSource);
        assert!(matches!(
            builder.start_session(),
            Err(CatalogError::Parse(_))
        ));
    }
}
