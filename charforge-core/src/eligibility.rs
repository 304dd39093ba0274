//! Eligibility predicates and selectable option lists.
//!
//! Everything here is a pure function of the selection and the catalog. The
//! view layer calls these on every render to decide which options to grey
//! out; the engine calls the same predicates before accepting a change and
//! when re-checking dependent fields.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Catalog, Entity, EntityType};
use crate::constants::{
    ADVENTURE_CAREER_UNLOCK_LEVEL, CAREER_ADVENTURE, CAREER_COMMERCE, CAREER_INSTITUT,
    CAREER_RELIGION, CLASS_UNLOCK_LEVEL, INSTITUT_DIRECTOR_TIER, RELIGION_CAREER_UNLOCK_LEVEL,
    SPECIALIZATION_UNLOCK_LEVEL,
};
use crate::selection::Selection;

/// Why an option cannot currently be picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockReason {
    LockedLevel { required: u8 },
    LockedNoClass,
    LockedFactionConflict,
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockedLevel { required } => write!(f, "LOCKED_LEVEL({required})"),
            Self::LockedNoClass => f.write_str("LOCKED_NO_CLASS"),
            Self::LockedFactionConflict => f.write_str("LOCKED_FACTION_CONFLICT"),
        }
    }
}

/// A catalog entry annotated with whether it may be picked right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectableOption<'a> {
    pub entity: &'a Entity,
    pub selectable: bool,
    pub reason: Option<LockReason>,
}

impl<'a> SelectableOption<'a> {
    fn new(entity: &'a Entity, reason: Option<LockReason>) -> Self {
        Self {
            entity,
            selectable: reason.is_none(),
            reason,
        }
    }
}

#[must_use]
pub const fn is_class_locked(selection: &Selection) -> bool {
    selection.level < CLASS_UNLOCK_LEVEL
}

#[must_use]
pub const fn is_specialization_locked(selection: &Selection) -> bool {
    selection.level < SPECIALIZATION_UNLOCK_LEVEL
}

#[must_use]
pub const fn can_select_adventure_career(selection: &Selection) -> bool {
    selection.level >= ADVENTURE_CAREER_UNLOCK_LEVEL && selection.class_id.is_some()
}

#[must_use]
pub const fn can_select_religion_career(selection: &Selection) -> bool {
    selection.level >= RELIGION_CAREER_UNLOCK_LEVEL
}

#[must_use]
pub const fn is_commerce_blocked_by_faction(selection: &Selection) -> bool {
    selection.faction_id.is_some()
}

/// Career is the institut with its rank slider at the Director tier.
#[must_use]
pub fn is_institut_director(selection: &Selection) -> bool {
    selection.has_career(CAREER_INSTITUT) && selection.institut_rank() >= INSTITUT_DIRECTOR_TIER
}

/// Lock reason for a career, `None` when it can be picked.
#[must_use]
pub fn career_lock_reason(career_id: &str, selection: &Selection) -> Option<LockReason> {
    match career_id {
        CAREER_ADVENTURE if selection.level < ADVENTURE_CAREER_UNLOCK_LEVEL => {
            Some(LockReason::LockedLevel {
                required: ADVENTURE_CAREER_UNLOCK_LEVEL,
            })
        }
        CAREER_ADVENTURE if selection.class_id.is_none() => Some(LockReason::LockedNoClass),
        CAREER_RELIGION if !can_select_religion_career(selection) => {
            Some(LockReason::LockedLevel {
                required: RELIGION_CAREER_UNLOCK_LEVEL,
            })
        }
        CAREER_COMMERCE if is_commerce_blocked_by_faction(selection) => {
            Some(LockReason::LockedFactionConflict)
        }
        CAREER_INSTITUT
            if selection.faction_id.is_some()
                && selection.institut_rank() >= INSTITUT_DIRECTOR_TIER =>
        {
            Some(LockReason::LockedFactionConflict)
        }
        _ => None,
    }
}

/// Lock reason for any catalog entry.
#[must_use]
pub fn lock_reason(entity: &Entity, selection: &Selection) -> Option<LockReason> {
    match entity.kind {
        EntityType::Class if is_class_locked(selection) => Some(LockReason::LockedLevel {
            required: CLASS_UNLOCK_LEVEL,
        }),
        EntityType::Specialization => {
            let Some(class_id) = selection.class_id.as_deref() else {
                return Some(LockReason::LockedNoClass);
            };
            if is_specialization_locked(selection) {
                Some(LockReason::LockedLevel {
                    required: SPECIALIZATION_UNLOCK_LEVEL,
                })
            } else if entity.is_child_of(class_id) {
                None
            } else {
                Some(LockReason::LockedNoClass)
            }
        }
        EntityType::Career => career_lock_reason(&entity.id, selection),
        _ => None,
    }
}

/// Ordered option list for one entity type.
#[must_use]
pub fn selectable_options<'a>(
    kind: EntityType,
    selection: &Selection,
    catalog: &'a Catalog,
) -> Vec<SelectableOption<'a>> {
    let annotate =
        |entity: &'a Entity| SelectableOption::new(entity, lock_reason(entity, selection));
    match kind {
        EntityType::Race => catalog
            .of_type(EntityType::Race)
            .filter(|entity| entity.is_top_level())
            .map(annotate)
            .collect(),
        EntityType::Specialization => match selection.class_id.as_deref() {
            Some(class_id) => catalog
                .children_of(class_id, EntityType::Specialization)
                .map(annotate)
                .collect(),
            None => catalog
                .of_type(EntityType::Specialization)
                .map(annotate)
                .collect(),
        },
        EntityType::Guild => available_guilds(selection, catalog)
            .into_iter()
            .map(annotate)
            .collect(),
        _ => catalog.of_type(kind).map(annotate).collect(),
    }
}

/// Subraces of the currently selected race.
#[must_use]
pub fn subrace_options<'a>(
    selection: &Selection,
    catalog: &'a Catalog,
) -> Vec<SelectableOption<'a>> {
    selection
        .race_id
        .as_deref()
        .map(|race_id| {
            catalog
                .children_of(race_id, EntityType::Race)
                .map(|entity| SelectableOption::new(entity, None))
                .collect()
        })
        .unwrap_or_default()
}

/// Catalog guilds the character has not joined yet.
#[must_use]
pub fn available_guilds<'a>(selection: &Selection, catalog: &'a Catalog) -> Vec<&'a Entity> {
    catalog
        .of_type(EntityType::Guild)
        .filter(|guild| !selection.has_guild(&guild.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixture;
    use crate::constants::INSTITUT_RANK_KEY;

    fn reasons<'a>(options: &[SelectableOption<'a>]) -> Vec<(&'a str, Option<LockReason>)> {
        options
            .iter()
            .map(|option| (option.entity.id.as_str(), option.reason))
            .collect()
    }

    #[test]
    fn level_gates_flip_at_thresholds() {
        let mut selection = Selection::new();
        selection.level = 4;
        assert!(is_class_locked(&selection));
        selection.level = 5;
        assert!(!is_class_locked(&selection));
        assert!(is_specialization_locked(&selection));
        selection.level = 15;
        assert!(!is_specialization_locked(&selection));
        selection.level = 9;
        assert!(!can_select_religion_career(&selection));
        selection.level = 10;
        assert!(can_select_religion_career(&selection));
    }

    #[test]
    fn adventure_requires_level_then_class() {
        let mut selection = Selection::new();
        assert_eq!(
            career_lock_reason(CAREER_ADVENTURE, &selection),
            Some(LockReason::LockedLevel { required: 5 })
        );
        selection.level = 8;
        assert_eq!(
            career_lock_reason(CAREER_ADVENTURE, &selection),
            Some(LockReason::LockedNoClass)
        );
        selection.class_id = Some("warrior".to_string());
        assert!(can_select_adventure_career(&selection));
        assert_eq!(career_lock_reason(CAREER_ADVENTURE, &selection), None);
    }

    #[test]
    fn career_options_report_reason_codes() {
        let catalog = fixture::catalog();
        let mut selection = Selection::new();
        selection.faction_id = Some("faction_empire".to_string());

        let options = selectable_options(EntityType::Career, &selection, &catalog);
        assert_eq!(
            reasons(&options),
            vec![
                (
                    "career_adventure",
                    Some(LockReason::LockedLevel { required: 5 })
                ),
                (
                    "career_religion",
                    Some(LockReason::LockedLevel { required: 10 })
                ),
                ("career_commerce", Some(LockReason::LockedFactionConflict)),
                ("career_institut", None),
                ("career_cards", None),
            ]
        );
        assert!(options.iter().filter(|o| o.selectable).count() == 2);
    }

    #[test]
    fn institut_is_locked_only_at_director_with_faction() {
        let mut selection = Selection::new();
        selection
            .slider_values
            .insert(INSTITUT_RANK_KEY.to_string(), INSTITUT_DIRECTOR_TIER);
        assert_eq!(career_lock_reason(CAREER_INSTITUT, &selection), None);
        selection.faction_id = Some("faction_republic".to_string());
        assert_eq!(
            career_lock_reason(CAREER_INSTITUT, &selection),
            Some(LockReason::LockedFactionConflict)
        );
        assert!(!is_institut_director(&selection));
        selection.career_id = Some(CAREER_INSTITUT.to_string());
        assert!(is_institut_director(&selection));
    }

    #[test]
    fn specialization_options_follow_class() {
        let catalog = fixture::catalog();
        let mut selection = Selection::new();
        let all = selectable_options(EntityType::Specialization, &selection, &catalog);
        assert_eq!(all.len(), 4);
        assert!(
            all.iter()
                .all(|o| o.reason == Some(LockReason::LockedNoClass))
        );

        selection.level = 10;
        selection.class_id = Some("warrior".to_string());
        let warrior = selectable_options(EntityType::Specialization, &selection, &catalog);
        assert_eq!(warrior.len(), 2);
        assert!(
            warrior
                .iter()
                .all(|o| o.reason == Some(LockReason::LockedLevel { required: 15 }))
        );

        selection.level = 15;
        let unlocked = selectable_options(EntityType::Specialization, &selection, &catalog);
        assert!(unlocked.iter().all(|o| o.selectable));
    }

    #[test]
    fn race_options_hide_subraces() {
        let catalog = fixture::catalog();
        let mut selection = Selection::new();
        let races = selectable_options(EntityType::Race, &selection, &catalog);
        assert!(races.iter().all(|o| o.entity.is_top_level()));
        assert!(subrace_options(&selection, &catalog).is_empty());

        selection.race_id = Some("race_human".to_string());
        let subraces = subrace_options(&selection, &catalog);
        assert_eq!(subraces.len(), 2);
    }

    #[test]
    fn options_outlive_the_selection_they_were_computed_for() {
        let catalog = fixture::catalog();
        let (specializations, subraces) = {
            let mut selection = Selection::new();
            selection.level = 15;
            selection.class_id = Some("warrior".to_string());
            selection.race_id = Some("race_human".to_string());
            (
                selectable_options(EntityType::Specialization, &selection, &catalog),
                subrace_options(&selection, &catalog),
            )
        };
        assert_eq!(specializations.len(), 2);
        assert!(specializations.iter().all(|o| o.selectable));
        assert_eq!(subraces.len(), 2);
    }

    #[test]
    fn joined_guilds_are_not_offered() {
        let catalog = fixture::catalog();
        let mut selection = Selection::new();
        let before = available_guilds(&selection, &catalog).len();
        selection.guild_ids.push("guild_ombres".to_string());
        let after = selectable_options(EntityType::Guild, &selection, &catalog);
        assert_eq!(after.len(), before - 1);
        assert!(after.iter().all(|o| o.entity.id != "guild_ombres"));
    }

    #[test]
    fn lock_reason_display_matches_codes() {
        assert_eq!(
            LockReason::LockedLevel { required: 15 }.to_string(),
            "LOCKED_LEVEL(15)"
        );
        assert_eq!(LockReason::LockedNoClass.to_string(), "LOCKED_NO_CLASS");
    }
}
