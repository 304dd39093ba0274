//! Consistency checks that must hold after every applied change.
use thiserror::Error;

use crate::catalog::{Catalog, EntityType};
use crate::constants::{
    CAREER_ADVENTURE, CAREER_COMMERCE, CAREER_RELIGION, LEVEL_MAX, POLITICAL_POINTS_MAX,
    POLITICAL_POINTS_MIN,
};
use crate::eligibility::{
    can_select_adventure_career, can_select_religion_career, is_class_locked, is_institut_director,
    is_specialization_locked,
};
use crate::numbers::political_points_in_range;
use crate::ranks::{RankLadder, SubProfessionEntry};
use crate::selection::{GuildLadder, Selection};

/// First inconsistency found in a selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("level {level} exceeds maximum {max}")]
    LevelOutOfRange { level: u8, max: u8 },
    #[error("class '{class_id}' selected below the class unlock level")]
    ClassBelowLevel { class_id: String },
    #[error("specialization '{spec_id}' selected below the specialization unlock level")]
    SpecializationBelowLevel { spec_id: String },
    #[error("specialization '{spec_id}' does not belong to the selected class")]
    SpecializationClassMismatch { spec_id: String },
    #[error("career '{career_id}' is not eligible for the current selection")]
    CareerIneligible { career_id: String },
    #[error("career '{career_id}' conflicts with faction '{faction_id}'")]
    CareerFactionConflict {
        career_id: String,
        faction_id: String,
    },
    #[error("subrace '{sub_race_id}' does not belong to the selected race")]
    SubRaceMismatch { sub_race_id: String },
    #[error("{ladder:?} rank stored for guild '{guild_id}' which is not joined")]
    OrphanGuildRank {
        guild_id: String,
        ladder: GuildLadder,
    },
    #[error("guild '{guild_id}' joined more than once")]
    DuplicateGuild { guild_id: String },
    #[error("political points {value} outside [{min}, {max}]")]
    PoliticalPointsOutOfRange { value: i32, min: i32, max: i32 },
    #[error("profession rank does not match profession presence")]
    ProfessionRankMismatch,
    #[error("sub-profession '{id}' holds rank '{rank}' outside its ladder")]
    SubProfessionRank { id: String, rank: String },
    #[error("{field} references unknown {kind} '{id}'")]
    UnknownReference {
        field: &'static str,
        kind: EntityType,
        id: String,
    },
}

/// Verify a selection against the catalog.
///
/// # Errors
///
/// Returns the first violated invariant.
pub fn check_invariants(
    selection: &Selection,
    catalog: &Catalog,
) -> Result<(), InvariantViolation> {
    check_references(selection, catalog)?;

    if selection.level > LEVEL_MAX {
        return Err(InvariantViolation::LevelOutOfRange {
            level: selection.level,
            max: LEVEL_MAX,
        });
    }

    if let Some(class_id) = &selection.class_id
        && is_class_locked(selection)
    {
        return Err(InvariantViolation::ClassBelowLevel {
            class_id: class_id.clone(),
        });
    }

    if let Some(spec_id) = &selection.specialization_id {
        if is_specialization_locked(selection) {
            return Err(InvariantViolation::SpecializationBelowLevel {
                spec_id: spec_id.clone(),
            });
        }
        let owned = selection.class_id.as_deref().is_some_and(|class_id| {
            catalog
                .get(spec_id)
                .is_some_and(|spec| spec.is_child_of(class_id))
        });
        if !owned {
            return Err(InvariantViolation::SpecializationClassMismatch {
                spec_id: spec_id.clone(),
            });
        }
    }

    check_career(selection)?;

    if let Some(sub_race_id) = &selection.sub_race_id {
        let matches = selection.race_id.as_deref().is_some_and(|race_id| {
            catalog
                .get(sub_race_id)
                .is_some_and(|sub| sub.is_child_of(race_id))
        });
        if !matches {
            return Err(InvariantViolation::SubRaceMismatch {
                sub_race_id: sub_race_id.clone(),
            });
        }
    }

    check_guilds(selection)?;

    let points = selection.political_points();
    if !political_points_in_range(points) {
        return Err(InvariantViolation::PoliticalPointsOutOfRange {
            value: points,
            min: POLITICAL_POINTS_MIN,
            max: POLITICAL_POINTS_MAX,
        });
    }

    if selection.profession_id.is_some() != selection.profession_rank.is_some() {
        return Err(InvariantViolation::ProfessionRankMismatch);
    }

    for (id, entry) in &selection.sub_professions {
        let SubProfessionEntry::Ranked(rank) = entry else {
            continue;
        };
        let on_ladder = catalog
            .get(id)
            .and_then(RankLadder::for_entity)
            .is_some_and(|ladder| ladder.contains(rank));
        if !on_ladder {
            return Err(InvariantViolation::SubProfessionRank {
                id: id.clone(),
                rank: rank.clone(),
            });
        }
    }

    Ok(())
}

fn check_references(selection: &Selection, catalog: &Catalog) -> Result<(), InvariantViolation> {
    let singles = [
        ("race_id", EntityType::Race, &selection.race_id),
        ("sub_race_id", EntityType::Race, &selection.sub_race_id),
        ("class_id", EntityType::Class, &selection.class_id),
        (
            "specialization_id",
            EntityType::Specialization,
            &selection.specialization_id,
        ),
        ("profession_id", EntityType::Profession, &selection.profession_id),
        ("career_id", EntityType::Career, &selection.career_id),
        ("faction_id", EntityType::Faction, &selection.faction_id),
    ];
    let guilds = selection
        .guild_ids
        .iter()
        .map(|id| ("guild_ids", EntityType::Guild, id));
    let subs = selection
        .sub_professions
        .keys()
        .map(|id| ("sub_professions", EntityType::SubProfession, id));

    singles
        .into_iter()
        .filter_map(|(field, kind, id)| id.as_ref().map(|id| (field, kind, id)))
        .chain(guilds)
        .chain(subs)
        .find(|(_, kind, id)| !catalog.contains(id, *kind))
        .map_or(Ok(()), |(field, kind, id)| {
            Err(InvariantViolation::UnknownReference {
                field,
                kind,
                id: id.clone(),
            })
        })
}

fn check_career(selection: &Selection) -> Result<(), InvariantViolation> {
    let Some(career_id) = selection.career_id.as_deref() else {
        return Ok(());
    };
    let eligible = match career_id {
        CAREER_ADVENTURE => can_select_adventure_career(selection),
        CAREER_RELIGION => can_select_religion_career(selection),
        _ => true,
    };
    if !eligible {
        return Err(InvariantViolation::CareerIneligible {
            career_id: career_id.to_string(),
        });
    }
    if let Some(faction_id) = selection.faction_id.as_deref()
        && (career_id == CAREER_COMMERCE || is_institut_director(selection))
    {
        return Err(InvariantViolation::CareerFactionConflict {
            career_id: career_id.to_string(),
            faction_id: faction_id.to_string(),
        });
    }
    Ok(())
}

fn check_guilds(selection: &Selection) -> Result<(), InvariantViolation> {
    for (pos, guild_id) in selection.guild_ids.iter().enumerate() {
        if selection.guild_ids[..pos].contains(guild_id) {
            return Err(InvariantViolation::DuplicateGuild {
                guild_id: guild_id.clone(),
            });
        }
    }
    for ladder in [GuildLadder::Primary, GuildLadder::Secondary] {
        if let Some(guild_id) = selection
            .guild_rank_map(ladder)
            .keys()
            .find(|id| !selection.has_guild(id))
        {
            return Err(InvariantViolation::OrphanGuildRank {
                guild_id: guild_id.clone(),
                ladder,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixture;

    #[test]
    fn empty_selection_is_consistent() {
        let catalog = fixture::catalog();
        assert_eq!(check_invariants(&Selection::new(), &catalog), Ok(()));
    }

    #[test]
    fn hand_built_class_below_level_is_reported() {
        let catalog = fixture::catalog();
        let mut selection = Selection::new();
        selection.class_id = Some("warrior".to_string());
        assert!(matches!(
            check_invariants(&selection, &catalog),
            Err(InvariantViolation::ClassBelowLevel { .. })
        ));
    }

    #[test]
    fn orphan_guild_ranks_are_reported() {
        let catalog = fixture::catalog();
        let mut selection = Selection::new();
        selection
            .guild_ranks
            .insert("guild_ombres".to_string(), "ombre_lame".to_string());
        assert_eq!(
            check_invariants(&selection, &catalog),
            Err(InvariantViolation::OrphanGuildRank {
                guild_id: "guild_ombres".to_string(),
                ladder: GuildLadder::Primary,
            })
        );
    }

    #[test]
    fn commerce_with_faction_is_reported() {
        let catalog = fixture::catalog();
        let mut selection = Selection::new();
        selection.career_id = Some(CAREER_COMMERCE.to_string());
        selection.faction_id = Some("faction_empire".to_string());
        assert!(matches!(
            check_invariants(&selection, &catalog),
            Err(InvariantViolation::CareerFactionConflict { .. })
        ));
    }

    #[test]
    fn unknown_references_are_reported() {
        let catalog = fixture::catalog();
        let mut selection = Selection::new();
        selection.guild_ids.push("guild_ghost".to_string());
        assert_eq!(
            check_invariants(&selection, &catalog),
            Err(InvariantViolation::UnknownReference {
                field: "guild_ids",
                kind: EntityType::Guild,
                id: "guild_ghost".to_string(),
            })
        );
    }

    #[test]
    fn off_ladder_sub_profession_rank_is_reported() {
        let catalog = fixture::catalog();
        let mut selection = Selection::new();
        selection.sub_professions.insert(
            "sub_enchanteur".to_string(),
            SubProfessionEntry::Ranked("Maître".to_string()),
        );
        assert!(matches!(
            check_invariants(&selection, &catalog),
            Err(InvariantViolation::SubProfessionRank { .. })
        ));
    }
}
