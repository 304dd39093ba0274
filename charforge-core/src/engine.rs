//! Mutation entry point and the ordered invalidation cascade.
//!
//! Every write to a [`Selection`] goes through [`apply_in_place`]: the direct
//! change is validated and written first, then each rule of [`CASCADE`]
//! whose trigger matches the written field runs, in order, against the
//! already updated selection.
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::catalog::{Catalog, EntityType};
use crate::constants::{
    CARD_TOGGLE_KEYS, CAREER_ADVENTURE, CAREER_COMMERCE, CAREER_INSTITUT, CAREER_RELIGION,
    INSTITUT_DIRECTOR_TIER, INSTITUT_RANK_KEY, POLITICAL_POINTS_KEY,
};
use crate::eligibility::{
    can_select_adventure_career, can_select_religion_career, career_lock_reason, is_class_locked,
    is_institut_director, is_specialization_locked,
};
use crate::guilds;
use crate::numbers::{clamp_level, political_points_in_range};
use crate::ranks::{ProfessionRank, RankLadder, SubProfessionEntry};
use crate::selection::{BonusStat, GuildLadder, Selection};

/// A single user action against the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum FieldChange {
    SetCharacterName(String),
    SetRace(Option<String>),
    SetSubRace(Option<String>),
    SetClass(Option<String>),
    SetSpecialization(Option<String>),
    SetLevel(i32),
    SetCareer(Option<String>),
    SetFaction(Option<String>),
    ToggleGuild(String),
    SetGuildRank {
        guild_id: String,
        rank_id: String,
        ladder: GuildLadder,
    },
    ToggleSubProfession(String),
    SetSubProfessionRank {
        id: String,
        rank: String,
    },
    SetMainProfession(Option<String>),
    SetProfessionRank(ProfessionRank),
    SetManualBonus {
        stat: BonusStat,
        value: i32,
    },
    SetPoliticalPoints(i32),
    SetSlider {
        key: String,
        value: i32,
    },
    SetToggle {
        key: String,
        value: bool,
    },
    SetRacialCompetence(bool),
    SetEliteCompetence(bool),
}

impl FieldChange {
    /// Field written directly by this change.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::SetCharacterName(_) => Field::CharacterName,
            Self::SetRace(_) => Field::Race,
            Self::SetSubRace(_) => Field::SubRace,
            Self::SetClass(_) => Field::Class,
            Self::SetSpecialization(_) => Field::Specialization,
            Self::SetLevel(_) => Field::Level,
            Self::SetCareer(_) => Field::Career,
            Self::SetFaction(_) => Field::Faction,
            Self::ToggleGuild(_) => Field::Guilds,
            Self::SetGuildRank { .. } => Field::GuildRanks,
            Self::ToggleSubProfession(_) | Self::SetSubProfessionRank { .. } => {
                Field::SubProfessions
            }
            Self::SetMainProfession(_) => Field::Profession,
            Self::SetProfessionRank(_) => Field::ProfessionRank,
            Self::SetManualBonus { .. } => Field::ManualBonuses,
            Self::SetPoliticalPoints(_) | Self::SetSlider { .. } => Field::Sliders,
            Self::SetToggle { .. } => Field::Toggles,
            Self::SetRacialCompetence(_) => Field::RacialCompetence,
            Self::SetEliteCompetence(_) => Field::EliteCompetence,
        }
    }
}

/// Selection fields, used as cascade triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CharacterName,
    Race,
    SubRace,
    Class,
    Specialization,
    Level,
    Career,
    Faction,
    Guilds,
    GuildRanks,
    SubProfessions,
    Profession,
    ProfessionRank,
    ManualBonuses,
    Sliders,
    Toggles,
    RacialCompetence,
    EliteCompetence,
}

/// A dependent field adjusted by the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Invalidation {
    ClearedSubRace,
    ClearedToggles,
    ClearedRacialCompetence,
    ClearedClass,
    ClearedSpecialization,
    ClearedEliteCompetence,
    ClearedCareer,
    ClearedCardToggles,
    DefaultedProfessionRank,
    ClearedProfessionRank,
}

pub type Invalidations = SmallVec<[Invalidation; 4]>;

/// What happened to a change passed to [`apply_in_place`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    /// False when the change was refused; the selection is then unchanged.
    pub applied: bool,
    /// Cascade adjustments, in rule order.
    pub invalidated: Invalidations,
}

impl ChangeReport {
    #[must_use]
    pub fn rejected() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cleared(&self, invalidation: Invalidation) -> bool {
        self.invalidated.contains(&invalidation)
    }
}

/// One step of the invalidation cascade.
pub struct InvalidationRule {
    pub name: &'static str,
    pub trigger: Field,
    run: fn(&mut Selection, &mut Invalidations),
}

/// Cascade rules in evaluation order.
pub const CASCADE: &[InvalidationRule] = &[
    InvalidationRule {
        name: "race-resets-dependents",
        trigger: Field::Race,
        run: race_resets_dependents,
    },
    InvalidationRule {
        name: "subrace-resets-competence",
        trigger: Field::SubRace,
        run: subrace_resets_competence,
    },
    InvalidationRule {
        name: "class-resets-dependents",
        trigger: Field::Class,
        run: class_resets_dependents,
    },
    InvalidationRule {
        name: "class-revokes-adventure-career",
        trigger: Field::Class,
        run: revokes_adventure_career,
    },
    InvalidationRule {
        name: "level-revokes-class",
        trigger: Field::Level,
        run: level_revokes_class,
    },
    InvalidationRule {
        name: "level-revokes-specialization",
        trigger: Field::Level,
        run: level_revokes_specialization,
    },
    InvalidationRule {
        name: "level-revokes-adventure-career",
        trigger: Field::Level,
        run: revokes_adventure_career,
    },
    InvalidationRule {
        name: "level-revokes-religion-career",
        trigger: Field::Level,
        run: level_revokes_religion_career,
    },
    InvalidationRule {
        name: "career-clears-card-toggles",
        trigger: Field::Career,
        run: career_clears_card_toggles,
    },
    InvalidationRule {
        name: "faction-revokes-career",
        trigger: Field::Faction,
        run: faction_revokes_career,
    },
    InvalidationRule {
        name: "profession-derives-rank",
        trigger: Field::Profession,
        run: profession_derives_rank,
    },
];

/// Apply a change to a copy of the selection.
#[must_use]
pub fn apply(selection: &Selection, catalog: &Catalog, change: FieldChange) -> Selection {
    let mut next = selection.clone();
    apply_in_place(&mut next, catalog, change);
    next
}

/// Apply a change and run the cascade for the field it wrote.
pub fn apply_in_place(
    selection: &mut Selection,
    catalog: &Catalog,
    change: FieldChange,
) -> ChangeReport {
    let field = change.field();
    if !write_direct(selection, catalog, &change) {
        debug!("rejected {change:?}");
        return ChangeReport::rejected();
    }
    trace!("applied {change:?}");

    let mut invalidated = Invalidations::new();
    for rule in CASCADE.iter().filter(|rule| rule.trigger == field) {
        let before = invalidated.len();
        (rule.run)(selection, &mut invalidated);
        for invalidation in &invalidated[before..] {
            debug!("{}: {invalidation:?}", rule.name);
        }
    }

    ChangeReport {
        applied: true,
        invalidated,
    }
}

fn write_direct(selection: &mut Selection, catalog: &Catalog, change: &FieldChange) -> bool {
    match change {
        FieldChange::SetCharacterName(name) => {
            selection.character_name.clone_from(name);
            true
        }
        FieldChange::SetRace(race_id) => {
            let top_level = race_id.as_deref().is_none_or(|id| {
                catalog
                    .get_typed(id, EntityType::Race)
                    .is_some_and(|race| race.is_top_level())
            });
            top_level && assign(&mut selection.race_id, race_id)
        }
        FieldChange::SetSubRace(sub_race_id) => {
            let valid = sub_race_id.as_deref().is_none_or(|id| {
                let parent = selection.race_id.as_deref();
                catalog
                    .get_typed(id, EntityType::Race)
                    .is_some_and(|sub| parent.is_some_and(|race| sub.is_child_of(race)))
            });
            valid && assign(&mut selection.sub_race_id, sub_race_id)
        }
        FieldChange::SetClass(class_id) => {
            let valid = class_id.as_deref().is_none_or(|id| {
                !is_class_locked(selection) && catalog.contains(id, EntityType::Class)
            });
            valid && assign(&mut selection.class_id, class_id)
        }
        FieldChange::SetSpecialization(spec_id) => {
            let valid = spec_id.as_deref().is_none_or(|id| {
                let class = selection.class_id.as_deref();
                !is_specialization_locked(selection)
                    && catalog
                        .get_typed(id, EntityType::Specialization)
                        .is_some_and(|spec| class.is_some_and(|class| spec.is_child_of(class)))
            });
            valid && assign(&mut selection.specialization_id, spec_id)
        }
        FieldChange::SetLevel(level) => {
            selection.level = clamp_level(*level);
            true
        }
        FieldChange::SetCareer(career_id) => {
            let valid = career_id.as_deref().is_none_or(|id| {
                catalog.contains(id, EntityType::Career)
                    && career_lock_reason(id, selection).is_none()
            });
            valid && assign(&mut selection.career_id, career_id)
        }
        FieldChange::SetFaction(faction_id) => {
            let valid = faction_id
                .as_deref()
                .is_none_or(|id| catalog.contains(id, EntityType::Faction));
            valid && assign(&mut selection.faction_id, faction_id)
        }
        FieldChange::ToggleGuild(guild_id) => guilds::toggle_guild(selection, catalog, guild_id),
        FieldChange::SetGuildRank {
            guild_id,
            rank_id,
            ladder,
        } => guilds::set_rank(selection, catalog, guild_id, rank_id, *ladder),
        FieldChange::ToggleSubProfession(id) => toggle_sub_profession(selection, catalog, id),
        FieldChange::SetSubProfessionRank { id, rank } => {
            set_sub_profession_rank(selection, catalog, id, rank)
        }
        FieldChange::SetMainProfession(profession_id) => {
            let valid = profession_id
                .as_deref()
                .is_none_or(|id| catalog.contains(id, EntityType::Profession));
            valid && assign(&mut selection.profession_id, profession_id)
        }
        FieldChange::SetProfessionRank(rank) => {
            if selection.profession_id.is_none() {
                return false;
            }
            selection.profession_rank = Some(*rank);
            true
        }
        FieldChange::SetManualBonus { stat, value } => {
            selection.guild_manual_bonuses.set(*stat, *value);
            true
        }
        FieldChange::SetPoliticalPoints(value) => set_political_points(selection, *value),
        FieldChange::SetSlider { key, value } => set_slider(selection, key, *value),
        FieldChange::SetToggle { key, value } => {
            selection.toggles.insert(key.clone(), *value);
            true
        }
        FieldChange::SetRacialCompetence(active) => {
            if *active && selection.race_id.is_none() {
                return false;
            }
            selection.racial_competence_active = *active;
            true
        }
        FieldChange::SetEliteCompetence(active) => {
            if *active && selection.class_id.is_none() {
                return false;
            }
            selection.elite_competence_active = *active;
            true
        }
    }
}

fn assign(slot: &mut Option<String>, value: &Option<String>) -> bool {
    slot.clone_from(value);
    true
}

fn toggle_sub_profession(selection: &mut Selection, catalog: &Catalog, id: &str) -> bool {
    if selection.sub_professions.remove(id).is_some() {
        return true;
    }
    let Some(entity) = catalog.get_typed(id, EntityType::SubProfession) else {
        return false;
    };
    selection
        .sub_professions
        .insert(id.to_string(), SubProfessionEntry::default_for(entity));
    true
}

fn set_sub_profession_rank(
    selection: &mut Selection,
    catalog: &Catalog,
    id: &str,
    rank: &str,
) -> bool {
    let Some(ladder) = catalog
        .get_typed(id, EntityType::SubProfession)
        .and_then(RankLadder::for_entity)
    else {
        return false;
    };
    if !ladder.contains(rank) {
        return false;
    }
    match selection.sub_professions.get_mut(id) {
        Some(entry) => {
            *entry = SubProfessionEntry::Ranked(rank.to_string());
            true
        }
        None => false,
    }
}

fn set_political_points(selection: &mut Selection, value: i32) -> bool {
    if !political_points_in_range(value) {
        return false;
    }
    selection
        .slider_values
        .insert(POLITICAL_POINTS_KEY.to_string(), value);
    true
}

fn set_slider(selection: &mut Selection, key: &str, value: i32) -> bool {
    match key {
        POLITICAL_POINTS_KEY => set_political_points(selection, value),
        INSTITUT_RANK_KEY => {
            let value = value.clamp(0, INSTITUT_DIRECTOR_TIER);
            let promotes_director = selection.has_career(CAREER_INSTITUT)
                && value >= INSTITUT_DIRECTOR_TIER
                && selection.faction_id.is_some();
            if promotes_director {
                return false;
            }
            selection.slider_values.insert(key.to_string(), value);
            true
        }
        _ => {
            selection.slider_values.insert(key.to_string(), value);
            true
        }
    }
}

fn clear_option(slot: &mut Option<String>) -> bool {
    slot.take().is_some()
}

fn clear_flag(flag: &mut bool) -> bool {
    std::mem::take(flag)
}

fn race_resets_dependents(selection: &mut Selection, out: &mut Invalidations) {
    if clear_option(&mut selection.sub_race_id) {
        out.push(Invalidation::ClearedSubRace);
    }
    if !selection.toggles.is_empty() {
        selection.toggles.clear();
        out.push(Invalidation::ClearedToggles);
    }
    if clear_flag(&mut selection.racial_competence_active) {
        out.push(Invalidation::ClearedRacialCompetence);
    }
}

fn subrace_resets_competence(selection: &mut Selection, out: &mut Invalidations) {
    if clear_flag(&mut selection.racial_competence_active) {
        out.push(Invalidation::ClearedRacialCompetence);
    }
}

fn class_resets_dependents(selection: &mut Selection, out: &mut Invalidations) {
    if clear_option(&mut selection.specialization_id) {
        out.push(Invalidation::ClearedSpecialization);
    }
    if !selection.toggles.is_empty() {
        selection.toggles.clear();
        out.push(Invalidation::ClearedToggles);
    }
    if clear_flag(&mut selection.elite_competence_active) {
        out.push(Invalidation::ClearedEliteCompetence);
    }
}

fn level_revokes_class(selection: &mut Selection, out: &mut Invalidations) {
    if selection.class_id.is_none() || !is_class_locked(selection) {
        return;
    }
    selection.class_id = None;
    out.push(Invalidation::ClearedClass);
    if clear_option(&mut selection.specialization_id) {
        out.push(Invalidation::ClearedSpecialization);
    }
    if clear_flag(&mut selection.elite_competence_active) {
        out.push(Invalidation::ClearedEliteCompetence);
    }
}

fn level_revokes_specialization(selection: &mut Selection, out: &mut Invalidations) {
    if selection.specialization_id.is_some() && is_specialization_locked(selection) {
        selection.specialization_id = None;
        out.push(Invalidation::ClearedSpecialization);
    }
}

fn revokes_adventure_career(selection: &mut Selection, out: &mut Invalidations) {
    if selection.has_career(CAREER_ADVENTURE) && !can_select_adventure_career(selection) {
        selection.career_id = None;
        out.push(Invalidation::ClearedCareer);
    }
}

fn level_revokes_religion_career(selection: &mut Selection, out: &mut Invalidations) {
    if selection.has_career(CAREER_RELIGION) && !can_select_religion_career(selection) {
        selection.career_id = None;
        out.push(Invalidation::ClearedCareer);
    }
}

fn career_clears_card_toggles(selection: &mut Selection, out: &mut Invalidations) {
    let mut cleared = false;
    for key in CARD_TOGGLE_KEYS {
        cleared |= selection.toggles.remove(key).is_some();
    }
    if cleared {
        out.push(Invalidation::ClearedCardToggles);
    }
}

fn faction_revokes_career(selection: &mut Selection, out: &mut Invalidations) {
    if selection.faction_id.is_none() {
        return;
    }
    if selection.has_career(CAREER_COMMERCE) || is_institut_director(selection) {
        selection.career_id = None;
        out.push(Invalidation::ClearedCareer);
    }
}

fn profession_derives_rank(selection: &mut Selection, out: &mut Invalidations) {
    if selection.profession_id.is_some() {
        if selection.profession_rank.is_none() {
            selection.profession_rank = Some(ProfessionRank::LOWEST);
            out.push(Invalidation::DefaultedProfessionRank);
        }
    } else if selection.profession_rank.take().is_some() {
        out.push(Invalidation::ClearedProfessionRank);
    }
}
