use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use charforge_core::constants::{CARD_TOGGLE_KEYS, INSTITUT_RANK_KEY, POLITICAL_POINTS_KEY};
use charforge_core::{
    BonusStat, Catalog, EntityType, FieldChange, GuildLadder, Invalidation, ProfessionRank,
    Selection, apply, apply_in_place, check_invariants,
};

fn catalog() -> Catalog {
    Catalog::from_json(include_str!("data/catalog.json")).unwrap()
}

fn ids(catalog: &Catalog, kind: EntityType) -> Vec<String> {
    catalog.of_type(kind).map(|e| e.id.clone()).collect()
}

fn built(catalog: &Catalog, level: i32, class_id: &str) -> Selection {
    let mut selection = Selection::new();
    apply_in_place(&mut selection, catalog, FieldChange::SetLevel(level));
    apply_in_place(
        &mut selection,
        catalog,
        FieldChange::SetClass(Some(class_id.to_string())),
    );
    selection
}

#[test]
fn dropping_below_five_always_clears_class_specialization_and_elite() {
    let catalog = catalog();
    for spec in catalog.of_type(EntityType::Specialization) {
        let class_id = spec.parent_id.as_deref().unwrap();
        for from in 15..=60 {
            let mut selection = built(&catalog, from, class_id);
            apply_in_place(
                &mut selection,
                &catalog,
                FieldChange::SetSpecialization(Some(spec.id.clone())),
            );
            apply_in_place(
                &mut selection,
                &catalog,
                FieldChange::SetEliteCompetence(true),
            );
            for to in 0..5 {
                let next = apply(&selection, &catalog, FieldChange::SetLevel(to));
                assert!(next.class_id.is_none());
                assert!(next.specialization_id.is_none());
                assert!(!next.elite_competence_active);
            }
        }
    }
}

#[test]
fn dropping_into_mid_levels_clears_only_specialization() {
    let catalog = catalog();
    let mut selection = built(&catalog, 40, "warrior");
    apply_in_place(
        &mut selection,
        &catalog,
        FieldChange::SetSpecialization(Some("spec_guardian".to_string())),
    );
    apply_in_place(
        &mut selection,
        &catalog,
        FieldChange::SetEliteCompetence(true),
    );
    for to in 5..15 {
        let mut next = selection.clone();
        let report = apply_in_place(&mut next, &catalog, FieldChange::SetLevel(to));
        assert_eq!(
            report.invalidated.as_slice(),
            &[Invalidation::ClearedSpecialization]
        );
        assert_eq!(next.class_id.as_deref(), Some("warrior"));
        assert!(next.elite_competence_active);
    }
}

#[test]
fn any_faction_clears_commerce() {
    let catalog = catalog();
    for faction in ids(&catalog, EntityType::Faction) {
        let mut selection = Selection::new();
        apply_in_place(
            &mut selection,
            &catalog,
            FieldChange::SetCareer(Some("career_commerce".to_string())),
        );
        apply_in_place(
            &mut selection,
            &catalog,
            FieldChange::SetFaction(Some(faction)),
        );
        assert!(selection.career_id.is_none());
        let retry = apply(
            &selection,
            &catalog,
            FieldChange::SetCareer(Some("career_commerce".to_string())),
        );
        assert_eq!(retry, selection);
    }
}

#[test]
fn set_race_always_clears_subrace() {
    let catalog = catalog();
    let races: Vec<_> = catalog
        .of_type(EntityType::Race)
        .filter(|race| race.is_top_level())
        .map(|race| race.id.clone())
        .collect();
    for subrace in catalog
        .of_type(EntityType::Race)
        .filter(|race| !race.is_top_level())
    {
        let mut selection = Selection::new();
        apply_in_place(
            &mut selection,
            &catalog,
            FieldChange::SetRace(subrace.parent_id.clone()),
        );
        apply_in_place(
            &mut selection,
            &catalog,
            FieldChange::SetSubRace(Some(subrace.id.clone())),
        );
        assert!(selection.sub_race_id.is_some());
        for race in &races {
            let next = apply(
                &selection,
                &catalog,
                FieldChange::SetRace(Some(race.clone())),
            );
            assert!(next.sub_race_id.is_none());
        }
    }
}

#[test]
fn toggling_a_sub_profession_twice_restores_membership() {
    let catalog = catalog();
    let mut base = Selection::new();
    apply_in_place(
        &mut base,
        &catalog,
        FieldChange::ToggleSubProfession("sub_cuisine".to_string()),
    );
    for sub in ids(&catalog, EntityType::SubProfession) {
        if base.sub_professions.contains_key(&sub) {
            continue;
        }
        let once = apply(
            &base,
            &catalog,
            FieldChange::ToggleSubProfession(sub.clone()),
        );
        assert!(once.sub_professions.contains_key(&sub));
        let twice = apply(
            &once,
            &catalog,
            FieldChange::ToggleSubProfession(sub.clone()),
        );
        assert_eq!(twice.sub_professions, base.sub_professions);
    }
}

#[test]
fn political_points_outside_bounds_never_stick() {
    let catalog = catalog();
    let mut selection = Selection::new();
    apply_in_place(
        &mut selection,
        &catalog,
        FieldChange::SetPoliticalPoints(-75),
    );
    for value in [-10_000, -301, 301, 302, 10_000, i32::MIN, i32::MAX] {
        let next = apply(&selection, &catalog, FieldChange::SetPoliticalPoints(value));
        assert_eq!(next.political_points(), -75);
    }
    for value in [-300, 0, 300] {
        let next = apply(&selection, &catalog, FieldChange::SetPoliticalPoints(value));
        assert_eq!(next.political_points(), value);
    }
}

fn pick<'a, R: Rng>(rng: &mut R, pool: &'a [String]) -> &'a String {
    &pool[rng.gen_range(0..pool.len())]
}

fn random_change<R: Rng>(rng: &mut R, catalog: &Catalog) -> FieldChange {
    let races = ids(catalog, EntityType::Race);
    let classes = ids(catalog, EntityType::Class);
    let specs = ids(catalog, EntityType::Specialization);
    let careers = ids(catalog, EntityType::Career);
    let factions = ids(catalog, EntityType::Faction);
    let guilds = ids(catalog, EntityType::Guild);
    let subs = ids(catalog, EntityType::SubProfession);
    let professions = ids(catalog, EntityType::Profession);

    match rng.gen_range(0..16) {
        0 => FieldChange::SetLevel(rng.gen_range(-5..70)),
        1 => FieldChange::SetRace(Some(pick(rng, &races).clone())),
        2 => FieldChange::SetSubRace(Some(pick(rng, &races).clone())),
        3 => FieldChange::SetClass(if rng.gen_bool(0.15) {
            None
        } else {
            Some(pick(rng, &classes).clone())
        }),
        4 => FieldChange::SetSpecialization(Some(pick(rng, &specs).clone())),
        5 => FieldChange::SetCareer(Some(pick(rng, &careers).clone())),
        6 => {
            if rng.gen_bool(0.3) {
                FieldChange::SetFaction(None)
            } else {
                FieldChange::SetFaction(Some(pick(rng, &factions).clone()))
            }
        }
        7 => FieldChange::ToggleGuild(pick(rng, &guilds).clone()),
        8 => FieldChange::SetGuildRank {
            guild_id: pick(rng, &guilds).clone(),
            rank_id: format!("rank_{}", rng.gen_range(0..3)),
            ladder: if rng.gen_bool(0.5) {
                GuildLadder::Primary
            } else {
                GuildLadder::Secondary
            },
        },
        9 => FieldChange::ToggleSubProfession(pick(rng, &subs).clone()),
        10 => FieldChange::SetMainProfession(if rng.gen_bool(0.2) {
            None
        } else {
            Some(pick(rng, &professions).clone())
        }),
        11 => FieldChange::SetProfessionRank(
            ProfessionRank::ALL[rng.gen_range(0..ProfessionRank::ALL.len())],
        ),
        12 => FieldChange::SetPoliticalPoints(rng.gen_range(-400..400)),
        13 => FieldChange::SetSlider {
            key: INSTITUT_RANK_KEY.to_string(),
            value: rng.gen_range(0..5),
        },
        14 => FieldChange::SetToggle {
            key: CARD_TOGGLE_KEYS[rng.gen_range(0..CARD_TOGGLE_KEYS.len())].to_string(),
            value: rng.gen_bool(0.5),
        },
        _ => FieldChange::SetManualBonus {
            stat: BonusStat::ALL[rng.gen_range(0..BonusStat::ALL.len())],
            value: rng.gen_range(-50..50),
        },
    }
}

#[test]
fn random_walks_never_break_invariants() {
    let catalog = catalog();
    for seed in [1_u64, 7, 42, 1337, 0xC0FFEE] {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut selection = Selection::new();
        for step in 0..500 {
            let change = random_change(&mut rng, &catalog);
            let before = selection.clone();
            let report = apply_in_place(&mut selection, &catalog, change.clone());
            if !report.applied {
                assert_eq!(selection, before, "seed {seed} step {step}: {change:?}");
            }
            if let Err(err) = check_invariants(&selection, &catalog) {
                panic!("seed {seed} step {step} after {change:?}: {err}");
            }
            assert!(
                selection
                    .slider_values
                    .get(POLITICAL_POINTS_KEY)
                    .is_none_or(|points| points.abs() <= 300)
            );
        }
    }
}
