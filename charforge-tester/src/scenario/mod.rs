use anyhow::{Result, ensure};

use charforge_core::{FieldChange, GuildLadder, Invalidation, SubProfessionEntry};

use crate::logic::{BuildPlan, BuildSummary};

/// Named build plan run by the logic tester.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: BuildPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: BuildPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

const RANDOM_WALK_STEPS: usize = 250;

fn id(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn class_gating_expectation(summary: &BuildSummary) -> Result<()> {
    let selection = &summary.selection;
    ensure!(
        selection.level == 4,
        "level should be 4, got {}",
        selection.level
    );
    ensure!(
        selection.class_id.is_none(),
        "class should be cleared below level 5"
    );
    ensure!(
        summary
            .report(2)
            .is_some_and(|report| report.cleared(Invalidation::ClearedClass)),
        "level drop should report the class as cleared"
    );
    Ok(())
}

fn specialization_gating_expectation(summary: &BuildSummary) -> Result<()> {
    let selection = &summary.selection;
    ensure!(
        selection.class_id.as_deref() == Some("mage"),
        "class should survive a drop to level 10"
    );
    ensure!(
        selection.specialization_id.is_none(),
        "specialization should be cleared below level 15"
    );
    Ok(())
}

fn commerce_faction_expectation(summary: &BuildSummary) -> Result<()> {
    let selection = &summary.selection;
    ensure!(
        selection.faction_id.as_deref() == Some("faction_empire"),
        "faction should be set"
    );
    ensure!(
        selection.career_id.is_none(),
        "commerce career should be dropped by the faction pick"
    );
    ensure!(
        summary.report(2).is_some_and(|report| !report.applied),
        "commerce should be refused while a faction is set"
    );
    Ok(())
}

fn enchanter_default_expectation(summary: &BuildSummary) -> Result<()> {
    let entry = summary.selection.sub_professions.get("sub_enchanteur");
    ensure!(
        entry == Some(&SubProfessionEntry::Ranked("Disciple".to_string())),
        "enchanter sub-profession should start as Disciple, got {entry:?}"
    );
    let poison = summary.selection.sub_professions.get("sub_poison_letal");
    ensure!(
        poison.and_then(SubProfessionEntry::rank) == Some("Débutant"),
        "poison sub-profession should start as Débutant, got {poison:?}"
    );
    Ok(())
}

fn political_clamp_expectation(summary: &BuildSummary) -> Result<()> {
    let points = summary.selection.political_points();
    ensure!(
        points == 50,
        "political points should stay at 50, got {points}"
    );
    ensure!(
        summary.rejected() == 2,
        "both out-of-range writes should be refused"
    );
    Ok(())
}

fn subrace_reset_expectation(summary: &BuildSummary) -> Result<()> {
    let selection = &summary.selection;
    ensure!(
        selection.race_id.as_deref() == Some("race_elf"),
        "race should switch to elf"
    );
    ensure!(selection.sub_race_id.is_none(), "subrace should be cleared");
    ensure!(
        !selection.racial_competence_active,
        "racial competence should be cleared"
    );
    ensure!(selection.toggles.is_empty(), "toggles should be cleared");
    Ok(())
}

fn guild_ranks_expectation(summary: &BuildSummary) -> Result<()> {
    let selection = &summary.selection;
    ensure!(
        selection.has_guild("guild_marchands"),
        "guild should be joined again"
    );
    ensure!(
        selection.guild_rank("guild_marchands", GuildLadder::Primary) == Some("marchand_maitre"),
        "primary rank should be restored on re-join"
    );
    ensure!(
        selection.guild_rank("guild_marchands", GuildLadder::Secondary)
            == Some("marchand_tresorier"),
        "secondary rank should be restored on re-join"
    );
    ensure!(
        summary.report(5).is_some_and(|report| !report.applied),
        "a guild without ranks should refuse rank assignment"
    );
    Ok(())
}

fn profession_rank_expectation(summary: &BuildSummary) -> Result<()> {
    let selection = &summary.selection;
    ensure!(
        selection.profession_id.as_deref() == Some("prof_artisan"),
        "profession should switch to artisan"
    );
    ensure!(
        selection.profession_rank.map(|rank| rank.as_str()) == Some("Compagnon"),
        "profession rank should carry over a profession switch"
    );
    Ok(())
}

fn card_toggles_expectation(summary: &BuildSummary) -> Result<()> {
    let selection = &summary.selection;
    ensure!(
        selection.career_id.as_deref() == Some("career_commerce"),
        "career should switch to commerce"
    );
    ensure!(
        selection.card_toggles_on() == 0,
        "{} card toggles survived the career change",
        selection.card_toggles_on()
    );
    ensure!(
        selection.toggle("mount_owned"),
        "toggles outside the card set should survive a career change"
    );
    ensure!(
        summary
            .report(4)
            .is_some_and(|report| report.cleared(Invalidation::ClearedCardToggles)),
        "career change should report the card toggles as cleared"
    );
    Ok(())
}

fn random_walk_expectation(summary: &BuildSummary) -> Result<()> {
    ensure!(
        summary.reports.len() == RANDOM_WALK_STEPS,
        "walk stopped after {} of {RANDOM_WALK_STEPS} steps",
        summary.reports.len()
    );
    Ok(())
}

fn class_gating_scenario() -> TestScenario {
    TestScenario::new(
        "Class Gating",
        BuildPlan::new(vec![
            FieldChange::SetLevel(5),
            FieldChange::SetClass(id("warrior")),
            FieldChange::SetLevel(4),
        ])
        .with_expectation(class_gating_expectation),
    )
}

fn specialization_gating_scenario() -> TestScenario {
    TestScenario::new(
        "Specialization Gating",
        BuildPlan::new(vec![
            FieldChange::SetLevel(20),
            FieldChange::SetClass(id("mage")),
            FieldChange::SetSpecialization(id("spec_pyromancer")),
            FieldChange::SetLevel(10),
        ])
        .with_expectation(specialization_gating_expectation),
    )
}

fn commerce_faction_scenario() -> TestScenario {
    TestScenario::new(
        "Commerce / Faction Exclusion",
        BuildPlan::new(vec![
            FieldChange::SetCareer(id("career_commerce")),
            FieldChange::SetFaction(id("faction_empire")),
            FieldChange::SetCareer(id("career_commerce")),
        ])
        .with_expectation(commerce_faction_expectation),
    )
}

fn enchanter_default_scenario() -> TestScenario {
    TestScenario::new(
        "Sub-profession Default Ranks",
        BuildPlan::new(vec![
            FieldChange::ToggleSubProfession("sub_enchanteur".to_string()),
            FieldChange::ToggleSubProfession("sub_poison_letal".to_string()),
        ])
        .with_expectation(enchanter_default_expectation),
    )
}

fn political_clamp_scenario() -> TestScenario {
    TestScenario::new(
        "Political Points Bounds",
        BuildPlan::new(vec![
            FieldChange::SetPoliticalPoints(50),
            FieldChange::SetPoliticalPoints(500),
            FieldChange::SetPoliticalPoints(-301),
        ])
        .with_expectation(political_clamp_expectation),
    )
}

fn subrace_reset_scenario() -> TestScenario {
    TestScenario::new(
        "Race Change Resets",
        BuildPlan::new(vec![
            FieldChange::SetRace(id("race_human")),
            FieldChange::SetSubRace(id("subrace_highlander")),
            FieldChange::SetRacialCompetence(true),
            FieldChange::SetToggle {
                key: "mount_owned".to_string(),
                value: true,
            },
            FieldChange::SetRace(id("race_elf")),
        ])
        .with_expectation(subrace_reset_expectation),
    )
}

fn guild_ranks_scenario() -> TestScenario {
    let marchands = || "guild_marchands".to_string();
    TestScenario::new(
        "Guild Rank Retention",
        BuildPlan::new(vec![
            FieldChange::ToggleGuild(marchands()),
            FieldChange::SetGuildRank {
                guild_id: marchands(),
                rank_id: "marchand_maitre".to_string(),
                ladder: GuildLadder::Primary,
            },
            FieldChange::SetGuildRank {
                guild_id: marchands(),
                rank_id: "marchand_tresorier".to_string(),
                ladder: GuildLadder::Secondary,
            },
            FieldChange::ToggleGuild(marchands()),
            FieldChange::ToggleGuild("guild_mages".to_string()),
            FieldChange::SetGuildRank {
                guild_id: "guild_mages".to_string(),
                rank_id: "anything".to_string(),
                ladder: GuildLadder::Primary,
            },
            FieldChange::ToggleGuild(marchands()),
        ])
        .with_expectation(guild_ranks_expectation),
    )
}

fn profession_rank_scenario() -> TestScenario {
    TestScenario::new(
        "Profession Rank Derivation",
        BuildPlan::new(vec![
            FieldChange::SetMainProfession(id("prof_alchimiste")),
            FieldChange::SetProfessionRank(charforge_core::ProfessionRank::Compagnon),
            FieldChange::SetMainProfession(id("prof_artisan")),
        ])
        .with_expectation(profession_rank_expectation),
    )
}

fn card_toggles_scenario() -> TestScenario {
    let on = |key: &str| FieldChange::SetToggle {
        key: key.to_string(),
        value: true,
    };
    TestScenario::new(
        "Career Card Toggles",
        BuildPlan::new(vec![
            FieldChange::SetCareer(id("career_cards")),
            on("card_hearts"),
            on("card_royal"),
            on("mount_owned"),
            FieldChange::SetCareer(id("career_commerce")),
        ])
        .with_expectation(card_toggles_expectation),
    )
}

fn random_walk_scenario() -> TestScenario {
    TestScenario::new(
        "Random Walk Invariants",
        BuildPlan::default()
            .with_random_steps(RANDOM_WALK_STEPS)
            .with_expectation(random_walk_expectation),
    )
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "class-gating" | "class" => Some(class_gating_scenario()),
        "specialization-gating" | "specialization" => Some(specialization_gating_scenario()),
        "commerce-faction" | "faction" => Some(commerce_faction_scenario()),
        "enchanter-default" | "sub-professions" => Some(enchanter_default_scenario()),
        "political-clamp" | "political" => Some(political_clamp_scenario()),
        "subrace-reset" | "race" => Some(subrace_reset_scenario()),
        "guild-ranks" | "guilds" => Some(guild_ranks_scenario()),
        "profession-rank" | "profession" => Some(profession_rank_scenario()),
        "card-toggles" | "cards" => Some(card_toggles_scenario()),
        "random-walk" | "walk" => Some(random_walk_scenario()),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("class-gating", "Class Gating"),
        ("specialization-gating", "Specialization Gating"),
        ("commerce-faction", "Commerce / Faction Exclusion"),
        ("enchanter-default", "Sub-profession Default Ranks"),
        ("political-clamp", "Political Points Bounds"),
        ("subrace-reset", "Race Change Resets"),
        ("guild-ranks", "Guild Rank Retention"),
        ("profession-rank", "Profession Rank Derivation"),
        ("card-toggles", "Career Card Toggles"),
        ("random-walk", "Random Walk Invariants"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{BuildTester, TesterAssets};
    use std::sync::Arc;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, name) in list_scenarios() {
            let scenario = get_scenario(key).unwrap();
            assert_eq!(scenario.name, name);
        }
        assert!(get_scenario("CLASS-GATING").is_some());
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn every_scenario_passes_on_bundled_catalog() {
        let tester = BuildTester::new(Arc::new(TesterAssets::load_default().unwrap()), false);
        for (key, _) in list_scenarios() {
            let scenario = get_scenario(key).unwrap();
            for seed in [1, 1337] {
                let summary = tester.run_plan(&scenario.plan, seed);
                assert!(
                    summary.violation.is_none(),
                    "{key}: {:?}",
                    summary.violation
                );
                for expectation in &scenario.plan.expectations {
                    expectation
                        .evaluate(&summary)
                        .unwrap_or_else(|err| panic!("{key} seed {seed}: {err}"));
                }
            }
        }
    }
}
