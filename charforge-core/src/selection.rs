//! The mutable "current character" record owned by a building session.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{ABSORPTION_CLASS, CARD_TOGGLE_KEYS, INSTITUT_RANK_KEY, POLITICAL_POINTS_KEY};
use crate::ranks::{ProfessionRank, SubProfessionEntry};

/// Manual stat counter a player can type into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusStat {
    Vit,
    Spd,
    Dmg,
    Absorption,
}

impl BonusStat {
    pub const ALL: [Self; 4] = [Self::Vit, Self::Spd, Self::Dmg, Self::Absorption];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vit => "vit",
            Self::Spd => "spd",
            Self::Dmg => "dmg",
            Self::Absorption => "absorption",
        }
    }
}

impl fmt::Display for BonusStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BonusStat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stat| stat.as_str() == s)
            .ok_or(())
    }
}

/// Manual bonus counters. All fields default to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualBonuses {
    #[serde(default)]
    pub vit: i32,
    #[serde(default)]
    pub spd: i32,
    #[serde(default)]
    pub dmg: i32,
    #[serde(default)]
    pub absorption: i32,
}

impl ManualBonuses {
    #[must_use]
    pub const fn get(&self, stat: BonusStat) -> i32 {
        match stat {
            BonusStat::Vit => self.vit,
            BonusStat::Spd => self.spd,
            BonusStat::Dmg => self.dmg,
            BonusStat::Absorption => self.absorption,
        }
    }

    pub const fn set(&mut self, stat: BonusStat, value: i32) {
        match stat {
            BonusStat::Vit => self.vit = value,
            BonusStat::Spd => self.spd = value,
            BonusStat::Dmg => self.dmg = value,
            BonusStat::Absorption => self.absorption = value,
        }
    }
}

/// Which rank ladder of a guild a rank belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuildLadder {
    Primary,
    Secondary,
}

/// Ranks parked while a guild is not joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetainedGuildRanks {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
}

impl RetainedGuildRanks {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}

/// Current character selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub character_name: String,
    pub level: u8,
    pub race_id: Option<String>,
    pub sub_race_id: Option<String>,
    pub class_id: Option<String>,
    pub specialization_id: Option<String>,
    pub profession_id: Option<String>,
    pub profession_rank: Option<ProfessionRank>,
    pub sub_professions: BTreeMap<String, SubProfessionEntry>,
    pub career_id: Option<String>,
    pub faction_id: Option<String>,
    /// Joined guilds in the order they were added.
    pub guild_ids: Vec<String>,
    pub guild_ranks: BTreeMap<String, String>,
    pub guild_secondary_ranks: BTreeMap<String, String>,
    /// Ranks of guilds that were left, restored if the guild is joined again.
    pub retained_guild_ranks: BTreeMap<String, RetainedGuildRanks>,
    pub guild_manual_bonuses: ManualBonuses,
    pub slider_values: BTreeMap<String, i32>,
    pub toggles: BTreeMap<String, bool>,
    pub racial_competence_active: bool,
    pub elite_competence_active: bool,
}

impl Selection {
    /// All-empty selection used when a building session starts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn political_points(&self) -> i32 {
        self.slider(POLITICAL_POINTS_KEY)
    }

    #[must_use]
    pub fn institut_rank(&self) -> i32 {
        self.slider(INSTITUT_RANK_KEY)
    }

    #[must_use]
    pub fn slider(&self, key: &str) -> i32 {
        self.slider_values.get(key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn toggle(&self, key: &str) -> bool {
        self.toggles.get(key).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn has_career(&self, career_id: &str) -> bool {
        self.career_id.as_deref() == Some(career_id)
    }

    #[must_use]
    pub fn has_guild(&self, guild_id: &str) -> bool {
        self.guild_ids.iter().any(|id| id == guild_id)
    }

    #[must_use]
    pub fn guild_rank(&self, guild_id: &str, ladder: GuildLadder) -> Option<&str> {
        self.guild_rank_map(ladder)
            .get(guild_id)
            .map(String::as_str)
    }

    pub(crate) const fn guild_rank_map(&self, ladder: GuildLadder) -> &BTreeMap<String, String> {
        match ladder {
            GuildLadder::Primary => &self.guild_ranks,
            GuildLadder::Secondary => &self.guild_secondary_ranks,
        }
    }

    pub(crate) const fn guild_rank_map_mut(
        &mut self,
        ladder: GuildLadder,
    ) -> &mut BTreeMap<String, String> {
        match ladder {
            GuildLadder::Primary => &mut self.guild_ranks,
            GuildLadder::Secondary => &mut self.guild_secondary_ranks,
        }
    }

    /// Number of career card toggles currently on.
    #[must_use]
    pub fn card_toggles_on(&self) -> usize {
        CARD_TOGGLE_KEYS
            .iter()
            .filter(|key| self.toggle(key))
            .count()
    }

    /// Manual bonuses as they apply to the current class: absorption only
    /// counts for the class that uses it.
    #[must_use]
    pub fn effective_manual_bonuses(&self) -> ManualBonuses {
        let mut bonuses = self.guild_manual_bonuses;
        if self.class_id.as_deref() != Some(ABSORPTION_CLASS) {
            bonuses.absorption = 0;
        }
        bonuses
    }
}
