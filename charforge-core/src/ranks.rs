//! Profession and sub-profession rank ladders.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::Entity;

const ALCHEMY_RANKS: [&str; 3] = ["Débutant", "Confirmé", "Maître"];
const ENCHANTMENT_RANKS: [&str; 5] = [
    "Disciple",
    "Initié(e)",
    "Adepte-en-chef",
    "Chef de maison/professeur",
    "Enchanteur suprême",
];

/// Fixed five-tier ladder of the main profession.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ProfessionRank {
    #[default]
    Novice,
    Apprenti,
    Compagnon,
    #[serde(rename = "Maître")]
    Maitre,
    #[serde(rename = "Maître Absolu")]
    MaitreAbsolu,
}

impl ProfessionRank {
    pub const ALL: [Self; 5] = [
        Self::Novice,
        Self::Apprenti,
        Self::Compagnon,
        Self::Maitre,
        Self::MaitreAbsolu,
    ];

    /// Rank granted when a profession is first picked.
    pub const LOWEST: Self = Self::Novice;

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Novice => "Novice",
            Self::Apprenti => "Apprenti",
            Self::Compagnon => "Compagnon",
            Self::Maitre => "Maître",
            Self::MaitreAbsolu => "Maître Absolu",
        }
    }
}

impl fmt::Display for ProfessionRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfessionRank {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rank| rank.as_str() == s)
            .ok_or(())
    }
}

/// Rank ladder a sub-profession climbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankLadder {
    /// Potions and poisons.
    Alchemy,
    /// Enchanters.
    Enchantment,
}

impl RankLadder {
    #[must_use]
    pub const fn ranks(self) -> &'static [&'static str] {
        match self {
            Self::Alchemy => &ALCHEMY_RANKS,
            Self::Enchantment => &ENCHANTMENT_RANKS,
        }
    }

    #[must_use]
    pub const fn first(self) -> &'static str {
        self.ranks()[0]
    }

    #[must_use]
    pub fn contains(self, rank: &str) -> bool {
        self.ranks().contains(&rank)
    }

    /// Fallback ladder selection by id fragment, for catalogs that do not
    /// carry an explicit `rank_ladder`.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        if id.contains("enchanteur") {
            Some(Self::Enchantment)
        } else if id.contains("potion") || id.contains("poison") {
            Some(Self::Alchemy)
        } else {
            None
        }
    }

    /// Ladder of a catalog sub-profession.
    #[must_use]
    pub fn for_entity(entity: &Entity) -> Option<Self> {
        entity.rank_ladder.or_else(|| Self::from_id(&entity.id))
    }
}

/// Membership value of an active sub-profession.
///
/// Persisted as a bare string: the rank itself, or [`SubProfessionEntry::ACTIVE_MARKER`]
/// when the sub-profession has no ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubProfessionEntry {
    /// Active, but the sub-profession has no rank ladder.
    Active,
    Ranked(String),
}

impl SubProfessionEntry {
    /// Stored value of [`SubProfessionEntry::Active`]. No ladder tier uses it.
    pub const ACTIVE_MARKER: &'static str = "active";

    /// Value inserted when a sub-profession is toggled on.
    #[must_use]
    pub fn default_for(entity: &Entity) -> Self {
        RankLadder::for_entity(entity)
            .map_or(Self::Active, |ladder| Self::Ranked(ladder.first().to_string()))
    }

    #[must_use]
    pub fn rank(&self) -> Option<&str> {
        match self {
            Self::Active => None,
            Self::Ranked(rank) => Some(rank),
        }
    }
}

impl From<String> for SubProfessionEntry {
    fn from(value: String) -> Self {
        if value == Self::ACTIVE_MARKER {
            Self::Active
        } else {
            Self::Ranked(value)
        }
    }
}

impl From<SubProfessionEntry> for String {
    fn from(entry: SubProfessionEntry) -> Self {
        match entry {
            SubProfessionEntry::Active => SubProfessionEntry::ACTIVE_MARKER.to_string(),
            SubProfessionEntry::Ranked(rank) => rank,
        }
    }
}
