//! Read-only catalog of selectable entities
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ranks::RankLadder;

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Race,
    Class,
    Specialization,
    Profession,
    SubProfession,
    Career,
    Faction,
    Guild,
}

impl EntityType {
    pub const ALL: [Self; 8] = [
        Self::Race,
        Self::Class,
        Self::Specialization,
        Self::Profession,
        Self::SubProfession,
        Self::Career,
        Self::Faction,
        Self::Guild,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Race => "RACE",
            Self::Class => "CLASS",
            Self::Specialization => "SPECIALIZATION",
            Self::Profession => "PROFESSION",
            Self::SubProfession => "SUB_PROFESSION",
            Self::Career => "CAREER",
            Self::Faction => "FACTION",
            Self::Guild => "GUILD",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Recruitment status of a guild. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuildStatus {
    #[default]
    Open,
    SemiOpen,
    Secret,
}

/// One step of a guild rank ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildRank {
    pub id: String,
    pub name: String,
}

/// A catalog entry. Which optional fields are meaningful depends on `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityType,
    pub name: String,
    /// Parent race for a subrace, owning class for a specialization.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub guild_status: Option<GuildStatus>,
    #[serde(default)]
    pub guild_ranks: Vec<GuildRank>,
    #[serde(default)]
    pub secondary_guild_ranks: Vec<GuildRank>,
    #[serde(default)]
    pub prestige: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit ladder for a sub-profession; wins over id matching.
    #[serde(default)]
    pub rank_ladder: Option<RankLadder>,
}

impl Entity {
    /// Bare entity with no optional attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: EntityType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            parent_id: None,
            guild_status: None,
            guild_ranks: Vec::new(),
            secondary_guild_ranks: Vec::new(),
            prestige: None,
            description: None,
            rank_ladder: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn with_guild_ranks(mut self, primary: Vec<GuildRank>, secondary: Vec<GuildRank>) -> Self {
        self.guild_ranks = primary;
        self.secondary_guild_ranks = secondary;
        self
    }

    #[must_use]
    pub const fn with_rank_ladder(mut self, ladder: RankLadder) -> Self {
        self.rank_ladder = Some(ladder);
        self
    }

    #[must_use]
    pub fn is_child_of(&self, parent_id: &str) -> bool {
        self.parent_id.as_deref() == Some(parent_id)
    }

    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Problems detected while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("JSON parsing error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("entity with an empty id (name '{name}')")]
    EmptyId { name: String },
    #[error("duplicate entity id '{id}'")]
    DuplicateId { id: String },
    #[error("entity '{id}' references unknown parent '{parent_id}'")]
    UnknownParent { id: String, parent_id: String },
    #[error("entity '{id}' ({kind}) cannot have parent '{parent_id}' of type {parent_kind}")]
    ParentKind {
        id: String,
        kind: EntityType,
        parent_id: String,
        parent_kind: EntityType,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    entities: Vec<Entity>,
}

/// Ordered, validated set of entities. Catalog order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    entities: Vec<Entity>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from entities, validating ids and parent references.
    ///
    /// # Errors
    ///
    /// Returns an error on empty or duplicate ids, unknown parents, or a
    /// parent of the wrong type.
    pub fn from_entities(entities: Vec<Entity>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entities.len());
        for (pos, entity) in entities.iter().enumerate() {
            if entity.id.trim().is_empty() {
                return Err(CatalogError::EmptyId {
                    name: entity.name.clone(),
                });
            }
            if index.insert(entity.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId {
                    id: entity.id.clone(),
                });
            }
        }

        let catalog = Self { entities, index };
        catalog.validate_parents()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON document of the form `{"entities": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the entities fail
    /// validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_entities(file.entities)
    }

    fn validate_parents(&self) -> Result<(), CatalogError> {
        for entity in &self.entities {
            let Some(parent_id) = entity.parent_id.as_deref() else {
                continue;
            };
            let Some(parent) = self.get(parent_id) else {
                return Err(CatalogError::UnknownParent {
                    id: entity.id.clone(),
                    parent_id: parent_id.to_string(),
                });
            };
            let expected = match entity.kind {
                EntityType::Race => Some(EntityType::Race),
                EntityType::Specialization => Some(EntityType::Class),
                EntityType::SubProfession => Some(EntityType::Profession),
                _ => None,
            };
            if expected.is_some_and(|kind| kind != parent.kind) {
                return Err(CatalogError::ParentKind {
                    id: entity.id.clone(),
                    kind: entity.kind,
                    parent_id: parent_id.to_string(),
                    parent_kind: parent.kind,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).and_then(|&pos| self.entities.get(pos))
    }

    /// Look up an entity, treating a type mismatch as a miss.
    #[must_use]
    pub fn get_typed(&self, id: &str, kind: EntityType) -> Option<&Entity> {
        self.get(id).filter(|entity| entity.kind == kind)
    }

    #[must_use]
    pub fn contains(&self, id: &str, kind: EntityType) -> bool {
        self.get_typed(id, kind).is_some()
    }

    pub fn of_type(&self, kind: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |entity| entity.kind == kind)
    }

    /// Entities of `kind` whose parent is `parent_id`. The yielded entities
    /// borrow from the catalog only, so `parent_id` may be short-lived.
    pub fn children_of<'a, 'p>(
        &'a self,
        parent_id: &'p str,
        kind: EntityType,
    ) -> impl Iterator<Item = &'a Entity> + use<'a, 'p> {
        self.of_type(kind)
            .filter(move |entity| entity.is_child_of(parent_id))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
