//! Guild membership and per-guild rank bookkeeping.
//!
//! Each operation returns whether it changed the selection; a rejected call
//! leaves the selection untouched.
use crate::catalog::{Catalog, Entity, EntityType};
use crate::selection::{GuildLadder, RetainedGuildRanks, Selection};

fn guild<'a>(catalog: &'a Catalog, guild_id: &str) -> Option<&'a Entity> {
    catalog.get_typed(guild_id, EntityType::Guild)
}

/// Whether the guild defines the given rank ladder.
#[must_use]
pub fn defines_ladder(guild: &Entity, ladder: GuildLadder) -> bool {
    match ladder {
        GuildLadder::Primary => !guild.guild_ranks.is_empty(),
        GuildLadder::Secondary => !guild.secondary_guild_ranks.is_empty(),
    }
}

/// Join a guild. Ranks held when the guild was last left come back.
pub fn add_guild(selection: &mut Selection, catalog: &Catalog, guild_id: &str) -> bool {
    if guild(catalog, guild_id).is_none() || selection.has_guild(guild_id) {
        return false;
    }
    selection.guild_ids.push(guild_id.to_string());
    if let Some(retained) = selection.retained_guild_ranks.remove(guild_id) {
        if let Some(rank) = retained.primary {
            selection.guild_ranks.insert(guild_id.to_string(), rank);
        }
        if let Some(rank) = retained.secondary {
            selection
                .guild_secondary_ranks
                .insert(guild_id.to_string(), rank);
        }
    }
    true
}

/// Leave a guild, parking its ranks instead of dropping them.
pub fn remove_guild(selection: &mut Selection, guild_id: &str) -> bool {
    let before = selection.guild_ids.len();
    selection.guild_ids.retain(|id| id != guild_id);
    if selection.guild_ids.len() == before {
        return false;
    }
    let retained = RetainedGuildRanks {
        primary: selection.guild_ranks.remove(guild_id),
        secondary: selection.guild_secondary_ranks.remove(guild_id),
    };
    if !retained.is_empty() {
        selection
            .retained_guild_ranks
            .insert(guild_id.to_string(), retained);
    }
    true
}

pub fn toggle_guild(selection: &mut Selection, catalog: &Catalog, guild_id: &str) -> bool {
    if selection.has_guild(guild_id) {
        remove_guild(selection, guild_id)
    } else {
        add_guild(selection, catalog, guild_id)
    }
}

/// Store a rank for a joined guild. The rank id is kept as given; an empty
/// id clears the entry.
pub fn set_rank(
    selection: &mut Selection,
    catalog: &Catalog,
    guild_id: &str,
    rank_id: &str,
    ladder: GuildLadder,
) -> bool {
    let Some(entity) = guild(catalog, guild_id) else {
        return false;
    };
    if !selection.has_guild(guild_id) || !defines_ladder(entity, ladder) {
        return false;
    }
    let ranks = selection.guild_rank_map_mut(ladder);
    if rank_id.is_empty() {
        return ranks.remove(guild_id).is_some();
    }
    let previous = ranks.insert(guild_id.to_string(), rank_id.to_string());
    previous.as_deref() != Some(rank_id)
}

pub fn set_primary_rank(
    selection: &mut Selection,
    catalog: &Catalog,
    guild_id: &str,
    rank_id: &str,
) -> bool {
    set_rank(selection, catalog, guild_id, rank_id, GuildLadder::Primary)
}

pub fn set_secondary_rank(
    selection: &mut Selection,
    catalog: &Catalog,
    guild_id: &str,
    rank_id: &str,
) -> bool {
    set_rank(
        selection,
        catalog,
        guild_id,
        rank_id,
        GuildLadder::Secondary,
    )
}
