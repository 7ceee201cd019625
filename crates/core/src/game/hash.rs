//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from action resolution.
//! It does not own replay execution or journal persistence policies.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use crate::state::GameState;
use crate::types::Direction;

fn direction_code(direction: Direction) -> u8 {
    match direction {
        Direction::Up => 0,
        Direction::Right => 1,
        Direction::Down => 2,
        Direction::Left => 3,
    }
}

/// Hash of everything that affects future play. Enemy keys are left out so
/// restored rosters with fresh keys hash the same.
pub fn state_hash(state: &GameState) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.write(&state.map.canonical_bytes());
    hasher.write_i32(state.player.y);
    hasher.write_i32(state.player.x);
    hasher.write_u8(direction_code(state.player_direction));

    let inventory = &state.inventory;
    let flags =
        [inventory.has_key, inventory.has_exit_key, inventory.has_sword, inventory.has_shield];
    for flag in flags {
        hasher.write_u8(u8::from(flag));
    }
    for count in
        [inventory.rock_count, inventory.food_count, inventory.potion_count, inventory.rune_count]
    {
        hasher.write_u32(count);
    }

    hasher.write_i32(state.hero.health);
    hasher.write_i32(state.hero.max_health);
    hasher.write_i32(state.hero.attack);
    hasher.write_u8(u8::from(state.hero.torch_lit));
    hasher.write_u8(u8::from(state.show_full_map));
    hasher.write_u64(state.full_map_remaining_ms);
    hasher.write_u8(u8::from(state.win));

    let poison = &state.conditions.poisoned;
    hasher.write_u8(u8::from(poison.active));
    hasher.write_u32(poison.steps_since_last_damage);

    let stats = &state.stats;
    for value in
        [stats.damage_dealt, stats.damage_taken, stats.enemies_defeated, stats.steps, stats.revives]
    {
        hasher.write_u32(value);
    }

    let mut enemies: Vec<_> = state.enemies.values().collect();
    enemies.sort_by_key(|enemy| (enemy.pos, enemy.kind));
    hasher.write_usize(enemies.len());
    for enemy in enemies {
        hasher.write_u8(enemy.kind.code());
        hasher.write_i32(enemy.pos.y);
        hasher.write_i32(enemy.pos.x);
        hasher.write_i32(enemy.health);
    }

    hasher.write_usize(state.npcs.len());
    for npc in &state.npcs {
        hasher.write(npc.id.as_bytes());
        hasher.write_i32(npc.pos.y);
        hasher.write_i32(npc.pos.x);
        hasher.write_i32(npc.health());
        hasher.write_usize(npc.memory().len());
    }
    hasher.write_usize(state.npc_interaction_queue.len());

    hasher.write_u64(state.turn);
    hasher.write_u32(state.floor_index);
    hasher.write(state.current_room.as_bytes());
    hasher.write_u8(u8::from(state.last_checkpoint.is_some()));
    if let Some(room) = &state.pending_room_transition {
        hasher.write(room.as_bytes());
    }
    hasher.finish()
}
