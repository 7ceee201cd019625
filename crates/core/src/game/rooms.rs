//! Hand-authored rooms and moving the hero between them.

use std::collections::BTreeMap;
use std::mem;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use slotmap::SlotMap;

use crate::config::RulesConfig;
use crate::entities::{Enemy, EnemyId, EnemyKind, Npc};
use crate::map::MapData;
use crate::state::{GameState, RoomSnapshot};
use crate::types::{Pos, Subtype};

/// A room supplied by content rather than the generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthoredRoom {
    pub id: String,
    pub map: MapData,
    pub entry: Pos,
    #[serde(default)]
    pub enemies: Vec<Enemy>,
    #[serde(default)]
    pub npcs: Vec<Npc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("entry {entry:?} lies outside room {room}")]
    EntryOutOfBounds { room: String, entry: Pos },
}

/// Turns snake markers into roster entries and moves the player marker to
/// `entry`.
fn prepare_map(
    mut map: MapData,
    entry: Pos,
    extra: Vec<Enemy>,
) -> (MapData, SlotMap<EnemyId, Enemy>) {
    let mut enemies = SlotMap::with_key();
    for pos in map.positions_with(Subtype::Snake) {
        map.remove_subtype(pos, Subtype::Snake);
        enemies.insert(Enemy::new(EnemyKind::Snake, pos));
    }
    for enemy in extra {
        enemies.insert(enemy);
    }
    place_player_marker(&mut map, entry);
    (map, enemies)
}

fn place_player_marker(map: &mut MapData, entry: Pos) {
    for pos in map.positions_with(Subtype::Player) {
        map.remove_subtype(pos, Subtype::Player);
    }
    map.insert_subtype(entry, Subtype::Player);
}

impl GameState {
    pub fn from_room(room: AuthoredRoom, rules: &RulesConfig) -> Self {
        let (map, enemies) = prepare_map(room.map, room.entry, room.enemies);
        let mut state = Self::with_map(map, room.entry, enemies, room.npcs, rules);
        state.current_room = room.id;
        state.room_metadata = room.metadata;
        state
    }
}

/// Archives the current room and installs `room`, or its archived copy when
/// the hero has been there before. The hero keeps vitals and inventory.
pub fn enter_room(
    state: &GameState,
    room: AuthoredRoom,
    rules: &RulesConfig,
) -> Result<GameState, RoomError> {
    let target = state.rooms.get(&room.id).map_or(&room.map, |snapshot| &snapshot.map);
    if !target.in_bounds(room.entry) {
        return Err(RoomError::EntryOutOfBounds { room: room.id, entry: room.entry });
    }

    let mut next = state.clone();
    let (map, enemies, npcs, metadata) = match next.rooms.remove(&room.id) {
        Some(snapshot) => {
            tracing::debug!(room = %room.id, "restoring visited room");
            let mut map = snapshot.map;
            place_player_marker(&mut map, room.entry);
            (map, snapshot.enemies, snapshot.npcs, snapshot.metadata)
        }
        None => {
            let (map, enemies) = prepare_map(room.map, room.entry, room.enemies);
            let npcs = room
                .npcs
                .into_iter()
                .map(|npc| npc.with_memory_capacity(rules.npc_memory_capacity))
                .collect();
            (map, enemies, npcs, room.metadata)
        }
    };

    let mut leaving = mem::replace(&mut next.map, map);
    leaving.remove_subtype(state.player, Subtype::Player);
    let archived = RoomSnapshot {
        map: leaving,
        enemies: mem::replace(&mut next.enemies, enemies),
        npcs: mem::replace(&mut next.npcs, npcs),
        metadata: mem::replace(&mut next.room_metadata, metadata),
    };
    next.rooms.insert(state.current_room.clone(), archived);

    next.player = room.entry;
    next.current_room = room.id;
    next.pending_room_transition = None;
    next.show_full_map = false;
    next.full_map_remaining_ms = 0;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::resolver::move_player;
    use crate::game::test_support::{rules, state_from};
    use crate::map::RoomLink;
    use crate::rng::SeededRng;
    use crate::types::{Direction, TileType};

    fn cellar() -> AuthoredRoom {
        AuthoredRoom {
            id: "cellar".into(),
            map: MapData::from_ascii("######\n#..s.#\n#R...#\n######")
                .expect("fixture should parse"),
            entry: Pos::new(1, 1),
            enemies: Vec::new(),
            npcs: vec![Npc::new("rat-king", "Rat King", Pos::new(2, 4))],
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn authored_rooms_convert_snake_markers() {
        let state = GameState::from_room(cellar(), &rules());
        assert_eq!(state.current_room, "cellar");
        assert_eq!(state.enemies.len(), 1);
        assert!(state.enemies.values().all(|enemy| enemy.kind == EnemyKind::Snake));
        assert_eq!(state.map.count_subtype(Subtype::Snake), 0);
        assert_eq!(state.check_invariants(), Ok(()));
    }

    #[test]
    fn transition_then_return_restores_the_archived_room() {
        let mut hall = state_from("#####\n#@R.#\n#####");
        hall.map.transitions.push(RoomLink { pos: Pos::new(1, 2), room_id: "cellar".into() });
        hall.inventory.rock_count = 2;

        let stepped = move_player(&hall, Direction::Right, &rules(), &mut SeededRng::new(0));
        assert_eq!(stepped.pending_room_transition.as_deref(), Some("cellar"));

        let inside = enter_room(&stepped, cellar(), &rules()).expect("entry is inside the cellar");
        assert_eq!(inside.current_room, "cellar");
        assert_eq!(inside.player, Pos::new(1, 1));
        assert_eq!(inside.inventory.rock_count, 2);
        assert!(inside.pending_room_transition.is_none());
        assert!(inside.rooms.contains_key("floor-0"));
        assert_eq!(inside.check_invariants(), Ok(()));

        let back_room = AuthoredRoom {
            id: "floor-0".into(),
            map: MapData::new(3, 3, TileType::Floor),
            entry: Pos::new(1, 3),
            enemies: Vec::new(),
            npcs: Vec::new(),
            metadata: BTreeMap::new(),
        };
        let back = enter_room(&inside, back_room, &rules()).expect("entry is inside the hall");
        assert_eq!(back.map.width(), 5, "archived map wins over the supplied one");
        assert_eq!(back.player, Pos::new(1, 3));
        assert!(back.rooms.contains_key("cellar"));
        assert_eq!(back.check_invariants(), Ok(()));
    }

    #[test]
    fn entries_off_the_map_are_refused() {
        let hall = state_from("#####\n#@..#\n#####");
        let mut room = cellar();
        room.entry = Pos::new(9, 1);
        let error = enter_room(&hall, room, &rules()).expect_err("entry is off the map");
        assert_eq!(
            error,
            RoomError::EntryOutOfBounds { room: "cellar".into(), entry: Pos::new(9, 1) }
        );

        // A revisit is checked against the archived map, not the supplied one.
        let inside = enter_room(&hall, cellar(), &rules()).expect("entry is inside the cellar");
        let back_room = AuthoredRoom {
            id: "floor-0".into(),
            map: MapData::new(9, 9, TileType::Floor),
            entry: Pos::new(4, 6),
            enemies: Vec::new(),
            npcs: Vec::new(),
            metadata: BTreeMap::new(),
        };
        assert!(enter_room(&inside, back_room, &rules()).is_err());
    }

    #[test]
    fn room_npcs_take_the_configured_memory_capacity() {
        let hall = state_from("#####\n#@..#\n#####");
        let tight = RulesConfig { npc_memory_capacity: 1, ..rules() };
        let mut inside = enter_room(&hall, cellar(), &tight).expect("entry is inside the cellar");
        let king = &mut inside.npcs[0];
        king.set_memory("mood", "grim").expect("first key fits");
        assert!(king.set_memory("visits", 1.0).is_err());

        let fresh = GameState::from_room(cellar(), &tight);
        let mut king = fresh.npcs[0].clone();
        king.set_memory("mood", "grim").expect("first key fits");
        assert!(king.set_memory("visits", 1.0).is_err());
    }
}
