//! Map identity and JSON snapshot files.
//! This module exists to give saved states a stable on-disk shape.
//! It does not own checkpoint semantics or journal hash chains.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::map::MapData;
use crate::state::GameState;

pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed snapshot")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {found}")]
    UnsupportedVersion { found: u16 },
}

/// Content address of a map: hex xxh3 over tiles and subtype sets. Subtype
/// insertion order never changes the id.
pub fn compute_map_id(map: &MapData) -> String {
    format!("{:016x}", xxh3_64(&map.canonical_bytes()))
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    format_version: u16,
    map_id: String,
    state: &'a GameState,
}

#[derive(Deserialize)]
struct SnapshotIn {
    format_version: u16,
    state: GameState,
}

pub fn snapshot_to_json(state: &GameState) -> Result<String, SnapshotError> {
    let snapshot = SnapshotOut {
        format_version: SNAPSHOT_FORMAT_VERSION,
        map_id: compute_map_id(&state.map),
        state,
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

pub fn snapshot_from_json(text: &str) -> Result<GameState, SnapshotError> {
    let snapshot: SnapshotIn = serde_json::from_str(text)?;
    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion { found: snapshot.format_version });
    }
    Ok(snapshot.state)
}

/// Writes to a sibling temp file, syncs, then renames over `path` so readers
/// never observe a half-written snapshot.
pub fn write_snapshot_atomic(path: &Path, state: &GameState) -> Result<(), SnapshotError> {
    let json = snapshot_to_json(state)?;
    let io_err = |source| SnapshotError::Io { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let temp = path.with_extension("json.tmp");
    let mut file = File::create(&temp).map_err(io_err)?;
    file.write_all(json.as_bytes()).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    fs::rename(&temp, path).map_err(io_err)?;
    tracing::debug!(path = %path.display(), turn = state.turn, "snapshot written");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<GameState, SnapshotError> {
    let text = fs::read_to_string(path)
        .map_err(|source| SnapshotError::Io { path: path.to_path_buf(), source })?;
    snapshot_from_json(&text)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::game::state_hash;
    use crate::game::test_support::state_from;
    use crate::types::{Pos, Subtype, TileType};

    #[test]
    fn map_id_ignores_subtype_insertion_order() {
        let mut a = MapData::new(4, 4, TileType::Floor);
        let mut b = a.clone();
        let cell = Pos::new(1, 2);
        a.insert_subtype(cell, Subtype::Rock);
        a.insert_subtype(cell, Subtype::Key);
        b.insert_subtype(cell, Subtype::Key);
        b.insert_subtype(cell, Subtype::Rock);
        assert_eq!(compute_map_id(&a), compute_map_id(&b));
        assert_eq!(compute_map_id(&a).len(), 16);

        b.set_tile(Pos::new(0, 0), TileType::Wall);
        assert_ne!(compute_map_id(&a), compute_map_id(&b));
    }

    #[test]
    fn snapshot_file_round_trips_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saves").join("slot-1.json");
        let mut state = state_from("######\n#@.r.#\n######");
        state.inventory.food_count = 2;
        state.turn = 17;

        write_snapshot_atomic(&path, &state).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(state_hash(&loaded), state_hash(&state));
        assert_eq!(loaded.inventory.food_count, 2);
    }

    #[test]
    fn wrong_version_and_garbage_are_rejected() {
        let state = state_from("####\n#@.#\n####");
        let json = snapshot_to_json(&state).unwrap().replace(
            &format!("\"format_version\": {SNAPSHOT_FORMAT_VERSION}"),
            "\"format_version\": 99",
        );
        assert!(matches!(
            snapshot_from_json(&json),
            Err(SnapshotError::UnsupportedVersion { found: 99 })
        ));
        assert!(matches!(snapshot_from_json("{not json"), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn missing_snapshot_reports_its_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match load_snapshot(&path) {
            Err(SnapshotError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
