use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::Matchup;

const CACHE_DIR: &str = "pickem_terminal";
const STORE_FILE: &str = "store.json";
const KEY_NAMESPACE: &str = "nfl-confidence";

/// On-disk shape: a flat key-value map so each week's entries live under
/// `nfl-confidence-<week>-games` / `nfl-confidence-<week>-selections` with
/// JSON text values, independent of any other week.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreFile {
    entries: HashMap<String, String>,
}

/// What `load` found for a week. `Malformed` is never adopted, same as
/// `Absent`, but callers are expected to log a warning for it; a decode
/// failure means the store file was damaged, not that nothing was saved.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Restored {
        games: Vec<Matchup>,
        picks: HashMap<String, String>,
    },
    Absent,
    Malformed,
}

enum ReadStore {
    Ok(StoreFile),
    Missing,
    Malformed,
}

/// Per-week persistence for the ranked slate and pick map. Every operation is
/// best-effort: a missing cache dir, unreadable file or malformed entry
/// degrades to "nothing saved" and never reaches the caller as an error.
pub struct PickStore {
    path: PathBuf,
}

impl PickStore {
    /// Resolves the backing file under the XDG cache dir. `None` when no
    /// cache location exists in this environment; callers treat that as
    /// "persistence unavailable" and skip every operation.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            path: cache_dir()?.join(STORE_FILE),
        })
    }

    /// Store rooted at an explicit directory; used by tests.
    pub fn at_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STORE_FILE),
        }
    }

    pub fn save(&self, week: u32, games: &[Matchup], picks: &HashMap<String, String>) {
        let (Ok(games_json), Ok(picks_json)) =
            (serde_json::to_string(games), serde_json::to_string(picks))
        else {
            return;
        };
        // A damaged store file is replaced rather than appended to.
        let mut store = match self.read_store() {
            ReadStore::Ok(store) => store,
            ReadStore::Missing | ReadStore::Malformed => StoreFile::default(),
        };
        store.entries.insert(games_key(week), games_json);
        store.entries.insert(selections_key(week), picks_json);
        self.write_store(&store);
    }

    /// Restores a week's slate and picks, validated against the currently
    /// loaded slate: same length and every current id present in the stored
    /// set, otherwise the stored data is stale and ignored wholesale. Decode
    /// failures come back as `Malformed` so the caller can warn about them.
    pub fn load(&self, week: u32, current: &[Matchup]) -> LoadOutcome {
        let store = match self.read_store() {
            ReadStore::Ok(store) => store,
            ReadStore::Missing => return LoadOutcome::Absent,
            ReadStore::Malformed => return LoadOutcome::Malformed,
        };
        let (Some(games_raw), Some(picks_raw)) = (
            store.entries.get(&games_key(week)),
            store.entries.get(&selections_key(week)),
        ) else {
            return LoadOutcome::Absent;
        };
        let Ok(games) = serde_json::from_str::<Vec<Matchup>>(games_raw) else {
            return LoadOutcome::Malformed;
        };
        let Ok(picks) = serde_json::from_str::<HashMap<String, String>>(picks_raw) else {
            return LoadOutcome::Malformed;
        };

        if games.len() != current.len() {
            return LoadOutcome::Absent;
        }
        let stored_ids: HashSet<&str> = games.iter().map(|g| g.id.as_str()).collect();
        if !current.iter().all(|g| stored_ids.contains(g.id.as_str())) {
            return LoadOutcome::Absent;
        }
        LoadOutcome::Restored { games, picks }
    }

    pub fn clear(&self, week: u32) {
        let ReadStore::Ok(mut store) = self.read_store() else {
            return;
        };
        store.entries.remove(&games_key(week));
        store.entries.remove(&selections_key(week));
        self.write_store(&store);
    }

    fn read_store(&self) -> ReadStore {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return ReadStore::Missing;
        };
        match serde_json::from_str(&raw) {
            Ok(store) => ReadStore::Ok(store),
            Err(_) => ReadStore::Malformed,
        }
    }

    fn write_store(&self, store: &StoreFile) {
        let Some(dir) = self.path.parent() else {
            return;
        };
        let _ = fs::create_dir_all(dir);
        if let Ok(json) = serde_json::to_string(store) {
            let tmp = self.path.with_extension("json.tmp");
            if fs::write(&tmp, json).is_ok() {
                let _ = fs::rename(&tmp, &self.path);
            }
        }
    }
}

fn games_key(week: u32) -> String {
    format!("{KEY_NAMESPACE}-{week}-games")
}

fn selections_key(week: u32) -> String {
    format!("{KEY_NAMESPACE}-{week}-selections")
}

/// Prefer XDG cache, fall back to ~/.cache on linux-like systems.
pub fn cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}
