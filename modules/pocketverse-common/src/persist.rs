//! Key-value persistence for [`AppState`].
//!
//! State is saved as independent JSON blobs, one per key. Blobs that are
//! missing or no longer decode fall back to seed values.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::seed;
use crate::store::AppState;
use crate::types::Millis;

pub const KEY_CHARACTERS: &str = "gs_chars";
pub const KEY_WORLD: &str = "gs_world";
pub const KEY_CHATS: &str = "gs_chats";
pub const KEY_MOMENTS: &str = "gs_moments";
pub const KEY_WEIBO: &str = "gs_weibo";
pub const KEY_USER: &str = "gs_user";
pub const KEY_API: &str = "gs_api";
pub const KEY_BALANCE: &str = "gs_balance";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileStore: one `<key>.json` per key in a directory
// ---------------------------------------------------------------------------

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data dir: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore (tests)
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("MemoryStore lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("MemoryStore lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

fn load_or<T, F>(store: &dyn KeyValueStore, key: &str, fallback: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let Some(raw) = store.get(key)? else {
        debug!(key, "No saved value, using seed");
        return Ok(fallback());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(key, error = %e, "Saved value does not decode, using seed");
            Ok(fallback())
        }
    }
}

fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize {key}"))?;
    store.set(key, &json)
}

/// Load every blob, filling gaps from seed data stamped at `now`.
pub fn load_state(store: &dyn KeyValueStore, now: Millis) -> Result<AppState> {
    Ok(AppState {
        characters: load_or(store, KEY_CHARACTERS, seed::initial_characters)?,
        world: load_or(store, KEY_WORLD, || seed::initial_world(now))?,
        chats: load_or(store, KEY_CHATS, BTreeMap::new)?,
        moments: load_or(store, KEY_MOMENTS, || seed::initial_posts(now))?,
        weibo: load_or(store, KEY_WEIBO, Vec::new)?,
        user: load_or(store, KEY_USER, seed::default_user)?,
        api: load_or(store, KEY_API, seed::default_api_config)?,
        balance: load_or(store, KEY_BALANCE, || seed::INITIAL_BALANCE)?,
    })
}

pub fn save_state(store: &dyn KeyValueStore, state: &AppState) -> Result<()> {
    save(store, KEY_CHARACTERS, &state.characters)?;
    save(store, KEY_WORLD, &state.world)?;
    save(store, KEY_CHATS, &state.chats)?;
    save(store, KEY_MOMENTS, &state.moments)?;
    save(store, KEY_WEIBO, &state.weibo)?;
    save(store, KEY_USER, &state.user)?;
    save(store, KEY_API, &state.api)?;
    save(store, KEY_BALANCE, &state.balance)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StateEvent;
    use crate::types::Message;

    #[test]
    fn empty_store_loads_seed() {
        let store = MemoryStore::new();
        let state = load_state(&store, 42).unwrap();
        assert_eq!(state, seed::initial_state(42));
    }

    #[test]
    fn saved_state_loads_back() {
        let store = MemoryStore::new();
        let mut state = seed::initial_state(1);
        state
            .apply(&StateEvent::MessageAppended {
                character_id: "char1".into(),
                message: Message::from_user("晚上好", 7),
            })
            .unwrap();
        state.balance = 1234.5;

        save_state(&store, &state).unwrap();
        let loaded = load_state(&store, 999).unwrap();

        assert_eq!(loaded.history("char1").len(), 1);
        assert_eq!(loaded.history("char1")[0].text, "晚上好");
        assert!((loaded.balance - 1234.5).abs() < f64::EPSILON);
        assert_eq!(loaded.world, state.world);
    }

    #[test]
    fn undecodable_blob_falls_back_to_seed() {
        let store = MemoryStore::new();
        store.set(KEY_CHARACTERS, "{not json").unwrap();
        let state = load_state(&store, 1).unwrap();
        assert_eq!(state.characters, seed::initial_characters());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();
        assert!(store.get("missing").unwrap().is_none());

        store.set(KEY_USER, "{\"name\":\"阿青\"}").unwrap();
        let state = load_state(&store, 1).unwrap();
        assert_eq!(state.user.name, "阿青");
        assert!(dir.path().join("data").join("gs_user.json").exists());
    }
}
