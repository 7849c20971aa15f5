use arena_core::{ActorId, EventConfig, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Error from the persisted stores.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Format(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(error) => write!(f, "store I/O failed: {error}"),
            StoreError::Format(error) => write!(f, "store data is malformed: {error}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        StoreError::Io(error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Format(error)
    }
}

/// The persisted table of named event configs. Read once at startup,
/// written back after every mutation.
pub struct EventStore {
    path: PathBuf,
    configs: HashMap<String, EventConfig>,
}

impl EventStore {
    /// Load from disk; a missing file is an empty store, a malformed file
    /// is an error the caller decides about.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let configs = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => return Err(error.into()),
        };

        Ok(Self { path, configs })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.configs)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&EventConfig> {
        self.configs.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EventConfig)> {
        self.configs.iter()
    }

    pub fn upsert(&mut self, config: EventConfig) -> Result<(), StoreError> {
        self.configs.insert(config.event_name.clone(), config);
        self.save()
    }

    pub fn remove(&mut self, name: &str) -> Result<bool, StoreError> {
        let removed = self.configs.remove(name).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<bool, StoreError> {
        match self.configs.get_mut(name) {
            Some(config) => {
                config.disabled = !enabled;
                self.save()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// What the world looked like for an actor right before a match touched
/// them; replayed when they leave or reconnect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestoreRecord {
    pub actor: ActorId,
    pub position: Position,
    pub health: f32,
    pub items: Vec<String>,
}

/// The persisted per-actor restore table, written on every mutation and on
/// the periodic save.
pub struct RestoreStore {
    path: PathBuf,
    records: HashMap<ActorId, RestoreRecord>,
}

impl RestoreStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let records: Vec<RestoreRecord> = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(error) => return Err(error.into()),
        };

        Ok(Self {
            path,
            records: records.into_iter().map(|r| (r.actor, r)).collect(),
        })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let records: Vec<&RestoreRecord> = self.records.values().collect();
        let raw = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn has(&self, actor: ActorId) -> bool {
        self.records.contains_key(&actor)
    }

    pub fn record(&mut self, record: RestoreRecord) -> Result<(), StoreError> {
        self.records.insert(record.actor, record);
        self.save()
    }

    /// Consume an actor's record; restoring is one-shot.
    pub fn take(&mut self, actor: ActorId) -> Result<Option<RestoreRecord>, StoreError> {
        let record = self.records.remove(&actor);
        if record.is_some() {
            self.save()?;
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("arena_store_{}_{}", std::process::id(), name));
        path
    }

    fn sample_config(name: &str) -> EventConfig {
        let mut config = EventConfig::new(name, "deathmatch", &[]);
        config.minimum_players = 2;
        config.maximum_players = 8;
        config
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let path = scratch("missing.json");
        let _ = std::fs::remove_file(&path);

        let store = EventStore::load(&path).unwrap();
        assert!(store.names().is_empty());
    }

    #[test]
    fn configs_survive_a_reload() {
        let path = scratch("events.json");
        let _ = std::fs::remove_file(&path);

        let mut store = EventStore::load(&path).unwrap();
        store.upsert(sample_config("pit fight")).unwrap();
        store.upsert(sample_config("back alley")).unwrap();

        let reloaded = EventStore::load(&path).unwrap();
        assert_eq!(reloaded.names(), vec!["back alley", "pit fight"]);
        assert_eq!(
            reloaded.get("pit fight").unwrap().minimum_players,
            2
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn enable_flag_is_persisted() {
        let path = scratch("enabled.json");
        let _ = std::fs::remove_file(&path);

        let mut store = EventStore::load(&path).unwrap();
        store.upsert(sample_config("pit fight")).unwrap();
        store.set_enabled("pit fight", false).unwrap();

        let reloaded = EventStore::load(&path).unwrap();
        assert!(reloaded.get("pit fight").unwrap().disabled);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn restore_records_are_one_shot() {
        let path = scratch("restore.json");
        let _ = std::fs::remove_file(&path);

        let mut store = RestoreStore::load(&path).unwrap();
        store
            .record(RestoreRecord {
                actor: ActorId(9),
                position: Position::new(1.0, 2.0, 3.0),
                health: 87.5,
                items: vec!["torch".into()],
            })
            .unwrap();

        assert!(store.has(ActorId(9)));

        let mut reloaded = RestoreStore::load(&path).unwrap();
        let record = reloaded.take(ActorId(9)).unwrap().unwrap();
        assert_eq!(record.position, Position::new(1.0, 2.0, 3.0));
        assert!(reloaded.take(ActorId(9)).unwrap().is_none());

        let _ = std::fs::remove_file(&path);
    }
}
