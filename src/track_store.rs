use crate::game_logic::TrackDefinition;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("could not access track file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid track JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no track named {0:?}")]
    NotFound(String),
}

/// Somewhere track definitions can be loaded from and saved to
pub trait TrackStore {
    fn load(&self, name: &str) -> Result<TrackDefinition, TrackError>;
    fn save(&mut self, name: &str, track: &TrackDefinition) -> Result<(), TrackError>;
}

/// File name stem for a track: non-alphanumerics become `_`, lowercased
pub fn track_slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// One pretty-printed `<slug>.json` per track under `root`
pub struct JsonDirTrackStore {
    root: PathBuf,
}

impl JsonDirTrackStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", track_slug(name)))
    }
}

impl TrackStore for JsonDirTrackStore {
    fn load(&self, name: &str) -> Result<TrackDefinition, TrackError> {
        let path = self.path_for(name);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TrackError::NotFound(name.to_string()));
            }
            Err(source) => return Err(TrackError::Io { path, source }),
        };
        Ok(TrackDefinition::from_json_str(&json)?)
    }

    fn save(&mut self, name: &str, track: &TrackDefinition) -> Result<(), TrackError> {
        fs::create_dir_all(&self.root).map_err(|source| TrackError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.path_for(name);
        let json = track.to_json_string()?;
        fs::write(&path, json).map_err(|source| TrackError::Io { path, source })
    }
}

/// Keeps serialized tracks in memory, keyed by name
#[derive(Default)]
pub struct MemoryTrackStore {
    tracks: HashMap<String, String>,
}

impl MemoryTrackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackStore for MemoryTrackStore {
    fn load(&self, name: &str) -> Result<TrackDefinition, TrackError> {
        let json = self
            .tracks
            .get(name)
            .ok_or_else(|| TrackError::NotFound(name.to_string()))?;
        Ok(TrackDefinition::from_json_str(json)?)
    }

    fn save(&mut self, name: &str, track: &TrackDefinition) -> Result<(), TrackError> {
        self.tracks.insert(name.to_string(), track.to_json_string()?);
        Ok(())
    }
}
