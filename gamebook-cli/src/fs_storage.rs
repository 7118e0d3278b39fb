//! Local storage backed by a single JSON object on disk.
use gamebook_core::{StateStorage, StorageError};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STORAGE_FILE),
        }
    }

    fn read_map(&self) -> Result<Map<String, Value>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(StorageError::Unavailable(format!(
                    "{}: {err}",
                    self.path.display()
                )));
            }
        };
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(map),
            _ => Err(StorageError::Unavailable(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_map(&self, map: Map<String, Value>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&Value::Object(map))?;
        // write beside the target, then swap, so a crash never leaves half a file
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)
            .and_then(|()| fs::rename(&staging, &self.path))
            .map_err(|err| StorageError::Write(format!("{}: {err}", self.path.display())))
    }
}

impl StateStorage for JsonFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .read_map()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_map().unwrap_or_else(|err| {
            log::warn!("replacing unreadable storage file: {err}");
            Map::new()
        });
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(map)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(map)?;
        }
        Ok(())
    }
}
