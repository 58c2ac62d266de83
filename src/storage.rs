use anyhow::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub const TOTAL_KEY: &str = "SCREEN_TIME_TOTAL";
pub const DATE_KEY: &str = "SCREEN_TIME_DATE";

/// String-keyed durable storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Key-value pairs kept as a single JSON object on disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn get_base_dir() -> Result<PathBuf> {
        let mut path =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        path.push(".scrtime");
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        Ok(path)
    }

    pub fn new() -> Result<Self> {
        let path = Self::get_base_dir()?;
        Ok(Self::from_path(path.join("store.json")))
    }

    pub fn from_path(path: PathBuf) -> Self {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                let _ = fs::create_dir_all(parent);
            }
        }
        Self { path }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(&self.path)?;
        let entries = serde_json::from_str(&data)?;
        Ok(entries)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    /// A store file that no longer parses is replaced rather than blocking
    /// every later write.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(e) if e.is::<serde_json::Error>() => {
                warn!(path = ?self.path, "Replacing unreadable store: {:#}", e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }
}

/// In-process store. Records every write so callers can inspect them.
#[cfg(test)]
#[derive(Default, Debug)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    pub writes: Vec<(String, String)>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            writes: Vec::new(),
        }
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes.push((key.to_string(), value.to_string()));
        Ok(())
    }
}
