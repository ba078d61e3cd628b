use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use crate::store::Storage;

/// One JSON file per record under the platform data dir. Writes go through
/// a tmp file and an atomic rename so a crash mid-write leaves the previous
/// record intact.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanadr");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    fn write_atomic(&self, key: &str, value: &str) -> Result<()> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl Storage for JsonStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.file_path(key);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(key, error = %e, "failed to read record, using defaults");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.write_atomic(key, value) {
            warn!(key, error = %e, "failed to persist record");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.file_path(key);
        if path.exists()
            && let Err(e) = fs::remove_file(&path)
        {
            warn!(key, error = %e, "failed to remove record");
        }
    }
}
