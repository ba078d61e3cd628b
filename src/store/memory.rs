use std::cell::RefCell;
use std::collections::HashMap;

use crate::store::Storage;

/// In-memory store used by tests and by `--no-save` runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("settings"), None);
        store.set("settings", "{}");
        assert_eq!(store.get("settings"), Some("{}".to_string()));
        store.set("settings", "{\"a\":1}");
        assert_eq!(store.get("settings"), Some("{\"a\":1}".to_string()));
        store.remove("settings");
        assert_eq!(store.get("settings"), None);
        // Removing an absent key is fine.
        store.remove("settings");
    }
}
