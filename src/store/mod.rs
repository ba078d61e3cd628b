pub mod json_store;
pub mod memory;
pub mod schema;

pub use json_store::JsonStore;
pub use memory::MemoryStore;
pub use schema::GameStore;

/// Key-value persistence port. Implementations never surface failures to
/// callers: a failed read is absence, a failed write is a logged warning.
/// Game state has already been committed in memory by the time anything is
/// persisted, so a broken disk degrades to a session-only game.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}
