use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::engine::filter::{CustomSelections, ModifierFlags, ScriptFlags};
use crate::engine::performance::{PerformanceEntry, PerformanceTracker};
use crate::engine::progression::{LevelDescriptor, RawLevel, ScriptLevel};
use crate::engine::shuffle::ShuffleMode;
use crate::store::Storage;

pub const SETTINGS_KEY: &str = "settings";
pub const LEVELS_KEY: &str = "levels";
pub const STATS_KEY: &str = "stats";
pub const PERFORMANCE_KEY: &str = "performance";

// --- Settings ---

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub filters: FilterSettings,
    #[serde(default)]
    pub options: OptionSettings,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(default)]
    pub character_types: ScriptFlags,
    #[serde(default)]
    pub modifier_group: ModifierFlags,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptionSettings {
    #[serde(default)]
    pub shuffle: ShuffleMode,
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default)]
    pub custom: CustomSelections,
}

fn default_true() -> bool {
    true
}

impl Default for OptionSettings {
    fn default() -> Self {
        Self {
            shuffle: ShuffleMode::None,
            sound: true,
            custom: CustomSelections::default(),
        }
    }
}

impl Settings {
    /// Repair anything a stale or hand-edited settings file could contain.
    /// With both kana scripts disabled there is nothing left to drill, so
    /// hiragana comes back on before the filter ever sees the flags.
    pub fn normalized(&self) -> Self {
        let mut settings = self.clone();
        let scripts = &mut settings.filters.character_types;
        if !scripts.hiragana && !scripts.katakana {
            scripts.hiragana = true;
        }
        settings.options.custom = settings.options.custom.normalized();
        settings
    }
}

// --- Level checkpoints ---

/// Per-script level checkpoints plus which script was last played. Levels
/// are stored in their lax raw form and repaired on read.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LevelCheckpoints {
    #[serde(default)]
    pub current_script: i64,
    #[serde(default)]
    pub levels: HashMap<String, RawLevel>,
}

impl LevelCheckpoints {
    pub fn resolve(&self, script: ScriptLevel) -> LevelDescriptor {
        self.levels
            .get(script.to_key())
            .map(LevelDescriptor::from_raw)
            .unwrap_or_else(|| LevelDescriptor::linear_initial(script))
    }

    pub fn current(&self) -> LevelDescriptor {
        self.resolve(ScriptLevel::from_index(self.current_script))
    }

    pub fn checkpoint(&mut self, level: &LevelDescriptor) {
        self.current_script = level.script.index() as i64;
        self.levels
            .insert(level.script.to_key().to_string(), level.to_raw());
    }
}

// --- Aggregate stats ---

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsData {
    #[serde(default)]
    pub recent_time_secs: Option<f64>,
    #[serde(default)]
    pub best_time_secs: Option<f64>,
    #[serde(default)]
    pub best_times_by_level: HashMap<String, f64>,
    #[serde(default)]
    pub kana_streak: u32,
    #[serde(default)]
    pub best_kana_streak: u32,
    #[serde(default)]
    pub daily_streak: u32,
    #[serde(default)]
    pub best_daily_streak: u32,
    #[serde(default)]
    pub last_active_date: Option<String>,
    #[serde(default)]
    pub daily_attempts: HashMap<String, u32>,
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl StatsData {
    pub fn record_correct(&mut self) {
        self.kana_streak += 1;
        self.best_kana_streak = self.best_kana_streak.max(self.kana_streak);
    }

    pub fn record_miss(&mut self) {
        self.kana_streak = 0;
    }

    /// Count an interaction for `today` and advance the daily streak:
    /// same day is a no-op, the day after the last active day extends the
    /// streak, any gap restarts it at 1.
    pub fn touch_day(&mut self, today: NaiveDate) {
        let key = date_key(today);
        *self.daily_attempts.entry(key.clone()).or_insert(0) += 1;

        if self.last_active_date.as_deref() == Some(key.as_str()) {
            return;
        }
        let yesterday = today
            .checked_sub_days(Days::new(1))
            .map(date_key)
            .unwrap_or_default();
        self.daily_streak = if self.last_active_date.as_deref() == Some(yesterday.as_str()) {
            self.daily_streak + 1
        } else {
            1
        };
        self.best_daily_streak = self.best_daily_streak.max(self.daily_streak);
        self.last_active_date = Some(key);
    }

    /// Record a completed round's elapsed time. Returns whether it set a
    /// new overall best and a new best for this level key.
    pub fn record_round_time(&mut self, level_key: &str, secs: f64) -> (bool, bool) {
        self.recent_time_secs = Some(secs);

        let new_overall = self.best_time_secs.is_none_or(|best| secs < best);
        if new_overall {
            self.best_time_secs = Some(secs);
        }

        let new_for_level = self
            .best_times_by_level
            .get(level_key)
            .is_none_or(|&best| secs < best);
        if new_for_level {
            self.best_times_by_level.insert(level_key.to_string(), secs);
        }

        (new_overall, new_for_level)
    }
}

// --- Tile performance ---

/// Stored performance value: either a full entry or, from old saves, a bare
/// miss count.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredPerformance {
    Entry(PerformanceEntry),
    LegacyMisses(u32),
}

// --- Typed store facade ---

/// Typed access to the persisted records over any `Storage` backend.
/// Every load repairs what it reads; a record that does not parse is
/// replaced with defaults and warned about, never propagated.
pub struct GameStore<S> {
    storage: S,
}

impl<S: Storage> GameStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn has(&self, key: &str) -> bool {
        self.storage.get(key).is_some()
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.storage.get(key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "discarding unreadable record");
                T::default()
            }),
            None => T::default(),
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => self.storage.set(key, &json),
            Err(e) => warn!(key, error = %e, "failed to serialize record"),
        }
    }

    pub fn load_settings(&self) -> Settings {
        self.load_json::<Settings>(SETTINGS_KEY).normalized()
    }

    pub fn save_settings(&self, settings: &Settings) {
        self.save_json(SETTINGS_KEY, &settings.normalized());
    }

    pub fn load_levels(&self) -> LevelCheckpoints {
        self.load_json(LEVELS_KEY)
    }

    pub fn save_levels(&self, levels: &LevelCheckpoints) {
        self.save_json(LEVELS_KEY, levels);
    }

    pub fn load_stats(&self) -> StatsData {
        self.load_json(STATS_KEY)
    }

    pub fn save_stats(&self, stats: &StatsData) {
        self.save_json(STATS_KEY, stats);
    }

    pub fn load_performance(&self) -> PerformanceTracker {
        let stored: HashMap<String, StoredPerformance> = self.load_json(PERFORMANCE_KEY);
        let entries = stored
            .into_iter()
            .map(|(id, record)| {
                let entry = match record {
                    StoredPerformance::Entry(mut entry) => {
                        // Derived fields are re-derived, not trusted.
                        entry.recalc();
                        entry
                    }
                    StoredPerformance::LegacyMisses(misses) => {
                        PerformanceEntry::from_legacy_misses(misses)
                    }
                };
                (id, entry)
            })
            .collect();
        PerformanceTracker { entries }
    }

    pub fn save_performance(&self, tracker: &PerformanceTracker) {
        self.save_json(PERFORMANCE_KEY, &tracker.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn make_store() -> GameStore<MemoryStore> {
        GameStore::new(MemoryStore::new())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_missing_records_load_as_defaults() {
        let store = make_store();
        let settings = store.load_settings();
        assert!(settings.filters.character_types.hiragana);
        assert!(settings.options.sound);
        assert_eq!(store.load_stats().kana_streak, 0);
        assert!(store.load_performance().entries.is_empty());
    }

    #[test]
    fn test_corrupt_record_loads_as_defaults() {
        let store = make_store();
        store.storage.set(STATS_KEY, "{not json");
        store.storage.set(SETTINGS_KEY, "[1,2,3]");
        assert_eq!(store.load_stats().daily_streak, 0);
        assert!(store.load_settings().filters.character_types.hiragana);
    }

    #[test]
    fn test_both_scripts_disabled_is_repaired_on_load() {
        let store = make_store();
        store.storage.set(
            SETTINGS_KEY,
            r#"{"filters":{"character_types":{"hiragana":false,"katakana":false,"romaji":true}}}"#,
        );
        let settings = store.load_settings();
        assert!(settings.filters.character_types.hiragana);
        assert!(!settings.filters.character_types.katakana);
    }

    #[test]
    fn test_partial_settings_deep_merge_over_defaults() {
        let store = make_store();
        store
            .storage
            .set(SETTINGS_KEY, r#"{"options":{"shuffle":"rows"}}"#);
        let settings = store.load_settings();
        assert_eq!(settings.options.shuffle, ShuffleMode::Horizontal);
        // Untouched fields keep their defaults.
        assert!(settings.options.sound);
        assert!(settings.filters.character_types.hiragana);
    }

    #[test]
    fn test_settings_round_trip() {
        let store = make_store();
        let mut settings = Settings::default();
        settings.filters.character_types.katakana = true;
        settings.options.shuffle = ShuffleMode::Both;
        settings.options.sound = false;
        store.save_settings(&settings);

        let loaded = store.load_settings();
        assert!(loaded.filters.character_types.katakana);
        assert_eq!(loaded.options.shuffle, ShuffleMode::Both);
        assert!(!loaded.options.sound);
    }

    #[test]
    fn test_level_checkpoint_round_trip() {
        let store = make_store();
        let mut levels = LevelCheckpoints::default();
        let level = LevelDescriptor::range_initial(ScriptLevel::Katakana).next_level();
        levels.checkpoint(&level);
        store.save_levels(&levels);

        let loaded = store.load_levels();
        assert_eq!(loaded.current(), level);
        // Other scripts still resolve to their initial level.
        assert_eq!(
            loaded.resolve(ScriptLevel::Hiragana),
            LevelDescriptor::linear_initial(ScriptLevel::Hiragana)
        );
    }

    #[test]
    fn test_garbage_checkpoint_resolves_to_a_sane_level() {
        let store = make_store();
        store.storage.set(
            LEVELS_KEY,
            r#"{"current_script":42,"levels":{"hiragana":{"mode":"warp","row_start":-3,"row_end":99}}}"#,
        );
        let levels = store.load_levels();
        // Unknown script index falls back to hiragana, whose raw record is
        // repaired field by field.
        let level = levels.current();
        assert!((1..=10).contains(&level.row_start));
        assert!(level.row_start <= level.row_end);
    }

    #[test]
    fn test_legacy_numeric_performance_upgrades() {
        let store = make_store();
        store
            .storage
            .set(PERFORMANCE_KEY, r#"{"3":4,"7":{"attempts":2,"misses":1}}"#);
        let tracker = store.load_performance();

        let legacy = tracker.entry("3").unwrap();
        assert_eq!(legacy.misses, 4);
        assert_eq!(legacy.attempts, 0);
        assert_eq!(legacy.accuracy, 0.0);

        // Derived fields of modern entries are recomputed on load.
        let modern = tracker.entry("7").unwrap();
        assert!((modern.accuracy - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_performance_round_trip() {
        let store = make_store();
        let mut tracker = PerformanceTracker::default();
        tracker.record_miss("3");
        tracker.record_attempt("3", Some(2.0), 1);
        store.save_performance(&tracker);

        let loaded = store.load_performance();
        let entry = loaded.entry("3").unwrap();
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.misses, 1);
        assert_eq!(entry.recent_attempts.len(), 1);
    }

    #[test]
    fn test_daily_streak_same_day_is_a_no_op() {
        let mut stats = StatsData::default();
        stats.touch_day(date("2026-08-23"));
        stats.touch_day(date("2026-08-23"));
        assert_eq!(stats.daily_streak, 1);
        assert_eq!(stats.daily_attempts["2026-08-23"], 2);
    }

    #[test]
    fn test_daily_streak_extends_on_consecutive_days() {
        let mut stats = StatsData::default();
        stats.touch_day(date("2026-08-22"));
        stats.touch_day(date("2026-08-23"));
        assert_eq!(stats.daily_streak, 2);
        assert_eq!(stats.best_daily_streak, 2);
    }

    #[test]
    fn test_daily_streak_resets_after_a_gap() {
        let mut stats = StatsData::default();
        stats.touch_day(date("2026-08-20"));
        stats.touch_day(date("2026-08-21"));
        stats.touch_day(date("2026-08-23"));
        assert_eq!(stats.daily_streak, 1);
        assert_eq!(stats.best_daily_streak, 2);
    }

    #[test]
    fn test_kana_streak_resets_on_miss() {
        let mut stats = StatsData::default();
        stats.record_correct();
        stats.record_correct();
        stats.record_correct();
        stats.record_miss();
        stats.record_correct();
        assert_eq!(stats.kana_streak, 1);
        assert_eq!(stats.best_kana_streak, 3);
    }

    #[test]
    fn test_round_time_bests() {
        let mut stats = StatsData::default();
        let key = "linear:1-1:hiragana:g0:a0.80";
        assert_eq!(stats.record_round_time(key, 30.0), (true, true));
        assert_eq!(stats.record_round_time(key, 40.0), (false, false));
        assert_eq!(stats.record_round_time(key, 20.0), (true, true));
        assert_eq!(stats.record_round_time("other", 25.0), (false, true));
        assert_eq!(stats.recent_time_secs, Some(25.0));
        assert_eq!(stats.best_time_secs, Some(20.0));
        assert_eq!(stats.best_times_by_level[key], 20.0);
    }
}
