use std::io::Write;
use std::time::Instant;

use chrono::Local;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::catalog::ScriptKind;
use crate::config::Config;
use crate::engine::filter::FilterState;
use crate::engine::performance::PerformanceTracker;
use crate::engine::progression::{LevelDescriptor, ScriptLevel};
use crate::engine::shuffle::apply_shuffle;
use crate::engine::tiles::{AnswerTile, build_answer_tiles, build_prompt_tiles};
use crate::session::round::{Round, SubmitOutcome};
use crate::store::schema::{LevelCheckpoints, Settings, StatsData};
use crate::store::{GameStore, JsonStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Game,
    Summary,
    Setup,
}

/// Everything the summary screen shows after a round drains.
#[derive(Clone, Debug)]
pub struct RoundSummary {
    pub elapsed_secs: f64,
    pub tiles_completed: usize,
    pub misses: u32,
    pub accuracy: f64,
    pub new_best_overall: bool,
    pub new_best_for_level: bool,
    pub level_key: String,
    pub next_level: LevelDescriptor,
}

pub const SETUP_FIELDS: usize = 6;

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub settings: Settings,
    pub levels: LevelCheckpoints,
    pub level: LevelDescriptor,
    pub stats: StatsData,
    pub tracker: PerformanceTracker,
    pub round: Option<Round>,
    pub input: String,
    /// Transient wrong-submission signal; the UI shows it as a shake and the
    /// next tick or keypress clears it.
    pub rejected: bool,
    pub last_summary: Option<RoundSummary>,
    pub menu_selected: usize,
    pub setup_selected: usize,
    pub should_quit: bool,
    store: Option<GameStore<JsonStore>>,
    round_started_at: Option<Instant>,
    round_misses: u32,
    round_completed: usize,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = JsonStore::with_base_dir(config.data_dir())
            .ok()
            .map(GameStore::new);

        let (mut settings, levels, stats, tracker) = match &store {
            Some(store) => (
                store.load_settings(),
                store.load_levels(),
                store.load_stats(),
                store.load_performance(),
            ),
            None => Default::default(),
        };
        // A fresh profile takes its shuffle default from the app config.
        let fresh = store
            .as_ref()
            .is_none_or(|s| !s.has(crate::store::schema::SETTINGS_KEY));
        if fresh {
            settings.options.shuffle = config.shuffle_mode();
        }

        let mut app = Self {
            screen: AppScreen::Menu,
            config,
            settings,
            levels,
            level: LevelDescriptor::default(),
            stats,
            tracker,
            round: None,
            input: String::new(),
            rejected: false,
            last_summary: None,
            menu_selected: 0,
            setup_selected: 0,
            should_quit: false,
            store,
            round_started_at: None,
            round_misses: 0,
            round_completed: 0,
            rng: SmallRng::from_entropy(),
        };
        app.level = app.levels.resolve(app.resolve_track());
        app
    }

    /// Which script track to play: the configured one when the settings
    /// flags support it, otherwise the widest enabled track.
    fn resolve_track(&self) -> ScriptLevel {
        let flags = self.settings.filters.character_types;
        let wanted = self.config.script_level();
        let supported = match wanted {
            ScriptLevel::Hiragana => flags.hiragana,
            ScriptLevel::Katakana => flags.katakana,
            ScriptLevel::Both => flags.hiragana && flags.katakana,
        };
        if supported {
            wanted
        } else if flags.hiragana && flags.katakana {
            ScriptLevel::Both
        } else if flags.katakana {
            ScriptLevel::Katakana
        } else {
            ScriptLevel::Hiragana
        }
    }

    fn filtered_tiles(&self) -> Vec<AnswerTile> {
        // The track narrows which kana scripts are in play; the settings
        // flags narrow further.
        let kinds = self.level.script.kinds();
        let mut scripts = self.settings.filters.character_types;
        scripts.hiragana &= kinds.contains(&ScriptKind::Hiragana);
        scripts.katakana &= kinds.contains(&ScriptKind::Katakana);

        let state = FilterState::build(
            scripts,
            self.settings.filters.modifier_group,
            &self.level,
            &self.settings.options.custom,
        );
        build_answer_tiles(&self.tracker)
            .into_iter()
            .filter(|tile| state.allows(tile))
            .collect()
    }

    pub fn start_round(&mut self) {
        let now = Instant::now();
        let mut tiles = self.filtered_tiles();
        if tiles.is_empty() {
            // A stale checkpoint can strand the level where the current
            // settings serve nothing; restart the track.
            self.level = LevelDescriptor::linear_initial(self.level.script);
            tiles = self.filtered_tiles();
        }
        apply_shuffle(&mut tiles, self.settings.options.shuffle, &mut self.rng);
        let prompts = build_prompt_tiles(&tiles);

        let mut round = Round::new(tiles, prompts, now);
        if self.settings.options.sound {
            round.on_completed(|_| {
                let mut stdout = std::io::stdout();
                let _ = stdout.write_all(b"\x07");
                let _ = stdout.flush();
            });
        }

        self.round = Some(round);
        self.round_started_at = Some(now);
        self.round_misses = 0;
        self.round_completed = 0;
        self.input.clear();
        self.rejected = false;
        self.screen = AppScreen::Game;
    }

    pub fn push_char(&mut self, ch: char) {
        self.rejected = false;
        if self.input.len() >= 8 {
            return;
        }
        self.input.push(ch);

        // Auto-submit once the input spells the active tile's answer.
        let spelled = self
            .round
            .as_ref()
            .and_then(|round| round.active_expected())
            .is_some_and(|expected| self.input.eq_ignore_ascii_case(&expected));
        if spelled {
            self.submit_input();
        }
    }

    pub fn backspace(&mut self) {
        self.rejected = false;
        self.input.pop();
    }

    pub fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        if text.trim().is_empty() {
            return;
        }
        let now = Instant::now();
        let Some(round) = self.round.as_mut() else {
            return;
        };
        match round.submit(&text, &mut self.tracker, now) {
            SubmitOutcome::Completed { .. } => {
                self.rejected = false;
                self.round_completed += 1;
                self.stats.record_correct();
                self.stats.touch_day(Local::now().date_naive());
                self.persist_progress();
            }
            SubmitOutcome::Rejected => {
                self.rejected = true;
                self.round_misses += 1;
                self.stats.record_miss();
                self.stats.touch_day(Local::now().date_naive());
                self.persist_progress();
            }
            SubmitOutcome::Inactive => {}
        }
    }

    /// Tick: advance deferred removals; a drained live set ends the round.
    pub fn tick(&mut self) {
        self.rejected = false;
        let now = Instant::now();
        let game_over = self
            .round
            .as_mut()
            .map(|round| {
                round.poll_removals(now);
                round.game_over
            })
            .unwrap_or(false);
        if game_over && self.screen == AppScreen::Game {
            self.finish_round(now);
        }
    }

    fn finish_round(&mut self, now: Instant) {
        let elapsed_secs = self
            .round_started_at
            .map(|start| now.duration_since(start).as_secs_f64())
            .unwrap_or_default();
        let interactions = self.round_completed as u32 + self.round_misses;
        let accuracy = if interactions == 0 {
            1.0
        } else {
            self.round_completed as f64 / interactions as f64
        };

        let level_key = self.level.key();
        let (new_best_overall, new_best_for_level) =
            self.stats.record_round_time(&level_key, elapsed_secs);

        let next_level = self.level.next_level();
        self.levels.checkpoint(&next_level);
        self.level = next_level;

        if let Some(store) = &self.store {
            store.save_levels(&self.levels);
            store.save_stats(&self.stats);
        }

        self.last_summary = Some(RoundSummary {
            elapsed_secs,
            tiles_completed: self.round_completed,
            misses: self.round_misses,
            accuracy,
            new_best_overall,
            new_best_for_level,
            level_key,
            next_level,
        });
        self.round = None;
        self.round_started_at = None;
        self.screen = AppScreen::Summary;
    }

    /// Abandon the running round without checkpointing the level.
    pub fn go_to_menu(&mut self) {
        self.round = None;
        self.round_started_at = None;
        self.input.clear();
        self.rejected = false;
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_setup(&mut self) {
        self.setup_selected = 0;
        self.screen = AppScreen::Setup;
    }

    pub fn setup_toggle(&mut self) {
        {
            let settings = &mut self.settings;
            match self.setup_selected {
                0 => settings.filters.character_types.hiragana ^= true,
                1 => settings.filters.character_types.katakana ^= true,
                2 => settings.filters.character_types.romaji ^= true,
                3 => settings.filters.modifier_group.dakuten ^= true,
                4 => settings.filters.modifier_group.handakuten ^= true,
                5 => settings.options.shuffle = next_shuffle(settings.options.shuffle),
                _ => {}
            }
        }
        self.settings = self.settings.normalized();
        self.level = self.levels.resolve(self.resolve_track());
        if let Some(store) = &self.store {
            store.save_settings(&self.settings);
        }
    }

    fn persist_progress(&self) {
        if let Some(store) = &self.store {
            store.save_performance(&self.tracker);
            store.save_stats(&self.stats);
        }
    }
}

fn next_shuffle(mode: crate::engine::shuffle::ShuffleMode) -> crate::engine::shuffle::ShuffleMode {
    use crate::engine::shuffle::ShuffleMode::*;
    match mode {
        None => Horizontal,
        Horizontal => Vertical,
        Vertical => Both,
        Both => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_app(config: Config) -> App {
        let mut app = App::new(Config {
            // Point the store somewhere unusable so tests stay on defaults.
            data_dir: "/dev/null/kanadr-test".to_string(),
            ..config
        });
        app.store = None;
        app
    }

    #[test]
    fn test_new_round_has_live_tiles_and_an_active_one() {
        let mut app = offline_app(Config::default());
        app.start_round();
        let round = app.round.as_ref().unwrap();
        assert!(!round.tiles.is_empty());
        assert!(round.active.is_some());
        assert_eq!(app.screen, AppScreen::Game);
    }

    #[test]
    fn test_default_level_serves_first_row_hiragana_and_romaji() {
        let mut app = offline_app(Config::default());
        app.start_round();
        let round = app.round.as_ref().unwrap();
        assert!(round.tiles.iter().all(|t| t.row == 1));
        assert!(
            round
                .tiles
                .iter()
                .any(|t| t.kind == ScriptKind::Hiragana)
        );
        assert!(round.tiles.iter().any(|t| t.kind == ScriptKind::Romaji));
        assert!(!round.tiles.iter().any(|t| t.kind == ScriptKind::Katakana));
    }

    #[test]
    fn test_track_falls_back_when_settings_disable_it() {
        let mut app = offline_app(Config {
            default_script: "katakana".to_string(),
            ..Config::default()
        });
        // Default settings have katakana off, so the track degrades.
        assert_eq!(app.resolve_track(), ScriptLevel::Hiragana);

        app.settings.filters.character_types.katakana = true;
        assert_eq!(app.resolve_track(), ScriptLevel::Katakana);
    }

    #[test]
    fn test_wrong_then_right_input_flows_into_tracker_and_streaks() {
        let mut app = offline_app(Config::default());
        app.start_round();

        let expected = app.round.as_ref().unwrap().active_expected().unwrap();
        app.input = "zz".to_string();
        app.submit_input();
        assert!(app.rejected);
        assert_eq!(app.stats.kana_streak, 0);

        app.input = expected;
        app.submit_input();
        assert!(!app.rejected);
        assert_eq!(app.stats.kana_streak, 1);
        assert_eq!(app.round_completed, 1);
        assert_eq!(app.round_misses, 1);
    }

    #[test]
    fn test_typing_the_answer_auto_submits() {
        let mut app = offline_app(Config::default());
        app.start_round();
        let expected = app.round.as_ref().unwrap().active_expected().unwrap();
        for ch in expected.chars() {
            app.push_char(ch);
        }
        assert!(app.input.is_empty());
        assert_eq!(app.round_completed, 1);
    }

    #[test]
    fn test_drained_round_produces_summary_and_advances_level() {
        let mut app = offline_app(Config::default());
        app.start_round();
        let before = app.level;

        loop {
            let Some(expected) = app.round.as_ref().and_then(|r| r.active_expected()) else {
                break;
            };
            app.input = expected;
            app.submit_input();
        }
        // Let the deferred removals fire.
        std::thread::sleep(crate::session::round::REMOVAL_DELAY);
        app.tick();

        assert_eq!(app.screen, AppScreen::Summary);
        let summary = app.last_summary.as_ref().unwrap();
        assert!(summary.misses == 0);
        assert!((summary.accuracy - 1.0).abs() < 1e-9);
        assert!(summary.new_best_overall);
        assert_eq!(summary.level_key, before.key());
        assert_ne!(app.level, before);
        assert_eq!(app.levels.current(), app.level);
    }

    #[test]
    fn test_setup_toggle_repairs_impossible_script_combo() {
        let mut app = offline_app(Config::default());
        app.setup_selected = 0;
        app.setup_toggle(); // hiragana off, katakana already off
        assert!(app.settings.filters.character_types.hiragana);
    }

    #[test]
    fn test_abandoning_a_round_does_not_checkpoint() {
        let mut app = offline_app(Config::default());
        let before = app.level;
        app.start_round();
        let expected = app.round.as_ref().unwrap().active_expected().unwrap();
        app.input = expected;
        app.submit_input();
        app.go_to_menu();
        assert_eq!(app.level, before);
        assert!(app.round.is_none());
    }
}
