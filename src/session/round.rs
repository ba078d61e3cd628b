use std::time::{Duration, Instant};

use crate::catalog::ScriptKind;
use crate::engine::performance::PerformanceTracker;
use crate::engine::tiles::{AnswerTile, PromptTile};
use crate::session::removal::RemovalScheduler;

/// How long a completed tile lingers for its fade-out before removal.
pub const REMOVAL_DELAY: Duration = Duration::from_millis(350);

/// The tile currently accepting input, with its activation timestamp and a
/// local miss counter. Both reset whenever the active tile changes.
#[derive(Clone, Debug)]
pub struct ActiveTile {
    pub tile_id: String,
    pub kind: ScriptKind,
    pub started_at: Instant,
    pub local_misses: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Submission matched; the tile id is what listeners were notified with.
    Completed { tile_id: String },
    /// Submission did not match the active tile; recorded as a miss. The
    /// caller surfaces this as transient feedback (a shake), not an error.
    Rejected,
    /// No tile is accepting input (round over or live set empty).
    Inactive,
}

/// One round of play over a filtered, shuffled tile sequence.
pub struct Round {
    pub tiles: Vec<AnswerTile>,
    pub prompts: Vec<PromptTile>,
    pub active: Option<ActiveTile>,
    pub removal: RemovalScheduler,
    pub game_over: bool,
    listeners: Vec<Box<dyn FnMut(&str)>>,
}

impl Round {
    pub fn new(tiles: Vec<AnswerTile>, prompts: Vec<PromptTile>, now: Instant) -> Self {
        let mut round = Self {
            tiles,
            prompts,
            active: None,
            removal: RemovalScheduler::new(),
            game_over: false,
            listeners: Vec::new(),
        };
        round.activate_next(now);
        round
    }

    /// Register a completion listener (the audio collaborator's hook). Fired
    /// with the tile id on every successful completion, before and
    /// independent of the deferred removal.
    pub fn on_completed(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn active_tile(&self) -> Option<&AnswerTile> {
        let active = self.active.as_ref()?;
        self.tiles
            .iter()
            .find(|t| t.id == active.tile_id && t.kind == active.kind && !t.filled)
    }

    /// Expected answer string for the active tile, lowercased.
    pub fn active_expected(&self) -> Option<String> {
        self.active_tile().map(|t| t.expected().to_lowercase())
    }

    pub fn remaining(&self) -> usize {
        self.tiles.iter().filter(|t| !t.filled).count()
    }

    /// Typed submission against the active tile. Matching is
    /// case-insensitive against the tile's expected string.
    pub fn submit(
        &mut self,
        text: &str,
        tracker: &mut PerformanceTracker,
        now: Instant,
    ) -> SubmitOutcome {
        let Some(active) = self.active.clone() else {
            return SubmitOutcome::Inactive;
        };
        let Some(index) = self
            .tiles
            .iter()
            .position(|t| t.id == active.tile_id && t.kind == active.kind && !t.filled)
        else {
            return SubmitOutcome::Inactive;
        };

        let expected = self.tiles[index].expected().to_string();
        if text.trim().eq_ignore_ascii_case(&expected) {
            let elapsed = now.duration_since(active.started_at).as_secs_f64();
            self.complete_tile(index, Some(elapsed), active.local_misses, tracker, now)
        } else {
            tracker.record_miss(&active.tile_id);
            if let Some(active) = self.active.as_mut() {
                active.local_misses += 1;
            }
            SubmitOutcome::Rejected
        }
    }

    /// Drag-and-drop submission: a dropped answer tile against a prompt.
    /// Correct when the dropped tile belongs to the target prompt. Timing is
    /// only attributed when the dropped tile is the active one.
    pub fn submit_drop(
        &mut self,
        dropped_tile_id: &str,
        target_parent_id: &str,
        tracker: &mut PerformanceTracker,
        now: Instant,
    ) -> SubmitOutcome {
        let Some(index) = self
            .tiles
            .iter()
            .position(|t| !t.filled && (t.key() == dropped_tile_id || t.id == dropped_tile_id))
        else {
            return SubmitOutcome::Inactive;
        };

        if self.tiles[index].parent_id == target_parent_id {
            let timing = self.active.clone().filter(|a| {
                a.tile_id == self.tiles[index].id && a.kind == self.tiles[index].kind
            });
            let elapsed =
                timing.as_ref().map(|a| now.duration_since(a.started_at).as_secs_f64());
            let local_misses = timing.map(|a| a.local_misses).unwrap_or(0);
            self.complete_tile(index, elapsed, local_misses, tracker, now)
        } else {
            tracker.record_miss(&self.tiles[index].id);
            SubmitOutcome::Rejected
        }
    }

    fn complete_tile(
        &mut self,
        index: usize,
        duration_secs: Option<f64>,
        local_misses: u32,
        tracker: &mut PerformanceTracker,
        now: Instant,
    ) -> SubmitOutcome {
        let (tile_id, tile_key, kind, parent_id) = {
            let tile = &mut self.tiles[index];
            tile.filled = true;
            tile.fading = true;
            (tile.id.clone(), tile.key(), tile.kind, tile.parent_id.clone())
        };

        tracker.record_attempt(&tile_id, duration_secs, local_misses);

        if let Some(prompt) = self.prompts.iter_mut().find(|p| p.id == parent_id) {
            if let Some(slot) = prompt.slots.get_mut(&kind) {
                slot.filled = true;
            }
            prompt.completed = prompt.slots.values().all(|s| s.filled);
        }

        // Notify before scheduling removal; playback must not wait for the
        // fade.
        for listener in &mut self.listeners {
            listener(&tile_id);
        }

        self.removal.schedule(&tile_key, REMOVAL_DELAY, now);
        self.activate_next(now);
        SubmitOutcome::Completed { tile_id }
    }

    /// Advance to the next unanswered tile in sequence order (row-major
    /// within the presented ordering).
    fn activate_next(&mut self, now: Instant) {
        self.active = self.tiles.iter().find(|t| !t.filled).map(|t| ActiveTile {
            tile_id: t.id.clone(),
            kind: t.kind,
            started_at: now,
            local_misses: 0,
        });
        if self.tiles.is_empty() {
            self.game_over = true;
        }
    }

    /// Apply due removals. Called from the app tick; the live set emptying
    /// is the terminal game-over state.
    pub fn poll_removals(&mut self, now: Instant) {
        for key in self.removal.drain_due(now) {
            self.tiles.retain(|t| t.key() != key);
        }
        if self.tiles.is_empty() {
            self.game_over = true;
        }
    }
}
