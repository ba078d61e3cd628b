use std::collections::HashMap;

use crate::catalog::{self, KANA, ModifierGroup, ScriptKind};
use crate::engine::performance::PerformanceTracker;

/// One playable answer tile: a single script rendering of a catalog syllable,
/// carrying the merged performance snapshot the filter reads.
#[derive(Clone, Debug)]
pub struct AnswerTile {
    pub id: String,
    pub parent_id: String,
    pub kind: ScriptKind,
    pub character: String,
    pub modifier: ModifierGroup,
    pub shape_group: Option<u8>,
    pub row: u8,
    pub column: u8,
    pub missed: u32,
    pub accuracy: f64,
    pub average_time_secs: Option<f64>,
    pub memory_score: f64,
    pub filled: bool,
    pub visible: bool,
    pub fading: bool,
}

impl AnswerTile {
    /// Unique key across the live set (ids repeat across scripts).
    pub fn key(&self) -> String {
        format!("{}:{}", self.id, self.kind.to_key())
    }

    /// The string a typed submission is compared against: the tile's own
    /// character for romaji tiles, its romaji reading otherwise.
    pub fn expected(&self) -> &str {
        match self.kind {
            ScriptKind::Romaji => &self.character,
            _ => catalog::romaji_for(&self.character).unwrap_or(&self.character),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PromptSlot {
    pub character: String,
    pub filled: bool,
}

/// Curriculum-owned prompt tile; recreated on every reset.
#[derive(Clone, Debug)]
pub struct PromptTile {
    pub id: String,
    pub slots: HashMap<ScriptKind, PromptSlot>,
    pub completed: bool,
}

/// Every catalog syllable as an answer tile per script, script-major and
/// row-major within a script, with stored performance merged in. The filter
/// prunes this to the live set.
pub fn build_answer_tiles(tracker: &PerformanceTracker) -> Vec<AnswerTile> {
    let mut tiles = Vec::with_capacity(KANA.len() * ScriptKind::all().len());
    for &kind in ScriptKind::all() {
        for def in KANA {
            let id = def.id_str();
            let entry = tracker.entry(&id).cloned().unwrap_or_default();
            tiles.push(AnswerTile {
                parent_id: id.clone(),
                id,
                kind,
                character: def.character(kind).to_string(),
                modifier: def.modifier,
                shape_group: def.shape_group(kind),
                row: def.row,
                column: def.column(),
                missed: entry.misses,
                accuracy: entry.accuracy,
                average_time_secs: entry.average_time_secs,
                memory_score: entry.memory_score,
                filled: false,
                visible: true,
                fading: false,
            });
        }
    }
    tiles
}

/// One prompt per distinct parent in the live set, in first-seen order, with
/// a slot per script actually playable for that parent.
pub fn build_prompt_tiles(tiles: &[AnswerTile]) -> Vec<PromptTile> {
    let mut prompts: Vec<PromptTile> = Vec::new();
    for tile in tiles {
        let prompt = match prompts.iter_mut().find(|p| p.id == tile.parent_id) {
            Some(prompt) => prompt,
            None => {
                prompts.push(PromptTile {
                    id: tile.parent_id.clone(),
                    slots: HashMap::new(),
                    completed: false,
                });
                prompts.last_mut().unwrap()
            }
        };
        prompt.slots.insert(
            tile.kind,
            PromptSlot {
                character: tile.character.clone(),
                filled: false,
            },
        );
    }
    prompts
}
