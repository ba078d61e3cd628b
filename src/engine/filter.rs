use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{ModifierGroup, ScriptKind, TOTAL_ROWS};
use crate::engine::progression::{LevelDescriptor, LevelMode, available_shape_groups};
use crate::engine::tiles::AnswerTile;

// --- Configuration slices the filter consumes ---

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScriptFlags {
    #[serde(default = "default_true")]
    pub hiragana: bool,
    #[serde(default)]
    pub katakana: bool,
    #[serde(default = "default_true")]
    pub romaji: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScriptFlags {
    fn default() -> Self {
        Self {
            hiragana: true,
            katakana: false,
            romaji: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ModifierFlags {
    #[serde(default)]
    pub dakuten: bool,
    #[serde(default)]
    pub handakuten: bool,
}

/// Per-section overrides from the setup surface. Mutated externally,
/// validated here at every read boundary.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CustomSelections {
    #[serde(default)]
    pub rows: HashMap<String, HashMap<u8, bool>>,
    #[serde(default)]
    pub shapes: HashMap<String, HashMap<u8, bool>>,
    #[serde(default)]
    pub accuracy_targets: HashMap<String, f64>,
}

impl CustomSelections {
    /// Drop rows outside the curriculum, shape groups unknown to the
    /// section's script, and clamp accuracy targets to percentages.
    pub fn normalized(&self) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|(section, map)| {
                let map = map
                    .iter()
                    .filter(|(row, _)| (1..=TOTAL_ROWS).contains(*row))
                    .map(|(&row, &enabled)| (row, enabled))
                    .collect();
                (section.clone(), map)
            })
            .collect();
        let shapes = self
            .shapes
            .iter()
            .map(|(section, map)| {
                let valid: Vec<u8> = ScriptKind::from_key(section)
                    .map(crate::catalog::shape_groups)
                    .unwrap_or_default();
                let map = map
                    .iter()
                    .filter(|(group, _)| valid.contains(group))
                    .map(|(&group, &enabled)| (group, enabled))
                    .collect();
                (section.clone(), map)
            })
            .collect();
        let accuracy_targets = self
            .accuracy_targets
            .iter()
            .map(|(section, pct)| (section.clone(), pct.clamp(0.0, 100.0)))
            .collect();
        Self {
            rows,
            shapes,
            accuracy_targets,
        }
    }
}

// --- Filter state ---

/// Everything `allows` needs, resolved once per configuration change rather
/// than per tile.
#[derive(Clone, Debug)]
pub struct FilterState {
    pub scripts: ScriptFlags,
    pub modifiers: ModifierFlags,
    pub mode: LevelMode,
    pub row_start: u8,
    pub row_end: u8,
    pub shape_group: u8,
    pub accuracy_threshold: f64,
    custom_rows: HashMap<String, HashMap<u8, bool>>,
    sections_with_overrides: HashSet<String>,
}

impl FilterState {
    pub fn build(
        scripts: ScriptFlags,
        modifiers: ModifierFlags,
        level: &LevelDescriptor,
        custom: &CustomSelections,
    ) -> Self {
        let level = level.normalized();
        let custom = custom.normalized();
        let sections_with_overrides = custom
            .rows
            .iter()
            .filter(|(_, map)| !map.is_empty())
            .map(|(section, _)| section.clone())
            .collect();
        let groups = available_shape_groups(level.script);
        Self {
            scripts,
            modifiers,
            mode: level.mode,
            row_start: level.row_start,
            row_end: level.row_end,
            shape_group: if groups.contains(&level.shape_group) {
                level.shape_group
            } else {
                groups.first().copied().unwrap_or(0)
            },
            accuracy_threshold: level.accuracy_threshold,
            custom_rows: custom.rows,
            sections_with_overrides,
        }
    }

    /// Pure: same tile and state always yield the same answer. Rules run in
    /// order; the first rejection wins.
    pub fn allows(&self, tile: &AnswerTile) -> bool {
        let script_enabled = match tile.kind {
            ScriptKind::Hiragana => self.scripts.hiragana,
            ScriptKind::Katakana => self.scripts.katakana,
            ScriptKind::Romaji => self.scripts.romaji,
        };
        if !script_enabled {
            return false;
        }

        match tile.modifier {
            ModifierGroup::Dakuten if !self.modifiers.dakuten => return false,
            ModifierGroup::Handakuten if !self.modifiers.handakuten => return false,
            _ => {}
        }

        // An explicit row disable applies regardless of the mode rule below.
        let section = tile.kind.to_key();
        if let Some(rows) = self.custom_rows.get(section)
            && rows.get(&tile.row) == Some(&false)
        {
            return false;
        }

        match self.mode {
            LevelMode::Shapes => tile.shape_group == Some(self.shape_group),
            LevelMode::Adaptive => {
                // A zero threshold disables adaptive filtering entirely.
                self.accuracy_threshold == 0.0 || tile.accuracy <= self.accuracy_threshold
            }
            LevelMode::Linear | LevelMode::Range => {
                // Any custom override for this section supersedes the range.
                self.sections_with_overrides.contains(section)
                    || (self.row_start..=self.row_end).contains(&tile.row)
            }
        }
    }
}
