use serde::{Deserialize, Serialize};

use crate::catalog::{self, ScriptKind, TOTAL_ROWS};

/// Accuracy thresholds the adaptive mode climbs, in order.
pub const ACCURACY_LADDER: &[f64] = &[0.80, 0.85, 0.90, 0.95];
/// Window widths the range mode grows through, capped at TOTAL_ROWS.
pub const WINDOW_LADDER: &[u8] = &[2, 4, 6, 8, 10];

// --- Level Mode ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelMode {
    Linear,
    Range,
    Shapes,
    Adaptive,
}

impl LevelMode {
    pub fn to_key(self) -> &'static str {
        match self {
            LevelMode::Linear => "linear",
            LevelMode::Range => "range",
            LevelMode::Shapes => "shapes",
            LevelMode::Adaptive => "adaptive",
        }
    }

    /// Unknown keys fall back to linear rather than failing.
    pub fn from_key(key: &str) -> Self {
        match key {
            "range" => LevelMode::Range,
            "shapes" => LevelMode::Shapes,
            "adaptive" => LevelMode::Adaptive,
            _ => LevelMode::Linear,
        }
    }
}

// --- Script Level ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptLevel {
    Hiragana,
    Katakana,
    Both,
}

impl ScriptLevel {
    pub fn to_key(self) -> &'static str {
        match self {
            ScriptLevel::Hiragana => "hiragana",
            ScriptLevel::Katakana => "katakana",
            ScriptLevel::Both => "both",
        }
    }

    pub fn index(self) -> u8 {
        match self {
            ScriptLevel::Hiragana => 1,
            ScriptLevel::Katakana => 2,
            ScriptLevel::Both => 3,
        }
    }

    /// Unknown indices fall back to the first script in the sequence.
    pub fn from_index(index: i64) -> Self {
        match index {
            2 => ScriptLevel::Katakana,
            3 => ScriptLevel::Both,
            _ => ScriptLevel::Hiragana,
        }
    }

    /// Next script in the curriculum sequence, wrapping.
    pub fn next(self) -> Self {
        match self {
            ScriptLevel::Hiragana => ScriptLevel::Katakana,
            ScriptLevel::Katakana => ScriptLevel::Both,
            ScriptLevel::Both => ScriptLevel::Hiragana,
        }
    }

    /// The kana scripts covered by this level.
    pub fn kinds(self) -> &'static [ScriptKind] {
        match self {
            ScriptLevel::Hiragana => &[ScriptKind::Hiragana],
            ScriptLevel::Katakana => &[ScriptKind::Katakana],
            ScriptLevel::Both => &[ScriptKind::Hiragana, ScriptKind::Katakana],
        }
    }
}

/// Distinct shape groups playable at this script level (union for Both),
/// ascending.
pub fn available_shape_groups(script: ScriptLevel) -> Vec<u8> {
    let mut groups: Vec<u8> = script
        .kinds()
        .iter()
        .flat_map(|&kind| catalog::shape_groups(kind))
        .collect();
    groups.sort_unstable();
    groups.dedup();
    groups
}

// --- Level Descriptor ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelDescriptor {
    pub mode: LevelMode,
    pub row_start: u8,
    pub row_end: u8,
    pub script: ScriptLevel,
    pub shape_group: u8,
    pub accuracy_threshold: f64,
}

/// Persisted form of a level descriptor. Fields are deliberately lax so a
/// stale or hand-edited checkpoint deserializes and gets repaired instead of
/// being thrown away.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawLevel {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub row_start: i64,
    #[serde(default)]
    pub row_end: i64,
    #[serde(default)]
    pub script_level: i64,
    #[serde(default)]
    pub shape_group: i64,
    #[serde(default)]
    pub accuracy_threshold: f64,
}

impl LevelDescriptor {
    pub fn linear_initial(script: ScriptLevel) -> Self {
        Self {
            mode: LevelMode::Linear,
            row_start: 1,
            row_end: 1,
            script,
            shape_group: first_shape_group(script),
            accuracy_threshold: ACCURACY_LADDER[0],
        }
    }

    pub fn range_initial(script: ScriptLevel) -> Self {
        Self {
            mode: LevelMode::Range,
            row_start: 1,
            row_end: WINDOW_LADDER[0],
            ..Self::linear_initial(script)
        }
    }

    pub fn shapes_initial(script: ScriptLevel) -> Self {
        Self {
            mode: LevelMode::Shapes,
            ..Self::linear_initial(script)
        }
    }

    pub fn adaptive_initial(script: ScriptLevel) -> Self {
        Self {
            mode: LevelMode::Adaptive,
            ..Self::linear_initial(script)
        }
    }

    pub fn from_raw(raw: &RawLevel) -> Self {
        Self {
            mode: LevelMode::from_key(&raw.mode),
            row_start: clamp_row(raw.row_start),
            row_end: clamp_row(raw.row_end),
            script: ScriptLevel::from_index(raw.script_level),
            shape_group: raw.shape_group.clamp(0, u8::MAX as i64) as u8,
            accuracy_threshold: raw.accuracy_threshold,
        }
        .normalized()
    }

    pub fn to_raw(&self) -> RawLevel {
        let level = self.normalized();
        RawLevel {
            mode: level.mode.to_key().to_string(),
            row_start: level.row_start as i64,
            row_end: level.row_end as i64,
            script_level: level.script.index() as i64,
            shape_group: level.shape_group as i64,
            accuracy_threshold: level.accuracy_threshold,
        }
    }

    /// Clamp every field independently. Idempotent: normalizing a normalized
    /// descriptor is a no-op.
    pub fn normalized(&self) -> Self {
        let mut row_start = self.row_start.clamp(1, TOTAL_ROWS);
        let mut row_end = self.row_end.clamp(1, TOTAL_ROWS);
        if row_start > row_end {
            std::mem::swap(&mut row_start, &mut row_end);
        }

        Self {
            mode: self.mode,
            row_start,
            row_end,
            script: self.script,
            shape_group: nearest_shape_group(self.script, self.shape_group),
            accuracy_threshold: self
                .accuracy_threshold
                .clamp(ACCURACY_LADDER[0], *ACCURACY_LADDER.last().unwrap_or(&1.0)),
        }
    }

    /// Deterministic curriculum advancement. Each call yields a different
    /// descriptor, and repeated application cycles back to the linear
    /// hiragana start.
    pub fn next_level(&self) -> Self {
        let level = self.normalized();
        match level.mode {
            LevelMode::Linear => {
                if level.row_end >= TOTAL_ROWS {
                    Self::range_initial(level.script)
                } else {
                    Self {
                        row_start: level.row_start.saturating_sub(1).max(1),
                        row_end: level.row_end + 1,
                        ..level
                    }
                }
            }
            LevelMode::Range => {
                let width = level.row_end - level.row_start + 1;
                if level.row_end < TOTAL_ROWS {
                    // Slide the window one row.
                    Self {
                        row_start: level.row_start + 1,
                        row_end: level.row_end + 1,
                        ..level
                    }
                } else if width < TOTAL_ROWS {
                    // At the edge: grow to the next window size on the ladder.
                    let next_width = WINDOW_LADDER
                        .iter()
                        .copied()
                        .find(|&w| w > width)
                        .unwrap_or(TOTAL_ROWS)
                        .min(TOTAL_ROWS);
                    Self {
                        row_start: 1,
                        row_end: next_width,
                        ..level
                    }
                } else {
                    Self::shapes_initial(level.script)
                }
            }
            LevelMode::Shapes => {
                let groups = available_shape_groups(level.script);
                let position = groups.iter().position(|&g| g == level.shape_group);
                match position.and_then(|p| groups.get(p + 1)) {
                    Some(&next_group) => Self {
                        shape_group: next_group,
                        ..level
                    },
                    None => Self::adaptive_initial(level.script),
                }
            }
            LevelMode::Adaptive => {
                let next_rung = ACCURACY_LADDER
                    .iter()
                    .copied()
                    .find(|&t| t > level.accuracy_threshold + f64::EPSILON);
                match next_rung {
                    Some(threshold) => Self {
                        accuracy_threshold: threshold,
                        ..level
                    },
                    None => Self::linear_initial(level.script.next()),
                }
            }
        }
    }

    /// Canonical string over the six normalized fields; used as the memo key
    /// and as the index for best-time-at-this-configuration.
    pub fn key(&self) -> String {
        let level = self.normalized();
        format!(
            "{}:{}-{}:{}:g{}:a{:.2}",
            level.mode.to_key(),
            level.row_start,
            level.row_end,
            level.script.to_key(),
            level.shape_group,
            level.accuracy_threshold,
        )
    }
}

impl Default for LevelDescriptor {
    fn default() -> Self {
        Self::linear_initial(ScriptLevel::Hiragana)
    }
}

fn clamp_row(row: i64) -> u8 {
    row.clamp(1, TOTAL_ROWS as i64) as u8
}

fn first_shape_group(script: ScriptLevel) -> u8 {
    available_shape_groups(script).first().copied().unwrap_or(0)
}

/// Nearest valid shape group for the script, ties resolved downward.
fn nearest_shape_group(script: ScriptLevel, group: u8) -> u8 {
    let groups = available_shape_groups(script);
    if groups.contains(&group) {
        return group;
    }
    groups
        .iter()
        .copied()
        .min_by_key(|&g| (g.abs_diff(group), g))
        .unwrap_or(0)
}
