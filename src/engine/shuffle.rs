use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::engine::tiles::AnswerTile;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShuffleMode {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl ShuffleMode {
    pub fn to_key(self) -> &'static str {
        match self {
            ShuffleMode::None => "none",
            ShuffleMode::Horizontal => "rows",
            ShuffleMode::Vertical => "columns",
            ShuffleMode::Both => "both",
        }
    }

    /// Unknown keys fall back to no shuffling.
    pub fn from_key(key: &str) -> Self {
        match key {
            "rows" => ShuffleMode::Horizontal,
            "columns" => ShuffleMode::Vertical,
            "both" => ShuffleMode::Both,
            _ => ShuffleMode::None,
        }
    }
}

impl From<String> for ShuffleMode {
    fn from(key: String) -> Self {
        Self::from_key(&key)
    }
}

impl From<ShuffleMode> for String {
    fn from(mode: ShuffleMode) -> Self {
        mode.to_key().to_string()
    }
}

/// Reorder tiles for presentation. Horizontal permutes within each derived
/// row, vertical within each derived column; grid positions stay with their
/// group, so row/column membership is preserved. `slice::shuffle` is
/// Fisher-Yates, so every permutation is equally likely.
pub fn apply_shuffle<R: Rng>(tiles: &mut [AnswerTile], mode: ShuffleMode, rng: &mut R) {
    match mode {
        ShuffleMode::None => {}
        ShuffleMode::Horizontal => permute_within(tiles, |t| t.row, rng),
        ShuffleMode::Vertical => permute_within(tiles, |t| t.column, rng),
        ShuffleMode::Both => tiles.shuffle(rng),
    }
}

fn permute_within<R, K, F>(tiles: &mut [AnswerTile], group_of: F, rng: &mut R)
where
    R: Rng,
    K: Eq + Hash,
    F: Fn(&AnswerTile) -> K,
{
    let mut positions: HashMap<K, Vec<usize>> = HashMap::new();
    for (index, tile) in tiles.iter().enumerate() {
        positions.entry(group_of(tile)).or_default().push(index);
    }
    for group in positions.values() {
        let mut members: Vec<AnswerTile> = group.iter().map(|&i| tiles[i].clone()).collect();
        members.shuffle(rng);
        for (&index, member) in group.iter().zip(members) {
            tiles[index] = member;
        }
    }
}
