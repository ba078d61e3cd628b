pub mod kana;

use std::collections::BTreeSet;

pub use kana::{KANA, KanaDef};

pub const TOTAL_ROWS: u8 = 10;

// --- Script Kind ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    Hiragana,
    Katakana,
    Romaji,
}

impl ScriptKind {
    pub fn to_key(self) -> &'static str {
        match self {
            ScriptKind::Hiragana => "hiragana",
            ScriptKind::Katakana => "katakana",
            ScriptKind::Romaji => "romaji",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "hiragana" => Some(ScriptKind::Hiragana),
            "katakana" => Some(ScriptKind::Katakana),
            "romaji" => Some(ScriptKind::Romaji),
            _ => None,
        }
    }

    pub fn all() -> &'static [ScriptKind] {
        &[ScriptKind::Hiragana, ScriptKind::Katakana, ScriptKind::Romaji]
    }
}

// --- Modifier Group ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModifierGroup {
    None,
    Dakuten,
    Handakuten,
}

impl KanaDef {
    /// Kana string for the given script; romaji for `ScriptKind::Romaji`.
    pub fn character(&self, kind: ScriptKind) -> &'static str {
        match kind {
            ScriptKind::Hiragana => self.hiragana,
            ScriptKind::Katakana => self.katakana,
            ScriptKind::Romaji => self.romaji,
        }
    }

    /// Shape group for the given script. Romaji tiles never carry one, and
    /// neither do voiced variants.
    pub fn shape_group(&self, kind: ScriptKind) -> Option<u8> {
        match kind {
            ScriptKind::Hiragana => self.hiragana_shape,
            ScriptKind::Katakana => self.katakana_shape,
            ScriptKind::Romaji => None,
        }
    }

    pub fn id_str(&self) -> String {
        self.id.to_string()
    }

    /// 1-based position within this tile's row, counted among tiles sharing
    /// the same row and modifier group. This is the derived column used by
    /// the shuffle engine.
    pub fn column(&self) -> u8 {
        let mut col = 0;
        for def in KANA {
            if def.row == self.row && def.modifier == self.modifier {
                col += 1;
                if def.id == self.id {
                    break;
                }
            }
        }
        col
    }
}

pub fn lookup(id: &str) -> Option<&'static KanaDef> {
    let id: u16 = id.parse().ok()?;
    KANA.iter().find(|def| def.id == id)
}

/// Kana character (either script) to its romaji reading.
pub fn romaji_for(character: &str) -> Option<&'static str> {
    KANA.iter()
        .find(|def| def.hiragana == character || def.katakana == character)
        .map(|def| def.romaji)
}

/// Distinct shape-group indices defined for a script, ascending. Zero-based;
/// surfaces render them one-based.
pub fn shape_groups(kind: ScriptKind) -> Vec<u8> {
    let groups: BTreeSet<u8> = KANA.iter().filter_map(|def| def.shape_group(kind)).collect();
    groups.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_unique_ids() {
        assert_eq!(KANA.len(), 71);
        let mut ids: Vec<u16> = KANA.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 71);
    }

    #[test]
    fn test_base_rows_cover_one_through_ten() {
        for row in 1..=TOTAL_ROWS {
            assert!(
                KANA.iter()
                    .any(|d| d.row == row && d.modifier == ModifierGroup::None),
                "no base kana in row {row}"
            );
        }
        assert!(KANA.iter().all(|d| (1..=TOTAL_ROWS).contains(&d.row)));
    }

    #[test]
    fn test_id_three_is_u() {
        let def = lookup("3").unwrap();
        assert_eq!(def.romaji, "u");
        assert_eq!(def.hiragana, "う");
    }

    #[test]
    fn test_romaji_lookup_both_scripts() {
        assert_eq!(romaji_for("う"), Some("u"));
        assert_eq!(romaji_for("ウ"), Some("u"));
        assert_eq!(romaji_for("ぱ"), Some("pa"));
        assert_eq!(romaji_for("x"), None);
    }

    #[test]
    fn test_voiced_share_base_row_without_shape_group() {
        let ga = KANA.iter().find(|d| d.romaji == "ga").unwrap();
        let ka = KANA.iter().find(|d| d.romaji == "ka").unwrap();
        assert_eq!(ga.row, ka.row);
        assert_eq!(ga.modifier, ModifierGroup::Dakuten);
        assert_eq!(ga.shape_group(ScriptKind::Hiragana), None);

        let pa = KANA.iter().find(|d| d.romaji == "pa").unwrap();
        assert_eq!(pa.modifier, ModifierGroup::Handakuten);
        assert_eq!(pa.row, 6);
    }

    #[test]
    fn test_shape_groups_ascending_and_script_specific() {
        let hira = shape_groups(ScriptKind::Hiragana);
        let kata = shape_groups(ScriptKind::Katakana);
        assert!(!hira.is_empty());
        assert!(!kata.is_empty());
        assert!(hira.windows(2).all(|w| w[0] < w[1]));
        assert!(kata.windows(2).all(|w| w[0] < w[1]));
        assert!(shape_groups(ScriptKind::Romaji).is_empty());
    }

    #[test]
    fn test_columns_run_from_one_within_each_row() {
        let row_one: Vec<u8> = KANA
            .iter()
            .filter(|d| d.row == 1 && d.modifier == ModifierGroup::None)
            .map(|d| d.column())
            .collect();
        assert_eq!(row_one, vec![1, 2, 3, 4, 5]);

        let ya_row: Vec<u8> = KANA
            .iter()
            .filter(|d| d.row == 8)
            .map(|d| d.column())
            .collect();
        assert_eq!(ya_row, vec![1, 2, 3]);
    }
}
