use crate::catalog::ModifierGroup;

/// One syllable tile: id (1-based catalog order), its readings in all three
/// scripts, gojuon row membership, diacritic tag, and optional per-script
/// shape group (visually similar kana bucketed for stroke-based study).
#[derive(Clone, Copy, Debug)]
pub struct KanaDef {
    pub id: u16,
    pub romaji: &'static str,
    pub hiragana: &'static str,
    pub katakana: &'static str,
    pub row: u8,
    pub modifier: ModifierGroup,
    pub hiragana_shape: Option<u8>,
    pub katakana_shape: Option<u8>,
}

const fn kana(
    id: u16,
    romaji: &'static str,
    hiragana: &'static str,
    katakana: &'static str,
    row: u8,
    hiragana_shape: Option<u8>,
    katakana_shape: Option<u8>,
) -> KanaDef {
    KanaDef {
        id,
        romaji,
        hiragana,
        katakana,
        row,
        modifier: ModifierGroup::None,
        hiragana_shape,
        katakana_shape,
    }
}

const fn voiced(
    id: u16,
    romaji: &'static str,
    hiragana: &'static str,
    katakana: &'static str,
    row: u8,
    modifier: ModifierGroup,
) -> KanaDef {
    KanaDef {
        id,
        romaji,
        hiragana,
        katakana,
        row,
        modifier,
        hiragana_shape: None,
        katakana_shape: None,
    }
}

/// The full seed catalog: 46 base kana in gojuon order (rows 1-10), then the
/// 20 dakuten and 5 handakuten variants, which share their base consonant's
/// row. Voiced rows carry no shape groups.
pub const KANA: &[KanaDef] = &[
    // Row 1: vowels
    kana(1, "a", "あ", "ア", 1, Some(0), None),
    kana(2, "i", "い", "イ", 1, Some(1), None),
    kana(3, "u", "う", "ウ", 1, Some(2), Some(3)),
    kana(4, "e", "え", "エ", 1, None, None),
    kana(5, "o", "お", "オ", 1, Some(0), None),
    // Row 2: k
    kana(6, "ka", "か", "カ", 2, None, None),
    kana(7, "ki", "き", "キ", 2, Some(3), None),
    kana(8, "ku", "く", "ク", 2, None, Some(2)),
    kana(9, "ke", "け", "ケ", 2, Some(4), Some(2)),
    kana(10, "ko", "こ", "コ", 2, None, None),
    // Row 3: s
    kana(11, "sa", "さ", "サ", 3, Some(3), None),
    kana(12, "shi", "し", "シ", 3, None, Some(0)),
    kana(13, "su", "す", "ス", 3, None, None),
    kana(14, "se", "せ", "セ", 3, None, None),
    kana(15, "so", "そ", "ソ", 3, None, Some(1)),
    // Row 4: t
    kana(16, "ta", "た", "タ", 4, None, Some(2)),
    kana(17, "chi", "ち", "チ", 4, Some(3), Some(4)),
    kana(18, "tsu", "つ", "ツ", 4, Some(2), Some(0)),
    kana(19, "te", "て", "テ", 4, None, Some(4)),
    kana(20, "to", "と", "ト", 4, None, None),
    // Row 5: n
    kana(21, "na", "な", "ナ", 5, None, Some(5)),
    kana(22, "ni", "に", "ニ", 5, None, None),
    kana(23, "nu", "ぬ", "ヌ", 5, Some(6), None),
    kana(24, "ne", "ね", "ネ", 5, Some(5), None),
    kana(25, "no", "の", "ノ", 5, None, None),
    // Row 6: h
    kana(26, "ha", "は", "ハ", 6, Some(4), None),
    kana(27, "hi", "ひ", "ヒ", 6, None, None),
    kana(28, "fu", "ふ", "フ", 6, None, Some(3)),
    kana(29, "he", "へ", "ヘ", 6, None, None),
    kana(30, "ho", "ほ", "ホ", 6, Some(4), None),
    // Row 7: m
    kana(31, "ma", "ま", "マ", 7, None, None),
    kana(32, "mi", "み", "ミ", 7, None, None),
    kana(33, "mu", "む", "ム", 7, None, None),
    kana(34, "me", "め", "メ", 7, Some(6), Some(5)),
    kana(35, "mo", "も", "モ", 7, None, None),
    // Row 8: y
    kana(36, "ya", "や", "ヤ", 8, None, None),
    kana(37, "yu", "ゆ", "ユ", 8, None, None),
    kana(38, "yo", "よ", "ヨ", 8, None, None),
    // Row 9: r
    kana(39, "ra", "ら", "ラ", 9, None, None),
    kana(40, "ri", "り", "リ", 9, Some(1), None),
    kana(41, "ru", "る", "ル", 9, Some(7), None),
    kana(42, "re", "れ", "レ", 9, Some(5), None),
    kana(43, "ro", "ろ", "ロ", 9, Some(7), None),
    // Row 10: w + syllabic n
    kana(44, "wa", "わ", "ワ", 10, Some(5), Some(3)),
    kana(45, "wo", "を", "ヲ", 10, None, None),
    kana(46, "n", "ん", "ン", 10, None, Some(1)),
    // Dakuten: g
    voiced(47, "ga", "が", "ガ", 2, ModifierGroup::Dakuten),
    voiced(48, "gi", "ぎ", "ギ", 2, ModifierGroup::Dakuten),
    voiced(49, "gu", "ぐ", "グ", 2, ModifierGroup::Dakuten),
    voiced(50, "ge", "げ", "ゲ", 2, ModifierGroup::Dakuten),
    voiced(51, "go", "ご", "ゴ", 2, ModifierGroup::Dakuten),
    // Dakuten: z
    voiced(52, "za", "ざ", "ザ", 3, ModifierGroup::Dakuten),
    voiced(53, "ji", "じ", "ジ", 3, ModifierGroup::Dakuten),
    voiced(54, "zu", "ず", "ズ", 3, ModifierGroup::Dakuten),
    voiced(55, "ze", "ぜ", "ゼ", 3, ModifierGroup::Dakuten),
    voiced(56, "zo", "ぞ", "ゾ", 3, ModifierGroup::Dakuten),
    // Dakuten: d
    voiced(57, "da", "だ", "ダ", 4, ModifierGroup::Dakuten),
    voiced(58, "ji", "ぢ", "ヂ", 4, ModifierGroup::Dakuten),
    voiced(59, "zu", "づ", "ヅ", 4, ModifierGroup::Dakuten),
    voiced(60, "de", "で", "デ", 4, ModifierGroup::Dakuten),
    voiced(61, "do", "ど", "ド", 4, ModifierGroup::Dakuten),
    // Dakuten: b
    voiced(62, "ba", "ば", "バ", 6, ModifierGroup::Dakuten),
    voiced(63, "bi", "び", "ビ", 6, ModifierGroup::Dakuten),
    voiced(64, "bu", "ぶ", "ブ", 6, ModifierGroup::Dakuten),
    voiced(65, "be", "べ", "ベ", 6, ModifierGroup::Dakuten),
    voiced(66, "bo", "ぼ", "ボ", 6, ModifierGroup::Dakuten),
    // Handakuten: p
    voiced(67, "pa", "ぱ", "パ", 6, ModifierGroup::Handakuten),
    voiced(68, "pi", "ぴ", "ピ", 6, ModifierGroup::Handakuten),
    voiced(69, "pu", "ぷ", "プ", 6, ModifierGroup::Handakuten),
    voiced(70, "pe", "ぺ", "ペ", 6, ModifierGroup::Handakuten),
    voiced(71, "po", "ぽ", "ポ", 6, ModifierGroup::Handakuten),
];
