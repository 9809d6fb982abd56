// Copyright (c) 2026 rezky_nightky

use crate::random::RandomSource;

const PATTERN_LEN: usize = 100;
const PATTERN_CHANCE: f32 = 0.8;
const SPECIAL: &str = "!@#$%^&*()_+-=[]{}|;:,./<>?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(u32);

impl Charset {
    pub const LATIN_UPPER: Charset = Charset(0x1);
    pub const LATIN_LOWER: Charset = Charset(0x2);
    pub const DIGITS: Charset = Charset(0x4);
    pub const SPECIAL: Charset = Charset(0x8);
    pub const KATAKANA: Charset = Charset(0x10);
    pub const BINARY: Charset = Charset(0x20);
    pub const HEX: Charset = Charset(0x40);

    pub const CLASSIC: Charset = Charset(0x1 | 0x4 | 0x8 | 0x10);
    pub const ASCII: Charset = Charset(0x1 | 0x2 | 0x4 | 0x8);

    pub fn contains(self, other: Charset) -> bool {
        (self.0 & other.0) != 0
    }
}

pub fn charset_from_str(name: &str, default_to_ascii: bool) -> Result<Charset, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(if default_to_ascii {
            Charset::ASCII
        } else {
            Charset::CLASSIC
        }),
        "classic" | "matrix" => Ok(Charset::CLASSIC),
        "ascii" => Ok(Charset::ASCII),
        "katakana" => Ok(Charset::KATAKANA),
        "bin" | "binary" | "01" => Ok(Charset::BINARY),
        "hex" | "hexadecimal" => Ok(Charset::HEX),
        "digits" | "dec" | "decimal" => Ok(Charset::DIGITS),
        other => Err(format!(
            "unsupported charset: {} (see --list-charsets)",
            other
        )),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}

pub fn build_chars(charset: Charset) -> Vec<char> {
    let mut out = Vec::new();

    // Half-width forms keep every glyph one terminal cell wide.
    if charset.contains(Charset::KATAKANA) {
        push_range(&mut out, 0xFF66, 0xFF9D);
    }
    if charset.contains(Charset::LATIN_UPPER) {
        push_range(&mut out, 0x41, 0x5A);
    }
    if charset.contains(Charset::LATIN_LOWER) {
        push_range(&mut out, 0x61, 0x7A);
    }
    if charset.contains(Charset::DIGITS) {
        push_range(&mut out, 0x30, 0x39);
    }
    if charset.contains(Charset::SPECIAL) {
        out.extend(SPECIAL.chars());
    }
    if charset.contains(Charset::BINARY) {
        push_range(&mut out, 0x30, 0x31);
    }
    if charset.contains(Charset::HEX) {
        push_range(&mut out, 0x30, 0x39);
        push_range(&mut out, 0x41, 0x46);
    }

    if out.is_empty() {
        out.extend(['0', '1']);
    }
    out
}

/// Glyph supply for drops: mostly a small precomputed pattern table, with an
/// occasional draw from the full set so columns don't look too uniform.
#[derive(Clone, Debug)]
pub struct GlyphPool {
    chars: Vec<char>,
    patterns: Vec<char>,
}

impl GlyphPool {
    pub fn new(mut chars: Vec<char>, rng: &mut dyn RandomSource) -> Self {
        if chars.is_empty() {
            chars.extend(['0', '1']);
        }
        let patterns = (0..PATTERN_LEN)
            .map(|_| chars[rng.next_index(chars.len())])
            .collect();
        Self { chars, patterns }
    }

    pub fn pick(&self, rng: &mut dyn RandomSource) -> char {
        if rng.next_f32() < PATTERN_CHANCE {
            self.patterns[rng.next_index(self.patterns.len())]
        } else {
            self.chars[rng.next_index(self.chars.len())]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SequenceRandom, StdRandom};

    #[test]
    fn auto_picks_ascii_on_non_utf_locales() {
        assert_eq!(charset_from_str("auto", true).unwrap(), Charset::ASCII);
        assert_eq!(charset_from_str("auto", false).unwrap(), Charset::CLASSIC);
    }

    #[test]
    fn unknown_charset_is_rejected() {
        let err = charset_from_str("klingon", false).unwrap_err();
        assert!(err.contains("unsupported charset"));
    }

    #[test]
    fn classic_mixes_katakana_latin_digits_and_punctuation() {
        let chars = build_chars(Charset::CLASSIC);
        assert!(chars.contains(&'\u{FF71}'));
        assert!(chars.contains(&'Z'));
        assert!(chars.contains(&'7'));
        assert!(chars.contains(&'?'));
        assert!(!chars.contains(&'a'));
    }

    #[test]
    fn binary_has_only_0_and_1() {
        assert_eq!(build_chars(Charset::BINARY), vec!['0', '1']);
    }

    #[test]
    fn pool_only_yields_known_glyphs() {
        let mut rng = StdRandom::seeded(3);
        let hex = build_chars(Charset::HEX);
        let pool = GlyphPool::new(hex.clone(), &mut rng);
        for _ in 0..500 {
            assert!(hex.contains(&pool.pick(&mut rng)));
        }
    }

    #[test]
    fn pool_falls_back_to_full_set_on_high_roll() {
        let mut seed = SequenceRandom::constant(0.0);
        let pool = GlyphPool::new(vec!['a', 'b', 'c'], &mut seed);
        // 0.9 skips the pattern table, then 0.99 selects the last glyph.
        let mut rng = SequenceRandom::new(&[0.9, 0.99]);
        assert_eq!(pool.pick(&mut rng), 'c');
    }
}
