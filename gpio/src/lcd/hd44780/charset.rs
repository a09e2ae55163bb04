//! Character ROM lookup.
//!
//! Maps characters to the code points of the Western European character ROM found on modules like
//! the GFC1602AI. Printable ASCII maps to itself. Code points whose glyph has no good Unicode
//! counterpart (0x00-0x0F, 0x12-0x1A, 0xB0, 0xB5, 0xB6, 0xC0, 0xC1 and everything from 0xD1 on)
//! are not mapped, so asking for them fails instead of guessing.
//!
//! The ROM repeats a few ASCII glyphs (`=` at 0x1C, `~` at 0x1D, `` ` `` at 0xB3). Those
//! characters resolve to their ASCII code point, and the duplicates are only reachable through
//! raw [HD44780Driver::write_data](super::HD44780Driver::write_data).

use crate::lcd::hd44780::{LcdError, LcdResult};
use log::warn;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Characters outside of printable ASCII, by code point.
const EXTENDED: &[(u8, char)] = &[
    (0x10, '±'),
    (0x11, '≡'),
    (0x1B, '∫'),
    (0x1E, '²'),
    (0x1F, '³'),
    (0x7F, 'Δ'),
    (0x80, 'Ç'),
    (0x81, 'ü'),
    (0x82, 'é'),
    (0x83, 'â'),
    (0x84, 'ä'),
    (0x85, 'à'),
    (0x86, 'å'),
    (0x87, 'ç'),
    (0x88, 'ê'),
    (0x89, 'ë'),
    (0x8A, 'è'),
    (0x8B, 'ï'),
    (0x8C, 'î'),
    (0x8D, 'ì'),
    (0x8E, 'Ä'),
    (0x8F, 'Å'),
    (0x90, 'É'),
    (0x91, 'æ'),
    (0x92, 'Æ'),
    (0x93, 'ô'),
    (0x94, 'ö'),
    (0x95, 'ò'),
    (0x96, 'û'),
    (0x97, 'ù'),
    (0x98, 'ÿ'),
    (0x99, 'Ö'),
    (0x9A, 'Ü'),
    (0x9B, 'ñ'),
    (0x9C, 'Ñ'),
    (0x9D, 'ª'),
    (0x9E, 'º'),
    (0x9F, '¿'),
    (0xA0, 'á'),
    (0xA1, 'í'),
    (0xA2, 'ó'),
    (0xA3, 'ú'),
    (0xA4, '¢'),
    (0xA5, '£'),
    (0xA6, '¥'),
    (0xA7, '₧'),
    (0xA8, 'ƒ'),
    // MATHEMATICAL ITALIC SMALL I
    (0xA9, '\u{1D456}'),
    (0xAA, 'Ã'),
    (0xAB, 'ã'),
    (0xAC, 'Õ'),
    (0xAD, 'õ'),
    (0xAE, 'Ø'),
    (0xAF, 'ø'),
    (0xB1, '¨'),
    (0xB2, '°'),
    (0xB4, '´'),
    (0xB7, '×'),
    (0xB8, '÷'),
    (0xB9, '≤'),
    (0xBA, '≥'),
    (0xBB, '≪'),
    (0xBC, '≫'),
    (0xBD, '≠'),
    (0xBE, '√'),
    (0xBF, '⁻'),
    (0xC2, '∞'),
    (0xC3, '◸'),
    (0xC4, '↲'),
    (0xC5, '↑'),
    (0xC6, '↓'),
    (0xC7, '→'),
    (0xC8, '←'),
    // Corner brackets and the trademark sign are the closest Unicode matches, not exact glyphs.
    (0xC9, '⌜'),
    (0xCA, '⌝'),
    (0xCB, '⌞'),
    (0xCC, '⌟'),
    (0xCD, '•'),
    (0xCE, '®'),
    (0xCF, '©'),
    (0xD0, '™'),
];

const PRINTABLE_ASCII: std::ops::RangeInclusive<u8> = 0x20..=0x7E;

static GLYPHS: LazyLock<[Option<char>; 256]> = LazyLock::new(|| {
    let mut glyphs = [None; 256];
    for code in PRINTABLE_ASCII {
        glyphs[code as usize] = Some(code as char);
    }
    for &(code, c) in EXTENDED {
        glyphs[code as usize] = Some(c);
    }
    glyphs
});

static CODE_POINTS: LazyLock<HashMap<char, u8>> = LazyLock::new(|| {
    GLYPHS
        .iter()
        .enumerate()
        .filter_map(|(code, slot)| slot.map(|c| (c, code as u8)))
        .collect()
});

/// Looks up the code point displaying `c`.
///
/// # Errors
/// - `LcdError::UnmappedCharacter` if the ROM has no glyph for `c`.
pub fn resolve_char(c: char) -> LcdResult<u8> {
    CODE_POINTS
        .get(&c)
        .copied()
        .ok_or(LcdError::UnmappedCharacter(c))
}

/// Resolves every character of `text`, in order. Fails on the first unmapped character, so a
/// successful result can be sent without any lookup failing halfway through.
pub fn resolve_str(text: &str) -> LcdResult<Vec<u8>> {
    text.chars()
        .map(resolve_char)
        .collect::<LcdResult<Vec<_>>>()
        .inspect_err(|err| warn!("Cannot display {:?}: {}", text, err))
}

/// The character displayed for a code point, if it is mapped.
pub fn glyph(code: u8) -> Option<char> {
    GLYPHS[code as usize]
}
