//! File-name decoding for central directory entries.
//!
//! Archive writers disagree about name encodings: modern tools write UTF-8,
//! Windows tools historically wrote the ANSI code page (Windows-1252 for
//! Western locales), and DOS-era tools wrote the OEM code page (CP437).
//! Names are decoded by trying those three in order and taking the first
//! that decodes cleanly.

use encoding_rs::WINDOWS_1252;

/// Bytes with no assigned character in Windows-1252. encoding_rs follows the
/// WHATWG mapping, which papers over these as C1 controls, so they are
/// rejected here to keep the fallback to CP437 reachable.
const WINDOWS_1252_UNASSIGNED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// CP437 glyphs for bytes 0x80..=0xFF. The low half is ASCII.
#[rustfmt::skip]
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Decode a raw file name from the central directory.
///
/// Trailing NUL padding (seen in the wild from buggy writers) is stripped
/// first. The chain ends at CP437, which assigns a character to every byte
/// value, so decoding always produces a name.
pub fn decode_name(raw: &[u8]) -> String {
    let raw = trim_trailing_nuls(raw);

    if let Ok(name) = std::str::from_utf8(raw) {
        return name.to_string();
    }

    if let Some(name) = decode_windows_1252(raw) {
        return name;
    }

    decode_cp437(raw)
}

fn trim_trailing_nuls(raw: &[u8]) -> &[u8] {
    let end = raw
        .iter()
        .rposition(|&b| b != 0)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    &raw[..end]
}

fn decode_windows_1252(raw: &[u8]) -> Option<String> {
    if raw.iter().any(|b| WINDOWS_1252_UNASSIGNED.contains(b)) {
        return None;
    }
    WINDOWS_1252
        .decode_without_bom_handling_and_without_replacement(raw)
        .map(|name| name.into_owned())
}

fn decode_cp437(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| {
            if b < 0x80 {
                b as char
            } else {
                CP437_HIGH[(b - 0x80) as usize]
            }
        })
        .collect()
}
