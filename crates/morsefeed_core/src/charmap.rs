//! Static character tables consulted by the transliterator.
//!
//! Lookups are ordered: ASCII letter/digit/kept punctuation, other ASCII,
//! multi-byte code points, Latin-1 symbols, Latin-1 transliterations.

/// Result of classifying a single decoded character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Appended to the word in progress as-is (already upper-cased).
    Literal(u8),
    /// Replaced by a standalone named word.
    Named(&'static str),
    /// Appended to the word in progress as a short string.
    Transliterated(&'static str),
    /// Dropped without output.
    Ignored,
}

/// ASCII punctuation spelled out as a named word.
const ASCII_NAMES: [(u8, &str); 26] = [
    (b'!', "exclamation"),
    (b'#', "hashmark"),
    (b'$', "dollarsign"),
    (b'%', "percent"),
    (b'&', "andsign"),
    (b'(', "openparen"),
    (b')', "closeparen"),
    (b'*', "asterisk"),
    (b'+', "plus"),
    (b'-', "dash"),
    (b':', "colon"),
    (b';', "semicolon"),
    (b'<', "lessthan"),
    (b'>', "greaterthan"),
    (b'=', "="),
    (b'@', "atsign"),
    (b'[', "leftbracket"),
    (b'\\', "backslash"),
    (b']', "rightbracket"),
    (b'^', "caret"),
    (b'_', "underscore"),
    (b'`', "backtick"),
    (b'{', "leftcurly"),
    (b'|', "verticalbar"),
    (b'}', "rightcurly"),
    (b'~', "tilde"),
];

const LATIN1_SYMBOLS: [(u8, &str); 19] = [
    (0xA1, "exclamation"),
    (0xA2, "cents"),
    (0xA3, "pounds"),
    (0xA4, "currency"),
    (0xA5, "yen"),
    (0xA6, "brokenbar"),
    (0xA7, "section"),
    (0xA9, "copyright"),
    (0xAB, "anglequote"),
    (0xAC, "notsign"),
    (0xAE, "registered"),
    (0xB0, "degrees"),
    (0xB1, "plusorminus"),
    (0xB4, "accent"),
    (0xB5, "mu"),
    (0xB6, "paragraph"),
    (0xB7, "cdot"),
    (0xBB, "angleunquote"),
    (0xF7, "dividedby"),
];

/// Latin-1 letters and digit-like glyphs, indexed from 0xAA.
/// `None` marks bytes with no transliteration.
const LATIN1_LETTERS: [Option<&str>; 0x56] = [
    Some("A"),   // 0xAA ª
    None,        // 0xAB
    None,        // 0xAC
    None,        // 0xAD
    None,        // 0xAE
    None,        // 0xAF
    None,        // 0xB0
    None,        // 0xB1
    Some("2"),   // 0xB2 ²
    Some("3"),   // 0xB3 ³
    None,        // 0xB4
    None,        // 0xB5
    None,        // 0xB6
    None,        // 0xB7
    None,        // 0xB8
    Some("1"),   // 0xB9 ¹
    Some("O"),   // 0xBA º
    None,        // 0xBB
    Some("1/4"), // 0xBC ¼
    Some("1/2"), // 0xBD ½
    Some("3/4"), // 0xBE ¾
    Some("?"),   // 0xBF ¿
    Some("A"),   // 0xC0 À
    Some("A"),   // 0xC1 Á
    Some("A"),   // 0xC2 Â
    Some("A"),   // 0xC3 Ã
    Some("A"),   // 0xC4 Ä
    Some("A"),   // 0xC5 Å
    Some("AE"),  // 0xC6 Æ
    Some("C"),   // 0xC7 Ç
    Some("E"),   // 0xC8 È
    Some("E"),   // 0xC9 É
    Some("E"),   // 0xCA Ê
    Some("E"),   // 0xCB Ë
    Some("I"),   // 0xCC Ì
    Some("I"),   // 0xCD Í
    Some("I"),   // 0xCE Î
    Some("I"),   // 0xCF Ï
    Some("D"),   // 0xD0 Ð
    Some("N"),   // 0xD1 Ñ
    Some("O"),   // 0xD2 Ò
    Some("O"),   // 0xD3 Ó
    Some("O"),   // 0xD4 Ô
    Some("O"),   // 0xD5 Õ
    Some("O"),   // 0xD6 Ö
    Some("x"),   // 0xD7 ×
    Some("O"),   // 0xD8 Ø
    Some("U"),   // 0xD9 Ù
    Some("U"),   // 0xDA Ú
    Some("U"),   // 0xDB Û
    Some("U"),   // 0xDC Ü
    Some("Y"),   // 0xDD Ý
    Some("TH"),  // 0xDE Þ
    Some("ss"),  // 0xDF ß
    Some("A"),   // 0xE0 à
    Some("A"),   // 0xE1 á
    Some("A"),   // 0xE2 â
    Some("A"),   // 0xE3 ã
    Some("A"),   // 0xE4 ä
    Some("A"),   // 0xE5 å
    Some("AE"),  // 0xE6 æ
    Some("C"),   // 0xE7 ç
    Some("E"),   // 0xE8 è
    Some("E"),   // 0xE9 é
    Some("E"),   // 0xEA ê
    Some("E"),   // 0xEB ë
    Some("I"),   // 0xEC ì
    Some("I"),   // 0xED í
    Some("I"),   // 0xEE î
    Some("I"),   // 0xEF ï
    Some("TH"),  // 0xF0 ð
    Some("N"),   // 0xF1 ñ
    Some("O"),   // 0xF2 ò
    Some("O"),   // 0xF3 ó
    Some("O"),   // 0xF4 ô
    Some("O"),   // 0xF5 õ
    Some("O"),   // 0xF6 ö
    None,        // 0xF7 ÷ is a symbol
    Some("O"),   // 0xF8 ø
    Some("U"),   // 0xF9 ù
    Some("U"),   // 0xFA ú
    Some("U"),   // 0xFB û
    Some("U"),   // 0xFC ü
    Some("Y"),   // 0xFD ý
    Some("TH"),  // 0xFE þ
    Some("Y"),   // 0xFF ÿ
];

/// Code points above Latin-1 that have a spoken name.
/// Curly single quotes stay out: apostrophe vs. quote is ambiguous.
const CODE_POINT_NAMES: [(u32, &str); 2] = [(0x201C, "quote"), (0x201D, "unquote")];

/// Classifies a 7-bit byte. `word_empty` selects between "quote" and "unquote".
pub fn classify_ascii(c: u8, word_empty: bool) -> CharClass {
    debug_assert!(c.is_ascii());
    match c {
        b'0'..=b'9' | b'A'..=b'Z' | b'.' | b',' | b'?' | b'/' => CharClass::Literal(c),
        b'a'..=b'z' => CharClass::Literal(c.to_ascii_uppercase()),
        b'\'' => CharClass::Ignored,
        b'"' => CharClass::Named(quote_name(word_empty)),
        _ => ASCII_NAMES
            .iter()
            .find(|(byte, _)| *byte == c)
            .map_or(CharClass::Ignored, |(_, name)| CharClass::Named(name)),
    }
}

/// Classifies a Latin-1 byte: symbol table first, letter table second.
pub fn classify_latin1(c: u8) -> CharClass {
    if let Some((_, name)) = LATIN1_SYMBOLS.iter().find(|(byte, _)| *byte == c) {
        return CharClass::Named(name);
    }
    c.checked_sub(0xAA)
        .and_then(|i| LATIN1_LETTERS.get(usize::from(i)).copied().flatten())
        .map_or(CharClass::Ignored, CharClass::Transliterated)
}

/// Classifies a decoded code point above U+00FF.
pub fn classify_code_point(u: u32) -> CharClass {
    CODE_POINT_NAMES
        .iter()
        .find(|(cp, _)| *cp == u)
        .map_or(CharClass::Ignored, |(_, name)| CharClass::Named(name))
}

/// `"` opens a quote before any word content and closes one after it.
pub fn quote_name(word_empty: bool) -> &'static str {
    if word_empty {
        "quote"
    } else {
        "unquote"
    }
}

/// Resolves a complete HTML entity (including `&` and `;`).
///
/// `&#x27;` is deliberately silent: apostrophe and quote cannot be told apart.
pub fn entity_name(entity: &[u8], word_empty: bool) -> Option<&'static str> {
    match entity {
        b"&amp;" => Some("andsign"),
        b"&quot;" => Some(quote_name(word_empty)),
        b"&middot;" => Some("dot"),
        b"&gt;" => Some("greaterthan"),
        b"&lt;" => Some("lessthan"),
        b"&copy;" => Some("copyright"),
        _ => None,
    }
}

/// `isspace` in the C locale.
pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}
