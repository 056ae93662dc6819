//! Static character-set data: the glyph-name → Unicode table and the named
//! 8-bit encodings. Each table is built once and shared for the lifetime of
//! the process.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A 256-slot (or wider, for CMap results) code → Unicode-string map.
pub type Encoding = HashMap<u32, String>;

/// Look up a named encoding. `name` may carry the leading `/`.
pub fn encoding_by_name(name: &[u8]) -> Option<&'static Encoding> {
    let name = name.strip_prefix(b"/").unwrap_or(name);
    match name {
        b"StandardEncoding" => Some(standard_encoding()),
        b"WinAnsiEncoding" => Some(win_ansi_encoding()),
        b"MacRomanEncoding" => Some(mac_roman_encoding()),
        b"MacExpertEncoding" => Some(mac_expert_encoding()),
        b"Symbol" => Some(symbol_encoding()),
        b"ZapfDingbats" => Some(zapf_dingbats_encoding()),
        _ => None,
    }
}

/// Unicode string for an Adobe glyph name (with or without the leading `/`).
/// Names of the `uniXXXX` form are decoded directly.
pub fn unicode_for_glyph(name: &[u8]) -> Option<String> {
    let name = name.strip_prefix(b"/").unwrap_or(name);
    let name = std::str::from_utf8(name).ok()?;
    if let Some(c) = glyph_table().get(name) {
        return Some(c.to_string());
    }
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            let code = u32::from_str_radix(hex, 16).ok()?;
            return char::from_u32(code).map(|c| c.to_string());
        }
    }
    None
}

pub fn standard_encoding() -> &'static Encoding {
    static TABLE: OnceLock<Encoding> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = ascii_base();
        apply_diffs(&mut map, STANDARD_DIFFS);
        map
    })
}

pub fn win_ansi_encoding() -> &'static Encoding {
    static TABLE: OnceLock<Encoding> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = ascii_base();
        // 0xA0..=0xFF coincide with Latin-1.
        for code in 0xa0u32..=0xff {
            if let Some(c) = char::from_u32(code) {
                map.insert(code, c.to_string());
            }
        }
        apply_diffs(&mut map, WIN_ANSI_DIFFS);
        map
    })
}

pub fn mac_roman_encoding() -> &'static Encoding {
    static TABLE: OnceLock<Encoding> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = ascii_base();
        for (i, c) in MAC_ROMAN_HIGH.iter().enumerate() {
            map.insert(0x80 + i as u32, c.to_string());
        }
        map
    })
}

pub fn mac_expert_encoding() -> &'static Encoding {
    static TABLE: OnceLock<Encoding> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = Encoding::new();
        apply_diffs(&mut map, MAC_EXPERT_DIFFS);
        map
    })
}

pub fn symbol_encoding() -> &'static Encoding {
    static TABLE: OnceLock<Encoding> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = Encoding::new();
        map.insert(0x20, " ".to_string());
        apply_diffs(&mut map, SYMBOL_DIFFS);
        map
    })
}

pub fn zapf_dingbats_encoding() -> &'static Encoding {
    static TABLE: OnceLock<Encoding> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = Encoding::new();
        map.insert(0x20, " ".to_string());
        // The Unicode Dingbats block tracks the Zapf layout in order.
        for code in 0x21u32..=0x7e {
            if let Some(c) = char::from_u32(0x2700 + code - 0x20) {
                map.insert(code, c.to_string());
            }
        }
        for code in 0xa1u32..=0xfe {
            if let Some(c) = char::from_u32(0x2700 + code - 0xa0 + 0x40) {
                map.insert(code, c.to_string());
            }
        }
        map
    })
}

/// Printable ASCII identity, the shared base of the Latin text encodings.
fn ascii_base() -> Encoding {
    (0x20u32..=0x7e)
        .filter_map(|code| char::from_u32(code).map(|c| (code, c.to_string())))
        .collect()
}

fn apply_diffs(map: &mut Encoding, diffs: &[(u32, char)]) {
    for (code, c) in diffs {
        map.insert(*code, c.to_string());
    }
}

/// Where StandardEncoding departs from printable ASCII.
const STANDARD_DIFFS: &[(u32, char)] = &[
    (0x27, '\u{2019}'), // quoteright
    (0x60, '\u{2018}'), // quoteleft
    (0xa1, '¡'),
    (0xa2, '¢'),
    (0xa3, '£'),
    (0xa4, '\u{2044}'), // fraction
    (0xa5, '¥'),
    (0xa6, 'ƒ'),
    (0xa7, '§'),
    (0xa8, '¤'),
    (0xa9, '\''),
    (0xaa, '\u{201c}'),
    (0xab, '«'),
    (0xac, '\u{2039}'),
    (0xad, '\u{203a}'),
    (0xae, '\u{fb01}'), // fi
    (0xaf, '\u{fb02}'), // fl
    (0xb1, '\u{2013}'), // endash
    (0xb2, '\u{2020}'), // dagger
    (0xb3, '\u{2021}'), // daggerdbl
    (0xb4, '·'),
    (0xb6, '¶'),
    (0xb7, '\u{2022}'), // bullet
    (0xb8, '\u{201a}'),
    (0xb9, '\u{201e}'),
    (0xba, '\u{201d}'),
    (0xbb, '»'),
    (0xbc, '\u{2026}'), // ellipsis
    (0xbd, '\u{2030}'), // perthousand
    (0xbf, '¿'),
    (0xc1, '`'),
    (0xc2, '´'),
    (0xc3, '\u{02c6}'), // circumflex
    (0xc4, '\u{02dc}'), // tilde
    (0xc5, '¯'),
    (0xc6, '\u{02d8}'), // breve
    (0xc7, '\u{02d9}'), // dotaccent
    (0xc8, '¨'),
    (0xca, '\u{02da}'), // ring
    (0xcb, '¸'),
    (0xcd, '\u{02dd}'), // hungarumlaut
    (0xce, '\u{02db}'), // ogonek
    (0xcf, '\u{02c7}'), // caron
    (0xd0, '\u{2014}'), // emdash
    (0xe1, 'Æ'),
    (0xe3, 'ª'),
    (0xe8, 'Ł'),
    (0xe9, 'Ø'),
    (0xea, 'Œ'),
    (0xeb, 'º'),
    (0xf1, 'æ'),
    (0xf5, '\u{0131}'), // dotlessi
    (0xf8, 'ł'),
    (0xf9, 'ø'),
    (0xfa, 'œ'),
    (0xfb, 'ß'),
];

/// Where WinAnsiEncoding departs from ASCII + Latin-1 (the 0x80..0x9F block).
const WIN_ANSI_DIFFS: &[(u32, char)] = &[
    (0x80, '\u{20ac}'), // Euro
    (0x82, '\u{201a}'),
    (0x83, 'ƒ'),
    (0x84, '\u{201e}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02c6}'),
    (0x89, '\u{2030}'),
    (0x8a, 'Š'),
    (0x8b, '\u{2039}'),
    (0x8c, 'Œ'),
    (0x8e, 'Ž'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201c}'),
    (0x94, '\u{201d}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02dc}'),
    (0x99, '\u{2122}'),
    (0x9a, 'š'),
    (0x9b, '\u{203a}'),
    (0x9c, 'œ'),
    (0x9e, 'ž'),
    (0x9f, 'Ÿ'),
];

/// MacRomanEncoding, 0x80..=0xFF.
const MAC_ROMAN_HIGH: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á', 'à', 'â', 'ä', 'ã', 'å', 'ç',
    'é', 'è', 'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó', 'ò', 'ô', 'ö', 'õ',
    'ú', 'ù', 'û', 'ü', '\u{2020}', '°', '¢', '£', '§', '\u{2022}', '¶',
    'ß', '®', '©', '\u{2122}', '´', '¨', '\u{2260}', 'Æ', 'Ø', '\u{221e}',
    '±', '\u{2264}', '\u{2265}', '¥', 'µ', '\u{2202}', '\u{2211}',
    '\u{220f}', '\u{03c0}', '\u{222b}', 'ª', 'º', '\u{2126}', 'æ', 'ø',
    '¿', '¡', '¬', '\u{221a}', 'ƒ', '\u{2248}', '\u{2206}', '«', '»',
    '\u{2026}', '\u{a0}', 'À', 'Ã', 'Õ', 'Œ', 'œ', '\u{2013}', '\u{2014}',
    '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}', '÷', '\u{25ca}', 'ÿ',
    'Ÿ', '\u{2044}', '¤', '\u{2039}', '\u{203a}', '\u{fb01}', '\u{fb02}',
    '\u{2021}', '·', '\u{201a}', '\u{201e}', '\u{2030}', 'Â', 'Ê', 'Á',
    'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô', '\u{f8ff}', 'Ò', 'Ú', 'Û',
    'Ù', '\u{0131}', '\u{02c6}', '\u{02dc}', '¯', '\u{02d8}', '\u{02d9}',
    '\u{02da}', '¸', '\u{02dd}', '\u{02db}', '\u{02c7}',
];

/// Figure and ligature subset of MacExpertEncoding.
const MAC_EXPERT_DIFFS: &[(u32, char)] = &[
    (0x20, ' '),
    (0x2c, ','),
    (0x2e, '.'),
    (0x30, '0'),
    (0x31, '1'),
    (0x32, '2'),
    (0x33, '3'),
    (0x34, '4'),
    (0x35, '5'),
    (0x36, '6'),
    (0x37, '7'),
    (0x38, '8'),
    (0x39, '9'),
    (0x56, '\u{fb00}'), // ff
    (0x57, '\u{fb01}'), // fi
    (0x58, '\u{fb02}'), // fl
    (0x59, '\u{fb03}'), // ffi
    (0x5a, '\u{fb04}'), // ffl
];

/// Greek letters and the common operators of the Symbol font.
const SYMBOL_DIFFS: &[(u32, char)] = &[
    (0x21, '!'),
    (0x28, '('),
    (0x29, ')'),
    (0x2b, '+'),
    (0x2c, ','),
    (0x2e, '.'),
    (0x2f, '/'),
    (0x30, '0'),
    (0x31, '1'),
    (0x32, '2'),
    (0x33, '3'),
    (0x34, '4'),
    (0x35, '5'),
    (0x36, '6'),
    (0x37, '7'),
    (0x38, '8'),
    (0x39, '9'),
    (0x3a, ':'),
    (0x3b, ';'),
    (0x3c, '<'),
    (0x3d, '='),
    (0x3e, '>'),
    (0x3f, '?'),
    (0x41, 'Α'),
    (0x42, 'Β'),
    (0x43, 'Χ'),
    (0x44, 'Δ'),
    (0x45, 'Ε'),
    (0x46, 'Φ'),
    (0x47, 'Γ'),
    (0x48, 'Η'),
    (0x49, 'Ι'),
    (0x4a, 'ϑ'),
    (0x4b, 'Κ'),
    (0x4c, 'Λ'),
    (0x4d, 'Μ'),
    (0x4e, 'Ν'),
    (0x4f, 'Ο'),
    (0x50, 'Π'),
    (0x51, 'Θ'),
    (0x52, 'Ρ'),
    (0x53, 'Σ'),
    (0x54, 'Τ'),
    (0x55, 'Υ'),
    (0x56, 'ς'),
    (0x57, 'Ω'),
    (0x58, 'Ξ'),
    (0x59, 'Ψ'),
    (0x5a, 'Ζ'),
    (0x61, 'α'),
    (0x62, 'β'),
    (0x63, 'χ'),
    (0x64, 'δ'),
    (0x65, 'ε'),
    (0x66, 'φ'),
    (0x67, 'γ'),
    (0x68, 'η'),
    (0x69, 'ι'),
    (0x6a, 'ϕ'),
    (0x6b, 'κ'),
    (0x6c, 'λ'),
    (0x6d, 'μ'),
    (0x6e, 'ν'),
    (0x6f, 'ο'),
    (0x70, 'π'),
    (0x71, 'θ'),
    (0x72, 'ρ'),
    (0x73, 'σ'),
    (0x74, 'τ'),
    (0x75, 'υ'),
    (0x76, 'ϖ'),
    (0x77, 'ω'),
    (0x78, 'ξ'),
    (0x79, 'ψ'),
    (0x7a, 'ζ'),
    (0xa5, '\u{221e}'), // infinity
    (0xb1, '±'),
    (0xb4, '×'),
    (0xb8, '÷'),
    (0xb9, '\u{2260}'), // notequal
    (0xba, '\u{2261}'), // equivalence
    (0xbb, '\u{2248}'), // approxequal
    (0xc5, '\u{2295}'), // circleplus
    (0xce, '\u{2208}'), // element
    (0xd5, '\u{220f}'), // product
    (0xd6, '\u{221a}'), // radical
    (0xe5, '\u{2211}'), // summation
    (0xf2, '\u{222b}'), // integral
];

fn glyph_table() -> &'static HashMap<&'static str, char> {
    static TABLE: OnceLock<HashMap<&'static str, char>> = OnceLock::new();
    TABLE.get_or_init(|| GLYPH_NAMES.iter().copied().collect())
}

/// The common subset of the Adobe Glyph List. ASCII letters and digits map
/// through their spelled-out names; single-letter names map to themselves.
const GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '),
    ("exclam", '!'),
    ("quotedbl", '"'),
    ("numbersign", '#'),
    ("dollar", '$'),
    ("percent", '%'),
    ("ampersand", '&'),
    ("quotesingle", '\''),
    ("parenleft", '('),
    ("parenright", ')'),
    ("asterisk", '*'),
    ("plus", '+'),
    ("comma", ','),
    ("hyphen", '-'),
    ("period", '.'),
    ("slash", '/'),
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("colon", ':'),
    ("semicolon", ';'),
    ("less", '<'),
    ("equal", '='),
    ("greater", '>'),
    ("question", '?'),
    ("at", '@'),
    ("A", 'A'),
    ("B", 'B'),
    ("C", 'C'),
    ("D", 'D'),
    ("E", 'E'),
    ("F", 'F'),
    ("G", 'G'),
    ("H", 'H'),
    ("I", 'I'),
    ("J", 'J'),
    ("K", 'K'),
    ("L", 'L'),
    ("M", 'M'),
    ("N", 'N'),
    ("O", 'O'),
    ("P", 'P'),
    ("Q", 'Q'),
    ("R", 'R'),
    ("S", 'S'),
    ("T", 'T'),
    ("U", 'U'),
    ("V", 'V'),
    ("W", 'W'),
    ("X", 'X'),
    ("Y", 'Y'),
    ("Z", 'Z'),
    ("bracketleft", '['),
    ("backslash", '\\'),
    ("bracketright", ']'),
    ("asciicircum", '^'),
    ("underscore", '_'),
    ("grave", '`'),
    ("a", 'a'),
    ("b", 'b'),
    ("c", 'c'),
    ("d", 'd'),
    ("e", 'e'),
    ("f", 'f'),
    ("g", 'g'),
    ("h", 'h'),
    ("i", 'i'),
    ("j", 'j'),
    ("k", 'k'),
    ("l", 'l'),
    ("m", 'm'),
    ("n", 'n'),
    ("o", 'o'),
    ("p", 'p'),
    ("q", 'q'),
    ("r", 'r'),
    ("s", 's'),
    ("t", 't'),
    ("u", 'u'),
    ("v", 'v'),
    ("w", 'w'),
    ("x", 'x'),
    ("y", 'y'),
    ("z", 'z'),
    ("braceleft", '{'),
    ("bar", '|'),
    ("braceright", '}'),
    ("asciitilde", '~'),
    // Typographic marks
    ("quoteleft", '\u{2018}'),
    ("quoteright", '\u{2019}'),
    ("quotedblleft", '\u{201c}'),
    ("quotedblright", '\u{201d}'),
    ("quotesinglbase", '\u{201a}'),
    ("quotedblbase", '\u{201e}'),
    ("guillemotleft", '«'),
    ("guillemotright", '»'),
    ("guilsinglleft", '\u{2039}'),
    ("guilsinglright", '\u{203a}'),
    ("endash", '\u{2013}'),
    ("emdash", '\u{2014}'),
    ("bullet", '\u{2022}'),
    ("ellipsis", '\u{2026}'),
    ("dagger", '\u{2020}'),
    ("daggerdbl", '\u{2021}'),
    ("perthousand", '\u{2030}'),
    ("fraction", '\u{2044}'),
    ("florin", 'ƒ'),
    ("periodcentered", '·'),
    ("exclamdown", '¡'),
    ("questiondown", '¿'),
    ("section", '§'),
    ("paragraph", '¶'),
    ("copyright", '©'),
    ("registered", '®'),
    ("trademark", '\u{2122}'),
    ("degree", '°'),
    ("plusminus", '±'),
    ("micro", 'µ'),
    ("mu", 'µ'),
    ("brokenbar", '¦'),
    ("ordfeminine", 'ª'),
    ("ordmasculine", 'º'),
    ("onesuperior", '¹'),
    ("twosuperior", '²'),
    ("threesuperior", '³'),
    ("onehalf", '½'),
    ("onequarter", '¼'),
    ("threequarters", '¾'),
    // Currency
    ("cent", '¢'),
    ("sterling", '£'),
    ("yen", '¥'),
    ("currency", '¤'),
    ("Euro", '\u{20ac}'),
    // Math
    ("minus", '\u{2212}'),
    ("multiply", '×'),
    ("divide", '÷'),
    ("notequal", '\u{2260}'),
    ("lessequal", '\u{2264}'),
    ("greaterequal", '\u{2265}'),
    ("logicalnot", '¬'),
    ("radical", '\u{221a}'),
    ("infinity", '\u{221e}'),
    ("partialdiff", '\u{2202}'),
    ("summation", '\u{2211}'),
    ("product", '\u{220f}'),
    ("integral", '\u{222b}'),
    ("approxequal", '\u{2248}'),
    ("Delta", '\u{2206}'),
    ("Omega", '\u{2126}'),
    ("pi", '\u{03c0}'),
    ("lozenge", '\u{25ca}'),
    // Ligatures and special letters
    ("fi", '\u{fb01}'),
    ("fl", '\u{fb02}'),
    ("ff", '\u{fb00}'),
    ("ffi", '\u{fb03}'),
    ("ffl", '\u{fb04}'),
    ("ae", 'æ'),
    ("AE", 'Æ'),
    ("oe", 'œ'),
    ("OE", 'Œ'),
    ("oslash", 'ø'),
    ("Oslash", 'Ø'),
    ("germandbls", 'ß'),
    ("dotlessi", '\u{0131}'),
    ("lslash", 'ł'),
    ("Lslash", 'Ł'),
    ("eth", 'ð'),
    ("Eth", 'Ð'),
    ("thorn", 'þ'),
    ("Thorn", 'Þ'),
    // Accents
    ("acute", '´'),
    ("circumflex", '\u{02c6}'),
    ("tilde", '\u{02dc}'),
    ("macron", '¯'),
    ("breve", '\u{02d8}'),
    ("dotaccent", '\u{02d9}'),
    ("dieresis", '¨'),
    ("ring", '\u{02da}'),
    ("cedilla", '¸'),
    ("hungarumlaut", '\u{02dd}'),
    ("ogonek", '\u{02db}'),
    ("caron", '\u{02c7}'),
    // Accented capitals
    ("Aacute", 'Á'),
    ("Agrave", 'À'),
    ("Acircumflex", 'Â'),
    ("Adieresis", 'Ä'),
    ("Atilde", 'Ã'),
    ("Aring", 'Å'),
    ("Ccedilla", 'Ç'),
    ("Eacute", 'É'),
    ("Egrave", 'È'),
    ("Ecircumflex", 'Ê'),
    ("Edieresis", 'Ë'),
    ("Iacute", 'Í'),
    ("Igrave", 'Ì'),
    ("Icircumflex", 'Î'),
    ("Idieresis", 'Ï'),
    ("Ntilde", 'Ñ'),
    ("Oacute", 'Ó'),
    ("Ograve", 'Ò'),
    ("Ocircumflex", 'Ô'),
    ("Odieresis", 'Ö'),
    ("Otilde", 'Õ'),
    ("Uacute", 'Ú'),
    ("Ugrave", 'Ù'),
    ("Ucircumflex", 'Û'),
    ("Udieresis", 'Ü'),
    ("Yacute", 'Ý'),
    ("Ydieresis", 'Ÿ'),
    ("Scaron", 'Š'),
    ("Zcaron", 'Ž'),
    // Accented lowercase
    ("aacute", 'á'),
    ("agrave", 'à'),
    ("acircumflex", 'â'),
    ("adieresis", 'ä'),
    ("atilde", 'ã'),
    ("aring", 'å'),
    ("ccedilla", 'ç'),
    ("eacute", 'é'),
    ("egrave", 'è'),
    ("ecircumflex", 'ê'),
    ("edieresis", 'ë'),
    ("iacute", 'í'),
    ("igrave", 'ì'),
    ("icircumflex", 'î'),
    ("idieresis", 'ï'),
    ("ntilde", 'ñ'),
    ("oacute", 'ó'),
    ("ograve", 'ò'),
    ("ocircumflex", 'ô'),
    ("odieresis", 'ö'),
    ("otilde", 'õ'),
    ("uacute", 'ú'),
    ("ugrave", 'ù'),
    ("ucircumflex", 'û'),
    ("udieresis", 'ü'),
    ("yacute", 'ý'),
    ("ydieresis", 'ÿ'),
    ("scaron", 'š'),
    ("zcaron", 'ž'),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_covers_latin1_and_quotes() {
        let enc = win_ansi_encoding();
        assert_eq!(enc.get(&0xe9).map(String::as_str), Some("é"));
        assert_eq!(enc.get(&0x93).map(String::as_str), Some("\u{201c}"));
        assert_eq!(enc.get(&0x41).map(String::as_str), Some("A"));
    }

    #[test]
    fn standard_maps_typographic_quotes() {
        let enc = standard_encoding();
        assert_eq!(enc.get(&0x27).map(String::as_str), Some("\u{2019}"));
        assert_eq!(enc.get(&0x60).map(String::as_str), Some("\u{2018}"));
    }

    #[test]
    fn glyph_names_resolve() {
        assert_eq!(unicode_for_glyph(b"/eacute").as_deref(), Some("é"));
        assert_eq!(unicode_for_glyph(b"Adieresis").as_deref(), Some("Ä"));
        assert_eq!(unicode_for_glyph(b"uni20AC").as_deref(), Some("\u{20ac}"));
        assert_eq!(unicode_for_glyph(b"/nosuchglyph"), None);
    }

    #[test]
    fn encoding_lookup_accepts_slash() {
        assert!(encoding_by_name(b"/WinAnsiEncoding").is_some());
        assert!(encoding_by_name(b"MacRomanEncoding").is_some());
        assert!(encoding_by_name(b"/KOI8-R").is_none());
    }
}
