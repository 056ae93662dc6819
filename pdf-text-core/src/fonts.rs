use std::collections::HashMap;
use std::io::{Read, Seek};

use crate::document::Document;
use crate::encodings::{self, Encoding};
use crate::error::PdfError;
use crate::objects::{Indirect, PdfDict, PdfValue, StreamObject};
use crate::source::ByteFeed;
use crate::tokenizer::{Token, Tokenizer};

/// Decodes show-string bytes and measures glyph advances for one font
/// resource. Fonts never refer back to the document; the document owns
/// the font caches.
#[derive(Debug, Clone)]
pub struct Font {
    encoding: Encoding,
    /// code → width in thousandths of an em.
    widths: HashMap<u32, f64>,
    missing_width: f64,
    /// Bytes per character code: 1 for simple fonts, the CMap's code
    /// width for composite fonts.
    code_bytes: u8,
}

impl Font {
    pub fn new(
        encoding: Encoding,
        widths: HashMap<u32, f64>,
        missing_width: f64,
        code_bytes: u8,
    ) -> Self {
        Font {
            encoding,
            widths,
            missing_width,
            code_bytes: code_bytes.max(1),
        }
    }

    /// The fallback font: standard encoding, no width data.
    pub fn standard() -> Self {
        Font::new(encodings::standard_encoding().clone(), HashMap::new(), 0.0, 1)
    }

    /// No encoding at all; every code decodes to U+FFFD.
    pub fn empty() -> Self {
        Font::new(Encoding::new(), HashMap::new(), 0.0, 1)
    }

    /// Split show-string bytes into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks(usize::from(self.code_bytes))
            .map(|chunk| chunk.iter().fold(0u32, |v, b| (v << 8) | u32::from(*b)))
            .collect()
    }

    /// Unicode text for one code; missing codes yield U+FFFD.
    pub fn decode_code(&self, code: u32) -> String {
        self.encoding
            .get(&code)
            .cloned()
            .unwrap_or_else(|| "\u{fffd}".to_string())
    }

    pub fn width_of_code(&self, code: u32) -> f64 {
        self.widths
            .get(&code)
            .copied()
            .unwrap_or(self.missing_width)
    }

    pub fn space_width(&self) -> f64 {
        self.width_of_code(0x20)
    }

    pub fn code_bytes(&self) -> u8 {
        self.code_bytes
    }
}

/// Parse a font dictionary, dispatching on /Subtype.
pub fn parse_font<R: Read + Seek>(
    doc: &mut Document<R>,
    value: &PdfValue,
) -> Result<Font, PdfError> {
    let resolved = doc.resolve(value)?;
    let dict = resolved
        .as_dict()
        .ok_or_else(|| PdfError::MalformedObject("font is not a dictionary".to_string()))?
        .clone();
    let subtype = doc.resolve_entry(&dict, b"/Subtype")?;
    let subtype = subtype.as_name().unwrap_or(b"").to_vec();
    match subtype.as_slice() {
        b"/Type1" | b"/TrueType" => parse_simple_font(doc, &dict),
        b"/Type0" => parse_type0_font(doc, &dict),
        other => {
            if doc.strict_fonts() {
                Err(PdfError::UnsupportedFontSubtype(
                    String::from_utf8_lossy(other).into_owned(),
                ))
            } else {
                log::warn!(
                    "unsupported font subtype {}, substituting an empty font",
                    String::from_utf8_lossy(other)
                );
                Ok(Font::empty())
            }
        }
    }
}

// ── Simple fonts (Type1, TrueType) ────────────────────────────────────────────

fn parse_simple_font<R: Read + Seek>(
    doc: &mut Document<R>,
    dict: &PdfDict,
) -> Result<Font, PdfError> {
    let encoding = parse_simple_encoding(doc, dict)?;
    let widths = parse_widths(doc, dict)?;
    let missing_width = doc
        .resolve_entry(dict, b"/MissingWidth")?
        .as_num()
        .unwrap_or(0.0);
    Ok(Font::new(encoding, widths, missing_width, 1))
}

fn parse_simple_encoding<R: Read + Seek>(
    doc: &mut Document<R>,
    dict: &PdfDict,
) -> Result<Encoding, PdfError> {
    match doc.resolve_entry(dict, b"/Encoding")? {
        PdfValue::Null => Ok(encodings::standard_encoding().clone()),
        PdfValue::Name(name) => Ok(encodings::encoding_by_name(&name)
            .cloned()
            .unwrap_or_default()),
        PdfValue::Dict(enc) => {
            let base = base_encoding(doc, &enc)?;
            apply_differences(doc, &enc, base)
        }
        other => Err(PdfError::MalformedObject(format!(
            "bad /Encoding entry {:?}",
            other
        ))),
    }
}

fn base_encoding<R: Read + Seek>(
    doc: &mut Document<R>,
    enc_dict: &PdfDict,
) -> Result<Encoding, PdfError> {
    match doc.resolve_entry(enc_dict, b"/BaseEncoding")? {
        PdfValue::Name(name) => Ok(encodings::encoding_by_name(&name)
            .cloned()
            .unwrap_or_default()),
        _ => Ok(encodings::standard_encoding().clone()),
    }
}

/// The difference array interleaves numbers (restarting the code index)
/// and glyph names; unknown names map to U+FFFD.
fn apply_differences<R: Read + Seek>(
    doc: &mut Document<R>,
    enc_dict: &PdfDict,
    mut encoding: Encoding,
) -> Result<Encoding, PdfError> {
    let differences = doc.resolve_entry(enc_dict, b"/Differences")?;
    let items = match differences.as_array() {
        Some(items) => items,
        None => return Ok(encoding),
    };
    let mut code = 0u32;
    for item in items {
        match item {
            PdfValue::Integer(n) if *n >= 0 => code = *n as u32,
            PdfValue::Real(r) if *r >= 0.0 => code = *r as u32,
            PdfValue::Name(name) => {
                let unicode = encodings::unicode_for_glyph(name)
                    .unwrap_or_else(|| "\u{fffd}".to_string());
                encoding.insert(code, unicode);
                code += 1;
            }
            other => {
                return Err(PdfError::MalformedObject(format!(
                    "bad /Differences element {:?}",
                    other
                )))
            }
        }
    }
    Ok(encoding)
}

/// Widths cover `[FirstChar, LastChar]`; any missing entry disables the map.
fn parse_widths<R: Read + Seek>(
    doc: &mut Document<R>,
    dict: &PdfDict,
) -> Result<HashMap<u32, f64>, PdfError> {
    let first = match doc.resolve_entry(dict, b"/FirstChar")?.as_int() {
        Some(n) if n >= 0 => n as u32,
        _ => return Ok(HashMap::new()),
    };
    let last = match doc.resolve_entry(dict, b"/LastChar")?.as_int() {
        Some(n) if n >= i64::from(first) => n as u32,
        _ => return Ok(HashMap::new()),
    };
    let widths = match doc.resolve_entry(dict, b"/Widths")?.as_array() {
        Some(items) => items.to_vec(),
        None => return Ok(HashMap::new()),
    };
    let mut map = HashMap::new();
    for (code, item) in (first..=last).zip(widths.iter()) {
        if let Some(width) = doc.resolve(item)?.as_num() {
            map.insert(code, width);
        }
    }
    Ok(map)
}

// ── Composite fonts (Type0) ───────────────────────────────────────────────────

fn parse_type0_font<R: Read + Seek>(
    doc: &mut Document<R>,
    dict: &PdfDict,
) -> Result<Font, PdfError> {
    let (encoding, code_bytes) = parse_type0_encoding(doc, dict)?;
    Ok(Font::new(encoding, HashMap::new(), 0.0, code_bytes))
}

fn parse_type0_encoding<R: Read + Seek>(
    doc: &mut Document<R>,
    dict: &PdfDict,
) -> Result<(Encoding, u8), PdfError> {
    let entry = dict.get(b"/Encoding").cloned();
    let entry = match entry {
        None => {
            return match to_unicode_stream(doc, dict)? {
                Some(stream) => parse_cmap_stream(doc, &stream),
                None => Ok((encodings::standard_encoding().clone(), 1)),
            }
        }
        Some(value) => value,
    };

    // /Encoding referring to a stream object is itself a CMap.
    if let PdfValue::Reference(r) = entry {
        if let Some(object) = doc.fetch(r)? {
            if let Indirect::Stream(stream) = &*object {
                let stream = stream.clone();
                return parse_cmap_stream(doc, &stream);
            }
        }
    }

    match doc.resolve(&entry)? {
        PdfValue::Name(name) => {
            if let Some(table) = encodings::encoding_by_name(&name) {
                return Ok((table.clone(), 1));
            }
            match to_unicode_stream(doc, dict)? {
                Some(stream) => parse_cmap_stream(doc, &stream),
                None => {
                    log::warn!(
                        "no usable encoding for composite font ({})",
                        String::from_utf8_lossy(&name)
                    );
                    Ok((Encoding::new(), 1))
                }
            }
        }
        PdfValue::Dict(enc) => {
            let base = base_encoding(doc, &enc)?;
            Ok((apply_differences(doc, &enc, base)?, 1))
        }
        PdfValue::Null => Ok((encodings::standard_encoding().clone(), 1)),
        other => Err(PdfError::MalformedObject(format!(
            "bad /Encoding entry {:?}",
            other
        ))),
    }
}

fn to_unicode_stream<R: Read + Seek>(
    doc: &mut Document<R>,
    dict: &PdfDict,
) -> Result<Option<StreamObject>, PdfError> {
    let r = match dict.get(b"/ToUnicode") {
        Some(PdfValue::Reference(r)) => *r,
        _ => return Ok(None),
    };
    match doc.fetch(r)? {
        Some(object) => Ok(object.as_stream().cloned()),
        None => Ok(None),
    }
}

fn parse_cmap_stream<R: Read + Seek>(
    doc: &mut Document<R>,
    stream: &StreamObject,
) -> Result<(Encoding, u8), PdfError> {
    let feed = doc.stream_feed(stream)?;
    parse_cmap(feed)
}

// ── CMap parsing ──────────────────────────────────────────────────────────────

/// A value on the CMap operand stack. Arrays are collapsed so `bfrange`
/// destinations keep their shape.
enum CmapValue {
    Str(Vec<u8>),
    Array(Vec<CmapValue>),
    Other,
}

/// A miniature content-stream interpreter recognising
/// `beginbfchar`/`endbfchar` and `beginbfrange`/`endbfrange`.
///
/// Returns the code → Unicode map and the code byte-width seen in the
/// source codes, so composite show strings decode with the right stride.
pub fn parse_cmap<F: ByteFeed>(feed: F) -> Result<(Encoding, u8), PdfError> {
    let mut tokenizer = Tokenizer::new(feed);
    let mut stack: Vec<CmapValue> = Vec::new();
    let mut array: Option<Vec<CmapValue>> = None;
    let mut map = Encoding::new();
    let mut code_bytes = 1u8;

    while let Some(token) = tokenizer.next_token()? {
        let value = match token {
            Token::Word(word) => {
                match word.as_slice() {
                    b"endbfchar" => apply_bfchar(&stack, &mut map, &mut code_bytes),
                    b"endbfrange" => apply_bfrange(&stack, &mut map, &mut code_bytes),
                    _ => {}
                }
                stack.clear();
                array = None;
                continue;
            }
            Token::OpenArray => {
                array = Some(Vec::new());
                continue;
            }
            Token::CloseArray => CmapValue::Array(array.take().unwrap_or_default()),
            Token::String(bytes) => CmapValue::Str(bytes),
            _ => CmapValue::Other,
        };
        match &mut array {
            Some(items) if !matches!(value, CmapValue::Array(_)) => items.push(value),
            _ => stack.push(value),
        }
    }
    Ok((map, code_bytes))
}

/// Pairs of hex strings: source code, UTF-16BE target.
fn apply_bfchar(stack: &[CmapValue], map: &mut Encoding, code_bytes: &mut u8) {
    for pair in stack.chunks_exact(2) {
        match (&pair[0], &pair[1]) {
            (CmapValue::Str(code), CmapValue::Str(target)) => {
                *code_bytes = (*code_bytes).max(code.len() as u8);
                map.insert(be_u32(code), decode_utf16_be(target));
            }
            _ => log::warn!("malformed bfchar entry"),
        }
    }
}

/// Triples `(first, last, dst)`: dst is a hex string assigning sequential
/// code points over `[first, last)`, or an array indexed from `first`.
fn apply_bfrange(stack: &[CmapValue], map: &mut Encoding, code_bytes: &mut u8) {
    for triple in stack.chunks_exact(3) {
        let (first, last) = match (&triple[0], &triple[1]) {
            (CmapValue::Str(first), CmapValue::Str(last)) => {
                *code_bytes = (*code_bytes).max(first.len() as u8);
                (be_u32(first), be_u32(last))
            }
            _ => {
                log::warn!("malformed bfrange entry");
                continue;
            }
        };
        match &triple[2] {
            CmapValue::Str(target) => {
                let base = decode_utf16_be(target);
                if let Some(c0) = base.chars().next() {
                    for (i, code) in (first..last).enumerate() {
                        if let Some(c) = char::from_u32(c0 as u32 + i as u32) {
                            map.insert(code, c.to_string());
                        }
                    }
                }
            }
            CmapValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if let CmapValue::Str(target) = item {
                        map.insert(first + i as u32, decode_utf16_be(target));
                    }
                }
            }
            CmapValue::Other => log::warn!("malformed bfrange destination"),
        }
    }
}

fn be_u32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |v, b| (v << 8) | u32::from(*b))
}

fn decode_utf16_be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| {
            if pair.len() == 2 {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from(pair[0])
            }
        })
        .collect();
    char::decode_utf16(units)
        .map(|r| r.unwrap_or('\u{fffd}'))
        .collect()
}
