use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::rc::Rc;

use flate2::{Decompress, FlushDecompress, Status};

use crate::error::PdfError;
use crate::fonts::{self, Font};
use crate::objects::{Indirect, ObjRef, PdfDict, PdfValue, StreamObject};
use crate::parser::ObjectParser;
use crate::security::{Encrypter, Rc4};
use crate::source::{is_whitespace, ByteFeed, ByteSource};

/// Window size for raw stream reads.
const STREAM_WINDOW: usize = 1024;

/// One cross-reference table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrefEntry {
    pub offset: u64,
    pub gen: u16,
    pub in_use: bool,
}

/// A parsed PDF document: the merged xref table, the trailer's key entries,
/// and monotonically growing caches for resolved objects and fonts.
///
/// All object access is demand-driven. Dereferencing seeks the byte source
/// and restores the previous position afterwards, so callers never observe
/// position clobbering.
#[derive(Debug)]
pub struct Document<R: Read + Seek> {
    source: ByteSource<R>,
    xref: HashMap<u32, XrefEntry>,
    size: i64,
    root: PdfValue,
    encrypt: Option<PdfValue>,
    doc_id: Option<PdfValue>,
    cache: HashMap<u32, Rc<Indirect>>,
    fonts_by_name: HashMap<Vec<u8>, Rc<Font>>,
    fonts_by_num: HashMap<u32, Rc<Font>>,
    encrypter: Option<Encrypter>,
    strict_fonts: bool,
}

impl Document<BufReader<File>> {
    /// Open a PDF from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdfError> {
        let file = File::open(path.as_ref())?;
        Self::load(BufReader::new(file))
    }
}

impl<R: Read + Seek> Document<R> {
    /// Parse the trailer and xref chain and prepare decryption if the
    /// document is encrypted. Object bodies are not read yet.
    pub fn load(reader: R) -> Result<Self, PdfError> {
        let mut source = ByteSource::new(reader);

        let startxref = find_startxref(&mut source)?;
        let mut xref = read_xref_section(&mut source, startxref)?;
        let first_trailer = read_trailer_dict(&mut source)?;

        // Walk /Prev chains; the newest revision wins, earlier revisions
        // fill only object numbers not already present.
        let mut trailer = first_trailer.clone();
        while let Some(prev) = trailer.get_int(b"/Prev") {
            if prev < 0 {
                return Err(PdfError::MalformedXref);
            }
            let older = read_xref_section(&mut source, prev as u64)?;
            trailer = read_trailer_dict(&mut source)?;
            for (num, entry) in older {
                xref.entry(num).or_insert(entry);
            }
        }

        let size = first_trailer
            .get_int(b"/Size")
            .ok_or_else(|| PdfError::MalformedTrailer("missing /Size".to_string()))?;
        let root = first_trailer
            .get(b"/Root")
            .cloned()
            .ok_or_else(|| PdfError::MalformedTrailer("missing /Root".to_string()))?;

        let mut document = Document {
            source,
            xref,
            size,
            root,
            encrypt: first_trailer.get(b"/Encrypt").cloned(),
            doc_id: first_trailer.get(b"/ID").cloned(),
            cache: HashMap::new(),
            fonts_by_name: HashMap::new(),
            fonts_by_num: HashMap::new(),
            encrypter: None,
            strict_fonts: false,
        };
        document.prepare_decryption()?;
        Ok(document)
    }

    /// Fail on unsupported font subtypes instead of substituting an
    /// empty font.
    pub fn set_strict_fonts(&mut self, strict: bool) {
        self.strict_fonts = strict;
    }

    pub fn strict_fonts(&self) -> bool {
        self.strict_fonts
    }

    /// The trailer's /Size entry.
    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn xref_entry(&self, num: u32) -> Option<&XrefEntry> {
        self.xref.get(&num)
    }

    // ── Indirect object resolution ────────────────────────────────────────

    /// Fetch an indirect object by reference, reading and caching it on
    /// first use. Unknown or free object numbers yield `None`.
    pub fn fetch(&mut self, r: ObjRef) -> Result<Option<Rc<Indirect>>, PdfError> {
        if let Some(cached) = self.cache.get(&r.0) {
            return Ok(Some(cached.clone()));
        }
        let entry = match self.xref.get(&r.0) {
            Some(entry) if entry.in_use => *entry,
            _ => return Ok(None),
        };
        let object = Rc::new(self.read_indirect_at(entry.offset)?);
        self.cache.insert(r.0, object.clone());
        Ok(Some(object))
    }

    /// Dereference `value` if it is a reference; dangling references
    /// resolve to null.
    pub fn resolve(&mut self, value: &PdfValue) -> Result<PdfValue, PdfError> {
        match value {
            PdfValue::Reference(r) => Ok(self
                .fetch(*r)?
                .map(|obj| obj.direct_value())
                .unwrap_or(PdfValue::Null)),
            other => Ok(other.clone()),
        }
    }

    /// Resolve a dictionary entry; absent keys resolve to null.
    pub fn resolve_entry(
        &mut self,
        dict: &PdfDict,
        key: &[u8],
    ) -> Result<PdfValue, PdfError> {
        match dict.get(key) {
            Some(value) => self.resolve(&value.clone()),
            None => Ok(PdfValue::Null),
        }
    }

    /// Read `n g obj …` at `offset`, restoring the read position afterwards.
    fn read_indirect_at(&mut self, offset: u64) -> Result<Indirect, PdfError> {
        let saved = self.source.tell()?;
        self.source.seek(SeekFrom::Start(offset))?;
        let result = self.read_indirect_here();
        self.source.seek(SeekFrom::Start(saved))?;
        result
    }

    fn read_indirect_here(&mut self) -> Result<Indirect, PdfError> {
        let header = self.source.read_line()?;
        let mut fields = header
            .split(|b| is_whitespace(*b))
            .filter(|field| !field.is_empty());
        let num = fields
            .next()
            .and_then(parse_ascii_u64)
            .ok_or_else(|| bad_header(&header))? as u32;
        let gen = fields
            .next()
            .and_then(parse_ascii_u64)
            .filter(|g| *g <= u64::from(u16::MAX))
            .ok_or_else(|| bad_header(&header))? as u16;
        if fields.next() != Some(b"obj".as_slice()) || fields.next().is_some() {
            return Err(bad_header(&header));
        }

        let value = ObjectParser::new(&mut self.source).parse()?;

        let keyword = self.source.read_keyword_line()?;
        match keyword.as_slice() {
            b"endobj" => Ok(Indirect::Object { num, gen, value }),
            b"stream" => {
                let dict = match value {
                    PdfValue::Dict(dict) => dict,
                    _ => {
                        return Err(PdfError::MalformedObject(
                            "stream without a dictionary".to_string(),
                        ))
                    }
                };
                let stream = self.read_stream_extent(num, gen, dict)?;
                Ok(Indirect::Stream(stream))
            }
            other => Err(PdfError::MalformedObject(format!(
                "expected endobj or stream, was {}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    /// The payload starts right after the `stream` keyword line; its length
    /// comes from /Length, resolved through the xref if indirect.
    fn read_stream_extent(
        &mut self,
        num: u32,
        gen: u16,
        dict: PdfDict,
    ) -> Result<StreamObject, PdfError> {
        let start = self.source.tell()?;
        let length = self
            .resolve_entry(&dict, b"/Length")?
            .as_int()
            .filter(|n| *n >= 0)
            .ok_or_else(|| {
                PdfError::MalformedObject("stream without a usable /Length".to_string())
            })? as u64;

        self.source.seek(SeekFrom::Start(start + length))?;
        let keyword = self.source.read_keyword_line()?;
        if keyword != b"endstream" {
            return Err(PdfError::MalformedObject(format!(
                "expected endstream, was {}",
                String::from_utf8_lossy(&keyword)
            )));
        }
        let keyword = self.source.read_keyword_line()?;
        if keyword != b"endobj" {
            return Err(PdfError::MalformedObject(format!(
                "expected endobj, was {}",
                String::from_utf8_lossy(&keyword)
            )));
        }
        Ok(StreamObject {
            num,
            gen,
            dict,
            start,
            length,
        })
    }

    // ── Encryption ────────────────────────────────────────────────────────

    fn prepare_decryption(&mut self) -> Result<(), PdfError> {
        let encrypt = match self.encrypt.clone() {
            Some(value) => value,
            None => return Ok(()),
        };
        let resolved = self.resolve(&encrypt)?;
        let dict = resolved
            .as_dict()
            .ok_or_else(|| {
                PdfError::MalformedTrailer("/Encrypt is not a dictionary".to_string())
            })?
            .clone();

        let filter = self.resolve_entry(&dict, b"/Filter")?;
        if filter.as_name() != Some(b"/Standard".as_slice()) {
            return Err(PdfError::UnsupportedEncryption(format!(
                "security handler {:?}",
                filter
            )));
        }
        let version = self
            .resolve_entry(&dict, b"/V")?
            .as_int()
            .unwrap_or(0);
        if !(1..=3).contains(&version) {
            return Err(PdfError::UnsupportedEncryption(format!(
                "version {}",
                version
            )));
        }
        let revision = self
            .resolve_entry(&dict, b"/R")?
            .as_int()
            .ok_or_else(|| {
                PdfError::MalformedObject("encryption dictionary missing /R".to_string())
            })?;
        let owner_hash = self
            .resolve_entry(&dict, b"/O")?
            .as_string()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                PdfError::MalformedObject("encryption dictionary missing /O".to_string())
            })?;
        let permissions = self
            .resolve_entry(&dict, b"/P")?
            .as_int()
            .unwrap_or(0);
        let length_bits = if version == 1 {
            40
        } else {
            self.resolve_entry(&dict, b"/Length")?.as_int().unwrap_or(40)
        };
        let encrypt_metadata = match self.resolve_entry(&dict, b"/EncryptMetadata")? {
            PdfValue::Boolean(b) => b,
            _ => true,
        };

        let id_value = self.doc_id.clone().ok_or_else(|| {
            PdfError::MalformedTrailer("/ID required with /Encrypt".to_string())
        })?;
        let id_array = self.resolve(&id_value)?;
        let first_id = id_array
            .as_array()
            .and_then(|items| items.first().cloned())
            .ok_or_else(|| {
                PdfError::MalformedTrailer("/ID is not a two-element array".to_string())
            })?;
        let id0 = self
            .resolve(&first_id)?
            .as_string()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                PdfError::MalformedTrailer("/ID[0] is not a string".to_string())
            })?;

        self.encrypter = Some(Encrypter::new(
            revision,
            length_bits,
            permissions,
            &owner_hash,
            &id0,
            encrypt_metadata,
        ));
        Ok(())
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypter.is_some()
    }

    // ── Streams ───────────────────────────────────────────────────────────

    /// A lazy decoding feed over one stream object.
    pub fn stream_feed(
        &mut self,
        stream: &StreamObject,
    ) -> Result<StreamFeed<'_, R>, PdfError> {
        let flate = self.stream_uses_flate(stream)?;
        let parts = vec![StreamPart {
            start: stream.start,
            length: stream.length,
            num: stream.num,
            gen: stream.gen,
            flate,
        }];
        Ok(StreamFeed::new(
            &mut self.source,
            self.encrypter.as_ref(),
            parts,
        ))
    }

    /// A lazy decoding feed over a page's /Contents entry, which may be a
    /// single stream or an array of streams decoded in sequence.
    pub fn content_feed(
        &mut self,
        contents: &PdfValue,
    ) -> Result<StreamFeed<'_, R>, PdfError> {
        let mut streams = Vec::new();
        self.collect_content_streams(contents, &mut streams)?;
        let mut parts = Vec::with_capacity(streams.len());
        for stream in &streams {
            parts.push(StreamPart {
                start: stream.start,
                length: stream.length,
                num: stream.num,
                gen: stream.gen,
                flate: self.stream_uses_flate(stream)?,
            });
        }
        Ok(StreamFeed::new(
            &mut self.source,
            self.encrypter.as_ref(),
            parts,
        ))
    }

    fn collect_content_streams(
        &mut self,
        value: &PdfValue,
        out: &mut Vec<StreamObject>,
    ) -> Result<(), PdfError> {
        match value {
            PdfValue::Reference(r) => match self.fetch(*r)? {
                Some(object) => match &*object {
                    Indirect::Stream(stream) => out.push(stream.clone()),
                    Indirect::Object { value, .. } => {
                        if let PdfValue::Array(items) = value.clone() {
                            for item in &items {
                                self.collect_content_streams(item, out)?;
                            }
                        } else {
                            return Err(PdfError::MalformedObject(
                                "/Contents is not a stream".to_string(),
                            ));
                        }
                    }
                },
                None => {}
            },
            PdfValue::Array(items) => {
                for item in items {
                    self.collect_content_streams(item, out)?;
                }
            }
            _ => {
                return Err(PdfError::MalformedObject(
                    "/Contents is not a stream".to_string(),
                ))
            }
        }
        Ok(())
    }

    /// Only /FlateDecode is supported; absent /Filter means raw bytes.
    fn stream_uses_flate(&mut self, stream: &StreamObject) -> Result<bool, PdfError> {
        let filter = self.resolve_entry(&stream.dict, b"/Filter")?;
        match &filter {
            PdfValue::Null => Ok(false),
            PdfValue::Name(name) if name.as_slice() == b"/FlateDecode" => Ok(true),
            PdfValue::Array(items) if items.is_empty() => Ok(false),
            PdfValue::Array(items) if items.len() == 1 => {
                match self.resolve(&items[0])?.as_name() {
                    Some(b"/FlateDecode") => Ok(true),
                    _ => Err(PdfError::UnsupportedFilter(format!("{:?}", filter))),
                }
            }
            other => Err(PdfError::UnsupportedFilter(format!("{:?}", other))),
        }
    }

    // ── Page tree ─────────────────────────────────────────────────────────

    /// All page dictionaries, depth-first in document order. A node with a
    /// /Contents entry is a page; anything else expands through /Kids.
    pub fn pages(&mut self) -> Result<Vec<PdfDict>, PdfError> {
        let root = self.root.clone();
        let catalog = self.resolve(&root)?;
        let catalog = catalog.as_dict().ok_or(PdfError::MalformedPageTree)?;
        let pages_value = catalog
            .get(b"/Pages")
            .cloned()
            .ok_or(PdfError::MalformedPageTree)?;
        let pages_node = self.resolve(&pages_value)?;
        let pages_dict = pages_node.as_dict().ok_or(PdfError::MalformedPageTree)?;
        let kids = self
            .resolve_entry(pages_dict, b"/Kids")?
            .as_array()
            .ok_or(PdfError::MalformedPageTree)?
            .to_vec();

        let mut worklist: VecDeque<PdfValue> = kids.into();
        let mut pages = Vec::new();
        while let Some(kid) = worklist.pop_front() {
            let node = self.resolve(&kid)?;
            let dict = node.as_dict().ok_or(PdfError::MalformedPageTree)?;
            if dict.contains_key(b"/Contents") {
                pages.push(dict.clone());
            } else {
                let kids = self
                    .resolve_entry(dict, b"/Kids")?
                    .as_array()
                    .ok_or(PdfError::MalformedPageTree)?
                    .to_vec();
                for kid in kids.into_iter().rev() {
                    worklist.push_front(kid);
                }
            }
        }
        Ok(pages)
    }

    // ── Fonts ─────────────────────────────────────────────────────────────

    /// Parse and cache every font under the page's /Resources/Font.
    pub fn load_page_fonts(&mut self, page: &PdfDict) -> Result<(), PdfError> {
        let resources = self.resolve_entry(page, b"/Resources")?;
        let resources = match resources.as_dict() {
            Some(dict) => dict.clone(),
            None => return Ok(()),
        };
        let font_dict = self.resolve_entry(&resources, b"/Font")?;
        let font_dict = match font_dict.as_dict() {
            Some(dict) => dict.clone(),
            None => return Ok(()),
        };
        for (name, value) in font_dict.iter() {
            if self.fonts_by_name.contains_key(name.as_slice()) {
                continue;
            }
            let font = self.parse_font_cached(value)?;
            log::debug!(
                "font {}: {:?}",
                String::from_utf8_lossy(name),
                font
            );
            self.fonts_by_name.insert(name.clone(), font);
        }
        Ok(())
    }

    fn parse_font_cached(&mut self, value: &PdfValue) -> Result<Rc<Font>, PdfError> {
        if let PdfValue::Reference(r) = value {
            if let Some(font) = self.fonts_by_num.get(&r.0) {
                return Ok(font.clone());
            }
            let value = value.clone();
            let font = Rc::new(fonts::parse_font(self, &value)?);
            self.fonts_by_num.insert(r.0, font.clone());
            return Ok(font);
        }
        Ok(Rc::new(fonts::parse_font(self, value)?))
    }

    /// The font bound to a resource name; unknown names fall back to the
    /// standard encoding with no widths.
    pub fn font(&self, name: &[u8]) -> Rc<Font> {
        self.fonts_by_name
            .get(name)
            .cloned()
            .unwrap_or_else(|| Rc::new(Font::standard()))
    }

    /// Snapshot of the resource-name font table, for use while the source
    /// is lent out to a content feed.
    pub fn page_font_table(&self) -> HashMap<Vec<u8>, Rc<Font>> {
        self.fonts_by_name.clone()
    }
}

// ── Trailer and xref parsing ──────────────────────────────────────────────────

/// Scan backwards for `startxref` / offset / `%%EOF`, skipping trailing
/// blank lines.
fn find_startxref<R: Read + Seek>(source: &mut ByteSource<R>) -> Result<u64, PdfError> {
    let mut lines = source.reverse_lines()?;
    let mut line = lines.next_line()?.ok_or(PdfError::StartxrefNotFound)?;
    while line.is_empty() {
        line = lines.next_line()?.ok_or(PdfError::StartxrefNotFound)?;
    }
    if line != b"%%EOF" {
        return Err(PdfError::StartxrefNotFound);
    }
    let offset = lines
        .next_line()?
        .as_deref()
        .and_then(parse_ascii_u64)
        .ok_or(PdfError::StartxrefNotFound)?;
    match lines.next_line()? {
        Some(line) if line == b"startxref" => Ok(offset),
        _ => Err(PdfError::StartxrefNotFound),
    }
}

/// Read one `xref` section: subsection headers `first count` followed by
/// `count` entries, terminated by the `trailer` keyword.
fn read_xref_section<R: Read + Seek>(
    source: &mut ByteSource<R>,
    offset: u64,
) -> Result<HashMap<u32, XrefEntry>, PdfError> {
    source.seek(SeekFrom::Start(offset))?;
    if crate::source::trim_ascii(&source.read_line()?) != b"xref" {
        return Err(PdfError::MalformedXref);
    }

    let mut entries = HashMap::new();
    loop {
        let line = source.read_line()?;
        let line = crate::source::trim_ascii(&line);
        if line.is_empty() || line == b"trailer" {
            break;
        }
        let mut header = line.split(|b| is_whitespace(*b)).filter(|f| !f.is_empty());
        let first = header
            .next()
            .and_then(parse_ascii_u64)
            .ok_or(PdfError::MalformedXref)? as u32;
        let count = header
            .next()
            .and_then(parse_ascii_u64)
            .ok_or(PdfError::MalformedXref)?;
        if header.next().is_some() {
            return Err(PdfError::MalformedXref);
        }
        for i in 0..count {
            let entry_line = source.read_line()?;
            let mut fields = entry_line
                .split(|b| is_whitespace(*b))
                .filter(|f| !f.is_empty());
            let offset = fields
                .next()
                .and_then(parse_ascii_u64)
                .ok_or(PdfError::MalformedXref)?;
            let gen = fields
                .next()
                .and_then(parse_ascii_u64)
                .filter(|g| *g <= u64::from(u16::MAX))
                .ok_or(PdfError::MalformedXref)? as u16;
            let in_use = match fields.next() {
                Some(b"n") => true,
                Some(b"f") => false,
                _ => return Err(PdfError::MalformedXref),
            };
            entries.insert(first + i as u32, XrefEntry { offset, gen, in_use });
        }
    }
    Ok(entries)
}

/// The trailer dictionary sits right after the `trailer` keyword.
fn read_trailer_dict<R: Read + Seek>(
    source: &mut ByteSource<R>,
) -> Result<PdfDict, PdfError> {
    match ObjectParser::new(&mut *source).parse()? {
        PdfValue::Dict(dict) => Ok(dict),
        other => Err(PdfError::MalformedTrailer(format!(
            "expected a dictionary, was {:?}",
            other
        ))),
    }
}

fn parse_ascii_u64(bytes: &[u8]) -> Option<u64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

fn bad_header(line: &[u8]) -> PdfError {
    PdfError::MalformedObject(format!(
        "bad object header {}",
        String::from_utf8_lossy(line)
    ))
}

// ── Stream decoding ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct StreamPart {
    start: u64,
    length: u64,
    num: u32,
    gen: u16,
    flate: bool,
}

/// Incremental stream decoder: raw windows from the source, through the
/// per-object RC4 keystream when the document is encrypted, then through a
/// DEFLATE decoder whose state persists across windows. Each part of a
/// multi-part content stream gets a fresh cipher and inflater.
pub struct StreamFeed<'a, R: Read + Seek> {
    source: &'a mut ByteSource<R>,
    encrypter: Option<&'a Encrypter>,
    parts: Vec<StreamPart>,
    part: usize,
    entered: bool,
    consumed: u64,
    cipher: Option<Rc4>,
    inflater: Option<Decompress>,
    /// The inflater reached its end-of-stream marker.
    finished: bool,
    buf: Vec<u8>,
    pos: usize,
}

impl<'a, R: Read + Seek> StreamFeed<'a, R> {
    fn new(
        source: &'a mut ByteSource<R>,
        encrypter: Option<&'a Encrypter>,
        parts: Vec<StreamPart>,
    ) -> Self {
        StreamFeed {
            source,
            encrypter,
            parts,
            part: 0,
            entered: false,
            consumed: 0,
            cipher: None,
            inflater: None,
            finished: false,
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Decode the next window into `buf`. `false` means all parts are done.
    fn fill(&mut self) -> Result<bool, PdfError> {
        loop {
            if self.part >= self.parts.len() {
                return Ok(false);
            }
            if !self.entered {
                let part = self.parts[self.part];
                self.cipher = self.encrypter.map(|e| e.cipher(part.num, part.gen));
                self.inflater = part.flate.then(|| Decompress::new(true));
                self.consumed = 0;
                self.finished = false;
                self.entered = true;
            }
            let part = self.parts[self.part];
            let remaining = part.length - self.consumed;
            if remaining == 0 || self.finished {
                self.part += 1;
                self.entered = false;
                continue;
            }

            let n = STREAM_WINDOW.min(remaining as usize);
            self.source.seek(SeekFrom::Start(part.start + self.consumed))?;
            let mut window = self.source.read(n)?;
            if window.is_empty() {
                return Err(PdfError::UnexpectedEof);
            }
            self.consumed += window.len() as u64;
            if let Some(cipher) = &mut self.cipher {
                cipher.apply_in_place(&mut window);
            }

            self.buf.clear();
            self.pos = 0;
            match &mut self.inflater {
                Some(inflater) => {
                    self.finished = inflate_into(inflater, &window, &mut self.buf)?;
                }
                None => self.buf = window,
            }
            if !self.buf.is_empty() {
                return Ok(true);
            }
        }
    }
}

impl<R: Read + Seek> ByteFeed for StreamFeed<'_, R> {
    fn next_raw(&mut self) -> Result<Option<u8>, PdfError> {
        loop {
            if self.pos < self.buf.len() {
                let byte = self.buf[self.pos];
                self.pos += 1;
                return Ok(Some(byte));
            }
            if !self.fill()? {
                return Ok(None);
            }
        }
    }
}

/// Feed one input window to the inflater, appending output to `out`.
/// Returns true when the DEFLATE stream ends.
fn inflate_into(
    inflater: &mut Decompress,
    input: &[u8],
    out: &mut Vec<u8>,
) -> Result<bool, PdfError> {
    let mut consumed = 0usize;
    while consumed < input.len() {
        out.reserve(STREAM_WINDOW * 4);
        let before_in = inflater.total_in();
        let before_len = out.len();
        let status = inflater
            .decompress_vec(&input[consumed..], out, FlushDecompress::None)
            .map_err(|e| PdfError::Inflate(e.to_string()))?;
        consumed += (inflater.total_in() - before_in) as usize;
        match status {
            Status::StreamEnd => return Ok(true),
            Status::Ok => {}
            Status::BufError => {
                if inflater.total_in() == before_in && out.len() == before_len {
                    return Err(PdfError::Inflate(
                        "no progress in DEFLATE stream".to_string(),
                    ));
                }
            }
        }
    }
    Ok(false)
}
