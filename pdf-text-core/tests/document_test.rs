use std::io::Cursor;
use std::io::Write;

use pdf_text_core::security::{Encrypter, Rc4};
use pdf_text_core::source::ByteFeed;
use pdf_text_core::{Document, ObjRef, PdfError, PdfValue, StreamObject};

// --- helpers: assemble offset-correct PDF bytes ---

struct PdfBuilder {
    bytes: Vec<u8>,
    entries: Vec<(u32, u64)>,
}

impl PdfBuilder {
    fn new() -> Self {
        PdfBuilder {
            bytes: b"%PDF-1.4\n".to_vec(),
            entries: Vec::new(),
        }
    }

    fn add_object(&mut self, num: u32, body: &str) {
        self.entries.push((num, self.bytes.len() as u64));
        write!(self.bytes, "{} 0 obj\n{}\nendobj\n", num, body).unwrap();
    }

    fn add_stream(&mut self, num: u32, dict: &str, data: &[u8]) {
        self.entries.push((num, self.bytes.len() as u64));
        write!(self.bytes, "{} 0 obj\n{}\nstream\n", num, dict).unwrap();
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\nendstream\nendobj\n");
    }

    /// Write an xref section covering `entries` (one subsection each) and
    /// its trailer. Returns the section's byte offset.
    fn xref_section(&mut self, entries: &[(u32, u64)], trailer: &str) -> u64 {
        let offset = self.bytes.len() as u64;
        self.bytes.extend_from_slice(b"xref\n");
        self.bytes.extend_from_slice(b"0 1\n0000000000 65535 f\r\n");
        for (num, obj_offset) in entries {
            write!(self.bytes, "{} 1\n{:010} {:05} n\r\n", num, obj_offset, 0).unwrap();
        }
        write!(self.bytes, "trailer\n{}\n", trailer).unwrap();
        offset
    }

    fn finish(mut self, startxref: u64) -> Vec<u8> {
        write!(self.bytes, "startxref\n{}\n%%EOF\n", startxref).unwrap();
        self.bytes
    }

    /// Single-revision document: one xref section over all objects.
    fn finish_simple(mut self, trailer: &str) -> Vec<u8> {
        let entries = self.entries.clone();
        let offset = self.xref_section(&entries, trailer);
        self.finish(offset)
    }
}

fn load(bytes: Vec<u8>) -> Document<Cursor<Vec<u8>>> {
    Document::load(Cursor::new(bytes)).unwrap()
}

/// A minimal one-page document with the given page content bytes.
fn one_page_pdf(content: &[u8]) -> Vec<u8> {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    b.add_object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>",
    );
    b.add_stream(4, &format!("<< /Length {} >>", content.len()), content);
    b.finish_simple("<< /Size 5 /Root 1 0 R >>")
}

fn read_all(feed: &mut impl ByteFeed) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(byte) = feed.next_raw().unwrap() {
        out.push(byte);
    }
    out
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

// --- trailer discovery and xref parsing ---

#[test]
fn minimal_document_loads() {
    let mut doc = load(one_page_pdf(b"BT ET"));
    assert_eq!(doc.size(), 5);
    let pages = doc.pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].contains_key(b"/Contents"));
}

#[test]
fn root_resolves_to_catalog() {
    let mut doc = load(one_page_pdf(b"BT ET"));
    let catalog = doc.fetch(ObjRef(1, 0)).unwrap().unwrap();
    let value = catalog.direct_value();
    let dict = value.as_dict().unwrap();
    assert_eq!(
        dict.get(b"/Type"),
        Some(&PdfValue::Name(b"/Catalog".to_vec()))
    );
}

#[test]
fn garbage_input_has_no_startxref() {
    let err = Document::load(Cursor::new(b"this is not a pdf".to_vec())).unwrap_err();
    assert_eq!(err, PdfError::StartxrefNotFound);
}

#[test]
fn missing_eof_marker_is_an_error() {
    let mut bytes = one_page_pdf(b"BT ET");
    // Strip the %%EOF line.
    let pos = bytes.windows(5).rposition(|w| w == b"%%EOF").unwrap();
    bytes.truncate(pos);
    assert!(Document::load(Cursor::new(bytes)).is_err());
}

#[test]
fn bad_xref_offset_is_an_error() {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    let bytes = b.finish(3); // points into the header
    assert_eq!(
        Document::load(Cursor::new(bytes)).unwrap_err(),
        PdfError::MalformedXref
    );
}

#[test]
fn trailing_blank_lines_after_eof_are_skipped() {
    let mut bytes = one_page_pdf(b"BT ET");
    bytes.extend_from_slice(b"\n\n");
    let mut doc = load(bytes);
    assert_eq!(doc.pages().unwrap().len(), 1);
}

// --- indirect object resolution ---

#[test]
fn deref_is_idempotent() {
    let mut doc = load(one_page_pdf(b"BT ET"));
    let first = doc.fetch(ObjRef(2, 0)).unwrap().unwrap();
    let second = doc.fetch(ObjRef(2, 0)).unwrap().unwrap();
    assert!(std::rc::Rc::ptr_eq(&first, &second));
    assert_eq!(first.direct_value(), second.direct_value());
}

#[test]
fn missing_object_resolves_to_null() {
    let mut doc = load(one_page_pdf(b"BT ET"));
    let value = doc
        .resolve(&PdfValue::Reference(ObjRef(99, 0)))
        .unwrap();
    assert_eq!(value, PdfValue::Null);
}

#[test]
fn deref_restores_read_position() {
    let mut doc = load(one_page_pdf(b"BT ET"));
    // Interleave two fetches; the second must still parse cleanly.
    doc.fetch(ObjRef(3, 0)).unwrap().unwrap();
    doc.fetch(ObjRef(1, 0)).unwrap().unwrap();
    assert_eq!(doc.pages().unwrap().len(), 1);
}

// --- /Prev chain merging ---

#[test]
fn newest_revision_wins_and_old_objects_stay_reachable() {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    b.add_object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>",
    );
    b.add_stream(4, "<< /Length 5 >>", b"BT ET");
    b.add_object(5, "<< /Marker (A) >>");
    b.add_object(6, "<< /OnlyInA (yes) >>");
    let rev_a_entries = b.entries.clone();
    let xref_a = b.xref_section(&rev_a_entries, "<< /Size 7 /Root 1 0 R >>");

    // Revision B redefines object 5 only.
    let before = b.entries.len();
    b.add_object(5, "<< /Marker (B) >>");
    let rev_b_entries = b.entries[before..].to_vec();
    let xref_b = b.xref_section(
        &rev_b_entries,
        &format!("<< /Size 7 /Root 1 0 R /Prev {} >>", xref_a),
    );
    let bytes = b.finish(xref_b);

    let mut doc = load(bytes);
    let five = doc
        .resolve(&PdfValue::Reference(ObjRef(5, 0)))
        .unwrap();
    assert_eq!(
        five.as_dict().unwrap().get(b"/Marker"),
        Some(&PdfValue::String(b"B".to_vec()))
    );
    let six = doc
        .resolve(&PdfValue::Reference(ObjRef(6, 0)))
        .unwrap();
    assert_eq!(
        six.as_dict().unwrap().get(b"/OnlyInA"),
        Some(&PdfValue::String(b"yes".to_vec()))
    );
    assert_eq!(doc.pages().unwrap().len(), 1);
}

// --- streams ---

#[test]
fn raw_stream_bytes_pass_through() {
    let mut doc = load(one_page_pdf(b"hello raw stream"));
    let stream = fetch_stream(&mut doc, ObjRef(4, 0));
    let mut feed = doc.stream_feed(&stream).unwrap();
    assert_eq!(read_all(&mut feed), b"hello raw stream");
}

#[test]
fn indirect_length_resolves_through_xref() {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    b.add_object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>",
    );
    b.add_stream(4, "<< /Length 6 0 R >>", b"payload");
    b.add_object(6, "7");
    let bytes = b.finish_simple("<< /Size 7 /Root 1 0 R >>");

    let mut doc = load(bytes);
    let stream = fetch_stream(&mut doc, ObjRef(4, 0));
    assert_eq!(stream.length, 7);
    let mut feed = doc.stream_feed(&stream).unwrap();
    assert_eq!(read_all(&mut feed), b"payload");
}

#[test]
fn flate_stream_inflates_incrementally() {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    // Large enough to span several raw windows.
    let plain: Vec<u8> = (0..40_000u32).map(|i| (i % 251) as u8).collect();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&plain).unwrap();
    let deflated = encoder.finish().unwrap();

    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    b.add_object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>",
    );
    b.add_stream(
        4,
        &format!(
            "<< /Length {} /Filter /FlateDecode >>",
            deflated.len()
        ),
        &deflated,
    );
    let bytes = b.finish_simple("<< /Size 5 /Root 1 0 R >>");

    let mut doc = load(bytes);
    let stream = fetch_stream(&mut doc, ObjRef(4, 0));
    let mut feed = doc.stream_feed(&stream).unwrap();
    assert_eq!(read_all(&mut feed), plain);
}

#[test]
fn unsupported_filter_is_fatal_for_the_stream() {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    b.add_object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>",
    );
    b.add_stream(4, "<< /Length 4 /Filter /LZWDecode >>", b"data");
    let bytes = b.finish_simple("<< /Size 5 /Root 1 0 R >>");

    let mut doc = load(bytes);
    let stream = fetch_stream(&mut doc, ObjRef(4, 0));
    assert!(matches!(
        doc.stream_feed(&stream),
        Err(PdfError::UnsupportedFilter(_))
    ));
}

fn fetch_stream(doc: &mut Document<Cursor<Vec<u8>>>, r: ObjRef) -> StreamObject {
    let object = doc.fetch(r).unwrap().unwrap();
    object.as_stream().expect("stream object").clone()
}

// --- page tree ---

#[test]
fn pages_enumerate_depth_first_in_document_order() {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(2, "<< /Type /Pages /Kids [3 0 R 6 0 R] /Count 3 >>");
    b.add_object(3, "<< /Type /Pages /Kids [4 0 R 5 0 R] /Count 2 >>");
    b.add_object(4, "<< /Type /Page /Contents 8 0 R /Marker (first) >>");
    b.add_object(5, "<< /Type /Page /Contents 8 0 R /Marker (second) >>");
    b.add_object(6, "<< /Type /Page /Contents 8 0 R /Marker (third) >>");
    b.add_stream(8, "<< /Length 5 >>", b"BT ET");
    let bytes = b.finish_simple("<< /Size 9 /Root 1 0 R >>");

    let mut doc = load(bytes);
    let markers: Vec<Vec<u8>> = doc
        .pages()
        .unwrap()
        .iter()
        .map(|page| {
            page.get(b"/Marker")
                .unwrap()
                .as_string()
                .unwrap()
                .to_vec()
        })
        .collect();
    assert_eq!(
        markers,
        vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()]
    );
}

#[test]
fn node_without_kids_is_a_malformed_page_tree() {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    b.add_object(3, "<< /Type /Pages >>"); // neither /Contents nor /Kids
    let bytes = b.finish_simple("<< /Size 4 /Root 1 0 R >>");

    let mut doc = load(bytes);
    assert_eq!(doc.pages().unwrap_err(), PdfError::MalformedPageTree);
}

// --- encryption ---

#[test]
fn encrypted_stream_decrypts_through_the_feed() {
    let owner: Vec<u8> = (0u8..32).collect();
    let id0 = b"id0id0id0id0".to_vec();
    let permissions = -44;
    let encrypter = Encrypter::new(2, 40, permissions, &owner, &id0, true);

    let plain = b"BT /F1 12 Tf (secret) Tj ET";
    let ciphertext = Rc4::new(&encrypter.object_key(4, 0)).apply(plain);

    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    b.add_object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>",
    );
    b.add_stream(
        4,
        &format!("<< /Length {} >>", ciphertext.len()),
        &ciphertext,
    );
    b.add_object(
        7,
        &format!(
            "<< /Filter /Standard /V 1 /R 2 /O <{}> /P {} >>",
            hex(&owner),
            permissions
        ),
    );
    let bytes = b.finish_simple(&format!(
        "<< /Size 8 /Root 1 0 R /Encrypt 7 0 R /ID [<{}> <{}>] >>",
        hex(&id0),
        hex(&id0)
    ));

    let mut doc = load(bytes);
    assert!(doc.is_encrypted());
    let stream = fetch_stream(&mut doc, ObjRef(4, 0));
    let mut feed = doc.stream_feed(&stream).unwrap();
    assert_eq!(read_all(&mut feed), plain);
}

#[test]
fn encrypt_without_id_is_a_malformed_trailer() {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(
        7,
        "<< /Filter /Standard /V 1 /R 2 /O <00> /P 0 >>",
    );
    let bytes =
        b.finish_simple("<< /Size 8 /Root 1 0 R /Encrypt 7 0 R >>");
    assert!(matches!(
        Document::load(Cursor::new(bytes)),
        Err(PdfError::MalformedTrailer(_))
    ));
}

#[test]
fn non_standard_security_handler_is_unsupported() {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(
        7,
        "<< /Filter /MyHandler /V 1 /R 2 /O <00> /P 0 >>",
    );
    let bytes = b.finish_simple(
        "<< /Size 8 /Root 1 0 R /Encrypt 7 0 R /ID [<00> <00>] >>",
    );
    assert!(matches!(
        Document::load(Cursor::new(bytes)),
        Err(PdfError::UnsupportedEncryption(_))
    ));
}

#[test]
fn encryption_version_above_three_is_unsupported() {
    let mut b = PdfBuilder::new();
    b.add_object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.add_object(
        7,
        "<< /Filter /Standard /V 4 /R 4 /O <00> /P 0 >>",
    );
    let bytes = b.finish_simple(
        "<< /Size 8 /Root 1 0 R /Encrypt 7 0 R /ID [<00> <00>] >>",
    );
    assert!(matches!(
        Document::load(Cursor::new(bytes)),
        Err(PdfError::UnsupportedEncryption(_))
    ));
}
