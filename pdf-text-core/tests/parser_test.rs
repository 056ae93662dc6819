use std::io::Cursor;

use pdf_text_core::parser::ObjectParser;
use pdf_text_core::source::ByteSource;
use pdf_text_core::{ObjRef, PdfValue};

fn parse(input: &[u8]) -> PdfValue {
    ObjectParser::new(ByteSource::new(Cursor::new(input.to_vec())))
        .parse()
        .unwrap()
}

fn parse_err(input: &[u8]) -> pdf_text_core::PdfError {
    ObjectParser::new(ByteSource::new(Cursor::new(input.to_vec())))
        .parse()
        .unwrap_err()
}

#[test]
fn page_dictionary_round_trip() {
    let value = parse(
        b"<<\n/Type /Page\n/MediaBox [0 0 612 792]\n/Parent 2 0 R\n/Resources << /ProcSet [/PDF /Text]\n/Font <<\n/R6 6 0 R\n>>\n>>\n/Contents 8 0 R\n>>",
    );
    let dict = value.as_dict().expect("dictionary");
    assert_eq!(dict.len(), 5);
    assert_eq!(
        dict.get(b"/Type"),
        Some(&PdfValue::Name(b"/Page".to_vec()))
    );
    assert_eq!(
        dict.get(b"/MediaBox"),
        Some(&PdfValue::Array(vec![
            PdfValue::Integer(0),
            PdfValue::Integer(0),
            PdfValue::Integer(612),
            PdfValue::Integer(792),
        ]))
    );
    assert_eq!(
        dict.get(b"/Parent"),
        Some(&PdfValue::Reference(ObjRef(2, 0)))
    );
    let resources = dict.get(b"/Resources").unwrap().as_dict().unwrap();
    let fonts = resources.get(b"/Font").unwrap().as_dict().unwrap();
    assert_eq!(
        fonts.get(b"/R6"),
        Some(&PdfValue::Reference(ObjRef(6, 0)))
    );
    assert_eq!(
        dict.get(b"/Contents"),
        Some(&PdfValue::Reference(ObjRef(8, 0)))
    );
}

#[test]
fn length_as_indirect_reference() {
    let value = parse(b"<< /Length 3 0 R /Filter /FlateDecode >>");
    let dict = value.as_dict().expect("dictionary");
    assert_eq!(dict.len(), 2);
    assert_eq!(
        dict.get(b"/Length"),
        Some(&PdfValue::Reference(ObjRef(3, 0)))
    );
    assert_eq!(
        dict.get(b"/Filter"),
        Some(&PdfValue::Name(b"/FlateDecode".to_vec()))
    );
}

#[test]
fn booleans_and_null() {
    let value = parse(b"[true false null]");
    assert_eq!(
        value,
        PdfValue::Array(vec![
            PdfValue::Boolean(true),
            PdfValue::Boolean(false),
            PdfValue::Null,
        ])
    );
}

#[test]
fn numbers_keep_their_kind() {
    let value = parse(b"[1 -2 0.5]");
    assert_eq!(
        value,
        PdfValue::Array(vec![
            PdfValue::Integer(1),
            PdfValue::Integer(-2),
            PdfValue::Real(0.5),
        ])
    );
}

#[test]
fn nested_arrays() {
    let value = parse(b"[[1 2] [3]]");
    assert_eq!(
        value,
        PdfValue::Array(vec![
            PdfValue::Array(vec![PdfValue::Integer(1), PdfValue::Integer(2)]),
            PdfValue::Array(vec![PdfValue::Integer(3)]),
        ])
    );
}

#[test]
fn top_level_literal() {
    assert_eq!(parse(b"42 "), PdfValue::Integer(42));
    assert_eq!(parse(b"(hi)"), PdfValue::String(b"hi".to_vec()));
    assert_eq!(parse(b"/Name "), PdfValue::Name(b"/Name".to_vec()));
}

#[test]
fn references_inside_arrays() {
    let value = parse(b"[1 0 R 2 0 R]");
    assert_eq!(
        value,
        PdfValue::Array(vec![
            PdfValue::Reference(ObjRef(1, 0)),
            PdfValue::Reference(ObjRef(2, 0)),
        ])
    );
}

#[test]
fn canonical_serialization_round_trips() {
    let sources: &[&[u8]] = &[
        b"<< /Type /Page /MediaBox [0 0 612 792] /Parent 2 0 R >>",
        b"[(with (nested) parens) /Foo#20Bar 1 -2 0.5 true false null]",
        b"<< /Kids [3 0 R 4 0 R] /Leading 13.75 >>",
    ];
    for source in sources {
        let value = parse(source);
        let mut canonical = Vec::new();
        value.write_canonical(&mut canonical);
        assert_eq!(parse(&canonical), value);
    }
}

#[test]
fn odd_dictionary_entry_count_is_an_error() {
    parse_err(b"<< /Key >>");
}

#[test]
fn non_name_key_is_an_error() {
    parse_err(b"<< (key) 1 >>");
}

#[test]
fn reference_needs_two_numbers() {
    parse_err(b"[/NotANumber 0 R]");
}

#[test]
fn stray_keyword_is_an_error() {
    parse_err(b"[1 2 endobj]");
}
