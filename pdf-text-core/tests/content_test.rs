use std::io::Cursor;

use pdf_text_core::content::{ContentInterpreter, Operation, TextMatrix};
use pdf_text_core::source::ByteSource;

fn operations(input: &[u8]) -> Vec<Operation> {
    let mut interpreter =
        ContentInterpreter::new(ByteSource::new(Cursor::new(input.to_vec())));
    let mut out = Vec::new();
    while let Some(op) = interpreter.next_operation().unwrap() {
        out.push(op);
    }
    out
}

#[test]
fn simple_text_block() {
    let ops = operations(b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET");
    assert_eq!(
        ops,
        vec![
            Operation::BeginText,
            Operation::SetFont(b"/F1".to_vec(), 12.0),
            Operation::MoveStartNextLine(100.0, 700.0),
            Operation::ShowTextString(b"Hello".to_vec()),
            Operation::EndText,
        ]
    );
}

#[test]
fn td_with_leading_expands_to_two_operations() {
    let ops = operations(b"10 -14 TD");
    assert_eq!(
        ops,
        vec![
            Operation::SetTextLeading(14.0),
            Operation::MoveStartNextLine(10.0, -14.0),
        ]
    );
}

#[test]
fn tm_sets_the_text_matrix() {
    let ops = operations(b"2 0 0 2 50 60 Tm");
    assert_eq!(
        ops,
        vec![Operation::SetTextMatrix(TextMatrix::new(
            2.0, 0.0, 0.0, 2.0, 50.0, 60.0
        ))]
    );
}

#[test]
fn tj_array_interleaves_shows_and_shifts() {
    let ops = operations(b"[(A) -120 (B)] TJ");
    assert_eq!(
        ops,
        vec![
            Operation::ShowTextString(b"A".to_vec()),
            Operation::UpdateTextMatrix(-120.0),
            Operation::ShowTextString(b"B".to_vec()),
        ]
    );
}

#[test]
fn quote_operator_moves_then_shows() {
    let ops = operations(b"(next line) '");
    assert_eq!(
        ops,
        vec![
            Operation::MoveStartNextLineNoParams,
            Operation::ShowTextString(b"next line".to_vec()),
        ]
    );
}

#[test]
fn double_quote_sets_spacing_first() {
    let ops = operations(b"2 3 (line) \"");
    assert_eq!(
        ops,
        vec![
            Operation::SetWordSpace(2.0),
            Operation::SetCharSpace(3.0),
            Operation::MoveStartNextLineNoParams,
            Operation::ShowTextString(b"line".to_vec()),
        ]
    );
}

#[test]
fn text_state_operators() {
    let ops = operations(b"1.5 Tc 2.5 Tw 80 Tz 14 TL 3 Ts");
    assert_eq!(
        ops,
        vec![
            Operation::SetCharSpace(1.5),
            Operation::SetWordSpace(2.5),
            Operation::SetHorizScaling(80.0),
            Operation::SetTextLeading(14.0),
            Operation::SetTextRise(3.0),
        ]
    );
}

#[test]
fn graphics_state_operations_come_through() {
    let ops = operations(b"q 1 0 0 1 10 20 cm Q");
    assert_eq!(
        ops,
        vec![
            Operation::SaveGraphicsState,
            Operation::ModifyCtm(TextMatrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 20.0)),
            Operation::RestoreGraphicsState,
        ]
    );
}

#[test]
fn path_and_colour_operators_are_discarded() {
    let ops = operations(
        b"0.5 w 10 10 m 50 50 l S 1 0 0 rg 10 10 100 100 re f W n (kept) Tj",
    );
    assert_eq!(
        ops,
        vec![Operation::ShowTextString(b"kept".to_vec())]
    );
}

#[test]
fn unknown_operator_is_skipped_and_queue_cleared() {
    // "xyzzy" is not an operator; its operands must not leak into Tj.
    let ops = operations(b"1 2 3 xyzzy (kept) Tj");
    assert_eq!(
        ops,
        vec![Operation::ShowTextString(b"kept".to_vec())]
    );
}

#[test]
fn operand_underflow_skips_the_operation() {
    // Td needs two numbers; one is missing.
    let ops = operations(b"5 Td (kept) Tj");
    assert_eq!(
        ops,
        vec![Operation::ShowTextString(b"kept".to_vec())]
    );
}

#[test]
fn type_mismatch_skips_the_operation() {
    // Tf expects a name and a number.
    let ops = operations(b"(font) 12 Tf (kept) Tj");
    assert_eq!(
        ops,
        vec![Operation::ShowTextString(b"kept".to_vec())]
    );
}

#[test]
fn empty_stream_yields_nothing() {
    assert!(operations(b"").is_empty());
}
