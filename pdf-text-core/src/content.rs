use std::collections::VecDeque;

use crate::error::PdfError;
use crate::source::ByteFeed;
use crate::tokenizer::{Token, Tokenizer};

/// 3×3 affine matrix stored as six scalars, representing the rows
/// `[a b 0; c d 0; e f 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl TextMatrix {
    pub fn identity() -> Self {
        TextMatrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        TextMatrix { a, b, c, d, e, f }
    }

    /// Row-vector matrix product `self × other`.
    pub fn multiply(&self, other: &TextMatrix) -> TextMatrix {
        TextMatrix::new(
            self.a * other.a + self.b * other.c,
            self.a * other.b + self.b * other.d,
            self.c * other.a + self.d * other.c,
            self.c * other.b + self.d * other.d,
            self.e * other.a + self.f * other.c + other.e,
            self.e * other.b + self.f * other.d + other.f,
        )
    }

    /// Translate by `(w, h)` in the matrix's own coordinate system.
    pub fn shift(&mut self, w: f64, h: f64) {
        self.e += w * self.a + h * self.c;
        self.f += w * self.b + h * self.d;
    }
}

/// One decoded content-stream instruction, ready for the text-state
/// machine. Path and colour operators never reach this level; they are
/// accepted and discarded by the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    SaveGraphicsState,
    RestoreGraphicsState,
    ModifyCtm(TextMatrix),
    SetFont(Vec<u8>, f64),
    BeginText,
    EndText,
    SetTextMatrix(TextMatrix),
    MoveStartNextLine(f64, f64),
    MoveStartNextLineNoParams,
    SetTextLeading(f64),
    SetCharSpace(f64),
    SetWordSpace(f64),
    SetHorizScaling(f64),
    SetTextRise(f64),
    ShowTextString(Vec<u8>),
    /// A positioning number from a TJ array, in thousandths of text space.
    UpdateTextMatrix(f64),
}

/// Operand shape of one operator mnemonic. A single builder function
/// consumes these descriptors; there is no per-operator type.
#[derive(Debug, Clone, Copy, PartialEq)]
enum OperatorKind {
    SaveState,
    RestoreState,
    ModifyCtm,
    BeginText,
    EndText,
    NextLine,
    NextLineLeading,
    NextLineBare,
    SetMatrix,
    Show,
    ShowNextLine,
    ShowNextLineSpacing,
    ShowArray,
    CharSpace,
    WordSpace,
    HorizScaling,
    Leading,
    Font,
    Rise,
    /// Recognised but irrelevant for text extraction.
    Discard,
}

/// The operator table, keyed by mnemonic bytes.
fn operator_kind(mnemonic: &[u8]) -> Option<OperatorKind> {
    use OperatorKind::*;
    Some(match mnemonic {
        // Graphics state
        b"q" => SaveState,
        b"Q" => RestoreState,
        b"cm" => ModifyCtm,
        // Text objects
        b"BT" => BeginText,
        b"ET" => EndText,
        // Text positioning
        b"Td" => NextLine,
        b"TD" => NextLineLeading,
        b"Tm" => SetMatrix,
        b"T*" => NextLineBare,
        // Text showing
        b"Tj" => Show,
        b"'" => ShowNextLine,
        b"\"" => ShowNextLineSpacing,
        b"TJ" => ShowArray,
        // Text state
        b"Tc" => CharSpace,
        b"Tw" => WordSpace,
        b"Tz" => HorizScaling,
        b"TL" => Leading,
        b"Tf" => Font,
        b"Tr" => Discard,
        b"Ts" => Rise,
        // Graphics state details, paths, painting, clipping, colour,
        // shading, inline images, XObjects, marked content, compatibility.
        b"w" | b"J" | b"j" | b"M" | b"d" | b"ri" | b"i" | b"gs" | b"m" | b"l"
        | b"c" | b"v" | b"y" | b"h" | b"re" | b"S" | b"s" | b"f" | b"F"
        | b"f*" | b"B" | b"B*" | b"b" | b"b*" | b"n" | b"W" | b"W*" | b"CS"
        | b"cs" | b"SC" | b"SCN" | b"sc" | b"scn" | b"G" | b"g" | b"RG"
        | b"rg" | b"K" | b"k" | b"sh" | b"BI" | b"ID" | b"EI" | b"Do"
        | b"MP" | b"DP" | b"BMC" | b"BDC" | b"EMC" | b"BX" | b"EX" => Discard,
        _ => return None,
    })
}

/// Operands accumulated between operators. Underflow and type mismatches
/// are warnings: the operation is skipped and the queue cleared.
struct OperandQueue {
    items: VecDeque<Token>,
}

impl OperandQueue {
    fn new() -> Self {
        OperandQueue {
            items: VecDeque::new(),
        }
    }

    fn push(&mut self, token: Token) {
        self.items.push_back(token);
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn shift(&mut self) -> Option<Token> {
        let token = self.items.pop_front();
        if token.is_none() {
            log::warn!("operand queue underflow");
        }
        token
    }

    fn shift_num(&mut self) -> Option<f64> {
        match self.shift()? {
            Token::Number(n) => Some(n.as_f64()),
            other => {
                log::warn!("expected number operand, was {:?}", other);
                None
            }
        }
    }

    fn shift_name(&mut self) -> Option<Vec<u8>> {
        match self.shift()? {
            Token::Name(bytes) => Some(bytes),
            other => {
                log::warn!("expected name operand, was {:?}", other);
                None
            }
        }
    }

    fn shift_string(&mut self) -> Option<Vec<u8>> {
        match self.shift()? {
            Token::String(bytes) => Some(bytes),
            other => {
                log::warn!("expected string operand, was {:?}", other);
                None
            }
        }
    }

    fn shift_nums<const N: usize>(&mut self) -> Option<[f64; N]> {
        let mut out = [0.0; N];
        for slot in &mut out {
            *slot = self.shift_num()?;
        }
        Some(out)
    }

    /// The tokens between a balanced `[` … `]` pair.
    fn shift_array(&mut self) -> Option<Vec<Token>> {
        match self.shift()? {
            Token::OpenArray => {}
            other => {
                log::warn!("expected array operand, was {:?}", other);
                return None;
            }
        }
        let mut items = Vec::new();
        loop {
            match self.shift()? {
                Token::CloseArray => return Some(items),
                token => items.push(token),
            }
        }
    }
}

/// Executes the content-stream token stream: non-word tokens queue as
/// operands; a word token looks up its descriptor and yields zero or more
/// operations. Unknown mnemonics are logged and skipped.
pub struct ContentInterpreter<F: ByteFeed> {
    tokenizer: Tokenizer<F>,
    queue: OperandQueue,
    pending: VecDeque<Operation>,
}

impl<F: ByteFeed> ContentInterpreter<F> {
    pub fn new(feed: F) -> Self {
        ContentInterpreter {
            tokenizer: Tokenizer::new(feed),
            queue: OperandQueue::new(),
            pending: VecDeque::new(),
        }
    }

    /// The next operation, or `None` when the stream ends.
    pub fn next_operation(&mut self) -> Result<Option<Operation>, PdfError> {
        loop {
            if let Some(op) = self.pending.pop_front() {
                return Ok(Some(op));
            }
            let token = match self.tokenizer.next_token()? {
                Some(token) => token,
                None => return Ok(None),
            };
            match token {
                Token::Word(word) => {
                    self.apply_operator(&word);
                    self.queue.clear();
                }
                other => self.queue.push(other),
            }
        }
    }

    fn apply_operator(&mut self, mnemonic: &[u8]) {
        use OperatorKind::*;
        let kind = match operator_kind(mnemonic) {
            Some(kind) => kind,
            None => {
                log::warn!(
                    "unknown content operator {}",
                    String::from_utf8_lossy(mnemonic)
                );
                return;
            }
        };
        let queue = &mut self.queue;
        match kind {
            SaveState => self.pending.push_back(Operation::SaveGraphicsState),
            RestoreState => self.pending.push_back(Operation::RestoreGraphicsState),
            BeginText => self.pending.push_back(Operation::BeginText),
            EndText => self.pending.push_back(Operation::EndText),
            NextLineBare => self
                .pending
                .push_back(Operation::MoveStartNextLineNoParams),
            ModifyCtm => {
                if let Some([a, b, c, d, e, f]) = queue.shift_nums::<6>() {
                    self.pending
                        .push_back(Operation::ModifyCtm(TextMatrix::new(a, b, c, d, e, f)));
                }
            }
            SetMatrix => {
                if let Some([a, b, c, d, e, f]) = queue.shift_nums::<6>() {
                    self.pending.push_back(Operation::SetTextMatrix(
                        TextMatrix::new(a, b, c, d, e, f),
                    ));
                }
            }
            NextLine => {
                if let Some([tx, ty]) = queue.shift_nums::<2>() {
                    self.pending
                        .push_back(Operation::MoveStartNextLine(tx, ty));
                }
            }
            NextLineLeading => {
                if let Some([tx, ty]) = queue.shift_nums::<2>() {
                    self.pending.push_back(Operation::SetTextLeading(-ty));
                    self.pending
                        .push_back(Operation::MoveStartNextLine(tx, ty));
                }
            }
            Show => {
                if let Some(bytes) = queue.shift_string() {
                    self.pending.push_back(Operation::ShowTextString(bytes));
                }
            }
            ShowNextLine => {
                if let Some(bytes) = queue.shift_string() {
                    self.pending
                        .push_back(Operation::MoveStartNextLineNoParams);
                    self.pending.push_back(Operation::ShowTextString(bytes));
                }
            }
            ShowNextLineSpacing => {
                if let (Some(aw), Some(ac), Some(bytes)) = (
                    queue.shift_num(),
                    queue.shift_num(),
                    queue.shift_string(),
                ) {
                    self.pending.push_back(Operation::SetWordSpace(aw));
                    self.pending.push_back(Operation::SetCharSpace(ac));
                    self.pending
                        .push_back(Operation::MoveStartNextLineNoParams);
                    self.pending.push_back(Operation::ShowTextString(bytes));
                }
            }
            ShowArray => {
                if let Some(items) = queue.shift_array() {
                    for item in items {
                        match item {
                            Token::String(bytes) => self
                                .pending
                                .push_back(Operation::ShowTextString(bytes)),
                            Token::Number(n) => self
                                .pending
                                .push_back(Operation::UpdateTextMatrix(n.as_f64())),
                            other => {
                                log::warn!("unexpected TJ array element {:?}", other)
                            }
                        }
                    }
                }
            }
            CharSpace => {
                if let Some(v) = queue.shift_num() {
                    self.pending.push_back(Operation::SetCharSpace(v));
                }
            }
            WordSpace => {
                if let Some(v) = queue.shift_num() {
                    self.pending.push_back(Operation::SetWordSpace(v));
                }
            }
            HorizScaling => {
                if let Some(v) = queue.shift_num() {
                    self.pending.push_back(Operation::SetHorizScaling(v));
                }
            }
            Leading => {
                if let Some(v) = queue.shift_num() {
                    self.pending.push_back(Operation::SetTextLeading(v));
                }
            }
            Rise => {
                if let Some(v) = queue.shift_num() {
                    self.pending.push_back(Operation::SetTextRise(v));
                }
            }
            Font => {
                if let (Some(name), Some(size)) =
                    (queue.shift_name(), queue.shift_num())
                {
                    self.pending.push_back(Operation::SetFont(name, size));
                }
            }
            Discard => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_shift_is_translation() {
        let mut m = TextMatrix::identity();
        m.shift(100.0, 700.0);
        assert_eq!(m.e, 100.0);
        assert_eq!(m.f, 700.0);
    }

    #[test]
    fn shift_follows_local_axes() {
        let mut m = TextMatrix::new(2.0, 0.0, 0.0, 3.0, 10.0, 20.0);
        m.shift(5.0, 7.0);
        assert_eq!(m.e, 10.0 + 5.0 * 2.0);
        assert_eq!(m.f, 20.0 + 7.0 * 3.0);
    }

    #[test]
    fn multiply_composes_translations() {
        let a = TextMatrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 0.0);
        let b = TextMatrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 5.0);
        let m = a.multiply(&b);
        assert_eq!((m.e, m.f), (10.0, 5.0));
    }

    #[test]
    fn operator_table_covers_discarded_ops() {
        assert_eq!(operator_kind(b"re"), Some(OperatorKind::Discard));
        assert_eq!(operator_kind(b"scn"), Some(OperatorKind::Discard));
        assert_eq!(operator_kind(b"Tj"), Some(OperatorKind::Show));
        assert_eq!(operator_kind(b"zz"), None);
    }
}
