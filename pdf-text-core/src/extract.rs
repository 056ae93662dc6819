use std::collections::{HashMap, VecDeque};
use std::io::{Read, Seek};
use std::rc::Rc;

use crate::content::{ContentInterpreter, Operation, TextMatrix};
use crate::document::{Document, StreamFeed};
use crate::error::PdfError;
use crate::fonts::Font;
use crate::objects::PdfDict;

/// One element of the extraction output stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TextElement {
    /// A page boundary; emitted before the page's first run.
    NewPage,
    /// A block separator: the next run is not a continuation of the last.
    NewText,
    Text(TextRun),
}

/// A positioned glyph run in the page's text space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub s: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    /// The font's space-glyph width, in thousandths of an em.
    pub font_space_width: f64,
}

/// Text-state parameters plus the two matrices the text operators drive.
struct TextState {
    leading: f64,
    font_size: f64,
    horizontal_scaling: f64,
    /// Tracked but not yet applied to emitted positions.
    #[allow(dead_code)]
    rise: f64,
    char_space: f64,
    word_space: f64,
    tm: TextMatrix,
    tlm: TextMatrix,
    last_x: Option<f64>,
    last_y: Option<f64>,
}

impl TextState {
    fn new() -> Self {
        TextState {
            leading: 0.0,
            font_size: 0.0,
            horizontal_scaling: 100.0,
            rise: 0.0,
            char_space: 0.0,
            word_space: 0.0,
            tm: TextMatrix::identity(),
            tlm: TextMatrix::identity(),
            last_x: None,
            last_y: None,
        }
    }

    fn begin_text(&mut self) {
        self.tm = TextMatrix::identity();
        self.tlm = TextMatrix::identity();
    }

    /// `Tm`: both matrices are rewritten.
    fn set_text_matrix(&mut self, m: TextMatrix) {
        self.tlm = m;
        self.tm = self.tlm;
    }

    /// Line-advancing operators shift `Tlm` and copy it into `Tm`.
    fn move_new_line(&mut self, tx: f64, ty: f64) {
        self.tlm.shift(tx, ty);
        self.tm = self.tlm;
    }
}

/// Lazily interprets one page's content stream into text elements.
///
/// The page's fonts are bound before interpretation starts, so decoding
/// needs no document access while the source is lent to the stream feed.
pub struct PageText<'a, R: Read + Seek> {
    interpreter: ContentInterpreter<StreamFeed<'a, R>>,
    fonts: HashMap<Vec<u8>, Rc<Font>>,
    state: TextState,
    font: Rc<Font>,
    started: bool,
    pending: VecDeque<TextElement>,
}

/// Begin extracting one page. Yields `NewPage` first, then the page's
/// runs and separators in content-stream order.
pub fn page_text<'a, R: Read + Seek>(
    doc: &'a mut Document<R>,
    page: &PdfDict,
) -> Result<PageText<'a, R>, PdfError> {
    doc.load_page_fonts(page)?;
    let fonts = doc.page_font_table();
    let contents = page
        .get(b"/Contents")
        .cloned()
        .ok_or(PdfError::MalformedPageTree)?;
    let feed = doc.content_feed(&contents)?;
    Ok(PageText {
        interpreter: ContentInterpreter::new(feed),
        fonts,
        state: TextState::new(),
        font: Rc::new(Font::standard()),
        started: false,
        pending: VecDeque::new(),
    })
}

/// Extract every page of the document into one element list.
pub fn extract_elements<R: Read + Seek>(
    doc: &mut Document<R>,
) -> Result<Vec<TextElement>, PdfError> {
    let pages = doc.pages()?;
    let mut elements = Vec::new();
    for page in &pages {
        let mut page_elements = page_text(doc, page)?;
        while let Some(element) = page_elements.next_element()? {
            elements.push(element);
        }
    }
    Ok(elements)
}

impl<R: Read + Seek> PageText<'_, R> {
    /// The next text element, or `None` when the page is done.
    pub fn next_element(&mut self) -> Result<Option<TextElement>, PdfError> {
        if !self.started {
            self.started = true;
            return Ok(Some(TextElement::NewPage));
        }
        loop {
            if let Some(element) = self.pending.pop_front() {
                return Ok(Some(element));
            }
            let operation = match self.interpreter.next_operation()? {
                Some(op) => op,
                None => return Ok(None),
            };
            self.apply(operation);
        }
    }

    fn apply(&mut self, operation: Operation) {
        match operation {
            Operation::SetFont(name, size) => {
                self.font = self
                    .fonts
                    .get(&name)
                    .cloned()
                    .unwrap_or_else(|| Rc::new(Font::standard()));
                self.state.font_size = size;
            }
            Operation::BeginText => self.state.begin_text(),
            Operation::EndText => {}
            Operation::SetTextMatrix(m) => self.state.set_text_matrix(m),
            Operation::MoveStartNextLine(tx, ty) => self.state.move_new_line(tx, ty),
            Operation::MoveStartNextLineNoParams => {
                let leading = self.state.leading;
                self.state.move_new_line(0.0, -leading);
            }
            Operation::SetTextLeading(v) => self.state.leading = v,
            Operation::SetCharSpace(v) => self.state.char_space = v,
            Operation::SetWordSpace(v) => self.state.word_space = v,
            Operation::SetHorizScaling(v) => self.state.horizontal_scaling = v,
            Operation::SetTextRise(v) => self.state.rise = v,
            Operation::UpdateTextMatrix(shift) => {
                self.state.tm.shift(-shift / 1000.0, 0.0);
            }
            Operation::ShowTextString(bytes) => self.show(&bytes),
            // The CTM is tracked by the content stream but not composed
            // into text emission; positions stay in text space.
            Operation::SaveGraphicsState
            | Operation::RestoreGraphicsState
            | Operation::ModifyCtm(_) => {
                log::debug!("ignoring graphics-state operation {:?}", operation)
            }
        }
    }

    /// Decode, measure, emit. `Tm` advances by the run's width afterwards.
    fn show(&mut self, bytes: &[u8]) {
        let codes = self.font.codes(bytes);
        let text: String = codes
            .iter()
            .map(|code| self.font.decode_code(*code))
            .collect();

        let x = self.state.tm.e;
        let y = self.state.tm.f;
        let font_size = self.state.font_size * self.state.tm.a;
        let space_width = self.font.space_width();
        let width = self.shown_width(&codes);

        if let (Some(last_x), Some(last_y)) = (self.state.last_x, self.state.last_y) {
            let delta_y = y - last_y;
            if delta_y.abs() > font_size {
                self.pending.push_back(TextElement::NewText);
            } else if font_size != 0.0 {
                let gap = (x - last_x) * 1000.0 / font_size;
                if space_width > 0.0 && gap > space_width {
                    self.pending.push_back(TextElement::NewText);
                }
            }
        }

        self.state.tm.shift(width / 1000.0, 0.0);
        self.state.last_x = Some(self.state.tm.e);
        self.state.last_y = Some(self.state.tm.f);

        self.pending.push_back(TextElement::Text(TextRun {
            s: text,
            x,
            y,
            width: self.state.tm.e - x,
            height: 0.0,
            font_size,
            font_space_width: space_width,
        }));
    }

    /// Width of a shown string in text space:
    /// `(Σ glyph widths + Tc·(n−1)·1000 + Tw·spaces·1000) · Th / 100`.
    fn shown_width(&self, codes: &[u32]) -> f64 {
        if codes.is_empty() {
            return 0.0;
        }
        let glyphs: f64 = codes.iter().map(|c| self.font.width_of_code(*c)).sum();
        let space_count = codes.iter().filter(|c| **c == 0x20).count();
        (glyphs
            + self.state.char_space * (codes.len() - 1) as f64 * 1000.0
            + self.state.word_space * space_count as f64 * 1000.0)
            * (self.state.horizontal_scaling / 100.0)
    }
}
