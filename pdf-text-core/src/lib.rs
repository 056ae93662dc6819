pub mod content;
pub mod document;
pub mod encodings;
pub mod error;
pub mod extract;
pub mod fonts;
pub mod objects;
pub mod parser;
pub mod security;
pub mod source;
pub mod tokenizer;

pub use document::{Document, XrefEntry};
pub use error::PdfError;
pub use extract::{extract_elements, page_text, PageText, TextElement, TextRun};
pub use fonts::Font;
pub use objects::{Indirect, ObjRef, PdfDict, PdfValue, StreamObject};
