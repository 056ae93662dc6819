use std::io;

/// Errors that can occur while reading or decoding a PDF file.
///
/// Lexical and structural errors abort the current parse; decoding errors
/// are fatal for the current stream only. Dangling indirect references are
/// not errors at all — they resolve to `PdfValue::Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// A byte arrived in a tokenizer state that admits no transition.
    Lexical { state: &'static str, byte: u8 },
    /// The input ended in the middle of a token, object, or keyword.
    UnexpectedEof,
    /// The `%%EOF` marker or the `startxref` offset could not be found.
    StartxrefNotFound,
    /// A cross-reference section is missing or could not be parsed.
    MalformedXref,
    /// The trailer dictionary is missing or lacks a required entry.
    MalformedTrailer(String),
    /// A composite object or an indirect object wrapper has the wrong shape.
    MalformedObject(String),
    /// The page tree structure is invalid (missing /Pages or /Kids).
    MalformedPageTree,
    /// A stream names a filter other than /FlateDecode.
    UnsupportedFilter(String),
    /// The encryption dictionary names a handler or version we cannot decrypt.
    UnsupportedEncryption(String),
    /// A font subtype we cannot decode, in strict mode.
    UnsupportedFontSubtype(String),
    /// The DEFLATE decoder rejected the stream bytes (also surfaces RC4 mis-keys).
    Inflate(String),
    /// An I/O error from the underlying byte source.
    Io(String),
}

impl std::fmt::Display for PdfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PdfError::Lexical { state, byte } => {
                write!(f, "unexpected byte 0x{:02x} in {}", byte, state)
            }
            PdfError::UnexpectedEof => write!(f, "unexpected end of input"),
            PdfError::StartxrefNotFound => write!(f, "startxref not found"),
            PdfError::MalformedXref => write!(f, "malformed or missing xref table"),
            PdfError::MalformedTrailer(msg) => write!(f, "malformed trailer: {}", msg),
            PdfError::MalformedObject(msg) => write!(f, "malformed object: {}", msg),
            PdfError::MalformedPageTree => write!(f, "malformed page tree"),
            PdfError::UnsupportedFilter(name) => {
                write!(f, "unsupported stream filter {}", name)
            }
            PdfError::UnsupportedEncryption(msg) => {
                write!(f, "unsupported encryption: {}", msg)
            }
            PdfError::UnsupportedFontSubtype(name) => {
                write!(f, "unsupported font subtype {}", name)
            }
            PdfError::Inflate(msg) => write!(f, "stream decoding failed: {}", msg),
            PdfError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<io::Error> for PdfError {
    fn from(e: io::Error) -> Self {
        PdfError::Io(e.to_string())
    }
}
