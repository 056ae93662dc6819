use crate::error::PdfError;
use crate::source::{is_whitespace, ByteFeed, Pushback};

/// PDF delimiter characters (terminate names and words).
const DELIMITERS: &[u8] = b"()<>[]{}/%";

/// A lexical token from a PDF byte stream.
///
/// Word tokens are never interpreted here; whether a word means `true`,
/// `endobj`, or a content-stream operator is decided by the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    OpenDict,
    CloseDict,
    OpenArray,
    CloseArray,
    /// Name bytes, including the leading `/`. `#XX` sequences are kept as-is.
    Name(Vec<u8>),
    /// String bytes from a literal or hex string, escapes already decoded.
    String(Vec<u8>),
    Number(NumberToken),
    /// Identifier-like bytes whose meaning is contextual.
    Word(Vec<u8>),
}

/// A numeric token. The source bytes are preserved so the value stays
/// losslessly re-derivable; a `.` in the source makes it a real.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberToken {
    bytes: Vec<u8>,
}

impl NumberToken {
    pub fn new(bytes: Vec<u8>) -> Self {
        NumberToken { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_real(&self) -> bool {
        self.bytes.contains(&b'.')
    }

    pub fn as_f64(&self) -> f64 {
        std::str::from_utf8(&self.bytes)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0)
    }

    pub fn as_i64(&self) -> Option<i64> {
        std::str::from_utf8(&self.bytes)
            .ok()
            .and_then(|s| s.parse().ok())
    }
}

/// Accumulator for a literal string in progress.
#[derive(Default)]
struct StringAccum {
    bytes: Vec<u8>,
    /// Open nested parentheses.
    depth: u32,
    esc: bool,
    /// A `\<CR>` was seen; a following LF belongs to the same continuation.
    esc_cr: bool,
    /// Pending octal digit values (at most three).
    octal: Vec<u8>,
}

/// Tokenizer states. Each state receives one byte, optionally emits one
/// token, and transitions; the whole machine is `step`.
enum State {
    Start,
    Name(Vec<u8>),
    OpenDictOrHex,
    CloseDict,
    HexString(Vec<u8>),
    LiteralString(StringAccum),
    Comment { cr: bool },
    Number { bytes: Vec<u8>, seen_dot: bool },
    Word(Vec<u8>),
}

/// Byte-driven lexer over any [`ByteFeed`], producing a lazy token stream.
pub struct Tokenizer<F: ByteFeed> {
    feed: Pushback<F>,
    state: State,
}

impl<F: ByteFeed> Tokenizer<F> {
    pub fn new(feed: F) -> Self {
        Tokenizer {
            feed: Pushback::new(feed),
            state: State::Start,
        }
    }

    /// The next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, PdfError> {
        loop {
            let byte = match self.feed.next_byte()? {
                Some(b) => b,
                None => return self.flush_at_eof(),
            };
            if let Some(token) = self.step(byte)? {
                return Ok(Some(token));
            }
        }
    }

    /// End of input: names, numbers, and words terminate cleanly; anything
    /// still open (string, hex string, half a `<<`) is a lexical error.
    fn flush_at_eof(&mut self) -> Result<Option<Token>, PdfError> {
        match std::mem::replace(&mut self.state, State::Start) {
            State::Start | State::Comment { .. } => Ok(None),
            State::Name(bytes) => Ok(Some(Token::Name(bytes))),
            State::Number { bytes, .. } => Ok(Some(Token::Number(NumberToken::new(bytes)))),
            State::Word(bytes) => Ok(Some(Token::Word(bytes))),
            State::OpenDictOrHex
            | State::CloseDict
            | State::HexString(_)
            | State::LiteralString(_) => Err(PdfError::UnexpectedEof),
        }
    }

    /// The single transition function of the state machine.
    fn step(&mut self, b: u8) -> Result<Option<Token>, PdfError> {
        match std::mem::replace(&mut self.state, State::Start) {
            State::Start => Ok(self.step_start(b)),
            State::Name(mut bytes) => {
                if DELIMITERS.contains(&b) || is_whitespace(b) {
                    self.feed.unget();
                    Ok(Some(Token::Name(bytes)))
                } else {
                    bytes.push(b);
                    self.state = State::Name(bytes);
                    Ok(None)
                }
            }
            State::OpenDictOrHex => match b {
                b'<' => Ok(Some(Token::OpenDict)),
                b'>' => Ok(Some(Token::String(Vec::new()))),
                _ if b.is_ascii_hexdigit() => {
                    self.state = State::HexString(vec![b]);
                    Ok(None)
                }
                _ => Err(PdfError::Lexical {
                    state: "hex string",
                    byte: b,
                }),
            },
            State::CloseDict => {
                if b == b'>' {
                    Ok(Some(Token::CloseDict))
                } else {
                    Err(PdfError::Lexical {
                        state: "dictionary close",
                        byte: b,
                    })
                }
            }
            State::HexString(mut digits) => {
                if b.is_ascii_hexdigit() {
                    digits.push(b);
                    self.state = State::HexString(digits);
                    Ok(None)
                } else if b == b'>' {
                    Ok(Some(Token::String(decode_hex_digits(&digits))))
                } else {
                    Err(PdfError::Lexical {
                        state: "hex string",
                        byte: b,
                    })
                }
            }
            State::LiteralString(acc) => Ok(self.step_string(acc, b)),
            State::Comment { cr } => {
                match b {
                    b'\n' => {}
                    b'\r' => self.state = State::Comment { cr: true },
                    _ if cr => self.feed.unget(),
                    _ => self.state = State::Comment { cr: false },
                }
                Ok(None)
            }
            State::Number { mut bytes, seen_dot } => {
                if b.is_ascii_digit() || (b == b'.' && !seen_dot) {
                    let seen_dot = seen_dot || b == b'.';
                    bytes.push(b);
                    self.state = State::Number { bytes, seen_dot };
                    Ok(None)
                } else {
                    self.feed.unget();
                    Ok(Some(Token::Number(NumberToken::new(bytes))))
                }
            }
            State::Word(mut bytes) => {
                if b.is_ascii_alphabetic() || b == b'*' {
                    bytes.push(b);
                    self.state = State::Word(bytes);
                    Ok(None)
                } else {
                    self.feed.unget();
                    Ok(Some(Token::Word(bytes)))
                }
            }
        }
    }

    fn step_start(&mut self, b: u8) -> Option<Token> {
        match b {
            b'/' => self.state = State::Name(vec![b'/']),
            b'<' => self.state = State::OpenDictOrHex,
            b'>' => self.state = State::CloseDict,
            b'[' => return Some(Token::OpenArray),
            b']' => return Some(Token::CloseArray),
            b'(' => self.state = State::LiteralString(StringAccum::default()),
            b'%' => self.state = State::Comment { cr: false },
            b'+' | b'-' | b'.' | b'0'..=b'9' => {
                self.state = State::Number {
                    bytes: vec![b],
                    seen_dot: b == b'.',
                }
            }
            _ if is_whitespace(b) => {}
            _ => self.state = State::Word(vec![b]),
        }
        None
    }

    fn step_string(&mut self, mut acc: StringAccum, b: u8) -> Option<Token> {
        if !acc.octal.is_empty() {
            if acc.octal.len() < 3 && (b'0'..=b'7').contains(&b) {
                acc.octal.push(b - b'0');
                self.state = State::LiteralString(acc);
                return None;
            }
            let value = acc.octal.iter().fold(0u32, |v, d| v * 8 + u32::from(*d));
            acc.bytes.push(value as u8);
            acc.octal.clear();
            self.feed.unget();
            self.state = State::LiteralString(acc);
            return None;
        }

        if acc.esc {
            acc.esc = false;
            match b {
                b'b' => acc.bytes.push(0x08),
                b'f' => acc.bytes.push(0x0c),
                b'n' => acc.bytes.push(b'\n'),
                b'r' => acc.bytes.push(b'\r'),
                b't' => acc.bytes.push(b'\t'),
                b'(' | b')' | b'\\' => acc.bytes.push(b),
                b'\r' => acc.esc_cr = true,
                b'\n' => {}
                b'0'..=b'7' => acc.octal.push(b - b'0'),
                _ => {
                    acc.bytes.push(b'\\');
                    acc.bytes.push(b);
                }
            }
            self.state = State::LiteralString(acc);
            return None;
        }

        if acc.esc_cr {
            acc.esc_cr = false;
            if b == b'\n' {
                self.state = State::LiteralString(acc);
                return None;
            }
        }

        match b {
            b'(' => {
                acc.depth += 1;
                acc.bytes.push(b);
            }
            b')' => {
                if acc.depth == 0 {
                    return Some(Token::String(acc.bytes));
                }
                acc.depth -= 1;
                acc.bytes.push(b);
            }
            b'\\' => acc.esc = true,
            _ => acc.bytes.push(b),
        }
        self.state = State::LiteralString(acc);
        None
    }
}

/// Decode hex string digits MSB-first; an odd count is padded with `0`.
fn decode_hex_digits(digits: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(digits.len() / 2 + 1);
    let mut chunks = digits.chunks_exact(2);
    for pair in &mut chunks {
        out.push(hex_value(pair[0]) * 16 + hex_value(pair[1]));
    }
    if let [last] = chunks.remainder() {
        out.push(hex_value(*last) * 16);
    }
    out
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}
