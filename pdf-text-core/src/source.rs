use std::io::{Read, Seek, SeekFrom};

use crate::error::PdfError;

/// Chunk size for the backward line scanner.
const REVERSE_CHUNK: usize = 64;

/// Random-access byte reader over anything `Read + Seek`.
///
/// All higher layers go through this wrapper: the trailer scanner reads it
/// backwards, the tokenizer pulls single bytes, and the document layer
/// seeks around it to dereference indirect objects, restoring the position
/// afterwards so callers never observe clobbering.
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: R,
}

impl<R: Read + Seek> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        ByteSource { inner }
    }

    /// Read up to `n` bytes. Returns fewer at end of input.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>, PdfError> {
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            let got = self.inner.read(&mut buf[filled..])?;
            if got == 0 {
                break;
            }
            filled += got;
        }
        buf.truncate(filled);
        Ok(buf)
    }

    /// Read a single byte, or `None` at end of input.
    pub fn read_byte(&mut self) -> Result<Option<u8>, PdfError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, PdfError> {
        Ok(self.inner.seek(pos)?)
    }

    pub fn tell(&mut self) -> Result<u64, PdfError> {
        Ok(self.inner.stream_position()?)
    }

    /// Read bytes until LF, CR, or CRLF, stripping the terminator.
    ///
    /// A lone CR terminates the line; the byte after it stays unread.
    pub fn read_line(&mut self) -> Result<Vec<u8>, PdfError> {
        let mut line = Vec::new();
        while let Some(b) = self.read_byte()? {
            match b {
                b'\n' => break,
                b'\r' => {
                    match self.read_byte()? {
                        Some(b'\n') | None => {}
                        Some(_) => {
                            self.seek(SeekFrom::Current(-1))?;
                        }
                    }
                    break;
                }
                _ => line.push(b),
            }
        }
        Ok(line)
    }

    /// Read a keyword line (`endobj`, `endstream`, `stream`), tolerating
    /// one stray blank line before it. Surrounding whitespace is trimmed.
    pub fn read_keyword_line(&mut self) -> Result<Vec<u8>, PdfError> {
        let line = trim_ascii(&self.read_line()?).to_vec();
        if line.is_empty() {
            return Ok(trim_ascii(&self.read_line()?).to_vec());
        }
        Ok(line)
    }

    /// Scan the file from the end toward the start, one line at a time.
    ///
    /// Adjacent end-of-line markers yield empty lines, so callers can skip
    /// blank trailing lines explicitly.
    pub fn reverse_lines(&mut self) -> Result<ReverseLines<'_, R>, PdfError> {
        let pos = self.seek(SeekFrom::End(0))?;
        Ok(ReverseLines {
            source: self,
            pos,
            buf: Vec::new(),
            done: false,
        })
    }
}

/// Return `bytes` without leading or trailing PDF whitespace.
pub fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !is_whitespace(*b))
        .map(|i| i + 1)
        .unwrap_or(start);
    &bytes[start..end]
}

/// PDF whitespace classification (NUL, HT, LF, FF, CR, SP).
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, 0x00 | 0x09 | 0x0a | 0x0c | 0x0d | 0x20)
}

/// Lazy backward line iterator, reading fixed-size chunks from the end.
pub struct ReverseLines<'a, R> {
    source: &'a mut ByteSource<R>,
    /// Start of the region not yet pulled into `buf`.
    pos: u64,
    /// Bytes pulled but not yet emitted, in file order.
    buf: Vec<u8>,
    done: bool,
}

impl<R: Read + Seek> ReverseLines<'_, R> {
    /// The next line toward the start of the file, or `None` when exhausted.
    pub fn next_line(&mut self) -> Result<Option<Vec<u8>>, PdfError> {
        loop {
            if let Some(i) = self.rightmost_eol() {
                let line = self.buf[i + 1..].to_vec();
                let crlf = self.buf[i] == b'\n' && i > 0 && self.buf[i - 1] == b'\r';
                self.buf.truncate(if crlf { i - 1 } else { i });
                return Ok(Some(line));
            }
            if self.pos == 0 {
                if self.done {
                    return Ok(None);
                }
                self.done = true;
                return Ok(Some(std::mem::take(&mut self.buf)));
            }
            self.refill()?;
        }
    }

    /// Index of the rightmost EOL byte in `buf`, or `None` if more input is
    /// needed (no EOL, or an LF at the start that may pair with a CR in the
    /// previous chunk).
    fn rightmost_eol(&self) -> Option<usize> {
        let i = self.buf.iter().rposition(|b| *b == b'\n' || *b == b'\r')?;
        if i == 0 && self.buf[0] == b'\n' && self.pos > 0 {
            return None;
        }
        Some(i)
    }

    fn refill(&mut self) -> Result<(), PdfError> {
        let n = REVERSE_CHUNK.min(self.pos as usize);
        self.pos -= n as u64;
        self.source.seek(SeekFrom::Start(self.pos))?;
        let mut chunk = self.source.read(n)?;
        if chunk.len() < n {
            return Err(PdfError::UnexpectedEof);
        }
        chunk.extend_from_slice(&self.buf);
        self.buf = chunk;
        Ok(())
    }
}

// ── Single-byte feeds with pushback ───────────────────────────────────────────

/// One byte at a time, for the tokenizer. Implemented by the byte source
/// itself and by decoded stream feeds.
pub trait ByteFeed {
    fn next_raw(&mut self) -> Result<Option<u8>, PdfError>;
}

impl<R: Read + Seek> ByteFeed for ByteSource<R> {
    fn next_raw(&mut self) -> Result<Option<u8>, PdfError> {
        self.read_byte()
    }
}

impl<F: ByteFeed> ByteFeed for &mut F {
    fn next_raw(&mut self) -> Result<Option<u8>, PdfError> {
        (**self).next_raw()
    }
}

/// One-byte pushback adapter over a [`ByteFeed`].
///
/// At most one byte of pushback: two consecutive `unget` calls without an
/// intervening read are a no-op, as is `unget` before the first read.
pub struct Pushback<F> {
    feed: F,
    prev: Option<u8>,
    ungot: bool,
}

impl<F: ByteFeed> Pushback<F> {
    pub fn new(feed: F) -> Self {
        Pushback {
            feed,
            prev: None,
            ungot: false,
        }
    }

    pub fn next_byte(&mut self) -> Result<Option<u8>, PdfError> {
        if self.ungot {
            self.ungot = false;
            return Ok(self.prev);
        }
        let b = self.feed.next_raw()?;
        if b.is_some() {
            self.prev = b;
        }
        Ok(b)
    }

    /// Make the next read return the last byte again.
    pub fn unget(&mut self) {
        if self.prev.is_some() && !self.ungot {
            self.ungot = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(bytes: &[u8]) -> ByteSource<Cursor<Vec<u8>>> {
        ByteSource::new(Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn pushback_replays_one_byte() {
        let mut pb = Pushback::new(source(b"foo bar baz"));
        pb.unget(); // before any read: no-op
        assert_eq!(pb.next_byte().unwrap(), Some(b'f'));
        assert_eq!(pb.next_byte().unwrap(), Some(b'o'));
        assert_eq!(pb.next_byte().unwrap(), Some(b'o'));
        assert_eq!(pb.next_byte().unwrap(), Some(b' '));
        pb.unget();
        pb.unget(); // second unget is a no-op
        assert_eq!(pb.next_byte().unwrap(), Some(b' '));
        assert_eq!(pb.next_byte().unwrap(), Some(b'b'));
    }

    #[test]
    fn pushback_after_eof_replays_last_byte() {
        let mut pb = Pushback::new(source(b"z"));
        assert_eq!(pb.next_byte().unwrap(), Some(b'z'));
        assert_eq!(pb.next_byte().unwrap(), None);
        pb.unget();
        assert_eq!(pb.next_byte().unwrap(), Some(b'z'));
    }

    #[test]
    fn read_line_strips_each_terminator() {
        let mut s = source(b"one\ntwo\r\nthree\rfour");
        assert_eq!(s.read_line().unwrap(), b"one");
        assert_eq!(s.read_line().unwrap(), b"two");
        assert_eq!(s.read_line().unwrap(), b"three");
        assert_eq!(s.read_line().unwrap(), b"four");
    }

    #[test]
    fn keyword_line_tolerates_one_blank() {
        let mut s = source(b"\nendstream\n");
        assert_eq!(s.read_keyword_line().unwrap(), b"endstream");
    }

    #[test]
    fn reverse_lines_from_end() {
        let mut s = source(b"first\nsecond\r\nthird\n");
        let mut it = s.reverse_lines().unwrap();
        assert_eq!(it.next_line().unwrap(), Some(b"".to_vec()));
        assert_eq!(it.next_line().unwrap(), Some(b"third".to_vec()));
        assert_eq!(it.next_line().unwrap(), Some(b"second".to_vec()));
        assert_eq!(it.next_line().unwrap(), Some(b"first".to_vec()));
        assert_eq!(it.next_line().unwrap(), None);
    }

    #[test]
    fn reverse_lines_yields_empty_for_adjacent_eols() {
        let mut s = source(b"a\n\n");
        let mut it = s.reverse_lines().unwrap();
        assert_eq!(it.next_line().unwrap(), Some(b"".to_vec()));
        assert_eq!(it.next_line().unwrap(), Some(b"".to_vec()));
        assert_eq!(it.next_line().unwrap(), Some(b"a".to_vec()));
        assert_eq!(it.next_line().unwrap(), None);
    }

    #[test]
    fn reverse_lines_handles_crlf_across_chunks() {
        // 128 bytes total: the LF lands at the start of the first backward
        // chunk and its CR at the end of the second.
        let mut data = vec![b'x'; 63];
        data.extend_from_slice(b"\r\n");
        data.extend_from_slice(&vec![b'y'; 63]);
        assert_eq!(data.len(), 128);
        let mut s = source(&data);
        let mut it = s.reverse_lines().unwrap();
        assert_eq!(it.next_line().unwrap(), Some(vec![b'y'; 63]));
        assert_eq!(it.next_line().unwrap(), Some(vec![b'x'; 63]));
        assert_eq!(it.next_line().unwrap(), None);
    }
}
