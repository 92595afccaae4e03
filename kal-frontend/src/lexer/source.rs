//! Character suppliers for the lexer
//!
//! The lexer pulls one character at a time and never looks further than a
//! single character ahead, so any source that can hand out characters on
//! demand (a string, stdin, a file) can drive it.

use log::warn;
use std::io::{BufReader, Bytes, Read};

/// Pluggable "next character" supplier.
///
/// `None` signals end of stream and must keep being returned once reached.
pub trait CharSource {
    fn next_char(&mut self) -> Option<char>;
}

impl<T: CharSource + ?Sized> CharSource for Box<T> {
    fn next_char(&mut self) -> Option<char> {
        (**self).next_char()
    }
}

/// In-memory source
#[derive(Debug, Clone)]
pub struct StrSource {
    chars: Vec<char>,
    position: usize,
}

impl StrSource {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
        }
    }
}

impl CharSource for StrSource {
    fn next_char(&mut self) -> Option<char> {
        let ch = self.chars.get(self.position).copied();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }
}

/// Byte-stream source (stdin, files). Each byte is one character.
pub struct ReaderSource<R: Read> {
    bytes: Bytes<BufReader<R>>,
    exhausted: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            exhausted: false,
        }
    }
}

impl<R: Read> CharSource for ReaderSource<R> {
    fn next_char(&mut self) -> Option<char> {
        if self.exhausted {
            return None;
        }

        match self.bytes.next() {
            Some(Ok(byte)) => Some(byte as char),
            Some(Err(err)) => {
                warn!("read error on character source, treating as end of input: {err}");
                self.exhausted = true;
                None
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    #[test]
    fn test_str_source_repeats_end_of_stream() {
        let mut source = StrSource::new("ab");
        assert_eq!(source.next_char(), Some('a'));
        assert_eq!(source.next_char(), Some('b'));
        assert_eq!(source.next_char(), None);
        assert_eq!(source.next_char(), None);
    }

    #[test]
    fn test_reader_source() {
        let mut source = ReaderSource::new(Cursor::new(b"x;".to_vec()));
        assert_eq!(source.next_char(), Some('x'));
        assert_eq!(source.next_char(), Some(';'));
        assert_eq!(source.next_char(), None);
        assert_eq!(source.next_char(), None);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_reader_error_is_end_of_stream() {
        let mut source = ReaderSource::new(FailingReader);
        assert_eq!(source.next_char(), None);
        assert_eq!(source.next_char(), None);
    }
}
