use std::io::{self, BufRead};

pub trait LineReader {
    fn read(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;
}

pub struct DelimReader<R> {
    inner: R,
    delim: u8,
}

impl<R: BufRead> DelimReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            delim: b'\n',
        }
    }
}

impl<R: BufRead> LineReader for DelimReader<R> {
    fn read(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.inner.read_until(self.delim, buf)
    }
}

/// Iterates over the lines of a [`LineReader`] with the trailing `\n`
/// (or `\r\n`) stripped.
pub struct Lines {
    reader: Box<dyn LineReader>,
}

impl Lines {
    pub fn new(reader: Box<dyn LineReader>) -> Self {
        Self { reader }
    }
}

impl std::iter::Iterator for Lines {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read(&mut buf) {
            Ok(0) => None, // EOF
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some(Ok(buf))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
