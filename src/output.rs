use std::{borrow::Cow, io};

/// A cursor-bearing byte sink fed by a renderer.
///
/// Multi-byte writes are big-endian. Sinks come in two flavors: accumulating
/// into a value (`Vec<u8>`) and writing through to an external destination
/// ([`IoWrite`]).
pub trait Output {
    /// Number of bytes written so far.
    fn cursor(&self) -> u64;

    fn write_byte(&mut self, value: u8);

    fn write_double_byte(&mut self, value: u16) {
        self.write_slice(&value.to_be_bytes());
    }

    fn write_quad_byte(&mut self, value: u32) {
        self.write_slice(&value.to_be_bytes());
    }

    fn write_octa_byte(&mut self, value: u64) {
        self.write_slice(&value.to_be_bytes());
    }

    fn write_slice(&mut self, bytes: &[u8]);
}

impl Output for Vec<u8> {
    fn cursor(&self) -> u64 {
        self.len() as u64
    }

    fn write_byte(&mut self, value: u8) {
        self.push(value);
    }

    fn write_slice(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// [`Output`] writing through to any [`io::Write`] destination.
///
/// Write errors are deferred: the first error is stored and all further
/// writes are discarded, so a rendering pass runs to completion and the
/// caller learns the outcome from [`finish`](IoWrite::finish).
pub struct IoWrite<W> {
    inner: W,
    written: u64,
    error: Option<io::Error>,
}

impl<W: io::Write> IoWrite<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            written: 0,
            error: None,
        }
    }

    /// Flush and return the destination, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error {
            return Err(e);
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: io::Write> Output for IoWrite<W> {
    fn cursor(&self) -> u64 {
        self.written
    }

    fn write_byte(&mut self, value: u8) {
        self.write_slice(&[value]);
    }

    fn write_slice(&mut self, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        match self.inner.write_all(bytes) {
            Ok(()) => self.written += bytes.len() as u64,
            Err(e) => self.error = Some(e),
        }
    }
}

/// The codec layer's only view of a user byte container: size, conversion
/// to a plain vector, concatenation and the empty value. Implementing this
/// for a custom container makes it usable wherever the built-in byte-string
/// codecs apply.
pub trait ByteAccess: Sized {
    fn size(&self) -> u64;
    fn to_vec(&self) -> Vec<u8>;
    fn concat(self, other: Self) -> Self;
    fn empty() -> Self;
}

impl ByteAccess for Vec<u8> {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    fn to_vec(&self) -> Vec<u8> {
        self.clone()
    }

    fn concat(mut self, other: Self) -> Self {
        self.extend_from_slice(&other);
        self
    }

    fn empty() -> Self {
        Vec::new()
    }
}

impl<'a> ByteAccess for Cow<'a, [u8]> {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    fn to_vec(&self) -> Vec<u8> {
        self.clone().into_owned()
    }

    fn concat(self, other: Self) -> Self {
        if self.is_empty() {
            other
        } else if other.is_empty() {
            self
        } else {
            let mut joined = self.into_owned();
            joined.extend_from_slice(&other);
            Cow::Owned(joined)
        }
    }

    fn empty() -> Self {
        Cow::Borrowed(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_output_accumulates() {
        let mut out = Vec::new();
        out.write_byte(1);
        out.write_double_byte(0x0203);
        out.write_quad_byte(0x0405_0607);
        out.write_octa_byte(0x08090a0b_0c0d0e0f);
        out.write_slice(&[0x10]);
        assert_eq!(out.cursor(), 16);
        assert_eq!(out[..4], [1, 2, 3, 4]);
    }

    #[test]
    fn io_write_defers_errors() {
        let mut sink = IoWrite::new(Vec::new());
        sink.write_slice(b"hello");
        assert_eq!(sink.cursor(), 5);
        assert_eq!(sink.finish().unwrap(), b"hello");
    }

    #[test]
    fn cow_concat_avoids_copies_for_empty_sides() {
        let a: Cow<[u8]> = Cow::Borrowed(b"abc");
        let b = Cow::Borrowed(&[] as &[u8]);
        assert!(matches!(a.clone().concat(b), Cow::Borrowed(_)));
        let joined = a.concat(Cow::Borrowed(b"def"));
        assert_eq!(joined.to_vec(), b"abcdef");
    }
}
