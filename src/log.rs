//! Item-stream tracing: decorators that log every item crossing the
//! parser or renderer seam without altering it. Useful when a codec and a
//! document disagree about the stream shape.

use crate::{error::Result, item::Item, reader::Parser, writer::Renderer, Target};
use std::io::Write;

fn log_item(out: &mut impl Write, direction: &str, pos: u64, item: &Item<'_>) {
    // logging must never alter the outcome, so failures are dropped
    let _ = writeln!(out, "{} {:>6} {:?}", direction, pos, item);
}

/// Wraps a [`Parser`] and writes one line per pulled item.
pub struct LoggingParser<P, W> {
    inner: P,
    out: W,
}

impl<P, W> LoggingParser<P, W> {
    pub fn new(inner: P, out: W) -> Self {
        Self { inner, out }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<'a, P: Parser<'a>, W: Write> Parser<'a> for LoggingParser<P, W> {
    fn target(&self) -> Target {
        self.inner.target()
    }

    fn cursor(&self) -> u64 {
        self.inner.cursor()
    }

    fn pull(&mut self) -> Result<Item<'a>> {
        let pos = self.inner.cursor();
        let item = self.inner.pull()?;
        log_item(&mut self.out, "->", pos, &item);
        Ok(item)
    }
}

/// Wraps a [`Renderer`] and writes one line per written item.
pub struct LoggingRenderer<R, W> {
    inner: R,
    out: W,
}

impl<R, W> LoggingRenderer<R, W> {
    pub fn new(inner: R, out: W) -> Self {
        Self { inner, out }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Renderer, W: Write> Renderer for LoggingRenderer<R, W> {
    fn target(&self) -> Target {
        self.inner.target()
    }

    fn cursor(&self) -> u64 {
        self.inner.cursor()
    }

    fn put(&mut self, item: &Item<'_>) -> Result<()> {
        log_item(&mut self.out, "<-", self.inner.cursor(), item);
        self.inner.put(item)
    }

    fn accepts_integer_map_keys(&self) -> bool {
        self.inner.accepts_integer_map_keys()
    }
}
