use super::JsonEncodeConfig;
use crate::{
    error::{Error, Result},
    item::Item,
    output::Output,
    writer::Renderer,
    Target,
};
use smallvec::SmallVec;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutKind {
    Array,
    Map,
    Text,
}

#[derive(Debug, Clone, Copy)]
struct OutFrame {
    kind: OutKind,
    /// children promised by a definite header; `None` until a `Break`
    remaining: Option<u64>,
    count: u64,
}

/// Stack-allocated scratch for number formatting.
struct NumBuf([u8; 40], usize);

impl NumBuf {
    fn new() -> Self {
        Self([0; 40], 0)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0[..self.1]
    }

    fn as_str(&self) -> &str {
        // only ever filled from ASCII number formatting
        unsafe { std::str::from_utf8_unchecked(self.as_bytes()) }
    }
}

impl std::fmt::Write for NumBuf {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let end = self.1 + s.len();
        if end > self.0.len() {
            return Err(std::fmt::Error);
        }
        self.0[self.1..end].copy_from_slice(s.as_bytes());
        self.1 = end;
        Ok(())
    }
}

/// Renders the neutral item stream as RFC 8259 bytes: separators and
/// closing brackets are derived from a depth stack, so definite-length
/// containers close themselves once their promised children have been
/// written and indefinite ones close on `Break`.
///
/// Raw `Bytes` items are rejected here; the codec layer turns byte strings
/// into base-N text before they reach a JSON renderer.
pub struct JsonRenderer<O: Output> {
    out: O,
    config: JsonEncodeConfig,
    stack: SmallVec<[OutFrame; 16]>,
}

impl<O: Output> JsonRenderer<O> {
    pub fn new(out: O, config: JsonEncodeConfig) -> Self {
        Self {
            out,
            config,
            stack: SmallVec::new(),
        }
    }

    pub fn into_output(self) -> O {
        self.out
    }

    /// `,` between siblings, `:` between a key and its value.
    fn separator(&mut self) {
        if let Some(f) = self.stack.last() {
            if f.count > 0 {
                let sep = if f.kind == OutKind::Map && f.count % 2 == 1 {
                    b':'
                } else {
                    b','
                };
                self.out.write_byte(sep);
            }
        }
    }

    /// One complete child has been written: bump the innermost frame and
    /// close definite containers that just became complete.
    fn child_done(&mut self) {
        while let Some(f) = self.stack.last_mut() {
            f.count += 1;
            if f.remaining == Some(f.count) {
                let close = if f.kind == OutKind::Map { b'}' } else { b']' };
                self.stack.pop();
                self.out.write_byte(close);
                continue;
            }
            break;
        }
    }

    fn open(&mut self, kind: OutKind, remaining: Option<u64>) {
        self.out
            .write_byte(if kind == OutKind::Map { b'{' } else { b'[' });
        self.stack.push(OutFrame {
            kind,
            remaining,
            count: 0,
        });
    }

    fn write_escaped(&mut self, s: &str) {
        for &b in s.as_bytes() {
            match b {
                b'"' => self.out.write_slice(b"\\\""),
                b'\\' => self.out.write_slice(b"\\\\"),
                0x08 => self.out.write_slice(b"\\b"),
                0x0c => self.out.write_slice(b"\\f"),
                b'\n' => self.out.write_slice(b"\\n"),
                b'\r' => self.out.write_slice(b"\\r"),
                b'\t' => self.out.write_slice(b"\\t"),
                0x00..=0x1f => {
                    let mut buf = NumBuf::new();
                    let _ = write!(buf, "\\u{:04x}", b);
                    self.out.write_slice(buf.as_bytes());
                }
                _ => self.out.write_byte(b),
            }
        }
    }

    fn write_quoted(&mut self, s: &str) {
        self.out.write_byte(b'"');
        self.write_escaped(s);
        self.out.write_byte(b'"');
    }

    fn write_integer(&mut self, item: &Item<'_>) {
        let mut buf = NumBuf::new();
        match item {
            Item::Int(i) => {
                let _ = write!(buf, "{}", i);
            }
            Item::Long(l) => {
                let _ = write!(buf, "{}", l);
            }
            Item::OverLong { negative, value } => {
                if *negative {
                    let _ = write!(buf, "-{}", u128::from(*value) + 1);
                } else {
                    let _ = write!(buf, "{}", value);
                }
            }
            _ => {}
        }
        self.out.write_slice(buf.as_bytes());
    }

    fn write_f32(&mut self, value: f32, pos: u64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::unsupported(
                pos,
                "non-finite floating-point value has no JSON representation",
            ));
        }
        let mut buf = NumBuf::new();
        if value != 0.0 && (value.abs() < 1e-6 || value.abs() > 1e16) {
            let _ = write!(buf, "{:e}", value);
        } else {
            let _ = write!(buf, "{}", value);
        }
        self.write_mantissa_dot_zero(buf.as_str());
        Ok(())
    }

    fn write_f64(&mut self, value: f64, pos: u64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::unsupported(
                pos,
                "non-finite floating-point value has no JSON representation",
            ));
        }
        let mut buf = NumBuf::new();
        if value != 0.0 && (value.abs() < 1e-6 || value.abs() > 1e16) {
            let _ = write!(buf, "{:e}", value);
        } else {
            let _ = write!(buf, "{}", value);
        }
        self.write_mantissa_dot_zero(buf.as_str());
        Ok(())
    }

    /// Append `.0` to integral mantissas so the value reparses as a
    /// floating-point number.
    fn write_mantissa_dot_zero(&mut self, s: &str) {
        let e = s.find('e').unwrap_or(s.len());
        let (mantissa, exponent) = s.split_at(e);
        self.out.write_slice(mantissa.as_bytes());
        if !mantissa.contains('.') {
            self.out.write_slice(b".0");
        }
        self.out.write_slice(exponent.as_bytes());
    }
}

impl<O: Output> Renderer for JsonRenderer<O> {
    fn target(&self) -> Target {
        Target::Json
    }

    fn cursor(&self) -> u64 {
        self.out.cursor()
    }

    fn accepts_integer_map_keys(&self) -> bool {
        self.config.stringify_integer_keys
    }

    fn put(&mut self, item: &Item<'_>) -> Result<()> {
        let pos = self.out.cursor();

        if let Item::Break = item {
            return match self.stack.pop() {
                Some(f) if f.remaining.is_none() => {
                    self.out.write_byte(match f.kind {
                        OutKind::Map => b'}',
                        OutKind::Array => b']',
                        OutKind::Text => b'"',
                    });
                    self.child_done();
                    Ok(())
                }
                Some(f) => {
                    self.stack.push(f);
                    Err(Error::invalid(pos, "break inside definite-length container"))
                }
                None => Err(Error::invalid(pos, "break outside any container")),
            };
        }

        // inside an indefinite text string only chunks may appear
        if self.stack.last().map(|f| f.kind) == Some(OutKind::Text) {
            return match item {
                Item::Str(s) => {
                    self.write_escaped(s);
                    Ok(())
                }
                other => Err(Error::invalid(
                    pos,
                    format!("expected text string chunk or break but got {}", other.kind()),
                )),
            };
        }

        let key_position = matches!(
            self.stack.last(),
            Some(f) if f.kind == OutKind::Map && f.count % 2 == 0
        );
        if key_position {
            match item {
                Item::Str(_) => {}
                Item::Int(_) | Item::Long(_) | Item::OverLong { .. }
                    if self.config.stringify_integer_keys =>
                {
                    self.separator();
                    self.out.write_byte(b'"');
                    self.write_integer(item);
                    self.out.write_byte(b'"');
                    self.child_done();
                    return Ok(());
                }
                other => {
                    return Err(Error::unsupported(
                        pos,
                        format!("JSON map key must be a text string, not {}", other.kind()),
                    ))
                }
            }
        }

        self.separator();
        match item {
            Item::Null => {
                self.out.write_slice(b"null");
                self.child_done();
            }
            Item::Bool(b) => {
                self.out.write_slice(if *b { b"true" } else { b"false" });
                self.child_done();
            }
            Item::Int(_) | Item::Long(_) | Item::OverLong { .. } => {
                self.write_integer(item);
                self.child_done();
            }
            Item::Float16(f) | Item::Float(f) => {
                self.write_f32(*f, pos)?;
                self.child_done();
            }
            Item::Double(d) => {
                self.write_f64(*d, pos)?;
                self.child_done();
            }
            Item::NumberString(s) => {
                self.out.write_slice(s.as_bytes());
                self.child_done();
            }
            Item::Str(s) => {
                self.write_quoted(s);
                self.child_done();
            }
            Item::TextStart => {
                self.out.write_byte(b'"');
                self.stack.push(OutFrame {
                    kind: OutKind::Text,
                    remaining: None,
                    count: 0,
                });
            }
            Item::ArrayHeader(0) => {
                self.out.write_slice(b"[]");
                self.child_done();
            }
            Item::MapHeader(0) => {
                self.out.write_slice(b"{}");
                self.child_done();
            }
            Item::ArrayHeader(n) => self.open(OutKind::Array, Some(*n)),
            Item::ArrayStart => self.open(OutKind::Array, None),
            Item::MapHeader(n) => {
                let children = n.checked_mul(2).ok_or_else(|| {
                    Error::overflow(pos, "map size exceeds representable range")
                })?;
                self.open(OutKind::Map, Some(children));
            }
            Item::MapStart => self.open(OutKind::Map, None),
            Item::Bytes(_) => {
                return Err(Error::unsupported(
                    pos,
                    "byte strings must be re-encoded as text before JSON rendering",
                ))
            }
            Item::BytesStart => {
                return Err(Error::unsupported(
                    pos,
                    "indefinite byte strings cannot be represented in JSON",
                ))
            }
            Item::Tag(tag) => {
                return Err(Error::unsupported(
                    pos,
                    format!("tag {} cannot be represented in JSON", tag),
                ))
            }
            Item::Undefined => {
                return Err(Error::unsupported(
                    pos,
                    "undefined cannot be represented in JSON",
                ))
            }
            Item::Simple(v) => {
                return Err(Error::unsupported(
                    pos,
                    format!("simple value {} cannot be represented in JSON", v),
                ))
            }
            Item::EndOfInput => {
                return Err(Error::invalid(pos, "end of input is not a writable item"))
            }
            Item::Break => {}
        }
        Ok(())
    }
}
