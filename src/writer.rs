use crate::{
    codec::Encode,
    error::Result,
    item::{Item, Tag},
    validation::Validator,
    Target,
};
use smallvec::SmallVec;
use std::borrow::Cow;

/// The push side of a format backend: consumes one data item per call and
/// renders it to the underlying [`Output`](crate::Output).
pub trait Renderer {
    fn target(&self) -> Target;

    /// Byte offset of the next output byte.
    fn cursor(&self) -> u64;

    fn put(&mut self, item: &Item<'_>) -> Result<()>;

    /// Whether this renderer turns integer map keys into an acceptable
    /// form by itself (JSON key stringification).
    fn accepts_integer_map_keys(&self) -> bool {
        false
    }
}

/// Typed push façade over a [`Renderer`].
///
/// Mirrors the [`Reader`](crate::Reader): every `write_*` operation emits
/// exactly one item. The `write_array_open` / `write_array_close` pair (and
/// the map equivalent) picks the definite form under CBOR, where
/// known-length containers are denser, and the indefinite form under JSON,
/// so codecs compose without a format branch.
pub struct Writer<R: Renderer> {
    renderer: R,
    validator: Option<Validator>,
    /// for each `*_open` not yet closed: whether a break must follow
    open_frames: SmallVec<[bool; 16]>,
}

impl<R: Renderer> Writer<R> {
    pub fn new(renderer: R, validation: bool) -> Self {
        let validator = validation.then(|| {
            Validator::new(renderer.target())
                .allow_integer_map_keys(renderer.accepts_integer_map_keys())
        });
        Self {
            renderer,
            validator,
            open_frames: SmallVec::new(),
        }
    }

    /// Whether this writer encodes CBOR or JSON, for codecs that must
    /// differentiate.
    pub fn target(&self) -> Target {
        self.renderer.target()
    }

    /// Byte offset of the next output byte.
    pub fn pos(&self) -> u64 {
        self.renderer.cursor()
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn emit(&mut self, item: Item<'_>) -> Result<()> {
        let pos = self.renderer.cursor();
        if let Some(v) = &mut self.validator {
            v.check(&item, pos)?;
        }
        self.renderer.put(&item)
    }

    /// Encode a value through its [`Encode`] instance.
    pub fn write<T: Encode + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.encode(self)
    }

    pub fn write_null(&mut self) -> Result<()> {
        self.emit(Item::Null)
    }

    pub fn write_undefined(&mut self) -> Result<()> {
        self.emit(Item::Undefined)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.emit(Item::Bool(value))
    }

    pub fn write_int(&mut self, value: i32) -> Result<()> {
        self.emit(Item::Int(value))
    }

    pub fn write_long(&mut self, value: i64) -> Result<()> {
        self.emit(Item::Long(value))
    }

    pub fn write_over_long(&mut self, negative: bool, value: u64) -> Result<()> {
        self.emit(Item::OverLong { negative, value })
    }

    /// Write a signed value as the smallest integer item that holds it.
    pub fn write_signed(&mut self, value: i64) -> Result<()> {
        if let Ok(i) = i32::try_from(value) {
            self.write_int(i)
        } else {
            self.write_long(value)
        }
    }

    /// Write an unsigned value as the smallest integer item that holds it.
    pub fn write_unsigned(&mut self, value: u64) -> Result<()> {
        if let Ok(i) = i32::try_from(value) {
            self.write_int(i)
        } else if let Ok(l) = i64::try_from(value) {
            self.write_long(l)
        } else {
            self.write_over_long(false, value)
        }
    }

    pub fn write_float16(&mut self, value: f32) -> Result<()> {
        self.emit(Item::Float16(value))
    }

    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.emit(Item::Float(value))
    }

    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.emit(Item::Double(value))
    }

    pub fn write_number_string(&mut self, value: &str) -> Result<()> {
        self.emit(Item::NumberString(Cow::Borrowed(value)))
    }

    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.emit(Item::Str(Cow::Borrowed(value)))
    }

    pub fn write_text_start(&mut self) -> Result<()> {
        self.emit(Item::TextStart)
    }

    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.emit(Item::Bytes(Cow::Borrowed(value)))
    }

    pub fn write_bytes_start(&mut self) -> Result<()> {
        self.emit(Item::BytesStart)
    }

    pub fn write_array_header(&mut self, size: u64) -> Result<()> {
        self.emit(Item::ArrayHeader(size))
    }

    pub fn write_array_start(&mut self) -> Result<()> {
        self.emit(Item::ArrayStart)
    }

    pub fn write_map_header(&mut self, size: u64) -> Result<()> {
        self.emit(Item::MapHeader(size))
    }

    pub fn write_map_start(&mut self) -> Result<()> {
        self.emit(Item::MapStart)
    }

    pub fn write_break(&mut self) -> Result<()> {
        self.emit(Item::Break)
    }

    pub fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.emit(Item::Tag(tag))
    }

    pub fn write_simple(&mut self, value: u8) -> Result<()> {
        self.emit(Item::Simple(value))
    }

    /// Open an array of known size in the form natural to the target:
    /// definite under CBOR, indefinite under JSON. Must be balanced by
    /// [`write_array_close`](Self::write_array_close).
    pub fn write_array_open(&mut self, size: u64) -> Result<()> {
        match self.target() {
            Target::Cbor => {
                self.write_array_header(size)?;
                self.open_frames.push(false);
            }
            Target::Json => {
                self.write_array_start()?;
                self.open_frames.push(true);
            }
        }
        Ok(())
    }

    pub fn write_array_close(&mut self) -> Result<()> {
        if self.open_frames.pop() == Some(true) {
            self.write_break()?;
        }
        Ok(())
    }

    /// Open a map of known entry count in the form natural to the target;
    /// see [`write_array_open`](Self::write_array_open).
    pub fn write_map_open(&mut self, size: u64) -> Result<()> {
        match self.target() {
            Target::Cbor => {
                self.write_map_header(size)?;
                self.open_frames.push(false);
            }
            Target::Json => {
                self.write_map_start()?;
                self.open_frames.push(true);
            }
        }
        Ok(())
    }

    pub fn write_map_close(&mut self) -> Result<()> {
        self.write_array_close()
    }
}
