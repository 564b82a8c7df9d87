//! A dual-format serialization library: values encode to and decode from
//! [CBOR (RFC 8949)](https://www.rfc-editor.org/rfc/rfc8949) and
//! [JSON (RFC 8259)](https://www.rfc-editor.org/rfc/rfc8259) through one
//! shared pull-style stream of data items.
//!
//! A parser turns bytes into items, a renderer turns items back into
//! bytes, and the typed [`Reader`] / [`Writer`] façades in between are all
//! a codec ever sees. An [`Encode`] or [`Decode`] instance is therefore
//! written once and works against both formats unchanged:
//!
//! ```rust
//! use wire_data::{Cbor, Json};
//!
//! let value = (42u64, "hello".to_owned());
//! let cbor = Cbor::encode(&value).unwrap();
//! let json = Json::encode(&value).unwrap();
//!
//! assert_eq!(cbor, [0x82, 0x18, 0x2a, 0x65, b'h', b'e', b'l', b'l', b'o']);
//! assert_eq!(json, br#"[42,"hello"]"#);
//!
//! assert_eq!(Cbor::decode::<(u64, String)>(&cbor).unwrap(), value);
//! assert_eq!(Json::decode::<(u64, String)>(&json).unwrap(), value);
//! ```
//!
//! Decoding borrows from the input where the format permits it, inputs may
//! be contiguous buffers, chunk iterators or [`std::io::Read`] sources, and
//! a structural validator between the façades and the backends enforces the
//! stream grammar (it can be switched off for trusted producers via the
//! config structs).

pub mod cbor;
pub mod codec;
mod constants;
mod dom;
mod error;
mod input;
mod item;
mod itembuf;
pub mod json;
mod log;
mod num;
mod output;
mod reader;
mod validation;
mod writer;

#[cfg(test)]
mod tests;

pub use codec::{BaseN, ByteString, Codec, Decode, Either, Encode};
pub use dom::Value;
pub use error::{Error, Result};
pub use input::{ChunkedInput, Input, ReadInput, SliceInput};
pub use item::{Item, ItemKind, Tag};
pub use itembuf::{ItemBuf, ItemBufParser};
pub use log::{LoggingParser, LoggingRenderer};
pub use num::{BigDecimal, BigInt};
pub use output::{ByteAccess, IoWrite, Output};
pub use reader::{Parser, Reader};
pub use validation::Validator;
pub use writer::{Renderer, Writer};

use cbor::{CborDecodeConfig, CborEncodeConfig, CborParser, CborRenderer};
use json::{JsonDecodeConfig, JsonEncodeConfig, JsonParser, JsonRenderer};

/// The wire format at the other end of a [`Reader`] or [`Writer`];
/// observable by codecs that must specialize (byte strings, number
/// strings, map keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Cbor,
    Json,
}

/// Entry points for the CBOR format.
pub struct Cbor;

impl Cbor {
    /// Encode a value to CBOR bytes with the default configuration.
    pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Self::encode_with(value, CborEncodeConfig::default())
    }

    pub fn encode_with<T: Encode + ?Sized>(value: &T, config: CborEncodeConfig) -> Result<Vec<u8>> {
        let out = Vec::with_capacity(config.buffer_size);
        let validation = config.validation;
        let mut w = Writer::new(CborRenderer::new(out, config), validation);
        w.write(value)?;
        Ok(w.into_renderer().into_output())
    }

    /// Encode a value into a caller-provided [`Output`].
    pub fn encode_to<T: Encode + ?Sized, O: Output>(
        value: &T,
        out: O,
        config: CborEncodeConfig,
    ) -> Result<O> {
        let validation = config.validation;
        let mut w = Writer::new(CborRenderer::new(out, config), validation);
        w.write(value)?;
        Ok(w.into_renderer().into_output())
    }

    /// Decode a value from CBOR bytes with the default configuration.
    pub fn decode<'a, T: Decode<'a>>(bytes: &'a [u8]) -> Result<T> {
        Self::decode_with(bytes, CborDecodeConfig::default())
    }

    pub fn decode_with<'a, T: Decode<'a>>(bytes: &'a [u8], config: CborDecodeConfig) -> Result<T> {
        Self::decode_from(SliceInput::new(bytes), config)
    }

    /// Decode a value from any [`Input`], e.g. a chunk iterator or an
    /// [`std::io::Read`] source.
    pub fn decode_from<'a, In: Input<'a>, T: Decode<'a>>(
        input: In,
        config: CborDecodeConfig,
    ) -> Result<T> {
        let validation = config.validation;
        let mut r = Reader::new(CborParser::new(input, config), validation)?;
        let value = T::decode(&mut r)?;
        r.read_end_of_input()?;
        r.into_parser().into_input().release();
        Ok(value)
    }
}

/// Entry points for the JSON format.
pub struct Json;

impl Json {
    /// Encode a value to JSON bytes with the default configuration.
    pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Self::encode_with(value, JsonEncodeConfig::default())
    }

    pub fn encode_with<T: Encode + ?Sized>(value: &T, config: JsonEncodeConfig) -> Result<Vec<u8>> {
        let out = Vec::with_capacity(config.initial_buffer_size.min(config.max_buffer_size));
        let validation = config.validation;
        let mut w = Writer::new(JsonRenderer::new(out, config), validation);
        w.write(value)?;
        Ok(w.into_renderer().into_output())
    }

    /// Encode a value into a caller-provided [`Output`].
    pub fn encode_to<T: Encode + ?Sized, O: Output>(
        value: &T,
        out: O,
        config: JsonEncodeConfig,
    ) -> Result<O> {
        let validation = config.validation;
        let mut w = Writer::new(JsonRenderer::new(out, config), validation);
        w.write(value)?;
        Ok(w.into_renderer().into_output())
    }

    /// Decode a value from JSON bytes with the default configuration.
    pub fn decode<'a, T: Decode<'a>>(bytes: &'a [u8]) -> Result<T> {
        Self::decode_with(bytes, JsonDecodeConfig::default())
    }

    pub fn decode_with<'a, T: Decode<'a>>(bytes: &'a [u8], config: JsonDecodeConfig) -> Result<T> {
        Self::decode_from(SliceInput::new(bytes), config)
    }

    /// Decode a value from any [`Input`], e.g. a chunk iterator or an
    /// [`std::io::Read`] source.
    pub fn decode_from<'a, In: Input<'a>, T: Decode<'a>>(
        input: In,
        config: JsonDecodeConfig,
    ) -> Result<T> {
        let validation = config.validation;
        let mut r = Reader::new(JsonParser::new(input, config), validation)?;
        let value = T::decode(&mut r)?;
        r.read_end_of_input()?;
        r.into_parser().into_input().release();
        Ok(value)
    }
}

/// Re-shape a value without serializing to bytes: `value` is encoded into
/// an in-memory item stream for `target` and decoded back out as `B`.
///
/// This is how values convert to and from the [`Value`] DOM, and more
/// generally how two codecs for the same shape exchange data:
///
/// ```rust
/// use wire_data::{transcode, Target, Value};
///
/// let dom: Value = transcode(&vec![1u64, 2, 3], Target::Cbor).unwrap();
/// assert_eq!(dom.as_array().unwrap().len(), 3);
/// ```
pub fn transcode<A, B>(value: &A, target: Target) -> Result<B>
where
    A: Encode + ?Sized,
    B: Decode<'static>,
{
    let mut w = Writer::new(ItemBuf::new(target), true);
    w.write(value)?;
    let mut r = Reader::new(w.into_renderer().into_parser(), true)?;
    let out = B::decode(&mut r)?;
    r.read_end_of_input()?;
    Ok(out)
}
