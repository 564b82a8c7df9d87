use crate::constants::*;
use std::{
    borrow::Cow,
    fmt::{Display, Formatter},
};

/// One element of the neutral stream flowing between the format backends and
/// the [`Reader`](crate::Reader) / [`Writer`](crate::Writer) façades.
///
/// Every encode or decode step produces or consumes exactly one item; for
/// composite values one header (or start marker) followed by the element
/// items and, for the indefinite forms, a terminating [`Item::Break`].
///
/// Items referencing input bytes (`Bytes`, `Str`, `NumberString`) borrow the
/// underlying input region where the source permits it and own their data
/// where unescaping or chunk merging forced a copy.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<'a> {
    Null,
    /// CBOR-only
    Undefined,
    Bool(bool),
    Int(i32),
    Long(i64),
    /// an unsigned 64-bit magnitude beyond the signed range; with `negative`
    /// set the represented number is `-1 - value`
    OverLong { negative: bool, value: u64 },
    /// IEEE 754 half precision, widened to `f32` for transport
    Float16(f32),
    Float(f32),
    Double(f64),
    /// JSON-only: a numeric literal kept as raw text for lossless pass-through
    NumberString(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    /// opens an indefinite byte string; followed by `Bytes` chunks and a `Break`
    BytesStart,
    Str(Cow<'a, str>),
    /// opens an indefinite text string; followed by `Str` chunks and a `Break`
    TextStart,
    ArrayHeader(u64),
    ArrayStart,
    /// a definite map of `n` entries, i.e. `2 * n` sub-items
    MapHeader(u64),
    MapStart,
    Break,
    /// CBOR-only; a unary prefix attaching a semantic tag to the next item
    Tag(Tag),
    /// CBOR-only; legal values are 0..=19 and 32..=255
    Simple(u8),
    EndOfInput,
}

impl<'a> Item<'a> {
    /// The payload-free discriminator of this item.
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Null => ItemKind::Null,
            Item::Undefined => ItemKind::Undefined,
            Item::Bool(_) => ItemKind::Bool,
            Item::Int(_) => ItemKind::Int,
            Item::Long(_) => ItemKind::Long,
            Item::OverLong { .. } => ItemKind::OverLong,
            Item::Float16(_) => ItemKind::Float16,
            Item::Float(_) => ItemKind::Float,
            Item::Double(_) => ItemKind::Double,
            Item::NumberString(_) => ItemKind::NumberString,
            Item::Bytes(_) => ItemKind::Bytes,
            Item::BytesStart => ItemKind::BytesStart,
            Item::Str(_) => ItemKind::Str,
            Item::TextStart => ItemKind::TextStart,
            Item::ArrayHeader(_) => ItemKind::ArrayHeader,
            Item::ArrayStart => ItemKind::ArrayStart,
            Item::MapHeader(_) => ItemKind::MapHeader,
            Item::MapStart => ItemKind::MapStart,
            Item::Break => ItemKind::Break,
            Item::Tag(_) => ItemKind::Tag,
            Item::Simple(_) => ItemKind::Simple,
            Item::EndOfInput => ItemKind::EndOfInput,
        }
    }

    /// Cut ties with the borrowed input region, allocating where necessary.
    pub fn into_owned(self) -> Item<'static> {
        match self {
            Item::NumberString(s) => Item::NumberString(Cow::Owned(s.into_owned())),
            Item::Bytes(b) => Item::Bytes(Cow::Owned(b.into_owned())),
            Item::Str(s) => Item::Str(Cow::Owned(s.into_owned())),
            Item::Null => Item::Null,
            Item::Undefined => Item::Undefined,
            Item::Bool(b) => Item::Bool(b),
            Item::Int(i) => Item::Int(i),
            Item::Long(l) => Item::Long(l),
            Item::OverLong { negative, value } => Item::OverLong { negative, value },
            Item::Float16(f) => Item::Float16(f),
            Item::Float(f) => Item::Float(f),
            Item::Double(d) => Item::Double(d),
            Item::BytesStart => Item::BytesStart,
            Item::TextStart => Item::TextStart,
            Item::ArrayHeader(n) => Item::ArrayHeader(n),
            Item::ArrayStart => Item::ArrayStart,
            Item::MapHeader(n) => Item::MapHeader(n),
            Item::MapStart => Item::MapStart,
            Item::Break => Item::Break,
            Item::Tag(t) => Item::Tag(t),
            Item::Simple(s) => Item::Simple(s),
            Item::EndOfInput => Item::EndOfInput,
        }
    }
}

/// Discriminator for [`Item`], used for fast dispatch and in error messages.
///
/// The `Display` rendering is the stable vocabulary referenced by
/// [`Error::UnexpectedDataItem`](crate::Error::UnexpectedDataItem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Null,
    Undefined,
    Bool,
    Int,
    Long,
    OverLong,
    Float16,
    Float,
    Double,
    NumberString,
    Bytes,
    BytesStart,
    Str,
    TextStart,
    ArrayHeader,
    ArrayStart,
    MapHeader,
    MapStart,
    Break,
    Tag,
    Simple,
    EndOfInput,
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Null => write!(f, "null"),
            ItemKind::Undefined => write!(f, "undefined"),
            ItemKind::Bool => write!(f, "boolean"),
            ItemKind::Int => write!(f, "int"),
            ItemKind::Long => write!(f, "long"),
            ItemKind::OverLong => write!(f, "overlong integer"),
            ItemKind::Float16 => write!(f, "half-precision float"),
            ItemKind::Float => write!(f, "float"),
            ItemKind::Double => write!(f, "double"),
            ItemKind::NumberString => write!(f, "number string"),
            ItemKind::Bytes => write!(f, "byte string"),
            ItemKind::BytesStart => write!(f, "start of byte string"),
            ItemKind::Str => write!(f, "text string"),
            ItemKind::TextStart => write!(f, "start of text string"),
            ItemKind::ArrayHeader => write!(f, "array header"),
            ItemKind::ArrayStart => write!(f, "start of array"),
            ItemKind::MapHeader => write!(f, "map header"),
            ItemKind::MapStart => write!(f, "start of map"),
            ItemKind::Break => write!(f, "break"),
            ItemKind::Tag => write!(f, "tag"),
            ItemKind::Simple => write!(f, "simple value"),
            ItemKind::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// Semantic tag attached to a CBOR data item, see
/// [RFC 8949 §3.4](https://www.rfc-editor.org/rfc/rfc8949#section-3.4).
///
/// The well-known codes carry names; everything else round-trips through
/// [`Tag::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    DateTimeString,
    EpochDateTime,
    PositiveBigNum,
    NegativeBigNum,
    DecimalFraction,
    BigFloat,
    HintBase64Url,
    HintBase64,
    HintBase16,
    EmbeddedCbor,
    TextUri,
    TextBase64Url,
    TextBase64,
    TextRegex,
    TextMime,
    MagicHeader,
    Other(u64),
}

impl Tag {
    pub fn from_code(code: u64) -> Self {
        match code {
            TAG_ISO8601 => Tag::DateTimeString,
            TAG_EPOCH => Tag::EpochDateTime,
            TAG_BIGNUM_POS => Tag::PositiveBigNum,
            TAG_BIGNUM_NEG => Tag::NegativeBigNum,
            TAG_FRACTION => Tag::DecimalFraction,
            TAG_BIGFLOAT => Tag::BigFloat,
            TAG_HINT_BASE64URL => Tag::HintBase64Url,
            TAG_HINT_BASE64 => Tag::HintBase64,
            TAG_HINT_BASE16 => Tag::HintBase16,
            TAG_CBOR_ITEM => Tag::EmbeddedCbor,
            TAG_TEXT_URI => Tag::TextUri,
            TAG_TEXT_BASE64URL => Tag::TextBase64Url,
            TAG_TEXT_BASE64 => Tag::TextBase64,
            TAG_TEXT_REGEX => Tag::TextRegex,
            TAG_TEXT_MIME => Tag::TextMime,
            TAG_CBOR_MARKER => Tag::MagicHeader,
            other => Tag::Other(other),
        }
    }

    pub fn code(self) -> u64 {
        match self {
            Tag::DateTimeString => TAG_ISO8601,
            Tag::EpochDateTime => TAG_EPOCH,
            Tag::PositiveBigNum => TAG_BIGNUM_POS,
            Tag::NegativeBigNum => TAG_BIGNUM_NEG,
            Tag::DecimalFraction => TAG_FRACTION,
            Tag::BigFloat => TAG_BIGFLOAT,
            Tag::HintBase64Url => TAG_HINT_BASE64URL,
            Tag::HintBase64 => TAG_HINT_BASE64,
            Tag::HintBase16 => TAG_HINT_BASE16,
            Tag::EmbeddedCbor => TAG_CBOR_ITEM,
            Tag::TextUri => TAG_TEXT_URI,
            Tag::TextBase64Url => TAG_TEXT_BASE64URL,
            Tag::TextBase64 => TAG_TEXT_BASE64,
            Tag::TextRegex => TAG_TEXT_REGEX,
            Tag::TextMime => TAG_TEXT_MIME,
            Tag::MagicHeader => TAG_CBOR_MARKER,
            Tag::Other(code) => code,
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
