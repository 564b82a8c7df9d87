use super::CborDecodeConfig;
use crate::{
    constants::*,
    error::{Error, Result},
    input::Input,
    item::{Item, Tag},
    reader::Parser,
    Target,
};
use std::{borrow::Cow, marker::PhantomData};

/// Pull parser for RFC 8949 bytes: each call to [`pull`](Parser::pull)
/// decodes exactly one data item.
pub struct CborParser<'a, In: Input<'a>> {
    input: In,
    config: CborDecodeConfig,
    _lt: PhantomData<&'a [u8]>,
}

impl<'a, In: Input<'a>> CborParser<'a, In> {
    pub fn new(input: In, config: CborDecodeConfig) -> Self {
        Self {
            input,
            config,
            _lt: PhantomData,
        }
    }

    pub fn into_input(self) -> In {
        self.input
    }

    /// Resolve the additional-info bits to their unsigned value, reading
    /// trailing big-endian bytes as required.
    fn unsigned(&mut self, info: u8, pos: u64) -> Result<u64> {
        match info {
            0..=23 => Ok(u64::from(info)),
            24 => self
                .input
                .read_byte()
                .map(u64::from)
                .ok_or_else(|| Error::eof(self.input.cursor(), "one-byte header value")),
            25 => self
                .input
                .read_double_byte()
                .map(u64::from)
                .ok_or_else(|| Error::eof(self.input.cursor(), "two-byte header value")),
            26 => self
                .input
                .read_quad_byte()
                .map(u64::from)
                .ok_or_else(|| Error::eof(self.input.cursor(), "four-byte header value")),
            27 => self
                .input
                .read_octa_byte()
                .ok_or_else(|| Error::eof(self.input.cursor(), "eight-byte header value")),
            _ => Err(Error::invalid(pos, "invalid additional info in item header")),
        }
    }

    /// Like [`unsigned`](Self::unsigned) but rejecting string and container
    /// sizes outside the signed 63-bit range.
    fn size(&mut self, info: u8, pos: u64, what: &str) -> Result<u64> {
        let n = self.unsigned(info, pos)?;
        if n > i64::MAX as u64 {
            Err(Error::overflow(pos, format!("{} size out of range", what)))
        } else {
            Ok(n)
        }
    }

    fn definite_bytes(&mut self, info: u8, pos: u64) -> Result<Cow<'a, [u8]>> {
        let len = self.size(info, pos, "byte string")?;
        if len > self.config.max_byte_string_length {
            return Err(Error::overflow(
                pos,
                "byte string longer than configured maximum",
            ));
        }
        self.input
            .read_bytes(len as usize)
            .ok_or_else(|| Error::eof(self.input.cursor(), "byte string contents"))
    }

    fn definite_str(&mut self, info: u8, pos: u64) -> Result<Cow<'a, str>> {
        let len = self.size(info, pos, "text string")?;
        if len > self.config.max_text_string_length {
            return Err(Error::overflow(
                pos,
                "text string longer than configured maximum",
            ));
        }
        let bytes = self
            .input
            .read_bytes(len as usize)
            .ok_or_else(|| Error::eof(self.input.cursor(), "text string contents"))?;
        match bytes {
            Cow::Borrowed(b) => std::str::from_utf8(b)
                .map(Cow::Borrowed)
                .map_err(|e| Error::invalid(pos, format!("text string is not UTF-8: {}", e))),
            Cow::Owned(v) => String::from_utf8(v)
                .map(Cow::Owned)
                .map_err(|e| Error::invalid(pos, format!("text string is not UTF-8: {}", e))),
        }
    }

    fn extra(&mut self, info: u8, pos: u64) -> Result<Item<'a>> {
        match info {
            LIT_FALSE => Ok(Item::Bool(false)),
            LIT_TRUE => Ok(Item::Bool(true)),
            LIT_NULL => Ok(Item::Null),
            LIT_UNDEFINED => Ok(Item::Undefined),
            LIT_SIMPLE => {
                let value = self
                    .input
                    .read_byte()
                    .ok_or_else(|| Error::eof(self.input.cursor(), "simple value"))?;
                if value < 32 {
                    Err(Error::invalid(pos, "simple value in reserved range 0..=31"))
                } else {
                    Ok(Item::Simple(value))
                }
            }
            LIT_FLOAT16 => {
                let bits = self
                    .input
                    .read_double_byte()
                    .ok_or_else(|| Error::eof(self.input.cursor(), "half-precision float"))?;
                Ok(Item::Float16(half::f16::from_bits(bits).to_f32()))
            }
            LIT_FLOAT32 => {
                let bits = self
                    .input
                    .read_quad_byte()
                    .ok_or_else(|| Error::eof(self.input.cursor(), "single-precision float"))?;
                Ok(Item::Float(f32::from_bits(bits)))
            }
            LIT_FLOAT64 => {
                let bits = self
                    .input
                    .read_octa_byte()
                    .ok_or_else(|| Error::eof(self.input.cursor(), "double-precision float"))?;
                let value = f64::from_bits(bits);
                if self.config.read_double_also_as_float && f64::from(value as f32) == value {
                    Ok(Item::Float(value as f32))
                } else {
                    Ok(Item::Double(value))
                }
            }
            INDEFINITE_SIZE => Ok(Item::Break),
            v if v < 20 => Ok(Item::Simple(v)),
            _ => Err(Error::unsupported(
                pos,
                "reserved additional info 28..=30 in major-7 item header",
            )),
        }
    }
}

/// Pack an unsigned value into the smallest integer item.
fn positive(value: u64) -> Item<'static> {
    if value <= i32::MAX as u64 {
        Item::Int(value as i32)
    } else if value <= i64::MAX as u64 {
        Item::Long(value as i64)
    } else {
        Item::OverLong {
            negative: false,
            value,
        }
    }
}

/// Pack the value of major type 1 into the smallest integer item; the
/// represented number is `-1 - value`.
fn negative(value: u64) -> Item<'static> {
    if value <= i32::MAX as u64 {
        Item::Int(-1 - value as i32)
    } else if value <= i64::MAX as u64 {
        Item::Long(-1 - value as i64)
    } else {
        Item::OverLong {
            negative: true,
            value,
        }
    }
}

impl<'a, In: Input<'a>> Parser<'a> for CborParser<'a, In> {
    fn target(&self) -> Target {
        Target::Cbor
    }

    fn cursor(&self) -> u64 {
        self.input.cursor()
    }

    fn pull(&mut self) -> Result<Item<'a>> {
        let pos = self.input.cursor();
        let head = match self.input.read_byte() {
            Some(b) => b,
            None => return Ok(Item::EndOfInput),
        };
        let major = head >> 5;
        let info = head & 31;
        match major {
            MAJOR_POS => Ok(positive(self.unsigned(info, pos)?)),
            MAJOR_NEG => Ok(negative(self.unsigned(info, pos)?)),
            MAJOR_BYTES => {
                if info == INDEFINITE_SIZE {
                    Ok(Item::BytesStart)
                } else {
                    Ok(Item::Bytes(self.definite_bytes(info, pos)?))
                }
            }
            MAJOR_STR => {
                if info == INDEFINITE_SIZE {
                    Ok(Item::TextStart)
                } else {
                    Ok(Item::Str(self.definite_str(info, pos)?))
                }
            }
            MAJOR_ARRAY => {
                if info == INDEFINITE_SIZE {
                    Ok(Item::ArrayStart)
                } else {
                    Ok(Item::ArrayHeader(self.size(info, pos, "array")?))
                }
            }
            MAJOR_DICT => {
                if info == INDEFINITE_SIZE {
                    Ok(Item::MapStart)
                } else {
                    Ok(Item::MapHeader(self.size(info, pos, "map")?))
                }
            }
            MAJOR_TAG => Ok(Item::Tag(Tag::from_code(self.unsigned(info, pos)?))),
            MAJOR_LIT => self.extra(info, pos),
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SliceInput;

    fn pull_all(bytes: &[u8]) -> Result<Vec<Item<'_>>> {
        let mut parser = CborParser::new(SliceInput::new(bytes), CborDecodeConfig::default());
        let mut items = Vec::new();
        loop {
            let item = parser.pull()?;
            let end = item == Item::EndOfInput;
            items.push(item);
            if end {
                return Ok(items);
            }
        }
    }

    #[test]
    fn integer_widths() {
        assert_eq!(pull_all(&[0x00]).unwrap()[0], Item::Int(0));
        assert_eq!(pull_all(&[0x17]).unwrap()[0], Item::Int(23));
        assert_eq!(pull_all(&[0x18, 0x18]).unwrap()[0], Item::Int(24));
        assert_eq!(pull_all(&[0x19, 0x30, 0x39]).unwrap()[0], Item::Int(12345));
        assert_eq!(
            pull_all(&[0x1a, 0x80, 0, 0, 0]).unwrap()[0],
            Item::Long(1 << 31)
        );
        // 2^32 - 1 still fits a long
        assert_eq!(
            pull_all(&[0x1b, 0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]).unwrap()[0],
            Item::Long(u32::MAX as i64)
        );
        assert_eq!(
            pull_all(&[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap()[0],
            Item::OverLong {
                negative: false,
                value: u64::MAX
            }
        );
    }

    #[test]
    fn negative_integers() {
        assert_eq!(pull_all(&[0x20]).unwrap()[0], Item::Int(-1));
        assert_eq!(pull_all(&[0x38, 0x63]).unwrap()[0], Item::Int(-100));
        assert_eq!(
            pull_all(&[0x3a, 0xff, 0xff, 0xff, 0xff]).unwrap()[0],
            Item::Long(-1 - u32::MAX as i64)
        );
        assert_eq!(
            pull_all(&[0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap()[0],
            Item::OverLong {
                negative: true,
                value: u64::MAX
            }
        );
    }

    #[test]
    fn strings_and_containers() {
        let items = pull_all(&[0x82, 0x63, b'a', b'b', b'c', 0x43, 1, 2, 3]).unwrap();
        assert_eq!(items[0], Item::ArrayHeader(2));
        assert_eq!(items[1], Item::Str(Cow::Borrowed("abc")));
        assert_eq!(items[2], Item::Bytes(Cow::Borrowed(&[1, 2, 3][..])));

        let items = pull_all(&[0xbf, 0x61, b'k', 0x01, 0xff]).unwrap();
        assert_eq!(items[0], Item::MapStart);
        assert_eq!(items[3], Item::Break);
    }

    #[test]
    fn floats_and_literals() {
        assert_eq!(pull_all(&[0xf4]).unwrap()[0], Item::Bool(false));
        assert_eq!(pull_all(&[0xf5]).unwrap()[0], Item::Bool(true));
        assert_eq!(pull_all(&[0xf6]).unwrap()[0], Item::Null);
        assert_eq!(pull_all(&[0xf7]).unwrap()[0], Item::Undefined);
        // 1.5 as half precision
        assert_eq!(
            pull_all(&[0xf9, 0x3e, 0x00]).unwrap()[0],
            Item::Float16(1.5)
        );
        assert_eq!(
            pull_all(&[0xfa, 0x47, 0xc3, 0x50, 0x00]).unwrap()[0],
            Item::Float(100_000.0)
        );
        assert_eq!(
            pull_all(&[0xfb, 0x40, 0x09, 0x21, 0xfb, 0x54, 0x44, 0x2d, 0x18]).unwrap()[0],
            Item::Double(std::f64::consts::PI)
        );
    }

    #[test]
    fn double_also_as_float() {
        let bytes = [0xfb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]; // 1.5 as double
        let config = CborDecodeConfig::default().with_read_double_also_as_float(true);
        let mut parser = CborParser::new(SliceInput::new(&bytes), config);
        assert_eq!(parser.pull().unwrap(), Item::Float(1.5));
    }

    #[test]
    fn tags_are_recognized() {
        let items = pull_all(&[0xc2, 0x41, 0x01]).unwrap();
        assert_eq!(items[0], Item::Tag(Tag::PositiveBigNum));
        let items = pull_all(&[0xd9, 0xd9, 0xf7, 0x00]).unwrap();
        assert_eq!(items[0], Item::Tag(Tag::MagicHeader));
        let items = pull_all(&[0xd8, 0x64, 0x00]).unwrap();
        assert_eq!(items[0], Item::Tag(Tag::Other(100)));
    }

    #[test]
    fn simple_values_police_the_reserved_range() {
        assert_eq!(pull_all(&[0xf0]).unwrap()[0], Item::Simple(16));
        assert_eq!(pull_all(&[0xf8, 0xff]).unwrap()[0], Item::Simple(255));
        let err = pull_all(&[0xf8, 0x18]).unwrap_err();
        assert!(matches!(err, Error::InvalidInputData { .. }));
    }

    #[test]
    fn truncated_input_reports_eof() {
        let err = pull_all(&[0x19, 0x30]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEndOfInput { .. }));
        let err = pull_all(&[0x62, b'a']).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEndOfInput { .. }));
    }

    #[test]
    fn invalid_info_rejected() {
        for head in [0x1c, 0x1f, 0x3e] {
            let err = pull_all(&[head]).unwrap_err();
            assert!(matches!(err, Error::InvalidInputData { .. }), "{:#x}", head);
        }
        // the reserved range is specific to major type 7
        for head in [0xfc, 0xfd, 0xfe] {
            let err = pull_all(&[head]).unwrap_err();
            assert!(matches!(err, Error::Unsupported { .. }), "{:#x}", head);
        }
    }
}
