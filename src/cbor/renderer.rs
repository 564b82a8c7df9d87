use super::CborEncodeConfig;
use crate::{
    constants::*,
    error::{Error, Result},
    item::Item,
    output::Output,
    writer::Renderer,
    Target,
};

/// Renders the neutral item stream as RFC 8949 bytes, one item per
/// [`put`](Renderer::put), always choosing the narrowest encoding.
pub struct CborRenderer<O: Output> {
    out: O,
    config: CborEncodeConfig,
}

impl<O: Output> CborRenderer<O> {
    pub fn new(out: O, config: CborEncodeConfig) -> Self {
        Self { out, config }
    }

    pub fn into_output(self) -> O {
        self.out
    }

    /// Emit a header for `major` with `value`, packed into the type byte or
    /// the smallest of 1, 2, 4 or 8 trailing big-endian bytes.
    fn write_integer(&mut self, major: u8, value: u64) {
        if value < 24 {
            self.out.write_byte(major << 5 | value as u8);
        } else if value < 0x100 {
            self.out.write_byte(major << 5 | 24);
            self.out.write_byte(value as u8);
        } else if value < 0x1_0000 {
            self.out.write_byte(major << 5 | 25);
            self.out.write_double_byte(value as u16);
        } else if value < 0x1_0000_0000 {
            self.out.write_byte(major << 5 | 26);
            self.out.write_quad_byte(value as u32);
        } else {
            self.out.write_byte(major << 5 | 27);
            self.out.write_octa_byte(value);
        }
    }

    fn write_signed(&mut self, value: i64) {
        if value < 0 {
            self.write_integer(MAJOR_NEG, !(value as u64));
        } else {
            self.write_integer(MAJOR_POS, value as u64);
        }
    }

    fn write_float16(&mut self, value: f32) {
        self.out.write_byte(MAJOR_LIT << 5 | LIT_FLOAT16);
        self.out.write_double_byte(half::f16::from_f32(value).to_bits());
    }

    fn write_float(&mut self, value: f32) {
        if self.config.compress_floating_point_values && narrows_to_f16(value) {
            self.write_float16(value);
        } else {
            self.out.write_byte(MAJOR_LIT << 5 | LIT_FLOAT32);
            self.out.write_quad_byte(value.to_bits());
        }
    }

    fn write_double(&mut self, value: f64) {
        if self.config.compress_floating_point_values && narrows_to_f32(value) {
            self.write_float(value as f32);
        } else {
            self.out.write_byte(MAJOR_LIT << 5 | LIT_FLOAT64);
            self.out.write_octa_byte(value.to_bits());
        }
    }
}

fn narrows_to_f32(value: f64) -> bool {
    value.is_nan() || f64::from(value as f32) == value
}

fn narrows_to_f16(value: f32) -> bool {
    value.is_nan() || half::f16::from_f32(value).to_f32() == value
}

impl<O: Output> Renderer for CborRenderer<O> {
    fn target(&self) -> Target {
        Target::Cbor
    }

    fn cursor(&self) -> u64 {
        self.out.cursor()
    }

    fn put(&mut self, item: &Item<'_>) -> Result<()> {
        let pos = self.out.cursor();
        match item {
            Item::Null => self.out.write_byte(MAJOR_LIT << 5 | LIT_NULL),
            Item::Undefined => self.out.write_byte(MAJOR_LIT << 5 | LIT_UNDEFINED),
            Item::Bool(false) => self.out.write_byte(MAJOR_LIT << 5 | LIT_FALSE),
            Item::Bool(true) => self.out.write_byte(MAJOR_LIT << 5 | LIT_TRUE),
            Item::Int(i) => self.write_signed(i64::from(*i)),
            Item::Long(l) => self.write_signed(*l),
            Item::OverLong { negative, value } => {
                let major = if *negative { MAJOR_NEG } else { MAJOR_POS };
                self.write_integer(major, *value);
            }
            Item::Float16(f) => self.write_float16(*f),
            Item::Float(f) => self.write_float(*f),
            Item::Double(d) => self.write_double(*d),
            Item::NumberString(_) => {
                return Err(Error::invalid(
                    pos,
                    "number strings cannot be represented in CBOR",
                ))
            }
            Item::Bytes(b) => {
                self.write_integer(MAJOR_BYTES, b.len() as u64);
                self.out.write_slice(b);
            }
            Item::BytesStart => self.out.write_byte(MAJOR_BYTES << 5 | INDEFINITE_SIZE),
            Item::Str(s) => {
                self.write_integer(MAJOR_STR, s.len() as u64);
                self.out.write_slice(s.as_bytes());
            }
            Item::TextStart => self.out.write_byte(MAJOR_STR << 5 | INDEFINITE_SIZE),
            Item::ArrayHeader(n) => self.write_integer(MAJOR_ARRAY, *n),
            Item::ArrayStart => self.out.write_byte(MAJOR_ARRAY << 5 | INDEFINITE_SIZE),
            Item::MapHeader(n) => self.write_integer(MAJOR_DICT, *n),
            Item::MapStart => self.out.write_byte(MAJOR_DICT << 5 | INDEFINITE_SIZE),
            Item::Break => self.out.write_byte(STOP_BYTE),
            Item::Tag(tag) => self.write_integer(MAJOR_TAG, tag.code()),
            Item::Simple(v) => {
                if (20u8..32).contains(v) {
                    return Err(Error::invalid(
                        pos,
                        "simple value in reserved range 20..=31",
                    ));
                }
                if *v < 20 {
                    self.out.write_byte(MAJOR_LIT << 5 | *v);
                } else {
                    self.out.write_byte(MAJOR_LIT << 5 | LIT_SIMPLE);
                    self.out.write_byte(*v);
                }
            }
            Item::EndOfInput => {
                return Err(Error::invalid(pos, "end of input is not a writable item"))
            }
        }
        Ok(())
    }
}
