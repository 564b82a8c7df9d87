use super::JsonDecodeConfig;
use crate::{
    error::{Error, Result},
    input::Input,
    item::Item,
    reader::Parser,
    Target,
};
use smallvec::SmallVec;
use std::{borrow::Cow, marker::PhantomData};

#[derive(Debug, Clone, Copy)]
enum JFrame {
    /// count of elements emitted so far
    Array { count: u64 },
    /// count of keys and values emitted so far; even means a key is next
    Object { count: u64 },
}

/// Pull parser for RFC 8259 text: reads raw UTF-8 bytes in a single pass
/// and emits the neutral item stream without materializing a document tree.
///
/// Arrays and objects surface as `ArrayStart` / `MapStart` with a `Break`
/// at the closing bracket; object keys and values are emitted as
/// consecutive items. Number literals are classified on the fly into the
/// smallest lossless item, falling back to `NumberString` to keep the raw
/// text when no primitive can hold the value exactly.
pub struct JsonParser<'a, In: Input<'a>> {
    input: In,
    config: JsonDecodeConfig,
    stack: SmallVec<[JFrame; 16]>,
    root_done: bool,
    _lt: PhantomData<&'a [u8]>,
}

impl<'a, In: Input<'a>> JsonParser<'a, In> {
    pub fn new(input: In, config: JsonDecodeConfig) -> Self {
        Self {
            input,
            config,
            stack: SmallVec::new(),
            root_done: false,
            _lt: PhantomData,
        }
    }

    pub fn into_input(self) -> In {
        self.input
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while let Some(b) = self.input.peek_byte() {
            match b {
                0x09 | 0x0a | 0x0d | 0x20 => {
                    self.input.read_byte();
                    skipped = true;
                }
                _ => break,
            }
        }
        skipped
    }

    fn bump_count(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            match frame {
                JFrame::Array { count } | JFrame::Object { count } => *count += 1,
            }
        }
    }

    fn finish_composite(&mut self) {
        if self.stack.is_empty() {
            self.root_done = true;
        }
    }

    fn end_of_input(&mut self) -> Result<Item<'a>> {
        let skipped = self.skip_whitespace();
        let pos = self.input.cursor();
        match self.input.peek_byte() {
            None => {
                if skipped && !self.config.allow_trailing_whitespace {
                    Err(Error::invalid(pos, "trailing whitespace after top-level value"))
                } else {
                    Ok(Item::EndOfInput)
                }
            }
            Some(_) => {
                if self.config.allow_trailing_input {
                    Ok(Item::EndOfInput)
                } else {
                    Err(Error::invalid(pos, "trailing input after top-level value"))
                }
            }
        }
    }

    fn parse_value(&mut self) -> Result<Item<'a>> {
        let pos = self.input.cursor();
        let b = self
            .input
            .peek_byte()
            .ok_or_else(|| Error::eof(pos, "JSON value"))?;
        match b {
            b'{' => {
                self.input.read_byte();
                self.stack.push(JFrame::Object { count: 0 });
                Ok(Item::MapStart)
            }
            b'[' => {
                self.input.read_byte();
                self.stack.push(JFrame::Array { count: 0 });
                Ok(Item::ArrayStart)
            }
            b'"' => {
                self.input.read_byte();
                Ok(Item::Str(self.parse_string(pos)?))
            }
            b't' => {
                self.expect_literal(b"true", pos)?;
                Ok(Item::Bool(true))
            }
            b'f' => {
                self.expect_literal(b"false", pos)?;
                Ok(Item::Bool(false))
            }
            b'n' => {
                self.expect_literal(b"null", pos)?;
                Ok(Item::Null)
            }
            b'-' | b'0'..=b'9' => self.parse_number(pos),
            _ => Err(Error::invalid(
                pos,
                format!("unexpected byte 0x{:02x} at start of JSON value", b),
            )),
        }
    }

    fn expect_literal(&mut self, literal: &'static [u8], pos: u64) -> Result<()> {
        for &expected in literal {
            match self.input.read_byte() {
                Some(b) if b == expected => {}
                Some(_) => return Err(Error::invalid(pos, "invalid literal")),
                None => return Err(Error::eof(self.input.cursor(), "literal")),
            }
        }
        Ok(())
    }

    /// The opening quote has already been consumed; unescapes into an owned
    /// buffer and validates UTF-8 for the whole token.
    fn parse_string(&mut self, pos: u64) -> Result<Cow<'a, str>> {
        let mut buf: Vec<u8> = Vec::new();
        loop {
            if buf.len() as u64 > self.config.max_string_length {
                return Err(Error::overflow(pos, "string longer than configured maximum"));
            }
            let b = self
                .input
                .read_byte()
                .ok_or_else(|| Error::eof(self.input.cursor(), "string contents"))?;
            match b {
                b'"' => break,
                b'\\' => {
                    let esc_pos = self.input.cursor() - 1;
                    let e = self
                        .input
                        .read_byte()
                        .ok_or_else(|| Error::eof(self.input.cursor(), "escape sequence"))?;
                    match e {
                        b'"' => buf.push(b'"'),
                        b'\\' => buf.push(b'\\'),
                        b'/' => buf.push(b'/'),
                        b'b' => buf.push(0x08),
                        b'f' => buf.push(0x0c),
                        b'n' => buf.push(b'\n'),
                        b'r' => buf.push(b'\r'),
                        b't' => buf.push(b'\t'),
                        b'u' => {
                            let cp = self.unicode_escape(esc_pos)?;
                            let ch = char::from_u32(cp)
                                .ok_or_else(|| Error::invalid(esc_pos, "invalid code point"))?;
                            let mut enc = [0u8; 4];
                            buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
                        }
                        _ => return Err(Error::invalid(esc_pos, "invalid escape sequence")),
                    }
                }
                0x00..=0x1f => {
                    return Err(Error::invalid(
                        self.input.cursor() - 1,
                        "unescaped control character in string",
                    ))
                }
                _ => buf.push(b),
            }
        }
        String::from_utf8(buf)
            .map(Cow::Owned)
            .map_err(|e| Error::invalid(pos, format!("string is not UTF-8: {}", e)))
    }

    /// Decodes `XXXX` (the `\u` is consumed), pairing UTF-16 surrogates.
    fn unicode_escape(&mut self, pos: u64) -> Result<u32> {
        let unit = self.hex4(pos)?;
        if (0xdc00..0xe000).contains(&unit) {
            return Err(Error::invalid(pos, "unpaired UTF-16 low surrogate"));
        }
        if !(0xd800..0xdc00).contains(&unit) {
            return Ok(u32::from(unit));
        }
        match (self.input.read_byte(), self.input.read_byte()) {
            (Some(b'\\'), Some(b'u')) => {}
            _ => return Err(Error::invalid(pos, "unpaired UTF-16 high surrogate")),
        }
        let low = self.hex4(pos)?;
        if !(0xdc00..0xe000).contains(&low) {
            return Err(Error::invalid(pos, "invalid UTF-16 low surrogate"));
        }
        Ok(0x10000 + ((u32::from(unit) - 0xd800) << 10) + (u32::from(low) - 0xdc00))
    }

    fn hex4(&mut self, pos: u64) -> Result<u16> {
        let mut value = 0u16;
        for _ in 0..4 {
            let b = self
                .input
                .read_byte()
                .ok_or_else(|| Error::eof(self.input.cursor(), "unicode escape"))?;
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| Error::invalid(pos, "invalid unicode escape"))?;
            value = value << 4 | digit as u16;
        }
        Ok(value)
    }

    /// Lex one number literal and classify it into the smallest item kind
    /// that represents the value without loss.
    fn parse_number(&mut self, pos: u64) -> Result<Item<'a>> {
        let mut raw = String::new();
        let negative = self.input.peek_byte() == Some(b'-');
        if negative {
            self.input.read_byte();
            raw.push('-');
        }

        let mut mantissa_digits = 0u32;
        let mut magnitude = 0u128;
        let mut huge = false;
        let first = self
            .input
            .peek_byte()
            .ok_or_else(|| Error::eof(self.input.cursor(), "number"))?;
        if !first.is_ascii_digit() {
            return Err(Error::invalid(pos, "invalid number"));
        }
        if first == b'0' {
            self.input.read_byte();
            raw.push('0');
            if matches!(self.input.peek_byte(), Some(b) if b.is_ascii_digit()) {
                return Err(Error::invalid(pos, "leading zero in number"));
            }
        } else {
            while let Some(b) = self.input.peek_byte() {
                if !b.is_ascii_digit() {
                    break;
                }
                self.input.read_byte();
                raw.push(b as char);
                mantissa_digits += 1;
                if mantissa_digits > self.config.max_number_mantissa_digits {
                    return Err(Error::overflow(
                        pos,
                        "number has more mantissa digits than configured maximum",
                    ));
                }
                match magnitude
                    .checked_mul(10)
                    .and_then(|m| m.checked_add(u128::from(b - b'0')))
                {
                    Some(m) => magnitude = m,
                    None => huge = true,
                }
            }
        }

        let mut is_decimal = false;
        if self.input.peek_byte() == Some(b'.') {
            is_decimal = true;
            self.input.read_byte();
            raw.push('.');
            let mut any = false;
            while let Some(b) = self.input.peek_byte() {
                if !b.is_ascii_digit() {
                    break;
                }
                self.input.read_byte();
                raw.push(b as char);
                any = true;
                mantissa_digits += 1;
                if mantissa_digits > self.config.max_number_mantissa_digits {
                    return Err(Error::overflow(
                        pos,
                        "number has more mantissa digits than configured maximum",
                    ));
                }
            }
            if !any {
                return Err(Error::invalid(pos, "decimal point without digits"));
            }
        }

        let mut exponent = 0u32;
        if matches!(self.input.peek_byte(), Some(b'e') | Some(b'E')) {
            is_decimal = true;
            self.input.read_byte();
            raw.push('e');
            if let Some(sign) = self.input.peek_byte() {
                if sign == b'+' || sign == b'-' {
                    self.input.read_byte();
                    raw.push(sign as char);
                }
            }
            let mut any = false;
            while let Some(b) = self.input.peek_byte() {
                if !b.is_ascii_digit() {
                    break;
                }
                self.input.read_byte();
                raw.push(b as char);
                any = true;
                exponent = exponent.saturating_mul(10).saturating_add(u32::from(b - b'0'));
                if exponent > self.config.max_number_abs_exponent {
                    return Err(Error::overflow(
                        pos,
                        "number exponent larger than configured maximum",
                    ));
                }
            }
            if !any {
                return Err(Error::invalid(pos, "exponent without digits"));
            }
        }

        if !is_decimal {
            if !huge {
                if negative {
                    if magnitude == 0 {
                        return Ok(Item::Int(0));
                    } else if magnitude <= 1 << 31 {
                        return Ok(Item::Int(-(magnitude as i64) as i32));
                    } else if magnitude <= 1 << 63 {
                        return Ok(Item::Long(-(magnitude as i128) as i64));
                    } else if magnitude <= 1 << 64 {
                        return Ok(Item::OverLong {
                            negative: true,
                            value: (magnitude - 1) as u64,
                        });
                    }
                } else if magnitude <= i32::MAX as u128 {
                    return Ok(Item::Int(magnitude as i32));
                } else if magnitude <= i64::MAX as u128 {
                    return Ok(Item::Long(magnitude as i64));
                } else if magnitude <= u64::MAX as u128 {
                    return Ok(Item::OverLong {
                        negative: false,
                        value: magnitude as u64,
                    });
                }
            }
            return Ok(Item::NumberString(Cow::Owned(raw)));
        }

        if !self.config.read_decimal_numbers_only_as_number_string
            && mantissa_digits <= 15
            && exponent <= 308
        {
            // 15 significant digits round-trip exactly through an IEEE 754
            // double; anything longer keeps its textual form
            if let Ok(d) = raw.parse::<f64>() {
                if d.is_finite() {
                    return Ok(Item::Double(d));
                }
            }
        }
        Ok(Item::NumberString(Cow::Owned(raw)))
    }
}

impl<'a, In: Input<'a>> Parser<'a> for JsonParser<'a, In> {
    fn target(&self) -> Target {
        Target::Json
    }

    fn cursor(&self) -> u64 {
        self.input.cursor()
    }

    fn pull(&mut self) -> Result<Item<'a>> {
        if self.root_done && self.stack.is_empty() {
            return self.end_of_input();
        }
        let frame = self.stack.last().copied();
        match frame {
            None => {
                self.skip_whitespace();
                let item = self.parse_value()?;
                if self.stack.is_empty() {
                    self.root_done = true;
                }
                Ok(item)
            }
            Some(JFrame::Array { count }) => {
                self.skip_whitespace();
                let pos = self.input.cursor();
                let b = self
                    .input
                    .peek_byte()
                    .ok_or_else(|| Error::eof(pos, "array element or `]`"))?;
                if b == b']' {
                    self.input.read_byte();
                    self.stack.pop();
                    self.finish_composite();
                    return Ok(Item::Break);
                }
                if count > 0 {
                    if b != b',' {
                        return Err(Error::invalid(pos, "expected `,` or `]` in array"));
                    }
                    self.input.read_byte();
                    self.skip_whitespace();
                }
                self.bump_count();
                self.parse_value()
            }
            Some(JFrame::Object { count }) => {
                self.skip_whitespace();
                let pos = self.input.cursor();
                if count % 2 == 1 {
                    let b = self
                        .input
                        .peek_byte()
                        .ok_or_else(|| Error::eof(pos, "`:` and object value"))?;
                    if b != b':' {
                        return Err(Error::invalid(pos, "expected `:` after object key"));
                    }
                    self.input.read_byte();
                    self.skip_whitespace();
                    self.bump_count();
                    return self.parse_value();
                }
                let b = self
                    .input
                    .peek_byte()
                    .ok_or_else(|| Error::eof(pos, "object member or `}`"))?;
                if b == b'}' {
                    self.input.read_byte();
                    self.stack.pop();
                    self.finish_composite();
                    return Ok(Item::Break);
                }
                if count > 0 {
                    if b != b',' {
                        return Err(Error::invalid(pos, "expected `,` or `}` in object"));
                    }
                    self.input.read_byte();
                    self.skip_whitespace();
                }
                let key_pos = self.input.cursor();
                match self.input.peek_byte() {
                    Some(b'"') => {
                        self.input.read_byte();
                        let key = self.parse_string(key_pos)?;
                        self.bump_count();
                        Ok(Item::Str(key))
                    }
                    Some(_) => Err(Error::invalid(key_pos, "expected `\"` to begin object key")),
                    None => Err(Error::eof(key_pos, "object key")),
                }
            }
        }
    }
}
