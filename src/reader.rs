use crate::{
    error::{Error, Result},
    item::{Item, ItemKind, Tag},
    validation::Validator,
    Target,
};
use std::{borrow::Cow, collections::VecDeque};

/// The pull side of a format backend: one data item per call.
///
/// `pull` returns [`Item::EndOfInput`] at a clean end of the byte stream;
/// running out of bytes in the middle of an item is an error.
pub trait Parser<'a> {
    fn target(&self) -> Target;

    /// Byte offset of the next unread input byte.
    fn cursor(&self) -> u64;

    fn pull(&mut self) -> Result<Item<'a>>;
}

/// Typed pull façade over a [`Parser`] with one item of look-ahead.
///
/// The reader always holds the next unconsumed item; `has_*` predicates
/// inspect it, `read_*` operations assert its kind, hand out the payload
/// and advance. Decoders compose these primitives and must consume exactly
/// one data item each.
pub struct Reader<'a, P: Parser<'a>> {
    parser: P,
    validator: Option<Validator>,
    replay: VecDeque<Item<'a>>,
    current: Item<'a>,
    /// byte offset at which `current` started
    pos: u64,
}

impl<'a, P: Parser<'a>> Reader<'a, P> {
    pub fn new(parser: P, validation: bool) -> Result<Self> {
        let validator = validation.then(|| Validator::new(parser.target()));
        let mut reader = Self {
            parser,
            validator,
            replay: VecDeque::new(),
            current: Item::EndOfInput,
            pos: 0,
        };
        reader.advance()?;
        Ok(reader)
    }

    /// Whether this reader decodes CBOR or JSON, for codecs that must
    /// differentiate.
    pub fn target(&self) -> Target {
        self.parser.target()
    }

    /// Byte offset at which the buffered item started.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Discriminator of the buffered item.
    pub fn kind(&self) -> ItemKind {
        self.current.kind()
    }

    /// A borrow of the buffered item.
    pub fn peek(&self) -> &Item<'a> {
        &self.current
    }

    pub fn into_parser(self) -> P {
        self.parser
    }

    fn advance(&mut self) -> Result<()> {
        if let Some(item) = self.replay.pop_front() {
            // replayed items were validated when they were first pulled
            self.pos = self.parser.cursor();
            self.current = item;
            return Ok(());
        }
        self.pos = self.parser.cursor();
        let item = self.parser.pull()?;
        if let Some(v) = &mut self.validator {
            v.check(&item, self.pos)?;
        }
        self.current = item;
        Ok(())
    }

    /// Consume the buffered item and pull the next one.
    fn take(&mut self) -> Result<Item<'a>> {
        let item = std::mem::replace(&mut self.current, Item::EndOfInput);
        self.advance()?;
        Ok(item)
    }

    /// Queue items to be read before the remainder of the live stream; used
    /// by decoders that buffer and replay parts of a map (flat ADT
    /// encoding).
    pub(crate) fn inject(&mut self, items: Vec<Item<'a>>) -> Result<()> {
        let current = std::mem::replace(&mut self.current, Item::EndOfInput);
        let mut queue = VecDeque::with_capacity(items.len() + 1 + self.replay.len());
        queue.extend(items);
        queue.push_back(current);
        queue.append(&mut self.replay);
        self.replay = queue;
        self.advance()
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::mismatch(self.pos, expected, self.current.kind())
    }

    pub fn has(&self, kind: ItemKind) -> bool {
        self.current.kind() == kind
    }

    pub fn has_null(&self) -> bool {
        self.has(ItemKind::Null)
    }

    pub fn has_bool(&self) -> bool {
        self.has(ItemKind::Bool)
    }

    pub fn has_str(&self) -> bool {
        self.has(ItemKind::Str)
    }

    pub fn has_bytes(&self) -> bool {
        self.has(ItemKind::Bytes)
    }

    pub fn has_number_string(&self) -> bool {
        self.has(ItemKind::NumberString)
    }

    pub fn has_break(&self) -> bool {
        self.has(ItemKind::Break)
    }

    pub fn has_tag(&self) -> bool {
        self.has(ItemKind::Tag)
    }

    pub fn has_end_of_input(&self) -> bool {
        self.has(ItemKind::EndOfInput)
    }

    /// Whether the buffered item is any of the integer kinds.
    pub fn has_integer(&self) -> bool {
        matches!(
            self.current,
            Item::Int(_) | Item::Long(_) | Item::OverLong { .. }
        )
    }

    pub fn read_null(&mut self) -> Result<()> {
        match self.current {
            Item::Null => self.take().map(|_| ()),
            _ => Err(self.mismatch("null")),
        }
    }

    pub fn read_undefined(&mut self) -> Result<()> {
        match self.current {
            Item::Undefined => self.take().map(|_| ()),
            _ => Err(self.mismatch("undefined")),
        }
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.current {
            Item::Bool(b) => {
                self.take()?;
                Ok(b)
            }
            _ => Err(self.mismatch("boolean")),
        }
    }

    pub fn read_int(&mut self) -> Result<i32> {
        match self.current {
            Item::Int(i) => {
                self.take()?;
                Ok(i)
            }
            _ => Err(self.mismatch("int")),
        }
    }

    pub fn read_long(&mut self) -> Result<i64> {
        match self.current {
            Item::Int(i) => {
                self.take()?;
                Ok(i64::from(i))
            }
            Item::Long(l) => {
                self.take()?;
                Ok(l)
            }
            _ => Err(self.mismatch("long")),
        }
    }

    pub fn read_over_long(&mut self) -> Result<(bool, u64)> {
        match self.current {
            Item::OverLong { negative, value } => {
                self.take()?;
                Ok((negative, value))
            }
            _ => Err(self.mismatch("overlong integer")),
        }
    }

    /// Any integer item with a non-negative value, widened to `u64`.
    pub fn read_unsigned(&mut self) -> Result<u64> {
        match self.current {
            Item::Int(i) if i >= 0 => {
                self.take()?;
                Ok(i as u64)
            }
            Item::Long(l) if l >= 0 => {
                self.take()?;
                Ok(l as u64)
            }
            Item::OverLong {
                negative: false,
                value,
            } => {
                self.take()?;
                Ok(value)
            }
            _ => Err(self.mismatch("unsigned integer")),
        }
    }

    /// Any integer item within the signed 64-bit range.
    pub fn read_signed(&mut self) -> Result<i64> {
        match self.current {
            Item::Int(i) => {
                self.take()?;
                Ok(i64::from(i))
            }
            Item::Long(l) => {
                self.take()?;
                Ok(l)
            }
            _ => Err(self.mismatch("signed integer")),
        }
    }

    pub fn read_float16(&mut self) -> Result<f32> {
        match self.current {
            Item::Float16(f) => {
                self.take()?;
                Ok(f)
            }
            _ => Err(self.mismatch("half-precision float")),
        }
    }

    pub fn read_float(&mut self) -> Result<f32> {
        match self.current {
            Item::Float16(f) | Item::Float(f) => {
                self.take()?;
                Ok(f)
            }
            _ => Err(self.mismatch("float")),
        }
    }

    pub fn read_double(&mut self) -> Result<f64> {
        match self.current {
            Item::Float16(f) | Item::Float(f) => {
                self.take()?;
                Ok(f64::from(f))
            }
            Item::Double(d) => {
                self.take()?;
                Ok(d)
            }
            _ => Err(self.mismatch("double")),
        }
    }

    pub fn read_number_string(&mut self) -> Result<Cow<'a, str>> {
        if !matches!(self.current, Item::NumberString(_)) {
            return Err(self.mismatch("number string"));
        }
        match self.take()? {
            Item::NumberString(s) => Ok(s),
            _ => unreachable!(),
        }
    }

    pub fn read_bytes(&mut self) -> Result<Cow<'a, [u8]>> {
        if !matches!(self.current, Item::Bytes(_)) {
            return Err(self.mismatch("byte string"));
        }
        match self.take()? {
            Item::Bytes(b) => Ok(b),
            _ => unreachable!(),
        }
    }

    pub fn read_bytes_start(&mut self) -> Result<()> {
        match self.current {
            Item::BytesStart => self.take().map(|_| ()),
            _ => Err(self.mismatch("start of byte string")),
        }
    }

    pub fn read_str(&mut self) -> Result<Cow<'a, str>> {
        if !matches!(self.current, Item::Str(_)) {
            return Err(self.mismatch("text string"));
        }
        match self.take()? {
            Item::Str(s) => Ok(s),
            _ => unreachable!(),
        }
    }

    pub fn read_text_start(&mut self) -> Result<()> {
        match self.current {
            Item::TextStart => self.take().map(|_| ()),
            _ => Err(self.mismatch("start of text string")),
        }
    }

    pub fn read_array_header(&mut self) -> Result<u64> {
        match self.current {
            Item::ArrayHeader(n) => {
                self.take()?;
                Ok(n)
            }
            _ => Err(self.mismatch("array header")),
        }
    }

    pub fn read_array_start(&mut self) -> Result<()> {
        match self.current {
            Item::ArrayStart => self.take().map(|_| ()),
            _ => Err(self.mismatch("start of array")),
        }
    }

    /// Accept either array form: `Some(n)` for a definite header, `None`
    /// for an indefinite start whose end is a `Break`.
    pub fn read_array_open(&mut self) -> Result<Option<u64>> {
        match self.current {
            Item::ArrayHeader(n) => {
                self.take()?;
                Ok(Some(n))
            }
            Item::ArrayStart => {
                self.take()?;
                Ok(None)
            }
            _ => Err(self.mismatch("array")),
        }
    }

    pub fn read_map_header(&mut self) -> Result<u64> {
        match self.current {
            Item::MapHeader(n) => {
                self.take()?;
                Ok(n)
            }
            _ => Err(self.mismatch("map header")),
        }
    }

    pub fn read_map_start(&mut self) -> Result<()> {
        match self.current {
            Item::MapStart => self.take().map(|_| ()),
            _ => Err(self.mismatch("start of map")),
        }
    }

    /// Accept either map form: `Some(n)` entries for a definite header,
    /// `None` for an indefinite start whose end is a `Break`.
    pub fn read_map_open(&mut self) -> Result<Option<u64>> {
        match self.current {
            Item::MapHeader(n) => {
                self.take()?;
                Ok(Some(n))
            }
            Item::MapStart => {
                self.take()?;
                Ok(None)
            }
            _ => Err(self.mismatch("map")),
        }
    }

    pub fn read_break(&mut self) -> Result<()> {
        match self.current {
            Item::Break => self.take().map(|_| ()),
            _ => Err(self.mismatch("break")),
        }
    }

    pub fn read_tag(&mut self) -> Result<Tag> {
        match self.current {
            Item::Tag(tag) => {
                self.take()?;
                Ok(tag)
            }
            _ => Err(self.mismatch("tag")),
        }
    }

    pub fn read_simple(&mut self) -> Result<u8> {
        match self.current {
            Item::Simple(v) => {
                self.take()?;
                Ok(v)
            }
            _ => Err(self.mismatch("simple value")),
        }
    }

    pub fn read_end_of_input(&mut self) -> Result<()> {
        match self.current {
            Item::EndOfInput => Ok(()),
            _ => Err(self.mismatch("end of input")),
        }
    }

    pub fn try_read_null(&mut self) -> Result<bool> {
        if self.has_null() {
            self.take()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn try_read_break(&mut self) -> Result<bool> {
        if self.has_break() {
            self.take()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn try_read_array_start(&mut self) -> Result<bool> {
        if self.has(ItemKind::ArrayStart) {
            self.take()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn try_read_map_start(&mut self) -> Result<bool> {
        if self.has(ItemKind::MapStart) {
            self.take()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume any tags preceding the next data item, for codecs that do
    /// not care about them.
    pub fn skip_tags(&mut self) -> Result<()> {
        while self.has_tag() {
            self.read_tag()?;
        }
        Ok(())
    }

    /// Consume the given tag if it is the buffered item.
    pub fn try_read_tag(&mut self, tag: Tag) -> Result<bool> {
        match self.current {
            Item::Tag(t) if t == tag => {
                self.take()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Consume the buffered item if it is the given text string.
    pub fn try_read_str(&mut self, expected: &str) -> Result<bool> {
        match &self.current {
            Item::Str(s) if s == expected => {
                self.take()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Consume one complete value, which may be a composite of any depth.
    /// Tags preceding the value are skipped along with it.
    pub fn skip_element(&mut self) -> Result<()> {
        self.walk_element(|_| {})
    }

    /// Like [`skip_element`](Self::skip_element) but hands every consumed
    /// item to `sink`, preserving stream order.
    pub(crate) fn capture_element(&mut self, out: &mut Vec<Item<'a>>) -> Result<()> {
        self.walk_element(|item| out.push(item))
    }

    fn walk_element(&mut self, mut sink: impl FnMut(Item<'a>)) -> Result<()> {
        if matches!(self.current, Item::Break) {
            return Err(self.mismatch("a data item"));
        }
        // remaining values per open frame, None for break-terminated ones
        let mut frames: Vec<Option<u64>> = Vec::new();
        loop {
            let pos = self.pos;
            let item = self.take()?;
            let completed = match &item {
                Item::Tag(_) => false,
                Item::ArrayStart | Item::MapStart | Item::BytesStart | Item::TextStart => {
                    frames.push(None);
                    false
                }
                Item::ArrayHeader(n) => {
                    if *n > 0 {
                        frames.push(Some(*n));
                        false
                    } else {
                        true
                    }
                }
                Item::MapHeader(n) => {
                    // the validator has bounded these sizes already
                    let children = n.saturating_mul(2);
                    if children > 0 {
                        frames.push(Some(children));
                        false
                    } else {
                        true
                    }
                }
                Item::Break => {
                    frames.pop();
                    true
                }
                Item::EndOfInput => {
                    return Err(Error::eof(pos, "a data item to skip"));
                }
                _ => true,
            };
            sink(item);
            if completed {
                while let Some(frame) = frames.last_mut() {
                    match frame {
                        Some(n) => {
                            *n -= 1;
                            if *n == 0 {
                                frames.pop();
                                continue;
                            }
                        }
                        None => {}
                    }
                    break;
                }
                if frames.is_empty() {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cbor::{CborDecodeConfig, CborParser},
        input::SliceInput,
        json::{JsonDecodeConfig, JsonParser},
    };

    fn cbor_reader(bytes: &[u8]) -> Reader<'_, CborParser<'_, SliceInput<'_>>> {
        Reader::new(
            CborParser::new(SliceInput::new(bytes), CborDecodeConfig::default()),
            true,
        )
        .unwrap()
    }

    fn json_reader(text: &str) -> Reader<'_, JsonParser<'_, SliceInput<'_>>> {
        Reader::new(
            JsonParser::new(SliceInput::new(text.as_bytes()), JsonDecodeConfig::default()),
            true,
        )
        .unwrap()
    }

    #[test]
    fn look_ahead_and_typed_reads() {
        let mut r = cbor_reader(&[0x82, 0x18, 0x2a, 0x63, b'a', b'b', b'c']);
        assert!(r.has(ItemKind::ArrayHeader));
        assert_eq!(r.read_array_header().unwrap(), 2);
        assert!(r.has_integer());
        assert_eq!(r.read_int().unwrap(), 42);
        assert_eq!(r.read_str().unwrap(), "abc");
        assert!(r.has_end_of_input());
    }

    #[test]
    fn mismatch_reports_expected_and_actual() {
        let mut r = cbor_reader(&[0xf5]);
        let err = r.read_int().unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedDataItem {
                pos: 0,
                expected: "int",
                actual: ItemKind::Bool
            }
        );
    }

    #[test]
    fn try_reads_leave_the_buffer_on_mismatch() {
        let mut r = json_reader("[null, 1]");
        assert!(r.try_read_array_start().unwrap());
        assert!(!r.try_read_break().unwrap());
        assert!(r.try_read_null().unwrap());
        assert_eq!(r.read_int().unwrap(), 1);
        assert!(r.try_read_break().unwrap());
        r.read_end_of_input().unwrap();
    }

    #[test]
    fn skip_element_respects_arity_and_breaks() {
        let mut r = json_reader(r#"[{"a": [1, 2], "b": null}, "rest"]"#);
        r.read_array_start().unwrap();
        r.skip_element().unwrap();
        assert_eq!(r.read_str().unwrap(), "rest");
        r.read_break().unwrap();
        r.read_end_of_input().unwrap();
    }

    #[test]
    fn skip_element_handles_tags_and_headers() {
        // 55799([1, [2, 3]]) followed by 7
        let mut r = cbor_reader(&[
            0xd9, 0xd9, 0xf7, 0x82, 0x01, 0x82, 0x02, 0x03, 0x07,
        ]);
        r.skip_element().unwrap();
        assert_eq!(r.read_int().unwrap(), 7);
        r.read_end_of_input().unwrap();
    }
}
