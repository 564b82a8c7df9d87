use crate::{
    error::{Error, Result},
    item::{Item, ItemKind},
    Target,
};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Array,
    Map,
    Bytes,
    Text,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    /// children left to receive; `None` for indefinite-length containers
    remaining: Option<u64>,
    /// map frames only: the next child is a value, not a key
    expect_value: bool,
}

impl Frame {
    fn definite(kind: FrameKind, remaining: u64) -> Self {
        Frame {
            kind,
            remaining: Some(remaining),
            expect_value: false,
        }
    }

    fn indefinite(kind: FrameKind) -> Self {
        Frame {
            kind,
            remaining: None,
            expect_value: false,
        }
    }
}

/// Enforces the item-stream grammar between the [`Reader`](crate::Reader) /
/// [`Writer`](crate::Writer) façades and the format backends: container
/// arities, key/value alternation, chunk majors inside indefinite strings,
/// break placement and dangling tags.
///
/// The validator is target-aware only for the JSON map-key rule; everything
/// else is format-neutral. It can be switched off through the config structs
/// for trusted producers.
#[derive(Debug)]
pub struct Validator {
    target: Target,
    integer_map_keys: bool,
    frames: SmallVec<[Frame; 16]>,
    pending_tag: bool,
}

impl Validator {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            integer_map_keys: false,
            frames: SmallVec::new(),
            pending_tag: false,
        }
    }

    /// Accept integer map keys under JSON, for a renderer that stringifies
    /// them itself.
    pub fn allow_integer_map_keys(mut self, allowed: bool) -> Self {
        self.integer_map_keys = allowed;
        self
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Account for one item at byte offset `pos`.
    pub fn check(&mut self, item: &Item<'_>, pos: u64) -> Result<()> {
        match item {
            Item::Tag(_) => {
                match self.frames.last() {
                    Some(f) if f.kind == FrameKind::Bytes || f.kind == FrameKind::Text => {
                        return Err(Error::invalid(
                            pos,
                            "tag inside an indefinite-length string",
                        ));
                    }
                    _ => {}
                }
                self.pending_tag = true;
                Ok(())
            }
            Item::EndOfInput => {
                if self.pending_tag {
                    return Err(Error::invalid(pos, "tag not followed by a data item"));
                }
                if let Some(f) = self.frames.last() {
                    let what = match f.kind {
                        FrameKind::Array => "unclosed array",
                        FrameKind::Map => "unclosed map",
                        FrameKind::Bytes => "unclosed byte string",
                        FrameKind::Text => "unclosed text string",
                    };
                    return Err(Error::invalid(pos, what));
                }
                Ok(())
            }
            Item::Break => {
                if self.pending_tag {
                    return Err(Error::invalid(pos, "tag not followed by a data item"));
                }
                match self.frames.pop() {
                    None => Err(Error::invalid(pos, "break outside any container")),
                    Some(f) if f.remaining.is_some() => {
                        Err(Error::invalid(pos, "break inside definite-length container"))
                    }
                    Some(f) if f.expect_value => {
                        Err(Error::invalid(pos, "break while a map value is expected"))
                    }
                    Some(_) => Ok(()),
                }
            }
            _ => {
                self.pending_tag = false;
                self.check_string_chunk(item, pos)?;
                self.check_map_key(item, pos)?;
                self.count_child();
                match item {
                    Item::ArrayStart => self.frames.push(Frame::indefinite(FrameKind::Array)),
                    Item::MapStart => self.frames.push(Frame::indefinite(FrameKind::Map)),
                    Item::BytesStart => self.frames.push(Frame::indefinite(FrameKind::Bytes)),
                    Item::TextStart => self.frames.push(Frame::indefinite(FrameKind::Text)),
                    Item::ArrayHeader(n) => {
                        if *n > 0 {
                            self.frames.push(Frame::definite(FrameKind::Array, *n));
                        }
                    }
                    Item::MapHeader(n) => {
                        let children = n.checked_mul(2).ok_or_else(|| {
                            Error::overflow(pos, "map size exceeds representable range")
                        })?;
                        if children > 0 {
                            self.frames.push(Frame::definite(FrameKind::Map, children));
                        }
                    }
                    _ => {}
                }
                Ok(())
            }
        }
    }

    /// Inside an indefinite byte or text string only chunks of the same
    /// string flavor may appear.
    fn check_string_chunk(&self, item: &Item<'_>, pos: u64) -> Result<()> {
        match self.frames.last().map(|f| f.kind) {
            Some(FrameKind::Bytes) if item.kind() != ItemKind::Bytes => Err(Error::invalid(
                pos,
                format!(
                    "expected byte string chunk or break but got {}",
                    item.kind()
                ),
            )),
            Some(FrameKind::Text) if item.kind() != ItemKind::Str => Err(Error::invalid(
                pos,
                format!(
                    "expected text string chunk or break but got {}",
                    item.kind()
                ),
            )),
            _ => Ok(()),
        }
    }

    fn check_map_key(&self, item: &Item<'_>, pos: u64) -> Result<()> {
        if self.target == Target::Json {
            if let Some(f) = self.frames.last() {
                if f.kind == FrameKind::Map && !f.expect_value && item.kind() != ItemKind::Str {
                    let integer = matches!(
                        item.kind(),
                        ItemKind::Int | ItemKind::Long | ItemKind::OverLong
                    );
                    if !(integer && self.integer_map_keys) {
                        return Err(Error::unsupported(
                            pos,
                            format!("JSON map key must be a text string, not {}", item.kind()),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Record one value beginning in the innermost frame: flip the map
    /// alternation and close a definite frame that just became complete.
    /// A closed frame was already counted in its parent when it was pushed,
    /// so completion does not cascade.
    fn count_child(&mut self) {
        if let Some(f) = self.frames.last_mut() {
            if f.kind == FrameKind::Map {
                f.expect_value = !f.expect_value;
            }
            if let Some(n) = &mut f.remaining {
                *n -= 1;
                if *n == 0 {
                    self.frames.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn feed(v: &mut Validator, items: &[Item<'_>]) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            v.check(item, i as u64)?;
        }
        Ok(())
    }

    #[test]
    fn definite_array_closes_by_counting() {
        let mut v = Validator::new(Target::Cbor);
        feed(
            &mut v,
            &[
                Item::ArrayHeader(2),
                Item::Int(1),
                Item::Int(2),
                Item::EndOfInput,
            ],
        )
        .unwrap();
        assert_eq!(v.depth(), 0);
    }

    #[test]
    fn break_only_closes_indefinite_frames() {
        let mut v = Validator::new(Target::Cbor);
        feed(&mut v, &[Item::ArrayStart, Item::Int(1), Item::Break]).unwrap();

        let mut v = Validator::new(Target::Cbor);
        let err = feed(&mut v, &[Item::ArrayHeader(2), Item::Break]).unwrap_err();
        assert!(matches!(err, Error::InvalidInputData { .. }));
    }

    #[test]
    fn map_alternation_is_tracked() {
        let mut v = Validator::new(Target::Cbor);
        let err = feed(
            &mut v,
            &[Item::MapStart, Item::Str(Cow::Borrowed("k")), Item::Break],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInputData { .. }));
    }

    #[test]
    fn json_map_keys_must_be_text() {
        let mut v = Validator::new(Target::Json);
        let err = feed(&mut v, &[Item::MapStart, Item::Int(1)]).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));

        let mut v = Validator::new(Target::Cbor);
        feed(&mut v, &[Item::MapStart, Item::Int(1)]).unwrap();
    }

    #[test]
    fn chunks_must_match_the_string_flavor() {
        let mut v = Validator::new(Target::Cbor);
        let err = feed(
            &mut v,
            &[Item::BytesStart, Item::Str(Cow::Borrowed("nope"))],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInputData { .. }));
    }

    #[test]
    fn dangling_tag_is_caught_at_end_of_input() {
        let mut v = Validator::new(Target::Cbor);
        let err = feed(
            &mut v,
            &[Item::Tag(crate::item::Tag::EpochDateTime), Item::EndOfInput],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInputData { .. }));
    }

    #[test]
    fn nested_completion_cascades() {
        let mut v = Validator::new(Target::Cbor);
        feed(
            &mut v,
            &[
                Item::ArrayHeader(1),
                Item::MapHeader(1),
                Item::Str(Cow::Borrowed("k")),
                Item::ArrayStart,
                Item::Break,
                Item::EndOfInput,
            ],
        )
        .unwrap();
        assert_eq!(v.depth(), 0);
    }
}
