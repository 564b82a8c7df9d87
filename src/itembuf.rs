//! An in-memory item stream: a [`Renderer`] that collects items and a
//! [`Parser`] that replays them. This is what lets
//! [`transcode`](crate::transcode) re-shape values without serializing to
//! bytes, and it doubles as a test harness for codecs.

use crate::{
    error::{Error, Result},
    item::Item,
    reader::Parser,
    writer::Renderer,
    Target,
};

/// Collects the items of one encoded value. The `target` decides which
/// format codecs believe they are writing for (byte strings, number
/// strings and map keys differ between the two).
#[derive(Debug)]
pub struct ItemBuf {
    target: Target,
    items: Vec<Item<'static>>,
}

impl ItemBuf {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item<'static>] {
        &self.items
    }

    /// Turn the collected items into a replay parser.
    pub fn into_parser(self) -> ItemBufParser {
        ItemBufParser {
            target: self.target,
            next: 0,
            items: self.items,
        }
    }
}

impl Renderer for ItemBuf {
    fn target(&self) -> Target {
        self.target
    }

    fn cursor(&self) -> u64 {
        self.items.len() as u64
    }

    fn put(&mut self, item: &Item<'_>) -> Result<()> {
        if let Item::EndOfInput = item {
            return Err(Error::invalid(
                self.cursor(),
                "end of input is not a writable item",
            ));
        }
        self.items.push(item.clone().into_owned());
        Ok(())
    }
}

/// Replays a collected item stream; positions are item indices rather than
/// byte offsets.
#[derive(Debug)]
pub struct ItemBufParser {
    target: Target,
    next: usize,
    items: Vec<Item<'static>>,
}

impl Parser<'static> for ItemBufParser {
    fn target(&self) -> Target {
        self.target
    }

    fn cursor(&self) -> u64 {
        self.next as u64
    }

    fn pull(&mut self) -> Result<Item<'static>> {
        match self.items.get(self.next) {
            Some(item) => {
                self.next += 1;
                Ok(item.clone())
            }
            None => Ok(Item::EndOfInput),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reader, Writer};

    #[test]
    fn collected_items_replay_in_order() {
        let mut w = Writer::new(ItemBuf::new(Target::Cbor), true);
        w.write_array_open(2).unwrap();
        w.write_int(1).unwrap();
        w.write_str("two").unwrap();
        w.write_array_close().unwrap();

        let buf = w.into_renderer();
        assert_eq!(buf.len(), 3);

        let mut r = Reader::new(buf.into_parser(), true).unwrap();
        assert_eq!(r.read_array_header().unwrap(), 2);
        assert_eq!(r.read_int().unwrap(), 1);
        assert_eq!(r.read_str().unwrap(), "two");
        r.read_end_of_input().unwrap();
    }
}
