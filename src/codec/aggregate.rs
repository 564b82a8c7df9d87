//! Combinators for the aggregate encodings that derived record and
//! sum-type codecs are built from: array-based and map-based products,
//! wrapped and flat sums.
//!
//! These are plain functions over [`Reader`](crate::Reader) and
//! [`Writer`](crate::Writer) rather than a class hierarchy, so hand-written
//! and generated codecs compose the same way.

use super::Encode;
use crate::{
    error::{Error, Result},
    item::Item,
    reader::{Parser, Reader},
    writer::{Renderer, Writer},
};
use std::borrow::Cow;

/// A record field key or sum-type id: a string or a (possibly negative)
/// integer chosen by an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Str(&'static str),
    Int(i64),
}

impl Key {
    fn write<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        match self {
            Key::Str(s) => w.write_str(s),
            Key::Int(i) => w.write_signed(*i),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Str(s) => write!(f, "`{}`", s),
            Key::Int(i) => write!(f, "{}", i),
        }
    }
}

/// Configuration shared by derived codecs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeriveConfig {
    /// Write fields whose value equals the declared default instead of
    /// omitting them.
    pub encode_member_default_values: bool,
}

/// Reject sum types whose variants do not have pairwise distinct ids; the
/// derivation layer calls this once per type.
pub fn check_distinct_type_ids(ids: &[Key]) -> Result<()> {
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[..i] {
            if a == b {
                return Err(Error::invalid(0, format!("duplicate type id {}", a)));
            }
        }
    }
    Ok(())
}

/// Write a record of the given arity in array-based form: fields in
/// declaration order inside an array, except that unary records are written
/// as the bare field.
pub fn write_array_based<R: Renderer>(
    w: &mut Writer<R>,
    arity: u64,
    fields: impl FnOnce(&mut Writer<R>) -> Result<()>,
) -> Result<()> {
    if arity == 1 {
        fields(w)
    } else {
        w.write_array_open(arity)?;
        fields(w)?;
        w.write_array_close()
    }
}

/// Read a record written by [`write_array_based`]: accepts the definite and
/// the break-terminated array forms and enforces the arity.
pub fn read_array_based<'b, P: Parser<'b>, T>(
    r: &mut Reader<'b, P>,
    arity: u64,
    fields: impl FnOnce(&mut Reader<'b, P>) -> Result<T>,
) -> Result<T> {
    if arity == 1 {
        return fields(r);
    }
    let pos = r.pos();
    let size = r.read_array_open()?;
    if let Some(n) = size {
        if n != arity {
            return Err(Error::invalid(
                pos,
                format!("expected array of {} elements but got {}", arity, n),
            ));
        }
    }
    let value = fields(r)?;
    if size.is_none() && !r.try_read_break()? {
        return Err(Error::invalid(
            r.pos(),
            format!("expected array of {} elements", arity),
        ));
    }
    Ok(value)
}

/// Writes the members of a map-based record; created by
/// [`write_map_based`] and [`write_flat`].
pub struct FieldWriter<'w, R: Renderer> {
    w: &'w mut Writer<R>,
    config: DeriveConfig,
}

impl<'w, R: Renderer> FieldWriter<'w, R> {
    pub fn field<T: Encode + ?Sized>(&mut self, key: Key, value: &T) -> Result<()> {
        key.write(self.w)?;
        value.encode(self.w)
    }

    /// Skip the member when it equals its declared default, unless
    /// configured otherwise. The caller must count such fields the same way
    /// via [`counts_field`].
    pub fn field_with_default<T: Encode + PartialEq>(
        &mut self,
        key: Key,
        value: &T,
        default: &T,
    ) -> Result<()> {
        if self.config.encode_member_default_values || value != default {
            self.field(key, value)?;
        }
        Ok(())
    }
}

/// Whether a defaulted member will occupy a map entry under `config`; used
/// to precompute the arity passed to [`write_map_based`].
pub fn counts_field<T: PartialEq>(config: DeriveConfig, value: &T, default: &T) -> bool {
    config.encode_member_default_values || value != default
}

/// Write a record as a map with one entry per (non-omitted) field.
pub fn write_map_based<R: Renderer>(
    w: &mut Writer<R>,
    config: DeriveConfig,
    arity: u64,
    fields: impl FnOnce(&mut FieldWriter<'_, R>) -> Result<()>,
) -> Result<()> {
    w.write_map_open(arity)?;
    fields(&mut FieldWriter { w, config })?;
    w.write_map_close()
}

/// Unary records compact to the bare field; everything else is map-based.
/// `arity` is the record's declared field count, the same value handed to
/// [`read_compact_map_based`].
pub fn write_compact_map_based<R: Renderer>(
    w: &mut Writer<R>,
    config: DeriveConfig,
    arity: u64,
    bare: impl FnOnce(&mut Writer<R>) -> Result<()>,
    fields: impl FnOnce(&mut FieldWriter<'_, R>) -> Result<()>,
) -> Result<()> {
    if arity == 1 {
        bare(w)
    } else {
        write_map_based(w, config, arity, fields)
    }
}

/// Read a record written by [`write_compact_map_based`]: the bare field for
/// a unary record, otherwise `map_based` must decode the map form (usually
/// through [`read_map_based`]). `arity` is the record's declared field
/// count, so the dispatch mirrors the write side exactly.
pub fn read_compact_map_based<'b, P: Parser<'b>, T>(
    r: &mut Reader<'b, P>,
    arity: u64,
    bare: impl FnOnce(&mut Reader<'b, P>) -> Result<T>,
    map_based: impl FnOnce(&mut Reader<'b, P>) -> Result<T>,
) -> Result<T> {
    if arity == 1 {
        bare(r)
    } else {
        map_based(r)
    }
}

/// Read a record written in map-based form.
///
/// Members may come in any order; `field` is invoked with the declaration
/// index of the matched key and must decode exactly the member value.
/// Unknown keys are skipped, duplicates are an error. Returns the bitmask
/// of members seen so the caller can substitute defaults or report what is
/// missing (see [`require_field`]).
pub fn read_map_based<'b, P: Parser<'b>>(
    r: &mut Reader<'b, P>,
    keys: &[Key],
    mut field: impl FnMut(usize, &mut Reader<'b, P>) -> Result<()>,
) -> Result<u128> {
    debug_assert!(keys.len() <= 128);
    let mut seen = 0u128;
    super::basic::decode_map_entries(r, |r| {
        let key_pos = r.pos();
        let index = match_key(r, keys)?;
        match index {
            Some(i) => {
                let bit = 1u128 << i;
                if seen & bit != 0 {
                    return Err(Error::invalid(
                        key_pos,
                        format!("duplicate map key {}", keys[i]),
                    ));
                }
                seen |= bit;
                field(i, r)
            }
            None => r.skip_element(),
        }
    })?;
    Ok(seen)
}

/// The error for a member that was neither present nor defaulted.
pub fn missing_field(pos: u64, key: Key) -> Error {
    Error::invalid(pos, format!("missing map key {}", key))
}

/// Convenience for checking a [`read_map_based`] result: fail unless member
/// `index` was seen.
pub fn require_field(seen: u128, index: usize, keys: &[Key], pos: u64) -> Result<()> {
    if seen & (1u128 << index) == 0 {
        Err(missing_field(pos, keys[index]))
    } else {
        Ok(())
    }
}

/// Match the next map key against the declared keys; consumes the key item,
/// or skips it (returning `None`) when it matches nothing. Integer keys
/// that were stringified on the JSON side match their `Key::Int`.
fn match_key<'b, P: Parser<'b>>(r: &mut Reader<'b, P>, keys: &[Key]) -> Result<Option<usize>> {
    if r.has_str() {
        let s = r.read_str()?;
        for (i, key) in keys.iter().enumerate() {
            match key {
                Key::Str(k) if *k == s.as_ref() => return Ok(Some(i)),
                Key::Int(k) if s.parse::<i64>() == Ok(*k) => return Ok(Some(i)),
                _ => {}
            }
        }
        Ok(None)
    } else if r.has_integer() {
        let v = r.read_signed()?;
        for (i, key) in keys.iter().enumerate() {
            if matches!(key, Key::Int(k) if *k == v) {
                return Ok(Some(i));
            }
        }
        Ok(None)
    } else {
        r.skip_element()?;
        Ok(None)
    }
}

/// Write a sum-type instance in the wrapped encoding: a single-entry map
/// whose key is the variant's type id and whose value is the payload.
pub fn write_wrapped<R: Renderer>(
    w: &mut Writer<R>,
    type_id: Key,
    payload: impl FnOnce(&mut Writer<R>) -> Result<()>,
) -> Result<()> {
    w.write_map_open(1)?;
    type_id.write(w)?;
    payload(w)?;
    w.write_map_close()
}

/// The type id found while decoding a sum-type instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeId<'b> {
    Str(Cow<'b, str>),
    Int(i64),
}

impl<'b> TypeId<'b> {
    pub fn matches(&self, key: Key) -> bool {
        match (self, key) {
            (TypeId::Str(s), Key::Str(k)) => s == k,
            (TypeId::Int(i), Key::Int(k)) => *i == k,
            _ => false,
        }
    }
}

impl std::fmt::Display for TypeId<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeId::Str(s) => write!(f, "`{}`", s),
            TypeId::Int(i) => write!(f, "{}", i),
        }
    }
}

fn read_type_id<'b, P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<TypeId<'b>> {
    if r.has_str() {
        Ok(TypeId::Str(r.read_str()?))
    } else {
        Ok(TypeId::Int(r.read_signed()?))
    }
}

/// Read a sum-type instance written by [`write_wrapped`]; `variant`
/// receives the type id and must decode exactly the payload item.
pub fn read_wrapped<'b, P: Parser<'b>, T>(
    r: &mut Reader<'b, P>,
    variant: impl FnOnce(&TypeId<'b>, &mut Reader<'b, P>) -> Result<T>,
) -> Result<T> {
    let pos = r.pos();
    let size = r.read_map_open()?;
    if let Some(n) = size {
        if n != 1 {
            return Err(Error::invalid(
                pos,
                format!("expected single-entry map but got {} entries", n),
            ));
        }
    }
    let type_id = read_type_id(r)?;
    let value = variant(&type_id, r)?;
    if size.is_none() {
        r.read_break()?;
    }
    Ok(value)
}

/// The discriminator member used by the flat sum-type encoding.
pub const TYPE_MEMBER: &str = "_type";

/// Write a sum-type instance in the flat encoding: one map carrying the
/// `_type` member alongside the payload fields. Requires the variant to
/// encode as a map, which is why the payload is given as fields rather than
/// a value.
pub fn write_flat<R: Renderer>(
    w: &mut Writer<R>,
    config: DeriveConfig,
    type_id: Key,
    payload_arity: u64,
    fields: impl FnOnce(&mut FieldWriter<'_, R>) -> Result<()>,
) -> Result<()> {
    w.write_map_open(payload_arity + 1)?;
    w.write_str(TYPE_MEMBER)?;
    match type_id {
        Key::Str(s) => w.write_str(s)?,
        Key::Int(i) => w.write_signed(i)?,
    }
    fields(&mut FieldWriter { w, config })?;
    w.write_map_close()
}

/// Read a sum-type instance written in the flat encoding.
///
/// The `_type` member may appear at any position: members preceding it are
/// buffered and replayed, so `variant` always observes a complete map item
/// (without the `_type` entry) and decodes it like any map-based record.
pub fn read_flat<'b, P: Parser<'b>, T>(
    r: &mut Reader<'b, P>,
    variant: impl FnOnce(&TypeId<'b>, &mut Reader<'b, P>) -> Result<T>,
) -> Result<T> {
    let pos = r.pos();
    let size = r.read_map_open()?;
    let mut buffered: Vec<Item<'b>> = Vec::new();
    let mut entries_taken = 0u64;
    loop {
        let exhausted = match size {
            Some(n) => entries_taken == n,
            None => r.has_break(),
        };
        if exhausted {
            return Err(Error::invalid(
                pos,
                format!(
                    "expected type-id member `{}` in flat encoding but got none",
                    TYPE_MEMBER
                ),
            ));
        }
        if r.has_str() {
            let key = r.read_str()?;
            if key == TYPE_MEMBER {
                let type_id = read_type_id(r)?;
                let mut replay = Vec::with_capacity(buffered.len() + 1);
                replay.push(match size {
                    Some(n) => Item::MapHeader(n - 1),
                    None => Item::MapStart,
                });
                replay.extend(buffered);
                r.inject(replay)?;
                return variant(&type_id, r);
            }
            buffered.push(Item::Str(key));
            r.capture_element(&mut buffered)?;
        } else {
            r.capture_element(&mut buffered)?;
            r.capture_element(&mut buffered)?;
        }
        entries_taken += 1;
    }
}
