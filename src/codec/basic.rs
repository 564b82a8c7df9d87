use super::{BaseN, Decode, Encode};
use crate::{
    error::{Error, Result},
    item::ItemKind,
    output::ByteAccess,
    reader::{Parser, Reader},
    writer::{Renderer, Writer},
    Target,
};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    hash::Hash,
};

impl Encode for bool {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_bool(*self)
    }
}

impl<'b> Decode<'b> for bool {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        r.read_bool()
    }
}

macro_rules! unsigned {
    ($($t:ty),+) => {
        $(
            impl Encode for $t {
                fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
                    w.write_unsigned(*self as u64)
                }
            }

            impl<'b> Decode<'b> for $t {
                fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
                    let pos = r.pos();
                    let value = r.read_unsigned()?;
                    <$t>::try_from(value).map_err(|_| {
                        Error::overflow(
                            pos,
                            concat!("value out of range for ", stringify!($t)),
                        )
                    })
                }
            }
        )+
    };
}

unsigned!(u8, u16, u32, u64, usize);

macro_rules! signed {
    ($($t:ty),+) => {
        $(
            impl Encode for $t {
                fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
                    w.write_signed(*self as i64)
                }
            }

            impl<'b> Decode<'b> for $t {
                fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
                    let pos = r.pos();
                    let value = r.read_signed()?;
                    <$t>::try_from(value).map_err(|_| {
                        Error::overflow(
                            pos,
                            concat!("value out of range for ", stringify!($t)),
                        )
                    })
                }
            }
        )+
    };
}

signed!(i8, i16, i32, i64, isize);

impl Encode for f32 {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_float(*self)
    }
}

impl<'b> Decode<'b> for f32 {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        let pos = r.pos();
        match r.kind() {
            ItemKind::Float16 | ItemKind::Float => r.read_float(),
            ItemKind::Double => {
                let target = r.target();
                let d = r.read_double()?;
                let narrowed = d as f32;
                // JSON number literals carry no width, so narrowing is the
                // only meaningful reading there; CBOR doubles must narrow
                // exactly
                if target == Target::Json || f64::from(narrowed) == d || d.is_nan() {
                    Ok(narrowed)
                } else {
                    Err(Error::invalid(
                        pos,
                        "double value is not exactly representable as f32",
                    ))
                }
            }
            ItemKind::Int | ItemKind::Long => Ok(r.read_signed()? as f32),
            ItemKind::NumberString => {
                let s = r.read_number_string()?;
                s.parse::<f32>()
                    .map_err(|_| Error::invalid(pos, "number string is not a valid f32"))
            }
            kind => Err(Error::mismatch(pos, "float", kind)),
        }
    }
}

impl Encode for f64 {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_double(*self)
    }
}

impl<'b> Decode<'b> for f64 {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        let pos = r.pos();
        match r.kind() {
            ItemKind::Float16 | ItemKind::Float | ItemKind::Double => r.read_double(),
            ItemKind::Int | ItemKind::Long => Ok(r.read_signed()? as f64),
            ItemKind::NumberString => {
                let s = r.read_number_string()?;
                s.parse::<f64>()
                    .map_err(|_| Error::invalid(pos, "number string is not a valid f64"))
            }
            kind => Err(Error::mismatch(pos, "double", kind)),
        }
    }
}

impl Encode for char {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        let mut buf = [0u8; 4];
        w.write_str(self.encode_utf8(&mut buf))
    }
}

impl<'b> Decode<'b> for char {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        let pos = r.pos();
        let s = r.read_str()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::invalid(pos, "expected a single-character string")),
        }
    }
}

impl Encode for str {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_str(self)
    }
}

impl Encode for String {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_str(self)
    }
}

impl<'b> Decode<'b> for String {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        Cow::<str>::decode(r).map(Cow::into_owned)
    }
}

impl<'a> Encode for Cow<'a, str> {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_str(self)
    }
}

impl<'b> Decode<'b> for Cow<'b, str> {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        if r.has(ItemKind::TextStart) {
            // chunked strings merge to one value, zero chunks are legal
            r.read_text_start()?;
            let mut merged = String::new();
            while !r.try_read_break()? {
                merged.push_str(&r.read_str()?);
            }
            Ok(Cow::Owned(merged))
        } else {
            r.read_str()
        }
    }
}

/// A byte string with the format-dependent wire shape of the source system:
/// a raw CBOR byte string, a base-encoded JSON text string (base64 unless a
/// different [`BaseN`] is supplied via [`ByteString::encode_base`]).
///
/// A separate type rather than `Vec<u8>` so that `Vec<T>` keeps its uniform
/// array encoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteString(pub Vec<u8>);

impl ByteString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Encode with an explicit base for the JSON side.
    pub fn encode_base<R: Renderer>(&self, w: &mut Writer<R>, base: BaseN) -> Result<()> {
        match w.target() {
            Target::Cbor => w.write_bytes(&self.0),
            Target::Json => w.write_str(&base.encode(&self.0)),
        }
    }

    /// Decode with an explicit base for the JSON side.
    pub fn decode_base<'b, P: Parser<'b>>(r: &mut Reader<'b, P>, base: BaseN) -> Result<Self> {
        match r.target() {
            Target::Cbor => {
                if r.has(ItemKind::BytesStart) {
                    r.read_bytes_start()?;
                    let mut merged: Cow<[u8]> = ByteAccess::empty();
                    while !r.try_read_break()? {
                        merged = merged.concat(r.read_bytes()?);
                    }
                    Ok(Self(merged.into_owned()))
                } else {
                    Ok(Self(r.read_bytes()?.into_owned()))
                }
            }
            Target::Json => {
                let pos = r.pos();
                let text = r.read_str()?;
                base.decode(&text)
                    .map(Self)
                    .map_err(|e| Error::invalid(pos, format!("invalid byte string: {}", e)))
            }
        }
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Encode for ByteString {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        self.encode_base(w, BaseN::Base64)
    }
}

impl<'b> Decode<'b> for ByteString {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        Self::decode_base(r, BaseN::Base64)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_array_open(self.len() as u64)?;
        for item in self {
            item.encode(w)?;
        }
        w.write_array_close()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        self.as_slice().encode(w)
    }
}

impl<'b, T: Decode<'b>> Decode<'b> for Vec<T> {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        match r.read_array_open()? {
            Some(n) => {
                let mut items = Vec::with_capacity(n.min(1024) as usize);
                for _ in 0..n {
                    items.push(T::decode(r)?);
                }
                Ok(items)
            }
            None => {
                let mut items = Vec::new();
                while !r.try_read_break()? {
                    items.push(T::decode(r)?);
                }
                Ok(items)
            }
        }
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        match self {
            Some(value) => {
                w.write_array_open(1)?;
                value.encode(w)?;
            }
            None => w.write_array_open(0)?,
        }
        w.write_array_close()
    }
}

impl<'b, T: Decode<'b>> Decode<'b> for Option<T> {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        let pos = r.pos();
        match r.read_array_open()? {
            Some(0) => Ok(None),
            Some(1) => Ok(Some(T::decode(r)?)),
            Some(n) => Err(Error::invalid(
                pos,
                format!("expected array of 0 or 1 elements but got {}", n),
            )),
            None => {
                if r.try_read_break()? {
                    Ok(None)
                } else {
                    let value = T::decode(r)?;
                    r.read_break()?;
                    Ok(Some(value))
                }
            }
        }
    }
}

/// A two-variant sum with the wrapped encoding: a single-entry map keyed
/// `"Left"` / `"Right"` (decoding also accepts the integer keys 0 / 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<A, B> {
    Left(A),
    Right(B),
}

impl<A: Encode, B: Encode> Encode for Either<A, B> {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_map_open(1)?;
        match self {
            Either::Left(a) => {
                w.write_str("Left")?;
                a.encode(w)?;
            }
            Either::Right(b) => {
                w.write_str("Right")?;
                b.encode(w)?;
            }
        }
        w.write_map_close()
    }
}

impl<'b, A: Decode<'b>, B: Decode<'b>> Decode<'b> for Either<A, B> {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
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
        let key_pos = r.pos();
        let left = if r.has_str() {
            match r.read_str()?.as_ref() {
                "Left" => true,
                "Right" => false,
                other => {
                    return Err(Error::invalid(
                        key_pos,
                        format!("expected `Left` or `Right` key but got `{}`", other),
                    ))
                }
            }
        } else {
            match r.read_signed()? {
                0 => true,
                1 => false,
                other => {
                    return Err(Error::invalid(
                        key_pos,
                        format!("expected key 0 or 1 but got {}", other),
                    ))
                }
            }
        };
        let value = if left {
            Either::Left(A::decode(r)?)
        } else {
            Either::Right(B::decode(r)?)
        };
        if size.is_none() {
            r.read_break()?;
        }
        Ok(value)
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_map_open(self.len() as u64)?;
        for (key, value) in self {
            key.encode(w)?;
            value.encode(w)?;
        }
        w.write_map_close()
    }
}

impl<'b, K: Decode<'b> + Ord, V: Decode<'b>> Decode<'b> for BTreeMap<K, V> {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        let mut map = BTreeMap::new();
        decode_map_entries(r, |r| {
            let key_pos = r.pos();
            let key = K::decode(r)?;
            let value = V::decode(r)?;
            if map.insert(key, value).is_some() {
                return Err(Error::invalid(key_pos, "duplicate map key"));
            }
            Ok(())
        })?;
        Ok(map)
    }
}

impl<K: Encode, V: Encode> Encode for HashMap<K, V> {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        w.write_map_open(self.len() as u64)?;
        for (key, value) in self {
            key.encode(w)?;
            value.encode(w)?;
        }
        w.write_map_close()
    }
}

impl<'b, K: Decode<'b> + Eq + Hash, V: Decode<'b>> Decode<'b> for HashMap<K, V> {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        let mut map = HashMap::new();
        decode_map_entries(r, |r| {
            let key_pos = r.pos();
            let key = K::decode(r)?;
            let value = V::decode(r)?;
            if map.insert(key, value).is_some() {
                return Err(Error::invalid(key_pos, "duplicate map key"));
            }
            Ok(())
        })?;
        Ok(map)
    }
}

/// Drive `entry` once per map entry, for either map form.
pub(crate) fn decode_map_entries<'b, P: Parser<'b>>(
    r: &mut Reader<'b, P>,
    mut entry: impl FnMut(&mut Reader<'b, P>) -> Result<()>,
) -> Result<()> {
    match r.read_map_open()? {
        Some(n) => {
            for _ in 0..n {
                entry(r)?;
            }
        }
        None => {
            while !r.try_read_break()? {
                entry(r)?;
            }
        }
    }
    Ok(())
}

macro_rules! tuple {
    ($len:expr => $($t:ident . $idx:tt),+) => {
        impl<$($t: Encode),+> Encode for ($($t,)+) {
            fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
                w.write_array_open($len)?;
                $(self.$idx.encode(w)?;)+
                w.write_array_close()
            }
        }

        impl<'b, $($t: Decode<'b>),+> Decode<'b> for ($($t,)+) {
            fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
                let pos = r.pos();
                let size = r.read_array_open()?;
                if let Some(n) = size {
                    if n != $len {
                        return Err(Error::invalid(
                            pos,
                            format!("expected array of {} elements but got {}", $len, n),
                        ));
                    }
                }
                let tuple = ($($t::decode(r)?,)+);
                if size.is_none() {
                    r.read_break()?;
                }
                Ok(tuple)
            }
        }
    };
}

tuple!(1 => T0.0);
tuple!(2 => T0.0, T1.1);
tuple!(3 => T0.0, T1.1, T2.2);
tuple!(4 => T0.0, T1.1, T2.2, T3.3);
tuple!(5 => T0.0, T1.1, T2.2, T3.3, T4.4);
tuple!(6 => T0.0, T1.1, T2.2, T3.3, T4.4, T5.5);
tuple!(7 => T0.0, T1.1, T2.2, T3.3, T4.4, T5.5, T6.6);
tuple!(8 => T0.0, T1.1, T2.2, T3.3, T4.4, T5.5, T6.6, T7.7);
tuple!(9 => T0.0, T1.1, T2.2, T3.3, T4.4, T5.5, T6.6, T7.7, T8.8);
tuple!(10 => T0.0, T1.1, T2.2, T3.3, T4.4, T5.5, T6.6, T7.7, T8.8, T9.9);
tuple!(11 => T0.0, T1.1, T2.2, T3.3, T4.4, T5.5, T6.6, T7.7, T8.8, T9.9, T10.10);
tuple!(12 => T0.0, T1.1, T2.2, T3.3, T4.4, T5.5, T6.6, T7.7, T8.8, T9.9, T10.10, T11.11);
