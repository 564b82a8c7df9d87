//! A simple document object model over the item stream, for working with
//! data whose shape is not known at compile time and as the target of
//! [`transcode`](crate::transcode).

use crate::{
    codec::{Decode, Encode},
    error::{Error, Result},
    item::{ItemKind, Tag},
    reader::{Parser, Reader},
    writer::{Renderer, Writer},
    Target,
};

/// One decoded data item of either format.
///
/// Maps preserve entry order and may hold non-string keys (CBOR); encoding
/// such a map for JSON fails the same way any non-text key does.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Int(i64),
    OverLong { negative: bool, value: u64 },
    Float16(f32),
    Float(f32),
    Double(f64),
    NumberString(String),
    Bytes(Vec<u8>),
    Str(String),
    Simple(u8),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Tagged(Tag, Box<Value>),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up the value for a string key; maps only.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, Value::Str(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl Encode for Value {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        match self {
            Value::Null => w.write_null(),
            Value::Undefined => w.write_undefined(),
            Value::Bool(b) => w.write_bool(*b),
            Value::Int(i) => w.write_signed(*i),
            Value::OverLong { negative, value } => w.write_over_long(*negative, *value),
            Value::Float16(f) => w.write_float16(*f),
            Value::Float(f) => w.write_float(*f),
            Value::Double(d) => w.write_double(*d),
            Value::NumberString(s) => match w.target() {
                Target::Json => w.write_number_string(s),
                Target::Cbor => Err(Error::invalid(
                    w.pos(),
                    "number strings cannot be represented in CBOR",
                )),
            },
            Value::Bytes(b) => match w.target() {
                Target::Cbor => w.write_bytes(b),
                Target::Json => w.write_str(&crate::codec::BaseN::Base64.encode(b)),
            },
            Value::Str(s) => w.write_str(s),
            Value::Simple(v) => w.write_simple(*v),
            Value::Array(items) => {
                w.write_array_open(items.len() as u64)?;
                for item in items {
                    item.encode(w)?;
                }
                w.write_array_close()
            }
            Value::Map(entries) => {
                w.write_map_open(entries.len() as u64)?;
                for (key, value) in entries {
                    key.encode(w)?;
                    value.encode(w)?;
                }
                w.write_map_close()
            }
            Value::Tagged(tag, inner) => {
                w.write_tag(*tag)?;
                inner.encode(w)
            }
        }
    }
}

impl<'b> Decode<'b> for Value {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        match r.kind() {
            ItemKind::Null => r.read_null().map(|_| Value::Null),
            ItemKind::Undefined => r.read_undefined().map(|_| Value::Undefined),
            ItemKind::Bool => r.read_bool().map(Value::Bool),
            ItemKind::Int | ItemKind::Long => r.read_signed().map(Value::Int),
            ItemKind::OverLong => r
                .read_over_long()
                .map(|(negative, value)| Value::OverLong { negative, value }),
            ItemKind::Float16 => r.read_float16().map(Value::Float16),
            ItemKind::Float => r.read_float().map(Value::Float),
            ItemKind::Double => r.read_double().map(Value::Double),
            ItemKind::NumberString => r
                .read_number_string()
                .map(|s| Value::NumberString(s.into_owned())),
            ItemKind::Bytes => r.read_bytes().map(|b| Value::Bytes(b.into_owned())),
            ItemKind::BytesStart => {
                r.read_bytes_start()?;
                let mut merged = Vec::new();
                while !r.try_read_break()? {
                    merged.extend_from_slice(&r.read_bytes()?);
                }
                Ok(Value::Bytes(merged))
            }
            ItemKind::Str => r.read_str().map(|s| Value::Str(s.into_owned())),
            ItemKind::TextStart => {
                r.read_text_start()?;
                let mut merged = String::new();
                while !r.try_read_break()? {
                    merged.push_str(&r.read_str()?);
                }
                Ok(Value::Str(merged))
            }
            ItemKind::Simple => r.read_simple().map(Value::Simple),
            ItemKind::ArrayHeader => {
                let n = r.read_array_header()?;
                let mut items = Vec::with_capacity(n.min(1024) as usize);
                for _ in 0..n {
                    items.push(Value::decode(r)?);
                }
                Ok(Value::Array(items))
            }
            ItemKind::ArrayStart => {
                r.read_array_start()?;
                let mut items = Vec::new();
                while !r.try_read_break()? {
                    items.push(Value::decode(r)?);
                }
                Ok(Value::Array(items))
            }
            ItemKind::MapHeader => {
                let n = r.read_map_header()?;
                let mut entries = Vec::with_capacity(n.min(1024) as usize);
                for _ in 0..n {
                    let key = Value::decode(r)?;
                    let value = Value::decode(r)?;
                    entries.push((key, value));
                }
                Ok(Value::Map(entries))
            }
            ItemKind::MapStart => {
                r.read_map_start()?;
                let mut entries = Vec::new();
                while !r.try_read_break()? {
                    let key = Value::decode(r)?;
                    let value = Value::decode(r)?;
                    entries.push((key, value));
                }
                Ok(Value::Map(entries))
            }
            ItemKind::Tag => {
                let tag = r.read_tag()?;
                Ok(Value::Tagged(tag, Box::new(Value::decode(r)?)))
            }
            kind => Err(Error::mismatch(r.pos(), "a data item", kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cbor, Json};

    #[test]
    fn json_documents_decode_to_values() {
        let value: Value =
            Json::decode(br#"{"a": [1, 2.5, null], "b": "x"}"#).unwrap();
        assert_eq!(
            value.get("a").unwrap().as_array().unwrap(),
            &[Value::Int(1), Value::Double(2.5), Value::Null]
        );
        assert_eq!(value.get("b").unwrap().as_str(), Some("x"));
    }

    #[test]
    fn values_round_trip_through_both_formats() {
        let value = Value::Map(vec![
            (
                Value::Str("k".to_owned()),
                Value::Array(vec![Value::Bool(true), Value::Int(-7)]),
            ),
            (Value::Str("n".to_owned()), Value::Null),
        ]);
        let bytes = Cbor::encode(&value).unwrap();
        assert_eq!(Cbor::decode::<Value>(&bytes).unwrap(), value);
        let text = Json::encode(&value).unwrap();
        assert_eq!(Json::decode::<Value>(&text).unwrap(), value);
    }

    #[test]
    fn tagged_values_survive_cbor() {
        let value = Value::Tagged(Tag::EpochDateTime, Box::new(Value::Int(1_700_000_000)));
        let bytes = Cbor::encode(&value).unwrap();
        assert_eq!(Cbor::decode::<Value>(&bytes).unwrap(), value);
        assert!(Json::encode(&value).is_err());
    }
}
