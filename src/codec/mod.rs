//! The type-class layer: [`Encode`] and [`Decode`] instances written once
//! against the neutral [`Reader`](crate::Reader) / [`Writer`](crate::Writer)
//! surface serve both wire formats unchanged.

pub mod aggregate;
mod basen;
mod basic;

pub use basen::BaseN;
pub use basic::{ByteString, Either};

use crate::{
    error::Result,
    reader::{Parser, Reader},
    writer::{Renderer, Writer},
};

/// Serialize a value by writing exactly one data item (composites, i.e. a
/// header or start marker with its children and closing break, count as one
/// item).
///
/// Violating the one-item contract corrupts the surrounding codecs; the
/// structural validator catches most such mistakes.
pub trait Encode {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()>;
}

/// Deserialize a value by consuming exactly one data item.
///
/// The lifetime `'b` is the borrow of the input bytes, allowing zero-copy
/// decoding of strings and byte strings.
pub trait Decode<'b>: Sized {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self>;
}

/// A value that can travel in both directions.
pub trait Codec<'b>: Encode + Decode<'b> {}

impl<'b, T: Encode + Decode<'b>> Codec<'b> for T {}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        (*self).encode(w)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        (**self).encode(w)
    }
}

impl<'b, T: Decode<'b>> Decode<'b> for Box<T> {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        T::decode(r).map(Box::new)
    }
}
