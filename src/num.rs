//! Arbitrary-precision integers and decimals, carried as sign plus
//! big-endian magnitude bytes so they map directly onto the CBOR bignum
//! tags and onto JSON number strings.

use crate::{
    codec::{Decode, Encode},
    error::{Error, Result},
    item::{ItemKind, Tag},
    reader::{Parser, Reader},
    writer::{Renderer, Writer},
    Target,
};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// An arbitrary-precision signed integer.
///
/// Zero has an empty magnitude and is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    negative: bool,
    /// big-endian, without leading zero bytes
    magnitude: Vec<u8>,
}

impl BigInt {
    pub const ZERO: BigInt = BigInt {
        negative: false,
        magnitude: Vec::new(),
    };

    /// Build from sign and big-endian magnitude bytes; leading zeros are
    /// stripped.
    pub fn from_sign_magnitude(negative: bool, magnitude: impl Into<Vec<u8>>) -> Self {
        let magnitude = trim(magnitude.into());
        Self {
            negative: negative && !magnitude.is_empty(),
            magnitude,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The big-endian magnitude without leading zeros.
    pub fn magnitude(&self) -> &[u8] {
        &self.magnitude
    }

    fn magnitude_u128(&self) -> Option<u128> {
        if self.magnitude.len() > 16 {
            return None;
        }
        let mut value = 0u128;
        for &byte in &self.magnitude {
            value = value << 8 | u128::from(byte);
        }
        Some(value)
    }

    /// The value as `u64` if it is in range.
    pub fn to_u64(&self) -> Option<u64> {
        if self.negative {
            return None;
        }
        self.magnitude_u128().and_then(|v| u64::try_from(v).ok())
    }

    /// The value as `i64` if it is in range.
    pub fn to_i64(&self) -> Option<i64> {
        let magnitude = self.magnitude_u128()?;
        if self.negative {
            if magnitude <= 1 << 63 {
                Some((magnitude as i128).wrapping_neg() as i64)
            } else {
                None
            }
        } else {
            i64::try_from(magnitude).ok()
        }
    }
}

impl From<u64> for BigInt {
    fn from(value: u64) -> Self {
        Self::from_sign_magnitude(false, value.to_be_bytes().to_vec())
    }
}

impl From<i64> for BigInt {
    fn from(value: i64) -> Self {
        let negative = value < 0;
        let magnitude = value.unsigned_abs().to_be_bytes().to_vec();
        Self::from_sign_magnitude(negative, magnitude)
    }
}

fn trim(mut bytes: Vec<u8>) -> Vec<u8> {
    let zeros = bytes.iter().take_while(|b| **b == 0).count();
    if zeros > 0 {
        bytes.drain(..zeros);
    }
    bytes
}

/// `bytes + 1` over a big-endian magnitude.
fn add_one(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    for byte in out.iter_mut().rev() {
        let (sum, carry) = byte.overflowing_add(1);
        *byte = sum;
        if !carry {
            return out;
        }
    }
    out.insert(0, 1);
    out
}

/// `bytes - 1` over a non-zero big-endian magnitude.
fn sub_one(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    for byte in out.iter_mut().rev() {
        let (diff, borrow) = byte.overflowing_sub(1);
        *byte = diff;
        if !borrow {
            break;
        }
    }
    trim(out)
}

/// `magnitude * 10 + digit` over a big-endian magnitude.
fn mul10_add(magnitude: &mut Vec<u8>, digit: u8) {
    let mut carry = u32::from(digit);
    for byte in magnitude.iter_mut().rev() {
        let cur = u32::from(*byte) * 10 + carry;
        *byte = cur as u8;
        carry = cur >> 8;
    }
    while carry > 0 {
        magnitude.insert(0, carry as u8);
        carry >>= 8;
    }
}

/// Decimal digits of a big-endian magnitude, most significant first.
fn decimal_digits(magnitude: &[u8]) -> String {
    if magnitude.is_empty() {
        return "0".to_owned();
    }
    let mut work = magnitude.to_vec();
    let mut digits = Vec::new();
    while !work.is_empty() {
        let mut remainder = 0u32;
        for byte in work.iter_mut() {
            let cur = remainder << 8 | u32::from(*byte);
            *byte = (cur / 10) as u8;
            remainder = cur % 10;
        }
        digits.push(b'0' + remainder as u8);
        work = trim(work);
    }
    digits.reverse();
    // digits are ASCII by construction
    String::from_utf8(digits).unwrap_or_default()
}

impl Display for BigInt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}", decimal_digits(&self.magnitude))
    }
}

impl FromStr for BigInt {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid(0, "invalid integer literal"));
        }
        let mut magnitude = Vec::new();
        for b in digits.bytes() {
            mul10_add(&mut magnitude, b - b'0');
        }
        Ok(Self::from_sign_magnitude(negative, magnitude))
    }
}

impl Encode for BigInt {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        match w.target() {
            Target::Json => w.write_number_string(&self.to_string()),
            Target::Cbor => {
                if let Some(v) = self.to_i64() {
                    return w.write_signed(v);
                }
                if let Some(v) = self.to_u64() {
                    return w.write_unsigned(v);
                }
                if self.negative {
                    // tag 3 carries -1 - n
                    let n = sub_one(&self.magnitude);
                    if n.len() <= 8 {
                        let mut v = 0u64;
                        for &byte in &n {
                            v = v << 8 | u64::from(byte);
                        }
                        return w.write_over_long(true, v);
                    }
                    w.write_tag(Tag::NegativeBigNum)?;
                    w.write_bytes(&n)
                } else {
                    w.write_tag(Tag::PositiveBigNum)?;
                    w.write_bytes(&self.magnitude)
                }
            }
        }
    }
}

impl<'b> Decode<'b> for BigInt {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        let pos = r.pos();
        match r.kind() {
            ItemKind::Int | ItemKind::Long => Ok(BigInt::from(r.read_signed()?)),
            ItemKind::OverLong => {
                let (negative, value) = r.read_over_long()?;
                if negative {
                    Ok(BigInt::from_sign_magnitude(
                        true,
                        add_one(&value.to_be_bytes()),
                    ))
                } else {
                    Ok(BigInt::from(value))
                }
            }
            ItemKind::Tag => {
                let tag = r.read_tag()?;
                let bytes = r.read_bytes()?;
                match tag {
                    Tag::PositiveBigNum => Ok(BigInt::from_sign_magnitude(false, bytes.into_owned())),
                    Tag::NegativeBigNum => Ok(BigInt::from_sign_magnitude(true, add_one(&bytes))),
                    other => Err(Error::invalid(
                        pos,
                        format!("expected bignum tag but got tag {}", other),
                    )),
                }
            }
            ItemKind::NumberString => {
                let s = r.read_number_string()?;
                s.parse::<BigInt>()
                    .map_err(|_| Error::invalid(pos, "number string is not an integer"))
            }
            kind => Err(Error::mismatch(pos, "big integer", kind)),
        }
    }
}

/// An arbitrary-precision decimal: `unscaled * 10.pow(exponent)`.
///
/// Maps onto CBOR decimal fractions (tag 4) and onto JSON number strings.
/// No normalization is performed, so `1.0` and `1e0` stay distinct values
/// of equal magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    pub unscaled: BigInt,
    pub exponent: i64,
}

impl BigDecimal {
    pub fn new(unscaled: impl Into<BigInt>, exponent: i64) -> Self {
        Self {
            unscaled: unscaled.into(),
            exponent,
        }
    }
}

impl Display for BigDecimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.exponent == 0 {
            write!(f, "{}", self.unscaled)
        } else {
            write!(f, "{}e{}", self.unscaled, self.exponent)
        }
    }
}

impl FromStr for BigDecimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (mantissa, exp_part) = match s.find(&['e', 'E'][..]) {
            Some(i) => (&s[..i], Some(&s[i + 1..])),
            None => (s, None),
        };
        let mut exponent: i64 = match exp_part {
            Some(e) => e
                .parse()
                .map_err(|_| Error::invalid(0, "invalid decimal literal"))?,
            None => 0,
        };
        let digits = match mantissa.find('.') {
            Some(i) => {
                let frac_len = mantissa.len() - i - 1;
                exponent = exponent
                    .checked_sub(frac_len as i64)
                    .ok_or_else(|| Error::invalid(0, "invalid decimal literal"))?;
                let mut joined = String::with_capacity(mantissa.len() - 1);
                joined.push_str(&mantissa[..i]);
                joined.push_str(&mantissa[i + 1..]);
                joined
            }
            None => mantissa.to_owned(),
        };
        Ok(Self {
            unscaled: digits.parse()?,
            exponent,
        })
    }
}

impl Encode for BigDecimal {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> Result<()> {
        match w.target() {
            Target::Json => w.write_number_string(&self.to_string()),
            Target::Cbor => {
                if self.exponent == 0 {
                    return self.unscaled.encode(w);
                }
                w.write_tag(Tag::DecimalFraction)?;
                w.write_array_header(2)?;
                w.write_signed(self.exponent)?;
                self.unscaled.encode(w)
            }
        }
    }
}

impl<'b> Decode<'b> for BigDecimal {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> Result<Self> {
        let pos = r.pos();
        match r.kind() {
            ItemKind::NumberString => {
                let s = r.read_number_string()?;
                s.parse::<BigDecimal>()
                    .map_err(|_| Error::invalid(pos, "number string is not a decimal"))
            }
            ItemKind::Int | ItemKind::Long | ItemKind::OverLong => {
                Ok(Self::new(BigInt::decode(r)?, 0))
            }
            ItemKind::Tag => {
                if !r.try_read_tag(Tag::DecimalFraction)? {
                    // a bare bignum is a decimal with exponent zero
                    return Ok(Self::new(BigInt::decode(r)?, 0));
                }
                let arity_pos = r.pos();
                match r.read_array_open()? {
                    Some(2) => {}
                    Some(n) => {
                        return Err(Error::invalid(
                            arity_pos,
                            format!("decimal fraction requires 2 elements but got {}", n),
                        ))
                    }
                    None => {
                        return Err(Error::invalid(
                            arity_pos,
                            "decimal fraction requires a definite-length array",
                        ))
                    }
                }
                let exponent = r.read_signed()?;
                let unscaled = BigInt::decode(r)?;
                Ok(Self { unscaled, exponent })
            }
            kind => Err(Error::mismatch(pos, "big decimal", kind)),
        }
    }
}
