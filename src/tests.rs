//! End-to-end tests over the public API: the documented wire scenarios,
//! the cross-format laws, and cross-checks against independent CBOR/JSON
//! implementations.

use crate::{
    cbor::{CborDecodeConfig, CborEncodeConfig},
    codec::aggregate::{
        self, counts_field, read_array_based, read_compact_map_based, read_map_based,
        require_field, write_array_based, write_compact_map_based, write_flat, write_map_based,
        write_wrapped, DeriveConfig, Key, TypeId,
    },
    json::{JsonDecodeConfig, JsonEncodeConfig},
    transcode, BigDecimal, BigInt, ByteString, Cbor, ChunkedInput, Decode, Either, Encode, Error,
    Json, Parser, ReadInput, Reader, Renderer, Target, Value, Writer,
};
use pretty_assertions::assert_eq;
use rand::Rng;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Color {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl Color {
    const KEYS: [Key; 4] = [
        Key::Str("red"),
        Key::Str("grn"),
        Key::Str("blu"),
        Key::Str("alp"),
    ];

    fn sample() -> Self {
        Color {
            red: 255,
            green: 0,
            blue: 0,
            alpha: 255,
        }
    }
}

impl Encode for Color {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> crate::Result<()> {
        write_array_based(w, 4, |w| {
            self.red.encode(w)?;
            self.green.encode(w)?;
            self.blue.encode(w)?;
            self.alpha.encode(w)
        })
    }
}

impl<'b> Decode<'b> for Color {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Self> {
        read_array_based(r, 4, |r| {
            Ok(Color {
                red: u8::decode(r)?,
                green: u8::decode(r)?,
                blue: u8::decode(r)?,
                alpha: u8::decode(r)?,
            })
        })
    }
}

/// The same record under the map-based encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MapColor(Color);

impl Encode for MapColor {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> crate::Result<()> {
        write_map_based(w, DeriveConfig::default(), 4, |f| {
            f.field(Color::KEYS[0], &self.0.red)?;
            f.field(Color::KEYS[1], &self.0.green)?;
            f.field(Color::KEYS[2], &self.0.blue)?;
            f.field(Color::KEYS[3], &self.0.alpha)
        })
    }
}

impl<'b> Decode<'b> for MapColor {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Self> {
        let pos = r.pos();
        let (mut red, mut green, mut blue, mut alpha) = (0u8, 0u8, 0u8, 0u8);
        let seen = read_map_based(r, &Color::KEYS, |index, r| {
            match index {
                0 => red = u8::decode(r)?,
                1 => green = u8::decode(r)?,
                2 => blue = u8::decode(r)?,
                3 => alpha = u8::decode(r)?,
                _ => unreachable!(),
            }
            Ok(())
        })?;
        for index in 0..4 {
            require_field(seen, index, &Color::KEYS, pos)?;
        }
        Ok(MapColor(Color {
            red,
            green,
            blue,
            alpha,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Animal {
    Dog { age: u32, name: String },
    Cat { lives: u8 },
}

impl Animal {
    fn dog() -> Self {
        Animal::Dog {
            age: 2,
            name: "Lolle".to_owned(),
        }
    }
}

const DOG_KEYS: [Key; 2] = [Key::Str("age"), Key::Str("name")];
const CAT_KEYS: [Key; 1] = [Key::Str("lives")];

fn decode_dog<'b, P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Animal> {
    let pos = r.pos();
    let mut age = 0u32;
    let mut name = String::new();
    let seen = read_map_based(r, &DOG_KEYS, |index, r| {
        match index {
            0 => age = u32::decode(r)?,
            1 => name = String::decode(r)?,
            _ => unreachable!(),
        }
        Ok(())
    })?;
    require_field(seen, 0, &DOG_KEYS, pos)?;
    require_field(seen, 1, &DOG_KEYS, pos)?;
    Ok(Animal::Dog { age, name })
}

fn decode_cat<'b, P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Animal> {
    let pos = r.pos();
    let mut lives = 0u8;
    let seen = read_map_based(r, &CAT_KEYS, |index, r| {
        match index {
            0 => lives = u8::decode(r)?,
            _ => unreachable!(),
        }
        Ok(())
    })?;
    require_field(seen, 0, &CAT_KEYS, pos)?;
    Ok(Animal::Cat { lives })
}

fn decode_animal_variant<'b, P: Parser<'b>>(
    type_id: &TypeId<'b>,
    r: &mut Reader<'b, P>,
) -> crate::Result<Animal> {
    if type_id.matches(Key::Str("Dog")) {
        decode_dog(r)
    } else if type_id.matches(Key::Str("Cat")) {
        decode_cat(r)
    } else {
        Err(Error::InvalidInputData {
            pos: r.pos(),
            msg: format!("unknown type id {}", type_id),
        })
    }
}

/// Wrapped sum-type encoding: `{"Dog": {...}}`.
#[derive(Debug, Clone, PartialEq)]
struct Wrapped(Animal);

impl Encode for Wrapped {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> crate::Result<()> {
        match &self.0 {
            Animal::Dog { age, name } => write_wrapped(w, Key::Str("Dog"), |w| {
                write_map_based(w, DeriveConfig::default(), 2, |f| {
                    f.field(DOG_KEYS[0], age)?;
                    f.field(DOG_KEYS[1], name)
                })
            }),
            Animal::Cat { lives } => write_wrapped(w, Key::Str("Cat"), |w| {
                write_map_based(w, DeriveConfig::default(), 1, |f| {
                    f.field(CAT_KEYS[0], lives)
                })
            }),
        }
    }
}

impl<'b> Decode<'b> for Wrapped {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Self> {
        aggregate::read_wrapped(r, decode_animal_variant).map(Wrapped)
    }
}

/// Flat sum-type encoding: `{"_type": "Dog", ...}`.
#[derive(Debug, Clone, PartialEq)]
struct Flat(Animal);

impl Encode for Flat {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> crate::Result<()> {
        match &self.0 {
            Animal::Dog { age, name } => {
                write_flat(w, DeriveConfig::default(), Key::Str("Dog"), 2, |f| {
                    f.field(DOG_KEYS[0], age)?;
                    f.field(DOG_KEYS[1], name)
                })
            }
            Animal::Cat { lives } => {
                write_flat(w, DeriveConfig::default(), Key::Str("Cat"), 1, |f| {
                    f.field(CAT_KEYS[0], lives)
                })
            }
        }
    }
}

impl<'b> Decode<'b> for Flat {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Self> {
        aggregate::read_flat(r, decode_animal_variant).map(Flat)
    }
}

#[test]
fn scenario_color_array_based_cbor() {
    let bytes = Cbor::encode(&Color::sample()).unwrap();
    assert_eq!(bytes, [0x84, 0x18, 0xff, 0x00, 0x00, 0x18, 0xff]);
    assert_eq!(Cbor::decode::<Color>(&bytes).unwrap(), Color::sample());
}

#[test]
fn scenario_color_map_based_cbor() {
    let bytes = Cbor::encode(&MapColor(Color::sample())).unwrap();
    assert_eq!(
        bytes,
        [
            0xa4, 0x63, 0x72, 0x65, 0x64, 0x18, 0xff, 0x63, 0x67, 0x72, 0x6e, 0x00, 0x63, 0x62,
            0x6c, 0x75, 0x00, 0x63, 0x61, 0x6c, 0x70, 0x18, 0xff
        ]
    );
    assert_eq!(
        Cbor::decode::<MapColor>(&bytes).unwrap(),
        MapColor(Color::sample())
    );
}

#[test]
fn scenario_wrapped_adt_json() {
    let json = Json::encode(&Wrapped(Animal::dog())).unwrap();
    assert_eq!(json, br#"{"Dog":{"age":2,"name":"Lolle"}}"#);
    assert_eq!(
        Json::decode::<Wrapped>(&json).unwrap(),
        Wrapped(Animal::dog())
    );
}

#[test]
fn scenario_flat_adt_json() {
    let json = Json::encode(&Flat(Animal::dog())).unwrap();
    assert_eq!(json, br#"{"_type":"Dog","age":2,"name":"Lolle"}"#);
    assert_eq!(Json::decode::<Flat>(&json).unwrap(), Flat(Animal::dog()));
}

#[test]
fn scenario_flat_adt_with_type_member_mid_object() {
    let json = br#"{"age":2,"_type":"Dog","name":"Lolle"}"#;
    assert_eq!(Json::decode::<Flat>(json).unwrap(), Flat(Animal::dog()));

    let json = br#"{"age":2,"name":"Lolle","_type":"Dog"}"#;
    assert_eq!(Json::decode::<Flat>(json).unwrap(), Flat(Animal::dog()));
}

#[test]
fn scenario_flat_adt_without_type_member() {
    let err = Json::decode::<Flat>(b"{}").unwrap_err();
    match err {
        Error::InvalidInputData { msg, .. } => {
            assert!(msg.contains("`_type`"), "{}", msg);
            assert!(msg.contains("got none"), "{}", msg);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn flat_adt_round_trips_through_cbor_too() {
    for animal in [Animal::dog(), Animal::Cat { lives: 9 }] {
        let bytes = Cbor::encode(&Flat(animal.clone())).unwrap();
        assert_eq!(Cbor::decode::<Flat>(&bytes).unwrap(), Flat(animal.clone()));
        let bytes = Cbor::encode(&Wrapped(animal.clone())).unwrap();
        assert_eq!(Cbor::decode::<Wrapped>(&bytes).unwrap(), Wrapped(animal));
    }
}

#[test]
fn map_based_decoding_is_order_independent() {
    let json = br#"{"alp":255,"blu":0,"red":255,"grn":0}"#;
    assert_eq!(
        Json::decode::<MapColor>(json).unwrap(),
        MapColor(Color::sample())
    );
}

#[test]
fn map_based_decoding_skips_extra_and_rejects_duplicates() {
    let json = br#"{"red":255,"grn":0,"blu":0,"alp":255,"extra":[1,{"a":2}]}"#;
    assert_eq!(
        Json::decode::<MapColor>(json).unwrap(),
        MapColor(Color::sample())
    );

    let json = br#"{"red":255,"grn":0,"red":1,"blu":0,"alp":255}"#;
    let err = Json::decode::<MapColor>(json).unwrap_err();
    match err {
        Error::InvalidInputData { msg, .. } => assert!(msg.contains("duplicate"), "{}", msg),
        other => panic!("unexpected error {:?}", other),
    }

    let json = br#"{"red":255,"grn":0,"blu":0}"#;
    let err = Json::decode::<MapColor>(json).unwrap_err();
    match err {
        Error::InvalidInputData { msg, .. } => assert!(msg.contains("missing"), "{}", msg),
        other => panic!("unexpected error {:?}", other),
    }
}

/// A record with a defaulted member, exercising the arity bookkeeping of
/// omitted defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Wind {
    speed: u8,
    gust: u8,
}

const WIND_KEYS: [Key; 2] = [Key::Str("speed"), Key::Str("gust")];
const GUST_DEFAULT: u8 = 0;

impl Wind {
    fn encode_with<R: Renderer>(&self, w: &mut Writer<R>, config: DeriveConfig) -> crate::Result<()> {
        let arity = 1 + u64::from(counts_field(config, &self.gust, &GUST_DEFAULT));
        write_map_based(w, config, arity, |f| {
            f.field(WIND_KEYS[0], &self.speed)?;
            f.field_with_default(WIND_KEYS[1], &self.gust, &GUST_DEFAULT)
        })
    }
}

impl Encode for Wind {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> crate::Result<()> {
        self.encode_with(w, DeriveConfig::default())
    }
}

impl<'b> Decode<'b> for Wind {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Self> {
        let pos = r.pos();
        let mut speed = 0u8;
        let mut gust = GUST_DEFAULT;
        let seen = read_map_based(r, &WIND_KEYS, |index, r| {
            match index {
                0 => speed = u8::decode(r)?,
                1 => gust = u8::decode(r)?,
                _ => unreachable!(),
            }
            Ok(())
        })?;
        require_field(seen, 0, &WIND_KEYS, pos)?;
        Ok(Wind { speed, gust })
    }
}

/// A unary record: compact map-based encoding writes it as the bare field.
#[derive(Debug, Clone, PartialEq)]
struct Label(String);

impl Encode for Label {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> crate::Result<()> {
        write_compact_map_based(w, DeriveConfig::default(), 1, |w| self.0.encode(w), |_| Ok(()))
    }
}

impl<'b> Decode<'b> for Label {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Self> {
        read_compact_map_based(r, 1, |r| Ok(Label(String::decode(r)?)), |_| unreachable!())
    }
}

/// A binary record: compact map-based encoding keeps the map form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u32,
    len: u32,
}

const SPAN_KEYS: [Key; 2] = [Key::Str("start"), Key::Str("len")];

impl Encode for Span {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> crate::Result<()> {
        write_compact_map_based(
            w,
            DeriveConfig::default(),
            2,
            |_| unreachable!(),
            |f| {
                f.field(SPAN_KEYS[0], &self.start)?;
                f.field(SPAN_KEYS[1], &self.len)
            },
        )
    }
}

impl<'b> Decode<'b> for Span {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Self> {
        read_compact_map_based(
            r,
            2,
            |_| unreachable!(),
            |r| {
                let pos = r.pos();
                let (mut start, mut len) = (0u32, 0u32);
                let seen = read_map_based(r, &SPAN_KEYS, |index, r| {
                    match index {
                        0 => start = u32::decode(r)?,
                        1 => len = u32::decode(r)?,
                        _ => unreachable!(),
                    }
                    Ok(())
                })?;
                require_field(seen, 0, &SPAN_KEYS, pos)?;
                require_field(seen, 1, &SPAN_KEYS, pos)?;
                Ok(Span { start, len })
            },
        )
    }
}

#[test]
fn compact_map_based_unwraps_unary_records() {
    let label = Label("x".to_owned());
    assert_eq!(Json::encode(&label).unwrap(), br#""x""#);
    assert_eq!(Cbor::encode(&label).unwrap(), [0x61, b'x']);
    assert_eq!(Json::decode::<Label>(br#""x""#).unwrap(), label);
    assert_eq!(Cbor::decode::<Label>(&[0x61, b'x']).unwrap(), label);

    let span = Span { start: 7, len: 3 };
    let json = Json::encode(&span).unwrap();
    assert_eq!(json, br#"{"start":7,"len":3}"#);
    assert_eq!(Json::decode::<Span>(&json).unwrap(), span);
    let cbor = Cbor::encode(&span).unwrap();
    assert_eq!(
        cbor,
        [0xa2, 0x65, b's', b't', b'a', b'r', b't', 0x07, 0x63, b'l', b'e', b'n', 0x03]
    );
    assert_eq!(Cbor::decode::<Span>(&cbor).unwrap(), span);
}

#[test]
fn defaulted_members_are_omitted_unless_configured() {
    let calm = Wind { speed: 3, gust: 0 };
    let json = Json::encode(&calm).unwrap();
    assert_eq!(json, br#"{"speed":3}"#);
    assert_eq!(Json::decode::<Wind>(&json).unwrap(), calm);

    let stormy = Wind { speed: 3, gust: 40 };
    let json = Json::encode(&stormy).unwrap();
    assert_eq!(json, br#"{"speed":3,"gust":40}"#);

    // opting in writes the default too
    let mut w = Writer::new(
        crate::ItemBuf::new(Target::Json),
        true,
    );
    let config = DeriveConfig {
        encode_member_default_values: true,
    };
    calm.encode_with(&mut w, config).unwrap();
    assert_eq!(w.into_renderer().len(), 6); // MapStart, 2 keys, 2 values, Break
}

#[test]
fn round_trip_builtins_under_both_targets() {
    fn check<T>(value: T)
    where
        T: Encode + for<'b> Decode<'b> + PartialEq + std::fmt::Debug,
    {
        let bytes = Cbor::encode(&value).unwrap();
        assert_eq!(Cbor::decode::<T>(&bytes).unwrap(), value, "cbor");
        let text = Json::encode(&value).unwrap();
        assert_eq!(Json::decode::<T>(&text).unwrap(), value, "json");
    }

    check(false);
    check(true);
    check(0u8);
    check(u64::MAX);
    check(i64::MIN);
    check(-1i32);
    check('π');
    check("hello".to_owned());
    check("".to_owned());
    check(1.5f32);
    check(0.1f32);
    check(2.25f64);
    check(0.1f64);
    check(Some(17u32));
    check(Option::<u32>::None);
    check((1u8, -2i16, "three".to_owned()));
    check(vec![1u64, 2, 3]);
    check(Vec::<bool>::new());
    check(Either::<u8, String>::Left(3));
    check(Either::<u8, String>::Right("r".to_owned()));
    check(ByteString::new(b"\x00\x01\xfe\xff".to_vec()));
    check(ByteString::default());
    check(maplit::btreemap! {"a".to_owned() => 1u32, "b".to_owned() => 2u32});
    check(BigInt::from(u64::MAX));
    check("123456789012345678901234567890".parse::<BigInt>().unwrap());
    check("-123456789012345678901234567890".parse::<BigInt>().unwrap());
    check(BigDecimal::new(15i64, -1));
}

#[test]
fn byte_strings_are_base64_text_in_json() {
    let value = ByteString::new(b"foobar".to_vec());
    assert_eq!(Json::encode(&value).unwrap(), br#""Zm9vYmFy""#);
    let bytes = Cbor::encode(&value).unwrap();
    assert_eq!(bytes, [0x46, b'f', b'o', b'o', b'b', b'a', b'r']);
}

#[test]
fn cbor_integers_choose_the_minimal_width() {
    let mut rng = rand::thread_rng();
    let mut samples = vec![
        0u64,
        23,
        24,
        255,
        256,
        65535,
        65536,
        u64::from(u32::MAX),
        u64::from(u32::MAX) + 1,
        u64::MAX,
    ];
    for _ in 0..200 {
        samples.push(rng.gen());
    }
    for value in samples {
        let ours = Cbor::encode(&value).unwrap();
        let reference = serde_cbor::to_vec(&value).unwrap();
        assert_eq!(ours, reference, "width mismatch for {}", value);
        assert_eq!(Cbor::decode::<u64>(&ours).unwrap(), value);
    }
}

#[test]
fn json_doubles_round_trip_bit_exactly() {
    let mut rng = rand::thread_rng();
    let mut samples = vec![
        0.0f64,
        -0.0,
        1.0,
        0.1,
        1.5,
        -2.25,
        1e21,
        1e-7,
        f64::MAX,
        f64::MIN_POSITIVE,
        5e-324,
        std::f64::consts::PI,
    ];
    for _ in 0..500 {
        let candidate = f64::from_bits(rng.gen());
        if candidate.is_finite() {
            samples.push(candidate);
        }
    }
    for value in samples {
        let text = Json::encode(&value).unwrap();
        let back = Json::decode::<f64>(&text).unwrap();
        assert_eq!(
            back.to_bits(),
            value.to_bits(),
            "{} re-read as {}",
            value,
            back
        );
    }
}

#[test]
fn every_encoder_emits_exactly_one_item() {
    fn check<T: Encode>(value: T) {
        let mut w = Writer::new(crate::ItemBuf::new(Target::Cbor), true);
        w.write(&value).unwrap();
        let mut r = Reader::new(w.into_renderer().into_parser(), true).unwrap();
        r.skip_element().unwrap();
        r.read_end_of_input().unwrap();
    }

    check(17u64);
    check("x".to_owned());
    check(vec![vec![1u8], vec![2, 3]]);
    check(Some(Some(false)));
    check(MapColor(Color::sample()));
    check(Flat(Animal::dog()));
    check(BigDecimal::new(-15i64, -2));
}

#[test]
fn tags_are_transparent_to_codecs_that_skip_them() {
    struct Lax(u64);
    impl<'b> Decode<'b> for Lax {
        fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> crate::Result<Self> {
            r.skip_tags()?;
            Ok(Lax(r.read_unsigned()?))
        }
    }

    // 55799(1(42))
    let bytes = [0xd9, 0xd9, 0xf7, 0xc1, 0x18, 0x2a];
    assert_eq!(Cbor::decode::<Lax>(&bytes).unwrap().0, 42);
    assert_eq!(Cbor::decode::<Lax>(&[0x18, 0x2a]).unwrap().0, 42);
}

#[test]
fn empty_containers_round_trip() {
    assert_eq!(Cbor::encode(&Vec::<u8>::new()).unwrap(), [0x80]);
    assert_eq!(Json::encode(&Vec::<u8>::new()).unwrap(), b"[]");
    assert_eq!(
        Cbor::encode(&BTreeMap::<String, u8>::new()).unwrap(),
        [0xa0]
    );
    assert_eq!(Json::encode(&BTreeMap::<String, u8>::new()).unwrap(), b"{}");
    assert_eq!(Json::decode::<Vec<u8>>(b"[]").unwrap(), Vec::<u8>::new());
    assert_eq!(
        Json::decode::<BTreeMap<String, u8>>(b"{}").unwrap(),
        BTreeMap::new()
    );
}

#[test]
fn indefinite_text_with_zero_chunks_is_the_empty_string() {
    assert_eq!(Cbor::decode::<String>(&[0x7f, 0xff]).unwrap(), "");
    assert_eq!(
        Cbor::decode::<String>(&[0x7f, 0x62, b'h', b'i', 0x61, b'!', 0xff]).unwrap(),
        "hi!"
    );
}

#[test]
fn map_arity_mismatch_is_invalid_input() {
    // MapHeader(2) with a single entry
    let err = Cbor::decode::<BTreeMap<String, u64>>(&[0xa2, 0x61, b'a', 0x01]).unwrap_err();
    assert!(matches!(err, Error::InvalidInputData { .. } | Error::UnexpectedEndOfInput { .. }));

    // MapHeader(1) with trailing garbage pair
    let err =
        Cbor::decode::<BTreeMap<String, u64>>(&[0xa1, 0x61, b'a', 0x01, 0x61, b'b', 0x02])
            .unwrap_err();
    assert!(matches!(err, Error::UnexpectedDataItem { .. }));
}

#[test]
fn known_boundary_integers() {
    assert_eq!(
        Cbor::decode::<i64>(&[0x1b, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff]).unwrap(),
        (1i64 << 32) - 1
    );
    let value: BigInt = Json::decode(b"18446744073709551615").unwrap();
    assert_eq!(value.to_u64(), Some(u64::MAX));
}

#[test]
fn cross_checked_against_serde_json() {
    let value = Value::Map(vec![
        (
            Value::Str("nums".to_owned()),
            Value::Array(vec![Value::Int(1), Value::Double(2.5)]),
        ),
        (Value::Str("nested".to_owned()), Value::Map(vec![])),
        (Value::Str("s".to_owned()), Value::Str("päö\n".to_owned())),
    ]);
    let ours = Json::encode(&value).unwrap();
    let reparsed: serde_json::Value = serde_json::from_slice(&ours).unwrap();
    assert_eq!(
        reparsed,
        serde_json::json!({"nums": [1, 2.5], "nested": {}, "s": "päö\n"})
    );

    // serde_json sorts object keys, so compare member-wise
    let theirs = serde_json::to_vec(&reparsed).unwrap();
    let back: Value = Json::decode(&theirs).unwrap();
    assert_eq!(back.get("nums"), value.get("nums"));
    assert_eq!(back.get("nested"), value.get("nested"));
    assert_eq!(back.get("s"), value.get("s"));
}

#[test]
fn cross_checked_against_serde_cbor() {
    let doc = serde_json::json!({
        "a": {"b": 12},
        "c": null,
        "list": [1, "two", true],
    });
    let bytes = serde_cbor::to_vec(&doc).unwrap();
    let value: Value = Cbor::decode(&bytes).unwrap();
    assert_eq!(value.get("a").unwrap().get("b").unwrap().as_i64(), Some(12));
    assert_eq!(value.get("c"), Some(&Value::Null));

    let ours = Cbor::encode(&value).unwrap();
    let reparsed: serde_cbor::Value = serde_cbor::from_slice(&ours).unwrap();
    assert_eq!(reparsed, serde_cbor::from_slice(&bytes).unwrap());
}

#[test]
fn decoding_from_chunked_and_io_inputs() {
    let json = Json::encode(&vec!["hello".to_owned(), "wörld".to_owned()]).unwrap();

    for chunk_size in [1, 2, 3, 7] {
        let chunks: Vec<&[u8]> = json.chunks(chunk_size).collect();
        let value: Vec<String> =
            Json::decode_from(ChunkedInput::new(chunks), JsonDecodeConfig::default()).unwrap();
        assert_eq!(value, ["hello", "wörld"]);
    }

    let cbor = Cbor::encode(&(1u8, "two".to_owned(), vec![3u64])).unwrap();
    let value: (u8, String, Vec<u64>) =
        Cbor::decode_from(ReadInput::new(&cbor[..]), CborDecodeConfig::default()).unwrap();
    assert_eq!(value, (1u8, "two".to_owned(), vec![3u64]));
}

#[test]
fn transcode_reshapes_without_bytes() {
    let dom: Value = transcode(&Wrapped(Animal::dog()), Target::Cbor).unwrap();
    let dog = dom.get("Dog").unwrap();
    assert_eq!(dog.get("age").unwrap().as_i64(), Some(2));
    assert_eq!(dog.get("name").unwrap().as_str(), Some("Lolle"));

    let back: Wrapped = transcode(&dom, Target::Cbor).unwrap();
    assert_eq!(back, Wrapped(Animal::dog()));
}

#[test]
fn validation_can_be_disabled() {
    let config = CborEncodeConfig::default().with_validation(false);
    let bytes = Cbor::encode_with(&Color::sample(), config).unwrap();
    let config = CborDecodeConfig::default().with_validation(false);
    assert_eq!(
        Cbor::decode_with::<Color>(&bytes, config).unwrap(),
        Color::sample()
    );

    let config = JsonEncodeConfig::default().with_validation(false);
    let json = Json::encode_with(&Wind { speed: 1, gust: 2 }, config).unwrap();
    assert_eq!(json, br#"{"speed":1,"gust":2}"#);
}

#[test]
fn trailing_cbor_garbage_is_rejected() {
    let err = Cbor::decode::<u64>(&[0x01, 0x02]).unwrap_err();
    assert!(matches!(err, Error::UnexpectedDataItem { .. }));
}

#[test]
fn big_numbers_use_tags_in_cbor_and_text_in_json() {
    let big: BigInt = "123456789012345678901234567890".parse().unwrap();
    let bytes = Cbor::encode(&big).unwrap();
    // tag 2 followed by a 13-byte magnitude
    assert_eq!(bytes[0], 0xc2);
    assert_eq!(bytes[1], 0x4d);
    assert_eq!(Cbor::decode::<BigInt>(&bytes).unwrap(), big);

    let json = Json::encode(&big).unwrap();
    assert_eq!(json, b"123456789012345678901234567890");
    assert_eq!(Json::decode::<BigInt>(&json).unwrap(), big);

    let dec = BigDecimal::new(15i64, -1);
    let bytes = Cbor::encode(&dec).unwrap();
    assert_eq!(bytes, [0xc4, 0x82, 0x20, 0x0f]);
    assert_eq!(Cbor::decode::<BigDecimal>(&bytes).unwrap(), dec);
    assert_eq!(Json::encode(&dec).unwrap(), b"15e-1");
}

#[test]
fn overlong_integers_survive_json() {
    let json = Json::encode(&u64::MAX).unwrap();
    assert_eq!(json, b"18446744073709551615");
    assert_eq!(Json::decode::<u64>(&json).unwrap(), u64::MAX);
}

#[test]
fn unknown_wrapped_type_id_is_reported() {
    let err = Json::decode::<Wrapped>(br#"{"Fish":{}}"#).unwrap_err();
    match err {
        Error::InvalidInputData { msg, .. } => assert!(msg.contains("Fish"), "{}", msg),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn type_id_collisions_are_rejected() {
    let err =
        aggregate::check_distinct_type_ids(&[Key::Str("Dog"), Key::Str("Cat"), Key::Str("Dog")])
            .unwrap_err();
    assert!(matches!(err, Error::InvalidInputData { .. }));
    aggregate::check_distinct_type_ids(&[Key::Str("Dog"), Key::Int(1)]).unwrap();
}
