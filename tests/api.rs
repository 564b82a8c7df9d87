//! Black-box tests over the public crate surface: one value type shared by
//! both formats, streaming inputs and outputs, and the logging decorators.

use pretty_assertions::assert_eq;
use wire_data::{
    cbor::{CborDecodeConfig, CborEncodeConfig, CborParser},
    codec::aggregate::{read_map_based, require_field, write_map_based, DeriveConfig, Key},
    json::JsonEncodeConfig,
    transcode, Cbor, Decode, Encode, Error, IoWrite, Json, LoggingParser, Parser, Reader,
    Renderer, SliceInput, Target, Value, Writer,
};

#[derive(Debug, Clone, PartialEq)]
struct Peer {
    host: String,
    port: u16,
    tags: Vec<String>,
    last_seen: Option<i64>,
}

const PEER_KEYS: [Key; 4] = [
    Key::Str("host"),
    Key::Str("port"),
    Key::Str("tags"),
    Key::Str("lastSeen"),
];

impl Encode for Peer {
    fn encode<R: Renderer>(&self, w: &mut Writer<R>) -> wire_data::Result<()> {
        write_map_based(w, DeriveConfig::default(), 4, |f| {
            f.field(PEER_KEYS[0], &self.host)?;
            f.field(PEER_KEYS[1], &self.port)?;
            f.field(PEER_KEYS[2], &self.tags)?;
            f.field(PEER_KEYS[3], &self.last_seen)
        })
    }
}

impl<'b> Decode<'b> for Peer {
    fn decode<P: Parser<'b>>(r: &mut Reader<'b, P>) -> wire_data::Result<Self> {
        let pos = r.pos();
        let mut host = String::new();
        let mut port = 0u16;
        let mut tags = Vec::new();
        let mut last_seen = None;
        let seen = read_map_based(r, &PEER_KEYS, |index, r| {
            match index {
                0 => host = String::decode(r)?,
                1 => port = u16::decode(r)?,
                2 => tags = Vec::decode(r)?,
                3 => last_seen = Option::decode(r)?,
                _ => unreachable!(),
            }
            Ok(())
        })?;
        for index in 0..4 {
            require_field(seen, index, &PEER_KEYS, pos)?;
        }
        Ok(Peer {
            host,
            port,
            tags,
            last_seen,
        })
    }
}

fn sample() -> Peer {
    Peer {
        host: "node-1.example".to_owned(),
        port: 4711,
        tags: vec!["seed".to_owned(), "eu-west".to_owned()],
        last_seen: Some(1_700_000_000),
    }
}

#[test]
fn one_codec_serves_both_formats() {
    let peer = sample();

    let cbor = Cbor::encode(&peer).unwrap();
    assert_eq!(Cbor::decode::<Peer>(&cbor).unwrap(), peer);

    let json = Json::encode(&peer).unwrap();
    assert_eq!(
        json,
        br#"{"host":"node-1.example","port":4711,"tags":["seed","eu-west"],"lastSeen":[1700000000]}"#
    );
    assert_eq!(Json::decode::<Peer>(&json).unwrap(), peer);
}

#[test]
fn values_transcode_between_formats() {
    let peer = sample();
    let dom: Value = transcode(&peer, Target::Json).unwrap();
    assert_eq!(dom.get("port").unwrap().as_i64(), Some(4711));

    let back: Peer = transcode(&dom, Target::Json).unwrap();
    assert_eq!(back, peer);
}

#[test]
fn encoding_into_an_io_sink() {
    let sink = IoWrite::new(Vec::new());
    let out = Json::encode_to(&vec![1u8, 2, 3], sink, JsonEncodeConfig::default()).unwrap();
    assert_eq!(out.finish().unwrap(), b"[1,2,3]");

    let sink = IoWrite::new(Vec::new());
    let out = Cbor::encode_to(&7u64, sink, CborEncodeConfig::default()).unwrap();
    assert_eq!(out.finish().unwrap(), [0x07]);
}

#[test]
fn logged_decoding_observes_without_altering() {
    let cbor = Cbor::encode(&sample()).unwrap();
    let mut trace = Vec::new();
    let parser = LoggingParser::new(
        CborParser::new(SliceInput::new(&cbor), CborDecodeConfig::default()),
        &mut trace,
    );
    let mut reader = Reader::new(parser, true).unwrap();
    let peer = Peer::decode(&mut reader).unwrap();
    reader.read_end_of_input().unwrap();
    drop(reader);

    assert_eq!(peer, sample());
    let text = String::from_utf8(trace).unwrap();
    assert!(text.contains("MapHeader(4)"), "{}", text);
    assert!(text.contains("node-1.example"), "{}", text);
}

#[test]
fn errors_carry_positions_and_vocabulary() {
    let err = Json::decode::<Peer>(br#"{"host":"x","port":true}"#).unwrap_err();
    match err {
        Error::UnexpectedDataItem {
            pos,
            expected,
            actual,
        } => {
            assert!(pos > 0);
            assert_eq!(expected, "unsigned integer");
            assert_eq!(actual.to_string(), "boolean");
        }
        other => panic!("unexpected error {:?}", other),
    }
}
