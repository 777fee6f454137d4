//! Integration tests for binary images
//!
//! Encodes values with the foundation encoder and reads them back through the
//! registry decoders.

use cairn_foundation::{
    ByteStream, Encode, ErrorKind, FORMAT_VERSION, Operation, Serializer, Value,
};
use cairn_language::{Registry, parse_payload};

fn image(entries: &[(&str, &Value)]) -> Vec<u8> {
    let mut out = Serializer::new();
    out.write_byte(FORMAT_VERSION);
    for (name, value) in entries {
        out.write_identifier(name);
        value.encode(&mut out);
    }
    out.into_bytes()
}

#[test]
fn decodes_entries_in_order() {
    let registry = Registry::standard();
    let main = parse_payload("block slots x { loadslot x; push number 1; add }", &registry).unwrap();
    let data = parse_payload("table [atom a -> tuple (number 1, empty)]", &registry).unwrap();
    let bytes = image(&[("main", &main), ("data", &data)]);

    let mut stream = ByteStream::new(&bytes);
    registry.read_header(&mut stream).unwrap();
    assert_eq!(registry.decode_entry(&mut stream).unwrap(), ("main".into(), main));
    assert_eq!(registry.decode_entry(&mut stream).unwrap(), ("data".into(), data));
    assert!(stream.is_at_end());
}

#[test]
fn number_layout() {
    let bytes = Value::Number(0x0102).to_bytes();
    assert_eq!(bytes, vec![b'#', 0, 0, 0, 0, 0, 0, 1, 2]);
}

#[test]
fn operation_layout() {
    let bytes = Value::operation(Operation::Dup).to_bytes();
    assert_eq!(bytes[0], b'O');
    assert_eq!(&bytes[1..], &[0, 0, 0, 4]);
}

#[test]
fn wrong_version_is_rejected() {
    let registry = Registry::standard();
    let mut stream = ByteStream::new(&[FORMAT_VERSION + 1]);
    let err = registry.read_header(&mut stream).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::VersionMismatch { .. }));
}

#[test]
fn unknown_marker_is_a_decode_error() {
    let registry = Registry::standard();
    let mut stream = ByteStream::new(b"'x'Z");
    let err = registry.decode_entry(&mut stream).unwrap_err();
    assert_eq!(err.offset(), Some(3));
}

#[test]
fn unknown_operation_tag() {
    let registry = Registry::standard();
    let mut stream = ByteStream::new(&[b'O', 0, 0, 0xFF, 0xFF]);
    assert!(registry.decode_value(&mut stream).is_err());
}

#[test]
fn truncated_values_never_panic() {
    let registry = Registry::standard();
    let value = parse_payload(
        r#"tuple (string "abc", set [number 1], block slots a { loadslot a; select [number 1 -> operation pop] else halt })"#,
        &registry,
    )
    .unwrap();
    let bytes = value.to_bytes();
    for cut in 0..bytes.len() {
        assert!(registry.decode_value(&mut ByteStream::new(&bytes[..cut])).is_err());
    }
    assert_eq!(registry.decode_value(&mut ByteStream::new(&bytes)).unwrap(), value);
}

#[test]
fn runaway_nesting_is_a_decode_error() {
    let registry = Registry::standard();
    let mut out = Serializer::new();
    out.write_byte(FORMAT_VERSION);
    out.write_identifier("x");
    for _ in 0..200_000 {
        out.write_byte(b'(');
        out.write_number(1, 8);
    }
    let bytes = out.into_bytes();

    let mut stream = ByteStream::new(&bytes);
    registry.read_header(&mut stream).unwrap();
    let err = registry.decode_entry(&mut stream).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Decode { .. }));
}
