//! Integration tests for the byte stream and serializer
//!
//! Tests field widths, identifiers, length-prefixed data, and that malformed
//! input produces errors rather than panics.

use cairn_foundation::{ByteStream, Encode, ErrorKind, Serializer, Value};
use std::io::Write;

#[test]
fn numbers_are_big_endian() {
    let mut out = Serializer::new();
    out.write_number(0x0102, 2);
    out.write_number(7, 8);
    let bytes = out.into_bytes();
    assert_eq!(&bytes[..2], &[1, 2]);

    let mut stream = ByteStream::new(&bytes);
    assert_eq!(stream.read_number(2).unwrap(), 0x0102);
    assert_eq!(stream.read_number(8).unwrap(), 7);
    assert!(stream.is_at_end());
}

#[test]
fn identifiers_and_data() {
    let mut out = Serializer::new();
    out.write_identifier("main");
    out.write_data("héllo");
    out.write_boolean(true);
    let bytes = out.into_bytes();

    let mut stream = ByteStream::new(&bytes);
    assert_eq!(stream.read_identifier().unwrap(), "main");
    assert_eq!(stream.read_data().unwrap(), "héllo");
    assert!(stream.read_boolean().unwrap());
}

#[test]
fn truncated_input_is_a_decode_error() {
    let bytes = Value::from("a long string").to_bytes();
    assert_eq!(bytes[0], b'$');
    for cut in 1..bytes.len() {
        let mut stream = ByteStream::new(&bytes[1..cut]);
        let err = stream.read_data().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Decode { .. }));
    }
}

#[test]
fn unterminated_identifier() {
    let mut stream = ByteStream::new(b"'main");
    assert!(stream.read_identifier().is_err());
}

#[test]
fn file_backed_stream() {
    let mut out = Serializer::new();
    out.write_identifier("greeting");
    Value::from("hi").encode(&mut out);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(out.as_bytes()).unwrap();
    let mut stream = ByteStream::open(file.path()).unwrap();
    assert_eq!(stream.read_identifier().unwrap(), "greeting");
    assert_eq!(stream.next_byte().unwrap(), b'$');
    assert_eq!(stream.read_data().unwrap(), "hi");
    assert!(stream.is_at_end());
    assert!(stream.next_byte().is_err());
}
