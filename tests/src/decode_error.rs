use mapwire::encoding::WireType;
use mapwire::{DecodeErrorKind, Message};
use mapwire_maps::test::MapTest;

fn decode_error(buf: &[u8]) -> mapwire::DecodeError {
    MapTest::decode(buf).unwrap_err()
}

#[test]
fn test_decode_error_invalid_wire_type() {
    let error = decode_error(&[0x0F]);
    assert_eq!(error.kind(), &DecodeErrorKind::InvalidWireType { value: 7 });
    assert!(error.path().is_empty());
    assert_eq!(
        error.to_string(),
        "failed to decode Protobuf message: invalid wire type value: 7"
    );
}

#[test]
fn test_decode_error_invalid_tag() {
    assert_eq!(
        decode_error(&[0x02, 0x00]).to_string(),
        "failed to decode Protobuf message: invalid tag value: 0"
    );
}

#[test]
fn test_decode_error_truncated_string() {
    let error = decode_error(&[0x0A]);
    assert_eq!(error.kind(), &DecodeErrorKind::InvalidVarint);
    assert_eq!(
        error.to_string(),
        "failed to decode Protobuf message: MapTest.name: invalid varint"
    );

    assert_eq!(
        decode_error(&[0x0A, 0x05, b'a']).to_string(),
        "failed to decode Protobuf message: MapTest.name: buffer underflow"
    );
}

#[test]
fn test_decode_error_truncated_entry() {
    let error = decode_error(&[0x12, 0x05, 0x0A, 0x01]);
    assert_eq!(error.kind(), &DecodeErrorKind::BufferUnderflow);
    let path = error.path();
    assert_eq!(path.len(), 1);
    assert_eq!(path[0].message(), "MapTest");
    assert_eq!(path[0].field(), "properties");
    assert_eq!(
        error.to_string(),
        "failed to decode Protobuf message: MapTest.properties: buffer underflow"
    );
}

#[test]
fn test_decode_error_entry_field_overruns_entry() {
    // The entry claims two bytes but its key varint spans three.
    assert_eq!(
        decode_error(&[0x1A, 0x02, 0x08, 0x96, 0x01]).to_string(),
        "failed to decode Protobuf message: MapTest.integer_properties: delimited length exceeded"
    );
}

#[test]
fn test_decode_error_map_wire_type() {
    let error = decode_error(&[0x10, 0x01]);
    assert_eq!(
        error.kind(),
        &DecodeErrorKind::UnexpectedWireType {
            actual: WireType::Varint,
            expected: WireType::LengthDelimited,
        }
    );
    assert_eq!(
        error.to_string(),
        "failed to decode Protobuf message: MapTest.properties: invalid wire type: Varint (expected LengthDelimited)"
    );
}

#[test]
fn test_decode_error_entry_key_wire_type() {
    assert_eq!(
        decode_error(&[0x1A, 0x02, 0x0A, 0x00]).to_string(),
        "failed to decode Protobuf message: MapTest.integer_properties: invalid wire type: LengthDelimited (expected Varint)"
    );
}

#[test]
fn test_decode_error_invalid_utf8() {
    let error = decode_error(&[0x12, 0x03, 0x0A, 0x01, 0xFF]);
    assert_eq!(error.kind(), &DecodeErrorKind::InvalidString);
    assert_eq!(
        error.to_string(),
        "failed to decode Protobuf message: MapTest.properties: invalid string value: data is not UTF-8 encoded"
    );
}

#[test]
fn test_decode_error_unexpected_end_group() {
    // Group 4 closed by an end tag for field 5.
    assert_eq!(
        decode_error(&[0x23, 0x2C]).kind(),
        &DecodeErrorKind::UnexpectedEndGroupTag
    );
    assert_eq!(
        decode_error(&[0x24]).kind(),
        &DecodeErrorKind::UnexpectedEndGroupTag
    );
}

#[test]
fn test_unknown_fields_are_skipped() {
    crate::init_logger();
    let buf = [
        0x22, 0x01, 0x00, // field 4, length delimited
        0x28, 0x96, 0x01, // field 5, varint
        0x35, 0x01, 0x02, 0x03, 0x04, // field 6, fixed32
        0x0A, 0x01, b'n', // name
        0x3B, 0x08, 0x01, 0x3C, // field 7, group
    ];
    let msg = MapTest::decode(&buf[..]).unwrap();
    assert_eq!(msg.name, "n");
    assert!(msg.properties.is_empty());
}

#[test]
fn test_decode_error_into_io_error() {
    let error: std::io::Error = decode_error(&[0x0F]).into();
    assert_eq!(error.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
fn test_failed_merge_keeps_earlier_fields() {
    let mut msg = MapTest::default();
    let buf = [0x0A, 0x01, b'n', 0x12, 0x05];
    assert!(msg.merge(&buf[..]).is_err());
    assert_eq!(msg.name, "n");
}

#[test]
fn test_decode_length_delimited() {
    let mut msg = MapTest::default();
    msg.integer_properties.insert(1, 2);
    let buf = msg.encode_length_delimited_to_vec();
    assert_eq!(buf[0] as usize, buf.len() - 1);
    assert_eq!(mapwire::decode_length_delimiter(&buf[..]).unwrap(), msg.encoded_len());
    assert_eq!(MapTest::decode_length_delimited(&buf[..]).unwrap(), msg);

    let error = MapTest::decode_length_delimited(&buf[..buf.len() - 1]).unwrap_err();
    assert_eq!(error.kind(), &DecodeErrorKind::BufferUnderflow);
}

#[test]
fn test_encode_error_insufficient_capacity() {
    let msg = MapTest {
        name: "name".to_string(),
        ..Default::default()
    };
    let mut buf = [0u8; 3];
    let error = msg.encode(&mut &mut buf[..]).unwrap_err();
    assert_eq!(error.required_capacity(), 6);
    assert_eq!(error.remaining(), 3);
}
