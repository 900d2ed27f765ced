use super::*;
use flate2::write::ZlibEncoder;

const MINIMAL: &str =
    r#"{"v":"5.5.2","fr":60,"ip":0,"op":180,"w":512,"h":512,"tgs":1,"layers":[]}"#;

#[test]
fn round_trip_matches_direct_parse() {
    let bytes = compress_tgs(MINIMAL).unwrap();
    assert!(is_gzip(&bytes));
    assert!(is_compressed(&bytes));
    assert_eq!(
        decompress_tgs(&bytes).unwrap(),
        parse_lottie_json(MINIMAL).unwrap()
    );
}

#[test]
fn zlib_streams_are_accepted() {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(MINIMAL.as_bytes()).unwrap();
    let bytes = enc.finish().unwrap();

    assert!(is_zlib(&bytes));
    assert!(!is_gzip(&bytes));
    assert_eq!(decompress_tgs(&bytes).unwrap().frame_rate, 60.0);
}

#[test]
fn plain_json_is_not_compressed() {
    assert!(!is_compressed(MINIMAL.as_bytes()));
    assert!(!is_compressed(&[]));
    assert!(!is_zlib(&[0x78]));
    assert!(matches!(
        decompress_tgs(MINIMAL.as_bytes()),
        Err(TgsError::Decompression(_))
    ));
}

#[test]
fn corrupt_deflate_body_is_a_decompression_error() {
    // Valid gzip member header followed by a block with the reserved type.
    let mut bytes = vec![0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0xff];
    bytes.extend_from_slice(&[0xff; 16]);
    assert!(matches!(
        decompress_tgs(&bytes),
        Err(TgsError::Decompression(_))
    ));
}

#[test]
fn invalid_json_inside_is_malformed() {
    let bytes = compress_tgs("{\"fr\": 60,").unwrap();
    assert!(matches!(
        decompress_tgs(&bytes),
        Err(TgsError::MalformedJson(_))
    ));
}

#[test]
fn non_utf8_payload_is_malformed() {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&[0xff, 0xfe, 0x00]).unwrap();
    let bytes = enc.finish().unwrap();
    assert!(matches!(inflate(&bytes), Err(TgsError::MalformedJson(_))));
}

#[test]
fn byte_order_mark_is_ignored() {
    let with_bom = format!("\u{feff}{MINIMAL}");
    assert_eq!(
        parse_lottie_json(&with_bom).unwrap(),
        parse_lottie_json(MINIMAL).unwrap()
    );
}

#[test]
fn wrong_field_type_is_malformed() {
    let err = parse_lottie_json(r#"{"fr":"sixty","ip":0,"op":1,"w":1,"h":1}"#).unwrap_err();
    assert!(matches!(err, TgsError::MalformedJson(_)));
    assert!(err.to_string().starts_with("malformed json: parse lottie JSON:"));
}
