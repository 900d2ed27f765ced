use super::*;
use crate::convert::options::OutputFormat;
use crate::decode::tgs::compress_tgs;
use crate::optimize::OptimizerOptions;

const STICKER: &str = r#"{
  "v": "5.5.2", "fr": 60, "ip": 0, "op": 180, "w": 512, "h": 512, "nm": "blink", "tgs": 1,
  "layers": [
    {"ty": 4, "nm": "eye", "ind": 1, "ip": 0, "op": 180, "st": 0,
     "ks": {
       "o": {"a": 1, "k": [{"t": 0, "s": [100]}, {"t": 90, "s": [100]}, {"t": 180}]},
       "s": {"a": 1, "k": [{"t": 0, "s": [100, 100, 100]}, {"t": 90, "s": [100, 10, 100]}]}
     },
     "shapes": [{"ty": "el", "p": {"a": 0, "k": [256, 256]}, "s": {"a": 0, "k": [64, 64]}}]}
  ]
}"#;

fn zero_fps() -> String {
    STICKER.replacen("\"fr\": 60", "\"fr\": 0", 1)
}

#[test]
fn compressed_and_plain_input_give_the_same_bundle() {
    let opts = ConversionOptions::default();
    let packed = compress_tgs(STICKER).unwrap();

    let from_tgs = convert(&packed, &opts).unwrap();
    let from_text = convert(STICKER, &opts).unwrap();
    let from_bytes = convert(STICKER.as_bytes(), &opts).unwrap();

    assert_eq!(from_tgs.code, from_text.code);
    assert_eq!(from_text.code, from_bytes.code);
    assert_eq!(from_tgs.fingerprint, from_text.fingerprint);
    assert_eq!(from_tgs.metadata.original_size, packed.len());
    assert_eq!(from_text.metadata.original_size, STICKER.len());
}

#[test]
fn metadata_describes_input_and_output() {
    let r = convert(STICKER, &ConversionOptions::default()).unwrap();
    assert_eq!(r.metadata.output_size, r.code.len());
    assert_eq!(r.metadata.layer_count, 1);
    assert!(r.metadata.duration >= 0.0);
    assert_eq!(r.animation.duration, 3.0);
    assert_eq!(r.animation.name.as_deref(), Some("blink"));
    assert!(r.animation.is_tgs);
    assert!(r.source_map.is_none());
    assert!(r.external_data.is_none());
    assert!(r.warnings.is_empty());
}

#[test]
fn optimizer_report_is_attached() {
    let r = convert(STICKER, &ConversionOptions::default()).unwrap();
    let o = r.optimization.unwrap();
    assert_eq!(o.properties_examined, 4);
    assert_eq!(o.properties_static, 3);
    assert_eq!(o.properties_substituted, 1);

    let off = Converter::new(ConverterConfig {
        optimize: false,
        ..ConverterConfig::default()
    });
    assert!(off.convert(STICKER, &ConversionOptions::default()).unwrap().optimization.is_none());
}

#[test]
fn strict_mode_rejects_zero_frame_rate() {
    let err = convert(zero_fps().as_str(), &ConversionOptions::default()).unwrap_err();
    let TgsError::Validation(errs) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(errs.problems[0].path.to_string(), "fr");
}

#[test]
fn sanitize_mode_repairs_and_warns() {
    let c = Converter::new(ConverterConfig {
        validation: ValidationMode::Sanitize,
        ..ConverterConfig::default()
    });
    let r = c.convert(&zero_fps(), &ConversionOptions::default()).unwrap();
    assert_eq!(r.animation.frame_rate, 60.0);
    assert_eq!(r.warnings.len(), 1);
    assert!(r.warnings[0].starts_with("$.fr:"));
}

#[test]
fn garbage_input_is_malformed() {
    let opts = ConversionOptions::default();
    assert!(matches!(
        convert("{\"fr\":", &opts),
        Err(TgsError::MalformedJson(_))
    ));
    assert!(matches!(
        convert(&[0xff_u8, 0xfe, 0xfd], &opts),
        Err(TgsError::MalformedJson(_))
    ));
    assert!(matches!(
        convert(&[0x1f_u8, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0xff, 0xff, 0xff], &opts),
        Err(TgsError::Decompression(_))
    ));
}

#[test]
fn detached_data_is_returned_separately() {
    let opts = ConversionOptions {
        embed_animation: false,
        minify: true,
        data_url: Some("/stickers/blink.json".to_string()),
        ..ConversionOptions::default()
    };
    let r = convert(STICKER, &opts).unwrap();
    let data = r.external_data.unwrap();
    assert!(!r.code.contains(&data));
    assert!(r.code.contains("fetchData(\"/stickers/blink.json\", target)"));

    let parsed: AnimationGraph = serde_json::from_str(&data).unwrap();
    assert_eq!(parsed.layers.len(), 1);
}

#[test]
fn module_format_flows_through() {
    let opts = ConversionOptions {
        output_format: OutputFormat::Module,
        ..ConversionOptions::default()
    };
    let r = convert(STICKER, &opts).unwrap();
    assert!(r.code.contains("export default createPlayer;"));
}

#[test]
fn conversions_are_deterministic() {
    let c = Converter::new(ConverterConfig {
        optimizer: OptimizerOptions {
            parallel: true,
            ..OptimizerOptions::default()
        },
        ..ConverterConfig::default()
    });
    let opts = ConversionOptions::default();
    let a = c.convert(STICKER, &opts).unwrap();
    let b = c.convert(STICKER, &opts).unwrap();
    assert_eq!(a.code, b.code);
    assert_eq!(a.fingerprint, b.fingerprint);
}
