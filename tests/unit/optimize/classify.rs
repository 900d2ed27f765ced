use super::*;
use serde_json::json;

fn classify(prop: Value) -> PropertyClassification {
    classify_property(PropertyPath::root().key("ks").key("o"), &prop)
}

#[test]
fn constant_value_is_static() {
    let c = classify(json!({"a": 0, "k": [10, 20, 0], "ix": 2}));
    assert_eq!(c.tag, PropertyTag::Static);
    assert_eq!(c.reason, ClassificationReason::Constant);
    assert_eq!(c.evidence, vec![json!([10, 20, 0])]);
}

#[test]
fn single_component_constant_is_unwrapped() {
    let c = classify(json!({"a": 0, "k": [100]}));
    assert_eq!(c.evidence, vec![json!(100)]);
}

#[test]
fn equal_keyframes_are_static() {
    let c = classify(json!({
        "a": 1,
        "k": [
            {"t": 0, "s": [100], "i": {"x": [0.8], "y": [1]}, "o": {"x": [0.2], "y": [0]}},
            {"t": 30, "s": [100]},
            {"t": 60}
        ]
    }));
    assert!(c.is_static());
    assert_eq!(c.reason, ClassificationReason::EqualKeyframes);
    assert_eq!(c.evidence, vec![json!(100), json!(100)]);
}

#[test]
fn integer_and_float_samples_compare_equal() {
    let c = classify(json!({"a": 1, "k": [{"t": 0, "s": [1, 2]}, {"t": 10, "s": [1.0, 2.0]}]}));
    assert!(c.is_static());
}

#[test]
fn distinct_keyframes_are_animated() {
    let c = classify(json!({"a": 1, "k": [{"t": 0, "s": [0]}, {"t": 30, "s": [100]}]}));
    assert_eq!(c.tag, PropertyTag::Animated);
    assert_eq!(c.reason, ClassificationReason::DistinctKeyframes);
    assert_eq!(c.evidence, vec![json!(0), json!(100)]);
}

#[test]
fn legacy_end_values_are_sampled() {
    let c = classify(json!({"a": 1, "k": [{"t": 0, "s": [5], "e": [50]}, {"t": 30}]}));
    assert_eq!(c.reason, ClassificationReason::DistinctKeyframes);
    assert_eq!(c.evidence, vec![json!(5), json!(50)]);
}

#[test]
fn expressions_keep_the_property_animated() {
    let c = classify(json!({"a": 0, "k": 100, "x": "time * 10"}));
    assert_eq!(c.tag, PropertyTag::Animated);
    assert_eq!(c.reason, ClassificationReason::Expression);
}

#[test]
fn slot_ids_keep_the_property_animated() {
    let c = classify(json!({"a": 0, "k": 100, "sid": "opacity"}));
    assert_eq!(c.reason, ClassificationReason::SlotOverride);
}

#[test]
fn unknown_members_keep_the_property_animated() {
    let c = classify(json!({"a": 0, "k": 100, "zz": true}));
    assert_eq!(
        c.reason,
        ClassificationReason::UnknownModifier("zz".to_string())
    );
}

#[test]
fn spatial_tangents_defeat_equal_positions() {
    let moving = classify(json!({"a": 1, "k": [
        {"t": 0, "s": [256, 256], "to": [10, 0], "ti": [0, 0]},
        {"t": 30, "s": [256, 256]}
    ]}));
    assert_eq!(moving.reason, ClassificationReason::SpatialTangents);

    let still = classify(json!({"a": 1, "k": [
        {"t": 0, "s": [256, 256], "to": [0, 0], "ti": [0, 0]},
        {"t": 30, "s": [256, 256]}
    ]}));
    assert!(still.is_static());
}

#[test]
fn malformed_shapes_are_animated() {
    for prop in [
        json!({"a": 1, "k": 100}),
        json!({"a": 2, "k": 100}),
        json!({"a": 1, "k": [{"t": 0}, {"t": 10, "s": [1]}]}),
        json!({"a": 1, "k": [{"t": 0}]}),
        json!({"a": 0}),
        json!(42),
    ] {
        let c = classify(prop.clone());
        assert_eq!(c.tag, PropertyTag::Animated, "{prop}");
        assert_eq!(c.reason, ClassificationReason::Malformed, "{prop}");
    }
}

#[test]
fn discovery_walks_shapes_and_gradients_in_key_order() {
    let layer: Layer = serde_json::from_value(json!({
        "ty": 4,
        "ind": 1,
        "ks": {
            "o": {"a": 0, "k": 100},
            "p": {"s": true, "x": {"a": 0, "k": 256}, "y": {"a": 0, "k": 256}}
        },
        "shapes": [{
            "ty": "gr",
            "it": [
                {"ty": "fl", "c": {"a": 0, "k": [1, 0, 0, 1]}, "o": {"a": 0, "k": 100}},
                {"ty": "gf", "g": {"p": 3, "k": {"a": 0, "k": [0, 1, 1, 1]}}, "o": {"a": 0, "k": 100}}
            ]
        }]
    }))
    .unwrap();

    let paths: Vec<String> = discover_properties(&layer)
        .into_iter()
        .map(|(p, _)| p.to_string())
        .collect();
    assert_eq!(
        paths,
        [
            "ks.o",
            "ks.p.x",
            "ks.p.y",
            "shapes[0].it[0].c",
            "shapes[0].it[0].o",
            "shapes[0].it[1].g.k",
            "shapes[0].it[1].o",
        ]
    );
}

#[test]
fn classify_layer_covers_every_discovered_property() {
    let layer: Layer = serde_json::from_value(json!({
        "ks": {
            "o": {"a": 1, "k": [{"t": 0, "s": [0]}, {"t": 10, "s": [100]}]},
            "r": {"a": 0, "k": 0}
        }
    }))
    .unwrap();
    let out = classify_layer(&layer);
    assert_eq!(out.len(), 2);
    assert!(!out[0].is_static());
    assert!(out[1].is_static());
}

#[test]
fn value_equality_is_type_aware() {
    assert!(values_equal(&json!(1), &json!(1.0)));
    assert!(values_equal(&json!(-0.0), &json!(0)));
    assert!(values_equal(
        &json!({"c": false, "v": [[0, 1]]}),
        &json!({"v": [[0.0, 1.0]], "c": false})
    ));
    assert!(!values_equal(&json!([1, 2]), &json!([1, 2, 3])));
    assert!(!values_equal(&json!("1"), &json!(1)));
}
