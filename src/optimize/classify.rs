//! Static/animated classification of animatable properties.
//!
//! A property is any JSON object carrying a `k` member. Keyframed properties hold an array of
//! keyframe objects (`{"t": .., "s": [..], ...}`) in `k`; constant ones hold the value itself.
//! Anything the classifier cannot prove constant is reported as animated.

use crate::foundation::path::PropertyPath;
use crate::scene::model::Layer;
use serde::Serialize;
use serde_json::{Map, Value};

/// Property members the classifier understands. Any other member is treated as an unknown
/// modifier.
const KNOWN_PROPERTY_KEYS: &[&str] = &["a", "k", "x", "ix", "l", "s", "nm", "mn", "hd", "sid"];

/// Whether a property can be collapsed to a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyTag {
    /// Proven constant over the whole timeline.
    Static,
    /// Varies, or could not be proven constant.
    Animated,
}

/// Why a property got its tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum ClassificationReason {
    /// No keyframes at all.
    Constant,
    /// Keyframed, but every keyframe value is the same.
    EqualKeyframes,
    /// At least two keyframe values differ.
    DistinctKeyframes,
    /// An expression (`x`) is attached.
    Expression,
    /// A slot id (`sid`) lets the host override the value.
    SlotOverride,
    /// Non-zero spatial tangents move the value between equal keyframes.
    SpatialTangents,
    /// A member the classifier does not understand.
    UnknownModifier(String),
    /// Keyframes or animation flag are not in a recognised shape.
    Malformed,
}

/// Classification of one property slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyClassification {
    /// Location relative to the owning layer.
    pub path: PropertyPath,
    /// Static or animated.
    pub tag: PropertyTag,
    /// Why the tag was chosen.
    pub reason: ClassificationReason,
    /// Sampled values, timeline order: first keyframe, interior keyframes, last keyframe.
    pub evidence: Vec<Value>,
}

impl PropertyClassification {
    /// Return `true` when the property is proven constant.
    pub fn is_static(&self) -> bool {
        self.tag == PropertyTag::Static
    }

    fn animated(path: PropertyPath, reason: ClassificationReason, evidence: Vec<Value>) -> Self {
        Self {
            path,
            tag: PropertyTag::Animated,
            reason,
            evidence,
        }
    }

    fn static_(path: PropertyPath, reason: ClassificationReason, evidence: Vec<Value>) -> Self {
        Self {
            path,
            tag: PropertyTag::Static,
            reason,
            evidence,
        }
    }
}

/// Find every animatable property of `layer`, in deterministic (sorted key, array) order.
pub fn discover_properties(layer: &Layer) -> Vec<(PropertyPath, &Value)> {
    let mut out = Vec::new();
    for (key, value) in &layer.props {
        walk(value, PropertyPath::root().key(key.as_str()), &mut out);
    }
    out
}

fn walk<'a>(v: &'a Value, path: PropertyPath, out: &mut Vec<(PropertyPath, &'a Value)>) {
    match v {
        Value::Object(obj) => {
            if is_property(obj) {
                out.push((path, v));
                return;
            }
            for (k, child) in obj {
                walk(child, path.key(k.as_str()), out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                walk(child, path.index(i), out);
            }
        }
        _ => {}
    }
}

// Gradient color containers (`{"p": 3, "k": {"a": 0, "k": [...]}}`) wrap the real property.
fn is_property(obj: &Map<String, Value>) -> bool {
    match obj.get("k") {
        Some(Value::Object(inner)) => !inner.contains_key("k"),
        Some(_) => true,
        None => false,
    }
}

/// Classify every property of a layer.
pub fn classify_layer(layer: &Layer) -> Vec<PropertyClassification> {
    discover_properties(layer)
        .into_iter()
        .map(|(path, prop)| classify_property(path, prop))
        .collect()
}

/// Classify one property object.
pub fn classify_property(path: PropertyPath, prop: &Value) -> PropertyClassification {
    let Some(obj) = prop.as_object() else {
        return PropertyClassification::animated(path, ClassificationReason::Malformed, vec![]);
    };

    if obj.get("x").is_some_and(Value::is_string) {
        return PropertyClassification::animated(path, ClassificationReason::Expression, vec![]);
    }
    if obj.contains_key("sid") {
        return PropertyClassification::animated(path, ClassificationReason::SlotOverride, vec![]);
    }
    if let Some(unknown) = obj
        .keys()
        .find(|k| !KNOWN_PROPERTY_KEYS.contains(&k.as_str()))
    {
        return PropertyClassification::animated(
            path,
            ClassificationReason::UnknownModifier(unknown.clone()),
            vec![],
        );
    }

    let animated_flag = match obj.get("a") {
        None => None,
        Some(a) => match a.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => {
                return PropertyClassification::animated(
                    path,
                    ClassificationReason::Malformed,
                    vec![],
                );
            }
        },
    };

    let Some(k) = obj.get("k") else {
        return PropertyClassification::animated(path, ClassificationReason::Malformed, vec![]);
    };

    match keyframes(k) {
        Some(kfs) => classify_keyframes(path, kfs),
        None if animated_flag == Some(true) => {
            PropertyClassification::animated(path, ClassificationReason::Malformed, vec![])
        }
        None => PropertyClassification::static_(
            path,
            ClassificationReason::Constant,
            vec![normalize(k).clone()],
        ),
    }
}

/// Return the keyframe list when `k` looks keyframed.
fn keyframes(k: &Value) -> Option<&[Value]> {
    let items = k.as_array()?;
    let looks_keyframed = !items.is_empty()
        && items
            .iter()
            .all(|kf| kf.get("t").is_some_and(Value::is_number));
    looks_keyframed.then_some(items.as_slice())
}

fn classify_keyframes(path: PropertyPath, kfs: &[Value]) -> PropertyClassification {
    let mut samples = Vec::with_capacity(kfs.len() + 1);
    let last = kfs.len() - 1;
    for (i, kf) in kfs.iter().enumerate() {
        match kf.get("s") {
            Some(s) => samples.push(normalize(s).clone()),
            // Modern exports close the timeline with a bare `{"t": ..}` keyframe.
            None if i == last && i > 0 => {}
            None => {
                return PropertyClassification::animated(
                    path,
                    ClassificationReason::Malformed,
                    samples,
                );
            }
        }
        if let Some(e) = kf.get("e") {
            samples.push(normalize(e).clone());
        }
    }

    if samples.is_empty() {
        return PropertyClassification::animated(path, ClassificationReason::Malformed, samples);
    }

    if samples.len() > 1 && kfs.iter().any(has_spatial_tangents) {
        return PropertyClassification::animated(
            path,
            ClassificationReason::SpatialTangents,
            samples,
        );
    }

    let first = &samples[0];
    if samples[1..].iter().all(|s| values_equal(first, s)) {
        PropertyClassification::static_(path, ClassificationReason::EqualKeyframes, samples)
    } else {
        PropertyClassification::animated(path, ClassificationReason::DistinctKeyframes, samples)
    }
}

fn has_spatial_tangents(kf: &Value) -> bool {
    ["ti", "to"].iter().any(|key| match kf.get(*key) {
        None => false,
        Some(Value::Array(items)) => items.iter().any(|c| c.as_f64() != Some(0.0)),
        Some(_) => true,
    })
}

/// Keyframe `s` values wrap scalars in one-element arrays; unwrap them.
pub(crate) fn normalize(v: &Value) -> &Value {
    match v {
        Value::Array(items) if items.len() == 1 => &items[0],
        _ => v,
    }
}

/// Type-aware equality: numbers compare as `f64` (so `1 == 1.0` and `-0.0 == 0.0`), arrays and
/// objects component-wise.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/classify.rs"]
mod tests;
