use crate::optimize::classify::PropertyClassification;
use serde::Serialize;
use serde_json::Value;

/// Property keys whose vector values are colors.
const COLOR_KEYS: &[&str] = &["c", "sc", "fc"];

/// Resolved constant of a static property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComputedStaticValue {
    /// Single number (opacity, rotation, stroke width).
    Scalar(f64),
    /// Positions, scales, anchors and other number lists.
    Vector(Vec<f64>),
    /// RGB or RGBA components in `0..=1`, as many as the source had.
    Color(Vec<f64>),
    /// Bezier paths, text documents, gradient stops and other composite values.
    Structured(Value),
}

impl ComputedStaticValue {
    /// JSON form written back into the graph as the property's `k`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(x) => number(*x),
            Self::Vector(xs) | Self::Color(xs) => {
                Value::Array(xs.iter().map(|x| number(*x)).collect())
            }
            Self::Structured(v) => v.clone(),
        }
    }
}

/// Collapse a static property to its single value.
///
/// Returns `None` for animated classifications or when no sample is available. All samples of a
/// static property are equal, so the first one is taken as is.
pub fn compute_static_value(c: &PropertyClassification) -> Option<ComputedStaticValue> {
    if !c.is_static() {
        return None;
    }
    let first = c.evidence.first()?;
    let is_color_key = c.path.last_key().is_some_and(|k| COLOR_KEYS.contains(&k));

    Some(match first {
        Value::Number(n) => ComputedStaticValue::Scalar(n.as_f64()?),
        Value::Array(items) => match items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>() {
            Some(xs) if is_color_key && (xs.len() == 3 || xs.len() == 4) => {
                ComputedStaticValue::Color(xs)
            }
            Some(xs) => ComputedStaticValue::Vector(xs),
            None => ComputedStaticValue::Structured(first.clone()),
        },
        other => ComputedStaticValue::Structured(other.clone()),
    })
}

fn number(x: f64) -> Value {
    if x.fract() == 0.0 && x.abs() < 9.0e15 {
        Value::from(x as i64)
    } else {
        serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/value.rs"]
mod tests;
