use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Layer `ty` code for null (parenting-only) layers.
pub const LAYER_KIND_NULL: i64 = 3;

/// Parsed Lottie/Bodymovin document.
///
/// Only the fields the pipeline reasons about are typed; every other key is kept verbatim in
/// [`AnimationGraph::extra`] so the graph re-serializes without loss. Layers reference
/// precomposition (and image) assets by `refId`; see [`AnimationGraph::asset_index`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationGraph {
    /// Bodymovin format version (`v`).
    #[serde(rename = "v", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Frames per second (`fr`).
    #[serde(rename = "fr", serialize_with = "ser_num")]
    pub frame_rate: f64,
    /// First frame of the timeline (`ip`).
    #[serde(rename = "ip", serialize_with = "ser_num")]
    pub in_frame: f64,
    /// Frame the timeline ends at (`op`).
    #[serde(rename = "op", serialize_with = "ser_num")]
    pub out_frame: f64,
    /// Canvas width in px (`w`).
    #[serde(rename = "w", serialize_with = "ser_num")]
    pub width: f64,
    /// Canvas height in px (`h`).
    #[serde(rename = "h", serialize_with = "ser_num")]
    pub height: f64,
    /// Animation name (`nm`).
    #[serde(rename = "nm", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 3D flag (`ddd`).
    #[serde(rename = "ddd", default, skip_serializing_if = "Option::is_none")]
    pub three_d: Option<i64>,
    /// Image and precomposition assets.
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Root layers, topmost first.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// TGS provenance marker (`tgs`); `1` for Telegram stickers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tgs: Option<i64>,
    /// Untyped remainder of the document (markers, fonts, chars, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AnimationGraph {
    /// Map asset id to its position in [`AnimationGraph::assets`].
    ///
    /// The first occurrence wins when ids are duplicated.
    pub fn asset_index(&self) -> HashMap<&str, usize> {
        let mut idx = HashMap::with_capacity(self.assets.len());
        for (i, a) in self.assets.iter().enumerate() {
            idx.entry(a.id.as_str()).or_insert(i);
        }
        idx
    }

    /// Look up an asset by id.
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }
}

/// Entry of the `assets` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Identifier layers refer to through `refId`.
    pub id: String,
    /// Present for precompositions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<Layer>>,
    /// Every other member (`w`, `h`, `p`, `u`, `e`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Asset {
    /// Return `true` when this asset is a precomposition.
    pub fn is_precomp(&self) -> bool {
        self.layers.is_some()
    }
}

/// One layer of the root composition or of a precomposition.
///
/// Animatable content (`ks`, `shapes`, `masksProperties`, `ef`, `t`, `tm`, ...) lives in
/// [`Layer::props`] and is walked generically by the optimizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer type code (`ty`).
    #[serde(rename = "ty", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    /// Layer name (`nm`).
    #[serde(rename = "nm", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Layer index used for parenting (`ind`).
    #[serde(rename = "ind", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    /// Parent layer index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,
    /// Referenced asset id.
    #[serde(rename = "refId", default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    /// First frame the layer is visible (`ip`).
    #[serde(
        rename = "ip",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_opt_num"
    )]
    pub in_frame: Option<f64>,
    /// Frame the layer stops being visible (`op`).
    #[serde(
        rename = "op",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_opt_num"
    )]
    pub out_frame: Option<f64>,
    /// Frame the layer's local time starts at (`st`).
    #[serde(
        rename = "st",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_opt_num"
    )]
    pub start_time: Option<f64>,
    /// Hidden flag (`hd`).
    #[serde(rename = "hd", default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// Track matte source flag (`td`).
    #[serde(rename = "td", default, skip_serializing_if = "Option::is_none")]
    pub matte_source: Option<i64>,
    /// Every other member, including all animatable content.
    #[serde(flatten)]
    pub props: BTreeMap<String, Value>,
}

impl Layer {
    /// Human-readable label for logs and stats.
    pub fn label(&self, position: usize) -> String {
        match (&self.name, self.index) {
            (Some(nm), _) => nm.clone(),
            (None, Some(ind)) => format!("#{ind}"),
            (None, None) => format!("layer {position}"),
        }
    }

    /// Return `true` when the layer is flagged hidden.
    pub fn is_hidden(&self) -> bool {
        self.hidden == Some(true)
    }

    /// Return `true` when the layer feeds a track matte.
    pub fn is_matte_source(&self) -> bool {
        self.matte_source.is_some_and(|td| td != 0)
    }
}

// Integral values go out as integers so `512` does not come back as `512.0`.
fn ser_num<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
        s.serialize_i64(*v as i64)
    } else {
        s.serialize_f64(*v)
    }
}

fn ser_opt_num<S: Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(v) => ser_num(v, s),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
