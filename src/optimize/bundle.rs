use crate::foundation::path::PropertyPath;
use crate::optimize::classify::{ClassificationReason, PropertyClassification};
use crate::optimize::value::{ComputedStaticValue, compute_static_value};
use crate::scene::model::{AnimationGraph, Layer};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Property proven constant over the whole timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticProperty {
    /// Location relative to the owning layer.
    pub path: PropertyPath,
    /// Constant the property holds.
    pub value: ComputedStaticValue,
}

/// Property that varies (or could not be proven constant). Keyframes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimatedPropertyDescriptor {
    /// Location relative to the owning layer.
    pub path: PropertyPath,
    /// The property's `k` member, untouched.
    pub keyframes: Value,
    /// Why the property could not be collapsed.
    pub reason: ClassificationReason,
}

/// Classification outcome stored per property slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum PropertySlot {
    /// Collapsed to a constant.
    Static(StaticProperty),
    /// Kept as authored.
    Animated(AnimatedPropertyDescriptor),
}

impl PropertySlot {
    /// Location of the slot's property.
    pub fn path(&self) -> &PropertyPath {
        match self {
            Self::Static(p) => &p.path,
            Self::Animated(p) => &p.path,
        }
    }

    /// Return `true` for a collapsed slot.
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

/// Slot table of one layer, aligned with the layer's position in its layer list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerProperties {
    /// Layer name, or its `ind` when unnamed.
    pub name: String,
    /// One slot per discovered property, discovery order.
    pub slots: Vec<PropertySlot>,
}

impl LayerProperties {
    /// Turn a layer's classifications into slots.
    ///
    /// A static classification that yields no computable value falls back to animated.
    pub fn from_classifications(
        name: String,
        layer: &Layer,
        classifications: Vec<PropertyClassification>,
    ) -> Self {
        let slots = classifications
            .into_iter()
            .map(|c| match compute_static_value(&c) {
                Some(value) => PropertySlot::Static(StaticProperty {
                    path: c.path,
                    value,
                }),
                None => {
                    let keyframes = c
                        .path
                        .resolve_in(&layer.props)
                        .and_then(|p| p.get("k"))
                        .cloned()
                        .unwrap_or(Value::Null);
                    let reason = if c.is_static() {
                        ClassificationReason::Malformed
                    } else {
                        c.reason
                    };
                    PropertySlot::Animated(AnimatedPropertyDescriptor {
                        path: c.path,
                        keyframes,
                        reason,
                    })
                }
            })
            .collect();
        Self { name, slots }
    }

    /// Number of properties discovered.
    pub fn examined(&self) -> usize {
        self.slots.len()
    }

    /// Number of properties collapsed to constants.
    pub fn promoted(&self) -> usize {
        self.slots.iter().filter(|s| s.is_static()).count()
    }
}

/// Aggregate counters of one optimizer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Properties discovered across every layer.
    pub properties_examined: usize,
    /// Properties proven constant.
    pub properties_static: usize,
    /// Properties kept animated.
    pub properties_animated: usize,
    /// Static slots actually rewritten in the graph.
    pub properties_substituted: usize,
    /// Root layers dropped as dead.
    pub layers_removed: usize,
    /// Assets no layer reaches any more.
    pub assets_removed: usize,
    /// Compact-JSON size of the input minus that of the output graph.
    pub estimated_bytes_saved: i64,
}

/// Per-layer breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStats {
    /// `layers[i]` or `assets[<id>].layers[i]`.
    pub scope: String,
    /// Layer name, or its `ind` when unnamed.
    pub name: String,
    /// Properties discovered on the layer.
    pub examined: usize,
    /// Properties collapsed to constants.
    pub promoted: usize,
}

/// Per-layer stats plus warnings of one optimizer run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimizationStats {
    /// Root layers first, then precomposition layers by asset id.
    pub layers: Vec<LayerStats>,
    /// Skipped passes and similar non-fatal issues.
    pub warnings: Vec<String>,
}

/// Optimizer output: the rewritten graph plus slot tables aligned with its layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedBundle {
    /// Graph after every pass.
    pub graph: AnimationGraph,
    /// One entry per root layer, same order as `graph.layers`.
    pub layers: Vec<LayerProperties>,
    /// Precomposition id -> one entry per layer of that precomposition.
    pub precomp_layers: BTreeMap<String, Vec<LayerProperties>>,
    /// Counters.
    pub result: OptimizationResult,
    /// Per-layer breakdown and warnings.
    pub stats: OptimizationStats,
}

impl OptimizedBundle {
    /// Assemble an unoptimized bundle from classified slot tables.
    pub(crate) fn new(
        graph: AnimationGraph,
        layers: Vec<LayerProperties>,
        precomp_layers: BTreeMap<String, Vec<LayerProperties>>,
    ) -> Self {
        Self {
            graph,
            layers,
            precomp_layers,
            result: OptimizationResult::default(),
            stats: OptimizationStats::default(),
        }
    }

    /// Iterate every slot table with its scope label, root layers first.
    pub fn layer_tables(&self) -> impl Iterator<Item = (String, &LayerProperties)> {
        let root = self
            .layers
            .iter()
            .enumerate()
            .map(|(i, l)| (format!("layers[{i}]"), l));
        let nested = self.precomp_layers.iter().flat_map(|(id, tables)| {
            tables
                .iter()
                .enumerate()
                .map(move |(i, l)| (format!("assets[{id}].layers[{i}]"), l))
        });
        root.chain(nested)
    }

    /// Recompute [`OptimizationStats::layers`] and the slot counters from the slot tables.
    pub(crate) fn refresh_stats(&mut self) {
        let layers: Vec<LayerStats> = self
            .layer_tables()
            .map(|(scope, t)| LayerStats {
                scope,
                name: t.name.clone(),
                examined: t.examined(),
                promoted: t.promoted(),
            })
            .collect();

        let examined: usize = layers.iter().map(|l| l.examined).sum();
        let promoted: usize = layers.iter().map(|l| l.promoted).sum();
        self.result.properties_examined = examined;
        self.result.properties_static = promoted;
        self.result.properties_animated = examined - promoted;
        self.stats.layers = layers;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/bundle.rs"]
mod tests;
