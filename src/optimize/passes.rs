use crate::foundation::path::{PathSegment, PropertyPath};
use crate::optimize::bundle::{LayerProperties, OptimizedBundle, PropertySlot};
use crate::optimize::classify::ClassificationReason;
use crate::scene::model::{AnimationGraph, LAYER_KIND_NULL, Layer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Editor-only keys removed by [`TransformPass::StripEditorMetadata`].
const EDITOR_METADATA_KEYS: &[&str] = &["mn", "cl"];

/// Error raised by a pass. The optimizer skips the pass and keeps its input bundle.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PassError {
    /// A static slot no longer resolves to a property object.
    #[error("property {path} not found on {scope}")]
    UnresolvedProperty {
        /// Layer the slot belongs to, e.g. `layers[0]`.
        scope: String,
        /// Slot path relative to the layer.
        path: String,
    },

    /// Slot tables and layers differ in length.
    #[error("{scope}: slot tables ({tables}) out of sync with layers ({layers})")]
    OutOfSync {
        /// Layer list the tables belong to.
        scope: String,
        /// Number of slot tables.
        tables: usize,
        /// Number of layers.
        layers: usize,
    },
}

/// State shared by all passes of one optimizer run.
#[derive(Debug)]
pub struct TransformContext<'a> {
    /// Graph the optimizer was called with.
    pub source: &'a AnimationGraph,
    /// Root layers dropped so far.
    pub layers_removed: usize,
    /// Assets pruned so far.
    pub assets_removed: usize,
    /// Static slots rewritten in the graph so far.
    pub properties_substituted: usize,
    /// One entry per skipped pass.
    pub warnings: Vec<String>,
}

impl<'a> TransformContext<'a> {
    /// Fresh context with zeroed counters.
    pub fn new(source: &'a AnimationGraph) -> Self {
        Self {
            source,
            layers_removed: 0,
            assets_removed: 0,
            properties_substituted: 0,
            warnings: Vec::new(),
        }
    }
}

/// Optimizer transform passes.
///
/// Passes run in registration order; each one receives the previous pass's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformPass {
    /// Drop root layers that can never be visible and null layers nothing is parented to.
    DeadLayerElimination,
    /// Drop assets no root layer reaches.
    UnusedAssetPruning,
    /// Rewrite static slots in the graph to `{"a": 0, "k": value}`.
    StaticValueSubstitution,
    /// Remove After Effects editor metadata (`mn`, `cl`).
    StripEditorMetadata,
}

impl TransformPass {
    /// Default chain. Dead layers go first so later passes do less work.
    pub fn default_chain() -> Vec<Self> {
        vec![
            Self::DeadLayerElimination,
            Self::UnusedAssetPruning,
            Self::StaticValueSubstitution,
        ]
    }

    /// Kebab-case name used in logs and warnings.
    pub fn name(self) -> &'static str {
        match self {
            Self::DeadLayerElimination => "dead-layer-elimination",
            Self::UnusedAssetPruning => "unused-asset-pruning",
            Self::StaticValueSubstitution => "static-value-substitution",
            Self::StripEditorMetadata => "strip-editor-metadata",
        }
    }

    /// Run the pass over `bundle`, counting its work in `ctx`.
    pub fn apply(
        self,
        ctx: &mut TransformContext<'_>,
        bundle: OptimizedBundle,
    ) -> Result<OptimizedBundle, PassError> {
        match self {
            Self::DeadLayerElimination => eliminate_dead_layers(ctx, bundle),
            Self::UnusedAssetPruning => prune_unused_assets(ctx, bundle),
            Self::StaticValueSubstitution => substitute_static_values(ctx, bundle),
            Self::StripEditorMetadata => strip_editor_metadata(bundle),
        }
    }
}

/// Expressions can address layers and compositions by name, so structure-changing passes stay
/// away from graphs that use them.
fn has_expressions(bundle: &OptimizedBundle) -> bool {
    bundle.layer_tables().any(|(_, t)| {
        t.slots.iter().any(|s| {
            matches!(
                s,
                PropertySlot::Animated(a) if a.reason == ClassificationReason::Expression
            )
        })
    })
}

fn eliminate_dead_layers(
    ctx: &mut TransformContext<'_>,
    mut bundle: OptimizedBundle,
) -> Result<OptimizedBundle, PassError> {
    ensure_in_sync("layers", &bundle.layers, &bundle.graph.layers)?;
    if has_expressions(&bundle) {
        return Ok(bundle);
    }

    let keep = live_layers(&bundle.graph);
    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        let mut flags = keep.iter();
        bundle.graph.layers.retain(|_| *flags.next().unwrap_or(&true));
        let mut flags = keep.iter();
        bundle.layers.retain(|_| *flags.next().unwrap_or(&true));
        tracing::debug!(removed, "eliminated dead layers");
    }
    ctx.layers_removed += removed;
    Ok(bundle)
}

/// Layers that draw or feed a matte, plus every ancestor on their parent chains.
fn live_layers(g: &AnimationGraph) -> Vec<bool> {
    let mut keep: Vec<bool> = g
        .layers
        .iter()
        .map(|l| l.is_matte_source() || is_visible(l, g.in_frame, g.out_frame))
        .collect();
    let by_index: HashMap<i64, usize> = g
        .layers
        .iter()
        .enumerate()
        .filter_map(|(i, l)| l.index.map(|ind| (ind, i)))
        .collect();

    let mut stack: Vec<usize> = (0..keep.len()).filter(|&i| keep[i]).collect();
    while let Some(i) = stack.pop() {
        if let Some(&p) = g.layers[i].parent.and_then(|ind| by_index.get(&ind))
            && !keep[p]
        {
            keep[p] = true;
            stack.push(p);
        }
    }
    keep
}

/// Null layers draw nothing; they only matter as parents.
fn is_visible(layer: &Layer, comp_in: f64, comp_out: f64) -> bool {
    if layer.is_hidden() || layer.kind == Some(LAYER_KIND_NULL) {
        return false;
    }
    let ip = layer.in_frame.unwrap_or(comp_in);
    let op = layer.out_frame.unwrap_or(comp_out);
    ip < op && ip < comp_out && op > comp_in
}

fn prune_unused_assets(
    ctx: &mut TransformContext<'_>,
    mut bundle: OptimizedBundle,
) -> Result<OptimizedBundle, PassError> {
    if has_expressions(&bundle) {
        return Ok(bundle);
    }

    let g = &bundle.graph;
    let index = g.asset_index();
    let mut reached = HashSet::<&str>::new();
    let mut stack: Vec<&str> = g.layers.iter().filter_map(|l| l.ref_id.as_deref()).collect();
    while let Some(id) = stack.pop() {
        if !reached.insert(id) {
            continue;
        }
        if let Some(layers) = index.get(id).and_then(|&i| g.assets[i].layers.as_ref()) {
            stack.extend(layers.iter().filter_map(|l| l.ref_id.as_deref()));
        }
    }

    let unused: Vec<String> = g
        .assets
        .iter()
        .filter(|a| !reached.contains(a.id.as_str()))
        .map(|a| a.id.clone())
        .collect();
    if unused.is_empty() {
        return Ok(bundle);
    }

    bundle.graph.assets.retain(|a| !unused.contains(&a.id));
    for id in &unused {
        bundle.precomp_layers.remove(id);
    }
    tracing::debug!(removed = unused.len(), "pruned unused assets");
    ctx.assets_removed += unused.len();
    Ok(bundle)
}

fn substitute_static_values(
    ctx: &mut TransformContext<'_>,
    mut bundle: OptimizedBundle,
) -> Result<OptimizedBundle, PassError> {
    ensure_in_sync("layers", &bundle.layers, &bundle.graph.layers)?;
    let mut substituted = 0;
    for (i, (layer, table)) in bundle
        .graph
        .layers
        .iter_mut()
        .zip(&bundle.layers)
        .enumerate()
    {
        substituted += substitute_layer(layer, table, &format!("layers[{i}]"))?;
    }

    for asset in &mut bundle.graph.assets {
        let Some(layers) = asset.layers.as_mut() else {
            continue;
        };
        let scope = format!("assets[{}].layers", asset.id);
        let tables = bundle
            .precomp_layers
            .get(&asset.id)
            .ok_or_else(|| PassError::OutOfSync {
                scope: scope.clone(),
                tables: 0,
                layers: layers.len(),
            })?;
        ensure_in_sync(&scope, tables, layers.as_slice())?;
        for (i, (layer, table)) in layers.iter_mut().zip(tables).enumerate() {
            substituted += substitute_layer(layer, table, &format!("{scope}[{i}]"))?;
        }
    }

    ctx.properties_substituted += substituted;
    Ok(bundle)
}

fn substitute_layer(
    layer: &mut Layer,
    table: &LayerProperties,
    scope: &str,
) -> Result<usize, PassError> {
    let mut n = 0;
    for slot in &table.slots {
        let PropertySlot::Static(s) = slot else {
            continue;
        };
        if is_text_document(&s.path) {
            continue;
        }
        let prop = resolve_property(layer, &s.path, scope)?;
        let collapsed = s.value.to_json();
        let already = prop.get("a").and_then(Value::as_u64).unwrap_or(0) == 0
            && prop.get("k") == Some(&collapsed);
        if already {
            continue;
        }
        if let Some(obj) = prop.as_object_mut() {
            obj.insert("a".to_string(), Value::from(0));
            obj.insert("k".to_string(), collapsed);
            n += 1;
        }
    }
    Ok(n)
}

/// Text documents (`t.d`) keep their keyframe list even with a single keyframe; players only
/// read the keyframed form.
fn is_text_document(path: &PropertyPath) -> bool {
    matches!(
        path.segments(),
        [PathSegment::Key(t), PathSegment::Key(d)] if t == "t" && d == "d"
    )
}

fn resolve_property<'a>(
    layer: &'a mut Layer,
    path: &PropertyPath,
    scope: &str,
) -> Result<&'a mut Value, PassError> {
    path.resolve_in_mut(&mut layer.props)
        .filter(|v| v.is_object())
        .ok_or_else(|| PassError::UnresolvedProperty {
            scope: scope.to_string(),
            path: path.to_string(),
        })
}

fn strip_editor_metadata(mut bundle: OptimizedBundle) -> Result<OptimizedBundle, PassError> {
    let precomp_layers = bundle
        .graph
        .assets
        .iter_mut()
        .filter_map(|a| a.layers.as_mut())
        .flatten();
    for layer in bundle.graph.layers.iter_mut().chain(precomp_layers) {
        for key in EDITOR_METADATA_KEYS {
            layer.props.remove(*key);
        }
        for v in layer.props.values_mut() {
            strip_keys(v);
        }
    }
    Ok(bundle)
}

fn strip_keys(v: &mut Value) {
    match v {
        Value::Object(obj) => {
            for key in EDITOR_METADATA_KEYS {
                obj.remove(*key);
            }
            obj.values_mut().for_each(strip_keys);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_keys),
        _ => {}
    }
}

fn ensure_in_sync(
    scope: &str,
    tables: &[LayerProperties],
    layers: &[Layer],
) -> Result<(), PassError> {
    if tables.len() == layers.len() {
        Ok(())
    } else {
        Err(PassError::OutOfSync {
            scope: scope.to_string(),
            tables: tables.len(),
            layers: layers.len(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/passes.rs"]
mod tests;
