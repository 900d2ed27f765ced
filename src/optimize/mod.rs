//! Static-property optimizer.
//!
//! Classification never fails: anything that cannot be proven constant stays animated. Transform
//! passes are best-effort; a failing pass is skipped and reported in
//! [`bundle::OptimizationStats::warnings`].

pub(crate) mod bundle;
pub(crate) mod classify;
pub(crate) mod passes;
pub(crate) mod value;

use crate::optimize::bundle::{LayerProperties, OptimizedBundle};
use crate::optimize::classify::classify_layer;
use crate::optimize::passes::{TransformContext, TransformPass};
use crate::scene::model::{AnimationGraph, Layer};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Options controlling an optimizer run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizerOptions {
    /// Pass chain, applied in order.
    pub passes: Vec<TransformPass>,
    /// Classify layers on the rayon pool.
    pub parallel: bool,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            passes: TransformPass::default_chain(),
            parallel: false,
        }
    }
}

/// Classify every property of `graph`, then run the configured pass chain.
#[tracing::instrument(skip(graph, opts), fields(layers = graph.layers.len(), passes = opts.passes.len()))]
pub fn optimize(graph: &AnimationGraph, opts: &OptimizerOptions) -> OptimizedBundle {
    let layers = classify_layers(&graph.layers, opts.parallel);
    let precomp_layers: BTreeMap<String, Vec<LayerProperties>> = graph
        .assets
        .iter()
        .filter_map(|a| {
            a.layers
                .as_ref()
                .map(|l| (a.id.clone(), classify_layers(l, opts.parallel)))
        })
        .collect();

    let mut ctx = TransformContext::new(graph);
    let bundle = OptimizedBundle::new(graph.clone(), layers, precomp_layers);
    let bundle = run_passes(&mut ctx, bundle, &opts.passes);
    finish(ctx, bundle)
}

/// Fold `bundle` through `passes` in order. A failing pass leaves its input untouched.
pub(crate) fn run_passes(
    ctx: &mut TransformContext<'_>,
    mut bundle: OptimizedBundle,
    passes: &[TransformPass],
) -> OptimizedBundle {
    for &pass in passes {
        let snapshot = bundle.clone();
        bundle = match pass.apply(ctx, bundle) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(pass = pass.name(), error = %e, "optimizer pass skipped");
                ctx.warnings
                    .push(format!("optimizer pass {} skipped: {e}", pass.name()));
                snapshot
            }
        };
    }
    bundle
}

fn classify_layers(layers: &[Layer], parallel: bool) -> Vec<LayerProperties> {
    let one = |(i, layer): (usize, &Layer)| {
        LayerProperties::from_classifications(layer.label(i), layer, classify_layer(layer))
    };
    if parallel {
        layers.par_iter().enumerate().map(one).collect()
    } else {
        layers.iter().enumerate().map(one).collect()
    }
}

fn finish(ctx: TransformContext<'_>, mut bundle: OptimizedBundle) -> OptimizedBundle {
    bundle.refresh_stats();
    bundle.result.layers_removed = ctx.layers_removed;
    bundle.result.assets_removed = ctx.assets_removed;
    bundle.result.properties_substituted = ctx.properties_substituted;
    bundle.result.estimated_bytes_saved =
        compact_len(ctx.source) as i64 - compact_len(&bundle.graph) as i64;
    bundle.stats.warnings = ctx.warnings;

    tracing::debug!(
        examined = bundle.result.properties_examined,
        promoted = bundle.result.properties_static,
        bytes_saved = bundle.result.estimated_bytes_saved,
        "optimizer finished"
    );
    bundle
}

fn compact_len(graph: &AnimationGraph) -> usize {
    serde_json::to_vec(graph).map_or(0, |v| v.len())
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/optimizer.rs"]
mod tests;
