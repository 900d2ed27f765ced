use crate::foundation::error::{TgsError, TgsResult};
use crate::scene::model::{AnimationGraph, Layer};
use std::collections::{HashMap, HashSet};

/// Serialize animation data for embedding.
///
/// Output is deterministic: typed fields keep declaration order and every JSON object is emitted
/// with sorted keys. Non-finite numbers and precomposition cycles are rejected since neither can
/// be represented in (or played back from) JSON.
pub fn serialize_animation_data(graph: &AnimationGraph, minify: bool) -> TgsResult<String> {
    check_finite(graph)?;
    check_acyclic(graph)?;
    let out = if minify {
        serde_json::to_string(graph)
    } else {
        serde_json::to_string_pretty(graph)
    };
    out.map_err(|e| TgsError::generation(format!("serialize animation data: {e}")))
}

fn check_finite(graph: &AnimationGraph) -> TgsResult<()> {
    let top = [
        ("fr", graph.frame_rate),
        ("ip", graph.in_frame),
        ("op", graph.out_frame),
        ("w", graph.width),
        ("h", graph.height),
    ];
    if let Some((key, v)) = top.iter().find(|(_, v)| !v.is_finite()) {
        return Err(TgsError::generation(format!(
            "{key} is not representable ({v})"
        )));
    }

    let nested = graph
        .assets
        .iter()
        .filter_map(|a| a.layers.as_deref())
        .flatten();
    for layer in graph.layers.iter().chain(nested) {
        for v in [layer.in_frame, layer.out_frame, layer.start_time]
            .into_iter()
            .flatten()
        {
            if !v.is_finite() {
                return Err(TgsError::generation(format!(
                    "layer \"{}\" has a non-representable time value ({v})",
                    layer.name.as_deref().unwrap_or("")
                )));
            }
        }
    }
    Ok(())
}

fn check_acyclic(graph: &AnimationGraph) -> TgsResult<()> {
    let children: HashMap<&str, Vec<&str>> = graph
        .assets
        .iter()
        .filter_map(|a| Some((a.id.as_str(), refs(a.layers.as_deref()?))))
        .collect();

    let mut done = HashSet::<&str>::new();
    for &start in children.keys() {
        let mut on_path = Vec::<&str>::new();
        visit(start, &children, &mut on_path, &mut done)?;
    }
    Ok(())
}

fn refs(layers: &[Layer]) -> Vec<&str> {
    layers.iter().filter_map(|l| l.ref_id.as_deref()).collect()
}

fn visit<'a>(
    id: &'a str,
    children: &HashMap<&'a str, Vec<&'a str>>,
    on_path: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> TgsResult<()> {
    if on_path.contains(&id) {
        return Err(TgsError::generation(format!(
            "precomposition cycle through \"{id}\""
        )));
    }
    if done.contains(id) {
        return Ok(());
    }
    on_path.push(id);
    for &child in children.get(id).map(Vec::as_slice).unwrap_or_default() {
        visit(child, children, on_path, done)?;
    }
    on_path.pop();
    done.insert(id);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/generate/serialize.rs"]
mod tests;
