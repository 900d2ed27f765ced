use crate::scene::model::AnimationGraph;
use serde::Serialize;

/// Value of the `tgs` field that marks a Telegram sticker.
pub const TGS_PROVENANCE_FLAG: i64 = 1;

/// Summary of a validated animation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationMetadata {
    /// Composition name (`nm`), when set.
    pub name: Option<String>,
    /// Seconds.
    pub duration: f64,
    /// Frames per second.
    pub frame_rate: f64,
    /// Raw `op - ip` frame delta.
    pub total_frames: f64,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Root layers.
    pub layer_count: usize,
    /// `tgs` equals [`TGS_PROVENANCE_FLAG`].
    pub is_tgs: bool,
}

/// Derive [`AnimationMetadata`] from a graph.
///
/// The graph must already have passed validation (in particular `frame_rate > 0`).
pub fn extract_metadata(graph: &AnimationGraph) -> AnimationMetadata {
    let total_frames = graph.out_frame - graph.in_frame;
    AnimationMetadata {
        name: graph.name.clone(),
        duration: total_frames / graph.frame_rate,
        frame_rate: graph.frame_rate,
        total_frames,
        width: graph.width as u32,
        height: graph.height as u32,
        layer_count: graph.layers.len(),
        is_tgs: graph.tgs == Some(TGS_PROVENANCE_FLAG),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/metadata.rs"]
mod tests;
