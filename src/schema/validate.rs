use crate::foundation::path::PropertyPath;
use crate::scene::model::{AnimationGraph, Layer};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Frame rate substituted by [`sanitize`] for a missing or non-positive `fr`.
pub const DEFAULT_FRAME_RATE: f64 = 60.0;
/// Canvas size substituted by [`sanitize`] for non-positive `w`/`h` (the TGS sticker size).
pub const DEFAULT_CANVAS_SIZE: f64 = 512.0;

/// How bad a structural problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Halts strict validation.
    Fatal,
    /// Repaired in place and reported as a warning.
    Recoverable,
}

/// One structural problem, anchored at a document path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationProblem {
    /// Whether strict validation stops on it.
    pub severity: Severity,
    /// Location from the document root.
    pub path: PropertyPath,
    /// Human-readable description.
    pub message: String,
}

impl ValidationProblem {
    /// Return `true` for [`Severity::Fatal`] problems.
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "$: {}", self.message);
        }
        write!(f, "$.{}: {}", self.path, self.message)
    }
}

/// Fatal problems that rejected a graph.
#[derive(Debug, Clone)]
pub struct ValidationErrors {
    /// Fatal problems in discovery order.
    pub problems: Vec<ValidationProblem>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.problems.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Outcome of [`validate`].
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// `false` when at least one fatal problem was found.
    pub valid: bool,
    /// Every problem found, in discovery order.
    pub problems: Vec<ValidationProblem>,
    /// Repaired graph when valid; the untouched input otherwise.
    pub graph: AnimationGraph,
}

impl ValidationResult {
    /// Fatal problems only.
    pub fn fatal_problems(&self) -> impl Iterator<Item = &ValidationProblem> {
        self.problems.iter().filter(|p| p.is_fatal())
    }

    /// Turn the result into the repaired graph plus its warnings, or the fatal problems.
    pub fn into_result(self) -> Result<(AnimationGraph, Vec<ValidationProblem>), ValidationErrors> {
        if self.valid {
            Ok((self.graph, self.problems))
        } else {
            Err(ValidationErrors {
                problems: self.problems.into_iter().filter(|p| p.is_fatal()).collect(),
            })
        }
    }
}

/// Strict validation.
///
/// Fatal problems win: if any is found the graph is returned unmodified with `valid = false`.
/// Otherwise recoverable problems are repaired in place and reported.
#[tracing::instrument(skip(graph), fields(layers = graph.layers.len()))]
pub fn validate(graph: AnimationGraph) -> ValidationResult {
    let mut repaired = graph.clone();
    let problems = check_graph(&mut repaired, Repair::Recoverable);

    if problems.iter().any(ValidationProblem::is_fatal) {
        for p in problems.iter().filter(|p| p.is_fatal()) {
            tracing::debug!(problem = %p, "fatal validation problem");
        }
        return ValidationResult {
            valid: false,
            problems,
            graph,
        };
    }

    log_repairs(&problems);
    ValidationResult {
        valid: true,
        problems,
        graph: repaired,
    }
}

/// Tolerant counterpart of [`validate`]: applies every available repair and never fails.
pub fn sanitize(graph: AnimationGraph) -> AnimationGraph {
    sanitize_with_report(graph).0
}

/// [`sanitize`], also returning what was repaired.
#[tracing::instrument(skip(graph), fields(layers = graph.layers.len()))]
pub fn sanitize_with_report(mut graph: AnimationGraph) -> (AnimationGraph, Vec<ValidationProblem>) {
    let problems = check_graph(&mut graph, Repair::All);
    log_repairs(&problems);
    (graph, problems)
}

fn log_repairs(problems: &[ValidationProblem]) {
    for p in problems {
        tracing::warn!(problem = %p, "repaired animation graph");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repair {
    Recoverable,
    All,
}

struct Checker {
    repair: Repair,
    problems: Vec<ValidationProblem>,
}

impl Checker {
    /// Record a problem; returns whether the caller should apply its repair.
    fn report(
        &mut self,
        severity: Severity,
        path: PropertyPath,
        message: impl Into<String>,
    ) -> bool {
        self.problems.push(ValidationProblem {
            severity,
            path,
            message: message.into(),
        });
        match severity {
            Severity::Recoverable => true,
            Severity::Fatal => self.repair == Repair::All,
        }
    }
}

struct LayerScope<'a> {
    asset_ids: &'a HashSet<String>,
    /// `(precomp, target)` edges that close a reference cycle.
    cycles: &'a HashSet<(String, String)>,
    /// Precomposition that owns the layer list; `None` for root layers.
    owner: Option<&'a str>,
    /// Composition bounds root layers are clamped into; `None` while the timeline itself is broken.
    bounds: Option<(f64, f64)>,
}

fn check_graph(g: &mut AnimationGraph, repair: Repair) -> Vec<ValidationProblem> {
    let mut c = Checker {
        repair,
        problems: Vec::new(),
    };
    let root = PropertyPath::root();

    if (!g.frame_rate.is_finite() || g.frame_rate <= 0.0)
        && c.report(
            Severity::Fatal,
            root.key("fr"),
            format!("frame rate must be finite and > 0 (got {})", g.frame_rate),
        )
    {
        g.frame_rate = DEFAULT_FRAME_RATE;
    }

    if !g.in_frame.is_finite()
        && c.report(Severity::Fatal, root.key("ip"), "in point must be finite")
    {
        g.in_frame = 0.0;
    }
    if !g.out_frame.is_finite()
        && c.report(Severity::Fatal, root.key("op"), "out point must be finite")
    {
        g.out_frame = g.in_frame;
    }
    if g.in_frame > g.out_frame
        && c.report(
            Severity::Fatal,
            root.key("ip"),
            format!(
                "in point {} is after out point {}",
                g.in_frame, g.out_frame
            ),
        )
    {
        std::mem::swap(&mut g.in_frame, &mut g.out_frame);
    }

    for (key, dim) in [("w", &mut g.width), ("h", &mut g.height)] {
        if !dim.is_finite() || *dim <= 0.0 {
            if c.report(
                Severity::Fatal,
                root.key(key),
                format!("{key} must be a positive integer (got {dim})"),
            ) {
                *dim = DEFAULT_CANVAS_SIZE;
            }
        } else if dim.fract() != 0.0
            && c.report(
                Severity::Recoverable,
                root.key(key),
                format!("{key} must be an integer (got {dim}); rounded"),
            )
        {
            *dim = dim.round().max(1.0);
        }
    }

    check_asset_ids(g, &mut c);

    let asset_ids: HashSet<String> = g.assets.iter().map(|a| a.id.clone()).collect();
    let cycles = cycle_closing_edges(g);

    check_layers(
        &mut g.layers,
        &root.key("layers"),
        &LayerScope {
            asset_ids: &asset_ids,
            cycles: &cycles,
            owner: None,
            bounds: (g.in_frame <= g.out_frame).then_some((g.in_frame, g.out_frame)),
        },
        &mut c,
    );

    for (i, asset) in g.assets.iter_mut().enumerate() {
        let owner = asset.id.as_str();
        if let Some(layers) = asset.layers.as_mut() {
            check_layers(
                layers,
                &root.key("assets").index(i).key("layers"),
                &LayerScope {
                    asset_ids: &asset_ids,
                    cycles: &cycles,
                    owner: Some(owner),
                    bounds: None,
                },
                &mut c,
            );
        }
    }

    c.problems
}

fn check_asset_ids(g: &mut AnimationGraph, c: &mut Checker) {
    let mut seen = HashSet::<&str>::new();
    let mut keep = Vec::with_capacity(g.assets.len());
    for (i, a) in g.assets.iter().enumerate() {
        let duplicate = !seen.insert(a.id.as_str());
        let drop = duplicate
            && c.report(
                Severity::Fatal,
                PropertyPath::root().key("assets").index(i).key("id"),
                format!("duplicate asset id \"{}\"", a.id),
            );
        keep.push(!drop);
    }
    let mut flags = keep.into_iter();
    g.assets.retain(|_| flags.next().unwrap_or(true));
}

/// Edges `(precomp, target)` such that `target` leads back to `precomp`.
fn cycle_closing_edges(g: &AnimationGraph) -> HashSet<(String, String)> {
    let mut adj = HashMap::<&str, Vec<&str>>::new();
    for a in &g.assets {
        if let Some(layers) = &a.layers {
            let targets = layers
                .iter()
                .filter_map(|l| l.ref_id.as_deref())
                .filter(|r| g.asset(r).is_some_and(|t| t.is_precomp()))
                .collect();
            adj.insert(a.id.as_str(), targets);
        }
    }

    let mut out = HashSet::new();
    for (&from, targets) in &adj {
        for &to in targets {
            if reaches(&adj, to, from) {
                out.insert((from.to_string(), to.to_string()));
            }
        }
    }
    out
}

fn reaches(adj: &HashMap<&str, Vec<&str>>, start: &str, goal: &str) -> bool {
    let mut stack = vec![start];
    let mut seen = HashSet::new();
    while let Some(cur) = stack.pop() {
        if cur == goal {
            return true;
        }
        if !seen.insert(cur) {
            continue;
        }
        if let Some(next) = adj.get(cur) {
            stack.extend(next.iter().copied());
        }
    }
    false
}

fn check_layers(
    layers: &mut Vec<Layer>,
    path: &PropertyPath,
    scope: &LayerScope<'_>,
    c: &mut Checker,
) {
    let mut keep = Vec::with_capacity(layers.len());
    for (i, layer) in layers.iter_mut().enumerate() {
        keep.push(check_layer(layer, &path.index(i), scope, c));
    }

    // Parent links are checked against the layers that survive.
    let indices: HashSet<i64> = layers
        .iter()
        .zip(&keep)
        .filter(|(_, k)| **k)
        .filter_map(|(l, _)| l.index)
        .collect();
    for (i, layer) in layers.iter_mut().enumerate() {
        if !keep[i] {
            continue;
        }
        if let Some(parent) = layer.parent
            && !indices.contains(&parent)
            && c.report(
                Severity::Recoverable,
                path.index(i).key("parent"),
                format!("parent layer {parent} does not exist; link removed"),
            )
        {
            layer.parent = None;
        }
    }

    let mut flags = keep.into_iter();
    layers.retain(|_| flags.next().unwrap_or(true));
}

/// Check one layer, repairing what is allowed. Returns `false` when the layer must be dropped.
fn check_layer(
    layer: &mut Layer,
    path: &PropertyPath,
    scope: &LayerScope<'_>,
    c: &mut Checker,
) -> bool {
    if let Some(ref_id) = layer.ref_id.as_deref() {
        if !scope.asset_ids.contains(ref_id) {
            if c.report(
                Severity::Fatal,
                path.key("refId"),
                format!("layer references missing asset \"{ref_id}\""),
            ) {
                return false;
            }
        } else if let Some(owner) = scope.owner
            && scope
                .cycles
                .contains(&(owner.to_string(), ref_id.to_string()))
            && c.report(
                Severity::Fatal,
                path.key("refId"),
                format!("precomposition \"{owner}\" reaches itself through \"{ref_id}\""),
            )
        {
            return false;
        }
    }

    for (key, slot) in [
        ("ip", &mut layer.in_frame),
        ("op", &mut layer.out_frame),
        ("st", &mut layer.start_time),
    ] {
        if let Some(v) = *slot
            && !v.is_finite()
            && c.report(
                Severity::Recoverable,
                path.key(key),
                format!("{key} must be finite; removed"),
            )
        {
            *slot = None;
        }
    }

    if let (Some(ip), Some(op)) = (layer.in_frame, layer.out_frame)
        && ip > op
        && c.report(
            Severity::Recoverable,
            path.clone(),
            format!("layer in point {ip} is after out point {op}; swapped"),
        )
    {
        layer.in_frame = Some(op);
        layer.out_frame = Some(ip);
    }

    if let Some((lo, hi)) = scope.bounds {
        let clamp = |v: Option<f64>| v.map(|x| x.clamp(lo, hi));
        let (ip, op) = (clamp(layer.in_frame), clamp(layer.out_frame));
        if (ip != layer.in_frame || op != layer.out_frame)
            && c.report(
                Severity::Recoverable,
                path.clone(),
                format!(
                    "layer bounds [{}, {}] clamped to composition [{lo}, {hi}]",
                    fmt_opt(layer.in_frame),
                    fmt_opt(layer.out_frame)
                ),
            )
        {
            layer.in_frame = ip;
            layer.out_frame = op;
        }
    }

    true
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |x| x.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/schema/validate.rs"]
mod tests;
