use super::*;
use serde_json::{Value, json};

fn base() -> Value {
    json!({
        "v": "5.5.2",
        "fr": 60,
        "ip": 0,
        "op": 180,
        "w": 512,
        "h": 512,
        "assets": [
            {"id": "comp_0", "layers": [{"ty": 4, "ind": 1, "ks": {}}]}
        ],
        "layers": [
            {"ty": 3, "ind": 1, "ip": 0, "op": 180, "ks": {}},
            {"ty": 0, "ind": 2, "parent": 1, "refId": "comp_0", "ip": 0, "op": 180, "ks": {}}
        ]
    })
}

fn graph(v: Value) -> AnimationGraph {
    serde_json::from_value(v).unwrap()
}

fn with(mut v: Value, pointer: &str, value: Value) -> Value {
    *v.pointer_mut(pointer).unwrap() = value;
    v
}

#[test]
fn well_formed_graph_passes_untouched() {
    let g = graph(base());
    let r = validate(g.clone());
    assert!(r.valid);
    assert!(r.problems.is_empty());
    assert_eq!(r.graph, g);
}

#[test]
fn zero_frame_rate_is_fatal_and_graph_is_untouched() {
    let r = validate(graph(with(base(), "/fr", json!(0))));
    assert!(!r.valid);
    assert_eq!(r.graph.frame_rate, 0.0);

    let errs = r.into_result().unwrap_err();
    assert_eq!(errs.problems.len(), 1);
    assert_eq!(errs.problems[0].path.to_string(), "fr");
    assert_eq!(errs.problems[0].severity, Severity::Fatal);
}

#[test]
fn sanitize_substitutes_default_frame_rate() {
    let (g, problems) = sanitize_with_report(graph(with(base(), "/fr", json!(-24))));
    assert_eq!(g.frame_rate, DEFAULT_FRAME_RATE);
    assert_eq!(problems.len(), 1);
}

#[test]
fn inverted_timeline_is_fatal_then_swapped() {
    let v = with(with(base(), "/ip", json!(90)), "/op", json!(30));
    let r = validate(graph(v.clone()));
    assert!(!r.valid);
    assert_eq!(r.fatal_problems().count(), 1);

    let g = sanitize(graph(v));
    assert_eq!((g.in_frame, g.out_frame), (30.0, 90.0));
}

#[test]
fn non_positive_canvas_is_fatal() {
    let v = with(base(), "/w", json!(0));
    assert!(!validate(graph(v.clone())).valid);
    assert_eq!(sanitize(graph(v)).width, DEFAULT_CANVAS_SIZE);
}

#[test]
fn fractional_canvas_is_rounded() {
    let r = validate(graph(with(base(), "/h", json!(511.6))));
    assert!(r.valid);
    assert_eq!(r.graph.height, 512.0);
    assert_eq!(r.problems[0].severity, Severity::Recoverable);
}

#[test]
fn dangling_reference_is_fatal_and_sanitize_drops_the_layer() {
    let v = with(base(), "/layers/1/refId", json!("comp_9"));
    let r = validate(graph(v.clone()));
    assert!(!r.valid);
    assert_eq!(
        r.problems[0].to_string(),
        "$.layers[1].refId: layer references missing asset \"comp_9\""
    );

    let g = sanitize(graph(v));
    assert_eq!(g.layers.len(), 1);
    assert_eq!(g.layers[0].index, Some(1));
}

#[test]
fn dangling_reference_inside_precomp_is_reported_with_its_path() {
    let v = with(base(), "/assets/0/layers/0/refId", json!("ghost"));
    let r = validate(graph(v));
    assert_eq!(
        r.problems[0].path.to_string(),
        "assets[0].layers[0].refId"
    );
}

#[test]
fn duplicate_asset_ids_keep_the_first() {
    let mut v = base();
    v["assets"]
        .as_array_mut()
        .unwrap()
        .push(json!({"id": "comp_0", "layers": []}));

    assert!(!validate(graph(v.clone())).valid);

    let g = sanitize(graph(v));
    assert_eq!(g.assets.len(), 1);
    assert_eq!(g.assets[0].layers.as_ref().map(Vec::len), Some(1));
}

#[test]
fn precomp_cycles_are_fatal_and_broken_by_sanitize() {
    let mut v = base();
    v["assets"] = json!([
        {"id": "a", "layers": [{"ty": 0, "ind": 1, "refId": "b"}]},
        {"id": "b", "layers": [{"ty": 0, "ind": 1, "refId": "a"}]}
    ]);
    v["layers"][1]["refId"] = json!("a");

    let r = validate(graph(v.clone()));
    assert!(!r.valid);
    assert_eq!(r.fatal_problems().count(), 2);

    let g = sanitize(graph(v));
    assert!(g.assets.iter().all(|a| a.layers.as_ref().is_some_and(Vec::is_empty)));
    assert_eq!(g.layers.len(), 2);
}

#[test]
fn self_referencing_precomp_is_a_cycle() {
    let mut v = base();
    v["assets"][0]["layers"][0]["refId"] = json!("comp_0");
    let r = validate(graph(v));
    assert_eq!(r.fatal_problems().count(), 1);
}

#[test]
fn layer_bounds_are_clamped_to_the_composition() {
    let r = validate(graph(with(base(), "/layers/0/op", json!(999))));
    assert!(r.valid);
    assert_eq!(r.graph.layers[0].out_frame, Some(180.0));
    assert_eq!(r.problems.len(), 1);
    assert!(!r.problems[0].is_fatal());
}

#[test]
fn inverted_layer_bounds_are_swapped() {
    let v = with(with(base(), "/layers/0/ip", json!(120)), "/layers/0/op", json!(60));
    let r = validate(graph(v));
    assert!(r.valid);
    assert_eq!(r.graph.layers[0].in_frame, Some(60.0));
    assert_eq!(r.graph.layers[0].out_frame, Some(120.0));
}

#[test]
fn missing_parent_link_is_removed() {
    let r = validate(graph(with(base(), "/layers/1/parent", json!(42))));
    assert!(r.valid);
    assert_eq!(r.graph.layers[1].parent, None);
    assert_eq!(r.problems[0].path.to_string(), "layers[1].parent");
}

#[test]
fn parent_dropped_by_sanitize_is_unlinked() {
    let mut v = base();
    v["layers"][0]["refId"] = json!("ghost");
    let (g, problems) = sanitize_with_report(graph(v));
    assert_eq!(g.layers.len(), 1);
    assert_eq!(g.layers[0].parent, None);
    assert_eq!(problems.len(), 2);
}

#[test]
fn fatal_problems_win_over_repairs() {
    let v = with(with(base(), "/fr", json!(0)), "/layers/0/op", json!(999));
    let r = validate(graph(v));
    assert!(!r.valid);
    assert_eq!(r.problems.len(), 2);
    assert_eq!(r.fatal_problems().count(), 1);
    // Nothing is repaired when the graph is rejected.
    assert_eq!(r.graph.layers[0].out_frame, Some(999.0));
}

#[test]
fn sanitized_graphs_validate_cleanly() {
    let mut v = with(with(base(), "/fr", json!(0)), "/w", json!(-1));
    v["layers"][1]["refId"] = json!("ghost");
    v["layers"][0]["op"] = json!(500);

    let g = sanitize(graph(v));
    let r = validate(g);
    assert!(r.valid);
    assert!(r.problems.is_empty());
}

#[test]
fn root_problem_display() {
    let p = ValidationProblem {
        severity: Severity::Fatal,
        path: PropertyPath::root(),
        message: "empty".to_string(),
    };
    assert_eq!(p.to_string(), "$: empty");
}
