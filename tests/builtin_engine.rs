// tests/builtin_engine.rs

mod common;
use crate::common::builders::{GraphBuilder, SettingsBuilder};
use crate::common::init_tracing;

use std::time::Duration;

use dagview::graph::RawGraph;
use dagview::layout::{BuiltinEngine, ElkEdge, ElkNode, LayoutEngine, LayoutError};
use dagview::pipeline::{ViewSettings, prepare, render_model};
use dagview::types::{Algorithm, Direction, HierarchyHandling};

const PAD: f64 = 12.0;

fn request(graph: &RawGraph, settings: &ViewSettings) -> ElkNode {
    prepare(graph, settings).expect("prepare").request
}

fn layered() -> SettingsBuilder {
    SettingsBuilder::new().algorithm(Algorithm::Layered).no_header()
}

fn child<'a>(node: &'a ElkNode, id: &str) -> &'a ElkNode {
    node.children
        .iter()
        .find(|c| c.id == id)
        .unwrap_or_else(|| panic!("no child {id}"))
}

fn pos(node: &ElkNode) -> (f64, f64) {
    (node.x.expect("x"), node.y.expect("y"))
}

fn chain() -> RawGraph {
    GraphBuilder::new()
        .leaf("A")
        .leaf("B")
        .leaf("C")
        .edge("A", "B")
        .edge("B", "C")
        .build()
}

#[test]
fn layered_chain_flows_right() {
    init_tracing();
    let out = BuiltinEngine::new()
        .compute(request(&chain(), &layered().build()))
        .expect("layout");

    assert_eq!(pos(child(&out, "A")), (PAD, PAD));
    assert_eq!(pos(child(&out, "B")), (PAD + 250.0 + 100.0, PAD));
    assert_eq!(pos(child(&out, "C")), (PAD + 2.0 * 350.0, PAD));
    assert_eq!(pos(&out), (0.0, 0.0));
    assert_eq!(out.width, Some(PAD + 2.0 * 350.0 + 250.0 + PAD));
}

#[test]
fn layered_chain_flows_down() {
    init_tracing();
    let settings = layered().direction(Direction::Down).build();
    let out = BuiltinEngine::new()
        .compute(request(&chain(), &settings))
        .expect("layout");

    assert_eq!(pos(child(&out, "A")), (PAD, PAD));
    assert_eq!(pos(child(&out, "B")), (PAD, PAD + 150.0 + 100.0));
    assert_eq!(pos(child(&out, "C")), (PAD, PAD + 2.0 * 250.0));
}

#[test]
fn cycles_are_laid_out_rather_than_rejected() {
    init_tracing();
    let graph = GraphBuilder::new()
        .leaf("A")
        .leaf("B")
        .edge("A", "B")
        .edge("B", "A")
        .build();

    let out = BuiltinEngine::new()
        .compute(request(&graph, &layered().build()))
        .expect("layout");

    let (ax, _) = pos(child(&out, "A"));
    let (bx, _) = pos(child(&out, "B"));
    assert!(bx > ax, "the back edge B→A is ignored for layering");
}

#[test]
fn disconnected_components_are_packed_across_the_flow() {
    init_tracing();
    let graph = GraphBuilder::new().leaf("a").leaf("b").build();

    let out = BuiltinEngine::new()
        .compute(request(&graph, &layered().build()))
        .expect("layout");

    assert_eq!(pos(child(&out, "a")), (PAD, PAD));
    assert_eq!(pos(child(&out, "b")), (PAD, PAD + 150.0 + 300.0));
}

#[test]
fn groups_are_sized_around_children_and_header() {
    init_tracing();
    let graph = GraphBuilder::new()
        .group("G", |g| g.leaf("a").leaf("b"))
        .build();
    let settings = SettingsBuilder::new().algorithm(Algorithm::Layered).build();

    let out = BuiltinEngine::new()
        .compute(request(&graph, &settings))
        .expect("layout");

    let g = child(&out, "G");
    let header = settings.header_height.expect("header on by default");
    assert_eq!(pos(child(g, "a")), (PAD, PAD + header));
    let (_, by) = pos(child(g, "b"));
    let g_height = g.height.expect("height");
    assert!(by + 150.0 + PAD <= g_height + 1e-9);
    assert_eq!(g.width, Some(PAD + 250.0 + PAD));
    assert_eq!(g.labels[0].x, Some(PAD));
}

#[test]
fn nested_edges_steer_their_groups_unless_separated() {
    init_tracing();
    let graph = GraphBuilder::new()
        .group("G1", |g| g.leaf("a"))
        .group("G2", |g| g.leaf("b"))
        .edge("a", "b")
        .build();

    let joint = BuiltinEngine::new()
        .compute(request(&graph, &layered().build()))
        .expect("layout");
    let (g1x, g1y) = pos(child(&joint, "G1"));
    let (g2x, g2y) = pos(child(&joint, "G2"));
    assert!(g2x > g1x);
    assert_eq!(g1y, g2y);

    let mut separate = layered().build();
    separate.layout.hierarchy = HierarchyHandling::SeparateChildren;
    let split = BuiltinEngine::new()
        .compute(request(&graph, &separate))
        .expect("layout");
    let (g1x, g1y) = pos(child(&split, "G1"));
    let (g2x, g2y) = pos(child(&split, "G2"));
    assert_eq!(g1x, g2x);
    assert!(g2y > g1y);
}

#[test]
fn all_edges_come_back_on_the_root() {
    init_tracing();
    let mut req = request(&chain(), &layered().build());
    let inner = req.edges.pop().expect("edge");
    req.children[0].edges.push(inner);

    let out = BuiltinEngine::new().compute(req).expect("layout");

    assert_eq!(out.edges.len(), 2);
    assert!(out.children.iter().all(|c| c.edges.is_empty()));
}

#[test]
fn force_layout_is_deterministic_and_positions_everything() {
    init_tracing();
    let graph = GraphBuilder::new()
        .group("G", |g| g.leaf("a").leaf("b").leaf("c"))
        .leaf("d")
        .leaf("e")
        .edge("a", "b")
        .edge("b", "c")
        .edge("c", "d")
        .build();
    let settings = SettingsBuilder::new().algorithm(Algorithm::Force).build();

    let first = BuiltinEngine::new()
        .compute(request(&graph, &settings))
        .expect("layout");
    let second = BuiltinEngine::new()
        .compute(request(&graph, &settings))
        .expect("layout");
    assert_eq!(first, second);

    let mut all = Vec::new();
    first.walk_descendants(&mut |n| all.push(n));
    assert_eq!(all.len(), 6);
    for node in all {
        let (x, y) = pos(node);
        assert!(x.is_finite() && y.is_finite());
        assert!(x >= 0.0 && y >= 0.0, "{} at ({x}, {y})", node.id);
    }
}

fn long_chain(len: usize) -> RawGraph {
    let mut builder = GraphBuilder::new();
    for i in 0..len {
        builder = builder.leaf(&format!("n{i}"));
    }
    for i in 1..len {
        builder = builder.edge(&format!("n{}", i - 1), &format!("n{i}"));
    }
    builder.build()
}

#[tokio::test]
async fn slow_layouts_can_be_timed_out() {
    init_tracing();
    let settings = SettingsBuilder::new().algorithm(Algorithm::Force).build();
    let req = request(&long_chain(400), &settings);

    let outcome = tokio::time::timeout(
        Duration::from_millis(1),
        BuiltinEngine::new().layout(req),
    )
    .await;

    assert!(outcome.is_err(), "a 400-node force layout finished within 1ms");
}

#[tokio::test]
async fn configured_timeout_applies_to_a_full_run() {
    init_tracing();
    let graph = long_chain(400);
    let settings = SettingsBuilder::new().algorithm(Algorithm::Force).build();
    let engine = BuiltinEngine::new();
    let limit = Duration::from_millis(1);

    let err = tokio::time::timeout(limit, render_model(&graph, &settings, &engine))
        .await
        .map_err(|_| LayoutError::Timeout(limit))
        .expect_err("layout should not finish in time");

    assert_eq!(err, LayoutError::Timeout(limit));
}

#[test]
fn duplicate_ids_are_rejected() {
    let req = ElkNode {
        id: "root".to_string(),
        children: vec![
            ElkNode {
                id: "a".to_string(),
                ..ElkNode::default()
            },
            ElkNode {
                id: "a".to_string(),
                ..ElkNode::default()
            },
        ],
        ..ElkNode::default()
    };

    let err = BuiltinEngine::new().compute(req).expect_err("duplicate");

    assert!(matches!(err, LayoutError::Rejected(_)));
}

#[test]
fn unknown_edge_endpoints_are_rejected() {
    let mut req = request(&chain(), &layered().build());
    req.edges.push(ElkEdge::new("x", "A", "nowhere"));

    let err = BuiltinEngine::new().compute(req).expect_err("unknown endpoint");

    assert!(matches!(err, LayoutError::Rejected(ref m) if m.contains("nowhere")));
}

#[test]
fn negative_sizes_are_rejected() {
    let mut req = request(&chain(), &layered().build());
    req.children[0].width = Some(-1.0);

    let err = BuiltinEngine::new().compute(req).expect_err("negative width");

    assert!(matches!(err, LayoutError::Rejected(_)));
}

#[tokio::test]
async fn builtin_engine_drives_the_full_pipeline() {
    init_tracing();
    let graph = GraphBuilder::new()
        .group("G", |g| g.leaf("a"))
        .leaf("b")
        .edge("a", "b")
        .build();
    let settings = layered().build();
    let engine = BuiltinEngine::new();

    let model = render_model(&graph, &settings, &engine).await.expect("render");
    let again = render_model(&graph, &settings, &engine).await.expect("render");

    assert_eq!(model, again);
    assert_eq!(model.nodes.len(), 3);
    assert_eq!(model.edges.len(), 1);

    let via_trait = engine
        .layout(request(&graph, &settings))
        .await
        .expect("trait call");
    assert_eq!(via_trait.children.len(), 2);
}
