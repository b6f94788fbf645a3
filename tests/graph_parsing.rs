// tests/graph_parsing.rs

mod common;
use crate::common::builders::rewire_fixture;
use crate::common::init_tracing;

use std::error::Error;

use serde_json::json;

use dagview::errors::DagviewError;
use dagview::graph::{FlatGraph, GraphStore, ROOT_ID, RawGraph, build_hierarchy, group_path};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn nested_document_with_numeric_ids_and_payload() -> TestResult {
    init_tracing();
    let graph = RawGraph::from_json(
        r#"{
            "id": "root",
            "children": [
                {"id": 1, "label": "fetch", "status": "done"},
                {"id": "train", "children": [
                    {"id": 2, "width": 120, "height": 60}
                ]}
            ],
            "edges": [
                {"id": "e1", "sources": [1], "targets": [2]},
                {"source_ids": ["2"], "target_ids": ["1"]}
            ]
        }"#,
    )?;

    assert_eq!(graph.root.id, ROOT_ID);
    let ids: Vec<&str> = graph.node_ids().into_iter().collect();
    assert_eq!(ids, vec!["1", "2", "train"]);

    let fetch = graph.find("1").expect("node 1");
    assert!(!fetch.is_group());
    assert_eq!(fetch.payload.get("label"), Some(&json!("fetch")));
    assert_eq!(fetch.payload.get("status"), Some(&json!("done")));

    let train = graph.find("train").expect("group");
    assert!(train.is_group());
    let sized = &train.children()[0];
    assert_eq!((sized.width, sized.height), (Some(120.0), Some(60.0)));
    assert!(sized.payload.is_empty());

    assert_eq!(graph.edges[0].id, "e1");
    assert_eq!((graph.edges[0].source.as_str(), graph.edges[0].target.as_str()), ("1", "2"));
    assert_eq!(graph.edges[1].id, "2->1");
    Ok(())
}

#[test]
fn missing_root_fields_default_to_an_empty_graph() -> TestResult {
    let graph = RawGraph::from_json("{}")?;

    assert_eq!(graph.root.id, ROOT_ID);
    assert!(graph.top_level().is_empty());
    assert!(graph.edges.is_empty());
    Ok(())
}

#[test]
fn empty_group_is_still_a_group() -> TestResult {
    let graph = RawGraph::from_json(r#"{"children": [{"id": "g", "children": []}]}"#)?;

    assert!(graph.find("g").is_some_and(|g| g.is_group()));
    Ok(())
}

#[test]
fn shape_errors_are_malformed_graphs() {
    init_tracing();
    let cases = [
        r#"{"children": [{"label": "no id"}]}"#,
        r#"{"children": [{"id": true}]}"#,
        r#"{"children": [{"id": "a", "children": 5}]}"#,
        r#"{"children": [{"id": "a"}], "edges": [{"sources": [], "targets": ["a"]}]}"#,
        r#"{"children": [{"id": "a"}], "edges": [{"sources": ["a"]}]}"#,
        r#"{"children": [{"id": "a"}, {"id": "g", "children": [{"id": "a"}]}]}"#,
        r#"{"children": [{"id": ""}]}"#,
    ];

    for text in cases {
        let err = RawGraph::from_json(text).expect_err(text);
        assert!(
            matches!(err, DagviewError::MalformedGraph(_)),
            "{text}: {err:?}"
        );
    }
}

#[test]
fn broken_json_is_a_json_error() {
    let err = RawGraph::from_json(r#"{"children": ["#).expect_err("truncated");

    assert!(matches!(err, DagviewError::JsonError(_)));
}

#[test]
fn from_value_matches_from_json() -> TestResult {
    let value = json!({
        "children": [{"id": "a"}, {"id": "b"}],
        "edges": [{"sources": ["a"], "targets": ["b"]}]
    });

    let from_value = RawGraph::from_value(value.clone())?;
    let from_text = RawGraph::from_json(&value.to_string())?;

    assert_eq!(from_value, from_text);
    Ok(())
}

#[test]
fn group_path_strips_stage_and_instance_counter() {
    let cases: [(&str, &[&str]); 6] = [
        ("Node", &[]),
        ("Node_1", &[]),
        ("grp_Node", &["grp"]),
        ("grp_a_Node_1", &["grp", "a"]),
        ("grp_a_Node", &["grp", "a"]),
        ("grp_Node_12", &["grp"]),
    ];

    for (name, expected) in cases {
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        assert_eq!(group_path(name), expected, "{name}");
    }
}

#[test]
fn flat_listing_is_nested_by_name() -> TestResult {
    init_tracing();
    let flat = FlatGraph::from_json(
        r#"{
            "nodes": [
                {"id": 1, "name": "Fetch", "status": "done"},
                {"id": 2, "name": "prep_Clean_1"},
                {"id": 3, "name": "prep_Clean_2"},
                {"id": 4, "name": "prep_norm_Scale"},
                {"name": "Report"}
            ],
            "edges": [
                {"source": 1, "target": 2},
                {"source": 4, "target": "Report"}
            ]
        }"#,
    )?;

    let graph = build_hierarchy(flat)?;

    let top: Vec<&str> = graph.top_level().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(top, vec!["1", "prep", "Report"]);

    let prep = graph.find("prep").expect("prep group");
    assert_eq!(prep.payload.get("label"), Some(&json!("prep")));
    let inner: Vec<&str> = prep.children().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(inner, vec!["2", "3", "prep_norm"]);

    let norm = graph.find("prep_norm").expect("nested group");
    assert_eq!(norm.payload.get("label"), Some(&json!("norm")));
    assert_eq!(norm.children()[0].id, "4");

    let fetch = graph.find("1").expect("job 1");
    assert_eq!(fetch.payload.get("name"), Some(&json!("Fetch")));
    assert_eq!(fetch.payload.get("status"), Some(&json!("done")));

    let pairs: Vec<(&str, &str)> = graph
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(pairs, vec![("1", "2"), ("4", "Report")]);
    Ok(())
}

#[test]
fn flat_listing_rejects_colliding_ids() -> TestResult {
    let flat = FlatGraph::from_json(
        r#"{"nodes": [{"name": "prep_A"}, {"id": "prep", "name": "B"}]}"#,
    )?;

    let err = build_hierarchy(flat).expect_err("job id collides with group id");

    assert!(matches!(err, DagviewError::MalformedGraph(ref m) if m.contains("prep")));
    Ok(())
}

#[test]
fn store_replaces_and_counts_revisions() {
    let mut store = GraphStore::new();
    assert!(store.is_empty());
    assert!(store.snapshot().is_none());

    let held = {
        assert_eq!(store.replace(rewire_fixture()), 1);
        store.snapshot().expect("stored")
    };
    assert_eq!(store.replace(RawGraph::new(Vec::new(), Vec::new())), 2);

    assert_eq!(store.revision(), 2);
    assert_eq!(held.node_ids().len(), 3, "earlier snapshots stay intact");
    assert!(store.snapshot().is_some_and(|g| g.top_level().is_empty()));
}
