//! Integration tests for change graph construction.
//!
//! Each test builds a graph from resources and config the way the CLI
//! does, then checks the resulting wait edges.

use kapply_config::{AdditionalChangeGroup, AdditionalChangeRule, Conf};
use kapply_diffgraph::{ChangeGraph, ChangeOp, PendingChange};
use kapply_resources::{Resource, ResourceMatcher, ResourceMatchers};

fn create(kind: &str, name: &str) -> PendingChange {
    PendingChange::new(ChangeOp::Create, Resource::new("v1", kind, "default", name))
}

fn delete(kind: &str, name: &str) -> PendingChange {
    PendingChange::new(ChangeOp::Delete, Resource::new("v1", kind, "default", name))
}

fn group(name: &str, kind: &str) -> AdditionalChangeGroup {
    AdditionalChangeGroup {
        name: name.to_string(),
        resource_matchers: ResourceMatchers::new(vec![ResourceMatcher::kind(kind)]),
    }
}

fn rule(kind: &str, rules: &[&str], ignore_if_cyclical: bool) -> AdditionalChangeRule {
    AdditionalChangeRule {
        rules: rules.iter().map(|r| r.to_string()).collect(),
        ignore_if_cyclical,
        resource_matchers: ResourceMatchers::new(vec![ResourceMatcher::kind(kind)]),
    }
}

/// `(change name, dependency names)` for every top-level change.
fn shape(graph: &ChangeGraph<PendingChange>) -> Vec<(String, Vec<String>)> {
    graph
        .all()
        .into_iter()
        .map(|change| {
            (
                change.change().resource.name().to_string(),
                graph
                    .waiting_for(change)
                    .map(|dep| dep.change().resource.name().to_string())
                    .collect(),
            )
        })
        .collect()
}

fn chain_groups() -> Vec<AdditionalChangeGroup> {
    vec![group("t/a", "A"), group("t/b", "B"), group("t/c", "C")]
}

fn chain_changes() -> Vec<PendingChange> {
    vec![create("A", "a"), create("B", "b"), create("C", "c")]
}

// =============================================================================
// Edge construction
// =============================================================================

#[test]
fn test_empty_input_builds_empty_graph() {
    let graph =
        ChangeGraph::<PendingChange>::from_conf(Vec::new(), &Conf::defaults().unwrap()).unwrap();
    assert!(graph.is_empty());
    assert_eq!(graph.print_str(), "");
}

#[test]
fn test_no_rules_means_no_edges() {
    let graph = ChangeGraph::new(chain_changes(), &chain_groups(), &[]).unwrap();
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_equivalent_rules_produce_one_edge() {
    let graph = ChangeGraph::new(
        vec![create("A", "a"), create("B", "b")],
        &[group("t/b", "B"), group("t/b2", "B")],
        &[
            rule("A", &["upsert after upserting t/b", "upsert after upserting t/b2"], true),
            rule("A", &["upsert after upserting t/b"], false),
        ],
    )
    .unwrap();

    assert_eq!(
        shape(&graph),
        vec![("a".to_string(), vec!["b".to_string()]), ("b".to_string(), vec![])]
    );
    // One of the equivalent rules was mandatory, so the edge is.
    let all = graph.all();
    assert!(all[0].is_required(all[1].id()));
}

#[test]
fn test_before_and_after_are_symmetric() {
    let after = ChangeGraph::new(
        vec![create("A", "a"), create("B", "b")],
        &[group("t/b", "B")],
        &[rule("A", &["upsert after upserting t/b"], false)],
    )
    .unwrap();
    let before = ChangeGraph::new(
        vec![create("A", "a"), create("B", "b")],
        &[group("t/a", "A")],
        &[rule("B", &["upsert before upserting t/a"], false)],
    )
    .unwrap();

    assert_eq!(shape(&after), shape(&before));
    assert!(before.all()[0].is_required(before.all()[1].id()));
}

#[test]
fn test_delete_rules_relate_deletions() {
    let graph = ChangeGraph::new(
        vec![
            delete("Namespace", "apps"),
            delete("Pod", "web"),
            create("Pod", "api"),
        ],
        &[group("t/pods", "Pod")],
        &[rule("Namespace", &["delete after deleting t/pods"], false)],
    )
    .unwrap();

    assert_eq!(shape(&graph)[0].1, vec!["web".to_string()]);
}

#[test]
fn test_annotation_groups_and_rules() {
    let db = PendingChange::new(
        ChangeOp::Create,
        Resource::new("apps/v1", "StatefulSet", "default", "db")
            .with_annotation("kapply.dev/change-group", "app/db"),
    );
    let web = PendingChange::new(
        ChangeOp::Update,
        Resource::new("apps/v1", "Deployment", "default", "web")
            .with_annotation("kapply.dev/change-rule.db", "upsert after upserting app/db"),
    );

    let graph = ChangeGraph::new(vec![web, db], &[], &[]).unwrap();
    let all = graph.all();
    assert!(all[0].is_waiting_for(all[1].id()));
    assert!(all[0].is_required(all[1].id()));
}

#[test]
fn test_default_config_orders_storage_and_pod_related() {
    let changes = vec![
        PendingChange::new(
            ChangeOp::Create,
            Resource::new("apps/v1", "Deployment", "default", "web"),
        ),
        PendingChange::new(
            ChangeOp::Create,
            Resource::new("v1", "PersistentVolumeClaim", "default", "data"),
        ),
        PendingChange::new(
            ChangeOp::Create,
            Resource::new("v1", "ConfigMap", "default", "settings"),
        ),
        PendingChange::new(
            ChangeOp::Create,
            Resource::new("storage.k8s.io/v1", "StorageClass", "", "fast"),
        ),
    ];

    let graph = ChangeGraph::from_conf(changes, &Conf::defaults().unwrap()).unwrap();
    let shape = shape(&graph);

    assert_eq!(shape[0].0, "web");
    let mut deps = shape[0].1.clone();
    deps.sort();
    assert_eq!(deps, vec!["data", "fast", "settings"]);
    assert_eq!(shape[1].1, vec!["fast".to_string()]);
    assert!(shape[2].1.is_empty());
    assert!(shape[3].1.is_empty());
}

// =============================================================================
// Cycle resolution
// =============================================================================

fn chain_rules(closing_is_optional: bool) -> Vec<AdditionalChangeRule> {
    vec![
        rule("A", &["upsert after upserting t/b"], false),
        rule("B", &["upsert after upserting t/c"], false),
        rule("C", &["upsert after upserting t/a"], closing_is_optional),
    ]
}

#[test]
fn test_optional_closing_edge_is_dropped() {
    let graph = ChangeGraph::new(chain_changes(), &chain_groups(), &chain_rules(true)).unwrap();

    assert_eq!(
        shape(&graph),
        vec![
            ("a".to_string(), vec!["b".to_string()]),
            ("b".to_string(), vec!["c".to_string()]),
            ("c".to_string(), vec![]),
        ]
    );
}

#[test]
fn test_mandatory_closing_edge_fails_with_path() {
    let err = ChangeGraph::new(chain_changes(), &chain_groups(), &chain_rules(false))
        .err()
        .unwrap();

    assert!(err.is_cycle());
    let message = err.to_string();
    assert!(message.contains(
        "[a/a (v1) namespace: default] -> [b/b (v1) namespace: default] -> \
         [c/c (v1) namespace: default] -> [a/a (v1) namespace: default]"
    ));
    assert!(message.ends_with("(found repeated: a/a (v1) namespace: default)"));
}

#[test]
fn test_unresolved_graph_keeps_cycle() {
    let graph =
        ChangeGraph::new_unresolved(chain_changes(), &chain_groups(), &chain_rules(true)).unwrap();
    assert_eq!(graph.edge_count(), 3);
    assert!(graph.print_str().contains("cycle found"));

    let resolved = graph.resolve().unwrap();
    assert_eq!(resolved.edge_count(), 2);
    assert!(!resolved.print_str().contains("cycle found"));
}

// =============================================================================
// Accessors and rendering
// =============================================================================

#[test]
fn test_remove_matching_keeps_dependency_targets() {
    let mut graph =
        ChangeGraph::new(chain_changes(), &chain_groups(), &chain_rules(true)).unwrap();

    graph.remove_matching(|change| change.change().resource.kind() != "A");

    let all = graph.all();
    assert_eq!(all.len(), 1);
    let b: Vec<_> = graph.waiting_for(all[0]).collect();
    assert_eq!(b[0].change().resource.name(), "b");
    let c: Vec<_> = graph.waiting_for(b[0]).collect();
    assert_eq!(c[0].change().resource.name(), "c");
}

#[test]
fn test_all_matching_filters_top_level_only() {
    let graph = ChangeGraph::new(chain_changes(), &chain_groups(), &chain_rules(true)).unwrap();

    let matched = graph.all_matching(|change| change.change().resource.kind() == "A");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].waiting_for().count(), 1);
}

#[test]
fn test_render_depth_three() {
    let graph = ChangeGraph::new(chain_changes(), &chain_groups(), &chain_rules(true)).unwrap();

    let expected = "\
(create) a/a (v1) namespace: default
  (create) b/b (v1) namespace: default
    (create) c/c (v1) namespace: default
(create) b/b (v1) namespace: default
  (create) c/c (v1) namespace: default
(create) c/c (v1) namespace: default
";
    assert_eq!(graph.print_str(), expected);
    assert_eq!(graph.to_string(), expected);
}
