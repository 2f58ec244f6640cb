//! Tests for TreeBuilder: ingestion, level ordering and child resolution

use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use clustree::domain::{ClusterForest, DomainError, TreeBuilder};

const FORESTS: &str = "tests/resources/forests";

fn record(level: i64, level_id: i64, extra: &str) -> String {
    format!(
        r#"{{"name": "{level}_{level_id}", "level": {level}, "level_id": {level_id}, "weight_dict": {{"total": 1}}, "keywords": [], "label": null, "description": null{extra}}}"#
    )
}

fn build(lines: &[String]) -> Result<ClusterForest, DomainError> {
    TreeBuilder::new().build_from_str(&lines.join("\n"))
}

fn create_record_file(dir: &TempDir, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, lines.join("\n")).expect("write record file");
    path
}

#[fixture]
fn topics() -> ClusterForest {
    TreeBuilder::new()
        .build_from_path(&Path::new(FORESTS).join("topics.jsonl"))
        .expect("build topics forest")
}

// ============================================================
// Scenarios
// ============================================================

#[rstest]
fn given_leaf_and_parent_when_building_then_links_both_directions() {
    let forest = build(&[
        record(0, 0, ""),
        record(1, 0, r#", "children": ["0/0"]"#),
    ])
    .unwrap();

    let leaf_idx = forest.node_at(0, 0).unwrap();
    let parent_idx = forest.node_at(1, 0).unwrap();
    let leaf = forest.get(leaf_idx).unwrap();
    let parent = forest.get(parent_idx).unwrap();

    assert_eq!(leaf.parent(), Some(parent_idx));
    assert_eq!(parent.child_entries().unwrap(), &[("0_0".to_string(), leaf_idx)]);
    assert!(parent.is_root());
    assert!(leaf.is_leaf());
    assert!(!leaf.is_root());
    assert!(!parent.is_leaf());
}

#[rstest]
fn given_child_in_own_level_when_building_then_unresolved_child() {
    let result = TreeBuilder::new().build_from_path(&Path::new(FORESTS).join("self_reference.jsonl"));

    match result {
        Err(DomainError::UnresolvedChild {
            parent,
            level,
            level_id,
        }) => {
            assert_eq!(parent, "1_0");
            assert_eq!((level, level_id), (1, 5));
        }
        other => panic!("expected UnresolvedChild, got {:?}", other),
    }
}

#[rstest]
fn given_two_independent_leaves_when_building_then_single_level_of_roots() {
    let forest = build(&[record(0, 0, ""), record(0, 1, "")]).unwrap();

    assert_eq!(forest.level_count(), 1);
    assert_eq!(forest.levels()[&0].len(), 2);
    assert_eq!(forest.roots().len(), 2);
    assert_eq!(forest.leaves().len(), 2);
    assert_eq!(forest.to_string(), "#levels: 1, #roots: 2");
}

// ============================================================
// Reference errors
// ============================================================

#[rstest]
#[case::higher_level(r#", "children": ["2/0"]"#)]
#[case::unknown_id(r#", "children": ["0/9"]"#)]
#[case::unknown_level(r#", "children": ["-1/0"]"#)]
fn given_dangling_child_when_building_then_unresolved_child(#[case] children: &str) {
    let result = build(&[
        record(0, 0, ""),
        record(1, 0, children),
        record(2, 0, ""),
    ]);

    assert!(
        matches!(result, Err(DomainError::UnresolvedChild { .. })),
        "{:?}",
        result
    );
}

#[rstest]
#[case("0-0")]
#[case("0/x")]
#[case("")]
fn given_malformed_child_token_when_building_then_invalid_token(#[case] token: &str) {
    let result = build(&[
        record(0, 0, ""),
        record(1, 0, &format!(r#", "children": ["{}"]"#, token)),
    ]);

    match result {
        Err(DomainError::InvalidChildToken { parent, token: t }) => {
            assert_eq!(parent, "1_0");
            assert_eq!(t, token);
        }
        other => panic!("expected InvalidChildToken, got {:?}", other),
    }
}

#[rstest]
fn given_child_claimed_twice_when_building_then_multiple_parents() {
    let result = build(&[
        record(0, 0, ""),
        record(1, 0, r#", "children": ["0/0"]"#),
        record(1, 1, r#", "children": ["0/0"]"#),
    ]);

    match result {
        Err(DomainError::MultipleParents {
            child,
            first,
            second,
        }) => {
            assert_eq!(child, "0_0");
            assert_eq!(first, "1_0");
            assert_eq!(second, "1_1");
        }
        other => panic!("expected MultipleParents, got {:?}", other),
    }
}

#[rstest]
fn given_child_listed_twice_by_same_parent_when_building_then_single_entry() {
    let forest = build(&[
        record(0, 0, ""),
        record(1, 0, r#", "children": ["0/0", "0/0"]"#),
    ])
    .unwrap();

    let leaf_idx = forest.node_at(0, 0).unwrap();
    let parent_idx = forest.node_at(1, 0).unwrap();
    let parent = forest.get(parent_idx).unwrap();

    assert_eq!(parent.child_entries().unwrap(), &[("0_0".to_string(), leaf_idx)]);
    assert_eq!(forest.get(leaf_idx).unwrap().parent(), Some(parent_idx));
    assert_eq!(forest.depth(), 2);
}

#[rstest]
fn given_duplicate_level_id_when_building_then_fails() {
    let result = build(&[record(0, 3, ""), record(0, 3, "")]);
    assert!(matches!(result, Err(DomainError::DuplicateNode { .. })));

    let renamed = record(0, 3, "").replace(r#""name": "0_3""#, r#""name": "other""#);
    let result = build(&[record(0, 3, ""), renamed]);
    assert!(matches!(
        result,
        Err(DomainError::DuplicateLevelId {
            level: 0,
            level_id: 3
        })
    ));
}

// ============================================================
// Parse and schema errors
// ============================================================

#[rstest]
fn given_truncated_line_when_building_then_parse_error_with_line_number() {
    let result = TreeBuilder::new().build_from_path(&Path::new(FORESTS).join("malformed.jsonl"));

    match result {
        Err(DomainError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected Parse, got {:?}", other),
    }
}

#[rstest]
#[case::missing_level(r#"{"name": "a", "level_id": 0, "weight_dict": {}, "keywords": [], "label": null, "description": null}"#)]
#[case::missing_description(r#"{"name": "a", "level": 0, "level_id": 0, "weight_dict": {}, "keywords": [], "label": null}"#)]
#[case::wrong_type(r#"{"name": "a", "level": "zero", "level_id": 0, "weight_dict": {}, "keywords": [], "label": null, "description": null}"#)]
#[case::non_integer_sentiment(r#"{"name": "a", "level": 0, "level_id": 0, "weight_dict": {}, "keywords": [], "label": null, "description": null, "sentiment_dict": {"total": {"positive": "many"}}}"#)]
fn given_record_violating_schema_when_building_then_schema_error(#[case] line: &str) {
    let result = TreeBuilder::new().build_from_str(line);

    assert!(
        matches!(result, Err(DomainError::Schema { line: 1, .. })),
        "{:?}",
        result
    );
}

#[rstest]
fn given_incomplete_sentiment_when_building_then_loads_and_scoring_reports_class() {
    let forest = build(&[record(
        0,
        0,
        r#", "sentiment_dict": {"total": {"positive": 2, "neutral": 0, "negative": 0, "mixed": 2}, "last_week": {"positive": 1, "negative": 0}}"#,
    )])
    .unwrap();
    let node = forest.get(forest.node_at(0, 0).unwrap()).unwrap();

    assert_eq!(node.sentiment_score("total").unwrap(), Some(0.5));
    match node.sentiment_score("last_week") {
        Err(DomainError::MissingSentimentClass { name, period, class }) => {
            assert_eq!(name, "0_0");
            assert_eq!(period, "last_week");
            assert_eq!(class, "neutral");
        }
        other => panic!("expected MissingSentimentClass, got {:?}", other),
    }
}

#[rstest]
fn given_nonexistent_file_when_building_then_file_not_found() {
    let result = TreeBuilder::new().build_from_path(Path::new("/nonexistent/forest.jsonl"));
    assert!(matches!(result, Err(DomainError::FileNotFound(_))));
}

// ============================================================
// Ordering and absence markers
// ============================================================

#[rstest]
fn given_parents_listed_before_children_when_building_then_sorted_by_level() {
    let forest = build(&[
        record(2, 0, r#", "children": ["1/0"]"#),
        record(1, 0, r#", "children": ["0/0", "0/1"]"#),
        record(0, 1, ""),
        record(0, 0, ""),
    ])
    .unwrap();

    assert_eq!(forest.level_count(), 3);
    assert_eq!(forest.roots(), vec![forest.node_at(2, 0).unwrap()]);
    assert_eq!(forest.depth(), 3);
}

#[rstest]
fn given_children_declaration_variants_when_building_then_leaf_only_without_collection() {
    let forest = build(&[
        record(1, 0, ""),
        record(1, 1, r#", "children": null"#),
        record(1, 2, r#", "children": []"#),
    ])
    .unwrap();

    let node = |id| forest.get(forest.node_at(1, id).unwrap()).unwrap();
    assert!(node(0).is_leaf());
    assert!(node(1).is_leaf());
    assert!(!node(2).is_leaf());
    assert_eq!(node(2).child_entries().map(<[_]>::len), Some(0));
    assert_eq!(forest.child_nodes(forest.node_at(1, 2).unwrap()).unwrap().len(), 0);
    assert!(forest.child_nodes(forest.node_at(1, 0).unwrap()).is_none());
}

#[rstest]
fn given_empty_input_when_building_then_empty_forest() {
    let forest = TreeBuilder::new().build_from_str("\n\n").unwrap();

    assert!(forest.is_empty());
    assert_eq!(forest.level_count(), 0);
    assert!(forest.roots().is_empty());
    assert_eq!(forest.to_string(), "#levels: 0, #roots: 0");
}

#[rstest]
fn given_record_file_when_building_from_path_then_same_as_from_str() {
    let temp = TempDir::new().unwrap();
    let lines = [record(0, 0, ""), record(1, 7, r#", "children": ["0/0"]"#)];
    let path = create_record_file(&temp, "forest.jsonl", &lines);

    let forest = TreeBuilder::new().build_from_path(&path).unwrap();

    assert_eq!(forest.len(), 2);
    assert_eq!(forest.find("1_7"), forest.node_at(1, 7));
}

// ============================================================
// Fixture forest
// ============================================================

#[rstest]
fn given_topics_fixture_when_building_then_levels_roots_and_leaves(topics: ClusterForest) {
    assert_eq!(topics.len(), 8);
    assert_eq!(
        topics.levels().iter().map(|(l, m)| (*l, m.len())).collect::<Vec<_>>(),
        vec![(0, 5), (1, 2), (2, 1)]
    );

    let roots: Vec<_> = topics
        .roots()
        .into_iter()
        .map(|idx| topics.get(idx).unwrap().name().to_string())
        .collect();
    assert_eq!(roots, vec!["0_4", "2_0"]);

    let leaves: Vec<_> = topics
        .leaves()
        .into_iter()
        .map(|idx| topics.get(idx).unwrap().name().to_string())
        .collect();
    assert_eq!(leaves, vec!["0_0", "0_1", "0_2", "0_3", "0_4"]);
    assert_eq!(topics.depth(), 3);
}
