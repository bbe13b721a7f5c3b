//! Behaviour of the lineage grouper on well-formed and damaged input.

use lineage_core::{
    group_lineages, try_group_lineages, LineageDefect, LineageDocument, LineageError,
    LineageGroup,
};

fn doc(id: &str, lineage: &str, previous: Option<&str>, current: bool) -> LineageDocument {
    LineageDocument::new(id, lineage, previous, current)
}

fn ids(group: &LineageGroup) -> Vec<&str> {
    group.documents.iter().map(|d| d.id.as_str()).collect()
}

fn unplaced_ids(group: &LineageGroup) -> Vec<&str> {
    group.unplaced.iter().map(|d| d.id.as_str()).collect()
}

#[test]
fn orders_single_chain_oldest_to_current() {
    let input = vec![
        doc("3", "L1", Some("2"), true),
        doc("1", "L1", None, false),
        doc("2", "L1", Some("1"), false),
    ];

    let groups = group_lineages(&input);

    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.lineage_id, "L1");
    assert_eq!(ids(group), ["1", "2", "3"]);
    assert!(group.is_complete());
    assert!(group.unplaced.is_empty());
    assert!(!group.collapsed);
    assert_eq!(group.root().and_then(|d| d.previous_id.as_deref()), None);
    assert!(group.current().is_some_and(|d| d.is_current_version));
    assert_eq!(group.predecessor_of(2).map(|d| d.id.as_str()), Some("2"));
    assert_eq!(group.predecessor_of(0), None);
}

#[test]
fn groups_several_lineages() {
    let input = vec![
        doc("a2", "A", Some("a1"), true),
        doc("b1", "B", None, true),
        doc("a1", "A", None, false),
    ];

    let groups = group_lineages(&input);

    assert_eq!(groups.len(), 2);
    let a = groups.iter().find(|g| g.lineage_id == "A").unwrap();
    let b = groups.iter().find(|g| g.lineage_id == "B").unwrap();
    assert_eq!(ids(a), ["a1", "a2"]);
    assert_eq!(ids(b), ["b1"]);
    assert!(a.is_complete() && b.is_complete());
}

#[test]
fn groups_follow_first_appearance_order() {
    let input = vec![
        doc("z", "Z", None, true),
        doc("m", "M", None, true),
        doc("a", "A", None, true),
    ];

    let order: Vec<String> = group_lineages(&input)
        .into_iter()
        .map(|g| g.lineage_id)
        .collect();

    assert_eq!(order, ["Z", "M", "A"]);
}

#[test]
fn well_formed_input_is_partitioned_exactly() {
    let mut input = Vec::new();
    for lineage in ["p", "q", "r"] {
        for n in 0..5 {
            let id = format!("{lineage}{n}");
            let previous = (n > 0).then(|| format!("{lineage}{}", n - 1));
            input.push(doc(&id, lineage, previous.as_deref(), n == 4));
        }
    }
    input.reverse();

    let groups = group_lineages(&input);

    let mut seen: Vec<&str> = groups.iter().flat_map(ids).collect();
    let mut expected: Vec<&str> = input.iter().map(|d| d.id.as_str()).collect();
    seen.sort_unstable();
    expected.sort_unstable();
    assert_eq!(seen, expected);
    for group in &groups {
        assert!(group.is_complete());
        assert!(group.root().is_some_and(|d| d.previous_id.is_none()));
        assert!(group.current().is_some_and(|d| d.is_current_version));
    }
}

#[test]
fn grouping_is_idempotent_and_leaves_input_untouched() {
    let input = vec![
        doc("2", "L", Some("1"), true),
        doc("1", "L", None, false),
        doc("x", "X", Some("gone"), true),
    ];
    let snapshot = input.clone();

    let first = group_lineages(&input);
    let second = group_lineages(&input);

    assert_eq!(first, second);
    assert_eq!(input, snapshot);
}

#[test]
fn first_current_flag_in_input_order_wins() {
    let input = vec![
        doc("1", "L", None, false),
        doc("2", "L", Some("1"), true),
        doc("3", "L", Some("1"), true),
    ];

    for _ in 0..3 {
        let groups = group_lineages(&input);
        let group = &groups[0];
        assert_eq!(ids(group), ["1", "2"]);
        assert_eq!(unplaced_ids(group), ["3"]);
        assert_eq!(group.defect, Some(LineageDefect::Detached { count: 1 }));
    }

    let swapped = vec![input[0].clone(), input[2].clone(), input[1].clone()];
    assert_eq!(ids(&group_lineages(&swapped)[0]), ["1", "3"]);
}

#[test]
fn dangling_root_reference_keeps_the_whole_chain() {
    let input = vec![
        doc("C", "L", Some("B"), true),
        doc("B", "L", Some("A"), false),
        doc("A", "L", Some("unknown-id"), false),
    ];

    let groups = group_lineages(&input);
    let group = &groups[0];

    assert_eq!(ids(group), ["A", "B", "C"]);
    assert!(group.unplaced.is_empty());
    assert_eq!(
        group.defect,
        Some(LineageDefect::DanglingReference {
            document_id: "A".to_owned(),
            previous_id: "unknown-id".to_owned(),
        })
    );
    assert!(!group.is_complete());
}

#[test]
fn mid_chain_gap_emits_partial_tail() {
    let input = vec![
        doc("1", "L", None, false),
        doc("2", "L", Some("1"), false),
        doc("4", "L", Some("3"), true),
    ];

    let groups = group_lineages(&input);
    let group = &groups[0];

    assert_eq!(ids(group), ["4"]);
    assert_eq!(unplaced_ids(group), ["1", "2"]);
    assert_eq!(
        group.defect,
        Some(LineageDefect::DanglingReference {
            document_id: "4".to_owned(),
            previous_id: "3".to_owned(),
        })
    );
}

#[test]
fn single_truncated_document_differs_from_single_complete_document() {
    let complete_groups = group_lineages(&[doc("a", "L", None, true)]);
    let complete = &complete_groups[0];
    let truncated_groups = group_lineages(&[doc("a", "L", Some("z"), true)]);
    let truncated = &truncated_groups[0];

    assert_eq!(complete.len(), 1);
    assert_eq!(truncated.len(), 1);
    assert!(complete.is_complete());
    assert!(!truncated.is_complete());
}

#[test]
fn missing_current_version_keeps_documents_unplaced() {
    let input = vec![
        doc("1", "L", None, false),
        doc("2", "L", Some("1"), false),
        doc("k", "K", None, true),
    ];

    let groups = group_lineages(&input);

    assert_eq!(groups.len(), 2, "the damaged lineage is not dropped");
    let l = &groups[0];
    assert!(l.is_empty());
    assert_eq!(unplaced_ids(l), ["1", "2"]);
    assert_eq!(l.defect, Some(LineageDefect::MissingCurrentVersion));
    assert!(groups[1].is_complete());
}

#[test]
fn cycles_terminate_as_dangling_references() {
    let input = vec![
        doc("A", "L", Some("B"), true),
        doc("B", "L", Some("A"), false),
    ];

    let groups = group_lineages(&input);
    let group = &groups[0];

    assert_eq!(ids(group), ["B", "A"]);
    assert_eq!(
        group.defect,
        Some(LineageDefect::DanglingReference {
            document_id: "B".to_owned(),
            previous_id: "A".to_owned(),
        })
    );
}

#[test]
fn self_reference_terminates() {
    let groups = group_lineages(&[doc("A", "L", Some("A"), true)]);
    let group = &groups[0];

    assert_eq!(ids(group), ["A"]);
    assert!(matches!(
        group.defect,
        Some(LineageDefect::DanglingReference { .. })
    ));
}

#[test]
fn duplicate_ids_leave_later_copy_unplaced() {
    let input = vec![
        doc("2", "L", Some("1"), true),
        doc("1", "L", None, false),
        doc("1", "L", None, false),
    ];

    let groups = group_lineages(&input);
    let group = &groups[0];

    assert_eq!(ids(group), ["1", "2"]);
    assert_eq!(group.unplaced.len(), 1);
    assert_eq!(group.defect, Some(LineageDefect::Detached { count: 1 }));
}

#[test]
fn chains_and_unplaced_always_cover_the_input() {
    let input = vec![
        doc("1", "L", None, false),
        doc("2", "L", Some("1"), true),
        doc("3", "L", Some("1"), true),
        doc("9", "L", Some("8"), false),
        doc("n1", "N", None, false),
        doc("c", "C", Some("c"), true),
    ];

    let groups = group_lineages(&input);

    let total: usize = groups.iter().map(|g| g.documents.len() + g.unplaced.len()).sum();
    assert_eq!(total, input.len());
}

#[test]
fn empty_input_yields_no_groups() {
    assert!(group_lineages(&[]).is_empty());
    assert_eq!(try_group_lineages(&[]), Ok(Vec::new()));
}

#[test]
fn strict_grouping_reports_each_defect() {
    let ok = vec![doc("2", "L", Some("1"), true), doc("1", "L", None, false)];
    assert_eq!(try_group_lineages(&ok).unwrap().len(), 1);

    let missing = vec![doc("1", "L", None, false)];
    assert_eq!(
        try_group_lineages(&missing),
        Err(LineageError::MissingCurrentVersion {
            lineage_id: "L".to_owned()
        })
    );

    let dangling = vec![doc("2", "L", Some("unknown-id"), true)];
    assert_eq!(
        try_group_lineages(&dangling),
        Err(LineageError::DanglingReference {
            lineage_id: "L".to_owned(),
            document_id: "2".to_owned(),
            previous_id: "unknown-id".to_owned(),
        })
    );

    let detached = vec![doc("1", "L", None, true), doc("x", "L", None, false)];
    let err = try_group_lineages(&detached).unwrap_err();
    assert_eq!(err.lineage_id(), "L");
    assert!(matches!(err, LineageError::Detached { count: 1, .. }));
}

#[test]
fn strict_grouping_fails_on_first_damaged_group() {
    let input = vec![
        doc("ok", "GOOD", None, true),
        doc("m", "FIRST", None, false),
        doc("d", "SECOND", Some("nope"), true),
    ];

    let err = try_group_lineages(&input).unwrap_err();

    assert_eq!(err.lineage_id(), "FIRST");
    assert!(err.to_string().contains("FIRST"));
}
