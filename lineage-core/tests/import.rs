use lineage_core::import::{parse_documents, read_documents};
use lineage_core::{group_lineages, ImportError};

#[test]
fn parses_bare_array_with_camel_case_fields() {
    let json = r#"[
        {"id": "3", "lineageId": "L1", "previousId": "2", "isCurrentVersion": true,
         "name": "Policy v3", "checksum": "abc", "lastCollectedAt": 1700000000},
        {"id": "1", "lineageId": "L1", "previousId": null, "isCurrentVersion": false},
        {"id": "2", "lineageId": "L1", "previousId": "1"}
    ]"#;

    let docs = parse_documents(json).unwrap();

    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0].previous_id.as_deref(), Some("2"));
    assert_eq!(docs[0].name.as_deref(), Some("Policy v3"));
    assert_eq!(docs[0].last_collected_at, Some(1_700_000_000));
    assert_eq!(docs[1].previous_id, None);
    assert!(!docs[2].is_current_version, "missing flag defaults to false");

    let groups = group_lineages(&docs);
    let order: Vec<&str> = groups[0].documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(order, ["1", "2", "3"]);
}

#[test]
fn parses_paged_envelope() {
    let json = r#"{
        "total": 2,
        "items": [
            {"id": "a", "lineageId": "A", "isCurrentVersion": true},
            {"id": "b", "lineageId": "B", "isCurrentVersion": true}
        ]
    }"#;

    let docs = parse_documents(json).unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1].lineage_id, "B");
}

#[test]
fn rejects_empty_identifiers() {
    let err = parse_documents(r#"[{"id": "", "lineageId": "L"}]"#).unwrap_err();
    assert!(matches!(err, ImportError::Invalid { index: 0, .. }));

    let err = parse_documents(
        r#"[{"id": "ok", "lineageId": "L"}, {"id": "x", "lineageId": "  "}]"#,
    )
    .unwrap_err();
    assert!(matches!(err, ImportError::Invalid { index: 1, .. }));
}

#[test]
fn rejects_malformed_json() {
    assert!(matches!(
        parse_documents("{\"items\": 3}"),
        Err(ImportError::Json(_))
    ));
    assert!(matches!(
        parse_documents(r#"[{"lineageId": "L"}]"#),
        Err(ImportError::Json(_))
    ));
}

#[test]
fn reads_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("docs.json");
    std::fs::write(&path, r#"[{"id": "1", "lineageId": "L", "isCurrentVersion": true}]"#)
        .unwrap();

    let docs = read_documents(&path).unwrap();
    assert_eq!(docs.len(), 1);

    let missing = read_documents(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(missing, ImportError::Io { .. }));
}
