//! Catalog lifecycle tests: create, drop, rename and alter through the manager
//!
//! Every test checks that the id and name indices stay in step after each
//! mutation, successful or not.

#[path = "testutils/mod.rs"]
mod testutils;

use catalogmgr::{CatalogError, CatalogProperties, MutationOutcome};
use testutils::catalog_fixture::{props, CatalogFixture, FIRST_ID};

fn assert_consistent(fixture: &CatalogFixture) {
    fixture
        .manager
        .registry_snapshot()
        .check_consistency()
        .expect("indices out of step");
}

#[test]
fn test_create_drop_recreate_assigns_fresh_id() {
    let fixture = CatalogFixture::new();

    let first = fixture.create_hive("hive1");
    assert_eq!(first, FIRST_ID);
    assert!(fixture
        .manager
        .list_catalogs()
        .iter()
        .any(|c| c.name() == "hive1"));
    assert_consistent(&fixture);

    fixture.manager.drop_catalog("hive1", false).unwrap();
    assert!(fixture
        .manager
        .list_catalogs()
        .iter()
        .all(|c| c.name() != "hive1"));
    assert!(fixture.manager.get_catalog_by_id(first).is_none());
    assert_consistent(&fixture);

    let second = fixture.create_hive("hive1");
    assert!(second > first);
    assert_consistent(&fixture);
}

#[test]
fn test_if_not_exists_changes_nothing() {
    let fixture = CatalogFixture::new();
    fixture.create_hive("hive1");
    let before = fixture.manager.snapshot().unwrap();
    let logged = fixture.edit_log.len();

    let outcome = fixture
        .manager
        .create_catalog("hive1", "es", props(&[("hosts", "es:9200")]), true)
        .unwrap();

    assert_eq!(outcome, MutationOutcome::NoOpAlreadyExists);
    assert!(!outcome.is_applied());
    assert_eq!(fixture.manager.snapshot().unwrap(), before);
    assert_eq!(fixture.edit_log.len(), logged);
}

#[test]
fn test_drop_if_exists_on_missing_name() {
    let fixture = CatalogFixture::new();
    assert_eq!(
        fixture.manager.drop_catalog("ghost", true).unwrap(),
        MutationOutcome::NoOpNotFound
    );
    assert!(fixture.edit_log.is_empty());
}

#[test]
fn test_rename_keeps_identity() {
    let fixture = CatalogFixture::new();
    let id = fixture.create_hive("hive1");
    let original = fixture.manager.get_catalog("hive1").unwrap();

    fixture.manager.rename_catalog("hive1", "warehouse").unwrap();

    assert!(matches!(
        fixture.manager.get_catalog_or_err("hive1"),
        Err(CatalogError::NotFound(_))
    ));
    let renamed = fixture.manager.get_catalog("warehouse").unwrap();
    assert_eq!(renamed.id(), id);
    assert_eq!(renamed.properties(), original.properties());
    assert_eq!(renamed.catalog_type(), "hive");
    assert_eq!(fixture.manager.get_catalog_by_id(id).unwrap().name(), "warehouse");
    assert_consistent(&fixture);
}

#[test]
fn test_rename_onto_existing_name_fails() {
    let fixture = CatalogFixture::new();
    fixture.create_hive("hive1");
    fixture.create_hive("hive2");
    let logged = fixture.edit_log.len();

    assert_eq!(
        fixture.manager.rename_catalog("hive1", "hive2"),
        Err(CatalogError::AlreadyExists("hive2".to_string()))
    );
    assert_eq!(fixture.edit_log.len(), logged);
    assert_eq!(fixture.manager.get_catalog("hive2").unwrap().id(), FIRST_ID + 1);
    assert_consistent(&fixture);
}

#[test]
fn test_changing_type_is_rejected() {
    let fixture = CatalogFixture::new();
    fixture
        .manager
        .create_catalog(
            "hive1",
            "hive",
            props(&[("type", "hive"), ("hive.metastore.uris", "thrift://m:9083")]),
            false,
        )
        .unwrap();
    let before = fixture.manager.snapshot().unwrap();

    let result = fixture
        .manager
        .alter_catalog_properties("hive1", props(&[("type", "es")]));

    assert_eq!(
        result,
        Err(CatalogError::ImmutableFieldViolation {
            name: "hive1".to_string(),
            current: "hive".to_string(),
            requested: "es".to_string(),
        })
    );
    assert_eq!(fixture.manager.snapshot().unwrap(), before);
}

#[test]
fn test_alter_merges_properties() {
    let fixture = CatalogFixture::new();
    fixture.create_hive("hive1");

    fixture
        .manager
        .alter_catalog_properties("hive1", props(&[("type", "hive"), ("hadoop.username", "etl")]))
        .unwrap();
    fixture
        .manager
        .alter_catalog_properties("hive1", props(&[("type", "hive"), ("hadoop.username", "ops")]))
        .unwrap();

    let catalog = fixture.manager.get_catalog("hive1").unwrap();
    let expected: CatalogProperties = props(&[("type", "hive"), ("hadoop.username", "ops")]);
    assert_eq!(catalog.properties(), &expected);
    assert_consistent(&fixture);
}

#[test]
fn test_every_applied_mutation_is_logged_once() {
    let fixture = CatalogFixture::new();
    fixture.create_hive("hive1");
    fixture.manager.rename_catalog("hive1", "hive2").unwrap();
    fixture
        .manager
        .alter_catalog_properties("hive2", props(&[("type", "hive"), ("k", "v")]))
        .unwrap();
    fixture.manager.drop_catalog("hive2", false).unwrap();

    let ops: Vec<String> = fixture
        .edit_log
        .entries()
        .iter()
        .map(|e| e.op.to_string())
        .collect();
    assert_eq!(ops, vec!["CREATE", "ALTER_NAME", "ALTER_PROPS", "DROP"]);
    let sequences: Vec<u64> = fixture.edit_log.entries().iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
}
