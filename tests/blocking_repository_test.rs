mod common;

use common::{Item, User};
use mongocrud::blocking::DocumentRepository;
use mongocrud::errors::ErrorKind;

#[test]
fn test_blocking_malformed_endpoint_surfaces_as_store_unavailable() {
    let repo = DocumentRepository::new("not a connection string", common::TEST_DATABASE);
    let result = repo.load_all::<Item>("items");
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::StoreUnavailable);
}

#[test]
fn test_blocking_invalid_pattern() {
    let repo = DocumentRepository::new("mongodb://localhost:27017", common::TEST_DATABASE);
    let result = repo.search_by_pattern::<User>("anything", "name", "[unclosed", true);
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidPattern);
}

#[test]
fn test_blocking_find_with_filter_surfaces_store_failure() {
    let repo = DocumentRepository::new("not a connection string", common::TEST_DATABASE);
    let result = repo.find::<Item>("items", mongocrud::filter::field("name").eq("ghost"));
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::StoreUnavailable);
}

#[test]
fn test_blocking_delete_by_field_default_propagates_store_failure() {
    let repo = DocumentRepository::new("not a connection string", common::TEST_DATABASE);
    let result = repo.delete_by_field("items", "name", "ghost");
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::StoreUnavailable);
}

#[test]
fn test_blocking_delete_by_field_best_effort_swallows_store_failure() {
    let repo = DocumentRepository::with_options(
        "not a connection string",
        common::TEST_DATABASE,
        mongocrud::options::best_effort_delete(),
    );
    assert_eq!(repo.delete_by_field("items", "name", "ghost").unwrap(), 0);
}

#[test]
fn test_blocking_insert_then_load_by_id() {
    let Some(uri) = common::test_uri() else { return };
    let repo = DocumentRepository::new(&uri, common::TEST_DATABASE);
    let coll = common::unique_collection("blk_roundtrip");

    let item = Item::new(1, "widget");
    repo.insert(&coll, item.clone()).unwrap();

    let loaded: Item = repo.load_by_id(&coll, 1i64).unwrap();
    assert_eq!(loaded, item);

    common::drop_collection_blocking(&uri, &coll);
}

#[test]
fn test_blocking_load_one_by_field_variants() {
    let Some(uri) = common::test_uri() else { return };
    let repo = DocumentRepository::new(&uri, common::TEST_DATABASE);
    let coll = common::unique_collection("blk_one_by_field");

    let absent: Option<Item> = repo.find_one_by_field(&coll, "name", "ghost").unwrap();
    assert!(absent.is_none());

    let result = repo.load_one_by_field::<Item, _>(&coll, "name", "ghost");
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::NotFound);

    repo.insert(&coll, Item::new(1, "widget")).unwrap();
    let found: Item = repo.load_one_by_field(&coll, "name", "widget").unwrap();
    assert_eq!(found.id, 1);

    common::drop_collection_blocking(&uri, &coll);
}

#[test]
fn test_blocking_load_all_and_delete_scenario() {
    let Some(uri) = common::test_uri() else { return };
    let repo = DocumentRepository::new(&uri, common::TEST_DATABASE);
    let coll = common::unique_collection("blk_scenario");

    repo.insert(&coll, Item::new(1, "A")).unwrap();
    repo.insert(&coll, Item::new(2, "B")).unwrap();

    let mut everyone: Vec<Item> = repo.load_all(&coll).unwrap();
    everyone.sort_by_key(|i| i.id);
    assert_eq!(everyone, vec![Item::new(1, "A"), Item::new(2, "B")]);

    assert_eq!(repo.delete_by_id(&coll, 1i64).unwrap(), 1);

    let remaining: Vec<Item> = repo.load_all(&coll).unwrap();
    assert_eq!(remaining, vec![Item::new(2, "B")]);

    common::drop_collection_blocking(&uri, &coll);
}

#[test]
fn test_blocking_upsert_replace_or_insert_law() {
    let Some(uri) = common::test_uri() else { return };
    let repo = DocumentRepository::new(&uri, common::TEST_DATABASE);
    let coll = common::unique_collection("blk_upsert");

    repo.upsert(&coll, 7i64, Item::new(7, "first")).unwrap();
    let loaded: Item = repo.load_by_id(&coll, 7i64).unwrap();
    assert_eq!(loaded.name, "first");

    repo.upsert(&coll, 7i64, Item::new(7, "second")).unwrap();
    let loaded: Item = repo.load_by_id(&coll, 7i64).unwrap();
    assert_eq!(loaded.name, "second");

    common::drop_collection_blocking(&uri, &coll);
}

#[test]
fn test_blocking_insert_unique_rejects_duplicate() {
    let Some(uri) = common::test_uri() else { return };
    let repo = DocumentRepository::new(&uri, common::TEST_DATABASE);
    let coll = common::unique_collection("blk_uniq");

    repo.insert_unique(&coll, User::new("A", "same@example.com", 20, 1_000), "email")
        .unwrap();

    let result = repo.insert_unique(&coll, User::new("B", "same@example.com", 21, 2_000), "email");
    let kind = result.unwrap_err().kind().clone();
    assert!(
        kind == ErrorKind::WriteRejected || kind == ErrorKind::ConstraintCreationFailed,
        "unexpected error kind: {}",
        kind
    );

    let matches: Vec<User> = repo.load_by_field(&coll, "email", "same@example.com").unwrap();
    assert_eq!(matches.len(), 1);

    common::drop_collection_blocking(&uri, &coll);
}

#[test]
fn test_blocking_delete_by_field_no_op_when_absent() {
    let Some(uri) = common::test_uri() else { return };
    let repo = DocumentRepository::new(&uri, common::TEST_DATABASE);
    let coll = common::unique_collection("blk_delete_field");

    assert_eq!(repo.delete_by_field(&coll, "name", "ghost").unwrap(), 0);

    repo.insert(&coll, Item::new(1, "target")).unwrap();
    assert_eq!(repo.delete_by_field(&coll, "name", "target").unwrap(), 1);

    common::drop_collection_blocking(&uri, &coll);
}
