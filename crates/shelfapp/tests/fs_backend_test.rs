use shelfapp::api::ShelfApi;
use shelfapp::commands::rules::{ConditionDraft, RuleDraft};
use shelfapp::config::ShelfConfig;
use shelfapp::model::CategoryDraft;
use shelfapp::store::fs_backend::FsBackend;
use shelfapp::store::StorageBackend;
use std::fs;
use tempfile::TempDir;

fn open(dir: &TempDir) -> ShelfApi<FsBackend> {
    ShelfApi::open(FsBackend::new(dir.path().join("data")), ShelfConfig::default()).unwrap()
}

#[test]
fn test_missing_directory_is_an_empty_catalog() {
    let dir = TempDir::new().unwrap();
    let api = open(&dir);
    assert!(api.list_categories(true).is_empty());
    assert!(api.list_rules().is_empty());
    assert!(!dir.path().join("data").exists());
}

#[test]
fn test_everything_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let (dairy_id, rule_id) = {
        let mut api = open(&dir);
        let food = api.create_category(CategoryDraft::new("Lebensmittel")).unwrap();
        let dairy = api
            .create_category(CategoryDraft::new("Milchprodukte").with_parent(&food.id))
            .unwrap();
        let rule = api
            .add_rule(RuleDraft::new("milch", ConditionDraft::new("contains", "milch")))
            .unwrap();
        api.assign_rule(&dairy.id, &rule.id).unwrap();
        api.add_purchase("Bio-Milch 1L", Some(&dairy.id)).unwrap();
        (dairy.id, rule.id)
    };

    let api = open(&dir);
    let dairy = api.get_category(&dairy_id).unwrap();
    assert_eq!(dairy.level, 1);
    assert_eq!(dairy.metadata.rules, vec![rule_id]);
    assert_eq!(api.history().len(), 1);
    assert_eq!(
        api.find_matching_category("H-Milch").map(|c| c.id.clone()),
        Some(dairy_id)
    );
}

#[test]
fn test_one_file_per_document() {
    let dir = TempDir::new().unwrap();
    let mut api = open(&dir);
    api.create_category(CategoryDraft::new("Lebensmittel")).unwrap();
    api.add_purchase("Brot", None).unwrap();

    let data = dir.path().join("data");
    assert!(data.join("categories.json").exists());
    assert!(data.join("shopping_history.json").exists());
    assert!(!data.join("category_rules.json").exists());

    // No temp files left behind by the atomic writes.
    let leftovers: Vec<_> = fs::read_dir(&data)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_reload_picks_up_external_changes() {
    let dir = TempDir::new().unwrap();
    let mut api = open(&dir);
    let cat = api.create_category(CategoryDraft::new("Lebensmittel")).unwrap();

    let other = FsBackend::new(dir.path().join("data"));
    other.set_item("categories", "{}").unwrap();

    api.reload_categories().unwrap();
    assert!(api.get_category(&cat.id).is_err());
}

#[test]
fn test_corrupt_document_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("categories.json"), "{ not json").unwrap();

    assert!(ShelfApi::open(FsBackend::new(&data), ShelfConfig::default()).is_err());
}
