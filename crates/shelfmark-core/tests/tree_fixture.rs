use std::path::PathBuf;

use shelfmark_core::builder::DEFAULT_FAVICON_ENDPOINT;
use shelfmark_core::forest::{find_bookmark, find_folder, folder_choices, parent_trail};
use shelfmark_core::models::{ExternalNode, FolderItem};
use shelfmark_core::{MemoryBookmarkStore, ShelfConfig, Shelfmark, StaticPage, TreeBuilder};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("chrome_tree.json")
}

fn load_store() -> MemoryBookmarkStore {
    MemoryBookmarkStore::load_snapshot(fixture_path()).expect("load chrome tree fixture")
}

fn bookmark_titles(folder: &FolderItem) -> Vec<&str> {
    folder
        .children
        .iter()
        .map(|bookmark| bookmark.title.as_str())
        .collect()
}

#[test]
fn fixture_builds_to_full_depth_with_decoded_titles() {
    let root = load_store().snapshot().expect("snapshot");
    let forest = TreeBuilder::default().build(&root);

    let top = forest.iter().map(|f| f.id.as_str()).collect::<Vec<_>>();
    assert_eq!(top, vec!["1", "2"]);

    let acme = find_bookmark(&forest, "11").expect("acme");
    assert_eq!(acme.title, "Acme Docs");
    assert_eq!(acme.visit_count, 3);
    assert_eq!(acme.tags, vec!["docs", "api"]);
    assert_eq!(acme.favicon, format!("{DEFAULT_FAVICON_ENDPOINT}acme.dev"));

    let tokio = find_bookmark(&forest, "10000").expect("deep bookmark");
    assert_eq!(tokio.title, "Tokio tutorial");
    assert_eq!(tokio.parent_id, "1000");
    let trail = parent_trail(&forest, "1000").expect("trail");
    let ids = trail.iter().map(|f| f.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["1", "10", "100", "1000"]);

    let other = find_folder(&forest, "2").expect("other bookmarks");
    assert_eq!(bookmark_titles(other), vec!["Local notes", "Scratch"]);
    assert!(other.children.iter().all(|bookmark| bookmark.favicon.is_empty()));
}

#[test]
fn folder_choices_cover_every_folder_with_fallback_titles() {
    let root = load_store().snapshot().expect("snapshot");
    let choices = folder_choices(&root);
    let summary = choices
        .iter()
        .map(|choice| (choice.title.as_str(), choice.depth))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            ("Root", 0),
            ("Bookmarks bar", 1),
            ("Engineering", 2),
            ("Rust", 3),
            ("Async", 4),
            ("Tools", 3),
            ("Other bookmarks", 1),
        ]
    );
}

#[tokio::test]
async fn resorting_fixture_folder_puts_most_visited_after_subfolders() {
    let engine = Shelfmark::new(load_store(), ShelfConfig::default());
    let outcome = engine.resort_folder("10").await.expect("resort");
    let targets = outcome
        .commands
        .iter()
        .map(|command| command.index)
        .collect::<Vec<_>>();
    assert_eq!(targets, vec![2, 3, 4]);
    assert_eq!(outcome.applied, 3);

    let forest = engine.forest().expect("forest");
    let engineering = find_folder(&forest, "10").expect("engineering");
    assert_eq!(
        bookmark_titles(engineering),
        vec!["CI dashboard", "Code review", "Issue tracker"]
    );
    let subfolder_orders = engineering
        .child_folders
        .iter()
        .map(|folder| folder.order)
        .collect::<Vec<_>>();
    assert_eq!(subfolder_orders, vec![0, 1]);

    let again = engine.resort_folder("10").await.expect("resort again");
    assert!(again.commands.is_empty());
}

#[tokio::test]
async fn search_reaches_nested_bookmarks() {
    let engine = Shelfmark::new(load_store(), ShelfConfig::default());
    engine.reload().await.expect("reload");

    let hits = engine.search("TOKIO").expect("search");
    let ids = hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["10000"]);

    let folders = engine.search_folders("tokio").expect("folders");
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].id, "1");
}

#[tokio::test]
async fn get_bookmarks_returns_the_host_tree() {
    let store = load_store();
    let engine = Shelfmark::new(store.clone(), ShelfConfig::default());
    let response = engine
        .handle_json(r#"{"action":"getBookmarks"}"#, &StaticPage::default())
        .await;
    assert!(response.success);

    let data = response.data.expect("tree");
    let returned =
        serde_json::from_value::<Vec<ExternalNode>>(data).expect("tree deserializes");
    assert_eq!(returned, vec![store.snapshot().expect("snapshot")]);
}

#[test]
fn snapshot_survives_save_and_load() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("bookmarks.json");
    let store = load_store();
    store.save_snapshot(&path).expect("save");
    let reloaded = MemoryBookmarkStore::load_snapshot(&path).expect("load");
    assert_eq!(
        reloaded.snapshot().expect("reloaded"),
        store.snapshot().expect("original")
    );
}
