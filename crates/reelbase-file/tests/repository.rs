//! Catalog repository behavior against the file document store.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use reelbase_core::error::{Error, ValidationError};
use reelbase_core::{
    CatalogRecord, CatalogRepository, Kind, ListFilter, ManualClock, Pagination, RecordInput,
    RecordPatch,
};
use reelbase_file::{FileAdapter, FileAdapterConfig};

fn open(dir: &TempDir) -> CatalogRepository<FileAdapter> {
    CatalogRepository::new(FileAdapter::new(FileAdapterConfig::new(dir.path())))
}

#[tokio::test]
async fn test_dune_scenario() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    let dune = repo
        .create(RecordInput::new("Dune").with_kind("movie").with_year(2021))
        .await
        .unwrap();
    assert_eq!(dune.version, 1);
    assert_eq!(repo.get(&dune.id).await.unwrap(), dune);

    let updated = repo
        .update(&dune.id, 1, RecordPatch::default().with_year(2022))
        .await
        .unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.year, Some(2022));

    let err = repo
        .update(&dune.id, 1, RecordPatch::default().with_year(2023))
        .await
        .unwrap_err();
    assert!(err.is_version_conflict());
    assert_eq!(repo.get(&dune.id).await.unwrap(), updated);

    repo.delete(&dune.id).await.unwrap();
    assert!(repo.get(&dune.id).await.unwrap_err().is_not_found());
    assert!(repo.delete(&dune.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_validation_errors_touch_nothing_on_disk() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    let err = repo
        .create(RecordInput::new("X").with_year(1500))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::InvalidYear { .. })
    ));
    assert!(!dir.path().join("records").exists());
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let created = open(&dir)
        .create(RecordInput::new("Andor").with_kind("series").with_year(2022))
        .await
        .unwrap();

    let reopened = open(&dir);
    let fetched = reopened.get(&created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.kind, Kind::Series);
}

#[tokio::test]
async fn test_list_newest_first_with_filters() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    let repo = open(&dir).with_clock(Arc::new(clock.clone()));

    for (title, kind, year) in [
        ("Blade Runner", "movie", 1982),
        ("Blade Runner 2049", "movie", 2017),
        ("Westworld", "series", 2016),
    ] {
        repo.create(RecordInput::new(title).with_kind(kind).with_year(year))
            .await
            .unwrap();
        clock.advance(Duration::seconds(10));
    }

    let page = repo
        .list(ListFilter::default(), Pagination::default())
        .await
        .unwrap();
    let titles: Vec<_> = page.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Westworld", "Blade Runner 2049", "Blade Runner"]);

    let page = repo
        .list(
            ListFilter::default().title_contains("blade").years(Some(2000), None),
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].title, "Blade Runner 2049");

    let first = repo
        .list(ListFilter::default(), Pagination::first(2))
        .await
        .unwrap();
    let rest = repo
        .list(
            ListFilter::default(),
            Pagination::after(first.next_cursor.unwrap(), 2),
        )
        .await
        .unwrap();
    assert_eq!(rest.records.len(), 1);
    assert_eq!(rest.records[0].title, "Blade Runner");
    assert!(rest.next_cursor.is_none());
}

#[tokio::test]
async fn test_list_on_fresh_directory_is_empty() {
    let dir = TempDir::new().unwrap();
    let page = open(&dir)
        .list(ListFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert!(page.records.is_empty());
    assert!(page.next_cursor.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_competing_adapters_on_one_directory_have_one_winner() {
    let dir = TempDir::new().unwrap();
    let rec = open(&dir)
        .create(RecordInput::new("Shared"))
        .await
        .unwrap();

    // Separate adapters stand in for separate processes sharing the directory.
    let mut handles = Vec::new();
    for contender in 0..6 {
        let repo = open(&dir);
        let id = rec.id.clone();
        handles.push(tokio::spawn(async move {
            repo.update(
                &id,
                1,
                RecordPatch::default().with_description(format!("writer {}", contender)),
            )
            .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(record) => {
                assert_eq!(record.version, 2);
                winners += 1;
            }
            Err(e) => assert!(e.is_version_conflict(), "unexpected error: {}", e),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(open(&dir).get(&rec.id).await.unwrap().version, 2);
}

fn temp_files(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path().join("records"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

/// Wait for a detached write to land, or give up and return what is stored.
async fn settled(repo: &CatalogRepository<FileAdapter>, original: &CatalogRecord) -> CatalogRecord {
    for _ in 0..100 {
        let stored = repo.get(&original.id).await.unwrap();
        if stored.version != original.version {
            return stored;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    repo.get(&original.id).await.unwrap()
}

#[tokio::test]
async fn test_abandoned_update_applies_fully_or_not_at_all() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let original = repo
        .create(RecordInput::new("Arrival").with_year(2016))
        .await
        .unwrap();

    let patch = RecordPatch::default()
        .with_description("Heptapods")
        .with_year(2017);
    let abandoned =
        tokio::time::timeout(std::time::Duration::ZERO, repo.update(&original.id, 1, patch)).await;
    assert!(abandoned.is_err(), "update finished before it could be dropped");

    let stored = settled(&repo, &original).await;
    match stored.version {
        1 => assert_eq!(stored, original),
        2 => {
            assert_eq!(stored.description.as_deref(), Some("Heptapods"));
            assert_eq!(stored.year, Some(2017));
            assert_eq!(stored.title, original.title);
            assert_eq!(stored.created_at, original.created_at);
        }
        other => panic!("unexpected version {}", other),
    }
    assert!(temp_files(&dir).is_empty());

    let next = repo
        .update(&original.id, stored.version, RecordPatch::default().with_title("Story"))
        .await
        .unwrap();
    assert_eq!(next.version, stored.version + 1);
}

#[tokio::test]
async fn test_abandoned_insert_leaves_no_partial_document() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    let abandoned = tokio::time::timeout(
        std::time::Duration::ZERO,
        repo.create(RecordInput::new("Sicario").with_year(2015)),
    )
    .await;
    assert!(abandoned.is_err(), "create finished before it could be dropped");

    let mut page = repo
        .list(ListFilter::default(), Pagination::default())
        .await
        .unwrap();
    for _ in 0..100 {
        if !page.records.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        page = repo
            .list(ListFilter::default(), Pagination::default())
            .await
            .unwrap();
    }

    match page.records.as_slice() {
        [] => {}
        [record] => {
            assert_eq!(record.title, "Sicario");
            assert_eq!(record.year, Some(2015));
            assert_eq!(record.version, 1);
        }
        more => panic!("unexpected records: {:?}", more),
    }
    if dir.path().join("records").exists() {
        assert!(temp_files(&dir).is_empty());
    }
}

