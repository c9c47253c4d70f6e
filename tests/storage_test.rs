//! Storage layer tests against a real SQLite file in a temp directory.

use taskd::storage::{Storage, TaskPatch};
use tempfile::TempDir;

async fn open_storage(dir: &TempDir) -> Storage {
    Storage::new(dir.path(), 5).await.unwrap()
}

#[tokio::test]
async fn schema_init_is_idempotent_and_data_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let storage = open_storage(&dir).await;
    storage.create_task("persisted", None, "pendente").await.unwrap();
    drop(storage);

    // Opening again must not error or clobber existing rows.
    let storage = open_storage(&dir).await;
    let tasks = storage.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].titulo, "persisted");
}

#[tokio::test]
async fn create_assigns_id_and_timestamp() {
    let dir = TempDir::new().unwrap();
    let storage = open_storage(&dir).await;

    let task = storage
        .create_task("a title", Some("a description"), "pendente")
        .await
        .unwrap();
    assert!(task.id > 0);
    assert_eq!(task.titulo, "a title");
    assert_eq!(task.descricao.as_deref(), Some("a description"));
    assert!(!task.criado_em.is_empty());

    let fetched = storage.get_task(task.id).await.unwrap().unwrap();
    assert_eq!(fetched, task);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let dir = TempDir::new().unwrap();
    let storage = open_storage(&dir).await;

    let first = storage.create_task("one", None, "pendente").await.unwrap();
    let second = storage.create_task("two", None, "pendente").await.unwrap();
    assert!(storage.delete_task(second.id).await.unwrap());

    let third = storage.create_task("three", None, "pendente").await.unwrap();
    assert!(third.id > second.id, "AUTOINCREMENT must not recycle ids");
    assert!(second.id > first.id);
}

#[tokio::test]
async fn update_writes_only_present_fields() {
    let dir = TempDir::new().unwrap();
    let storage = open_storage(&dir).await;

    let task = storage
        .create_task("keep me", Some("and me"), "pendente")
        .await
        .unwrap();

    let patch = TaskPatch {
        status: Some("done".to_string()),
        ..TaskPatch::default()
    };
    assert!(storage.update_task(task.id, &patch).await.unwrap());

    let updated = storage.get_task(task.id).await.unwrap().unwrap();
    assert_eq!(updated.titulo, "keep me");
    assert_eq!(updated.descricao.as_deref(), Some("and me"));
    assert_eq!(updated.status, "done");
    assert_eq!(updated.criado_em, task.criado_em);
}

#[tokio::test]
async fn update_and_delete_report_missing_rows() {
    let dir = TempDir::new().unwrap();
    let storage = open_storage(&dir).await;

    let patch = TaskPatch {
        titulo: Some("ghost".to_string()),
        ..TaskPatch::default()
    };
    assert!(!storage.update_task(999, &patch).await.unwrap());
    assert!(!storage.delete_task(999).await.unwrap());
}

#[tokio::test]
async fn empty_patch_is_a_caller_bug_not_a_silent_noop() {
    let dir = TempDir::new().unwrap();
    let storage = open_storage(&dir).await;

    let task = storage.create_task("target", None, "pendente").await.unwrap();
    assert!(storage
        .update_task(task.id, &TaskPatch::default())
        .await
        .is_err());
}

#[tokio::test]
async fn list_and_count_track_inserts() {
    let dir = TempDir::new().unwrap();
    let storage = open_storage(&dir).await;

    assert_eq!(storage.count_tasks().await.unwrap(), 0);
    assert!(storage.list_tasks().await.unwrap().is_empty());

    for title in ["a", "b", "c"] {
        storage.create_task(title, None, "pendente").await.unwrap();
    }
    assert_eq!(storage.count_tasks().await.unwrap(), 3);

    let titles: Vec<String> = storage
        .list_tasks()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.titulo)
        .collect();
    assert_eq!(titles, ["a", "b", "c"], "insertion order");
}
