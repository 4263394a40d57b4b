//! Store write batching and read-model mirror publication.

use super::helpers::{Harness, march_checklist, period, request, row, tenant};
use fechamento::closing::{
    adapters::memory::{InMemoryTaskMirror, InMemoryTaskStore, StaticSheetSource},
    domain::RawRow,
    ports::{TaskMirror, TaskStore},
    services::{ReconcileMode, SyncConfig, SyncErrorCode, SyncRequest},
};
use rstest::rstest;
use std::sync::Arc;

fn numbered_rows(count: usize) -> Vec<RawRow> {
    (1..=count)
        .map(|index| {
            let name = format!("Tarefa {index}");
            row(&[("Tarefa", name.as_str())])
        })
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn writes_are_split_to_fit_the_store_limit(request: SyncRequest) {
    let harness = Harness::with(
        StaticSheetSource::new(),
        InMemoryTaskStore::new().with_batch_limit(2),
        SyncConfig::default().with_batch_size(2),
    );
    harness.serve(numbered_rows(5));

    let report = harness.service.sync(&request).await.expect("sync succeeds");

    assert_eq!(report.batches_written, 3);
    assert_eq!(harness.store.applied_batches().expect("readable store"), 3);
    let stored = harness
        .store
        .list(&tenant(), period())
        .await
        .expect("listable store");
    assert_eq!(stored.len(), 5);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn oversized_batches_surface_as_store_errors(request: SyncRequest) {
    let harness = Harness::with(
        StaticSheetSource::new(),
        InMemoryTaskStore::new().with_batch_limit(2),
        SyncConfig::default(),
    );
    harness.serve(numbered_rows(3));

    let err = harness
        .service
        .sync(&request)
        .await
        .expect_err("batch exceeds store limit");

    assert_eq!(err.code(), SyncErrorCode::Store);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mirror_receives_the_synced_task_list(request: SyncRequest) {
    let mirror = Arc::new(InMemoryTaskMirror::new());
    let mirror_port: Arc<dyn TaskMirror> = mirror.clone();
    let mut harness = Harness::with(
        StaticSheetSource::new(),
        InMemoryTaskStore::new(),
        SyncConfig::default(),
    );
    harness.service = harness.service.with_mirror(mirror_port);
    harness.serve(march_checklist());

    let report = harness.service.sync(&request).await.expect("sync succeeds");

    assert!(report.mirrored);
    let snapshot = mirror
        .snapshot(&tenant(), period())
        .expect("readable mirror")
        .expect("published snapshot");
    let entries = snapshot.as_array().expect("array snapshot");
    assert_eq!(entries.len(), 3);
    let first = entries.first().expect("first entry");
    assert_eq!(first["name"], "Fechar caixa");
    assert_eq!(first["code"], "CX");
    assert_eq!(first["status"], "pending");
    assert!(first.get("scheduledAt").is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sync_without_mirror_reports_unmirrored(request: SyncRequest) {
    let harness = Harness::with(
        StaticSheetSource::new(),
        InMemoryTaskStore::new(),
        SyncConfig::default(),
    );
    harness.serve(march_checklist());

    let report = harness.service.sync(&request).await.expect("sync succeeds");

    assert!(!report.mirrored);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batched_hard_reset_ends_with_only_the_new_tasks(request: SyncRequest) {
    let harness = Harness::with(
        StaticSheetSource::new(),
        InMemoryTaskStore::new().with_batch_limit(2),
        SyncConfig::default().with_batch_size(2),
    );
    harness.serve(march_checklist());
    harness.service.sync(&request).await.expect("first sync");

    let reset = harness
        .service
        .sync(&request.clone().with_mode(ReconcileMode::HardReset))
        .await
        .expect("reset sync");

    assert_eq!(reset.batches_written, 3);
    let stored = harness
        .store
        .list(&tenant(), period())
        .await
        .expect("listable store");
    assert_eq!(stored, reset.tasks);
}
