//! Sync service tests driven through a mocked spreadsheet source.

use super::fixtures::row;
use crate::closing::{
    adapters::memory::{InMemoryTaskMirror, InMemoryTaskStore},
    domain::{Period, SheetRef, TaskStatus, TenantId},
    ports::{MockSpreadsheetSource, SourceError, TaskMirror, TaskStore},
    services::{SheetSyncService, SyncConfig, SyncError, SyncErrorCode, SyncRequest},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn request() -> SyncRequest {
    SyncRequest::new(
        TenantId::new("acme").expect("valid tenant"),
        Period::new(2099, 1).expect("valid period"),
        SheetRef::new("sheet-1").expect("valid sheet"),
    )
}

fn service(
    source: MockSpreadsheetSource,
    store: Arc<InMemoryTaskStore>,
) -> SheetSyncService<MockSpreadsheetSource, InMemoryTaskStore, DefaultClock> {
    SheetSyncService::new(Arc::new(source), store, Arc::new(DefaultClock))
}

#[rstest]
#[tokio::test]
async fn html_sheet_maps_to_not_tabular_and_writes_nothing(request: SyncRequest) {
    let mut source = MockSpreadsheetSource::new();
    source
        .expect_fetch_rows()
        .times(1)
        .returning(|_| Err(SourceError::NotTabular));
    let store = Arc::new(InMemoryTaskStore::new());

    let err = service(source, Arc::clone(&store))
        .sync(&request)
        .await
        .expect_err("fetch should fail");

    assert_eq!(err.code(), SyncErrorCode::NotTabular);
    assert_eq!(err.code().as_str(), "not_tabular");
    assert_eq!(store.applied_batches().expect("readable store"), 0);
}

#[rstest]
#[case(SourceError::HttpStatus { status: 403 })]
#[case(SourceError::EmptyPayload)]
#[case(SourceError::Malformed("bad quote".to_owned()))]
#[tokio::test]
async fn other_source_failures_map_to_transport(request: SyncRequest, #[case] error: SourceError) {
    let mut source = MockSpreadsheetSource::new();
    source
        .expect_fetch_rows()
        .returning(move |_| Err(error.clone()));

    let err = service(source, Arc::new(InMemoryTaskStore::new()))
        .sync(&request)
        .await
        .expect_err("fetch should fail");

    assert_eq!(err.code(), SyncErrorCode::Transport);
}

#[rstest]
#[tokio::test]
async fn sheet_without_named_rows_is_empty_input(request: SyncRequest) {
    let mut source = MockSpreadsheetSource::new();
    source
        .expect_fetch_rows()
        .returning(|_| Ok(vec![row(&[("Código", "C1")]), row(&[("Tarefa", " ")])]));

    let err = service(source, Arc::new(InMemoryTaskStore::new()))
        .sync(&request)
        .await
        .expect_err("no task names");

    assert!(matches!(err, SyncError::EmptyInput));
}

#[rstest]
#[tokio::test]
async fn sync_writes_reconciled_tasks(request: SyncRequest) {
    let mut source = MockSpreadsheetSource::new();
    source
        .expect_fetch_rows()
        .withf(|sheet| sheet.spreadsheet_id() == "sheet-1")
        .times(1)
        .returning(|_| {
            Ok(vec![
                row(&[("Tarefa", "Fechar Caixa"), ("Início", "10/01/2099")]),
                row(&[("Tarefa", "Folha"), ("Status", "Em andamento")]),
                row(&[("Tarefa", "Folha")]),
            ])
        });
    let store = Arc::new(InMemoryTaskStore::new());
    let mirror = Arc::new(InMemoryTaskMirror::new());
    let mirror_port: Arc<dyn TaskMirror> = mirror.clone();

    let report = service(source, Arc::clone(&store))
        .with_config(SyncConfig::default().with_batch_size(1))
        .with_mirror(mirror_port)
        .sync(&request)
        .await
        .expect("sync succeeds");

    assert_eq!(report.created, 2);
    assert_eq!(report.skipped_duplicates, 1);
    assert_eq!(report.batches_written, 2);
    assert!(report.mirrored);
    let statuses: Vec<TaskStatus> = report.tasks.iter().map(|task| task.status()).collect();
    assert_eq!(statuses, vec![TaskStatus::Pending, TaskStatus::InProgress]);

    let stored = store
        .list(request.tenant(), request.period())
        .await
        .expect("listable store");
    assert_eq!(stored, report.tasks);
    let snapshot = mirror
        .snapshot(request.tenant(), request.period())
        .expect("readable mirror")
        .expect("published snapshot");
    assert_eq!(snapshot.as_array().map(Vec::len), Some(2));
}

#[rstest]
#[tokio::test]
async fn preview_leaves_store_untouched(request: SyncRequest) {
    let mut source = MockSpreadsheetSource::new();
    source
        .expect_fetch_rows()
        .returning(|_| Ok(vec![row(&[("Tarefa", "Folha")])]));
    let store = Arc::new(InMemoryTaskStore::new());

    let outcome = service(source, Arc::clone(&store))
        .preview(&request)
        .await
        .expect("preview succeeds");

    assert_eq!(outcome.created, 1);
    assert_eq!(store.applied_batches().expect("readable store"), 0);
}
