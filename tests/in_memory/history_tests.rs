//! Repeated syncs keep task identity and completion history.

use super::helpers::{Harness, harness, march_checklist, period, request, row, tenant};
use fechamento::closing::{
    domain::{AUTOMATIC_IMPORT, TaskStatus},
    ports::TaskStore,
    services::{ReconcileMode, SyncRequest},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn first_sync_creates_every_task(harness: Harness, request: SyncRequest) {
    harness.serve(march_checklist());

    let report = harness.service.sync(&request).await.expect("sync succeeds");

    assert_eq!(report.created, 3);
    assert_eq!(report.updated, 0);
    assert!(report.deleted.is_empty());
    let stored = harness
        .store
        .list(&tenant(), period())
        .await
        .expect("listable store");
    let names: Vec<&str> = stored.iter().map(|task| task.name()).collect();
    assert_eq!(names, vec!["Fechar caixa", "Conciliar bancos", "Folha de pagamento"]);
    assert!(stored.iter().all(|task| task.status() == TaskStatus::Pending));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resync_keeps_ids_and_reports_updates(harness: Harness, request: SyncRequest) {
    harness.serve(march_checklist());
    let first = harness.service.sync(&request).await.expect("first sync");

    let second = harness.service.sync(&request).await.expect("second sync");

    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 3);
    assert_eq!(second.tasks, first.tasks);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_survives_a_sheet_that_drops_the_finish_date(
    harness: Harness,
    request: SyncRequest,
) {
    harness.serve(vec![row(&[
        ("Código", "CX"),
        ("Tarefa", "Fechar caixa"),
        ("Início", "01/03/2099"),
        ("Término", "03/03/2099"),
    ])]);
    let first = harness.service.sync(&request).await.expect("first sync");
    let completed = first.tasks.first().expect("one task").clone();
    assert_eq!(completed.status(), TaskStatus::DoneLate);
    assert_eq!(completed.completed_by(), Some(AUTOMATIC_IMPORT));

    harness.serve(vec![row(&[
        ("Código", "CX"),
        ("Tarefa", "Fechar o caixa"),
        ("Início", "01/03/2099"),
    ])]);
    let second = harness.service.sync(&request).await.expect("second sync");

    let task = second.tasks.first().expect("one task");
    assert_eq!(task.id(), completed.id());
    assert_eq!(task.name(), "Fechar o caixa");
    assert_eq!(task.status(), TaskStatus::DoneLate);
    assert_eq!(task.actual_at(), completed.actual_at());
    assert_eq!(task.completed_by(), Some(AUTOMATIC_IMPORT));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rows_removed_from_the_sheet_are_deleted(harness: Harness, request: SyncRequest) {
    harness.serve(march_checklist());
    let first = harness.service.sync(&request).await.expect("first sync");

    harness.serve(march_checklist().into_iter().take(2).collect());
    let second = harness.service.sync(&request).await.expect("second sync");

    let removed = first.tasks.get(2).expect("third task").id();
    assert_eq!(second.deleted, vec![removed]);
    let stored = harness
        .store
        .list(&tenant(), period())
        .await
        .expect("listable store");
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|task| task.id() != removed));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hard_reset_replaces_every_task(harness: Harness, request: SyncRequest) {
    harness.serve(march_checklist());
    let first = harness.service.sync(&request).await.expect("first sync");

    let reset = harness
        .service
        .sync(&request.clone().with_mode(ReconcileMode::HardReset))
        .await
        .expect("reset sync");

    assert_eq!(reset.created, 3);
    assert_eq!(reset.deleted.len(), 3);
    let stored = harness
        .store
        .list(&tenant(), period())
        .await
        .expect("listable store");
    assert_eq!(stored, reset.tasks);
    assert!(
        stored
            .iter()
            .all(|task| first.tasks.iter().all(|old| old.id() != task.id()))
    );
}
