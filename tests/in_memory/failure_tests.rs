//! Failure paths: unreachable sheets, timeouts, empty sheets and overlapping
//! syncs.

use super::helpers::{Harness, harness, march_checklist, period, request, row, sheet, tenant};
use fechamento::closing::{
    adapters::memory::{InMemoryTaskStore, StaticSheetSource},
    domain::{Period, RawRow},
    ports::{SourceError, TaskStore},
    services::{SyncConfig, SyncError, SyncErrorCode, SyncRequest},
};
use rstest::rstest;
use std::time::Duration;

fn slow_harness(delay: Duration, config: SyncConfig) -> Harness {
    Harness::with(
        StaticSheetSource::new().with_delay(delay),
        InMemoryTaskStore::new(),
        config,
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_sheet_is_a_transport_error(harness: Harness, request: SyncRequest) {
    let err = harness
        .service
        .sync(&request)
        .await
        .expect_err("sheet is not served");

    assert!(matches!(
        err,
        SyncError::Source(SourceError::HttpStatus { status: 404 })
    ));
    assert_eq!(err.code(), SyncErrorCode::Transport);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn private_sheet_is_not_tabular(harness: Harness, request: SyncRequest) {
    harness
        .source
        .insert_error(sheet(), SourceError::NotTabular);

    let err = harness
        .service
        .sync(&request)
        .await
        .expect_err("sheet answers with html");

    assert_eq!(err.code(), SyncErrorCode::NotTabular);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_sheet_times_out(request: SyncRequest) {
    let harness = slow_harness(
        Duration::from_millis(500),
        SyncConfig::default().with_fetch_timeout(Duration::from_millis(20)),
    );
    harness.serve(march_checklist());

    let err = harness
        .service
        .sync(&request)
        .await
        .expect_err("fetch exceeds timeout");

    assert_eq!(err.code(), SyncErrorCode::Timeout);
    assert_eq!(harness.store.applied_batches().expect("readable store"), 0);
}

#[rstest]
#[case(Vec::new())]
#[case(vec![RawRow::new(), row(&[("Tarefa", "  ")])])]
#[case(vec![row(&[("Código", "CX"), ("Status", "Concluído")])])]
#[tokio::test(flavor = "multi_thread")]
async fn sheets_without_task_names_are_rejected(
    harness: Harness,
    request: SyncRequest,
    #[case] rows: Vec<RawRow>,
) {
    harness.serve(rows);

    let err = harness
        .service
        .sync(&request)
        .await
        .expect_err("nothing to import");

    assert_eq!(err.code(), SyncErrorCode::EmptyInput);
    let stored = harness
        .store
        .list(&tenant(), period())
        .await
        .expect("listable store");
    assert!(stored.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overlapping_syncs_for_one_period_are_rejected(request: SyncRequest) {
    let harness = slow_harness(Duration::from_millis(200), SyncConfig::default());
    harness.serve(march_checklist());

    let (first, second) = tokio::join!(
        harness.service.sync(&request),
        harness.service.sync(&request)
    );

    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let rejected = first.err().or_else(|| second.err()).expect("one rejected sync");
    assert_eq!(rejected.code(), SyncErrorCode::AlreadyRunning);

    harness
        .service
        .sync(&request)
        .await
        .expect("guard released after completion");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn different_periods_sync_concurrently(request: SyncRequest) {
    let harness = slow_harness(Duration::from_millis(100), SyncConfig::default());
    harness.serve(march_checklist());
    let april = SyncRequest::new(tenant(), Period::new(2099, 4).expect("valid period"), sheet());

    let (march_report, april_report) = tokio::join!(
        harness.service.sync(&request),
        harness.service.sync(&april)
    );

    assert!(march_report.is_ok());
    assert!(april_report.is_ok());
}
