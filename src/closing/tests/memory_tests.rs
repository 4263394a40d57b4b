//! Tests for the in-memory task store.

use super::fixtures::stored;
use crate::closing::{
    adapters::memory::InMemoryTaskStore,
    domain::{Period, Task, TenantId},
    ports::{TaskStore, WriteBatch},
};
use rstest::{fixture, rstest};

#[fixture]
fn tenant() -> TenantId {
    TenantId::new("acme").expect("valid tenant")
}

fn upsert(tasks: Vec<Task>) -> WriteBatch {
    WriteBatch {
        upserts: tasks,
        deletions: Vec::new(),
    }
}

#[rstest]
#[tokio::test]
async fn deletions_only_touch_their_own_period(tenant: TenantId) {
    let store = InMemoryTaskStore::new();
    let february = Period::new(2024, 2).expect("valid period");
    let march = Period::new(2024, 3).expect("valid period");
    let task = stored(Some("C1"), "Fechar Caixa");

    store
        .apply(&tenant, february, upsert(vec![task.clone()]))
        .await
        .expect("upsert succeeds");
    store
        .apply(
            &tenant,
            march,
            WriteBatch {
                upserts: Vec::new(),
                deletions: vec![task.id()],
            },
        )
        .await
        .expect("foreign deletion is a no-op");

    let kept = store.list(&tenant, february).await.expect("listable");
    assert_eq!(kept, vec![task.clone()]);

    store
        .apply(
            &tenant,
            february,
            WriteBatch {
                upserts: Vec::new(),
                deletions: vec![task.id()],
            },
        )
        .await
        .expect("deletion succeeds");
    assert!(store.list(&tenant, february).await.expect("listable").is_empty());
}

#[rstest]
#[tokio::test]
async fn upserts_keep_first_insertion_order(tenant: TenantId) {
    let store = InMemoryTaskStore::new();
    let period = Period::new(2024, 2).expect("valid period");
    let first = stored(None, "Primeira");
    let second = stored(None, "Segunda");

    store
        .apply(&tenant, period, upsert(vec![first.clone(), second.clone()]))
        .await
        .expect("upsert succeeds");
    store
        .apply(&tenant, period, upsert(vec![second.clone(), first.clone()]))
        .await
        .expect("re-upsert succeeds");

    let listed = store.list(&tenant, period).await.expect("listable");
    assert_eq!(listed, vec![first, second]);
}
