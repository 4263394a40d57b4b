//! Shared fixtures for in-memory sheet sync integration tests.

use fechamento::closing::{
    adapters::memory::{InMemoryTaskStore, StaticSheetSource},
    domain::{Period, RawRow, SheetRef, TenantId},
    services::{SheetSyncService, SyncConfig, SyncRequest},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Service type exercised by the integration tests.
pub type TestService = SheetSyncService<StaticSheetSource, InMemoryTaskStore, DefaultClock>;

/// A sync service wired to in-memory adapters the test can inspect.
pub struct Harness {
    /// Spreadsheet source the service fetches from.
    pub source: Arc<StaticSheetSource>,
    /// Store the service writes to.
    pub store: Arc<InMemoryTaskStore>,
    /// Service under test.
    pub service: TestService,
}

impl Harness {
    /// Wires a service around the given adapters and configuration.
    #[must_use]
    pub fn with(source: StaticSheetSource, store: InMemoryTaskStore, config: SyncConfig) -> Self {
        let shared_source = Arc::new(source);
        let shared_store = Arc::new(store);
        let service = SheetSyncService::new(
            Arc::clone(&shared_source),
            Arc::clone(&shared_store),
            Arc::new(DefaultClock),
        )
        .with_config(config);
        Self {
            source: shared_source,
            store: shared_store,
            service,
        }
    }

    /// Replaces the rows served for [`sheet`].
    pub fn serve(&self, rows: Vec<RawRow>) {
        self.source.insert_rows(sheet(), rows);
    }
}

/// Provides a harness with default adapters and configuration.
#[fixture]
pub fn harness() -> Harness {
    Harness::with(
        StaticSheetSource::new(),
        InMemoryTaskStore::new(),
        SyncConfig::default(),
    )
}

/// Tenant used by every test.
#[must_use]
pub fn tenant() -> TenantId {
    TenantId::new("escritorio-contabil-01").expect("valid tenant")
}

/// Period used by default; far enough ahead that future dates stay future.
#[must_use]
pub fn period() -> Period {
    Period::new(2099, 3).expect("valid period")
}

/// Sheet the harness serves rows for.
#[must_use]
pub fn sheet() -> SheetRef {
    SheetRef::new("https://docs.google.com/spreadsheets/d/1mArCo2099/edit#gid=0")
        .expect("valid sheet url")
        .with_tab("Março")
}

/// Provides the default history-preserving request.
#[fixture]
pub fn request() -> SyncRequest {
    SyncRequest::new(tenant(), period(), sheet())
}

/// Builds a row from header/text pairs.
#[must_use]
pub fn row(cells: &[(&str, &str)]) -> RawRow {
    cells.iter().map(|(header, value)| (*header, *value)).collect()
}

/// A month-close checklist with a code, relative day and scheduled date per
/// task. Dates fall in March 2099.
#[must_use]
pub fn march_checklist() -> Vec<RawRow> {
    vec![
        row(&[
            ("Código", "CX"),
            ("Tarefa", "Fechar caixa"),
            ("D+", "1"),
            ("Início", "01/03/2099"),
            ("Hora início", "09:00"),
        ]),
        row(&[
            ("Código", "BC"),
            ("Tarefa", "Conciliar bancos"),
            ("D+", "2"),
            ("Início", "02/03/2099"),
        ]),
        row(&[
            ("Código", "FP"),
            ("Tarefa", "Folha de pagamento"),
            ("D+", "5"),
            ("Início", "05/03/2099"),
            ("Responsável", "Carla"),
        ]),
    ]
}
