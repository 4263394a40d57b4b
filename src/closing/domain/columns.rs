//! Header alias resolution for loosely-labelled spreadsheet columns.
//!
//! Sheets from different periods and clients label the same column in
//! different ways ("Área", "AREA", "Setor"). Each canonical [`Field`] maps to
//! an ordered alias list; resolution takes the first alias whose cell is
//! non-blank, so column order, casing and spacing never matter.

use super::{CellValue, RawRow};

/// Canonical task field names recognised in spreadsheet headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Task title.
    Name,
    /// Short task code used as the strong identity key.
    Code,
    /// "D+" relative-day offset.
    Order,
    /// Planned date.
    ScheduledDate,
    /// Planned time of day.
    ScheduledTime,
    /// Completion date.
    ActualDate,
    /// Completion time of day.
    ActualTime,
    /// Department or area.
    Area,
    /// Responsible person.
    Owner,
    /// Person who executed the task.
    ExecutedBy,
    /// Free-text status.
    Status,
    /// Notes and observations.
    Notes,
    /// Longer description.
    Description,
}

impl Field {
    /// Every field, in the order they are resolved.
    pub const ALL: [Self; 13] = [
        Self::Name,
        Self::Code,
        Self::Order,
        Self::ScheduledDate,
        Self::ScheduledTime,
        Self::ActualDate,
        Self::ActualTime,
        Self::Area,
        Self::Owner,
        Self::ExecutedBy,
        Self::Status,
        Self::Notes,
        Self::Description,
    ];

    /// Returns the header aliases for this field in priority order.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Name => &[
                "tarefa",
                "etapa",
                "atividade",
                "nome",
                "nome da etapa",
                "nome da tarefa",
                "task",
                "name",
            ],
            Self::Code => &["codigo", "código", "cod", "cód", "id", "code"],
            Self::Order => &["d+", "d +", "dia", "ordem", "order", "day"],
            Self::ScheduledDate => &[
                "início",
                "inicio",
                "data início",
                "data inicio",
                "data prevista",
                "previsto",
                "prazo",
                "data",
                "scheduled date",
                "due date",
            ],
            Self::ScheduledTime => &[
                "hora início",
                "hora inicio",
                "hora prevista",
                "horário previsto",
                "horario previsto",
                "hora",
                "scheduled time",
            ],
            Self::ActualDate => &[
                "término",
                "termino",
                "data término",
                "data termino",
                "data conclusão",
                "data conclusao",
                "concluído em",
                "concluido em",
                "data real",
                "realizado",
                "actual date",
                "completed date",
            ],
            Self::ActualTime => &[
                "hora término",
                "hora termino",
                "hora conclusão",
                "hora conclusao",
                "hora real",
                "actual time",
                "completed time",
            ],
            Self::Area => &["área", "area", "setor", "departamento", "department"],
            Self::Owner => &["responsável", "responsavel", "resp", "owner"],
            Self::ExecutedBy => &[
                "executado por",
                "executor",
                "quem executou",
                "executed by",
            ],
            Self::Status => &["status", "situação", "situacao", "estado"],
            Self::Notes => &["observações", "observacoes", "observação", "observacao", "obs", "notes"],
            Self::Description => &["descrição", "descricao", "detalhes", "description"],
        }
    }
}

/// Normalizes a header for loose comparison: trimmed, lower-cased and with
/// internal whitespace collapsed to single spaces.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolves the first non-blank value among `aliases`.
///
/// Each alias is tried as an exact header first, then against the
/// normalized form of every header in the row.
#[must_use]
pub fn resolve<'row>(row: &'row RawRow, aliases: &[&str]) -> Option<&'row CellValue> {
    let normalized: Vec<(String, &CellValue)> = row
        .iter()
        .map(|(header, value)| (normalize_header(header), value))
        .collect();

    aliases.iter().find_map(|alias| {
        row.get(alias)
            .filter(|value| !value.is_blank())
            .or_else(|| {
                let wanted = normalize_header(alias);
                normalized
                    .iter()
                    .filter(|(header, _)| *header == wanted)
                    .map(|(_, value)| *value)
                    .find(|value| !value.is_blank())
            })
    })
}

/// Resolves a canonical field using the static alias table.
#[must_use]
pub fn resolve_field(row: &RawRow, field: Field) -> Option<&CellValue> {
    resolve(row, field.aliases())
}

/// Resolves a canonical field as trimmed text.
#[must_use]
pub fn resolve_text(row: &RawRow, field: Field) -> Option<String> {
    resolve_field(row, field).and_then(CellValue::as_text)
}
