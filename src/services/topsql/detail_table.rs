//! List detail table rendering
//!
//! Builds the presentational row model for one SQL record: derived plan
//! records, per-column formatted cells, and the restored single-row
//! selection. Which columns apply is looked up in a table keyed by instance
//! type rather than decided inline per cell.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{InstanceType, PlanItem, SqlRecord};
use crate::services::topsql::plan_records::{PlanRecord, derive_plan_records};
use crate::services::topsql::selection_store::{LIST_DETAIL_SELECTED_KEY, SelectionStore};
use crate::utils::{ApiResult, format_ms, format_none, format_short, t};

/// Stable column identifiers; also the serialized column ids on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnId {
    CpuTime,
    Plan,
    ExecCountPerSec,
    ScanRecordsPerSec,
    ScanIndexesPerSec,
    DurationPerExecMs,
}

impl ColumnId {
    fn title_key(&self) -> &'static str {
        match self {
            ColumnId::CpuTime => "topsql.detail.fields.cpu_time",
            ColumnId::Plan => "topsql.detail.fields.plan",
            ColumnId::ExecCountPerSec => "topsql.detail.fields.exec_count_per_sec",
            ColumnId::ScanRecordsPerSec => "topsql.detail.fields.scan_records_per_sec",
            ColumnId::ScanIndexesPerSec => "topsql.detail.fields.scan_indexes_per_sec",
            ColumnId::DurationPerExecMs => "topsql.detail.fields.duration_per_exec_ms",
        }
    }
}

/// Column sets per instance type. Scan rates are tikv-only, per-exec
/// latency is tidb-only.
const TIDB_COLUMNS: &[ColumnId] = &[
    ColumnId::CpuTime,
    ColumnId::Plan,
    ColumnId::ExecCountPerSec,
    ColumnId::DurationPerExecMs,
];
const TIKV_COLUMNS: &[ColumnId] = &[
    ColumnId::CpuTime,
    ColumnId::Plan,
    ColumnId::ExecCountPerSec,
    ColumnId::ScanRecordsPerSec,
    ColumnId::ScanIndexesPerSec,
];

pub fn columns_for(instance_type: InstanceType) -> &'static [ColumnId] {
    match instance_type {
        InstanceType::Tidb => TIDB_COLUMNS,
        InstanceType::Tikv => TIKV_COLUMNS,
    }
}

/// A rendered cell: display text plus an optional hover tooltip carrying the
/// exact value.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DetailCell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl DetailCell {
    fn plain(text: String) -> Self {
        Self { text, tooltip: None }
    }

    fn with_tooltip(text: String, tooltip: String) -> Self {
        Self { text, tooltip: Some(tooltip) }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DetailColumn {
    pub id: ColumnId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DetailRow {
    /// Row key; the plan digest for real plans, a fixed marker otherwise.
    pub key: String,
    pub selectable: bool,
    /// Cells aligned with the table's column list.
    pub cells: Vec<DetailCell>,
}

/// The fully rendered table plus the detail panel's plan.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListDetailTable {
    pub columns: Vec<DetailColumn>,
    pub rows: Vec<DetailRow>,
    pub is_multi_plans: bool,
    /// Digest of the currently selected row, if the table is selectable.
    pub selected_plan_digest: Option<String>,
    /// Plan shown in the detail panel.
    pub detail_plan: Option<PlanItem>,
}

pub struct TopSqlService {
    selection_store: Arc<dyn SelectionStore>,
}

impl TopSqlService {
    pub fn new(selection_store: Arc<dyn SelectionStore>) -> Self {
        Self { selection_store }
    }

    /// Render the list detail table for one SQL record.
    ///
    /// Selection restore: a persisted digest is honored only if it still names
    /// a selectable row; otherwise the top-ranked real plan is selected. A
    /// single-plan record needs no selection, its plan is the detail directly.
    pub fn build_detail_table(
        &self,
        record: &SqlRecord,
        instance_type: InstanceType,
    ) -> ListDetailTable {
        let derived = derive_plan_records(record);
        let columns: Vec<DetailColumn> = columns_for(instance_type)
            .iter()
            .map(|&id| DetailColumn { id, title: t(id.title_key()).to_string() })
            .collect();

        let rows: Vec<DetailRow> = derived
            .records
            .iter()
            .map(|plan_record| render_row(plan_record, instance_type))
            .collect();

        let (selected_plan_digest, detail_plan) = if derived.is_multi_plans {
            let persisted = self.selection_store.get(LIST_DETAIL_SELECTED_KEY);
            let selected = derived
                .records
                .iter()
                .find(|r| r.is_selectable() && r.plan_digest() == persisted.as_deref())
                .or_else(|| derived.records.iter().find(|r| r.is_selectable()));
            (
                selected.and_then(|r| r.plan_digest().map(str::to_string)),
                selected.and_then(|r| r.item().cloned()),
            )
        } else {
            // Zero or one plan: nothing to select, the detail is the plan itself.
            (None, derived.records.first().and_then(|r| r.item().cloned()))
        };

        ListDetailTable {
            columns,
            rows,
            is_multi_plans: derived.is_multi_plans,
            selected_plan_digest,
            detail_plan,
        }
    }

    /// Persist a row selection. Digests that do not name a selectable row of
    /// this record are ignored and the previous selection stands.
    pub fn select_plan(&self, record: &SqlRecord, plan_digest: &str) -> ApiResult<bool> {
        let derived = derive_plan_records(record);
        let selectable = derived
            .records
            .iter()
            .any(|r| r.is_selectable() && r.plan_digest() == Some(plan_digest));
        if !selectable {
            tracing::debug!("Ignoring selection of non-selectable plan digest {}", plan_digest);
            return Ok(false);
        }
        self.selection_store.set(LIST_DETAIL_SELECTED_KEY, plan_digest)?;
        Ok(true)
    }
}

fn render_row(record: &PlanRecord, instance_type: InstanceType) -> DetailRow {
    let (key, selectable) = match record {
        PlanRecord::Overall { .. } => ("overall".to_string(), false),
        PlanRecord::NoPlan { .. } => ("no_plan".to_string(), false),
        PlanRecord::Plan { item, .. } => {
            (item.plan_digest.clone().unwrap_or_default(), true)
        },
    };

    let cells = columns_for(instance_type)
        .iter()
        .map(|&column| render_cell(record, column))
        .collect();

    DetailRow { key, selectable, cells }
}

fn render_cell(record: &PlanRecord, column: ColumnId) -> DetailCell {
    // Missing numeric fields render as 0.
    let field = |get: fn(&PlanItem) -> Option<f64>| {
        record.item().and_then(get).unwrap_or(0.0)
    };

    match column {
        ColumnId::CpuTime => DetailCell::plain(format_ms(record.cpu_time_ms() as f64, 2)),
        ColumnId::Plan => match record {
            PlanRecord::Overall { .. } => DetailCell::with_tooltip(
                t("topsql.detail.overall").to_string(),
                t("topsql.detail.overall_tooltip").to_string(),
            ),
            PlanRecord::NoPlan { .. } => DetailCell::with_tooltip(
                t("topsql.detail.no_plan").to_string(),
                t("topsql.detail.no_plan_tooltip").to_string(),
            ),
            PlanRecord::Plan { item, .. } => {
                DetailCell::plain(item.plan_digest.clone().unwrap_or_default())
            },
        },
        ColumnId::ExecCountPerSec => {
            let value = field(|item| item.exec_count_per_sec);
            DetailCell::with_tooltip(format_short(value, 1), format_none(value, 1))
        },
        ColumnId::ScanRecordsPerSec => {
            let value = field(|item| item.scan_records_per_sec);
            DetailCell::with_tooltip(format_short(value, 1), format_none(value, 1))
        },
        ColumnId::ScanIndexesPerSec => {
            let value = field(|item| item.scan_indexes_per_sec);
            DetailCell::with_tooltip(format_short(value, 1), format_none(value, 1))
        },
        ColumnId::DurationPerExecMs => {
            let text = format_ms(field(|item| item.duration_per_exec_ms), 1);
            DetailCell::with_tooltip(text.clone(), text)
        },
    }
}
