//! Plan-record derivation
//!
//! Turns a `SqlRecord` into the ranked row model of the list detail table.
//! The result is a pure function of the input and is recomputed from scratch
//! every time; nothing here mutates incrementally.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{PlanItem, SqlRecord};

/// One row of the detail table.
///
/// The two synthetic variants replace the ad hoc "is overall" / "is no plan"
/// digest checks: rendering code inspects the tag instead of magic values.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanRecord {
    /// Summary row for the whole statement; present only with multiple plans.
    Overall { cpu_time_ms: u64 },
    /// A plan whose digest is unknown; CPU time could not be attributed.
    NoPlan { cpu_time_ms: u64, item: PlanItem },
    /// A real, selectable execution plan.
    Plan { cpu_time_ms: u64, item: PlanItem },
}

impl PlanRecord {
    pub fn cpu_time_ms(&self) -> u64 {
        match self {
            PlanRecord::Overall { cpu_time_ms }
            | PlanRecord::NoPlan { cpu_time_ms, .. }
            | PlanRecord::Plan { cpu_time_ms, .. } => *cpu_time_ms,
        }
    }

    /// Only real plans can be selected in the table.
    pub fn is_selectable(&self) -> bool {
        matches!(self, PlanRecord::Plan { .. })
    }

    /// Backing plan item, if the row corresponds to one.
    pub fn item(&self) -> Option<&PlanItem> {
        match self {
            PlanRecord::Overall { .. } => None,
            PlanRecord::NoPlan { item, .. } | PlanRecord::Plan { item, .. } => Some(item),
        }
    }

    /// Plan digest of a selectable row.
    pub fn plan_digest(&self) -> Option<&str> {
        match self {
            PlanRecord::Plan { item, .. } => item.plan_digest.as_deref(),
            _ => None,
        }
    }
}

/// Derived view of one `SqlRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlanRecordSet {
    pub is_multi_plans: bool,
    pub records: Vec<PlanRecord>,
}

/// Derive the ranked plan-record list for a SQL record.
///
/// Plans are ranked descending by total CPU time; `sort_by_key` is stable, so
/// equal values keep their original relative order. With more than one plan an
/// `Overall` summary row is prepended at index 0, carrying the sum over all
/// plans.
pub fn derive_plan_records(record: &SqlRecord) -> PlanRecordSet {
    if record.plans.is_empty() {
        return PlanRecordSet { is_multi_plans: false, records: Vec::new() };
    }

    let is_multi_plans = record.plans.len() > 1;

    let mut ranked: Vec<(u64, &PlanItem)> = record
        .plans
        .iter()
        .map(|plan| (plan.total_cpu_time_ms(), plan))
        .collect();
    ranked.sort_by_key(|(cpu_time, _)| std::cmp::Reverse(*cpu_time));

    let mut records: Vec<PlanRecord> = Vec::with_capacity(ranked.len() + 1);
    if is_multi_plans {
        let total = ranked.iter().map(|(cpu_time, _)| cpu_time).sum();
        records.push(PlanRecord::Overall { cpu_time_ms: total });
    }
    for (cpu_time_ms, item) in ranked {
        let record = if item.has_no_digest() {
            PlanRecord::NoPlan { cpu_time_ms, item: item.clone() }
        } else {
            PlanRecord::Plan { cpu_time_ms, item: item.clone() }
        };
        records.push(record);
    }

    PlanRecordSet { is_multi_plans, records }
}
