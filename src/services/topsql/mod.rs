//! Top SQL list detail: plan-record derivation, table rendering, selection.

pub mod detail_table;
pub mod plan_records;
pub mod selection_store;

mod tests;

pub use detail_table::{
    ColumnId, DetailCell, DetailColumn, DetailRow, ListDetailTable, TopSqlService, columns_for,
};
pub use plan_records::{PlanRecord, PlanRecordSet, derive_plan_records};
pub use selection_store::{
    FileSelectionStore, LIST_DETAIL_SELECTED_KEY, MemorySelectionStore, SelectionStore,
};
