//! Unit tests for plan-record derivation and detail-table rendering.

#[cfg(test)]
mod derivation_tests {
    use crate::models::{PlanItem, SqlRecord};
    use crate::services::topsql::plan_records::{PlanRecord, derive_plan_records};

    fn plan(digest: &str, cpu: &[u64]) -> PlanItem {
        PlanItem {
            plan_digest: Some(digest.to_string()),
            cpu_time_ms: Some(cpu.to_vec()),
            ..Default::default()
        }
    }

    fn record(plans: Vec<PlanItem>) -> SqlRecord {
        SqlRecord { sql_digest: "sql-1".to_string(), plans, ..Default::default() }
    }

    #[test]
    fn test_empty_plans_yield_empty_records() {
        let derived = derive_plan_records(&record(vec![]));
        assert!(!derived.is_multi_plans);
        assert!(derived.records.is_empty());
    }

    #[test]
    fn test_single_plan_has_no_overall_row() {
        let derived = derive_plan_records(&record(vec![plan("a", &[1, 2])]));
        assert!(!derived.is_multi_plans);
        assert_eq!(derived.records.len(), 1);
        assert!(matches!(derived.records[0], PlanRecord::Plan { cpu_time_ms: 3, .. }));
    }

    #[test]
    fn test_multi_plans_prepend_overall_and_sort_descending() {
        // spec example: [a: 1+2, b: 5] -> [overall, b(5), a(3)]
        let derived = derive_plan_records(&record(vec![plan("a", &[1, 2]), plan("b", &[5])]));

        assert!(derived.is_multi_plans);
        assert_eq!(derived.records.len(), 3);
        assert!(matches!(derived.records[0], PlanRecord::Overall { cpu_time_ms: 8 }));
        assert_eq!(derived.records[1].plan_digest(), Some("b"));
        assert_eq!(derived.records[1].cpu_time_ms(), 5);
        assert_eq!(derived.records[2].plan_digest(), Some("a"));
        assert_eq!(derived.records[2].cpu_time_ms(), 3);
    }

    #[test]
    fn test_n_plans_yield_n_plus_one_records() {
        let plans: Vec<PlanItem> =
            (0..4).map(|i| plan(&format!("p{}", i), &[i as u64])).collect();
        let derived = derive_plan_records(&record(plans));
        assert_eq!(derived.records.len(), 5);
        assert!(matches!(derived.records[0], PlanRecord::Overall { .. }));
        for pair in derived.records[1..].windows(2) {
            assert!(pair[0].cpu_time_ms() >= pair[1].cpu_time_ms());
        }
    }

    #[test]
    fn test_missing_cpu_array_counts_as_zero() {
        let no_samples = PlanItem {
            plan_digest: Some("empty".to_string()),
            ..Default::default()
        };
        let derived = derive_plan_records(&record(vec![no_samples, plan("busy", &[7])]));
        assert_eq!(derived.records[1].plan_digest(), Some("busy"));
        assert_eq!(derived.records[2].plan_digest(), Some("empty"));
        assert_eq!(derived.records[2].cpu_time_ms(), 0);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let derived = derive_plan_records(&record(vec![
            plan("first", &[2, 2]),
            plan("second", &[4]),
            plan("third", &[4]),
        ]));
        // All three tie at 4; stable sort preserves input order.
        assert_eq!(derived.records[1].plan_digest(), Some("first"));
        assert_eq!(derived.records[2].plan_digest(), Some("second"));
        assert_eq!(derived.records[3].plan_digest(), Some("third"));
    }

    #[test]
    fn test_empty_digest_becomes_no_plan_variant() {
        // spec example: [{digest:"", cpu:[1]}] -> single no-plan record
        let unattributed = PlanItem {
            plan_digest: Some(String::new()),
            cpu_time_ms: Some(vec![1]),
            ..Default::default()
        };
        let derived = derive_plan_records(&record(vec![unattributed]));

        assert!(!derived.is_multi_plans);
        assert_eq!(derived.records.len(), 1);
        assert!(matches!(derived.records[0], PlanRecord::NoPlan { cpu_time_ms: 1, .. }));
        assert!(!derived.records[0].is_selectable());
    }

    #[test]
    fn test_synthetic_rows_are_not_selectable() {
        let unattributed = PlanItem { cpu_time_ms: Some(vec![9]), ..Default::default() };
        let derived = derive_plan_records(&record(vec![unattributed, plan("a", &[1])]));

        assert!(matches!(derived.records[0], PlanRecord::Overall { .. }));
        assert!(!derived.records[0].is_selectable());
        assert!(matches!(derived.records[1], PlanRecord::NoPlan { .. }));
        assert!(!derived.records[1].is_selectable());
        assert!(derived.records[2].is_selectable());
    }

    #[test]
    fn test_rederivation_is_idempotent() {
        let input = record(vec![plan("a", &[1, 2]), plan("b", &[5])]);
        assert_eq!(derive_plan_records(&input), derive_plan_records(&input));
    }
}

#[cfg(test)]
mod table_tests {
    use std::sync::Arc;

    use crate::models::{InstanceType, PlanItem, SqlRecord};
    use crate::services::topsql::detail_table::{ColumnId, TopSqlService, columns_for};
    use crate::services::topsql::selection_store::{
        LIST_DETAIL_SELECTED_KEY, MemorySelectionStore, SelectionStore,
    };

    fn plan(digest: &str, cpu: u64) -> PlanItem {
        PlanItem {
            plan_digest: Some(digest.to_string()),
            cpu_time_ms: Some(vec![cpu]),
            exec_count_per_sec: Some(1234.0),
            scan_records_per_sec: Some(56789.0),
            scan_indexes_per_sec: Some(12.0),
            duration_per_exec_ms: Some(3.456),
            ..Default::default()
        }
    }

    fn record(plans: Vec<PlanItem>) -> SqlRecord {
        SqlRecord { sql_digest: "sql-1".to_string(), plans, ..Default::default() }
    }

    fn service() -> (TopSqlService, Arc<MemorySelectionStore>) {
        let store = Arc::new(MemorySelectionStore::new());
        (TopSqlService::new(Arc::clone(&store) as Arc<dyn SelectionStore>), store)
    }

    #[test]
    fn test_column_sets_per_instance_type() {
        assert_eq!(
            columns_for(InstanceType::Tidb),
            [
                ColumnId::CpuTime,
                ColumnId::Plan,
                ColumnId::ExecCountPerSec,
                ColumnId::DurationPerExecMs,
            ]
        );
        assert_eq!(
            columns_for(InstanceType::Tikv),
            [
                ColumnId::CpuTime,
                ColumnId::Plan,
                ColumnId::ExecCountPerSec,
                ColumnId::ScanRecordsPerSec,
                ColumnId::ScanIndexesPerSec,
            ]
        );
    }

    #[test]
    fn test_cell_formatting_contract() {
        let (service, _) = service();
        let table =
            service.build_detail_table(&record(vec![plan("a", 3)]), InstanceType::Tidb);

        let row = &table.rows[0];
        // cpu_time: 2-decimal ms bar label, no tooltip
        assert_eq!(row.cells[0].text, "3.00 ms");
        assert_eq!(row.cells[0].tooltip, None);
        // plan digest, plain
        assert_eq!(row.cells[1].text, "a");
        // exec count: short text, plain tooltip
        assert_eq!(row.cells[2].text, "1.2 K");
        assert_eq!(row.cells[2].tooltip.as_deref(), Some("1234.0"));
        // duration per exec: 1-decimal ms, identical cell and tooltip
        assert_eq!(row.cells[3].text, "3.5 ms");
        assert_eq!(row.cells[3].tooltip.as_deref(), Some("3.5 ms"));
    }

    #[test]
    fn test_scan_rate_cells_on_tikv() {
        let (service, _) = service();
        let table =
            service.build_detail_table(&record(vec![plan("a", 3)]), InstanceType::Tikv);

        let row = &table.rows[0];
        assert_eq!(row.cells[3].text, "56.8 K");
        assert_eq!(row.cells[3].tooltip.as_deref(), Some("56789.0"));
        assert_eq!(row.cells[4].text, "12.0");
        assert_eq!(row.cells[4].tooltip.as_deref(), Some("12.0"));
    }

    #[test]
    fn test_overall_row_labels_and_missing_fields_render_zero() {
        let (service, _) = service();
        let table = service.build_detail_table(
            &record(vec![plan("a", 1), plan("b", 2)]),
            InstanceType::Tidb,
        );

        let overall = &table.rows[0];
        assert!(!overall.selectable);
        assert_eq!(overall.key, "overall");
        assert_eq!(overall.cells[1].text, "Overall");
        assert!(overall.cells[1].tooltip.is_some());
        // The overall row has no backing plan item; rate cells default to 0.
        assert_eq!(overall.cells[2].text, "0.0");
    }

    #[test]
    fn test_single_plan_needs_no_selection() {
        let (service, _) = service();
        let table =
            service.build_detail_table(&record(vec![plan("only", 3)]), InstanceType::Tidb);

        assert!(!table.is_multi_plans);
        assert_eq!(table.selected_plan_digest, None);
        assert_eq!(
            table.detail_plan.as_ref().and_then(|p| p.plan_digest.as_deref()),
            Some("only")
        );
    }

    #[test]
    fn test_multi_plan_defaults_to_top_ranked_plan() {
        let (service, _) = service();
        let table = service.build_detail_table(
            &record(vec![plan("cold", 1), plan("hot", 9)]),
            InstanceType::Tidb,
        );

        assert_eq!(table.selected_plan_digest.as_deref(), Some("hot"));
        assert_eq!(
            table.detail_plan.as_ref().and_then(|p| p.plan_digest.as_deref()),
            Some("hot")
        );
    }

    #[test]
    fn test_selection_persists_and_restores() {
        let (service, store) = service();
        let input = record(vec![plan("cold", 1), plan("hot", 9)]);

        assert!(service.select_plan(&input, "cold").unwrap());
        assert_eq!(
            store.get(LIST_DETAIL_SELECTED_KEY),
            Some("cold".to_string())
        );

        // Re-render with the same record set restores the persisted digest.
        let table = service.build_detail_table(&input, InstanceType::Tidb);
        assert_eq!(table.selected_plan_digest.as_deref(), Some("cold"));
    }

    #[test]
    fn test_selecting_unknown_or_synthetic_digest_is_ignored() {
        let (service, store) = service();
        let unattributed = PlanItem { cpu_time_ms: Some(vec![4]), ..Default::default() };
        let input = record(vec![plan("a", 1), unattributed]);

        assert!(!service.select_plan(&input, "missing").unwrap());
        assert!(!service.select_plan(&input, "").unwrap());
        assert_eq!(store.get(LIST_DETAIL_SELECTED_KEY), None);
    }

    #[test]
    fn test_stale_persisted_selection_falls_back_to_top_plan() {
        let (service, store) = service();
        store.set(LIST_DETAIL_SELECTED_KEY, "gone").unwrap();

        let table = service.build_detail_table(
            &record(vec![plan("cold", 1), plan("hot", 9)]),
            InstanceType::Tidb,
        );
        assert_eq!(table.selected_plan_digest.as_deref(), Some("hot"));
    }

    #[test]
    fn test_column_titles_come_from_bundle() {
        let (service, _) = service();
        let table =
            service.build_detail_table(&record(vec![plan("a", 3)]), InstanceType::Tikv);
        let titles: Vec<&str> = table.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "CPU Time",
                "Plan",
                "Executions/sec",
                "Scanned Records/sec",
                "Scanned Indexes/sec",
            ]
        );
    }
}
