/// Tests for the request pipeline
#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::delivery::{Artifact, DeliveryAdapter, DeliveryMetadata, LocalDelivery};
    use crate::error::{DeliveryError, GemError};
    use crate::report::Aggregate;
    use crate::runner::*;
    use crate::snapshot::StaticSnapshot;
    use crate::types::{CellValue, Table};
    use serde_json::json;
    use std::cell::RefCell;

    /// Records every call instead of delivering anywhere
    #[derive(Default)]
    struct RecordingDelivery {
        stored: RefCell<Vec<String>>,
        notified: RefCell<Vec<DeliveryMetadata>>,
        fail_upload: bool,
    }

    impl DeliveryAdapter for RecordingDelivery {
        fn store(&self, artifact: &Artifact) -> Result<String, DeliveryError> {
            self.stored.borrow_mut().push(artifact.name.clone());
            if self.fail_upload {
                return Err(DeliveryError::Upload("storage offline".to_string()));
            }
            Ok(format!("https://files.example/{}", artifact.name))
        }

        fn notify(&self, meta: &DeliveryMetadata, _locator: &str) -> Result<(), DeliveryError> {
            self.notified.borrow_mut().push(meta.clone());
            Ok(())
        }
    }

    fn inventory() -> Table {
        let columns = ["Shape", "Cts", "Color", "Clarity", "Flour", "Lab Name", "PPC", "Rap Price", "Disc %", "Total Value"];
        let row = |shape: &str, cts: f64, color: &str, clarity: &str, lab: &str, ppc: f64| {
            vec![
                CellValue::parse(shape),
                CellValue::Number(cts),
                CellValue::parse(color),
                CellValue::parse(clarity),
                CellValue::parse("NONE"),
                CellValue::parse(lab),
                CellValue::Number(ppc),
                CellValue::Number(10000.0),
                CellValue::Number((ppc / 10000.0 - 1.0) * 100.0),
                CellValue::Number(ppc * cts),
            ]
        };
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            vec![
                row("Round", 1.0, "D", "VVS1", "GIA", 6000.0),
                row("Cushion", 0.5, "F", "VS2", "", 5000.0),
                row("Pear", 2.0, "K", "SI1", "IGI", 3000.0),
            ],
        )
    }

    fn request(filter: serde_json::Value) -> Request {
        Request { recipient: Some("buyer@example.com".to_string()), filter }
    }

    fn run(
        req: &Request,
        snapshot: &StaticSnapshot,
        delivery: &dyn DeliveryAdapter,
    ) -> (Result<RunOutcome, GemError>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let result = run_request(req, snapshot, delivery, &AppConfig::default(), dir.path());
        (result, dir)
    }

    #[test]
    fn test_color_range_reports_two_stones() {
        let delivery = RecordingDelivery::default();
        let (result, dir) = run(
            &request(json!({"color_min": "D", "color_max": "H"})),
            &StaticSnapshot(Some(inventory())),
            &delivery,
        );
        let outcome = result.unwrap();

        assert_eq!(outcome.response.summary.stone_count, 2);
        assert_eq!(outcome.response.row_count, 2);
        assert_eq!(outcome.response.summary.total_carats, Aggregate::Value(1.5));
        assert_eq!(outcome.response.summary.avg_price_per_carat, Aggregate::Value(5500.0));
        assert_eq!(outcome.response.summary.derived_discount_percent, Aggregate::Value(-45.0));
        assert!(outcome.response.artifact_reference.starts_with("https://files.example/inventory_"));
        assert!(outcome.response.delivery_error.is_none());
        assert!(dir.path().join(&outcome.response.artifact_name).exists());

        let notified = delivery.notified.borrow();
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].recipient, "buyer@example.com");
    }

    #[test]
    fn test_missing_recipient_rejected_before_load() {
        let delivery = RecordingDelivery::default();
        for recipient in [None, Some("   ".to_string())] {
            let req = Request { recipient, filter: json!({}) };
            let (result, _dir) = run(&req, &StaticSnapshot(None), &delivery);
            assert!(matches!(result, Err(GemError::MissingInput(_))));
        }
    }

    #[test]
    fn test_invalid_grade_rejected() {
        let (result, _dir) =
            run(&request(json!({"clarity_min": "ZZ"})), &StaticSnapshot(Some(inventory())), &LocalDelivery);
        match result {
            Err(GemError::InvalidFilterValue { key, value, .. }) => {
                assert_eq!(key, "clarity_min");
                assert_eq!(value, "ZZ");
            }
            other => panic!("expected InvalidFilterValue, got {:?}", other.map(|o| o.response)),
        }
    }

    #[test]
    fn test_unavailable_snapshot_is_not_no_match() {
        let (result, _dir) = run(&request(json!({})), &StaticSnapshot(None), &LocalDelivery);
        assert!(matches!(result, Err(GemError::SnapshotUnavailable(_))));
    }

    #[test]
    fn test_empty_result_short_circuits() {
        let delivery = RecordingDelivery::default();
        let (result, dir) = run(&request(json!({"shape": "OV"})), &StaticSnapshot(Some(inventory())), &delivery);

        assert!(matches!(result, Err(GemError::NoMatch)));
        assert!(delivery.stored.borrow().is_empty());
        assert!(delivery.notified.borrow().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0, "nothing should be rendered");
    }

    #[test]
    fn test_empty_snapshot_is_no_match() {
        let empty = Table::new(inventory().columns, vec![]);
        let (result, _dir) = run(&request(json!({})), &StaticSnapshot(Some(empty)), &LocalDelivery);
        assert!(matches!(result, Err(GemError::NoMatch)));
    }

    #[test]
    fn test_certified_excludes_blank_lab() {
        let (result, _dir) = run(
            &request(json!({"certified": true, "color_min": "F", "color_max": "F"})),
            &StaticSnapshot(Some(inventory())),
            &LocalDelivery,
        );
        assert!(matches!(result, Err(GemError::NoMatch)));
    }

    #[test]
    fn test_delivery_failure_still_succeeds() {
        let delivery = RecordingDelivery { fail_upload: true, ..RecordingDelivery::default() };
        let (result, dir) = run(&request(json!({})), &StaticSnapshot(Some(inventory())), &delivery);
        let outcome = result.unwrap();

        assert_eq!(outcome.response.summary.stone_count, 3);
        assert!(outcome.response.delivery_error.as_deref().unwrap().contains("storage offline"));
        let local = dir.path().join(&outcome.response.artifact_name);
        assert_eq!(outcome.response.artifact_reference, local.display().to_string());
        assert!(delivery.notified.borrow().is_empty(), "no notification without a stored artifact");
    }

    #[test]
    fn test_local_delivery_references_written_file() {
        let (result, _dir) = run(&request(json!({"shape": ["RD", "PS"]})), &StaticSnapshot(Some(inventory())), &LocalDelivery);
        let outcome = result.unwrap();

        assert_eq!(outcome.filtered.row_count(), 2);
        let bytes = std::fs::read(&outcome.response.artifact_reference).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_snapshot_not_mutated() {
        let snapshot = StaticSnapshot(Some(inventory()));
        let (_result, _dir) = run(&request(json!({"color_max": "D"})), &snapshot, &LocalDelivery);
        assert_eq!(snapshot.0.as_ref().unwrap(), &inventory());
    }

    #[test]
    fn test_back_to_back_requests_keep_both_reports() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = StaticSnapshot(Some(inventory()));
        let config = AppConfig::default();

        let first = run_request(&request(json!({"color_max": "D"})), &snapshot, &LocalDelivery, &config, dir.path())
            .unwrap();
        let first_bytes = std::fs::read(&first.response.artifact_reference).unwrap();
        let second = run_request(&request(json!({})), &snapshot, &LocalDelivery, &config, dir.path()).unwrap();

        assert_ne!(first.response.artifact_name, second.response.artifact_name);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        assert_eq!(std::fs::read(&first.response.artifact_reference).unwrap(), first_bytes);
        assert_ne!(std::fs::read(&second.response.artifact_reference).unwrap(), first_bytes);
        assert_eq!(first.response.row_count, 1);
        assert_eq!(second.response.row_count, 3);
    }

    #[test]
    fn test_numbered_name_on_collision() {
        let base = "inventory_20260105_143000.xlsx";
        assert_eq!(numbered_name(base, 1), base);
        assert_eq!(numbered_name(base, 2), "inventory_20260105_143000_2.xlsx");
        assert_eq!(numbered_name(base, 12), "inventory_20260105_143000_12.xlsx");
    }

    #[test]
    fn test_stock_ids_stay_text_while_measurements_are_numbers() {
        let columns = ["Stock #", "Shape", "Cts", "Color", "PPC", "Rap Price", "Disc %", "Total Value"];
        let rows = [
            ["00123", "Round", "1.00", "D", "6000", "10000", "-40", "6000"],
            ["1E3", "Round", "0.50", "E", "5000", "10000", "-50", "2500"],
        ];
        let table = Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter().map(|r| r.iter().map(|v| CellValue::parse(v)).collect()).collect(),
        );

        let (result, _dir) = run(&request(json!({"shape": "RD"})), &StaticSnapshot(Some(table)), &LocalDelivery);
        let outcome = result.unwrap();

        assert_eq!(outcome.filtered.rows[0][0], CellValue::Text("00123".to_string()));
        assert_eq!(outcome.filtered.rows[1][0], CellValue::Text("1E3".to_string()));
        assert_eq!(outcome.filtered.rows[0][2], CellValue::Number(1.0));
        assert_eq!(outcome.response.summary.total_carats, Aggregate::Value(1.5));
        assert_eq!(outcome.response.summary.total_value, Aggregate::Value(8500.0));
    }

    #[test]
    fn test_artifact_name_format() {
        use chrono::TimeZone;
        let at = chrono::Utc.with_ymd_and_hms(2026, 1, 5, 14, 30, 0).unwrap();
        assert_eq!(artifact_name("inventory", at), "inventory_20260105_143000.xlsx");
    }

    #[test]
    fn test_response_serializes_undefined_as_null() {
        let mut table = inventory();
        for row in &mut table.rows {
            row[7] = CellValue::Null;
        }
        let (result, _dir) = run(&request(json!({})), &StaticSnapshot(Some(table)), &LocalDelivery);
        let json = serde_json::to_value(&result.unwrap().response).unwrap();

        assert!(json["summary"]["avg_rap_price"].is_null());
        assert!(json["summary"]["derived_discount_percent"].is_null());
        assert_eq!(json["summary"]["stone_count"], 3);
        assert!(json.get("delivery_error").is_none());
    }
}
