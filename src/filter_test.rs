/// Tests for the filter predicate engine
#[cfg(test)]
mod tests {
    use crate::error::GemError;
    use crate::filter::*;
    use crate::schema::{ColumnNames, Schema};
    use crate::types::{CellValue, Table};
    use serde_json::json;

    const COLUMNS: &[&str] =
        &["Shape", "Cts", "Color", "Clarity", "Cut", "Polish", "Symm", "Flour", "Lab Name", "PPC", "Rap Price", "Disc %", "Total Value"];

    fn text(s: &str) -> CellValue {
        CellValue::parse(s)
    }

    /// Build an inventory with one row per tuple
    fn inventory(rows: &[(&str, f64, &str, &str, &str, &str, f64)]) -> Table {
        let rows = rows
            .iter()
            .map(|(shape, cts, color, clarity, flour, lab, ppc)| {
                vec![
                    text(shape),
                    CellValue::Number(*cts),
                    text(color),
                    text(clarity),
                    text("EX"),
                    text("VG"),
                    text("EX"),
                    text(flour),
                    text(lab),
                    CellValue::Number(*ppc),
                    CellValue::Number(*ppc * 1.5),
                    CellValue::Number(-33.33),
                    CellValue::Number(*ppc * *cts),
                ]
            })
            .collect();
        Table::new(COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
    }

    fn sample() -> Table {
        inventory(&[
            ("Round", 1.01, "D", "VVS1", "NONE", "GIA", 9000.0),
            ("Cushion", 0.50, "F", "VS2", "STG", "", 3000.0),
            ("Pear", 2.10, "K", "SI1", "Faint", "IGI", 2500.0),
            ("cushion", 1.50, "H", "I1", "", "GIA", 1800.0),
        ])
    }

    fn run(table: &Table, spec: serde_json::Value) -> Result<Table, GemError> {
        let spec = FilterSpec::from_json(spec)?;
        let schema = Schema::resolve(table, &ColumnNames::default());
        filter_table(table, &spec, &schema)
    }

    fn shapes(table: &Table) -> Vec<String> {
        table.rows.iter().map(|r| r[0].display()).collect()
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let table = sample();
        let filtered = run(&table, json!({})).unwrap();
        assert_eq!(filtered, table);
    }

    #[test]
    fn test_color_d_to_d_keeps_only_d() {
        let filtered = run(&sample(), json!({"color_min": "D", "color_max": "D"})).unwrap();
        assert_eq!(filtered.row_count(), 1);
        assert_eq!(filtered.rows[0][2], text("D"));
    }

    #[test]
    fn test_color_range_scenario() {
        let table = inventory(&[
            ("Round", 1.0, "D", "VS1", "NONE", "GIA", 5000.0),
            ("Round", 1.0, "F", "VS1", "NONE", "GIA", 5000.0),
            ("Round", 1.0, "K", "VS1", "NONE", "GIA", 5000.0),
        ]);
        let filtered = run(&table, json!({"color_min": "D", "color_max": "F"})).unwrap();
        assert_eq!(filtered.rows, table.rows[..2].to_vec());
    }

    #[test]
    fn test_widening_ordinal_range_is_monotonic() {
        let table = sample();
        let grades = ["IF", "VVS1", "VVS2", "VS1", "VS2", "SI1", "SI2", "SI3", "I1", "I2", "I3"];
        let mut previous = 0;
        for max in grades {
            let filtered = run(&table, json!({"clarity_min": "IF", "clarity_max": max})).unwrap();
            assert!(filtered.row_count() >= previous, "widening to {} removed rows", max);
            previous = filtered.row_count();
        }
        assert_eq!(previous, table.row_count());
    }

    #[test]
    fn test_reversed_ordinal_bounds_are_swapped() {
        let forward = run(&sample(), json!({"color_min": "D", "color_max": "H"})).unwrap();
        let reversed = run(&sample(), json!({"color_min": "H", "color_max": "D"})).unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_invalid_clarity_is_client_error() {
        match run(&sample(), json!({"clarity_min": "ZZ"})) {
            Err(GemError::InvalidFilterValue { key, value, .. }) => {
                assert_eq!(key, "clarity_min");
                assert_eq!(value, "ZZ");
            }
            other => panic!("expected InvalidFilterValue, got {:?}", other),
        }
    }

    #[test]
    fn test_one_sided_ranges() {
        let at_least_one = run(&sample(), json!({"size_min": 1.0})).unwrap();
        assert_eq!(at_least_one.row_count(), 3);

        let worse_than_vs2 = run(&sample(), json!({"clarity_min": "VS2"})).unwrap();
        assert_eq!(shapes(&worse_than_vs2), vec!["Cushion", "Pear", "cushion"]);
    }

    #[test]
    fn test_numeric_bounds_accept_strings() {
        let filtered = run(&sample(), json!({"ppc_min": "2000", "ppc_max": "3000"})).unwrap();
        assert_eq!(shapes(&filtered), vec!["Cushion", "Pear"]);
    }

    #[test]
    fn test_non_numeric_bound_rejected() {
        let result = run(&sample(), json!({"size_min": "big"}));
        assert!(matches!(result, Err(GemError::InvalidFilterValue { .. })));
    }

    #[test]
    fn test_shape_alias_matches_canonical() {
        let by_alias = run(&sample(), json!({"shape": "CU"})).unwrap();
        let by_name = run(&sample(), json!({"shape": "Cushion"})).unwrap();
        assert_eq!(by_alias, by_name);
        assert_eq!(by_alias.row_count(), 2);
    }

    #[test]
    fn test_unknown_shape_matches_literally() {
        let filtered = run(&sample(), json!({"shape": "pear"})).unwrap();
        assert_eq!(shapes(&filtered), vec!["Pear"]);
        assert!(run(&sample(), json!({"shape": "Kite"})).unwrap().is_empty());
    }

    #[test]
    fn test_certified_presence() {
        let certified = run(&sample(), json!({"certified": true})).unwrap();
        assert_eq!(certified.row_count(), 3);

        let uncertified = run(&sample(), json!({"certified": "no"})).unwrap();
        assert_eq!(shapes(&uncertified), vec!["Cushion"]);
    }

    #[test]
    fn test_fluorescence_synonyms() {
        let strong = run(&sample(), json!({"fluorescence": ["STR"]})).unwrap();
        assert_eq!(shapes(&strong), vec!["Cushion"]);

        let faint_or_none = run(&sample(), json!({"fluorescence": ["FNT", "NON"]})).unwrap();
        assert_eq!(shapes(&faint_or_none), vec!["Round", "Pear"]);
    }

    #[test]
    fn test_blank_values_never_match_categorical() {
        let filtered = run(&sample(), json!({"fluorescence": [""]})).unwrap();
        // An all-blank list is no constraint, not a match on blank cells
        assert_eq!(filtered.row_count(), 4);

        let none = run(&sample(), json!({"fluorescence": "NONE"})).unwrap();
        assert_eq!(shapes(&none), vec!["Round"]);
    }

    #[test]
    fn test_categorical_membership_case_insensitive() {
        let filtered = run(&sample(), json!({"cut": ["ex", "VG"], "polish": "vg"})).unwrap();
        assert_eq!(filtered.row_count(), 4);
        assert!(run(&sample(), json!({"symmetry": ["G"]})).unwrap().is_empty());
    }

    #[test]
    fn test_missing_geometry_column_is_skipped() {
        let filtered = run(&sample(), json!({"depth_min": 58, "depth_max": 62, "culet": ["NON"]})).unwrap();
        assert_eq!(filtered.row_count(), 4);
    }

    #[test]
    fn test_missing_core_column_is_schema_error() {
        let mut table = sample();
        table.columns[8] = "Certificate".to_string();
        let result = run(&table, json!({"certified": true}));
        assert!(matches!(result, Err(GemError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = run(&sample(), json!({"sparkle_min": 3}));
        assert!(matches!(result, Err(GemError::InvalidFilterValue { .. })));
    }

    #[test]
    fn test_predicate_order_is_fixed() {
        let table = sample();
        let schema = Schema::resolve(&table, &ColumnNames::default());
        let a = FilterSpec::from_json(json!({"cut": "EX", "color_max": "K", "shape": "RD"})).unwrap();
        let b = FilterSpec::from_json(json!({"shape": "RD", "color_max": "K", "cut": "EX"})).unwrap();
        let keys = |spec: &FilterSpec| compile(spec, &schema).unwrap().iter().map(|p| p.key()).collect::<Vec<_>>();
        assert_eq!(keys(&a), vec!["shape", "color", "cut"]);
        assert_eq!(keys(&a), keys(&b));
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let table = sample();
        let before = table.clone();
        let _ = run(&table, json!({"shape": "CU"})).unwrap();
        assert_eq!(table, before);
    }

    #[test]
    fn test_short_rows_read_missing_cells_as_blank() {
        // Built directly, so rows are not padded to the header width
        let table = Table {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: vec![
                vec![text("Round"), CellValue::Number(1.0), text("D")],
                vec![text("Pear")],
            ],
        };

        let kept = run(&table, json!({"color_min": "D", "color_max": "F"})).unwrap();
        assert_eq!(shapes(&kept), vec!["Round"]);

        let kept = run(&table, json!({"certified": false, "size_min": 0.5})).unwrap();
        assert_eq!(shapes(&kept), vec!["Round"]);
    }

    #[test]
    fn test_apply_overrides_splits_lists() {
        let mut value = json!({"color_min": "D"});
        let pairs = vec![
            ("cut".to_string(), "EX, VG".to_string()),
            ("size_max".to_string(), "2".to_string()),
        ];
        apply_overrides(&mut value, &pairs).unwrap();
        assert_eq!(value["cut"], json!(["EX", "VG"]));
        assert_eq!(value["size_max"], json!("2"));

        let spec = FilterSpec::from_json(value).unwrap();
        assert_eq!(spec.size_max, Some(Bound::Text("2".to_string())));
    }

    #[test]
    fn test_apply_overrides_on_null_creates_object() {
        let mut value = serde_json::Value::Null;
        apply_overrides(&mut value, &[("certified".to_string(), "true".to_string())]).unwrap();
        let spec = FilterSpec::from_json(value).unwrap();
        assert_eq!(spec.certified, Some(Flag::Text("true".to_string())));
    }
}
