/// Tests for table data structures
///
/// These tests pin down how raw snapshot cells are typed and how the
/// table copies rows when filtering.

#[cfg(test)]
mod tests {
    use crate::types::*;

    #[test]
    fn test_cell_parse_blank_is_null() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse("   "), CellValue::Null);
    }

    #[test]
    fn test_cell_parse_keeps_text() {
        assert_eq!(CellValue::parse(" 1.25 "), CellValue::Text("1.25".to_string()));
        assert_eq!(CellValue::parse("00123"), CellValue::Text("00123".to_string()));
        assert_eq!(CellValue::parse("VVS1"), CellValue::Text("VVS1".to_string()));
    }

    #[test]
    fn test_into_numeric() {
        assert_eq!(CellValue::parse("1.25").into_numeric(), CellValue::Number(1.25));
        assert_eq!(CellValue::parse("-35").into_numeric(), CellValue::Number(-35.0));
        assert_eq!(CellValue::parse("NaN").into_numeric(), CellValue::Text("NaN".to_string()));
        assert_eq!(CellValue::parse("EX").into_numeric(), CellValue::Text("EX".to_string()));
        assert_eq!(CellValue::Null.into_numeric(), CellValue::Null);
    }

    #[test]
    fn test_numeric_columns_leave_identifiers_alone() {
        let table = Table::new(
            vec!["Stock #".to_string(), "Cts".to_string()],
            vec![
                vec![CellValue::parse("00123"), CellValue::parse("1.0")],
                vec![CellValue::parse("1E3"), CellValue::parse("2.5")],
            ],
        )
        .with_numeric_columns(&[1]);

        assert_eq!(table.rows[0][0], CellValue::Text("00123".to_string()));
        assert_eq!(table.rows[1][0], CellValue::Text("1E3".to_string()));
        assert_eq!(table.rows[0][1], CellValue::Number(1.0));
        assert_eq!(table.rows[1][1], CellValue::Number(2.5));
    }

    #[test]
    fn test_cell_past_short_row_is_null() {
        let row = vec![CellValue::Number(1.0)];
        assert_eq!(cell(&row, 0), &CellValue::Number(1.0));
        assert_eq!(cell(&row, 5), &CellValue::Null);
    }

    #[test]
    fn test_cell_text_view() {
        assert_eq!(CellValue::Number(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(CellValue::Number(3.5).as_text().as_deref(), Some("3.5"));
        assert_eq!(CellValue::Text("  GIA ".to_string()).as_text().as_deref(), Some("GIA"));
        assert_eq!(CellValue::Text("  ".to_string()).as_text(), None);
        assert_eq!(CellValue::Null.as_text(), None);
    }

    #[test]
    fn test_table_new_pads_short_rows() {
        let table = Table::new(
            vec!["A".to_string(), "B".to_string()],
            vec![vec![CellValue::Number(1.0)]],
        );
        assert_eq!(table.rows[0], vec![CellValue::Number(1.0), CellValue::Null]);
    }

    #[test]
    fn test_retain_copy_leaves_source_untouched() {
        let table = Table::new(
            vec!["Cts".to_string()],
            vec![vec![CellValue::Number(1.0)], vec![CellValue::Number(2.0)]],
        );
        let filtered = table.retain_copy(|row| row[0].as_f64() == Some(2.0));

        assert_eq!(filtered.row_count(), 1);
        assert_eq!(table.row_count(), 2);
        assert_eq!(filtered.columns, table.columns);
    }

    #[test]
    fn test_cell_value_serialization() {
        let cells = vec![CellValue::Number(1.5), CellValue::Text("RD".to_string()), CellValue::Null];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[1.5,"RD",null]"#);
    }
}
