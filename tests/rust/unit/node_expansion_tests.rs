//! Unit tests for node normalization
//!
//! Covers the embedded sub-table repair and the guarantee that no written
//! name contains the output delimiter.

#[cfg(test)]
mod node_expansion_tests {
    use resnet_graph::normalize::nodes::remap_names;
    use resnet_graph::normalize::{normalize_nodes, PATHOLOGICAL_NODE_ID};
    use resnet_graph::table::delimited::{parse_records, render_table};
    use resnet_graph::table::Value;
    use std::path::Path;

    fn raw_nodes(embedded: &str, k_extra_rows: usize) -> String {
        let mut text = String::new();
        for i in 0..k_extra_rows {
            text.push_str(&format!("{}|Node {}|Protein\n", i + 1, i + 1));
        }
        text.push_str(&format!(
            "{}|\"{}\"|Protein\n",
            PATHOLOGICAL_NODE_ID,
            embedded.replace('"', "\"\"")
        ));
        text
    }

    /// N rows with one pathological row embedding k records give N - 1 + k rows
    #[test]
    fn test_expansion_row_count() {
        let embedded = "900|Embedded A|SmallMol\n901|Embedded;B|disease\n902|Embedded C|CellProcess";
        let text = raw_nodes(embedded, 4);
        let records = parse_records(&text);
        assert_eq!(records.len(), 5);

        let table = normalize_nodes(records).unwrap();
        assert_eq!(table.len(), 5 - 1 + 3);
        assert!(table
            .column("id")
            .unwrap()
            .iter()
            .all(|id| id.as_id() != Some(PATHOLOGICAL_NODE_ID)));
        assert_eq!(table.get(5, "name").unwrap(), Some(&Value::text("Embedded:B")));
        assert_eq!(table.get(5, "label").unwrap(), Some(&Value::text("DISEASE")));
    }

    #[test]
    fn test_malformed_sub_records_are_skipped() {
        let embedded = "900|A|Protein\n901|only two\n|||\n902|C|Protein";
        let table = normalize_nodes(parse_records(&raw_nodes(embedded, 1))).unwrap();
        let ids: Vec<_> = table.column("id").unwrap().iter().filter_map(|v| v.as_id()).collect();
        assert_eq!(ids, vec![1, 900, 902]);
    }

    /// No delimiter, single or doubled, survives in a rendered name
    #[test]
    fn test_rendered_names_hold_no_delimiter() {
        let records = parse_records("1|\"a||b|c\"|Protein\n2|d;;e;f|Protein\n");
        let mut table = normalize_nodes(records).unwrap();
        remap_names(&mut table).unwrap();

        let rendered = render_table(&table, Path::new("nodes.txt")).unwrap();
        for line in rendered.lines() {
            assert_eq!(line.matches('|').count(), 2, "Bad line: {}", line);
        }
        assert_eq!(rendered, "1|a:b:c|PROTEIN\n2|d:e:f|PROTEIN\n");
    }

    #[test]
    fn test_label_upper_casing_is_idempotent() {
        let table = normalize_nodes(parse_records("1|x|Protein\n")).unwrap();
        let label = table.get(0, "label").unwrap().unwrap().as_text().unwrap();
        assert_eq!(label, "PROTEIN");
        assert_eq!(label.to_uppercase(), label);
    }

    #[test]
    fn test_non_numeric_node_id_fails() {
        let err = normalize_nodes(parse_records("abc|x|Protein\n")).unwrap_err();
        assert_eq!(err.kind().as_str(), "type_coercion");
    }
}
