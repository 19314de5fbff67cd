//! Unit tests for raw extract reading and composite key decoding
//!
//! Extract files come from an external writer; these cases make sure odd but
//! valid input binds to the fixed layouts and that bad input fails cleanly.

#[cfg(test)]
mod raw_reader_tests {
    use resnet_graph::errors::ErrorKind;
    use resnet_graph::normalize::{decode, RelationshipKind};
    use resnet_graph::table::delimited::parse_records;

    /// Composite key inputs and their decoded pair
    #[test]
    fn test_composite_key_cases() {
        let test_cases = vec![
            ("[123, 456]", ("123", "456")),
            ("[  7 ,8]", ("7", "8")),  // Uneven spacing
            ("123,456", ("123", "456")),  // No brackets
            ("[[1], [2]]", ("1", "2")),  // Nested brackets are all stripped
        ];

        for (input, (first, second)) in test_cases {
            let (a, b) = decode(input).unwrap();
            assert_eq!((a.as_str(), b.as_str()), (first, second), "Failed for input: {}", input);
        }
    }

    #[test]
    fn test_composite_key_rejects() {
        for input in ["[1, 2, 3]", "[42]", "[]", "[1,,2]"] {
            assert!(decode(input).is_err(), "Accepted malformed key: {}", input);
        }
    }

    /// Raw text as the extractor writes it binds to the 18-column layout
    #[test]
    fn test_bidirectional_extract_binds() {
        let text = "2||[30,40]|Binding|bidirectional|||1||2||||||||\r\n\r\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 18);

        let table = RelationshipKind::Bidirectional.normalize(records).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "start_id").unwrap().unwrap().as_id(), Some(30));
        assert_eq!(table.get(0, "end_id").unwrap().unwrap().as_id(), Some(40));
    }

    #[test]
    fn test_short_record_is_schema_error() {
        let records = parse_records("3|60|99|Expression\n");
        let err = RelationshipKind::Attribute.normalize(records).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaAssignment);
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_malformed_key_names_column() {
        let records = parse_records("2||[30,40,50]|Binding|bidirectional|||1||2||||||||\n");
        let err = RelationshipKind::Bidirectional.normalize(records).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedKey);
        assert!(err.to_string().contains("inOutkey"));
    }

    /// A quoted cell keeps its line breaks and pipes
    #[test]
    fn test_quoted_cell_survives() {
        let text = "1|\"5|Five|Drug\n6|\"\"Six\"\"|Drug\"|Protein\n2|b|Disease\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0][1].as_deref(),
            Some("5|Five|Drug\n6|\"Six\"|Drug")
        );
        assert_eq!(records[1][0].as_deref(), Some("2"));
    }
}
