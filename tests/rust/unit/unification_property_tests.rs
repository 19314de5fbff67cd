//! Unit tests for relationship unification properties
//!
//! Row count never grows, exactly one missing representation survives and
//! upper-casing is stable.

#[cfg(test)]
mod unification_property_tests {
    use resnet_graph::normalize::{unify, RelationshipKind, RELATIONSHIP_SENTINEL};
    use resnet_graph::table::delimited::parse_records;
    use resnet_graph::table::{Table, Value};

    fn normalize(kind: RelationshipKind, text: &str) -> Table {
        kind.normalize(parse_records(text)).unwrap()
    }

    fn inputs() -> (Table, Table, Table) {
        let directional = normalize(
            RelationshipKind::Directional,
            "1|10|Regulation|positive||3|20|1|||||||||nct|phase1\n\
             1|10|Regulation|positive||3|20|1|||||||||nct|phase1\n\
             4|11|Binding|nan|None|2|21|4|||||nan|||||\n",
        );
        let bidirectional = normalize(
            RelationshipKind::Bidirectional,
            "2||[30,40]|Binding|bidirectional|||1||2||||||||\n",
        );
        let attribute = normalize(
            RelationshipKind::Attribute,
            "3|60|99|Expression|70\n\
             5|61|98|None|71\n\
             6|x|97|Expression|72\n\
             7|62|96||73\n",
        );
        (directional, bidirectional, attribute)
    }

    #[test]
    fn test_blank_attribute_fields_do_not_reach_unification() {
        let (d, b, _) = inputs();
        let attribute = normalize(
            RelationshipKind::Attribute,
            "3|60|99|Expression|70\n  |61|98|Expression|71\n4|61|98|   |71\n",
        );
        assert_eq!(attribute.len(), 1);

        let unified = unify(&d, &b, &attribute).unwrap();
        assert_eq!(unified.len(), 4);
    }

    #[test]
    fn test_row_count_never_grows() {
        let (d, b, a) = inputs();
        let unified = unify(&d, &b, &a).unwrap();
        assert!(unified.len() <= d.len() + b.len() + a.len());
        // one exact duplicate among the directional rows
        assert_eq!(unified.len(), 4);
    }

    #[test]
    fn test_only_sentinel_survives() {
        let (d, b, a) = inputs();
        let unified = unify(&d, &b, &a).unwrap();

        for row in unified.rows() {
            for value in row {
                match value {
                    Value::Missing => panic!("missing cell survived unification"),
                    Value::Text(text) => {
                        assert_ne!(text, "None");
                        assert_ne!(text, "nan");
                        assert!(!text.is_empty());
                    }
                    _ => {}
                }
            }
        }
        assert_eq!(
            unified.get(1, "effect").unwrap(),
            Some(&Value::text(RELATIONSHIP_SENTINEL))
        );
    }

    #[test]
    fn test_type_upper_casing_is_stable() {
        let (d, b, a) = inputs();
        let once = unify(&d, &b, &a).unwrap();
        let empty_b = Table::new(RelationshipKind::Bidirectional.normalized_schema());
        let empty_a = Table::new(RelationshipKind::Attribute.normalized_schema());

        let mut again_input = once.clone();
        again_input.relabel(RelationshipKind::Directional.normalized_schema()).unwrap();
        let twice = unify(&again_input, &empty_b, &empty_a).unwrap();

        assert_eq!(once.rows(), twice.rows());
        for value in twice.column("type").unwrap() {
            let text = value.as_text().unwrap();
            assert_eq!(text, text.to_uppercase());
        }
    }
}
