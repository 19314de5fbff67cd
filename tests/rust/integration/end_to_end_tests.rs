//! Integration tests for a full pipeline run
//!
//! Raw extracts are written to a temporary base directory, registered, and
//! pushed through every stage. Assertions read the files the bulk loader
//! would receive.

#[cfg(test)]
mod end_to_end_tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::Path;

    use resnet_graph::artifacts::{keys, ArtifactStore};
    use resnet_graph::normalize::PATHOLOGICAL_NODE_ID;
    use resnet_graph::{run_stages, PipelineConfig, PipelineContext, Stage, StageOptions};

    const DIRECTIONAL: &str = "1|10|Regulation|positive||3|20|1|||||||||NCT01|phase1\n";
    const BIDIRECTIONAL: &str = "2||[30,40]|Binding|bidirectional|||1||2||||||||\n";
    const ATTRIBUTE: &str = "3|60|99|Expression|70\n";

    fn write_raw_extracts(base: &Path) {
        fs::write(base.join("directional_rels_raw.txt"), DIRECTIONAL).unwrap();
        fs::write(base.join("bidirectional_rels_raw.txt"), BIDIRECTIONAL).unwrap();
        fs::write(base.join("attribute_rels_raw.txt"), ATTRIBUTE).unwrap();
        fs::write(
            base.join("nodes_raw.txt"),
            format!(
                "10|TP53|Protein\n20|Apoptosis;;cell death|CellProcess\n{}|\"30|Embedded|protein\n40|Other|Disease\"|Protein\n",
                PATHOLOGICAL_NODE_ID
            ),
        )
        .unwrap();
    }

    fn context(base: &Path) -> PipelineContext {
        PipelineContext::open(PipelineConfig::default().with_base_path(base)).unwrap()
    }

    fn field_set(lines: &[Vec<String>], idx: usize) -> BTreeSet<String> {
        lines.iter().map(|fields| fields[idx].clone()).collect()
    }

    fn read_lines(path: &Path) -> Vec<Vec<String>> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| line.split('|').map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_all_stages_produce_loader_files() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write_raw_extracts(base);

        let mut ctx = context(base);
        run_stages(&mut ctx, &[Stage::All], &StageOptions::default()).unwrap();

        let relations = read_lines(&base.join("relations.txt"));
        assert_eq!(relations.len(), 3);
        assert!(relations.iter().all(|fields| fields.len() == 17));

        let set = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<BTreeSet<_>>();
        assert_eq!(field_set(&relations, 1), set(&["10", "30", "60"]));
        assert_eq!(field_set(&relations, 6), set(&["20", "40", "70"]));
        assert_eq!(
            field_set(&relations, 2),
            set(&["REGULATION", "BINDING", "EXPRESSION"])
        );
        assert_eq!(field_set(&relations, 5), set(&["3", "1", "0"]));
        for fields in &relations {
            for field in fields {
                assert!(!field.is_empty());
                assert_ne!(field, "None");
                assert_ne!(field, "nan");
            }
        }
        assert_eq!(
            relations[0].join("|"),
            "1|10|REGULATION|positive|_|3|20|_|_|_|_|_|_|_|_|NCT01|phase1"
        );

        let header = fs::read_to_string(base.join("relations_header.txt")).unwrap();
        assert!(header.starts_with("msrc_id|:START_ID|type:TYPE|effect|mechanism|ref_count:int|:END_ID|"));
        assert!(header.trim_end().ends_with("|nct_id|phase"));

        let nodes = fs::read_to_string(base.join("nodes.txt")).unwrap();
        assert_eq!(
            nodes,
            "10|TP53|PROTEIN\n20|Apoptosis:cell death|CELLPROCESS\n30|Embedded|PROTEIN\n40|Other|DISEASE\n"
        );
        assert_eq!(
            fs::read_to_string(base.join("nodes_header.txt")).unwrap(),
            ":ID|name|:LABEL\n"
        );

        let store = ArtifactStore::load(base).unwrap();
        for key in [
            keys::DIRECTIONAL_RAW,
            keys::BIDIRECTIONAL_RAW,
            keys::ATTRIBUTE_RAW,
            keys::NODES_RAW,
            keys::DIRECTIONAL_PROCD,
            keys::BIDIRECTIONAL_PROCD,
            keys::ATTRIBUTE_PROCD,
            keys::RELATIONS,
            keys::RELATIONS_HEADER,
            keys::NODES,
            keys::NODES_HEADER,
        ] {
            let path = store.require(key).unwrap();
            assert!(path.is_absolute() && path.is_file(), "Bad entry for {}", key);
        }
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write_raw_extracts(base);

        let mut ctx = context(base);
        run_stages(&mut ctx, &[Stage::All], &StageOptions::default()).unwrap();
        let first = fs::read_to_string(base.join("relations.txt")).unwrap();

        // A fresh context sees the store written by the first run
        let mut ctx = context(base);
        let stages = [
            Stage::ProcessDirectionalRels,
            Stage::ConcatRelationshipFiles,
            Stage::ProcessNodeFile,
        ];
        run_stages(&mut ctx, &stages, &StageOptions::default()).unwrap();

        assert_eq!(fs::read_to_string(base.join("relations.txt")).unwrap(), first);
    }

    #[test]
    fn test_file_name_override() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write_raw_extracts(base);

        let mut ctx = context(base);
        run_stages(&mut ctx, &[Stage::RegisterRaw], &StageOptions::default()).unwrap();
        let options = StageOptions {
            file_name: Some("graph_nodes".to_string()),
            raw: Vec::new(),
        };
        run_stages(&mut ctx, &[Stage::ProcessNodeFile], &options).unwrap();

        assert!(base.join("graph_nodes.txt").is_file());
        assert!(!base.join("nodes.txt").exists());
        assert_eq!(
            ctx.store.require(keys::NODES).unwrap(),
            base.join("graph_nodes.txt")
        );
    }
}
