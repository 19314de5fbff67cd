//! Integration tests for stage failures
//!
//! A failing stage must report its error kind, leave earlier artifacts and
//! store entries untouched, write nothing partial, and succeed on rerun once
//! its input is fixed.

#[cfg(test)]
mod stage_recovery_tests {
    use std::fs;
    use std::path::Path;

    use resnet_graph::artifacts::{keys, ArtifactStore};
    use resnet_graph::extract::RawSource;
    use resnet_graph::pipeline::{
        concat_relationship_files, process_bi_directional_rels, process_directional_rels,
        process_node_file, register_raw,
    };
    use resnet_graph::{ErrorKind, PipelineConfig, PipelineContext};

    fn context(base: &Path) -> PipelineContext {
        PipelineContext::open(PipelineConfig::default().with_base_path(base)).unwrap()
    }

    #[test]
    fn test_missing_upstream_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());

        let err = process_directional_rels(&mut ctx, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingUpstreamArtifact);
        assert!(err.to_string().contains("directional_ds"));

        let err = process_node_file(&mut ctx, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingUpstreamArtifact);
    }

    #[test]
    fn test_malformed_key_keeps_earlier_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        let directional = base.join("d.txt");
        let bidirectional = base.join("b.txt");
        fs::write(&directional, "1|10|Regulation|positive||3|20|1|||||||||NCT01|phase1\n").unwrap();
        fs::write(&bidirectional, "2||[30,40,50]|Binding|bidirectional|||1||2||||||||\n").unwrap();

        let mut ctx = context(base);
        register_raw(
            &mut ctx,
            &[
                (RawSource::Directional, directional),
                (RawSource::Bidirectional, bidirectional.clone()),
            ],
        )
        .unwrap();
        let snapshot = process_directional_rels(&mut ctx, None).unwrap();

        let err = process_bi_directional_rels(&mut ctx, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedKey);
        assert!(!base.join("bidirectional_rels_procd.snapshot").exists());

        let store = ArtifactStore::load(base).unwrap();
        assert_eq!(store.require(keys::DIRECTIONAL_PROCD).unwrap(), snapshot);
        assert!(store.get(keys::BIDIRECTIONAL_PROCD).is_none());

        // Concatenation cannot run until every snapshot exists
        let err = concat_relationship_files(&mut ctx, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingUpstreamArtifact);

        fs::write(&bidirectional, "2||[30,40]|Binding|bidirectional|||1||2||||||||\n").unwrap();
        process_bi_directional_rels(&mut ctx, None).unwrap();
        assert!(base.join("bidirectional_rels_procd.snapshot").is_file());
    }

    #[test]
    fn test_unwritable_value_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        let nodes = base.join("nodes_raw.txt");
        fs::write(&nodes, "1|\"two\nlines\"|Protein\n").unwrap();

        let mut ctx = context(base);
        register_raw(&mut ctx, &[(RawSource::Node, nodes)]).unwrap();

        let err = process_node_file(&mut ctx, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageIo);
        assert!(!base.join("nodes.txt").exists());
        assert!(ctx.store.get(keys::NODES).is_none());

        // Only the store file and the raw extract remain
        let mut names: Vec<_> = fs::read_dir(base)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["file_paths.json", "nodes_raw.txt"]);
    }

    #[test]
    fn test_directional_missing_ref_count_fails() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        let raw = base.join("d.txt");
        fs::write(&raw, "1|10|Regulation|positive|||20|1|||||||||NCT01|phase1\n").unwrap();

        let mut ctx = context(base);
        register_raw(&mut ctx, &[(RawSource::Directional, raw)]).unwrap();
        let err = process_directional_rels(&mut ctx, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);
        assert!(err.to_string().contains("ref_count"));
    }
}
