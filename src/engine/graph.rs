//! KgxConverter: serialized graph → KGX node/edge tables

use super::kgx::GraphBuilder;
use super::traits::{EngineError, GraphEngine, GraphRequest, OutputTables};
use super::{ntriples, obograph};
use crate::convert::Format;
use tracing::info;

/// Built-in graph conversion engine for OBO Graph JSON and N-Triples.
///
/// All inputs of one request are merged into a single pair of tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct KgxConverter;

impl KgxConverter {
    pub fn new() -> Self {
        Self
    }
}

impl GraphEngine for KgxConverter {
    fn transform(&self, request: &GraphRequest<'_>) -> Result<OutputTables, EngineError> {
        let mut builder = GraphBuilder::new(request.source);
        for input in request.inputs {
            match request.input_format {
                Format::OboJson => obograph::load(&input.path, &mut builder)?,
                Format::NTriples => ntriples::load(&input.path, &mut builder)?,
                other => return Err(EngineError::UnsupportedFormat(other)),
            }
        }
        info!(
            source = request.source,
            format = %request.input_format,
            output_format = request.output_format.as_str(),
            nodes = builder.node_count(),
            edges = builder.edge_count(),
            "writing graph tables"
        );
        builder.write(request.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MappingArtifact, OutputFormat};
    use std::fs;

    #[test]
    fn unsupported_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("table.csv");
        fs::write(&input, "a,b\n").unwrap();
        let artifacts = vec![MappingArtifact::new(&input, Format::Csv, "x")];

        let request = GraphRequest {
            source: "x",
            inputs: &artifacts,
            input_format: Format::Csv,
            output_dir: &dir.path().join("out"),
            output_format: OutputFormat::Tsv,
        };
        let err = KgxConverter.transform(&request).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedFormat(Format::Csv)));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn inputs_are_merged_into_one_table_pair() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.nt");
        let b = dir.path().join("b.nt");
        fs::write(&a, "<http://x.org/a> <http://x.org/p> <http://x.org/b> .\n").unwrap();
        fs::write(&b, "<http://x.org/b> <http://x.org/p> <http://x.org/c> .\n").unwrap();
        let artifacts = vec![
            MappingArtifact::new(&a, Format::NTriples, "merged"),
            MappingArtifact::new(&b, Format::NTriples, "merged"),
        ];

        let out = dir.path().join("merged");
        let request = GraphRequest {
            source: "merged",
            inputs: &artifacts,
            input_format: Format::NTriples,
            output_dir: &out,
            output_format: OutputFormat::Tsv,
        };
        let tables = KgxConverter.transform(&request).unwrap();
        assert_eq!(tables.node_rows, 2);
        assert_eq!(tables.edge_rows, 2);
        assert_eq!(tables.nodes, out.join("nodes.tsv"));
        assert!(fs::read_to_string(&tables.edges).unwrap().contains("\thttp://x.org/a\t"));
    }
}
