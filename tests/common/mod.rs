//! Shared fixtures for the pipeline integration tests
//!
//! A `Workspace` is a temporary raw/output directory pair wired to the
//! mapping configurations shipped in `config/`.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use kg_enp::{
    ConverterRegistry, SourceDescriptor, SourceRegistry, ToolConfig, TransformDispatcher,
};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub const HP_JSON: &str = r#"{
  "graphs": [{
    "id": "http://purl.obolibrary.org/obo/hp.owl",
    "nodes": [
      { "id": "http://purl.obolibrary.org/obo/HP_0000118", "lbl": "Phenotypic abnormality", "type": "CLASS",
        "meta": { "definition": { "val": "A phenotypic abnormality." } } },
      { "id": "http://purl.obolibrary.org/obo/HP_0001507", "lbl": "Growth abnormality", "type": "CLASS" },
      { "id": "http://purl.obolibrary.org/obo/HP_0004322", "lbl": "Short stature", "type": "CLASS" }
    ],
    "edges": [
      { "sub": "http://purl.obolibrary.org/obo/HP_0001507", "pred": "is_a", "obj": "http://purl.obolibrary.org/obo/HP_0000118" },
      { "sub": "http://purl.obolibrary.org/obo/HP_0004322", "pred": "is_a", "obj": "http://purl.obolibrary.org/obo/HP_0001507" }
    ]
  }]
}"#;

/// BioPortal export layout; the last row repeats the one before it.
pub const ATC_CSV: &str = "\
Class ID,Preferred Label,Synonyms,Definitions,Obsolete,CUI,Semantic Types,Parents
http://purl.bioontology.org/ontology/UATC/A,ALIMENTARY TRACT AND METABOLISM,,,false,C0002495,,
http://purl.bioontology.org/ontology/UATC/A01,STOMATOLOGICAL PREPARATIONS,,,false,C0304587,,http://purl.bioontology.org/ontology/UATC/A
http://purl.bioontology.org/ontology/UATC/A01A,STOMATOLOGICAL PREPARATIONS,,,false,C3653427,,http://purl.bioontology.org/ontology/UATC/A01
http://purl.bioontology.org/ontology/UATC/A01A,STOMATOLOGICAL PREPARATIONS,,,false,C3653427,,http://purl.bioontology.org/ontology/UATC/A01
";

pub const CHEMBL_TTL: &str = r#"@prefix cco: <http://rdf.ebi.ac.uk/terms/chembl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://rdf.ebi.ac.uk/resource/chembl/molecule/CHEMBL25> a cco:SmallMolecule ;
    rdfs:label "ASPIRIN" ;
    cco:hasTarget <http://rdf.ebi.ac.uk/resource/chembl/target/CHEMBL2094253> .
"#;

pub struct Workspace {
    _dir: tempfile::TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input_dir = dir.path().join("raw");
        let output_dir = dir.path().join("transformed");
        fs::create_dir_all(&input_dir).expect("create input dir");
        Self {
            _dir: dir,
            input_dir,
            output_dir,
        }
    }

    pub fn raw(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.input_dir.join(name);
        fs::write(&path, content).expect("write raw input");
        path
    }

    pub fn raw_gz(&self, name: &str, content: &str) -> PathBuf {
        let path = self.input_dir.join(name);
        let file = File::create(&path).expect("create gz");
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes()).expect("write gz");
        encoder.finish().expect("finish gz");
        path
    }

    /// Every built-in raw input, valid.
    pub fn with_builtin_inputs(self) -> Self {
        self.raw("hp.json", HP_JSON.as_bytes());
        self.raw("envo.json", HP_JSON.replace("HP_", "ENVO_").as_bytes());
        self.raw_gz("atc.csv.gz", ATC_CSV);
        self.raw("chembl_rdf.ttl", CHEMBL_TTL.as_bytes());
        self
    }

    pub fn source_dir(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn read_table(&self, source: &str, table: &str) -> String {
        fs::read_to_string(self.source_dir(source).join(table)).expect("read table")
    }
}

/// The mapping configurations shipped with the crate.
pub fn mapping_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config")
}

/// Built-in sources plus `extra`, default converters with `tool`.
pub fn dispatcher_with(extra: Vec<SourceDescriptor>, tool: ToolConfig) -> TransformDispatcher {
    let registry = SourceRegistry::with_extra(extra).expect("valid registry");
    TransformDispatcher::new(registry, ConverterRegistry::with_defaults(tool))
        .expect("every stage has a converter")
        .with_mapping_dir(mapping_dir())
}

pub fn dispatcher() -> TransformDispatcher {
    dispatcher_with(Vec::new(), ToolConfig::default())
}

pub fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Relative path → (mtime, bytes) for every file under `root`.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, (SystemTime, Vec<u8>)> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let meta = e.metadata().expect("metadata");
            let rel = e.path().strip_prefix(root).expect("under root").to_path_buf();
            let bytes = fs::read(e.path()).expect("read file");
            (rel, (meta.modified().expect("mtime"), bytes))
        })
        .collect()
}

/// Data rows of a TSV table (header excluded).
pub fn data_rows(table: &str) -> Vec<&str> {
    table.lines().skip(1).collect()
}
