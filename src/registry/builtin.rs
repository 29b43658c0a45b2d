//! The built-in registration table
//!
//! Order here is the order of a full run.

use super::descriptor::{SourceDescriptor, TargetStage};
use crate::convert::Format;

pub(crate) fn sources() -> Vec<SourceDescriptor> {
    vec![
        // Human Phenotype Ontology
        SourceDescriptor::new("hp", Format::OboJson, TargetStage::OntologyGraph)
            .with_input("hp.json"),
        // Environment Ontology
        SourceDescriptor::new("envo", Format::OboJson, TargetStage::OntologyGraph)
            .with_input("envo.json"),
        // Anatomical Therapeutic Chemical classification, as distributed by BioPortal
        SourceDescriptor::new("atc", Format::Gzip, TargetStage::mapping("atc-classes.yaml"))
            .with_input("atc.csv.gz")
            .with_stage(Format::Gzip, Format::Csv),
        SourceDescriptor::new("chembl", Format::Turtle, TargetStage::OntologyGraph)
            .with_input("chembl_rdf.ttl")
            .with_stage(Format::Turtle, Format::NTriples),
    ]
}
