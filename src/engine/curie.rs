//! IRI → CURIE contraction

/// Namespaces contracted to a fixed prefix. Checked in order.
const NAMESPACES: &[(&str, &str)] = &[
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "rdf"),
    ("http://www.w3.org/2000/01/rdf-schema#", "rdfs"),
    ("http://www.w3.org/2002/07/owl#", "owl"),
    ("http://www.w3.org/2004/02/skos/core#", "skos"),
    ("http://purl.org/dc/terms/", "dcterms"),
    ("http://purl.org/dc/elements/1.1/", "dc"),
    ("http://www.geneontology.org/formats/oboInOwl#", "oboInOwl"),
    ("http://rdf.ebi.ac.uk/terms/chembl#", "chembl"),
    ("http://rdf.ebi.ac.uk/resource/chembl/molecule/", "CHEMBL.COMPOUND"),
    ("http://rdf.ebi.ac.uk/resource/chembl/target/", "CHEMBL.TARGET"),
    ("http://rdf.ebi.ac.uk/resource/chembl/assay/", "CHEMBL.ASSAY"),
    ("http://rdf.ebi.ac.uk/resource/chembl/document/", "CHEMBL.DOCUMENT"),
    ("http://purl.bioontology.org/ontology/UATC/", "ATC"),
];

const OBO_PURL: &str = "http://purl.obolibrary.org/obo/";

/// Contract an IRI to a CURIE where a known namespace applies.
///
/// OBO PURLs follow the `PREFIX_LOCAL` convention
/// (`…/obo/HP_0000118` → `HP:0000118`). Unknown IRIs come back unchanged.
pub fn contract(iri: &str) -> String {
    if let Some(local) = iri.strip_prefix(OBO_PURL) {
        if let Some((prefix, id)) = local.split_once('_') {
            if !prefix.is_empty() && !id.is_empty() && !prefix.contains(['/', '#']) {
                return format!("{}:{}", prefix, id);
            }
        }
    }
    for (namespace, prefix) in NAMESPACES {
        if let Some(local) = iri.strip_prefix(namespace) {
            if !local.is_empty() {
                return format!("{}:{}", prefix, local);
            }
        }
    }
    iri.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obo_purls_become_curies() {
        assert_eq!(contract("http://purl.obolibrary.org/obo/HP_0000118"), "HP:0000118");
        assert_eq!(contract("http://purl.obolibrary.org/obo/RO_0002202"), "RO:0002202");
    }

    #[test]
    fn obo_purls_without_local_id_are_kept() {
        let iri = "http://purl.obolibrary.org/obo/hp#has_synonym_type";
        assert_eq!(contract(iri), iri);
    }

    #[test]
    fn known_namespaces_use_their_prefix() {
        assert_eq!(
            contract("http://rdf.ebi.ac.uk/resource/chembl/molecule/CHEMBL25"),
            "CHEMBL.COMPOUND:CHEMBL25"
        );
        assert_eq!(contract("http://www.w3.org/2000/01/rdf-schema#label"), "rdfs:label");
        assert_eq!(contract("https://example.org/thing"), "https://example.org/thing");
    }
}
