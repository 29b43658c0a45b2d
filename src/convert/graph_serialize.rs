//! GraphSerialize: RDF document → N-Triples

use super::format::Format;
use super::staging::{commit, staging_file};
use super::traits::{
    appended_extension, ConversionResult, ConvertError, ConvertOptions, Converter,
};
use oxrdfio::{RdfFormat, RdfParser, RdfSerializer};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Re-serializes an RDF graph (Turtle, RDF/XML) as line-oriented N-Triples.
///
/// `chembl_rdf.ttl` becomes `chembl_rdf.ttl.nt`. The triples are streamed into a
/// staged file; a parse error anywhere in the input discards it, so the
/// output path only ever holds a complete serialization.
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphSerialize;

impl GraphSerialize {
    pub fn new() -> Self {
        Self
    }
}

fn rdf_format(format: Format) -> Option<RdfFormat> {
    match format {
        Format::Turtle => Some(RdfFormat::Turtle),
        Format::RdfXml => Some(RdfFormat::RdfXml),
        Format::NTriples => Some(RdfFormat::NTriples),
        _ => None,
    }
}

impl Converter for GraphSerialize {
    fn id(&self) -> &str {
        "graph-serialize"
    }

    fn output_path(&self, input: &Path) -> Result<PathBuf, ConvertError> {
        Ok(appended_extension(input, "nt"))
    }

    fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: &ConvertOptions,
    ) -> Result<ConversionResult, ConvertError> {
        let unsupported = |format: Format| ConvertError::UnsupportedInput {
            path: input.to_path_buf(),
            reason: format!("{} is not an RDF serialization", format),
        };
        let from = rdf_format(options.from).ok_or_else(|| unsupported(options.from))?;
        let to = rdf_format(options.to).ok_or_else(|| unsupported(options.to))?;

        let reader = BufReader::new(File::open(input).map_err(ConvertError::io(input))?);
        let mut staged = staging_file(output).map_err(ConvertError::io(output))?;
        {
            let mut serializer =
                RdfSerializer::from_format(to).for_writer(BufWriter::new(staged.as_file_mut()));
            for quad in RdfParser::from_format(from).for_reader(reader) {
                let quad = quad.map_err(|e| ConvertError::GraphParse {
                    path: input.to_path_buf(),
                    message: e.to_string(),
                })?;
                serializer
                    .serialize_quad(&quad)
                    .map_err(ConvertError::io(output))?;
            }
            let mut writer = serializer.finish().map_err(ConvertError::io(output))?;
            writer.flush().map_err(ConvertError::io(output))?;
        }
        commit(staged, output).map_err(ConvertError::io(output))?;

        Ok(ConversionResult {
            output: output.to_path_buf(),
            input_removed: false,
        })
    }
}
