//! Converter trait, the contract every conversion stage implements
//!
//! A converter declares where its output goes for a given input and turns
//! the input into that output. The output path must be a pure function of
//! the input path: the stage cache decides whether to run a stage by
//! looking at that path alone.

use super::format::Format;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by a conversion stage.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot decompress {}: {source}", .path.display())]
    Decompression {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse graph {}: {message}", .path.display())]
    GraphParse { path: PathBuf, message: String },

    #[error("external tool '{tool}' failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("unsupported input {}: {reason}", .path.display())]
    UnsupportedInput { path: PathBuf, reason: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when the failure means the environment is unusable rather than
    /// the data being bad. Fatal errors stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ExternalTool { .. })
    }
}

/// `input` with `.ext` appended to its full file name, so `x.ttl` and
/// `x.rdf` never share an output.
pub(crate) fn appended_extension(input: &Path, ext: &str) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Options handed to a converter for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub from: Format,
    pub to: Format,
}

/// What a successful conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub output: PathBuf,
    /// The converter deleted its input after writing the output
    pub input_removed: bool,
}

/// The contract converters implement.
///
/// Implementations must write their output atomically: either the complete
/// output appears at `output` or nothing does.
pub trait Converter: Send + Sync {
    /// Stable identifier used in logs and failure reports
    fn id(&self) -> &str;

    /// The output path this converter produces for `input`.
    ///
    /// Deterministic: the same input always maps to the same output.
    fn output_path(&self, input: &Path) -> Result<PathBuf, ConvertError>;

    /// Convert `input` into `output`.
    fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: &ConvertOptions,
    ) -> Result<ConversionResult, ConvertError>;
}

/// One planned conversion: which converter runs on which file.
///
/// Built per invocation and dropped once the stage has run or been skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionStage {
    pub from: Format,
    pub to: Format,
    pub input: PathBuf,
    pub output: PathBuf,
    pub converter: String,
}

impl ConversionStage {
    /// Plan a stage for `input`, asking the converter for its output path.
    pub fn plan(
        converter: &dyn Converter,
        from: Format,
        to: Format,
        input: impl Into<PathBuf>,
    ) -> Result<Self, ConvertError> {
        let input = input.into();
        let output = converter.output_path(&input)?;
        Ok(Self {
            from,
            to,
            input,
            output,
            converter: converter.id().to_string(),
        })
    }

    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            from: self.from,
            to: self.to,
        }
    }

    /// Run the planned conversion.
    pub fn execute(&self, converter: &dyn Converter) -> Result<ConversionResult, ConvertError> {
        converter.convert(&self.input, &self.output, &self.options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SuffixConverter;

    impl Converter for SuffixConverter {
        fn id(&self) -> &str {
            "suffix"
        }

        fn output_path(&self, input: &Path) -> Result<PathBuf, ConvertError> {
            Ok(input.with_extension("out"))
        }

        fn convert(
            &self,
            _input: &Path,
            output: &Path,
            _options: &ConvertOptions,
        ) -> Result<ConversionResult, ConvertError> {
            Ok(ConversionResult {
                output: output.to_path_buf(),
                input_removed: false,
            })
        }
    }

    #[test]
    fn planned_output_is_deterministic() {
        let plan =
            || ConversionStage::plan(&SuffixConverter, Format::Csv, Format::Tsv, "data/a.csv");
        let (a, b) = (plan().unwrap(), plan().unwrap());
        assert_eq!(a, b);
        assert_eq!(a.output, PathBuf::from("data/a.out"));
        assert_eq!(a.converter, "suffix");
    }

    #[test]
    fn appended_extension_keeps_the_original_one() {
        assert_eq!(
            appended_extension(Path::new("raw/x.ttl"), "nt"),
            PathBuf::from("raw/x.ttl.nt")
        );
        assert_ne!(
            appended_extension(Path::new("x.ttl"), "nt"),
            appended_extension(Path::new("x.rdf"), "nt")
        );
    }

    #[test]
    fn only_external_tool_errors_are_fatal() {
        let tool = ConvertError::ExternalTool {
            tool: "robot".into(),
            message: "not found".into(),
        };
        let parse = ConvertError::GraphParse {
            path: "x.ttl".into(),
            message: "bad".into(),
        };
        let gz = ConvertError::Decompression {
            path: "x.gz".into(),
            source: io::Error::new(io::ErrorKind::InvalidData, "corrupt"),
        };
        assert!(tool.is_fatal());
        assert!(!parse.is_fatal());
        assert!(!gz.is_fatal());
    }
}
