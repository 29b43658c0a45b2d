//! OntologyConvert: ontology serialization conversion via an external toolkit
//!
//! Shells out to ROBOT (`robot convert --input <in> --output <out>`). The
//! toolkit picks the output serialization from the output file extension.

use super::staging::{commit, staging_file_with_suffix};
use super::traits::{
    appended_extension, ConversionResult, ConvertError, ConvertOptions, Converter,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// How to invoke the ontology toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Executable name or path
    pub command: String,
    /// Arguments placed before the `convert` subcommand (e.g. JVM options
    /// for a wrapper script)
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            command: "robot".to_string(),
            args: Vec::new(),
        }
    }
}

/// Converts an ontology (OWL, OBO) to OBO Graph JSON with the external toolkit.
///
/// Any failure here is a [`ConvertError::ExternalTool`], which stops the run.
#[derive(Debug, Clone, Default)]
pub struct OntologyConvert {
    tool: ToolConfig,
}

impl OntologyConvert {
    pub fn new(tool: ToolConfig) -> Self {
        Self { tool }
    }

    fn tool_error(&self, message: impl Into<String>) -> ConvertError {
        ConvertError::ExternalTool {
            tool: self.tool.command.clone(),
            message: message.into(),
        }
    }
}

/// Keep failure messages readable when the tool dumps a stack trace.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join("\n")
}

impl Converter for OntologyConvert {
    fn id(&self) -> &str {
        "ontology-convert"
    }

    fn output_path(&self, input: &Path) -> Result<PathBuf, ConvertError> {
        Ok(appended_extension(input, "json"))
    }

    fn convert(
        &self,
        input: &Path,
        output: &Path,
        _options: &ConvertOptions,
    ) -> Result<ConversionResult, ConvertError> {
        let staged = staging_file_with_suffix(output, ".json").map_err(ConvertError::io(output))?;

        debug!(
            tool = %self.tool.command,
            input = %input.display(),
            output = %staged.path().display(),
            "invoking ontology toolkit"
        );
        let result = Command::new(&self.tool.command)
            .args(&self.tool.args)
            .arg("convert")
            .arg("--input")
            .arg(input)
            .arg("--output")
            .arg(staged.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.tool_error(format!("cannot start: {}", e)))?;

        if !result.status.success() {
            let tail = stderr_tail(&result.stderr);
            return Err(self.tool_error(if tail.is_empty() {
                format!("exited with {}", result.status)
            } else {
                format!("exited with {}: {}", result.status, tail)
            }));
        }

        // The tool may replace the staged file rather than write into it, so
        // look at the path, not the open handle.
        let written = fs::metadata(staged.path()).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(self.tool_error(format!(
                "exited successfully but wrote no output for {}",
                input.display()
            )));
        }

        commit(staged, output).map_err(ConvertError::io(output))?;

        Ok(ConversionResult {
            output: output.to_path_buf(),
            input_removed: false,
        })
    }
}
