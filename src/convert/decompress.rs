//! Decompress: gzip archive → plain file

use super::staging::{commit, staging_file};
use super::traits::{ConversionResult, ConvertError, ConvertOptions, Converter};
use flate2::read::MultiGzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Expands a single-file gzip archive next to itself and deletes the archive.
///
/// `atc.csv.gz` becomes `atc.csv`. Decoding errors (corrupt or truncated
/// archives) surface as [`ConvertError::Decompression`] and leave no output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decompress;

impl Decompress {
    pub fn new() -> Self {
        Self
    }
}

/// Copy decoded bytes from `decoder` into `writer`. Read errors blame the
/// archive; write errors blame the output.
fn expand<R: Read, W: Write>(
    decoder: &mut R,
    writer: &mut W,
    input: &Path,
    output: &Path,
) -> Result<u64, ConvertError> {
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = match decoder.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(ConvertError::Decompression {
                    path: input.to_path_buf(),
                    source,
                })
            }
        };
        writer.write_all(&buf[..n]).map_err(ConvertError::io(output))?;
        total += n as u64;
    }
}

impl Converter for Decompress {
    fn id(&self) -> &str {
        "decompress"
    }

    fn output_path(&self, input: &Path) -> Result<PathBuf, ConvertError> {
        match input.extension().and_then(|ext| ext.to_str()) {
            Some("gz") | Some("gzip") => Ok(input.with_extension("")),
            _ => Err(ConvertError::UnsupportedInput {
                path: input.to_path_buf(),
                reason: "expected a .gz suffix".to_string(),
            }),
        }
    }

    fn convert(
        &self,
        input: &Path,
        output: &Path,
        _options: &ConvertOptions,
    ) -> Result<ConversionResult, ConvertError> {
        let file = File::open(input).map_err(ConvertError::io(input))?;
        let mut decoder = MultiGzDecoder::new(BufReader::new(file));

        let mut staged = staging_file(output).map_err(ConvertError::io(output))?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            expand(&mut decoder, &mut writer, input, output)?;
            writer.flush().map_err(ConvertError::io(output))?;
        }
        commit(staged, output).map_err(ConvertError::io(output))?;

        fs::remove_file(input).map_err(ConvertError::io(input))?;

        Ok(ConversionResult {
            output: output.to_path_buf(),
            input_removed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Format;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    const OPTIONS: ConvertOptions = ConvertOptions {
        from: Format::Gzip,
        to: Format::Csv,
    };

    fn write_gz(path: &Path, content: &str) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn output_path_strips_gz_suffix() {
        let out = Decompress.output_path(Path::new("raw/atc.csv.gz")).unwrap();
        assert_eq!(out, PathBuf::from("raw/atc.csv"));
    }

    #[test]
    fn output_path_rejects_uncompressed_names() {
        let err = Decompress.output_path(Path::new("raw/atc.csv")).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedInput { .. }));
    }

    #[test]
    fn expands_archive_and_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("atc.csv.gz");
        write_gz(&input, "code,name\nA01,Stomatological preparations\n");

        let output = Decompress.output_path(&input).unwrap();
        let result = Decompress.convert(&input, &output, &OPTIONS).unwrap();

        assert!(result.input_removed);
        assert!(!input.exists());
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "code,name\nA01,Stomatological preparations\n"
        );
    }

    #[test]
    fn corrupt_archive_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("atc.csv.gz");
        fs::write(&input, b"definitely not a gzip stream").unwrap();

        let output = Decompress.output_path(&input).unwrap();
        let err = Decompress.convert(&input, &output, &OPTIONS).unwrap_err();

        assert!(matches!(err, ConvertError::Decompression { .. }));
        assert!(!output.exists(), "no partial output may be left behind");
        assert!(input.exists(), "the archive is kept when decoding fails");
    }

    /// Accepts a few bytes, then behaves like a full disk.
    struct FullDisk {
        room: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.room == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            let n = buf.len().min(self.room);
            self.room -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_blames_the_output_not_the_archive() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("atc.csv.gz");
        write_gz(&input, &"A01,Stomatological preparations\n".repeat(100));

        let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(&input).unwrap()));
        let output = dir.path().join("atc.csv");
        let err = expand(&mut decoder, &mut FullDisk { room: 16 }, &input, &output).unwrap_err();

        match err {
            ConvertError::Io { path, .. } => assert_eq!(path, output),
            other => panic!("expected an IO error on the output, got {:?}", other),
        }
    }

    #[test]
    fn read_failure_blames_the_archive() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("atc.csv.gz");
        fs::write(&input, b"definitely not a gzip stream").unwrap();

        let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(&input).unwrap()));
        let mut sink = Vec::new();
        let err = expand(&mut decoder, &mut sink, &input, Path::new("atc.csv")).unwrap_err();
        assert!(matches!(err, ConvertError::Decompression { ref path, .. } if path == &input));
    }

    #[test]
    fn missing_archive_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("absent.csv.gz");
        let output = Decompress.output_path(&input).unwrap();

        let err = Decompress.convert(&input, &output, &OPTIONS).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }
}
