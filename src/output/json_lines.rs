//! Line-delimited JSON writer.
//!
//! Each record is written as one line followed by a comma:
//! ```text
//! {"author":"bob","body_xml":"hi",...},
//! {"author":"alice","body_xml":"hello",...},
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{DbbError, Result};

/// Buffered writer of `line,\n` records.
pub struct JsonLinesWriter<W: Write> {
    inner: BufWriter<W>,
    lines: u64,
}

impl JsonLinesWriter<File> {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| DbbError::open(path, e))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: BufWriter::new(writer),
            lines: 0,
        }
    }

    /// Writes one rendered record.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b",\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| DbbError::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_trailing_comma_per_line() {
        let mut writer = JsonLinesWriter::new(Vec::new());
        writer.write_line(r#"{"a":1}"#).unwrap();
        writer.write_line(r#"{"a":2}"#).unwrap();
        assert_eq!(writer.lines(), 2);
        let out = writer.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"a\":1},\n{\"a\":2},\n");
    }

    #[test]
    fn test_create_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alice.js");
        let mut writer = JsonLinesWriter::create(&path).unwrap();
        writer.write_line("{}").unwrap();
        writer.finish().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{},\n");
    }

    #[test]
    fn test_create_in_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let err = JsonLinesWriter::create(dir.path().join("no/such/alice.js"))
            .err()
            .unwrap();
        assert!(err.is_open());
    }
}
