//! JSON Lines record reader.
//!
//! A record file carries one channel-tagged [`TelemetrySample`] per line, in
//! the time order the messages occurred. Lines that fail to decode are logged,
//! counted, and skipped; the pipeline never sees them.

use crate::reader::types::TelemetrySample;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Streaming reader over one record file.
pub struct RecordReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: u64,
    malformed_lines: u64,
}

impl RecordReader {
    /// Open a record file for streaming.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
            malformed_lines: 0,
        })
    }

    /// Path of the record file being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines that failed to decode so far.
    pub fn malformed_lines(&self) -> u64 {
        self.malformed_lines
    }

    /// Pull the next decodable sample, skipping malformed lines.
    ///
    /// Returns `None` at end of file. An I/O error while reading a line is
    /// treated the same as a malformed line: the reader warns and moves on.
    pub fn next_sample(&mut self) -> Option<TelemetrySample> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.line_no += 1;
                    self.malformed_lines += 1;
                    warn!(path = %self.path.display(), line = self.line_no, error = %e,
                          "unreadable record line, skipping");
                    continue;
                }
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<TelemetrySample>(&line) {
                Ok(sample) => return Some(sample),
                Err(e) => {
                    self.malformed_lines += 1;
                    warn!(path = %self.path.display(), line = self.line_no, error = %e,
                          "malformed record line, skipping");
                }
            }
        }
    }
}

impl Iterator for RecordReader {
    type Item = TelemetrySample;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::types::{ChassisSample, LocalizationSample};
    use uuid::Uuid;

    fn write_record_file(lines: &[&str]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("drivelog-reader-test-{}.jsonl", Uuid::new_v4()));
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_reads_samples_in_order() {
        let loc = serde_json::to_string(&TelemetrySample::Localization(
            LocalizationSample::default(),
        ))
        .unwrap();
        let chassis =
            serde_json::to_string(&TelemetrySample::Chassis(ChassisSample::default())).unwrap();

        let path = write_record_file(&[&loc, &chassis, &loc]);
        let mut reader = RecordReader::open(&path).unwrap();

        assert!(matches!(
            reader.next_sample(),
            Some(TelemetrySample::Localization(_))
        ));
        assert!(matches!(
            reader.next_sample(),
            Some(TelemetrySample::Chassis(_))
        ));
        assert!(matches!(
            reader.next_sample(),
            Some(TelemetrySample::Localization(_))
        ));
        assert!(reader.next_sample().is_none());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_skips_malformed_and_blank_lines() {
        let loc = serde_json::to_string(&TelemetrySample::Localization(
            LocalizationSample::default(),
        ))
        .unwrap();

        let path = write_record_file(&["{not json", "", &loc, "{\"channel\":\"unknown\"}"]);
        let mut reader = RecordReader::open(&path).unwrap();

        assert!(matches!(
            reader.next_sample(),
            Some(TelemetrySample::Localization(_))
        ));
        assert!(reader.next_sample().is_none());
        assert_eq!(reader.malformed_lines(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_open_missing_file_fails() {
        assert!(RecordReader::open("/nonexistent/drivelog-record.jsonl").is_err());
    }
}
