//! Archive payload reading.
//!
//! Vendor exports frequently arrive as zip containers holding many small
//! JSON/YAML files. [`ZipReader`] exposes them as `(name, text)` pairs
//! filtered by glob patterns. Matched names are visited in sorted order so
//! a run is reproducible, but importers must not depend on any particular
//! order — they accumulate by name, never by position. Entries that fail
//! to decode are skipped with a warning; one bad file never aborts an
//! import.

use std::io::{Cursor, Read};

use glob::{MatchOptions, Pattern};
use tracing::warn;
use zip::ZipArchive;

use crate::import::ImportError;

/// Glob-filtered reader over an in-memory zip payload.
#[derive(Debug)]
pub struct ZipReader {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl ZipReader {
    /// Open a zip payload. A payload that is not a zip archive at all is
    /// an [`ImportError::UnrecognizedFormat`].
    pub fn new(bytes: Vec<u8>) -> Result<Self, ImportError> {
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(|err| {
            ImportError::UnrecognizedFormat(format!("not a zip archive: {err}"))
        })?;
        Ok(Self { archive })
    }

    fn match_options() -> MatchOptions {
        MatchOptions {
            // `*` must not cross directory boundaries; `**` still does.
            require_literal_separator: true,
            ..MatchOptions::new()
        }
    }

    /// Entry names matching any of the glob patterns, sorted. Directory
    /// entries and unparseable patterns are ignored.
    pub fn file_names(&self, patterns: &[&str]) -> Vec<String> {
        let compiled: Vec<Pattern> = patterns
            .iter()
            .filter_map(|pattern| Pattern::new(pattern).ok())
            .collect();
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| {
                !name.ends_with('/')
                    && compiled
                        .iter()
                        .any(|pattern| pattern.matches_with(name, Self::match_options()))
            })
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// Decoded text of every entry matching the patterns. Entries that
    /// fail to decode are skipped.
    pub fn texts(&mut self, patterns: &[&str]) -> Vec<(String, String)> {
        let names = self.file_names(patterns);
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            match self.read_text(&name) {
                Ok(text) => out.push((name, text)),
                Err(err) => warn!("Skipping unreadable archive entry {}: {}", name, err),
            }
        }
        out
    }

    pub fn read_text(&mut self, name: &str) -> Result<String, ImportError> {
        let mut file = self.archive.by_name(name)?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_single_star_does_not_cross_directories() {
        let bytes = build_zip(&[
            ("intents/a/a.json", "{}"),
            ("intents/a/trainingPhrases/en.json", "{}"),
            ("agent.json", "{}"),
        ]);
        let reader = ZipReader::new(bytes).unwrap();
        assert_eq!(reader.file_names(&["intents/*/*.json"]), vec![
            "intents/a/a.json".to_string()
        ]);
    }

    #[test]
    fn test_double_star_matches_everything() {
        let bytes = build_zip(&[("a.json", "{}"), ("deep/nested/b.json", "{}")]);
        let reader = ZipReader::new(bytes).unwrap();
        assert_eq!(reader.file_names(&["**"]).len(), 2);
    }

    #[test]
    fn test_undecodable_entries_are_skipped() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("good.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"ok").unwrap();
        writer
            .start_file("bad.bin", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&[0xff, 0xfe, 0x00, 0x80]).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let mut reader = ZipReader::new(bytes).unwrap();
        let texts = reader.texts(&["**"]);
        assert_eq!(texts, vec![("good.txt".to_string(), "ok".to_string())]);
    }

    #[test]
    fn test_not_a_zip_is_unrecognized() {
        let err = ZipReader::new(b"definitely not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, ImportError::UnrecognizedFormat(_)));
    }
}
