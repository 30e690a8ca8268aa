//! Per-run metadata for acquired images.
//!
//! Every successful acquisition is appended to a [`MetadataRecorder`]; at the
//! end of the run the records are written as one CSV file next to the images.

mod session;

pub use session::{metadata_filename, AcquisitionSession};

use crate::acquisition::AcquiredImage;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::io;
use std::path::Path;
use tracing::info;

/// CSV header row.
pub const METADATA_HEADER: &str = "date,panorama_id,lat,lon,filename";

/// One row of the metadata file.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    /// Capture date reported by the provider, if any
    pub date: Option<String>,
    pub panorama_id: String,
    pub lat: f64,
    pub lon: f64,
    pub filename: String,
}

impl From<&AcquiredImage> for MetadataRecord {
    fn from(image: &AcquiredImage) -> Self {
        Self {
            date: image.date.clone(),
            panorama_id: image.panorama_id.clone(),
            lat: image.lat,
            lon: image.lon,
            filename: image.filename.clone(),
        }
    }
}

/// Ordered, append-only collection of records for one run.
#[derive(Debug, Default)]
pub struct MetadataRecorder {
    records: Vec<MetadataRecord>,
}

impl MetadataRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, image: &AcquiredImage) {
        self.records.push(MetadataRecord::from(image));
    }

    /// Records in the order they were appended.
    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renders the header and all rows.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(METADATA_HEADER.len() + 1 + self.records.len() * 64);
        out.push_str(METADATA_HEADER);
        out.push('\n');
        for record in &self.records {
            let _ = writeln!(
                out,
                "{},{},{},{},{}",
                escape_field(record.date.as_deref().unwrap_or("")),
                escape_field(&record.panorama_id),
                record.lat,
                record.lon,
                escape_field(&record.filename),
            );
        }
        out
    }

    /// Writes the CSV file at `path`.
    ///
    /// Nothing is written when there are no records. Returns whether a file
    /// was created.
    pub fn flush(&self, path: &Path) -> io::Result<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_csv())?;
        info!(path = %path.display(), records = self.len(), "Metadata written");
        Ok(true)
    }
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Heading;
    use tempfile::TempDir;

    fn image(panorama_id: &str, date: Option<&str>) -> AcquiredImage {
        AcquiredImage {
            date: date.map(str::to_string),
            panorama_id: panorama_id.to_string(),
            lat: 37.5,
            lon: -122.25,
            heading: Heading::East,
            filename: "37.5_-122.25_92.jpg".to_string(),
            bytes: 10,
        }
    }

    #[test]
    fn test_records_keep_order() {
        let mut recorder = MetadataRecorder::new();
        recorder.record(&image("a", None));
        recorder.record(&image("b", None));

        let ids: Vec<_> = recorder.records().iter().map(|r| r.panorama_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_csv_rows() {
        let mut recorder = MetadataRecorder::new();
        recorder.record(&image("pano1", Some("2023-05")));
        recorder.record(&image("pano2", None));

        assert_eq!(
            recorder.to_csv(),
            "date,panorama_id,lat,lon,filename\n\
             2023-05,pano1,37.5,-122.25,37.5_-122.25_92.jpg\n\
             ,pano2,37.5,-122.25,37.5_-122.25_92.jpg\n"
        );
    }

    #[test]
    fn test_fields_with_separators_are_quoted() {
        let mut recorder = MetadataRecorder::new();
        recorder.record(&image("odd,\"id\"", None));

        let csv = recorder.to_csv();
        assert!(csv.contains(",\"odd,\"\"id\"\"\","));
    }

    #[test]
    fn test_flush_empty_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metadata.csv");

        assert!(!MetadataRecorder::new().flush(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_flush_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("region").join("metadata.csv");
        let mut recorder = MetadataRecorder::new();
        recorder.record(&image("pano1", Some("2021-01")));

        assert!(recorder.flush(&path).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(METADATA_HEADER));
        assert_eq!(content.lines().count(), 2);
    }
}
