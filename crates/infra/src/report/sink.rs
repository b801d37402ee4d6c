use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{ExportError, ReportDocument};

/// Bound on `-N` suffixes tried when reports share a timestamp.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Destination for rendered reports (file, PDF printer, share sheet, ...).
pub trait ReportSink: Send + Sync {
    /// Deliver the document and return where it ended up (path or URI).
    ///
    /// On error nothing partial may be left behind.
    fn deliver(&self, document: &ReportDocument) -> Result<String, ExportError>;
}

/// Writes reports as standalone HTML files into a directory.
///
/// Existing files are never replaced: a name that is already taken gets a
/// numeric suffix.
#[derive(Debug, Clone)]
pub struct HtmlFileSink {
    dir: PathBuf,
}

impl HtmlFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, document: &ReportDocument, attempt: u32) -> PathBuf {
        let stamp = document.generated_at.format("%Y%m%dT%H%M%S%3f");
        let slug = document.kind.slug();
        let name = match attempt {
            0 => format!("{slug}-report-{stamp}.html"),
            n => format!("{slug}-report-{stamp}-{n}.html"),
        };
        self.dir.join(name)
    }

    fn create_unique(&self, document: &ReportDocument) -> Result<(PathBuf, File), ExportError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.path_for(document, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(ExportError::Io { path, source }),
            }
        }
        Err(ExportError::Io {
            path: self.path_for(document, 0),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "no free report file name"),
        })
    }
}

impl ReportSink for HtmlFileSink {
    fn deliver(&self, document: &ReportDocument) -> Result<String, ExportError> {
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let (path, mut file) = self.create_unique(document)?;
        let written = file
            .write_all(document.html.as_bytes())
            .and_then(|()| file.sync_all());
        if let Err(source) = written {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(ExportError::Io { path, source });
        }

        tracing::info!(path = %path.display(), kind = document.kind.slug(), "report exported");
        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportKind;
    use chrono::{DateTime, TimeZone, Utc};

    fn document_at(kind: ReportKind, generated_at: DateTime<Utc>, html: &str) -> ReportDocument {
        ReportDocument {
            kind,
            generated_at,
            html: html.to_string(),
        }
    }

    fn document() -> ReportDocument {
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 14, 5, 9).unwrap();
        document_at(ReportKind::Linens, at, "<html></html>")
    }

    #[test]
    fn writes_named_html_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = HtmlFileSink::new(dir.path().join("reports"));
        let location = sink.deliver(&document()).unwrap();

        assert!(location.ends_with("linens-report-20240701T140509000.html"));
        assert_eq!(fs::read_to_string(&location).unwrap(), "<html></html>");
    }

    #[test]
    fn exports_within_one_second_get_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = HtmlFileSink::new(dir.path());
        let base = Utc.with_ymd_and_hms(2024, 7, 1, 14, 5, 9).unwrap();
        let first = document_at(
            ReportKind::Chemicals,
            base + chrono::Duration::milliseconds(100),
            "first",
        );
        let second = document_at(
            ReportKind::Chemicals,
            base + chrono::Duration::milliseconds(600),
            "second",
        );

        let a = sink.deliver(&first).unwrap();
        let b = sink.deliver(&second).unwrap();

        assert_ne!(a, b);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
        assert_eq!(fs::read_to_string(&a).unwrap(), "first");
        assert_eq!(fs::read_to_string(&b).unwrap(), "second");
    }

    #[test]
    fn identical_timestamps_never_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let sink = HtmlFileSink::new(dir.path());
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 14, 5, 9).unwrap();

        let a = sink.deliver(&document_at(ReportKind::Linens, at, "one")).unwrap();
        let b = sink.deliver(&document_at(ReportKind::Linens, at, "two")).unwrap();

        assert!(b.ends_with("linens-report-20240701T140509000-1.html"));
        assert_eq!(fs::read_to_string(&a).unwrap(), "one");
        assert_eq!(fs::read_to_string(&b).unwrap(), "two");
    }

    #[test]
    fn failure_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let sink = HtmlFileSink::new(&blocker);
        assert!(matches!(sink.deliver(&document()), Err(ExportError::Io { .. })));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
