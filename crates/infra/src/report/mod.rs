//! Stock report export.
//!
//! Rendering is a pure projection of a ledger's collection into an HTML
//! document. Turning that document into a PDF and handing it to the platform's
//! share sheet happens behind [`ReportSink`].

pub mod html;
pub mod sink;

use std::path::PathBuf;

use thiserror::Error;

pub use html::{ReportDocument, render_chemical_report, render_linen_report};
pub use sink::{HtmlFileSink, ReportSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Chemicals,
    Linens,
}

impl ReportKind {
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Chemicals => "Chemical Stock Report",
            ReportKind::Linens => "Linen Stock Report",
        }
    }

    /// File-name friendly form.
    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::Chemicals => "chemicals",
            ReportKind::Linens => "linens",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the {} ledger is empty", .0.slug())]
    Empty(ReportKind),

    #[error("failed to render report template")]
    Render(#[source] tera::Error),

    #[error("failed to write report to {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report delivery failed: {0}")]
    Sink(String),
}
