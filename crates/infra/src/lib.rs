//! Infrastructure layer: local storage, ledger services, report export, config.

pub mod collection;
pub mod config;
pub mod ledger;
pub mod report;
pub mod storage;

pub use collection::{CHEMICALS_KEY, CollectionStore, LINENS_KEY, PersistenceError};
pub use config::LaundryConfig;
pub use ledger::{
    ChemicalEdit, ChemicalLedger, LedgerError, LedgerResult, LinenEdit, LinenLedger,
};
pub use report::{ExportError, HtmlFileSink, ReportDocument, ReportKind, ReportSink};
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, StorageError};
