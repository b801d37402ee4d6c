use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use laundry_core::Entity;
use laundry_infra::report::{render_chemical_report, render_linen_report};
use laundry_infra::{
    ChemicalLedger, ExportError, FileKeyValueStore, HtmlFileSink, KeyValueStore, LaundryConfig,
    LinenLedger, ReportDocument, ReportSink,
};

use crate::dashboard::DashboardSummary;

/// Application state: both ledgers over one store, plus the report sink.
pub struct LaundryApp<S> {
    config: LaundryConfig,
    chemicals: ChemicalLedger<S>,
    linens: LinenLedger<S>,
    sink: Box<dyn ReportSink>,
}

impl<S> core::fmt::Debug for LaundryApp<S>
where
    S: KeyValueStore,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LaundryApp")
            .field("config", &self.config)
            .field("chemicals", &self.chemicals.len())
            .field("linens", &self.linens.len())
            .finish_non_exhaustive()
    }
}

impl LaundryApp<Arc<FileKeyValueStore>> {
    /// Process entry point: logging, config from the environment, file storage.
    pub fn bootstrap() -> anyhow::Result<Self> {
        laundry_observability::init();
        let config = LaundryConfig::from_env();
        tracing::info!(data_dir = %config.data_dir.display(), "starting laundry app");
        Self::open_at(config)
    }

    /// File-backed app rooted at `config.data_dir`, exporting HTML into `config.report_dir`.
    pub fn open_at(config: LaundryConfig) -> anyhow::Result<Self> {
        let store = Arc::new(FileKeyValueStore::new(&config.data_dir));
        let sink = HtmlFileSink::new(&config.report_dir);
        Self::open(config, store, Box::new(sink))
    }
}

impl<S> LaundryApp<S>
where
    S: KeyValueStore + Clone,
{
    pub fn open(
        config: LaundryConfig,
        store: S,
        sink: Box<dyn ReportSink>,
    ) -> anyhow::Result<Self> {
        let chemicals = ChemicalLedger::open(store.clone(), config.low_stock_threshold)
            .context("failed to load chemicals")?;
        let linens = LinenLedger::open(store, config.thrown_policy)
            .context("failed to load linens")?;

        Ok(Self {
            config,
            chemicals,
            linens,
            sink,
        })
    }

    pub fn config(&self) -> &LaundryConfig {
        &self.config
    }

    pub fn chemicals(&self) -> &ChemicalLedger<S> {
        &self.chemicals
    }

    pub fn chemicals_mut(&mut self) -> &mut ChemicalLedger<S> {
        &mut self.chemicals
    }

    pub fn linens(&self) -> &LinenLedger<S> {
        &self.linens
    }

    pub fn linens_mut(&mut self) -> &mut LinenLedger<S> {
        &mut self.linens
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary {
            chemical_count: self.chemicals.len(),
            linen_count: self.linens.len(),
            low_stock: self
                .chemicals
                .low_stock()
                .into_iter()
                .map(|c| c.id().clone())
                .collect(),
        }
    }

    /// Render the chemical report and hand it to the sink. Returns its location.
    pub fn export_chemicals(&self) -> Result<String, ExportError> {
        let document = render_chemical_report(
            self.chemicals.list(),
            self.chemicals.low_stock_threshold(),
            Utc::now(),
        );
        self.deliver(document)
    }

    /// Render the linen report and hand it to the sink. Returns its location.
    pub fn export_linens(&self) -> Result<String, ExportError> {
        let document = render_linen_report(self.linens.list(), Utc::now());
        self.deliver(document)
    }

    fn deliver(
        &self,
        document: Result<ReportDocument, ExportError>,
    ) -> Result<String, ExportError> {
        let result = document.and_then(|doc| self.sink.deliver(&doc));
        match &result {
            Err(ExportError::Empty(kind)) => {
                tracing::warn!(kind = kind.slug(), "report skipped; nothing to export");
            }
            Err(err) => tracing::error!(error = ?err, "report export failed"),
            Ok(_) => {}
        }
        result
    }
}
