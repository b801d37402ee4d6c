//! Ledger services: the only mutation surface over each persisted collection.
//!
//! Each mutation validates through the aggregate, applies to a copy of the
//! collection, saves the whole copy and only then swaps it in. A failed save
//! leaves the in-memory collection exactly as it was.

pub mod chemicals;
pub mod linens;

use thiserror::Error;

use laundry_core::{DomainError, Event};

use crate::collection::PersistenceError;

pub use chemicals::{ChemicalEdit, ChemicalLedger};
pub use linens::{LinenEdit, LinenLedger};

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl LedgerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Domain(e) if e.is_validation())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::Domain(DomainError::NotFound))
    }
}

/// Log a rejected command at the boundary and pass the error on.
pub(crate) fn rejected(operation: &'static str, err: DomainError) -> LedgerError {
    tracing::warn!(operation, error = %err, "ledger command rejected");
    LedgerError::Domain(err)
}

/// Log a failed save and pass the error on.
pub(crate) fn save_failed(operation: &'static str, err: PersistenceError) -> LedgerError {
    tracing::error!(operation, error = ?err, "failed to persist ledger; in-memory state unchanged");
    LedgerError::Persistence(err)
}

pub(crate) fn trace_events<E: Event>(events: &[E]) {
    for event in events {
        tracing::debug!(
            event_type = event.event_type(),
            event_version = event.version(),
            occurred_at = %event.occurred_at(),
            "event applied"
        );
    }
}
