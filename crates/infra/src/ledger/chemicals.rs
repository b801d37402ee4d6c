use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use laundry_chemicals::{Chemical, ChemicalCommand, CreateChemical, EditChemical, RecordUsage};
use laundry_core::{Aggregate, ChemicalId, DomainError, Entity, RecordId};

use super::{LedgerResult, rejected, save_failed, trace_events};
use crate::collection::{CHEMICALS_KEY, CollectionStore};
use crate::storage::KeyValueStore;

/// Field changes for [`ChemicalLedger::edit`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChemicalEdit {
    pub name: Option<String>,
    pub unit: Option<String>,
}

/// Repository + service owning the chemical collection.
#[derive(Debug)]
pub struct ChemicalLedger<S> {
    store: CollectionStore<Chemical, S>,
    chemicals: Vec<Chemical>,
    low_stock_threshold: Decimal,
}

impl<S> ChemicalLedger<S>
where
    S: KeyValueStore,
{
    /// Load the persisted chemicals from `store`.
    pub fn open(store: S, low_stock_threshold: Decimal) -> LedgerResult<Self> {
        let store = CollectionStore::new(store, CHEMICALS_KEY);
        let chemicals = store.load()?;
        tracing::info!(count = chemicals.len(), "chemical ledger loaded");
        Ok(Self {
            store,
            chemicals,
            low_stock_threshold,
        })
    }

    /// Discard in-memory state and re-read from storage.
    pub fn reload(&mut self) -> LedgerResult<()> {
        self.chemicals = self.store.load()?;
        Ok(())
    }

    pub fn list(&self) -> &[Chemical] {
        &self.chemicals
    }

    pub fn len(&self) -> usize {
        self.chemicals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chemicals.is_empty()
    }

    pub fn get(&self, id: &ChemicalId) -> Option<&Chemical> {
        self.chemicals.iter().find(|c| c.id() == id)
    }

    pub fn low_stock_threshold(&self) -> Decimal {
        self.low_stock_threshold
    }

    /// Chemicals whose balance is at or below `threshold`.
    pub fn list_low_stock(&self, threshold: Decimal) -> Vec<&Chemical> {
        self.chemicals
            .iter()
            .filter(|c| c.is_low_stock(threshold))
            .collect()
    }

    /// [`Self::list_low_stock`] with the configured threshold.
    pub fn low_stock(&self) -> Vec<&Chemical> {
        self.list_low_stock(self.low_stock_threshold)
    }

    pub fn create(
        &mut self,
        name: &str,
        opening_balance: Decimal,
        unit: &str,
    ) -> LedgerResult<Chemical> {
        let id = ChemicalId::new();
        let mut chemical = Chemical::empty(id.clone());
        let events = chemical
            .execute(&ChemicalCommand::Create(CreateChemical {
                chemical_id: id.clone(),
                name: name.to_string(),
                opening_balance,
                unit: unit.to_string(),
                occurred_at: Utc::now(),
            }))
            .map_err(|e| rejected("chemical.create", e))?;
        trace_events(&events);

        let mut next = self.chemicals.clone();
        next.push(chemical.clone());
        self.commit("chemical.create", next)?;

        tracing::info!(chemical_id = %id, %opening_balance, "chemical created");
        Ok(chemical)
    }

    /// Apply field edits. Unknown ids are a no-op and return `Ok(None)`.
    pub fn edit(
        &mut self,
        id: &ChemicalId,
        changes: ChemicalEdit,
    ) -> LedgerResult<Option<Chemical>> {
        if self.get(id).is_none() {
            tracing::debug!(chemical_id = %id, "edit ignored; chemical not found");
            return Ok(None);
        }

        let command = ChemicalCommand::Edit(EditChemical {
            chemical_id: id.clone(),
            name: changes.name,
            unit: changes.unit,
            occurred_at: Utc::now(),
        });
        let updated = self.mutate("chemical.edit", id, &command)?;
        tracing::info!(chemical_id = %id, "chemical edited");
        Ok(Some(updated))
    }

    /// Record a usage. Rejected when `amount` is not positive or exceeds the balance.
    pub fn record_usage(
        &mut self,
        id: &ChemicalId,
        amount: Decimal,
        date: DateTime<Utc>,
        notes: Option<&str>,
    ) -> LedgerResult<Chemical> {
        let command = ChemicalCommand::RecordUsage(RecordUsage {
            chemical_id: id.clone(),
            record_id: RecordId::new(),
            amount,
            date,
            notes: notes.map(str::to_string),
            occurred_at: Utc::now(),
        });
        let updated = self.mutate("chemical.record_usage", id, &command)?;
        tracing::info!(
            chemical_id = %id,
            %amount,
            balance = %updated.current_balance(),
            "chemical usage recorded"
        );
        Ok(updated)
    }

    /// Remove a chemical and its whole history. Returns whether anything was removed.
    pub fn delete(&mut self, id: &ChemicalId) -> LedgerResult<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next: Vec<Chemical> = self
            .chemicals
            .iter()
            .filter(|c| c.id() != id)
            .cloned()
            .collect();
        self.commit("chemical.delete", next)?;
        tracing::info!(chemical_id = %id, "chemical deleted");
        Ok(true)
    }

    fn mutate(
        &mut self,
        operation: &'static str,
        id: &ChemicalId,
        command: &ChemicalCommand,
    ) -> LedgerResult<Chemical> {
        let index = self
            .chemicals
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| rejected(operation, DomainError::not_found()))?;

        let mut next = self.chemicals.clone();
        let events = next[index]
            .execute(command)
            .map_err(|e| rejected(operation, e))?;
        trace_events(&events);
        let updated = next[index].clone();

        self.commit(operation, next)?;
        Ok(updated)
    }

    fn commit(&mut self, operation: &'static str, next: Vec<Chemical>) -> LedgerResult<()> {
        self.store
            .save(&next)
            .map_err(|e| save_failed(operation, e))?;
        self.chemicals = next;
        Ok(())
    }
}
