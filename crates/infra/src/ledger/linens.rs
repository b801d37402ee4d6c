use chrono::{DateTime, Utc};

use laundry_core::{Aggregate, DomainError, Entity, LinenId, RecordId};
use laundry_linens::{
    CreateLinen, EditLinen, Linen, LinenAction, LinenCommand, LinenType, RecordAction,
    ThrownPolicy,
};

use super::{LedgerResult, rejected, save_failed, trace_events};
use crate::collection::{CollectionStore, LINENS_KEY};
use crate::storage::KeyValueStore;

/// Field changes for [`LinenLedger::edit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinenEdit {
    pub name: Option<String>,
}

/// Repository + service owning the linen collection.
#[derive(Debug)]
pub struct LinenLedger<S> {
    store: CollectionStore<Linen, S>,
    linens: Vec<Linen>,
    thrown_policy: ThrownPolicy,
}

impl<S> LinenLedger<S>
where
    S: KeyValueStore,
{
    pub fn open(store: S, thrown_policy: ThrownPolicy) -> LedgerResult<Self> {
        let store = CollectionStore::new(store, LINENS_KEY);
        let linens = store.load()?;
        tracing::info!(count = linens.len(), ?thrown_policy, "linen ledger loaded");
        Ok(Self {
            store,
            linens,
            thrown_policy,
        })
    }

    pub fn reload(&mut self) -> LedgerResult<()> {
        self.linens = self.store.load()?;
        Ok(())
    }

    pub fn list(&self) -> &[Linen] {
        &self.linens
    }

    pub fn len(&self) -> usize {
        self.linens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.linens.is_empty()
    }

    pub fn get(&self, id: &LinenId) -> Option<&Linen> {
        self.linens.iter().find(|l| l.id() == id)
    }

    pub fn thrown_policy(&self) -> ThrownPolicy {
        self.thrown_policy
    }

    pub fn create(
        &mut self,
        name: &str,
        linen_type: LinenType,
        opening_balance: u32,
    ) -> LedgerResult<Linen> {
        let id = LinenId::new();
        let mut linen = Linen::empty(id.clone());
        let events = linen
            .execute(&LinenCommand::Create(CreateLinen {
                linen_id: id.clone(),
                name: name.to_string(),
                linen_type,
                opening_balance,
                occurred_at: Utc::now(),
            }))
            .map_err(|e| rejected("linen.create", e))?;
        trace_events(&events);

        let mut next = self.linens.clone();
        next.push(linen.clone());
        self.commit("linen.create", next)?;

        tracing::info!(linen_id = %id, ?linen_type, opening_balance, "linen created");
        Ok(linen)
    }

    /// Rename a linen item. Unknown ids are a no-op and return `Ok(None)`.
    pub fn edit(&mut self, id: &LinenId, changes: LinenEdit) -> LedgerResult<Option<Linen>> {
        if self.get(id).is_none() {
            tracing::debug!(linen_id = %id, "edit ignored; linen not found");
            return Ok(None);
        }

        let command = LinenCommand::Edit(EditLinen {
            linen_id: id.clone(),
            name: changes.name,
            occurred_at: Utc::now(),
        });
        let updated = self.mutate("linen.edit", id, &command)?;
        tracing::info!(linen_id = %id, "linen edited");
        Ok(Some(updated))
    }

    /// Record a new/dirty/thrown action under the configured thrown policy.
    pub fn record_action(
        &mut self,
        id: &LinenId,
        action: LinenAction,
        date: DateTime<Utc>,
        notes: Option<&str>,
    ) -> LedgerResult<Linen> {
        let command = LinenCommand::RecordAction(RecordAction {
            linen_id: id.clone(),
            record_id: RecordId::new(),
            action,
            date,
            notes: notes.map(str::to_string),
            policy: self.thrown_policy,
            occurred_at: Utc::now(),
        });
        let updated = self.mutate("linen.record_action", id, &command)?;
        tracing::info!(
            linen_id = %id,
            action = action.name(),
            count = action.count(),
            balance = updated.current_balance(),
            "linen action recorded"
        );
        Ok(updated)
    }

    /// Remove a linen item and its whole history. Returns whether anything was removed.
    pub fn delete(&mut self, id: &LinenId) -> LedgerResult<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next: Vec<Linen> = self
            .linens
            .iter()
            .filter(|l| l.id() != id)
            .cloned()
            .collect();
        self.commit("linen.delete", next)?;
        tracing::info!(linen_id = %id, "linen deleted");
        Ok(true)
    }

    fn mutate(
        &mut self,
        operation: &'static str,
        id: &LinenId,
        command: &LinenCommand,
    ) -> LedgerResult<Linen> {
        let index = self
            .linens
            .iter()
            .position(|l| l.id() == id)
            .ok_or_else(|| rejected(operation, DomainError::not_found()))?;

        let mut next = self.linens.clone();
        let events = next[index]
            .execute(command)
            .map_err(|e| rejected(operation, e))?;
        trace_events(&events);
        let updated = next[index].clone();

        self.commit(operation, next)?;
        Ok(updated)
    }

    fn commit(&mut self, operation: &'static str, next: Vec<Linen>) -> LedgerResult<()> {
        self.store
            .save(&next)
            .map_err(|e| save_failed(operation, e))?;
        self.linens = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;
    use crate::storage::InMemoryKeyValueStore;
    use std::sync::Arc;

    type Ledger = LinenLedger<Arc<InMemoryKeyValueStore>>;

    fn ledger(policy: ThrownPolicy) -> (Arc<InMemoryKeyValueStore>, Ledger) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let ledger = LinenLedger::open(kv.clone(), policy).unwrap();
        (kv, ledger)
    }

    #[test]
    fn towel_scenario_through_the_ledger() {
        let (kv, mut ledger) = ledger(ThrownPolicy::Permissive);
        let id = ledger.create("Towel A", LinenType::Towel, 20).unwrap().id().clone();
        let now = Utc::now();

        ledger.record_action(&id, LinenAction::New { count: 5 }, now, None).unwrap();
        ledger.record_action(&id, LinenAction::Dirty { count: 8 }, now, None).unwrap();
        let towel = ledger
            .record_action(&id, LinenAction::Thrown { count: 2 }, now, Some("torn"))
            .unwrap();

        assert_eq!(towel.new_count(), 5);
        assert_eq!(towel.dirty_count(), 8);
        assert_eq!(towel.thrown_count(), 2);
        assert_eq!(towel.current_balance(), 23);

        let reopened = LinenLedger::open(kv, ThrownPolicy::Permissive).unwrap();
        assert_eq!(reopened.get(&id), Some(&towel));
    }

    #[test]
    fn configured_policy_is_applied() {
        let (_kv, mut ledger) = ledger(ThrownPolicy::RejectOverdraw);
        let id = ledger.create("Sheet", LinenType::Bedsheet, 2).unwrap().id().clone();
        let err = ledger
            .record_action(&id, LinenAction::Thrown { count: 3 }, Utc::now(), None)
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ledger.get(&id).unwrap().current_balance(), 2);
        assert!(ledger.get(&id).unwrap().history().is_empty());
    }

    #[test]
    fn zero_count_is_rejected_before_any_write() {
        let (kv, mut ledger) = ledger(ThrownPolicy::Permissive);
        let id = ledger.create("Sheet", LinenType::Bedsheet, 2).unwrap().id().clone();
        let stored = kv.get(LINENS_KEY).unwrap();
        assert!(ledger
            .record_action(&id, LinenAction::New { count: 0 }, Utc::now(), None)
            .unwrap_err()
            .is_validation());
        assert_eq!(kv.get(LINENS_KEY).unwrap(), stored);
    }

    #[test]
    fn failed_save_is_surfaced_and_not_applied() {
        let (kv, mut ledger) = ledger(ThrownPolicy::Permissive);
        let id = ledger.create("Towel", LinenType::Towel, 1).unwrap().id().clone();
        kv.fail_writes(true);
        let err = ledger
            .record_action(&id, LinenAction::New { count: 1 }, Utc::now(), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(_)));
        assert_eq!(ledger.get(&id).unwrap().current_balance(), 1);
        assert!(ledger.delete(&id).is_err());
        assert!(ledger.get(&id).is_some());
    }

    #[test]
    fn edit_and_delete_unknown_ids() {
        let (kv, mut ledger) = ledger(ThrownPolicy::Permissive);
        let missing = LinenId::new();
        let changes = LinenEdit {
            name: Some("x".into()),
        };
        assert!(ledger.edit(&missing, changes).unwrap().is_none());
        assert!(!ledger.delete(&missing).unwrap());
        assert!(ledger
            .record_action(&missing, LinenAction::Dirty { count: 1 }, Utc::now(), None)
            .unwrap_err()
            .is_not_found());
        assert_eq!(kv.get(LINENS_KEY).unwrap(), None);
    }

    #[test]
    fn edit_rejects_blank_name() {
        let (_kv, mut ledger) = ledger(ThrownPolicy::Permissive);
        let id = ledger.create("Towel", LinenType::Towel, 1).unwrap().id().clone();
        let changes = LinenEdit {
            name: Some(" ".into()),
        };
        let err = ledger.edit(&id, changes).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ledger.get(&id).unwrap().name(), "Towel");
    }

    #[test]
    fn delete_keeps_other_items_intact() {
        let (_kv, mut ledger) = ledger(ThrownPolicy::Permissive);
        let a = ledger.create("Towel", LinenType::Towel, 3).unwrap().id().clone();
        let b = ledger.create("Sheet", LinenType::Bedsheet, 3).unwrap().id().clone();
        ledger.record_action(&b, LinenAction::Dirty { count: 2 }, Utc::now(), None).unwrap();
        let b_before = ledger.get(&b).cloned();

        assert!(ledger.delete(&a).unwrap());
        assert!(ledger.get(&a).is_none());
        assert_eq!(ledger.get(&b).cloned(), b_before);
        assert_eq!(ledger.len(), 1);
    }
}
