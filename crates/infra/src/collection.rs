//! Whole-collection persistence: one ledger's entity list stored as one JSON blob.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the chemical ledger.
pub const CHEMICALS_KEY: &str = "@laundry_chemicals";

/// Storage key for the linen ledger.
pub const LINENS_KEY: &str = "@laundry_linens";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read '{key}'")]
    Read {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to write '{key}'")]
    Write {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("stored data under '{key}' is not a valid collection")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode collection for '{key}'")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Typed view of one storage key holding a `Vec<T>`.
///
/// There is no partial update: `save` always replaces the whole list.
#[derive(Debug)]
pub struct CollectionStore<T, S> {
    store: S,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> CollectionStore<T, S>
where
    T: Serialize + DeserializeOwned,
    S: KeyValueStore,
{
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored collection. Nothing stored yet means an empty collection;
    /// unreadable or malformed data is an error, never a silent empty list.
    pub fn load(&self) -> Result<Vec<T>, PersistenceError> {
        let raw = self.store.get(&self.key).map_err(|source| PersistenceError::Read {
            key: self.key.clone(),
            source,
        })?;

        let Some(raw) = raw else {
            tracing::debug!(key = %self.key, "no stored collection; starting empty");
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|source| PersistenceError::Decode {
            key: self.key.clone(),
            source,
        })
    }

    pub fn save(&self, items: &[T]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(items).map_err(|source| PersistenceError::Encode {
            key: self.key.clone(),
            source,
        })?;

        self.store
            .set(&self.key, &raw)
            .map_err(|source| PersistenceError::Write {
                key: self.key.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ChemicalLedger, LinenLedger};
    use crate::storage::InMemoryKeyValueStore;
    use chrono::{Duration, TimeZone, Utc};
    use laundry_chemicals::Chemical;
    use laundry_core::Entity;
    use laundry_linens::{Linen, LinenAction, LinenType, ThrownPolicy};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        count: u32,
    }

    fn row(name: &str) -> Row {
        Row {
            name: name.into(),
            count: 1,
        }
    }

    #[test]
    fn empty_store_loads_empty_collection() {
        let store: CollectionStore<Row, _> =
            CollectionStore::new(InMemoryKeyValueStore::new(), CHEMICALS_KEY);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_blob_is_an_error() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        kv.set(LINENS_KEY, "{not json").unwrap();
        let store: CollectionStore<Row, _> = CollectionStore::new(kv, LINENS_KEY);
        assert!(matches!(store.load(), Err(PersistenceError::Decode { .. })));
    }

    #[test]
    fn write_failure_is_reported() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store: CollectionStore<Row, _> = CollectionStore::new(kv.clone(), LINENS_KEY);
        kv.fail_writes(true);
        let rows = vec![row("a")];
        assert!(matches!(store.save(&rows), Err(PersistenceError::Write { .. })));
    }

    #[test]
    fn collections_under_different_keys_are_independent() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let a: CollectionStore<Row, _> = CollectionStore::new(kv.clone(), CHEMICALS_KEY);
        let b: CollectionStore<Row, _> = CollectionStore::new(kv, LINENS_KEY);
        a.save(&[row("a")]).unwrap();
        assert_eq!(a.load().unwrap().len(), 1);
        assert!(b.load().unwrap().is_empty());
    }

    fn linen_type(index: u8) -> LinenType {
        match index {
            0 => LinenType::Towel,
            1 => LinenType::Bedsheet,
            _ => LinenType::Other,
        }
    }

    fn linen_action(kind: u8, count: u32) -> LinenAction {
        match kind {
            0 => LinenAction::New { count },
            1 => LinenAction::Dirty { count },
            _ => LinenAction::Thrown { count },
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: whatever the ledger saved, a fresh load returns it unchanged,
        /// including entities that never recorded any history.
        #[test]
        fn saved_chemicals_reload_unchanged(
            specs in prop::collection::vec(
                (
                    "[A-Za-z][A-Za-z ]{0,12}",
                    0i64..100_000i64,
                    prop::collection::vec(
                        (1i64..5_000i64, 0i64..365i64, prop::option::of("[a-z ]{0,8}")),
                        0..4,
                    ),
                ),
                0..6,
            )
        ) {
            let kv = Arc::new(InMemoryKeyValueStore::new());
            let mut ledger = ChemicalLedger::open(kv.clone(), Decimal::ONE).unwrap();
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();

            for (name, opening_cents, usages) in specs {
                let id = ledger
                    .create(&name, Decimal::new(opening_cents, 2), "L")
                    .unwrap()
                    .id()
                    .clone();
                for (cents, day, notes) in usages {
                    let date = start + Duration::days(day);
                    let amount = Decimal::new(cents, 2);
                    if let Err(err) = ledger.record_usage(&id, amount, date, notes.as_deref()) {
                        prop_assert!(err.is_validation());
                    }
                }
            }

            let store: CollectionStore<Chemical, _> = CollectionStore::new(kv, CHEMICALS_KEY);
            prop_assert_eq!(store.load().unwrap(), ledger.list().to_vec());
        }

        #[test]
        fn saved_linens_reload_unchanged(
            specs in prop::collection::vec(
                (
                    "[A-Za-z][A-Za-z ]{0,12}",
                    0u8..3u8,
                    0u32..500u32,
                    prop::collection::vec(
                        (0u8..3u8, 1u32..50u32, 0i64..365i64, prop::option::of("[a-z ]{0,8}")),
                        0..4,
                    ),
                ),
                0..6,
            )
        ) {
            let kv = Arc::new(InMemoryKeyValueStore::new());
            let mut ledger = LinenLedger::open(kv.clone(), ThrownPolicy::Permissive).unwrap();
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();

            for (name, type_index, opening, actions) in specs {
                let id = ledger
                    .create(&name, linen_type(type_index), opening)
                    .unwrap()
                    .id()
                    .clone();
                for (kind, count, day, notes) in actions {
                    let date = start + Duration::days(day);
                    let action = linen_action(kind, count);
                    ledger.record_action(&id, action, date, notes.as_deref()).unwrap();
                }
            }

            let store: CollectionStore<Linen, _> = CollectionStore::new(kv, LINENS_KEY);
            prop_assert_eq!(store.load().unwrap(), ledger.list().to_vec());
        }
    }
}
