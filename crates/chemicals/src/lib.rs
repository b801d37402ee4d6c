//! Chemical ledger domain.
//!
//! A chemical has one running balance that only usage events decrement.
//! Pure domain logic: no IO, no storage.

pub mod chemical;
pub mod input;

pub use chemical::{
    Chemical, ChemicalCommand, ChemicalCreated, ChemicalEdited, ChemicalEvent, CreateChemical,
    DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_UNIT, EditChemical, RecordUsage, UsageRecord,
    UsageRecorded,
};
pub use input::parse_quantity;
