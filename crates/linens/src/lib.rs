//! Linen ledger domain.
//!
//! Linen items keep a running balance plus three lifetime counters
//! (new, dirty, thrown). Pure domain logic: no IO, no storage.

pub mod input;
pub mod linen;

pub use input::parse_count;
pub use linen::{
    ActionRecorded, CreateLinen, EditLinen, Linen, LinenAction, LinenCommand, LinenCreated,
    LinenEdited, LinenEvent, LinenHistory, LinenType, RecordAction, ThrownPolicy,
};
