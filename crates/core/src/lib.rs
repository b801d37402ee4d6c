//! `laundry-core`: domain building blocks shared by both ledgers.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod text;

pub use aggregate::Aggregate;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::{ChemicalId, LinenId, RecordId};
pub use text::{normalize_notes, require_non_blank};
