//! `laundry-app`: wires both ledgers, storage and report export together.
//!
//! UI layers hold a [`LaundryApp`] and call its ledgers; nothing here is global.

pub mod app;
pub mod dashboard;

pub use app::LaundryApp;
pub use dashboard::DashboardSummary;
