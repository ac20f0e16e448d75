//! PostgreSQL-backed repository implementations.

pub mod catalog;
pub mod checklists;
pub mod events;
pub mod inventory;
pub mod staff;
pub mod timesheets;
pub mod users;
