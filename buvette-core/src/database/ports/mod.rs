//! Repository ports grouped by bounded context. Handlers and tools depend on
//! these traits; the Postgres adapters implement them.

pub mod catalog;
pub mod checklists;
pub mod events;
pub mod inventory;
pub mod staff;
pub mod timesheets;
pub mod users;
