pub mod auth;
pub mod buvettes;
pub mod checklists;
pub mod events;
pub mod inventory;
pub mod reports;
pub mod staff;
pub mod timesheets;
pub mod users;
