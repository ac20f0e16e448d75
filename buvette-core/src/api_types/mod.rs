//! Request and response payloads of the REST API.

pub mod auth;
pub mod catalog;
pub mod checklists;
pub mod events;
pub mod inventory;
pub mod reports;
pub mod responses;
pub mod staff;
pub mod timesheets;

pub use responses::{ApiResponse, BatchResult};
