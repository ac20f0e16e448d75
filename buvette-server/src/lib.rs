//! HTTP server for Buvette Ops: concession-stand staffing, timesheets,
//! inventory and checklists for sporting events.

pub mod app;
pub mod auth;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use app::create_app;
pub use infra::app_state::AppState;
