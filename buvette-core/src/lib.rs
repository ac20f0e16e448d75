//! Core of the buvette operations service: domain rules, persistence and the
//! tooling shared by the HTTP server and the command line.

pub mod api;
pub mod api_types;
pub mod database;
pub mod domain;
pub mod error;
pub mod import;
pub mod seed;
pub mod types;

pub use error::{CoreError, Result};

/// Schema migrations embedded at build time.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
