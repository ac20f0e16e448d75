//! Persistence: repository ports and their PostgreSQL adapters.

pub mod infrastructure;
pub mod ports;
pub mod postgres;
pub mod unit_of_work;

pub use postgres::PostgresDatabase;
pub use unit_of_work::UnitOfWork;
