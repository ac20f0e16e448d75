//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

pub use repositories::catalog::PostgresCatalogRepository;
pub use repositories::checklists::PostgresChecklistsRepository;
pub use repositories::events::PostgresEventsRepository;
pub use repositories::inventory::PostgresInventoryRepository;
pub use repositories::staff::PostgresStaffRepository;
pub use repositories::timesheets::PostgresTimesheetsRepository;
pub use repositories::users::PostgresUsersRepository;
