use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use super::infrastructure::postgres::{
    PostgresCatalogRepository, PostgresChecklistsRepository, PostgresEventsRepository,
    PostgresInventoryRepository, PostgresStaffRepository, PostgresTimesheetsRepository,
    PostgresUsersRepository,
};
use super::ports::{
    catalog::CatalogRepository, checklists::ChecklistsRepository, events::EventsRepository,
    inventory::InventoryRepository, staff::StaffRepository, timesheets::TimesheetsRepository,
    users::UsersRepository,
};
use super::postgres::PostgresDatabase;

/// Aggregates all repository ports used by handlers and tools.
#[derive(Clone)]
pub struct UnitOfWork {
    pub users: Arc<dyn UsersRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub events: Arc<dyn EventsRepository>,
    pub staff: Arc<dyn StaffRepository>,
    pub timesheets: Arc<dyn TimesheetsRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub checklists: Arc<dyn ChecklistsRepository>,
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("catalog", &type_name_of_val(self.catalog.as_ref()))
            .field("events", &type_name_of_val(self.events.as_ref()))
            .field("staff", &type_name_of_val(self.staff.as_ref()))
            .field("timesheets", &type_name_of_val(self.timesheets.as_ref()))
            .field("inventory", &type_name_of_val(self.inventory.as_ref()))
            .field("checklists", &type_name_of_val(self.checklists.as_ref()))
            .finish()
    }
}

impl UnitOfWork {
    pub fn from_postgres(db: &PostgresDatabase) -> Self {
        let pool = db.pool().clone();
        Self {
            users: Arc::new(PostgresUsersRepository::new(pool.clone())),
            catalog: Arc::new(PostgresCatalogRepository::new(pool.clone())),
            events: Arc::new(PostgresEventsRepository::new(pool.clone())),
            staff: Arc::new(PostgresStaffRepository::new(pool.clone())),
            timesheets: Arc::new(PostgresTimesheetsRepository::new(pool.clone())),
            inventory: Arc::new(PostgresInventoryRepository::new(pool.clone())),
            checklists: Arc::new(PostgresChecklistsRepository::new(pool)),
        }
    }
}
