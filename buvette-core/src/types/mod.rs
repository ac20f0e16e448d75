pub mod catalog;
pub mod checklists;
pub mod events;
pub mod inventory;
pub mod staff;
pub mod timesheets;
pub mod users;

pub use catalog::{Buvette, BuvetteProduct, Product};
pub use checklists::{ChecklistResponse, ChecklistTemplate};
pub use events::{Event, EventBuvette, EventWithBuvettes};
pub use inventory::{InventoryDelta, InventorySnapshot};
pub use staff::{RosterEntry, StaffAssignment, StaffMember};
pub use timesheets::{Shift, Timesheet, TimesheetDetails};
pub use users::{User, UserSummary};
