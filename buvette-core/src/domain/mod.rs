//! Business rules that do not touch the database.

pub mod hours;
pub mod inventory;
pub mod naming;
pub mod reports;
pub mod roles;
pub mod schedule;
pub mod status;
pub mod validation;

pub use roles::Role;
pub use schedule::ArrivalSchedules;
pub use status::{SnapshotKind, WorkflowStatus};
