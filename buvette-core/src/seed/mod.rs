//! Idempotent demo data: running the seed twice leaves the database as
//! after the first run.

pub mod staff;

use chrono::{TimeZone, Utc};
use serde::Serialize;
use tracing::info;

use crate::database::UnitOfWork;
use crate::domain::{naming::normalize_name, roles::Role, schedule::ArrivalSchedules};
use crate::error::{CoreError, Result};
use crate::types::{
    catalog::{Buvette, NewBuvette, NewProduct},
    events::NewEvent,
    staff::{NewAssignment, StaffMemberInput},
    users::NewUser,
};

pub const DEMO_PASSWORD: &str = "password123";
pub const ADMIN_LOGIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";

const DEMO_USERS: &[(&str, &str, &str, Role)] = &[
    ("Rachid", "Buvette", "rb@example.com", Role::Rb),
    ("Claire", "Ops", "chef@example.com", Role::ChefOps),
    ("Luca", "Log", "log@example.com", Role::Log),
    ("Admin", "Système", ADMIN_LOGIN, Role::Admin),
];

const FOOTBALL_BUVETTES: &[&str] = &[
    "Nord mobile 1",
    "Nord 1",
    "Nord 2",
    "Nord mobile 2",
    "Esplanade",
    "Est mobile 1",
    "Est 1",
    "Est mobile 2",
    "Est mobile 3",
    "Est 2",
    "Est mobile 4",
    "Sud 1",
    "Sud 2",
    "Principale Mobile 1",
    "Principale 1",
    "Principale Mobile 2",
    "Principale Mobile 3",
    "Principale 2",
    "Principale Mobile 4",
    "Visiteur",
];

const HOCKEY_BUVETTES: &[&str] = &[
    "Buvette 1",
    "Buvette 2",
    "Buvette 3",
    "Food Genevois",
    "Food Bretzel",
    "Chalet 1",
    "Chalet 2",
    "Chalet 3",
    "Cocktail",
    "Home Corner",
    "Visiteur",
];

const PRODUCTS: &[(&str, &str)] = &[
    ("Bière Pression", "L"),
    ("Coca 33cl", "canette"),
    ("Hot-dog", "pièce"),
    ("Frites", "portion"),
    ("Eau 50cl", "bouteille"),
];

const OPENING_TEMPLATE: &str = "Ouverture Buvette";
const OPENING_ITEMS: &[&str] = &[
    "Point d'eau (eau chaude/froide, savon)",
    "Lavages mains (affichage, gel)",
    "Températures frigos (< 4°C)",
    "Allergènes affichés",
    "Caisses / TPE fonctionnels",
    "Stocks critiques vérifiés",
];

const DEMO_EVENT: &str = "Servette FC vs FC Bâle";

const DEMO_STAFF: &[(&str, &str, &str)] = &[
    ("Jean", "Dupont", "jean.dupont@email.com"),
    ("Marie", "Curie", "marie.curie@email.com"),
    ("Paul", "Martin", "paul.martin@email.com"),
    ("Sophie", "Bernard", "sophie.bernard@email.com"),
];

/// Password hashes for the seeded accounts; hashing belongs to the caller.
#[derive(Debug, Clone)]
pub struct SeedPasswords {
    pub demo_hash: String,
    pub admin_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub users: usize,
    pub buvettes_created: usize,
    pub products_created: usize,
    pub event_id: i64,
    pub staff_created: usize,
    pub assignments_created: usize,
}

async fn ensure_buvettes(
    uow: &UnitOfWork,
    names: &[&str],
    sport: &str,
    location_type: &str,
    report: &mut SeedReport,
) -> Result<Vec<Buvette>> {
    let existing = uow.catalog.list_all_buvettes().await?;
    let mut buvettes = Vec::with_capacity(names.len());
    for name in names {
        let found = existing
            .iter()
            .find(|b| b.sport == sport && normalize_name(&b.name) == normalize_name(name))
            .cloned();
        let buvette = match found {
            Some(buvette) => buvette,
            None => {
                report.buvettes_created += 1;
                uow.catalog
                    .create_buvette(&NewBuvette {
                        name: (*name).to_string(),
                        location_type: Some(location_type.to_string()),
                        sport: sport.to_string(),
                    })
                    .await?
            }
        };
        buvettes.push(buvette);
    }
    Ok(buvettes)
}

pub async fn seed_demo(
    uow: &UnitOfWork,
    passwords: &SeedPasswords,
    schedules: &ArrivalSchedules,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    uow.users.ensure_roles(&Role::ALL).await?;
    for (first_name, last_name, email, role) in DEMO_USERS {
        let password_hash = if *email == ADMIN_LOGIN {
            passwords.admin_hash.clone()
        } else {
            passwords.demo_hash.clone()
        };
        uow.users
            .ensure_user(&NewUser {
                first_name: (*first_name).to_string(),
                last_name: (*last_name).to_string(),
                email: (*email).to_string(),
                password_hash,
                roles: vec![*role],
            })
            .await?;
        report.users += 1;
    }

    let football = ensure_buvettes(uow, FOOTBALL_BUVETTES, "FOOT", "STADIUM", &mut report).await?;
    ensure_buvettes(uow, HOCKEY_BUVETTES, "HOCKEY", "ARENA", &mut report).await?;

    for (name, unit) in PRODUCTS {
        if uow.catalog.find_product_by_name(name).await?.is_none() {
            uow.catalog
                .create_product(&NewProduct {
                    name: (*name).to_string(),
                    category: None,
                    unit: Some((*unit).to_string()),
                })
                .await?;
            report.products_created += 1;
        }
    }

    let event = match uow.events.find_event_by_name(DEMO_EVENT).await? {
        Some(event) => event,
        None => {
            let date = Utc
                .with_ymd_and_hms(2026, 2, 12, 18, 0, 0)
                .single()
                .ok_or_else(|| CoreError::Internal("invalid demo event date".to_string()))?;
            uow.events
                .create_event(&NewEvent {
                    name: DEMO_EVENT.to_string(),
                    date,
                    venue: Some("Stade de Genève".to_string()),
                    sport: Some("FOOT".to_string()),
                    ..NewEvent::default()
                })
                .await?
                .event
        }
    };
    report.event_id = event.id;
    for buvette in &football {
        uow.events.link_buvette(event.id, buvette.id, None).await?;
    }

    uow.checklists
        .ensure_template(
            OPENING_TEMPLATE,
            Some("Checklist standard pour l'ouverture"),
            OPENING_ITEMS,
        )
        .await?;

    let mut staff_ids = Vec::with_capacity(DEMO_STAFF.len());
    for (first_name, last_name, email) in DEMO_STAFF {
        let member = match uow.staff.find_staff_by_email(email).await? {
            Some(member) => member,
            None => {
                report.staff_created += 1;
                uow.staff
                    .create_staff(&StaffMemberInput {
                        first_name: (*first_name).to_string(),
                        last_name: (*last_name).to_string(),
                        email: Some((*email).to_string()),
                        phone: None,
                        hourly_rate: None,
                        contract_number: None,
                        staff_type: None,
                    })
                    .await?
            }
        };
        staff_ids.push(member.id);
    }

    // Two demo staff on each of the first two football buvettes.
    for (staff_index, staff_id) in staff_ids.iter().enumerate() {
        let Some(buvette) = football.get(staff_index / 2) else {
            break;
        };
        if uow
            .staff
            .find_event_assignment(event.id, *staff_id)
            .await?
            .is_some()
        {
            continue;
        }
        let taken = uow
            .staff
            .count_buvette_assignments(event.id, buvette.id)
            .await?;
        let slot = taken as usize;
        uow.staff
            .create_assignment(&NewAssignment {
                event_id: event.id,
                buvette_id: buvette.id,
                staff_id: *staff_id,
                arrival_time: schedules.arrival_time_for_slot(&buvette.name, slot),
                slot_index: slot as i32 + 1,
            })
            .await?;
        report.assignments_created += 1;
    }

    info!(
        users = report.users,
        buvettes_created = report.buvettes_created,
        products_created = report.products_created,
        event_id = report.event_id,
        staff_created = report.staff_created,
        assignments_created = report.assignments_created,
        "demo seed complete"
    );
    Ok(report)
}
