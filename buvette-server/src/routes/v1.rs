use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};
use buvette_core::{api::routes::v1, domain::Role};

use crate::{
    AppState,
    auth::{auth_middleware, require_roles},
    handlers::{
        auth as auth_handlers, buvettes, checklists, events, inventory, reports, staff,
        timesheets, users,
    },
};

const CATALOG_MANAGERS: &[Role] = &[Role::Admin, Role::ChefOps];
const OPS_LEADS: &[Role] = &[Role::ChefOps];
const ADMINS: &[Role] = &[Role::Admin];
const RESPONSABLES: &[Role] = &[Role::Rb];
const LOGISTICS: &[Role] = &[Role::Log, Role::ChefOps];

/// Every v1 route. Paths shared between groups end up in one method router,
/// so a public GET and a gated POST can live on the same path.
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::auth::LOGIN, post(auth_handlers::login_handler))
        .route(v1::auth::REFRESH, post(auth_handlers::refresh_handler))
        .route(v1::auth::LOGOUT, post(auth_handlers::logout_handler))
        .route(
            v1::buvettes::COLLECTION,
            get(buvettes::list_buvettes_handler),
        )
        .route(v1::events::COLLECTION, get(events::list_events_handler))
        .route(v1::events::BUVETTES, get(events::event_buvettes_handler))
        .route(
            v1::events::ASSIGNMENTS,
            get(events::list_assignments_handler),
        )
        // Kiosk endpoints used on the stand without an account
        .route(
            v1::events::timesheets::BY_BUVETTE,
            get(timesheets::buvette_timesheet_handler),
        )
        .route(
            v1::events::timesheets::COLLECTION,
            post(timesheets::kiosk_submit_handler),
        )
        .route(
            v1::events::inventory::SHEET,
            get(inventory::inventory_sheet_handler)
                .post(inventory::save_inventory_sheet_handler),
        )
        .merge(create_protected_routes(state.clone()))
        .merge(create_catalog_manager_routes(state.clone()))
        .merge(create_ops_lead_routes(state.clone()))
        .merge(create_admin_routes(state.clone()))
        .merge(create_responsable_routes(state.clone()))
        .merge(create_logistics_routes(state))
}

/// Routes open to any signed-in user
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::users::CURRENT, get(users::current_user_handler))
        .route(
            v1::buvettes::BY_SPORT,
            get(buvettes::buvettes_by_sport_handler),
        )
        .route(
            v1::buvettes::PRODUCTS,
            get(buvettes::buvette_products_handler),
        )
        .route(
            v1::products::COLLECTION,
            get(buvettes::list_products_handler),
        )
        .route(v1::events::ITEM, get(events::get_event_handler))
        .route(
            v1::staff::MEMBERS,
            get(staff::list_staff_members_handler),
        )
        .route(v1::staff::ROSTER, get(staff::roster_handler))
        .route(
            v1::events::timesheets::COLLECTION,
            get(timesheets::event_timesheets_handler),
        )
        .route(
            v1::timesheets::ITEM,
            get(timesheets::get_timesheet_handler),
        )
        .route(
            v1::events::inventory::SNAPSHOTS,
            get(inventory::list_snapshots_handler),
        )
        .route(
            v1::events::inventory::SHORTAGES,
            get(inventory::shortages_handler),
        )
        .route(
            v1::checklists::TEMPLATES,
            get(checklists::list_templates_handler),
        )
        .route(
            v1::checklists::TEMPLATE_ITEM,
            get(checklists::get_template_handler),
        )
        .route(
            v1::checklists::RESPONSE_ITEM,
            get(checklists::get_response_handler),
        )
        // Dashboards
        .route(
            v1::events::timesheets::SUMMARY,
            get(reports::timesheet_summary_handler),
        )
        .route(
            v1::events::timesheets::DETAILED,
            get(reports::detailed_staffing_handler),
        )
        .route(
            v1::events::inventory::SUMMARY,
            get(reports::inventory_summary_handler),
        )
        .route(
            v1::events::checklists::SUMMARY,
            get(reports::checklist_summary_handler),
        )
        .route(
            v1::events::HOURS_EXPORT,
            get(reports::hours_export_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn create_catalog_manager_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            v1::buvettes::PRODUCTS,
            post(buvettes::link_product_handler),
        )
        .route(
            v1::buvettes::PRODUCT_ITEM,
            delete(buvettes::unlink_product_handler),
        )
        .route(
            v1::buvettes::PRODUCTS_REORDER,
            put(buvettes::reorder_products_handler),
        )
        .route(v1::events::COLLECTION, post(events::create_event_handler))
        .route(v1::events::STAFF, post(events::assign_staff_handler))
        .route(
            v1::events::STAFF_ITEM,
            patch(events::update_arrival_handler).delete(events::remove_assignment_handler),
        )
        .route_layer(middleware::from_fn(require_roles(CATALOG_MANAGERS)))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn create_ops_lead_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::events::BUVETTES, post(events::link_buvette_handler))
        .route(
            v1::timesheets::VALIDATE,
            post(timesheets::validate_timesheet_handler),
        )
        .route(
            v1::checklists::RESPONSE_VALIDATE,
            post(checklists::validate_response_handler),
        )
        .route_layer(middleware::from_fn(require_roles(OPS_LEADS)))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn create_admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            v1::staff::MEMBERS,
            post(staff::create_staff_member_handler),
        )
        .route(
            v1::staff::MEMBER_ITEM,
            put(staff::update_staff_member_handler).delete(staff::delete_staff_member_handler),
        )
        .route_layer(middleware::from_fn(require_roles(ADMINS)))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Buvette responsables fill timesheets, counts and checklists
fn create_responsable_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            v1::events::timesheets::DRAFTS,
            post(timesheets::create_draft_handler),
        )
        .route(
            v1::timesheets::ITEM,
            put(timesheets::replace_shifts_handler),
        )
        .route(
            v1::timesheets::SUBMIT,
            post(timesheets::submit_timesheet_handler),
        )
        .route(
            v1::timesheets::SHIFTS,
            post(timesheets::add_shift_handler),
        )
        .route(
            v1::events::inventory::SNAPSHOTS,
            post(inventory::create_snapshot_handler),
        )
        .route(
            v1::events::checklists::FILL,
            post(checklists::fill_checklist_handler),
        )
        .route(
            v1::checklists::RESPONSE_SUBMIT,
            post(checklists::submit_response_handler),
        )
        .route_layer(middleware::from_fn(require_roles(RESPONSABLES)))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn create_logistics_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            v1::events::inventory::RESTOCK,
            get(inventory::restock_handler),
        )
        .route_layer(middleware::from_fn(require_roles(LOGISTICS)))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
