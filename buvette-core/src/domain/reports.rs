//! Per-event aggregations for the back-office dashboards.
//!
//! Everything here is pure: repositories load the rows, these functions fold
//! them. Groupings are keyed by buvette id and come out in ascending id order.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{hours::round_hours, status::WorkflowStatus};
use crate::error::Result;
use crate::types::{
    checklists::ChecklistReport,
    events::{Event, EventBuvette},
    inventory::DeltaWithRefs,
    staff::StaffAssignment,
    timesheets::TimesheetReport,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftLine {
    pub buvette: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffHours {
    pub staff_id: i64,
    pub name: String,
    pub total_hours: f64,
    pub shifts: Vec<ShiftLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuvetteHours {
    pub buvette_id: i64,
    pub name: String,
    pub status: WorkflowStatus,
    pub total_hours: f64,
    pub shift_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimesheetSummary {
    pub by_staff: Vec<StaffHours>,
    pub by_buvette: Vec<BuvetteHours>,
}

/// Hours per staff member (most hours first) and per buvette.
pub fn timesheet_summary(reports: &[TimesheetReport]) -> TimesheetSummary {
    let mut by_staff: BTreeMap<i64, StaffHours> = BTreeMap::new();
    let mut by_buvette: BTreeMap<i64, BuvetteHours> = BTreeMap::new();

    for report in reports {
        let buvette = by_buvette
            .entry(report.buvette.id)
            .or_insert_with(|| BuvetteHours {
                buvette_id: report.buvette.id,
                name: report.buvette.name.clone(),
                status: report.timesheet.status,
                total_hours: 0.0,
                shift_count: 0,
            });
        buvette.status = report.timesheet.status;

        for staffed in &report.shifts {
            let shift = &staffed.shift;
            let staff = by_staff
                .entry(shift.staff_id)
                .or_insert_with(|| StaffHours {
                    staff_id: shift.staff_id,
                    name: staffed.staff_name(),
                    total_hours: 0.0,
                    shifts: Vec::new(),
                });
            staff.total_hours += shift.hours_worked;
            staff.shifts.push(ShiftLine {
                buvette: report.buvette.name.clone(),
                start: shift.start_time,
                end: shift.end_time,
                hours: shift.hours_worked,
            });

            buvette.total_hours += shift.hours_worked;
            buvette.shift_count += 1;
        }
    }

    let mut by_staff: Vec<StaffHours> = by_staff
        .into_values()
        .map(|mut s| {
            s.total_hours = round_hours(s.total_hours);
            s
        })
        .collect();
    by_staff.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));

    TimesheetSummary {
        by_staff,
        by_buvette: by_buvette
            .into_values()
            .map(|mut b| {
                b.total_hours = round_hours(b.total_hours);
                b
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffClockStatus {
    pub staff_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub has_clocked: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub break_minutes: i32,
    pub hours_worked: f64,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuvetteStaffing {
    pub buvette_id: i64,
    pub buvette_name: String,
    pub responsable: Option<String>,
    /// Timesheet status, or `NONE` when nothing was recorded.
    pub timesheet_status: String,
    pub assigned_count: usize,
    pub clocked_count: usize,
    pub total_hours: f64,
    pub staff: Vec<StaffClockStatus>,
}

const DEFAULT_POSITION: &str = "Extra";

/// For each buvette opened for the event, who was planned and who clocked in.
pub fn detailed_staffing(
    links: &[EventBuvette],
    assignments: &[StaffAssignment],
    reports: &[TimesheetReport],
) -> Vec<BuvetteStaffing> {
    links
        .iter()
        .map(|link| {
            let report = reports.iter().find(|r| r.buvette.id == link.buvette_id);
            let staff: Vec<StaffClockStatus> = assignments
                .iter()
                .filter(|a| a.buvette_id == link.buvette_id)
                .map(|assignment| {
                    let shift = report.and_then(|r| {
                        r.shifts
                            .iter()
                            .map(|s| &s.shift)
                            .find(|s| s.staff_id == assignment.staff_id)
                    });
                    StaffClockStatus {
                        staff_id: assignment.staff_id,
                        name: assignment.staff.full_name(),
                        email: assignment.staff.email.clone(),
                        has_clocked: shift.is_some(),
                        start_time: shift.map(|s| s.start_time),
                        end_time: shift.map(|s| s.end_time),
                        break_minutes: shift.map_or(0, |s| s.break_minutes),
                        hours_worked: shift.map_or(0.0, |s| s.hours_worked),
                        position: shift
                            .map(|s| s.position.clone())
                            .unwrap_or_else(|| DEFAULT_POSITION.to_string()),
                    }
                })
                .collect();

            BuvetteStaffing {
                buvette_id: link.buvette_id,
                buvette_name: link.buvette.name.clone(),
                responsable: link.responsable.as_ref().map(|r| r.full_name()),
                timesheet_status: report
                    .map(|r| r.timesheet.status.to_string())
                    .unwrap_or_else(|| "NONE".to_string()),
                assigned_count: staff.len(),
                clocked_count: staff.iter().filter(|s| s.has_clocked).count(),
                total_hours: round_hours(staff.iter().map(|s| s.hours_worked).sum()),
                staff,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryLine {
    pub product: String,
    pub initial: Option<i32>,
    #[serde(rename = "final")]
    pub final_qty: Option<i32>,
    pub restock: Option<i32>,
    pub shortage: Option<i32>,
    pub is_restocked: bool,
    pub has_shortage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuvetteInventorySummary {
    pub buvette_id: i64,
    pub buvette_name: String,
    pub product_count: usize,
    pub restocked_count: usize,
    pub shortage_count: usize,
    pub items: Vec<InventoryLine>,
}

pub fn inventory_summary(deltas: &[DeltaWithRefs]) -> Vec<BuvetteInventorySummary> {
    let mut grouped: BTreeMap<i64, BuvetteInventorySummary> = BTreeMap::new();
    for row in deltas {
        let d = &row.delta;
        let entry = grouped
            .entry(d.buvette_id)
            .or_insert_with(|| BuvetteInventorySummary {
                buvette_id: d.buvette_id,
                buvette_name: row.buvette.name.clone(),
                product_count: 0,
                restocked_count: 0,
                shortage_count: 0,
                items: Vec::new(),
            });
        entry.product_count += 1;
        if d.is_restocked {
            entry.restocked_count += 1;
        }
        if d.has_shortage {
            entry.shortage_count += 1;
        }
        entry.items.push(InventoryLine {
            product: row.product.name.clone(),
            initial: d.initial_qty,
            final_qty: d.final_qty,
            restock: d.restock_quantity,
            shortage: d.shortage_qty,
            is_restocked: d.is_restocked,
            has_shortage: d.has_shortage,
        });
    }
    grouped.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestockLine {
    pub buvette: String,
    pub product: String,
    pub unit: Option<String>,
    pub restock_quantity: i32,
    pub delta: i32,
}

/// What logistics has to bring back to each buvette.
pub fn restock_lines(deltas: &[DeltaWithRefs]) -> Vec<RestockLine> {
    deltas
        .iter()
        .map(|row| RestockLine {
            buvette: row.buvette.name.clone(),
            product: row.product.name.clone(),
            unit: row.product.unit.clone(),
            restock_quantity: row.delta.restock_quantity.unwrap_or(0),
            delta: row.delta.delta.unwrap_or(0),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistPhase {
    Opening,
    Closing,
}

impl ChecklistPhase {
    /// Guesses the phase from a template name, in French or English.
    pub fn detect(template_name: &str) -> Option<Self> {
        let lower = template_name.to_lowercase();
        if lower.contains("ouverture") || lower.contains("opening") {
            Some(ChecklistPhase::Opening)
        } else if lower.contains("fermeture") || lower.contains("closing") {
            Some(ChecklistPhase::Closing)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistOutcome {
    pub template_name: String,
    pub status: WorkflowStatus,
    pub completed_at: DateTime<Utc>,
    pub total_items: usize,
    pub ok_count: usize,
    pub issue_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuvetteChecklistSummary {
    pub buvette_id: i64,
    pub buvette_name: String,
    pub opening: Option<ChecklistOutcome>,
    pub closing: Option<ChecklistOutcome>,
}

/// Latest opening and closing checklist per buvette. Reports are expected in
/// fill order so a later response replaces an earlier one of the same phase.
pub fn checklist_summary(reports: &[ChecklistReport]) -> Vec<BuvetteChecklistSummary> {
    let mut grouped: BTreeMap<i64, BuvetteChecklistSummary> = BTreeMap::new();
    for report in reports {
        let entry = grouped
            .entry(report.buvette.id)
            .or_insert_with(|| BuvetteChecklistSummary {
                buvette_id: report.buvette.id,
                buvette_name: report.buvette.name.clone(),
                opening: None,
                closing: None,
            });

        let items = &report.response.items;
        let outcome = ChecklistOutcome {
            template_name: report.template_name.clone(),
            status: report.response.status,
            completed_at: report.response.filled_at,
            total_items: items.len(),
            ok_count: items.iter().filter(|i| i.value).count(),
            issue_count: items.iter().filter(|i| !i.value).count(),
        };

        match ChecklistPhase::detect(&report.template_name) {
            Some(ChecklistPhase::Opening) => entry.opening = Some(outcome),
            Some(ChecklistPhase::Closing) => entry.closing = Some(outcome),
            None => {}
        }
    }
    grouped.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportHeader {
    pub name: String,
    pub date: DateTime<Utc>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoursRow {
    pub event_name: String,
    pub event_date: DateTime<Utc>,
    pub buvette: String,
    pub staff_name: String,
    pub staff_email: String,
    pub position: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub break_minutes: i32,
    pub hours_worked: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoursExport {
    pub event: ExportHeader,
    pub total_hours: f64,
    /// Distinct staff e-mails; shifts without one count once together.
    pub total_staff: usize,
    pub rows: Vec<HoursRow>,
}

fn caseless_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Flattens every shift of the event for payroll, sorted by buvette then
/// staff name.
pub fn hours_export(event: &Event, reports: &[TimesheetReport]) -> HoursExport {
    let mut rows: Vec<HoursRow> = reports
        .iter()
        .flat_map(|report| {
            report.shifts.iter().map(move |staffed| {
                let shift = &staffed.shift;
                HoursRow {
                    event_name: event.name.clone(),
                    event_date: event.date,
                    buvette: report.buvette.name.clone(),
                    staff_name: staffed.staff_name(),
                    staff_email: staffed
                        .staff
                        .as_ref()
                        .and_then(|s| s.email.clone())
                        .unwrap_or_default(),
                    position: shift.position.clone(),
                    start_time: shift.start_time,
                    end_time: shift.end_time,
                    break_minutes: shift.break_minutes,
                    hours_worked: shift.hours_worked,
                    notes: shift.notes.clone().unwrap_or_default(),
                }
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        caseless_cmp(&a.buvette, &b.buvette).then_with(|| caseless_cmp(&a.staff_name, &b.staff_name))
    });

    let total_staff = rows
        .iter()
        .map(|r| r.staff_email.as_str())
        .collect::<HashSet<_>>()
        .len();

    HoursExport {
        event: ExportHeader {
            name: event.name.clone(),
            date: event.date,
            venue: event.venue.clone(),
        },
        total_hours: round_hours(rows.iter().map(|r| r.hours_worked).sum()),
        total_staff,
        rows,
    }
}

/// Renders export rows as CSV with a header line.
pub fn hours_csv(rows: &[HoursRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "event",
        "date",
        "buvette",
        "staff",
        "email",
        "position",
        "start",
        "end",
        "break_minutes",
        "hours",
        "notes",
    ])?;
    for row in rows {
        writer.write_record([
            row.event_name.as_str(),
            &row.event_date.format("%Y-%m-%d").to_string(),
            row.buvette.as_str(),
            row.staff_name.as_str(),
            row.staff_email.as_str(),
            row.position.as_str(),
            &row.start_time.format("%H:%M").to_string(),
            &row.end_time.format("%H:%M").to_string(),
            &row.break_minutes.to_string(),
            &format!("{:.2}", row.hours_worked),
            row.notes.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::CoreError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| crate::error::CoreError::Internal(e.to_string()))
}
