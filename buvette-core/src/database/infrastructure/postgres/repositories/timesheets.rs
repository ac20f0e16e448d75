use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::database::ports::timesheets::TimesheetsRepository;
use crate::domain::status::WorkflowStatus;
use crate::error::{CoreError, Result};
use crate::types::{
    catalog::Buvette,
    events::Event,
    staff::StaffMember,
    timesheets::{NewShift, Shift, StaffedShift, Timesheet, TimesheetDetails, TimesheetReport},
};

const TIMESHEET_COLUMNS: &str = "id, event_id, buvette_id, responsable_id, status, \
     validated_by_id, validated_at, created_at, updated_at";
const SHIFT_COLUMNS: &str = "id, timesheet_id, staff_id, position, start_time, end_time, \
     break_minutes, hours_worked, notes";

#[derive(sqlx::FromRow)]
struct StaffedShiftRow {
    #[sqlx(flatten)]
    shift: Shift,
    member_id: Option<i64>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    hourly_rate: Option<f64>,
    contract_number: Option<String>,
    staff_type: Option<String>,
}

impl From<StaffedShiftRow> for StaffedShift {
    fn from(row: StaffedShiftRow) -> Self {
        let staff = match (row.member_id, row.first_name, row.last_name, row.staff_type) {
            (Some(id), Some(first_name), Some(last_name), Some(staff_type)) => Some(StaffMember {
                id,
                first_name,
                last_name,
                email: row.email,
                phone: row.phone,
                hourly_rate: row.hourly_rate,
                contract_number: row.contract_number,
                staff_type,
            }),
            _ => None,
        };
        StaffedShift {
            shift: row.shift,
            staff,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostgresTimesheetsRepository {
    pool: PgPool,
}

impl PostgresTimesheetsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn timesheets_where(&self, clause: &str, id: i64) -> Result<Vec<Timesheet>> {
        let sql = format!("SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE {clause} ORDER BY id");
        Ok(sqlx::query_as::<_, Timesheet>(&sql)
            .bind(id)
            .fetch_all(self.pool())
            .await?)
    }

    async fn shifts_by_timesheet(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<Shift>>> {
        let sql = format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE timesheet_id = ANY($1) ORDER BY start_time, id"
        );
        let shifts = sqlx::query_as::<_, Shift>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await?;
        let mut grouped: HashMap<i64, Vec<Shift>> = HashMap::new();
        for shift in shifts {
            grouped.entry(shift.timesheet_id).or_default().push(shift);
        }
        Ok(grouped)
    }

    async fn buvettes_by_id(&self, ids: &[i64]) -> Result<HashMap<i64, Buvette>> {
        let buvettes = sqlx::query_as::<_, Buvette>(
            "SELECT id, name, location_type, sport, is_active FROM buvettes WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await?;
        Ok(buvettes.into_iter().map(|b| (b.id, b)).collect())
    }

    async fn with_details(&self, timesheets: Vec<Timesheet>) -> Result<Vec<TimesheetDetails>> {
        let ids: Vec<i64> = timesheets.iter().map(|t| t.id).collect();
        let buvette_ids: Vec<i64> = timesheets.iter().map(|t| t.buvette_id).collect();
        let mut shifts = self.shifts_by_timesheet(&ids).await?;
        let buvettes = self.buvettes_by_id(&buvette_ids).await?;
        Ok(timesheets
            .into_iter()
            .map(|timesheet| TimesheetDetails {
                shifts: shifts.remove(&timesheet.id).unwrap_or_default(),
                buvette: buvettes.get(&timesheet.buvette_id).cloned(),
                event: None,
                timesheet,
            })
            .collect())
    }

    async fn load_details(&self, id: i64) -> Result<Option<TimesheetDetails>> {
        let timesheets = self.timesheets_where("id = $1", id).await?;
        Ok(self.with_details(timesheets).await?.into_iter().next())
    }

    async fn insert_shifts(
        tx: &mut Transaction<'_, Postgres>,
        timesheet_id: i64,
        shifts: &[NewShift],
    ) -> Result<()> {
        for shift in shifts {
            sqlx::query(
                r#"
                INSERT INTO shifts
                    (timesheet_id, staff_id, position, start_time, end_time,
                     break_minutes, hours_worked, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(timesheet_id)
            .bind(shift.staff_id)
            .bind(&shift.position)
            .bind(shift.start_time)
            .bind(shift.end_time)
            .bind(shift.break_minutes)
            .bind(shift.hours_worked)
            .bind(&shift.notes)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    fn vanished(id: i64) -> CoreError {
        CoreError::Internal(format!("timesheet {id} vanished after write"))
    }
}

#[async_trait]
impl TimesheetsRepository for PostgresTimesheetsRepository {
    async fn list_for_event(&self, event_id: i64) -> Result<Vec<TimesheetDetails>> {
        let timesheets = self.timesheets_where("event_id = $1", event_id).await?;
        self.with_details(timesheets).await
    }

    async fn find_for_buvette(
        &self,
        event_id: i64,
        buvette_id: i64,
    ) -> Result<Option<TimesheetDetails>> {
        let sql = format!(
            "SELECT {TIMESHEET_COLUMNS} FROM timesheets WHERE event_id = $1 AND buvette_id = $2"
        );
        let timesheet = sqlx::query_as::<_, Timesheet>(&sql)
            .bind(event_id)
            .bind(buvette_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(self
            .with_details(timesheet.into_iter().collect())
            .await?
            .into_iter()
            .next())
    }

    async fn get_timesheet(&self, id: i64) -> Result<Option<TimesheetDetails>> {
        let Some(mut details) = self.load_details(id).await? else {
            return Ok(None);
        };
        details.event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, name, date, venue, sport, opening_time, match_time, notes
            FROM events WHERE id = $1
            "#,
        )
        .bind(details.timesheet.event_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(Some(details))
    }

    async fn submit_from_kiosk(
        &self,
        event_id: i64,
        buvette_id: i64,
        responsable_id: Option<i64>,
        shifts: &[NewShift],
    ) -> Result<TimesheetDetails> {
        let mut tx = self.pool().begin().await?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO timesheets (event_id, buvette_id, responsable_id, status)
            VALUES ($1, $2, $3, 'SUBMITTED')
            ON CONFLICT (event_id, buvette_id) DO UPDATE
            SET status = 'SUBMITTED',
                responsable_id = COALESCE(EXCLUDED.responsable_id, timesheets.responsable_id),
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(event_id)
        .bind(buvette_id)
        .bind(responsable_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if e
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation())
            {
                CoreError::validation(format!("Unknown buvette {buvette_id}"))
            } else {
                CoreError::Database(e)
            }
        })?;

        sqlx::query("DELETE FROM shifts WHERE timesheet_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_shifts(&mut tx, id, shifts).await?;
        tx.commit().await?;

        info!(
            timesheet_id = id,
            event_id,
            buvette_id,
            shifts = shifts.len(),
            "timesheet submitted from kiosk"
        );
        self.load_details(id).await?.ok_or_else(|| Self::vanished(id))
    }

    async fn create_draft(
        &self,
        event_id: i64,
        buvette_id: i64,
        responsable_id: i64,
        shifts: &[NewShift],
    ) -> Result<TimesheetDetails> {
        let mut tx = self.pool().begin().await?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO timesheets (event_id, buvette_id, responsable_id, status)
            VALUES ($1, $2, $3, 'DRAFT')
            RETURNING id
            "#,
        )
        .bind(event_id)
        .bind(buvette_id)
        .bind(responsable_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::from_write(e, "A timesheet already exists for this buvette and event")
        })?;
        Self::insert_shifts(&mut tx, id, shifts).await?;
        tx.commit().await?;

        info!(timesheet_id = id, event_id, buvette_id, "draft timesheet created");
        self.load_details(id).await?.ok_or_else(|| Self::vanished(id))
    }

    async fn replace_shifts(&self, id: i64, shifts: &[NewShift]) -> Result<TimesheetDetails> {
        let mut tx = self.pool().begin().await?;
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM timesheets WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let status: WorkflowStatus = status
            .ok_or_else(|| CoreError::not_found(format!("Timesheet {id} not found")))?
            .parse()?;
        if status.is_locked() {
            return Err(CoreError::validation(
                "Validated timesheets can no longer be modified",
            ));
        }

        sqlx::query("DELETE FROM shifts WHERE timesheet_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_shifts(&mut tx, id, shifts).await?;
        sqlx::query("UPDATE timesheets SET status = 'DRAFT', updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.load_details(id).await?.ok_or_else(|| Self::vanished(id))
    }

    async fn add_shift(&self, timesheet_id: i64, shift: &NewShift) -> Result<Option<Shift>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM timesheets WHERE id = $1)")
                .bind(timesheet_id)
                .fetch_one(self.pool())
                .await?;
        if !exists {
            return Ok(None);
        }
        let sql = format!(
            r#"
            INSERT INTO shifts
                (timesheet_id, staff_id, position, start_time, end_time,
                 break_minutes, hours_worked, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SHIFT_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Shift>(&sql)
            .bind(timesheet_id)
            .bind(shift.staff_id)
            .bind(&shift.position)
            .bind(shift.start_time)
            .bind(shift.end_time)
            .bind(shift.break_minutes)
            .bind(shift.hours_worked)
            .bind(&shift.notes)
            .fetch_one(self.pool())
            .await?;
        Ok(Some(created))
    }

    async fn set_status(
        &self,
        id: i64,
        status: WorkflowStatus,
        validated_by: Option<i64>,
    ) -> Result<Option<Timesheet>> {
        let sql = format!(
            r#"
            UPDATE timesheets
            SET status = $2,
                validated_by_id = CASE WHEN $2 = 'VALIDATED' THEN $3 ELSE validated_by_id END,
                validated_at = CASE WHEN $2 = 'VALIDATED' THEN NOW() ELSE validated_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TIMESHEET_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Timesheet>(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(validated_by)
            .fetch_optional(self.pool())
            .await?;
        if updated.is_some() {
            info!(timesheet_id = id, status = %status, "timesheet status changed");
        }
        Ok(updated)
    }

    async fn reports_for_event(&self, event_id: i64) -> Result<Vec<TimesheetReport>> {
        let timesheets = self.timesheets_where("event_id = $1", event_id).await?;
        let ids: Vec<i64> = timesheets.iter().map(|t| t.id).collect();
        let buvette_ids: Vec<i64> = timesheets.iter().map(|t| t.buvette_id).collect();
        let buvettes = self.buvettes_by_id(&buvette_ids).await?;

        let rows = sqlx::query_as::<_, StaffedShiftRow>(
            r#"
            SELECT sh.id, sh.timesheet_id, sh.staff_id, sh.position, sh.start_time, sh.end_time,
                   sh.break_minutes, sh.hours_worked, sh.notes,
                   s.id AS member_id, s.first_name, s.last_name, s.email, s.phone,
                   s.hourly_rate, s.contract_number, s.staff_type
            FROM shifts sh
            LEFT JOIN staff_members s ON s.id = sh.staff_id
            WHERE sh.timesheet_id = ANY($1)
            ORDER BY sh.start_time, sh.id
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;
        let mut shifts: HashMap<i64, Vec<StaffedShift>> = HashMap::new();
        for row in rows {
            shifts
                .entry(row.shift.timesheet_id)
                .or_default()
                .push(StaffedShift::from(row));
        }

        Ok(timesheets
            .into_iter()
            .filter_map(|timesheet| {
                let buvette = buvettes.get(&timesheet.buvette_id)?.clone();
                Some(TimesheetReport {
                    shifts: shifts.remove(&timesheet.id).unwrap_or_default(),
                    buvette,
                    timesheet,
                })
            })
            .collect())
    }
}
