use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::database::ports::staff::StaffRepository;
use crate::error::{CoreError, Result};
use crate::types::{
    catalog::Buvette,
    staff::{NewAssignment, StaffAssignment, StaffMember, StaffMemberInput},
};

const STAFF_COLUMNS: &str =
    "id, first_name, last_name, email, phone, hourly_rate, contract_number, staff_type";

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: i64,
    event_id: i64,
    buvette_id: i64,
    staff_id: i64,
    arrival_time: Option<String>,
    slot_index: Option<i32>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    hourly_rate: Option<f64>,
    contract_number: Option<String>,
    staff_type: String,
    buvette_name: String,
    location_type: Option<String>,
    sport: String,
    is_active: bool,
}

impl From<AssignmentRow> for StaffAssignment {
    fn from(row: AssignmentRow) -> Self {
        StaffAssignment {
            id: row.id,
            event_id: row.event_id,
            buvette_id: row.buvette_id,
            staff_id: row.staff_id,
            arrival_time: row.arrival_time,
            slot_index: row.slot_index,
            staff: StaffMember {
                id: row.staff_id,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                phone: row.phone,
                hourly_rate: row.hourly_rate,
                contract_number: row.contract_number,
                staff_type: row.staff_type,
            },
            buvette: Buvette {
                id: row.buvette_id,
                name: row.buvette_name,
                location_type: row.location_type,
                sport: row.sport,
                is_active: row.is_active,
            },
        }
    }
}

const ASSIGNMENT_SELECT: &str = r#"
    SELECT sa.id, sa.event_id, sa.buvette_id, sa.staff_id, sa.arrival_time, sa.slot_index,
           s.first_name, s.last_name, s.email, s.phone, s.hourly_rate, s.contract_number,
           s.staff_type,
           b.name AS buvette_name, b.location_type, b.sport, b.is_active
    FROM staff_assignments sa
    JOIN staff_members s ON s.id = sa.staff_id
    JOIN buvettes b ON b.id = sa.buvette_id
"#;

#[derive(Clone, Debug)]
pub struct PostgresStaffRepository {
    pool: PgPool,
}

impl PostgresStaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_assignment(
        &self,
        event_id: i64,
        buvette_id: i64,
        staff_id: i64,
    ) -> Result<Option<StaffAssignment>> {
        let sql = format!(
            "{ASSIGNMENT_SELECT} WHERE sa.event_id = $1 AND sa.buvette_id = $2 AND sa.staff_id = $3"
        );
        let row = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(event_id)
            .bind(buvette_id)
            .bind(staff_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(StaffAssignment::from))
    }
}

#[async_trait]
impl StaffRepository for PostgresStaffRepository {
    async fn list_staff(&self) -> Result<Vec<StaffMember>> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff_members ORDER BY last_name, first_name");
        Ok(sqlx::query_as::<_, StaffMember>(&sql)
            .fetch_all(self.pool())
            .await?)
    }

    async fn get_staff(&self, id: i64) -> Result<Option<StaffMember>> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff_members WHERE id = $1");
        Ok(sqlx::query_as::<_, StaffMember>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?)
    }

    async fn find_staff_by_email(&self, email: &str) -> Result<Option<StaffMember>> {
        let sql = format!(
            "SELECT {STAFF_COLUMNS} FROM staff_members WHERE lower(email) = lower($1) ORDER BY id LIMIT 1"
        );
        Ok(sqlx::query_as::<_, StaffMember>(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await?)
    }

    async fn create_staff(&self, input: &StaffMemberInput) -> Result<StaffMember> {
        let sql = format!(
            r#"
            INSERT INTO staff_members
                (first_name, last_name, email, phone, hourly_rate, contract_number, staff_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {STAFF_COLUMNS}
            "#
        );
        let member = sqlx::query_as::<_, StaffMember>(&sql)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.hourly_rate)
            .bind(&input.contract_number)
            .bind(input.staff_type())
            .fetch_one(self.pool())
            .await?;
        info!(staff_id = member.id, "created staff member");
        Ok(member)
    }

    async fn create_staff_batch(&self, inputs: &[StaffMemberInput]) -> Result<u64> {
        let mut tx = self.pool().begin().await?;
        let mut created = 0;
        for input in inputs {
            created += sqlx::query(
                r#"
                INSERT INTO staff_members
                    (first_name, last_name, email, phone, hourly_rate, contract_number, staff_type)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.hourly_rate)
            .bind(&input.contract_number)
            .bind(input.staff_type())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn update_staff(
        &self,
        id: i64,
        input: &StaffMemberInput,
    ) -> Result<Option<StaffMember>> {
        let sql = format!(
            r#"
            UPDATE staff_members
            SET first_name = $2, last_name = $3, email = $4, phone = $5,
                hourly_rate = $6, contract_number = $7, staff_type = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {STAFF_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, StaffMember>(&sql)
            .bind(id)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.hourly_rate)
            .bind(&input.contract_number)
            .bind(input.staff_type())
            .fetch_optional(self.pool())
            .await?)
    }

    async fn delete_staff(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM staff_assignments WHERE staff_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM staff_members WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn list_assignments(&self, event_id: i64) -> Result<Vec<StaffAssignment>> {
        let sql = format!(
            "{ASSIGNMENT_SELECT} WHERE sa.event_id = $1 ORDER BY b.name, sa.slot_index NULLS LAST, sa.id"
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(event_id)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(StaffAssignment::from).collect())
    }

    async fn list_buvette_assignments(
        &self,
        event_id: i64,
        buvette_id: i64,
    ) -> Result<Vec<StaffAssignment>> {
        let sql = format!(
            "{ASSIGNMENT_SELECT} WHERE sa.event_id = $1 AND sa.buvette_id = $2 ORDER BY sa.slot_index NULLS LAST, sa.id"
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(event_id)
            .bind(buvette_id)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(StaffAssignment::from).collect())
    }

    async fn find_event_assignment(
        &self,
        event_id: i64,
        staff_id: i64,
    ) -> Result<Option<StaffAssignment>> {
        let sql = format!("{ASSIGNMENT_SELECT} WHERE sa.event_id = $1 AND sa.staff_id = $2");
        let row = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(event_id)
            .bind(staff_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(StaffAssignment::from))
    }

    async fn count_buvette_assignments(&self, event_id: i64, buvette_id: i64) -> Result<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM staff_assignments WHERE event_id = $1 AND buvette_id = $2",
        )
        .bind(event_id)
        .bind(buvette_id)
        .fetch_one(self.pool())
        .await?)
    }

    async fn create_assignment(&self, assignment: &NewAssignment) -> Result<StaffAssignment> {
        sqlx::query(
            r#"
            INSERT INTO staff_assignments (event_id, buvette_id, staff_id, arrival_time, slot_index)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(assignment.event_id)
        .bind(assignment.buvette_id)
        .bind(assignment.staff_id)
        .bind(&assignment.arrival_time)
        .bind(assignment.slot_index)
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::from_write(e, "Staff member is already assigned for this event")
        })?;

        info!(
            event_id = assignment.event_id,
            buvette_id = assignment.buvette_id,
            staff_id = assignment.staff_id,
            slot = assignment.slot_index,
            "assigned staff"
        );
        self.fetch_assignment(assignment.event_id, assignment.buvette_id, assignment.staff_id)
            .await?
            .ok_or_else(|| CoreError::Internal("assignment vanished after insert".to_string()))
    }

    async fn update_arrival_time(
        &self,
        event_id: i64,
        buvette_id: i64,
        staff_id: i64,
        arrival_time: Option<&str>,
    ) -> Result<Option<StaffAssignment>> {
        let updated = sqlx::query(
            r#"
            UPDATE staff_assignments SET arrival_time = $4
            WHERE event_id = $1 AND buvette_id = $2 AND staff_id = $3
            "#,
        )
        .bind(event_id)
        .bind(buvette_id)
        .bind(staff_id)
        .bind(arrival_time)
        .execute(self.pool())
        .await?
        .rows_affected();
        if updated == 0 {
            return Ok(None);
        }
        self.fetch_assignment(event_id, buvette_id, staff_id).await
    }

    async fn delete_assignment(
        &self,
        event_id: i64,
        buvette_id: i64,
        staff_id: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM staff_assignments WHERE event_id = $1 AND buvette_id = $2 AND staff_id = $3",
        )
        .bind(event_id)
        .bind(buvette_id)
        .bind(staff_id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
