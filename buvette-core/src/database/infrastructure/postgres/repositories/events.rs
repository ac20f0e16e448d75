use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::database::ports::events::EventsRepository;
use crate::error::{CoreError, Result};
use crate::types::{
    catalog::Buvette,
    events::{Event, EventBuvette, EventWithBuvettes, NewEvent},
    users::UserSummary,
};

const EVENT_COLUMNS: &str = "id, name, date, venue, sport, opening_time, match_time, notes";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    event_id: i64,
    buvette_id: i64,
    responsable_id: Option<i64>,
    buvette_name: String,
    location_type: Option<String>,
    sport: String,
    is_active: bool,
    responsable_first_name: Option<String>,
    responsable_last_name: Option<String>,
    responsable_email: Option<String>,
}

impl From<LinkRow> for EventBuvette {
    fn from(row: LinkRow) -> Self {
        let responsable = match (
            row.responsable_id,
            row.responsable_first_name,
            row.responsable_last_name,
            row.responsable_email,
        ) {
            (Some(id), Some(first_name), Some(last_name), Some(email)) => Some(UserSummary {
                id,
                first_name,
                last_name,
                email,
            }),
            _ => None,
        };
        EventBuvette {
            id: row.id,
            event_id: row.event_id,
            buvette_id: row.buvette_id,
            responsable_id: row.responsable_id,
            buvette: Buvette {
                id: row.buvette_id,
                name: row.buvette_name,
                location_type: row.location_type,
                sport: row.sport,
                is_active: row.is_active,
            },
            responsable,
        }
    }
}

const LINK_SELECT: &str = r#"
    SELECT eb.id, eb.event_id, eb.buvette_id, eb.responsable_id,
           b.name AS buvette_name, b.location_type, b.sport, b.is_active,
           u.first_name AS responsable_first_name,
           u.last_name AS responsable_last_name,
           u.email AS responsable_email
    FROM event_buvettes eb
    JOIN buvettes b ON b.id = eb.buvette_id
    LEFT JOIN users u ON u.id = eb.responsable_id
"#;

#[derive(Clone, Debug)]
pub struct PostgresEventsRepository {
    pool: PgPool,
}

impl PostgresEventsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn links_for(&self, event_ids: &[i64]) -> Result<Vec<EventBuvette>> {
        let sql = format!("{LINK_SELECT} WHERE eb.event_id = ANY($1) ORDER BY b.name, eb.id");
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(event_ids)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(EventBuvette::from).collect())
    }

    async fn insert_link(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
        buvette_id: i64,
        responsable_id: Option<i64>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO event_buvettes (event_id, buvette_id, responsable_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, buvette_id) DO UPDATE
            SET responsable_id = COALESCE(EXCLUDED.responsable_id, event_buvettes.responsable_id)
            "#,
        )
        .bind(event_id)
        .bind(buvette_id)
        .bind(responsable_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if e
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation())
            {
                CoreError::validation(format!(
                    "Unknown buvette {buvette_id} or responsable for event {event_id}"
                ))
            } else {
                CoreError::Database(e)
            }
        })?;
        Ok(())
    }
}

#[async_trait]
impl EventsRepository for PostgresEventsRepository {
    async fn list_events(&self) -> Result<Vec<EventWithBuvettes>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date DESC, id DESC");
        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(self.pool())
            .await?;
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();

        let mut by_event: HashMap<i64, Vec<EventBuvette>> = HashMap::new();
        for link in self.links_for(&ids).await? {
            by_event.entry(link.event_id).or_default().push(link);
        }

        Ok(events
            .into_iter()
            .map(|event| {
                let buvettes = by_event.remove(&event.id).unwrap_or_default();
                EventWithBuvettes { event, buvettes }
            })
            .collect())
    }

    async fn get_event(&self, id: i64) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?)
    }

    async fn get_event_with_buvettes(&self, id: i64) -> Result<Option<EventWithBuvettes>> {
        let Some(event) = self.get_event(id).await? else {
            return Ok(None);
        };
        let buvettes = self.links_for(&[id]).await?;
        Ok(Some(EventWithBuvettes { event, buvettes }))
    }

    async fn find_event_by_name(&self, name: &str) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE name = $1 ORDER BY id LIMIT 1");
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(name)
            .fetch_optional(self.pool())
            .await?)
    }

    async fn create_event(&self, event: &NewEvent) -> Result<EventWithBuvettes> {
        let mut tx = self.pool().begin().await?;

        let sql = format!(
            r#"
            INSERT INTO events (name, date, venue, sport, opening_time, match_time, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Event>(&sql)
            .bind(&event.name)
            .bind(event.date)
            .bind(&event.venue)
            .bind(&event.sport)
            .bind(event.opening_time)
            .bind(event.match_time)
            .bind(&event.notes)
            .fetch_one(&mut *tx)
            .await?;

        for &buvette_id in &event.buvette_ids {
            Self::insert_link(&mut tx, created.id, buvette_id, None).await?;
        }
        tx.commit().await?;

        info!(
            event_id = created.id,
            buvettes = event.buvette_ids.len(),
            "created event"
        );
        let buvettes = self.links_for(&[created.id]).await?;
        Ok(EventWithBuvettes {
            event: created,
            buvettes,
        })
    }

    async fn list_event_buvettes(&self, event_id: i64) -> Result<Vec<EventBuvette>> {
        self.links_for(&[event_id]).await
    }

    async fn get_event_buvette(
        &self,
        event_id: i64,
        buvette_id: i64,
    ) -> Result<Option<EventBuvette>> {
        let sql = format!("{LINK_SELECT} WHERE eb.event_id = $1 AND eb.buvette_id = $2");
        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(event_id)
            .bind(buvette_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(EventBuvette::from))
    }

    async fn link_buvette(
        &self,
        event_id: i64,
        buvette_id: i64,
        responsable_id: Option<i64>,
    ) -> Result<EventBuvette> {
        let mut tx = self.pool().begin().await?;
        Self::insert_link(&mut tx, event_id, buvette_id, responsable_id).await?;
        tx.commit().await?;
        self.get_event_buvette(event_id, buvette_id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!("link {event_id}/{buvette_id} vanished after upsert"))
            })
    }
}
