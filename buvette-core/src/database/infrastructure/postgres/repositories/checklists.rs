use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::database::ports::checklists::ChecklistsRepository;
use crate::domain::status::WorkflowStatus;
use crate::error::{CoreError, Result};
use crate::types::{
    catalog::Buvette,
    checklists::{
        ChecklistAnswer, ChecklistItem, ChecklistReport, ChecklistResponse,
        ChecklistResponseItem, ChecklistTemplate,
    },
};

const RESPONSE_COLUMNS: &str =
    "id, event_id, buvette_id, template_id, status, filled_at, validated_at";
const RESPONSE_ITEM_COLUMNS: &str = "id, response_id, item_id, value, comment";

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: i64,
    name: String,
    description: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ResponseRow {
    id: i64,
    event_id: i64,
    buvette_id: i64,
    template_id: i64,
    #[sqlx(try_from = "String")]
    status: WorkflowStatus,
    filled_at: DateTime<Utc>,
    validated_at: Option<DateTime<Utc>>,
}

impl ResponseRow {
    fn into_response(
        self,
        items: Vec<ChecklistResponseItem>,
        template: Option<ChecklistTemplate>,
    ) -> ChecklistResponse {
        ChecklistResponse {
            id: self.id,
            event_id: self.event_id,
            buvette_id: self.buvette_id,
            template_id: self.template_id,
            status: self.status,
            filled_at: self.filled_at,
            validated_at: self.validated_at,
            items,
            template,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostgresChecklistsRepository {
    pool: PgPool,
}

impl PostgresChecklistsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn templates_where(&self, clause: &str, id: Option<i64>) -> Result<Vec<ChecklistTemplate>> {
        let sql = format!("SELECT id, name, description FROM checklist_templates {clause} ORDER BY id");
        let mut query = sqlx::query_as::<_, TemplateRow>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        let templates = query.fetch_all(self.pool()).await?;

        let ids: Vec<i64> = templates.iter().map(|t| t.id).collect();
        let items = sqlx::query_as::<_, ChecklistItem>(
            r#"
            SELECT id, template_id, label, order_index
            FROM checklist_items
            WHERE template_id = ANY($1)
            ORDER BY order_index, id
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;
        let mut by_template: HashMap<i64, Vec<ChecklistItem>> = HashMap::new();
        for item in items {
            by_template.entry(item.template_id).or_default().push(item);
        }

        Ok(templates
            .into_iter()
            .map(|t| ChecklistTemplate {
                items: by_template.remove(&t.id).unwrap_or_default(),
                id: t.id,
                name: t.name,
                description: t.description,
            })
            .collect())
    }

    async fn response_items(&self, response_ids: &[i64]) -> Result<HashMap<i64, Vec<ChecklistResponseItem>>> {
        let sql = format!(
            "SELECT {RESPONSE_ITEM_COLUMNS} FROM checklist_response_items WHERE response_id = ANY($1) ORDER BY id"
        );
        let items = sqlx::query_as::<_, ChecklistResponseItem>(&sql)
            .bind(response_ids)
            .fetch_all(self.pool())
            .await?;
        let mut grouped: HashMap<i64, Vec<ChecklistResponseItem>> = HashMap::new();
        for item in items {
            grouped.entry(item.response_id).or_default().push(item);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl ChecklistsRepository for PostgresChecklistsRepository {
    async fn list_templates(&self) -> Result<Vec<ChecklistTemplate>> {
        self.templates_where("", None).await
    }

    async fn get_template(&self, id: i64) -> Result<Option<ChecklistTemplate>> {
        Ok(self
            .templates_where("WHERE id = $1", Some(id))
            .await?
            .into_iter()
            .next())
    }

    async fn ensure_template(
        &self,
        name: &str,
        description: Option<&str>,
        labels: &[&str],
    ) -> Result<ChecklistTemplate> {
        let mut tx = self.pool().begin().await?;
        let created: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO checklist_templates (name, description) VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match created {
            Some(id) => {
                for (index, label) in labels.iter().enumerate() {
                    sqlx::query(
                        "INSERT INTO checklist_items (template_id, label, order_index) VALUES ($1, $2, $3)",
                    )
                    .bind(id)
                    .bind(label)
                    .bind(index as i32 + 1)
                    .execute(&mut *tx)
                    .await?;
                }
                info!(template_id = id, name, items = labels.len(), "created checklist template");
                id
            }
            None => {
                sqlx::query_scalar("SELECT id FROM checklist_templates WHERE name = $1")
                    .bind(name)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };
        tx.commit().await?;

        self.get_template(id)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("template {id} vanished after insert")))
    }

    async fn create_response(
        &self,
        event_id: i64,
        buvette_id: i64,
        template_id: i64,
        answers: &[ChecklistAnswer],
    ) -> Result<ChecklistResponse> {
        let mut tx = self.pool().begin().await?;
        let sql = format!(
            r#"
            INSERT INTO checklist_responses (event_id, buvette_id, template_id, status)
            VALUES ($1, $2, $3, 'DRAFT')
            RETURNING {RESPONSE_COLUMNS}
            "#
        );
        let response = sqlx::query_as::<_, ResponseRow>(&sql)
            .bind(event_id)
            .bind(buvette_id)
            .bind(template_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if e
                    .as_database_error()
                    .is_some_and(|db| db.is_foreign_key_violation())
                {
                    CoreError::not_found(format!(
                        "Event {event_id}, buvette {buvette_id} or template {template_id} not found"
                    ))
                } else {
                    CoreError::Database(e)
                }
            })?;

        let insert_item = format!(
            r#"
            INSERT INTO checklist_response_items (response_id, item_id, value, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING {RESPONSE_ITEM_COLUMNS}
            "#
        );
        let mut items = Vec::with_capacity(answers.len());
        for answer in answers {
            let item = sqlx::query_as::<_, ChecklistResponseItem>(&insert_item)
                .bind(response.id)
                .bind(answer.item_id)
                .bind(answer.value)
                .bind(answer.comment.as_deref().filter(|c| !c.is_empty()))
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    if e
                        .as_database_error()
                        .is_some_and(|db| db.is_foreign_key_violation())
                    {
                        CoreError::validation(format!("Unknown checklist item {}", answer.item_id))
                    } else {
                        CoreError::Database(e)
                    }
                })?;
            items.push(item);
        }
        tx.commit().await?;

        info!(response_id = response.id, event_id, buvette_id, template_id, "checklist filled");
        Ok(response.into_response(items, None))
    }

    async fn get_response(&self, id: i64) -> Result<Option<ChecklistResponse>> {
        let sql = format!("SELECT {RESPONSE_COLUMNS} FROM checklist_responses WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, ResponseRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?
        else {
            return Ok(None);
        };
        let items = self.response_items(&[id]).await?.remove(&id).unwrap_or_default();
        let template = self.get_template(row.template_id).await?;
        Ok(Some(row.into_response(items, template)))
    }

    async fn set_response_status(
        &self,
        id: i64,
        status: WorkflowStatus,
    ) -> Result<Option<ChecklistResponse>> {
        let sql = format!(
            r#"
            UPDATE checklist_responses
            SET status = $2,
                validated_at = CASE WHEN $2 = 'VALIDATED' THEN NOW() ELSE validated_at END
            WHERE id = $1
            RETURNING {RESPONSE_COLUMNS}
            "#
        );
        let Some(row) = sqlx::query_as::<_, ResponseRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(self.pool())
            .await?
        else {
            return Ok(None);
        };
        info!(response_id = id, status = %status, "checklist status changed");
        let items = self.response_items(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(Some(row.into_response(items, None)))
    }

    async fn reports_for_event(&self, event_id: i64) -> Result<Vec<ChecklistReport>> {
        let sql = format!(
            "SELECT {RESPONSE_COLUMNS} FROM checklist_responses WHERE event_id = $1 ORDER BY filled_at, id"
        );
        let rows = sqlx::query_as::<_, ResponseRow>(&sql)
            .bind(event_id)
            .fetch_all(self.pool())
            .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut items = self.response_items(&ids).await?;
        let templates: HashMap<i64, String> = self
            .templates_where("", None)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        let buvette_ids: Vec<i64> = rows.iter().map(|r| r.buvette_id).collect();
        let buvettes: HashMap<i64, Buvette> = sqlx::query_as::<_, Buvette>(
            "SELECT id, name, location_type, sport, is_active FROM buvettes WHERE id = ANY($1)",
        )
        .bind(&buvette_ids)
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let buvette = buvettes.get(&row.buvette_id)?.clone();
                let template_name = templates.get(&row.template_id)?.clone();
                let response_items = items.remove(&row.id).unwrap_or_default();
                Some(ChecklistReport {
                    response: row.into_response(response_items, None),
                    template_name,
                    buvette,
                })
            })
            .collect())
    }
}
