use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::database::ports::users::UsersRepository;
use crate::domain::roles::Role;
use crate::error::{CoreError, Result};
use crate::types::users::{NewUser, User, UserCredentials, UserSummary};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    roles: Vec<String>,
}

impl UserRow {
    fn into_credentials(self) -> UserCredentials {
        let roles = self
            .roles
            .iter()
            .filter_map(|name| match name.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    warn!(user_id = self.id, role = %name, "ignoring unknown role");
                    None
                }
            })
            .collect();
        UserCredentials {
            user: User {
                id: self.id,
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                roles,
            },
            password_hash: self.password_hash,
        }
    }
}

const USER_WITH_ROLES: &str = r#"
    SELECT u.id, u.first_name, u.last_name, u.email, u.password_hash,
           COALESCE(array_agg(r.name ORDER BY r.name) FILTER (WHERE r.name IS NOT NULL), '{}') AS roles
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        let sql = format!("{USER_WITH_ROLES} WHERE u.email = $1 GROUP BY u.id");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(UserRow::into_credentials))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("{USER_WITH_ROLES} WHERE u.id = $1 GROUP BY u.id");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|r| r.into_credentials().user))
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, first_name, last_name, email FROM users ORDER BY last_name, first_name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    async fn ensure_roles(&self, roles: &[Role]) -> Result<()> {
        let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        sqlx::query(
            "INSERT INTO roles (name) SELECT UNNEST($1::TEXT[]) ON CONFLICT (name) DO NOTHING",
        )
        .bind(&names)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn ensure_user(&self, user: &NewUser) -> Result<User> {
        let mut tx = self.pool().begin().await?;

        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match inserted {
            Some(id) => {
                info!(email = %user.email, "created user");
                id
            }
            None => {
                sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
                    .bind(&user.email)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        let names: Vec<&str> = user.roles.iter().map(|r| r.as_str()).collect();
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, r.id FROM roles r WHERE r.name = ANY($2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&names)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_user(id)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("user {id} vanished after insert")))
    }
}
