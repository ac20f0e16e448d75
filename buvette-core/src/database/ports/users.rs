use async_trait::async_trait;

use crate::domain::roles::Role;
use crate::error::Result;
use crate::types::users::{NewUser, User, UserCredentials, UserSummary};

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>>;
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<UserSummary>>;

    /// Inserts the role names that are missing.
    async fn ensure_roles(&self, roles: &[Role]) -> Result<()>;
    /// Creates the user unless the email is taken, then grants its roles.
    /// An existing account keeps its password.
    async fn ensure_user(&self, user: &NewUser) -> Result<User>;
}
