use std::{fmt, sync::Arc};

use buvette_core::database::{PostgresDatabase, UnitOfWork};
use buvette_core::domain::ArrivalSchedules;

use crate::auth::{jwt::TokenService, password::PasswordCrypto};
use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<UnitOfWork>,
    pub postgres: Arc<PostgresDatabase>,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub passwords: Arc<PasswordCrypto>,
    /// Arrival times handed out to newly assigned staff.
    pub schedules: Arc<ArrivalSchedules>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Arc<Config>, postgres: PostgresDatabase) -> Self {
        Self::with_passwords(config, postgres, PasswordCrypto::new())
    }

    pub fn with_passwords(
        config: Arc<Config>,
        postgres: PostgresDatabase,
        passwords: PasswordCrypto,
    ) -> Self {
        let unit_of_work = Arc::new(UnitOfWork::from_postgres(&postgres));
        let tokens = Arc::new(TokenService::new(&config.auth));
        let schedules = Arc::new(config.arrival_schedules());
        Self {
            unit_of_work,
            postgres: Arc::new(postgres),
            config,
            tokens,
            passwords: Arc::new(passwords),
            schedules,
        }
    }

    pub fn unit_of_work(&self) -> &UnitOfWork {
        &self.unit_of_work
    }

    pub fn postgres(&self) -> &PostgresDatabase {
        &self.postgres
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn passwords(&self) -> &PasswordCrypto {
        &self.passwords
    }

    pub fn schedules(&self) -> &ArrivalSchedules {
        &self.schedules
    }
}
