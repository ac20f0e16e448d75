//! Bearer-token authentication and role gates.

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod roles;

pub use jwt::{Claims, TokenKind, TokenPair, TokenService};
pub use middleware::{AuthUser, auth_middleware};
pub use password::PasswordCrypto;
pub use roles::require_roles;
