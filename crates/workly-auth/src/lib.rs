//! Workly Authentication
//!
//! Cookie-carried JWT sessions for the two principal kinds, users and
//! companies. Each kind has its own signing secret, cookie and guard:
//!
//! - [`jwt`] issues and verifies tokens
//! - [`principal`] loads the principal a verified token names
//! - [`middleware`] gates routes and attaches the principal to the request

pub mod cookie;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod principal;

pub use cookie::{removal_cookie, session_cookie};
pub use error::AuthError;
pub use jwt::{Claims, CredentialCodec, PrincipalKind, TOKEN_TTL_HOURS};
pub use middleware::{CurrentCompany, CurrentUser, Guard, require_principal};
pub use password::{hash_password, verify_password};
pub use principal::{Principal, PrincipalResolver, PrincipalStore};
