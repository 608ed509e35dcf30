//! Principal resolution

use async_trait::async_trait;
use std::sync::Arc;
use workly_db::{Company, Database, User};

use crate::error::AuthError;
use crate::jwt::{Claims, PrincipalKind};

/// An authenticated actor
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    User(User),
    Company(Company),
}

impl Principal {
    pub fn id(&self) -> i64 {
        match self {
            Principal::User(user) => user.id,
            Principal::Company(company) => company.id,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::User(_) => PrincipalKind::User,
            Principal::Company(_) => PrincipalKind::Company,
        }
    }
}

/// Storage lookups needed to turn verified claims into a principal.
/// Implementations never return password hashes.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>, AuthError>;
    async fn find_company(&self, id: i64) -> Result<Option<Company>, AuthError>;
}

#[async_trait]
impl PrincipalStore for Database {
    async fn find_user(&self, id: i64) -> Result<Option<User>, AuthError> {
        self.get_user_by_id(id)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }

    async fn find_company(&self, id: i64) -> Result<Option<Company>, AuthError> {
        self.get_company_by_id(id)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }
}

/// Loads the principal named by a set of verified claims
#[derive(Clone)]
pub struct PrincipalResolver {
    store: Arc<dyn PrincipalStore>,
}

impl PrincipalResolver {
    pub fn new(store: Arc<dyn PrincipalStore>) -> Self {
        Self { store }
    }

    /// Resolve claims to a live principal. Id 0 and a missing row are both `PrincipalNotFound`.
    pub async fn resolve(&self, claims: &Claims) -> Result<Principal, AuthError> {
        let id = claims.principal_id()?;
        if id == 0 {
            return Err(AuthError::PrincipalNotFound);
        }

        let principal = match claims.kind {
            PrincipalKind::User => self.store.find_user(id).await?.map(Principal::User),
            PrincipalKind::Company => self.store.find_company(id).await?.map(Principal::Company),
        };

        principal.ok_or(AuthError::PrincipalNotFound)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    /// In-memory store for guard and resolver tests
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub users: HashMap<i64, User>,
        pub companies: HashMap<i64, Company>,
    }

    #[async_trait]
    impl PrincipalStore for MemoryStore {
        async fn find_user(&self, id: i64) -> Result<Option<User>, AuthError> {
            Ok(self.users.get(&id).cloned())
        }

        async fn find_company(&self, id: i64) -> Result<Option<Company>, AuthError> {
            Ok(self.companies.get(&id).cloned())
        }
    }

    pub(crate) fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{name}@example.com"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn company(id: i64, name: &str) -> Company {
        Company {
            id,
            name: name.to_string(),
            email: format!("hr@{name}.io"),
            logo: None,
            address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn claims(sub: &str, kind: PrincipalKind) -> Claims {
        Claims {
            sub: sub.to_string(),
            kind,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[tokio::test]
    async fn test_resolve_by_kind() {
        let alice = user(1, "alice");
        let mut store = MemoryStore::default();
        store.users.insert(1, alice.clone());
        store.companies.insert(1, company(1, "acme"));
        let resolver = PrincipalResolver::new(Arc::new(store));

        let principal = resolver.resolve(&claims("1", PrincipalKind::User)).await.unwrap();
        assert_eq!(principal, Principal::User(alice));
        assert_eq!(principal.kind(), PrincipalKind::User);

        let principal = resolver.resolve(&claims("1", PrincipalKind::Company)).await.unwrap();
        assert_eq!(principal.kind(), PrincipalKind::Company);
        assert_eq!(principal.id(), 1);
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut store = MemoryStore::default();
        store.users.insert(1, user(1, "alice"));
        let resolver = PrincipalResolver::new(Arc::new(store));

        assert!(matches!(
            resolver.resolve(&claims("0", PrincipalKind::User)).await,
            Err(AuthError::PrincipalNotFound)
        ));
        assert!(matches!(
            resolver.resolve(&claims("2", PrincipalKind::User)).await,
            Err(AuthError::PrincipalNotFound)
        ));
        assert!(matches!(
            resolver.resolve(&claims("1", PrincipalKind::Company)).await,
            Err(AuthError::PrincipalNotFound)
        ));
        assert!(matches!(
            resolver.resolve(&claims("x", PrincipalKind::User)).await,
            Err(AuthError::MalformedClaims)
        ));
    }
}
