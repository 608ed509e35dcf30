//! Application state

use std::sync::Arc;
use workly_auth::{CredentialCodec, Guard, PrincipalKind, PrincipalStore};
use workly_db::Database;

/// Prometheus handle used to render `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub user_guard: Arc<Guard>,
    pub company_guard: Arc<Guard>,
    /// Mark session cookies `Secure`
    pub secure_cookies: bool,
}

impl AppState {
    /// Build the state. A missing secret is accepted here and surfaces as a
    /// 500 the first time that kind signs in or presents a cookie.
    pub fn new(
        db: Database,
        user_secret: Option<&str>,
        company_secret: Option<&str>,
        secure_cookies: bool,
    ) -> Self {
        let store: Arc<dyn PrincipalStore> = Arc::new(db.clone());

        Self {
            user_guard: Arc::new(Guard::new(
                CredentialCodec::new(PrincipalKind::User, user_secret),
                store.clone(),
            )),
            company_guard: Arc::new(Guard::new(
                CredentialCodec::new(PrincipalKind::Company, company_secret),
                store,
            )),
            db,
            secure_cookies,
        }
    }
}
