//! Session cookies

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::jwt::PrincipalKind;

/// How long the browser keeps the cookie. The token inside still expires
/// after its own lifetime.
fn cookie_max_age(kind: PrincipalKind) -> time::Duration {
    match kind {
        PrincipalKind::User => time::Duration::days(30),
        PrincipalKind::Company => time::Duration::hours(24),
    }
}

/// HTTP-only, SameSite=Lax cookie carrying a freshly issued token
pub fn session_cookie(kind: PrincipalKind, token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((kind.cookie_name(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie_max_age(kind))
        .build()
}

/// Empty, already-expired cookie that overwrites the session on logout
pub fn removal_cookie(kind: PrincipalKind) -> Cookie<'static> {
    Cookie::build((kind.cookie_name(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(PrincipalKind::User, "tok".to_string(), false);
        assert_eq!(cookie.name(), "Authorization");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));

        let cookie = session_cookie(PrincipalKind::Company, "tok".to_string(), true);
        assert_eq!(cookie.name(), "CompanyAuth");
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = removal_cookie(PrincipalKind::Company);
        assert_eq!(cookie.name(), "CompanyAuth");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
