//! JWT credential codec

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::AuthError;

/// Lifetime of an issued token
pub const TOKEN_TTL_HOURS: i64 = 24;

/// The two kinds of principal that can hold a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Company,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::User => "user",
            PrincipalKind::Company => "company",
        }
    }

    /// Name of the cookie carrying this kind's token
    pub fn cookie_name(&self) -> &'static str {
        match self {
            PrincipalKind::User => "Authorization",
            PrincipalKind::Company => "CompanyAuth",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (principal ID)
    pub sub: String,
    /// Which table `sub` refers to
    pub kind: PrincipalKind,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Numeric principal ID from the subject
    pub fn principal_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::MalformedClaims)
    }
}

#[derive(Clone)]
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies tokens for one principal kind with that kind's secret.
///
/// A codec built without a secret still constructs; every call then fails
/// with [`AuthError::MissingSecret`].
#[derive(Clone)]
pub struct CredentialCodec {
    kind: PrincipalKind,
    keys: Option<Keys>,
    ttl: Duration,
}

impl CredentialCodec {
    /// Create a codec. An empty secret counts as unset.
    pub fn new(kind: PrincipalKind, secret: Option<&str>) -> Self {
        let keys = secret.filter(|s| !s.is_empty()).map(|secret| Keys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        });

        Self {
            kind,
            keys,
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }

    fn keys(&self) -> Result<&Keys, AuthError> {
        self.keys.as_ref().ok_or(AuthError::MissingSecret)
    }

    /// Issue a token for `principal_id`, valid from now
    pub fn issue(&self, principal_id: i64) -> Result<String, AuthError> {
        self.issue_at(principal_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, principal_id: i64, now: DateTime<Utc>) -> Result<String, AuthError> {
        let keys = self.keys()?;

        let claims = Claims {
            sub: principal_id.to_string(),
            kind: self.kind,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        debug!("Issuing {} token for principal {}", self.kind, principal_id);

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, claim shape, kind and expiry as of `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let keys = self.keys()?;

        // Expiry is checked below against the caller's clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &keys.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::MissingRequiredClaim(_) | ErrorKind::Json(_) => AuthError::MalformedClaims,
                _ => AuthError::InvalidToken,
            })?
            .claims;

        if claims.kind != self.kind {
            return Err(AuthError::InvalidToken);
        }
        claims.principal_id()?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
