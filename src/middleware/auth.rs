use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::auth::{generate_token, validate_token, AuthError, Claims};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";
pub const LAST_LOGIN_COOKIE: &str = "last_login";

/// Authenticated user context extracted from the session token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
        }
    }
}

/// Who is making the request. Resolved once per request and passed to every handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(AuthUser),
}

impl Identity {
    /// Reads the session from `Authorization: Bearer` first, then the session cookie.
    /// Missing, expired or forged tokens resolve to `Anonymous`.
    pub fn resolve(headers: &HeaderMap, security: &SecurityConfig) -> Self {
        let token = bearer_token(headers).or_else(|| {
            CookieJar::from_headers(headers)
                .get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
        });

        let Some(token) = token else {
            return Identity::Anonymous;
        };

        match validate_token(&token, security) {
            Ok(claims) => Identity::User(claims.into()),
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                Identity::Anonymous
            }
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Identity::User(user) => Some(user),
            Identity::Anonymous => None,
        }
    }

    pub fn require(&self) -> Result<&AuthUser, ApiError> {
        self.user()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Identity::resolve(&parts.headers, &state.config.security))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Issues a session token for `user` and sets the session and `last_login` cookies.
/// Returns the updated jar and the token for clients that prefer a bearer header.
pub fn establish_session(
    jar: CookieJar,
    user: &AuthUser,
    security: &SecurityConfig,
    at: DateTime<Utc>,
) -> Result<(CookieJar, String), AuthError> {
    let claims = Claims::new(user.id, user.username.clone(), security.session_expiry_hours);
    let token = generate_token(&claims, security)?;

    let session = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .secure(security.cookie_secure)
        .same_site(SameSite::Lax);
    let last_login = Cookie::build((LAST_LOGIN_COOKIE, at.to_rfc3339_opts(SecondsFormat::Secs, true)))
        .path("/")
        .same_site(SameSite::Lax);

    Ok((jar.add(session).add(last_login), token))
}

/// Removes the session and `last_login` cookies.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
        .remove(Cookie::build(LAST_LOGIN_COOKIE).path("/"))
}
