// handlers/public/auth.rs - account registration, login and logout
//
// These routes answer browsers with pages and redirects, and script clients
// with JSON bodies whose `status` field is a boolean (login, logout, failed
// registration) or the string "success" (registration).

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tera::Context;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password};
use crate::database::UserStore;
use crate::error::ApiError;
use crate::handlers::utils::{respond, safe_next, LOGIN_URL};
use crate::middleware::{clear_session, establish_session, AuthUser, Identity, ResponseMode, Submission};
use crate::state::AppState;
use crate::validation::user::USERNAME_TAKEN;
use crate::validation::{validate_registration, FieldErrors, RawSubmission};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Checks `username`/`password` against the user table.
/// Unknown users and wrong passwords are indistinguishable to the caller.
pub async fn authenticate(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<Option<AuthUser>, ApiError> {
    let Some(record) = users.find_by_username(username).await? else {
        return Ok(None);
    };
    if !verify_password(password, &record.password_hash)? {
        return Ok(None);
    }
    Ok(Some(AuthUser {
        id: record.id,
        username: record.username,
    }))
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// GET /register/
pub async fn register_form(State(state): State<AppState>, mode: ResponseMode) -> Response {
    respond(mode, render_register(&state, &RawSubmission::new(), &FieldErrors::new()))
}

/// POST /register/
pub async fn register(
    State(state): State<AppState>,
    mode: ResponseMode,
    body: Result<Submission, ApiError>,
) -> Response {
    respond(mode, register_user(&state, mode, body).await)
}

async fn register_user(
    state: &AppState,
    mode: ResponseMode,
    body: Result<Submission, ApiError>,
) -> Result<Response, ApiError> {
    let Submission(raw) = body?;
    let validated = match validate_registration(&raw, state.config.security.min_password_length) {
        Ok(registration) => {
            if state.users.find_by_username(&registration.username).await?.is_some() {
                let mut errors = FieldErrors::new();
                errors.add("username", USERNAME_TAKEN);
                Err(errors)
            } else {
                Ok(registration)
            }
        }
        Err(errors) => Err(errors),
    };

    let registration = match validated {
        Ok(registration) => registration,
        Err(errors) => return registration_failed(state, mode, &raw, errors),
    };

    let hash = hash_password(&registration.password)?;
    let user = match state.users.create_user(&registration.username, &hash).await {
        Ok(user) => user,
        // Lost a race with another registration for the same name
        Err(crate::database::DatabaseError::Conflict(_)) => {
            let mut errors = FieldErrors::new();
            errors.add("username", USERNAME_TAKEN);
            return registration_failed(state, mode, &raw, errors);
        }
        Err(e) => return Err(e.into()),
    };
    info!("Registered user {} ({})", user.username, user.id);

    match mode {
        ResponseMode::Json => Ok(Json(json!({
            "username": user.username,
            "status": "success",
            "message": "User created successfully!",
        }))
        .into_response()),
        ResponseMode::Page => {
            let mut ctx = login_context(&user.username, None);
            ctx.insert("message", "Your account has been successfully created!");
            Ok(state.renderer.render("login.html", &ctx)?.into_response())
        }
    }
}

fn registration_failed(
    state: &AppState,
    mode: ResponseMode,
    raw: &RawSubmission,
    errors: FieldErrors,
) -> Result<Response, ApiError> {
    match mode {
        ResponseMode::Json => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": false,
                "message": "Registration failed.",
                "errors": errors,
            })),
        )
            .into_response()),
        ResponseMode::Page => render_register(state, raw, &errors),
    }
}

fn render_register(state: &AppState, raw: &RawSubmission, errors: &FieldErrors) -> Result<Response, ApiError> {
    let mut ctx = Context::new();
    ctx.insert("username", raw.get("username").map(String::as_str).unwrap_or(""));
    ctx.insert("errors", errors);

    let page = state.renderer.render("register.html", &ctx)?;
    let status = if errors.is_empty() { StatusCode::OK } else { StatusCode::BAD_REQUEST };
    Ok((status, page).into_response())
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// GET /login/
pub async fn login_form(
    State(state): State<AppState>,
    mode: ResponseMode,
    query: Result<Query<NextQuery>, QueryRejection>,
) -> Response {
    respond(mode, show_login(&state, query))
}

fn show_login(state: &AppState, query: Result<Query<NextQuery>, QueryRejection>) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let ctx = login_context("", query.next.as_deref());
    Ok(state.renderer.render("login.html", &ctx)?.into_response())
}

/// POST /login/ - establishes a session and stamps the `last_login` cookie
pub async fn login(
    State(state): State<AppState>,
    mode: ResponseMode,
    jar: CookieJar,
    query: Result<Query<NextQuery>, QueryRejection>,
    body: Result<Submission, ApiError>,
) -> Response {
    respond(mode, login_user(&state, mode, jar, query, body).await)
}

async fn login_user(
    state: &AppState,
    mode: ResponseMode,
    jar: CookieJar,
    query: Result<Query<NextQuery>, QueryRejection>,
    body: Result<Submission, ApiError>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let Submission(raw) = body?;
    let username = raw.get("username").map(|v| v.trim()).unwrap_or("");
    let password = raw.get("password").map(String::as_str).unwrap_or("");
    let next = raw.get("next").cloned().or(query.next);

    let user = if username.is_empty() || password.is_empty() {
        None
    } else {
        authenticate(state.users.as_ref(), username, password).await?
    };

    let Some(user) = user else {
        warn!("Failed login attempt for '{}'", username);
        return match mode {
            ResponseMode::Json => Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "status": false,
                    "message": INVALID_CREDENTIALS,
                })),
            )
                .into_response()),
            ResponseMode::Page => {
                let mut ctx = login_context(username, next.as_deref());
                ctx.insert("errors", &[INVALID_CREDENTIALS]);
                let page = state.renderer.render("login.html", &ctx)?;
                Ok((StatusCode::UNAUTHORIZED, page).into_response())
            }
        };
    };

    let now = Utc::now();
    state.users.record_login(user.id, now).await?;
    let (jar, token) = establish_session(jar, &user, &state.config.security, now)?;
    info!("User {} logged in", user.username);

    Ok(match mode {
        ResponseMode::Json => (
            jar,
            Json(json!({
                "username": user.username,
                "status": true,
                "message": "Login successful!",
                "token": token,
            })),
        )
            .into_response(),
        ResponseMode::Page => (jar, Redirect::to(safe_next(next.as_deref()))).into_response(),
    })
}

fn login_context(username: &str, next: Option<&str>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("username", username);
    ctx.insert("next", &next.filter(|n| safe_next(Some(*n)) == *n));
    ctx.insert("errors", &Vec::<String>::new());
    ctx
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

/// GET|POST /logout/ - always clears the session and `last_login` cookies
pub async fn logout(identity: Identity, mode: ResponseMode, jar: CookieJar) -> Response {
    let jar = clear_session(jar);

    match (mode, identity.user()) {
        (ResponseMode::Page, _) => (jar, Redirect::to(LOGIN_URL)).into_response(),
        (ResponseMode::Json, Some(user)) => {
            info!("User {} logged out", user.username);
            (
                jar,
                Json(json!({
                    "username": user.username,
                    "status": true,
                    "message": "Logout successful!",
                })),
            )
                .into_response()
        }
        (ResponseMode::Json, None) => (
            StatusCode::UNAUTHORIZED,
            jar,
            Json(json!({
                "status": false,
                "message": "Logout failed.",
            })),
        )
            .into_response(),
    }
}
