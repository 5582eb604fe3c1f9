//! Admin session checks.
//!
//! Handlers never look at cookies themselves. They either take an [`AdminSession`]
//! argument, which only an [`AuthGuard`] can produce, or sit behind [`require_admin`].
//! Issuing the session cookie (login) is the job of the guard's backing service.

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use subtle::ConstantTimeEq;

use crate::dto::ErrorResponse;
use crate::state::AppState;

/// Name of the cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "admin_session";

/// Proof that the current request passed the guard.
#[derive(Debug, Clone)]
pub struct AdminSession {
    _granted: (),
}

impl AdminSession {
    /// Only [`AuthGuard`] implementations should call this.
    pub fn granted() -> Self {
        Self { _granted: () }
    }
}

pub enum AuthOutcome {
    Authenticated(AdminSession),
    /// The guard's ready-made rejection, returned to the client as is.
    Rejected(Response),
}

/// Validates the admin session of a request.
pub trait AuthGuard: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> AuthOutcome;
}

/// Guard comparing the `admin_session` cookie with a configured token.
///
/// Without a configured token every admin request is refused with 403.
pub struct SessionCookieGuard {
    token: Option<String>,
}

impl SessionCookieGuard {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

impl AuthGuard for SessionCookieGuard {
    fn authenticate(&self, headers: &HeaderMap) -> AuthOutcome {
        let Some(expected) = &self.token else {
            return AuthOutcome::Rejected(rejection(
                StatusCode::FORBIDDEN,
                "Admin access is disabled",
            ));
        };

        let authenticated = session_cookie(headers)
            .is_some_and(|value| bool::from(value.as_bytes().ct_eq(expected.as_bytes())));

        if authenticated {
            AuthOutcome::Authenticated(AdminSession::granted())
        } else {
            AuthOutcome::Rejected(rejection(StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

fn rejection(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(ErrorResponse::new(message))).into_response()
}

/// Decoded value of the session cookie, searching every `Cookie` header.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value_trimmed().to_string())
}

/// Removal cookie that expires the session cookie in the browser.
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}

/// Queue the removal cookie on the response jar.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.add(expired_session_cookie())
}

impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AdminSession>() {
            return Ok(session.clone());
        }
        match state.auth.authenticate(&parts.headers) {
            AuthOutcome::Authenticated(session) => Ok(session),
            AuthOutcome::Rejected(response) => Err(response),
        }
    }
}

/// Middleware that runs the configured guard before any admin-only route.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match state.auth.authenticate(request.headers()) {
        AuthOutcome::Authenticated(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        AuthOutcome::Rejected(response) => {
            tracing::debug!(path = %request.uri().path(), "admin request rejected");
            response
        }
    }
}
