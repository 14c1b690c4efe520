use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use base64ct::{Base64, Encoding};
use std::sync::Arc;

use crate::{models::User, AppState};

/// Credentials taken from a Basic Auth header.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The authenticated owner of a request. Every handler receives the owner
/// explicitly through this extractor; nothing downstream ever inspects
/// credentials or ambient state.
pub struct AuthUser {
    pub user: User,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let creds = extract_basic_auth(&parts.headers).ok_or_else(unauthorized)?;

        let user = state
            .db
            .get_user_by_username(&creds.username)
            .await
            .map_err(|_| {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
            })?
            .ok_or_else(unauthorized)?;

        let valid = bcrypt::verify(&creds.password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(unauthorized());
        }

        Ok(AuthUser { user })
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"notedav\"")],
        "Unauthorized",
    )
        .into_response()
}

/// Decode `Authorization: Basic <base64(user:pass)>`. Returns None for a
/// missing or malformed header; the caller answers 401 either way.
pub fn extract_basic_auth(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = Base64::decode_vec(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}
