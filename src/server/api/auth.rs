//! HTTP Basic authentication against stored user accounts.
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Argon2,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::future::LocalBoxFuture;

use crate::db::{models::user, DatabaseConnection};
use crate::server::errors::ApiError;
use crate::server::tracing as server_tracing;

use super::state::{App as AppState, Global as _};

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Primary key of the account.
    pub id: i64,
    /// Login name.
    pub username: String,
}

/// Whoever sent the request.
///
/// Extracting a `Caller` authenticates the request: a request without an
/// `Authorization` header, or with a non-Basic one, is anonymous; a request with
/// malformed or wrong Basic credentials is rejected with `401` before the
/// handler runs, whatever the verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No credentials supplied.
    Anonymous,
    /// Credentials verified.
    User(AuthUser),
}

impl Caller {
    /// Primary key of the authenticated user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        match *self {
            Self::Anonymous => None,
            Self::User(ref user) => Some(user.id),
        }
    }

    /// Whether the request carried valid credentials.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(*self, Self::User(_))
    }
}

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let credentials = req
            .headers()
            .get(header::AUTHORIZATION)
            .map(|value| parse_basic(value.as_bytes()))
            .transpose();
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let root_span = server_tracing::root_span(req);
        Box::pin(async move {
            let Some((username, password)) = credentials?.flatten() else {
                return Ok(Self::Anonymous);
            };
            let state = state.ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!("Application state is not registered"))
            })?;
            let caller = authenticate(state.db(), &username, password).await?;
            server_tracing::record_username(root_span.as_ref(), &username);
            Ok(caller)
        })
    }
}

/// Parse the value of an `Authorization` header.
///
/// Returns `Ok(None)` when the scheme is not Basic, so other schemes fall through
/// as anonymous.
///
/// # Errors
/// Errors if the header claims the Basic scheme but its credentials are malformed.
pub fn parse_basic(value: &[u8]) -> Result<Option<(String, String)>, ApiError> {
    let value = String::from_utf8_lossy(value);
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("basic") => Ok(None),
        [] => Ok(None),
        [_] => Err(ApiError::AuthenticationFailed(
            "Invalid basic header. No credentials provided.".to_owned(),
        )),
        [_, encoded] => {
            let decoded = STANDARD
                .decode(encoded)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .ok_or_else(|| {
                    ApiError::AuthenticationFailed(
                        "Invalid basic header. Credentials not correctly base64 encoded."
                            .to_owned(),
                    )
                })?;
            let (username, password) = decoded.split_once(':').unwrap_or((decoded.as_str(), ""));
            Ok(Some((username.to_owned(), password.to_owned())))
        }
        _ => Err(ApiError::AuthenticationFailed(
            "Invalid basic header. Credentials string should not contain spaces.".to_owned(),
        )),
    }
}

/// Check a username and password against the stored account.
///
/// # Errors
/// Errors with `AuthenticationFailed` if there is no such user or the password does
/// not match, and with `Internal` if the lookup fails.
#[tracing::instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: String,
) -> Result<Caller, ApiError> {
    let invalid = || ApiError::AuthenticationFailed("Invalid username/password.".to_owned());
    let Some(account) = user::Manager::find_by_username(db, username).await? else {
        tracing::debug!("Unknown username");
        return Err(invalid());
    };
    let hash = account.password.clone();
    let verified = web::block(move || verify_password(&password, &hash))
        .await
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("Password check failed: {err}")))?;
    if !verified {
        tracing::debug!("Password mismatch");
        return Err(invalid());
    }
    Ok(Caller::User(AuthUser {
        id: account.id,
        username: account.username,
    }))
}

/// Hash a password into an argon2 PHC string.
///
/// # Errors
/// Errors if the hasher rejects the input.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("Unable to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Check `password` against an argon2 PHC string. Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
