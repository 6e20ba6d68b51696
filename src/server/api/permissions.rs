//! Permission policies.
//!
//! A policy is asked twice per request: once before any record is loaded
//! (`has_permission`) and, for single-record routes, once more with the loaded
//! record (`has_object_permission`). Every policy attached to a route must
//! allow the request.
use actix_web::http::Method;

use crate::db::models::snippet::Snippet;
use crate::server::errors::ApiError;

use super::auth::Caller;

/// A record with an owner.
pub trait Owned {
    /// Primary key of the owning user, if the record has one.
    fn owner_id(&self) -> Option<i64>;
}

impl Owned for Snippet {
    fn owner_id(&self) -> Option<i64> {
        self.owner_id
    }
}

/// An access policy.
pub trait Permission: Sync {
    /// Collection-level check.
    fn has_permission(&self, _method: &Method, _caller: &Caller) -> bool {
        true
    }

    /// Object-level check.
    fn has_object_permission(
        &self,
        _method: &Method,
        _caller: &Caller,
        _object: &dyn Owned,
    ) -> bool {
        true
    }
}

/// Whether `method` only reads.
#[must_use]
pub fn is_safe(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

/// Anyone may do anything.
pub struct AllowAny;

impl Permission for AllowAny {}

/// Anyone may read; writes need an authenticated caller.
pub struct IsAuthenticatedOrReadOnly;

impl Permission for IsAuthenticatedOrReadOnly {
    fn has_permission(&self, method: &Method, caller: &Caller) -> bool {
        is_safe(method) || caller.is_authenticated()
    }
}

/// Anyone may read; only the owner may write. Records without an owner are
/// read-only for everyone.
pub struct IsOwnerOrReadOnly;

impl Permission for IsOwnerOrReadOnly {
    fn has_object_permission(&self, method: &Method, caller: &Caller, object: &dyn Owned) -> bool {
        if is_safe(method) {
            return true;
        }
        match (object.owner_id(), caller.user_id()) {
            (Some(owner), Some(user)) => owner == user,
            _ => false,
        }
    }
}

/// The error for a refused request: anonymous callers are asked to authenticate,
/// authenticated ones are refused outright.
const fn denied(caller: &Caller) -> ApiError {
    if caller.is_authenticated() {
        ApiError::PermissionDenied
    } else {
        ApiError::NotAuthenticated
    }
}

/// Run the collection-level check of every policy.
///
/// # Errors
/// Errors with `NotAuthenticated` or `PermissionDenied` if any policy refuses.
pub fn check(
    policies: &[&dyn Permission],
    method: &Method,
    caller: &Caller,
) -> Result<(), ApiError> {
    if policies
        .iter()
        .all(|policy| policy.has_permission(method, caller))
    {
        return Ok(());
    }
    tracing::debug!(%method, "Request refused by collection policy");
    Err(denied(caller))
}

/// Run the object-level check of every policy against `object`.
///
/// # Errors
/// Errors with `NotAuthenticated` or `PermissionDenied` if any policy refuses.
pub fn check_object(
    policies: &[&dyn Permission],
    method: &Method,
    caller: &Caller,
    object: &dyn Owned,
) -> Result<(), ApiError> {
    if policies
        .iter()
        .all(|policy| policy.has_object_permission(method, caller, object))
    {
        return Ok(());
    }
    tracing::debug!(%method, "Request refused by object policy");
    Err(denied(caller))
}
