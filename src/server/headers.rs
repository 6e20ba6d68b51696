//! Headers used in the snippets server.

/// Challenge sent with every `401 Unauthorized` response.
///
/// Clients that see this header should retry with
/// `Authorization: Basic base64(username:password)`.
pub const WWW_AUTHENTICATE_BASIC: &str = "Basic realm=\"api\"";
