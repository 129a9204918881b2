//! Bearer token codec
//!
//! Token format: `{session_uuid}.{base64url(HMAC-SHA256(secret, session_uuid))}`.
//! The signature keeps forged ids away from the database; the session row
//! remains the authority on expiry.

use platform::crypto;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

pub fn issue(secret: &[u8; 32], session_id: Uuid) -> String {
    crypto::sign(secret, &session_id.to_string())
}

pub fn parse(secret: &[u8; 32], token: &str) -> AuthResult<Uuid> {
    let payload = crypto::verify_signed(secret, token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AuthError::SessionInvalid
    })?;
    payload.parse().map_err(|_| AuthError::SessionInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_parse() {
        let secret = [9u8; 32];
        let id = Uuid::new_v4();
        let token = issue(&secret, id);
        assert!(token.starts_with(&id.to_string()));
        assert_eq!(parse(&secret, &token).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_other_secret() {
        let token = issue(&[1u8; 32], Uuid::new_v4());
        assert!(matches!(
            parse(&[2u8; 32], &token),
            Err(AuthError::SessionInvalid)
        ));
    }

    #[test]
    fn test_parse_rejects_signed_non_uuid() {
        let secret = [3u8; 32];
        let token = crypto::sign(&secret, "not-a-uuid");
        assert!(matches!(parse(&secret, &token), Err(AuthError::SessionInvalid)));
    }
}
