//! `Authorization: Bearer <token>` parsing (RFC 6750)

use http::HeaderMap;
use http::header::AUTHORIZATION;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BearerError {
    #[error("Missing Authorization header")]
    Missing,

    #[error("Authorization header is not a Bearer token")]
    WrongScheme,

    #[error("Bearer token is empty")]
    Empty,
}

/// Token from the `Authorization` header
///
/// The scheme name is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::WrongScheme)?;

    let (scheme, token) = value.split_once(' ').ok_or(BearerError::WrongScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::WrongScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(BearerError::Empty);
    }
    Ok(token)
}

/// Header value for a token
pub fn bearer_header_value(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_extracts_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(bearer_token(&headers("bearer  abc.def ")), Ok("abc.def"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(BearerError::Missing));
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(BearerError::WrongScheme)
        );
        assert_eq!(bearer_token(&headers("Bearer")), Err(BearerError::WrongScheme));
    }

    #[test]
    fn test_empty_token() {
        assert_eq!(bearer_token(&headers("Bearer    ")), Err(BearerError::Empty));
    }

    #[test]
    fn test_header_value_roundtrip() {
        let value = bearer_header_value("tok");
        assert_eq!(bearer_token(&headers(&value)), Ok("tok"));
    }
}
