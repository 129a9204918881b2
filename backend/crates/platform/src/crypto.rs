//! Cryptographic Utilities

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Signed value is malformed")]
    Malformed,

    #[error("Signature does not match")]
    Mismatch,
}

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// 32 random bytes, sized for an HMAC-SHA256 key
pub fn random_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(s)
}

pub fn to_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}

/// HMAC-SHA256 over `data`
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Produce `"{payload}.{base64url(hmac)}"`
pub fn sign(key: &[u8], payload: &str) -> String {
    format!("{}.{}", payload, to_base64url(&hmac_sha256(key, payload.as_bytes())))
}

/// Verify a value produced by [`sign`] and return its payload
///
/// The signature comparison is constant-time.
pub fn verify_signed<'a>(key: &[u8], signed: &'a str) -> Result<&'a str, SignatureError> {
    let (payload, signature_b64) = signed.rsplit_once('.').ok_or(SignatureError::Malformed)?;
    if payload.is_empty() || signature_b64.is_empty() {
        return Err(SignatureError::Malformed);
    }
    let signature = from_base64url(signature_b64).map_err(|_| SignatureError::Malformed)?;

    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| SignatureError::Malformed)?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| SignatureError::Mismatch)?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_values() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);

        let hash = sha256(b"hello");
        let expected =
            hex::decode("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_hmac_sha256_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        let expected =
            hex::decode("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
                .unwrap();
        assert_eq!(mac.to_vec(), expected);
    }

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        assert!(bytes.iter().any(|&b| b != 0));
        assert_ne!(random_key(), random_key());
    }

    #[test]
    fn test_sign_and_verify() {
        let key = [42u8; 32];
        let signed = sign(&key, "3f0c2a8e-session");
        assert_eq!(verify_signed(&key, &signed), Ok("3f0c2a8e-session"));
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let signed = sign(&[1u8; 32], "payload");
        assert_eq!(
            verify_signed(&[2u8; 32], &signed),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let key = [7u8; 32];
        let signed = sign(&key, "payload");
        let (_, signature) = signed.split_once('.').unwrap();
        let forged = format!("other.{}", signature);
        assert_eq!(verify_signed(&key, &forged), Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_verify_rejects_malformed() {
        let key = [7u8; 32];
        assert_eq!(verify_signed(&key, "no-dot"), Err(SignatureError::Malformed));
        assert_eq!(verify_signed(&key, "payload."), Err(SignatureError::Malformed));
        assert_eq!(
            verify_signed(&key, "payload.***"),
            Err(SignatureError::Malformed)
        );
    }
}
