//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::password::PasswordHasher;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 key for bearer tokens
    pub session_secret: [u8; 32],
    /// Lifetime of a bearer token (24 hours)
    pub session_ttl: Duration,
    /// Application-wide secret appended before hashing
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(24 * 3600),
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Config with a random session secret; tokens do not survive a restart
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Random secret and week-long sessions
    pub fn development() -> Self {
        Self {
            session_ttl: Duration::from_secs(7 * 24 * 3600),
            ..Self::with_random_secret()
        }
    }

    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl.as_millis() as i64
    }

    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.session_ttl_ms())
    }

    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.password_pepper.clone())
    }
}
