//! Auth Session Entity
//!
//! Server-side record behind a bearer token.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use uuid::Uuid;

use crate::domain::value_object::user_role::UserRole;

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub user_id: UserId,
    /// Role at session creation
    pub user_role: UserRole,
    /// Unix timestamp (ms)
    pub expires_at_ms: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    /// TTL comes from the application config
    pub fn new(user_id: UserId, user_role: UserRole, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            user_role,
            expires_at_ms: (now + ttl).timestamp_millis(),
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.expires_at_ms
    }

    pub fn remaining_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at_ms - now.timestamp_millis()).max(0)
    }
}
