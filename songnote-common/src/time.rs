//! Timestamp utilities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Generic track name used when no title or artist could be resolved.
///
/// Seconds alone collide when two runs start within the same second, so a
/// short random suffix is appended.
pub fn generic_track_name() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("track_{}_{}", now().timestamp(), &suffix[..8])
}
