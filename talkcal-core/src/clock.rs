//! Sources of "now" and of document UIDs.
//!
//! Generation never reads the system clock or a global counter directly;
//! both are injected so tests can pin them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Produces the UID of each generated document.
pub trait UidSource: Send + Sync {
    fn next_uid(&self, now: DateTime<Utc>) -> String;
}

/// `<unix-millis>-<random>@<domain>`
///
/// The random part keeps two documents generated in the same millisecond
/// apart without any state shared between calls.
#[derive(Debug, Clone)]
pub struct RandomUid {
    domain: String,
}

impl RandomUid {
    pub fn new(domain: impl Into<String>) -> Self {
        RandomUid {
            domain: domain.into(),
        }
    }
}

impl UidSource for RandomUid {
    fn next_uid(&self, now: DateTime<Utc>) -> String {
        format!(
            "{}-{}@{}",
            now.timestamp_millis(),
            Uuid::new_v4().simple(),
            self.domain
        )
    }
}

/// Always the same UID.
#[derive(Debug, Clone)]
pub struct FixedUid(pub String);

impl UidSource for FixedUid {
    fn next_uid(&self, _now: DateTime<Utc>) -> String {
        self.0.clone()
    }
}
