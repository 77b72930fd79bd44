//! Time and identity sources injected into the service.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use maternal_core::{Timestamp, NANOS_PER_MILLI};
use uuid::Uuid;

pub trait Clock {
    /// Nanoseconds since the epoch. Never decreases between calls.
    fn now(&self) -> Timestamp;
}

pub trait IdGenerator {
    /// A value never handed out before.
    fn next_id(&self) -> String;
}

/// Wall clock at millisecond resolution, clamped so it never runs backwards.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let wall = millis.saturating_mul(NANOS_PER_MILLI);
        let previous = self.last.fetch_max(wall, Ordering::Relaxed);
        previous.max(wall)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
