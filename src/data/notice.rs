//! Auto-expiring error notices.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;

use super::time::local_now;

fn unix_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

/// When a request failed, captured by the task that saw it fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureTime {
    /// Unix milliseconds, unique per [`NoticeIds`].
    pub id: u64,
    pub at: Instant,
    /// Local time text for the banner.
    pub stamp: String,
}

/// Hands out notice keys from the wall clock.
///
/// Keys never repeat: a failure in the same millisecond as the previous one
/// gets the next millisecond, so concurrent failures stay separate notices.
#[derive(Debug, Default)]
pub struct NoticeIds {
    last: AtomicU64,
}

impl NoticeIds {
    pub fn next_id(&self) -> u64 {
        self.next_id_from(unix_millis())
    }

    fn next_id_from(&self, now_ms: u64) -> u64 {
        let prev = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_ms.max(last.saturating_add(1)))
            }) {
            Ok(prev) | Err(prev) => prev,
        };
        now_ms.max(prev.saturating_add(1))
    }

    /// Capture the current failure time.
    pub fn now(&self) -> FailureTime {
        FailureTime {
            id: self.next_id(),
            at: Instant::now(),
            stamp: local_now(),
        }
    }
}

/// One error notice shown in the banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Creation time in Unix milliseconds. Doubles as the notice key.
    pub id: u64,
    pub created: Instant,
    /// Local time text shown in the banner.
    pub stamp: String,
    pub message: String,
}

impl Notice {
    pub fn headline(&self) -> String {
        format!("Something happened at {}!", self.stamp)
    }
}

/// Newest-first list of notices, each expiring a fixed time after creation.
#[derive(Debug, Clone)]
pub struct Notices {
    ttl: Duration,
    items: Vec<Notice>,
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: Vec::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Record a failure now, keyed after the newest notice.
    pub fn push(&mut self, message: impl Into<String>) {
        let newest = self.items.first().map_or(0, |n| n.id.saturating_add(1));
        let id = unix_millis().max(newest);
        self.push_at(id, Instant::now(), local_now(), message);
    }

    /// Record a failure at the time it happened.
    pub fn push_failure(&mut self, failed: FailureTime, message: impl Into<String>) {
        self.push_at(failed.id, failed.at, failed.stamp, message);
    }

    /// Record a failure with an explicit key and creation instant.
    ///
    /// A notice with the same key is replaced.
    pub fn push_at(
        &mut self,
        id: u64,
        created: Instant,
        stamp: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.items.retain(|n| n.id != id);
        self.items.insert(
            0,
            Notice {
                id,
                created,
                stamp: stamp.into(),
                message: message.into(),
            },
        );
    }

    /// Drop notices that have expired.
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    pub fn prune_at(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created) < ttl);
    }

    pub fn dismiss_all(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
