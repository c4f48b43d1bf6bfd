//! Lock-free per-record usage counters.

use std::sync::atomic::{AtomicU64, Ordering};

use beacon_core::models::{UsageCounts, UsageKind};

/// Three monotonically increasing counters for one record.
#[derive(Debug, Default)]
pub struct UsageCounters {
    views: AtomicU64,
    downloads: AtomicU64,
    shares: AtomicU64,
}

impl UsageCounters {
    /// Bump one counter by one.
    pub fn increment(&self, kind: UsageKind) {
        let counter = match kind {
            UsageKind::View => &self.views,
            UsageKind::Download => &self.downloads,
            UsageKind::Share => &self.shares,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageCounts {
        UsageCounts {
            views: self.views.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            shares: self.shares.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_only_the_named_counter() {
        let counters = UsageCounters::default();
        counters.increment(UsageKind::View);
        counters.increment(UsageKind::View);
        counters.increment(UsageKind::Share);
        let snap = counters.snapshot();
        assert_eq!(snap.views, 2);
        assert_eq!(snap.downloads, 0);
        assert_eq!(snap.shares, 1);
    }
}
