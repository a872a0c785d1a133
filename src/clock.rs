//! Time source for task timestamps and backup names.

use chrono::{DateTime, SecondsFormat, Utc};

/// Supplies the current time. Injected so tests can pin timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Render a timestamp the way tasks store it: `2026-10-19T08:15:30.123Z`.
///
/// Fixed width, so string order is chronological order.
pub fn to_iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
