//! Wall-clock source used for timestamp auto-population.
//!
//! Generated inserts call [`now`]. Tests pin it with [`freeze`] so expected
//! rows can carry the same timestamp the insert wrote.

use std::cell::Cell;

use chrono::{NaiveDateTime, Timelike, Utc};

thread_local! {
    static FROZEN: Cell<Option<NaiveDateTime>> = const { Cell::new(None) };
}

/// Current UTC time, truncated to whole seconds.
///
/// Returns the frozen instant instead while a [`FrozenClock`] guard is alive
/// on this thread.
pub fn now() -> NaiveDateTime {
    let t = FROZEN
        .with(Cell::get)
        .unwrap_or_else(|| Utc::now().naive_utc());
    truncate(t)
}

fn truncate(t: NaiveDateTime) -> NaiveDateTime {
    t.with_nanosecond(0).unwrap_or(t)
}

/// Pin [`now`] to `t` on the current thread until the guard is dropped.
pub fn freeze(t: NaiveDateTime) -> FrozenClock {
    let previous = FROZEN.with(|cell| cell.replace(Some(t)));
    FrozenClock { previous }
}

/// Pin [`now`] to the current instant.
pub fn freeze_now() -> FrozenClock {
    freeze(now())
}

/// Guard returned by [`freeze`]; restores the previous clock on drop.
///
/// Thread-local, so pair it with a current-thread runtime (the `#[tokio::test]`
/// default).
#[must_use = "the clock unfreezes when the guard is dropped"]
#[derive(Debug)]
pub struct FrozenClock {
    previous: Option<NaiveDateTime>,
}

impl FrozenClock {
    /// The instant [`now`] currently returns.
    pub fn time(&self) -> NaiveDateTime {
        now()
    }
}

impl Drop for FrozenClock {
    fn drop(&mut self) {
        FROZEN.with(|cell| cell.set(self.previous));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(now().nanosecond(), 0);
    }

    #[test]
    fn test_freeze_and_restore() {
        let pinned = DateTime::from_timestamp(1_000, 500)
            .unwrap()
            .naive_utc();
        {
            let clock = freeze(pinned);
            assert_eq!(clock.time(), truncate(pinned));
            assert_eq!(now().and_utc().timestamp(), 1_000);

            let inner = freeze(truncate(pinned) + chrono::Duration::seconds(5));
            assert_eq!(now().and_utc().timestamp(), 1_005);
            drop(inner);

            assert_eq!(now().and_utc().timestamp(), 1_000);
        }
        assert_ne!(now().and_utc().timestamp(), 1_000);
    }
}
