//! Fixed-window limiter for failed login attempts.
//!
//! Each client identifier gets a window of [`DEFAULT_WINDOW`] that starts on
//! its first observed attempt. Only failures count; a successful login does
//! not clear the counter, the window expiring is the only reset.
//!
//! An allowed check reserves an in-flight slot until the attempt is settled
//! by [`LoginRateLimiter::record_failure`] or [`LoginRateLimiter::release`],
//! so concurrent attempts from one client can never exceed the budget.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Failures tolerated per window before further attempts are refused.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Length of a rate-limit window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
struct RateLimitEntry {
    failure_count: u32,
    in_flight: u32,
    /// `None` when the window end is past what `Instant` can represent.
    window_reset_at: Option<Instant>,
}

impl RateLimitEntry {
    fn expired(&self, now: Instant) -> bool {
        self.window_reset_at.is_some_and(|reset_at| now > reset_at)
    }
}

/// Per-instance table of login failures keyed by client identifier.
///
/// State is process-local: it does not survive a restart and is not shared
/// between instances, so each replica enforces its own budget.
#[derive(Debug)]
pub struct LoginRateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_attempts: u32,
    window: Duration,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW)
    }
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_attempts,
            window,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn fresh_entry(&self, now: Instant) -> RateLimitEntry {
        RateLimitEntry {
            failure_count: 0,
            in_flight: 0,
            window_reset_at: now.checked_add(self.window),
        }
    }

    /// Returns `true` if `client_id` may attempt a login now, reserving an
    /// in-flight slot for the attempt.
    ///
    /// Creates the client's entry (or resets it once the window has elapsed);
    /// a failure can only be recorded after this has run. Every `true` must
    /// be followed by exactly one [`record_failure`] or [`release`].
    ///
    /// [`record_failure`]: Self::record_failure
    /// [`release`]: Self::release
    pub fn check_allowed(&self, client_id: &str) -> bool {
        self.check_allowed_at(client_id, Instant::now())
    }

    pub fn check_allowed_at(&self, client_id: &str, now: Instant) -> bool {
        let mut entry = self
            .entries
            .entry(client_id.to_string())
            .or_insert_with(|| self.fresh_entry(now));

        if entry.expired(now) {
            tracing::debug!("Rate-limit window reset for client {client_id}");
            *entry = self.fresh_entry(now);
        }

        if entry.failure_count.saturating_add(entry.in_flight) >= self.max_attempts {
            return false;
        }
        entry.in_flight += 1;
        true
    }

    /// Counts one failed attempt for `client_id`, settling its reserved slot.
    ///
    /// No-op when the client has no entry, i.e. [`check_allowed`] was never
    /// called for it.
    ///
    /// [`check_allowed`]: Self::check_allowed
    pub fn record_failure(&self, client_id: &str) {
        if let Some(mut entry) = self.entries.get_mut(client_id) {
            entry.in_flight = entry.in_flight.saturating_sub(1);
            entry.failure_count = entry.failure_count.saturating_add(1);
            tracing::debug!(
                "Recorded failed login for client {client_id} ({}/{})",
                entry.failure_count,
                self.max_attempts
            );
        }
    }

    /// Settles an allowed attempt that did not fail. The failure count is
    /// left untouched.
    pub fn release(&self, client_id: &str) {
        if let Some(mut entry) = self.entries.get_mut(client_id) {
            entry.in_flight = entry.in_flight.saturating_sub(1);
        }
    }

    /// Reserves an attempt like [`check_allowed`], returning a guard that
    /// releases the slot when dropped unless [`LoginAttempt::fail`] is called.
    ///
    /// [`check_allowed`]: Self::check_allowed
    pub fn begin_attempt(&self, client_id: &str) -> Option<LoginAttempt<'_>> {
        self.check_allowed(client_id).then(|| LoginAttempt {
            limiter: self,
            client_id: client_id.to_string(),
            failed: false,
        })
    }

    /// Failures recorded in the client's current window, if it has one.
    pub fn failure_count(&self, client_id: &str) -> Option<u32> {
        self.entries.get(client_id).map(|e| e.failure_count)
    }

    /// Attempts allowed but not yet settled.
    pub fn in_flight(&self, client_id: &str) -> Option<u32> {
        self.entries.get(client_id).map(|e| e.in_flight)
    }

    /// Drops entries whose window has elapsed. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        self.prune_expired_at(Instant::now())
    }

    pub fn prune_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A reserved login attempt. Dropping it without calling [`fail`] releases
/// the slot, which also covers handlers cancelled mid-attempt.
///
/// [`fail`]: Self::fail
#[derive(Debug)]
pub struct LoginAttempt<'a> {
    limiter: &'a LoginRateLimiter,
    client_id: String,
    failed: bool,
}

impl LoginAttempt<'_> {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Records the attempt as a failure.
    pub fn fail(mut self) {
        self.failed = true;
        self.limiter.record_failure(&self.client_id);
    }
}

impl Drop for LoginAttempt<'_> {
    fn drop(&mut self) {
        if !self.failed {
            self.limiter.release(&self.client_id);
        }
    }
}
