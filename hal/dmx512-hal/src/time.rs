//! Monotonic time abstractions
//!
//! Protocol timings are expressed as deadlines against a monotonic clock
//! instead of calibrated spin loops, so the same driver code runs against
//! a hardware timer on target and a virtual clock in tests.

use core::ops::Add;
use core::time::Duration;

/// A point in time with microsecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant {
    micros: u64,
}

impl Instant {
    /// Clock origin
    pub const ZERO: Self = Self { micros: 0 };

    /// Create an instant from a microsecond tick count
    pub const fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    /// Microseconds since clock origin
    pub const fn as_micros(&self) -> u64 {
        self.micros
    }

    /// Time elapsed from `earlier` to `self`, or `None` if `earlier` is later
    pub fn checked_duration_since(&self, earlier: Instant) -> Option<Duration> {
        self.micros
            .checked_sub(earlier.micros)
            .map(Duration::from_micros)
    }

    /// Time elapsed from `earlier` to `self`, saturating at zero
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        self.checked_duration_since(earlier).unwrap_or(Duration::ZERO)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    /// Sub-microsecond remainders are rounded up so a deadline is never early
    fn add(self, rhs: Duration) -> Instant {
        let nanos = rhs.as_nanos();
        let micros = nanos.div_ceil(1_000);
        let micros = u64::try_from(micros).unwrap_or(u64::MAX);
        Instant::from_micros(self.micros.saturating_add(micros))
    }
}

/// Monotonic clock
pub trait Monotonic {
    /// Current time
    fn now(&self) -> Instant;

    /// Block until `deadline` has passed
    ///
    /// The default implementation spins on [`now`](Self::now).
    fn wait_until(&mut self, deadline: Instant) {
        while self.now() < deadline {
            core::hint::spin_loop();
        }
    }

    /// Block for at least `duration`
    fn wait_for(&mut self, duration: Duration) {
        let deadline = self.now() + duration;
        self.wait_until(deadline);
    }
}

impl<C: Monotonic + ?Sized> Monotonic for &mut C {
    fn now(&self) -> Instant {
        C::now(self)
    }

    fn wait_until(&mut self, deadline: Instant) {
        C::wait_until(self, deadline)
    }
}
