//! Elapsed time source
//!
//! The bus master needs a free running microsecond counter to bound how long
//! it waits for a target that stretches the clock. Any wrapping counter works:
//! a SysTick or DWT cycle counter scaled to microseconds, a timer peripheral,
//! or a host clock in tests.
//!
//! Closures returning an instant implement [`Monotonic`] directly:
//!
//! ```no_run
//! use bitbang_i2c::clock::{Instant, Monotonic};
//!
//! let mut ticks = 0u32;
//! let mut clock = move || {
//!     ticks = ticks.wrapping_add(1);
//!     Instant::from_ticks(ticks)
//! };
//! let _now = clock.now();
//! ```

/// Instant with microsecond resolution.
pub type Instant = fugit::TimerInstantU32<1_000_000>;

/// Duration with microsecond resolution.
pub type Duration = fugit::MicrosDurationU32;

/// Monotonic, wrapping microsecond clock.
pub trait Monotonic {
    /// Current instant.
    fn now(&mut self) -> Instant;

    /// Time elapsed since `earlier`.
    ///
    /// Counter wrap-around is handled as long as less than half the counter
    /// range has passed.
    fn elapsed_since(&mut self, earlier: Instant) -> Duration {
        self.now()
            .checked_duration_since(earlier)
            .unwrap_or(Duration::from_ticks(0))
    }
}

impl<F> Monotonic for F
where
    F: FnMut() -> Instant,
{
    fn now(&mut self) -> Instant {
        self()
    }
}
