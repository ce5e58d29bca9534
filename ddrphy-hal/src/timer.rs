//! # Tick source
//!
//! Monotonic, wrap-safe elapsed time on top of a 32-bit free-running hardware counter. All
//! bounded waits of the DDR bring-up, including the training poll loop, are built on it.
//!
//! The counter wraps, so [Timer::get_ticks] accumulates the unsigned difference between the
//! current and the last observed counter value into a 64-bit timestamp. This compensates one
//! counter wraparound per call, so the timer must be read at least once per counter period.
//!
//! There is no interrupt or scheduler involvement. [Timer::udelay] is a blocking busy-wait.
use ddrphy::tick::{Direction, MmioTickCounter, TickCtrl};

use crate::time::Hertz;

/// Counting direction of the hardware counter.
///
/// Down-counting values are inverted before use, which turns them into an up-counting
/// sequence with identical wraparound behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountDirection {
    Up,
    Down,
}

impl From<CountDirection> for Direction {
    fn from(value: CountDirection) -> Self {
        match value {
            CountDirection::Up => Direction::Up,
            CountDirection::Down => Direction::Down,
        }
    }
}

/// Hardware abstraction of a free-running 32-bit counter.
pub trait FreeRunningCounter {
    /// Reset the counter, configure the prescaler and start counting.
    fn start(&mut self, prescaler: u8, direction: CountDirection);

    fn stop(&mut self);

    /// Raw counter value.
    fn counter(&mut self) -> u32;
}

impl FreeRunningCounter for MmioTickCounter<'_> {
    fn start(&mut self, prescaler: u8, direction: CountDirection) {
        self.write_ctrl(TickCtrl::DEFAULT);
        self.write_load(match direction {
            CountDirection::Up => 0,
            CountDirection::Down => u32::MAX,
        });
        self.write_ctrl(
            TickCtrl::DEFAULT
                .with_prescaler(prescaler)
                .with_direction(direction.into())
                .with_reset(true),
        );
        self.modify_ctrl(|mut val| {
            val.set_enable(true);
            val
        });
    }

    #[inline]
    fn stop(&mut self) {
        self.modify_ctrl(|mut val| {
            val.set_enable(false);
            val
        });
    }

    #[inline]
    fn counter(&mut self) -> u32 {
        self.read_count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    #[error("timer was already initialized")]
    AlreadyInitialized,
    #[error("prescaler {prescaler} yields a tick rate of 0 Hz")]
    InvalidTickRate { prescaler: u8 },
}

/// Board-supplied configuration of the tick source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Reference clock of the counter, before the prescaler.
    pub clock: Hertz,
    pub prescaler: u8,
    pub direction: CountDirection,
}

impl TimerConfig {
    pub const fn new(clock: Hertz, prescaler: u8, direction: CountDirection) -> Self {
        Self {
            clock,
            prescaler,
            direction,
        }
    }

    /// Frequency at which the counter advances.
    #[inline]
    pub const fn tick_rate(&self) -> Hertz {
        Hertz::from_raw(self.clock.raw() / (self.prescaler as u32 + 1))
    }
}

/// Wrap tracking state of a tick source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    lastinc: u32,
    timestamp: u64,
}

impl TimerState {
    pub const fn new() -> Self {
        Self {
            lastinc: 0,
            timestamp: 0,
        }
    }

    /// Restart the timestamp at zero with `now` as the reference counter value.
    #[inline]
    pub fn rebase(&mut self, now: u32) {
        self.lastinc = now;
        self.timestamp = 0;
    }

    /// Account for the ticks since the last observed counter value and return the new
    /// timestamp.
    #[inline]
    pub fn update(&mut self, now: u32) -> u64 {
        self.timestamp += now.wrapping_sub(self.lastinc) as u64;
        self.lastinc = now;
        self.timestamp
    }

    #[inline]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Tick source of one boot stage.
///
/// Owns the hardware counter, its configuration and the wrap tracking state.
pub struct Timer<C> {
    counter: C,
    config: TimerConfig,
    state: TimerState,
    initialized: bool,
}

impl<C: FreeRunningCounter> Timer<C> {
    /// Create a new tick source. The hardware is not touched until [Self::timer_init].
    pub const fn new(counter: C, config: TimerConfig) -> Self {
        Self {
            counter,
            config,
            state: TimerState::new(),
            initialized: false,
        }
    }

    /// Reset and start the hardware counter and start counting ticks from zero.
    ///
    /// Calling this a second time without [Self::reset_timer] in between returns
    /// [TimerError::AlreadyInitialized].
    pub fn timer_init(&mut self) -> Result<(), TimerError> {
        if self.initialized {
            return Err(TimerError::AlreadyInitialized);
        }
        if self.config.tick_rate().raw() == 0 {
            return Err(TimerError::InvalidTickRate {
                prescaler: self.config.prescaler,
            });
        }
        self.counter
            .start(self.config.prescaler, self.config.direction);
        let now = self.normalized_count();
        self.state.rebase(now);
        self.initialized = true;
        Ok(())
    }

    /// Restart the tick count at zero without stopping the hardware counter.
    ///
    /// This also permits another call to [Self::timer_init].
    pub fn reset_timer(&mut self) {
        let now = self.normalized_count();
        self.state.rebase(now);
        self.initialized = false;
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Ticks elapsed since [Self::timer_init] or the last [Self::reset_timer].
    pub fn get_ticks(&mut self) -> u64 {
        let now = self.normalized_count();
        self.state.update(now)
    }

    /// Ticks elapsed since `base`, which is a value previously returned by
    /// [Self::get_ticks].
    #[inline]
    pub fn get_timer(&mut self, base: u64) -> u64 {
        self.get_ticks().saturating_sub(base)
    }

    /// Busy-wait for at least `usec` microseconds.
    pub fn udelay(&mut self, usec: u32) {
        let wait = self.us_to_ticks(usec);
        self.spin_ticks(wait);
    }

    /// Convert microseconds to ticks, rounding up.
    #[inline]
    pub fn us_to_ticks(&self, usec: u32) -> u64 {
        (usec as u64 * self.config.tick_rate().raw() as u64).div_ceil(1_000_000)
    }

    /// Convert ticks to microseconds, rounding down.
    #[inline]
    pub fn ticks_to_us(&self, ticks: u64) -> u64 {
        let rate = self.config.tick_rate().raw() as u128;
        if rate == 0 {
            return 0;
        }
        ((ticks as u128 * 1_000_000) / rate) as u64
    }

    #[inline]
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Stop the hardware counter and give back the counter instance.
    pub fn release(mut self) -> C {
        self.counter.stop();
        self.counter
    }

    fn spin_ticks(&mut self, ticks: u64) {
        let start = self.get_ticks();
        while self.get_timer(start) < ticks {
            core::hint::spin_loop();
        }
    }

    #[inline]
    fn normalized_count(&mut self) -> u32 {
        let raw = self.counter.counter();
        match self.config.direction {
            CountDirection::Up => raw,
            CountDirection::Down => !raw,
        }
    }
}

/// The tick source can be used for blocking delays.
impl<C: FreeRunningCounter> embedded_hal::delay::DelayNs for Timer<C> {
    fn delay_ns(&mut self, ns: u32) {
        let ticks =
            (ns as u64 * self.config.tick_rate().raw() as u64).div_ceil(1_000_000_000);
        self.spin_ticks(ticks);
    }

    fn delay_us(&mut self, us: u32) {
        self.udelay(us);
    }
}
