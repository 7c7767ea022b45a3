//! # Producer Tick Scheduler
//!
//! Fixed-period loop driving the frame producer at 200 Hz.
//!
//! ## Design
//!
//! The tick loop must:
//! - Start every tick on an absolute schedule `t0 + n * P`
//! - Absorb a slow tick instead of shifting every later tick
//! - Never run the callback twice back-to-back to "catch up"
//! - Stop only at a tick boundary, within one period of the request
//!
//! ```text
//!   target:   |----P----|----P----|----P----|----P----|
//!   tick:     [cb]  wait[cb===overrun===][cb] wait [cb]  wait
//!                                       ^ starts late, no wait after,
//!                                         schedule unchanged
//! ```
//!
//! Lateness left over from slow ticks is carried and paid back by later
//! cheap ticks, so the schedule stays anchored to `t0`. Only a stall, a
//! single tick (callback plus wait) that sets the loop back by more than
//! `max_lag_ticks` periods at once, rebases the schedule to "now"; the
//! missed slots are counted as skipped rather than replayed. Accumulated
//! lag alone never triggers a rebase.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source for the scheduler.
pub trait TickClock {
    /// Time elapsed since the clock's origin. Never decreases.
    fn now(&self) -> Duration;

    /// Blocks until [`TickClock::now`] reaches `target`.
    fn wait_until(&mut self, target: Duration);
}

/// Production clock backed by [`Instant`].
///
/// Sleeps for most of a wait, then spin-waits the last `spin_margin` for
/// precision.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    origin: Instant,
    spin_margin: Duration,
}

impl MonotonicClock {
    /// Creates a clock whose origin is now.
    #[must_use]
    pub fn new(spin_margin: Duration) -> Self {
        Self { origin: Instant::now(), spin_margin }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new(Duration::from_micros(200))
    }
}

impl TickClock for MonotonicClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait_until(&mut self, target: Duration) {
        let now = self.now();
        if now >= target {
            return;
        }

        let remaining = target - now;
        // Sleep for most of the time
        if remaining > self.spin_margin {
            std::thread::sleep(remaining - self.spin_margin);
        }

        // Spin-wait for precision
        while self.now() < target {
            std::hint::spin_loop();
        }
    }
}

/// Deterministic clock for tests and replays.
///
/// Time only moves when [`ManualClock::advance`] is called or when the
/// scheduler waits. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward, e.g. to simulate callback cost.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(duration_nanos(by), Ordering::AcqRel);
    }
}

impl TickClock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }

    fn wait_until(&mut self, target: Duration) {
        self.nanos.fetch_max(duration_nanos(target), Ordering::AcqRel);
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

fn duration_micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

/// Shared cooperative stop flag.
///
/// Observed only at tick boundaries.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates an un-raised signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns true once shutdown was requested.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Scheduler configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Target tick period.
    pub period: Duration,
    /// Setback from a single tick, in periods, beyond which the schedule
    /// is rebased instead of absorbed.
    pub max_lag_ticks: u32,
    /// Stop after this many ticks (`None` = run until stopped).
    pub max_ticks: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(pov_shared::TICK_PERIOD_MS),
            max_lag_ticks: 8,
            max_ticks: None,
        }
    }
}

/// What the callback learns about the tick it is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickInfo {
    /// Zero-based tick number.
    pub index: u64,
    /// Scheduled start of this tick on the clock's timeline.
    pub scheduled: Duration,
    /// Actual start of this tick.
    pub started: Duration,
    /// Time since the previous tick started (one period for the first tick).
    pub elapsed: Duration,
    /// How late this tick started relative to its schedule.
    pub lag: Duration,
    /// Whether the previous tick's callback overran the period.
    pub previous_overran: bool,
}

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Ticks executed.
    pub ticks: u64,
    /// Ticks whose callback took longer than the period.
    pub overruns: u64,
    /// Times the schedule was rebased after falling too far behind.
    pub resyncs: u64,
    /// Schedule slots abandoned by resyncs.
    pub skipped_slots: u64,
    /// Minimum callback duration observed.
    pub min_tick_us: u64,
    /// Maximum callback duration observed.
    pub max_tick_us: u64,
    /// Rolling average callback duration.
    pub avg_tick_us: u64,
    /// Lag of the most recent tick (current drift).
    pub lag_us: u64,
    /// Largest lag observed.
    pub max_lag_us: u64,
}

impl TickStats {
    fn new(period: Duration) -> Self {
        Self {
            min_tick_us: u64::MAX,
            avg_tick_us: duration_micros(period),
            ..Self::default()
        }
    }

    fn record(&mut self, cost: Duration, lag: Duration) {
        let cost_us = duration_micros(cost);
        let lag_us = duration_micros(lag);

        self.ticks += 1;
        self.min_tick_us = self.min_tick_us.min(cost_us);
        self.max_tick_us = self.max_tick_us.max(cost_us);
        // Rolling average
        self.avg_tick_us = (self.avg_tick_us * 15 + cost_us) / 16;
        self.lag_us = lag_us;
        self.max_lag_us = self.max_lag_us.max(lag_us);
    }
}

/// Fixed-period tick loop.
///
/// Owns its clock and the schedule. The work per tick is a callback so the
/// scheduler knows nothing about frames or scenes.
pub struct TickScheduler<C: TickClock> {
    config: SchedulerConfig,
    clock: C,
    stop: StopSignal,
    stats: TickStats,
}

impl<C: TickClock> TickScheduler<C> {
    /// Creates a scheduler.
    ///
    /// A zero period is treated as one microsecond so the loop still yields
    /// a schedule; configuration validation rejects zero before this point.
    #[must_use]
    pub fn new(config: SchedulerConfig, clock: C, stop: StopSignal) -> Self {
        let config = SchedulerConfig {
            period: config.period.max(Duration::from_micros(1)),
            max_lag_ticks: config.max_lag_ticks.max(1),
            ..config
        };
        Self {
            config,
            clock,
            stop,
            stats: TickStats::new(config.period),
        }
    }

    /// Returns the target period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.config.period
    }

    /// Returns statistics of the last (or current) run.
    #[must_use]
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Returns a handle that stops this scheduler.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Returns the clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Runs ticks until stopped or `max_ticks` is reached.
    ///
    /// Returns the run's statistics.
    pub fn run<F>(&mut self, mut callback: F) -> TickStats
    where
        F: FnMut(&TickInfo),
    {
        let period = self.config.period;
        let max_lag = period * self.config.max_lag_ticks;

        self.stats = TickStats::new(period);
        let mut target = self.clock.now();
        let mut last_start: Option<Duration> = None;
        let mut previous_overran = false;
        // Lateness carried into the current tick's slot.
        let mut carried = Duration::ZERO;
        let mut index = 0u64;

        tracing::debug!("Tick scheduler started: period {:?}", period);

        loop {
            // Tick boundary: the only place cancellation is observed.
            if self.stop.is_stopped() {
                break;
            }
            if self.config.max_ticks.is_some_and(|max| index >= max) {
                break;
            }

            let started = self.clock.now();
            let info = TickInfo {
                index,
                scheduled: target,
                started,
                elapsed: last_start.map_or(period, |s| started.saturating_sub(s)),
                lag: started.saturating_sub(target),
                previous_overran,
            };
            last_start = Some(started);

            callback(&info);

            let finished = self.clock.now();
            let cost = finished.saturating_sub(started);
            self.stats.record(cost, info.lag);

            previous_overran = cost > period;
            if previous_overran {
                self.stats.overruns += 1;
                tracing::debug!(
                    "Tick {} overran: {:.3}ms (period {:.3}ms)",
                    index,
                    cost.as_secs_f64() * 1000.0,
                    period.as_secs_f64() * 1000.0
                );
            }

            // Absolute schedule: the next slot never depends on this tick's cost.
            target += period;
            index += 1;

            let behind = finished.saturating_sub(target);
            if behind.is_zero() {
                self.clock.wait_until(target);
                carried = Duration::ZERO;
            } else if behind.saturating_sub(carried) > max_lag {
                let skipped = u64::try_from(behind.as_nanos() / period.as_nanos()).unwrap_or(u64::MAX);
                self.stats.resyncs += 1;
                self.stats.skipped_slots += skipped;
                tracing::warn!(
                    "Tick loop stalled {:.3}ms behind schedule, rebasing ({} slots skipped)",
                    behind.as_secs_f64() * 1000.0,
                    skipped
                );
                target = finished;
                carried = Duration::ZERO;
            } else {
                // Late but recoverable: start the next tick now.
                carried = behind;
            }
        }

        tracing::debug!(
            "Tick scheduler stopped after {} ticks ({} overruns, {} resyncs)",
            self.stats.ticks,
            self.stats.overruns,
            self.stats.resyncs
        );

        self.stats
    }
}
