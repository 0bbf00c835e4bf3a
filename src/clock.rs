use chrono::{DateTime, Duration, Utc};
use tracing::trace;

pub const DEFAULT_WARP_DAYS_PER_SEC: f64 = 10.0;
const MAX_WARP_DAYS_PER_SEC: f64 = 36_525.0;
const MIN_WARP_DAYS_PER_SEC: f64 = 1.0 / 86_400.0;

/// Simulated instant fed to the compositor. Starts at wall-clock now and
/// advances `warp` simulated days per real second unless paused.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimClock {
    sim_time: DateTime<Utc>,
    warp_days_per_sec: f64,
    paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(Utc::now(), DEFAULT_WARP_DAYS_PER_SEC)
    }
}

impl SimClock {
    pub fn new(start: DateTime<Utc>, warp_days_per_sec: f64) -> Self {
        Self {
            sim_time: start,
            warp_days_per_sec: clamp_warp(warp_days_per_sec),
            paused: false,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.sim_time
    }

    pub fn warp(&self) -> f64 {
        self.warp_days_per_sec
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advances by `real_dt_secs` of wall-clock time and returns the new instant.
    /// Near the end of the representable range the clock holds where it is.
    pub fn tick(&mut self, real_dt_secs: f64) -> DateTime<Utc> {
        if !self.paused && real_dt_secs > 0.0 {
            let add_ms = self.warp_days_per_sec * real_dt_secs * 86_400_000.0;
            let next = Duration::try_milliseconds(add_ms as i64).and_then(|d| self.sim_time.checked_add_signed(d));
            match next {
                Some(t) => self.sim_time = t,
                None => trace!(sim_time = %self.sim_time, "simulation clock at its limit"),
            }
        }
        self.sim_time
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn faster(&mut self) {
        self.warp_days_per_sec = clamp_warp(self.warp_days_per_sec * 2.0);
    }

    pub fn slower(&mut self) {
        self.warp_days_per_sec = clamp_warp(self.warp_days_per_sec * 0.5);
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.sim_time = now;
    }
}

fn clamp_warp(w: f64) -> f64 {
    if w.is_finite() {
        w.clamp(MIN_WARP_DAYS_PER_SEC, MAX_WARP_DAYS_PER_SEC)
    } else {
        DEFAULT_WARP_DAYS_PER_SEC
    }
}
