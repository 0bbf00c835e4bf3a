use chrono::{DateTime, TimeZone, Utc};
use std::f64::consts::{PI, TAU};

use crate::body::CelestialBody;

/// Mean anomaly at J2000.0 in degrees, keyed by English name.
const J2000_MEAN_ANOMALY_DEG: [(&str, f64); 9] = [
    ("Mercury", 174.7948),
    ("Venus", 50.4161),
    ("Earth", 357.5291),
    ("Mars", 19.3730),
    ("Jupiter", 20.0202),
    ("Saturn", 317.0207),
    ("Uranus", 141.0498),
    ("Neptune", 256.2250),
    ("Pluto", 14.8820),
];

const MS_PER_DAY: f64 = 86_400_000.0;

/// January 1, 2000, 12:00 UTC.
pub fn j2000() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).single().unwrap_or_default()
}

pub fn deg_to_rad(d: f64) -> f64 {
    d * PI / 180.0
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

/// How a body's phase is seeded. Chosen once per body from what its data
/// carries; the advance from the seed is the same for every variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AngleStrategy {
    /// Tabulated J2000.0 mean anomaly for a canonical Sol body (radians).
    KnownEphemeris { mean_anomaly: f64 },
    /// Mean anomaly recorded in the body's own orbital elements (radians).
    ExactElements { mean_anomaly: f64, epoch: DateTime<Utc> },
    /// Deterministic pseudo-initial angle (radians), advanced from process start.
    Generic { initial: f64 },
}

impl AngleStrategy {
    pub fn select(body: &CelestialBody) -> Self {
        if let Some(m0) = known_mean_anomaly(&body.english_name) {
            return AngleStrategy::KnownEphemeris { mean_anomaly: m0 };
        }
        if let Some(el) = &body.orbital_elements {
            return AngleStrategy::ExactElements {
                mean_anomaly: deg_to_rad(el.mean_anomaly),
                epoch: el.epoch,
            };
        }
        AngleStrategy::Generic { initial: generic_seed_angle(body) }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AngleStrategy::KnownEphemeris { .. } => "known-ephemeris",
            AngleStrategy::ExactElements { .. } => "exact-elements",
            AngleStrategy::Generic { .. } => "generic",
        }
    }
}

fn known_mean_anomaly(english_name: &str) -> Option<f64> {
    J2000_MEAN_ANOMALY_DEG
        .iter()
        .find(|(n, _)| *n == english_name)
        .map(|(_, d)| deg_to_rad(*d))
}

/// `(a + period + meanRadius) * π/180`, reduced to [0, 2π).
pub fn generic_seed_angle(body: &CelestialBody) -> f64 {
    let seed = body.semimajor_axis + body.sideral_orbit + body.mean_radius;
    (seed * 0.017_453_29).rem_euclid(TAU)
}

/// Mean anomaly advanced to `days` after the strategy's reference instant.
fn advance(m0: f64, period_days: f64, days: f64) -> f64 {
    if period_days <= 0.0 {
        return m0.rem_euclid(TAU);
    }
    (m0 + TAU / period_days * days).rem_euclid(TAU)
}

/// First-order true anomaly: `M + 2e·sin(M)`.
pub fn true_anomaly(mean_anomaly: f64, eccentricity: f64) -> f64 {
    if eccentricity > 0.0 {
        (mean_anomaly + 2.0 * eccentricity * mean_anomaly.sin()).rem_euclid(TAU)
    } else {
        mean_anomaly.rem_euclid(TAU)
    }
}

/// Orbital angle of a body at an instant.
#[derive(Clone, Copy, Debug)]
pub struct AngularPositionCalculator {
    process_epoch: DateTime<Utc>,
}

impl Default for AngularPositionCalculator {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl AngularPositionCalculator {
    /// `process_epoch` anchors the generic strategy.
    pub fn new(process_epoch: DateTime<Utc>) -> Self {
        Self { process_epoch }
    }

    pub fn mean_anomaly(&self, body: &CelestialBody, now: DateTime<Utc>) -> f64 {
        let period = body.sideral_orbit;
        match AngleStrategy::select(body) {
            AngleStrategy::KnownEphemeris { mean_anomaly } => advance(mean_anomaly, period, days_between(j2000(), now)),
            AngleStrategy::ExactElements { mean_anomaly, epoch } => advance(mean_anomaly, period, days_between(epoch, now)),
            AngleStrategy::Generic { initial } => advance(initial, period, days_between(self.process_epoch, now)),
        }
    }

    /// Radians in [0, 2π).
    pub fn angle(&self, body: &CelestialBody, now: DateTime<Utc>) -> f64 {
        let a = true_anomaly(self.mean_anomaly(body, now), body.eccentricity);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if a >= TAU {
            0.0
        } else {
            a
        }
    }
}
