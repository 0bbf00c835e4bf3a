use std::f64::consts::TAU;

use crate::body::{CelestialBody, SOLAR_MASS_KG, SOLAR_RADIUS_KM};
use crate::raster::DEFAULT_ASPECT_RATIO;
use crate::scale::Viewport;

const BINARY_BASE_PERIOD_SECS: f64 = 20.0;
const BINARY_REFERENCE_SEPARATION: f64 = 10.0;
const MIN_SEPARATION: f64 = 6.0;

/// Recorded mass, else a main-sequence estimate `(R/R☉)^2.5 M☉` from the
/// radius, else one solar mass.
pub fn effective_mass(star: &CelestialBody) -> f64 {
    let recorded = star.mass_kg();
    if recorded > 0.0 {
        return recorded;
    }
    if star.mean_radius > 0.0 {
        return (star.mean_radius / SOLAR_RADIUS_KM).powf(2.5) * SOLAR_MASS_KG;
    }
    SOLAR_MASS_KG
}

/// Places one, two, or many stars around a common center. Deterministic in
/// (star data, viewport, elapsed seconds).
///
/// Vertical offsets are divided by the cell aspect ratio so star paths have
/// the same shape as the rasterizer's planet orbits.
#[derive(Clone, Copy, Debug)]
pub struct BarycenterPlacer {
    size_factor: f64,
    vertical_squash: f64,
}

impl BarycenterPlacer {
    pub fn new(viewport: Viewport, aspect_ratio: f64) -> Self {
        let aspect_ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            DEFAULT_ASPECT_RATIO
        };
        Self {
            size_factor: viewport.size_factor(),
            vertical_squash: 1.0 / aspect_ratio,
        }
    }

    /// Star-to-star separation in cells for a binary.
    pub fn binary_separation(&self) -> f64 {
        (MIN_SEPARATION * self.size_factor).max(MIN_SEPARATION)
    }

    /// Distances of each star from the barycenter, `r1 = sep·m2/(m1+m2)`.
    pub fn binary_radii(&self, a: &CelestialBody, b: &CelestialBody) -> (f64, f64) {
        let m1 = effective_mass(a);
        let m2 = effective_mass(b);
        let total = m1 + m2;
        let sep = self.binary_separation();
        (sep * m2 / total, sep * m1 / total)
    }

    /// Kepler-flavored animation period in seconds, clamped to [10, 120].
    pub fn binary_period(&self, a: &CelestialBody, b: &CelestialBody) -> f64 {
        let total_ratio = (effective_mass(a) + effective_mass(b)) / SOLAR_MASS_KG;
        let scaling = (self.binary_separation() / BINARY_REFERENCE_SEPARATION).powf(1.5) / total_ratio.sqrt();
        let period = BINARY_BASE_PERIOD_SECS * scaling;
        if period.is_finite() {
            period.clamp(10.0, 120.0)
        } else {
            120.0
        }
    }

    pub fn ring_radius(&self, star_count: usize) -> f64 {
        let base = 3.0 * self.size_factor;
        if star_count > 3 {
            base * 1.3
        } else {
            base
        }
    }

    /// Full-turn period of the multi-star ring, clamped to [20, 90] seconds.
    pub fn ring_period(star_count: usize) -> f64 {
        let extra = star_count as f64 - 3.0;
        (30.0 * (1.0 + extra * 0.5)).clamp(20.0, 90.0)
    }

    /// Screen positions aligned with `stars`.
    pub fn positions(&self, stars: &[CelestialBody], cx: i32, cy: i32, elapsed_secs: f64) -> Vec<(i32, i32)> {
        match stars {
            [] => Vec::new(),
            [_] => vec![(cx, cy)],
            [a, b] => {
                let (r1, r2) = self.binary_radii(a, b);
                let angle = TAU * elapsed_secs / self.binary_period(a, b);
                let (s, c) = angle.sin_cos();
                vec![
                    (cx + (r1 * c) as i32, cy + (r1 * s * self.vertical_squash) as i32),
                    (cx - (r2 * c) as i32, cy - (r2 * s * self.vertical_squash) as i32),
                ]
            }
            _ => {
                let n = stars.len();
                let ring = self.ring_radius(n);
                let rotation = TAU * elapsed_secs / Self::ring_period(n);
                (0..n)
                    .map(|i| {
                        let angle = TAU * i as f64 / n as f64 + rotation;
                        let (s, c) = angle.sin_cos();
                        (cx + (ring * c) as i32, cy + (ring * s * self.vertical_squash) as i32)
                    })
                    .collect()
            }
        }
    }
}
