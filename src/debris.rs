use crate::body::CelestialBody;
use crate::raster::{CircleRasterizer, Grid};
use crate::scale::DistanceScaler;

pub const ASTEROID_GLYPH: char = '∗';
pub const KUIPER_GLYPH: char = '◦';

/// Reference distances used when a named body is missing from the set.
const DEFAULT_REFERENCE_DISTANCES: [(&str, f64); 3] = [("Mars", 1.5), ("Jupiter", 5.2), ("Neptune", 30.0)];

/// One stippled belt: `rings` concentric radii between `inner` and `outer`
/// (in screen rows), sampled every `angle_step_deg` degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Belt {
    pub inner: f64,
    pub outer: f64,
    pub angle_step_deg: usize,
    pub rings: usize,
    pub glyph: char,
}

impl Belt {
    pub fn ring_radius(&self, i: usize) -> f64 {
        self.inner + i as f64 * (self.outer - self.inner) / self.rings as f64
    }
}

/// Semimajor axis of the named body, or the fallback for that name.
pub fn reference_distance(bodies: &[CelestialBody], name: &str) -> f64 {
    bodies
        .iter()
        .find(|b| b.display_name() == name && name != "Sun" && b.semimajor_axis != 0.0)
        .map(|b| b.semimajor_axis)
        .unwrap_or_else(|| {
            DEFAULT_REFERENCE_DISTANCES
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, d)| *d)
                .unwrap_or(0.0)
        })
}

/// Cosmetic asteroid and Kuiper belts. Never fails; missing reference bodies
/// fall back to Sol-like distances.
#[derive(Clone, Copy, Debug)]
pub struct DebrisBeltGenerator {
    rasterizer: CircleRasterizer,
}

impl DebrisBeltGenerator {
    pub fn new(rasterizer: CircleRasterizer) -> Self {
        Self { rasterizer }
    }

    /// Between 1.5× Mars and 0.6× Jupiter.
    pub fn asteroid_belt(&self, planets: &[CelestialBody], scaler: &DistanceScaler) -> Belt {
        let mars = reference_distance(planets, "Mars");
        let jupiter = reference_distance(planets, "Jupiter");
        Belt {
            inner: scaler.scale(mars * 1.5),
            outer: scaler.scale(jupiter * 0.6),
            angle_step_deg: 10,
            rings: 3,
            glyph: ASTEROID_GLYPH,
        }
    }

    /// From 1.2× to 1.7× Neptune.
    pub fn kuiper_belt(&self, planets: &[CelestialBody], scaler: &DistanceScaler) -> Belt {
        let neptune = reference_distance(planets, "Neptune");
        Belt {
            inner: scaler.scale(neptune * 1.2),
            outer: scaler.scale(neptune * 1.7),
            angle_step_deg: 12,
            rings: 4,
            glyph: KUIPER_GLYPH,
        }
    }

    pub fn stipple(&self, grid: &mut Grid, cx: i32, cy: i32, belt: &Belt) {
        if belt.rings == 0 || belt.angle_step_deg == 0 {
            return;
        }
        for deg in (0..360).step_by(belt.angle_step_deg) {
            let rad = (deg as f64).to_radians();
            for i in 0..belt.rings {
                let r = belt.ring_radius(i);
                if !(r.is_finite() && r > 0.0) {
                    continue;
                }
                let (x, y) = self.rasterizer.position(cx, cy, r, rad);
                grid.set_if_blank(x, y, belt.glyph);
            }
        }
    }

    /// Both belts, only into blank cells.
    pub fn render(&self, grid: &mut Grid, cx: i32, cy: i32, planets: &[CelestialBody], scaler: &DistanceScaler) {
        let asteroid = self.asteroid_belt(planets, scaler);
        self.stipple(grid, cx, cy, &asteroid);
        let kuiper = self.kuiper_belt(planets, scaler);
        self.stipple(grid, cx, cy, &kuiper);
    }
}
