use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, trace};

use crate::barycenter::BarycenterPlacer;
use crate::body::{BodyKind, CelestialBody};
use crate::debris::DebrisBeltGenerator;
use crate::ephemeris::AngularPositionCalculator;
use crate::glyphs::{star_symbol, symbol_for, SUN_GLYPH};
use crate::raster::{CircleRasterizer, Grid, ORBIT_GLYPH};
use crate::scale::{distance_range, DistanceScaler, Viewport};

/// Extra cells around a body's visual radius that still count as a hit.
pub const HIT_SLOP: i32 = 2;

/// Where a body landed in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenPosition {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    /// Index into the body slice the frame was rendered from.
    pub body_index: usize,
}

/// Output of one render pass.
#[derive(Clone, Debug)]
pub struct Frame {
    pub grid: Grid,
    pub positions: BTreeMap<String, ScreenPosition>,
}

impl Frame {
    /// Body under the cell, if any. Among overlapping candidates the closest
    /// wins.
    pub fn body_at(&self, x: i32, y: i32) -> Option<(&str, &ScreenPosition)> {
        hit_test(&self.positions, x, y)
    }
}

/// Body within `radius + HIT_SLOP` cells of (x, y), closest first.
pub fn hit_test(positions: &BTreeMap<String, ScreenPosition>, x: i32, y: i32) -> Option<(&str, &ScreenPosition)> {
    positions
        .iter()
        .filter_map(|(name, p)| {
            let dx = (x - p.x) as f64;
            let dy = (y - p.y) as f64;
            let d = (dx * dx + dy * dy).sqrt();
            (d <= (p.radius + HIT_SLOP) as f64).then_some((name.as_str(), p, d))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(name, p, _)| (name, p))
}

/// The two clocks a frame reads. Planet phases follow the (possibly warped)
/// simulation instant; star revolution follows real elapsed seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    pub instant: DateTime<Utc>,
    pub elapsed_secs: f64,
}

/// Splits a snapshot into primaries and orbiting planets. Moons are left out
/// of the orbital view.
pub fn split_bodies(bodies: &[CelestialBody]) -> (Vec<usize>, Vec<usize>) {
    let mut stars = Vec::new();
    let mut planets = Vec::new();
    for (i, b) in bodies.iter().enumerate() {
        if b.kind == BodyKind::Moon {
            continue;
        }
        if b.is_primary() {
            stars.push(i);
        } else {
            planets.push(i);
        }
    }
    (stars, planets)
}

/// Records a body under its display name. A later body with the same name
/// replaces the earlier one.
fn index(positions: &mut BTreeMap<String, ScreenPosition>, body: &CelestialBody, pos: ScreenPosition) {
    if let Some(prev) = positions.insert(body.display_name().to_string(), pos) {
        debug!(
            name = body.display_name(),
            replaced = prev.body_index,
            by = pos.body_index,
            "duplicate body name in position index"
        );
    }
}

#[derive(Clone, Copy, Debug)]
struct ScalerCache {
    viewport: Viewport,
    range: (f64, f64),
    scaler: DistanceScaler,
}

/// Turns a body snapshot into a [`Frame`]. Holds only the process start and
/// the distance scaler of the last (viewport, range) it saw.
#[derive(Debug)]
pub struct Compositor {
    rasterizer: CircleRasterizer,
    calculator: AngularPositionCalculator,
    started: Instant,
    cache: Option<ScalerCache>,
}

impl Compositor {
    pub fn new(aspect_ratio: f64) -> Self {
        Self::with_calculator(aspect_ratio, AngularPositionCalculator::default())
    }

    pub fn with_calculator(aspect_ratio: f64, calculator: AngularPositionCalculator) -> Self {
        Self {
            rasterizer: CircleRasterizer::new(aspect_ratio),
            calculator,
            started: Instant::now(),
            cache: None,
        }
    }

    /// Renders at the current wall-clock instant.
    pub fn render(&mut self, bodies: &[CelestialBody], width: usize, height: usize) -> Frame {
        let time = FrameTime {
            instant: Utc::now(),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        };
        self.render_at(bodies, width, height, time)
    }

    pub fn render_at(&mut self, bodies: &[CelestialBody], width: usize, height: usize, time: FrameTime) -> Frame {
        let viewport = Viewport::new(width, height);
        let (cx, cy) = viewport.center();
        let mut grid = Grid::new(width, height);
        let mut positions = BTreeMap::new();

        let (star_idx, planet_idx) = split_bodies(bodies);
        let stars: Vec<CelestialBody> = star_idx.iter().map(|&i| bodies[i].clone()).collect();
        let planets: Vec<CelestialBody> = planet_idx.iter().map(|&i| bodies[i].clone()).collect();

        // stars
        let star_radius = viewport.star_radius(stars.len().max(1));
        if stars.is_empty() {
            self.rasterizer.body(&mut grid, cx, cy, star_radius, SUN_GLYPH);
        } else {
            let placer = BarycenterPlacer::new(viewport, self.rasterizer.aspect_ratio());
            let placed = placer.positions(&stars, cx, cy, time.elapsed_secs);
            for ((star, &(x, y)), &i) in stars.iter().zip(placed.iter()).zip(star_idx.iter()) {
                self.rasterizer.body(&mut grid, x, y, star_radius, star_symbol(star));
                index(&mut positions, star, ScreenPosition { x, y, radius: star_radius, body_index: i });
            }
        }

        if planets.is_empty() {
            return Frame { grid, positions };
        }

        let scaler = self.scaler(&planets, viewport);

        DebrisBeltGenerator::new(self.rasterizer).render(&mut grid, cx, cy, &planets, &scaler);

        for (planet, &i) in planets.iter().zip(planet_idx.iter()) {
            if planet.semimajor_axis <= 0.0 {
                continue;
            }
            let orbit = scaler.scale(planet.semimajor_axis);
            self.rasterizer.outline(&mut grid, cx, cy, orbit, ORBIT_GLYPH);

            let angle = self.calculator.angle(planet, time.instant);
            let (x, y) = self.rasterizer.position(cx, cy, orbit, angle);
            let radius = viewport.planet_radius(planet.mean_radius);
            self.rasterizer.body(&mut grid, x, y, radius, symbol_for(planet.display_name()));
            index(&mut positions, planet, ScreenPosition { x, y, radius, body_index: i });
        }

        Frame { grid, positions }
    }

    fn scaler(&mut self, planets: &[CelestialBody], viewport: Viewport) -> DistanceScaler {
        let range = distance_range(planets);
        match self.cache {
            Some(c) if c.viewport == viewport && c.range == range => c.scaler,
            _ => {
                let scaler = DistanceScaler::new(planets, viewport);
                trace!(width = viewport.width, height = viewport.height, ?range, "rebuilt distance scaler");
                self.cache = Some(ScalerCache { viewport, range, scaler });
                scaler
            }
        }
    }
}
