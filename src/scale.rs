use crate::body::CelestialBody;

/// Innermost orbit radius in rows.
pub const MIN_ORBIT_RADIUS: f64 = 8.0;
/// Used when no body in the set has a usable semimajor axis.
pub const DEFAULT_DISTANCE_RANGE: (f64, f64) = (1.0, 100.0);

const REFERENCE_DIMENSION: f64 = 36.0;

/// Drawing area in character cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// 80x24 → 0.67, 120x36 → 1.0, 200x60 → 1.67; clamped to [0.5, 2.5].
    pub fn size_factor(&self) -> f64 {
        let min_dim = self.width.min(self.height) as f64;
        (min_dim / REFERENCE_DIMENSION).clamp(0.5, 2.5)
    }

    /// Outermost orbit radius: the smaller half-dimension minus a 3-cell
    /// margin, at 95%. Never below the innermost radius.
    pub fn max_orbit_radius(&self) -> f64 {
        let half_w = (self.width / 2) as f64 - 3.0;
        let half_h = (self.height / 2) as f64 - 3.0;
        (half_w.min(half_h) * 0.95).max(MIN_ORBIT_RADIUS)
    }

    /// Disc radius of a planet from its mean radius in km.
    pub fn planet_radius(&self, mean_radius_km: f64) -> i32 {
        if mean_radius_km <= 0.0 {
            return 1;
        }
        let log_r = mean_radius_km.log10();
        let base = if log_r >= 4.8 {
            3
        } else if log_r >= 4.3 {
            2
        } else {
            1
        };
        let scaled = (base as f64 * self.size_factor()) as i32;
        scaled.clamp(1, base)
    }

    /// Disc radius of each star in a system of `star_count` stars.
    pub fn star_radius(&self, star_count: usize) -> i32 {
        if star_count > 1 {
            return 2;
        }
        ((3.0 * self.size_factor()) as i32).clamp(2, 4)
    }
}

/// Log-compresses semimajor axes onto `[MIN_ORBIT_RADIUS, max_orbit_radius]`.
///
/// The range endpoints come from the body set and only change when the set or
/// the viewport does, so a scaler is built once per (set, viewport) pair and
/// reused for every body of the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceScaler {
    min_distance: f64,
    max_distance: f64,
    min_radius: f64,
    max_radius: f64,
}

impl DistanceScaler {
    pub fn new(bodies: &[CelestialBody], viewport: Viewport) -> Self {
        let (min_distance, max_distance) = distance_range(bodies);
        Self {
            min_distance,
            max_distance,
            min_radius: MIN_ORBIT_RADIUS,
            max_radius: viewport.max_orbit_radius(),
        }
    }

    pub fn radius_bounds(&self) -> (f64, f64) {
        (self.min_radius, self.max_radius)
    }

    pub fn scale(&self, distance: f64) -> f64 {
        if distance <= 0.0 {
            return 0.0;
        }
        let log_min = self.min_distance.ln();
        let log_max = self.max_distance.ln();
        let span = log_max - log_min;
        if span.abs() < f64::EPSILON {
            return (self.min_radius + self.max_radius) / 2.0;
        }
        let normalized = (distance.ln() - log_min) / span;
        self.min_radius + normalized * (self.max_radius - self.min_radius)
    }
}

/// One-shot form of [`DistanceScaler::scale`].
pub fn scale(distance: f64, bodies: &[CelestialBody], viewport: Viewport) -> f64 {
    DistanceScaler::new(bodies, viewport).scale(distance)
}

/// Smallest and largest semimajor axis among orbiting bodies.
pub fn distance_range(bodies: &[CelestialBody]) -> (f64, f64) {
    bodies
        .iter()
        .filter(|b| !b.is_primary() && b.semimajor_axis > 0.0)
        .map(|b| b.semimajor_axis)
        .fold(None, |acc: Option<(f64, f64)>, a| match acc {
            None => Some((a, a)),
            Some((lo, hi)) => Some((lo.min(a), hi.max(a))),
        })
        .unwrap_or(DEFAULT_DISTANCE_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;

    fn planets(axes: &[f64]) -> Vec<CelestialBody> {
        let mut v = vec![CelestialBody::new("Sun", BodyKind::Star)];
        for (i, a) in axes.iter().enumerate() {
            v.push(CelestialBody::new(&format!("p{i}"), BodyKind::Planet).with_orbit(*a, 100.0));
        }
        v
    }

    #[test]
    fn endpoints_map_to_radius_bounds() {
        let vp = Viewport::new(120, 40);
        let bodies = planets(&[0.39, 1.0, 5.2, 30.1]);
        let s = DistanceScaler::new(&bodies, vp);
        let (lo, hi) = s.radius_bounds();
        assert!((s.scale(0.39) - lo).abs() < 1e-9);
        assert!((s.scale(30.1) - hi).abs() < 1e-9);
        assert_eq!(lo, MIN_ORBIT_RADIUS);
        assert!((hi - 17.0 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn monotonic_in_distance() {
        let vp = Viewport::new(200, 60);
        let bodies = planets(&[0.1, 50.0]);
        let s = DistanceScaler::new(&bodies, vp);
        let mut prev = f64::MIN;
        let mut d = 0.1;
        while d <= 50.0 {
            let r = s.scale(d);
            assert!(r > prev);
            prev = r;
            d *= 1.1;
        }
    }

    #[test]
    fn non_positive_distance_is_zero() {
        let s = DistanceScaler::new(&planets(&[1.0, 2.0]), Viewport::new(80, 24));
        assert_eq!(s.scale(0.0), 0.0);
        assert_eq!(s.scale(-3.0), 0.0);
    }

    #[test]
    fn empty_set_uses_default_range() {
        assert_eq!(distance_range(&[]), DEFAULT_DISTANCE_RANGE);
        assert_eq!(distance_range(&planets(&[])), DEFAULT_DISTANCE_RANGE);
    }

    #[test]
    fn axisless_planets_do_not_widen_range() {
        let mut bodies = planets(&[0.5, 9.0]);
        bodies.push(CelestialBody::new("Rogue", BodyKind::Planet).with_orbit(0.0, 10.0));
        assert_eq!(distance_range(&bodies), (0.5, 9.0));
    }

    #[test]
    fn single_orbit_gets_fixed_radius() {
        let vp = Viewport::new(120, 40);
        let s = DistanceScaler::new(&planets(&[2.5]), vp);
        let r = s.scale(2.5);
        assert!(r.is_finite());
        let (lo, hi) = s.radius_bounds();
        assert!((r - (lo + hi) / 2.0).abs() < 1e-9);
        assert_eq!(s.scale(7.0), r);
    }

    #[test]
    fn tiny_viewport_keeps_radius_bounds_ordered() {
        let s = DistanceScaler::new(&planets(&[1.0, 2.0]), Viewport::new(10, 6));
        let (lo, hi) = s.radius_bounds();
        assert!(hi >= lo);
    }

    #[test]
    fn size_factor_reference_points() {
        assert!((Viewport::new(120, 36).size_factor() - 1.0).abs() < 1e-12);
        assert_eq!(Viewport::new(20, 10).size_factor(), 0.5);
        assert_eq!(Viewport::new(400, 200).size_factor(), 2.5);
    }

    #[test]
    fn body_radii() {
        let small = Viewport::new(80, 24);
        let big = Viewport::new(300, 120);
        assert_eq!(small.planet_radius(0.0), 1);
        assert_eq!(big.planet_radius(69_911.0), 3);
        assert_eq!(big.planet_radius(24_622.0), 2);
        assert_eq!(big.planet_radius(6_371.0), 1);
        assert_eq!(small.planet_radius(69_911.0), 2);
        assert_eq!(small.star_radius(1), 2);
        assert_eq!(big.star_radius(1), 4);
        assert_eq!(big.star_radius(3), 2);
    }
}
