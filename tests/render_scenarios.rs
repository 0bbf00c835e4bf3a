use chrono::{Duration, TimeZone, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::{PI, TAU};

use solterm::barycenter::BarycenterPlacer;
use solterm::body::OrbitalElements;
use solterm::debris::{ASTEROID_GLYPH, KUIPER_GLYPH};
use solterm::ephemeris::AngularPositionCalculator;
use solterm::glyphs::{star_symbol, symbol_for, SUN_GLYPH};
use solterm::raster::{CircleRasterizer, Grid, ORBIT_GLYPH};
use solterm::scale::{DistanceScaler, Viewport, MIN_ORBIT_RADIUS};
use solterm::{BodyKind, CelestialBody, Compositor, FrameTime};

fn epoch() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

fn at(instant: chrono::DateTime<Utc>) -> FrameTime {
    FrameTime { instant, elapsed_secs: 0.0 }
}

fn compositor() -> Compositor {
    Compositor::with_calculator(2.0, AngularPositionCalculator::new(epoch()))
}

/// Signed shortest angular step from `a` to `b`.
fn step(a: f64, b: f64) -> f64 {
    let d = (b - a).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

#[test]
fn lone_star_fills_only_its_disc() {
    let bodies = vec![CelestialBody::new("Vega", BodyKind::Star).with_stellar_class("A0V")];
    let frame = compositor().render_at(&bodies, 80, 24, at(epoch()));
    let glyph = star_symbol(&bodies[0]);

    assert_eq!(frame.grid.get(40, 12), Some(glyph));
    assert!(frame.grid.occupied().all(|(_, _, c)| c == glyph));
    assert_eq!(frame.grid.count(ORBIT_GLYPH), 0);
    assert_eq!(frame.grid.count(ASTEROID_GLYPH), 0);
    assert_eq!(frame.grid.count(KUIPER_GLYPH), 0);
    assert_eq!(frame.positions.len(), 1);
    assert_eq!(frame.positions["Vega"].x, 40);
}

#[test]
fn binary_offsets_follow_inverse_mass_ratio() {
    let bodies = vec![
        CelestialBody::new("Heavy", BodyKind::Star).with_mass(2.0, 30),
        CelestialBody::new("Light", BodyKind::Star).with_mass(1.0, 30),
    ];
    let frame = compositor().render_at(&bodies, 80, 24, at(epoch()));
    let heavy = frame.positions["Heavy"];
    let light = frame.positions["Light"];
    assert_eq!((heavy.x, heavy.y), (42, 12));
    assert_eq!((light.x, light.y), (36, 12));
    assert_eq!((light.x - 40).abs(), 2 * (heavy.x - 40).abs());

    let (r1, r2) = BarycenterPlacer::new(Viewport::new(200, 60), 2.0).binary_radii(&bodies[0], &bodies[1]);
    assert!((r2 / r1 - 2.0).abs() < 1e-9);
}

#[test]
fn binary_keeps_heavier_star_closer() {
    let placer = BarycenterPlacer::new(Viewport::new(120, 40), 2.0);
    let equal = [
        CelestialBody::new("A", BodyKind::Star).with_mass(1.0, 30),
        CelestialBody::new("B", BodyKind::Star).with_mass(1.0, 30),
    ];
    let unequal = [
        CelestialBody::new("A", BodyKind::Star).with_mass(3.0, 30),
        CelestialBody::new("B", BodyKind::Star).with_mass(1.0, 30),
    ];
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let t = rng.gen_range(0.0..500.0);
        let p = placer.positions(&equal, 60, 20, t);
        assert_eq!(p[0].0 - 60, -(p[1].0 - 60));
        assert_eq!(p[0].1 - 20, -(p[1].1 - 20));

        let p = placer.positions(&unequal, 60, 20, t);
        let d = |(x, y): (i32, i32)| ((x - 60).pow(2) + (y - 20).pow(2)) as f64;
        assert!(d(p[0]) <= d(p[1]));
    }
}

#[test]
fn zero_axis_planet_is_not_orbiting() {
    let bodies = vec![
        CelestialBody::new("Sun", BodyKind::Star).with_mass(1.989, 30),
        CelestialBody::new("Earth", BodyKind::Planet).with_orbit(1.0, 365.256),
        CelestialBody::new("Mars", BodyKind::Planet).with_orbit(1.524, 686.98),
        CelestialBody::new("Rogue", BodyKind::Planet).with_orbit(0.0, 100.0),
    ];
    let time = FrameTime { instant: epoch(), elapsed_secs: 5.0 };
    let frame = compositor().render_at(&bodies, 120, 40, time);

    let sun = frame.positions["Sun"];
    assert_eq!((sun.x, sun.y), (60, 20));
    assert!(!frame.positions.contains_key("Rogue"));
    assert_eq!(frame.grid.count(symbol_for("Rogue")), 0);
    assert!(frame.positions.contains_key("Earth"));
}

#[test]
fn zero_axis_non_planet_joins_the_stars() {
    let mut companion = CelestialBody::new("Companion", BodyKind::Planet).with_orbit(0.0, 0.0);
    companion.is_planet = false;
    let bodies = vec![CelestialBody::new("Sun", BodyKind::Star), companion];
    let frame = compositor().render_at(&bodies, 80, 24, at(epoch()));
    assert_eq!(frame.grid.count(ORBIT_GLYPH), 0);
    assert_eq!(frame.positions.len(), 2);
    // multi-star disc size
    assert_eq!(frame.positions["Companion"].radius, 2);
    assert_ne!(frame.positions["Sun"].x, 40);
}

#[test]
fn resize_keeps_angular_order() {
    let mut bodies = vec![CelestialBody::new("Host", BodyKind::Star).with_mass(1.0, 30)];
    for (i, (name, m0)) in [("b", 10.0), ("c", 100.0), ("d", 190.0), ("e", 280.0)].into_iter().enumerate() {
        let a = (i + 1) as f64;
        bodies.push(
            CelestialBody::new(name, BodyKind::Planet)
                .with_orbit(a, 100.0 * a)
                .with_radius(5_000.0)
                .with_elements(OrbitalElements {
                    semimajor_axis: a,
                    eccentricity: 0.0,
                    inclination: 0.0,
                    argument_of_periapsis: 0.0,
                    longitude_of_ascending_node: 0.0,
                    mean_anomaly: m0,
                    epoch: epoch(),
                }),
        );
    }

    let order = |w: usize, h: usize| {
        let frame = compositor().render_at(&bodies, w, h, at(epoch()));
        let (cx, cy) = Viewport::new(w, h).center();
        let mut named: Vec<(String, f64, f64)> = ["b", "c", "d", "e"]
            .iter()
            .map(|n| {
                let p = frame.positions[*n];
                let dx = (p.x - cx) as f64 / 2.0;
                let dy = (p.y - cy) as f64;
                (n.to_string(), dy.atan2(dx).rem_euclid(TAU), (dx * dx + dy * dy).sqrt())
            })
            .collect();
        named.sort_by(|a, b| a.1.total_cmp(&b.1));
        named
    };

    let small = order(80, 24);
    let large = order(200, 60);
    let names = |v: &[(String, f64, f64)]| v.iter().map(|(n, _, _)| n.clone()).collect::<Vec<_>>();
    assert_eq!(names(&small), vec!["b", "c", "d", "e"]);
    assert_eq!(names(&small), names(&large));

    let outer_small = small.iter().find(|(n, _, _)| n == "e").map(|t| t.2).unwrap();
    let outer_large = large.iter().find(|(n, _, _)| n == "e").map(|t| t.2).unwrap();
    assert!(outer_large > outer_small);
}

#[test]
fn angle_advances_and_repeats_each_period() {
    let calc = AngularPositionCalculator::new(epoch());
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        // whole-millisecond periods keep the k·period shift exact
        let period_days = rng.gen_range(1..20_000) as f64 / 4.0;
        let body = CelestialBody::new("Wanderer", BodyKind::Planet)
            .with_orbit(rng.gen_range(0.1..40.0), period_days)
            .with_eccentricity(rng.gen_range(0.0..0.4));
        let t = epoch() + Duration::seconds(rng.gen_range(-1_000_000_000..1_000_000_000));

        let k = rng.gen_range(1..5);
        let shifted = t + Duration::milliseconds((period_days * 86_400_000.0) as i64 * k);
        assert!(step(calc.angle(&body, t), calc.angle(&body, shifted)).abs() < 1e-6);

        let dt = Duration::milliseconds((period_days * 86_400_000.0 / 10.0) as i64);
        let a0 = calc.angle(&body, t);
        let a1 = calc.angle(&body, t + dt);
        assert!(step(a0, a1) > 0.0);
    }
}

#[test]
fn zero_period_angle_is_constant() {
    let calc = AngularPositionCalculator::new(epoch());
    let body = CelestialBody::new("Frozen", BodyKind::Planet).with_orbit(3.0, 0.0).with_eccentricity(0.1);
    let a = calc.angle(&body, epoch());
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let t = epoch() + Duration::days(rng.gen_range(-100_000..100_000));
        assert_eq!(calc.angle(&body, t), a);
    }
}

#[test]
fn scaler_is_monotonic_between_endpoints() {
    let viewport = Viewport::new(160, 48);
    let bodies: Vec<_> = [0.4, 1.0, 5.2, 30.0]
        .iter()
        .map(|a| CelestialBody::new("p", BodyKind::Planet).with_orbit(*a, 100.0))
        .collect();
    let scaler = DistanceScaler::new(&bodies, viewport);
    assert!((scaler.scale(0.4) - MIN_ORBIT_RADIUS).abs() < 1e-9);
    assert!((scaler.scale(30.0) - viewport.max_orbit_radius()).abs() < 1e-9);

    let mut rng = StdRng::seed_from_u64(11);
    let mut samples: Vec<f64> = (0..200).map(|_| rng.gen_range(0.4..30.0)).collect();
    samples.sort_by(f64::total_cmp);
    for w in samples.windows(2) {
        assert!(scaler.scale(w[0]) <= scaler.scale(w[1]));
    }
}

#[test]
fn rasterizer_stays_inside_grid() {
    let r = CircleRasterizer::new(2.0);
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..100 {
        let (w, h) = (rng.gen_range(1..60), rng.gen_range(1..30));
        let mut grid = Grid::new(w, h);
        let (cx, cy) = (rng.gen_range(-20..80), rng.gen_range(-20..50));
        r.outline(&mut grid, cx, cy, rng.gen_range(0.0..40.0), ORBIT_GLYPH);
        r.disc(&mut grid, cx, cy, rng.gen_range(0..6), '●');
        assert_eq!((grid.width(), grid.height()), (w, h));
        assert!(grid.occupied().all(|(x, y, _)| x < w && y < h));
    }
}

#[test]
fn glyph_assignment_is_pure() {
    for name in ["Earth", "Kepler-22b", "TRAPPIST-1e", "", "Ünïcödé"] {
        assert_eq!(symbol_for(name), symbol_for(name));
    }
    let star = CelestialBody::new("Proxima", BodyKind::Star).with_temperature(3_042.0);
    assert_eq!(star_symbol(&star), star_symbol(&star.clone()));
    assert_eq!(symbol_for("Sun"), SUN_GLYPH);
}
