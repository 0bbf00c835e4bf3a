use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::body::{BodyKind, CelestialBody, SOLAR_RADIUS_KM};

pub const SOL_SYSTEM: &str = "solar-system";
const SOL_DISPLAY_NAME: &str = "Solar System, Milky Way";
const SUN_NAMES: [&str; 5] = ["sun", "sol", "soleil", "sole", "sonne"];
const SOL_PLANETS: [&str; 9] = [
    "Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune", "Pluto",
];
const MAX_NAME_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("system '{0}' not found")]
    UnknownSystem(String),
    #[error("invalid system name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid system data: {0}")]
    Invalid(String),
}

/// On-disk star system file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    pub system_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discovery_year: String,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub galaxy: String,
    pub bodies: Vec<CelestialBody>,
}

impl SystemData {
    pub fn display_name(&self) -> String {
        if self.galaxy.trim().is_empty() {
            self.system_name.clone()
        } else {
            format!("{}, {}", self.system_name, self.galaxy)
        }
    }
}

/// A system ready for rendering: sorted by distance, with a primary.
#[derive(Clone, Debug)]
pub struct LoadedSystem {
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub bodies: Arc<[CelestialBody]>,
}

/// `[A-Za-z0-9_-]{1,64}`, not starting with `-` or `_`.
pub fn validate_system_name(name: &str) -> Result<(), CatalogError> {
    let invalid = |reason| CatalogError::InvalidName { name: name.to_string(), reason };
    if name.is_empty() {
        return Err(invalid("empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("longer than 64 characters"));
    }
    if name.starts_with('-') || name.starts_with('_') {
        return Err(invalid("must start with a letter or digit"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(invalid("only letters, digits, '-' and '_' are allowed"));
    }
    Ok(())
}

/// Rejects nameless bodies, negative sizes and distances, and unbound orbits.
pub fn validate_bodies(bodies: &[CelestialBody]) -> Result<(), CatalogError> {
    if bodies.is_empty() {
        return Err(CatalogError::Invalid("system must contain at least one body".into()));
    }
    for (i, b) in bodies.iter().enumerate() {
        let name = b.display_name();
        if name.trim().is_empty() {
            return Err(CatalogError::Invalid(format!("body at index {i} has no name")));
        }
        if b.mean_radius < 0.0 {
            return Err(CatalogError::Invalid(format!("{name}: negative radius {}", b.mean_radius)));
        }
        if b.semimajor_axis < 0.0 {
            return Err(CatalogError::Invalid(format!("{name}: negative semimajor axis")));
        }
        if !(0.0..1.0).contains(&b.eccentricity) {
            return Err(CatalogError::Invalid(format!("{name}: eccentricity {} out of range", b.eccentricity)));
        }
    }
    Ok(())
}

pub fn is_sun_name(name: &str) -> bool {
    SUN_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name.trim()))
}

/// Four or more canonical planet names.
pub fn looks_like_sol(bodies: &[CelestialBody]) -> bool {
    bodies.iter().filter(|b| SOL_PLANETS.contains(&b.display_name())).count() >= 4
}

/// Sorts by semimajor axis, normalizes Sun aliases in Sol-like sets and adds a
/// central star when nothing in the set is a primary.
pub fn prepare_bodies(mut bodies: Vec<CelestialBody>) -> Vec<CelestialBody> {
    let sol = looks_like_sol(&bodies);
    if sol {
        for b in bodies.iter_mut().filter(|b| is_sun_name(&b.english_name) || is_sun_name(&b.name)) {
            b.name = "Sun".into();
            b.english_name = "Sun".into();
            b.kind = BodyKind::Star;
        }
    }
    bodies.sort_by(|a, b| a.semimajor_axis.total_cmp(&b.semimajor_axis));
    if !bodies.iter().any(|b| b.is_primary()) {
        let star = central_star(&bodies, sol);
        debug!(star = star.display_name(), "synthesized central star");
        bodies.insert(0, star);
    }
    bodies
}

fn central_star(bodies: &[CelestialBody], sol: bool) -> CelestialBody {
    if sol {
        return sun();
    }
    let largest = bodies.iter().map(|b| b.mean_radius).fold(0.0, f64::max);
    let mut radius = largest * 10.0;
    if radius < 100_000.0 {
        radius = SOLAR_RADIUS_KM;
    }
    let mut star = CelestialBody::new("Central Star", BodyKind::Star)
        .with_radius(radius)
        .with_mass(1.9891, 30);
    star.id = "central-star".into();
    star
}

fn sun() -> CelestialBody {
    let mut s = CelestialBody::new("Sun", BodyKind::Star)
        .with_radius(SOLAR_RADIUS_KM)
        .with_mass(1.9891, 30)
        .with_temperature(5_778.0)
        .with_stellar_class("G2V");
    s.density = 1.408;
    s.gravity = 274.0;
    s
}

/// Sun plus the nine canonical bodies. Distances in km as served by the REST
/// API, so the built-in and remote snapshots render identically.
pub fn sol_bodies() -> Vec<CelestialBody> {
    #[rustfmt::skip]
    const TABLE: [(&str, f64, f64, f64, f64, i32, f64, f64, f64, f64); 9] = [
        // name, a (km), period (d), radius (km), mass, exp, e, incl, density, gravity
        ("Mercury", 57_909_227.0, 87.969, 2_439.7, 3.30114, 23, 0.2056, 7.0, 5.427, 3.7),
        ("Venus", 108_209_475.0, 224.701, 6_051.8, 4.86747, 24, 0.0068, 3.39, 5.243, 8.87),
        ("Earth", 149_598_262.0, 365.256, 6_371.0084, 5.97237, 24, 0.0167, 0.0, 5.514, 9.8),
        ("Mars", 227_943_824.0, 686.98, 3_389.5, 6.41712, 23, 0.0935, 1.85, 3.933, 3.71),
        ("Jupiter", 778_340_821.0, 4_332.589, 69_911.0, 1.89819, 27, 0.0489, 1.3, 1.326, 24.79),
        ("Saturn", 1_426_666_422.0, 10_759.22, 58_232.0, 5.68336, 26, 0.0565, 2.49, 0.687, 10.44),
        ("Uranus", 2_870_658_186.0, 30_685.4, 25_362.0, 8.68127, 25, 0.0457, 0.77, 1.27, 8.87),
        ("Neptune", 4_498_396_441.0, 60_189.0, 24_622.0, 1.02413, 26, 0.0113, 1.77, 1.638, 11.15),
        ("Pluto", 5_906_440_628.0, 90_560.0, 1_188.3, 1.303, 22, 0.2488, 17.14, 1.854, 0.62),
    ];
    let mut out = vec![sun()];
    for (name, a, period, radius, mass, exp, e, incl, density, gravity) in TABLE {
        let mut b = CelestialBody::new(name, BodyKind::Planet)
            .with_orbit(a, period)
            .with_radius(radius)
            .with_mass(mass, exp)
            .with_eccentricity(e);
        b.inclination = incl;
        b.density = density;
        b.gravity = gravity;
        out.push(b);
    }
    out
}

pub fn sol_system(bodies: Vec<CelestialBody>) -> LoadedSystem {
    LoadedSystem {
        key: SOL_SYSTEM.to_string(),
        display_name: SOL_DISPLAY_NAME.to_string(),
        description: "Our Solar System: eight planets and Pluto around the Sun".to_string(),
        bodies: prepare_bodies(bodies).into(),
    }
}

pub fn parse_system(raw: &str, path: &Path) -> Result<SystemData, CatalogError> {
    let data: SystemData = serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if data.system_name.trim().is_empty() {
        return Err(CatalogError::Invalid("systemName cannot be empty".into()));
    }
    validate_bodies(&data.bodies)?;
    Ok(data)
}

/// Built-in Sol plus every `*.json` system file in one directory.
#[derive(Debug, Default)]
pub struct Catalog {
    available: BTreeMap<String, PathBuf>,
    loaded: HashMap<String, LoadedSystem>,
}

impl Catalog {
    /// Indexes the directory. A missing directory yields a Sol-only catalog;
    /// files with invalid names are skipped.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref().to_path_buf();
        let mut catalog = Catalog::default();
        if !dir.is_dir() {
            info!(dir = %dir.display(), "systems directory not found; only the Solar System is available");
            return Ok(catalog);
        }
        let io_err = |source| CatalogError::Io { path: dir.clone(), source };
        let base = dir.canonicalize().map_err(io_err)?;
        for entry in std::fs::read_dir(&dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let path = entry.path();
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));
            if !is_json || !path.is_file() {
                continue;
            }
            match path.canonicalize() {
                Ok(real) if real.starts_with(&base) => {}
                _ => {
                    warn!(path = %path.display(), "skipping system file outside the systems directory");
                    continue;
                }
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Err(e) = validate_system_name(stem) {
                warn!(error = %e, "skipping system file");
                continue;
            }
            if stem == SOL_SYSTEM {
                continue;
            }
            catalog.available.insert(stem.to_string(), path);
        }
        info!(dir = %dir.display(), count = catalog.available.len(), "scanned star systems");
        Ok(catalog)
    }

    /// `solar-system` first, then file systems alphabetically.
    pub fn names(&self) -> Vec<String> {
        std::iter::once(SOL_SYSTEM.to_string())
            .chain(self.available.keys().cloned())
            .collect()
    }

    pub fn next_after(&self, current: &str) -> String {
        let names = self.names();
        let i = names.iter().position(|n| n == current).map_or(0, |i| (i + 1) % names.len());
        names[i].clone()
    }

    /// Replaces the cached entry, e.g. with remotely fetched Sol data.
    pub fn insert(&mut self, system: LoadedSystem) {
        self.loaded.insert(system.key.clone(), system);
    }

    pub fn load(&mut self, name: &str) -> Result<LoadedSystem, CatalogError> {
        if let Some(s) = self.loaded.get(name) {
            return Ok(s.clone());
        }
        let system = if name == SOL_SYSTEM {
            sol_system(sol_bodies())
        } else {
            validate_system_name(name)?;
            let path = self
                .available
                .get(name)
                .ok_or_else(|| CatalogError::UnknownSystem(name.to_string()))?;
            let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            let data = parse_system(&raw, path)?;
            LoadedSystem {
                key: name.to_string(),
                display_name: data.display_name(),
                description: data.description.clone(),
                bodies: prepare_bodies(data.bodies).into(),
            }
        };
        info!(system = name, bodies = system.bodies.len(), "loaded star system");
        self.loaded.insert(name.to_string(), system.clone());
        Ok(system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(tag: &str) -> Self {
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0);
            let p = std::env::temp_dir().join(format!("solterm-{tag}-{}-{nanos}", std::process::id()));
            fs::create_dir_all(&p).unwrap();
            TempDir(p)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    const PROXIMA: &str = r#"{
        "systemName": "Proxima Centauri",
        "description": "Nearest star to the Sun",
        "discoveryYear": "1915",
        "distance": "4.24 ly",
        "galaxy": "Milky Way",
        "bodies": [
            { "englishName": "Proxima d", "semimajorAxis": 0.02885, "sideralOrbit": 5.122, "meanRadius": 1.0 },
            { "englishName": "Proxima b", "semimajorAxis": 0.04857, "sideralOrbit": 11.186, "meanRadius": 7000 }
        ]
    }"#;

    #[test]
    fn name_validation() {
        assert!(validate_system_name("alpha-centauri").is_ok());
        assert!(validate_system_name("TRAPPIST_1").is_ok());
        assert!(validate_system_name("").is_err());
        assert!(validate_system_name("-x").is_err());
        assert!(validate_system_name("_x").is_err());
        assert!(validate_system_name("../etc").is_err());
        assert!(validate_system_name(&"a".repeat(65)).is_err());
        assert!(validate_system_name(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn scan_and_load_file_system() {
        let tmp = TempDir::new("scan");
        fs::write(tmp.0.join("proxima.json"), PROXIMA).unwrap();
        fs::write(tmp.0.join("notes.txt"), "ignored").unwrap();
        fs::write(tmp.0.join("kepler.yaml"), "systemName: Kepler").unwrap();
        fs::write(tmp.0.join("-bad.json"), PROXIMA).unwrap();

        let mut cat = Catalog::scan(&tmp.0).unwrap();
        assert_eq!(cat.names(), vec![SOL_SYSTEM.to_string(), "proxima".to_string()]);

        let sys = cat.load("proxima").unwrap();
        assert_eq!(sys.display_name, "Proxima Centauri, Milky Way");
        assert_eq!(sys.bodies[0].display_name(), "Central Star");
        assert_eq!(sys.bodies[0].mean_radius, SOLAR_RADIUS_KM);
        assert_eq!(sys.bodies[1].display_name(), "Proxima d");
        assert_eq!(sys.bodies[2].display_name(), "Proxima b");
    }

    #[test]
    fn missing_directory_is_sol_only() {
        let cat = Catalog::scan(std::env::temp_dir().join("solterm-definitely-missing-dir")).unwrap();
        assert_eq!(cat.names(), vec![SOL_SYSTEM.to_string()]);
        assert_eq!(cat.next_after(SOL_SYSTEM), SOL_SYSTEM);
    }

    #[test]
    fn unknown_system_errors() {
        let mut cat = Catalog::default();
        assert!(matches!(cat.load("vulcan"), Err(CatalogError::UnknownSystem(_))));
        assert!(matches!(cat.load("../x"), Err(CatalogError::InvalidName { .. })));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let tmp = TempDir::new("bad");
        fs::write(tmp.0.join("broken.json"), "{ not json").unwrap();
        fs::write(tmp.0.join("empty.json"), r#"{"systemName":"E","bodies":[]}"#).unwrap();
        let mut cat = Catalog::scan(&tmp.0).unwrap();
        assert!(matches!(cat.load("broken"), Err(CatalogError::Parse { .. })));
        assert!(matches!(cat.load("empty"), Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn built_in_sol() {
        let mut cat = Catalog::default();
        let sol = cat.load(SOL_SYSTEM).unwrap();
        assert_eq!(sol.display_name, "Solar System, Milky Way");
        assert_eq!(sol.bodies.len(), 10);
        assert_eq!(sol.bodies[0].display_name(), "Sun");
        assert_eq!(sol.bodies[9].display_name(), "Pluto");
        assert!(validate_bodies(&sol.bodies).is_ok());
    }

    #[test]
    fn sun_aliases_are_normalized_in_sol_sets() {
        let mut bodies = sol_bodies();
        bodies[0].english_name = "Soleil".into();
        bodies[0].kind = BodyKind::Planet;
        bodies.swap(0, 5);
        let prepared = prepare_bodies(bodies);
        assert_eq!(prepared[0].display_name(), "Sun");
        assert_eq!(prepared[0].kind, BodyKind::Star);
        assert_eq!(prepared.len(), 10);
    }

    #[test]
    fn central_star_scales_with_giants() {
        let giant = CelestialBody::new("Big", BodyKind::Planet).with_orbit(1.0, 100.0).with_radius(80_000.0);
        let prepared = prepare_bodies(vec![giant]);
        assert_eq!(prepared[0].mean_radius, 800_000.0);
        assert!((prepared[0].mass_kg() / 1.9891e30 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn next_after_cycles() {
        let mut cat = Catalog::default();
        cat.available.insert("a".into(), PathBuf::from("a.json"));
        cat.available.insert("b".into(), PathBuf::from("b.json"));
        assert_eq!(cat.next_after(SOL_SYSTEM), "a");
        assert_eq!(cat.next_after("b"), SOL_SYSTEM);
        assert_eq!(cat.next_after("gone"), SOL_SYSTEM);
    }

    #[test]
    fn invalid_bodies() {
        let e = CelestialBody::new("Comet", BodyKind::Planet).with_orbit(1.0, 1.0).with_eccentricity(1.2);
        assert!(validate_bodies(&[e]).is_err());
        let nameless = CelestialBody::default();
        assert!(validate_bodies(&[nameless]).is_err());
    }
}
