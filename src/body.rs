use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const SOLAR_MASS_KG: f64 = 1.989e30;
pub const SOLAR_RADIUS_KM: f64 = 695_700.0;

/// Coarse classification. Anything the data source calls neither a star nor a
/// moon (planets, dwarf planets, asteroids) is treated as a planet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BodyKind {
    Star,
    #[default]
    Planet,
    Moon,
}

impl From<String> for BodyKind {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "star" => BodyKind::Star,
            "moon" => BodyKind::Moon,
            _ => BodyKind::Planet,
        }
    }
}

impl From<BodyKind> for String {
    fn from(k: BodyKind) -> Self {
        match k {
            BodyKind::Star => "Star",
            BodyKind::Planet => "Planet",
            BodyKind::Moon => "Moon",
        }
        .to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mass {
    pub mass_value: f64,
    pub mass_exponent: i32,
}

/// Keplerian elements recorded at `epoch`. Angles are in degrees, as shipped
/// by the data files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitalElements {
    #[serde(default)]
    pub semimajor_axis: f64,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination: f64,
    #[serde(default)]
    pub argument_of_periapsis: f64,
    #[serde(default)]
    pub longitude_of_ascending_node: f64,
    #[serde(default)]
    pub mean_anomaly: f64,
    pub epoch: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoonRef {
    pub id: String,
    #[serde(alias = "moon")]
    pub name: String,
    pub english_name: String,
    pub rel: String,
}

const KNOWN_MOON_IDS: &[(&str, &str)] = &[
    ("lune", "Moon"),
    ("encelade", "Enceladus"),
];

const FAMOUS_MOONS: &[(&str, &[&str])] = &[
    ("Earth", &["Moon"]),
    ("Mars", &["Phobos", "Deimos"]),
    ("Jupiter", &["Io", "Europa", "Ganymede", "Callisto"]),
    ("Saturn", &["Titan", "Enceladus", "Mimas", "Rhea"]),
    ("Uranus", &["Titania", "Oberon", "Umbriel", "Ariel"]),
    ("Neptune", &["Triton", "Nereid"]),
];

/// Readable name for an API moon id: known French ids are translated, the
/// rest are capitalized.
fn prettify_moon_id(id: &str) -> String {
    let lower = id.to_lowercase();
    if let Some((_, pretty)) = KNOWN_MOON_IDS.iter().find(|(k, _)| *k == lower) {
        return pretty.to_string();
    }
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl MoonRef {
    /// English name, then name, then the id or the last segment of `rel`.
    pub fn display_name(&self) -> Option<String> {
        if !self.english_name.is_empty() {
            return Some(self.english_name.clone());
        }
        if !self.name.is_empty() {
            return Some(self.name.clone());
        }
        let id = if self.id.is_empty() {
            self.rel.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
        } else {
            &self.id
        };
        (!id.is_empty()).then(|| prettify_moon_id(id))
    }
}

/// One body of a star system snapshot. Distances are in whatever unit the
/// source uses (km for the REST API, AU for most system files); only ratios
/// between bodies of the same snapshot matter for rendering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CelestialBody {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub english_name: String,
    pub is_planet: bool,
    #[serde(rename = "bodyType", deserialize_with = "null_as_default")]
    pub kind: BodyKind,
    #[serde(deserialize_with = "null_as_default")]
    pub moons: Vec<MoonRef>,
    pub semimajor_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub mass: Option<Mass>,
    pub density: f64,
    pub gravity: f64,
    pub mean_radius: f64,
    pub sideral_orbit: f64,
    pub temperature: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub stellar_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbital_elements: Option<OrbitalElements>,
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

impl CelestialBody {
    pub fn new(name: &str, kind: BodyKind) -> Self {
        Self {
            id: name.to_ascii_lowercase(),
            name: name.to_string(),
            english_name: name.to_string(),
            is_planet: kind == BodyKind::Planet,
            kind,
            ..Self::default()
        }
    }

    pub fn with_orbit(mut self, semimajor_axis: f64, period_days: f64) -> Self {
        self.semimajor_axis = semimajor_axis;
        self.sideral_orbit = period_days;
        self
    }

    pub fn with_radius(mut self, mean_radius_km: f64) -> Self {
        self.mean_radius = mean_radius_km;
        self
    }

    pub fn with_mass(mut self, value: f64, exponent: i32) -> Self {
        self.mass = Some(Mass { mass_value: value, mass_exponent: exponent });
        self
    }

    pub fn with_eccentricity(mut self, e: f64) -> Self {
        self.eccentricity = e;
        self
    }

    pub fn with_stellar_class(mut self, class: &str) -> Self {
        self.stellar_class = class.to_string();
        self
    }

    pub fn with_temperature(mut self, kelvin: f64) -> Self {
        self.temperature = kelvin;
        self
    }

    pub fn with_elements(mut self, el: OrbitalElements) -> Self {
        self.orbital_elements = Some(el);
        self
    }

    /// `englishName`, then `name`, then `id`.
    /// Names of this body's moons. When none of the references carry a usable
    /// name, well-known moons of the Solar System planets stand in, never more
    /// than the recorded moon count.
    pub fn moon_names(&self) -> Vec<String> {
        let names: Vec<String> = self.moons.iter().filter_map(MoonRef::display_name).collect();
        if !names.is_empty() || self.moons.is_empty() {
            return names;
        }
        FAMOUS_MOONS
            .iter()
            .find(|(planet, _)| *planet == self.display_name())
            .map(|(_, moons)| moons.iter().take(self.moons.len()).map(|m| m.to_string()).collect())
            .unwrap_or_default()
    }

    pub fn display_name(&self) -> &str {
        if !self.english_name.is_empty() {
            &self.english_name
        } else if !self.name.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }

    pub fn mass_kg(&self) -> f64 {
        match self.mass {
            Some(m) if m.mass_value != 0.0 => m.mass_value * 10f64.powi(m.mass_exponent),
            _ => 0.0,
        }
    }

    /// Central bodies have no revolution of their own: stars, the Sun by name,
    /// and non-planets without a positive semimajor axis. A planet missing its
    /// axis stays a planet and simply is not drawn on an orbit.
    pub fn is_primary(&self) -> bool {
        self.kind == BodyKind::Star
            || self.display_name() == "Sun"
            || (self.semimajor_axis <= 0.0 && !self.is_planet)
    }
}
