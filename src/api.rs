use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::body::CelestialBody;
use crate::catalog::{self, is_sun_name, LoadedSystem};

pub const DEFAULT_API_BASE: &str = "https://api.le-systeme-solaire.net/rest";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_BODIES: usize = 10_000;

#[derive(Debug, Deserialize)]
struct BodiesResponse {
    #[serde(default)]
    bodies: Vec<CelestialBody>,
}

/// Client for the le-systeme-solaire REST API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("solterm/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("http client build failed")?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// `GET {base}/bodies`, capped at [`MAX_RESPONSE_BYTES`].
    pub async fn fetch_bodies(&self) -> Result<Vec<CelestialBody>> {
        let url = format!("{}/bodies", self.base);
        debug!(%url, "fetching bodies");
        let mut resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("bodies request failed")?
            .error_for_status()
            .context("bodies HTTP error")?;

        if resp.content_length().is_some_and(|n| n as usize > MAX_RESPONSE_BYTES) {
            bail!("bodies response larger than {MAX_RESPONSE_BYTES} bytes");
        }
        let mut buf = Vec::new();
        while let Some(chunk) = resp.chunk().await.context("bodies read failed")? {
            if buf.len() + chunk.len() > MAX_RESPONSE_BYTES {
                bail!("bodies response larger than {MAX_RESPONSE_BYTES} bytes");
            }
            buf.extend_from_slice(&chunk);
        }
        parse_bodies(&buf)
    }

    /// Sol snapshot from the API: the planets plus the Sun.
    pub async fn fetch_sol(&self) -> Result<LoadedSystem> {
        let bodies = self.fetch_bodies().await?;
        info!(count = bodies.len(), "fetched Solar System bodies");
        Ok(catalog::sol_system(bodies))
    }
}

/// Parses a `/bodies` payload, keeps planets and the Sun, and validates them.
pub fn parse_bodies(raw: &[u8]) -> Result<Vec<CelestialBody>> {
    let resp: BodiesResponse = serde_json::from_slice(raw).context("bodies JSON parse failed")?;
    if resp.bodies.is_empty() {
        return Err(anyhow!("API response contains no bodies"));
    }
    if resp.bodies.len() > MAX_BODIES {
        bail!("API response contains {} bodies (max {MAX_BODIES})", resp.bodies.len());
    }
    let kept: Vec<CelestialBody> = resp
        .bodies
        .into_iter()
        .filter(|b| b.is_planet || is_sun_name(&b.english_name))
        .collect();
    catalog::validate_bodies(&kept).context("invalid API body data")?;
    Ok(kept)
}
