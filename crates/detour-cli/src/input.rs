//! Parsing of command line arguments into API request bodies.

use anyhow::{bail, Context, Result};
use detour_core::{CreateBlockageRequest, Location};
use serde::Serialize;

/// A route endpoint given on the command line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Endpoint {
    Point { lat: f64, lon: f64 },
    Place(String),
}

/// Parse `lat,lon` into a point; anything else is treated as a place name.
pub fn parse_endpoint(raw: &str) -> Result<Endpoint> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("location must not be empty");
    }

    if let Some((lat, lon)) = raw.split_once(',') {
        if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
            // Validates the range without keeping the location.
            Location::new(lat, lon, "")?;
            return Ok(Endpoint::Point { lat, lon });
        }
    }
    Ok(Endpoint::Place(raw.to_string()))
}

/// Parse `lat,lon,radius[,description]`. The description may contain commas.
pub fn parse_blockage(raw: &str) -> Result<CreateBlockageRequest> {
    let mut parts = raw.splitn(4, ',');
    let mut number = |field: &str| -> Result<f64> {
        let value = parts
            .next()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .with_context(|| format!("blockage '{}' is missing {}", raw, field))?;
        value
            .parse::<f64>()
            .with_context(|| format!("blockage {} '{}' is not a number", field, value))
    };
    let lat = number("lat")?;
    let lon = number("lon")?;
    let radius_m = number("radius")?;
    let description = parts
        .next()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let request = CreateBlockageRequest {
        lat,
        lon,
        radius_m,
        description,
    };
    // Reject locally what the server would reject.
    request.clone().into_blockage()?;
    Ok(request)
}
