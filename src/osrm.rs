//! OSRM HTTP adapter for road distance matrices.

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::traits::DistanceMatrixProvider;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum OsrmError {
    #[error("OSRM request failed")]
    Http(#[from] reqwest::Error),
    #[error("OSRM response carried no distances")]
    MissingDistances,
    #[error("OSRM returned {rows} rows for {expected} locations")]
    Shape { expected: usize, rows: usize },
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, OsrmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Fetches the road distance matrix in meters. Unroutable pairs come back
    /// as `i32::MAX`.
    pub fn fetch_matrix(&self, locations: &[(f64, f64)]) -> Result<Vec<Vec<i32>>, OsrmError> {
        if locations.is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .client
            .get(table_url(&self.config, locations))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmTableResponse>())?;

        into_matrix(body, locations.len())
    }
}

impl DistanceMatrixProvider for OsrmClient {
    fn matrix_for(&self, locations: &[(f64, f64)]) -> Vec<Vec<i32>> {
        match self.fetch_matrix(locations) {
            Ok(matrix) => matrix,
            Err(err) => {
                warn!(error = %err, locations = locations.len(), "OSRM distance lookup failed");
                Vec::new()
            }
        }
    }
}

fn table_url(config: &OsrmConfig, locations: &[(f64, f64)]) -> String {
    let coords = locations
        .iter()
        .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
        .collect::<Vec<_>>()
        .join(";");

    format!(
        "{}/table/v1/{}/{}?annotations=distance",
        config.base_url, config.profile, coords
    )
}

fn into_matrix(body: OsrmTableResponse, expected: usize) -> Result<Vec<Vec<i32>>, OsrmError> {
    let distances = body.distances.ok_or(OsrmError::MissingDistances)?;
    if distances.len() != expected || distances.iter().any(|row| row.len() != expected) {
        return Err(OsrmError::Shape {
            expected,
            rows: distances.len(),
        });
    }

    Ok(distances
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| value.map_or(i32::MAX, |meters| meters.round() as i32))
                .collect()
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    distances: Option<Vec<Vec<Option<f64>>>>,
}
