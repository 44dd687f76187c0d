/// Plant gateway readings API client
///
/// Retrieves the current parameter snapshot from a plant gateway's
/// `/api/data` endpoint, which answers with a JSON array of
/// `{ "name": ..., "value": ... }` objects. Names are validated against the
/// parameter registry before the snapshot reaches the evaluator.

use std::time::Duration;

use serde::Deserialize;

use crate::ingest::{IngestError, ReadingSource};
use crate::model::Reading;
use crate::parameters::validate_readings;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// API Response Structures
// ============================================================================

/// Single entry of the readings array
#[derive(Debug, Deserialize)]
pub struct ApiReading {
    pub name: String,
    pub value: f64,
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetch the current readings from `url`
///
/// # Parameters
/// - `client`: HTTP client
/// - `url`: full readings endpoint, e.g. "http://gateway.local/api/data"
/// - `token`: optional bearer token for gateways behind auth
///
/// # Returns
/// The snapshot with canonical parameter names
pub fn fetch_readings(
    client: &reqwest::blocking::Client,
    url: &str,
    token: Option<&str>,
) -> Result<Vec<Reading>, IngestError> {
    let mut request = client.get(url).header("Accept", "application/json");
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send()?;

    if !response.status().is_success() {
        return Err(IngestError::Status(response.status().as_u16()));
    }

    let payload: Vec<ApiReading> = response.json()?;
    parse_payload(payload)
}

/// Convert and validate a decoded payload
fn parse_payload(payload: Vec<ApiReading>) -> Result<Vec<Reading>, IngestError> {
    let readings = payload
        .into_iter()
        .map(|r| Reading::new(r.name, r.value))
        .collect();
    Ok(validate_readings(readings)?)
}

// ============================================================================
// Reading Source
// ============================================================================

/// `ReadingSource` backed by a gateway endpoint
pub struct ApiReadingSource {
    plant: String,
    url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl ApiReadingSource {
    pub fn new(plant: impl Into<String>, url: impl Into<String>) -> Result<Self, IngestError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            plant: plant.into(),
            url: url.into(),
            token: None,
            client,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReadingSource for ApiReadingSource {
    fn name(&self) -> &str {
        &self.plant
    }

    fn next_snapshot(&mut self) -> Result<Vec<Reading>, IngestError> {
        fetch_readings(&self.client, &self.url, self.token.as_deref())
    }
}
