//! EIA open-data API integration for the Brent spot price series.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{Granularity, RawRecord};
use crate::error::AppError;

const BASE_URL: &str = "https://api.eia.gov/v2/petroleum/pri/spt/data/";
const PRODUCT_FACET: &str = "EPCBRENT";
const PAGE_LENGTH: usize = 5000;

// A stalled upstream should fail the render, not hang it.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct EiaClient {
    client: Client,
    api_key: String,
}

impl EiaClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("EIA_API_KEY")
            .map_err(|_| AppError::new(2, "Missing EIA_API_KEY in environment (.env)."))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, api_key })
    }

    /// Fetch raw Brent spot records for `[start, end]` at the given
    /// granularity.
    ///
    /// Single attempt, newest-first as the API returns them, up to one page of
    /// 5000 records. Non-200 status, a connection failure, or a payload
    /// without the expected `response.data` shape all surface as errors;
    /// callers degrade to a "no data" rendering.
    pub fn fetch_series(
        &self,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRecord>, AppError> {
        if end < start {
            return Err(AppError::new(
                2,
                format!("Requested window is inverted: {start} > {end}."),
            ));
        }

        let start_period = granularity.format_period(start);
        let end_period = granularity.format_period(end);
        let length = PAGE_LENGTH.to_string();

        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("frequency", granularity.as_api_str()),
                ("data[0]", "value"),
                ("facets[product][]", PRODUCT_FACET),
                ("start", start_period.as_str()),
                ("end", end_period.as_str()),
                ("sort[0][column]", "period"),
                ("sort[0][direction]", "desc"),
                ("offset", "0"),
                ("length", length.as_str()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("EIA request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("EIA request failed with status {}.", resp.status()),
            ));
        }

        let body: ApiEnvelope = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Unexpected EIA payload shape: {e}")))?;

        Ok(body
            .response
            .data
            .into_iter()
            .map(|row| RawRecord {
                period: row.period,
                value: row.value,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    response: ApiPayload,
}

#[derive(Debug, Deserialize)]
struct ApiPayload {
    data: Vec<ApiRow>,
}

#[derive(Debug, Deserialize)]
struct ApiRow {
    period: String,
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape_deserializes() {
        let json = r#"{
            "response": {
                "total": "2",
                "data": [
                    {"period": "2024-06-14", "product": "EPCBRENT", "value": "82.62"},
                    {"period": "2024-06-13", "product": "EPCBRENT", "value": "82,75"}
                ]
            },
            "request": {"command": "/v2/petroleum/pri/spt/data/"}
        }"#;

        let body: ApiEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(body.response.data.len(), 2);
        assert_eq!(body.response.data[0].period, "2024-06-14");
        assert_eq!(body.response.data[1].value, "82,75");
    }

    #[test]
    fn missing_data_key_is_a_shape_error() {
        let json = r#"{"response": {"total": "0"}}"#;
        assert!(serde_json::from_str::<ApiEnvelope>(json).is_err());
    }
}
