//! Open-Meteo archive client for seasonal rainfall totals

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::season::RainfallQuery;
use super::RainfallError;
use crate::recommend::{HttpRequest, RainfallEstimator, Transport};

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<ArchiveDaily>,
}

#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    precipitation_sum: Option<Vec<Option<f64>>>,
}

/// Estimates rainfall from last year's readings for the current season
pub struct OpenMeteoArchive {
    transport: Arc<dyn Transport>,
    archive_url: String,
}

impl OpenMeteoArchive {
    pub fn new(transport: Arc<dyn Transport>, archive_url: impl Into<String>) -> Self {
        Self {
            transport,
            archive_url: archive_url.into(),
        }
    }

    fn build_url(&self, query: &RainfallQuery) -> String {
        format!(
            "{}?latitude={}&longitude={}&start_date={}&end_date={}&daily=precipitation_sum&timezone=auto",
            self.archive_url,
            query.latitude,
            query.longitude,
            query.start_date.format("%Y-%m-%d"),
            query.end_date.format("%Y-%m-%d"),
        )
    }

    /// Same as `estimate_seasonal_rainfall` with an explicit "today"
    #[instrument(skip(self))]
    pub async fn estimate_for_date(
        &self,
        today: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64, RainfallError> {
        let query = RainfallQuery::for_date(today, latitude, longitude);
        debug!(
            season = query.window.name(),
            start = %query.start_date,
            end = %query.end_date,
            "querying rainfall archive"
        );

        let response = self
            .transport
            .send(HttpRequest::get(self.build_url(&query)))
            .await
            .map_err(|e| RainfallError::RequestFailed(e.to_string()))?;

        if !response.is_success() {
            return Err(RainfallError::Status(response.status));
        }

        let total = total_from_body(&response.body)?;
        debug!(total_mm = total, "rainfall archive total");
        Ok(total)
    }
}

#[async_trait]
impl RainfallEstimator for OpenMeteoArchive {
    async fn estimate_seasonal_rainfall(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<f64, RainfallError> {
        let today = Local::now().date_naive();
        self.estimate_for_date(today, latitude, longitude).await
    }
}

/// Decode an archive body and total its daily precipitation
pub fn total_from_body(body: &str) -> Result<f64, RainfallError> {
    let data: ArchiveResponse =
        serde_json::from_str(body).map_err(|e| RainfallError::ParseError(e.to_string()))?;
    let series = data
        .daily
        .and_then(|daily| daily.precipitation_sum)
        .filter(|series| !series.is_empty())
        .ok_or(RainfallError::MissingSeries)?;
    Ok(sum_precipitation(&series))
}

/// Sum a daily series, counting missing days as zero
pub fn sum_precipitation(series: &[Option<f64>]) -> f64 {
    series.iter().map(|day| day.unwrap_or(0.0)).sum()
}
