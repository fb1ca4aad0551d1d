use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use contracts::domain::medicine::{MedicineRef, WinningProduct};
use contracts::domain::objective::Objective;
use contracts::domain::sales::SalesQueryResult;
use contracts::shared::date_range::DateRange;
use contracts::shared::lenient::list_from_value;
use serde_json::Value;

use super::provider::DashboardDataProvider;
use crate::shared::config::ApiConfig;

const SALES_PATH: &str = "sales";
const EXPIRING_SOON_PATH: &str = "medicines/expiring-soon";
const EXPIRED_PATH: &str = "medicines/expired";
const LOW_STOCK_PATH: &str = "medicines/low-stock";
const MEDICINE_REPORT_PATH: &str = "reports/medicines";
const OBJECTIVES_PATH: &str = "okr/objectives";

/// Longest error body quoted in a failure message.
const MAX_ERROR_BODY: usize = 300;

/// HTTP-клиент к REST API аптеки.
pub struct HttpDashboardProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpDashboardProvider {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config
                .token
                .as_ref()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/{}", self.base_url, path);
        if !query.is_empty() {
            let params: Vec<String> = query
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
                .collect();
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }

    /// GET a JSON document. Transport errors, non-2xx statuses and
    /// non-JSON bodies are errors; the document's shape is not checked here.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path, query);
        tracing::debug!("Pharmacy API: GET {}", url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Network error while requesting {}: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(anyhow!("HTTP {} from {}: {}", status, url, body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| anyhow!("Invalid JSON from {}: {}", url, e))
    }

    async fn get_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let value = self.get_json(path, &[]).await?;
        Ok(list_from_value(value, path))
    }
}

#[async_trait]
impl DashboardDataProvider for HttpDashboardProvider {
    async fn query_sales(&self, range: &DateRange) -> Result<SalesQueryResult> {
        let query = [
            ("startDate", range.start().to_rfc3339_opts(SecondsFormat::Millis, false)),
            ("endDate", range.end().to_rfc3339_opts(SecondsFormat::Millis, false)),
        ];
        let value = self.get_json(SALES_PATH, &query).await?;
        let result = SalesQueryResult::from_value(value);
        tracing::debug!(
            "Pharmacy API: {} sales records, total {} for {}..{}",
            result.records.len(),
            result.total_sales,
            range.first_day(),
            range.last_day()
        );
        Ok(result)
    }

    async fn query_expiring_soon(&self) -> Result<Vec<MedicineRef>> {
        self.get_list(EXPIRING_SOON_PATH).await
    }

    async fn query_expired(&self) -> Result<Vec<MedicineRef>> {
        self.get_list(EXPIRED_PATH).await
    }

    async fn query_low_stock(&self) -> Result<Vec<MedicineRef>> {
        self.get_list(LOW_STOCK_PATH).await
    }

    async fn query_winning_products(&self) -> Result<Vec<WinningProduct>> {
        self.get_list(MEDICINE_REPORT_PATH).await
    }

    async fn query_objectives(&self) -> Result<Vec<Objective>> {
        self.get_list(OBJECTIVES_PATH).await
    }
}
