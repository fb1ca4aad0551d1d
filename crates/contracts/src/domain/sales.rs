use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::lenient::{self, JsonObject};

/// Single sale as returned by the sales endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "JsonObject")]
pub struct SaleRecord {
    /// Missing or non-numeric amounts read as 0.
    pub amount: f64,
    /// `None` when the timestamp is missing or unreadable.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl From<JsonObject> for SaleRecord {
    fn from(map: JsonObject) -> Self {
        Self {
            amount: lenient::number_field(&map, &["amount", "totalAmount", "total"]),
            occurred_at: lenient::datetime_field(
                &map,
                &["occurredAt", "createdAt", "saleDate", "date"],
            ),
        }
    }
}

impl SaleRecord {
    pub fn new(amount: f64, occurred_at: DateTime<Utc>) -> Self {
        Self {
            amount,
            occurred_at: Some(occurred_at),
        }
    }
}

/// Result of a sales query for one date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "JsonObject")]
pub struct SalesQueryResult {
    pub total_sales: f64,
    pub records: Vec<SaleRecord>,
}

impl From<JsonObject> for SalesQueryResult {
    fn from(map: JsonObject) -> Self {
        Self {
            total_sales: lenient::number_field(&map, &["totalSales"]),
            records: lenient::list_field(&map, &["records", "sales"], "sales"),
        }
    }
}

impl SalesQueryResult {
    /// Read a sales payload; anything that is not an object is an empty result.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from(map),
            Value::Array(_) => Self {
                total_sales: 0.0,
                records: lenient::list_from_value(value, "sales"),
            },
            _ => {
                tracing::warn!("sales payload is not an object, treating as empty");
                Self::default()
            }
        }
    }
}
