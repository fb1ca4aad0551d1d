use serde::{Deserialize, Serialize};

use crate::shared::lenient::{self, JsonObject};

/// Measurable sub-goal of an objective.
///
/// Numbers are coerced leniently; a missing `weight` reads as 0 and is
/// scored as weight 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "JsonObject")]
pub struct KeyResult {
    pub title: String,
    pub start_value: f64,
    pub target_value: f64,
    pub current_value: f64,
    pub weight: f64,
}

impl From<JsonObject> for KeyResult {
    fn from(map: JsonObject) -> Self {
        Self {
            title: lenient::text_field(&map, &["title", "name"]),
            start_value: lenient::number_field(&map, &["startValue", "startingValue"]),
            target_value: lenient::number_field(&map, &["targetValue", "target"]),
            current_value: lenient::number_field(&map, &["currentValue", "current"]),
            weight: lenient::number_field(&map, &["weight"]),
        }
    }
}

impl KeyResult {
    pub fn new(start_value: f64, target_value: f64, current_value: f64, weight: f64) -> Self {
        Self {
            title: String::new(),
            start_value,
            target_value,
            current_value,
            weight,
        }
    }
}

/// Objective with its key results. Progress is never stored, it is derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "JsonObject")]
pub struct Objective {
    pub id: String,
    pub title: String,
    pub key_results: Vec<KeyResult>,
}

impl From<JsonObject> for Objective {
    fn from(map: JsonObject) -> Self {
        Self {
            id: lenient::text_field(&map, &["id", "_id"]),
            title: lenient::text_field(&map, &["title", "name"]),
            key_results: lenient::list_field(&map, &["keyResults"], "key results"),
        }
    }
}
