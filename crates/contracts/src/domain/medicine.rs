use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::lenient::{self, JsonObject};

/// Medicine reference as returned by the expiring / expired / low-stock endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "JsonObject")]
pub struct MedicineRef {
    pub id: String,
    pub name: String,
    pub batch: String,
    pub brand: String,
    pub dosage_form: String,
    pub category: String,
    /// Supplier name; a nested `{ "name": .. }` object is flattened to its name.
    pub supplier: String,
    pub expiry_date: Option<DateTime<Utc>>,
    pub quantity: f64,
}

impl From<JsonObject> for MedicineRef {
    fn from(map: JsonObject) -> Self {
        Self {
            id: lenient::text_field(&map, &["id", "_id"]),
            name: lenient::text_field(&map, &["name", "medicineName"]),
            batch: lenient::text_field(&map, &["batch", "batchNumber", "batchNo"]),
            brand: lenient::text_field(&map, &["brand"]),
            dosage_form: lenient::text_field(&map, &["dosageForm"]),
            category: lenient::text_field(&map, &["category"]),
            supplier: lenient::text_field(&map, &["supplier", "supplierName"]),
            expiry_date: lenient::datetime_field(&map, &["expiryDate", "expireDate"]),
            quantity: lenient::number_field(&map, &["quantity", "stock"]),
        }
    }
}

/// One row of the medicine sales report ("winning products").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "JsonObject")]
pub struct WinningProduct {
    pub medicine_name: String,
    pub total_sales: f64,
    pub sales_percent: f64,
}

impl From<JsonObject> for WinningProduct {
    fn from(map: JsonObject) -> Self {
        Self {
            medicine_name: lenient::text_field(&map, &["medicineName", "name"]),
            total_sales: lenient::number_field(&map, &["totalSales"]),
            sales_percent: lenient::number_field(&map, &["salesPercent", "percentage"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::lenient::list_from_value;
    use serde_json::json;

    #[test]
    fn test_medicine_ref_flattens_supplier() {
        let medicines: Vec<MedicineRef> = list_from_value(
            json!([{
                "_id": "m1",
                "name": "Amoxicillin",
                "batchNumber": "B-17",
                "brand": "Generic",
                "dosageForm": "Capsule",
                "category": {"name": "Antibiotics"},
                "supplier": {"name": "MedSupply", "phone": "123"},
                "expiryDate": "2024-05-01",
                "quantity": "12"
            }]),
            "expired",
        );

        assert_eq!(medicines.len(), 1);
        let m = &medicines[0];
        assert_eq!(m.id, "m1");
        assert_eq!(m.batch, "B-17");
        assert_eq!(m.dosage_form, "Capsule");
        assert_eq!(m.category, "Antibiotics");
        assert_eq!(m.supplier, "MedSupply");
        assert!(m.expiry_date.is_some());
        assert_eq!(m.quantity, 12.0);
    }

    #[test]
    fn test_medicine_with_id_and_mongo_id_is_kept() {
        let medicines: Vec<MedicineRef> = list_from_value(
            json!([{
                "_id": "a",
                "id": "a",
                "name": "Insulin",
                "medicineName": "Insulin 100IU",
                "expiryDate": "2024-05-01",
                "expireDate": "2024-06-01",
                "quantity": 4,
                "stock": 9
            }]),
            "expired",
        );

        assert_eq!(medicines.len(), 1);
        assert_eq!(medicines[0].id, "a");
        assert_eq!(medicines[0].name, "Insulin");
        assert_eq!(medicines[0].quantity, 4.0);
        assert_eq!(
            medicines[0].expiry_date.map(|d| d.date_naive().to_string()),
            Some("2024-05-01".to_string())
        );
    }

    #[test]
    fn test_winning_product_coercion() {
        let rows: Vec<WinningProduct> = list_from_value(
            json!({"data": [
                {"medicineName": "Paracetamol", "totalSales": "420", "salesPercent": 35.5},
                {"name": "Ibuprofen", "totalSales": null, "percentage": "x"}
            ]}),
            "winning products",
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].total_sales, 420.0);
        assert_eq!(rows[0].sales_percent, 35.5);
        assert_eq!(rows[1].medicine_name, "Ibuprofen");
        assert_eq!(rows[1].total_sales, 0.0);
        assert_eq!(rows[1].sales_percent, 0.0);
    }

    #[test]
    fn test_winning_product_with_both_names() {
        let rows: Vec<WinningProduct> = list_from_value(
            json!([{"medicineName": "Paracetamol", "name": "PCM", "salesPercent": 10, "percentage": 11}]),
            "winning products",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].medicine_name, "Paracetamol");
        assert_eq!(rows[0].sales_percent, 10.0);
    }
}
