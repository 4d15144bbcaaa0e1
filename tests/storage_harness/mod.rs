//! Shared test harness for repository backend testing
//!
//! Provides `TestProduct` implementing `Listable` with fields covering every
//! `FieldType`, its metadata table, and helper functions for creating test data.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod repository_tests;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use this_list::core::entity::Listable;
use this_list::core::field::{FieldType, FieldValue};
use this_list::core::metadata::{EntityMetadata, FieldSpec, MetadataProvider, MetadataRegistry};

// ---------------------------------------------------------------------------
// TestProduct: covers all FieldType variants
// ---------------------------------------------------------------------------

/// A test entity with fields spanning all `FieldType` variants.
///
/// Fields:
/// - `id`: Uuid (primary key)
/// - `name`: Text
/// - `units_in_stock`: Integer
/// - `unit_price`: Float
/// - `discontinued`: Boolean
/// - `created_at`: DateTime
/// - `category`: optional Text (missing-value testing)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestProduct {
    pub id: Uuid,
    pub name: String,
    pub units_in_stock: i64,
    pub unit_price: f64,
    pub discontinued: bool,
    pub created_at: DateTime<Utc>,
    pub category: Option<String>,
}

impl Listable for TestProduct {
    fn entity_type() -> &'static str {
        "test_product"
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "name" => Some(FieldValue::String(self.name.clone())),
            "units_in_stock" => Some(FieldValue::Integer(self.units_in_stock)),
            "unit_price" => Some(FieldValue::Float(self.unit_price)),
            "discontinued" => Some(FieldValue::Boolean(self.discontinued)),
            "created_at" => Some(FieldValue::DateTime(self.created_at)),
            "category" => self.category.clone().map(FieldValue::String),
            _ => None,
        }
    }
}

/// Metadata table for `TestProduct`
pub fn test_product_metadata() -> EntityMetadata {
    EntityMetadata::new("test_product", "id")
        .field(FieldSpec::new("id", FieldType::Uuid).sortable())
        .field(FieldSpec::new("name", FieldType::Text).sortable())
        .field(FieldSpec::new("units_in_stock", FieldType::Integer).sortable())
        .field(FieldSpec::new("unit_price", FieldType::Float).sortable())
        .field(FieldSpec::new("discontinued", FieldType::Boolean))
        .field(FieldSpec::new("created_at", FieldType::DateTime).sortable())
        .field(FieldSpec::new("category", FieldType::Text).sortable())
        .include("SupplierInfo", "supplier_info")
        .include("Category", "category")
        .default_includes(["SupplierInfo", "Category"])
}

/// A metadata provider knowing only `TestProduct`
pub fn test_registry() -> Arc<dyn MetadataProvider> {
    let registry = MetadataRegistry::new()
        .with(test_product_metadata())
        .expect("test metadata should be consistent");
    Arc::new(registry)
}

// ---------------------------------------------------------------------------
// Helper functions: TestProduct creation
// ---------------------------------------------------------------------------

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Create a `TestProduct` with a random ID.
pub fn create_test_product(
    name: &str,
    units_in_stock: i64,
    unit_price: f64,
    discontinued: bool,
) -> TestProduct {
    TestProduct {
        id: Uuid::new_v4(),
        name: name.to_string(),
        units_in_stock,
        unit_price,
        discontinued,
        created_at: epoch(),
        category: Some("Beverages".to_string()),
    }
}

/// Generate a batch of `n` products with varied field values.
///
/// Product `i` (0-based) is discontinued when `i % 9 == 0`, so a batch of 45
/// holds exactly 5 discontinued products. Every third product has no category.
pub fn sample_batch(n: usize) -> Vec<TestProduct> {
    let categories = ["Beverages", "Condiments"];
    (0..n)
        .map(|i| TestProduct {
            id: Uuid::new_v4(),
            name: format!("Product {:03}", i),
            units_in_stock: (i as i64 * 7) % 50,
            unit_price: 5.0 + (i % 10) as f64 * 2.5,
            discontinued: i % 9 == 0,
            created_at: epoch() + Duration::days(i as i64),
            category: if i % 3 == 2 {
                None
            } else {
                Some(categories[i % 2].to_string())
            },
        })
        .collect()
}

/// Count products satisfying `pred`, evaluated independently of any spec
pub fn count_where(products: &[TestProduct], pred: impl Fn(&TestProduct) -> bool) -> usize {
    products.iter().filter(|p| pred(p)).count()
}
