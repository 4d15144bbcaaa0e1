//! Product catalog served through a generic list query endpoint
//!
//! This example demonstrates:
//! - Loading entity metadata from YAML
//! - Running list queries in process (filters, sorts, paging)
//! - Exposing the same handler as an Axum endpoint

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use this_list::prelude::*;

#[derive(Debug, Clone)]
struct SupplierInfo {
    company: String,
    country: String,
}

#[derive(Debug, Clone)]
struct Category {
    name: String,
}

#[derive(Debug, Clone)]
struct Product {
    id: Uuid,
    name: String,
    unit_price: f64,
    units_in_stock: i64,
    discontinued: bool,
    category: Category,
    supplier_info: Option<SupplierInfo>,
}

impl Listable for Product {
    fn entity_type() -> &'static str {
        "product"
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "name" => Some(FieldValue::String(self.name.clone())),
            "unit_price" => Some(FieldValue::Float(self.unit_price)),
            "units_in_stock" => Some(FieldValue::Integer(self.units_in_stock)),
            "discontinued" => Some(FieldValue::Boolean(self.discontinued)),
            "category.name" => Some(FieldValue::String(self.category.name.clone())),
            "supplier.country" => self
                .supplier_info
                .as_ref()
                .map(|s| FieldValue::String(s.country.clone())),
            _ => None,
        }
    }
}

/// What clients see of a product
#[derive(Debug, Serialize)]
struct ProductDto {
    id: Uuid,
    name: String,
    discontinued: bool,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            discontinued: product.discontinued,
        }
    }
}

type ProductHandler = ListQueryHandler<Product, InMemoryRepository<Product>>;

async fn list_products(
    State(handler): State<ProductHandler>,
    Json(params): Json<ListQueryParams>,
) -> Result<Json<PagedResult<ProductDto>>, ListQueryError> {
    let page = handler.execute_params(params, ProductDto::from).await?;
    Ok(Json(page))
}

fn seed() -> Vec<Product> {
    let categories = ["Beverages", "Condiments", "Confections", "Seafood"];
    let suppliers = [
        ("Exotic Liquids", "UK"),
        ("Tokyo Traders", "Japan"),
        ("Pavlova, Ltd.", "Australia"),
    ];

    (0..45)
        .map(|i| Product {
            id: Uuid::new_v4(),
            name: format!("Product {:02}", i),
            unit_price: 4.5 + (i % 12) as f64 * 3.25,
            units_in_stock: (i * 13) % 120,
            discontinued: i % 9 == 0,
            category: Category {
                name: categories[i as usize % categories.len()].to_string(),
            },
            supplier_info: (i % 5 != 4).then(|| {
                let (company, country) = suppliers[i as usize % suppliers.len()];
                SupplierInfo {
                    company: company.to_string(),
                    country: country.to_string(),
                }
            }),
        })
        .collect()
}

fn print_page(title: &str, page: &PagedResult<ProductDto>) {
    println!("📄 {}", title);
    println!(
        "   page {}/{} · {} of {} products",
        page.page,
        page.page_count,
        page.items.len(),
        page.total_count
    );
    for item in page.items.iter().take(5) {
        let flag = if item.discontinued { " (discontinued)" } else { "" };
        println!("   - {}{}", item.name, flag);
    }
    if page.items.len() > 5 {
        println!("   ...");
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("🚀 This-List Product Catalog Example\n");

    // Load metadata
    let registry = MetadataConfig::from_yaml_str(include_str!("metadata.yaml"))?.into_registry()?;
    println!("📋 Registered entity types: {:?}\n", registry.entity_types());

    let products = seed();
    let suppliers = products
        .iter()
        .filter_map(|p| p.supplier_info.as_ref())
        .map(|s| s.company.as_str())
        .collect::<std::collections::BTreeSet<_>>();
    println!("📦 Seeded {} products from {} suppliers\n", products.len(), suppliers.len());

    let handler: ProductHandler = ListQueryHandler::new(
        Arc::new(InMemoryRepository::with_entities(products)),
        Arc::new(registry),
    );

    // Default page
    let first = handler
        .execute(&ListQuery::default(), ProductDto::from)
        .await?;
    print_page("Default query", &first);

    // Discontinued products, page past the end
    let discontinued: ListQueryParams = serde_json::from_value(json!({
        "filters": [{"field": "Discontinued", "operator": "Eq", "value": true}],
        "page": 3,
        "pageSize": 20
    }))?;
    let page = handler.execute_params(discontinued, ProductDto::from).await?;
    print_page("Discontinued, page 3", &page);

    // Cheap beverages and condiments, most expensive first
    let query = ListQuery::default()
        .with_filter(FilterClause::new(
            "category.name",
            FilterOperator::In,
            json!(["Beverages", "Condiments"]),
        )?)
        .with_filter(FilterClause::new("unit_price", FilterOperator::Lt, json!(20))?)
        .with_sort(SortClause::parse("-unit_price")?)
        .with_page_size(10);
    let page = handler.execute(&query, ProductDto::from).await?;
    print_page("Beverages and condiments under 20, by price desc", &page);

    // Rejected query: every problem is reported
    let bad = ListQuery::default()
        .with_page(0)
        .with_sort(SortClause::asc("discontinued"));
    if let Err(err) = handler.execute(&bad, ProductDto::from).await {
        println!("❌ Rejected query ({}):", err.error_code());
        for problem in err.validation_errors() {
            println!("   - [{}] {}", problem.error_code(), problem);
        }
        println!();
    }

    // Build the router
    let app = Router::new()
        .route("/products/query", post(list_products))
        .with_state(handler);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("🌐 Server starting on http://{}\n", addr);

    println!("💡 Example request:");
    println!(
        "   curl -X POST http://localhost:3000/products/query -H 'content-type: application/json' \\"
    );
    println!(
        "        -d '{{\"filters\":[{{\"field\":\"name\",\"operator\":\"Contains\",\"value\":\"1\"}}],\"sorts\":[\"name:desc\"]}}'"
    );
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("✅ Server is ready! Press Ctrl+C to stop.\n");

    axum::serve(listener, app).await?;

    Ok(())
}
