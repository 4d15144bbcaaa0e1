//! Macro-generated test suite for `Repository<TestProduct>` contract validation.
//!
//! The `repository_contract_tests!` macro generates a test module that runs
//! list queries through `ListQueryHandler` against any `Repository<TestProduct>`
//! implementation and checks the results against an independent evaluation of
//! the same predicates over the seeded data.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use this_list::storage::InMemoryRepository;
//!
//! repository_contract_tests!(|products: Vec<TestProduct>| InMemoryRepository::with_entities(products));
//! ```
//!
//! # Generated Tests
//!
//! ## Paging
//! - `test_default_page_of_45`: page 1 of 45 holds 20 items, 3 pages in total
//! - `test_last_page_is_partial`: page 3 of 45 holds the remaining 5
//! - `test_page_past_the_end_keeps_total`: filtered total survives an empty page
//! - `test_fetch_length_is_bounded`: every page holds `min(pageSize, total - skip)`
//! - `test_pages_partition_the_result`: walking every page yields each match once
//! - `test_empty_repository`: zero total, zero pages
//!
//! ## Filtering
//! - `test_count_matches_independent_evaluation`: Gte on a Float field
//! - `test_and_composition_narrows`: adding a clause never grows the total
//! - `test_contains_ignores_case`: Contains on a Text field
//! - `test_in_membership`: In on an Integer field
//! - `test_datetime_filter`: Gte on a DateTime field, RFC 3339 input
//! - `test_missing_values_never_match`: Ne on an optional field
//!
//! ## Sorting
//! - `test_descending_sort`: newest first by DateTime
//! - `test_unsorted_order_is_repeatable`: primary key order when no sort is given
//! - `test_missing_values_sort_first`: absent values lead ascending order
//!
//! ## Concurrency
//! - `test_concurrent_queries`: parallel executions through cloned handlers

/// Generate a `Repository<TestProduct>` conformance test suite.
///
/// `$factory` must be a callable taking `Vec<TestProduct>` and returning a
/// repository seeded with exactly those products. It is re-invoked for each
/// test to ensure isolation.
#[macro_export]
macro_rules! repository_contract_tests {
    ($factory:expr) => {
        mod repository_contract_tests {
            use super::*;
            use serde_json::json;
            use std::collections::HashSet;
            use std::sync::Arc;
            use this_list::core::filter::{FilterClause, FilterOperator};
            use this_list::core::handler::ListQueryHandler;
            use this_list::core::query::ListQuery;
            use this_list::core::repository::Repository;
            use this_list::core::sort::SortClause;
            use uuid::Uuid;

            fn handler_for<R: Repository<TestProduct>>(
                repository: R,
            ) -> ListQueryHandler<TestProduct, R> {
                ListQueryHandler::new(Arc::new(repository), test_registry())
            }

            fn seeded(products: Vec<TestProduct>) -> ListQueryHandler<TestProduct, impl Repository<TestProduct>> {
                handler_for(($factory)(products))
            }

            fn filter(field: &str, op: FilterOperator, value: serde_json::Value) -> FilterClause {
                FilterClause::new(field, op, value).unwrap()
            }

            // ==================================================================
            // Paging
            // ==================================================================

            #[tokio::test]
            async fn test_default_page_of_45() {
                let handler = seeded(sample_batch(45));

                let page = handler.execute(&ListQuery::default(), |p| p.id).await.unwrap();
                assert_eq!(page.items.len(), 20);
                assert_eq!(page.total_count, 45);
                assert_eq!(page.page, 1);
                assert_eq!(page.page_size, 20);
                assert_eq!(page.page_count, 3);
                assert!(page.has_next());
            }

            #[tokio::test]
            async fn test_last_page_is_partial() {
                let handler = seeded(sample_batch(45));

                let page = handler
                    .execute(&ListQuery::default().with_page(3), |p| p.id)
                    .await
                    .unwrap();
                assert_eq!(page.items.len(), 5);
                assert_eq!(page.total_count, 45);
                assert!(!page.has_next());
            }

            #[tokio::test]
            async fn test_page_past_the_end_keeps_total() {
                let products = sample_batch(45);
                assert_eq!(count_where(&products, |p| p.discontinued), 5);
                let handler = seeded(products);

                let query = ListQuery::default()
                    .with_filter(filter("discontinued", FilterOperator::Eq, json!(true)))
                    .with_page(3);
                let page = handler.execute(&query, |p| p.id).await.unwrap();
                assert!(page.items.is_empty());
                assert_eq!(page.total_count, 5);
                assert_eq!(page.page_count, 1);
            }

            #[tokio::test]
            async fn test_fetch_length_is_bounded() {
                let handler = seeded(sample_batch(30));
                let page_size = 7usize;

                for page_no in 1..=6usize {
                    let query = ListQuery::default()
                        .with_page(page_no as i64)
                        .with_page_size(page_size as i64);
                    let page = handler.execute(&query, |p| p.id).await.unwrap();
                    let skip = (page_no - 1) * page_size;
                    let expected = page_size.min(page.total_count.saturating_sub(skip));
                    assert_eq!(page.items.len(), expected, "page {}", page_no);
                }
            }

            #[tokio::test]
            async fn test_pages_partition_the_result() {
                let products = sample_batch(45);
                let expected = count_where(&products, |p| p.unit_price >= 10.0);
                let handler = seeded(products);

                let base = ListQuery::default()
                    .with_filter(filter("unit_price", FilterOperator::Gte, json!(10.0)))
                    .with_sort(SortClause::asc("unit_price"))
                    .with_page_size(7);

                let first = handler.execute(&base, |p| p).await.unwrap();
                let mut seen: HashSet<Uuid> = HashSet::new();
                let mut prices = Vec::new();
                for page_no in 1..=first.page_count {
                    let page = handler
                        .execute(&base.clone().with_page(page_no as i64), |p| p)
                        .await
                        .unwrap();
                    assert_eq!(page.total_count, expected);
                    for product in page.items {
                        assert!(seen.insert(product.id), "duplicate across pages");
                        prices.push(product.unit_price);
                    }
                }

                assert_eq!(seen.len(), expected);
                assert!(prices.windows(2).all(|w| w[0] <= w[1]));
            }

            #[tokio::test]
            async fn test_empty_repository() {
                let handler = seeded(Vec::new());

                let page = handler.execute(&ListQuery::default(), |p| p.id).await.unwrap();
                assert!(page.items.is_empty());
                assert_eq!(page.total_count, 0);
                assert_eq!(page.page_count, 0);
                assert!(!page.has_prev());
            }

            // ==================================================================
            // Filtering
            // ==================================================================

            #[tokio::test]
            async fn test_count_matches_independent_evaluation() {
                let products = sample_batch(45);
                let expected = count_where(&products, |p| p.unit_price >= 15.0);
                let handler = seeded(products);

                let query = ListQuery::default()
                    .with_filter(filter("unit_price", FilterOperator::Gte, json!(15)))
                    .with_page_size(100);
                let page = handler.execute(&query, |p| p).await.unwrap();
                assert_eq!(page.total_count, expected);
                assert_eq!(page.items.len(), expected);
                assert!(page.items.iter().all(|p| p.unit_price >= 15.0));
            }

            #[tokio::test]
            async fn test_and_composition_narrows() {
                let handler = seeded(sample_batch(45));

                let broad = ListQuery::default()
                    .with_filter(filter("units_in_stock", FilterOperator::Lt, json!(30)));
                let narrow = broad
                    .clone()
                    .with_filter(filter("discontinued", FilterOperator::Eq, json!(false)));

                let broad_total = handler.execute(&broad, |p| p.id).await.unwrap().total_count;
                let narrow_page = handler.execute(&narrow, |p| p).await.unwrap();
                assert!(narrow_page.total_count <= broad_total);
                assert!(narrow_page
                    .items
                    .iter()
                    .all(|p| p.units_in_stock < 30 && !p.discontinued));
            }

            #[tokio::test]
            async fn test_contains_ignores_case() {
                let handler = seeded(sample_batch(45));

                let query = ListQuery::default()
                    .with_filter(filter("name", FilterOperator::Contains, json!("product 00")));
                let page = handler.execute(&query, |p| p.name).await.unwrap();
                assert_eq!(page.total_count, 10);
                assert!(page.items.iter().all(|n| n.starts_with("Product 00")));
            }

            #[tokio::test]
            async fn test_in_membership() {
                let products = sample_batch(45);
                let expected = count_where(&products, |p| [0, 7, 14].contains(&p.units_in_stock));
                let handler = seeded(products);

                let query = ListQuery::default()
                    .with_filter(filter("units_in_stock", FilterOperator::In, json!([0, 7, "14"])));
                let page = handler.execute(&query, |p| p).await.unwrap();
                assert_eq!(page.total_count, expected);
                assert!(expected > 0);
            }

            #[tokio::test]
            async fn test_datetime_filter() {
                let handler = seeded(sample_batch(45));

                let query = ListQuery::default().with_filter(filter(
                    "created_at",
                    FilterOperator::Gte,
                    json!("2024-01-31T00:00:00Z"),
                ));
                let page = handler.execute(&query, |p| p.id).await.unwrap();
                // day offsets 30..=44
                assert_eq!(page.total_count, 15);
            }

            #[tokio::test]
            async fn test_missing_values_never_match() {
                let products = sample_batch(45);
                let expected = count_where(&products, |p| p.category.as_deref() == Some("Condiments"));
                assert!(count_where(&products, |p| p.category.is_none()) > 0);
                let handler = seeded(products);

                // Ne must not admit products without a category
                let query = ListQuery::default()
                    .with_filter(filter("category", FilterOperator::Ne, json!("Beverages")))
                    .with_page_size(100);
                let page = handler.execute(&query, |p| p).await.unwrap();
                assert_eq!(page.total_count, expected);
                assert!(page.items.iter().all(|p| p.category.is_some()));
            }

            // ==================================================================
            // Sorting
            // ==================================================================

            #[tokio::test]
            async fn test_descending_sort() {
                let products = sample_batch(45);
                let newest = products.iter().max_by_key(|p| p.created_at).unwrap().id;
                let handler = seeded(products);

                let query = ListQuery::default().with_sort(SortClause::desc("created_at"));
                let page = handler.execute(&query, |p| p).await.unwrap();
                assert_eq!(page.items[0].id, newest);
                assert!(page.items.windows(2).all(|w| w[0].created_at >= w[1].created_at));
            }

            #[tokio::test]
            async fn test_unsorted_order_is_repeatable() {
                let handler = seeded(sample_batch(30));
                let query = ListQuery::default().with_page(2).with_page_size(8);

                let first = handler.execute(&query, |p| p.id).await.unwrap();
                let second = handler.execute(&query, |p| p.id).await.unwrap();
                assert_eq!(first.items, second.items);
                assert!(first.items.windows(2).all(|w| w[0] < w[1]));
            }

            #[tokio::test]
            async fn test_missing_values_sort_first() {
                let products = sample_batch(45);
                let missing = count_where(&products, |p| p.category.is_none());
                let handler = seeded(products);

                let query = ListQuery::default()
                    .with_sort(SortClause::asc("category"))
                    .with_page_size(45);
                let page = handler.execute(&query, |p| p.category).await.unwrap();
                assert!(page.items[..missing].iter().all(Option::is_none));
                assert!(page.items[missing..].iter().all(Option::is_some));
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_queries() {
                let handler = seeded(sample_batch(45));

                let runs = (1..=3i64).map(|page_no| {
                    let handler = handler.clone();
                    async move {
                        handler
                            .execute(&ListQuery::default().with_page(page_no), |p| p.id)
                            .await
                    }
                });
                let pages = futures::future::join_all(runs).await;

                let mut seen = HashSet::new();
                for page in pages {
                    let page = page.unwrap();
                    assert_eq!(page.total_count, 45);
                    seen.extend(page.items);
                }
                assert_eq!(seen.len(), 45);
            }
        }
    };
}
