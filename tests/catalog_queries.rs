//! Catalog query behavior over the seed catalog.

use std::time::Duration;

use rust_decimal::Decimal;
use storefront::{
    catalog::{Catalog, CatalogError, CatalogSource, InMemoryCatalog},
    fixtures::Fixture,
    products::Product,
    query::{PriceRange, ProductQuery, SortKey, facets::Facets},
};
use testresult::TestResult;

fn seed() -> Result<Catalog, storefront::fixtures::FixtureError> {
    Ok(Fixture::seed()?.catalog())
}

fn ids(products: &[&Product]) -> Vec<String> {
    products.iter().map(|product| product.id.clone()).collect()
}

#[test]
fn search_is_case_insensitive_substring() -> TestResult {
    let catalog = seed()?;

    let lower = catalog.query(&ProductQuery::new().text("jean"));
    let upper = catalog.query(&ProductQuery::new().text("JEAN"));

    assert_eq!(ids(&lower), ["4"]);
    assert_eq!(ids(&upper), ["4"]);

    Ok(())
}

#[test]
fn price_descending_reverses_price_ascending() -> TestResult {
    let catalog = seed()?;

    let ascending = ids(&catalog.query(&ProductQuery::new().sort(SortKey::PriceAsc)));
    let mut descending = ids(&catalog.query(&ProductQuery::new().sort(SortKey::PriceDesc)));

    descending.reverse();

    assert_eq!(ascending, descending);
    assert_eq!(ascending.first().map(String::as_str), Some("1"));
    assert_eq!(ascending.last().map(String::as_str), Some("5"));

    Ok(())
}

#[test]
fn price_range_uses_effective_price_inclusively() -> TestResult {
    let catalog = seed()?;

    let query = ProductQuery::new().price_range(PriceRange::new(
        Decimal::new(50, 0),
        Decimal::new(80, 0),
    ));

    assert_eq!(ids(&catalog.query(&query)), ["2", "4", "8", "10", "11"]);

    // Classic Denim Jacket lists at 89.99 but sells at 76.4915.
    let exact = ProductQuery::new().price_range(PriceRange::new(
        Decimal::new(764_915, 4),
        Decimal::new(764_915, 4),
    ));

    assert_eq!(ids(&catalog.query(&exact)), ["2"]);

    Ok(())
}

#[test]
fn filters_combine_as_conjunction() -> TestResult {
    let catalog = seed()?;

    let query = ProductQuery::new().category("Women").size("M");

    assert_eq!(ids(&catalog.query(&query)), ["3", "7", "10"]);

    let heritage = ProductQuery::new()
        .brand("Heritage Leather")
        .color("tan")
        .sort(SortKey::PriceAsc);

    assert_eq!(ids(&catalog.query(&heritage)), ["9", "5"]);

    Ok(())
}

#[test]
fn popularity_is_stable_for_equal_ratings() -> TestResult {
    let catalog = seed()?;

    let sorted = ids(&catalog.query(&ProductQuery::new().sort(SortKey::Popularity)));

    assert_eq!(sorted.get(..3), Some(["5", "2", "10"].map(String::from).as_slice()));

    Ok(())
}

#[test]
fn results_are_a_subset_satisfying_every_filter() -> TestResult {
    let catalog = seed()?;

    let query = ProductQuery::new()
        .colors(["black", "navy"])
        .price_range(PriceRange::new(Decimal::ZERO, Decimal::new(150, 0)))
        .sort(SortKey::PriceDesc);

    let found = catalog.query(&query);

    assert!(!found.is_empty());
    assert!(found.iter().all(|product| query.matches(product)));
    assert!(found.iter().all(|product| catalog.get(&product.id).is_ok()));

    let rejected = catalog
        .iter()
        .filter(|product| !found.iter().any(|hit| hit.id == product.id))
        .count();

    assert_eq!(rejected + found.len(), catalog.len());

    Ok(())
}

#[test]
fn empty_selections_do_not_constrain() -> TestResult {
    let catalog = seed()?;

    let query = ProductQuery::new().brands(Vec::<String>::new()).sizes(Vec::<&str>::new());

    assert!(!query.has_filters());
    assert_eq!(catalog.query(&query).len(), 12);

    Ok(())
}

#[test]
fn facets_list_options_in_first_seen_order() -> TestResult {
    let catalog = seed()?;

    let facets = Facets::from_products(catalog.iter());

    assert_eq!(facets.brands.first().map(String::as_str), Some("Essentials"));
    assert_eq!(facets.brands.len(), 9);
    assert_eq!(
        facets.sizes.get(..5),
        Some(["XS", "S", "M", "L", "XL"].map(String::from).as_slice())
    );
    assert!(facets.colors.contains(&"forest green".to_string()));

    Ok(())
}

#[tokio::test]
async fn data_source_reports_unknown_ids() -> TestResult {
    let source = InMemoryCatalog::with_latency(seed()?, Duration::ZERO);

    assert_eq!(source.get_by_id("12").await?.name, "Athletic Sneakers");
    assert_eq!(
        source.get_by_id("999").await,
        Err(CatalogError::NotFound("999".to_string()))
    );

    Ok(())
}

#[tokio::test]
async fn fetch_applies_query_to_source_listing() -> TestResult {
    let source = InMemoryCatalog::with_latency(seed()?, Duration::ZERO);

    let accessories = ProductQuery::new()
        .category("accessories")
        .sort(SortKey::PriceAsc)
        .fetch(&source)
        .await;

    let names: Vec<&str> = accessories.iter().map(|product| product.name.as_str()).collect();

    assert_eq!(
        names,
        [
            "Leather Wallet",
            "Canvas Backpack",
            "Minimal Wristwatch",
            "Leather Weekender Bag"
        ]
    );

    Ok(())
}
