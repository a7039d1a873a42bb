//! Candidate acceptance: stock, price ceiling, required tags, brand preference.

use crate::graph::Graph;
use crate::ingest::ProductRecord;

/// Whether the product identified by `product_id` passes every constraint.
///
/// Unknown ids never pass.
pub fn satisfies(
    graph: &Graph,
    product_id: &str,
    max_price: f64,
    required_tags: &[String],
    preferred_brand: Option<&str>,
) -> bool {
    graph
        .product(product_id)
        .map(|p| satisfies_product(p, max_price, required_tags, preferred_brand))
        .unwrap_or(false)
}

pub(crate) fn satisfies_product(
    product: &ProductRecord,
    max_price: f64,
    required_tags: &[String],
    preferred_brand: Option<&str>,
) -> bool {
    if !product.in_stock {
        return false;
    }
    if product.price > max_price {
        return false;
    }
    if !has_all_tags(product, required_tags) {
        return false;
    }
    match preferred_brand {
        Some(brand) if !brand.is_empty() => product.brand == brand,
        _ => true,
    }
}

/// True when every required tag is on the product (vacuously true for none).
pub(crate) fn has_all_tags(product: &ProductRecord, required_tags: &[String]) -> bool {
    required_tags.iter().all(|tag| product.tags.contains(tag))
}
