//! Catalog product records.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as published in the catalog document.
///
/// Products are immutable once loaded; the catalog source owns them and the
/// rest of the system only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Image URL or path, as served by the host.
    pub image: String,
    pub description: String,
    /// Category slug, matched exactly (case-sensitive) when filtering.
    pub category: String,
}

impl Product {
    /// Whether this product belongs to `category`.
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category == category
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_catalog_json() {
        let json = r#"{
            "id": 3,
            "name": "Desk Lamp",
            "price": 24.5,
            "image": "/images/lamp.jpg",
            "description": "A lamp for your desk.",
            "category": "lighting"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price, Price::from_cents(2450));
        assert!(product.in_category("lighting"));
        assert!(!product.in_category("Lighting"));
    }
}
