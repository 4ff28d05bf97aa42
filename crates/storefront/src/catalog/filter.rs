//! Pure helpers over a loaded product list.

use std::collections::HashSet;

use corner_shop_core::{Product, ProductId};

/// Keep the products in `category`, or all of them when no category is given.
///
/// An empty category string counts as no category.
#[must_use]
pub fn filter_by_category(products: Vec<Product>, category: Option<&str>) -> Vec<Product> {
    match category.filter(|c| !c.is_empty()) {
        Some(category) => products
            .into_iter()
            .filter(|product| product.in_category(category))
            .collect(),
        None => products,
    }
}

/// Distinct categories in the order they first appear in the catalog.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen = HashSet::new();
    products
        .iter()
        .filter(|product| seen.insert(product.category.as_str()))
        .map(|product| product.category.clone())
        .collect()
}

/// Look up a product by ID.
#[must_use]
pub fn find_product(products: &[Product], id: ProductId) -> Option<&Product> {
    products.iter().find(|product| product.id == id)
}

#[cfg(test)]
mod tests {
    use corner_shop_core::Price;

    use super::*;

    fn product(id: i32, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_cents(100),
            image: String::new(),
            description: String::new(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_filter_exact_category() {
        let catalog = vec![product(1, "A"), product(2, "B")];
        let filtered = filter_by_category(catalog, Some("A"));
        assert_eq!(filtered, vec![product(1, "A")]);
    }

    #[test]
    fn test_filter_without_category_keeps_all() {
        let catalog = vec![product(1, "A"), product(2, "B")];
        assert_eq!(filter_by_category(catalog.clone(), None), catalog);
        assert_eq!(filter_by_category(catalog.clone(), Some("")), catalog);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let catalog = vec![product(1, "A")];
        assert!(filter_by_category(catalog, Some("a")).is_empty());
    }

    #[test]
    fn test_categories_first_seen_order() {
        let catalog = vec![product(1, "B"), product(2, "A"), product(3, "B")];
        assert_eq!(categories(&catalog), vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_find_product() {
        let catalog = vec![product(1, "A"), product(2, "B")];
        assert_eq!(
            find_product(&catalog, ProductId::new(2)).map(|p| p.id),
            Some(ProductId::new(2))
        );
        assert!(find_product(&catalog, ProductId::new(9)).is_none());
    }
}
