//! Cart line items.

use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId, Quantity};

/// One entry in the cart: a product and how many of it.
///
/// Name, image and price are copied from the product when it is added, so the
/// cart renders without the catalog and keeps the price the shopper saw.
/// The serialized shape is the persisted snapshot format:
/// `{"id", "quantity", "name", "image", "price"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub quantity: Quantity,
    pub name: String,
    pub image: String,
    pub price: Price,
}

impl CartLineItem {
    /// Create a line item from its denormalized parts.
    #[must_use]
    pub const fn new(
        id: ProductId,
        quantity: Quantity,
        name: String,
        image: String,
        price: Price,
    ) -> Self {
        Self {
            id,
            quantity,
            name,
            image,
            price,
        }
    }

    /// Create a line item for `quantity` units of `product`.
    #[must_use]
    pub fn from_product(product: &Product, quantity: Quantity) -> Self {
        Self::new(
            product.id,
            quantity,
            product.name.clone(),
            product.image.clone(),
            product.price,
        )
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_shape() {
        let item = CartLineItem::new(
            ProductId::new(1),
            Quantity::new(2).unwrap(),
            "Mug".to_string(),
            "/images/mug.jpg".to_string(),
            Price::from_cents(999),
        );

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1,
                "quantity": 2,
                "name": "Mug",
                "image": "/images/mug.jpg",
                "price": 9.99
            })
        );
    }

    #[test]
    fn test_line_total() {
        let item = CartLineItem::new(
            ProductId::new(1),
            Quantity::new(4).unwrap(),
            "Mug".to_string(),
            String::new(),
            Price::from_cents(250),
        );
        assert_eq!(item.line_total(), Price::from_cents(1000));
    }
}
