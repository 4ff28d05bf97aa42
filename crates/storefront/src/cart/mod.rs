//! The shopping cart.
//!
//! [`CartStore`] is the single authoritative copy of the shopper's cart. It is
//! constructed explicitly from a [`CartStorage`] backend and owned by whoever
//! serves the cart (the HTTP layer keeps it in `AppState`).
//!
//! # Persistence
//!
//! The whole line-item list is written to storage under [`CART_STORAGE_KEY`]
//! as a JSON array on every change, before the mutating call returns. The
//! in-memory cart only changes once that write has succeeded. On
//! construction the snapshot is read back; a missing or unreadable snapshot
//! yields an empty cart.
//!
//! # Notifications
//!
//! Adding, removing and clearing broadcast a [`CartCountChanged`] to every
//! subscriber when the number of line items changes. Quantity updates never
//! do, since the count of distinct items stays the same.

mod storage;

pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

use std::collections::HashSet;
use std::sync::Arc;

use corner_shop_core::{CartLineItem, Price, Product, ProductId, Quantity};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Storage key the cart snapshot lives under.
pub const CART_STORAGE_KEY: &str = "cart";

/// Buffered notifications per subscriber before the oldest are dropped.
const NOTIFICATION_CAPACITY: usize = 16;

/// Broadcast when the number of line items in the cart changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartCountChanged {
    /// Number of distinct line items after the change.
    pub count: usize,
}

/// Errors from cart mutations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cart total exceeds the largest representable amount")]
    TotalOverflow,
}

/// In-memory cart backed by durable storage.
pub struct CartStore {
    items: Vec<CartLineItem>,
    storage: Arc<dyn CartStorage>,
    tx: broadcast::Sender<CartCountChanged>,
}

impl CartStore {
    /// Open the cart persisted in `storage`, or an empty one.
    #[must_use]
    pub fn open(storage: Arc<dyn CartStorage>) -> Self {
        let items = load_snapshot(storage.as_ref());
        let (tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        debug!(count = items.len(), "Cart opened");
        Self { items, storage, tx }
    }

    /// Subscribe to count-changed notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartCountChanged> {
        self.tx.subscribe()
    }

    /// Line items in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line item for `id`, if it is in the cart.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Add a line item unless one for `id` already exists.
    ///
    /// An existing line item is left as is; its quantity is not increased.
    /// Returns whether the item was added.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the snapshot could not be persisted or the
    /// cart total would overflow. The cart is unchanged in that case.
    pub fn add_item(
        &mut self,
        id: ProductId,
        quantity: Quantity,
        name: String,
        image: String,
        price: Price,
    ) -> Result<bool, CartError> {
        self.insert(CartLineItem::new(id, quantity, name, image, price))
    }

    /// Add `quantity` units of `product`, copying its display fields.
    ///
    /// # Errors
    ///
    /// See [`add_item`](Self::add_item).
    pub fn add_product(&mut self, product: &Product, quantity: Quantity) -> Result<bool, CartError> {
        self.insert(CartLineItem::from_product(product, quantity))
    }

    /// Set the quantity of the line item for `id`. No-op if it is not in the
    /// cart. Returns whether an item was changed.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the snapshot could not be persisted or the
    /// cart total would overflow.
    pub fn update_quantity(&mut self, id: ProductId, quantity: Quantity) -> Result<bool, CartError> {
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            return Ok(false);
        };
        if self.items.get(position).map(|item| item.quantity) == Some(quantity) {
            return Ok(false);
        }

        let mut items = self.items.clone();
        if let Some(item) = items.get_mut(position) {
            item.quantity = quantity;
        }
        self.commit(items)?;
        Ok(true)
    }

    /// Remove the line item for `id`. No-op if it is not in the cart.
    /// Returns whether an item was removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the snapshot could not be persisted.
    pub fn remove_item(&mut self, id: ProductId) -> Result<bool, CartError> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let items = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        self.commit(items)?;
        self.notify();
        Ok(true)
    }

    /// Remove every line item. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the snapshot could not be persisted.
    pub fn clear(&mut self) -> Result<bool, CartError> {
        if self.items.is_empty() {
            return Ok(false);
        }

        self.commit(Vec::new())?;
        self.notify();
        Ok(true)
    }

    /// Sum of unit price times quantity over all line items.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    fn insert(&mut self, item: CartLineItem) -> Result<bool, CartError> {
        if self.get(item.id).is_some() {
            debug!(product_id = %item.id, "Product already in cart");
            return Ok(false);
        }

        let mut items = self.items.clone();
        items.push(item);
        self.commit(items)?;
        self.notify();
        Ok(true)
    }

    fn commit(&mut self, items: Vec<CartLineItem>) -> Result<(), CartError> {
        if checked_total(&items).is_none() {
            return Err(CartError::TotalOverflow);
        }
        let snapshot = serde_json::to_string(&items)?;
        self.storage.save(CART_STORAGE_KEY, &snapshot)?;
        self.items = items;
        Ok(())
    }

    fn notify(&self) {
        let event = CartCountChanged {
            count: self.items.len(),
        };
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}

/// Exact cart total, or `None` if it is not representable.
fn checked_total(items: &[CartLineItem]) -> Option<Price> {
    items.iter().try_fold(Price::ZERO, |total, item| {
        total.checked_add(item.price.checked_times(item.quantity)?)
    })
}

/// Read the persisted snapshot, falling back to an empty cart.
fn load_snapshot(storage: &dyn CartStorage) -> Vec<CartLineItem> {
    let raw = match storage.load(CART_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read cart snapshot, starting empty");
            return Vec::new();
        }
    };

    let items: Vec<CartLineItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Discarding unparsable cart snapshot");
            return Vec::new();
        }
    };

    // First occurrence wins if a snapshot carries duplicate IDs.
    let mut seen = HashSet::new();
    let items: Vec<CartLineItem> = items
        .into_iter()
        .filter(|item| seen.insert(item.id))
        .collect();

    if checked_total(&items).is_none() {
        warn!("Discarding cart snapshot whose total overflows");
        return Vec::new();
    }
    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn add(cart: &mut CartStore, id: i32, quantity: u32, cents: u32) -> bool {
        cart.add_item(
            ProductId::new(id),
            qty(quantity),
            format!("Product {id}"),
            format!("/images/{id}.jpg"),
            Price::from_cents(cents),
        )
        .unwrap()
    }

    fn memory_cart() -> (CartStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (CartStore::open(storage.clone()), storage)
    }

    fn drain(rx: &mut broadcast::Receiver<CartCountChanged>) -> Vec<usize> {
        let mut counts = Vec::new();
        while let Ok(event) = rx.try_recv() {
            counts.push(event.count);
        }
        counts
    }

    /// Storage whose writes always fail.
    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: "cart.json".into(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let (mut cart, _) = memory_cart();
        assert!(add(&mut cart, 1, 1, 999));
        assert!(!add(&mut cart, 1, 5, 999));

        assert_eq!(cart.count(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, qty(1));
    }

    #[test]
    fn test_distinct_adds_keep_order() {
        let (mut cart, _) = memory_cart();
        add(&mut cart, 3, 1, 100);
        add(&mut cart, 1, 1, 100);
        add(&mut cart, 2, 1, 100);

        let ids: Vec<i32> = cart.items().iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_total() {
        let (mut cart, _) = memory_cart();
        assert_eq!(cart.total(), Price::ZERO);

        add(&mut cart, 1, 2, 999);
        add(&mut cart, 2, 1, 450);
        assert_eq!(cart.total(), Price::from_cents(2448));
    }

    #[test]
    fn test_add_then_remove_restores_total() {
        let (mut cart, _) = memory_cart();
        add(&mut cart, 1, 2, 999);
        let before = cart.total();

        add(&mut cart, 2, 3, 1250);
        assert!(cart.remove_item(ProductId::new(2)).unwrap());
        assert_eq!(cart.total(), before);
    }

    #[test]
    fn test_clear() {
        let (mut cart, storage) = memory_cart();
        add(&mut cart, 1, 2, 999);
        add(&mut cart, 2, 1, 100);

        assert!(cart.clear().unwrap());
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(storage.load(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_update_quantity() {
        let (mut cart, _) = memory_cart();
        add(&mut cart, 1, 1, 500);

        assert!(cart.update_quantity(ProductId::new(1), qty(4)).unwrap());
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, qty(4));
        assert_eq!(cart.total(), Price::from_cents(2000));
    }

    #[test]
    fn test_update_missing_item_leaves_cart_unchanged() {
        let (mut cart, storage) = memory_cart();
        add(&mut cart, 1, 2, 500);
        let before = cart.items().to_vec();
        let snapshot = storage.load(CART_STORAGE_KEY).unwrap();

        assert!(!cart.update_quantity(ProductId::new(9), qty(3)).unwrap());
        assert_eq!(cart.items(), before.as_slice());
        assert_eq!(storage.load(CART_STORAGE_KEY).unwrap(), snapshot);
    }

    #[test]
    fn test_remove_missing_item_is_noop() {
        let (mut cart, _) = memory_cart();
        add(&mut cart, 1, 1, 500);
        assert!(!cart.remove_item(ProductId::new(2)).unwrap());
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_reload_restores_cart() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = CartStore::open(storage.clone());
        add(&mut cart, 1, 2, 999);
        let items = cart.items().to_vec();
        drop(cart);

        let reopened = CartStore::open(storage);
        assert_eq!(reopened.items(), items.as_slice());
        assert_eq!(reopened.total(), Price::from_cents(1998));
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = CartStore::open(storage.clone());
        add(&mut cart, 1, 1, 100);
        add(&mut cart, 2, 1, 100);
        cart.update_quantity(ProductId::new(2), qty(7)).unwrap();
        cart.remove_item(ProductId::new(1)).unwrap();

        let reopened = CartStore::open(storage);
        assert_eq!(reopened.items(), cart.items());
    }

    #[test]
    fn test_unparsable_snapshot_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save(CART_STORAGE_KEY, "{not json").unwrap();
        assert!(CartStore::open(storage).is_empty());
    }

    #[test]
    fn test_zero_quantity_snapshot_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .save(
                CART_STORAGE_KEY,
                r#"[{"id":1,"quantity":0,"name":"Mug","image":"","price":1.0}]"#,
            )
            .unwrap();
        assert!(CartStore::open(storage).is_empty());
    }

    #[test]
    fn test_duplicate_ids_in_snapshot_keep_first() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .save(
                CART_STORAGE_KEY,
                r#"[
                    {"id":1,"quantity":2,"name":"Mug","image":"","price":1.0},
                    {"id":1,"quantity":5,"name":"Mug","image":"","price":1.0}
                ]"#,
            )
            .unwrap();

        let cart = CartStore::open(storage);
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, qty(2));
    }

    #[test]
    fn test_failed_write_leaves_cart_unchanged() {
        let mut cart = CartStore::open(Arc::new(BrokenStorage));
        let mut rx = cart.subscribe();

        let result = cart.add_item(
            ProductId::new(1),
            qty(1),
            "Mug".to_string(),
            String::new(),
            Price::from_cents(100),
        );
        assert!(matches!(result, Err(CartError::Storage(_))));
        assert!(cart.is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    fn huge_price() -> Price {
        serde_json::from_str("20000000000000000000").unwrap()
    }

    #[test]
    fn test_overflowing_quantity_is_rejected() {
        let (mut cart, storage) = memory_cart();
        let mut rx = cart.subscribe();
        cart.add_item(
            ProductId::new(1),
            qty(1),
            "Yacht".to_string(),
            String::new(),
            huge_price(),
        )
        .unwrap();
        let snapshot = storage.load(CART_STORAGE_KEY).unwrap();

        let result = cart.update_quantity(ProductId::new(1), qty(u32::MAX));
        assert!(matches!(result, Err(CartError::TotalOverflow)));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, qty(1));
        assert_eq!(cart.total(), huge_price());
        assert_eq!(storage.load(CART_STORAGE_KEY).unwrap(), snapshot);
        assert_eq!(drain(&mut rx), vec![1]);
    }

    #[test]
    fn test_overflowing_add_is_rejected() {
        let (mut cart, _) = memory_cart();
        let result = cart.add_item(
            ProductId::new(1),
            qty(u32::MAX),
            "Yacht".to_string(),
            String::new(),
            huge_price(),
        );
        assert!(matches!(result, Err(CartError::TotalOverflow)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_overflowing_snapshot_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .save(
                CART_STORAGE_KEY,
                r#"[{"id":1,"quantity":4294967295,"name":"Yacht","image":"","price":20000000000000000000}]"#,
            )
            .unwrap();
        assert!(CartStore::open(storage).is_empty());
    }

    #[test]
    fn test_add_product_copies_display_fields() {
        let (mut cart, _) = memory_cart();
        let product = Product {
            id: ProductId::new(7),
            name: "Kettle".to_string(),
            price: Price::from_cents(3999),
            image: "/images/kettle.jpg".to_string(),
            description: "Boils water".to_string(),
            category: "kitchen".to_string(),
        };

        assert!(cart.add_product(&product, qty(2)).unwrap());
        assert_eq!(
            cart.get(ProductId::new(7)).unwrap(),
            &CartLineItem::from_product(&product, qty(2))
        );
        assert_eq!(cart.total(), Price::from_cents(7998));
    }

    #[test]
    fn test_notifications() {
        let (mut cart, _) = memory_cart();
        let mut rx = cart.subscribe();

        add(&mut cart, 1, 1, 100);
        add(&mut cart, 1, 1, 100);
        add(&mut cart, 2, 1, 100);
        cart.update_quantity(ProductId::new(1), qty(3)).unwrap();
        cart.remove_item(ProductId::new(1)).unwrap();
        cart.remove_item(ProductId::new(1)).unwrap();
        cart.clear().unwrap();
        cart.clear().unwrap();

        assert_eq!(drain(&mut rx), vec![1, 2, 1, 0]);
    }

    #[test]
    fn test_every_subscriber_is_notified() {
        let (mut cart, _) = memory_cart();
        let mut badge = cart.subscribe();
        let mut header = cart.subscribe();

        add(&mut cart, 1, 1, 100);

        assert_eq!(drain(&mut badge), vec![1]);
        assert_eq!(drain(&mut header), vec![1]);
    }
}
