//! Core types for Corner Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod quantity;

pub use cart::CartLineItem;
pub use id::*;
pub use price::{Price, PriceError};
pub use product::Product;
pub use quantity::{Quantity, QuantityError};
