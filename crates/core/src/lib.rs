//! Corner Shop Core - Shared types library.
//!
//! This crate provides the domain types used by the Corner Shop storefront:
//! products as loaded from the catalog, and the line items held in a cart.
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and quantities, plus the
//!   `Product` and `CartLineItem` records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
