//! Corner Shop Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! - [`cart`] - The persistent cart store and its storage backends
//! - [`catalog`] - Catalog sources and the category-filtered product query
//! - [`routes`] - JSON HTTP surface over both

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
