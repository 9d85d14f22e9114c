//! CzarCar Core - Shared types library.
//!
//! This crate provides common types used across the CzarCar components:
//! - `storefront` - Public storefront API server
//! - `integration-tests` - Router-level test suite
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Currency rules, catalog products, the cart container,
//!   order email data, and the email newtype

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
