//! Papergift Core - Shared types library.
//!
//! This crate provides common types used across all Papergift components:
//! - `storefront` - Public storefront, customer area and admin back office
//! - `cli` - Command-line tools for migrations and backend checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure state - no I/O, no session
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, tokens and statuses
//! - [`guest`] - Cart and wishlist state kept for visitors who are not logged in

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod guest;
pub mod types;

pub use guest::{GuestCart, GuestCartItem, GuestError, GuestProduct, GuestWishlist};
pub use types::*;
