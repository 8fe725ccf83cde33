//! Business logic that sits between the routes and the backend API.
//!
//! # Services
//!
//! - `toast` - Flash messages and `HX-Trigger` toasts
//! - `guest_store` - Session-held cart and wishlist for anonymous visitors
//! - `reconcile` - Merge guest state into the account after login
//! - `counters` - Header badge counts
//! - `payment` - Payment processing with simulated gateway latency
//! - `notifications` - Notification link mapping
//! - `admin_reviews` - Review moderation list state

pub mod admin_reviews;
pub mod counters;
pub mod guest_store;
pub mod notifications;
pub mod payment;
pub mod reconcile;
pub mod toast;

pub use admin_reviews::ReviewModeration;
pub use guest_store::{GuestStore, GuestStoreError};
pub use notifications::notification_link;
pub use payment::{PaymentOutcome, PaymentProcessor};
pub use reconcile::{MergeStatus, ReconcileReport, reconcile_guest_state};
pub use toast::{Toast, ToastLevel, flash, hx_trigger, take_flashed};
