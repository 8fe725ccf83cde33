//! Domain models for the storefront session.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
