//! Notification link mapping.
//!
//! The backend links order notifications to REST-style detail paths. The
//! front end shows orders in a list with the target highlighted, so those
//! paths are rewritten to the list with an `orderId` query parameter.

use std::sync::LazyLock;

use regex::Regex;

static ORDER_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(admin/)?orders/(\d+)/?$").expect("Invalid regex"));

/// Map a notification's backend link to a front-end URL.
///
/// - `/orders/{id}` → `/orders?orderId={id}`
/// - `/admin/orders/{id}` → `/admin/orders?orderId={id}`
/// - anything else is returned unchanged
#[must_use]
pub fn notification_link(link: &str) -> String {
    let Some(captures) = ORDER_LINK_RE.captures(link) else {
        return link.to_string();
    };

    let prefix = if captures.get(1).is_some() { "/admin" } else { "" };
    let id = captures.get(2).map_or("", |m| m.as_str());
    format!("{prefix}/orders?orderId={id}")
}
