//! Routes of the `/items` API shared by the server router and the HTTP client.

pub const ITEMS_ROUTE: &str = "/items";
pub const ITEM_ROUTE: &str = "/items/:main_id";
pub const HEALTH_ROUTE: &str = "/healthz";

/// Path segment under which a single control is addressed.
pub const ITEMS_SEGMENT: &str = "items";

pub fn put_item_message(main_id: &str) -> String {
    format!("Put item {main_id}")
}

pub fn updated_item_message(main_id: &str) -> String {
    format!("Updated item {main_id}")
}

pub fn no_updates_message(main_id: &str) -> String {
    format!("No updates for item {main_id}")
}

pub fn deleted_item_message(main_id: &str) -> String {
    format!("Deleted item {main_id}")
}
