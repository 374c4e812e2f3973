//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                      - Liveness message
//! GET    /health                - Health check (wired in main)
//!
//! # Auth
//! POST   /signup                - Create account
//! POST   /login                 - Issue bearer token
//! DELETE /users/{username}      - Remove account (admin)
//!
//! # Catalog
//! GET    /categories            - List categories
//! POST   /categories            - Create category (admin)
//! PUT    /categories/{id}       - Rename category (admin)
//! DELETE /categories/{id}       - Delete category (admin)
//! GET    /items                 - List items with categories
//! POST   /items                 - Create item (admin)
//! PUT    /items/{id}            - Partially update item (admin)
//! DELETE /items/{id}            - Delete item (admin)
//!
//! # Cart (bearer identity)
//! GET    /cart                  - Current user's cart
//! POST   /cart_item             - Add item to cart
//! PUT    /cart_item/{id}        - Change a line's amount
//! DELETE /cart_item/{id}        - Remove a line
//! DELETE /cart/{id}             - Empty the cart
//!
//! # Orders
//! GET    /orders                - Own orders; admins see all
//! POST   /order/{id}            - Check out the cart with that id
//! PUT    /order/{id}            - Move order to another status (admin)
//!
//! # Util
//! POST   /setup                 - Idempotent bootstrap
//! POST   /search                - Catalog search
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod items;
pub mod orders;
pub mod search;
pub mod setup;

use axum::{
    Router,
    response::Response,
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::response;
use crate::state::AppState;

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(alive))
        // Auth
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/users/{username}", delete(auth::delete_user))
        // Catalog
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::remove),
        )
        .route("/items", get(items::list).post(items::create))
        .route("/items/{id}", put(items::update).delete(items::remove))
        // Cart
        .route("/cart", get(cart::show))
        .route("/cart/{id}", delete(cart::clear))
        .route("/cart_item", post(cart::add_item))
        .route(
            "/cart_item/{id}",
            put(cart::update_item).delete(cart::remove_item),
        )
        // Orders
        .route("/orders", get(orders::list))
        .route("/order/{id}", post(orders::checkout).put(orders::update_status))
        // Util
        .route("/setup", post(setup::run))
        .route("/search", post(search::search))
}

/// Liveness message for the root path.
async fn alive() -> Response {
    response::success(json!({ "message": "I am alive" }))
}

/// Collect `field is required` entries for empty inputs.
///
/// Shared by handlers that validate request bodies field by field; an empty
/// map means the input passed.
pub(crate) fn require_fields(fields: &[(&str, Option<&str>)]) -> serde_json::Map<String, serde_json::Value> {
    let mut report = serde_json::Map::new();
    for (name, value) in fields {
        if value.is_none_or(str::is_empty) {
            report.insert((*name).to_owned(), json!(format!("{name} is required")));
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_fields_reports_missing_and_empty() {
        let report = require_fields(&[
            ("username", Some("ada")),
            ("password", None),
            ("email", Some("")),
        ]);

        assert_eq!(report.len(), 2);
        assert_eq!(report["password"], "password is required");
        assert_eq!(report["email"], "email is required");
    }

    #[test]
    fn test_require_fields_empty_on_valid_input() {
        let report = require_fields(&[("username", Some("ada")), ("password", Some("pw"))]);
        assert!(report.is_empty());
    }
}
