//! Database row structs and response views.
//!
//! Row structs derive `sqlx::FromRow` and mirror the schema; view structs
//! derive `Serialize` with camelCase field names and define the JSON shapes
//! the API answers with.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use cart::{Cart, CartLine, CartLineDetail, CartView};
pub use catalog::{Category, Item, ItemChanges, ItemView, ItemWithCategory, NewItem};
pub use order::{OrderHead, OrderLineDetail, OrderView};
pub use user::{AuthUser, NewUser};
