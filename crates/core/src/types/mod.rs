//! Core types for Pomelo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod discount;
pub mod email;
pub mod id;
pub mod order_status;
pub mod role;

pub use discount::loyalty_discount;
pub use email::{Email, EmailError};
pub use id::*;
pub use order_status::{OrderStatus, OrderStatusError};
pub use role::{Role, RoleError};
