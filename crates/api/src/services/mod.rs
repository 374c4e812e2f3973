//! Business logic, one service per component.
//!
//! Services own the domain rules (uniqueness, stock, discounts, status
//! transitions) and translate repository results into typed domain errors.
//! Route handlers stay thin: parse input, call a service, wrap the result.

pub mod auth;
pub mod bootstrap;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod search;
