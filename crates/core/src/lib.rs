//! Pomelo Core - Shared types library.
//!
//! This crate provides common types used across all Pomelo components:
//! - `api` - The HTTP API server
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and policy data - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and
//!   order statuses, plus the loyalty-discount policy table

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
