//! PopGames Core - Shared types library.
//!
//! This crate provides common types used across all PopGames components:
//! - `server` - Merchant settings + storefront widget API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated wrappers for emails and shop domains, plus the
//!   game and discount-tier vocabulary shared between server and CLI

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
