//! Core types for PopGames.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod game;
pub mod shop;
pub mod tier;

pub use email::{Email, EmailError};
pub use game::GameKind;
pub use shop::{ShopDomain, ShopDomainError};
pub use tier::Tier;
