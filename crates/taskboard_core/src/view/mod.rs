//! Read-only view contracts.
//!
//! # Responsibility
//! - Derive renderable columns and the completed list from `BoardState`.
//! - Track pending presentations between a mutation and its follow-up
//!   render.

pub mod presentation;
pub mod projection;
