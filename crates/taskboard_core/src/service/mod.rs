//! Board use-case services.
//!
//! # Responsibility
//! - Turn interaction calls into validated state changes.
//! - Keep callers decoupled from ordering and storage details.

pub mod board_service;
