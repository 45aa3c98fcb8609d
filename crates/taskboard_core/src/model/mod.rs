//! Board domain model.
//!
//! # Responsibility
//! - Define tasks, project metadata and the single owned board state.
//! - Validate user input before it reaches ordering or persistence.
//!
//! # Invariants
//! - A task is identified by its `TaskId` for its whole lifetime.
//! - `completed_at` is `Some` exactly when `completed` is true.

pub mod board;
pub mod project;
pub mod task;
