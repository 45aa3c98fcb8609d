//! Core domain logic for the project task board.
//! This crate owns task ordering, project metadata and persistence.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BoardConfig, ConfigError, ReactivationPolicy};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::BoardState;
pub use model::project::{
    css_class_for, fallback_color, random_color, validate_color, validate_project_name,
};
pub use model::task::{Task, TaskId, ValidationError};
pub use repo::blob_repo::{BlobRepository, MemoryBlobRepository, SqliteBlobRepository};
pub use repo::board_repo::{
    load_board, save_board, LoadOutcome, RecoveredKey, SCHEMA_VERSION,
};
pub use repo::{RepoError, RepoResult};
pub use service::board_service::{BoardError, BoardResult, BoardService};
pub use view::presentation::{
    AnimationKind, CompletionReason, PresentationCompletion, PresentationTracker,
};
pub use view::projection::{project_board, relative_time, BoardView, ProjectColumn};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
