// User profile: the competency catalogue and the row-store repository for
// per-user skills and ratings.

pub mod competencies;
pub mod repository;

use thiserror::Error;

pub use competencies::{CompetencyRating, CORE_COMPETENCIES};
pub use repository::{PgProfileRepository, ProfileRepository};

/// Row-store failure. Callers downgrade it to a warning and keep the session
/// copy as the source of truth.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("PersistenceFailed: {0}")]
    Database(#[from] sqlx::Error),
}
