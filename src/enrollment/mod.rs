// Enrollment lifecycle engine: lookup, creation, status workflow, reads.

pub mod directory;
pub mod projection;
pub mod query;
pub mod resolver;
pub mod state_machine;

pub use directory::Directory;
pub use projection::{EnrollmentProjector, EnrollmentRecord};
pub use query::EnrollmentQueries;
pub use resolver::EnrollmentResolver;
pub use state_machine::{EnrollmentStateMachine, EnrollmentTransition, TransitionOutcome};

use crate::error::EnrollmentError;

/// Trim `value`, failing with `message` when nothing is left.
pub(crate) fn require<'a>(value: &'a str, message: &str) -> Result<&'a str, EnrollmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(EnrollmentError::Validation(message.to_string()))
    } else {
        Ok(trimmed)
    }
}
