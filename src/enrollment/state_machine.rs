// Status workflow for enrollment requests.
// Transitions are deliberately unguarded: any status may move to any other.

use std::sync::Arc;
use tracing::info;

use crate::domain::{Enrollment, EnrollmentId, EnrollmentStatus};
use crate::error::{EnrollmentError, NotFound};
use crate::store::{EnrollmentStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentTransition {
    Approve,
    Reject,
    Reset,
    Set(EnrollmentStatus),
}

impl EnrollmentTransition {
    pub fn target(&self) -> EnrollmentStatus {
        match self {
            EnrollmentTransition::Approve => EnrollmentStatus::Approved,
            EnrollmentTransition::Reject => EnrollmentStatus::Rejected,
            EnrollmentTransition::Reset => EnrollmentStatus::Pending,
            EnrollmentTransition::Set(status) => *status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub previous: EnrollmentStatus,
    pub current: EnrollmentStatus,
    pub enrollment: Enrollment,
}

#[derive(Clone)]
pub struct EnrollmentStateMachine {
    enrollments: Arc<dyn EnrollmentStore>,
}

impl EnrollmentStateMachine {
    pub fn new(enrollments: Arc<dyn EnrollmentStore>) -> Self {
        Self { enrollments }
    }

    pub async fn approve(&self, id: EnrollmentId) -> Result<TransitionOutcome, EnrollmentError> {
        self.execute(id, EnrollmentTransition::Approve).await
    }

    pub async fn reject(&self, id: EnrollmentId) -> Result<TransitionOutcome, EnrollmentError> {
        self.execute(id, EnrollmentTransition::Reject).await
    }

    pub async fn reset(&self, id: EnrollmentId) -> Result<TransitionOutcome, EnrollmentError> {
        self.execute(id, EnrollmentTransition::Reset).await
    }

    /// Set the status named by `raw` (case-insensitive).
    ///
    /// The name is checked before the store is consulted, so an unknown
    /// status on an unknown id reports `InvalidStatus`.
    pub async fn set_status(
        &self,
        id: EnrollmentId,
        raw: &str,
    ) -> Result<TransitionOutcome, EnrollmentError> {
        let status = raw
            .parse::<EnrollmentStatus>()
            .map_err(|_| EnrollmentError::InvalidStatus {
                raw: raw.to_string(),
            })?;
        self.execute(id, EnrollmentTransition::Set(status)).await
    }

    pub async fn execute(
        &self,
        id: EnrollmentId,
        transition: EnrollmentTransition,
    ) -> Result<TransitionOutcome, EnrollmentError> {
        let mut enrollment = self
            .enrollments
            .get_by_id(id)
            .await?
            .ok_or(NotFound::Enrollment(id))?;

        let previous = enrollment.status();
        let current = transition.target();
        enrollment.set_status(current);
        // a concurrent delete can land between the read and the write
        let enrollment = self
            .enrollments
            .save(&enrollment)
            .await
            .map_err(|e| match e {
                StoreError::UnknownEnrollment(missing) => {
                    EnrollmentError::from(NotFound::Enrollment(missing))
                }
                other => EnrollmentError::from(other),
            })?;

        info!(
            enrollment.id = %id,
            from = %previous,
            to = %current,
            "Enrollment status updated"
        );
        Ok(TransitionOutcome {
            previous,
            current,
            enrollment,
        })
    }

    /// Administrative removal of an enrollment.
    pub async fn delete(&self, id: EnrollmentId) -> Result<(), EnrollmentError> {
        if !self.enrollments.delete_by_id(id).await? {
            return Err(NotFound::Enrollment(id).into());
        }
        info!(enrollment.id = %id, "Enrollment deleted");
        Ok(())
    }
}
