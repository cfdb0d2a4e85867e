// Enrollment Desk Library - course enrollment lifecycle engine
// This exposes the core components for the CLI, testing and integration

pub mod cli;
pub mod config;
pub mod domain;
pub mod enrollment;
pub mod error;
pub mod registry;
pub mod service;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{config, EnrollmentDeskConfig, StorageBackend};
pub use domain::{
    Course, CourseChanges, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, FullName,
    ImageKind, Student, StudentId,
};
pub use enrollment::{
    Directory, EnrollmentProjector, EnrollmentQueries, EnrollmentRecord, EnrollmentResolver,
    EnrollmentStateMachine, EnrollmentTransition, TransitionOutcome,
};
pub use error::{EnrollmentError, ErrorKind, NotFound};
pub use registry::Registry;
pub use service::EnrollmentDesk;
pub use store::{CourseStore, EnrollmentStore, MemoryStore, StoreError, Stores, StudentStore};
pub use telemetry::{create_operation_span, generate_correlation_id, init_telemetry};
