//! Core domain logic for quizdesk.
//! This crate is the single source of truth for assessment invariants.

pub mod clock;
pub mod id;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::assessment::{Answer, AnswerKey, Question, ResultRecord, Test};
pub use model::ids::{
    AnswerId, ClassId, GradeId, QuestionId, ResultId, SchoolId, StudentId, TeacherId, TestId,
};
pub use model::organization::{Class, Grade, School, Student, Teacher};
pub use model::Timestamp;
pub use repo::contracts::{
    AnswerRepository, AssessmentRepository, OrganizationRepository, RepoError, RepoResult,
    ResultRepository, TestRepository,
};
pub use repo::file_repo::FileRepository;
pub use repo::memory_repo::MemoryRepository;
pub use repo::snapshot::{Snapshot, SnapshotError, SnapshotFile, SNAPSHOT_FORMAT_VERSION};
pub use repo::StoreStats;
pub use seed::{sample_seed, SeedData};
pub use service::assessment_service::{
    AssessmentService, CreateTestInput, CreatedTest, GradeInput, QuestionDraft,
    SubmitAnswerInput,
};
pub use service::error::{
    AssessmentError, ErrorKind, MissingEntity, ServiceResult, ValidationError,
};
pub use service::organization_service::OrganizationService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
