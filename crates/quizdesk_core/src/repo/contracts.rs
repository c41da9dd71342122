//! Repository contracts and shared error type.
//!
//! # Responsibility
//! - Describe the fixed access patterns the orchestration layer relies on.
//! - Keep storage details (maps, locks, files) behind trait boundaries.
//!
//! # Invariants
//! - List operations order by ascending `created_at` (ties by id); question
//!   lists order by ascending `sequence`.
//! - `upsert_answer` and `save_result` are unconditional writes. Deciding
//!   between insert and update belongs to the caller.

use crate::model::assessment::{Answer, AnswerKey, Question, ResultRecord, Test};
use crate::model::ids::{
    AnswerId, ClassId, GradeId, QuestionId, SchoolId, StudentId, TeacherId, TestId,
};
use crate::model::organization::{Class, Grade, School, Student, Teacher};
use crate::repo::snapshot::SnapshotError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository-level failure.
#[derive(Debug)]
pub enum RepoError {
    /// `create_test` was called with an id that is already stored.
    TestAlreadyExists(TestId),
    /// `create_test` referenced an unknown teacher.
    TeacherNotFound(TeacherId),
    /// `create_test` referenced an unknown student.
    StudentNotFound(StudentId),
    /// Test aggregate is internally inconsistent (question/test mismatch,
    /// non-dense sequences).
    InvalidAggregate(String),
    /// Restored state violates store invariants.
    InvalidData(String),
    /// A previous lock holder panicked; state can no longer be trusted.
    LockPoisoned,
    /// Snapshot serialization or file replacement failed.
    Snapshot(SnapshotError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TestAlreadyExists(id) => write!(f, "test already exists: {id}"),
            Self::TeacherNotFound(id) => write!(f, "teacher not found: {id}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidAggregate(message) => write!(f, "invalid test aggregate: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted store data: {message}"),
            Self::LockPoisoned => write!(f, "store lock poisoned"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SnapshotError> for RepoError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Read access to the organizational hierarchy.
pub trait OrganizationRepository {
    fn get_school(&self, id: &SchoolId) -> RepoResult<Option<School>>;
    fn list_schools(&self) -> RepoResult<Vec<School>>;
    fn get_grade(&self, id: &GradeId) -> RepoResult<Option<Grade>>;
    fn list_grades(&self, school_id: &SchoolId) -> RepoResult<Vec<Grade>>;
    fn get_class(&self, id: &ClassId) -> RepoResult<Option<Class>>;
    fn list_classes(&self, grade_id: &GradeId) -> RepoResult<Vec<Class>>;
    fn get_teacher(&self, id: &TeacherId) -> RepoResult<Option<Teacher>>;
    fn list_teachers(&self, school_id: &SchoolId) -> RepoResult<Vec<Teacher>>;
    fn get_student(&self, id: &StudentId) -> RepoResult<Option<Student>>;
    fn list_students(&self, class_id: &ClassId) -> RepoResult<Vec<Student>>;
}

/// Tests, their questions, and the assignment relation.
pub trait TestRepository {
    /// Inserts a test, its questions and its assignments as one unit.
    ///
    /// Fails without visible side effects when the id is taken, the teacher
    /// or any student is unknown, or the aggregate is inconsistent.
    fn create_test(
        &self,
        test: &Test,
        questions: &[Question],
        student_ids: &[StudentId],
    ) -> RepoResult<()>;
    fn get_test(&self, id: &TestId) -> RepoResult<Option<Test>>;
    fn get_question(&self, id: &QuestionId) -> RepoResult<Option<Question>>;
    fn list_tests_by_teacher(&self, teacher_id: &TeacherId) -> RepoResult<Vec<Test>>;
    fn list_tests_for_student(&self, student_id: &StudentId) -> RepoResult<Vec<Test>>;
    fn list_questions(&self, test_id: &TestId) -> RepoResult<Vec<Question>>;
    fn is_student_assigned(&self, test_id: &TestId, student_id: &StudentId) -> RepoResult<bool>;
}

/// Student answers keyed by `AnswerKey`.
pub trait AnswerRepository {
    fn upsert_answer(&self, answer: &Answer) -> RepoResult<()>;
    fn get_answer(&self, key: &AnswerKey) -> RepoResult<Option<Answer>>;
    fn list_answers(&self, test_id: &TestId, student_id: &StudentId) -> RepoResult<Vec<Answer>>;
    fn list_answers_by_test(&self, test_id: &TestId) -> RepoResult<Vec<Answer>>;
}

/// Grading results keyed by answer id.
pub trait ResultRepository {
    fn save_result(&self, result: &ResultRecord) -> RepoResult<()>;
    fn get_result(&self, answer_id: &AnswerId) -> RepoResult<Option<ResultRecord>>;
    fn list_results_by_test(&self, test_id: &TestId) -> RepoResult<Vec<ResultRecord>>;
    fn list_results_by_student(
        &self,
        test_id: &TestId,
        student_id: &StudentId,
    ) -> RepoResult<Vec<ResultRecord>>;
}

/// Everything the assessment service needs from storage.
pub trait AssessmentRepository:
    OrganizationRepository + TestRepository + AnswerRepository + ResultRepository
{
}

impl<T> AssessmentRepository for T where
    T: OrganizationRepository + TestRepository + AnswerRepository + ResultRepository
{
}
