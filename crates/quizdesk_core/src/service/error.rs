//! Closed error taxonomy for orchestration use-cases.
//!
//! Callers match on `AssessmentError` (or its coarse `ErrorKind`) instead of
//! comparing messages. Authorization failures are kept distinct from
//! not-found so outer layers can apply different visibility rules.

use crate::model::ids::{ClassId, GradeId, QuestionId, SchoolId, StudentId, TeacherId, TestId};
use crate::repo::contracts::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, AssessmentError>;

/// Coarse error category, one per outward response class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    AssignmentViolation,
    Authorization,
    Infrastructure,
}

/// Entity that was required but absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingEntity {
    School(SchoolId),
    Grade(GradeId),
    Class(ClassId),
    Teacher(TeacherId),
    Student(StudentId),
    Test(TestId),
    Question(QuestionId),
    /// No live answer for the (test, question, student) triple.
    Answer {
        test_id: TestId,
        question_id: QuestionId,
        student_id: StudentId,
    },
}

impl Display for MissingEntity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::School(id) => write!(f, "school not found: {id}"),
            Self::Grade(id) => write!(f, "grade not found: {id}"),
            Self::Class(id) => write!(f, "class not found: {id}"),
            Self::Teacher(id) => write!(f, "teacher not found: {id}"),
            Self::Student(id) => write!(f, "student not found: {id}"),
            Self::Test(id) => write!(f, "test not found: {id}"),
            Self::Question(id) => write!(f, "question not found: {id}"),
            Self::Answer {
                test_id,
                question_id,
                student_id,
            } => write!(
                f,
                "answer not found: test {test_id}, question {question_id}, student {student_id}"
            ),
        }
    }
}

/// Rejected input payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Test title is blank after trim.
    EmptyTitle,
    /// A test needs at least one question.
    NoQuestions,
    /// Question prompt at 1-based `position` is blank after trim.
    EmptyPrompt { position: usize },
    /// Answer payload lacks a test, question or student reference.
    IncompleteAnswer,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "test title must not be blank"),
            Self::NoQuestions => write!(f, "no questions provided"),
            Self::EmptyPrompt { position } => {
                write!(f, "question {position} prompt must not be blank")
            }
            Self::IncompleteAnswer => write!(f, "invalid answer payload"),
        }
    }
}

#[derive(Debug)]
pub enum AssessmentError {
    NotFound(MissingEntity),
    Validation(ValidationError),
    /// Student is not assigned to the referenced test.
    NotAssigned {
        test_id: TestId,
        student_id: StudentId,
    },
    /// Teacher does not own the referenced test.
    Forbidden {
        teacher_id: TeacherId,
        test_id: TestId,
    },
    /// Storage or snapshot failure.
    Infrastructure(RepoError),
}

impl AssessmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotAssigned { .. } => ErrorKind::AssignmentViolation,
            Self::Forbidden { .. } => ErrorKind::Authorization,
            Self::Infrastructure(_) => ErrorKind::Infrastructure,
        }
    }
}

impl Display for AssessmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(missing) => write!(f, "{missing}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotAssigned {
                test_id,
                student_id,
            } => write!(f, "student {student_id} is not assigned to test {test_id}"),
            Self::Forbidden {
                teacher_id,
                test_id,
            } => write!(f, "teacher {teacher_id} cannot access test {test_id}"),
            Self::Infrastructure(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssessmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Infrastructure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for AssessmentError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<MissingEntity> for AssessmentError {
    fn from(value: MissingEntity) -> Self {
        Self::NotFound(value)
    }
}

impl From<RepoError> for AssessmentError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TeacherNotFound(id) => Self::NotFound(MissingEntity::Teacher(id)),
            RepoError::StudentNotFound(id) => Self::NotFound(MissingEntity::Student(id)),
            other => Self::Infrastructure(other),
        }
    }
}
