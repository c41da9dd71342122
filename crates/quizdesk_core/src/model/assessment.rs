//! Assessment entities.
//!
//! # Invariants
//! - A test's question sequences are dense, 1-based and assigned in input
//!   order at creation; they are never renumbered.
//! - At most one answer exists per `AnswerKey`. Resubmission keeps `id` and
//!   `created_at`.
//! - At most one result exists per answer. Re-grading keeps `id` and
//!   `created_at`.
//! - `Test::assigned_to` mirrors the store's assignment index; both views are
//!   written together.

use super::ids::{AnswerId, QuestionId, ResultId, StudentId, TeacherId, TestId};
use super::Timestamp;
use serde::{Deserialize, Serialize};

/// A test owned by exactly one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub id: TestId,
    pub teacher_id: TeacherId,
    pub title: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Assigned students in assignment order.
    pub assigned_to: Vec<StudentId>,
}

/// Immutable question belonging to one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub test_id: TestId,
    /// 1-based position inside the test.
    pub sequence: u32,
    pub prompt: String,
    pub points: i32,
    pub created_at: Timestamp,
}

/// A student's response to one question of one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub test_id: TestId,
    pub question_id: QuestionId,
    pub student_id: StudentId,
    pub response: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Answer {
    /// Returns the uniqueness key of this answer.
    pub fn key(&self) -> AnswerKey {
        AnswerKey {
            test_id: self.test_id.clone(),
            question_id: self.question_id.clone(),
            student_id: self.student_id.clone(),
        }
    }
}

/// Uniqueness key for answers: one live answer per (test, question, student).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnswerKey {
    pub test_id: TestId,
    pub question_id: QuestionId,
    pub student_id: StudentId,
}

impl AnswerKey {
    pub fn new(
        test_id: impl Into<TestId>,
        question_id: impl Into<QuestionId>,
        student_id: impl Into<StudentId>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            question_id: question_id.into(),
            student_id: student_id.into(),
        }
    }
}

/// Grading outcome for one answer (1:1 with `Answer`).
///
/// Named `ResultRecord` so it does not shadow `std::result::Result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: ResultId,
    pub answer_id: AnswerId,
    pub score: i32,
    pub feedback: String,
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
