//! Assessment use-case service.
//!
//! # Responsibility
//! - Enforce cross-entity rules: ownership, assignment, question membership.
//! - Decide insert vs update for answers and results, then delegate to the
//!   repository's unconditional writes.
//! - Convert repository absence into the `NotFound` the use-case means.
//!
//! # Invariants
//! - This service is the only caller of repository mutations.
//! - Each operation reads the clock once; every field it stamps shares that
//!   value.
//! - Resubmission and re-grading keep their id and `created_at`.

use crate::clock::{Clock, SystemClock};
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::model::assessment::{Answer, AnswerKey, Question, ResultRecord, Test};
use crate::model::ids::{AnswerId, QuestionId, ResultId, StudentId, TeacherId, TestId};
use crate::repo::contracts::AssessmentRepository;
use crate::service::error::{AssessmentError, MissingEntity, ServiceResult, ValidationError};
use log::{debug, info, warn};
use std::collections::HashSet;

/// Question content supplied when authoring a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub prompt: String,
    pub points: i32,
}

impl QuestionDraft {
    pub fn new(prompt: impl Into<String>, points: i32) -> Self {
        Self {
            prompt: prompt.into(),
            points,
        }
    }
}

/// Request model for authoring a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTestInput {
    pub title: String,
    pub teacher_id: TeacherId,
    /// Questions in the order they should be numbered.
    pub questions: Vec<QuestionDraft>,
    /// Students to assign; duplicates collapse to the first occurrence.
    pub student_ids: Vec<StudentId>,
}

/// Test aggregate returned by `create_test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTest {
    pub test: Test,
    /// Questions ordered by sequence.
    pub questions: Vec<Question>,
}

/// Request model for a student's answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAnswerInput {
    pub test_id: TestId,
    pub question_id: QuestionId,
    pub student_id: StudentId,
    pub response: String,
}

/// Request model for grading one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeInput {
    pub teacher_id: TeacherId,
    pub test_id: TestId,
    pub question_id: QuestionId,
    pub student_id: StudentId,
    pub score: i32,
    pub feedback: String,
    pub completed: bool,
}

/// Orchestrates teacher and student workflows around tests.
pub struct AssessmentService<R: AssessmentRepository> {
    repo: R,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl<R: AssessmentRepository> AssessmentService<R> {
    /// Creates a service using wall-clock time and random UUID identifiers.
    pub fn new(repo: R) -> Self {
        Self::with_collaborators(repo, SystemClock::new(), UuidIdGenerator)
    }

    /// Creates a service with explicit clock and identifier sources.
    pub fn with_collaborators(
        repo: R,
        clock: impl Clock + 'static,
        ids: impl IdGenerator + 'static,
    ) -> Self {
        Self {
            repo,
            clock: Box::new(clock),
            ids: Box::new(ids),
        }
    }

    /// Borrows the underlying repository for read-only diagnostics.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Authors a test with numbered questions and student assignments.
    ///
    /// # Errors
    /// - `Validation` for a blank title, no questions, or a blank prompt.
    /// - `NotFound` for an unknown teacher or student.
    /// - `Infrastructure` when the store rejects or fails to persist the write.
    pub fn create_test(&self, input: CreateTestInput) -> ServiceResult<CreatedTest> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        if input.questions.is_empty() {
            return Err(ValidationError::NoQuestions.into());
        }

        self.ensure_teacher_exists(&input.teacher_id)?;
        let mut seen = HashSet::with_capacity(input.student_ids.len());
        let mut student_ids = Vec::with_capacity(input.student_ids.len());
        for student_id in input.student_ids {
            if seen.insert(student_id.clone()) {
                self.ensure_student_exists(&student_id)?;
                student_ids.push(student_id);
            }
        }

        let now = self.clock.now();
        let test = Test {
            id: TestId::new(self.ids.new_id()),
            teacher_id: input.teacher_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
            assigned_to: student_ids.clone(),
        };

        let mut questions = Vec::with_capacity(input.questions.len());
        for (index, draft) in input.questions.into_iter().enumerate() {
            let prompt = draft.prompt.trim();
            if prompt.is_empty() {
                return Err(ValidationError::EmptyPrompt {
                    position: index + 1,
                }
                .into());
            }
            questions.push(Question {
                id: QuestionId::new(self.ids.new_id()),
                test_id: test.id.clone(),
                sequence: index as u32 + 1,
                prompt: prompt.to_string(),
                points: draft.points,
                created_at: now,
            });
        }

        self.repo.create_test(&test, &questions, &student_ids)?;
        info!(
            "event=test_create module=service status=ok test_id={} teacher_id={} questions={} students={}",
            test.id,
            test.teacher_id,
            questions.len(),
            student_ids.len()
        );
        Ok(CreatedTest { test, questions })
    }

    /// Lists a teacher's tests by creation time.
    pub fn list_tests_by_teacher(&self, teacher_id: &TeacherId) -> ServiceResult<Vec<Test>> {
        self.ensure_teacher_exists(teacher_id)?;
        Ok(self.repo.list_tests_by_teacher(teacher_id)?)
    }

    /// Lists tests assigned to a student by creation time.
    pub fn list_tests_for_student(&self, student_id: &StudentId) -> ServiceResult<Vec<Test>> {
        self.ensure_student_exists(student_id)?;
        Ok(self.repo.list_tests_for_student(student_id)?)
    }

    /// Lists questions of a test owned by `teacher_id`, by sequence.
    pub fn get_questions_for_teacher(
        &self,
        teacher_id: &TeacherId,
        test_id: &TestId,
    ) -> ServiceResult<Vec<Question>> {
        self.ensure_teacher_owns_test(teacher_id, test_id)?;
        Ok(self.repo.list_questions(test_id)?)
    }

    /// Lists questions of a test assigned to `student_id`, by sequence.
    pub fn get_questions_for_student(
        &self,
        student_id: &StudentId,
        test_id: &TestId,
    ) -> ServiceResult<Vec<Question>> {
        self.ensure_student_exists(student_id)?;
        self.ensure_assigned(test_id, student_id)?;
        Ok(self.repo.list_questions(test_id)?)
    }

    /// Stores or updates a student's answer for one question.
    ///
    /// The question id is trimmed, as in `grade_answer`.
    ///
    /// # Contract
    /// - First submission for a (test, question, student) mints an id and sets
    ///   `created_at == updated_at == now`.
    /// - Later submissions keep id and `created_at`, replace `response`, and
    ///   set `updated_at = now`.
    pub fn submit_answer(&self, input: SubmitAnswerInput) -> ServiceResult<Answer> {
        let question_id = QuestionId::new(input.question_id.as_str().trim());
        if input.test_id.is_blank() || question_id.is_blank() || input.student_id.is_blank() {
            return Err(ValidationError::IncompleteAnswer.into());
        }

        self.ensure_student_exists(&input.student_id)?;
        self.ensure_assigned(&input.test_id, &input.student_id)?;
        let belongs_to_test = self
            .repo
            .get_question(&question_id)?
            .is_some_and(|question| question.test_id == input.test_id);
        if !belongs_to_test {
            return Err(MissingEntity::Question(question_id).into());
        }

        let key = AnswerKey {
            test_id: input.test_id,
            question_id,
            student_id: input.student_id,
        };
        let now = self.clock.now();
        let (id, created_at) = match self.repo.get_answer(&key)? {
            Some(existing) => (existing.id, existing.created_at),
            None => (AnswerId::new(self.ids.new_id()), now),
        };
        let answer = Answer {
            id,
            test_id: key.test_id,
            question_id: key.question_id,
            student_id: key.student_id,
            response: input.response.trim().to_string(),
            created_at,
            updated_at: now,
        };

        self.repo.upsert_answer(&answer)?;
        debug!(
            "event=answer_upsert module=service status=ok answer_id={} test_id={} student_id={} resubmission={}",
            answer.id,
            answer.test_id,
            answer.student_id,
            answer.created_at != answer.updated_at
        );
        Ok(answer)
    }

    /// Lists a student's own answers on an assigned test.
    pub fn list_answers_for_student(
        &self,
        student_id: &StudentId,
        test_id: &TestId,
    ) -> ServiceResult<Vec<Answer>> {
        self.ensure_student_exists(student_id)?;
        self.ensure_assigned(test_id, student_id)?;
        Ok(self.repo.list_answers(test_id, student_id)?)
    }

    /// Lists grading results for a student's assigned test.
    pub fn list_results_for_student(
        &self,
        student_id: &StudentId,
        test_id: &TestId,
    ) -> ServiceResult<Vec<ResultRecord>> {
        self.ensure_student_exists(student_id)?;
        self.ensure_assigned(test_id, student_id)?;
        Ok(self.repo.list_results_by_student(test_id, student_id)?)
    }

    /// Lists every answer on a test owned by `teacher_id`.
    pub fn list_answers_by_test(
        &self,
        teacher_id: &TeacherId,
        test_id: &TestId,
    ) -> ServiceResult<Vec<Answer>> {
        self.ensure_teacher_owns_test(teacher_id, test_id)?;
        Ok(self.repo.list_answers_by_test(test_id)?)
    }

    /// Lists every result on a test owned by `teacher_id`.
    pub fn list_results_by_test(
        &self,
        teacher_id: &TeacherId,
        test_id: &TestId,
    ) -> ServiceResult<Vec<ResultRecord>> {
        self.ensure_teacher_owns_test(teacher_id, test_id)?;
        Ok(self.repo.list_results_by_test(test_id)?)
    }

    /// Grades one answer, creating or updating its single result.
    ///
    /// # Errors
    /// - `NotFound(Test)` / `Forbidden` when the teacher does not own the test.
    /// - `NotAssigned` when the student is not assigned.
    /// - `NotFound(Answer)` when nothing was submitted for the triple.
    pub fn grade_answer(&self, input: GradeInput) -> ServiceResult<ResultRecord> {
        self.ensure_teacher_owns_test(&input.teacher_id, &input.test_id)?;
        self.ensure_assigned(&input.test_id, &input.student_id)?;

        let key = AnswerKey {
            test_id: input.test_id,
            question_id: QuestionId::new(input.question_id.as_str().trim()),
            student_id: input.student_id,
        };
        let Some(answer) = self.repo.get_answer(&key)? else {
            return Err(MissingEntity::Answer {
                test_id: key.test_id,
                question_id: key.question_id,
                student_id: key.student_id,
            }
            .into());
        };

        let now = self.clock.now();
        let result = match self.repo.get_result(&answer.id)? {
            Some(mut existing) => {
                existing.score = input.score;
                existing.feedback = input.feedback;
                existing.completed = input.completed;
                existing.updated_at = now;
                existing
            }
            None => ResultRecord {
                id: ResultId::new(self.ids.new_id()),
                answer_id: answer.id,
                score: input.score,
                feedback: input.feedback,
                completed: input.completed,
                created_at: now,
                updated_at: now,
            },
        };

        self.repo.save_result(&result)?;
        debug!(
            "event=result_save module=service status=ok result_id={} answer_id={} completed={}",
            result.id, result.answer_id, result.completed
        );
        Ok(result)
    }

    fn ensure_teacher_exists(&self, teacher_id: &TeacherId) -> ServiceResult<()> {
        match self.repo.get_teacher(teacher_id)? {
            Some(_) => Ok(()),
            None => Err(MissingEntity::Teacher(teacher_id.clone()).into()),
        }
    }

    fn ensure_student_exists(&self, student_id: &StudentId) -> ServiceResult<()> {
        match self.repo.get_student(student_id)? {
            Some(_) => Ok(()),
            None => Err(MissingEntity::Student(student_id.clone()).into()),
        }
    }

    fn ensure_teacher_owns_test(
        &self,
        teacher_id: &TeacherId,
        test_id: &TestId,
    ) -> ServiceResult<()> {
        let test = self
            .repo
            .get_test(test_id)?
            .ok_or_else(|| MissingEntity::Test(test_id.clone()))?;
        if &test.teacher_id != teacher_id {
            warn!(
                "event=ownership_check module=service status=forbidden teacher_id={} test_id={}",
                teacher_id, test_id
            );
            return Err(AssessmentError::Forbidden {
                teacher_id: teacher_id.clone(),
                test_id: test_id.clone(),
            });
        }
        Ok(())
    }

    fn ensure_assigned(&self, test_id: &TestId, student_id: &StudentId) -> ServiceResult<()> {
        if self.repo.is_student_assigned(test_id, student_id)? {
            Ok(())
        } else {
            Err(AssessmentError::NotAssigned {
                test_id: test_id.clone(),
                student_id: student_id.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AssessmentService, CreateTestInput, QuestionDraft};
    use crate::clock::ManualClock;
    use crate::id::SequentialIdGenerator;
    use crate::model::ids::{StudentId, TeacherId};
    use crate::repo::memory_repo::MemoryRepository;
    use crate::seed::sample_seed;
    use crate::service::error::{AssessmentError, ValidationError};

    fn service() -> AssessmentService<MemoryRepository> {
        AssessmentService::with_collaborators(
            MemoryRepository::new(sample_seed()),
            ManualClock::new(1_000),
            SequentialIdGenerator::new("id"),
        )
    }

    #[test]
    fn create_test_trims_inputs_and_collapses_duplicate_students() {
        let created = service()
            .create_test(CreateTestInput {
                title: "  Algebra  ".to_string(),
                teacher_id: TeacherId::new("teacher-001"),
                questions: vec![QuestionDraft::new(" x + 1 = 2? ", 5)],
                student_ids: vec![
                    StudentId::new("student-002"),
                    StudentId::new("student-002"),
                    StudentId::new("student-001"),
                ],
            })
            .unwrap();

        assert_eq!(created.test.title, "Algebra");
        assert_eq!(created.questions[0].prompt, "x + 1 = 2?");
        assert_eq!(
            created.test.assigned_to,
            vec![StudentId::new("student-002"), StudentId::new("student-001")]
        );
        assert_eq!(created.test.id.as_str(), "id-0001");
        assert_eq!(created.questions[0].id.as_str(), "id-0002");
    }

    #[test]
    fn blank_second_prompt_reports_its_position() {
        let err = service()
            .create_test(CreateTestInput {
                title: "Algebra".to_string(),
                teacher_id: TeacherId::new("teacher-001"),
                questions: vec![QuestionDraft::new("ok", 1), QuestionDraft::new("  ", 1)],
                student_ids: Vec::new(),
            })
            .unwrap_err();

        assert!(matches!(
            err,
            AssessmentError::Validation(ValidationError::EmptyPrompt { position: 2 })
        ));
    }
}
