//! Lock-guarded in-memory index store.
//!
//! # Responsibility
//! - Serve every repository contract from process-local maps.
//! - Serialize all mutations behind one exclusive lock; let reads share it.
//!
//! # Invariants
//! - Writers hold the exclusive lock for the whole mutation, plus any commit
//!   hook (the durable wrapper's snapshot write) run via `write_then`.
//! - Readers observe all indices at one point in time.
//! - Lock poisoning is reported as `RepoError::LockPoisoned`, never a panic.

use crate::model::assessment::{Answer, AnswerKey, Question, ResultRecord, Test};
use crate::model::ids::{
    AnswerId, ClassId, GradeId, QuestionId, SchoolId, StudentId, TeacherId, TestId,
};
use crate::model::organization::{Class, Grade, School, Student, Teacher};
use crate::repo::contracts::{
    AnswerRepository, OrganizationRepository, RepoError, RepoResult, ResultRepository,
    TestRepository,
};
use crate::repo::snapshot::Snapshot;
use crate::repo::state::{StoreState, StoreStats};
use crate::seed::SeedData;
use std::sync::RwLock;

/// Process-local repository holding all entity state.
#[derive(Debug)]
pub struct MemoryRepository {
    state: RwLock<StoreState>,
}

impl MemoryRepository {
    /// Creates a store holding only the seeded organization.
    pub fn new(seed: SeedData) -> Self {
        Self {
            state: RwLock::new(StoreState::from_seed(seed)),
        }
    }

    /// Rebuilds a store, indices included, from a snapshot document.
    pub fn from_snapshot(snapshot: Snapshot) -> RepoResult<Self> {
        Ok(Self {
            state: RwLock::new(StoreState::from_snapshot(snapshot)?),
        })
    }

    /// Copies the complete current state into a snapshot document.
    pub fn export_snapshot(&self) -> RepoResult<Snapshot> {
        self.read(StoreState::to_snapshot)
    }

    pub fn stats(&self) -> RepoResult<StoreStats> {
        self.read(StoreState::stats)
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> RepoResult<T> {
        let guard = self.state.read().map_err(|_| RepoError::LockPoisoned)?;
        Ok(f(&guard))
    }

    fn write<T>(&self, mutate: impl FnOnce(&mut StoreState) -> RepoResult<T>) -> RepoResult<T> {
        self.write_then(mutate, |_| Ok(()))
    }

    /// Applies `mutate` and, only if it succeeds, runs `commit` while the
    /// exclusive lock is still held.
    ///
    /// A failing `commit` does not undo `mutate`: the mutation stays visible
    /// in memory and the error is returned to the caller.
    pub(crate) fn write_then<T>(
        &self,
        mutate: impl FnOnce(&mut StoreState) -> RepoResult<T>,
        commit: impl FnOnce(&StoreState) -> RepoResult<()>,
    ) -> RepoResult<T> {
        let mut guard = self.state.write().map_err(|_| RepoError::LockPoisoned)?;
        let value = mutate(&mut guard)?;
        commit(&guard)?;
        Ok(value)
    }

    pub(crate) fn create_test_then(
        &self,
        test: &Test,
        questions: &[Question],
        student_ids: &[StudentId],
        commit: impl FnOnce(&StoreState) -> RepoResult<()>,
    ) -> RepoResult<()> {
        self.write_then(
            |state| state.create_test(test, questions, student_ids),
            commit,
        )
    }

    pub(crate) fn upsert_answer_then(
        &self,
        answer: &Answer,
        commit: impl FnOnce(&StoreState) -> RepoResult<()>,
    ) -> RepoResult<()> {
        self.write_then(
            |state| {
                state.upsert_answer(answer);
                Ok(())
            },
            commit,
        )
    }

    pub(crate) fn save_result_then(
        &self,
        result: &ResultRecord,
        commit: impl FnOnce(&StoreState) -> RepoResult<()>,
    ) -> RepoResult<()> {
        self.write_then(
            |state| {
                state.save_result(result);
                Ok(())
            },
            commit,
        )
    }
}

impl OrganizationRepository for MemoryRepository {
    fn get_school(&self, id: &SchoolId) -> RepoResult<Option<School>> {
        self.read(|state| state.school(id))
    }

    fn list_schools(&self) -> RepoResult<Vec<School>> {
        self.read(StoreState::schools)
    }

    fn get_grade(&self, id: &GradeId) -> RepoResult<Option<Grade>> {
        self.read(|state| state.grade(id))
    }

    fn list_grades(&self, school_id: &SchoolId) -> RepoResult<Vec<Grade>> {
        self.read(|state| state.grades_of(school_id))
    }

    fn get_class(&self, id: &ClassId) -> RepoResult<Option<Class>> {
        self.read(|state| state.class(id))
    }

    fn list_classes(&self, grade_id: &GradeId) -> RepoResult<Vec<Class>> {
        self.read(|state| state.classes_of(grade_id))
    }

    fn get_teacher(&self, id: &TeacherId) -> RepoResult<Option<Teacher>> {
        self.read(|state| state.teacher(id))
    }

    fn list_teachers(&self, school_id: &SchoolId) -> RepoResult<Vec<Teacher>> {
        self.read(|state| state.teachers_of(school_id))
    }

    fn get_student(&self, id: &StudentId) -> RepoResult<Option<Student>> {
        self.read(|state| state.student(id))
    }

    fn list_students(&self, class_id: &ClassId) -> RepoResult<Vec<Student>> {
        self.read(|state| state.students_of(class_id))
    }
}

impl TestRepository for MemoryRepository {
    fn create_test(
        &self,
        test: &Test,
        questions: &[Question],
        student_ids: &[StudentId],
    ) -> RepoResult<()> {
        self.write(|state| state.create_test(test, questions, student_ids))
    }

    fn get_test(&self, id: &TestId) -> RepoResult<Option<Test>> {
        self.read(|state| state.test(id))
    }

    fn get_question(&self, id: &QuestionId) -> RepoResult<Option<Question>> {
        self.read(|state| state.question(id))
    }

    fn list_tests_by_teacher(&self, teacher_id: &TeacherId) -> RepoResult<Vec<Test>> {
        self.read(|state| state.tests_by_teacher(teacher_id))
    }

    fn list_tests_for_student(&self, student_id: &StudentId) -> RepoResult<Vec<Test>> {
        self.read(|state| state.tests_for_student(student_id))
    }

    fn list_questions(&self, test_id: &TestId) -> RepoResult<Vec<Question>> {
        self.read(|state| state.questions_of(test_id))
    }

    fn is_student_assigned(&self, test_id: &TestId, student_id: &StudentId) -> RepoResult<bool> {
        self.read(|state| state.is_assigned(test_id, student_id))
    }
}

impl AnswerRepository for MemoryRepository {
    fn upsert_answer(&self, answer: &Answer) -> RepoResult<()> {
        self.write(|state| {
            state.upsert_answer(answer);
            Ok(())
        })
    }

    fn get_answer(&self, key: &AnswerKey) -> RepoResult<Option<Answer>> {
        self.read(|state| state.answer(key))
    }

    fn list_answers(&self, test_id: &TestId, student_id: &StudentId) -> RepoResult<Vec<Answer>> {
        self.read(|state| state.answers_of(test_id, student_id))
    }

    fn list_answers_by_test(&self, test_id: &TestId) -> RepoResult<Vec<Answer>> {
        self.read(|state| state.answers_by_test(test_id))
    }
}

impl ResultRepository for MemoryRepository {
    fn save_result(&self, result: &ResultRecord) -> RepoResult<()> {
        self.write(|state| {
            state.save_result(result);
            Ok(())
        })
    }

    fn get_result(&self, answer_id: &AnswerId) -> RepoResult<Option<ResultRecord>> {
        self.read(|state| state.result_for(answer_id))
    }

    fn list_results_by_test(&self, test_id: &TestId) -> RepoResult<Vec<ResultRecord>> {
        self.read(|state| state.results_by_test(test_id))
    }

    fn list_results_by_student(
        &self,
        test_id: &TestId,
        student_id: &StudentId,
    ) -> RepoResult<Vec<ResultRecord>> {
        self.read(|state| state.results_by_student(test_id, student_id))
    }
}
