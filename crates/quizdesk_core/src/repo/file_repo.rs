//! Snapshot-backed durable repository.
//!
//! # Responsibility
//! - Wrap `MemoryRepository` and forward reads unchanged.
//! - After every successful mutation, write the full state as a new snapshot
//!   while the store's exclusive lock is still held.
//! - Restore state from the snapshot at startup, or seed and persist a fresh
//!   store when none exists.
//!
//! # Invariants
//! - Mutations are totally ordered, and so are their snapshot writes.
//! - A failed snapshot write is reported to the caller, but the in-memory
//!   mutation stays applied. Memory and disk then diverge until the next
//!   successful write; a restart in that window loses the mutation. This is
//!   accepted behavior, not rolled back.
//!
//! # See also
//! - `repo::snapshot` for the on-disk layout and atomic replacement.

use crate::model::assessment::{Answer, AnswerKey, Question, ResultRecord, Test};
use crate::model::ids::{
    AnswerId, ClassId, GradeId, QuestionId, SchoolId, StudentId, TeacherId, TestId,
};
use crate::model::organization::{Class, Grade, School, Student, Teacher};
use crate::repo::contracts::{
    AnswerRepository, OrganizationRepository, RepoResult, ResultRepository, TestRepository,
};
use crate::repo::memory_repo::MemoryRepository;
use crate::repo::snapshot::SnapshotFile;
use crate::repo::state::{StoreState, StoreStats};
use crate::seed::SeedData;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Durable repository persisting a JSON snapshot after every mutation.
#[derive(Debug)]
pub struct FileRepository {
    inner: MemoryRepository,
    file: SnapshotFile,
}

impl FileRepository {
    /// Opens the store at `path`.
    ///
    /// Loads the existing snapshot when present; otherwise builds state from
    /// `seed` and writes it immediately so the file exists from first start.
    ///
    /// # Errors
    /// - Snapshot read/decode failures, including unsupported versions.
    /// - Snapshots whose content violates store invariants.
    /// - Failure to write the initial snapshot.
    pub fn open(path: impl Into<PathBuf>, seed: SeedData) -> RepoResult<Self> {
        let started_at = Instant::now();
        let file = SnapshotFile::new(path)?;
        info!(
            "event=store_open module=repo status=start path={}",
            file.path().display()
        );

        if file.discard_stale_temp()? {
            warn!(
                "event=store_open module=repo status=stale_temp_removed path={}",
                file.temp_path().display()
            );
        }

        let repo = match file.load()? {
            Some(snapshot) => Self {
                inner: MemoryRepository::from_snapshot(snapshot)?,
                file,
            },
            None => {
                let repo = Self {
                    inner: MemoryRepository::new(seed),
                    file,
                };
                repo.inner.write_then(|_| Ok(()), |state| repo.persist(state))?;
                repo
            }
        };

        let stats = repo.inner.stats()?;
        info!(
            "event=store_open module=repo status=ok duration_ms={} tests={} answers={} results={}",
            started_at.elapsed().as_millis(),
            stats.tests,
            stats.answers,
            stats.results
        );
        Ok(repo)
    }

    /// Canonical snapshot location.
    pub fn snapshot_path(&self) -> &Path {
        self.file.path()
    }

    pub fn stats(&self) -> RepoResult<StoreStats> {
        self.inner.stats()
    }

    fn persist(&self, state: &StoreState) -> RepoResult<()> {
        let started_at = Instant::now();
        match self.file.save(&state.to_snapshot()) {
            Ok(()) => {
                info!(
                    "event=snapshot_write module=repo status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=snapshot_write module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

impl OrganizationRepository for FileRepository {
    fn get_school(&self, id: &SchoolId) -> RepoResult<Option<School>> {
        self.inner.get_school(id)
    }

    fn list_schools(&self) -> RepoResult<Vec<School>> {
        self.inner.list_schools()
    }

    fn get_grade(&self, id: &GradeId) -> RepoResult<Option<Grade>> {
        self.inner.get_grade(id)
    }

    fn list_grades(&self, school_id: &SchoolId) -> RepoResult<Vec<Grade>> {
        self.inner.list_grades(school_id)
    }

    fn get_class(&self, id: &ClassId) -> RepoResult<Option<Class>> {
        self.inner.get_class(id)
    }

    fn list_classes(&self, grade_id: &GradeId) -> RepoResult<Vec<Class>> {
        self.inner.list_classes(grade_id)
    }

    fn get_teacher(&self, id: &TeacherId) -> RepoResult<Option<Teacher>> {
        self.inner.get_teacher(id)
    }

    fn list_teachers(&self, school_id: &SchoolId) -> RepoResult<Vec<Teacher>> {
        self.inner.list_teachers(school_id)
    }

    fn get_student(&self, id: &StudentId) -> RepoResult<Option<Student>> {
        self.inner.get_student(id)
    }

    fn list_students(&self, class_id: &ClassId) -> RepoResult<Vec<Student>> {
        self.inner.list_students(class_id)
    }
}

impl TestRepository for FileRepository {
    fn create_test(
        &self,
        test: &Test,
        questions: &[Question],
        student_ids: &[StudentId],
    ) -> RepoResult<()> {
        self.inner
            .create_test_then(test, questions, student_ids, |state| self.persist(state))
    }

    fn get_test(&self, id: &TestId) -> RepoResult<Option<Test>> {
        self.inner.get_test(id)
    }

    fn get_question(&self, id: &QuestionId) -> RepoResult<Option<Question>> {
        self.inner.get_question(id)
    }

    fn list_tests_by_teacher(&self, teacher_id: &TeacherId) -> RepoResult<Vec<Test>> {
        self.inner.list_tests_by_teacher(teacher_id)
    }

    fn list_tests_for_student(&self, student_id: &StudentId) -> RepoResult<Vec<Test>> {
        self.inner.list_tests_for_student(student_id)
    }

    fn list_questions(&self, test_id: &TestId) -> RepoResult<Vec<Question>> {
        self.inner.list_questions(test_id)
    }

    fn is_student_assigned(&self, test_id: &TestId, student_id: &StudentId) -> RepoResult<bool> {
        self.inner.is_student_assigned(test_id, student_id)
    }
}

impl AnswerRepository for FileRepository {
    fn upsert_answer(&self, answer: &Answer) -> RepoResult<()> {
        self.inner
            .upsert_answer_then(answer, |state| self.persist(state))
    }

    fn get_answer(&self, key: &AnswerKey) -> RepoResult<Option<Answer>> {
        self.inner.get_answer(key)
    }

    fn list_answers(&self, test_id: &TestId, student_id: &StudentId) -> RepoResult<Vec<Answer>> {
        self.inner.list_answers(test_id, student_id)
    }

    fn list_answers_by_test(&self, test_id: &TestId) -> RepoResult<Vec<Answer>> {
        self.inner.list_answers_by_test(test_id)
    }
}

impl ResultRepository for FileRepository {
    fn save_result(&self, result: &ResultRecord) -> RepoResult<()> {
        self.inner
            .save_result_then(result, |state| self.persist(state))
    }

    fn get_result(&self, answer_id: &AnswerId) -> RepoResult<Option<ResultRecord>> {
        self.inner.get_result(answer_id)
    }

    fn list_results_by_test(&self, test_id: &TestId) -> RepoResult<Vec<ResultRecord>> {
        self.inner.list_results_by_test(test_id)
    }

    fn list_results_by_student(
        &self,
        test_id: &TestId,
        student_id: &StudentId,
    ) -> RepoResult<Vec<ResultRecord>> {
        self.inner.list_results_by_student(test_id, student_id)
    }
}
