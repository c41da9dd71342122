//! In-memory entity maps and derived indices.
//!
//! # Responsibility
//! - Own every entity map and keep the secondary indices in step with them.
//! - Rebuild all indices from a snapshot and export state back to one.
//!
//! # Invariants
//! - Every method here runs under the store lock held by the caller;
//!   nothing in this module locks.
//! - `assignments` and `student_tests` are two views of one relation and are
//!   only ever written together.
//! - `answer_index` maps each `AnswerKey` to exactly one live answer.
//! - `result_by_answer` maps each answer to at most one live result.
//! - Mutations validate first and write second, so a rejected call leaves
//!   no partial state behind.

use crate::model::assessment::{Answer, AnswerKey, Question, ResultRecord, Test};
use crate::model::ids::{
    AnswerId, ClassId, GradeId, QuestionId, ResultId, SchoolId, StudentId, TeacherId, TestId,
};
use crate::model::organization::{Class, Grade, School, Student, Teacher};
use crate::model::Timestamp;
use crate::repo::contracts::{RepoError, RepoResult};
use crate::repo::snapshot::{Snapshot, SNAPSHOT_FORMAT_VERSION};
use crate::seed::SeedData;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Entity counts, mainly for operator diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub schools: usize,
    pub grades: usize,
    pub classes: usize,
    pub teachers: usize,
    pub students: usize,
    pub tests: usize,
    pub questions: usize,
    pub answers: usize,
    pub results: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    schools: HashMap<SchoolId, School>,
    grades: HashMap<GradeId, Grade>,
    classes: HashMap<ClassId, Class>,
    teachers: HashMap<TeacherId, Teacher>,
    students: HashMap<StudentId, Student>,

    tests: HashMap<TestId, Test>,
    questions: HashMap<QuestionId, Question>,
    test_questions: HashMap<TestId, Vec<QuestionId>>,
    assignments: HashMap<TestId, HashSet<StudentId>>,
    student_tests: HashMap<StudentId, HashSet<TestId>>,
    answers: HashMap<AnswerId, Answer>,
    answer_index: HashMap<AnswerKey, AnswerId>,
    answers_by_test: HashMap<TestId, HashSet<AnswerId>>,
    results: HashMap<ResultId, ResultRecord>,
    result_by_answer: HashMap<AnswerId, ResultId>,
}

impl StoreState {
    pub(crate) fn from_seed(seed: SeedData) -> Self {
        let mut state = Self::default();
        for school in seed.schools {
            state.schools.insert(school.id.clone(), school);
        }
        for grade in seed.grades {
            state.grades.insert(grade.id.clone(), grade);
        }
        for class in seed.classes {
            state.classes.insert(class.id.clone(), class);
        }
        for teacher in seed.teachers {
            state.teachers.insert(teacher.id.clone(), teacher);
        }
        for student in seed.students {
            state.students.insert(student.id.clone(), student);
        }
        state
    }

    /// Rebuilds every map and index from a snapshot document.
    ///
    /// Rejects documents that reference missing entities or break the
    /// uniqueness rules instead of loading a partially consistent store.
    pub(crate) fn from_snapshot(snapshot: Snapshot) -> RepoResult<Self> {
        let mut state = Self::default();

        for school in snapshot.schools {
            insert_unique(&mut state.schools, school.id.clone(), school, "school")?;
        }
        for grade in snapshot.grades {
            insert_unique(&mut state.grades, grade.id.clone(), grade, "grade")?;
        }
        for class in snapshot.classes {
            insert_unique(&mut state.classes, class.id.clone(), class, "class")?;
        }
        for teacher in snapshot.teachers {
            insert_unique(&mut state.teachers, teacher.id.clone(), teacher, "teacher")?;
        }
        for student in snapshot.students {
            insert_unique(&mut state.students, student.id.clone(), student, "student")?;
        }

        for test in snapshot.tests {
            if !state.teachers.contains_key(&test.teacher_id) {
                return Err(RepoError::InvalidData(format!(
                    "test `{}` references unknown teacher `{}`",
                    test.id, test.teacher_id
                )));
            }
            for student_id in &test.assigned_to {
                if !state.students.contains_key(student_id) {
                    return Err(RepoError::InvalidData(format!(
                        "test `{}` is assigned to unknown student `{student_id}`",
                        test.id
                    )));
                }
            }
            let test_id = test.id.clone();
            let assigned = test.assigned_to.clone();
            insert_unique(&mut state.tests, test_id.clone(), test, "test")?;
            state.test_questions.entry(test_id.clone()).or_default();
            state.link_assignments(&test_id, &assigned);
        }

        for question in snapshot.questions {
            if !state.tests.contains_key(&question.test_id) {
                return Err(RepoError::InvalidData(format!(
                    "question `{}` references unknown test `{}`",
                    question.id, question.test_id
                )));
            }
            state
                .test_questions
                .entry(question.test_id.clone())
                .or_default()
                .push(question.id.clone());
            insert_unique(
                &mut state.questions,
                question.id.clone(),
                question,
                "question",
            )?;
        }
        for (test_id, question_ids) in &mut state.test_questions {
            let questions = &state.questions;
            question_ids.sort_by_key(|id| questions.get(id).map(|q| q.sequence));
            for (position, question_id) in question_ids.iter().enumerate() {
                let sequence = questions.get(question_id).map(|q| q.sequence);
                if sequence != Some(position as u32 + 1) {
                    return Err(RepoError::InvalidData(format!(
                        "questions of test `{test_id}` are not numbered 1..N"
                    )));
                }
            }
        }

        for answer in snapshot.answers {
            let question_matches = state
                .questions
                .get(&answer.question_id)
                .is_some_and(|question| question.test_id == answer.test_id);
            if !question_matches || !state.students.contains_key(&answer.student_id) {
                return Err(RepoError::InvalidData(format!(
                    "answer `{}` references unknown test, question or student",
                    answer.id
                )));
            }
            let key = answer.key();
            if state.answer_index.contains_key(&key) {
                return Err(RepoError::InvalidData(format!(
                    "answer `{}` duplicates an existing (test, question, student) key",
                    answer.id
                )));
            }
            state.answer_index.insert(key, answer.id.clone());
            state
                .answers_by_test
                .entry(answer.test_id.clone())
                .or_default()
                .insert(answer.id.clone());
            insert_unique(&mut state.answers, answer.id.clone(), answer, "answer")?;
        }

        for result in snapshot.results {
            if !state.answers.contains_key(&result.answer_id) {
                return Err(RepoError::InvalidData(format!(
                    "result `{}` references unknown answer `{}`",
                    result.id, result.answer_id
                )));
            }
            if state.result_by_answer.contains_key(&result.answer_id) {
                return Err(RepoError::InvalidData(format!(
                    "answer `{}` has more than one result",
                    result.answer_id
                )));
            }
            state
                .result_by_answer
                .insert(result.answer_id.clone(), result.id.clone());
            insert_unique(&mut state.results, result.id.clone(), result, "result")?;
        }

        Ok(state)
    }

    /// Exports the full state in a stable order.
    pub(crate) fn to_snapshot(&self) -> Snapshot {
        let mut questions: Vec<Question> = self.questions.values().cloned().collect();
        questions.sort_by(|a, b| {
            a.test_id
                .cmp(&b.test_id)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });

        Snapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            schools: chronological(self.schools.values()),
            grades: chronological(self.grades.values()),
            classes: chronological(self.classes.values()),
            teachers: chronological(self.teachers.values()),
            students: chronological(self.students.values()),
            tests: chronological(self.tests.values()),
            questions,
            answers: chronological(self.answers.values()),
            results: chronological(self.results.values()),
        }
    }

    pub(crate) fn stats(&self) -> StoreStats {
        StoreStats {
            schools: self.schools.len(),
            grades: self.grades.len(),
            classes: self.classes.len(),
            teachers: self.teachers.len(),
            students: self.students.len(),
            tests: self.tests.len(),
            questions: self.questions.len(),
            answers: self.answers.len(),
            results: self.results.len(),
        }
    }

    // Organization reads.

    pub(crate) fn school(&self, id: &SchoolId) -> Option<School> {
        self.schools.get(id).cloned()
    }

    pub(crate) fn schools(&self) -> Vec<School> {
        chronological(self.schools.values())
    }

    pub(crate) fn grade(&self, id: &GradeId) -> Option<Grade> {
        self.grades.get(id).cloned()
    }

    pub(crate) fn grades_of(&self, school_id: &SchoolId) -> Vec<Grade> {
        chronological(
            self.grades
                .values()
                .filter(|grade| &grade.school_id == school_id),
        )
    }

    pub(crate) fn class(&self, id: &ClassId) -> Option<Class> {
        self.classes.get(id).cloned()
    }

    pub(crate) fn classes_of(&self, grade_id: &GradeId) -> Vec<Class> {
        chronological(
            self.classes
                .values()
                .filter(|class| &class.grade_id == grade_id),
        )
    }

    pub(crate) fn teacher(&self, id: &TeacherId) -> Option<Teacher> {
        self.teachers.get(id).cloned()
    }

    pub(crate) fn teachers_of(&self, school_id: &SchoolId) -> Vec<Teacher> {
        chronological(
            self.teachers
                .values()
                .filter(|teacher| &teacher.school_id == school_id),
        )
    }

    pub(crate) fn student(&self, id: &StudentId) -> Option<Student> {
        self.students.get(id).cloned()
    }

    pub(crate) fn students_of(&self, class_id: &ClassId) -> Vec<Student> {
        chronological(
            self.students
                .values()
                .filter(|student| &student.class_id == class_id),
        )
    }

    // Test aggregate.

    /// Inserts a test with its questions and assignments as one unit.
    pub(crate) fn create_test(
        &mut self,
        test: &Test,
        questions: &[Question],
        student_ids: &[StudentId],
    ) -> RepoResult<()> {
        if self.tests.contains_key(&test.id) {
            return Err(RepoError::TestAlreadyExists(test.id.clone()));
        }
        if !self.teachers.contains_key(&test.teacher_id) {
            return Err(RepoError::TeacherNotFound(test.teacher_id.clone()));
        }
        if let Some(missing) = student_ids
            .iter()
            .find(|student_id| !self.students.contains_key(*student_id))
        {
            return Err(RepoError::StudentNotFound(missing.clone()));
        }

        let mut seen_questions = HashSet::with_capacity(questions.len());
        for (position, question) in questions.iter().enumerate() {
            if question.test_id != test.id {
                return Err(RepoError::InvalidAggregate(format!(
                    "question `{}` belongs to test `{}`, expected `{}`",
                    question.id, question.test_id, test.id
                )));
            }
            if question.sequence != position as u32 + 1 {
                return Err(RepoError::InvalidAggregate(format!(
                    "question `{}` has sequence {}, expected {}",
                    question.id,
                    question.sequence,
                    position + 1
                )));
            }
            if self.questions.contains_key(&question.id) || !seen_questions.insert(&question.id) {
                return Err(RepoError::InvalidAggregate(format!(
                    "question id `{}` is not unique",
                    question.id
                )));
            }
        }

        let assigned = dedup_preserving_order(student_ids);
        let mut stored = test.clone();
        stored.assigned_to = assigned.clone();
        self.tests.insert(stored.id.clone(), stored);

        let question_ids = questions.iter().map(|q| q.id.clone()).collect();
        for question in questions {
            self.questions.insert(question.id.clone(), question.clone());
        }
        self.test_questions.insert(test.id.clone(), question_ids);
        self.link_assignments(&test.id, &assigned);
        Ok(())
    }

    pub(crate) fn test(&self, id: &TestId) -> Option<Test> {
        self.tests.get(id).cloned()
    }

    pub(crate) fn question(&self, id: &QuestionId) -> Option<Question> {
        self.questions.get(id).cloned()
    }

    pub(crate) fn tests_by_teacher(&self, teacher_id: &TeacherId) -> Vec<Test> {
        chronological(
            self.tests
                .values()
                .filter(|test| &test.teacher_id == teacher_id),
        )
    }

    pub(crate) fn tests_for_student(&self, student_id: &StudentId) -> Vec<Test> {
        match self.student_tests.get(student_id) {
            Some(test_ids) => chronological(test_ids.iter().filter_map(|id| self.tests.get(id))),
            None => Vec::new(),
        }
    }

    pub(crate) fn questions_of(&self, test_id: &TestId) -> Vec<Question> {
        let mut questions: Vec<Question> = match self.test_questions.get(test_id) {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.questions.get(id))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        questions.sort_by_key(|question| question.sequence);
        questions
    }

    pub(crate) fn is_assigned(&self, test_id: &TestId, student_id: &StudentId) -> bool {
        self.assignments
            .get(test_id)
            .is_some_and(|students| students.contains(student_id))
    }

    // Answers.

    /// Writes an answer by id and (re)points its key index entry.
    ///
    /// A different answer already holding the same key is dropped together
    /// with its result, so the key keeps exactly one live answer.
    pub(crate) fn upsert_answer(&mut self, answer: &Answer) {
        let key = answer.key();

        if let Some(previous) = self.answers.get(&answer.id) {
            let previous_key = previous.key();
            if previous_key != key && self.answer_index.get(&previous_key) == Some(&answer.id) {
                self.answer_index.remove(&previous_key);
            }
            if previous.test_id != answer.test_id {
                if let Some(ids) = self.answers_by_test.get_mut(&previous.test_id) {
                    ids.remove(&answer.id);
                }
            }
        }

        if let Some(displaced) = self.answer_index.get(&key).cloned() {
            if displaced != answer.id {
                self.drop_answer(&displaced);
            }
        }

        self.answers.insert(answer.id.clone(), answer.clone());
        self.answer_index.insert(key, answer.id.clone());
        self.answers_by_test
            .entry(answer.test_id.clone())
            .or_default()
            .insert(answer.id.clone());
    }

    pub(crate) fn answer(&self, key: &AnswerKey) -> Option<Answer> {
        self.answer_index
            .get(key)
            .and_then(|id| self.answers.get(id))
            .cloned()
    }

    pub(crate) fn answers_of(&self, test_id: &TestId, student_id: &StudentId) -> Vec<Answer> {
        chronological(
            self.test_answers(test_id)
                .filter(|answer| &answer.student_id == student_id),
        )
    }

    pub(crate) fn answers_by_test(&self, test_id: &TestId) -> Vec<Answer> {
        chronological(self.test_answers(test_id))
    }

    // Results.

    /// Writes a result by id and (re)points the answer → result index.
    pub(crate) fn save_result(&mut self, result: &ResultRecord) {
        if let Some(previous) = self.results.get(&result.id) {
            if previous.answer_id != result.answer_id
                && self.result_by_answer.get(&previous.answer_id) == Some(&result.id)
            {
                self.result_by_answer.remove(&previous.answer_id);
            }
        }

        if let Some(displaced) = self.result_by_answer.get(&result.answer_id).cloned() {
            if displaced != result.id {
                self.results.remove(&displaced);
            }
        }

        self.results.insert(result.id.clone(), result.clone());
        self.result_by_answer
            .insert(result.answer_id.clone(), result.id.clone());
    }

    pub(crate) fn result_for(&self, answer_id: &AnswerId) -> Option<ResultRecord> {
        self.result_by_answer
            .get(answer_id)
            .and_then(|id| self.results.get(id))
            .cloned()
    }

    pub(crate) fn results_by_test(&self, test_id: &TestId) -> Vec<ResultRecord> {
        chronological(
            self.test_answers(test_id)
                .filter_map(|answer| self.live_result(&answer.id)),
        )
    }

    pub(crate) fn results_by_student(
        &self,
        test_id: &TestId,
        student_id: &StudentId,
    ) -> Vec<ResultRecord> {
        chronological(
            self.test_answers(test_id)
                .filter(|answer| &answer.student_id == student_id)
                .filter_map(|answer| self.live_result(&answer.id)),
        )
    }

    // Helpers.

    fn link_assignments(&mut self, test_id: &TestId, student_ids: &[StudentId]) {
        let assigned = self.assignments.entry(test_id.clone()).or_default();
        for student_id in student_ids {
            assigned.insert(student_id.clone());
            self.student_tests
                .entry(student_id.clone())
                .or_default()
                .insert(test_id.clone());
        }
    }

    fn test_answers<'a>(&'a self, test_id: &TestId) -> impl Iterator<Item = &'a Answer> + 'a {
        self.answers_by_test
            .get(test_id)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.answers.get(id))
    }

    fn live_result(&self, answer_id: &AnswerId) -> Option<&ResultRecord> {
        self.result_by_answer
            .get(answer_id)
            .and_then(|id| self.results.get(id))
    }

    fn drop_answer(&mut self, answer_id: &AnswerId) {
        if let Some(answer) = self.answers.remove(answer_id) {
            if let Some(ids) = self.answers_by_test.get_mut(&answer.test_id) {
                ids.remove(answer_id);
            }
        }
        if let Some(result_id) = self.result_by_answer.remove(answer_id) {
            self.results.remove(&result_id);
        }
    }
}

/// Entities listed in creation order.
trait Chronological {
    fn created_at(&self) -> Timestamp;
    fn sort_id(&self) -> &str;
}

macro_rules! chronological_by_id {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl Chronological for $entity {
                fn created_at(&self) -> Timestamp {
                    self.created_at
                }

                fn sort_id(&self) -> &str {
                    self.id.as_str()
                }
            }
        )+
    };
}

chronological_by_id!(School, Grade, Class, Teacher, Student, Test, Answer, ResultRecord);

/// Copies items out and orders them by `(created_at, id)`.
fn chronological<'a, T, I>(items: I) -> Vec<T>
where
    T: Chronological + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut copied: Vec<T> = items.into_iter().cloned().collect();
    copied.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.sort_id().cmp(b.sort_id()))
    });
    copied
}

fn insert_unique<K, V>(map: &mut HashMap<K, V>, key: K, value: V, entity: &str) -> RepoResult<()>
where
    K: Eq + Hash + std::fmt::Display,
{
    if map.contains_key(&key) {
        return Err(RepoError::InvalidData(format!(
            "duplicate {entity} id `{key}`"
        )));
    }
    map.insert(key, value);
    Ok(())
}

fn dedup_preserving_order(student_ids: &[StudentId]) -> Vec<StudentId> {
    let mut seen = HashSet::with_capacity(student_ids.len());
    student_ids
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{dedup_preserving_order, StoreState};
    use crate::model::assessment::{Answer, AnswerKey, Question, ResultRecord, Test};
    use crate::model::ids::{AnswerId, QuestionId, ResultId, StudentId, TeacherId, TestId};
    use crate::repo::contracts::RepoError;
    use crate::seed::sample_seed;

    fn test_aggregate(id: &str) -> (Test, Vec<Question>) {
        let test = Test {
            id: TestId::new(id),
            teacher_id: TeacherId::new("teacher-001"),
            title: "Fractions".to_string(),
            created_at: 10,
            updated_at: 10,
            assigned_to: Vec::new(),
        };
        let questions = (1..=2)
            .map(|sequence| Question {
                id: QuestionId::new(format!("{id}-q{sequence}")),
                test_id: test.id.clone(),
                sequence,
                prompt: format!("prompt {sequence}"),
                points: 5,
                created_at: 10,
            })
            .collect();
        (test, questions)
    }

    fn answer(id: &str, test: &str, question: &str, student: &str, at: i64) -> Answer {
        Answer {
            id: AnswerId::new(id),
            test_id: TestId::new(test),
            question_id: QuestionId::new(question),
            student_id: StudentId::new(student),
            response: "42".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let ids = vec![
            StudentId::new("b"),
            StudentId::new("a"),
            StudentId::new("b"),
        ];
        assert_eq!(
            dedup_preserving_order(&ids),
            vec![StudentId::new("b"), StudentId::new("a")]
        );
    }

    #[test]
    fn create_test_rejects_non_dense_sequences_without_side_effects() {
        let mut state = StoreState::from_seed(sample_seed());
        let (test, mut questions) = test_aggregate("t1");
        questions[1].sequence = 3;

        let err = state
            .create_test(&test, &questions, &[StudentId::new("student-001")])
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidAggregate(_)));
        assert!(state.test(&test.id).is_none());
        assert!(!state.is_assigned(&test.id, &StudentId::new("student-001")));
        assert!(state.question(&questions[0].id).is_none());
    }

    #[test]
    fn displaced_answer_is_dropped_with_its_result() {
        let mut state = StoreState::from_seed(sample_seed());
        let (test, questions) = test_aggregate("t1");
        state
            .create_test(&test, &questions, &[StudentId::new("student-001")])
            .unwrap();

        let first = answer("a1", "t1", "t1-q1", "student-001", 20);
        state.upsert_answer(&first);
        state.save_result(&ResultRecord {
            id: ResultId::new("r1"),
            answer_id: first.id.clone(),
            score: 3,
            feedback: String::new(),
            completed: false,
            created_at: 30,
            updated_at: 30,
        });

        let replacement = answer("a2", "t1", "t1-q1", "student-001", 40);
        state.upsert_answer(&replacement);

        let key = AnswerKey::new("t1", "t1-q1", "student-001");
        assert_eq!(state.answer(&key).unwrap().id, replacement.id);
        assert_eq!(state.answers_by_test(&test.id).len(), 1);
        assert!(state.results_by_test(&test.id).is_empty());
        assert_eq!(state.stats().results, 0);
    }

    #[test]
    fn snapshot_roundtrip_rebuilds_indices() {
        let mut state = StoreState::from_seed(sample_seed());
        let (test, questions) = test_aggregate("t1");
        state
            .create_test(
                &test,
                &questions,
                &[StudentId::new("student-002"), StudentId::new("student-001")],
            )
            .unwrap();
        state.upsert_answer(&answer("a1", "t1", "t1-q2", "student-002", 20));

        let restored = StoreState::from_snapshot(state.to_snapshot()).unwrap();
        assert_eq!(restored.stats(), state.stats());
        assert!(restored.is_assigned(&test.id, &StudentId::new("student-001")));
        assert_eq!(
            restored.tests_for_student(&StudentId::new("student-002"))[0].id,
            test.id
        );
        assert_eq!(
            restored.test(&test.id).unwrap().assigned_to,
            vec![StudentId::new("student-002"), StudentId::new("student-001")]
        );
        assert!(restored
            .answer(&AnswerKey::new("t1", "t1-q2", "student-002"))
            .is_some());
    }

    #[test]
    fn snapshot_with_dangling_result_is_rejected() {
        let mut snapshot = StoreState::from_seed(sample_seed()).to_snapshot();
        snapshot.results.push(ResultRecord {
            id: ResultId::new("r1"),
            answer_id: AnswerId::new("missing"),
            score: 1,
            feedback: String::new(),
            completed: true,
            created_at: 1,
            updated_at: 1,
        });

        let err = StoreState::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.contains("missing")));
    }
}
