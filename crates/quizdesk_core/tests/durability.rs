use quizdesk_core::{
    sample_seed, AnswerKey, AnswerRepository, AssessmentError, AssessmentService,
    CreateTestInput, FileRepository, GradeInput, ManualClock, QuestionDraft, RepoError,
    ResultRepository, SeedData, SequentialIdGenerator, SnapshotError, StudentId,
    SubmitAnswerInput, TeacherId, TestRepository,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn service_at(path: &Path, seed: SeedData) -> AssessmentService<FileRepository> {
    AssessmentService::with_collaborators(
        FileRepository::open(path, seed).unwrap(),
        ManualClock::new(1_700_000_000_000),
        SequentialIdGenerator::new("id"),
    )
}

fn algebra_input() -> CreateTestInput {
    CreateTestInput {
        title: "Algebra".to_string(),
        teacher_id: TeacherId::new("teacher-001"),
        questions: vec![
            QuestionDraft::new("x + 1 = 3", 2),
            QuestionDraft::new("2x = 8", 3),
        ],
        student_ids: vec![StudentId::new("student-001"), StudentId::new("student-003")],
    }
}

#[test]
fn first_open_seeds_and_writes_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("state.json");

    let repo = FileRepository::open(&path, sample_seed()).unwrap();

    assert!(path.exists());
    assert_eq!(repo.snapshot_path(), path.as_path());
    let stats = repo.stats().unwrap();
    assert_eq!(stats.schools, 1);
    assert_eq!(stats.students, 3);
    assert_eq!(stats.tests, 0);

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["format_version"], 1);
    assert_eq!(document["teachers"][0]["id"], "teacher-001");
}

#[test]
fn state_survives_restart_field_for_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let (created, answer, result) = {
        let service = service_at(&path, sample_seed());
        let created = service.create_test(algebra_input()).unwrap();
        let answer = service
            .submit_answer(SubmitAnswerInput {
                test_id: created.test.id.clone(),
                question_id: created.questions[1].id.clone(),
                student_id: StudentId::new("student-003"),
                response: "4".to_string(),
            })
            .unwrap();
        let result = service
            .grade_answer(GradeInput {
                teacher_id: TeacherId::new("teacher-001"),
                test_id: created.test.id.clone(),
                question_id: created.questions[1].id.clone(),
                student_id: StudentId::new("student-003"),
                score: 3,
                feedback: "correct".to_string(),
                completed: true,
            })
            .unwrap();
        (created, answer, result)
    };

    // The seed is ignored once a snapshot exists.
    let reopened = FileRepository::open(&path, SeedData::default()).unwrap();

    assert_eq!(reopened.get_test(&created.test.id).unwrap(), Some(created.test.clone()));
    assert_eq!(reopened.list_questions(&created.test.id).unwrap(), created.questions);
    assert!(reopened
        .is_student_assigned(&created.test.id, &StudentId::new("student-003"))
        .unwrap());
    assert_eq!(
        reopened.get_answer(&answer.key()).unwrap(),
        Some(answer.clone())
    );
    assert_eq!(reopened.get_result(&answer.id).unwrap(), Some(result));
    assert!(reopened
        .get_answer(&AnswerKey::new(
            created.test.id.as_str(),
            created.questions[0].id.as_str(),
            "student-003"
        ))
        .unwrap()
        .is_none());
}

#[test]
fn identical_histories_write_identical_bytes() {
    let dir = TempDir::new().unwrap();
    let left = dir.path().join("left.json");
    let right = dir.path().join("right.json");

    for path in [&left, &right] {
        let service = service_at(path, sample_seed());
        service.create_test(algebra_input()).unwrap();
        service.create_test(algebra_input()).unwrap();
    }

    assert_eq!(fs::read(&left).unwrap(), fs::read(&right).unwrap());
}

#[test]
fn stale_temp_file_is_removed_on_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let temp = dir.path().join(".state.json.tmp");
    fs::write(&temp, b"{\"format_version\": 1, \"sch").unwrap();

    FileRepository::open(&path, sample_seed()).unwrap();

    assert!(!temp.exists());
    assert!(path.exists());
}

#[test]
fn failed_snapshot_keeps_in_memory_mutation_and_recovers_on_next_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let service = service_at(&path, sample_seed());

    // A non-empty directory at the canonical path makes the rename fail.
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();
    fs::write(path.join("blocker"), b"x").unwrap();

    let err = service.create_test(algebra_input()).unwrap_err();
    assert!(matches!(
        err,
        AssessmentError::Infrastructure(RepoError::Snapshot(SnapshotError::Io { .. }))
    ));
    let in_memory = service
        .list_tests_by_teacher(&TeacherId::new("teacher-001"))
        .unwrap();
    assert_eq!(in_memory.len(), 1);
    assert!(!dir.path().join(".state.json.tmp").exists());

    fs::remove_dir_all(&path).unwrap();
    service.create_test(algebra_input()).unwrap();

    let reopened = FileRepository::open(&path, SeedData::default()).unwrap();
    assert_eq!(reopened.stats().unwrap().tests, 2);
}

#[test]
fn corrupt_snapshot_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, b"not json").unwrap();

    let err = FileRepository::open(&path, sample_seed()).unwrap_err();
    assert!(matches!(err, RepoError::Snapshot(SnapshotError::Json(_))));
}

#[test]
fn snapshot_with_dangling_question_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(
        &path,
        r#"{
  "format_version": 1,
  "questions": [
    {"id": "q1", "test_id": "ghost", "sequence": 1, "prompt": "p", "points": 1, "created_at": 0}
  ]
}"#,
    )
    .unwrap();

    let err = FileRepository::open(&path, sample_seed()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
