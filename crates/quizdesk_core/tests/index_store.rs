use quizdesk_core::{
    sample_seed, Answer, AnswerId, AnswerKey, AnswerRepository, MemoryRepository, Question,
    QuestionId, RepoError, ResultId, ResultRecord, ResultRepository, StudentId, TeacherId, Test,
    TestId, TestRepository,
};

fn test_with_questions(id: &str, created_at: i64, prompts: &[&str]) -> (Test, Vec<Question>) {
    let test = Test {
        id: TestId::new(id),
        teacher_id: TeacherId::new("teacher-001"),
        title: format!("title {id}"),
        created_at,
        updated_at: created_at,
        assigned_to: Vec::new(),
    };
    let questions = prompts
        .iter()
        .enumerate()
        .map(|(index, prompt)| Question {
            id: QuestionId::new(format!("{id}-q{}", index + 1)),
            test_id: test.id.clone(),
            sequence: index as u32 + 1,
            prompt: prompt.to_string(),
            points: 1,
            created_at,
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
        response: format!("response {id}"),
        created_at: at,
        updated_at: at,
    }
}

fn result(id: &str, answer_id: &str, at: i64) -> ResultRecord {
    ResultRecord {
        id: ResultId::new(id),
        answer_id: AnswerId::new(answer_id),
        score: 3,
        feedback: "ok".to_string(),
        completed: true,
        created_at: at,
        updated_at: at,
    }
}

#[test]
fn create_test_with_unknown_student_leaves_no_partial_state() {
    let repo = MemoryRepository::new(sample_seed());
    let (test, questions) = test_with_questions("t1", 10, &["a", "b"]);
    let students = [StudentId::new("student-001"), StudentId::new("ghost")];

    let err = repo.create_test(&test, &questions, &students).unwrap_err();

    assert!(matches!(err, RepoError::StudentNotFound(ref id) if id.as_str() == "ghost"));
    assert!(repo.get_test(&test.id).unwrap().is_none());
    assert!(repo.get_question(&questions[0].id).unwrap().is_none());
    assert!(repo.list_questions(&test.id).unwrap().is_empty());
    assert!(!repo
        .is_student_assigned(&test.id, &StudentId::new("student-001"))
        .unwrap());
    assert!(repo
        .list_tests_for_student(&StudentId::new("student-001"))
        .unwrap()
        .is_empty());
}

#[test]
fn create_test_rejects_duplicate_id_and_unknown_teacher() {
    let repo = MemoryRepository::new(sample_seed());
    let (test, questions) = test_with_questions("t1", 10, &["a"]);
    repo.create_test(&test, &questions, &[]).unwrap();

    let (again, again_questions) = test_with_questions("t1", 20, &["other"]);
    let err = repo.create_test(&again, &again_questions, &[]).unwrap_err();
    assert!(matches!(err, RepoError::TestAlreadyExists(_)));
    assert_eq!(repo.get_test(&test.id).unwrap().unwrap().created_at, 10);

    let (mut orphan, orphan_questions) = test_with_questions("t2", 30, &["a"]);
    orphan.teacher_id = TeacherId::new("nobody");
    let err = repo
        .create_test(&orphan, &orphan_questions, &[])
        .unwrap_err();
    assert!(matches!(err, RepoError::TeacherNotFound(_)));
}

#[test]
fn assignment_is_visible_from_both_directions() {
    let repo = MemoryRepository::new(sample_seed());
    let (test, questions) = test_with_questions("t1", 10, &["a"]);
    let assigned = StudentId::new("student-001");
    let other = StudentId::new("student-003");
    repo.create_test(&test, &questions, &[assigned.clone()])
        .unwrap();

    assert!(repo.is_student_assigned(&test.id, &assigned).unwrap());
    assert_eq!(
        repo.list_tests_for_student(&assigned).unwrap()[0].id,
        test.id
    );
    assert!(!repo.is_student_assigned(&test.id, &other).unwrap());
    assert!(repo.list_tests_for_student(&other).unwrap().is_empty());
    assert_eq!(
        repo.get_test(&test.id).unwrap().unwrap().assigned_to,
        vec![assigned]
    );
}

#[test]
fn lists_are_ordered_by_creation_time_then_id() {
    let repo = MemoryRepository::new(sample_seed());
    for (id, at) in [("t-c", 30), ("t-b", 10), ("t-a", 10)] {
        let (test, questions) = test_with_questions(id, at, &["q"]);
        repo.create_test(&test, &questions, &[]).unwrap();
    }

    let ids: Vec<String> = repo
        .list_tests_by_teacher(&TeacherId::new("teacher-001"))
        .unwrap()
        .into_iter()
        .map(|test| test.id.to_string())
        .collect();
    assert_eq!(ids, vec!["t-a", "t-b", "t-c"]);
}

#[test]
fn absence_is_empty_not_an_error() {
    let repo = MemoryRepository::new(sample_seed());
    let missing = TestId::new("missing");

    assert!(repo.get_test(&missing).unwrap().is_none());
    assert!(repo.list_questions(&missing).unwrap().is_empty());
    assert!(repo.list_answers_by_test(&missing).unwrap().is_empty());
    assert!(repo.list_results_by_test(&missing).unwrap().is_empty());
    assert!(repo
        .get_answer(&AnswerKey::new("missing", "q", "student-001"))
        .unwrap()
        .is_none());
    assert!(repo.get_result(&AnswerId::new("a")).unwrap().is_none());
}

#[test]
fn upsert_answer_is_keyed_by_triple_and_filtered_per_student() {
    let repo = MemoryRepository::new(sample_seed());
    repo.upsert_answer(&answer("a1", "t1", "q1", "student-001", 5))
        .unwrap();
    repo.upsert_answer(&answer("a2", "t1", "q1", "student-002", 3))
        .unwrap();
    repo.upsert_answer(&answer("a3", "t2", "q9", "student-001", 1))
        .unwrap();

    let mut updated = answer("a1", "t1", "q1", "student-001", 5);
    updated.response = "second try".to_string();
    updated.updated_at = 9;
    repo.upsert_answer(&updated).unwrap();

    let stored = repo
        .get_answer(&AnswerKey::new("t1", "q1", "student-001"))
        .unwrap()
        .unwrap();
    assert_eq!(stored, updated);

    let by_test: Vec<String> = repo
        .list_answers_by_test(&TestId::new("t1"))
        .unwrap()
        .into_iter()
        .map(|a| a.id.to_string())
        .collect();
    assert_eq!(by_test, vec!["a2", "a1"]);

    let own = repo
        .list_answers(&TestId::new("t1"), &StudentId::new("student-001"))
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].response, "second try");
}

#[test]
fn save_result_keeps_one_result_per_answer() {
    let repo = MemoryRepository::new(sample_seed());
    repo.upsert_answer(&answer("a1", "t1", "q1", "student-001", 5))
        .unwrap();
    repo.upsert_answer(&answer("a2", "t1", "q2", "student-002", 6))
        .unwrap();
    repo.save_result(&result("r1", "a1", 7)).unwrap();
    repo.save_result(&result("r2", "a2", 8)).unwrap();

    let mut regraded = result("r1", "a1", 7);
    regraded.score = 10;
    regraded.updated_at = 12;
    repo.save_result(&regraded).unwrap();

    assert_eq!(
        repo.get_result(&AnswerId::new("a1")).unwrap(),
        Some(regraded.clone())
    );
    assert_eq!(repo.list_results_by_test(&TestId::new("t1")).unwrap().len(), 2);
    assert_eq!(
        repo.list_results_by_student(&TestId::new("t1"), &StudentId::new("student-001"))
            .unwrap(),
        vec![regraded]
    );
}

#[test]
fn returned_values_are_copies() {
    let repo = MemoryRepository::new(sample_seed());
    let (test, questions) = test_with_questions("t1", 10, &["a"]);
    repo.create_test(&test, &questions, &[]).unwrap();

    let mut loaded = repo.get_test(&test.id).unwrap().unwrap();
    loaded.title = "mutated".to_string();
    loaded.assigned_to.push(StudentId::new("student-002"));

    let fresh = repo.get_test(&test.id).unwrap().unwrap();
    assert_eq!(fresh.title, "title t1");
    assert!(fresh.assigned_to.is_empty());
}

#[test]
fn exported_snapshot_rebuilds_an_equivalent_store() {
    let repo = MemoryRepository::new(sample_seed());
    let (test, questions) = test_with_questions("t1", 10, &["a", "b"]);
    repo.create_test(&test, &questions, &[StudentId::new("student-002")])
        .unwrap();
    repo.upsert_answer(&answer("a1", "t1", "t1-q2", "student-002", 11))
        .unwrap();
    repo.save_result(&result("r1", "a1", 12)).unwrap();

    let rebuilt = MemoryRepository::from_snapshot(repo.export_snapshot().unwrap()).unwrap();

    assert_eq!(rebuilt.stats().unwrap(), repo.stats().unwrap());
    assert_eq!(rebuilt.list_questions(&test.id).unwrap(), questions);
    assert!(rebuilt
        .is_student_assigned(&test.id, &StudentId::new("student-002"))
        .unwrap());
    assert_eq!(
        rebuilt.get_result(&AnswerId::new("a1")).unwrap(),
        Some(result("r1", "a1", 12))
    );
}
