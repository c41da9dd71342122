//! Mutating commands: `create-test`, `submit`, `grade`.

use super::{open_service, print_json, service_error};
use crate::config::GlobalOpts;
use anyhow::Result;
use quizdesk_core::{
    CreateTestInput, GradeInput, QuestionDraft, QuestionId, StudentId, SubmitAnswerInput,
    TeacherId, TestId,
};
use serde_json::json;

pub struct GradeArgs {
    pub teacher: String,
    pub test: String,
    pub question: String,
    pub student: String,
    pub score: i32,
    pub feedback: String,
    pub completed: bool,
}

pub fn create_test(
    opts: &GlobalOpts,
    teacher: String,
    title: String,
    questions: Vec<QuestionDraft>,
    students: Vec<String>,
) -> Result<()> {
    let service = open_service(opts)?;
    let created = service
        .create_test(CreateTestInput {
            title,
            teacher_id: TeacherId::new(teacher),
            questions,
            student_ids: students.into_iter().map(StudentId::new).collect(),
        })
        .map_err(service_error)?;
    print_json(&json!({ "test": created.test, "questions": created.questions }))
}

pub fn submit(
    opts: &GlobalOpts,
    student: String,
    test: String,
    question: String,
    response: String,
) -> Result<()> {
    let service = open_service(opts)?;
    let answer = service
        .submit_answer(SubmitAnswerInput {
            test_id: TestId::new(test),
            question_id: QuestionId::new(question),
            student_id: StudentId::new(student),
            response,
        })
        .map_err(service_error)?;
    print_json(&serde_json::to_value(answer)?)
}

pub fn grade(opts: &GlobalOpts, args: GradeArgs) -> Result<()> {
    let service = open_service(opts)?;
    let result = service
        .grade_answer(GradeInput {
            teacher_id: TeacherId::new(args.teacher),
            test_id: TestId::new(args.test),
            question_id: QuestionId::new(args.question),
            student_id: StudentId::new(args.student),
            score: args.score,
            feedback: args.feedback,
            completed: args.completed,
        })
        .map_err(service_error)?;
    print_json(&serde_json::to_value(result)?)
}
