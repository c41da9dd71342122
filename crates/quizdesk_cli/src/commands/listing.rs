//! Read commands scoped to a teacher or a student.

use super::{open_service, print_json, service_error, Principal, Scope};
use crate::config::GlobalOpts;
use anyhow::{bail, Result};
use quizdesk_core::{ServiceResult, StudentId, TeacherId, TestId};
use serde::Serialize;

enum Actor {
    Teacher(TeacherId),
    Student(StudentId),
}

impl TryFrom<Principal> for Actor {
    type Error = anyhow::Error;

    fn try_from(value: Principal) -> Result<Self> {
        match (value.teacher, value.student) {
            (Some(teacher), None) => Ok(Self::Teacher(TeacherId::new(teacher))),
            (None, Some(student)) => Ok(Self::Student(StudentId::new(student))),
            _ => bail!("pass exactly one of --teacher or --student"),
        }
    }
}

fn emit<T: Serialize>(listed: ServiceResult<Vec<T>>) -> Result<()> {
    let listed = listed.map_err(service_error)?;
    print_json(&serde_json::to_value(listed)?)
}

pub fn tests(opts: &GlobalOpts, principal: Principal) -> Result<()> {
    let service = open_service(opts)?;
    match Actor::try_from(principal)? {
        Actor::Teacher(teacher) => emit(service.list_tests_by_teacher(&teacher)),
        Actor::Student(student) => emit(service.list_tests_for_student(&student)),
    }
}

pub fn questions(opts: &GlobalOpts, scope: Scope) -> Result<()> {
    let service = open_service(opts)?;
    let test = TestId::new(scope.test);
    match Actor::try_from(scope.principal)? {
        Actor::Teacher(teacher) => emit(service.get_questions_for_teacher(&teacher, &test)),
        Actor::Student(student) => emit(service.get_questions_for_student(&student, &test)),
    }
}

pub fn answers(opts: &GlobalOpts, scope: Scope) -> Result<()> {
    let service = open_service(opts)?;
    let test = TestId::new(scope.test);
    match Actor::try_from(scope.principal)? {
        Actor::Teacher(teacher) => emit(service.list_answers_by_test(&teacher, &test)),
        Actor::Student(student) => emit(service.list_answers_for_student(&student, &test)),
    }
}

pub fn results(opts: &GlobalOpts, scope: Scope) -> Result<()> {
    let service = open_service(opts)?;
    let test = TestId::new(scope.test);
    match Actor::try_from(scope.principal)? {
        Actor::Teacher(teacher) => emit(service.list_results_by_test(&teacher, &test)),
        Actor::Student(student) => emit(service.list_results_for_student(&student, &test)),
    }
}
