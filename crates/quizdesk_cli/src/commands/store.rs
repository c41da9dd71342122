//! Store-level commands: `init`, `status`, `schools`.

use super::{open_store, print_json, service_error};
use crate::config::GlobalOpts;
use anyhow::Result;
use quizdesk_core::OrganizationService;
use serde_json::{json, Value};

pub fn init(opts: &GlobalOpts) -> Result<()> {
    let repo = open_store(opts)?;
    print_json(&json!({
        "snapshot_path": repo.snapshot_path().display().to_string(),
        "stats": repo.stats()?,
    }))
}

pub fn status(opts: &GlobalOpts) -> Result<()> {
    let repo = open_store(opts)?;
    print_json(&serde_json::to_value(repo.stats()?)?)
}

/// Prints schools with their grades, classes, teachers and students nested.
pub fn schools(opts: &GlobalOpts) -> Result<()> {
    let service = OrganizationService::new(open_store(opts)?);

    let mut schools = Vec::new();
    for school in service.list_schools().map_err(service_error)? {
        let mut grades = Vec::new();
        for grade in service.list_grades(&school.id).map_err(service_error)? {
            let mut classes = Vec::new();
            for class in service.list_classes(&grade.id).map_err(service_error)? {
                let students = service.list_students(&class.id).map_err(service_error)?;
                classes.push(json!({ "class": class, "students": students }));
            }
            grades.push(json!({ "grade": grade, "classes": classes }));
        }
        let teachers = service.list_teachers(&school.id).map_err(service_error)?;
        schools.push(json!({ "school": school, "grades": grades, "teachers": teachers }));
    }
    print_json(&Value::Array(schools))
}
