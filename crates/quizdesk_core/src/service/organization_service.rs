//! Read-only navigation of the school hierarchy.
//!
//! Child listings check that the parent exists first, so an unknown parent
//! is `NotFound` rather than an empty list.

use crate::model::ids::{ClassId, GradeId, SchoolId, StudentId, TeacherId};
use crate::model::organization::{Class, Grade, School, Student, Teacher};
use crate::repo::contracts::OrganizationRepository;
use crate::service::error::{MissingEntity, ServiceResult};

/// Lookup service over schools, grades, classes, teachers and students.
pub struct OrganizationService<R: OrganizationRepository> {
    repo: R,
}

impl<R: OrganizationRepository> OrganizationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_schools(&self) -> ServiceResult<Vec<School>> {
        Ok(self.repo.list_schools()?)
    }

    pub fn get_school(&self, id: &SchoolId) -> ServiceResult<School> {
        self.repo
            .get_school(id)?
            .ok_or_else(|| MissingEntity::School(id.clone()).into())
    }

    pub fn list_grades(&self, school_id: &SchoolId) -> ServiceResult<Vec<Grade>> {
        self.get_school(school_id)?;
        Ok(self.repo.list_grades(school_id)?)
    }

    pub fn get_grade(&self, id: &GradeId) -> ServiceResult<Grade> {
        self.repo
            .get_grade(id)?
            .ok_or_else(|| MissingEntity::Grade(id.clone()).into())
    }

    pub fn list_classes(&self, grade_id: &GradeId) -> ServiceResult<Vec<Class>> {
        self.get_grade(grade_id)?;
        Ok(self.repo.list_classes(grade_id)?)
    }

    pub fn get_class(&self, id: &ClassId) -> ServiceResult<Class> {
        self.repo
            .get_class(id)?
            .ok_or_else(|| MissingEntity::Class(id.clone()).into())
    }

    pub fn list_teachers(&self, school_id: &SchoolId) -> ServiceResult<Vec<Teacher>> {
        self.get_school(school_id)?;
        Ok(self.repo.list_teachers(school_id)?)
    }

    pub fn get_teacher(&self, id: &TeacherId) -> ServiceResult<Teacher> {
        self.repo
            .get_teacher(id)?
            .ok_or_else(|| MissingEntity::Teacher(id.clone()).into())
    }

    pub fn list_students(&self, class_id: &ClassId) -> ServiceResult<Vec<Student>> {
        self.get_class(class_id)?;
        Ok(self.repo.list_students(class_id)?)
    }

    pub fn get_student(&self, id: &StudentId) -> ServiceResult<Student> {
        self.repo
            .get_student(id)?
            .ok_or_else(|| MissingEntity::Student(id.clone()).into())
    }
}
