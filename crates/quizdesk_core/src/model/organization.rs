//! Organizational hierarchy: school → grade → class → student, plus teachers
//! attached to a school.
//!
//! These records are read-mostly. They arrive through seed data and are never
//! mutated by assessment use-cases.

use super::ids::{ClassId, GradeId, SchoolId, StudentId, TeacherId};
use super::Timestamp;
use serde::{Deserialize, Serialize};

/// Top-level organization unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub created_at: Timestamp,
}

/// Year level inside a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub school_id: SchoolId,
    pub name: String,
    pub created_at: Timestamp,
}

/// Class inside a grade; students belong to exactly one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub grade_id: GradeId,
    pub name: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub school_id: SchoolId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub class_id: ClassId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
}
