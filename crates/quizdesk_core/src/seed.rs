//! Bootstrap data for a store that has no snapshot yet.
//!
//! Seed data is consulted only on first start. Once a snapshot exists, the
//! snapshot wins and the seed is ignored.

use crate::model::ids::{ClassId, GradeId, SchoolId, StudentId, TeacherId};
use crate::model::organization::{Class, Grade, School, Student, Teacher};
use crate::model::Timestamp;

/// Organizational entities used to initialize an empty store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedData {
    pub schools: Vec<School>,
    pub grades: Vec<Grade>,
    pub classes: Vec<Class>,
    pub teachers: Vec<Teacher>,
    pub students: Vec<Student>,
}

/// 2024-01-01T00:00:00Z.
const SAMPLE_EPOCH_MS: Timestamp = 1_704_067_200_000;
const MINUTE_MS: Timestamp = 60_000;

/// Deterministic demo organization: one school, one grade, two classes, one
/// teacher and three students.
pub fn sample_seed() -> SeedData {
    let school_id = SchoolId::new("school-001");
    let grade_id = GradeId::new("grade-001");
    let class_a = ClassId::new("class-1A");
    let class_b = ClassId::new("class-1B");

    SeedData {
        schools: vec![School {
            id: school_id.clone(),
            name: "Example High School".to_string(),
            created_at: SAMPLE_EPOCH_MS,
        }],
        grades: vec![Grade {
            id: grade_id.clone(),
            school_id: school_id.clone(),
            name: "1st Grade".to_string(),
            created_at: SAMPLE_EPOCH_MS,
        }],
        classes: vec![
            Class {
                id: class_a.clone(),
                grade_id: grade_id.clone(),
                name: "Class A".to_string(),
                created_at: SAMPLE_EPOCH_MS,
            },
            Class {
                id: class_b.clone(),
                grade_id,
                name: "Class B".to_string(),
                created_at: SAMPLE_EPOCH_MS,
            },
        ],
        teachers: vec![Teacher {
            id: TeacherId::new("teacher-001"),
            school_id,
            name: "Mrs. Smith".to_string(),
            email: "smith@example.com".to_string(),
            created_at: SAMPLE_EPOCH_MS,
        }],
        students: vec![
            Student {
                id: StudentId::new("student-001"),
                class_id: class_a.clone(),
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                created_at: SAMPLE_EPOCH_MS,
            },
            Student {
                id: StudentId::new("student-002"),
                class_id: class_a,
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                created_at: SAMPLE_EPOCH_MS + MINUTE_MS,
            },
            Student {
                id: StudentId::new("student-003"),
                class_id: class_b,
                name: "Charlie".to_string(),
                email: "charlie@example.com".to_string(),
                created_at: SAMPLE_EPOCH_MS + 2 * MINUTE_MS,
            },
        ],
    }
}
