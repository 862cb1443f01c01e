//! Database models for grades.

use rust_decimal::Decimal;

use crate::api::models::grades::GradeCreate;
use crate::types::{ClassId, GradeId, StudentId};

/// Database request for recording a grade
#[derive(Debug, Clone)]
pub struct GradeCreateDBRequest {
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub term: i64,
    pub value: Decimal,
}

impl From<GradeCreate> for GradeCreateDBRequest {
    fn from(api: GradeCreate) -> Self {
        Self {
            student_id: api.student_id,
            class_id: api.class_id,
            term: api.term,
            value: api.value,
        }
    }
}

/// Database request for updating a grade. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct GradeUpdateDBRequest {
    pub value: Option<Decimal>,
}

/// Database response for a grade
#[derive(Debug, Clone, PartialEq)]
pub struct GradeDBResponse {
    pub id: GradeId,
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub term: i64,
    pub value: Decimal,
}
