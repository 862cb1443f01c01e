//! API models for grades.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::grades::{GradeDBResponse, GradeUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{ClassId, GRADE_RANGE, GradeId, StudentId, TERMS, has_at_most_one_decimal, mean_to_tenth};

// Grades travel as JSON numbers and are parsed from their decimal text, so 0.1 stays exactly 0.1.

fn validate_value(value: Decimal) -> Result<()> {
    if !GRADE_RANGE.contains(&value) {
        return Err(Error::BadRequest {
            message: format!("value must be between {:.1} and {:.1}", GRADE_RANGE.start(), GRADE_RANGE.end()),
        });
    }
    if !has_at_most_one_decimal(value) {
        return Err(Error::BadRequest {
            message: "value must have at most one decimal place".to_string(),
        });
    }
    Ok(())
}

/// Request body for recording a grade
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GradeCreate {
    pub student_id: StudentId,
    pub class_id: ClassId,
    /// Bimester, 1 to 4
    #[schema(minimum = 1, maximum = 4, example = 1)]
    pub term: i64,
    /// 0.0 to 10.0, one decimal place
    #[schema(value_type = f64, minimum = 0.0, maximum = 10.0, example = 7.5)]
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl GradeCreate {
    pub fn validate(&self) -> Result<()> {
        if !TERMS.contains(&self.term) {
            return Err(Error::BadRequest {
                message: format!("term must be between {} and {}", TERMS.start(), TERMS.end()),
            });
        }
        validate_value(self.value)
    }
}

/// Partial update of a grade. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GradeUpdate {
    #[schema(value_type = Option<f64>)]
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub value: Option<Decimal>,
}

impl GradeUpdate {
    pub fn validate(&self) -> Result<()> {
        self.value.map_or(Ok(()), validate_value)
    }
}

impl From<GradeUpdate> for GradeUpdateDBRequest {
    fn from(api: GradeUpdate) -> Self {
        Self { value: api.value }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GradeCreated {
    pub grade_id: GradeId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GradeResponse {
    pub id: GradeId,
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub term: i64,
    #[schema(value_type = f64)]
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl From<GradeDBResponse> for GradeResponse {
    fn from(db: GradeDBResponse) -> Self {
        Self {
            id: db.id,
            student_id: db.student_id,
            class_id: db.class_id,
            term: db.term,
            value: db.value,
        }
    }
}

/// A grade together with the student's final average in that class
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentGradeResponse {
    pub id: GradeId,
    pub class_id: ClassId,
    pub term: i64,
    #[schema(value_type = f64)]
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Mean of all of the student's grades in this class, one decimal
    #[schema(value_type = f64, example = 8.0)]
    #[serde(with = "rust_decimal::serde::float")]
    pub final_average: Decimal,
}

impl StudentGradeResponse {
    /// Pair every grade with the final average of its class.
    ///
    /// `grades` must be ordered by class, as [`Grades::list`](crate::db::handlers::Grades) returns them.
    pub fn for_student(grades: &[GradeDBResponse]) -> Vec<Self> {
        grades
            .chunk_by(|a, b| a.class_id == b.class_id)
            .flat_map(|class_grades| {
                // A chunk is never empty
                let final_average = mean_to_tenth(class_grades.iter().map(|grade| grade.value)).unwrap_or_default();
                class_grades.iter().map(move |grade| Self {
                    id: grade.id,
                    class_id: grade.class_id,
                    term: grade.term,
                    value: grade.value,
                    final_average,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn create(term: i64, value: &str) -> GradeCreate {
        GradeCreate {
            student_id: 1,
            class_id: 1,
            term,
            value: d(value),
        }
    }

    fn db_grade(id: GradeId, class_id: ClassId, term: i64, value: &str) -> GradeDBResponse {
        GradeDBResponse {
            id,
            student_id: 1,
            class_id,
            term,
            value: d(value),
        }
    }

    #[test]
    fn test_validate_grade_create() {
        assert!(create(1, "7.0").validate().is_ok());
        assert!(create(4, "10").validate().is_ok());
        assert!(create(2, "0.0").validate().is_ok());
        assert!(create(1, "7.50").validate().is_ok());
        assert!(create(0, "7.0").validate().is_err());
        assert!(create(5, "7.0").validate().is_err());
        assert!(create(1, "10.5").validate().is_err());
        assert!(create(1, "-0.1").validate().is_err());
        assert!(create(1, "7.25").validate().is_err());
    }

    #[test]
    fn test_validate_grade_update() {
        assert!(GradeUpdate::default().validate().is_ok());
        assert!(GradeUpdate { value: Some(d("9.5")) }.validate().is_ok());
        assert!(GradeUpdate { value: Some(d("11.0")) }.validate().is_err());
    }

    #[test]
    fn test_grade_values_parse_exactly_from_json() {
        let body: GradeCreate = serde_json::from_str(r#"{"student_id": 1, "class_id": 2, "term": 1, "value": 0.1}"#).unwrap();
        assert_eq!(body.value, d("0.1"));
        assert!(body.validate().is_ok());

        let body: GradeCreate = serde_json::from_str(r#"{"student_id": 1, "class_id": 2, "term": 1, "value": 7.25}"#).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_final_average_per_class() {
        let grades = vec![
            db_grade(1, 2, 1, "7.0"),
            db_grade(2, 2, 2, "8.0"),
            db_grade(3, 2, 3, "8.5"),
            db_grade(4, 3, 1, "0.1"),
            db_grade(5, 3, 2, "4.6"),
        ];

        let response = StudentGradeResponse::for_student(&grades);
        let averages: Vec<_> = response.iter().map(|grade| (grade.id, grade.final_average)).collect();
        assert_eq!(
            averages,
            vec![(1, d("7.8")), (2, d("7.8")), (3, d("7.8")), (4, d("2.4")), (5, d("2.4"))]
        );
    }

    #[test]
    fn test_final_average_serializes_as_number() {
        let response = StudentGradeResponse::for_student(&[db_grade(1, 2, 1, "0.1"), db_grade(2, 2, 2, "4.6")]);
        let json = serde_json::to_value(&response[0]).unwrap();
        assert_eq!(json["final_average"], serde_json::json!(2.4));
        assert_eq!(json["value"], serde_json::json!(0.1));
    }
}
