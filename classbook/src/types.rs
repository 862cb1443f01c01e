//! Common type definitions.
//!
//! # ID Types
//!
//! All entity IDs are SQLite integer row ids wrapped in type aliases so that
//! signatures document which table an id belongs to:
//!
//! - [`TeacherId`]: Teacher account identifier
//! - [`ClassId`]: Class identifier
//! - [`StudentId`]: Student identifier
//! - [`LessonId`]: Lesson identifier
//! - [`GradeId`]: Grade identifier
//!
//! # Grading helpers
//!
//! Grades are exact one-decimal [`Decimal`] values, stored as integer tenths.
//!
//! - [`TERMS`]: the valid bimester numbers
//! - [`round_to_tenth`]: one-decimal rounding used for averages and rates
//! - [`mean_to_tenth`]: the final average of a set of grades

use std::ops::RangeInclusive;

use rust_decimal::{Decimal, RoundingStrategy};

// Type aliases for IDs
pub type TeacherId = i64;
pub type ClassId = i64;
pub type StudentId = i64;
pub type LessonId = i64;
pub type GradeId = i64;

/// Grading periods (bimesters) in an academic year.
pub const TERMS: RangeInclusive<i64> = 1..=4;

/// Lowest and highest grade a student can receive.
pub const GRADE_RANGE: RangeInclusive<Decimal> = Decimal::ZERO..=Decimal::TEN;

/// Round to one decimal place, halves away from zero.
/// Example: 2.35 -> 2.4, 7.25 -> 7.3
pub fn round_to_tenth(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `value` carries at most one significant decimal place (7.50 counts as 7.5).
pub fn has_at_most_one_decimal(value: Decimal) -> bool {
    value.normalize().scale() <= 1
}

/// Arithmetic mean rounded with [`round_to_tenth`]. `None` for no values.
pub fn mean_to_tenth<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| round_to_tenth(sum / Decimal::from(count)))
}

/// Grade as stored: a whole number of tenths (7.5 -> 75). Expects a validated grade.
pub fn grade_to_tenths(value: Decimal) -> i64 {
    let mut tenths = round_to_tenth(value);
    tenths.rescale(1);
    tenths.mantissa() as i64
}

pub fn grade_from_tenths(tenths: i64) -> Decimal {
    Decimal::new(tenths, 1)
}
